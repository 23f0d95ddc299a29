//! Coupon entity - A single redeemable code minted from a template.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an individual coupon code.
///
/// Separate from [`super::template::TemplateStatus`]; the overlap in the
/// `active`/`expired` names is cosmetic, the transitions are different.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CouponStatus {
    /// Never redeemed; eligible subject to the template's checks
    #[sea_orm(string_value = "active")]
    Active,
    /// Consumed; a code reaches this state exactly once
    #[sea_orm(string_value = "redeemed")]
    Redeemed,
    /// Individually retired without being redeemed
    #[sea_orm(string_value = "expired")]
    Expired,
}

/// Coupon database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The redemption code handed to a customer; unique across all templates
    #[sea_orm(unique)]
    pub coupon_code: String,
    /// ID of the template this coupon was minted from
    pub template_id: i64,
    /// Current lifecycle state of the code
    pub status: CouponStatus,
    /// When the code was redeemed; set exactly once, together with `status`
    pub redeemed_at: Option<DateTimeUtc>,
    /// When the coupon was created
    pub created_at: DateTimeUtc,
    /// When the coupon was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Coupon and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// The link to the template is declared here rather than as a `belongs_to`
// variant so that table creation emits no foreign key: template deletion
// must not cascade, and a coupon must remain loadable after its template
// is gone.
impl Related<super::template::Entity> for Entity {
    fn to() -> RelationDef {
        Entity::belongs_to(super::template::Entity)
            .from(Column::TemplateId)
            .to(super::template::Column::Id)
            .into()
    }
}

impl ActiveModelBehavior for ActiveModel {}
