//! Coupon template entity - Represents a coupon campaign definition.
//!
//! A template carries the discount rule, the validity window, the issuance
//! target, and the aggregate redemption counter. Individual redeemable codes
//! are minted from a template and stored as `coupon` rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discount rule family a template applies.
///
/// The string values are the wire names used by the surrounding tooling, so
/// they must stay stable.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum CouponKind {
    /// Percentage off the order total
    #[sea_orm(string_value = "percentage_discount")]
    PercentageDiscount,
    /// Fixed amount off the order total
    #[sea_orm(string_value = "fixed_amount_discount")]
    FixedAmountDiscount,
    /// Fixed amount off once the order reaches a threshold
    #[sea_orm(string_value = "full_reduction")]
    FullReduction,
    /// Redeemable only by first-time customers
    #[sea_orm(string_value = "new_user_exclusive")]
    NewUserExclusive,
}

/// Lifecycle state of a template.
///
/// Deliberately a separate type from [`super::coupon::CouponStatus`]: a
/// template can be paused but never redeemed, a single code can be redeemed
/// but never paused.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TemplateStatus {
    /// Codes of this template may be redeemed (subject to the time window)
    #[sea_orm(string_value = "active")]
    Active,
    /// Redemption is suspended; codes are rejected until reactivation
    #[sea_orm(string_value = "paused")]
    Paused,
    /// The campaign is over; codes are rejected permanently
    #[sea_orm(string_value = "expired")]
    Expired,
}

/// Coupon template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupon_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Campaign name (non-empty, at most 100 characters)
    pub name: String,
    /// Discount rule family this template applies
    pub coupon_type: CouponKind,
    /// Discount value; a percentage or an amount depending on `coupon_type`
    pub value: f64,
    /// Minimum order amount to qualify (recorded, not enforced at redemption)
    pub min_spend: f64,
    /// Start of the validity window
    pub start_time: DateTimeUtc,
    /// End of the validity window; always strictly after `start_time`
    pub end_time: DateTimeUtc,
    /// Issuance target: how many codes this template should have
    pub total_quantity: i32,
    /// Reserved for a future claim flow; always 0 in this scope
    pub claimed_quantity: i32,
    /// Running count of codes redeemed against this template
    pub redeemed_quantity: i32,
    /// Per-user claim limit (recorded, not enforced at redemption)
    pub per_user_limit: i32,
    /// Whether codes of this template are currently redeemable
    pub status: TemplateStatus,
    /// Whether this coupon may be combined with others (recorded, unused)
    pub is_stackable: bool,
    /// When the template was created
    pub created_at: DateTimeUtc,
    /// When the template was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between CouponTemplate and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One template has many minted coupons
    #[sea_orm(has_many = "super::coupon::Entity")]
    Coupons,
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
