//! Coupon template business logic - Handles the template lifecycle.
//!
//! Provides functions for creating, retrieving, updating, and deleting coupon
//! templates. Creation mints the template's full code batch in the same
//! transaction, so a template never becomes visible without its codes. All
//! functions are async and return Result types for error handling.

use crate::{
    core::generator,
    entities::{Coupon, CouponKind, Template, TemplateStatus, coupon, template},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_template`].
///
/// Quantities and limits follow the boundary rules enforced by
/// [`create_template`]: `value` positive, `min_spend` and `total_quantity`
/// non-negative, `per_user_limit` at least 1, `end_time` strictly after
/// `start_time`.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    /// Campaign name (non-empty after trimming, at most 100 characters)
    pub name: String,
    /// Discount rule family
    pub coupon_type: CouponKind,
    /// Discount value, interpreted per `coupon_type`
    pub value: f64,
    /// Minimum order amount to qualify
    pub min_spend: f64,
    /// Start of the validity window
    pub start_time: DateTimeUtc,
    /// End of the validity window
    pub end_time: DateTimeUtc,
    /// How many codes to mint for this template
    pub total_quantity: i32,
    /// Per-user claim limit
    pub per_user_limit: i32,
    /// Whether the coupon may be combined with others
    pub is_stackable: bool,
}

/// Partial update for [`update_template`].
///
/// `None` fields keep their current values. The redemption counters are
/// deliberately absent; only the redemption engine writes those.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    /// New campaign name
    pub name: Option<String>,
    /// New discount rule family
    pub coupon_type: Option<CouponKind>,
    /// New discount value
    pub value: Option<f64>,
    /// New minimum order amount
    pub min_spend: Option<f64>,
    /// New window start
    pub start_time: Option<DateTimeUtc>,
    /// New window end
    pub end_time: Option<DateTimeUtc>,
    /// New issuance target
    pub total_quantity: Option<i32>,
    /// New per-user claim limit
    pub per_user_limit: Option<i32>,
    /// New lifecycle status
    pub status: Option<TemplateStatus>,
    /// New stackability flag
    pub is_stackable: Option<bool>,
}

/// Checks the boundary invariants shared by create and update.
fn validate_template_bounds(
    name: &str,
    value: f64,
    min_spend: f64,
    start_time: DateTimeUtc,
    end_time: DateTimeUtc,
    total_quantity: i32,
    per_user_limit: i32,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidTemplate {
            message: "template name cannot be empty".to_string(),
        });
    }

    if name.trim().chars().count() > 100 {
        return Err(Error::InvalidTemplate {
            message: "template name cannot exceed 100 characters".to_string(),
        });
    }

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidTemplate {
            message: format!("discount value must be positive, got {value}"),
        });
    }

    if !min_spend.is_finite() || min_spend < 0.0 {
        return Err(Error::InvalidTemplate {
            message: format!("minimum spend cannot be negative, got {min_spend}"),
        });
    }

    if end_time <= start_time {
        return Err(Error::InvalidTemplate {
            message: "validity window must end after it starts".to_string(),
        });
    }

    if total_quantity < 0 {
        return Err(Error::InvalidTemplate {
            message: format!("total quantity cannot be negative, got {total_quantity}"),
        });
    }

    if per_user_limit < 1 {
        return Err(Error::InvalidTemplate {
            message: format!("per-user limit must be at least 1, got {per_user_limit}"),
        });
    }

    Ok(())
}

/// Creates a new coupon template and mints its initial code batch.
///
/// Validates the boundary invariants, inserts the template with zeroed
/// counters and `active` status, and fills the code batch up to
/// `total_quantity` inside the same transaction, so the template commits
/// together with all of its codes or not at all.
#[instrument(skip(db, new))]
pub async fn create_template(
    db: &DatabaseConnection,
    new: NewTemplate,
) -> Result<template::Model> {
    validate_template_bounds(
        &new.name,
        new.value,
        new.min_spend,
        new.start_time,
        new.end_time,
        new.total_quantity,
        new.per_user_limit,
    )?;

    // Use a transaction so the template and its code batch commit together
    let txn = db.begin().await?;

    let now = chrono::Utc::now();
    let template_model = template::ActiveModel {
        name: Set(new.name.trim().to_string()),
        coupon_type: Set(new.coupon_type),
        value: Set(new.value),
        min_spend: Set(new.min_spend),
        start_time: Set(new.start_time),
        end_time: Set(new.end_time),
        total_quantity: Set(new.total_quantity),
        claimed_quantity: Set(0),
        redeemed_quantity: Set(0),
        per_user_limit: Set(new.per_user_limit),
        status: Set(TemplateStatus::Active),
        is_stackable: Set(new.is_stackable),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = template_model.insert(&txn).await?;
    let minted = generator::fill_coupon_deficit(&txn, &created).await?;

    txn.commit().await?;

    info!(
        "Created coupon template_id {} '{}' with {} codes",
        created.id,
        created.name,
        minted.len()
    );
    Ok(created)
}

/// Applies a partial update to an existing template.
///
/// Only the supplied (`Some`) fields change; everything else keeps its
/// current value. The effective post-patch values are re-validated against
/// the same boundary rules as creation, and `total_quantity` may not drop
/// below the number of codes already redeemed. Raising `total_quantity`
/// does not mint codes by itself; call
/// [`generator::generate_coupons_for_template`] to top up afterwards.
#[instrument(skip(db, update))]
pub async fn update_template(
    db: &DatabaseConnection,
    template_id: i64,
    update: TemplateUpdate,
) -> Result<template::Model> {
    let existing = Template::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or(Error::TemplateNotFound { id: template_id })?;

    // Validate the values the row would hold after the patch
    let effective_name = update.name.as_deref().unwrap_or(&existing.name);
    let effective_value = update.value.unwrap_or(existing.value);
    let effective_min_spend = update.min_spend.unwrap_or(existing.min_spend);
    let effective_start = update.start_time.unwrap_or(existing.start_time);
    let effective_end = update.end_time.unwrap_or(existing.end_time);
    let effective_total = update.total_quantity.unwrap_or(existing.total_quantity);
    let effective_limit = update.per_user_limit.unwrap_or(existing.per_user_limit);

    validate_template_bounds(
        effective_name,
        effective_value,
        effective_min_spend,
        effective_start,
        effective_end,
        effective_total,
        effective_limit,
    )?;

    if effective_total < existing.redeemed_quantity {
        return Err(Error::InvalidTemplate {
            message: format!(
                "total quantity {} cannot drop below the {} codes already redeemed",
                effective_total, existing.redeemed_quantity
            ),
        });
    }

    let mut patch: template::ActiveModel = existing.into();
    if let Some(name) = update.name {
        patch.name = Set(name.trim().to_string());
    }
    if let Some(coupon_type) = update.coupon_type {
        patch.coupon_type = Set(coupon_type);
    }
    if let Some(value) = update.value {
        patch.value = Set(value);
    }
    if let Some(min_spend) = update.min_spend {
        patch.min_spend = Set(min_spend);
    }
    if let Some(start_time) = update.start_time {
        patch.start_time = Set(start_time);
    }
    if let Some(end_time) = update.end_time {
        patch.end_time = Set(end_time);
    }
    if let Some(total_quantity) = update.total_quantity {
        patch.total_quantity = Set(total_quantity);
    }
    if let Some(per_user_limit) = update.per_user_limit {
        patch.per_user_limit = Set(per_user_limit);
    }
    if let Some(status) = update.status {
        patch.status = Set(status);
    }
    if let Some(is_stackable) = update.is_stackable {
        patch.is_stackable = Set(is_stackable);
    }
    patch.updated_at = Set(chrono::Utc::now());

    let updated = patch.update(db).await?;

    info!("Updated coupon template_id {}", updated.id);
    Ok(updated)
}

/// Deletes a template by ID, returning whether a row was removed.
///
/// Coupons minted from the template are left in place. Once the template row
/// is gone they can no longer be redeemed; the redemption engine reports the
/// dangling reference as a data-integrity failure.
#[instrument(skip(db))]
pub async fn delete_template(db: &DatabaseConnection, template_id: i64) -> Result<bool> {
    let result = Template::delete_by_id(template_id).exec(db).await?;

    let deleted = result.rows_affected > 0;
    if deleted {
        info!("Deleted coupon template_id {}", template_id);
    }
    Ok(deleted)
}

/// Finds a template by its unique ID, returning None if it does not exist.
pub async fn get_template_by_id(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Option<template::Model>> {
    Template::find_by_id(template_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all templates in storage order.
pub async fn list_templates(db: &DatabaseConnection) -> Result<Vec<template::Model>> {
    Template::find()
        .order_by_asc(template::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every coupon minted from a template, in creation order.
pub async fn get_coupons_for_template(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Vec<coupon::Model>> {
    Coupon::find()
        .filter(coupon::Column::TemplateId.eq(template_id))
        .order_by_asc(coupon::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::CouponStatus;
    use crate::test_utils::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn base_template(name: &str) -> NewTemplate {
        let now = Utc::now();
        NewTemplate {
            name: name.to_string(),
            coupon_type: CouponKind::PercentageDiscount,
            value: 10.0,
            min_spend: 0.0,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            total_quantity: 0,
            per_user_limit: 1,
            is_stackable: false,
        }
    }

    #[tokio::test]
    async fn test_create_template_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Empty name
        let result = create_template(&db, base_template("")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTemplate { message: _ }
        ));

        // Whitespace-only name
        let result = create_template(&db, base_template("   ")).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTemplate { message: _ }
        ));

        // Name longer than 100 characters
        let result = create_template(&db, base_template(&"x".repeat(101))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTemplate { message: _ }
        ));

        // Zero and negative discount values
        let mut new = base_template("Zero value");
        new.value = 0.0;
        assert!(create_template(&db, new).await.is_err());
        let mut new = base_template("Negative value");
        new.value = -5.0;
        assert!(create_template(&db, new).await.is_err());

        // Negative minimum spend
        let mut new = base_template("Negative min spend");
        new.min_spend = -1.0;
        assert!(create_template(&db, new).await.is_err());

        // Window that ends before (or exactly when) it starts
        let mut new = base_template("Inverted window");
        new.end_time = new.start_time;
        assert!(create_template(&db, new).await.is_err());
        let mut new = base_template("Backwards window");
        new.end_time = new.start_time - Duration::hours(2);
        assert!(create_template(&db, new).await.is_err());

        // Negative quantity
        let mut new = base_template("Negative quantity");
        new.total_quantity = -1;
        assert!(create_template(&db, new).await.is_err());

        // Per-user limit below 1
        let mut new = base_template("Zero limit");
        new.per_user_limit = 0;
        assert!(create_template(&db, new).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_template_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let mut new = base_template("  Summer Sale  ");
        new.total_quantity = 5;
        let created = create_template(&db, new).await?;

        assert_eq!(created.name, "Summer Sale");
        assert_eq!(created.coupon_type, CouponKind::PercentageDiscount);
        assert_eq!(created.value, 10.0);
        assert_eq!(created.total_quantity, 5);
        assert_eq!(created.claimed_quantity, 0);
        assert_eq!(created.redeemed_quantity, 0);
        assert_eq!(created.status, TemplateStatus::Active);
        assert!(!created.is_stackable);

        // The full code batch exists as soon as the template does
        let coupons = get_coupons_for_template(&db, created.id).await?;
        assert_eq!(coupons.len(), 5);
        assert!(coupons.iter().all(|c| c.status == CouponStatus::Active));
        assert!(coupons.iter().all(|c| c.template_id == created.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_template_zero_quantity_mints_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_template(&db, base_template("No Codes")).await?;

        let coupons = get_coupons_for_template(&db, created.id).await?;
        assert!(coupons.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_template_by_id_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_template(&db, base_template("Lookup Me")).await?;

        let found = get_template_by_id(&db, created.id).await?;
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, created.id);

        let not_found = get_template_by_id(&db, 9999).await?;
        assert!(not_found.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_templates_in_storage_order() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_template(&db, base_template("First")).await?;
        let second = create_template(&db, base_template("Second")).await?;

        let all = list_templates(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_template_partial_patch() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_template(&db, base_template("Original")).await?;

        let updated = update_template(
            &db,
            created.id,
            TemplateUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await?;

        // Only the supplied field changed
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.value, created.value);
        assert_eq!(updated.min_spend, created.min_spend);
        assert_eq!(updated.total_quantity, created.total_quantity);
        assert_eq!(updated.status, created.status);
        assert!(updated.updated_at >= created.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_template_status_change() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_template(&db, base_template("Pausable")).await?;

        let updated = update_template(
            &db,
            created.id,
            TemplateUpdate {
                status: Some(TemplateStatus::Paused),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.status, TemplateStatus::Paused);

        // Verify persistence
        let retrieved = get_template_by_id(&db, created.id).await?.unwrap();
        assert_eq!(retrieved.status, TemplateStatus::Paused);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_template_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_template(&db, base_template("Guarded")).await?;

        // Patched value must still satisfy the boundary rules
        let result = update_template(
            &db,
            created.id,
            TemplateUpdate {
                value: Some(-5.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTemplate { message: _ }
        ));

        // Moving the end before the (unchanged) start is rejected
        let result = update_template(
            &db,
            created.id,
            TemplateUpdate {
                end_time: Some(created.start_time - Duration::hours(1)),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTemplate { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_template_quantity_floor_is_redeemed_count() -> Result<()> {
        let db = setup_test_db().await?;

        let mut new = base_template("Counted");
        new.total_quantity = 5;
        let created = create_template(&db, new).await?;

        // Simulate three past redemptions
        let mut raw: template::ActiveModel = created.clone().into();
        raw.redeemed_quantity = Set(3);
        raw.update(&db).await?;

        // Dropping the target below the redeemed count is rejected
        let result = update_template(
            &db,
            created.id,
            TemplateUpdate {
                total_quantity: Some(2),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTemplate { message: _ }
        ));

        // Matching it exactly is allowed
        let updated = update_template(
            &db,
            created.id,
            TemplateUpdate {
                total_quantity: Some(3),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.total_quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_template_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_template(&db, 9999, TemplateUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::TemplateNotFound { id: 9999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_template_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_template(&db, base_template("Doomed")).await?;

        assert!(delete_template(&db, created.id).await?);
        assert!(get_template_by_id(&db, created.id).await?.is_none());

        // Deleting again reports that nothing was removed
        assert!(!delete_template(&db, created.id).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_template_leaves_coupons_behind() -> Result<()> {
        let db = setup_test_db().await?;

        let mut new = base_template("Orphan Maker");
        new.total_quantity = 2;
        let created = create_template(&db, new).await?;

        assert!(delete_template(&db, created.id).await?);

        // The minted codes survive the template
        let orphans = get_coupons_for_template(&db, created.id).await?;
        assert_eq!(orphans.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_coupons_for_template_creation_order() -> Result<()> {
        let db = setup_test_db().await?;

        let mut new = base_template("Ordered");
        new.total_quantity = 4;
        let created = create_template(&db, new).await?;

        let coupons = get_coupons_for_template(&db, created.id).await?;
        assert_eq!(coupons.len(), 4);
        assert!(coupons.windows(2).all(|pair| pair[0].id < pair[1].id));

        Ok(())
    }
}
