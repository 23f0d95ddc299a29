//! Shared test utilities for `CouponKeeper`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test templates and coupons with sensible defaults.

use crate::{
    core::template::{self, NewTemplate},
    entities,
    errors::Result,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, prelude::DateTimeUtc};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test template with sensible defaults, minting its code batch.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Template name
///
/// # Defaults
/// * `coupon_type`: percentage discount
/// * `value`: 10.0
/// * `min_spend`: 0.0
/// * validity window: one hour ago through one hour from now
/// * `total_quantity`: 5
/// * `per_user_limit`: 1
/// * `is_stackable`: false
pub async fn create_test_template(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::template::Model> {
    let now = Utc::now();
    template::create_template(
        db,
        NewTemplate {
            name: name.to_string(),
            coupon_type: entities::CouponKind::PercentageDiscount,
            value: 10.0,
            min_spend: 0.0,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            total_quantity: 5,
            per_user_limit: 1,
            is_stackable: false,
        },
    )
    .await
}

/// Creates a test template with a custom validity window and quantity.
/// Use this when the window or batch size matters to the test.
pub async fn create_custom_template(
    db: &DatabaseConnection,
    name: &str,
    start_time: DateTimeUtc,
    end_time: DateTimeUtc,
    total_quantity: i32,
) -> Result<entities::template::Model> {
    template::create_template(
        db,
        NewTemplate {
            name: name.to_string(),
            coupon_type: entities::CouponKind::PercentageDiscount,
            value: 10.0,
            min_spend: 0.0,
            start_time,
            end_time,
            total_quantity,
            per_user_limit: 1,
            is_stackable: false,
        },
    )
    .await
}

/// Inserts a template row directly, bypassing creation logic.
///
/// No codes are minted and no validation runs, so tests can stage rows in
/// arbitrary states (paused, expired, zero counters).
pub async fn insert_template_row(
    db: &DatabaseConnection,
    name: &str,
    status: entities::TemplateStatus,
    start_time: DateTimeUtc,
    end_time: DateTimeUtc,
    total_quantity: i32,
) -> Result<entities::template::Model> {
    let now = Utc::now();
    let row = entities::template::ActiveModel {
        name: Set(name.to_string()),
        coupon_type: Set(entities::CouponKind::PercentageDiscount),
        value: Set(10.0),
        min_spend: Set(0.0),
        start_time: Set(start_time),
        end_time: Set(end_time),
        total_quantity: Set(total_quantity),
        claimed_quantity: Set(0),
        redeemed_quantity: Set(0),
        per_user_limit: Set(1),
        status: Set(status),
        is_stackable: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Inserts a coupon row directly, bypassing the generator.
///
/// Use this to stage coupons with a chosen code, status, or redemption
/// timestamp.
pub async fn insert_coupon_row(
    db: &DatabaseConnection,
    template_id: i64,
    code: &str,
    status: entities::CouponStatus,
    redeemed_at: Option<DateTimeUtc>,
) -> Result<entities::coupon::Model> {
    let now = Utc::now();
    let row = entities::coupon::ActiveModel {
        coupon_code: Set(code.to_string()),
        template_id: Set(template_id),
        status: Set(status),
        redeemed_at: Set(redeemed_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Sets up a complete test environment with a template and its code batch.
/// Returns (db, template) for common test scenarios.
pub async fn setup_with_template() -> Result<(DatabaseConnection, entities::template::Model)> {
    let db = setup_test_db().await?;
    let template = create_test_template(&db, "Test Template").await?;
    Ok((db, template))
}
