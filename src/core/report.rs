//! Reporting business logic.
//!
//! Read-only aggregations over templates and coupons: per-template redemption
//! stats, a dense daily redemption trend, and the dashboard summary that
//! front-ends render directly. Nothing in this module mutates state.

use crate::{
    entities::{Coupon, CouponStatus, Template, TemplateStatus, coupon, template},
    errors::Result,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::prelude::*;
use std::collections::HashMap;

/// Redemption statistics for a single template.
#[derive(Debug, Clone)]
pub struct TemplateStats {
    /// ID of the template
    pub template_id: i64,
    /// Template name at query time
    pub template_name: String,
    /// Issuance target of the template
    pub total_generated: i32,
    /// How many codes have been redeemed
    pub total_redeemed: i32,
    /// Redeemed share as a percentage, rounded to two decimals; 0 when
    /// nothing was issued
    pub redeem_rate: f64,
}

/// Redemption count for one calendar day.
#[derive(Debug, Clone)]
pub struct DailyTrendEntry {
    /// The UTC calendar day
    pub date: NaiveDate,
    /// Number of coupons redeemed on that day
    pub redeem_count: i64,
}

/// Aggregate numbers for the landing dashboard.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    /// Templates currently in the active state
    pub active_template_count: u64,
    /// Coupons redeemed within the trailing 30 days
    pub recent_redeemed_count: u64,
    /// Daily redemptions for the last seven days including today
    pub weekly_trend: Vec<DailyTrendEntry>,
}

/// Computes per-template redemption statistics, one record per template in
/// storage order.
pub async fn get_template_stats(db: &DatabaseConnection) -> Result<Vec<TemplateStats>> {
    let templates = crate::core::template::list_templates(db).await?;

    let stats = templates
        .into_iter()
        .map(|t| {
            let redeem_rate = calculate_redeem_rate(t.redeemed_quantity, t.total_quantity);
            TemplateStats {
                template_id: t.id,
                template_name: t.name,
                total_generated: t.total_quantity,
                total_redeemed: t.redeemed_quantity,
                redeem_rate,
            }
        })
        .collect();

    Ok(stats)
}

/// Calculates the redeemed share of an issuance as a percentage.
///
/// Returns 0 when nothing was issued rather than dividing by zero; otherwise
/// the share is rounded to two decimal places.
#[must_use]
pub fn calculate_redeem_rate(redeemed: i32, total: i32) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let rate = f64::from(redeemed) / f64::from(total) * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Builds a dense daily redemption series covering `days_ago` days back
/// through today, one entry per UTC calendar day.
///
/// Days without redemptions are present with a zero count, so the result
/// always holds exactly `days_ago + 1` entries in chronological order.
pub async fn get_daily_redeem_trend(
    db: &DatabaseConnection,
    days_ago: u32,
) -> Result<Vec<DailyTrendEntry>> {
    let today = Utc::now().date_naive();
    let start_date = today - Duration::days(i64::from(days_ago));
    let window_start = start_date.and_time(NaiveTime::MIN).and_utc();

    let redeemed_rows = Coupon::find()
        .filter(coupon::Column::Status.eq(CouponStatus::Redeemed))
        .filter(coupon::Column::RedeemedAt.gte(window_start))
        .all(db)
        .await?;

    let mut per_day: HashMap<NaiveDate, i64> = HashMap::new();
    for row in redeemed_rows {
        if let Some(redeemed_at) = row.redeemed_at {
            *per_day.entry(redeemed_at.date_naive()).or_insert(0) += 1;
        }
    }

    let mut trend = Vec::new();
    for offset in 0..=i64::from(days_ago) {
        let date = start_date + Duration::days(offset);
        let redeem_count = per_day.get(&date).copied().unwrap_or(0);
        trend.push(DailyTrendEntry { date, redeem_count });
    }

    Ok(trend)
}

/// Assembles the landing dashboard: active template count, redemptions in
/// the trailing 30 days, and the 7-day trend.
pub async fn get_dashboard_summary(db: &DatabaseConnection) -> Result<DashboardSummary> {
    let active_template_count = Template::find()
        .filter(template::Column::Status.eq(TemplateStatus::Active))
        .count(db)
        .await?;

    let month_ago = Utc::now() - Duration::days(30);
    let recent_redeemed_count = Coupon::find()
        .filter(coupon::Column::Status.eq(CouponStatus::Redeemed))
        .filter(coupon::Column::RedeemedAt.gte(month_ago))
        .count(db)
        .await?;

    let weekly_trend = get_daily_redeem_trend(db, 6).await?;

    Ok(DashboardSummary {
        active_template_count,
        recent_redeemed_count,
        weekly_trend,
    })
}
