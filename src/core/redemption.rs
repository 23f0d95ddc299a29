//! Redemption engine - Validates and executes coupon redemptions.
//!
//! A redemption walks a fixed validation sequence and only then flips the
//! coupon and bumps the template counter, all inside one transaction. The
//! first failed check wins and nothing is written on any failure path.

use crate::{
    entities::{Coupon, CouponStatus, Template, TemplateStatus, coupon, template},
    errors::{Error, Result},
};
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Redeems a coupon by its code.
///
/// Validation order, first failure wins:
/// 1. the code must exist,
/// 2. its template must still exist,
/// 3. the template must be active,
/// 4. the validity window must have started,
/// 5. and not have ended,
/// 6. the code must not already be redeemed,
/// 7. nor be individually expired.
///
/// On success the coupon flips to redeemed with `redeemed_at` set, the
/// template's `redeemed_quantity` is incremented, and both rows commit
/// together. The state flip is a single UPDATE guarded on the current
/// status, so of two concurrent attempts on the same code exactly one can
/// succeed; the loser fails with `AlreadyRedeemed`.
#[instrument(skip(db))]
pub async fn redeem_coupon(db: &DatabaseConnection, code: &str) -> Result<coupon::Model> {
    use sea_orm::sea_query::Expr;

    let txn = db.begin().await?;
    let now = chrono::Utc::now();

    let coupon_row = Coupon::find()
        .filter(coupon::Column::CouponCode.eq(code))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CodeNotFound {
            code: code.to_string(),
        })?;

    let template_row = Template::find_by_id(coupon_row.template_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::TemplateMissing {
            code: code.to_string(),
            template_id: coupon_row.template_id,
        })?;

    if template_row.status != TemplateStatus::Active {
        return Err(Error::TemplateInactive {
            template_id: template_row.id,
        });
    }

    if now < template_row.start_time {
        return Err(Error::NotYetValid {
            starts_at: template_row.start_time,
        });
    }

    if now > template_row.end_time {
        return Err(Error::Expired {
            ended_at: template_row.end_time,
        });
    }

    if coupon_row.status == CouponStatus::Redeemed {
        return Err(Error::AlreadyRedeemed {
            code: code.to_string(),
        });
    }

    if coupon_row.status == CouponStatus::Expired {
        return Err(Error::CodeExpired {
            code: code.to_string(),
        });
    }

    // Guarded state flip: only an active row can become redeemed, so a
    // concurrent redemption that got here first leaves nothing to update.
    let flip = Coupon::update_many()
        .col_expr(coupon::Column::Status, Expr::value(CouponStatus::Redeemed))
        .col_expr(coupon::Column::RedeemedAt, Expr::value(now))
        .col_expr(coupon::Column::UpdatedAt, Expr::value(now))
        .filter(coupon::Column::Id.eq(coupon_row.id))
        .filter(coupon::Column::Status.eq(CouponStatus::Active))
        .exec(&txn)
        .await?;

    if flip.rows_affected == 0 {
        return Err(Error::AlreadyRedeemed {
            code: code.to_string(),
        });
    }

    // Atomic counter bump: redeemed_quantity = redeemed_quantity + 1
    Template::update_many()
        .col_expr(
            template::Column::RedeemedQuantity,
            Expr::col(template::Column::RedeemedQuantity).add(1),
        )
        .col_expr(template::Column::UpdatedAt, Expr::value(now))
        .filter(template::Column::Id.eq(template_row.id))
        .exec(&txn)
        .await?;

    let redeemed = Coupon::find_by_id(coupon_row.id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CodeNotFound {
            code: code.to_string(),
        })?;

    txn.commit().await?;

    info!(
        "Redeemed coupon '{}' against template_id {}",
        redeemed.coupon_code, template_row.id
    );
    Ok(redeemed)
}
