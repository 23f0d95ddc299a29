//! Coupon code generation - Mints unique redemption codes for templates.
//!
//! Codes are fixed-length strings over an uppercase alphanumeric alphabet.
//! Generation fills only the deficit between a template's issuance target and
//! the codes already minted for it, so re-running it is a no-op. Candidate
//! codes are checked against the current batch and the database before
//! insertion, with the unique column constraint as the storage-level backstop.

use crate::{
    entities::{Coupon, CouponStatus, Template, coupon, template},
    errors::{Error, Result},
};
use rand::Rng;
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Length of every generated coupon code.
pub const CODE_LENGTH: usize = 12;

/// Symbols codes are drawn from: uppercase letters and digits.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Redraw limit for a single code before generation gives up. With 36^12
/// possible codes a single collision is already unlikely; eight in a row
/// indicates something is badly wrong with the store or the RNG.
const MAX_CODE_ATTEMPTS: u32 = 8;

/// Draws one candidate code uniformly from the alphabet.
fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}

/// Draws candidate codes until one is free both in the current batch and in
/// the `coupons` table, bounded by [`MAX_CODE_ATTEMPTS`].
async fn draw_unique_code<C>(db: &C, batch: &HashSet<String>) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = random_code();
        if batch.contains(&candidate) {
            continue;
        }

        let taken = Coupon::find()
            .filter(coupon::Column::CouponCode.eq(candidate.as_str()))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
        debug!("Coupon code collision on '{}', redrawing", candidate);
    }

    Err(Error::CodeGeneration {
        attempts: MAX_CODE_ATTEMPTS,
    })
}

/// Fills the gap between `template.total_quantity` and the codes already
/// minted for it, returning the new coupons.
///
/// Runs on the caller's connection so template creation can fold the fill
/// into its own insert transaction.
pub(crate) async fn fill_coupon_deficit<C>(
    db: &C,
    template: &template::Model,
) -> Result<Vec<coupon::Model>>
where
    C: ConnectionTrait,
{
    let existing = Coupon::find()
        .filter(coupon::Column::TemplateId.eq(template.id))
        .count(db)
        .await?;

    let target = u64::try_from(template.total_quantity).unwrap_or(0);
    let deficit = target.saturating_sub(existing);
    if deficit == 0 {
        return Ok(Vec::new());
    }

    let now = chrono::Utc::now();
    let mut batch_codes: HashSet<String> = HashSet::new();
    let mut minted = Vec::new();
    for _ in 0..deficit {
        let code = draw_unique_code(db, &batch_codes).await?;
        batch_codes.insert(code.clone());

        let coupon_model = coupon::ActiveModel {
            coupon_code: Set(code),
            template_id: Set(template.id),
            status: Set(CouponStatus::Active),
            redeemed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        minted.push(coupon_model.insert(db).await?);
    }

    Ok(minted)
}

/// Mints codes for a template until its issuance target is met.
///
/// Loads the template, counts the codes already minted, and inserts one
/// coupon per missing unit inside a single transaction. Calling this on a
/// template that already has its full batch returns an empty vec, so the
/// operation is safe to re-run and is the way to top up after raising
/// `total_quantity`.
#[instrument(skip(db))]
pub async fn generate_coupons_for_template(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Vec<coupon::Model>> {
    let txn = db.begin().await?;

    let template = Template::find_by_id(template_id)
        .one(&txn)
        .await?
        .ok_or(Error::TemplateNotFound { id: template_id })?;

    let minted = fill_coupon_deficit(&txn, &template).await?;

    txn.commit().await?;

    if !minted.is_empty() {
        info!(
            "Generated {} coupon codes for template_id {}",
            minted.len(),
            template_id
        );
    }
    Ok(minted)
}
