//! Unified error types and result handling for the coupon core.
//!
//! Every failure path in the crate surfaces as one variant of [`Error`].
//! Redemption rejections are individual variants rather than a single
//! stringly "validation failed" case so that the calling layer can map each
//! reason onto its own external response; [`Error::kind`] groups the
//! variants into coarse classes for that mapping.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// All failure modes of the coupon core.
#[derive(Debug, Error)]
pub enum Error {
    /// Any persistence-layer fault, propagated unmodified.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration fault
        message: String,
    },

    /// A template create or update violated a boundary invariant
    /// (empty/overlong name, non-positive value, inverted validity window, …).
    #[error("invalid template: {message}")]
    InvalidTemplate {
        /// Which invariant was violated
        message: String,
    },

    /// No coupon template exists with the given id.
    #[error("coupon template {id} not found")]
    TemplateNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// No coupon exists with the given code.
    #[error("coupon code {code} not found")]
    CodeNotFound {
        /// The code that was looked up
        code: String,
    },

    /// A coupon references a template that no longer exists. This is a
    /// data-integrity violation (a template was deleted without cascading),
    /// distinct from an ordinary miss.
    #[error("coupon {code} references missing template {template_id}")]
    TemplateMissing {
        /// Code of the orphaned coupon
        code: String,
        /// The dangling template reference
        template_id: i64,
    },

    /// The owning template is paused or expired, so its codes cannot be
    /// redeemed.
    #[error("coupon template {template_id} is not active")]
    TemplateInactive {
        /// Id of the inactive template
        template_id: i64,
    },

    /// The template's validity window has not opened yet.
    #[error("coupon is not valid before {starts_at}")]
    NotYetValid {
        /// Start of the validity window
        starts_at: DateTime<Utc>,
    },

    /// The template's validity window has closed.
    #[error("coupon expired at {ended_at}")]
    Expired {
        /// End of the validity window
        ended_at: DateTime<Utc>,
    },

    /// The coupon was already redeemed; a code is redeemable exactly once.
    #[error("coupon code {code} has already been redeemed")]
    AlreadyRedeemed {
        /// The code that was presented again
        code: String,
    },

    /// The coupon itself is marked expired, independent of the template
    /// window.
    #[error("coupon code {code} has expired")]
    CodeExpired {
        /// The expired code
        code: String,
    },

    /// The generator could not mint a collision-free code within its retry
    /// budget.
    #[error("could not mint a unique coupon code after {attempts} attempts")]
    CodeGeneration {
        /// How many candidates were drawn before giving up
        attempts: u32,
    },
}

/// Coarse classification of an [`Error`].
///
/// Callers that translate core failures into transport responses (e.g. 404
/// for misses, 400 for rule rejections, 500 for faults) can branch on the
/// kind instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested template or code does not exist.
    NotFound,
    /// A business rule or boundary invariant rejected the request.
    Validation,
    /// Stored records contradict each other (e.g. an orphaned coupon).
    DataIntegrity,
    /// The persistence layer failed.
    Storage,
    /// Configuration could not be loaded.
    Config,
}

impl Error {
    /// Returns the coarse class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(_) | Self::CodeGeneration { .. } => ErrorKind::Storage,
            Self::Config { .. } => ErrorKind::Config,
            Self::InvalidTemplate { .. }
            | Self::TemplateInactive { .. }
            | Self::NotYetValid { .. }
            | Self::Expired { .. }
            | Self::AlreadyRedeemed { .. }
            | Self::CodeExpired { .. } => ErrorKind::Validation,
            Self::TemplateNotFound { .. } | Self::CodeNotFound { .. } => ErrorKind::NotFound,
            Self::TemplateMissing { .. } => ErrorKind::DataIntegrity,
        }
    }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
