//! Core business logic - framework-agnostic coupon operations.
//!
//! Everything in here works against a plain `DatabaseConnection` and returns
//! `errors::Result`, so any frontend (HTTP handlers, a CLI, jobs) can call in
//! without pulling in framework types.

/// Code generation - minting unique redemption codes for templates
pub mod generator;
/// Redemption engine - the validation sequence and the atomic state flip
pub mod redemption;
/// Reporting - per-template stats, daily trends, dashboard summary
pub mod report;
/// Template management - CRUD with boundary validation
pub mod template;
