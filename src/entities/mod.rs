//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod coupon;
pub mod template;

// Re-export specific types to avoid conflicts
pub use coupon::{
    Column as CouponColumn, CouponStatus, Entity as Coupon, Model as CouponModel,
};
pub use template::{
    Column as TemplateColumn, CouponKind, Entity as Template, Model as TemplateModel,
    TemplateStatus,
};
