//! SeaORM entity definitions shared across the application.

pub mod accounts;
pub mod prelude;
