pub mod billing;
pub mod orm;
pub mod repository;
pub mod state;
