pub mod account;
pub mod subscription;
