pub mod sso;

pub mod prelude {
    pub use super::sso::*;
}
