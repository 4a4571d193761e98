//! Wire types and the user-facing error taxonomy shared across `hidr` crates.

pub mod error;
pub mod protocol;

pub use error::HidrError;
