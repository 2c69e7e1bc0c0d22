//! A pure Rust implementation of SFrame end-to-end media frame encryption.
//!
//! See <https://tools.ietf.org/html/draft-omara-sframe-00> for the base
//! wire format this crate interoperates with.

mod cipher;
pub mod cipher_suite;
pub mod context;
pub mod error;
pub mod header;
pub mod receiver;
pub mod sender;

pub use error::Error;
