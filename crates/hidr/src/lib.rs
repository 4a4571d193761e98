//! `hidr`: one-time secret sharing and password-encrypted env files.
//!
//! Two independent protocols share the [`crypto`] building blocks:
//!
//! - [`secret`]: AES-GCM envelopes stored by a remote service and addressed
//!   by a compact identifier, optionally bound to a recipient's RSA key.
//! - [`envfile`]: values of a `NAME=value` file encrypted at rest under a
//!   password, with a whole-file HMAC tag.

pub mod config;
pub mod crypto;
pub mod envfile;
pub mod keystore;
pub mod secret;
pub mod storage;
pub mod telemetry;

pub use hidr_common::{protocol, HidrError};
