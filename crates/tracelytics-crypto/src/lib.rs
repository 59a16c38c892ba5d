//! Cryptographic primitives for the Tracelytics record store.
//!
//! Provides the sha256 checksum deriver used as the secondary index of every
//! table and Ed25519 signing/verification for the authorization gate.
//!
//! All crypto operations wrap established libraries.

pub mod hasher;
pub mod signer;

pub use hasher::{checksum, checksum_bytes};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
