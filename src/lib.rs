//! SM2 keypair context with cached PEM export and public-key encryption.
//!
//! A [`Sm2Context`] owns exactly one freshly generated SM2 keypair together
//! with PEM renderings of both key halves (SPKI for the public half,
//! unencrypted PKCS#8 for the private half). Elliptic-curve arithmetic, the
//! SM2 public-key encryption scheme and the PEM/ASN.1 codecs are supplied by
//! the [`sm2`] crate; this crate only manages key-material ownership and the
//! encrypt/decrypt request contract.
//!
//! ## Usage
//!
//! ```
//! use sm2_context::Sm2Context;
//!
//! let ctx = Sm2Context::generate()?;
//! assert!(ctx.public_key_pem().is_some_and(|pem| pem.starts_with("-----BEGIN PUBLIC KEY-----")));
//!
//! let ciphertext = ctx.encrypt(b"hello world")?;
//! assert_eq!(ctx.decrypt(&ciphertext)?, b"hello world");
//! # Ok::<(), sm2_context::Error>(())
//! ```
//!
//! Failure paths emit one diagnostic line each through the [`log`] facade;
//! [`diag::init`] installs a stderr sink for binaries that do not bring
//! their own.

#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_possible_truncation,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

pub mod diag;

mod context;
mod error;
mod pem;

pub use context::{CIPHERTEXT_OVERHEAD, Sm2Context};
pub use error::{Error, Result};

pub use sm2;
