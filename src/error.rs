//! Error types.

/// Result type for context construction and cipher operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors from context construction and cipher operations.
///
/// Failing calls into the underlying cryptography library are collapsed into
/// [`Error::Crypto`] toward the caller; the distinguishing detail (unsupported
/// operation, bad point encoding, tag mismatch) is only visible on the
/// diagnostic log line emitted at the failure site.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input failed validation before the cryptography library was invoked:
    /// zero-length plaintext, or a ciphertext shorter than the fixed SM2
    /// overhead or not framed as an uncompressed curve point.
    #[error("invalid input")]
    InvalidInput,

    /// The operating-system randomness source failed during key generation.
    #[error("SM2 key generation failed")]
    KeyGeneration,

    /// PEM serialization failed or produced no output. Never returned from
    /// context construction; an export failure only leaves the corresponding
    /// cached PEM text absent.
    #[error("PEM export failed")]
    PemExport,

    /// The underlying cryptography library rejected the cipher operation.
    #[error("SM2 cipher operation failed")]
    Crypto,
}
