//! SM2 keypair context: key generation, cached PEM text, cipher operations.

use core::fmt::{self, Debug};

use log::warn;
use rand_core::TryCryptoRng;
use sm2::{
    PublicKey, SecretKey,
    elliptic_curve::{
        common::getrandom::SysRng,
        zeroize::{Zeroize, Zeroizing},
    },
    pke::{Cipher, DecryptingKey, EncryptingKey, Mode},
};

use crate::{
    error::{Error, Result},
    pem,
};

/// Fixed difference between SM2 ciphertext and plaintext lengths.
///
/// Ciphertext is framed as `C1 || C3 || C2`: an uncompressed SEC1 curve point
/// (1 tag byte plus two 32-byte coordinates), the 32-byte SM3 authentication
/// tag, then the masked message.
pub const CIPHERTEXT_OVERHEAD: usize = 1 + 2 * 32 + 32;

/// SEC1 tag byte of an uncompressed curve point, the only framing this
/// context produces or accepts.
const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

/// An SM2 keypair with cached PEM renderings of both key halves.
///
/// A context exclusively owns its key material: the private scalar (zeroized
/// on drop by the underlying crate), the derived public key, and the PEM text
/// cached at construction. Either PEM cache may be absent after a failed
/// export without invalidating the context, since [`encrypt`](Self::encrypt)
/// and [`decrypt`](Self::decrypt) operate on the keys alone.
///
/// All operations take `&self` and keep no interior mutable state, so a
/// context may be shared across threads freely.
pub struct Sm2Context {
    secret_key: SecretKey,
    public_key: PublicKey,
    public_key_pem: Option<String>,
    private_key_pem: Option<Zeroizing<String>>,
}

impl Sm2Context {
    /// Generate a fresh keypair from the operating-system randomness source
    /// and cache both PEM renderings.
    ///
    /// A PEM export failure is logged and leaves the corresponding cache
    /// empty; only a key generation failure fails construction.
    pub fn generate() -> Result<Self> {
        Self::generate_from_rng(&mut SysRng)
    }

    /// Generate a fresh keypair from the given cryptographically secure RNG.
    pub fn generate_from_rng<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let secret_key = generate_secret_key(rng)?;
        let public_key = secret_key.public_key();

        let private_key_pem = pem::export_private(&secret_key).ok();
        let public_key_pem = pem::export_public(&public_key).ok();

        Ok(Self {
            secret_key,
            public_key,
            public_key_pem,
            private_key_pem,
        })
    }

    /// Cached SPKI PEM of the public key, or `None` if export failed at
    /// construction. The text is borrowed from the context.
    pub fn public_key_pem(&self) -> Option<&str> {
        self.public_key_pem.as_deref()
    }

    /// Cached unencrypted PKCS#8 PEM of the private key, or `None` if export
    /// failed at construction. The text is borrowed from the context and
    /// zeroized when the context is dropped.
    pub fn private_key_pem(&self) -> Option<&str> {
        self.private_key_pem.as_deref().map(String::as_str)
    }

    /// Encrypt `plaintext` under this context's public key.
    ///
    /// Returns a freshly allocated, caller-owned ciphertext of exactly
    /// [`ciphertext_len`](Self::ciphertext_len) bytes. Zero-length plaintext
    /// is rejected with [`Error::InvalidInput`]: the scheme's all-zero-mask
    /// retry check cannot terminate on empty input.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            warn!("refusing to encrypt zero-length plaintext");
            return Err(Error::InvalidInput);
        }

        let encrypting_key = EncryptingKey::new_with_mode(self.public_key, Mode::C1C3C2);
        let cipher: Cipher<'_> = encrypting_key
            .encrypt_cipher(&mut SysRng, plaintext)
            .map_err(|err| {
                warn!("SM2 encryption failed: {err}");
                Error::Crypto
            })?;
        let ciphertext = cipher.to_vec(Mode::C1C3C2, false).map_err(|err| {
            warn!("SM2 encryption failed: {err}");
            Error::Crypto
        })?;

        debug_assert_eq!(ciphertext.len(), Self::ciphertext_len(plaintext.len()));
        Ok(ciphertext)
    }

    /// Decrypt `ciphertext` under this context's private key.
    ///
    /// Returns a freshly allocated, caller-owned plaintext of exactly
    /// [`plaintext_len`](Self::plaintext_len) bytes. Ciphertext shorter than
    /// [`CIPHERTEXT_OVERHEAD`] or not framed as an uncompressed curve point
    /// is rejected before the cryptography library is invoked; a failed
    /// authentication tag surfaces as [`Error::Crypto`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if Self::plaintext_len(ciphertext.len()).is_none() {
            warn!(
                "ciphertext of {} bytes is shorter than the fixed SM2 overhead",
                ciphertext.len()
            );
            return Err(Error::InvalidInput);
        }
        if ciphertext.first() != Some(&SEC1_UNCOMPRESSED_TAG) {
            warn!("ciphertext is not framed as an uncompressed curve point");
            return Err(Error::InvalidInput);
        }

        let decrypting_key =
            DecryptingKey::new_with_mode(self.secret_key.to_nonzero_scalar(), Mode::C1C3C2);
        decrypting_key.decrypt(ciphertext).map_err(|err| {
            warn!("SM2 decryption failed: {err}");
            Error::Crypto
        })
    }

    /// Exact ciphertext length for a plaintext of `plaintext_len` bytes.
    pub const fn ciphertext_len(plaintext_len: usize) -> usize {
        plaintext_len + CIPHERTEXT_OVERHEAD
    }

    /// Exact plaintext length recovered from a well-formed ciphertext of
    /// `ciphertext_len` bytes, or `None` if it is shorter than the fixed
    /// overhead.
    pub const fn plaintext_len(ciphertext_len: usize) -> Option<usize> {
        ciphertext_len.checked_sub(CIPHERTEXT_OVERHEAD)
    }
}

impl Debug for Sm2Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sm2Context")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Draw candidate scalars from `rng` until one is a valid non-zero secret.
///
/// Uses the RNG's fallible interface so an operating-system entropy failure
/// surfaces as [`Error::KeyGeneration`] instead of a panic.
fn generate_secret_key<R: TryCryptoRng + ?Sized>(rng: &mut R) -> Result<SecretKey> {
    loop {
        let mut candidate = [0u8; 32];
        if let Err(err) = rng.try_fill_bytes(&mut candidate) {
            warn!("randomness source failed during SM2 key generation: {err}");
            return Err(Error::KeyGeneration);
        }

        let secret_key = SecretKey::from_slice(&candidate);
        candidate.zeroize();
        // from_slice rejects zero and out-of-range scalars; redraw on those.
        if let Ok(secret_key) = secret_key {
            return Ok(secret_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand_core::{TryCryptoRng, TryRng};
    use sm2::elliptic_curve::common::getrandom;

    use super::{CIPHERTEXT_OVERHEAD, Error, Sm2Context};

    /// RNG whose fallible interface always reports an entropy failure.
    struct FailingRng;

    impl TryRng for FailingRng {
        type Error = getrandom::Error;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Err(getrandom::Error::new_custom(1))
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Err(getrandom::Error::new_custom(1))
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), Self::Error> {
            Err(getrandom::Error::new_custom(1))
        }
    }

    impl TryCryptoRng for FailingRng {}

    #[test]
    fn exhausted_rng_fails_key_generation() {
        let result = Sm2Context::generate_from_rng(&mut FailingRng);
        assert_eq!(result.err(), Some(Error::KeyGeneration));
    }

    #[test]
    fn size_queries_invert_each_other() {
        for plaintext_len in [0, 1, 11, 256] {
            let ciphertext_len = Sm2Context::ciphertext_len(plaintext_len);
            assert_eq!(Sm2Context::plaintext_len(ciphertext_len), Some(plaintext_len));
        }
        assert_eq!(Sm2Context::plaintext_len(CIPHERTEXT_OVERHEAD - 1), None);
        assert_eq!(Sm2Context::plaintext_len(0), None);
    }
}
