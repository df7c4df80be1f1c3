//! Injected configuration for packet encode/decode calls.

use std::fmt;
use std::sync::Arc;

use crate::error::CipherError;
use crate::limits::Limits;

/// Body cipher selected by the packet's encryption-algorithm bits.
///
/// The codec never implements an algorithm itself. Checksums are always
/// computed over the ciphertext, so `decode` only sees bodies whose CRC
/// already matched.
pub trait SecretKey: Send + Sync {
    /// Decrypts a received body.
    fn decode(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Encrypts an outgoing body.
    fn encode(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// Options shared by [`Packet::decode`](crate::Packet::decode) and
/// [`Packet::encode`](crate::Packet::encode).
#[derive(Clone, Default)]
pub struct CodecOptions {
    secret: Option<Arc<dyn SecretKey>>,
    limits: Limits,
}

impl CodecOptions {
    /// Creates options with no secret key and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the secret key used for encrypted bodies.
    #[must_use]
    pub fn with_secret(mut self, secret: Arc<dyn SecretKey>) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Replaces the decoding limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the configured secret key.
    pub fn secret(&self) -> Option<&dyn SecretKey> {
        self.secret.as_deref()
    }

    /// Returns the configured limits.
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl fmt::Debug for CodecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecOptions")
            .field("secret", &self.secret.as_ref().map(|_| "<configured>"))
            .field("limits", &self.limits)
            .finish()
    }
}
