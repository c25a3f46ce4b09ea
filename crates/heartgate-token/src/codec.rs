//! Sealing and opening heartbeat tokens.
//!
//! Wire layout, before URL-safe base64 without padding:
//!
//! ```text
//! version (1) | nonce (24) | XChaCha20-Poly1305 ciphertext + tag
//! ```
//!
//! The nonce is derived from the key and the plaintext, so sealing the same
//! claims twice yields the same token. The version byte is authenticated as
//! associated data.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use sha2::{Digest, Sha256};

use heartgate_core::config::TokenConfig;
use heartgate_core::types::HeartbeatClaims;

use crate::error::TokenError;

/// Current token format.
const TOKEN_VERSION: u8 = 1;
/// XChaCha20 nonce length.
const NONCE_LEN: usize = 24;
/// Poly1305 tag length.
const TAG_LEN: usize = 16;
/// Domain separator for nonce derivation.
const NONCE_DOMAIN: &[u8] = b"heartgate/nonce";

/// Encrypts and decrypts heartbeat claims with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    /// AEAD instance keyed with SHA-256 of the shared secret.
    cipher: XChaCha20Poly1305,
    /// Raw key bytes, used for nonce derivation.
    key: [u8; 32],
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("version", &TOKEN_VERSION)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec from a shared secret of any length.
    pub fn new(shared_key: &str) -> Self {
        let digest = Sha256::digest(shared_key.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);

        Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(&key)),
            key,
        }
    }

    /// Creates a codec from token configuration.
    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(&config.shared_key)
    }

    /// Seals claims into a token.
    pub fn encode(&self, claims: &HeartbeatClaims) -> Result<String, TokenError> {
        let plaintext =
            serde_json::to_vec(claims).map_err(|e| TokenError::Seal(e.to_string()))?;
        let nonce = self.derive_nonce(&plaintext);

        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: &plaintext,
                    aad: &[TOKEN_VERSION],
                },
            )
            .map_err(|_| TokenError::Seal("encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        sealed.push(TOKEN_VERSION);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Opens a token and parses its claims.
    ///
    /// Any failure (encoding, length, version, authentication, JSON shape,
    /// empty user) is reported; callers answer all of them the same way.
    pub fn decode(&self, token: &str) -> Result<HeartbeatClaims, TokenError> {
        let sealed = URL_SAFE_NO_PAD.decode(token.trim())?;

        if sealed.len() < 1 + NONCE_LEN + TAG_LEN {
            return Err(TokenError::Truncated(sealed.len()));
        }

        let (version, rest) = sealed.split_at(1);
        if version[0] != TOKEN_VERSION {
            return Err(TokenError::UnsupportedVersion(version[0]));
        }

        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: version,
                },
            )
            .map_err(|_| TokenError::Authentication)?;

        let claims: HeartbeatClaims =
            serde_json::from_slice(&plaintext).map_err(TokenError::Payload)?;

        if claims.user_id.trim().is_empty() {
            return Err(TokenError::MissingUser);
        }

        Ok(claims)
    }

    /// Synthetic IV: SHA-256(key | domain | plaintext), truncated.
    fn derive_nonce(&self, plaintext: &[u8]) -> [u8; NONCE_LEN] {
        let digest = Sha256::new()
            .chain_update(self.key)
            .chain_update(NONCE_DOMAIN)
            .chain_update(plaintext)
            .finalize();

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);
        nonce
    }
}
