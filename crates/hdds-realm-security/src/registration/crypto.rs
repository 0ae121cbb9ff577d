// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RSA key material and OAEP envelope for the one-time-code exchange.
//!
//! The management backend encrypts the one-time code against the device's
//! public key before publishing it; the device decrypts with the matching
//! private key it generated locally for this registration attempt. Key size
//! and OAEP hash are pinned so both ends agree without negotiation.

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Matches the original wire format's key size; the protocol has no
/// negotiation path for a different modulus length.
pub const KEY_BITS: usize = 1024;

/// Per-attempt RSA keypair generated fresh for each registration window.
pub struct RegistrationKeypair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RegistrationKeypair {
    /// Generates a fresh keypair. Expensive; call once per registration
    /// attempt, not per message.
    pub fn generate() -> Result<Self> {
        let mut rng = rand::rngs::OsRng;
        let private = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| Error::GenericFailure(format!("rsa keygen failed: {e}")))?;
        let public = RsaPublicKey::from(&private);
        Ok(RegistrationKeypair { private, public })
    }

    /// PEM-encodes the public key for publication in a registration request.
    pub fn public_key_pem(&self) -> Result<String> {
        self.public
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .map_err(|e| Error::GenericFailure(format!("pem encode failed: {e}")))
    }

    /// PEM-encodes the private key. Callers must zeroize the returned buffer
    /// once it has been persisted or discarded.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>> {
        self.private
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .map(|pem| Zeroizing::new(pem.to_string()))
            .map_err(|e| Error::GenericFailure(format!("pem encode failed: {e}")))
    }

    /// Decrypts an OAEP-SHA256 envelope addressed to this keypair's public
    /// half. Returns the decrypted one-time-code as a plain string -- the
    /// original wire format never NUL-terminates or length-prefixes it, the
    /// ciphertext boundary is the message boundary.
    pub fn decrypt_otc(&self, ciphertext: &[u8]) -> Result<Zeroizing<String>> {
        let padding = Oaep::new::<Sha256>();
        let plain = self
            .private
            .decrypt(padding, ciphertext)
            .map_err(|_| Error::InvalidArgument("otc decryption failed".into()))?;
        String::from_utf8(plain)
            .map(Zeroizing::new)
            .map_err(|_| Error::InvalidArgument("otc payload was not valid utf-8".into()))
    }
}

/// Parses a PEM-encoded RSA public key, as received in a registration
/// request's `rsaPublicKey` field.
pub fn parse_public_key_pem(pem: &str) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| Error::InvalidArgument(format!("bad rsa public key pem: {e}")))
}

/// Parses a PEM-encoded RSA private key, as read back from the credential
/// store for a resumed registration attempt.
pub fn parse_private_key_pem(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .map_err(|e| Error::InvalidArgument(format!("bad rsa private key pem: {e}")))
}

/// Encrypts `otc` (the one-time code, as plaintext ASCII) against `public`.
/// This is the management-backend side of the exchange; included here so
/// that both roles share one vetted OAEP configuration.
pub fn encrypt_otc(public: &RsaPublicKey, otc: &str) -> Result<Vec<u8>> {
    let mut rng = rand::rngs::OsRng;
    let padding = Oaep::new::<Sha256>();
    public
        .encrypt(&mut rng, padding, otc.as_bytes())
        .map_err(|e| Error::GenericFailure(format!("otc encryption failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_otc() {
        let kp = RegistrationKeypair::generate().unwrap();
        let public = parse_public_key_pem(&kp.public_key_pem().unwrap()).unwrap();
        let ciphertext = encrypt_otc(&public, "123456").unwrap();
        let decrypted = kp.decrypt_otc(&ciphertext).unwrap();
        assert_eq!(decrypted.as_str(), "123456");
    }

    #[test]
    fn private_key_pem_round_trips() {
        let kp = RegistrationKeypair::generate().unwrap();
        let pem = kp.private_key_pem().unwrap();
        let parsed = parse_private_key_pem(&pem).unwrap();
        assert_eq!(parsed.to_public_key(), kp.public);
    }

    #[test]
    fn rejects_garbage_ciphertext() {
        let kp = RegistrationKeypair::generate().unwrap();
        assert!(kp.decrypt_otc(&[0u8; 128]).is_err());
    }
}
