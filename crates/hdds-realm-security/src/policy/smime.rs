// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Detached-signature envelope for the on-disk policy document.
//!
//! The on-disk file is a `multipart/signed` MIME message (RFC 1847 shape)
//! carrying the plaintext policy body in its first part and a detached
//! signature over that body's exact bytes in its second part. Unlike a full
//! S/MIME implementation this does not embed a PKCS#7/CMS `SignedData`
//! structure -- the signer's certificate is never part of the envelope, it
//! is always a member of the realm chain the caller already holds -- but the
//! two-part layout and part headers match genuine `multipart/signed` output
//! closely enough that the file is self-describing on disk.
//!
//! Verification mirrors the teacher's `verify_signature` (RSA first, then
//! the two ECDSA P-256 signature encodings it accepts).

use ring::signature::{self, UnparsedPublicKey};
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry;
use x509_parser::prelude::*;

use crate::error::{Error, Result};

const BOUNDARY: &str = "----=_hdds_policy";

/// Wraps `body` and `signature` (raw signature bytes over `body`'s exact
/// UTF-8 bytes) into the on-disk envelope text.
pub fn encode(body: &str, signature: &[u8]) -> String {
    use base64::Engine;
    let sig_b64 = base64::engine::general_purpose::STANDARD.encode(signature);
    format!(
        "MIME-Version: 1.0\r\n\
         Content-Type: multipart/signed; protocol=\"application/x-pkcs7-signature\"; micalg=sha-256; boundary=\"{BOUNDARY}\"\r\n\
         \r\n\
         --{BOUNDARY}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         {body}\r\n\
         --{BOUNDARY}\r\n\
         Content-Type: application/x-pkcs7-signature; name=\"smime.p7s\"\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {sig_b64}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

/// Splits an envelope produced by [`encode`] back into `(body, signature)`.
fn split(envelope: &str) -> Result<(&str, Vec<u8>)> {
    let open = format!("--{BOUNDARY}\r\n");
    let close = format!("--{BOUNDARY}--");

    let after_first = envelope
        .split_once(&open)
        .ok_or_else(|| Error::InvalidArgument("policy envelope missing opening boundary".into()))?
        .1;
    let (body_part, rest) = after_first
        .split_once(&open)
        .ok_or_else(|| Error::InvalidArgument("policy envelope missing second part".into()))?;
    let sig_part = rest
        .split_once(&close)
        .ok_or_else(|| Error::InvalidArgument("policy envelope missing closing boundary".into()))?
        .0;

    let body = body_part
        .split_once("\r\n\r\n")
        .ok_or_else(|| Error::InvalidArgument("policy body part missing header/body split".into()))?
        .1
        .trim_end_matches("\r\n");

    let sig_b64 = sig_part
        .split_once("\r\n\r\n")
        .ok_or_else(|| Error::InvalidArgument("policy signature part missing header/body split".into()))?
        .1
        .trim();

    use base64::Engine;
    let signature = base64::engine::general_purpose::STANDARD
        .decode(sig_b64.replace(['\r', '\n'], ""))
        .map_err(|e| Error::InvalidArgument(format!("policy signature is not valid base64: {e}")))?;

    Ok((body, signature))
}

/// Candidate signer certificates: every certificate at index 1 and higher in
/// a PEM chain (index 0 is always the leaf, never an eligible signer).
fn signer_candidates(chain_pem: &str) -> Result<Vec<Vec<u8>>> {
    let pems = pem::parse_many(chain_pem.as_bytes())
        .map_err(|e| Error::InvalidArgument(format!("malformed realm chain pem: {e}")))?;
    if pems.len() < 2 {
        return Err(Error::InvalidArgument(
            "realm chain must contain at least a leaf and one signer certificate".into(),
        ));
    }
    Ok(pems.into_iter().skip(1).map(|p| p.contents().to_vec()).collect())
}

/// Certificate's keyUsage must be either absent or exactly `digitalSignature`.
fn key_usage_allows_signing(der: &[u8]) -> Result<bool> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| Error::InvalidArgument(format!("failed to parse signer certificate: {e}")))?;

    let Some(ext) = cert
        .get_extension_unique(&oid_registry::OID_X509_EXT_KEY_USAGE)
        .map_err(|e| Error::InvalidArgument(format!("malformed keyUsage extension: {e:?}")))?
    else {
        return Ok(true);
    };

    let ParsedExtension::KeyUsage(ku) = ext.parsed_extension() else {
        return Ok(true);
    };

    Ok(ku.digital_signature()
        && !ku.non_repudiation()
        && !ku.key_encipherment()
        && !ku.data_encipherment()
        && !ku.key_agreement()
        && !ku.key_cert_sign()
        && !ku.crl_sign()
        && !ku.encipher_only()
        && !ku.decipher_only())
}

fn verify_with_cert(der: &[u8], body: &[u8], signature: &[u8]) -> Result<bool> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| Error::InvalidArgument(format!("failed to parse signer certificate: {e}")))?;

    let spki = cert.public_key().raw;
    let ec_point = &cert.public_key().subject_public_key.data;

    let rsa = UnparsedPublicKey::new(&signature::RSA_PKCS1_2048_8192_SHA256, spki);
    if rsa.verify(body, signature).is_ok() {
        return Ok(true);
    }
    let ecdsa_fixed = UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_FIXED, ec_point.as_ref());
    if ecdsa_fixed.verify(body, signature).is_ok() {
        return Ok(true);
    }
    let ecdsa_asn1 = UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_ASN1, ec_point.as_ref());
    if ecdsa_asn1.verify(body, signature).is_ok() {
        return Ok(true);
    }
    Ok(false)
}

/// Verifies `envelope` against every eligible signer certificate in
/// `chain_pem` (index 1 and higher). Returns the verified plaintext body; the
/// envelope itself is discarded once this returns.
pub fn verify(envelope: &str, chain_pem: &str) -> Result<String> {
    let (body, signature) = split(envelope)?;
    let candidates = signer_candidates(chain_pem)?;

    for der in &candidates {
        if !key_usage_allows_signing(der)? {
            continue;
        }
        if verify_with_cert(der, body.as_bytes(), &signature)? {
            return Ok(body.to_string());
        }
    }

    Err(Error::InvalidArgument(
        "policy signature does not verify against any eligible realm chain certificate".into(),
    ))
}

/// Signs `body` with an RSA PKCS#8 private key, producing the raw signature
/// bytes `encode` expects. Used by tests to build fixtures and available to
/// any caller that owns the realm signing key directly.
pub fn sign_rsa_pkcs8(body: &str, private_key_der: &[u8]) -> Result<Vec<u8>> {
    use ring::rand::SystemRandom;
    let key_pair = signature::RsaKeyPair::from_pkcs8(private_key_der)
        .map_err(|_| Error::InvalidArgument("not a valid RSA PKCS#8 private key".into()))?;
    let rng = SystemRandom::new();
    let mut sig = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(&signature::RSA_PKCS1_SHA256, &rng, body.as_bytes(), &mut sig)
        .map_err(|_| Error::GenericFailure("RSA signing failed".into()))?;
    Ok(sig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::rand::SystemRandom;

    #[test]
    fn round_trip_encode_split() {
        let sig = vec![1u8, 2, 3, 4];
        let envelope = encode("hello\nworld", &sig);
        let (body, parsed_sig) = split(&envelope).unwrap();
        assert_eq!(body, "hello\nworld");
        assert_eq!(parsed_sig, sig);
    }

    #[test]
    fn rejects_envelope_missing_boundaries() {
        assert!(split("not an envelope at all").is_err());
    }

    /// Generates a self-signed P-256 certificate and returns `(pem, pkcs8_der)`.
    /// Keys are requested explicitly as ECDSA P-256 rather than relying on
    /// whatever algorithm `rcgen` would otherwise default to.
    fn generate_ecdsa_cert(subject_alt_name: &str) -> (String, Vec<u8>) {
        let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let params = rcgen::CertificateParams::new(vec![subject_alt_name.to_string()]).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_der())
    }

    fn signed_chain_and_envelope(body: &str) -> (String, String) {
        let (leaf_pem, _) = generate_ecdsa_cert("leaf.example");
        let (signer_pem, signer_der) = generate_ecdsa_cert("realm-ca.example");
        let chain_pem = format!("{leaf_pem}{signer_pem}");

        let rng = SystemRandom::new();
        let key_pair = signature::EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            &signer_der,
            &rng,
        )
        .unwrap();
        let sig = key_pair.sign(&rng, body.as_bytes()).unwrap();
        (chain_pem, encode(body, sig.as_ref()))
    }

    #[test]
    fn verify_accepts_signature_from_second_chain_certificate() {
        let body = "[meta]\r\nversion=1.0\r\nseqnr=1";
        let (chain_pem, envelope) = signed_chain_and_envelope(body);
        assert_eq!(verify(&envelope, &chain_pem).unwrap(), body);
    }

    #[test]
    fn verify_rejects_signature_over_tampered_body() {
        let (chain_pem, envelope) = signed_chain_and_envelope("[meta]\r\nversion=1.0\r\nseqnr=1");
        let tampered = envelope.replace("seqnr=1", "seqnr=2");
        assert!(verify(&tampered, &chain_pem).is_err());
    }

    #[test]
    fn verify_rejects_single_certificate_chain() {
        let (chain_pem, envelope) = signed_chain_and_envelope("seqnr=1");
        // Only the leaf remains -- no eligible signer in the chain at all.
        let leaf_only = chain_pem
            .split("-----END CERTIFICATE-----")
            .next()
            .map(|s| format!("{s}-----END CERTIFICATE-----\n"))
            .unwrap();
        assert!(verify(&envelope, &leaf_only).is_err());
    }
}
