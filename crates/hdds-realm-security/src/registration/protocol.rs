// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The publish/receive state of one remote-registration attempt.
//!
//! Transport-agnostic by design: the pub/sub layer calls [`RemoteRegistration::current_request`]
//! whenever it needs the instance to (re)publish, and calls
//! [`RemoteRegistration::on_credentials_sample`] whenever a `RegistrationCredentials`
//! sample arrives for our device id. Everything else -- timers, confirmation
//! prompts -- is driven by the security core worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use zeroize::Zeroizing;

use crate::error::FailureReason;
use crate::registration::crypto::RegistrationKeypair;

/// Mirrors the request instance's `registrationStatus` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unregistered,
    Registering,
}

/// The published `RegistrationRequest` instance, keyed by device id.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub device_id: u64,
    pub manufacturer: String,
    pub model_name: String,
    pub user_friendly_name: String,
    pub user_name: String,
    pub rsa_public_key_pem: String,
    pub status: Status,
    pub failure_reason: Option<FailureReason>,
}

/// A received `RegistrationCredentials` sample.
#[derive(Debug, Clone)]
pub struct RegistrationCredentials {
    pub device_id: u64,
    pub realm_name: String,
    pub url: String,
    pub encrypted_otc: Vec<u8>,
    /// Echo of the public key the sponsor says it encrypted against; must
    /// match our published key exactly or the sample is not for us.
    pub request_rsa_public_key: String,
}

/// Decrypted payload handed to the security core once a credentials sample
/// has been accepted and confirmed.
pub struct DecryptedCredentials {
    pub realm_name: String,
    pub url: String,
    pub otp: Zeroizing<String>,
}

/// One remote-registration attempt: shares the per-attempt RSA keypair with
/// the security core (the same keypair is later used as the subject of the
/// CSR sent to the management client) and owns the `reg_cred_in_use` latch
/// that keeps a second, unconfirmed credentials sample from clobbering one
/// the user is already being asked about.
pub struct RemoteRegistration {
    keypair: Arc<RegistrationKeypair>,
    request: Mutex<RegistrationRequest>,
    reg_cred_in_use: AtomicBool,
}

impl RemoteRegistration {
    /// Builds the attempt and its request instance around an
    /// already-generated `keypair`. Does not publish anything by itself --
    /// call [`RemoteRegistration::current_request`] and hand it to the
    /// transport.
    pub fn new(
        keypair: Arc<RegistrationKeypair>,
        device_id: u64,
        manufacturer: String,
        model_name: String,
        user_friendly_name: String,
        user_name: String,
    ) -> crate::error::Result<Self> {
        let rsa_public_key_pem = keypair.public_key_pem()?;
        Ok(RemoteRegistration {
            keypair,
            request: Mutex::new(RegistrationRequest {
                device_id,
                manufacturer,
                model_name,
                user_friendly_name,
                user_name,
                rsa_public_key_pem,
                status: Status::Unregistered,
                failure_reason: None,
            }),
            reg_cred_in_use: AtomicBool::new(false),
        })
    }

    /// Snapshot of the instance as it should currently be published.
    pub fn current_request(&self) -> RegistrationRequest {
        self.request.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_status(&self, status: Status, reason: Option<FailureReason>) {
        let mut req = self.request.lock().unwrap_or_else(|e| e.into_inner());
        req.status = status;
        req.failure_reason = reason;
    }

    pub fn mark_registering(&self) {
        self.set_status(Status::Registering, None);
    }

    pub fn mark_unregistered(&self, reason: Option<FailureReason>) {
        self.set_status(Status::Unregistered, reason);
    }

    /// Called by the transport layer when a `RegistrationCredentials` sample
    /// arrives. Returns `Some` only when the sample is ours, no confirmation
    /// is already pending, and decryption succeeds; otherwise logs and
    /// returns `None` so the caller keeps waiting.
    pub fn on_credentials_sample(
        &self,
        sample: &RegistrationCredentials,
    ) -> Option<DecryptedCredentials> {
        let our_device_id = self.request.lock().unwrap_or_else(|e| e.into_inner()).device_id;
        if sample.device_id != our_device_id {
            log::debug!("registration credentials sample not for our device id, ignoring");
            return None;
        }

        let our_pem = self
            .request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .rsa_public_key_pem
            .clone();
        if sample.request_rsa_public_key != our_pem {
            log::debug!("registration credentials sample echoes a different public key, ignoring");
            return None;
        }

        if self.reg_cred_in_use.swap(true, Ordering::SeqCst) {
            log::info!(
                "ignoring registration credentials for realm '{}': a previous sample is still awaiting confirmation",
                sample.realm_name
            );
            return None;
        }

        match self.keypair.decrypt_otc(&sample.encrypted_otc) {
            Ok(otp) => Some(DecryptedCredentials {
                realm_name: sample.realm_name.clone(),
                url: sample.url.clone(),
                otp,
            }),
            Err(e) => {
                log::warn!("failed to decrypt registration one-time code: {e}");
                self.reg_cred_in_use.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    /// Releases the `reg_cred_in_use` latch after a negative confirmation,
    /// allowing the next sample through.
    pub fn release_pending_credentials(&self) {
        self.reg_cred_in_use.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::crypto::{encrypt_otc, parse_public_key_pem};

    fn sample_for(reg: &RemoteRegistration, otc: &str) -> RegistrationCredentials {
        let pem = reg.current_request().rsa_public_key_pem;
        let public = parse_public_key_pem(&pem).unwrap();
        let encrypted_otc = encrypt_otc(&public, otc).unwrap();
        RegistrationCredentials {
            device_id: reg.current_request().device_id,
            realm_name: "example-realm".into(),
            url: "https://realm.example".into(),
            encrypted_otc,
            request_rsa_public_key: pem,
        }
    }

    fn new_attempt() -> RemoteRegistration {
        let keypair = Arc::new(RegistrationKeypair::generate().unwrap());
        RemoteRegistration::new(
            keypair,
            42,
            "Acme".into(),
            "Widget".into(),
            "My Widget".into(),
            "alice".into(),
        )
        .unwrap()
    }

    #[test]
    fn s6_happy_path_decrypts_otp_and_url() {
        let reg = new_attempt();
        let sample = sample_for(&reg, "abc123");
        let decrypted = reg.on_credentials_sample(&sample).unwrap();
        assert_eq!(decrypted.otp.as_str(), "abc123");
        assert_eq!(decrypted.url, "https://realm.example");
        assert_eq!(decrypted.realm_name, "example-realm");
    }

    #[test]
    fn wrong_device_id_is_ignored() {
        let reg = new_attempt();
        let mut sample = sample_for(&reg, "abc123");
        sample.device_id = 99;
        assert!(reg.on_credentials_sample(&sample).is_none());
    }

    #[test]
    fn mismatched_echoed_key_is_ignored() {
        let reg = new_attempt();
        let mut sample = sample_for(&reg, "abc123");
        sample.request_rsa_public_key = "not a real pem".into();
        assert!(reg.on_credentials_sample(&sample).is_none());
    }

    #[test]
    fn second_sample_is_dropped_while_one_is_pending() {
        let reg = new_attempt();
        let first = sample_for(&reg, "abc123");
        let second = sample_for(&reg, "zzz999");
        assert!(reg.on_credentials_sample(&first).is_some());
        assert!(reg.on_credentials_sample(&second).is_none());

        reg.release_pending_credentials();
        assert!(reg.on_credentials_sample(&second).is_some());
    }
}
