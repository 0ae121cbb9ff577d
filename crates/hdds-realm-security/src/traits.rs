// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Capability traits for the core's external collaborators.
//!
//! Everything the original wired together with untyped callback pointers is
//! a trait here: the management backend, the platform's human-confirmation
//! surface, and the pub/sub transport the registration protocol rides on.

use crate::error::Result;
use crate::identity::Identity;

/// HTTP(S) management backend. CSR construction is the caller's
/// responsibility; this trait treats the CSR bytes as opaque.
pub trait ManagementClient: Send + Sync {
    /// Fetches the current policy body and its sequence number for a realm.
    fn fetch_policy(&self, realm_hex: &str) -> Result<(Vec<u8>, u64)>;

    /// Cheap liveness check used by `refresh()` -- returns the server's
    /// current sequence number without transferring the body.
    fn policy_seqnr(&self, realm_hex: &str) -> Result<u64>;

    /// Exchanges a CSR plus the one-time code and realm URL obtained via
    /// registration for a signed certificate chain (leaf first, PEM).
    fn enroll(&self, csr_der: &[u8], otp: &str, url: &str) -> Result<Vec<u8>>;
}

/// Outcome of asking a human whether to accept an incoming registration
/// credential, or which registration method to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accept,
    Reject,
}

/// Method the platform selects for retrieving registration credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMethod {
    /// Credentials are supplied directly (e.g. typed in by the user).
    Otp,
    /// Credentials arrive via a sponsoring device over the pub/sub bus.
    RemoteRegistration,
}

/// Platform integration surface: device metadata and the human-in-the-loop
/// prompts the worker suspends on.
pub trait PlatformCallbacks: Send + Sync {
    /// Stable per-device identifiers published in a registration request.
    fn device_identity(&self) -> Identity;
    fn manufacturer(&self) -> String;
    fn model_name(&self) -> String;
    fn user_friendly_name(&self) -> String;
    fn suggested_username(&self) -> String;

    /// Blocks until the user or an automated policy picks a registration
    /// method, or returns `None` if cancelled.
    fn choose_registration_method(&self) -> Option<RegistrationMethod>;

    /// Asks whether to accept realm `realm_name` reachable at `url`.
    fn confirm_registration(&self, realm_name: &str, url: &str) -> Confirmation;
}
