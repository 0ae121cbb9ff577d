// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Remote registration: publishes a request for a sponsor to pick up,
//! receives an encrypted one-time code in return, and mediates the human
//! confirmation loop before handing decrypted credentials back to the
//! security core.

pub mod crypto;
pub mod protocol;

pub use protocol::{RegistrationCredentials, RegistrationRequest, RemoteRegistration, Status};
