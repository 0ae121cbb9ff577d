// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Realm security core for HDDS
//!
//! Turns an unregistered device into an authenticated participant in a
//! "realm", brokers the encrypted remote-registration handshake that lets
//! one already-registered device sponsor another, and evaluates a
//! signed policy document into per-participant per-topic access decisions.
//!
//! # Architecture
//!
//! ```text
//! SecurityCore (core::worker)
//! +-- CredentialStore       (store)            persisted (key, chain) pairs
//! +-- RemoteRegistration    (registration)      OTP-over-pubsub handshake
//! +-- PolicyEngine          (policy::engine)    fetch/verify/enforce/publish
//!     +-- PolicyCache       (policy::cache)     participant/topic/rule map
//!     +-- parser            (policy::parser)    text -> cache events
//!     +-- user-data bridge  (policy::userdata)  deny-list QoS strings
//! +-- AuditLog              (audit)             hash-chained event log
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hdds_realm_security::config::SecurityCoreConfig;
//!
//! let cfg = SecurityCoreConfig::builder()
//!     .credential_store_dir("/var/lib/hdds/creds")
//!     .policy_store_dir("/var/lib/hdds/policy")
//!     .build()?;
//! # Ok::<(), hdds_realm_security::error::Error>(())
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod policy;
pub mod registration;
pub mod store;
pub mod traits;

pub use audit::{AuditEvent, AuditLog};
pub use config::{SecurityCoreConfig, SecurityCoreConfigBuilder};
pub use core::state::{SecurityState, StateListener, StopReason};
pub use core::worker::SecurityCore;
pub use error::{Error, FailureReason, Result};
pub use identity::Identity;
pub use policy::engine::{
    EnforcedRule, NullPolicyEnforcer, NullPolicyListener, PolicyEngine, PolicyEngineConfig,
    PolicyEnforcer, PolicyListener, TransportKind,
};
pub use policy::userdata::UserDataBridge;
pub use store::{ChainInfo, CredentialStore, Credentials};
pub use traits::{Confirmation, ManagementClient, PlatformCallbacks, RegistrationMethod};
