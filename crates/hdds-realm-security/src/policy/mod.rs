// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The signed policy document: parser, canonical cache, engine lifecycle,
//! and the user-data bridge that turns cache decisions into QoS strings.
//!
//! ```text
//! engine::PolicyEngine
//! +-- smime           verify/sign the on-disk envelope
//! +-- parser          text -> cache events
//! +-- cache           canonical participant/topic/rule map
//! userdata            cache decisions -> QoS user-data octet strings
//! ```

pub mod cache;
pub mod engine;
pub mod parser;
pub mod smime;
pub mod userdata;

pub use cache::{ParticipantRef, PolicyCache, RuleMatch, SelectorMask};
pub use engine::{
    EnforcedRule, NullPolicyEnforcer, NullPolicyListener, PolicyEngine, PolicyEngineConfig,
    PolicyEnforcer, PolicyListener, TransportKind,
};
pub use userdata::{EndpointKind, PolicyDecision, UserDataBridge};
