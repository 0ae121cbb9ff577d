// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Realm identity triple and its printable friendly-name encoding.

use std::fmt;

use crate::error::{Error, Result};

/// `(realm_id, device_id, user_id)` together with the realm URL and the
/// printable friendly name derived from the triple.
///
/// Setting both `realm_id` and `user_id` to zero signals "force a new
/// registration" to the security core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub realm_id: u64,
    pub device_id: u64,
    pub user_id: u64,
    pub url: Option<String>,
}

impl Identity {
    pub fn new(realm_id: u64, device_id: u64, user_id: u64) -> Self {
        Self {
            realm_id,
            device_id,
            user_id,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `<rid:hex><did:hex><uid:hex>`, lowercase, no separators between groups.
    pub fn friendly_name(&self) -> String {
        format_friendly_name(self.realm_id, self.device_id, self.user_id)
    }

    /// Parses a friendly name produced by [`Identity::friendly_name`].
    pub fn parse_friendly_name(s: &str) -> Result<(u64, u64, u64)> {
        parse_friendly_name(s)
    }
}

/// `<rid:%PRIx64><did:%PRIx64><uid:%PRIx64>`, exactly.
pub fn format_friendly_name(realm_id: u64, device_id: u64, user_id: u64) -> String {
    format!("<rid:{realm_id:x}><did:{device_id:x}><uid:{user_id:x}>")
}

/// Strict inverse of [`format_friendly_name`]. Rejects anything that does not
/// match the exact bracket/tag layout -- a leaf certificate's subject CN must
/// round-trip through this parser for the chain to be considered ours.
pub fn parse_friendly_name(s: &str) -> Result<(u64, u64, u64)> {
    let rid = extract_tag(s, "rid")?;
    let did = extract_tag(s, "did")?;
    let uid = extract_tag(s, "uid")?;
    Ok((rid, did, uid))
}

fn extract_tag(s: &str, tag: &str) -> Result<u64> {
    let needle = format!("<{tag}:");
    let start = s
        .find(&needle)
        .ok_or_else(|| Error::InvalidArgument(format!("friendly name missing <{tag}:...> tag")))?
        + needle.len();
    let rest = &s[start..];
    let end = rest
        .find('>')
        .ok_or_else(|| Error::InvalidArgument(format!("friendly name <{tag}:...> not closed")))?;
    u64::from_str_radix(&rest[..end], 16)
        .map_err(|e| Error::InvalidArgument(format!("bad hex in <{tag}:...>: {e}")))
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.friendly_name())
    }
}
