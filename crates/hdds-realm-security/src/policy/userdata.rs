// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Translates policy cache deny decisions into the octet string published on
//! endpoint QoS user-data, and the discovery-time matcher that consumes it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::audit::{AuditEvent, AuditLog};
use crate::policy::cache::{ParticipantRef, PolicyCache, SelectorMask};

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Decision returned by an endpoint's policy-update callback for one
/// candidate counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
}

/// Which direction an endpoint looks up in the cache: a writer consults the
/// topic's *read* participants (the readers it might refuse), a reader
/// consults the *write* participants (the writers it might refuse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Writer,
    Reader,
}

/// Computes the user-data octet string for one local endpoint.
///
/// `own_user_id` is this endpoint's participant's own numeric user id.
/// `on_policy_update` is invoked once per candidate counterparty found in
/// the complementary direction's participant list; only candidates for
/// which it returns [`PolicyDecision::Deny`] are appended to the deny list.
///
/// Returns `own_id-id,id,...` (trailing comma omitted), or `own_id-` if
/// nobody is denied.
pub fn compute_user_data(
    cache: &PolicyCache,
    participant_tag: &str,
    topic: &str,
    own_user_id: u64,
    kind: EndpointKind,
    mut on_policy_update: impl FnMut(&ParticipantRef) -> PolicyDecision,
) -> String {
    let mask = match kind {
        EndpointKind::Writer => SelectorMask::READ,
        EndpointKind::Reader => SelectorMask::WRITE,
    };

    let mut denied: Vec<String> = Vec::new();
    cache.get_topic_rules(Some(participant_tag), Some(topic), mask, |m| {
        let candidates = match kind {
            EndpointKind::Writer => m.read_list,
            EndpointKind::Reader => m.write_list,
        };
        if let Some(list) = candidates {
            for candidate in list {
                if on_policy_update(candidate) == PolicyDecision::Deny {
                    if let Some(id) = candidate.user_id {
                        denied.push(format!("{id}"));
                    }
                }
            }
        }
    });

    format!("{own_user_id}-{}", denied.join(","))
}

/// Splits `own-deny,deny,...` into `(own_id, deny_list)`. Returns `None` on
/// any malformed input (missing `-`, non-numeric own id).
fn split_user_data(userdata: &str) -> Option<(&str, &str)> {
    let dash = userdata.find('-')?;
    Some((&userdata[..dash], &userdata[dash + 1..]))
}

fn contains_id(deny_list: &str, id: &str) -> bool {
    deny_list.split(',').any(|entry| entry == id)
}

/// The discovery-time matching predicate: grants access iff neither side's
/// own id appears in the other side's deny list. Malformed user-data on
/// either side denies by default.
pub fn user_data_match(reader_userdata: &str, writer_userdata: &str) -> bool {
    let Some((r_own, r_deny)) = split_user_data(reader_userdata) else {
        return false;
    };
    let Some((w_own, w_deny)) = split_user_data(writer_userdata) else {
        return false;
    };

    if contains_id(r_deny, w_own) {
        return false;
    }
    if contains_id(w_deny, r_own) {
        return false;
    }
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EndpointKey {
    participant_tag: String,
    topic: String,
    kind: EndpointKind,
}

/// Remembers the last user-data string published for each local endpoint and
/// only returns a new one when the recomputed value actually differs --
/// the change-detection [`compute_user_data`] itself does not do, so policy
/// updates that don't affect a given endpoint's deny list never trigger a
/// QoS republish for it.
pub struct UserDataBridge {
    last: Mutex<HashMap<EndpointKey, String>>,
    audit: Arc<AuditLog>,
}

impl UserDataBridge {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        UserDataBridge { last: Mutex::new(HashMap::new()), audit }
    }

    /// Recomputes the user-data string for one endpoint; returns `Some` only
    /// when it differs from the value last returned for this exact endpoint.
    /// A change is also recorded to the audit log as [`AuditEvent::UserDataRecomputed`].
    pub fn recompute(
        &self,
        cache: &PolicyCache,
        participant_tag: &str,
        topic: &str,
        own_user_id: u64,
        kind: EndpointKind,
        on_policy_update: impl FnMut(&ParticipantRef) -> PolicyDecision,
    ) -> Option<String> {
        let computed =
            compute_user_data(cache, participant_tag, topic, own_user_id, kind, on_policy_update);
        let key = EndpointKey {
            participant_tag: participant_tag.to_string(),
            topic: topic.to_string(),
            kind,
        };

        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if last.get(&key) == Some(&computed) {
            return None;
        }
        last.insert(key, computed.clone());
        drop(last);

        let deny_count = split_user_data(&computed)
            .map(|(_, deny)| if deny.is_empty() { 0 } else { deny.split(',').count() })
            .unwrap_or(0);
        let _ = self.audit.record(AuditEvent::UserDataRecomputed {
            participant: participant_tag.to_string(),
            topic: topic.to_string(),
            deny_count,
            timestamp_unix: now_unix(),
        });

        Some(computed)
    }

    /// Drops any cached value for an endpoint that is being disposed, so a
    /// later endpoint reusing the same (participant, topic, kind) key does
    /// not see a stale "unchanged" result.
    pub fn forget(&self, participant_tag: &str, topic: &str, kind: EndpointKind) {
        let key = EndpointKey {
            participant_tag: participant_tag.to_string(),
            topic: topic.to_string(),
            kind,
        };
        self.last.lock().unwrap_or_else(|e| e.into_inner()).remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_user_data_matcher() {
        assert!(!user_data_match("20-", "10-20"));
        assert!(!user_data_match("20-10", "10-"));
        assert!(user_data_match("20-", "10-"));
    }

    #[test]
    fn matcher_is_symmetric() {
        let cases = [("20-", "10-20"), ("20-10", "10-"), ("20-", "10-")];
        for (r, w) in cases {
            assert_eq!(user_data_match(r, w), user_data_match(w, r));
        }
    }

    #[test]
    fn malformed_userdata_denies() {
        assert!(!user_data_match("nodash", "10-"));
        assert!(!user_data_match("10-", "nodash"));
    }

    #[test]
    fn empty_deny_list_allows() {
        assert!(user_data_match("1-", "2-"));
    }

    fn cache_with_fine_rule(read_ids: &str) -> PolicyCache {
        let body = format!("[meta]\nversion=1.0\nseqnr=1\n[uid:20]\ntopic1=r<{read_ids}>\n");
        let mut cache = PolicyCache::new();
        crate::policy::parser::parse(&body, &mut cache).unwrap();
        cache.finalize();
        cache
    }

    #[test]
    fn bridge_returns_none_when_recomputed_value_is_unchanged() {
        let cache = cache_with_fine_rule("uid:10");
        let bridge = UserDataBridge::new(std::sync::Arc::new(crate::audit::AuditLog::in_memory()));

        let first = bridge.recompute(&cache, "uid:20", "topic1", 20, EndpointKind::Writer, |_| {
            PolicyDecision::Deny
        });
        assert_eq!(first.as_deref(), Some("20-10"));

        let second = bridge.recompute(&cache, "uid:20", "topic1", 20, EndpointKind::Writer, |_| {
            PolicyDecision::Deny
        });
        assert_eq!(second, None);
    }

    #[test]
    fn bridge_returns_some_when_recomputed_value_changes() {
        let cache = cache_with_fine_rule("uid:10");
        let bridge = UserDataBridge::new(std::sync::Arc::new(crate::audit::AuditLog::in_memory()));

        bridge.recompute(&cache, "uid:20", "topic1", 20, EndpointKind::Writer, |_| {
            PolicyDecision::Deny
        });
        let changed = bridge.recompute(&cache, "uid:20", "topic1", 20, EndpointKind::Writer, |_| {
            PolicyDecision::Allow
        });
        assert_eq!(changed.as_deref(), Some("20-"));
    }

    #[test]
    fn forget_clears_cached_value_for_the_endpoint() {
        let cache = cache_with_fine_rule("uid:10");
        let bridge = UserDataBridge::new(std::sync::Arc::new(crate::audit::AuditLog::in_memory()));

        bridge.recompute(&cache, "uid:20", "topic1", 20, EndpointKind::Writer, |_| {
            PolicyDecision::Deny
        });
        bridge.forget("uid:20", "topic1", EndpointKind::Writer);
        let after_forget = bridge.recompute(&cache, "uid:20", "topic1", 20, EndpointKind::Writer, |_| {
            PolicyDecision::Deny
        });
        assert_eq!(after_forget.as_deref(), Some("20-10"));
    }
}
