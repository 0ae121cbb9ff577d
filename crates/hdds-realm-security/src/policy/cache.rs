// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory canonical representation of one policy generation.
//!
//! Participants, topics, and rules are built incrementally while the parser
//! walks the document, then [`PolicyCache::finalize`] runs the three
//! canonicalization passes (topic promotion, topic re-sort, rule
//! completion) before any query is trusted.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::policy::parser::{CoarsePerms, FineSide, ParseSink};

/// A topic name plus whether it is still coarse-grained.
///
/// `coarse_grained` only ever transitions `true -> false`, both during parse
/// (a fine rule for the same name flips it) and during [`PolicyCache::finalize`]
/// (wildcard promotion flips it for matching shorter topics).
#[derive(Debug)]
struct TopicNode {
    name: String,
    coarse_grained: Cell<bool>,
}

/// Wraps an `Rc<TopicNode>` so rule maps can be keyed on pointer identity
/// rather than name -- two topics with the same name never arise (the cache
/// interns by name), but keying on the pointer is what the finalize
/// algorithm is actually defined in terms of.
#[derive(Clone)]
struct TopicKey(Rc<TopicNode>);

impl PartialEq for TopicKey {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for TopicKey {}
impl Hash for TopicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

/// A participant specifier as it appears inside a fine rule's read/write
/// list: the raw tag plus, for `uid:` tags only, the parsed numeric id.
/// `rid:` tags are deliberately left with `user_id = None` -- they are
/// never meant to be resolved to a bare user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRef {
    pub tag: String,
    pub user_id: Option<u64>,
}

impl ParticipantRef {
    fn new(tag: &str) -> Self {
        ParticipantRef {
            tag: tag.to_string(),
            user_id: parse_uid(tag),
        }
    }
}

fn parse_uid(tag: &str) -> Option<u64> {
    tag.strip_prefix("uid:")
        .and_then(|hex| u64::from_str_radix(hex, 16).ok())
}

#[derive(Debug, Clone)]
enum RuleVariant {
    Coarse { read: bool, write: bool },
    Fine {
        read_list: Vec<ParticipantRef>,
        write_list: Vec<ParticipantRef>,
    },
}

#[derive(Debug, Clone)]
struct RuleEntry {
    topic: Rc<TopicNode>,
    variant: RuleVariant,
}

struct ParticipantDesc {
    tag: String,
    rules: HashMap<usize, RuleEntry>,
}

/// Bitmask of which operations a query is interested in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorMask {
    pub read: bool,
    pub write: bool,
}

impl SelectorMask {
    pub const BOTH: SelectorMask = SelectorMask { read: true, write: true };
    pub const READ: SelectorMask = SelectorMask { read: true, write: false };
    pub const WRITE: SelectorMask = SelectorMask { read: false, write: true };

    fn is_empty(self) -> bool {
        !self.read && !self.write
    }
}

/// One resolved (participant, topic) rule handed to a [`PolicyCache::get_topic_rules`] callback.
#[derive(Debug)]
pub struct RuleMatch<'a> {
    pub participant: &'a str,
    pub topic: &'a str,
    pub coarse_grained: bool,
    pub granted: SelectorMask,
    pub read_list: Option<&'a [ParticipantRef]>,
    pub write_list: Option<&'a [ParticipantRef]>,
}

/// Canonical in-memory form of one policy generation.
pub struct PolicyCache {
    seqnr: u64,
    topics: Vec<Rc<TopicNode>>,
    topics_by_name: HashMap<String, Rc<TopicNode>>,
    participants: Vec<ParticipantDesc>,
    participant_index: HashMap<String, usize>,
    finalized: bool,
}

impl Default for PolicyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyCache {
    pub fn new() -> Self {
        PolicyCache {
            seqnr: 0,
            topics: Vec::new(),
            topics_by_name: HashMap::new(),
            participants: Vec::new(),
            participant_index: HashMap::new(),
            finalized: false,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        self.seqnr
    }

    /// Drops every participant/topic/rule allocation. Used when a new policy
    /// supersedes the previous one.
    pub fn reset(&mut self) {
        *self = PolicyCache::new();
    }

    fn get_or_create_topic(&mut self, name: &str) -> Rc<TopicNode> {
        if let Some(existing) = self.topics_by_name.get(name) {
            return existing.clone();
        }
        let node = Rc::new(TopicNode {
            name: name.to_string(),
            coarse_grained: Cell::new(true),
        });
        self.topics_by_name.insert(name.to_string(), node.clone());
        self.topics.push(node.clone());
        node
    }

    fn participant_mut(&mut self, tag: &str) -> &mut ParticipantDesc {
        if !self.participant_index.contains_key(tag) {
            self.add_participant_tag(tag);
        }
        let idx = self.participant_index[tag];
        &mut self.participants[idx]
    }

    /// Allocates a participant descriptor if `tag` has not been seen yet.
    /// Duplicate tags within one policy are a caller error.
    fn add_participant_tag(&mut self, tag: &str) {
        if self.participant_index.contains_key(tag) {
            debug_assert!(false, "duplicate participant tag in one policy: {tag}");
            log::warn!("duplicate participant tag in policy, ignoring: {tag}");
            return;
        }
        self.participant_index
            .insert(tag.to_string(), self.participants.len());
        self.participants.push(ParticipantDesc {
            tag: tag.to_string(),
            rules: HashMap::new(),
        });
    }

    /// All participant tags currently known to the cache, used when
    /// converting a coarse rule to fine during finalize (the promoted rule's
    /// lists contain every participant in the cache).
    fn all_participant_refs(&self) -> Vec<ParticipantRef> {
        self.participants
            .iter()
            .map(|p| ParticipantRef::new(&p.tag))
            .collect()
    }

    /// `finalize()`'s three ordered passes. See module docs and
    /// `SPEC_FULL.md` §4.3 for the full algorithm.
    pub fn finalize(&mut self) {
        // Pass 1: topic promotion, ascending by (len, name) -- least-specific
        // first. For each fine-grained wildcard topic, walk forward from its
        // own position (inclusive) through the rest of this ascending list,
        // promoting every still-coarse topic whose name starts with the
        // wildcard's prefix. Topics appear in ascending order so "forward"
        // means longer-or-equal names, never shorter ones.
        let mut order: Vec<usize> = (0..self.topics.len()).collect();
        order.sort_by(|&a, &b| {
            let ta = &self.topics[a];
            let tb = &self.topics[b];
            ta.name.len().cmp(&tb.name.len()).then_with(|| ta.name.cmp(&tb.name))
        });
        for (pos, &i) in order.iter().enumerate() {
            let topic = &self.topics[i];
            if topic.coarse_grained.get() {
                continue;
            }
            let Some(star) = topic.name.find('*') else {
                continue;
            };
            let prefix = topic.name[..star].to_string();
            for &j in &order[pos..] {
                let candidate = &self.topics[j];
                if candidate.coarse_grained.get() && candidate.name.starts_with(&prefix) {
                    candidate.coarse_grained.set(false);
                }
            }
        }

        // Pass 2: re-sort ascending by (len, name).
        self.topics.sort_by(|a, b| {
            a.name.len().cmp(&b.name.len()).then_with(|| a.name.cmp(&b.name))
        });

        // Pass 3: rule completion.
        let all_tags = self.all_participant_refs();
        let topics_snapshot = self.topics.clone();
        for p_idx in 0..self.participants.len() {
            for topic in &topics_snapshot {
                self.complete_rule_for(p_idx, topic, &all_tags);
            }
        }

        self.finalized = true;
    }

    fn complete_rule_for(&mut self, p_idx: usize, topic: &Rc<TopicNode>, all_tags: &[ParticipantRef]) {
        let topic_ptr = Rc::as_ptr(topic) as usize;

        let has_exact = self.participants[p_idx].rules.contains_key(&topic_ptr);
        if !has_exact {
            // Wildcard search: the longest wildcard-prefix match among this
            // participant's own rules wins.
            let mut best: Option<(usize, usize)> = None; // (prefix_len, rule key)
            for (&key, rule) in &self.participants[p_idx].rules {
                let Some(star) = rule.topic.name.find('*') else {
                    continue;
                };
                let prefix = &rule.topic.name[..star];
                if topic.name.starts_with(prefix) {
                    let better = best.map(|(len, _)| prefix.len() > len).unwrap_or(true);
                    if better {
                        best = Some((prefix.len(), key));
                    }
                }
            }
            if let Some((_, key)) = best {
                let cloned_variant = self.participants[p_idx].rules[&key].variant.clone();
                self.participants[p_idx].rules.insert(
                    topic_ptr,
                    RuleEntry {
                        topic: topic.clone(),
                        variant: cloned_variant,
                    },
                );
            }
        }

        // Coarse -> fine conversion once the topic itself has been promoted.
        if !topic.coarse_grained.get() {
            if let Some(entry) = self.participants[p_idx].rules.get_mut(&topic_ptr) {
                if let RuleVariant::Coarse { read, write } = entry.variant {
                    entry.variant = RuleVariant::Fine {
                        read_list: if read { all_tags.to_vec() } else { Vec::new() },
                        write_list: if write { all_tags.to_vec() } else { Vec::new() },
                    };
                }
            }
        }
    }

    /// Enumerates participant tags.
    pub fn get_participants(&self, mut cb: impl FnMut(&str)) {
        for p in &self.participants {
            cb(&p.tag);
        }
    }

    /// Iterates matching (participant, topic, selector) triples.
    ///
    /// When `topic` is `None`, every cached topic the participant has a rule
    /// for is visited. When `topic` is `Some` and not present in the cache
    /// (e.g. a query made before the next generation's parse completed), an
    /// ephemeral lookup performs the same wildcard matching against each
    /// participant's existing rules without mutating the cache.
    pub fn get_topic_rules(
        &self,
        participant: Option<&str>,
        topic: Option<&str>,
        mask: SelectorMask,
        mut cb: impl FnMut(RuleMatch),
    ) {
        if mask.is_empty() {
            return;
        }
        let indices: Vec<usize> = match participant {
            Some(tag) => self.participant_index.get(tag).copied().into_iter().collect(),
            None => (0..self.participants.len()).collect(),
        };

        for idx in indices {
            let p = &self.participants[idx];
            match topic {
                Some(name) => {
                    if let Some(rule) = self.resolve_query(p, name) {
                        self.emit(&p.tag, name, rule, mask, &mut cb);
                    }
                }
                None => {
                    for rule in p.rules.values() {
                        self.emit(&p.tag, &rule.topic.name, rule, mask, &mut cb);
                    }
                }
            }
        }
    }

    /// Resolves a rule for `topic_name` against a participant's already
    /// finalized rule map, without requiring `topic_name` to be a cached
    /// topic.
    fn resolve_query<'a>(&'a self, p: &'a ParticipantDesc, topic_name: &str) -> Option<&'a RuleEntry> {
        if let Some(topic) = self.topics_by_name.get(topic_name) {
            let key = Rc::as_ptr(topic) as usize;
            if let Some(rule) = p.rules.get(&key) {
                return Some(rule);
            }
        }
        let mut best: Option<(usize, &RuleEntry)> = None;
        for rule in p.rules.values() {
            let Some(star) = rule.topic.name.find('*') else {
                continue;
            };
            let prefix = &rule.topic.name[..star];
            if topic_name.starts_with(prefix) {
                let better = best.map(|(len, _)| prefix.len() > len).unwrap_or(true);
                if better {
                    best = Some((prefix.len(), rule));
                }
            }
        }
        best.map(|(_, rule)| rule)
    }

    fn emit<'a>(
        &'a self,
        participant: &'a str,
        topic_name: &'a str,
        rule: &'a RuleEntry,
        mask: SelectorMask,
        cb: &mut impl FnMut(RuleMatch<'a>),
    ) {
        match &rule.variant {
            RuleVariant::Coarse { read, write } => {
                let granted = SelectorMask {
                    read: mask.read && *read,
                    write: mask.write && *write,
                };
                if granted.is_empty() {
                    return;
                }
                cb(RuleMatch {
                    participant,
                    topic: topic_name,
                    coarse_grained: true,
                    granted,
                    read_list: None,
                    write_list: None,
                });
            }
            RuleVariant::Fine { read_list, write_list } => {
                cb(RuleMatch {
                    participant,
                    topic: topic_name,
                    coarse_grained: false,
                    granted: mask,
                    read_list: mask.read.then_some(read_list.as_slice()),
                    write_list: mask.write.then_some(write_list.as_slice()),
                });
            }
        }
    }
}

impl ParseSink for PolicyCache {
    fn version(&mut self, _version: &str) -> crate::error::Result<()> {
        Ok(())
    }

    fn sequence_number(&mut self, seqnr: u64) {
        self.seqnr = seqnr;
    }

    fn participant_found(&mut self, tag: &str) {
        self.add_participant_tag(tag);
    }

    fn coarse_grained_rule(&mut self, tag: &str, topic_name: &str, perms: CoarsePerms) {
        let topic = self.get_or_create_topic(topic_name);
        let key = Rc::as_ptr(&topic) as usize;
        let participant = self.participant_mut(tag);
        participant
            .rules
            .entry(key)
            .and_modify(|entry| {
                if let RuleVariant::Coarse { read, write } = &mut entry.variant {
                    *read |= perms.read;
                    *write |= perms.write;
                }
            })
            .or_insert(RuleEntry {
                topic,
                variant: RuleVariant::Coarse {
                    read: perms.read,
                    write: perms.write,
                },
            });
    }

    fn fine_grained_section(&mut self, tag: &str, topic_name: &str, side: FineSide, participant_spec: &str) {
        let topic = self.get_or_create_topic(topic_name);
        topic.coarse_grained.set(false);
        let key = Rc::as_ptr(&topic) as usize;
        let participant = self.participant_mut(tag);
        let entry = participant.rules.entry(key).or_insert_with(|| RuleEntry {
            topic: topic.clone(),
            variant: RuleVariant::Fine {
                read_list: Vec::new(),
                write_list: Vec::new(),
            },
        });
        if matches!(entry.variant, RuleVariant::Coarse { .. }) {
            entry.variant = RuleVariant::Fine {
                read_list: Vec::new(),
                write_list: Vec::new(),
            };
        }
        if let RuleVariant::Fine { read_list, write_list } = &mut entry.variant {
            match side {
                FineSide::Read => read_list.push(ParticipantRef::new(participant_spec)),
                FineSide::Write => write_list.push(ParticipantRef::new(participant_spec)),
            }
        }
    }
}
