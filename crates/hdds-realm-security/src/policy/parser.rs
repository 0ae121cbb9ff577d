// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event-driven parser for the textual policy document.
//!
//! Mirrors the original line-based automaton exactly: strip all whitespace
//! from a line, skip comments and blanks, detect `[meta]`/`[tag]` section
//! markers, then dispatch each remaining line as either a coarse or a fine
//! rule depending on whether the right-hand side contains `<`.

use crate::error::{Error, Result};

/// One rule's granted operations, coarse form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoarsePerms {
    pub read: bool,
    pub write: bool,
}

/// Which side of a fine rule a `fine_grained_section` event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FineSide {
    Read,
    Write,
}

/// Receives parse events. Implemented by [`crate::policy::cache::PolicyCache`].
pub trait ParseSink {
    fn version(&mut self, version: &str) -> Result<()>;
    fn sequence_number(&mut self, seqnr: u64);
    fn participant_found(&mut self, tag: &str);
    fn coarse_grained_rule(&mut self, tag: &str, topic: &str, perms: CoarsePerms);
    fn fine_grained_section(&mut self, tag: &str, topic: &str, side: FineSide, participant: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Meta,
    Participant,
}

/// Parses `body` line by line, dispatching events to `sink`.
///
/// Topic names are normalized from the wire's `::` separator to `.`.
pub fn parse(body: &str, sink: &mut impl ParseSink) -> Result<()> {
    let mut mode = Mode::None;
    let mut current_tag = String::new();
    let mut saw_version = false;

    for raw_line in body.split(['\n']) {
        let line = strip_whitespace(raw_line.trim_end_matches('\r'));
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(tag) = bracket_tag(&line) {
            if tag == "meta" {
                mode = Mode::Meta;
            } else {
                mode = Mode::Participant;
                current_tag = tag;
                sink.participant_found(&current_tag);
            }
            continue;
        }

        let eq = line
            .find('=')
            .ok_or_else(|| Error::InvalidArgument(format!("policy line missing '=': {line}")))?;
        let (lhs, rhs) = (&line[..eq], &line[eq + 1..]);

        match mode {
            Mode::None => {
                return Err(Error::InvalidArgument(format!(
                    "policy line outside any section: {line}"
                )));
            }
            Mode::Meta => {
                match lhs {
                    "version" => {
                        if rhs != "1.0" {
                            return Err(Error::InvalidArgument(format!(
                                "unsupported policy version: {rhs}"
                            )));
                        }
                        sink.version(rhs)?;
                        saw_version = true;
                    }
                    "seqnr" => {
                        let n: u64 = rhs.parse().map_err(|_| {
                            Error::InvalidArgument(format!("bad seqnr value: {rhs}"))
                        })?;
                        sink.sequence_number(n);
                    }
                    other => {
                        return Err(Error::InvalidArgument(format!(
                            "unknown meta key: {other}"
                        )));
                    }
                }
            }
            Mode::Participant => {
                let topic = normalize_topic(lhs);
                if rhs.contains('<') {
                    parse_fine_rule(sink, &current_tag, &topic, rhs)?;
                } else {
                    let perms = CoarsePerms {
                        read: rhs.contains('r') || rhs.contains('R'),
                        write: rhs.contains('w') || rhs.contains('W'),
                    };
                    sink.coarse_grained_rule(&current_tag, &topic, perms);
                }
            }
        }
    }

    if !saw_version {
        return Err(Error::InvalidArgument(
            "policy document missing [meta] version".into(),
        ));
    }
    Ok(())
}

/// Scans only the `[meta]` block and returns `seqnr`, without emitting any
/// parse events. Used to short-circuit policy refresh.
pub fn get_sequence_number(body: &str) -> Result<u64> {
    let mut mode = Mode::None;
    for raw_line in body.split(['\n']) {
        let line = strip_whitespace(raw_line.trim_end_matches('\r'));
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(tag) = bracket_tag(&line) {
            if tag == "meta" {
                mode = Mode::Meta;
                continue;
            }
            // Any other section closes the meta block; seqnr must precede it.
            if mode == Mode::Meta {
                break;
            }
            continue;
        }
        if mode != Mode::Meta {
            continue;
        }
        if let Some(rest) = line.strip_prefix("seqnr=") {
            return rest
                .parse()
                .map_err(|_| Error::InvalidArgument(format!("bad seqnr value: {rest}")));
        }
    }
    Err(Error::NoData)
}

fn parse_fine_rule(
    sink: &mut impl ParseSink,
    tag: &str,
    topic: &str,
    rhs: &str,
) -> Result<()> {
    // `r<a;b>w<c;d>` -- either clause optional, order-independent.
    if let Some(ids) = extract_bracket(rhs, 'r') {
        for id in ids.split(';').filter(|s| !s.is_empty()) {
            sink.fine_grained_section(tag, topic, FineSide::Read, id);
        }
    }
    if let Some(ids) = extract_bracket(rhs, 'w') {
        for id in ids.split(';').filter(|s| !s.is_empty()) {
            sink.fine_grained_section(tag, topic, FineSide::Write, id);
        }
    }
    Ok(())
}

/// Finds `<marker><...>` and returns the content between the angle brackets,
/// or `None` if this rhs has no such clause.
fn extract_bracket(rhs: &str, marker: char) -> Option<&str> {
    let idx = rhs.find(marker)?;
    let after = &rhs[idx + marker.len_utf8()..];
    let open = after.strip_prefix('<')?;
    let close = open.find('>')?;
    Some(&open[..close])
}

/// Returns the content of a `[...]` line, or `None` if the line is not a
/// bracket section marker at all.
fn bracket_tag(line: &str) -> Option<String> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

fn strip_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

fn normalize_topic(topic: &str) -> String {
    topic.replace("::", ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        seqnr: Option<u64>,
        participants: Vec<String>,
        coarse: Vec<(String, String, CoarsePerms)>,
        fine: Vec<(String, String, FineSide, String)>,
    }

    impl ParseSink for Recorder {
        fn version(&mut self, _version: &str) -> Result<()> {
            Ok(())
        }
        fn sequence_number(&mut self, seqnr: u64) {
            self.seqnr = Some(seqnr);
        }
        fn participant_found(&mut self, tag: &str) {
            self.participants.push(tag.to_string());
        }
        fn coarse_grained_rule(&mut self, tag: &str, topic: &str, perms: CoarsePerms) {
            self.coarse.push((tag.to_string(), topic.to_string(), perms));
        }
        fn fine_grained_section(
            &mut self,
            tag: &str,
            topic: &str,
            side: FineSide,
            participant: &str,
        ) {
            self.fine
                .push((tag.to_string(), topic.to_string(), side, participant.to_string()));
        }
    }

    #[test]
    fn parses_meta_and_coarse_rules() {
        let body = "[meta]\nversion=1.0\nseqnr=42\n[uid:1]\ntopic1=rw\ntopic2=r\n";
        let mut rec = Recorder::default();
        parse(body, &mut rec).unwrap();
        assert_eq!(rec.seqnr, Some(42));
        assert_eq!(rec.participants, vec!["uid:1"]);
        assert_eq!(
            rec.coarse,
            vec![
                ("uid:1".into(), "topic1".into(), CoarsePerms { read: true, write: true }),
                ("uid:1".into(), "topic2".into(), CoarsePerms { read: true, write: false }),
            ]
        );
    }

    #[test]
    fn normalizes_topic_separator() {
        let body = "[meta]\nversion=1.0\nseqnr=1\n[uid:1]\norg::qeo::system::Policy=rw\n";
        let mut rec = Recorder::default();
        parse(body, &mut rec).unwrap();
        assert_eq!(rec.coarse[0].1, "org.qeo.system.Policy");
    }

    #[test]
    fn parses_fine_rule_both_sides() {
        let body = "[meta]\nversion=1.0\nseqnr=1\n[uid:1]\ntopic1=r<uid:1;uid:2>w<uid:1;uid:2>\n";
        let mut rec = Recorder::default();
        parse(body, &mut rec).unwrap();
        let mut seen: HashMap<FineSide, Vec<String>> = HashMap::new();
        for (_, _, side, p) in &rec.fine {
            seen.entry(*side).or_default().push(p.clone());
        }
        assert_eq!(seen[&FineSide::Read], vec!["uid:1", "uid:2"]);
        assert_eq!(seen[&FineSide::Write], vec!["uid:1", "uid:2"]);
    }

    #[test]
    fn fine_rule_order_independent() {
        let body = "[meta]\nversion=1.0\nseqnr=1\n[uid:1]\ntopic1=w<uid:1>r<uid:2>\n";
        let mut rec = Recorder::default();
        parse(body, &mut rec).unwrap();
        assert_eq!(rec.fine.len(), 2);
    }

    #[test]
    fn rejects_bad_version() {
        let body = "[meta]\nversion=2.0\nseqnr=1\n";
        let mut rec = Recorder::default();
        assert!(parse(body, &mut rec).is_err());
    }

    #[test]
    fn rejects_unknown_meta_key() {
        let body = "[meta]\nversion=1.0\nseqnr=1\nbogus=1\n";
        let mut rec = Recorder::default();
        assert!(parse(body, &mut rec).is_err());
    }

    #[test]
    fn whitespace_and_comments_are_ignored() {
        let body = "  [meta]  \n # a comment\nversion = 1.0\nseqnr = 7\n\n[uid:1]\ntopic1 = r w\n";
        let mut rec = Recorder::default();
        parse(body, &mut rec).unwrap();
        assert_eq!(rec.seqnr, Some(7));
        assert_eq!(rec.coarse[0].2, CoarsePerms { read: true, write: true });
    }

    #[test]
    fn sequence_number_short_circuit() {
        let body = "[meta]\nversion=1.0\nseqnr=99\n[uid:1]\ntopic1=rw\n";
        assert_eq!(get_sequence_number(body).unwrap(), 99);
    }
}
