// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hash-chained append-only audit log of authentication, policy, and
//! user-data events.
//!
//! Generalizes the teacher's DDS Security logging plugin (authentication,
//! access-control, and crypto events) to this crate's own event set; the
//! hash-chaining scheme (SHA-256 over the previous hash plus the new
//! payload) is carried over unchanged.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use ring::digest::{digest, SHA256};

use crate::error::{Error, FailureReason, Result};

/// One security-relevant event recorded by the audit log.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    AuthenticationTransition {
        identity: String,
        state: String,
        timestamp_unix: u64,
    },
    AuthenticationFailed {
        identity: String,
        reason: FailureReason,
        timestamp_unix: u64,
    },
    PolicyReload {
        old_seqnr: u64,
        new_seqnr: u64,
        accepted: bool,
        detail: String,
        timestamp_unix: u64,
    },
    UserDataRecomputed {
        participant: String,
        topic: String,
        deny_count: usize,
        timestamp_unix: u64,
    },
}

/// One chained log entry: the event plus the hash covering it and everything
/// before it.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub event: AuditEvent,
    pub hash: [u8; 32],
}

/// Append-only log. Entries may be written to a file opened in append mode
/// and flushed after every write, or kept purely in memory.
pub struct AuditLog {
    file: Mutex<Option<File>>,
    previous_hash: Mutex<[u8; 32]>,
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn in_memory() -> Self {
        AuditLog {
            file: Mutex::new(None),
            previous_hash: Mutex::new([0u8; 32]),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(Error::Io)?;
        Ok(AuditLog {
            file: Mutex::new(Some(file)),
            previous_hash: Mutex::new([0u8; 32]),
            entries: Mutex::new(Vec::new()),
        })
    }

    /// Appends `event`, computing its chained hash and, if a file backend is
    /// configured, writing and fsyncing a line for it.
    pub fn record(&self, event: AuditEvent) -> Result<()> {
        let line = format_event(&event);

        let mut prev = self.previous_hash.lock().unwrap_or_else(|e| e.into_inner());
        let mut input = Vec::with_capacity(32 + line.len());
        input.extend_from_slice(&*prev);
        input.extend_from_slice(line.as_bytes());
        let hash = digest(&SHA256, &input);
        let mut hash_bytes = [0u8; 32];
        hash_bytes.copy_from_slice(hash.as_ref());
        *prev = hash_bytes;
        drop(prev);

        if let Some(file) = self.file.lock().unwrap_or_else(|e| e.into_inner()).as_mut() {
            let record = format!("{hash_bytes:02x?} {line}\n");
            file.write_all(record.as_bytes()).map_err(Error::Io)?;
            file.sync_all().map_err(Error::Io)?;
        }

        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(AuditEntry { event, hash: hash_bytes });
        Ok(())
    }

    /// Snapshot of every entry recorded in-process so far (the file backend,
    /// if any, is append-only and not re-read here).
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_hash(&self) -> [u8; 32] {
        *self.previous_hash.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn format_event(event: &AuditEvent) -> String {
    match event {
        AuditEvent::AuthenticationTransition { identity, state, timestamp_unix } => {
            format!("auth_transition identity={identity} state={state} ts={timestamp_unix}")
        }
        AuditEvent::AuthenticationFailed { identity, reason, timestamp_unix } => {
            format!("auth_failed identity={identity} reason={reason} ts={timestamp_unix}")
        }
        AuditEvent::PolicyReload { old_seqnr, new_seqnr, accepted, detail, timestamp_unix } => {
            format!(
                "policy_reload old={old_seqnr} new={new_seqnr} accepted={accepted} detail={detail} ts={timestamp_unix}"
            )
        }
        AuditEvent::UserDataRecomputed { participant, topic, deny_count, timestamp_unix } => {
            format!(
                "user_data_recomputed participant={participant} topic={topic} deny_count={deny_count} ts={timestamp_unix}"
            )
        }
    }
}
