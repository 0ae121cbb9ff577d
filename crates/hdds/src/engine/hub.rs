// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event hub for broadcasting system events to multiple subscribers
//!
//! Implements MPSC producer -> NxSPSC subscribers pattern for discovery,
//! matcher, QoS, and telemetry events.

use crate::core::rt::indexring::{IndexEntry, IndexRing};
use crate::core::rt::slabpool::SlabHandle;
use std::convert::TryFrom;
use std::sync::{Arc, Mutex};

/// Event types published by discovery, matcher, QoS, telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    OnMatch { writer_id: u32, reader_id: u32 },
    OnUnmatch { writer_id: u32, reader_id: u32 },
    OnIncompatibleQos { reason: u8 },
    SystemStall,
}

/// Event hub: MPSC producer -> NxSPSC subscribers
///
/// Publishers (discovery, matcher, QoS) call publish() to broadcast events.
/// Subscribers call subscribe() to get a dedicated SPSC ring for receiving events.
///
/// Events are encoded into IndexEntry fields:
/// - seq: event type (0=OnMatch, 1=OnUnmatch, 2=OnIncompatibleQos, 3=SystemStall)
/// - handle: upper 16 bits = writer_id/reason, lower 16 bits = reader_id
/// - len: 0 (unused for events)
/// - flags: COMMITTED
pub struct Hub {
    /// List of subscriber rings (NxSPSC)
    subscribers: Arc<Mutex<Vec<Arc<Mutex<IndexRing>>>>>,

    /// Monotonic sequence number for events (reserved for future use)
    #[allow(dead_code)]
    seq_counter: Arc<Mutex<u32>>,
}

impl Hub {
    /// Create new event hub
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            seq_counter: Arc::new(Mutex::new(0)),
        }
    }

    /// Subscribe to events (returns dedicated SPSC ring)
    ///
    /// # Arguments
    /// - `cap`: Ring capacity (power of 2, rounded up)
    ///
    /// # Returns
    /// Dedicated IndexRing for receiving events. Call ring.pop() to read events.
    ///
    /// # Performance
    /// Subscribers should pop() events frequently to avoid ring full condition.
    /// If ring is full, publish() will drop events for this subscriber (lossy).
    pub fn subscribe(&self, cap: usize) -> Arc<Mutex<IndexRing>> {
        let ring = Arc::new(Mutex::new(IndexRing::with_capacity(cap)));

        let mut subs = match self.subscribers.lock() {
            Ok(lock) => lock,
            Err(e) => {
                log::debug!("[Hub::subscribe] subscribers lock poisoned, recovering");
                e.into_inner()
            }
        };
        subs.push(ring.clone());

        ring
    }

    /// Publish event to all subscribers
    ///
    /// Broadcasts event to all subscriber rings. If a ring is full, the event is
    /// dropped for that subscriber (lossy for app, system subscribers should use
    /// large capacity to avoid drops).
    ///
    /// # Performance
    /// Target: < 1 us (broadcast to N subscribers)
    pub fn publish(&self, event: Event) {
        let subs = match self.subscribers.lock() {
            Ok(lock) => lock,
            Err(e) => {
                log::debug!("[Hub::publish] subscribers lock poisoned, recovering");
                e.into_inner()
            }
        };

        // Encode event into IndexEntry
        let entry = Self::encode_event(event);

        // Broadcast to all subscribers
        for sub_ring in subs.iter() {
            let ring = match sub_ring.lock() {
                Ok(lock) => lock,
                Err(e) => {
                    log::debug!("[Hub::publish] subscriber ring lock poisoned, recovering");
                    e.into_inner()
                }
            };
            // Try push (non-blocking, drop if full)
            let _ = ring.push(entry);
        }
    }

    /// Encode Event into IndexEntry
    ///
    /// Encoding scheme:
    /// - seq: event type (0=OnMatch, 1=OnUnmatch, 2=OnIncompatibleQos, 3=SystemStall)
    /// - handle: upper 16 bits = writer_id/reason, lower 16 bits = reader_id
    pub fn encode_event(event: Event) -> IndexEntry {
        let (seq, writer_or_reason, reader_id) = match event {
            Event::OnMatch {
                writer_id,
                reader_id,
            } => (0, writer_id, reader_id),
            Event::OnUnmatch {
                writer_id,
                reader_id,
            } => (1, writer_id, reader_id),
            Event::OnIncompatibleQos { reason } => (2, u32::from(reason), 0),
            Event::SystemStall => (3, 0, 0),
        };

        IndexEntry::new(
            seq,
            SlabHandle((writer_or_reason << 16) | reader_id),
            0, // len unused for events
        )
    }

    /// Decode IndexEntry back to Event
    ///
    /// Used by subscribers to decode events from ring.pop().
    pub fn decode_event(entry: IndexEntry) -> Event {
        let writer_or_reason = entry.handle.0 >> 16;
        let reader_id = entry.handle.0 & 0xFFFF;

        match entry.seq {
            0 => Event::OnMatch {
                writer_id: writer_or_reason,
                reader_id,
            },
            1 => Event::OnUnmatch {
                writer_id: writer_or_reason,
                reader_id,
            },
            2 => {
                let reason = match u8::try_from(writer_or_reason) {
                    Ok(value) => value,
                    Err(_) => {
                        log::debug!(
                            "[Hub::decode_event] invalid QoS reason value: {}",
                            writer_or_reason
                        );
                        u8::MAX
                    }
                };
                Event::OnIncompatibleQos { reason }
            }
            3 => Event::SystemStall,
            _ => Event::SystemStall, // Fallback for unknown types
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
