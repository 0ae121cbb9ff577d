// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Low Bandwidth Transport (LBW) for constrained links.
//!
//! This module provides an optimized HDDS<->HDDS transport for:
//! - **Throughput**: 9.6 kbps -> 2 Mbps
//! - **Latency**: 100 ms -> 2 s RTT
//! - **Loss**: 10-30% packet loss
//! - **Corruption**: End-to-end CRC protection
//!
//! # Design Goals
//!
//! - Minimal overhead vs RTPS (~3-6 bytes per record, ~6-10 bytes per frame)
//! - Selective reliability (P0 = reliable, P2 = best-effort/droppable)
//! - Transparent API (writer.write() unchanged)
//! - Batching + token bucket rate limiting
//! - Delta encoding for telemetry efficiency
//!
//! # Wire Protocol
//!
//! ```text
//! Frame = sync(0xA5) | version | flags | frame_len(varint) | session_id | frame_seq | records* | crc16?
//! Record = stream_id | rflags | msg_seq(varint) | len(varint) | payload
//! ```
//!
//! # Priority Levels
//!
//! - **P0**: Critical/reliable (commands, state sync) - immediate flush, retransmit
//! - **P1**: Important (sensor data) - batched, no retransmit
//! - **P2**: Telemetry (droppable) - batched, dropped on congestion
//!
//! # Modules
//!
//! - `varint` - ULEB128 variable-length integer encoding
//! - `crc` - CRC-16/CCITT-FALSE checksums
//! - `frame` - Frame header encoding/decoding
//! - `record` - Record encoding/decoding
//! - `control` - CONTROL stream messages (HELLO, MAP_*, ACK, etc.)

pub mod compress;
pub mod control;
pub mod crc;
pub mod delta;
pub mod fragment;
pub mod frame;
pub mod link;
pub mod mapping;
pub mod record;
pub mod reliable;
pub mod scheduler;
pub mod session;
pub mod transport;
pub mod varint;

// Re-exports
pub use compress::{
    CompressConfig, CompressError, CompressResult, CompressStats, CompressionAlgo, Compressor,
    Decompressor,
};
pub use crc::{crc16_ccitt, verify_crc16};
pub use delta::{
    DeltaConfig, DeltaDecoder, DeltaDecoderStats, DeltaEncoder, DeltaEncoderStats, DeltaError,
    DeltaRecord, StateAck,
};
pub use fragment::{
    FragError, FragHeader, Fragment, Fragmenter, Reassembler, ReassemblerConfig, ReassemblerStats,
};
pub use link::{LinkStats, LoopbackLink, LowBwLink, SimLink, SimLinkConfig, UdpLink};
pub use mapping::{MapperConfig, MapperStats, RxStreamInfo, StreamMapper, TxStreamInfo};
pub use record::Priority;
pub use reliable::{
    ReliableConfig, ReliableReceiver, ReliableReceiverStats, ReliableSender, ReliableSenderStats,
};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerStats};
pub use session::{
    NegotiatedParams, Session, SessionConfig, SessionError, SessionState, SessionStats,
};
pub use transport::{
    LowBwConfig, LowBwStats, LowBwTransport, StreamConfig, StreamHandle, TransportError,
};
pub use varint::{decode_varint, encode_varint, varint_len};
