// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the realm security core.
//!
//! Hand-rolled enums with manual `Display`/`Error` impls, matching the rest
//! of the security stack this crate was split out of -- no `thiserror`.

use std::fmt;
use std::io;

/// General-purpose error returned by store, policy, and registration operations.
#[derive(Debug)]
pub enum Error {
    /// Caller invoked an operation that is not valid in the current state
    /// (e.g. `destruct()` on a worker that has not reached a terminal state).
    BadState,
    /// Caller-supplied argument failed validation.
    InvalidArgument(String),
    /// Allocation or buffer growth failed.
    NotEnoughMemory,
    /// A query found nothing matching.
    NoData,
    /// Operation is not supported in this build/configuration.
    Unsupported,
    /// Catch-all runtime failure with a message.
    GenericFailure(String),
    /// Filesystem or OS-level failure.
    Io(io::Error),
    /// Configuration failed validation at `build()`.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadState => write!(f, "operation not valid in current state"),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::NotEnoughMemory => write!(f, "not enough memory"),
            Error::NoData => write!(f, "no data"),
            Error::Unsupported => write!(f, "unsupported operation"),
            Error::GenericFailure(msg) => write!(f, "failure: {msg}"),
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Reason carried alongside a terminal `AuthenticationFailure` state.
///
/// Maps one-to-one onto the management-client's own error codes where one
/// exists (`InvalidOtp`, `NetworkFailure`, `SslHandshakeFailure`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Unknown,
    Cancelled,
    RemoteRegistrationTimeout,
    PlatformFailure,
    InvalidOtp,
    InternalError,
    NetworkFailure,
    SslHandshakeFailure,
    ReceivedInvalidCredentials,
    StoreFailure,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::Unknown => "unknown",
            FailureReason::Cancelled => "cancelled",
            FailureReason::RemoteRegistrationTimeout => "remote registration timeout",
            FailureReason::PlatformFailure => "platform failure",
            FailureReason::InvalidOtp => "invalid otp",
            FailureReason::InternalError => "internal error",
            FailureReason::NetworkFailure => "network failure",
            FailureReason::SslHandshakeFailure => "ssl handshake failure",
            FailureReason::ReceivedInvalidCredentials => "received invalid credentials",
            FailureReason::StoreFailure => "store failure",
        };
        write!(f, "{s}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
