// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration for the realm security core.
//!
//! Follows the builder pattern used by the security module this crate grew
//! out of: fluent setters that return `Self`, validation deferred entirely
//! to [`SecurityCoreConfigBuilder::build`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Validated configuration for a [`crate::core::SecurityCore`] instance.
///
/// # Example
///
/// ```no_run
/// use hdds_realm_security::config::SecurityCoreConfig;
///
/// let cfg = SecurityCoreConfig::builder()
///     .credential_store_dir("/var/lib/hdds/creds")
///     .policy_store_dir("/var/lib/hdds/policy")
///     .build()?;
/// # Ok::<(), hdds_realm_security::error::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SecurityCoreConfig {
    pub credential_store_dir: PathBuf,
    pub policy_store_dir: PathBuf,
    pub realm_hint: Option<u64>,
    pub registration_lock_path: PathBuf,
    pub policy_poll_interval: Duration,
    pub audit_log_path: Option<PathBuf>,
    pub management_retry_backoff: Duration,
    pub management_retry_max_backoff: Duration,
}

impl SecurityCoreConfig {
    pub fn builder() -> SecurityCoreConfigBuilder {
        SecurityCoreConfigBuilder::default()
    }
}

/// Builder for [`SecurityCoreConfig`].
///
/// # Errors
///
/// [`build`](Self::build) fails with [`Error::Config`] if a required
/// directory is missing and cannot be created, or if `credential_store_dir`
/// was never set.
#[derive(Debug, Default)]
pub struct SecurityCoreConfigBuilder {
    credential_store_dir: Option<PathBuf>,
    policy_store_dir: Option<PathBuf>,
    realm_hint: Option<u64>,
    registration_lock_path: Option<PathBuf>,
    policy_poll_interval: Option<Duration>,
    audit_log_path: Option<PathBuf>,
    management_retry_backoff: Option<Duration>,
    management_retry_max_backoff: Option<Duration>,
}

impl SecurityCoreConfigBuilder {
    pub fn credential_store_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.credential_store_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn policy_store_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.policy_store_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Pre-known realm id, skipping the "zero or one stored realm" ambiguity
    /// check when more than one credential happens to be present.
    pub fn realm_hint(mut self, realm_id: u64) -> Self {
        self.realm_hint = Some(realm_id);
        self
    }

    pub fn registration_lock_path(mut self, path: impl AsRef<Path>) -> Self {
        self.registration_lock_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn policy_poll_interval(mut self, interval: Duration) -> Self {
        self.policy_poll_interval = Some(interval);
        self
    }

    pub fn audit_log_path(mut self, path: impl AsRef<Path>) -> Self {
        self.audit_log_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn management_retry_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.management_retry_backoff = Some(initial);
        self.management_retry_max_backoff = Some(max);
        self
    }

    /// Validates and constructs the configuration.
    ///
    /// Creates `credential_store_dir` and `policy_store_dir` with mode
    /// `0700` if they do not already exist, mirroring the process-wide
    /// registration lock's own permission discipline.
    pub fn build(self) -> Result<SecurityCoreConfig> {
        let credential_store_dir = self
            .credential_store_dir
            .ok_or_else(|| Error::Config("credential_store_dir is required".into()))?;
        let policy_store_dir = self
            .policy_store_dir
            .ok_or_else(|| Error::Config("policy_store_dir is required".into()))?;

        ensure_private_dir(&credential_store_dir)?;
        ensure_private_dir(&policy_store_dir)?;

        let registration_lock_path = self.registration_lock_path.unwrap_or_else(|| {
            let uid = current_uid();
            PathBuf::from(format!("/tmp/.qeo_reg_{uid}.lock"))
        });

        Ok(SecurityCoreConfig {
            credential_store_dir,
            policy_store_dir,
            realm_hint: self.realm_hint,
            registration_lock_path,
            policy_poll_interval: self
                .policy_poll_interval
                .unwrap_or(Duration::from_secs(30)),
            audit_log_path: self.audit_log_path,
            management_retry_backoff: self
                .management_retry_backoff
                .unwrap_or(Duration::from_secs(1)),
            management_retry_max_backoff: self
                .management_retry_max_backoff
                .unwrap_or(Duration::from_secs(60)),
        })
    }
}

fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(Error::Io)?;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(dir).map_err(Error::Io)?.permissions();
        perms.set_mode(0o700);
        std::fs::set_permissions(dir, perms).map_err(Error::Io)?;
    }
    Ok(())
}

#[cfg(unix)]
fn current_uid() -> u32 {
    // SAFETY: getuid() takes no arguments and cannot fail.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_credential_dir() {
        let err = SecurityCoreConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn build_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let creds = tmp.path().join("creds");
        let policy = tmp.path().join("policy");
        let cfg = SecurityCoreConfig::builder()
            .credential_store_dir(&creds)
            .policy_store_dir(&policy)
            .build()
            .unwrap();
        assert!(creds.is_dir());
        assert!(policy.is_dir());
        assert_eq!(cfg.policy_poll_interval, Duration::from_secs(30));
    }
}
