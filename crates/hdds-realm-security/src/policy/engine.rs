// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lifecycle of the on-disk signed policy document.
//!
//! Loads or fetches the current generation, verifies it against the realm
//! chain, enforces it against the DDS security plugin, and publishes it as
//! the new current body -- plus a background hot-reload watcher thread
//! modeled directly on the teacher's `DynamicPermissionManager` (atomic
//! running flag, joinable handle, poll-and-reload cycle).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use crate::audit::{AuditEvent, AuditLog};
use crate::error::{Error, Result};
use crate::policy::cache::{PolicyCache, RuleMatch, SelectorMask};
use crate::policy::{parser, smime};
use crate::traits::ManagementClient;

/// Opaque transport identifier forwarded verbatim to [`PolicyEnforcer::add_domain`].
pub type TransportKind = String;

/// One resolved rule handed to [`PolicyEnforcer::apply_rule`] -- an owned
/// projection of a [`RuleMatch`], since the enforcer call may outlive the
/// cache borrow in a real plugin implementation.
pub struct EnforcedRule {
    pub topic: String,
    pub coarse_grained: bool,
    pub granted: SelectorMask,
    pub read_ids: Vec<u64>,
    pub write_ids: Vec<u64>,
}

impl EnforcedRule {
    fn from_match(m: &RuleMatch) -> Self {
        EnforcedRule {
            topic: m.topic.to_string(),
            coarse_grained: m.coarse_grained,
            granted: m.granted,
            read_ids: m
                .read_list
                .map(|l| l.iter().filter_map(|p| p.user_id).collect())
                .unwrap_or_default(),
            write_ids: m
                .write_list
                .map(|l| l.iter().filter_map(|p| p.user_id).collect())
                .unwrap_or_default(),
        }
    }
}

/// Capability the DDS security plugin exposes to [`PolicyEngine::enforce`].
///
/// Four ordered phases per generation: start update, add the domain entry,
/// pre-create every participant handle, then attach each resolved rule to
/// its handle, and finally commit. A failure anywhere after `begin_update`
/// triggers `rollback` instead of `commit`.
pub trait PolicyEnforcer: Send + Sync {
    fn begin_update(&self) -> Result<()>;
    fn add_domain(&self, transports: &[TransportKind]) -> Result<()>;
    /// Phase one of the participants pass: pre-create a handle for `tag` so
    /// phase two can attach rules without forward references.
    fn add_participant(&self, tag: &str) -> Result<()>;
    /// Phase two: attach one resolved rule to an already pre-created
    /// participant handle.
    fn apply_rule(&self, participant: &str, rule: &EnforcedRule) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self);
}

/// Notified whenever [`PolicyEngine`] promotes a new generation to current.
pub trait PolicyListener: Send + Sync {
    /// `new_seqnr` just became current; DDS must re-evaluate every topic's
    /// permissions and re-publish the policy instance.
    fn on_policy_published(&self, new_seqnr: u64);
}

/// A [`PolicyEnforcer`] that accepts every generation without talking to a
/// real DDS security plugin; the default until a host supplies one.
pub struct NullPolicyEnforcer;

impl PolicyEnforcer for NullPolicyEnforcer {
    fn begin_update(&self) -> Result<()> {
        Ok(())
    }
    fn add_domain(&self, _transports: &[TransportKind]) -> Result<()> {
        Ok(())
    }
    fn add_participant(&self, _tag: &str) -> Result<()> {
        Ok(())
    }
    fn apply_rule(&self, _participant: &str, _rule: &EnforcedRule) -> Result<()> {
        Ok(())
    }
    fn commit(&self) -> Result<()> {
        Ok(())
    }
    fn rollback(&self) {}
}

/// A [`PolicyListener`] that does nothing; the default until a host wires in
/// its own re-publish notification.
pub struct NullPolicyListener;

impl PolicyListener for NullPolicyListener {
    fn on_policy_published(&self, _new_seqnr: u64) {}
}

/// Configuration for one [`PolicyEngine`] instance, one per realm.
#[derive(Clone)]
pub struct PolicyEngineConfig {
    pub storage_dir: PathBuf,
    pub realm_hex: String,
    /// Our own numeric user id, resolved to the cache's `uid:<hex>` tag
    /// convention for [`PolicyEngine::get_fine_grained_rules`].
    pub self_user_id: u64,
    /// PEM chain the S/MIME signer is checked against (index 1 and up).
    pub chain_pem: String,
    pub poll_interval: Duration,
    pub retry_backoff: Duration,
    pub retry_max_backoff: Duration,
    pub transports: Vec<TransportKind>,
}

const MAX_FETCH_ATTEMPTS: u32 = 5;

struct Shared {
    cache: Mutex<PolicyCache>,
    management: Arc<dyn ManagementClient>,
    enforcer: Arc<dyn PolicyEnforcer>,
    listener: Arc<dyn PolicyListener>,
    audit: Arc<AuditLog>,
    realm_hex: String,
    self_participant_tag: String,
    chain_pem: Mutex<String>,
    file_path: PathBuf,
    transports: Vec<TransportKind>,
    retry_backoff: Duration,
    retry_max_backoff: Duration,
    last_mtime: Mutex<Option<SystemTime>>,
}

impl Shared {
    fn current_seqnr(&self) -> u64 {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).sequence_number()
    }

    fn read_stable(&self) -> Result<Option<String>> {
        if !self.file_path.exists() {
            return Ok(None);
        }
        let tmp = sibling_tmp(&self.file_path, "_r");
        std::fs::hard_link(&self.file_path, &tmp).map_err(Error::Io)?;
        let contents = std::fs::read_to_string(&tmp);
        let _ = std::fs::remove_file(&tmp);
        Ok(Some(contents.map_err(Error::Io)?))
    }

    fn write_atomic(&self, envelope: &str) -> Result<()> {
        let tmp = sibling_tmp(&self.file_path, "_w");
        std::fs::write(&tmp, envelope).map_err(Error::Io)?;
        std::fs::rename(&tmp, &self.file_path).map_err(Error::Io)?;
        Ok(())
    }

    fn fetch_and_apply(&self) -> Result<()> {
        let mut backoff = self.retry_backoff;
        let mut last_err = None;
        for attempt in 0..MAX_FETCH_ATTEMPTS {
            match self.management.fetch_policy(&self.realm_hex) {
                Ok((body, _seqnr)) => {
                    let envelope = String::from_utf8(body).map_err(|e| {
                        Error::InvalidArgument(format!("policy body is not utf8: {e}"))
                    })?;
                    return self.apply_envelope(&envelope);
                }
                Err(e) => {
                    log::warn!(
                        "policy fetch attempt {}/{MAX_FETCH_ATTEMPTS} failed, retrying in {backoff:?}: {e}",
                        attempt + 1
                    );
                    last_err = Some(e);
                    std::thread::sleep(backoff);
                    backoff = std::cmp::min(backoff * 2, self.retry_max_backoff);
                }
            }
        }
        Err(last_err.unwrap_or(Error::GenericFailure("policy fetch failed".into())))
    }

    fn apply_envelope(&self, envelope: &str) -> Result<()> {
        let chain_pem = self.chain_pem.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let old_seqnr = self.current_seqnr();

        let body = match smime::verify(envelope, &chain_pem) {
            Ok(body) => body,
            Err(e) => {
                log::error!("policy verification failed: {e}");
                let _ = self.audit.record(AuditEvent::PolicyReload {
                    old_seqnr,
                    new_seqnr: 0,
                    accepted: false,
                    detail: format!("verification failed: {e}"),
                    timestamp_unix: now_unix(),
                });
                return Err(e);
            }
        };

        let new_seqnr = parser::get_sequence_number(&body)?;
        if old_seqnr != 0 && new_seqnr <= old_seqnr {
            log::debug!("ignoring policy generation {new_seqnr}, current is {old_seqnr}");
            return Ok(());
        }

        let mut new_cache = PolicyCache::new();
        if let Err(e) = parser::parse(&body, &mut new_cache) {
            log::error!("policy parse failed: {e}");
            let _ = self.audit.record(AuditEvent::PolicyReload {
                old_seqnr,
                new_seqnr,
                accepted: false,
                detail: format!("parse failed: {e}"),
                timestamp_unix: now_unix(),
            });
            return Err(e);
        }
        new_cache.finalize();

        if let Err(e) = self.enforce(&new_cache) {
            log::error!("policy enforcement failed: {e}");
            let _ = self.audit.record(AuditEvent::PolicyReload {
                old_seqnr,
                new_seqnr,
                accepted: false,
                detail: format!("enforcement failed: {e}"),
                timestamp_unix: now_unix(),
            });
            return Err(e);
        }

        self.write_atomic(envelope)?;
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = new_cache;
        self.audit.record(AuditEvent::PolicyReload {
            old_seqnr,
            new_seqnr,
            accepted: true,
            detail: "applied".into(),
            timestamp_unix: now_unix(),
        })?;
        self.listener.on_policy_published(new_seqnr);
        Ok(())
    }

    fn enforce(&self, cache: &PolicyCache) -> Result<()> {
        self.enforcer.begin_update()?;

        let outcome = (|| -> Result<()> {
            self.enforcer.add_domain(&self.transports)?;

            let mut participants = Vec::new();
            cache.get_participants(|tag| participants.push(tag.to_string()));

            for tag in &participants {
                self.enforcer.add_participant(tag)?;
            }

            let mut first_err: Option<Error> = None;
            for tag in &participants {
                if first_err.is_some() {
                    break;
                }
                cache.get_topic_rules(Some(tag), None, SelectorMask::BOTH, |m| {
                    if first_err.is_some() {
                        return;
                    }
                    let rule = EnforcedRule::from_match(&m);
                    if let Err(e) = self.enforcer.apply_rule(tag, &rule) {
                        first_err = Some(e);
                    }
                });
            }
            if let Some(e) = first_err {
                return Err(e);
            }
            Ok(())
        })();

        match outcome {
            Ok(()) => self.enforcer.commit(),
            Err(e) => {
                self.enforcer.rollback();
                Err(e)
            }
        }
    }

    fn poll_once(&self) -> Result<()> {
        let meta = std::fs::metadata(&self.file_path).map_err(Error::Io)?;
        let mtime = meta.modified().map_err(Error::Io)?;
        {
            let mut last = self.last_mtime.lock().unwrap_or_else(|e| e.into_inner());
            if *last == Some(mtime) {
                return Ok(());
            }
            *last = Some(mtime);
        }
        if let Some(envelope) = self.read_stable()? {
            self.apply_envelope(&envelope)?;
        }
        Ok(())
    }
}

pub(crate) fn sibling_tmp(path: &Path, suffix: &str) -> PathBuf {
    let pid = std::process::id();
    let rand: u32 = rand::random();
    let file_name = path.file_name().and_then(|f| f.to_str()).unwrap_or("policy");
    path.with_file_name(format!("{file_name}.{pid}.{rand:x}{suffix}.tmp"))
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Owns the currently-enforced policy generation for one realm and the
/// background thread that keeps it in sync with the on-disk file.
pub struct PolicyEngine {
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
    poll_interval: Duration,
}

impl PolicyEngine {
    /// Creates the cache, loads the on-disk file if present (falling back to
    /// a server fetch on any load or verification failure), verifies,
    /// enforces, and publishes it, then starts the hot-reload watcher.
    pub fn construct(
        cfg: PolicyEngineConfig,
        management: Arc<dyn ManagementClient>,
        enforcer: Arc<dyn PolicyEnforcer>,
        listener: Arc<dyn PolicyListener>,
        audit: Arc<AuditLog>,
    ) -> Result<Self> {
        let file_path = cfg.storage_dir.join(format!("{}_policy.mime", cfg.realm_hex));
        let shared = Arc::new(Shared {
            cache: Mutex::new(PolicyCache::new()),
            management,
            enforcer,
            listener,
            audit,
            realm_hex: cfg.realm_hex,
            self_participant_tag: format!("uid:{:x}", cfg.self_user_id),
            chain_pem: Mutex::new(cfg.chain_pem),
            file_path,
            transports: cfg.transports,
            retry_backoff: cfg.retry_backoff,
            retry_max_backoff: cfg.retry_max_backoff,
            last_mtime: Mutex::new(None),
        });

        let engine = PolicyEngine {
            shared,
            running: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
            poll_interval: cfg.poll_interval,
        };

        match engine.shared.read_stable() {
            Ok(Some(envelope)) => {
                if let Err(e) = engine.shared.apply_envelope(&envelope) {
                    log::warn!("local policy file invalid ({e}), fetching from server instead");
                    engine.shared.fetch_and_apply()?;
                }
            }
            Ok(None) => engine.shared.fetch_and_apply()?,
            Err(e) => {
                log::warn!("failed to read local policy file ({e}), fetching from server instead");
                engine.shared.fetch_and_apply()?;
            }
        }

        engine.start_watching(engine.poll_interval);
        Ok(engine)
    }

    /// Replaces the PEM chain S/MIME signatures are checked against, e.g.
    /// after a credential renewal changes the realm's signing chain.
    pub fn set_trust_chain(&self, chain_pem: String) {
        *self.shared.chain_pem.lock().unwrap_or_else(|e| e.into_inner()) = chain_pem;
    }

    /// Checks with the server whether our current sequence number is still
    /// valid; fetches and applies the new body only if it is not.
    pub fn refresh(&self) -> Result<()> {
        let current = self.shared.current_seqnr();
        let server_seqnr = self.shared.management.policy_seqnr(&self.shared.realm_hex)?;
        if server_seqnr <= current {
            return Ok(());
        }
        self.shared.fetch_and_apply()
    }

    /// Resolves the *self* participant tag from the configured identity and
    /// forwards to [`PolicyCache::get_topic_rules`].
    pub fn get_fine_grained_rules(&self, topic: &str, mask: SelectorMask, cb: impl FnMut(RuleMatch)) {
        let cache = self.shared.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get_topic_rules(Some(&self.shared.self_participant_tag), Some(topic), mask, cb);
    }

    /// Starts the background file-watcher thread, polling every `poll_interval`.
    #[cfg(feature = "policy-watch")]
    pub fn start_watching(&self, poll_interval: Duration) {
        if self.running.load(Ordering::SeqCst) {
            return;
        }
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("hdds-policy-watch".to_string())
            .spawn(move || {
                // Sleeps in short steps rather than one `sleep(poll_interval)` so
                // `stop_watching` doesn't have to wait out a long poll interval
                // before the thread notices and joins.
                const STEP: Duration = Duration::from_millis(50);
                while running.load(Ordering::SeqCst) {
                    let mut waited = Duration::ZERO;
                    while waited < poll_interval {
                        if !running.load(Ordering::SeqCst) {
                            return;
                        }
                        let step = std::cmp::min(STEP, poll_interval - waited);
                        std::thread::sleep(step);
                        waited += step;
                    }
                    if let Err(e) = shared.poll_once() {
                        log::warn!("policy watcher poll failed: {e}");
                    }
                }
            })
            .expect("failed to spawn policy watcher thread");

        *self.thread.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    #[cfg(not(feature = "policy-watch"))]
    pub fn start_watching(&self, _poll_interval: Duration) {}

    /// Stops the watcher thread, if running, joining it before returning.
    pub fn stop_watching(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = handle.join();
        }
    }

    /// Stops the watcher and releases the cache. Safe to call more than once.
    pub fn destruct(&self) {
        self.stop_watching();
    }
}

impl Drop for PolicyEngine {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    struct FakeManagement {
        bodies: Mutex<Vec<(Vec<u8>, u64)>>,
        seqnr: AtomicU64,
        fail_first_n: AtomicU64,
    }

    impl ManagementClient for FakeManagement {
        fn fetch_policy(&self, _realm_hex: &str) -> Result<(Vec<u8>, u64)> {
            if self.fail_first_n.load(Ordering::SeqCst) > 0 {
                self.fail_first_n.fetch_sub(1, Ordering::SeqCst);
                return Err(Error::GenericFailure("transient".into()));
            }
            let mut bodies = self.bodies.lock().unwrap();
            bodies.pop().ok_or(Error::NoData)
        }

        fn policy_seqnr(&self, _realm_hex: &str) -> Result<u64> {
            Ok(self.seqnr.load(Ordering::SeqCst))
        }

        fn enroll(&self, _csr_der: &[u8], _otp: &str, _url: &str) -> Result<Vec<u8>> {
            Err(Error::Unsupported)
        }
    }

    struct NullEnforcer {
        calls: Mutex<Vec<String>>,
    }

    impl PolicyEnforcer for NullEnforcer {
        fn begin_update(&self) -> Result<()> {
            self.calls.lock().unwrap().push("begin".into());
            Ok(())
        }
        fn add_domain(&self, _transports: &[TransportKind]) -> Result<()> {
            self.calls.lock().unwrap().push("domain".into());
            Ok(())
        }
        fn add_participant(&self, tag: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("participant:{tag}"));
            Ok(())
        }
        fn apply_rule(&self, participant: &str, rule: &EnforcedRule) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("rule:{participant}:{}", rule.topic));
            Ok(())
        }
        fn commit(&self) -> Result<()> {
            self.calls.lock().unwrap().push("commit".into());
            Ok(())
        }
        fn rollback(&self) {
            self.calls.lock().unwrap().push("rollback".into());
        }
    }

    struct CountingListener {
        seen: Mutex<Vec<u64>>,
    }

    impl PolicyListener for CountingListener {
        fn on_policy_published(&self, new_seqnr: u64) {
            self.seen.lock().unwrap().push(new_seqnr);
        }
    }

    fn signed_envelope(chain_pem: &str, signer_der: &[u8], body: &str) -> String {
        let rng = ring::rand::SystemRandom::new();
        let key_pair = ring::signature::EcdsaKeyPair::from_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            signer_der,
            &rng,
        )
        .unwrap();
        let sig = key_pair.sign(&rng, body.as_bytes()).unwrap();
        let _ = chain_pem;
        smime::encode(body, sig.as_ref())
    }

    /// Generates a self-signed P-256 certificate and returns `(pem, pkcs8_der)`.
    /// Keys are requested explicitly as ECDSA P-256 rather than relying on
    /// whatever algorithm `rcgen` would otherwise default to.
    fn generate_ecdsa_cert(subject_alt_name: &str) -> (String, Vec<u8>) {
        let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let params = rcgen::CertificateParams::new(vec![subject_alt_name.to_string()]).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_der())
    }

    fn test_chain() -> (String, Vec<u8>) {
        let (leaf_pem, _) = generate_ecdsa_cert("leaf.example");
        let (signer_pem, signer_der) = generate_ecdsa_cert("realm-ca.example");
        (format!("{leaf_pem}{signer_pem}"), signer_der)
    }

    #[test]
    fn construct_fetches_and_enforces_when_no_local_file() {
        let (chain_pem, signer_der) = test_chain();
        let body = "[meta]\r\nversion=1.0\r\nseqnr=1\r\n[uid:37c]\r\ntopic=rw\r\n";
        let envelope = signed_envelope(&chain_pem, &signer_der, body);

        let tmp = tempfile::tempdir().unwrap();
        let cfg = PolicyEngineConfig {
            storage_dir: tmp.path().to_path_buf(),
            realm_hex: "1".into(),
            self_user_id: 0x37c,
            chain_pem,
            poll_interval: Duration::from_secs(3600),
            retry_backoff: Duration::from_millis(1),
            retry_max_backoff: Duration::from_millis(4),
            transports: vec!["udp".into()],
        };

        let management = Arc::new(FakeManagement {
            bodies: Mutex::new(vec![(envelope.into_bytes(), 1)]),
            seqnr: AtomicU64::new(1),
            fail_first_n: AtomicU64::new(0),
        });
        let enforcer = Arc::new(NullEnforcer { calls: Mutex::new(Vec::new()) });
        let listener = Arc::new(CountingListener { seen: Mutex::new(Vec::new()) });
        let audit = Arc::new(AuditLog::in_memory());

        let engine = PolicyEngine::construct(
            cfg,
            management,
            enforcer.clone(),
            listener.clone(),
            audit,
        )
        .unwrap();

        assert!(enforcer.calls.lock().unwrap().contains(&"commit".to_string()));
        assert_eq!(listener.seen.lock().unwrap().as_slice(), &[1]);
        engine.destruct();
    }

    #[test]
    fn fetch_retries_transient_failures_then_succeeds() {
        let (chain_pem, signer_der) = test_chain();
        let body = "[meta]\r\nversion=1.0\r\nseqnr=1\r\n";
        let envelope = signed_envelope(&chain_pem, &signer_der, body);

        let tmp = tempfile::tempdir().unwrap();
        let cfg = PolicyEngineConfig {
            storage_dir: tmp.path().to_path_buf(),
            realm_hex: "1".into(),
            self_user_id: 1,
            chain_pem,
            poll_interval: Duration::from_secs(3600),
            retry_backoff: Duration::from_millis(1),
            retry_max_backoff: Duration::from_millis(2),
            transports: vec![],
        };

        let management = Arc::new(FakeManagement {
            bodies: Mutex::new(vec![(envelope.into_bytes(), 1)]),
            seqnr: AtomicU64::new(1),
            fail_first_n: AtomicU64::new(2),
        });
        let enforcer = Arc::new(NullEnforcer { calls: Mutex::new(Vec::new()) });
        let listener = Arc::new(CountingListener { seen: Mutex::new(Vec::new()) });
        let audit = Arc::new(AuditLog::in_memory());

        let engine =
            PolicyEngine::construct(cfg, management, enforcer, listener.clone(), audit).unwrap();
        assert_eq!(listener.seen.lock().unwrap().as_slice(), &[1]);
        engine.destruct();
    }

    #[test]
    fn stale_generation_from_server_is_ignored() {
        let (chain_pem, signer_der) = test_chain();
        let first = "[meta]\r\nversion=1.0\r\nseqnr=5\r\n";
        let envelope = signed_envelope(&chain_pem, &signer_der, first);

        let tmp = tempfile::tempdir().unwrap();
        let cfg = PolicyEngineConfig {
            storage_dir: tmp.path().to_path_buf(),
            realm_hex: "1".into(),
            self_user_id: 1,
            chain_pem,
            poll_interval: Duration::from_secs(3600),
            retry_backoff: Duration::from_millis(1),
            retry_max_backoff: Duration::from_millis(2),
            transports: vec![],
        };

        let management = Arc::new(FakeManagement {
            bodies: Mutex::new(vec![(envelope.into_bytes(), 5)]),
            seqnr: AtomicU64::new(5),
            fail_first_n: AtomicU64::new(0),
        });
        let enforcer = Arc::new(NullEnforcer { calls: Mutex::new(Vec::new()) });
        let listener = Arc::new(CountingListener { seen: Mutex::new(Vec::new()) });
        let audit = Arc::new(AuditLog::in_memory());

        let engine =
            PolicyEngine::construct(cfg, management, enforcer, listener.clone(), audit).unwrap();

        // refresh() sees the same server seqnr as current and must not refetch
        // (the fake would return NoData, since its one body was already consumed).
        engine.refresh().unwrap();
        assert_eq!(listener.seen.lock().unwrap().as_slice(), &[5]);
        engine.destruct();
    }
}
