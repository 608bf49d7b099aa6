//! Upload session orchestration
//!
//! One coordinator owns the whole selection → size check → commit
//! lifecycle. Every fallible step is absorbed here into a terminal,
//! human-readable outcome; nothing below this layer ever reaches the UI
//! as a raw error. The size gate runs twice: once when staging a picked
//! video and again right before the store write, because the file may
//! have changed (or the first probe been stale) in between.

use crate::admission::AdmissionPolicy;
use crate::models::{MediaRecord, StagedSelection};
use crate::picker::{MediaPicker, PickerOptions};
use crate::probe::SizeProbe;
use crate::progress::{ProgressHandle, ProgressSimulator};
use crate::store::MediaStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// How long the completed state stays visible before resetting to idle
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Inline message when the size probe fails
pub const SIZE_UNAVAILABLE_MESSAGE: &str = "Unable to verify file size. Please try again.";
/// Inline message when the store write fails
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload video. Please try again.";
/// Inline message when the picker itself fails
pub const PICKER_FAILED_MESSAGE: &str = "Failed to select video. Please try again.";

/// Lifecycle of one upload session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Selecting,
    Checking,
    Staged,
    Committing,
    Succeeded,
    Rejected,
    Failed,
}

/// Terminal outcome of a `select()` call
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// The picked video passed the size gate and is staged for upload
    Staged(StagedSelection),
    /// The user dismissed the picker; not an error
    Cancelled,
    /// A session is already in flight; the call was ignored
    Busy,
    /// Size gate rejected the video, or its size could not be verified
    Rejected { reason: String },
    /// The picker itself failed
    PickerFailed { reason: String },
}

/// Terminal outcome of a `commit()` call
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(MediaRecord),
    /// Nothing is staged; the call was ignored
    NotStaged,
    /// The pre-write re-check rejected the video
    Rejected { reason: String },
    /// The store write failed; the selection is discarded
    Failed { reason: String },
}

struct Session {
    state: UploadState,
    staged: Option<StagedSelection>,
    // Bumped by cancel() and by every select() start. An in-flight call
    // whose generation no longer matches has been orphaned and must not
    // touch the session again.
    generation: u64,
}

/// Orchestrates picker → size probe → admission → store write
///
/// At most one session is in flight per coordinator; a `select()` while
/// busy is ignored. Exactly one store write happens per successful
/// commit. State and both progress values are observable through watch
/// channels so the UI can render them without owning the session.
pub struct UploadCoordinator<M, P, S> {
    picker: M,
    probe: P,
    store: S,
    policy: AdmissionPolicy,
    options: PickerOptions,
    checking_sim: ProgressSimulator,
    upload_sim: ProgressSimulator,
    settle: Duration,
    session: Mutex<Session>,
    state_tx: watch::Sender<UploadState>,
    checking_values: Arc<watch::Sender<u8>>,
    upload_values: Arc<watch::Sender<u8>>,
}

impl<M, P, S> UploadCoordinator<M, P, S>
where
    M: MediaPicker,
    P: SizeProbe,
    S: MediaStore,
{
    pub fn new(picker: M, probe: P, store: S) -> Self {
        let (state_tx, _) = watch::channel(UploadState::Idle);
        let (checking_tx, _) = watch::channel(0u8);
        let (upload_tx, _) = watch::channel(0u8);
        Self {
            picker,
            probe,
            store,
            policy: AdmissionPolicy::default(),
            options: PickerOptions::default(),
            checking_sim: ProgressSimulator::checking(),
            upload_sim: ProgressSimulator::uploading(),
            settle: SETTLE_DELAY,
            session: Mutex::new(Session {
                state: UploadState::Idle,
                staged: None,
                generation: 0,
            }),
            state_tx,
            checking_values: Arc::new(checking_tx),
            upload_values: Arc::new(upload_tx),
        }
    }

    pub fn with_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_picker_options(mut self, options: PickerOptions) -> Self {
        self.options = options;
        self
    }

    /// Current session state
    pub fn state(&self) -> UploadState {
        *self.state_tx.borrow()
    }

    /// Observe state transitions
    pub fn states(&self) -> watch::Receiver<UploadState> {
        self.state_tx.subscribe()
    }

    /// Observe the size-check progress value
    pub fn checking_progress(&self) -> watch::Receiver<u8> {
        self.checking_values.subscribe()
    }

    /// Observe the upload progress value
    pub fn upload_progress(&self) -> watch::Receiver<u8> {
        self.upload_values.subscribe()
    }

    /// The currently staged selection, if any
    pub fn staged(&self) -> Option<StagedSelection> {
        self.lock_session().staged.clone()
    }

    /// Pick a video and run it through the size gate
    ///
    /// Allowed from idle or staged (re-selection discards the previous
    /// stage); ignored while a session is in flight. Picker cancellation
    /// returns to idle without an error. A `cancel()` landing while the
    /// picker or the probe is awaited orphans this call: it stops touching
    /// the session and reports `Cancelled`.
    pub async fn select(&self) -> SelectOutcome {
        let generation = {
            let mut session = self.lock_session();
            match session.state {
                UploadState::Idle | UploadState::Staged => {
                    session.staged = None;
                    session.generation += 1;
                    self.transition(&mut session, UploadState::Selecting);
                    session.generation
                }
                _ => return SelectOutcome::Busy,
            }
        };

        let response = match self.picker.launch(&self.options).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Picker failed: {}", e);
                if !self.reset_if_current(generation) {
                    return SelectOutcome::Cancelled;
                }
                return SelectOutcome::PickerFailed {
                    reason: PICKER_FAILED_MESSAGE.to_string(),
                };
            }
        };

        if let Some(message) = response.error_message {
            log::error!("Picker reported error: {}", message);
            if !self.reset_if_current(generation) {
                return SelectOutcome::Cancelled;
            }
            return SelectOutcome::PickerFailed {
                reason: PICKER_FAILED_MESSAGE.to_string(),
            };
        }

        let uri = match response.assets.first() {
            Some(asset) if !response.cancelled => asset.uri.clone(),
            _ => {
                self.reset_if_current(generation);
                return SelectOutcome::Cancelled;
            }
        };

        if !self.transition_if_current(generation, UploadState::Checking) {
            return SelectOutcome::Cancelled;
        }
        let size = match self.checked_probe(&uri).await {
            Ok(size) => size,
            Err(reason) => {
                if !self.finish_if_current(generation, UploadState::Rejected) {
                    return SelectOutcome::Cancelled;
                }
                return SelectOutcome::Rejected { reason };
            }
        };

        let decision = self.policy.evaluate(size);
        if !decision.accepted {
            if !self.finish_if_current(generation, UploadState::Rejected) {
                return SelectOutcome::Cancelled;
            }
            return SelectOutcome::Rejected {
                reason: decision
                    .reason_if_rejected
                    .unwrap_or_else(|| SIZE_UNAVAILABLE_MESSAGE.to_string()),
            };
        }

        let staged = StagedSelection {
            uri,
            file_size: size,
        };
        {
            let mut session = self.lock_session();
            if session.generation != generation {
                return SelectOutcome::Cancelled;
            }
            session.staged = Some(staged.clone());
            self.transition(&mut session, UploadState::Staged);
        }
        SelectOutcome::Staged(staged)
    }

    /// Commit the staged selection to the store
    ///
    /// Re-probes and re-evaluates before writing. Once the write has been
    /// issued the session can no longer be cancelled; the write is awaited
    /// unconditionally and treated as atomic.
    pub async fn commit(&self) -> CommitOutcome {
        let (staged, generation) = {
            let mut session = self.lock_session();
            let staged = match (&session.state, session.staged.clone()) {
                (UploadState::Staged, Some(staged)) => staged,
                _ => return CommitOutcome::NotStaged,
            };
            self.transition(&mut session, UploadState::Committing);
            (staged, session.generation)
        };

        // TOCTOU re-check: the file may have changed since staging
        let size = match self.checked_probe(&staged.uri).await {
            Ok(size) => size,
            Err(reason) => {
                self.finish_if_current(generation, UploadState::Rejected);
                return CommitOutcome::Rejected { reason };
            }
        };

        let decision = self.policy.evaluate(size);
        if !decision.accepted {
            self.finish_if_current(generation, UploadState::Rejected);
            return CommitOutcome::Rejected {
                reason: decision
                    .reason_if_rejected
                    .unwrap_or_else(|| SIZE_UNAVAILABLE_MESSAGE.to_string()),
            };
        }

        let ticker = self.upload_sim.start(self.upload_values.clone());
        let written = self.store.add(&staged.uri, size).await;
        ticker.stop().await;

        match written {
            Ok(record) => {
                let _ = self.upload_values.send(100);
                self.set_state(UploadState::Succeeded);

                // Let the UI show the completed state before resetting;
                // a cancel during the settle window already went to idle
                tokio::time::sleep(self.settle).await;
                self.reset_if_current(generation);
                CommitOutcome::Committed(record)
            }
            Err(e) => {
                log::error!("Upload commit failed: {}", e);
                self.finish_if_current(generation, UploadState::Failed);
                CommitOutcome::Failed {
                    reason: UPLOAD_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Discard the staged selection and return to idle
    ///
    /// Not allowed while a store write is in flight; returns false in
    /// that case and leaves the session untouched.
    pub fn cancel(&self) -> bool {
        let mut session = self.lock_session();
        if session.state == UploadState::Committing {
            return false;
        }
        session.staged = None;
        session.generation += 1;
        self.transition(&mut session, UploadState::Idle);
        let _ = self.checking_values.send(0);
        let _ = self.upload_values.send(0);
        true
    }

    /// Probe with the checking ticker running; maps failures to the
    /// user-facing verification message
    async fn checked_probe(&self, uri: &str) -> Result<u64, String> {
        let ticker: ProgressHandle = self.checking_sim.start(self.checking_values.clone());
        let probed = self.probe.probe(uri).await;
        ticker.stop().await;

        match probed {
            Ok(size) => {
                let _ = self.checking_values.send(100);
                Ok(size)
            }
            Err(e) => {
                log::error!("Size probe failed for {}: {}", uri, e);
                let _ = self.checking_values.send(0);
                Err(SIZE_UNAVAILABLE_MESSAGE.to_string())
            }
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, session: &mut Session, state: UploadState) {
        session.state = state;
        let _ = self.state_tx.send(state);
    }

    fn set_state(&self, state: UploadState) {
        let mut session = self.lock_session();
        self.transition(&mut session, state);
    }

    /// Transition only if the session still belongs to this call
    fn transition_if_current(&self, generation: u64, state: UploadState) -> bool {
        let mut session = self.lock_session();
        if session.generation != generation {
            return false;
        }
        self.transition(&mut session, state);
        true
    }

    /// Drive the session through a terminal state and back to idle,
    /// unless it was cancelled or replaced in the meantime
    fn finish_if_current(&self, generation: u64, terminal: UploadState) -> bool {
        let mut session = self.lock_session();
        if session.generation != generation {
            return false;
        }
        self.transition(&mut session, terminal);
        session.staged = None;
        self.transition(&mut session, UploadState::Idle);
        true
    }

    fn reset_if_current(&self, generation: u64) -> bool {
        let mut session = self.lock_session();
        if session.generation != generation {
            return false;
        }
        session.staged = None;
        self.transition(&mut session, UploadState::Idle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaRecord;
    use crate::picker::{PickedAsset, PickerError, PickerResponse};
    use crate::probe::ProbeError;
    use crate::store::StoreError;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    struct FakePicker {
        responses: Mutex<VecDeque<Result<PickerResponse, PickerError>>>,
        delay: Option<Duration>,
    }

    impl FakePicker {
        fn picks(uri: &str) -> Self {
            Self::with(Ok(PickerResponse {
                cancelled: false,
                assets: vec![PickedAsset {
                    uri: uri.to_string(),
                }],
                error_message: None,
            }))
        }

        fn cancels() -> Self {
            Self::with(Ok(PickerResponse::cancelled()))
        }

        fn with(response: Result<PickerResponse, PickerError>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([response])),
                delay: None,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl MediaPicker for FakePicker {
        async fn launch(&self, _options: &PickerOptions) -> Result<PickerResponse, PickerError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(PickerResponse::cancelled()))
        }
    }

    struct FakeProbe {
        sizes: Mutex<VecDeque<Result<u64, ProbeError>>>,
        delay: Option<Duration>,
    }

    impl FakeProbe {
        fn sized(size: u64) -> Self {
            Self::sequence(vec![Ok(size), Ok(size)])
        }

        fn failing() -> Self {
            Self::sequence(vec![Err(ProbeError::SizeUnavailable("no header".into()))])
        }

        fn sequence(sizes: Vec<Result<u64, ProbeError>>) -> Self {
            Self {
                sizes: Mutex::new(sizes.into()),
                delay: None,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl SizeProbe for FakeProbe {
        async fn probe(&self, _locator: &str) -> Result<u64, ProbeError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.sizes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProbeError::SizeUnavailable("exhausted".into())))
        }
    }

    struct FakeStore {
        records: Mutex<Vec<MediaRecord>>,
        adds: AtomicUsize,
        fail_add: bool,
        snapshots: watch::Sender<Vec<MediaRecord>>,
    }

    impl FakeStore {
        fn new() -> Self {
            let (snapshots, _) = watch::channel(Vec::new());
            Self {
                records: Mutex::new(Vec::new()),
                adds: AtomicUsize::new(0),
                fail_add: false,
                snapshots,
            }
        }

        fn failing() -> Self {
            let mut store = Self::new();
            store.fail_add = true;
            store
        }
    }

    impl MediaStore for FakeStore {
        async fn add(&self, uri: &str, file_size: u64) -> Result<MediaRecord, StoreError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            if self.fail_add {
                return Err(StoreError::Other("write refused".into()));
            }
            let record = MediaRecord {
                id: Uuid::new_v4().to_string(),
                uri: uri.to_string(),
                timestamp: Utc::now(),
                file_size,
            };
            let mut records = self.records.lock().unwrap();
            records.insert(0, record.clone());
            let _ = self.snapshots.send(records.clone());
            Ok(record)
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            let mut records = self.records.lock().unwrap();
            records.retain(|r| r.id != id);
            let _ = self.snapshots.send(records.clone());
            Ok(())
        }

        fn subscribe(&self) -> watch::Receiver<Vec<MediaRecord>> {
            self.snapshots.subscribe()
        }
    }

    fn coordinator(
        picker: FakePicker,
        probe: FakeProbe,
        store: FakeStore,
    ) -> UploadCoordinator<FakePicker, FakeProbe, FakeStore> {
        UploadCoordinator::new(picker, probe, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_pick_returns_to_idle() {
        let c = coordinator(FakePicker::cancels(), FakeProbe::sized(100), FakeStore::new());

        assert_eq!(c.select().await, SelectOutcome::Cancelled);
        assert_eq!(c.state(), UploadState::Idle);
        assert!(c.staged().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_video_is_rejected_with_both_sizes() {
        // 25 MiB against the 20 MiB default limit
        let c = coordinator(
            FakePicker::picks("file:///tmp/big.mp4"),
            FakeProbe::sized(26_214_400),
            FakeStore::new(),
        );

        match c.select().await {
            SelectOutcome::Rejected { reason } => {
                assert!(reason.contains("25.00 MB"), "reason was: {}", reason);
                assert!(reason.contains("20.00 MB"), "reason was: {}", reason);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(c.state(), UploadState::Idle);
        assert!(c.staged().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_rejects_without_dangling_stage() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/clip.mp4"),
            FakeProbe::failing(),
            FakeStore::new(),
        );

        match c.select().await {
            SelectOutcome::Rejected { reason } => {
                assert_eq!(reason, SIZE_UNAVAILABLE_MESSAGE);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(c.state(), UploadState::Idle);
        assert!(c.staged().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_picker_error_is_absorbed() {
        let c = coordinator(
            FakePicker::with(Err(PickerError::Other("boom".into()))),
            FakeProbe::sized(100),
            FakeStore::new(),
        );

        match c.select().await {
            SelectOutcome::PickerFailed { reason } => {
                assert_eq!(reason, PICKER_FAILED_MESSAGE);
            }
            other => panic!("expected picker failure, got {:?}", other),
        }
        assert_eq!(c.state(), UploadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_video_is_staged() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/small.mp4"),
            FakeProbe::sized(5_242_880),
            FakeStore::new(),
        );

        match c.select().await {
            SelectOutcome::Staged(staged) => {
                assert_eq!(staged.uri, "file:///tmp/small.mp4");
                assert_eq!(staged.file_size, 5_242_880);
            }
            other => panic!("expected staged, got {:?}", other),
        }
        assert_eq!(c.state(), UploadState::Staged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_writes_once_and_settles_to_idle() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/small.mp4"),
            FakeProbe::sized(5_242_880),
            FakeStore::new(),
        );
        assert!(matches!(c.select().await, SelectOutcome::Staged(_)));

        let mut seen = Vec::new();
        let mut states = c.states();
        let outcome = tokio::join!(c.commit(), async {
            while states.changed().await.is_ok() {
                let state = *states.borrow();
                seen.push(state);
                if state == UploadState::Idle {
                    break;
                }
            }
        })
        .0;

        match outcome {
            CommitOutcome::Committed(record) => {
                assert_eq!(record.file_size, 5_242_880);
                assert_eq!(record.uri, "file:///tmp/small.mp4");
            }
            other => panic!("expected commit, got {:?}", other),
        }
        assert_eq!(c.store.adds.load(Ordering::SeqCst), 1);
        assert!(seen.contains(&UploadState::Succeeded), "states: {:?}", seen);
        assert_eq!(seen.last(), Some(&UploadState::Idle));
        assert!(c.staged().is_none());
        assert_eq!(*c.upload_progress().borrow(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_reprobe_catches_grown_file() {
        // 5 MiB at staging, 25 MiB at commit time
        let c = coordinator(
            FakePicker::picks("file:///tmp/growing.mp4"),
            FakeProbe::sequence(vec![Ok(5_242_880), Ok(26_214_400)]),
            FakeStore::new(),
        );
        assert!(matches!(c.select().await, SelectOutcome::Staged(_)));

        match c.commit().await {
            CommitOutcome::Rejected { reason } => {
                assert!(reason.contains("25.00 MB"), "reason was: {}", reason);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(c.store.adds.load(Ordering::SeqCst), 0);
        assert_eq!(c.state(), UploadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_discards_selection() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/small.mp4"),
            FakeProbe::sized(5_242_880),
            FakeStore::failing(),
        );
        assert!(matches!(c.select().await, SelectOutcome::Staged(_)));

        match c.commit().await {
            CommitOutcome::Failed { reason } => {
                assert_eq!(reason, UPLOAD_FAILED_MESSAGE);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(c.state(), UploadState::Idle);
        assert!(c.staged().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_without_stage_is_ignored() {
        let c = coordinator(FakePicker::cancels(), FakeProbe::sized(100), FakeStore::new());
        assert_eq!(c.commit().await, CommitOutcome::NotStaged);
        assert_eq!(c.store.adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_select_while_busy_is_ignored() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/small.mp4").slow(Duration::from_secs(1)),
            FakeProbe::sized(100),
            FakeStore::new(),
        );

        let (first, second) = tokio::join!(c.select(), c.select());
        assert!(matches!(first, SelectOutcome::Staged(_)));
        assert_eq!(second, SelectOutcome::Busy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_stage_but_not_mid_commit() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/small.mp4"),
            FakeProbe::sized(100),
            FakeStore::new(),
        );
        assert!(matches!(c.select().await, SelectOutcome::Staged(_)));

        assert!(c.cancel());
        assert_eq!(c.state(), UploadState::Idle);
        assert!(c.staged().is_none());
        assert_eq!(c.commit().await, CommitOutcome::NotStaged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_checking_discards_pick() {
        let c = coordinator(
            FakePicker::picks("file:///tmp/a.mp4"),
            FakeProbe::sized(100).slow(Duration::from_millis(600)),
            FakeStore::new(),
        );

        let mut states = c.states();
        let (outcome, _) = tokio::join!(c.select(), async {
            // wait for the probe to be in flight, then dismiss
            loop {
                if *states.borrow_and_update() == UploadState::Checking {
                    break;
                }
                if states.changed().await.is_err() {
                    return;
                }
            }
            assert!(c.cancel());
        });

        // the orphaned call must not stage its pick or revive the session
        assert_eq!(outcome, SelectOutcome::Cancelled);
        assert_eq!(c.state(), UploadState::Idle);
        assert!(c.staged().is_none());
        assert_eq!(c.commit().await, CommitOutcome::NotStaged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_after_cancelled_select_starts_fresh() {
        let c = UploadCoordinator::new(
            FakePicker {
                responses: Mutex::new(VecDeque::from([
                    Ok(PickerResponse {
                        cancelled: false,
                        assets: vec![PickedAsset {
                            uri: "file:///tmp/first.mp4".to_string(),
                        }],
                        error_message: None,
                    }),
                    Ok(PickerResponse {
                        cancelled: false,
                        assets: vec![PickedAsset {
                            uri: "file:///tmp/second.mp4".to_string(),
                        }],
                        error_message: None,
                    }),
                ])),
                delay: None,
            },
            FakeProbe::sequence(vec![Ok(100), Ok(200)]).slow(Duration::from_millis(600)),
            FakeStore::new(),
        );

        let mut states = c.states();
        let (orphaned, _) = tokio::join!(c.select(), async {
            loop {
                if *states.borrow_and_update() == UploadState::Checking {
                    break;
                }
                if states.changed().await.is_err() {
                    return;
                }
            }
            assert!(c.cancel());
        });
        assert_eq!(orphaned, SelectOutcome::Cancelled);

        // the coordinator is free again and the new session is untouched
        // by the first one's leftover probe result
        match c.select().await {
            SelectOutcome::Staged(staged) => {
                assert_eq!(staged.uri, "file:///tmp/second.mp4");
                assert_eq!(staged.file_size, 200);
            }
            other => panic!("expected staged, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselection_replaces_stage() {
        let c = UploadCoordinator::new(
            FakePicker {
                responses: Mutex::new(VecDeque::from([
                    Ok(PickerResponse {
                        cancelled: false,
                        assets: vec![PickedAsset {
                            uri: "file:///tmp/first.mp4".to_string(),
                        }],
                        error_message: None,
                    }),
                    Ok(PickerResponse {
                        cancelled: false,
                        assets: vec![PickedAsset {
                            uri: "file:///tmp/second.mp4".to_string(),
                        }],
                        error_message: None,
                    }),
                ])),
                delay: None,
            },
            FakeProbe::sequence(vec![Ok(100), Ok(200)]),
            FakeStore::new(),
        );

        assert!(matches!(c.select().await, SelectOutcome::Staged(_)));
        match c.select().await {
            SelectOutcome::Staged(staged) => {
                assert_eq!(staged.uri, "file:///tmp/second.mp4");
                assert_eq!(staged.file_size, 200);
            }
            other => panic!("expected re-staged, got {:?}", other),
        }
    }
}
