//! Sync coordinator state machine.
//!
//! Startup compares the durable local cursor against the server's and takes
//! one of three roads: full bootstrap (no cursor, or local ahead of remote),
//! delta catch-up (local behind), or straight to live tailing (equal). Every
//! transition lands in an explicit [`SyncPhase`]; there is no implicit state
//! hiding in callbacks.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::Transport;
use crate::repos::{
    BookmarkRepo, ChangeEvent, CollectionRepo, CursorRepo, EntityStore, HighlightRepo,
    SettingsRepo, TagRepo,
};
use crate::services::credential_store::{CredentialStore, SESSION_TOKEN_KEY};
use crate::sync::live::LiveDemultiplexer;
use crate::sync::pipeline::MutationPipeline;
use crate::types::bookmark::Bookmark;
use crate::types::errors::SyncError;
use crate::types::highlight::Highlight;
use crate::types::mutation::MutationEnvelope;
use crate::types::settings::UserSettings;
use crate::types::wire::{BacklogRecord, LiveMessage, SyncRecord};

/// Where the coordinator currently is. `LoginRequired` is terminal until the
/// user authenticates again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    CheckingAuth,
    NeedsBootstrap,
    NeedsDelta,
    UpToDate,
    Bootstrapping,
    StreamingBacklog,
    LiveTailing,
    LoginRequired,
}

pub struct SyncCoordinator<T: Transport> {
    transport: T,
    store: EntityStore,
    pipeline: MutationPipeline,
    credentials: Arc<dyn CredentialStore + Send + Sync>,
    live: LiveDemultiplexer,
    phase: SyncPhase,
}

impl<T: Transport> SyncCoordinator<T> {
    pub fn new(
        transport: T,
        store: EntityStore,
        credentials: Arc<dyn CredentialStore + Send + Sync>,
    ) -> Self {
        let pipeline = MutationPipeline::new(store.clone());
        let live = LiveDemultiplexer::new(pipeline.clone());
        Self {
            transport,
            store,
            pipeline,
            credentials,
            live,
            phase: SyncPhase::Idle,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn client_id(&self) -> &str {
        self.live.client_id()
    }

    /// Runs the startup sequence to completion. An authentication failure is
    /// not an error: it parks the coordinator in `LoginRequired` and returns
    /// `Ok`. Anything else that fails mid-flight leaves the phase where the
    /// failure happened so a retry can resume from a durable state.
    pub fn start(&mut self) -> Result<(), SyncError> {
        self.phase = SyncPhase::CheckingAuth;

        let user = match self.transport.fetch_user() {
            Ok(user) => user,
            Err(err) => {
                info!(error = %err, "authentication check failed, login required");
                self.phase = SyncPhase::LoginRequired;
                return Ok(());
            }
        };
        info!(user = %user.profile.email, remote_cursor = user.sync_id, "authenticated");

        self.save_settings(&user.settings)?;

        // A cursor read failure is indistinguishable from a fresh install;
        // both roads lead through a full bootstrap.
        let local = {
            let guard = self.store.lock()?;
            CursorRepo::new(guard.connection()).get().unwrap_or(None)
        };
        let remote = user.sync_id;

        match local {
            None | Some(0) => {
                debug!("no usable local cursor, full bootstrap");
                self.phase = SyncPhase::NeedsBootstrap;
                self.store.clear_all()?;
                // The clear just dropped the settings row with everything else.
                self.save_settings(&user.settings)?;
                self.bootstrap(remote)?;
            }
            Some(local) if local == remote => {
                debug!(cursor = local, "local store is current");
                self.phase = SyncPhase::UpToDate;
            }
            Some(local) if local < remote => {
                debug!(from = local, to = remote, "local store behind, delta catch-up");
                self.phase = SyncPhase::NeedsDelta;
                self.delta(local, remote)?;
            }
            Some(local) => {
                warn!(
                    local,
                    remote, "local cursor ahead of server, discarding local state"
                );
                self.phase = SyncPhase::NeedsBootstrap;
                self.store.clear_all()?;
                self.save_settings(&user.settings)?;
                self.bootstrap(remote)?;
            }
        }

        self.phase = SyncPhase::LiveTailing;
        self.live.set_live();
        Ok(())
    }

    /// Upserts the settings singleton from the remote user record and
    /// announces the change.
    fn save_settings(&self, settings: &UserSettings) -> Result<(), SyncError> {
        {
            let guard = self.store.lock()?;
            SettingsRepo::new(guard.connection()).save(settings)?;
        }
        self.store.notify(ChangeEvent::Settings);
        Ok(())
    }

    /// Full rebuild: snapshot of collections and tags, then the streamed
    /// backlog of bookmarks and highlights, then the cursor in one move.
    fn bootstrap(&mut self, remote_cursor: i64) -> Result<(), SyncError> {
        self.phase = SyncPhase::Bootstrapping;
        let snapshot = self.transport.fetch_bootstrap_snapshot()?;
        info!(
            collections = snapshot.collections.len(),
            tags = snapshot.tags.len(),
            "bootstrap snapshot fetched"
        );
        {
            let guard = self.store.lock()?;
            TagRepo::new(guard.connection()).bulk_insert(&snapshot.tags)?;
            CollectionRepo::new(guard.connection()).bulk_insert(&snapshot.collections)?;
        }

        self.phase = SyncPhase::StreamingBacklog;
        let backlog = self.transport.fetch_backlog()?;
        let (bookmarks, highlights) = Self::parse_backlog(&backlog);
        info!(
            bookmarks = bookmarks.len(),
            highlights = highlights.len(),
            "backlog parsed"
        );
        {
            let guard = self.store.lock()?;
            BookmarkRepo::new(guard.connection()).bulk_insert(&bookmarks)?;
            HighlightRepo::new(guard.connection()).bulk_insert(&highlights)?;
            CursorRepo::new(guard.connection()).set(remote_cursor)?;
        }

        self.store.notify(ChangeEvent::Collections);
        self.store.notify(ChangeEvent::Tags);
        self.store.notify(ChangeEvent::Bookmarks);
        self.store.notify(ChangeEvent::Highlights);
        Ok(())
    }

    /// Splits the newline-delimited backlog into typed records. A line that
    /// fails to decode is logged and skipped; one bad record must not sink
    /// an otherwise good bootstrap.
    fn parse_backlog(backlog: &str) -> (Vec<Bookmark>, Vec<Highlight>) {
        let mut bookmarks = Vec::new();
        let mut highlights = Vec::new();
        for line in backlog.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<BacklogRecord>(line) {
                Ok(BacklogRecord::Bookmarks(bookmark)) => bookmarks.push(bookmark),
                Ok(BacklogRecord::Highlights(highlight)) => highlights.push(highlight),
                Err(err) => {
                    warn!(error = %err, "skipping undecodable backlog line");
                }
            }
        }
        (bookmarks, highlights)
    }

    /// Applies all changes in `(from, to]`. The cursor only advances when no
    /// record hit an integrity failure; decode failures alone do not hold it
    /// back, since retrying those can never succeed.
    fn delta(&mut self, from: i64, to: i64) -> Result<(), SyncError> {
        let batch = self.transport.fetch_delta(from, to)?;
        info!(count = batch.count, from, to, "delta batch fetched");

        let envelopes: Vec<MutationEnvelope> = batch
            .records
            .iter()
            .filter_map(Self::record_to_envelope)
            .collect();
        let failures = self.pipeline.apply_delta_changes(&envelopes);

        let integrity_failures = failures
            .iter()
            .filter(|(_, err)| err.is_integrity_failure())
            .count();
        if integrity_failures > 0 {
            self.phase = SyncPhase::NeedsDelta;
            return Err(SyncError::DeltaIncomplete(integrity_failures));
        }

        let guard = self.store.lock()?;
        CursorRepo::new(guard.connection()).set(to)?;
        Ok(())
    }

    // Delta records carry their data as a JSON-encoded string; decode that
    // second layer here so the pipeline sees normal envelopes.
    fn record_to_envelope(record: &SyncRecord) -> Option<MutationEnvelope> {
        match serde_json::from_str(&record.data) {
            Ok(data) => {
                let mut envelope =
                    MutationEnvelope::new(&record.operation, &record.collection, data);
                envelope.array_operation = record.array_operation.clone();
                Some(envelope)
            }
            Err(err) => {
                warn!(
                    sync_id = record.sync_id,
                    error = %err,
                    "skipping delta record with undecodable data"
                );
                None
            }
        }
    }

    /// Applies a mutation locally first, then pushes it to the server tagged
    /// with this client's id so the live echo gets suppressed.
    pub fn submit_local_mutation(
        &mut self,
        envelope: &MutationEnvelope,
    ) -> Result<(), SyncError> {
        self.pipeline.apply(envelope)?;
        self.transport
            .push_mutation(envelope, self.live.client_id())?;
        Ok(())
    }

    /// Feeds one inbound live message through the demultiplexer.
    pub fn handle_live_message(&mut self, message: &LiveMessage) {
        self.live.handle(message);
    }

    pub fn logout(&mut self) -> Result<(), SyncError> {
        self.credentials.delete(SESSION_TOKEN_KEY);
        self.live.stop();
        self.store.clear_all()?;
        self.phase = SyncPhase::LoginRequired;
        info!("logged out, local store cleared");
        Ok(())
    }
}
