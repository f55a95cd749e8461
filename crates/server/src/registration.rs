//! Worker registration state machine.
//!
//! The registration owns the worker versions for one scope and decides which
//! one receives events. Versions move through
//! `installing -> installed (waiting) -> activating -> activated`; a version
//! that fails to install, or is superseded, becomes `redundant`; only the most
//! recent redundant version is remembered.
//!
//! Lifecycle events (register, activate) are serialized by `lifecycle`.
//! Fetches only take a short read lock on the slots, so the active version
//! keeps serving while a new one installs.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::worker::{self, ActivateReport, FetchOutcome, InstallReport, ResponseSource};
use swcache_core::{CacheDb, Error, Network, Request, WorkerConfig};
use tokio::sync::{Mutex, RwLock};

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// One registered worker version.
#[derive(Debug, Clone)]
pub struct WorkerVersion {
    pub id: u64,
    pub config: WorkerConfig,
    pub state: WorkerState,
}

/// Serializable view of a worker version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSummary {
    pub id: u64,
    pub cache_name: String,
    pub precache_urls: Vec<String>,
    pub state: WorkerState,
}

impl From<&WorkerVersion> for WorkerSummary {
    fn from(version: &WorkerVersion) -> Self {
        Self {
            id: version.id,
            cache_name: version.config.cache_name.clone(),
            precache_urls: version.config.precache_urls.clone(),
            state: version.state,
        }
    }
}

/// Snapshot of the registration slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RegistrationStatus {
    pub installing: Option<WorkerSummary>,
    pub waiting: Option<WorkerSummary>,
    pub active: Option<WorkerSummary>,
    /// The most recently retired version.
    pub redundant: Option<WorkerSummary>,
}

#[derive(Debug, Default)]
struct Slots {
    installing: Option<WorkerVersion>,
    waiting: Option<WorkerVersion>,
    active: Option<WorkerVersion>,
    redundant: Option<WorkerVersion>,
    next_id: u64,
}

impl Slots {
    fn retire(&mut self, mut version: WorkerVersion) {
        version.state = WorkerState::Redundant;
        self.redundant = Some(version);
    }
}

/// Registration for a single scope.
pub struct Registration {
    db: CacheDb,
    network: Arc<dyn Network>,
    slots: RwLock<Slots>,
    lifecycle: Mutex<()>,
}

impl Registration {
    pub fn new(db: CacheDb, network: Arc<dyn Network>) -> Self {
        Self { db, network, slots: RwLock::new(Slots::default()), lifecycle: Mutex::new(()) }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Register and install a worker version.
    ///
    /// On success the version is left waiting; any previously waiting
    /// version becomes redundant. On failure the new version is redundant
    /// and the active version, if any, is untouched.
    pub async fn register(&self, config: WorkerConfig) -> Result<InstallReport, Error> {
        let _lifecycle = self.lifecycle.lock().await;

        let id = {
            let mut slots = self.slots.write().await;
            slots.next_id += 1;
            let id = slots.next_id;
            slots.installing = Some(WorkerVersion { id, config: config.clone(), state: WorkerState::Installing });
            id
        };
        tracing::info!(worker = id, cache_name = %config.cache_name, "worker installing");

        let result = worker::install(&config, &self.db, self.network.as_ref()).await;

        let mut slots = self.slots.write().await;
        let installing = slots.installing.take();
        match result {
            Ok(report) => {
                if let Some(mut version) = installing {
                    version.state = WorkerState::Installed;
                    if let Some(previous) = slots.waiting.replace(version) {
                        tracing::info!(worker = previous.id, "waiting worker superseded, now redundant");
                        slots.retire(previous);
                    }
                }
                tracing::info!(worker = id, "worker installed, waiting to activate");
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(worker = id, error = %e, "install failed, worker redundant");
                if let Some(version) = installing {
                    slots.retire(version);
                }
                Err(e)
            }
        }
    }

    /// Promote the waiting version and run its activate handler.
    ///
    /// The previous active version becomes redundant. The promotion stands
    /// even if the handler fails; the error is still returned.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let _lifecycle = self.lifecycle.lock().await;

        let (id, config) = {
            let mut slots = self.slots.write().await;
            let Some(mut version) = slots.waiting.take() else {
                return Err(Error::InvalidState("no waiting worker to activate".into()));
            };
            version.state = WorkerState::Activating;
            let promoted = (version.id, version.config.clone());
            if let Some(previous) = slots.active.replace(version) {
                tracing::info!(worker = previous.id, "active worker replaced, now redundant");
                slots.retire(previous);
            }
            promoted
        };
        tracing::info!(worker = id, cache_name = %config.cache_name, "worker activating");

        let result = worker::activate(&config, &self.db).await;

        let mut slots = self.slots.write().await;
        if let Some(active) = slots.active.as_mut().filter(|active| active.id == id) {
            active.state = WorkerState::Activated;
        }
        tracing::info!(worker = id, "worker activated");

        result
    }

    /// First registration for a scope: install, then activate right away when
    /// no version is active yet.
    pub async fn start(&self, config: WorkerConfig) -> Result<(), Error> {
        self.register(config).await?;
        if self.slots.read().await.active.is_none() {
            self.activate().await?;
        }
        Ok(())
    }

    /// Deliver a fetch event.
    ///
    /// Without an active version the request is uncontrolled and goes
    /// straight to the network.
    pub async fn fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let controlled = self.slots.read().await.active.is_some();
        if controlled {
            return worker::handle_fetch(&self.db, self.network.as_ref(), request).await;
        }

        tracing::debug!(url = %request.url, "uncontrolled request, going to network");
        let response = self.network.fetch(request).await?;
        Ok(FetchOutcome { source: ResponseSource::Network, response })
    }

    pub async fn status(&self) -> RegistrationStatus {
        let slots = self.slots.read().await;
        RegistrationStatus {
            installing: slots.installing.as_ref().map(WorkerSummary::from),
            waiting: slots.waiting.as_ref().map(WorkerSummary::from),
            active: slots.active.as_ref().map(WorkerSummary::from),
            redundant: slots.redundant.as_ref().map(WorkerSummary::from),
        }
    }
}
