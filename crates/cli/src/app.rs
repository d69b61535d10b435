#![forbid(unsafe_code)]

use crate::config::ConfigError;
use cmdq_core::{
    ActionRegistry, InvocationError, PresentationAdapter, QueryError, Resolution, SessionDriver,
    SessionOutcome,
};
use cmdq_storage::{BuildReport, CatalogConfig, CatalogStore, IndexError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Invoked(String),
    NoSelection,
    Cancelled,
}

/// Process-level context: one catalog, one registry, and the
/// initialised flag that keeps [`Application::initialize`] from rebuilding
/// twice.
pub struct Application<R> {
    store: CatalogStore,
    registry: R,
    initialized: bool,
    last_confirmed: Option<String>,
}

impl<R: ActionRegistry> Application<R> {
    pub fn new(catalog: CatalogConfig, registry: R) -> Result<Self, AppError> {
        Ok(Self {
            store: CatalogStore::open(catalog)?,
            registry,
            initialized: false,
            last_confirmed: None,
        })
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn last_confirmed(&self) -> Option<&str> {
        self.last_confirmed.as_deref()
    }

    /// Builds the catalog once per process. Returns `None` when already
    /// initialised.
    pub fn initialize(&mut self) -> Result<Option<BuildReport>, AppError> {
        if self.initialized {
            return Ok(None);
        }
        self.rebuild().map(Some)
    }

    /// Rebuilds from a fresh enumeration regardless of the flag. A failure
    /// leaves the application uninitialised so the next call retries.
    pub fn rebuild(&mut self) -> Result<BuildReport, AppError> {
        let records = self.registry.enumerate();
        match self.store.build(&records) {
            Ok(report) => {
                self.initialized = true;
                Ok(report)
            }
            Err(err) => {
                self.initialized = false;
                Err(err.into())
            }
        }
    }

    pub fn resolve(&self, query: &str) -> Result<Resolution, QueryError> {
        self.store.resolve(query)
    }

    /// Runs one selection session through `adapter` and invokes the
    /// confirmed command. An empty confirmation or a cancel never reaches the
    /// registry.
    pub fn invoke_interactive<A>(&mut self, adapter: &mut A) -> Result<Outcome, AppError>
    where
        A: PresentationAdapter,
    {
        self.initialize()?;

        let driver = SessionDriver::new(&self.store, &self.registry, self.last_confirmed.clone());
        let name = match driver.drive(adapter) {
            SessionOutcome::Confirmed(name) => name,
            SessionOutcome::NoSelection => return Ok(Outcome::NoSelection),
            SessionOutcome::Cancelled => return Ok(Outcome::Cancelled),
        };

        self.last_confirmed = Some(name.clone());
        if !self.registry.is_invocable(&name) {
            tracing::warn!(command = %name, "confirmed command is no longer invocable");
            return Err(InvocationError::NotInvocable { name }.into());
        }
        self.registry.invoke(&name)?;
        Ok(Outcome::Invoked(name))
    }

    /// Forgets the in-process state; the on-disk catalog stays until the next
    /// rebuild.
    pub fn teardown(&mut self) {
        self.initialized = false;
        self.last_confirmed = None;
    }
}
