#![forbid(unsafe_code)]

use crate::command::{CommandRecord, first_line};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvocationError {
    #[error("`{name}` is not an invocable command")]
    NotInvocable { name: String },
    #[error("`{name}` failed: {reason}")]
    Failed { name: String, reason: String },
}

impl InvocationError {
    pub fn name(&self) -> &str {
        match self {
            Self::NotInvocable { name } | Self::Failed { name, .. } => name,
        }
    }
}

/// The host's set of named actions. The catalog is built from
/// [`ActionRegistry::enumerate`]; the remaining methods are consulted per
/// candidate and once after a selection is confirmed.
pub trait ActionRegistry {
    fn enumerate(&self) -> Vec<CommandRecord>;

    fn is_invocable(&self, name: &str) -> bool;

    fn documentation_first_line(&self, name: &str) -> Option<String>;

    fn invoke(&self, name: &str) -> Result<(), InvocationError>;
}

impl<R: ActionRegistry + ?Sized> ActionRegistry for &R {
    fn enumerate(&self) -> Vec<CommandRecord> {
        (**self).enumerate()
    }

    fn is_invocable(&self, name: &str) -> bool {
        (**self).is_invocable(name)
    }

    fn documentation_first_line(&self, name: &str) -> Option<String> {
        (**self).documentation_first_line(name)
    }

    fn invoke(&self, name: &str) -> Result<(), InvocationError> {
        (**self).invoke(name)
    }
}

/// In-memory registry that records every invocation instead of running
/// anything.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    records: Vec<CommandRecord>,
    by_name: HashMap<String, usize>,
    disabled: HashSet<String>,
    invocations: Mutex<Vec<String>>,
}

impl StaticRegistry {
    pub fn new(records: Vec<CommandRecord>) -> Self {
        let by_name = records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.name().to_string(), index))
            .collect();
        Self {
            records,
            by_name,
            disabled: HashSet::new(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Keeps the record enumerable but reports it as no longer invocable.
    pub fn disable(&mut self, name: &str) {
        self.disabled.insert(name.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.records.retain(|record| record.name() != name);
        self.by_name = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.name().to_string(), index))
            .collect();
    }

    pub fn invocations(&self) -> Vec<String> {
        match self.invocations.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, name: &str) -> Option<&CommandRecord> {
        self.by_name.get(name).map(|&index| &self.records[index])
    }
}

impl ActionRegistry for StaticRegistry {
    fn enumerate(&self) -> Vec<CommandRecord> {
        self.records.clone()
    }

    fn is_invocable(&self, name: &str) -> bool {
        self.record(name).is_some() && !self.disabled.contains(name)
    }

    fn documentation_first_line(&self, name: &str) -> Option<String> {
        self.record(name)
            .and_then(|record| first_line(record.description()))
            .map(str::to_string)
    }

    fn invoke(&self, name: &str) -> Result<(), InvocationError> {
        if !self.is_invocable(name) {
            return Err(InvocationError::NotInvocable {
                name: name.to_string(),
            });
        }
        let mut log = match self.invocations.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.push(name.to_string());
        Ok(())
    }
}
