#![forbid(unsafe_code)]

use crate::config::ConfigError;
use cmdq_core::{ActionRegistry, CommandRecord, InvocationError, first_line};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// One manifest entry. Entries without `run` are catalogued and documented
/// but cannot be invoked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<Vec<String>>,
}

/// Action registry backed by a JSON manifest: `[{"name", "description", "run"}]`.
#[derive(Clone, Debug, Default)]
pub struct ManifestRegistry {
    records: Vec<CommandRecord>,
    index: HashMap<String, usize>,
    argv: HashMap<String, Vec<String>>,
}

impl ManifestRegistry {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<ManifestEntry> =
            serde_json::from_str(&text).map_err(|source| ConfigError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        let registry = Self::from_entries(entries)?;
        tracing::debug!(
            path = %path.display(),
            commands = registry.records.len(),
            "loaded manifest"
        );
        Ok(registry)
    }

    pub fn from_entries(entries: Vec<ManifestEntry>) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for entry in entries {
            let record = CommandRecord::try_new(entry.name.clone(), entry.description)
                .map_err(|err| invalid_entry(&entry.name, err))?;
            if registry.index.contains_key(record.name()) {
                return Err(invalid_entry(&entry.name, "duplicate name"));
            }
            if let Some(argv) = entry.run {
                if argv.first().is_none_or(|program| program.trim().is_empty()) {
                    return Err(invalid_entry(&entry.name, "`run` needs a program"));
                }
                registry.argv.insert(record.name().to_string(), argv);
            }
            registry
                .index
                .insert(record.name().to_string(), registry.records.len());
            registry.records.push(record);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn invalid_entry(name: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEntry {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl ActionRegistry for ManifestRegistry {
    fn enumerate(&self) -> Vec<CommandRecord> {
        self.records.clone()
    }

    fn is_invocable(&self, name: &str) -> bool {
        self.argv.contains_key(name)
    }

    fn documentation_first_line(&self, name: &str) -> Option<String> {
        let record = &self.records[*self.index.get(name)?];
        first_line(record.description()).map(str::to_string)
    }

    fn invoke(&self, name: &str) -> Result<(), InvocationError> {
        let Some((program, args)) = self.argv.get(name).and_then(|argv| argv.split_first()) else {
            return Err(InvocationError::NotInvocable {
                name: name.to_string(),
            });
        };

        tracing::info!(command = name, program = %program, "invoking command");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|err| InvocationError::Failed {
                name: name.to_string(),
                reason: format!("spawn {program}: {err}"),
            })?;
        if !status.success() {
            return Err(InvocationError::Failed {
                name: name.to_string(),
                reason: format!("exited with {status}"),
            });
        }
        Ok(())
    }
}
