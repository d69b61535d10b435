#![forbid(unsafe_code)]

use thiserror::Error;

const MAX_NAME_LEN: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandName(String);

impl CommandName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, CommandNameError> {
        let value = value.into();
        validate_command_name(&value)?;
        Ok(Self(value))
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandNameError {
    #[error("command name must not be empty")]
    Empty,
    #[error("command name is too long")]
    TooLong,
    #[error("command name contains whitespace or control characters")]
    ContainsControl,
}

fn validate_command_name(value: &str) -> Result<(), CommandNameError> {
    if value.is_empty() {
        return Err(CommandNameError::Empty);
    }
    if value.len() > MAX_NAME_LEN {
        return Err(CommandNameError::TooLong);
    }
    if value.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(CommandNameError::ContainsControl);
    }
    Ok(())
}

/// A named, documented action as enumerated by an [`crate::ActionRegistry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRecord {
    name: CommandName,
    description: String,
}

impl CommandRecord {
    pub fn new(name: CommandName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
        }
    }

    pub fn try_new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CommandNameError> {
        Ok(Self::new(CommandName::try_new(name)?, description))
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn command_name(&self) -> &CommandName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn short_description(&self) -> Option<&str> {
        first_line(&self.description)
    }
}

/// First non-blank line of a documentation string, trimmed.
pub fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}
