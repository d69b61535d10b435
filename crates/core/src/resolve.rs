#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("catalog store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl QueryError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }
}

/// Which match pass produced a [`Resolution`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchTier {
    Name,
    Description,
    #[default]
    None,
}

impl MatchTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::None => "none",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub tier: MatchTier,
    pub names: Vec<String>,
}

impl Resolution {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn by_name(names: Vec<String>) -> Self {
        Self::tiered(MatchTier::Name, names)
    }

    pub fn by_description(names: Vec<String>) -> Self {
        Self::tiered(MatchTier::Description, names)
    }

    fn tiered(tier: MatchTier, names: Vec<String>) -> Self {
        if names.is_empty() {
            return Self::empty();
        }
        Self { tier, names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Resolves a raw query into an ordered candidate list.
pub trait CandidateSource {
    fn resolve(&self, query: &str) -> Result<Resolution, QueryError>;
}

impl<F> CandidateSource for F
where
    F: Fn(&str) -> Result<Resolution, QueryError>,
{
    fn resolve(&self, query: &str) -> Result<Resolution, QueryError> {
        self(query)
    }
}
