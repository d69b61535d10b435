#![forbid(unsafe_code)]

use crate::resolve::{CandidateSource, MatchTier, QueryError, Resolution};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Singleton,
    Multiple,
}

/// Per-invocation selection state. The offset persists across re-queries so
/// a rotation survives retyping; only [`QuerySession::reset_offset`] (done
/// at the start of a top-level invocation) clears it.
#[derive(Clone, Debug, Default)]
pub struct QuerySession {
    raw_input: String,
    offset: i64,
    candidates: Vec<String>,
    tier: MatchTier,
    degraded: bool,
}

impl QuerySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_offset(&mut self) {
        self.offset = 0;
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn tier(&self) -> MatchTier {
        self.tier
    }

    /// True when the last query failed and was degraded to "no match".
    pub fn degraded(&self) -> bool {
        self.degraded
    }

    pub fn state(&self) -> SessionState {
        match self.candidates.len() {
            0 => SessionState::Empty,
            1 => SessionState::Singleton,
            _ => SessionState::Multiple,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        let len = i64::try_from(self.candidates.len()).ok()?;
        if len == 0 {
            return None;
        }
        usize::try_from(self.offset.rem_euclid(len)).ok()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected_index()
            .map(|index| self.candidates[index].as_str())
    }

    pub fn on_input<S>(&mut self, source: &S, query: &str)
    where
        S: CandidateSource + ?Sized,
    {
        let result = source.resolve(query);
        self.apply(query, result);
    }

    /// Replaces the candidate list with a resolver result. Failures degrade to
    /// state Empty rather than propagating.
    pub fn apply(&mut self, query: &str, result: Result<Resolution, QueryError>) {
        self.raw_input.clear();
        self.raw_input.push_str(query);
        match result {
            Ok(resolution) => {
                tracing::debug!(
                    query,
                    tier = resolution.tier.as_str(),
                    hits = resolution.len(),
                    offset = self.offset,
                    "resolved query"
                );
                self.tier = resolution.tier;
                self.candidates = resolution.names;
                self.degraded = false;
            }
            Err(err) => {
                tracing::warn!(query, error = %err, "query degraded to no match");
                self.tier = MatchTier::None;
                self.candidates.clear();
                self.degraded = true;
            }
        }
    }

    pub fn rotate(&mut self, delta: i64) {
        self.offset = self.offset.saturating_add(delta);
    }

    pub fn confirm(self) -> Option<String> {
        let index = self.selected_index()?;
        self.candidates.into_iter().nth(index)
    }
}
