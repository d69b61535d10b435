#![forbid(unsafe_code)]

use crate::annotate::feedback_line;
use crate::registry::ActionRegistry;
use crate::resolve::CandidateSource;
use crate::session::{QuerySession, SessionState};

pub trait FeedbackSink {
    fn render_feedback(&mut self, display_text: &str);
}

/// One user gesture forwarded by a presentation front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    Input(String),
    Next,
    Previous,
    Confirm,
    Cancel,
}

/// A front end that produces gestures and shows feedback. Returning `None`
/// from `next_gesture` ends the session as cancelled.
pub trait PresentationAdapter: FeedbackSink {
    fn next_gesture(&mut self) -> Option<Gesture>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Confirmed(String),
    NoSelection,
    Cancelled,
}

impl SessionOutcome {
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Confirmed(name) => Some(name),
            Self::NoSelection | Self::Cancelled => None,
        }
    }
}

/// Couples a [`QuerySession`] with its resolver and registry and re-renders
/// feedback after every transition.
pub struct SessionDriver<'a, S: ?Sized, R: ?Sized> {
    source: &'a S,
    registry: &'a R,
    previous: Option<String>,
    session: QuerySession,
}

impl<'a, S, R> SessionDriver<'a, S, R>
where
    S: CandidateSource + ?Sized,
    R: ActionRegistry + ?Sized,
{
    /// Starts a fresh top-level invocation: offset reset, nothing queried yet.
    pub fn new(source: &'a S, registry: &'a R, previous: Option<String>) -> Self {
        let mut session = QuerySession::new();
        session.reset_offset();
        Self {
            source,
            registry,
            previous,
            session,
        }
    }

    pub fn session(&self) -> &QuerySession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn display_text(&self) -> String {
        feedback_line(&self.session, self.registry, self.previous.as_deref())
    }

    pub fn on_input(&mut self, sink: &mut dyn FeedbackSink, query: &str) {
        self.session.on_input(self.source, query);
        sink.render_feedback(&self.display_text());
    }

    pub fn rotate_next(&mut self, sink: &mut dyn FeedbackSink) {
        self.rotate(sink, 1);
    }

    pub fn rotate_previous(&mut self, sink: &mut dyn FeedbackSink) {
        self.rotate(sink, -1);
    }

    fn rotate(&mut self, sink: &mut dyn FeedbackSink, delta: i64) {
        self.session.rotate(delta);
        sink.render_feedback(&self.display_text());
    }

    pub fn on_confirm(self) -> SessionOutcome {
        match self.session.confirm() {
            Some(name) => SessionOutcome::Confirmed(name),
            None => SessionOutcome::NoSelection,
        }
    }

    pub fn cancel(self) -> SessionOutcome {
        tracing::debug!(query = self.session.raw_input(), "selection cancelled");
        SessionOutcome::Cancelled
    }

    /// Runs the session to completion: an initial empty query, then one
    /// transition per gesture until confirm or cancel.
    pub fn drive<A>(mut self, adapter: &mut A) -> SessionOutcome
    where
        A: PresentationAdapter,
    {
        self.on_input(adapter, "");
        loop {
            match adapter.next_gesture() {
                Some(Gesture::Input(query)) => self.on_input(adapter, &query),
                Some(Gesture::Next) => self.rotate_next(adapter),
                Some(Gesture::Previous) => self.rotate_previous(adapter),
                Some(Gesture::Confirm) => return self.on_confirm(),
                Some(Gesture::Cancel) | None => return self.cancel(),
            }
        }
    }
}
