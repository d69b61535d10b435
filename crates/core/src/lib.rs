#![forbid(unsafe_code)]

//! Storage-free domain for the command catalog: records, the action registry
//! capability, the resolver seam and the per-invocation selection session.

mod annotate;
mod command;
mod driver;
mod registry;
mod resolve;
mod session;

pub use annotate::{NO_DOCUMENTATION, NO_MATCH, NOT_A_FUNCTION, annotate, feedback_line};
pub use command::{CommandName, CommandNameError, CommandRecord, first_line};
pub use driver::{FeedbackSink, Gesture, PresentationAdapter, SessionDriver, SessionOutcome};
pub use registry::{ActionRegistry, InvocationError, StaticRegistry};
pub use resolve::{CandidateSource, MatchTier, QueryError, Resolution};
pub use session::{QuerySession, SessionState};
