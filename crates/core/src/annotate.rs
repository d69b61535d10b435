#![forbid(unsafe_code)]

use crate::registry::ActionRegistry;
use crate::session::QuerySession;

pub const NO_DOCUMENTATION: &str = "[no documentation]";
pub const NOT_A_FUNCTION: &str = "[not a function]";
pub const NO_MATCH: &str = "[no match]";
const CURRENT_MARKER: &str = " (current)";

/// Display text for one candidate: `name[ (current)]: <first doc line>`.
pub fn annotate<R>(name: &str, registry: &R, previous: Option<&str>) -> String
where
    R: ActionRegistry + ?Sized,
{
    let mut out = String::with_capacity(name.len() + 48);
    out.push_str(name);
    if previous == Some(name) {
        out.push_str(CURRENT_MARKER);
    }
    out.push_str(": ");
    if !registry.is_invocable(name) {
        out.push_str(NOT_A_FUNCTION);
        return out;
    }
    match registry.documentation_first_line(name) {
        Some(line) if !line.trim().is_empty() => out.push_str(line.trim()),
        _ => out.push_str(NO_DOCUMENTATION),
    }
    out
}

pub fn feedback_line<R>(session: &QuerySession, registry: &R, previous: Option<&str>) -> String
where
    R: ActionRegistry + ?Sized,
{
    match session.selected() {
        Some(name) => annotate(name, registry, previous),
        None => NO_MATCH.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandRecord, Resolution, StaticRegistry};

    fn registry() -> StaticRegistry {
        let mut registry = StaticRegistry::new(vec![
            CommandRecord::try_new("save-file", "Save the current buffer.\nMore text.")
                .expect("record"),
            CommandRecord::try_new("quit", "").expect("record"),
            CommandRecord::try_new("old-thing", "Deprecated.").expect("record"),
        ]);
        registry.disable("old-thing");
        registry
    }

    #[test]
    fn annotates_with_first_description_line() {
        let registry = registry();
        assert_eq!(
            annotate("save-file", &registry, None),
            "save-file: Save the current buffer."
        );
    }

    #[test]
    fn marks_the_previous_command() {
        let registry = registry();
        assert_eq!(
            annotate("save-file", &registry, Some("save-file")),
            "save-file (current): Save the current buffer."
        );
        assert_eq!(
            annotate("save-file", &registry, Some("quit")),
            "save-file: Save the current buffer."
        );
    }

    #[test]
    fn undocumented_and_stale_candidates() {
        let registry = registry();
        assert_eq!(annotate("quit", &registry, None), "quit: [no documentation]");
        assert_eq!(
            annotate("old-thing", &registry, None),
            "old-thing: [not a function]"
        );
        assert_eq!(annotate("ghost", &registry, None), "ghost: [not a function]");
    }

    #[test]
    fn empty_session_renders_no_match() {
        let registry = registry();
        let mut session = QuerySession::new();
        session.apply("zzz", Ok(Resolution::empty()));
        assert_eq!(feedback_line(&session, &registry, None), NO_MATCH);
    }
}
