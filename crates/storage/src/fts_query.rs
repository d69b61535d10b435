#![forbid(unsafe_code)]

/// Quotes a fragment as an FTS5 string so none of its characters are read as
/// query syntax.
pub(crate) fn escape_fts5_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('"');
    for ch in term.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Builds a column-restricted prefix query: every whitespace-separated
/// fragment must prefix-match a token of `column`. Fragments with no
/// alphanumeric characters tokenize to nothing and are dropped; `None` means
/// nothing searchable remains.
pub(crate) fn match_expression(query: &str, column: &str) -> Option<String> {
    let clauses = query
        .split_whitespace()
        .filter(|fragment| fragment.chars().any(char::is_alphanumeric))
        .map(|fragment| format!("{column} : {}*", escape_fts5_term(fragment)))
        .collect::<Vec<_>>();
    if clauses.is_empty() {
        return None;
    }
    Some(clauses.join(" AND "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_embedded_quotes() {
        assert_eq!(escape_fts5_term("save"), "\"save\"");
        assert_eq!(escape_fts5_term("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn joins_fragments_with_and() {
        assert_eq!(
            match_expression("  save  buf ", "name").as_deref(),
            Some("name : \"save\"* AND name : \"buf\"*")
        );
    }

    #[test]
    fn operators_are_quoted_not_interpreted() {
        assert_eq!(
            match_expression("OR NOT", "description").as_deref(),
            Some("description : \"OR\"* AND description : \"NOT\"*")
        );
    }

    #[test]
    fn punctuation_only_is_unsearchable() {
        assert_eq!(match_expression("- ( *", "name"), None);
        assert_eq!(match_expression("", "name"), None);
    }
}
