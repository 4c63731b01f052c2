//! Variable-token translation between stored and display expressions.
//!
//! The table stores expressions with permanent column labels as variable
//! tokens; the UI shows and accepts user-facing names. Both directions are
//! the same pure substitution over tokenizer output: identifiers found in
//! the mapping are replaced, everything else (operators, spacing, function
//! names, unmapped identifiers) is carried through byte for byte.

use std::collections::{BTreeSet, HashMap};

use super::token::{TokenKind, tokenize};

/// Substitute identifiers according to `mapping`, preserving all other
/// source text exactly.
///
/// Input that does not tokenize is returned unchanged: it will fail
/// evaluation anyway and be absorbed by the column validity flag, so
/// translation never raises.
pub fn rename_variables(expression: &str, mapping: &HashMap<String, String>) -> String {
    let tokens = match tokenize(expression) {
        Ok(tokens) => tokens,
        Err(_) => return expression.to_string(),
    };

    let mut out = String::with_capacity(expression.len());
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(&expression[cursor..token.span.start]);
        match &token.kind {
            TokenKind::Ident(name) => match mapping.get(name) {
                Some(replacement) => out.push_str(replacement),
                None => out.push_str(name),
            },
            _ => out.push_str(&expression[token.span.start..token.span.end]),
        }
        cursor = token.span.end;
    }
    out.push_str(&expression[cursor..]);
    out
}

/// All identifiers appearing in an expression, including function names.
///
/// Returns an empty set for input that does not tokenize.
pub fn variable_names(expression: &str) -> BTreeSet<String> {
    match tokenize(expression) {
        Ok(tokens) => tokens
            .into_iter()
            .filter_map(|t| match t.kind {
                TokenKind::Ident(name) => Some(name),
                _ => None,
            })
            .collect(),
        Err(_) => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rename_preserves_spacing_and_operators() {
        let m = mapping(&[("col1", "x"), ("col2", "y")]);
        assert_eq!(
            rename_variables("col1 **2 + sin( col2 )", &m),
            "x **2 + sin( y )"
        );
    }

    #[test]
    fn test_rename_leaves_unmapped_identifiers() {
        let m = mapping(&[("col1", "x")]);
        assert_eq!(rename_variables("col1 + col2", &m), "x + col2");
    }

    #[test]
    fn test_rename_does_not_touch_partial_matches() {
        // col1 must not be rewritten inside col10.
        let m = mapping(&[("col1", "x")]);
        assert_eq!(rename_variables("col10 + col1", &m), "col10 + x");
    }

    #[test]
    fn test_rename_identity_mapping_is_stable() {
        // The degenerate case where label == name: repeated translation
        // must be a fixed point, never a rewrite loop.
        let m = mapping(&[("col1", "col1")]);
        let once = rename_variables("col1 + 1", &m);
        let twice = rename_variables(&once, &m);
        assert_eq!(once, "col1 + 1");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rename_passes_through_untokenizable_input() {
        let m = mapping(&[("col1", "x")]);
        assert_eq!(rename_variables("col1 @ 2", &m), "col1 @ 2");
    }

    #[test]
    fn test_variable_names() {
        let names = variable_names("sin(x) + y * x");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["sin".to_string(), "x".to_string(), "y".to_string()]
        );
        assert!(variable_names("1 @ 2").is_empty());
    }
}
