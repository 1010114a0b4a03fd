//! Doc comment attachment.
//!
//! A definition's documentation is the run of comments directly above it,
//! with no blank line in between. Comments that trail the previous statement
//! on its own line do not count. If there are no leading comments, a comment
//! on the same line after the definition's anchor token is used instead.

use crate::parser::SyntaxKind;

/// Leading doc comment, given the tokens before a definition in reverse order.
pub fn leading_doc<S: AsRef<str>>(
    before: impl Iterator<Item = (SyntaxKind, S)>,
) -> Option<String> {
    let mut trivia = Vec::new();
    let mut preceded_by_code = false;
    for (kind, text) in before {
        if !kind.is_trivia() {
            preceded_by_code = true;
            break;
        }
        trivia.push((kind, text));
    }

    let mut docs = Vec::new();
    for (i, (kind, text)) in trivia.iter().enumerate() {
        let text = text.as_ref();
        if *kind == SyntaxKind::WHITESPACE {
            if text.matches('\n').count() >= 2 {
                break;
            }
            continue;
        }
        let on_code_line =
            preceded_by_code && trivia[i + 1..].iter().all(|(_, t)| !t.as_ref().contains('\n'));
        if on_code_line {
            break;
        }
        docs.push(text);
    }

    if docs.is_empty() {
        return None;
    }
    docs.reverse();
    let cleaned: Vec<String> = docs.into_iter().map(clean_comment).collect();
    non_empty(cleaned.join("\n"))
}

/// Trailing comment on the same line, given the tokens after the anchor.
pub fn trailing_doc<S: AsRef<str>>(
    mut after: impl Iterator<Item = (SyntaxKind, S)>,
) -> Option<String> {
    loop {
        let (kind, text) = after.next()?;
        let text = text.as_ref();
        match kind {
            SyntaxKind::WHITESPACE if !text.contains('\n') => continue,
            SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT => {
                return non_empty(clean_comment(text));
            }
            _ => return None,
        }
    }
}

/// Strip comment markers and per-line decoration.
pub fn clean_comment(text: &str) -> String {
    if let Some(line) = text.strip_prefix("//") {
        let line = line.strip_prefix('/').unwrap_or(line);
        return line.strip_prefix(' ').unwrap_or(line).trim_end().to_string();
    }
    let body = text
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(text);
    let body = body.strip_prefix('*').unwrap_or(body);
    body.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            trimmed.strip_prefix(' ').unwrap_or(trimmed).trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn non_empty(text: String) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;

    fn doc_before(source: &str, marker: &str) -> Option<String> {
        let tokens = tokenize(source);
        let idx = tokens
            .iter()
            .position(|t| t.text == marker)
            .expect("marker token");
        leading_doc(tokens[..idx].iter().rev().map(|t| (t.kind, t.text)))
    }

    #[test]
    fn test_contiguous_line_comments() {
        let source = "// first\n// second\nmessage Foo {}";
        assert_eq!(doc_before(source, "message").as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_blank_line_detaches() {
        let source = "// detached\n\nmessage Foo {}";
        assert_eq!(doc_before(source, "message"), None);
    }

    #[test]
    fn test_trailing_comment_of_previous_statement_ignored() {
        let source = "int32 a = 1; // about a\nstring b = 2;";
        assert_eq!(doc_before(source, "string"), None);
    }

    #[test]
    fn test_block_comment_cleaned() {
        let source = "/**\n * Block doc.\n * More.\n */\nenum E {}";
        assert_eq!(doc_before(source, "enum").as_deref(), Some("Block doc.\nMore."));
    }

    #[test]
    fn test_trailing_doc() {
        let tokens = tokenize("int32 a = 1; // about a\n");
        let semi = tokens.iter().position(|t| t.text == ";").unwrap();
        let doc = trailing_doc(tokens[semi + 1..].iter().map(|t| (t.kind, t.text)));
        assert_eq!(doc.as_deref(), Some("about a"));
    }
}
