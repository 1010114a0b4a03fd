//! Logos-based lexer for protobuf schemas
//!
//! Fast tokenization using the logos crate. Both parser engines consume the
//! same token stream.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::{TextRange, TextSize};

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\x0B\x0C]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"0[xX][0-9a-fA-F]+|[0-9]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'"#)]
    String,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token(":")]
    Colon,
    #[token("/")]
    Slash,
}

/// Consume a block comment up to and including `*/`. An unterminated
/// comment runs to end of input and lexes as an error.
fn block_comment(lex: &mut logos::Lexer<LogosToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Int => SyntaxKind::INT,
            LogosToken::Float => SyntaxKind::FLOAT,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::LAngle => SyntaxKind::L_ANGLE,
            LogosToken::RAngle => SyntaxKind::R_ANGLE,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Slash => SyntaxKind::SLASH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_field_tokens() {
        assert_eq!(
            kinds("repeated string name = 1;"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::IDENT,
                SyntaxKind::IDENT,
                SyntaxKind::EQ,
                SyntaxKind::INT,
                SyntaxKind::SEMICOLON,
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(kinds("0x1F"), vec![SyntaxKind::INT]);
        assert_eq!(kinds("017"), vec![SyntaxKind::INT]);
        assert_eq!(kinds("1.5"), vec![SyntaxKind::FLOAT]);
        assert_eq!(kinds(".5e-3"), vec![SyntaxKind::FLOAT]);
        assert_eq!(kinds("-3"), vec![SyntaxKind::MINUS, SyntaxKind::INT]);
    }

    #[test]
    fn test_strings_both_quote_styles() {
        assert_eq!(kinds(r#""a\"b""#), vec![SyntaxKind::STRING]);
        assert_eq!(kinds(r"'it\'s'"), vec![SyntaxKind::STRING]);
    }

    #[test]
    fn test_comments_are_trivia() {
        let tokens = tokenize("// doc\n/* block\n comment */ message");
        assert_eq!(tokens[0].kind, SyntaxKind::LINE_COMMENT);
        assert_eq!(tokens[2].kind, SyntaxKind::BLOCK_COMMENT);
        assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::IDENT));
    }

    #[test]
    fn test_block_comment_forms() {
        for input in ["/* a */", "/** doc */", "/* a **/", "/**/", "/* x\n * y\n */"] {
            let tokens = tokenize(input);
            assert_eq!(tokens.len(), 1, "{input:?}");
            assert_eq!(tokens[0].kind, SyntaxKind::BLOCK_COMMENT);
            assert_eq!(tokens[0].text, input);
        }
        assert_eq!(
            kinds("/* a */ message /* b */ M"),
            vec![SyntaxKind::IDENT, SyntaxKind::IDENT]
        );
    }

    #[test]
    fn test_unterminated_block_comment_is_error() {
        let tokens = tokenize("message /* open");
        assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::ERROR));
        assert_eq!(tokens.last().map(|t| t.text), Some("/* open"));
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let input = "message Foo {}";
        let tokens = tokenize(input);
        let rebuilt: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, input);
        assert_eq!(tokens[2].offset, TextSize::new(8));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(kinds("\"abc").contains(&SyntaxKind::ERROR));
    }
}
