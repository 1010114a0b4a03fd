//! Recursive descent parser for protobuf schemas
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.
//!
//! Trivia is attached to the innermost open node at the time the following
//! significant token is consumed, and is flushed before a new node starts.
//! Every node therefore begins and ends on a significant token, which keeps
//! node ranges usable as source spans.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use crate::base::constants::MAX_NESTING_DEPTH;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse protobuf source into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, TextSize::of(input));
    parser.parse_source_file();
    parser.finish()
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    end: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Message and group bodies currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], end: TextSize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn nth_token(&self, n: usize) -> Option<&'a Token<'a>> {
        let tokens: &'a [Token<'a>] = self.tokens;
        tokens[self.pos.min(tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
    }

    fn current(&self) -> Option<&'a Token<'a>> {
        self.nth_token(0)
    }

    fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n).map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        self.current().is_some_and(|t| kinds.contains(&t.kind))
    }

    fn at_eof(&self) -> bool {
        self.current().is_none()
    }

    fn nth_is_keyword(&self, n: usize, keyword: &str) -> bool {
        self.nth_token(n)
            .is_some_and(|t| t.kind == SyntaxKind::IDENT && t.text == keyword)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.nth_is_keyword(0, keyword)
    }

    /// `type name = N` starting at lookahead `n`
    fn field_shape_at(&self, n: usize) -> bool {
        let mut i = n;
        if self.nth(i) == SyntaxKind::DOT {
            i += 1;
        }
        if self.nth(i) != SyntaxKind::IDENT {
            return false;
        }
        i += 1;
        while self.nth(i) == SyntaxKind::DOT && self.nth(i + 1) == SyntaxKind::IDENT {
            i += 2;
        }
        self.nth(i) == SyntaxKind::IDENT
            && self.nth(i + 1) == SyntaxKind::EQ
            && self.nth(i + 2) == SyntaxKind::INT
    }

    /// A field label, unless the label word is itself the type of a field
    /// (`optional name = 1;`).
    fn label_at(&self, n: usize) -> bool {
        self.nth_token(n).is_some_and(|t| {
            t.kind == SyntaxKind::IDENT && matches!(t.text, "optional" | "required" | "repeated")
        }) && !(self.nth(n + 1) == SyntaxKind::IDENT && self.nth(n + 2) == SyntaxKind::EQ)
    }

    /// `group Name = N [opts]? {` starting at lookahead `n`
    fn group_shape_at(&self, n: usize) -> bool {
        if !self.nth_is_keyword(n, "group")
            || self.nth(n + 1) != SyntaxKind::IDENT
            || self.nth(n + 2) != SyntaxKind::EQ
            || self.nth(n + 3) != SyntaxKind::INT
        {
            return false;
        }
        let mut i = n + 4;
        if self.nth(i) == SyntaxKind::L_BRACKET {
            while !matches!(self.nth(i), SyntaxKind::R_BRACKET | SyntaxKind::ERROR) {
                i += 1;
            }
            i += 1;
        }
        self.nth(i) == SyntaxKind::L_BRACE
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn expect_semicolon(&mut self) {
        if !self.eat(SyntaxKind::SEMICOLON) {
            self.error_recover("expected ';'", &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE]);
            self.eat(SyntaxKind::SEMICOLON);
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| t.range())
            .unwrap_or_else(|| TextRange::empty(self.end));
        self.errors.push(SyntaxError::new(message, range));
    }

    /// Report an error and wrap skipped tokens in an ERROR node.
    ///
    /// Stops before any token in `recovery` at brace depth zero. Nested
    /// `{ ... }` blocks are skipped whole.
    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        if self.at_eof() || self.at_any(recovery) {
            return;
        }
        self.start_node(SyntaxKind::ERROR);
        let mut depth = 0usize;
        while let Some(token) = self.current() {
            if depth == 0 && recovery.contains(&token.kind) {
                break;
            }
            match token.kind {
                SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_BRACE if depth == 0 => break,
                SyntaxKind::R_BRACE => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        self.finish_node();
    }

    /// Skip one unexpected token inside an ERROR node.
    fn error_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        self.start_node(SyntaxKind::ERROR);
        self.bump();
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// SourceFile = Statement*
    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());

        while !self.at_eof() {
            let pos_before = self.pos;
            self.parse_top_level();
            // Safety: if we didn't make progress, force-skip a token
            if self.pos == pos_before && !self.at_eof() {
                self.error_bump(format!("stuck on token: {:?}", self.nth(0)));
            }
        }

        self.flush_trivia();
        self.finish_node();
    }

    fn parse_top_level(&mut self) {
        if self.eat(SyntaxKind::SEMICOLON) {
            return;
        }
        match self.current_text() {
            "syntax" if self.nth(1) == SyntaxKind::EQ => {
                self.parse_syntax_decl(SyntaxKind::SYNTAX_DECL)
            }
            "edition" if self.nth(1) == SyntaxKind::EQ => {
                self.parse_syntax_decl(SyntaxKind::EDITION_DECL)
            }
            "package" => self.parse_package(),
            "import" => self.parse_import(),
            "option" => self.parse_option_decl(),
            "message" => self.parse_message(),
            "enum" => self.parse_enum(),
            "service" => self.parse_service(),
            "extend" => self.parse_extend(),
            _ => {
                let text = self.current_text();
                self.error_bump(format!("unexpected '{text}' at top level"));
            }
        }
    }

    /// SyntaxDecl = ('syntax' | 'edition') '=' STRING+ ';'
    fn parse_syntax_decl(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.expect(SyntaxKind::EQ, "'='");
        if self.at_any(&[SyntaxKind::INT, SyntaxKind::IDENT]) {
            self.bump();
        } else if !self.at(SyntaxKind::STRING) {
            self.error("expected string literal");
        }
        while self.eat(SyntaxKind::STRING) {}
        self.expect_semicolon();
        self.finish_node();
    }

    /// PackageDecl = 'package' FullIdent ';'
    fn parse_package(&mut self) {
        self.start_node(SyntaxKind::PACKAGE_DECL);
        self.bump();
        if self.at(SyntaxKind::IDENT) {
            self.parse_full_ident(SyntaxKind::FULL_IDENT);
        } else {
            self.error("expected package name");
        }
        self.expect_semicolon();
        self.finish_node();
    }

    /// ImportDecl = 'import' ('public' | 'weak')? STRING ';'
    fn parse_import(&mut self) {
        self.start_node(SyntaxKind::IMPORT_DECL);
        self.bump();
        if self.nth(1) == SyntaxKind::STRING {
            let _ = self.eat_keyword("public") || self.eat_keyword("weak");
        }
        if self.at(SyntaxKind::STRING) {
            while self.eat(SyntaxKind::STRING) {}
        } else {
            self.error("expected import path");
        }
        self.expect_semicolon();
        self.finish_node();
    }

    /// Dotted identifier wrapped in `kind`, with an optional leading dot for TYPE_REF.
    fn parse_full_ident(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        if kind == SyntaxKind::TYPE_REF && self.at(SyntaxKind::DOT) {
            self.bump();
        }
        self.expect(SyntaxKind::IDENT, "identifier");
        while self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    fn parse_type_ref(&mut self, what: &str) {
        if self.at(SyntaxKind::IDENT)
            || (self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT)
        {
            self.parse_full_ident(SyntaxKind::TYPE_REF);
        } else {
            self.error(format!("expected {what}"));
        }
    }

    fn parse_name(&mut self, what: &str) {
        if self.at(SyntaxKind::IDENT) {
            self.start_node(SyntaxKind::NAME);
            self.bump();
            self.finish_node();
        } else {
            self.error(format!("expected {what}"));
        }
    }

    /// '=' '-'? INT
    fn parse_number(&mut self) {
        if self.expect(SyntaxKind::EQ, "'='") {
            self.eat(SyntaxKind::MINUS);
            self.expect(SyntaxKind::INT, "number");
        }
    }

    // =========================================================================
    // Options and constants
    // =========================================================================

    /// OptionDecl = 'option' OptionName '=' Constant ';'
    fn parse_option_decl(&mut self) {
        self.start_node(SyntaxKind::OPTION_DECL);
        self.bump();
        self.parse_option_entry_body();
        self.expect_semicolon();
        self.finish_node();
    }

    fn parse_option_entry_body(&mut self) {
        self.parse_option_name();
        if self.expect(SyntaxKind::EQ, "'='") {
            self.parse_constant();
        }
    }

    /// OptionName = Part ('.' Part)*, Part = IDENT | '(' '.'? FullIdent ')'
    fn parse_option_name(&mut self) {
        self.start_node(SyntaxKind::OPTION_NAME);
        loop {
            if self.eat(SyntaxKind::L_PAREN) {
                self.eat(SyntaxKind::DOT);
                self.parse_full_ident(SyntaxKind::FULL_IDENT);
                self.expect(SyntaxKind::R_PAREN, "')'");
            } else if !self.eat(SyntaxKind::IDENT) {
                self.error("expected option name");
                break;
            }
            if self.at(SyntaxKind::DOT)
                && matches!(self.nth(1), SyntaxKind::IDENT | SyntaxKind::L_PAREN)
            {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_node();
    }

    /// CompactOptions = '[' OptionEntry (',' OptionEntry)* ']'
    fn parse_compact_options(&mut self) {
        if !self.at(SyntaxKind::L_BRACKET) {
            return;
        }
        self.start_node(SyntaxKind::COMPACT_OPTIONS);
        self.bump();
        loop {
            self.start_node(SyntaxKind::OPTION_DECL);
            self.parse_option_entry_body();
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        if !self.expect(SyntaxKind::R_BRACKET, "']'") {
            self.error_recover(
                "unterminated option list",
                &[SyntaxKind::R_BRACKET, SyntaxKind::SEMICOLON],
            );
            self.eat(SyntaxKind::R_BRACKET);
        }
        self.finish_node();
    }

    /// Constant = sign? (INT | FLOAT | 'inf' | 'nan') | STRING+ | FullIdent | Aggregate
    fn parse_constant(&mut self) {
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_aggregate(SyntaxKind::L_BRACE, SyntaxKind::R_BRACE);
            return;
        }
        self.start_node(SyntaxKind::CONSTANT);
        match self.nth(0) {
            SyntaxKind::MINUS | SyntaxKind::PLUS => {
                self.bump();
                if self.at_any(&[SyntaxKind::INT, SyntaxKind::FLOAT, SyntaxKind::IDENT]) {
                    self.bump();
                } else {
                    self.error("expected number");
                }
            }
            SyntaxKind::INT | SyntaxKind::FLOAT => self.bump(),
            SyntaxKind::STRING => while self.eat(SyntaxKind::STRING) {},
            SyntaxKind::IDENT => self.parse_full_ident(SyntaxKind::FULL_IDENT),
            _ => self.error("expected constant"),
        }
        self.finish_node();
    }

    /// Aggregate = '{' AggregateField* '}' | '<' AggregateField* '>'
    fn parse_aggregate(&mut self, open: SyntaxKind, close: SyntaxKind) {
        self.start_node(SyntaxKind::AGGREGATE);
        self.expect(open, "aggregate value");
        loop {
            if self.eat(close) {
                break;
            }
            if self.at_eof() {
                self.error("unterminated aggregate value");
                break;
            }
            let before = self.pos;
            self.parse_aggregate_field();
            if self.pos == before {
                self.error_bump("expected field name in aggregate value");
            }
        }
        self.finish_node();
    }

    /// AggregateField = (IDENT | '[' FullIdent ('/' FullIdent)? ']') ':'? Value (',' | ';')?
    fn parse_aggregate_field(&mut self) {
        if !self.at_any(&[SyntaxKind::IDENT, SyntaxKind::L_BRACKET]) {
            return;
        }
        self.start_node(SyntaxKind::AGGREGATE_FIELD);
        if self.eat(SyntaxKind::L_BRACKET) {
            self.parse_full_ident(SyntaxKind::FULL_IDENT);
            if self.eat(SyntaxKind::SLASH) {
                self.parse_full_ident(SyntaxKind::FULL_IDENT);
            }
            self.expect(SyntaxKind::R_BRACKET, "']'");
        } else {
            self.start_node(SyntaxKind::NAME);
            self.bump();
            self.finish_node();
        }
        self.eat(SyntaxKind::COLON);
        self.parse_aggregate_value();
        self.finish_node();
        if !self.eat(SyntaxKind::COMMA) {
            self.eat(SyntaxKind::SEMICOLON);
        }
    }

    fn parse_aggregate_value(&mut self) {
        match self.nth(0) {
            SyntaxKind::L_BRACE => self.parse_aggregate(SyntaxKind::L_BRACE, SyntaxKind::R_BRACE),
            SyntaxKind::L_ANGLE => self.parse_aggregate(SyntaxKind::L_ANGLE, SyntaxKind::R_ANGLE),
            SyntaxKind::L_BRACKET => {
                self.start_node(SyntaxKind::AGGREGATE_LIST);
                self.bump();
                if !self.eat(SyntaxKind::R_BRACKET) {
                    loop {
                        let before = self.pos;
                        self.parse_aggregate_value();
                        if !self.eat(SyntaxKind::COMMA) || self.pos == before {
                            self.expect(SyntaxKind::R_BRACKET, "']'");
                            break;
                        }
                    }
                }
                self.finish_node();
            }
            _ => self.parse_constant(),
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// MessageDef = 'message' Name MessageBody
    fn parse_message(&mut self) {
        self.start_node(SyntaxKind::MESSAGE_DEF);
        self.bump();
        self.parse_name("message name");
        self.parse_message_body();
        self.finish_node();
    }

    /// MessageBody = '{' MessageElement* '}'
    fn parse_message_body(&mut self) {
        if !self.at(SyntaxKind::L_BRACE) {
            self.error_recover("expected '{'", &[SyntaxKind::SEMICOLON]);
            self.eat(SyntaxKind::SEMICOLON);
            return;
        }
        self.start_node(SyntaxKind::MESSAGE_BODY);
        self.bump();
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_recover(
                format!("message nesting exceeds {MAX_NESTING_DEPTH} levels"),
                &[],
            );
            self.eat(SyntaxKind::R_BRACE);
        } else {
            self.depth += 1;
            self.parse_body_items(Self::parse_message_element);
            self.depth -= 1;
        }
        self.finish_node();
    }

    /// Body loop shared by every braced construct; the '{' is consumed.
    fn parse_body_items(&mut self, mut element: impl FnMut(&mut Self)) {
        loop {
            if self.at_eof() {
                self.error("expected '}'");
                break;
            }
            if self.eat(SyntaxKind::R_BRACE) {
                break;
            }
            if self.eat(SyntaxKind::SEMICOLON) {
                continue;
            }
            let pos_before = self.pos;
            element(self);
            if self.pos == pos_before && !self.at_eof() {
                self.error_bump(format!("stuck on token: {:?}", self.nth(0)));
            }
        }
    }

    fn parse_message_element(&mut self) {
        if !self.at_any(&[SyntaxKind::IDENT, SyntaxKind::DOT]) {
            let text = self.current_text();
            self.error_recover(
                format!("unexpected '{text}' in message body"),
                &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
            );
            return;
        }
        let field_shape = self.field_shape_at(0);
        let definition_shape =
            self.nth(1) == SyntaxKind::IDENT && self.nth(2) == SyntaxKind::L_BRACE;
        match self.current_text() {
            "message" if definition_shape => self.parse_message(),
            "enum" if definition_shape => self.parse_enum(),
            "oneof" if !field_shape => self.parse_oneof(),
            "extend" if !field_shape => self.parse_extend(),
            "option" if !field_shape => self.parse_option_decl(),
            "reserved" if !field_shape => self.parse_reserved(),
            "extensions" if !field_shape => self.parse_extensions(),
            _ => self.parse_field_like(),
        }
    }

    /// Field, map field or group.
    fn parse_field_like(&mut self) {
        let has_label = self.label_at(0);
        let label_offset = usize::from(has_label);

        if self.group_shape_at(label_offset) {
            self.start_node(SyntaxKind::GROUP_DEF);
            if has_label {
                self.bump();
            }
            self.bump();
            self.parse_name("group name");
            self.parse_number();
            self.parse_compact_options();
            self.parse_message_body();
            self.finish_node();
            return;
        }

        if self.nth_is_keyword(label_offset, "map")
            && self.nth(label_offset + 1) == SyntaxKind::L_ANGLE
        {
            self.start_node(SyntaxKind::MAP_FIELD_DEF);
            if has_label {
                self.error("map fields cannot have labels");
                self.bump();
            }
            self.bump();
            self.expect(SyntaxKind::L_ANGLE, "'<'");
            self.parse_type_ref("map key type");
            self.expect(SyntaxKind::COMMA, "','");
            self.parse_type_ref("map value type");
            self.expect(SyntaxKind::R_ANGLE, "'>'");
            self.parse_name("field name");
            self.parse_number();
            self.parse_compact_options();
            self.expect_semicolon();
            self.finish_node();
            return;
        }

        self.start_node(SyntaxKind::FIELD_DEF);
        if has_label {
            self.bump();
        }
        self.parse_type_ref("field type");
        self.parse_name("field name");
        self.parse_number();
        self.parse_compact_options();
        self.expect_semicolon();
        self.finish_node();
    }

    /// OneofDef = 'oneof' Name '{' (OptionDecl | Field | Group)* '}'
    fn parse_oneof(&mut self) {
        self.start_node(SyntaxKind::ONEOF_DEF);
        self.bump();
        self.parse_name("oneof name");
        if self.expect(SyntaxKind::L_BRACE, "'{'") {
            self.parse_body_items(|p| {
                if p.at_keyword("option") && !p.field_shape_at(0) {
                    p.parse_option_decl();
                } else {
                    if p.label_at(0) {
                        p.error("oneof fields cannot have labels");
                    }
                    p.parse_field_like();
                }
            });
        }
        self.finish_node();
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    /// Range = '-'? INT ('to' ('-'? INT | 'max'))?
    fn parse_ranges(&mut self) {
        loop {
            self.start_node(SyntaxKind::RANGE);
            self.eat(SyntaxKind::MINUS);
            self.expect(SyntaxKind::INT, "number");
            if self.eat_keyword("to") && !self.eat_keyword("max") {
                self.eat(SyntaxKind::MINUS);
                self.expect(SyntaxKind::INT, "range end");
            }
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }

    /// ReservedDecl = 'reserved' (Ranges | Names) ';'
    fn parse_reserved(&mut self) {
        self.start_node(SyntaxKind::RESERVED_DECL);
        self.bump();
        if self.at_any(&[SyntaxKind::STRING, SyntaxKind::IDENT]) {
            loop {
                if self.at(SyntaxKind::IDENT) {
                    self.start_node(SyntaxKind::NAME);
                    self.bump();
                    self.finish_node();
                } else if !self.eat(SyntaxKind::STRING) {
                    self.error("expected reserved name");
                    break;
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        } else {
            self.parse_ranges();
        }
        self.expect_semicolon();
        self.finish_node();
    }

    /// ExtensionsDecl = 'extensions' Ranges CompactOptions? ';'
    fn parse_extensions(&mut self) {
        self.start_node(SyntaxKind::EXTENSIONS_DECL);
        self.bump();
        self.parse_ranges();
        self.parse_compact_options();
        self.expect_semicolon();
        self.finish_node();
    }

    // =========================================================================
    // Enums
    // =========================================================================

    /// EnumDef = 'enum' Name EnumBody
    fn parse_enum(&mut self) {
        self.start_node(SyntaxKind::ENUM_DEF);
        self.bump();
        self.parse_name("enum name");
        if self.at(SyntaxKind::L_BRACE) {
            self.start_node(SyntaxKind::ENUM_BODY);
            self.bump();
            self.parse_body_items(|p| {
                let value_shape = p.nth(1) == SyntaxKind::EQ;
                if p.at_keyword("option") && !value_shape {
                    p.parse_option_decl();
                } else if p.at_keyword("reserved") && !value_shape {
                    p.parse_reserved();
                } else if p.at(SyntaxKind::IDENT) {
                    p.parse_enum_value();
                } else {
                    let text = p.current_text();
                    p.error_recover(
                        format!("unexpected '{text}' in enum body"),
                        &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
                    );
                }
            });
            self.finish_node();
        } else {
            self.error_recover("expected '{'", &[SyntaxKind::SEMICOLON]);
        }
        self.finish_node();
    }

    /// EnumValue = Name '=' '-'? INT CompactOptions? ';'
    fn parse_enum_value(&mut self) {
        self.start_node(SyntaxKind::ENUM_VALUE);
        self.parse_name("enum value name");
        self.parse_number();
        self.parse_compact_options();
        self.expect_semicolon();
        self.finish_node();
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// ServiceDef = 'service' Name ServiceBody
    fn parse_service(&mut self) {
        self.start_node(SyntaxKind::SERVICE_DEF);
        self.bump();
        self.parse_name("service name");
        if self.at(SyntaxKind::L_BRACE) {
            self.start_node(SyntaxKind::SERVICE_BODY);
            self.bump();
            self.parse_body_items(|p| {
                if p.at_keyword("option") {
                    p.parse_option_decl();
                } else if p.at_keyword("rpc") {
                    p.parse_rpc();
                } else {
                    let text = p.current_text();
                    p.error_recover(
                        format!("unexpected '{text}' in service body"),
                        &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
                    );
                }
            });
            self.finish_node();
        } else {
            self.error_recover("expected '{'", &[SyntaxKind::SEMICOLON]);
        }
        self.finish_node();
    }

    /// RpcDef = 'rpc' Name RpcType 'returns' RpcType (';' | '{' OptionDecl* '}')
    fn parse_rpc(&mut self) {
        self.start_node(SyntaxKind::RPC_DEF);
        self.bump();
        self.parse_name("rpc name");
        self.parse_rpc_type();
        if !self.eat_keyword("returns") {
            self.error("expected 'returns'");
        }
        self.parse_rpc_type();
        if self.eat(SyntaxKind::L_BRACE) {
            self.parse_body_items(|p| {
                if p.at_keyword("option") {
                    p.parse_option_decl();
                } else {
                    let text = p.current_text();
                    p.error_recover(
                        format!("unexpected '{text}' in rpc body"),
                        &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
                    );
                }
            });
            self.eat(SyntaxKind::SEMICOLON);
        } else {
            self.expect_semicolon();
        }
        self.finish_node();
    }

    /// RpcType = '(' 'stream'? TypeRef ')'
    fn parse_rpc_type(&mut self) {
        if !self.at(SyntaxKind::L_PAREN) {
            self.error("expected '('");
            return;
        }
        self.start_node(SyntaxKind::RPC_TYPE);
        self.bump();
        if self.at_keyword("stream") && matches!(self.nth(1), SyntaxKind::IDENT | SyntaxKind::DOT) {
            self.bump();
        }
        self.parse_type_ref("message type");
        self.expect(SyntaxKind::R_PAREN, "')'");
        self.finish_node();
    }

    // =========================================================================
    // Extend
    // =========================================================================

    /// ExtendDef = 'extend' TypeRef MessageBody
    fn parse_extend(&mut self) {
        self.start_node(SyntaxKind::EXTEND_DEF);
        self.bump();
        self.parse_type_ref("extended type");
        if self.at(SyntaxKind::L_BRACE) {
            self.start_node(SyntaxKind::MESSAGE_BODY);
            self.bump();
            self.parse_body_items(Self::parse_field_like);
            self.finish_node();
        } else {
            self.error_recover("expected '{'", &[SyntaxKind::SEMICOLON]);
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(parse: &Parse) -> Vec<SyntaxKind> {
        parse.syntax().descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_parse_empty() {
        let parse = parse("");
        assert!(parse.ok());
        assert_eq!(parse.syntax().kind(), SyntaxKind::SOURCE_FILE);
    }

    #[test]
    fn test_lossless() {
        let source = "syntax = \"proto3\";\n// doc\nmessage Foo {\n  int32 x = 1; // trailing\n}\n";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        assert_eq!(parse.syntax().text().to_string(), source);
    }

    #[test]
    fn test_parse_header() {
        let parse = parse("syntax = \"proto3\"; package a.b; import public \"x.proto\"; option java_package = \"p\";");
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds(&parse);
        assert!(kinds.contains(&SyntaxKind::SYNTAX_DECL));
        assert!(kinds.contains(&SyntaxKind::PACKAGE_DECL));
        assert!(kinds.contains(&SyntaxKind::IMPORT_DECL));
        assert!(kinds.contains(&SyntaxKind::OPTION_DECL));
    }

    #[test]
    fn test_parse_message_elements() {
        let source = r#"message M {
  repeated string tags = 1 [packed = false];
  map<string, .a.B> entries = 2;
  oneof kind { int32 a = 3; }
  optional group G = 4 { int32 inner = 5; }
  reserved 6 to 8, 100 to max;
  extensions 1000 to 2000;
  message N {}
  enum E { X = 0; }
}"#;
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds(&parse);
        for kind in [
            SyntaxKind::FIELD_DEF,
            SyntaxKind::MAP_FIELD_DEF,
            SyntaxKind::ONEOF_DEF,
            SyntaxKind::GROUP_DEF,
            SyntaxKind::RESERVED_DECL,
            SyntaxKind::EXTENSIONS_DECL,
            SyntaxKind::ENUM_VALUE,
            SyntaxKind::COMPACT_OPTIONS,
        ] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
        assert_eq!(
            kinds.iter().filter(|k| **k == SyntaxKind::MESSAGE_DEF).count(),
            2
        );
    }

    #[test]
    fn test_parse_service() {
        let parse = parse(
            "service S { rpc A(stream Req) returns (Resp); rpc B(Req) returns (stream Resp) { option deprecated = true; } }",
        );
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        assert_eq!(
            kinds(&parse).iter().filter(|k| **k == SyntaxKind::RPC_TYPE).count(),
            4
        );
    }

    #[test]
    fn test_parse_aggregate_option() {
        let parse = parse("option (x) = { a: 1 b: [1, 2] c { d: \"e\" } };");
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        assert!(kinds(&parse).contains(&SyntaxKind::AGGREGATE_LIST));
    }

    #[test]
    fn test_error_recovery_keeps_later_definitions() {
        let parse = parse("message A { int32 = ; }\nmessage B {}");
        assert!(!parse.ok());
        assert_eq!(
            kinds(&parse).iter().filter(|k| **k == SyntaxKind::MESSAGE_DEF).count(),
            2
        );
    }

    #[test]
    fn test_message_option_and_labelled_dotted_type() {
        let source = "/* lead */ message M {\n  option deprecated = true; /* note */\n  repeated .a.B items = 3;\n}";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        assert_eq!(parse.syntax().text().to_string(), source);
        let kinds = kinds(&parse);
        assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::OPTION_DECL).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::FIELD_DEF).count(), 1);
    }

    #[test]
    fn test_deep_nesting_is_capped() {
        let depth = MAX_NESTING_DEPTH + 20;
        let source = format!("{}{}", "message M { ".repeat(depth), "} ".repeat(depth));
        let parse = parse(&source);
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(parse.syntax().text().to_string(), source);
        assert_eq!(
            kinds(&parse).iter().filter(|k| **k == SyntaxKind::MESSAGE_DEF).count(),
            MAX_NESTING_DEPTH + 1
        );
    }

    #[test]
    fn test_stray_token_at_top_level() {
        let parse = parse("} message A {}");
        assert_eq!(parse.errors.len(), 1);
        assert!(kinds(&parse).contains(&SyntaxKind::MESSAGE_DEF));
    }
}
