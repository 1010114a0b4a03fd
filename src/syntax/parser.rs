//! Direct recursive descent parser producing a [`ProtoFile`].
//!
//! This is the primary engine. It walks the logos token stream once and
//! builds the owned AST without an intermediate tree. Errors are recorded
//! and parsing resumes at the next statement boundary, so a document with
//! mistakes still yields every definition that could be recognized.

use smol_str::SmolStr;

use super::ast::*;
use super::comments::{leading_doc, trailing_doc};
use super::literals::{parse_float, parse_int, parse_signed, unescape_string};
use crate::base::constants::MAX_NESTING_DEPTH;
use crate::base::{LineIndex, Span, TextRange, TextSize};
use crate::parser::{SyntaxKind, Token, tokenize};

/// Parse protobuf source text.
pub fn parse(text: &str, uri: &str) -> ProtoFile {
    let tokens = tokenize(text);
    let mut parser = Parser::new(text, &tokens);
    parser.parse_file(uri)
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    /// Index of the last significant token consumed.
    last: Option<usize>,
    line_index: LineIndex,
    text_len: TextSize,
    errors: Vec<SyntaxError>,
    /// Message and group bodies currently open.
    depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(text: &str, tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            last: None,
            line_index: LineIndex::new(text),
            text_len: TextSize::of(text),
            errors: Vec::new(),
            depth: 0,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn skip_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.pos += 1;
        }
    }

    fn nth_token(&self, n: usize) -> Option<&'t Token<'a>> {
        let tokens: &'t [Token<'a>] = self.tokens;
        tokens[self.pos.min(tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
    }

    fn current(&self) -> Option<&'t Token<'a>> {
        self.nth_token(0)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n).map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
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

    /// True if the tokens from `n` read `type name = N`.
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

    /// True if the tokens from `n` read `group Name = N {`, allowing options.
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

    fn bump(&mut self) -> Option<&'t Token<'a>> {
        self.skip_trivia();
        let tokens: &'t [Token<'a>] = self.tokens;
        let token = tokens.get(self.pos)?;
        self.last = Some(self.pos);
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: SyntaxKind) -> Option<&'t Token<'a>> {
        if self.at(kind) { self.bump() } else { None }
    }

    fn eat_keyword(&mut self, keyword: &str) -> Option<&'t Token<'a>> {
        if self.at_keyword(keyword) {
            self.bump()
        } else {
            None
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> Option<&'t Token<'a>> {
        let token = self.eat(kind);
        if token.is_none() {
            self.error_here(format!("expected {what}"));
        }
        token
    }

    fn expect_semicolon(&mut self) {
        if self.eat(SyntaxKind::SEMICOLON).is_none() {
            self.error_here("expected ';'");
            self.recover();
        }
    }

    // =========================================================================
    // Positions and errors
    // =========================================================================

    fn token_span(&self, token: &Token<'_>) -> Span {
        self.line_index.span(token.range())
    }

    /// Skip trivia and return the index of the next node's first token.
    fn start(&mut self) -> usize {
        self.skip_trivia();
        self.pos
    }

    fn span_from(&self, start: usize) -> Span {
        let Some(first) = self.tokens.get(start) else {
            return self.eof_span();
        };
        match self.last {
            Some(last) if last >= start => {
                let range = TextRange::new(first.offset, self.tokens[last].range().end());
                self.line_index.span(range)
            }
            _ => self.line_index.span(TextRange::empty(first.offset)),
        }
    }

    fn eof_span(&self) -> Span {
        self.line_index.span(TextRange::empty(self.text_len))
    }

    fn here_span(&self) -> Span {
        match self.current() {
            Some(token) => self.token_span(token),
            None => self.eof_span(),
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let span = self.here_span();
        self.errors.push(SyntaxError::new(message, span));
    }

    /// Skip to the end of the current statement.
    ///
    /// Consumes through the next `;` at depth zero, or stops before a `}`
    /// that closes the enclosing body.
    fn recover(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.current() {
            match token.kind {
                SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_BRACE if depth == 0 => return,
                SyntaxKind::R_BRACE => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                SyntaxKind::SEMICOLON if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn unexpected(&mut self, context: &str) {
        let text = self.current().map(|t| t.text).unwrap_or("end of file");
        self.error_here(format!("unexpected '{text}' {context}"));
        let before = self.pos;
        self.recover();
        if self.pos == before {
            self.bump();
        }
    }

    fn doc(&self, start: usize, anchor: Option<usize>) -> Option<String> {
        leading_doc(self.tokens[..start].iter().rev().map(|t| (t.kind, t.text))).or_else(|| {
            anchor.and_then(|a| {
                trailing_doc(self.tokens[a + 1..].iter().map(|t| (t.kind, t.text)))
            })
        })
    }

    // =========================================================================
    // File
    // =========================================================================

    fn parse_file(&mut self, uri: &str) -> ProtoFile {
        let mut file = ProtoFile::empty(uri);

        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            let before = self.pos;
            self.parse_top_level(&mut file);
            if self.pos == before {
                self.error_here("stuck on token");
                self.bump();
            }
        }

        file.comments = self
            .tokens
            .iter()
            .filter(|t| t.kind.is_comment())
            .map(|t| Comment {
                kind: if t.kind == SyntaxKind::LINE_COMMENT {
                    CommentKind::Line
                } else {
                    CommentKind::Block
                },
                text: t.text.to_string(),
                span: self.token_span(t),
            })
            .collect();
        file.errors = std::mem::take(&mut self.errors);
        file.span = self
            .line_index
            .span(TextRange::new(TextSize::new(0), self.text_len));
        file
    }

    fn parse_top_level(&mut self, file: &mut ProtoFile) {
        if self.eat(SyntaxKind::SEMICOLON).is_some() {
            return;
        }
        let Some(token) = self.current() else { return };
        if token.kind != SyntaxKind::IDENT {
            self.unexpected("at top level");
            return;
        }
        match token.text {
            "syntax" if self.nth(1) == SyntaxKind::EQ => {
                let stmt = self.parse_syntax(SyntaxKeyword::Syntax);
                self.set_syntax(file, stmt);
            }
            "edition" if self.nth(1) == SyntaxKind::EQ => {
                let stmt = self.parse_syntax(SyntaxKeyword::Edition);
                self.set_syntax(file, stmt);
            }
            "package" => {
                let stmt = self.parse_package();
                if file.package.is_some() {
                    self.errors
                        .push(SyntaxError::new("multiple package statements", stmt.span));
                } else {
                    file.package = Some(stmt);
                }
            }
            "import" => {
                if let Some(import) = self.parse_import() {
                    file.imports.push(import);
                }
            }
            "option" => {
                if let Some(option) = self.parse_option_statement() {
                    file.options.push(option);
                }
            }
            "message" => file
                .definitions
                .push(Definition::Message(self.parse_message())),
            "enum" => file.definitions.push(Definition::Enum(self.parse_enum())),
            "service" => file
                .definitions
                .push(Definition::Service(self.parse_service())),
            "extend" => file
                .definitions
                .push(Definition::Extend(self.parse_extend())),
            _ => self.unexpected("at top level"),
        }
    }

    fn set_syntax(&mut self, file: &mut ProtoFile, stmt: SyntaxStatement) {
        if file.syntax.is_some() {
            self.errors
                .push(SyntaxError::new("multiple syntax statements", stmt.span));
        } else {
            file.syntax = Some(stmt);
        }
    }

    /// `syntax = "proto3";` / `edition = "2023";`
    fn parse_syntax(&mut self, keyword: SyntaxKeyword) -> SyntaxStatement {
        let start = self.start();
        self.bump();
        self.expect(SyntaxKind::EQ, "'='");
        let (value, value_span) = if self.at(SyntaxKind::STRING) {
            self.parse_string()
        } else if matches!(self.nth(0), SyntaxKind::INT | SyntaxKind::IDENT) {
            let token = self.bump();
            (
                token.map(|t| t.text.to_string()).unwrap_or_default(),
                token.map(|t| self.token_span(t)).unwrap_or_default(),
            )
        } else {
            self.error_here("expected string literal");
            (String::new(), self.here_span())
        };
        self.expect_semicolon();
        SyntaxStatement {
            keyword,
            value,
            value_span,
            span: self.span_from(start),
        }
    }

    fn parse_package(&mut self) -> PackageStatement {
        let start = self.start();
        self.bump();
        let (name, name_span) = match self.parse_full_ident(false) {
            Some(found) => found,
            None => {
                self.error_here("expected package name");
                (SmolStr::default(), self.here_span())
            }
        };
        self.expect_semicolon();
        PackageStatement {
            name,
            name_span,
            span: self.span_from(start),
        }
    }

    fn parse_import(&mut self) -> Option<ImportStatement> {
        let start = self.start();
        self.bump();
        let modifier = if self.nth(1) == SyntaxKind::STRING && self.eat_keyword("public").is_some()
        {
            Some(ImportModifier::Public)
        } else if self.nth(1) == SyntaxKind::STRING && self.eat_keyword("weak").is_some() {
            Some(ImportModifier::Weak)
        } else {
            None
        };
        if !self.at(SyntaxKind::STRING) {
            self.error_here("expected import path");
            self.recover();
            return None;
        }
        let (path, path_span) = self.parse_string();
        self.expect_semicolon();
        Some(ImportStatement {
            path,
            path_span,
            modifier,
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Names, types and literals
    // =========================================================================

    fn parse_name(&mut self, what: &str) -> (SmolStr, Span) {
        match self.eat(SyntaxKind::IDENT) {
            Some(token) => (SmolStr::new(token.text), self.token_span(token)),
            None => {
                self.error_here(format!("expected {what}"));
                let at = self.here_span().start;
                (SmolStr::default(), Span::new(at, at))
            }
        }
    }

    /// `a.b.c`, optionally with a leading dot.
    fn parse_full_ident(&mut self, leading_dot: bool) -> Option<(SmolStr, Span)> {
        let start = self.start();
        let mut text = String::new();
        if leading_dot && self.nth(0) == SyntaxKind::DOT && self.nth(1) == SyntaxKind::IDENT {
            self.bump();
            text.push('.');
        }
        let first = self.eat(SyntaxKind::IDENT)?;
        text.push_str(first.text);
        while self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT {
            self.bump();
            text.push('.');
            if let Some(part) = self.bump() {
                text.push_str(part.text);
            }
        }
        Some((SmolStr::new(text), self.span_from(start)))
    }

    fn parse_type(&mut self, what: &str) -> TypeName {
        match self.parse_full_ident(true) {
            Some((name, span)) => TypeName { name, span },
            None => {
                self.error_here(format!("expected {what}"));
                let at = self.here_span().start;
                TypeName {
                    name: SmolStr::default(),
                    span: Span::new(at, at),
                }
            }
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_string(&mut self) -> (String, Span) {
        let start = self.start();
        let mut value = String::new();
        while let Some(token) = self.eat(SyntaxKind::STRING) {
            match unescape_string(token.text) {
                Some(decoded) => value.push_str(&decoded),
                None => {
                    let span = self.token_span(token);
                    self.errors
                        .push(SyntaxError::new("invalid escape sequence in string", span));
                    value.push_str(token.text.trim_matches(|c| c == '"' || c == '\''));
                }
            }
        }
        (value, self.span_from(start))
    }

    /// `= 5` / `= -1` / `= 0x10`
    fn parse_number(&mut self) -> (Option<i64>, Option<Span>) {
        if self.expect(SyntaxKind::EQ, "'='").is_none() {
            return (None, None);
        }
        let start = self.start();
        let negative = self.eat(SyntaxKind::MINUS).is_some();
        let Some(token) = self.eat(SyntaxKind::INT) else {
            self.error_here("expected number");
            return (None, None);
        };
        let span = self.span_from(start);
        match parse_signed(negative, token.text) {
            Some(value) => (Some(value), Some(span)),
            None => {
                self.errors
                    .push(SyntaxError::new("integer literal out of range", span));
                (None, Some(span))
            }
        }
    }

    // =========================================================================
    // Options
    // =========================================================================

    fn parse_option_statement(&mut self) -> Option<OptionStatement> {
        let start = self.start();
        self.bump();
        let option = self.parse_option_body(start);
        self.expect_semicolon();
        option.map(|mut o| {
            o.span = self.span_from(start);
            o
        })
    }

    /// `name = value`, shared by statements and compact options.
    fn parse_option_body(&mut self, start: usize) -> Option<OptionStatement> {
        let name = self.parse_option_name()?;
        self.expect(SyntaxKind::EQ, "'='")?;
        let (value, value_span) = self.parse_constant();
        Some(OptionStatement {
            name,
            value,
            value_span,
            span: self.span_from(start),
        })
    }

    fn parse_option_name(&mut self) -> Option<OptionName> {
        let start = self.start();
        let mut parts = Vec::new();
        loop {
            if self.eat(SyntaxKind::L_PAREN).is_some() {
                let Some((name, _)) = self.parse_full_ident(true) else {
                    self.error_here("expected extension name");
                    return None;
                };
                self.expect(SyntaxKind::R_PAREN, "')'");
                parts.push(OptionNamePart {
                    name,
                    is_extension: true,
                });
            } else if let Some(token) = self.eat(SyntaxKind::IDENT) {
                parts.push(OptionNamePart {
                    name: SmolStr::new(token.text),
                    is_extension: false,
                });
            } else {
                self.error_here("expected option name");
                return None;
            }
            let continues = self.at(SyntaxKind::DOT)
                && matches!(self.nth(1), SyntaxKind::IDENT | SyntaxKind::L_PAREN);
            if !continues {
                break;
            }
            self.bump();
        }
        Some(OptionName {
            parts,
            span: self.span_from(start),
        })
    }

    /// `[deprecated = true, (my.opt) = 1]`
    fn parse_compact_options(&mut self) -> Vec<OptionStatement> {
        let mut options = Vec::new();
        if self.eat(SyntaxKind::L_BRACKET).is_none() {
            return options;
        }
        loop {
            let start = self.start();
            match self.parse_option_body(start) {
                Some(option) => options.push(option),
                None => break,
            }
            if self.eat(SyntaxKind::COMMA).is_none() {
                break;
            }
        }
        if self.expect(SyntaxKind::R_BRACKET, "']'").is_none() {
            while !self.at_eof()
                && !self.at(SyntaxKind::R_BRACKET)
                && !self.at(SyntaxKind::SEMICOLON)
                && !self.at(SyntaxKind::R_BRACE)
            {
                self.bump();
            }
            self.eat(SyntaxKind::R_BRACKET);
        }
        options
    }

    fn parse_constant(&mut self) -> (Constant, Span) {
        let start = self.start();
        let value = match self.nth(0) {
            SyntaxKind::MINUS | SyntaxKind::PLUS => {
                let negative = self.bump().is_some_and(|t| t.kind == SyntaxKind::MINUS);
                self.parse_number_constant(negative)
            }
            SyntaxKind::INT | SyntaxKind::FLOAT => self.parse_number_constant(false),
            SyntaxKind::STRING => Constant::String(self.parse_string().0),
            SyntaxKind::IDENT => match self.current().map(|t| t.text) {
                Some("true") => {
                    self.bump();
                    Constant::Bool(true)
                }
                Some("false") => {
                    self.bump();
                    Constant::Bool(false)
                }
                Some("inf") | Some("nan") => self.parse_number_constant(false),
                _ => match self.parse_full_ident(false) {
                    Some((ident, _)) => Constant::Identifier(ident),
                    None => Constant::Invalid,
                },
            },
            SyntaxKind::L_BRACE => {
                self.bump();
                Constant::Aggregate(self.parse_aggregate(SyntaxKind::R_BRACE))
            }
            _ => {
                self.error_here("expected constant");
                Constant::Invalid
            }
        };
        (value, self.span_from(start))
    }

    fn parse_number_constant(&mut self, negative: bool) -> Constant {
        let Some(token) = self.bump() else {
            self.error_here("expected number");
            return Constant::Invalid;
        };
        match token.kind {
            SyntaxKind::INT => match parse_int(token.text) {
                Some(value) => {
                    let value = value as i128;
                    Constant::Integer(if negative { -value } else { value })
                }
                None => {
                    let span = self.token_span(token);
                    self.errors
                        .push(SyntaxError::new("integer literal out of range", span));
                    Constant::Invalid
                }
            },
            SyntaxKind::FLOAT | SyntaxKind::IDENT => match parse_float(token.text) {
                Some(value) => Constant::Float(if negative { -value } else { value }),
                None => {
                    let span = self.token_span(token);
                    self.errors.push(SyntaxError::new("expected number", span));
                    Constant::Invalid
                }
            },
            _ => {
                let span = self.token_span(token);
                self.errors.push(SyntaxError::new("expected number", span));
                Constant::Invalid
            }
        }
    }

    /// Text-format message body; the opening delimiter is already consumed.
    fn parse_aggregate(&mut self, close: SyntaxKind) -> Vec<AggregateField> {
        let mut fields = Vec::new();
        loop {
            if self.eat(close).is_some() {
                break;
            }
            if self.at_eof() {
                self.error_here("unterminated aggregate value");
                break;
            }
            let before = self.pos;
            let start = self.start();
            let name = if self.eat(SyntaxKind::L_BRACKET).is_some() {
                let mut name = String::from("[");
                if let Some((ident, _)) = self.parse_full_ident(false) {
                    name.push_str(&ident);
                }
                if self.eat(SyntaxKind::SLASH).is_some() {
                    name.push('/');
                    if let Some((ident, _)) = self.parse_full_ident(false) {
                        name.push_str(&ident);
                    }
                }
                self.expect(SyntaxKind::R_BRACKET, "']'");
                name.push(']');
                Some(SmolStr::new(name))
            } else {
                self.eat(SyntaxKind::IDENT).map(|t| SmolStr::new(t.text))
            };
            let Some(name) = name else {
                self.error_here("expected field name in aggregate value");
                if self.pos == before {
                    self.bump();
                }
                continue;
            };
            self.eat(SyntaxKind::COLON);
            let value = self.parse_aggregate_value();
            fields.push(AggregateField {
                name,
                value,
                span: self.span_from(start),
            });
            if self.eat(SyntaxKind::COMMA).is_none() {
                self.eat(SyntaxKind::SEMICOLON);
            }
        }
        fields
    }

    fn parse_aggregate_value(&mut self) -> AggregateValue {
        match self.nth(0) {
            SyntaxKind::L_BRACE => {
                self.bump();
                AggregateValue::Message(self.parse_aggregate(SyntaxKind::R_BRACE))
            }
            SyntaxKind::L_ANGLE => {
                self.bump();
                AggregateValue::Message(self.parse_aggregate(SyntaxKind::R_ANGLE))
            }
            SyntaxKind::L_BRACKET => {
                self.bump();
                let mut values = Vec::new();
                if self.eat(SyntaxKind::R_BRACKET).is_some() {
                    return AggregateValue::List(values);
                }
                loop {
                    let before = self.pos;
                    values.push(self.parse_aggregate_value());
                    if self.eat(SyntaxKind::COMMA).is_none() {
                        self.expect(SyntaxKind::R_BRACKET, "']'");
                        break;
                    }
                    if self.pos == before {
                        break;
                    }
                }
                AggregateValue::List(values)
            }
            _ => AggregateValue::Scalar(self.parse_constant().0),
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    fn parse_message(&mut self) -> MessageDefinition {
        let start = self.start();
        self.bump();
        let (name, name_span) = self.parse_name("message name");
        let (elements, anchor) = self.parse_block(|p| p.parse_message_body());
        MessageDefinition {
            name,
            name_span,
            elements,
            doc: self.doc(start, anchor),
            span: self.span_from(start),
        }
    }

    /// `{ ... }` with a body parser; returns the body and the `{` index.
    fn parse_block<T: Default>(
        &mut self,
        body: impl FnOnce(&mut Self) -> T,
    ) -> (T, Option<usize>) {
        if self.eat(SyntaxKind::L_BRACE).is_none() {
            self.error_here("expected '{'");
            self.recover();
            return (T::default(), None);
        }
        let anchor = self.last;
        (body(self), anchor)
    }

    /// Loop over a `{}` body until the closing brace, calling `element` per item.
    fn parse_body_items(&mut self, mut element: impl FnMut(&mut Self)) {
        loop {
            self.skip_trivia();
            if self.at_eof() {
                self.error_here("expected '}'");
                break;
            }
            if self.eat(SyntaxKind::R_BRACE).is_some() {
                break;
            }
            if self.eat(SyntaxKind::SEMICOLON).is_some() {
                continue;
            }
            let before = self.pos;
            element(self);
            if self.pos == before {
                self.error_here("stuck on token");
                self.bump();
            }
        }
    }

    fn parse_message_body(&mut self) -> Vec<MessageElement> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_here(format!("message nesting exceeds {MAX_NESTING_DEPTH} levels"));
            self.skip_body();
            return Vec::new();
        }
        self.depth += 1;
        let mut elements = Vec::new();
        self.parse_body_items(|p| {
            if let Some(element) = p.parse_message_element() {
                elements.push(element);
            }
        });
        self.depth -= 1;
        elements
    }

    /// Skip through the `}` matching an already consumed `{`.
    fn skip_body(&mut self) {
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            match token.kind {
                SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_BRACE => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_message_element(&mut self) -> Option<MessageElement> {
        let token = self.current()?;
        if token.kind != SyntaxKind::IDENT && token.kind != SyntaxKind::DOT {
            self.unexpected("in message body");
            return None;
        }
        let field_shape = self.field_shape_at(0);
        let definition_shape =
            self.nth(1) == SyntaxKind::IDENT && self.nth(2) == SyntaxKind::L_BRACE;
        match token.text {
            "message" if definition_shape => Some(MessageElement::Message(self.parse_message())),
            "enum" if definition_shape => Some(MessageElement::Enum(self.parse_enum())),
            "oneof" if !field_shape => Some(MessageElement::Oneof(self.parse_oneof())),
            "extend" if !field_shape => Some(MessageElement::Extend(self.parse_extend())),
            "option" if !field_shape => self.parse_option_statement().map(MessageElement::Option),
            "reserved" if !field_shape => Some(MessageElement::Reserved(self.parse_reserved())),
            "extensions" if !field_shape => {
                Some(MessageElement::Extensions(self.parse_extensions()))
            }
            _ => self.parse_field_like(),
        }
    }

    fn parse_label(&mut self) -> Option<(FieldLabel, Span)> {
        if !self.label_at(0) {
            return None;
        }
        let label = match self.current()?.text {
            "optional" => FieldLabel::Optional,
            "required" => FieldLabel::Required,
            "repeated" => FieldLabel::Repeated,
            _ => return None,
        };
        let token = self.bump()?;
        Some((label, self.token_span(token)))
    }

    /// Field, map field or group, with an optional label.
    fn parse_field_like(&mut self) -> Option<MessageElement> {
        let start = self.start();
        let label = self.parse_label();

        if self.group_shape_at(0) {
            return Some(MessageElement::Group(self.parse_group_rest(start, label)));
        }
        if self.at_keyword("map") && self.nth(1) == SyntaxKind::L_ANGLE {
            if let Some((_, span)) = label {
                self.errors
                    .push(SyntaxError::new("map fields cannot have labels", span));
            }
            return self.parse_map_field(start).map(MessageElement::MapField);
        }
        if !matches!(self.nth(0), SyntaxKind::IDENT | SyntaxKind::DOT) {
            self.unexpected("in message body");
            return None;
        }

        let field_type = self.parse_type("field type");
        let (name, name_span) = self.parse_name("field name");
        let (number, number_span) = self.parse_number();
        let options = self.parse_compact_options();
        self.expect_semicolon();
        Some(MessageElement::Field(FieldDefinition {
            label: label.map(|(l, _)| l),
            label_span: label.map(|(_, s)| s),
            field_type,
            name,
            name_span,
            number,
            number_span,
            options,
            doc: self.doc(start, self.last),
            span: self.span_from(start),
        }))
    }

    /// `group Name = 1 { ... }`; the label, if any, is already consumed.
    fn parse_group_rest(
        &mut self,
        start: usize,
        label: Option<(FieldLabel, Span)>,
    ) -> GroupDefinition {
        self.bump();
        let (name, name_span) = self.parse_name("group name");
        let (number, number_span) = self.parse_number();
        let options = self.parse_compact_options();
        let (elements, anchor) = self.parse_block(|p| p.parse_message_body());
        GroupDefinition {
            label: label.map(|(l, _)| l),
            label_span: label.map(|(_, s)| s),
            name,
            name_span,
            number,
            number_span,
            options,
            elements,
            doc: self.doc(start, anchor),
            span: self.span_from(start),
        }
    }

    fn parse_map_field(&mut self, start: usize) -> Option<MapFieldDefinition> {
        self.bump();
        self.expect(SyntaxKind::L_ANGLE, "'<'")?;
        let key_type = self.parse_type("map key type");
        self.expect(SyntaxKind::COMMA, "','");
        let value_type = self.parse_type("map value type");
        if self.expect(SyntaxKind::R_ANGLE, "'>'").is_none() {
            self.recover();
            return None;
        }
        let (name, name_span) = self.parse_name("field name");
        let (number, number_span) = self.parse_number();
        let options = self.parse_compact_options();
        self.expect_semicolon();
        Some(MapFieldDefinition {
            key_type,
            value_type,
            name,
            name_span,
            number,
            number_span,
            options,
            doc: self.doc(start, self.last),
            span: self.span_from(start),
        })
    }

    fn parse_oneof(&mut self) -> OneofDefinition {
        let start = self.start();
        self.bump();
        let (name, name_span) = self.parse_name("oneof name");
        let (elements, anchor) = self.parse_block(|p| {
            let mut elements = Vec::new();
            p.parse_body_items(|p| {
                if p.at_keyword("option") && !p.field_shape_at(0) {
                    if let Some(option) = p.parse_option_statement() {
                        elements.push(OneofElement::Option(option));
                    }
                    return;
                }
                if p.label_at(0) {
                    p.error_here("oneof fields cannot have labels");
                }
                match p.parse_field_like() {
                    Some(MessageElement::Field(field)) => elements.push(OneofElement::Field(field)),
                    Some(MessageElement::Group(group)) => elements.push(OneofElement::Group(group)),
                    Some(MessageElement::MapField(map)) => p.errors.push(SyntaxError::new(
                        "map fields are not allowed in oneofs",
                        map.span,
                    )),
                    _ => {}
                }
            });
            elements
        });
        OneofDefinition {
            name,
            name_span,
            elements,
            doc: self.doc(start, anchor),
            span: self.span_from(start),
        }
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    fn parse_ranges(&mut self) -> Vec<FieldRange> {
        let mut ranges = Vec::new();
        loop {
            let start = self.start();
            let negative = self.eat(SyntaxKind::MINUS).is_some();
            let Some(first) = self.eat(SyntaxKind::INT) else {
                self.error_here("expected number");
                break;
            };
            let Some(from) = parse_signed(negative, first.text) else {
                self.error_here("integer literal out of range");
                break;
            };
            let end = if self.eat_keyword("to").is_some() {
                if self.eat_keyword("max").is_some() {
                    RangeEnd::Max
                } else {
                    let negative = self.eat(SyntaxKind::MINUS).is_some();
                    match self
                        .eat(SyntaxKind::INT)
                        .and_then(|t| parse_signed(negative, t.text))
                    {
                        Some(to) => RangeEnd::Inclusive(to),
                        None => {
                            self.error_here("expected range end");
                            RangeEnd::Inclusive(from)
                        }
                    }
                }
            } else {
                RangeEnd::Inclusive(from)
            };
            ranges.push(FieldRange {
                start: from,
                end,
                span: self.span_from(start),
            });
            if self.eat(SyntaxKind::COMMA).is_none() {
                break;
            }
        }
        ranges
    }

    fn parse_reserved(&mut self) -> ReservedStatement {
        let start = self.start();
        self.bump();
        let mut reserved = ReservedStatement::default();
        if matches!(self.nth(0), SyntaxKind::STRING | SyntaxKind::IDENT) {
            loop {
                if self.at(SyntaxKind::STRING) {
                    let (name, span) = self.parse_string();
                    reserved.names.push(ReservedName {
                        name: SmolStr::new(name),
                        span,
                    });
                } else if let Some(token) = self.eat(SyntaxKind::IDENT) {
                    reserved.names.push(ReservedName {
                        name: SmolStr::new(token.text),
                        span: self.token_span(token),
                    });
                } else {
                    self.error_here("expected reserved name");
                    break;
                }
                if self.eat(SyntaxKind::COMMA).is_none() {
                    break;
                }
            }
        } else {
            reserved.ranges = self.parse_ranges();
        }
        self.expect_semicolon();
        reserved.span = self.span_from(start);
        reserved
    }

    fn parse_extensions(&mut self) -> ExtensionsStatement {
        let start = self.start();
        self.bump();
        let ranges = self.parse_ranges();
        let options = self.parse_compact_options();
        self.expect_semicolon();
        ExtensionsStatement {
            ranges,
            options,
            span: self.span_from(start),
        }
    }

    // =========================================================================
    // Enums
    // =========================================================================

    fn parse_enum(&mut self) -> EnumDefinition {
        let start = self.start();
        self.bump();
        let (name, name_span) = self.parse_name("enum name");
        let mut def = EnumDefinition {
            name,
            name_span,
            ..EnumDefinition::default()
        };
        let ((), anchor) = self.parse_block(|p| {
            p.parse_body_items(|p| {
                let value_shape = p.nth(1) == SyntaxKind::EQ;
                if p.at_keyword("option") && !value_shape {
                    if let Some(option) = p.parse_option_statement() {
                        def.options.push(option);
                    }
                } else if p.at_keyword("reserved") && !value_shape {
                    def.reserved.push(p.parse_reserved());
                } else if p.at(SyntaxKind::IDENT) {
                    def.values.push(p.parse_enum_value());
                } else {
                    p.unexpected("in enum body");
                }
            });
        });
        def.doc = self.doc(start, anchor);
        def.span = self.span_from(start);
        def
    }

    fn parse_enum_value(&mut self) -> EnumValue {
        let start = self.start();
        let (name, name_span) = self.parse_name("enum value name");
        let (number, number_span) = self.parse_number();
        let options = self.parse_compact_options();
        self.expect_semicolon();
        EnumValue {
            name,
            name_span,
            number,
            number_span,
            options,
            doc: self.doc(start, self.last),
            span: self.span_from(start),
        }
    }

    // =========================================================================
    // Services
    // =========================================================================

    fn parse_service(&mut self) -> ServiceDefinition {
        let start = self.start();
        self.bump();
        let (name, name_span) = self.parse_name("service name");
        let mut def = ServiceDefinition {
            name,
            name_span,
            ..ServiceDefinition::default()
        };
        let ((), anchor) = self.parse_block(|p| {
            p.parse_body_items(|p| {
                if p.at_keyword("option") {
                    if let Some(option) = p.parse_option_statement() {
                        def.options.push(option);
                    }
                } else if p.at_keyword("rpc") {
                    def.rpcs.push(p.parse_rpc());
                } else {
                    p.unexpected("in service body");
                }
            });
        });
        def.doc = self.doc(start, anchor);
        def.span = self.span_from(start);
        def
    }

    fn parse_rpc(&mut self) -> RpcDefinition {
        let start = self.start();
        self.bump();
        let (name, name_span) = self.parse_name("rpc name");
        let request = self.parse_rpc_type();
        if self.eat_keyword("returns").is_none() {
            self.error_here("expected 'returns'");
        }
        let response = self.parse_rpc_type();

        let mut options = Vec::new();
        let anchor = if self.eat(SyntaxKind::L_BRACE).is_some() {
            let anchor = self.last;
            self.parse_body_items(|p| {
                if p.at_keyword("option") {
                    if let Some(option) = p.parse_option_statement() {
                        options.push(option);
                    }
                } else {
                    p.unexpected("in rpc body");
                }
            });
            self.eat(SyntaxKind::SEMICOLON);
            anchor
        } else {
            self.expect_semicolon();
            self.last
        };

        RpcDefinition {
            name,
            name_span,
            request,
            response,
            options,
            doc: self.doc(start, anchor),
            span: self.span_from(start),
        }
    }

    /// `(stream foo.Bar)`
    fn parse_rpc_type(&mut self) -> RpcType {
        if self.expect(SyntaxKind::L_PAREN, "'('").is_none() {
            return RpcType::default();
        }
        let streaming = self.at_keyword("stream")
            && matches!(self.nth(1), SyntaxKind::IDENT | SyntaxKind::DOT)
            && self.bump().is_some();
        let type_name = self.parse_type("message type");
        self.expect(SyntaxKind::R_PAREN, "')'");
        RpcType {
            type_name,
            streaming,
        }
    }

    // =========================================================================
    // Extend
    // =========================================================================

    fn parse_extend(&mut self) -> ExtendDefinition {
        let start = self.start();
        self.bump();
        let extendee = self.parse_type("extended type");
        let mut def = ExtendDefinition {
            extendee,
            ..ExtendDefinition::default()
        };
        let ((), anchor) = self.parse_block(|p| {
            p.parse_body_items(|p| match p.parse_field_like() {
                Some(MessageElement::Field(field)) => def.fields.push(field),
                Some(MessageElement::Group(group)) => def.groups.push(group),
                Some(MessageElement::MapField(map)) => p.errors.push(SyntaxError::new(
                    "map fields are not allowed in extend blocks",
                    map.span,
                )),
                _ => {}
            });
        });
        def.doc = self.doc(start, anchor);
        def.span = self.span_from(start);
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> ProtoFile {
        let file = parse(source, "file:///test.proto");
        assert!(file.errors.is_empty(), "errors: {:?}", file.errors);
        file
    }

    #[test]
    fn test_parse_empty() {
        let file = parse_ok("");
        assert!(file.definitions.is_empty());
        assert!(file.syntax.is_none());
    }

    #[test]
    fn test_parse_header() {
        let file = parse_ok(
            r#"syntax = "proto3";
package foo.bar;
import public "other.proto";
import "google/protobuf/any.proto";
option java_package = "com.foo";"#,
        );
        assert_eq!(file.syntax_value(), Some("proto3"));
        assert!(file.is_proto3());
        assert_eq!(file.package_name(), "foo.bar");
        assert_eq!(file.imports.len(), 2);
        assert!(file.imports[0].is_public());
        assert_eq!(file.imports[1].path, "google/protobuf/any.proto");
        assert_eq!(file.options[0].name.text(), "java_package");
        assert_eq!(file.options[0].value, Constant::String("com.foo".into()));
    }

    #[test]
    fn test_parse_edition() {
        let file = parse_ok("edition = \"2023\";\nmessage A { int32 x = 1 [features.field_presence = IMPLICIT]; }");
        assert!(file.is_editions());
        assert_eq!(file.syntax_value(), Some("2023"));
        let message = file.messages().next().unwrap();
        let field = message.fields().next().unwrap();
        assert_eq!(
            field.options[0].name.feature_path().as_deref(),
            Some("field_presence")
        );
    }

    #[test]
    fn test_parse_message_with_fields() {
        let file = parse_ok(
            r#"message User {
  string name = 1;
  repeated .foo.Tag tags = 2 [deprecated = true];
  map<string, int32> counts = 3;
  oneof choice {
    int32 a = 4;
    string b = 5;
  }
  reserved 10 to 20, 100 to max;
  reserved "old";
  message Inner { bool flag = 1; }
  enum Kind { KIND_UNSPECIFIED = 0; }
}"#,
        );
        let user = file.messages().next().unwrap();
        assert_eq!(user.name, "User");
        let fields: Vec<_> = user.fields().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].label, Some(FieldLabel::Repeated));
        assert_eq!(fields[1].field_type.name, ".foo.Tag");
        assert!(is_deprecated(&fields[1].options));
        assert_eq!(user.map_fields().count(), 1);
        assert_eq!(user.oneofs().next().unwrap().fields().count(), 2);
        assert_eq!(user.numbered_fields().len(), 5);
        let reserved: Vec<_> = user.reserved().collect();
        assert_eq!(reserved[0].ranges[1].end, RangeEnd::Max);
        assert_eq!(reserved[1].names[0].name, "old");
        assert_eq!(user.nested_messages().count(), 1);
        assert_eq!(user.nested_enums().count(), 1);
    }

    #[test]
    fn test_parse_contextual_keywords_as_names() {
        let file = parse_ok("message message { int32 option = 1; message.Foo enum = 2; }");
        let message = file.messages().next().unwrap();
        assert_eq!(message.name, "message");
        let names: Vec<_> = message.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["option", "enum"]);
    }

    #[test]
    fn test_block_comments() {
        let file = parse_ok("/* block */ message M {}");
        assert_eq!(file.messages().count(), 1);

        let file = parse_ok(
            "/** A doc. */\nmessage D {\n  /* inner\n   * more */\n  int32 x = 1; /* x */\n}\n",
        );
        let d = file.messages().next().unwrap();
        assert_eq!(d.doc.as_deref(), Some("A doc."));
        let x = d.fields().next().unwrap();
        assert_eq!(x.doc.as_deref(), Some("inner\nmore"));
        assert_eq!(file.comments.len(), 3);
    }

    #[test]
    fn test_message_level_option_is_not_a_field() {
        let file = parse_ok(
            "message Old {\n  option deprecated = true;\n  option (my.opt) = 5;\n  int32 id = 1;\n}",
        );
        let old = file.messages().next().unwrap();
        assert_eq!(old.fields().count(), 1);
        assert_eq!(old.options().count(), 2);
        assert!(is_deprecated(&old.options().cloned().collect::<Vec<_>>()));

        let file = parse_ok("message M { oneof pick { option deprecated = true; int32 a = 1; } }");
        let pick = file.messages().next().unwrap().oneofs().next().unwrap();
        assert_eq!(pick.fields().count(), 1);
    }

    #[test]
    fn test_label_before_leading_dot_type() {
        let file = parse_ok("message M { repeated .a.B items = 3; optional a.B one = 4; }");
        let fields: Vec<_> = file.messages().next().unwrap().fields().collect();
        assert_eq!(fields[0].label, Some(FieldLabel::Repeated));
        assert_eq!(fields[0].field_type.name, ".a.B");
        assert_eq!(fields[1].label, Some(FieldLabel::Optional));
        assert_eq!(fields[1].field_type.name, "a.B");

        // The label word doubles as a type name.
        let file = parse_ok("message M { optional name = 1; }");
        let field = file.messages().next().unwrap().fields().next().unwrap();
        assert_eq!(field.label, None);
        assert_eq!(field.field_type.name, "optional");
        assert_eq!(field.name, "name");
    }

    #[test]
    fn test_deep_nesting_is_capped() {
        let depth = MAX_NESTING_DEPTH + 20;
        let source = format!("{}{}", "message M { ".repeat(depth), "} ".repeat(depth));
        let file = parse(&source, "file:///deep.proto");
        assert_eq!(file.errors.len(), 1);
        assert!(file.errors[0].message.contains("nesting"));

        let mut levels = 0;
        let mut current = file.messages().next();
        while let Some(message) = current {
            levels += 1;
            current = message.nested_messages().next();
        }
        // The message at the cap is kept with an empty body.
        assert_eq!(levels, MAX_NESTING_DEPTH + 1);
    }

    #[test]
    fn test_parse_group() {
        let file = parse_ok(
            "syntax = \"proto2\";\nmessage M { optional group Result = 1 { required string url = 2; } }",
        );
        let message = file.messages().next().unwrap();
        let MessageElement::Group(group) = &message.elements[0] else {
            panic!("expected group");
        };
        assert_eq!(group.name, "Result");
        assert_eq!(group.field_name(), "result");
        assert_eq!(group.fields().count(), 1);
    }

    #[test]
    fn test_parse_enum_with_negative_value() {
        let file = parse_ok("enum E { option allow_alias = true; A = 0; B = -1; C = 0; }");
        let e = file.enums().next().unwrap();
        assert!(e.allows_alias());
        let numbers: Vec<_> = e.values.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![Some(0), Some(-1), Some(0)]);
    }

    #[test]
    fn test_parse_service() {
        let file = parse_ok(
            r#"service Chat {
  rpc Send(Msg) returns (Ack);
  rpc Stream(stream Msg) returns (stream Msg) { option deprecated = true; }
}"#,
        );
        let service = file.services().next().unwrap();
        assert_eq!(service.rpcs.len(), 2);
        assert!(!service.rpcs[0].request.streaming);
        assert!(service.rpcs[1].request.streaming && service.rpcs[1].response.streaming);
        assert!(is_deprecated(&service.rpcs[1].options));
    }

    #[test]
    fn test_parse_extend_and_aggregate_option() {
        let file = parse_ok(
            r#"extend google.protobuf.FieldOptions { optional string label = 50000; }
option (my.opt) = { name: "x" tags: [1, 2] inner < a: 1 > };"#,
        );
        let extend = file.extends().next().unwrap();
        assert_eq!(extend.extendee.name, "google.protobuf.FieldOptions");
        assert_eq!(extend.fields.len(), 1);
        let Constant::Aggregate(fields) = &file.options[0].value else {
            panic!("expected aggregate");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(file.options[0].name.text(), "(my.opt)");
    }

    #[test]
    fn test_doc_comments() {
        let file = parse_ok(
            "// A user.\nmessage User {\n  // The name.\n  string name = 1;\n  int32 age = 2; // Age in years.\n}\n",
        );
        let user = file.messages().next().unwrap();
        assert_eq!(user.doc.as_deref(), Some("A user."));
        let fields: Vec<_> = user.fields().collect();
        assert_eq!(fields[0].doc.as_deref(), Some("The name."));
        assert_eq!(fields[1].doc.as_deref(), Some("Age in years."));
        assert_eq!(file.comments.len(), 3);
    }

    #[test]
    fn test_spans() {
        let file = parse_ok("message Foo {\n  int32 x = 1;\n}");
        let message = file.messages().next().unwrap();
        assert_eq!(message.span, Span::from_coords(0, 0, 2, 1));
        assert_eq!(message.name_span, Span::from_coords(0, 8, 0, 11));
        let field = message.fields().next().unwrap();
        assert_eq!(field.span, Span::from_coords(1, 2, 1, 14));
        assert_eq!(field.number_span, Some(Span::from_coords(1, 12, 1, 13)));
    }

    #[test]
    fn test_recovers_after_errors() {
        let file = parse(
            "message A { int32 = 1; string ok = 2; }\nmessage B { }",
            "file:///bad.proto",
        );
        assert!(!file.errors.is_empty());
        let names: Vec<_> = file.messages().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let a = file.messages().next().unwrap();
        assert!(a.fields().any(|f| f.name == "ok"));
    }

    #[test]
    fn test_missing_name_yields_empty_name() {
        let file = parse("message { int32 x = 1; }", "file:///bad.proto");
        assert!(!file.errors.is_empty());
        let message = file.messages().next().unwrap();
        assert!(message.name.is_empty());
        assert_eq!(message.fields().count(), 1);
    }

    #[test]
    fn test_unterminated_body() {
        let file = parse("message A { int32 x = 1;", "file:///bad.proto");
        assert!(file.errors.iter().any(|e| e.message.contains("'}'")));
        assert_eq!(file.messages().count(), 1);
    }
}
