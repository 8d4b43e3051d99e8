// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Builds a [`FlowModel`] from the call notation of a flow source.
//!
//! Only the flow lines are read; type declarations are dropped before tokens reach the parser.
//! Statements that are not one of the known calls are skipped.

use std::fmt;

use serde_json::Value;

use super::declarations::{scan_declarations, SourceParseError};
use super::lexer::{TokenCursor, TokenKind};
use super::literal::parse_literal;
use super::separate::excluded_lines;
use crate::model::{
    Example, Experience, ExperienceId, ExperienceTarget, FlowModel, IdError, Narrative,
    NarrativeId, Rule, Slice, SliceKind, SpecNode, TokenError,
};

/// Prefix of ids generated for narratives and experiences authored without one.
pub const GENERATED_ID_PREFIX: &str = "AUTO-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    TopLevel,
    Narrative,
    Experience,
    Describe,
    Slice,
    Rule,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TopLevel => "top level",
            Self::Narrative => "narrative",
            Self::Experience => "experience",
            Self::Describe => "describe",
            Self::Slice => "slice",
            Self::Rule => "rule",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowParseError {
    Source(SourceParseError),
    UnexpectedEof {
        expected: &'static str,
    },
    UnexpectedToken {
        line_no: usize,
        expected: &'static str,
        found: String,
    },
    MisplacedCall {
        line_no: usize,
        call: &'static str,
        scope: Scope,
    },
    MissingArgument {
        line_no: usize,
        call: &'static str,
        argument: &'static str,
    },
    InvalidTarget {
        line_no: usize,
        value: String,
    },
    InvalidId {
        line_no: usize,
        value: String,
        reason: IdError,
    },
    MalformedLiteral {
        line_no: usize,
        reason: String,
    },
    Token(TokenError),
}

impl fmt::Display for FlowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input (expected {expected})")
            }
            Self::UnexpectedToken {
                line_no,
                expected,
                found,
            } => write!(
                f,
                "unexpected {found} on line {line_no} (expected {expected})"
            ),
            Self::MisplacedCall {
                line_no,
                call,
                scope,
            } => write!(f, "'{call}' is not allowed in {scope} scope (line {line_no})"),
            Self::MissingArgument {
                line_no,
                call,
                argument,
            } => write!(f, "'{call}' on line {line_no} is missing its {argument}"),
            Self::InvalidTarget { line_no, value } => write!(
                f,
                "invalid experience target on line {line_no}: {value:?} (expected 'client' or 'server')"
            ),
            Self::InvalidId {
                line_no,
                value,
                reason,
            } => write!(f, "invalid id on line {line_no}: {value:?} ({reason})"),
            Self::MalformedLiteral { line_no, reason } => {
                write!(f, "malformed literal on line {line_no}: {reason}")
            }
            Self::Token(err) => write!(f, "cannot generate id: {err}"),
        }
    }
}

impl std::error::Error for FlowParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::InvalidId { reason, .. } => Some(reason),
            Self::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceParseError> for FlowParseError {
    fn from(err: SourceParseError) -> Self {
        Self::Source(err)
    }
}

impl From<TokenError> for FlowParseError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Narrative,
    Experience,
    Describe,
    It,
    Command,
    Query,
    Reaction,
    Rule,
    Example,
}

impl CallKind {
    fn from_ident(name: &str) -> Option<Self> {
        Some(match name {
            "narrative" => Self::Narrative,
            "experience" => Self::Experience,
            "describe" => Self::Describe,
            "it" => Self::It,
            "command" => Self::Command,
            "query" => Self::Query,
            "reaction" => Self::Reaction,
            "rule" => Self::Rule,
            "example" => Self::Example,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::Experience => "experience",
            Self::Describe => "describe",
            Self::It => "it",
            Self::Command => "command",
            Self::Query => "query",
            Self::Reaction => "reaction",
            Self::Rule => "rule",
            Self::Example => "example",
        }
    }
}

enum Arg<'a> {
    Str(String),
    Literal(Value),
    Body(TokenCursor<'a>),
    Other,
}

struct Call<'a> {
    kind: CallKind,
    line_no: usize,
    args: Vec<Arg<'a>>,
}

impl<'a> Call<'a> {
    /// The `n`-th string argument, counting only string arguments.
    fn string(&self, n: usize) -> Option<&str> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Str(value) => Some(value.as_str()),
                _ => None,
            })
            .nth(n)
    }

    fn required_string(&self, n: usize, argument: &'static str) -> Result<&str, FlowParseError> {
        self.string(n)
            .ok_or(FlowParseError::MissingArgument {
                line_no: self.line_no,
                call: self.kind.name(),
                argument,
            })
    }

    fn take_body(&mut self) -> Option<TokenCursor<'a>> {
        self.args.iter_mut().find_map(|arg| match std::mem::replace(arg, Arg::Other) {
            Arg::Body(body) => Some(body),
            other => {
                *arg = other;
                None
            }
        })
    }

    fn take_literal(&mut self) -> Option<Value> {
        self.args.iter_mut().find_map(|arg| match std::mem::replace(arg, Arg::Other) {
            Arg::Literal(value) => Some(value),
            other => {
                *arg = other;
                None
            }
        })
    }

    fn misplaced(&self, scope: Scope) -> FlowParseError {
        FlowParseError::MisplacedCall {
            line_no: self.line_no,
            call: self.kind.name(),
            scope,
        }
    }

    fn id<T>(&self, n: usize) -> Result<crate::model::Id<T>, FlowParseError> {
        match self.string(n) {
            Some(value) => {
                crate::model::Id::new(value).map_err(|reason| FlowParseError::InvalidId {
                    line_no: self.line_no,
                    value: value.to_owned(),
                    reason,
                })
            }
            None => Ok(crate::model::Id::generate(Some(GENERATED_ID_PREFIX))?),
        }
    }
}

fn is_open(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Punct('(' | '[' | '{'))
}

fn is_close(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Punct(')' | ']' | '}'))
}

fn call_at(cursor: &TokenCursor<'_>) -> Option<CallKind> {
    let kind = CallKind::from_ident(cursor.peek()?.ident()?)?;
    cursor
        .peek_at(1)
        .is_some_and(|t| t.is_punct('('))
        .then_some(kind)
}

/// Consumes an opening bracket and everything up to its match; returns the closing position.
fn skip_balanced(cursor: &mut TokenCursor<'_>) -> Result<usize, FlowParseError> {
    cursor.next();
    let mut depth = 1usize;
    while let Some(token) = cursor.next() {
        if is_open(&token.kind) {
            depth += 1;
        } else if is_close(&token.kind) {
            depth -= 1;
            if depth == 0 {
                return Ok(cursor.position() - 1);
            }
        }
    }
    Err(FlowParseError::UnexpectedEof {
        expected: "a closing bracket",
    })
}

/// Skips one argument expression, stopping before the `,` or `)` that ends it.
fn skip_expression(cursor: &mut TokenCursor<'_>) {
    let mut depth = 0usize;
    while let Some(token) = cursor.peek() {
        if depth == 0 && (token.is_punct(',') || is_close(&token.kind)) {
            return;
        }
        if is_open(&token.kind) {
            depth += 1;
        } else if is_close(&token.kind) {
            depth -= 1;
        }
        cursor.next();
    }
}

/// Skips an unknown statement: up to a `;` at depth 0, or up to a line that starts a known call.
fn skip_statement(cursor: &mut TokenCursor<'_>) {
    let mut depth = 0usize;
    let mut prev_line: Option<usize> = None;
    while let Some(token) = cursor.peek() {
        let starts_line = prev_line.is_some_and(|line| line != token.line);
        if depth == 0 && starts_line && call_at(cursor).is_some() {
            return;
        }
        cursor.next();
        prev_line = Some(token.line);
        if is_open(&token.kind) {
            depth += 1;
        } else if is_close(&token.kind) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_punct(';') {
            return;
        }
    }
}

/// Recognizes `() => { ... }`, `(x) => { ... }`, `x => { ... }`, `async` variants, and
/// `function [name](...) { ... }`. Leaves the cursor untouched if the argument is not a
/// function.
fn try_function_body<'a>(
    cursor: &mut TokenCursor<'a>,
) -> Result<Option<Arg<'a>>, FlowParseError> {
    let start = cursor.position();
    if cursor.peek().and_then(|t| t.ident()) == Some("async") {
        cursor.next();
    }

    match cursor.peek() {
        Some(token) if token.ident() == Some("function") => {
            cursor.next();
            if cursor.peek().and_then(|t| t.ident()).is_some() {
                cursor.next();
            }
            if !cursor.peek().is_some_and(|t| t.is_punct('(')) {
                cursor.seek(start);
                return Ok(None);
            }
            skip_balanced(cursor)?;
        }
        Some(token) if token.is_punct('(') => {
            skip_balanced(cursor)?;
            if !cursor.peek().is_some_and(|t| t.kind == TokenKind::Arrow) {
                cursor.seek(start);
                return Ok(None);
            }
            cursor.next();
        }
        Some(token)
            if token.ident().is_some()
                && cursor.peek_at(1).is_some_and(|t| t.kind == TokenKind::Arrow) =>
        {
            cursor.next();
            cursor.next();
        }
        _ => {
            cursor.seek(start);
            return Ok(None);
        }
    }

    if !cursor.peek().is_some_and(|t| t.is_punct('{')) {
        skip_expression(cursor);
        return Ok(Some(Arg::Other));
    }
    let open = cursor.position();
    let close = skip_balanced(cursor)?;
    Ok(Some(Arg::Body(cursor.sub(open + 1..close))))
}

fn parse_arg<'a>(cursor: &mut TokenCursor<'a>) -> Result<Arg<'a>, FlowParseError> {
    let Some(token) = cursor.peek() else {
        return Err(FlowParseError::UnexpectedEof {
            expected: "an argument",
        });
    };

    if let TokenKind::Str(value) = &token.kind {
        let ends_arg = cursor
            .peek_at(1)
            .is_some_and(|t| t.is_punct(',') || t.is_punct(')'));
        if ends_arg {
            cursor.next();
            return Ok(Arg::Str(value.clone()));
        }
    }

    if let Some(body) = try_function_body(cursor)? {
        return Ok(body);
    }

    let is_literal = match &token.kind {
        TokenKind::Punct('{' | '[' | '-' | '+') | TokenKind::Number(_) => true,
        TokenKind::Ident(name) => matches!(name.as_str(), "true" | "false" | "null" | "undefined"),
        _ => false,
    };
    if is_literal {
        return Ok(Arg::Literal(parse_literal(cursor)?));
    }

    skip_expression(cursor);
    Ok(Arg::Other)
}

fn parse_args<'a>(cursor: &mut TokenCursor<'a>) -> Result<Vec<Arg<'a>>, FlowParseError> {
    let mut args = Vec::new();
    loop {
        if cursor.eat_punct(')') {
            return Ok(args);
        }
        args.push(parse_arg(cursor)?);
        if cursor.eat_punct(',') {
            continue;
        }
        if cursor.eat_punct(')') {
            return Ok(args);
        }
        return Err(match cursor.peek() {
            Some(token) => FlowParseError::UnexpectedToken {
                line_no: token.line + 1,
                expected: "',' or ')'",
                found: token.kind.to_string(),
            },
            None => FlowParseError::UnexpectedEof { expected: "')'" },
        });
    }
}

/// Walks the statements of one block, handing every known call to `on_call`.
fn parse_block<'a>(
    cursor: &mut TokenCursor<'a>,
    mut on_call: impl FnMut(Call<'a>) -> Result<(), FlowParseError>,
) -> Result<(), FlowParseError> {
    while !cursor.is_eof() {
        while cursor.peek_at(1).is_some()
            && matches!(
                cursor.peek().and_then(|t| t.ident()),
                Some("export" | "default" | "await" | "void")
            )
        {
            cursor.next();
        }
        if cursor.eat_punct(';') {
            continue;
        }

        let Some(kind) = call_at(cursor) else {
            skip_statement(cursor);
            continue;
        };
        let line_no = cursor.line_no();
        cursor.next();
        cursor.next();
        let args = parse_args(cursor)?;
        cursor.eat_punct(';');
        on_call(Call {
            kind,
            line_no,
            args,
        })?;
    }
    Ok(())
}

fn build_narrative(mut call: Call<'_>) -> Result<Narrative, FlowParseError> {
    let title = call.required_string(0, "title")?.to_owned();
    let id: NarrativeId = call.id(1)?;
    let mut narrative = Narrative::new(id, title);

    if let Some(mut body) = call.take_body() {
        parse_block(&mut body, |call| match call.kind {
            CallKind::Experience => {
                narrative.experiences_mut().push(build_experience(call)?);
                Ok(())
            }
            CallKind::Command | CallKind::Query | CallKind::Reaction => {
                narrative.slices_mut().push(build_slice(call)?);
                Ok(())
            }
            _ => Err(call.misplaced(Scope::Narrative)),
        })?;
    }
    Ok(narrative)
}

fn build_experience(mut call: Call<'_>) -> Result<Experience, FlowParseError> {
    let title = call.required_string(0, "title")?.to_owned();
    let raw_target = call.required_string(1, "target")?;
    let target: ExperienceTarget =
        raw_target
            .parse()
            .map_err(|_| FlowParseError::InvalidTarget {
                line_no: call.line_no,
                value: raw_target.to_owned(),
            })?;
    let id: ExperienceId = call.id(2)?;

    let mut children = Vec::new();
    if let Some(mut body) = call.take_body() {
        parse_spec_block(&mut body, Scope::Experience, &mut children)?;
    }
    Ok(Experience::new(id, title, target).with_spec_tree(SpecNode::root(children)))
}

fn parse_spec_block(
    cursor: &mut TokenCursor<'_>,
    scope: Scope,
    children: &mut Vec<SpecNode>,
) -> Result<(), FlowParseError> {
    parse_block(cursor, |mut call| match call.kind {
        CallKind::Describe => {
            let title = call.required_string(0, "title")?.to_owned();
            let mut nested = Vec::new();
            if let Some(mut body) = call.take_body() {
                parse_spec_block(&mut body, Scope::Describe, &mut nested)?;
            }
            children.push(SpecNode::describe(title, nested));
            Ok(())
        }
        CallKind::It => {
            children.push(SpecNode::leaf(call.required_string(0, "title")?));
            Ok(())
        }
        _ => Err(call.misplaced(scope)),
    })
}

fn build_slice(mut call: Call<'_>) -> Result<Slice, FlowParseError> {
    let kind = match call.kind {
        CallKind::Command => SliceKind::Command,
        CallKind::Query => SliceKind::Query,
        _ => SliceKind::Reaction,
    };
    let mut slice = Slice::new(kind, call.required_string(0, "name")?);

    if let Some(mut body) = call.take_body() {
        parse_block(&mut body, |call| match call.kind {
            CallKind::Rule => {
                slice.rules_mut().push(build_rule(call)?);
                Ok(())
            }
            CallKind::Example => {
                slice.push_gwt(build_example(call)?);
                Ok(())
            }
            _ => Err(call.misplaced(Scope::Slice)),
        })?;
    }
    Ok(slice)
}

fn build_rule(mut call: Call<'_>) -> Result<Rule, FlowParseError> {
    let mut rule = Rule::new(call.required_string(0, "description")?);

    if let Some(mut body) = call.take_body() {
        parse_block(&mut body, |call| match call.kind {
            CallKind::Example => {
                rule.examples_mut().push(build_example(call)?);
                Ok(())
            }
            _ => Err(call.misplaced(Scope::Rule)),
        })?;
    }
    Ok(rule)
}

fn build_example(mut call: Call<'_>) -> Result<Example, FlowParseError> {
    let payload = call.take_literal().ok_or(FlowParseError::MissingArgument {
        line_no: call.line_no,
        call: call.kind.name(),
        argument: "payload",
    })?;
    let Value::Object(mut fields) = payload else {
        return Err(FlowParseError::MalformedLiteral {
            line_no: call.line_no,
            reason: "example payload must be an object".to_owned(),
        });
    };

    // A payload `description` stands in for a missing string argument and clashes otherwise.
    let description = match (call.string(0), fields.remove("description")) {
        (Some(argument), None) => Some(argument.to_owned()),
        (None, Some(Value::String(inner))) => Some(inner),
        (None, None) => None,
        (Some(_), Some(_)) => {
            return Err(FlowParseError::MalformedLiteral {
                line_no: call.line_no,
                reason: "example has both a description argument and a description key"
                    .to_owned(),
            })
        }
        (None, Some(_)) => {
            return Err(FlowParseError::MalformedLiteral {
                line_no: call.line_no,
                reason: "example description must be a string".to_owned(),
            })
        }
    };

    let mut example = Example::new(description);
    example.set_given(fields.remove("given"));
    example.set_when(fields.remove("when"));
    example.set_then(fields.remove("then"));
    example.extra_mut().extend(fields);
    Ok(example)
}

/// Parses the flow lines of `source` into a model.
///
/// Narratives and experiences without an explicit id get a generated one prefixed with
/// [`GENERATED_ID_PREFIX`], so parsing such a source twice does not yield equal models.
pub fn parse_flow_source(source: &str) -> Result<FlowModel, FlowParseError> {
    let lines: Vec<&str> = source.lines().collect();
    let scan = scan_declarations(&lines);
    if let Some(defect) = scan.defect {
        return Err(defect.into());
    }

    let excluded = excluded_lines(&scan.declarations);
    let tokens = scan
        .lexed
        .tokens
        .iter()
        .filter(|token| !excluded.contains(&token.line))
        .collect();
    let mut cursor = TokenCursor::new(tokens);

    let mut narratives = Vec::new();
    parse_block(&mut cursor, |call| match call.kind {
        CallKind::Narrative => {
            narratives.push(build_narrative(call)?);
            Ok(())
        }
        _ => Err(call.misplaced(Scope::TopLevel)),
    })?;
    Ok(FlowModel::new(narratives))
}
