// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Object-literal payloads (`example(..., { given: [...] })`) as JSON values.

use serde_json::{Map, Number, Value};

use super::builder::FlowParseError;
use super::lexer::{TokenCursor, TokenKind};

fn malformed(line_no: usize, reason: impl Into<String>) -> FlowParseError {
    FlowParseError::MalformedLiteral {
        line_no,
        reason: reason.into(),
    }
}

fn parse_number(raw: &str, negative: bool, line_no: usize) -> Result<Value, FlowParseError> {
    let digits = raw.replace('_', "");
    let sign = if negative { -1 } else { 1 };

    let hex = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"));
    if let Some(hex) = hex {
        let value = i64::from_str_radix(hex, 16)
            .map_err(|_| malformed(line_no, format!("invalid hex number {raw}")))?;
        return Ok(Value::Number(Number::from(sign * value)));
    }

    if !digits.contains(['.', 'e', 'E']) {
        if let Ok(value) = digits.parse::<i64>() {
            return Ok(Value::Number(Number::from(sign * value)));
        }
    }

    let value: f64 = digits
        .parse()
        .map_err(|_| malformed(line_no, format!("invalid number {raw}")))?;
    Number::from_f64(if negative { -value } else { value })
        .map(Value::Number)
        .ok_or_else(|| malformed(line_no, format!("number {raw} is not finite")))
}

/// Parses one literal value at the cursor.
///
/// Accepts objects (bare, quoted, or numeric keys), arrays, strings, signed numbers,
/// `true`/`false`/`null` (`undefined` reads as `null`), and trailing commas.
pub(crate) fn parse_literal(cursor: &mut TokenCursor<'_>) -> Result<Value, FlowParseError> {
    let line_no = cursor.line_no();
    let Some(token) = cursor.next() else {
        return Err(FlowParseError::UnexpectedEof {
            expected: "a literal value",
        });
    };

    match &token.kind {
        TokenKind::Str(value) => Ok(Value::String(value.clone())),
        TokenKind::Number(raw) => parse_number(raw, false, line_no),
        TokenKind::Punct(sign @ ('-' | '+')) => match cursor.next().map(|t| &t.kind) {
            Some(TokenKind::Number(raw)) => parse_number(raw, *sign == '-', line_no),
            _ => Err(malformed(line_no, format!("'{sign}' must precede a number"))),
        },
        TokenKind::Ident(name) => match name.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            other => Err(malformed(
                line_no,
                format!("'{other}' is not a literal value"),
            )),
        },
        TokenKind::Punct('[') => parse_array(cursor),
        TokenKind::Punct('{') => parse_object(cursor),
        other => Err(malformed(line_no, format!("unexpected {other}"))),
    }
}

fn parse_array(cursor: &mut TokenCursor<'_>) -> Result<Value, FlowParseError> {
    let mut items = Vec::new();
    loop {
        if cursor.eat_punct(']') {
            return Ok(Value::Array(items));
        }
        items.push(parse_literal(cursor)?);
        if !cursor.eat_punct(',') && !cursor.peek().is_some_and(|t| t.is_punct(']')) {
            return Err(malformed(cursor.line_no(), "expected ',' or ']' in array"));
        }
    }
}

fn parse_object(cursor: &mut TokenCursor<'_>) -> Result<Value, FlowParseError> {
    let mut fields = Map::new();
    loop {
        if cursor.eat_punct('}') {
            return Ok(Value::Object(fields));
        }

        let line_no = cursor.line_no();
        let key = match cursor.next().map(|t| &t.kind) {
            Some(TokenKind::Ident(key) | TokenKind::Str(key) | TokenKind::Number(key)) => {
                key.clone()
            }
            Some(other) => return Err(malformed(line_no, format!("unexpected {other} as key"))),
            None => {
                return Err(FlowParseError::UnexpectedEof {
                    expected: "an object key",
                })
            }
        };
        if !cursor.eat_punct(':') {
            return Err(malformed(
                cursor.line_no(),
                format!("expected ':' after key '{key}'"),
            ));
        }
        let value = parse_literal(cursor)?;
        fields.insert(key, value);

        if !cursor.eat_punct(',') && !cursor.peek().is_some_and(|t| t.is_punct('}')) {
            return Err(malformed(cursor.line_no(), "expected ',' or '}' in object"));
        }
    }
}
