// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Line-aware lexer for flow sources.
//!
//! This is not a grammar for the host language. It only knows enough to keep braces inside
//! strings and comments from being counted, and to hand the model builder a token stream.
//! Regular-expression literals are not recognized.

use std::fmt;
use std::ops::Range;

use super::declarations::SourceParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// A string literal with escapes decoded.
    Str(String),
    /// Raw numeric text, e.g. `1_000`, `2.5e3`.
    Number(String),
    Punct(char),
    Arrow,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Number(raw) => f.write_str(raw),
            Self::Punct(ch) => write!(f, "'{ch}'"),
            Self::Arrow => f.write_str("'=>'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 0-based index of the line the token starts on.
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct(ch)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// What the lexer saw on one source line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineInfo {
    /// Brace depth before the first character of the line.
    pub depth_start: usize,
    /// Brace depth after the last character of the line.
    pub depth_end: usize,
    /// Number of `{` counted on this line.
    pub opened: usize,
    /// Index range into [`Lexed::tokens`] of tokens starting on this line.
    pub first_token: Option<usize>,
    pub last_token: Option<usize>,
    pub has_comment: bool,
    /// The line begins inside a multi-line string literal.
    pub starts_in_string: bool,
    /// The line begins inside a block comment.
    pub starts_in_comment: bool,
}

impl LineInfo {
    pub fn has_code(&self) -> bool {
        self.first_token.is_some()
    }

    /// A line carrying only comment text (no tokens, not string content).
    pub fn is_comment_only(&self) -> bool {
        self.has_comment && !self.has_code() && !self.starts_in_string
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub lines: Vec<LineInfo>,
    /// First lexical defect, if any. Lexing continues past it.
    pub defect: Option<SourceParseError>,
}

impl Lexed {
    pub fn line_tokens(&self, line: usize) -> &[Token] {
        match self.lines.get(line) {
            Some(LineInfo {
                first_token: Some(first),
                last_token: Some(last),
                ..
            }) => &self.tokens[*first..=*last],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Code,
    BlockComment {
        start_line: usize,
    },
    Template {
        start_line: usize,
    },
}

#[derive(Debug, Default)]
struct Lexer {
    mode: Mode,
    depth: usize,
    template: String,
    out: Lexed,
}

pub fn lex_lines<S: AsRef<str>>(lines: &[S]) -> Lexed {
    let mut lexer = Lexer::default();
    for (idx, line) in lines.iter().enumerate() {
        lexer.feed_line(idx, line.as_ref());
    }
    lexer.finish()
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Decodes the escape whose first char (after the backslash) is `chars[i]`; returns the decoded
/// char and how many chars were consumed.
fn decode_escape(chars: &[char], i: usize) -> (Option<char>, usize) {
    let Some(&ch) = chars.get(i) else {
        return (None, 0);
    };
    match ch {
        'n' => (Some('\n'), 1),
        't' => (Some('\t'), 1),
        'r' => (Some('\r'), 1),
        '0' => (Some('\0'), 1),
        'u' => {
            if chars.get(i + 1) == Some(&'{') {
                let mut end = i + 2;
                while end < chars.len() && chars[end] != '}' {
                    end += 1;
                }
                let hex: String = chars[i + 2..end.min(chars.len())].iter().collect();
                let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                (decoded, end + 1 - i)
            } else if chars.len() >= i + 5 {
                let hex: String = chars[i + 1..i + 5].iter().collect();
                let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                (decoded, 5)
            } else {
                (Some('u'), 1)
            }
        }
        other => (Some(other), 1),
    }
}

impl Lexer {
    fn record_defect(&mut self, defect: SourceParseError) {
        if self.out.defect.is_none() {
            self.out.defect = Some(defect);
        }
    }

    fn push_token(&mut self, info: &mut LineInfo, kind: TokenKind, line: usize) {
        let index = self.out.tokens.len();
        self.out.tokens.push(Token { kind, line });
        // Tokens continuing a template literal from an earlier line belong to that line.
        if line == self.out.lines.len() {
            info.first_token.get_or_insert(index);
            info.last_token = Some(index);
        } else if let Some(earlier) = self.out.lines.get_mut(line) {
            earlier.first_token.get_or_insert(index);
            earlier.last_token = Some(index);
        }
    }

    fn feed_line(&mut self, idx: usize, line: &str) {
        let mut info = LineInfo {
            depth_start: self.depth,
            starts_in_string: matches!(self.mode, Mode::Template { .. }),
            starts_in_comment: matches!(self.mode, Mode::BlockComment { .. }),
            ..LineInfo::default()
        };

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            let next = chars.get(i + 1).copied();
            match self.mode {
                Mode::BlockComment { .. } => {
                    info.has_comment = true;
                    if ch == '*' && next == Some('/') {
                        self.mode = Mode::Code;
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                Mode::Template { start_line } => {
                    if ch == '\\' {
                        let (decoded, used) = decode_escape(&chars, i + 1);
                        self.template.extend(decoded);
                        i += 1 + used;
                    } else if ch == '`' {
                        let value = std::mem::take(&mut self.template);
                        self.push_token(&mut info, TokenKind::Str(value), start_line);
                        self.mode = Mode::Code;
                        i += 1;
                    } else {
                        self.template.push(ch);
                        i += 1;
                    }
                }
                Mode::Code => {
                    if ch.is_whitespace() {
                        i += 1;
                    } else if ch == '/' && next == Some('/') {
                        info.has_comment = true;
                        break;
                    } else if ch == '/' && next == Some('*') {
                        info.has_comment = true;
                        self.mode = Mode::BlockComment { start_line: idx };
                        i += 2;
                    } else if ch == '`' {
                        self.template.clear();
                        self.mode = Mode::Template { start_line: idx };
                        i += 1;
                    } else if ch == '\'' || ch == '"' {
                        i = self.lex_quoted(&chars, i, idx, &mut info);
                    } else if is_ident_start(ch) {
                        let start = i;
                        while i < chars.len() && is_ident_continue(chars[i]) {
                            i += 1;
                        }
                        let name: String = chars[start..i].iter().collect();
                        self.push_token(&mut info, TokenKind::Ident(name), idx);
                    } else if ch.is_ascii_digit()
                        || (ch == '.' && next.is_some_and(|c| c.is_ascii_digit()))
                    {
                        let start = i;
                        while i < chars.len()
                            && (chars[i].is_ascii_alphanumeric()
                                || chars[i] == '.'
                                || chars[i] == '_'
                                || ((chars[i] == '+' || chars[i] == '-')
                                    && matches!(chars[i - 1], 'e' | 'E')))
                        {
                            i += 1;
                        }
                        let raw: String = chars[start..i].iter().collect();
                        self.push_token(&mut info, TokenKind::Number(raw), idx);
                    } else if ch == '=' && next == Some('>') {
                        self.push_token(&mut info, TokenKind::Arrow, idx);
                        i += 2;
                    } else {
                        match ch {
                            '{' => {
                                self.depth += 1;
                                info.opened += 1;
                            }
                            '}' => {
                                if self.depth == 0 {
                                    self.record_defect(SourceParseError::UnbalancedBrace {
                                        line_no: idx + 1,
                                    });
                                } else {
                                    self.depth -= 1;
                                }
                            }
                            _ => {}
                        }
                        self.push_token(&mut info, TokenKind::Punct(ch), idx);
                        i += 1;
                    }
                }
            }
        }

        if matches!(self.mode, Mode::Template { .. }) {
            self.template.push('\n');
        }

        info.depth_end = self.depth;
        self.out.lines.push(info);
    }

    /// Lexes a `'`/`"` string starting at `chars[start]`; returns the index after it.
    fn lex_quoted(
        &mut self,
        chars: &[char],
        start: usize,
        idx: usize,
        info: &mut LineInfo,
    ) -> usize {
        let quote = chars[start];
        let mut value = String::new();
        let mut i = start + 1;
        loop {
            match chars.get(i) {
                None => {
                    self.record_defect(SourceParseError::UnterminatedString { line_no: idx + 1 });
                    break;
                }
                Some('\\') => {
                    let (decoded, used) = decode_escape(chars, i + 1);
                    value.extend(decoded);
                    i += 1 + used.max(1);
                }
                Some(&ch) if ch == quote => {
                    i += 1;
                    break;
                }
                Some(&ch) => {
                    value.push(ch);
                    i += 1;
                }
            }
        }
        self.push_token(info, TokenKind::Str(value), idx);
        i
    }

    fn finish(mut self) -> Lexed {
        match self.mode {
            Mode::Code => {}
            Mode::BlockComment { start_line } => {
                self.record_defect(SourceParseError::UnterminatedComment {
                    line_no: start_line + 1,
                });
            }
            Mode::Template { start_line } => {
                self.record_defect(SourceParseError::UnterminatedString {
                    line_no: start_line + 1,
                });
            }
        }
        self.out
    }
}

/// Forward-only view over a token slice.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: Vec<&'a Token>,
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: Vec<&'a Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).copied()
    }

    pub fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    /// A new cursor over `range` of this cursor's tokens.
    pub fn sub(&self, range: Range<usize>) -> TokenCursor<'a> {
        Self::new(self.tokens[range].to_vec())
    }

    /// Consumes the next token if it is the punctuation `ch`.
    pub fn eat_punct(&mut self, ch: char) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(ch)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// 1-based line of the next token, or of the last token at end of input.
    pub fn line_no(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last().copied())
            .map_or(1, |t| t.line + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{lex_lines, TokenKind};
    use crate::format::flow::SourceParseError;

    fn kinds(lines: &[&str]) -> Vec<TokenKind> {
        lex_lines(lines).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn braces_inside_strings_and_comments_are_not_counted() {
        let lines = [
            "const a = '{'; // }",
            "/* { */ const b = \"}\";",
            "const c = `{",
            "}`;",
        ];
        let lexed = lex_lines(&lines);
        assert!(lexed.defect.is_none());
        assert!(lexed.lines.iter().all(|line| line.depth_start == 0 && line.depth_end == 0));
        assert!(lexed.lines[3].starts_in_string);
    }

    #[test]
    fn tracks_depth_across_lines() {
        let lines = ["interface A {", "  b: { c: string };", "}"];
        let lexed = lex_lines(&lines);
        let depths: Vec<(usize, usize)> =
            lexed.lines.iter().map(|l| (l.depth_start, l.depth_end)).collect();
        assert_eq!(depths, [(0, 1), (1, 1), (1, 0)]);
        assert_eq!(lexed.lines[1].opened, 1);
    }

    #[test]
    fn decodes_string_escapes() {
        let tokens = kinds(&[r#"it('don\'t A \n', "x")"#]);
        assert_eq!(tokens[2], TokenKind::Str("don't A \n".to_owned()));
        assert_eq!(tokens[4], TokenKind::Str("x".to_owned()));
    }

    #[test]
    fn multi_line_template_is_one_token_on_its_start_line() {
        let lexed = lex_lines(&["x(`a", "b`)"]);
        assert_eq!(lexed.tokens[2].kind, TokenKind::Str("a\nb".to_owned()));
        assert_eq!(lexed.tokens[2].line, 0);
        assert_eq!(lexed.line_tokens(0).len(), 3);
        assert_eq!(lexed.line_tokens(1).len(), 1);
    }

    #[test]
    fn lexes_arrows_numbers_and_punctuation() {
        let tokens = kinds(&["() => { n: -1_000, f: 2.5e-3 }"]);
        assert!(tokens.contains(&TokenKind::Arrow));
        assert!(tokens.contains(&TokenKind::Number("1_000".to_owned())));
        assert!(tokens.contains(&TokenKind::Number("2.5e-3".to_owned())));
        assert!(tokens.contains(&TokenKind::Punct('-')));
    }

    #[test]
    fn comment_only_lines_are_flagged() {
        let lexed = lex_lines(&["/**", " * Doc", " */", "type A = 1; // trailing"]);
        assert!(lexed.lines[..3].iter().all(|l| l.is_comment_only()));
        assert!(lexed.lines[1].starts_in_comment);
        assert!(!lexed.lines[3].is_comment_only());
    }

    #[test]
    fn reports_first_defect_but_keeps_lexing() {
        let lexed = lex_lines(&["}", "const s = 'open", "/* never closed"]);
        assert_eq!(lexed.defect, Some(SourceParseError::UnbalancedBrace { line_no: 1 }));
        assert_eq!(lexed.lines.len(), 3);

        let lexed = lex_lines(&["ok();", "/* never closed"]);
        assert_eq!(lexed.defect, Some(SourceParseError::UnterminatedComment { line_no: 2 }));
    }
}
