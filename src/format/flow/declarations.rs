// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;

use super::lexer::{lex_lines, LineInfo, Lexed, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceParseError {
    UnterminatedDeclaration { name: String, line_no: usize },
    UnterminatedString { line_no: usize },
    UnterminatedComment { line_no: usize },
    UnbalancedBrace { line_no: usize },
}

impl fmt::Display for SourceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedDeclaration { name, line_no } => write!(
                f,
                "type declaration '{name}' starting on line {line_no} has unbalanced braces"
            ),
            Self::UnterminatedString { line_no } => {
                write!(f, "unterminated string literal starting on line {line_no}")
            }
            Self::UnterminatedComment { line_no } => {
                write!(f, "unterminated block comment starting on line {line_no}")
            }
            Self::UnbalancedBrace { line_no } => {
                write!(f, "unbalanced closing brace on line {line_no}")
            }
        }
    }
}

impl std::error::Error for SourceParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDeclarationKind {
    Interface,
    TypeAlias,
    Enum,
}

/// A type-like declaration located in a source document.
///
/// `start_line`/`end_line` are 0-based and inclusive. The range covers comment lines attached
/// directly above the keyword line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: TypeDeclarationKind,
    pub start_line: usize,
    pub end_line: usize,
}

impl TypeDeclaration {
    pub fn line_range(&self) -> RangeInclusive<usize> {
        self.start_line..=self.end_line
    }

    pub fn lines<'a, S: AsRef<str>>(&self, lines: &'a [S]) -> impl Iterator<Item = &'a str> {
        lines[self.line_range()].iter().map(AsRef::as_ref)
    }
}

fn declaration_start_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:const\s+)?(interface|type|enum)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
        )
        .expect("static declaration pattern")
    })
}

pub(crate) fn declaration_start(line: &str) -> Option<(TypeDeclarationKind, String)> {
    let captures = declaration_start_pattern().captures(line)?;
    let kind = match &captures[1] {
        "interface" => TypeDeclarationKind::Interface,
        "type" => TypeDeclarationKind::TypeAlias,
        _ => TypeDeclarationKind::Enum,
    };
    Some((kind, captures[2].to_owned()))
}

/// Result of one scan: the declarations found, and the defect that stopped a strict caller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DeclarationScan {
    pub lexed: Lexed,
    pub declarations: Vec<TypeDeclaration>,
    pub defect: Option<SourceParseError>,
}

#[derive(Debug)]
struct OpenDeclaration {
    name: String,
    kind: TypeDeclarationKind,
    start_line: usize,
    keyword_line: usize,
    saw_brace: bool,
}

fn is_alias_continuation_end(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Punct('=' | '|' | '&' | '<' | ',' | '(' | '[' | '?' | ':') | TokenKind::Arrow
    )
}

fn is_alias_continuation_start(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Punct('|' | '&' | '>' | '?' | ':' | ')' | ']'))
}

/// Whether a `type` alias still continues after line `idx` (which ends at depth 0).
fn alias_continues(lexed: &Lexed, idx: usize) -> bool {
    if let Some(last) = lexed.line_tokens(idx).last() {
        if last.is_punct(';') {
            return false;
        }
        if is_alias_continuation_end(&last.kind) {
            return true;
        }
    }

    let next_code_line = (idx + 1..lexed.lines.len()).find(|&j| lexed.lines[j].has_code());
    next_code_line
        .and_then(|j| lexed.line_tokens(j).first())
        .is_some_and(|first| is_alias_continuation_start(&first.kind))
}

impl OpenDeclaration {
    fn closes_on(&self, lexed: &Lexed, idx: usize, info: &LineInfo) -> bool {
        if info.depth_end != 0 {
            return false;
        }
        match self.kind {
            TypeDeclarationKind::TypeAlias => !alias_continues(lexed, idx),
            TypeDeclarationKind::Interface | TypeDeclarationKind::Enum => self.saw_brace,
        }
    }

    fn finish(self, end_line: usize) -> TypeDeclaration {
        TypeDeclaration {
            name: self.name,
            kind: self.kind,
            start_line: self.start_line,
            end_line,
        }
    }
}

/// First line of the comment block sitting directly above `keyword_line`, never before `floor`.
fn leading_comment_start(lines: &[LineInfo], keyword_line: usize, floor: usize) -> usize {
    let mut start = keyword_line;
    while start > floor {
        let candidate = &lines[start - 1];
        if !candidate.is_comment_only() || candidate.depth_start != 0 {
            break;
        }
        start -= 1;
    }
    // A run whose first line is the tail of a block comment opened on a code line stays put.
    if start < keyword_line && lines[start].starts_in_comment {
        return keyword_line;
    }
    start
}

/// Scans `lines` for top-level type declarations.
///
/// The scanner is a small state machine over the lexer's per-line brace depths: outside a
/// declaration it looks for a declaration keyword at depth 0; inside one it waits for the
/// depth to return to 0 (and, for `type` aliases, for the alias expression to end).
pub(crate) fn scan_declarations<S: AsRef<str>>(lines: &[S]) -> DeclarationScan {
    let lexed = lex_lines(lines);
    let mut declarations = Vec::new();
    let mut open: Option<OpenDeclaration> = None;
    let mut floor = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let info = lexed.lines[idx];

        if open.is_none() {
            if info.depth_start != 0 || info.starts_in_string || info.starts_in_comment {
                continue;
            }
            let Some((kind, name)) = declaration_start(line.as_ref()) else {
                continue;
            };
            open = Some(OpenDeclaration {
                name,
                kind,
                start_line: leading_comment_start(&lexed.lines, idx, floor),
                keyword_line: idx,
                saw_brace: false,
            });
        }

        let Some(decl) = open.as_mut() else {
            continue;
        };
        decl.saw_brace |= info.opened > 0;
        if decl.closes_on(&lexed, idx, &info) {
            if let Some(decl) = open.take() {
                declarations.push(decl.finish(idx));
            }
            floor = idx + 1;
        }
    }

    let defect = match open {
        Some(decl) => Some(SourceParseError::UnterminatedDeclaration {
            name: decl.name,
            line_no: decl.keyword_line + 1,
        }),
        None => lexed.defect.clone(),
    };

    DeclarationScan {
        lexed,
        declarations,
        defect,
    }
}

/// Collects the type declarations of a source document.
///
/// Permissive: if the document has a defect (e.g. a declaration whose braces never balance),
/// the declarations found before it are still returned.
pub fn collect_type_declarations<S: AsRef<str>>(lines: &[S]) -> Vec<TypeDeclaration> {
    scan_declarations(lines).declarations
}

/// Strict variant of [`collect_type_declarations`]: any lexical or brace defect is an error.
pub fn try_collect_type_declarations<S: AsRef<str>>(
    lines: &[S],
) -> Result<Vec<TypeDeclaration>, SourceParseError> {
    let scan = scan_declarations(lines);
    match scan.defect {
        Some(defect) => Err(defect),
        None => Ok(scan.declarations),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        collect_type_declarations, try_collect_type_declarations, SourceParseError,
        TypeDeclaration, TypeDeclarationKind,
    };

    fn spans(lines: &[&str]) -> Vec<(String, usize, usize)> {
        collect_type_declarations(lines)
            .into_iter()
            .map(|d| (d.name, d.start_line, d.end_line))
            .collect()
    }

    #[test]
    fn finds_brace_balanced_interfaces() {
        let lines = [
            "import { narrative } from '@flowspec/narrative';",
            "",
            "export interface Cart {",
            "  items: { sku: string }[];",
            "}",
            "narrative('Checkout', () => {});",
        ];
        let decls = collect_type_declarations(&lines);
        assert_eq!(
            decls,
            vec![TypeDeclaration {
                name: "Cart".to_owned(),
                kind: TypeDeclarationKind::Interface,
                start_line: 2,
                end_line: 4,
            }]
        );
        let text: Vec<&str> = decls[0].lines(&lines).collect();
        assert_eq!(text.first(), Some(&"export interface Cart {"));
    }

    #[test]
    fn single_line_and_multi_line_aliases() {
        let lines = [
            "type Id = string;",
            "type Status =",
            "  | 'open'",
            "  | 'closed';",
            "export type Props = {",
            "  id: Id;",
            "};",
            "type Short = number",
            "const x = 1;",
        ];
        assert_eq!(
            spans(&lines),
            [
                ("Id".to_owned(), 0, 0),
                ("Status".to_owned(), 1, 3),
                ("Props".to_owned(), 4, 6),
                ("Short".to_owned(), 7, 7)
            ]
        );
    }

    #[test]
    fn union_continuation_on_next_line_extends_alias() {
        let lines = ["type Shape = Circle", "  | Square;", "run();"];
        assert_eq!(spans(&lines), [("Shape".to_owned(), 0, 1)]);
    }

    #[test]
    fn enums_and_opening_brace_on_next_line() {
        let lines = ["export const enum Color", "{", "  Red,", "}", "interface E {}"];
        let decls = collect_type_declarations(&lines);
        assert_eq!(decls[0].kind, TypeDeclarationKind::Enum);
        assert_eq!((decls[0].start_line, decls[0].end_line), (0, 3));
        assert_eq!((decls[1].start_line, decls[1].end_line), (4, 4));
    }

    #[test]
    fn attaches_directly_preceding_comments() {
        let lines = [
            "// not attached",
            "",
            "/**",
            " * A cart.",
            " */",
            "interface Cart {}",
            "// trailing note",
            "interface Order {}",
        ];
        assert_eq!(
            spans(&lines),
            [("Cart".to_owned(), 2, 5), ("Order".to_owned(), 6, 7)]
        );
    }

    #[test]
    fn ignores_nested_and_quoted_declarations() {
        let lines = [
            "narrative('x', () => {",
            "  type Local = string;",
            "});",
            "const s = 'interface Fake {';",
            "const t = `",
            "interface AlsoFake {",
            "`;",
        ];
        assert!(collect_type_declarations(&lines).is_empty());
    }

    #[test]
    fn ignores_type_only_imports_and_reexports() {
        let lines = ["import type { A } from './a';", "export type { B } from './b';"];
        assert!(collect_type_declarations(&lines).is_empty());
    }

    #[test]
    fn unterminated_declaration_is_strict_error_but_permissive_prefix() {
        let lines = ["interface Ok {}", "interface Broken {", "  a: string;"];

        assert_eq!(spans(&lines), [("Ok".to_owned(), 0, 0)]);
        assert_eq!(
            try_collect_type_declarations(&lines),
            Err(SourceParseError::UnterminatedDeclaration {
                name: "Broken".to_owned(),
                line_no: 2,
            })
        );
    }

    #[test]
    fn ranges_never_overlap() {
        let lines = [
            "interface A { a: 1 } interface B {",
            "}",
            "type C = { c: 1 }; type D = 2;",
        ];
        let decls = collect_type_declarations(&lines);
        for pair in decls.windows(2) {
            assert!(pair[0].end_line < pair[1].start_line);
        }
    }
}
