// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical ordering of type declarations inside a flow source.
//!
//! Output layout: the import header, then every declaration sorted by name and separated by one
//! blank line, then the remaining flow lines. Running the reconstruction on its own output is a
//! no-op.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use super::declarations::{scan_declarations, SourceParseError, TypeDeclaration};
use super::lexer::{Lexed, TokenKind};
use super::separate::excluded_lines;

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_ascii_lowercase()
        .cmp(&b.to_ascii_lowercase())
        .then_with(|| a.cmp(b))
}

fn is_import_line(line: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix("import") else {
        return false;
    };
    rest.chars()
        .next()
        .is_some_and(|ch| ch.is_whitespace() || matches!(ch, '{' | '*' | '\'' | '"'))
}

/// Index of the last line belonging to the last top-level import statement.
fn last_import_end(lines: &[&str], lexed: &Lexed, excluded: &BTreeSet<usize>) -> Option<usize> {
    let start = (0..lines.len()).rev().find(|idx| {
        let info = &lexed.lines[*idx];
        !excluded.contains(idx)
            && info.depth_start == 0
            && !info.starts_in_string
            && !info.starts_in_comment
            && is_import_line(lines[*idx])
    })?;

    let end = (start..lines.len()).find(|&idx| {
        lexed.lines[idx].depth_end == 0
            && lexed
                .line_tokens(idx)
                .last()
                .is_some_and(|t| t.is_punct(';') || matches!(t.kind, TokenKind::Str(_)))
    });
    Some(end.unwrap_or(start))
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Drops leading/trailing blank lines and collapses blank runs outside string literals.
fn tidy_flow<'a>(flow: &[(usize, &'a str)], lexed: &Lexed) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(flow.len());
    let mut pending_blank = false;
    for &(idx, line) in flow {
        let in_string = lexed.lines[idx].starts_in_string;
        if is_blank(line) && !in_string {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push("");
            pending_blank = false;
        }
        out.push(line);
    }
    out
}

fn declaration_key(lines: &[&str], decl: &TypeDeclaration) -> String {
    decl.lines(lines)
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites `source` with its type declarations sorted and deduplicated.
///
/// Declarations are ordered by ASCII-case-insensitive name, then case-sensitive name, then
/// source order. Declarations with identical text are emitted once. A source with no
/// declarations is returned unchanged.
///
/// Errors when the source has an unterminated declaration, string, or comment, or a stray
/// closing brace: rewriting such a file could corrupt it.
pub fn sort_type_declarations(source: &str) -> Result<String, SourceParseError> {
    let trailing_newline = source.ends_with('\n');
    let body = source.strip_suffix('\n').unwrap_or(source);
    let lines: Vec<&str> = body
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let scan = scan_declarations(&lines);
    if let Some(defect) = scan.defect {
        return Err(defect);
    }
    if scan.declarations.is_empty() {
        return Ok(source.to_owned());
    }

    let lexed = scan.lexed;
    let excluded = excluded_lines(&scan.declarations);
    let header_end = last_import_end(&lines, &lexed, &excluded);

    let mut header: Vec<&str> = Vec::new();
    let mut flow: Vec<(usize, &str)> = Vec::new();
    for (idx, &line) in lines.iter().enumerate() {
        if excluded.contains(&idx) {
            continue;
        }
        match header_end {
            Some(end) if idx <= end => header.push(line),
            _ => flow.push((idx, line)),
        }
    }
    while header.last().is_some_and(|line| is_blank(line)) {
        header.pop();
    }
    let flow = tidy_flow(&flow, &lexed);

    let mut declarations = scan.declarations;
    declarations.sort_by(|a, b| compare_names(&a.name, &b.name));

    let mut seen = HashSet::new();
    let mut out: Vec<&str> = header;
    for decl in &declarations {
        if !seen.insert(declaration_key(&lines, decl)) {
            continue;
        }
        if !out.is_empty() {
            out.push("");
        }
        out.extend(decl.lines(&lines));
    }
    if !flow.is_empty() {
        out.push("");
        out.extend(flow);
    }

    let mut rendered = out.join("\n");
    if trailing_newline {
        rendered.push('\n');
    }
    Ok(rendered)
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::{compare_names, sort_type_declarations};
    use crate::format::flow::{collect_type_declarations, split_source};

    fn type_name() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["A", "a", "B", "Cart", "cart", "Order"])
    }

    fn declaration() -> impl Strategy<Value = String> {
        prop_oneof![
            type_name().prop_map(|name| format!("type {name} = string;")),
            type_name().prop_map(|name| format!("type {name} =\n  | 'a'\n  | 'b';")),
            type_name().prop_map(|name| format!("interface {name} {{\n  id: string;\n}}")),
            type_name()
                .prop_map(|name| format!("/** {name} doc */\nexport interface {name} {{ x: number }}")),
            type_name().prop_map(|name| format!("export enum {name} {{\n  A,\n  B,\n}}")),
        ]
    }

    fn flow() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("import { narrative } from '@flowspec/narrative';".to_owned()),
            Just("import {\n  a,\n  b,\n} from './x';".to_owned()),
            Just("narrative('t', () => {\n  it('x');\n});".to_owned()),
            Just("run();".to_owned()),
            Just("// note".to_owned()),
            Just(String::new()),
            Just("const doc = `\n\nx`;".to_owned()),
        ]
    }

    fn source() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(prop_oneof![declaration(), flow()], 0..12),
            any::<bool>(),
        )
            .prop_map(|(parts, trailing_newline)| {
                let mut source = parts.join("\n");
                if trailing_newline {
                    source.push('\n');
                }
                source
            })
    }

    fn non_blank_flow_lines(source: &str) -> Vec<String> {
        let lines: Vec<&str> = source.lines().collect();
        split_source(&lines)
            .flow_lines(&lines)
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }

    proptest! {
        #[test]
        fn sorting_is_idempotent(source in source()) {
            let once = sort_type_declarations(&source).expect("first pass");
            let twice = sort_type_declarations(&once).expect("second pass");
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn sorting_keeps_flow_lines_and_orders_declarations(source in source()) {
            let sorted = sort_type_declarations(&source).expect("sorted");
            prop_assert_eq!(non_blank_flow_lines(&sorted), non_blank_flow_lines(&source));

            let lines: Vec<&str> = sorted.lines().collect();
            let names: Vec<String> = collect_type_declarations(&lines)
                .into_iter()
                .map(|decl| decl.name)
                .collect();
            prop_assert!(names
                .windows(2)
                .all(|pair| compare_names(&pair[0], &pair[1]).is_le()));
        }
    }
}
