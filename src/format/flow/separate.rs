// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::declarations::{collect_type_declarations, TypeDeclaration};

/// A source document partitioned into type-declaration lines and flow lines.
///
/// Every line index appears in exactly one of the two lists, each in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSplit {
    pub declarations: Vec<TypeDeclaration>,
    pub type_line_indices: Vec<usize>,
    pub flow_line_indices: Vec<usize>,
}

impl SourceSplit {
    pub fn from_declarations(line_count: usize, declarations: Vec<TypeDeclaration>) -> Self {
        let excluded = excluded_lines(&declarations);
        let (type_line_indices, flow_line_indices) =
            (0..line_count).partition(|idx| excluded.contains(idx));
        Self {
            declarations,
            type_line_indices,
            flow_line_indices,
        }
    }

    pub fn flow_lines<'a, S: AsRef<str>>(&self, lines: &'a [S]) -> Vec<&'a str> {
        self.flow_line_indices
            .iter()
            .map(|&idx| lines[idx].as_ref())
            .collect()
    }
}

/// Every line index covered by a declaration.
pub fn excluded_lines(declarations: &[TypeDeclaration]) -> BTreeSet<usize> {
    declarations
        .iter()
        .flat_map(TypeDeclaration::line_range)
        .collect()
}

pub fn split_source<S: AsRef<str>>(lines: &[S]) -> SourceSplit {
    SourceSplit::from_declarations(lines.len(), collect_type_declarations(lines))
}

/// The source with all type declarations removed, original line order preserved.
pub fn extract_flow_code<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    split_source(lines)
        .flow_lines(lines)
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{excluded_lines, extract_flow_code, split_source};

    const SOURCE: [&str; 9] = [
        "import { narrative } from '@flowspec/narrative';",
        "// Cart shape",
        "interface Cart {",
        "  items: string[];",
        "}",
        "",
        "narrative('Checkout', () => {});",
        "type Total = number;",
        "run();",
    ];

    #[test]
    fn partitions_every_line_exactly_once() {
        let split = split_source(&SOURCE);
        assert_eq!(split.type_line_indices, [1, 2, 3, 4, 7]);
        assert_eq!(split.flow_line_indices, [0, 5, 6, 8]);

        let mut all: Vec<usize> = split
            .type_line_indices
            .iter()
            .chain(&split.flow_line_indices)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..SOURCE.len()).collect::<Vec<_>>());
    }

    #[test]
    fn flow_code_keeps_relative_order() {
        assert_eq!(
            extract_flow_code(&SOURCE),
            [
                "import { narrative } from '@flowspec/narrative';",
                "",
                "narrative('Checkout', () => {});",
                "run();",
            ]
        );
    }

    #[test]
    fn excluded_lines_cover_all_declaration_ranges() {
        let split = split_source(&SOURCE);
        let excluded = excluded_lines(&split.declarations);
        assert_eq!(excluded.into_iter().collect::<Vec<_>>(), split.type_line_indices);
    }

    #[test]
    fn source_without_types_is_all_flow() {
        let lines = ["narrative('x', () => {", "});"];
        let split = split_source(&lines);
        assert!(split.declarations.is_empty());
        assert_eq!(split.flow_line_indices, [0, 1]);
    }
}
