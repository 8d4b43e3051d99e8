// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use flowspec::format::flow::parse_flow_source;
use flowspec::model::{FlowModel, SpecNode};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    LargeManyTypes,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeManyTypes => "large_many_types",
        }
    }

    fn shape(self) -> Shape {
        match self {
            Self::Small => Shape {
                narratives: 2,
                experiences: 2,
                slices: 3,
                types_per_narrative: 2,
            },
            Self::Medium => Shape {
                narratives: 20,
                experiences: 4,
                slices: 8,
                types_per_narrative: 4,
            },
            Self::LargeManyTypes => Shape {
                narratives: 60,
                experiences: 4,
                slices: 10,
                types_per_narrative: 16,
            },
        }
    }
}

struct Shape {
    narratives: usize,
    experiences: usize,
    slices: usize,
    types_per_narrative: usize,
}

fn push_types(out: &mut String, n: usize, count: usize) {
    // Reverse order so the sorter has real work to do.
    for t in (0..count).rev() {
        if t % 2 == 0 {
            out.push_str(&format!(
                "/** Payload {n}.{t}. */\ninterface Payload{n}x{t} {{\n  id: string;\n  items: {{ sku: string; qty: number }}[];\n}}\n\n"
            ));
        } else {
            out.push_str(&format!(
                "type State{n}x{t} =\n  | {{ kind: 'open' }}\n  | {{ kind: 'closed'; at: Date }};\n\n"
            ));
        }
    }
}

fn push_narrative(out: &mut String, n: usize, shape: &Shape) {
    out.push_str(&format!("narrative('Narrative {n}', 'narrative-{n}', () => {{\n"));
    for e in 0..shape.experiences {
        let target = if e % 2 == 0 { "client" } else { "server" };
        out.push_str(&format!(
            "  experience('Experience {e}', '{target}', 'experience-{n}-{e}', () => {{\n    describe('screen {e}', () => {{\n      it('renders');\n      describe('when empty', () => {{\n        it('shows a hint');\n        it('hides totals');\n      }});\n    }});\n  }});\n"
        ));
    }
    for s in 0..shape.slices {
        let call = match s % 3 {
            0 => "command",
            1 => "query",
            _ => "reaction",
        };
        out.push_str(&format!(
            "  {call}('slice {s}', () => {{\n    rule('rule {s}', () => {{\n      example('example {s}', {{\n        given: [{{ eventRef: 'Happened{s}', exampleData: {{ n: {s}, tag: 'x' }} }}],\n        when: {{ commandRef: 'Do{s}', exampleData: {{}} }},\n        then: [{{ stateRef: 'View{s}', exampleData: {{ total: {s} }} }}],\n      }});\n    }});\n  }});\n"
        ));
    }
    out.push_str("});\n\n");
}

/// A flow source with type declarations interleaved between narratives.
pub fn flow_source(case: Case) -> String {
    let shape = case.shape();
    let mut out = String::from("import { narrative } from '@flowspec/narrative';\n\n");
    for n in 0..shape.narratives {
        push_types(&mut out, n, shape.types_per_narrative);
        push_narrative(&mut out, n, &shape);
    }
    out
}

pub fn flow_model(case: Case) -> FlowModel {
    parse_flow_source(&flow_source(case)).expect("fixture flow source parses")
}

fn checksum_spec(node: &SpecNode, acc: u64) -> u64 {
    let acc = acc.wrapping_mul(131).wrapping_add(node.title().len() as u64);
    node.children().iter().fold(acc, |acc, child| checksum_spec(child, acc))
}

pub fn checksum_model(model: &FlowModel) -> u64 {
    let mut acc = 0u64;
    for narrative in model.narratives() {
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(narrative.id().as_str().len() as u64);
        for experience in narrative.experiences() {
            acc = checksum_spec(experience.spec_tree(), acc);
        }
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(narrative.slices().len() as u64);
    }
    acc
}
