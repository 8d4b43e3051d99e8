// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{FlowModel, SpecNode};

pub const DEFAULT_SPEC_SEPARATOR: &str = " → ";

/// Flattens `describe`/`it` trees into one path string per leaf.
///
/// Paths are emitted in depth-first, left-to-right leaf order. Describes with a blank title add
/// no segment but their children are still visited, so the output length always equals the
/// number of leaves.
pub fn flatten_client_specs(nodes: &[SpecNode], separator: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut path: Vec<&str> = Vec::new();
    for node in nodes {
        flatten_into(node, separator, &mut path, &mut out);
    }
    out
}

fn flatten_into<'a>(
    node: &'a SpecNode,
    separator: &str,
    path: &mut Vec<&'a str>,
    out: &mut Vec<String>,
) {
    match node {
        SpecNode::Leaf { title, .. } => {
            if title.trim().is_empty() {
                out.push(path.join(separator));
            } else {
                path.push(title);
                out.push(path.join(separator));
                path.pop();
            }
        }
        SpecNode::Describe {
            title, children, ..
        } => {
            let pushed = !title.trim().is_empty();
            if pushed {
                path.push(title);
            }
            for child in children {
                flatten_into(child, separator, path, out);
            }
            if pushed {
                path.pop();
            }
        }
    }
}

/// Every client experience's spec paths, keyed by experience id, in model order.
pub fn client_spec_paths(model: &FlowModel, separator: &str) -> Vec<(String, Vec<String>)> {
    model
        .narratives()
        .iter()
        .flat_map(|narrative| narrative.experiences())
        .filter(|experience| experience.target() == crate::model::ExperienceTarget::Client)
        .map(|experience| (experience.id().to_string(), experience.spec_paths(separator)))
        .collect()
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::{flatten_client_specs, DEFAULT_SPEC_SEPARATOR};
    use crate::model::fixtures::strategies::spec_tree;

    proptest! {
        #[test]
        fn emits_exactly_one_path_per_leaf(
            nodes in prop::collection::vec(spec_tree(), 0..4),
        ) {
            let leaves: usize = nodes.iter().map(|node| node.leaf_count()).sum();
            prop_assert_eq!(flatten_client_specs(&nodes, DEFAULT_SPEC_SEPARATOR).len(), leaves);
        }

        #[test]
        fn titled_leaves_end_their_path(tree in spec_tree()) {
            let paths = flatten_client_specs(std::slice::from_ref(&tree), "/");
            if let crate::model::SpecNode::Leaf { title, .. } = &tree {
                if !title.trim().is_empty() {
                    prop_assert_eq!(&paths, &vec![title.clone()]);
                }
            }
        }
    }
}
