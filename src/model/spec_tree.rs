// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::Extra;

/// One node of an experience's `describe`/`it` specification tree.
///
/// A `Describe` whose title is blank groups its children without contributing a path segment
/// when the tree is flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecNode {
    Describe {
        title: String,
        children: Vec<SpecNode>,
        extra: Extra,
    },
    Leaf {
        title: String,
        extra: Extra,
    },
}

impl SpecNode {
    pub fn describe(title: impl Into<String>, children: Vec<SpecNode>) -> Self {
        Self::Describe {
            title: title.into(),
            children,
            extra: Extra::new(),
        }
    }

    pub fn leaf(title: impl Into<String>) -> Self {
        Self::Leaf {
            title: title.into(),
            extra: Extra::new(),
        }
    }

    /// An untitled group, used as the root of every experience tree.
    pub fn root(children: Vec<SpecNode>) -> Self {
        Self::describe("", children)
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Describe { title, .. } | Self::Leaf { title, .. } => title,
        }
    }

    pub fn children(&self) -> &[SpecNode] {
        match self {
            Self::Describe { children, .. } => children,
            Self::Leaf { .. } => &[],
        }
    }

    /// Returns `None` for leaves, which cannot hold children.
    pub fn children_mut(&mut self) -> Option<&mut Vec<SpecNode>> {
        match self {
            Self::Describe { children, .. } => Some(children),
            Self::Leaf { .. } => None,
        }
    }

    pub fn extra(&self) -> &Extra {
        match self {
            Self::Describe { extra, .. } | Self::Leaf { extra, .. } => extra,
        }
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        match self {
            Self::Describe { extra, .. } | Self::Leaf { extra, .. } => extra,
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Describe { children, .. } => children.iter().map(SpecNode::leaf_count).sum(),
        }
    }
}
