// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{ExperienceId, NarrativeId};
use super::slice::Slice;
use super::spec_tree::SpecNode;
use super::Extra;

/// The root container. Narrative order is generation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowModel {
    narratives: Vec<Narrative>,
    extra: Extra,
}

impl FlowModel {
    pub fn new(narratives: Vec<Narrative>) -> Self {
        Self {
            narratives,
            extra: Extra::new(),
        }
    }

    pub fn narratives(&self) -> &[Narrative] {
        &self.narratives
    }

    pub fn narratives_mut(&mut self) -> &mut Vec<Narrative> {
        &mut self.narratives
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        &mut self.extra
    }

    /// Appends another model's narratives after this one's, keeping both orders.
    ///
    /// Root-level pass-through fields already present here win over `other`'s.
    pub fn merge(&mut self, other: FlowModel) {
        self.narratives.extend(other.narratives);
        for (key, value) in other.extra {
            self.extra.entry(key).or_insert(value);
        }
    }

    pub fn narrative(&self, narrative_id: &NarrativeId) -> Option<&Narrative> {
        self.narratives.iter().find(|n| n.id() == narrative_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    id: NarrativeId,
    title: String,
    experiences: Vec<Experience>,
    slices: Vec<Slice>,
    extra: Extra,
}

impl Narrative {
    pub fn new(id: NarrativeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            experiences: Vec::new(),
            slices: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn id(&self) -> &NarrativeId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn experiences(&self) -> &[Experience] {
        &self.experiences
    }

    pub fn experiences_mut(&mut self) -> &mut Vec<Experience> {
        &mut self.experiences
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn slices_mut(&mut self) -> &mut Vec<Slice> {
        &mut self.slices
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        &mut self.extra
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    id: ExperienceId,
    title: String,
    target: ExperienceTarget,
    spec_tree: SpecNode,
    extra: Extra,
}

impl Experience {
    pub fn new(id: ExperienceId, title: impl Into<String>, target: ExperienceTarget) -> Self {
        Self {
            id,
            title: title.into(),
            target,
            spec_tree: SpecNode::root(Vec::new()),
            extra: Extra::new(),
        }
    }

    pub fn with_spec_tree(mut self, spec_tree: SpecNode) -> Self {
        self.spec_tree = spec_tree;
        self
    }

    pub fn id(&self) -> &ExperienceId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target(&self) -> ExperienceTarget {
        self.target
    }

    pub fn spec_tree(&self) -> &SpecNode {
        &self.spec_tree
    }

    pub fn spec_tree_mut(&mut self) -> &mut SpecNode {
        &mut self.spec_tree
    }

    /// Flattened `describe → it` paths of this experience, in leaf order.
    pub fn spec_paths(&self, separator: &str) -> Vec<String> {
        crate::query::specs::flatten_client_specs(std::slice::from_ref(&self.spec_tree), separator)
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        &mut self.extra
    }
}

/// Which side of the generated application an experience describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceTarget {
    Client,
    Server,
}

impl ExperienceTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for ExperienceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseExperienceTargetError;

impl fmt::Display for ParseExperienceTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid experience target (expected client/server)")
    }
}

impl std::error::Error for ParseExperienceTargetError {}

impl FromStr for ExperienceTarget {
    type Err = ParseExperienceTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            _ => Err(ParseExperienceTargetError),
        }
    }
}
