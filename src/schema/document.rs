// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serialized shape of the schema document.
//!
//! Every object carries a flattened `extra` map: fields this compiler does not interpret are
//! kept verbatim and written back after the typed fields.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type ExtraJson = BTreeMap<String, Value>;

// Typed field names per object. A pass-through key with one of these names is dropped on export
// so no object ever carries the same key twice.
pub(crate) const DOCUMENT_FIELDS: &[&str] = &["narratives"];
pub(crate) const NARRATIVE_FIELDS: &[&str] = &["id", "title", "experiences", "slices"];
pub(crate) const EXPERIENCE_FIELDS: &[&str] = &["id", "title", "target", "specs", "specPaths"];
pub(crate) const SPEC_NODE_FIELDS: &[&str] = &["type", "title", "children"];
pub(crate) const SLICE_FIELDS: &[&str] = &["type", "name", "gwt", "rules"];
pub(crate) const RULE_FIELDS: &[&str] = &["description", "examples"];
pub(crate) const EXAMPLE_FIELDS: &[&str] = &["description", "given", "when", "then"];

/// Reads a present field, including an explicit `null`, as `Some`. A missing field stays `None`
/// through `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDocument {
    pub narratives: Vec<NarrativeJson>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NarrativeJson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub experiences: Vec<ExperienceJson>,
    #[serde(default)]
    pub slices: Vec<SliceJson>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTargetJson {
    Client,
    Server,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceJson {
    pub id: String,
    pub title: String,
    pub target: ExperienceTargetJson,
    #[serde(default)]
    pub specs: SpecsJson,
    /// Flattened spec paths of client experiences. Derived on export, ignored on import.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spec_paths: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}

/// An experience's specifications: the tree root, or a list of flattened paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SpecsJson {
    Tree(SpecNodeJson),
    Flat(Vec<String>),
}

impl Default for SpecsJson {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpecNodeKindJson {
    Describe,
    It,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpecNodeJson {
    #[serde(rename = "type")]
    pub kind: SpecNodeKindJson,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SpecNodeJson>>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SliceTypeJson {
    Command,
    Query,
    Reaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SliceJson {
    #[serde(rename = "type")]
    pub kind: SliceTypeJson,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gwt: Option<Vec<ExampleJson>>,
    #[serde(default)]
    pub rules: Vec<RuleJson>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleJson {
    pub description: String,
    #[serde(default)]
    pub examples: Vec<ExampleJson>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExampleJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub given: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub when: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub then: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraJson,
}
