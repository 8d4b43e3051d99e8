// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::document::{
    ExampleJson, ExperienceJson, ExperienceTargetJson, ExtraJson, NarrativeJson, RuleJson,
    SchemaDocument, SliceJson, SliceTypeJson, SpecNodeJson, SpecNodeKindJson, SpecsJson,
    DOCUMENT_FIELDS, EXAMPLE_FIELDS, EXPERIENCE_FIELDS, NARRATIVE_FIELDS, RULE_FIELDS,
    SLICE_FIELDS, SPEC_NODE_FIELDS,
};
use crate::model::{
    Example, Experience, ExperienceId, ExperienceTarget, Extra, FlowModel, Id, IdError,
    Narrative, NarrativeId, Rule, Slice, SliceKind, SpecNode,
};
use crate::query::DEFAULT_SPEC_SEPARATOR;

#[derive(Debug)]
pub enum SchemaError {
    Json {
        source: serde_json::Error,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
    LeafWithChildren {
        title: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { source } => write!(f, "invalid schema document: {source}"),
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::LeafWithChildren { title } => {
                write!(f, "spec node 'it' {title:?} cannot have children")
            }
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::LeafWithChildren { .. } => None,
        }
    }
}

fn extra_to_json(extra: &Extra, typed_fields: &[&str]) -> ExtraJson {
    extra
        .iter()
        .filter(|(key, _)| !typed_fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn to_schema(model: &FlowModel) -> SchemaDocument {
    to_schema_with_separator(model, DEFAULT_SPEC_SEPARATOR)
}

/// Converts a model into its schema document; client experiences also list their flattened spec
/// paths joined with `separator`.
///
/// Pass-through keys named like a typed field of their object are not written.
pub fn to_schema_with_separator(model: &FlowModel, separator: &str) -> SchemaDocument {
    SchemaDocument {
        narratives: model
            .narratives()
            .iter()
            .map(|narrative| narrative_to_json(narrative, separator))
            .collect(),
        extra: extra_to_json(model.extra(), DOCUMENT_FIELDS),
    }
}

fn narrative_to_json(narrative: &Narrative, separator: &str) -> NarrativeJson {
    NarrativeJson {
        id: narrative.id().to_string(),
        title: narrative.title().to_owned(),
        experiences: narrative
            .experiences()
            .iter()
            .map(|experience| experience_to_json(experience, separator))
            .collect(),
        slices: narrative.slices().iter().map(slice_to_json).collect(),
        extra: extra_to_json(narrative.extra(), NARRATIVE_FIELDS),
    }
}

fn experience_to_json(experience: &Experience, separator: &str) -> ExperienceJson {
    let (target, spec_paths) = match experience.target() {
        ExperienceTarget::Client => (
            ExperienceTargetJson::Client,
            experience.spec_paths(separator),
        ),
        ExperienceTarget::Server => (ExperienceTargetJson::Server, Vec::new()),
    };
    ExperienceJson {
        id: experience.id().to_string(),
        title: experience.title().to_owned(),
        target,
        specs: SpecsJson::Tree(spec_node_to_json(experience.spec_tree())),
        spec_paths,
        extra: extra_to_json(experience.extra(), EXPERIENCE_FIELDS),
    }
}

fn spec_node_to_json(node: &SpecNode) -> SpecNodeJson {
    match node {
        SpecNode::Describe {
            title,
            children,
            extra,
        } => SpecNodeJson {
            kind: SpecNodeKindJson::Describe,
            title: title.clone(),
            children: Some(children.iter().map(spec_node_to_json).collect()),
            extra: extra_to_json(extra, SPEC_NODE_FIELDS),
        },
        SpecNode::Leaf { title, extra } => SpecNodeJson {
            kind: SpecNodeKindJson::It,
            title: title.clone(),
            children: None,
            extra: extra_to_json(extra, SPEC_NODE_FIELDS),
        },
    }
}

fn slice_to_json(slice: &Slice) -> SliceJson {
    SliceJson {
        kind: match slice.kind() {
            SliceKind::Command => SliceTypeJson::Command,
            SliceKind::Query => SliceTypeJson::Query,
            SliceKind::Reaction => SliceTypeJson::Reaction,
        },
        name: slice.name().to_owned(),
        gwt: slice
            .gwt()
            .map(|examples| examples.iter().map(example_to_json).collect()),
        rules: slice
            .rules()
            .iter()
            .map(|rule| RuleJson {
                description: rule.description().to_owned(),
                examples: rule.examples().iter().map(example_to_json).collect(),
                extra: extra_to_json(rule.extra(), RULE_FIELDS),
            })
            .collect(),
        extra: extra_to_json(slice.extra(), SLICE_FIELDS),
    }
}

fn example_to_json(example: &Example) -> ExampleJson {
    ExampleJson {
        description: example.description().map(ToOwned::to_owned),
        given: example.given().cloned(),
        when: example.when().cloned(),
        then: example.then().cloned(),
        extra: extra_to_json(example.extra(), EXAMPLE_FIELDS),
    }
}

fn parse_id<T>(field: &'static str, value: String) -> Result<Id<T>, SchemaError> {
    Id::new(value.clone()).map_err(|source| SchemaError::InvalidId {
        field,
        value,
        source,
    })
}

/// Rebuilds a model from its schema document. Inverse of [`to_schema`].
pub fn to_model(document: SchemaDocument) -> Result<FlowModel, SchemaError> {
    let mut narratives = Vec::with_capacity(document.narratives.len());
    for narrative_json in document.narratives {
        narratives.push(narrative_from_json(narrative_json)?);
    }

    let mut model = FlowModel::new(narratives);
    *model.extra_mut() = document.extra;
    Ok(model)
}

fn narrative_from_json(narrative_json: NarrativeJson) -> Result<Narrative, SchemaError> {
    let narrative_id: NarrativeId = parse_id("narratives[].id", narrative_json.id)?;
    let mut narrative = Narrative::new(narrative_id, narrative_json.title);
    *narrative.extra_mut() = narrative_json.extra;

    for experience_json in narrative_json.experiences {
        let experience_id: ExperienceId =
            parse_id("narratives[].experiences[].id", experience_json.id)?;
        let target = match experience_json.target {
            ExperienceTargetJson::Client => ExperienceTarget::Client,
            ExperienceTargetJson::Server => ExperienceTarget::Server,
        };
        let spec_tree = match experience_json.specs {
            SpecsJson::Tree(root) => spec_node_from_json(root)?,
            SpecsJson::Flat(paths) => SpecNode::root(paths.into_iter().map(SpecNode::leaf).collect()),
        };

        let mut experience = Experience::new(experience_id, experience_json.title, target)
            .with_spec_tree(spec_tree);
        *experience.extra_mut() = experience_json.extra;
        narrative.experiences_mut().push(experience);
    }

    for slice_json in narrative_json.slices {
        narrative.slices_mut().push(slice_from_json(slice_json));
    }
    Ok(narrative)
}

fn spec_node_from_json(node_json: SpecNodeJson) -> Result<SpecNode, SchemaError> {
    match node_json.kind {
        SpecNodeKindJson::Describe => {
            let mut children = Vec::new();
            for child in node_json.children.unwrap_or_default() {
                children.push(spec_node_from_json(child)?);
            }
            Ok(SpecNode::Describe {
                title: node_json.title,
                children,
                extra: node_json.extra,
            })
        }
        SpecNodeKindJson::It => {
            if node_json.children.is_some() {
                return Err(SchemaError::LeafWithChildren {
                    title: node_json.title,
                });
            }
            Ok(SpecNode::Leaf {
                title: node_json.title,
                extra: node_json.extra,
            })
        }
    }
}

fn slice_from_json(slice_json: SliceJson) -> Slice {
    let kind = match slice_json.kind {
        SliceTypeJson::Command => SliceKind::Command,
        SliceTypeJson::Query => SliceKind::Query,
        SliceTypeJson::Reaction => SliceKind::Reaction,
    };
    let mut slice = Slice::new(kind, slice_json.name);
    slice.set_gwt(
        slice_json
            .gwt
            .map(|examples| examples.into_iter().map(example_from_json).collect()),
    );
    for rule_json in slice_json.rules {
        let mut rule = Rule::new(rule_json.description);
        rule.examples_mut()
            .extend(rule_json.examples.into_iter().map(example_from_json));
        *rule.extra_mut() = rule_json.extra;
        slice.rules_mut().push(rule);
    }
    *slice.extra_mut() = slice_json.extra;
    slice
}

fn example_from_json(example_json: ExampleJson) -> Example {
    let mut example = Example::new(example_json.description);
    example.set_given(example_json.given);
    example.set_when(example_json.when);
    example.set_then(example_json.then);
    *example.extra_mut() = example_json.extra;
    example
}

/// Parses schema JSON text into a model.
pub fn parse_schema_json(text: &str) -> Result<FlowModel, SchemaError> {
    let document: SchemaDocument =
        serde_json::from_str(text).map_err(|source| SchemaError::Json { source })?;
    to_model(document)
}

/// Pretty-printed schema JSON with a trailing newline. Equal models yield identical text.
pub fn export_schema_json(model: &FlowModel, separator: &str) -> Result<String, SchemaError> {
    let document = to_schema_with_separator(model, separator);
    let mut text =
        serde_json::to_string_pretty(&document).map_err(|source| SchemaError::Json { source })?;
    text.push('\n');
    Ok(text)
}

/// JSON Schema describing [`SchemaDocument`].
pub fn document_json_schema() -> schemars::Schema {
    schemars::schema_for!(SchemaDocument)
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::{export_schema_json, parse_schema_json, to_model, to_schema};
    use crate::model::fixtures::strategies::flow_model;
    use crate::query::DEFAULT_SPEC_SEPARATOR;

    proptest! {
        #[test]
        fn document_round_trip_restores_the_model(model in flow_model()) {
            let restored = to_model(to_schema(&model)).expect("to_model");
            prop_assert_eq!(&restored, &model);
        }

        #[test]
        fn json_round_trip_restores_the_model_and_its_text(model in flow_model()) {
            let text = export_schema_json(&model, DEFAULT_SPEC_SEPARATOR).expect("export");
            let reparsed = parse_schema_json(&text).expect("exported schema parses");
            prop_assert_eq!(&reparsed, &model);

            let again = export_schema_json(&reparsed, DEFAULT_SPEC_SEPARATOR).expect("re-export");
            prop_assert_eq!(&again, &text);
        }
    }
}
