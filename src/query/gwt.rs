// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Given/When/Then extraction for slices.
//!
//! Extraction is permissive: entries with an unexpected shape are skipped and the rest of the
//! slice is still read.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{Example, Slice, SliceKind};

/// A query example: the events that happened, and the read-model state expected afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryGwt {
    pub given: Vec<Value>,
    pub then: Vec<StateAssertion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAssertion {
    pub state_ref: String,
    pub example_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandGwt {
    pub given: Vec<Value>,
    pub when: Option<Value>,
    pub then: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionGwt {
    pub when: Vec<Value>,
    pub then: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Flat,
    RuleExample,
}

/// The slice's examples in authoring order, with the dialect they were written in.
///
/// A slice carrying a flat `gwt` list is read in that dialect; otherwise every rule's examples
/// are concatenated, rule order first, then example order within the rule.
fn examples_in_order(slice: &Slice) -> (Dialect, Vec<&Example>) {
    match slice.gwt() {
        Some(gwt) => (Dialect::Flat, gwt.iter().collect()),
        None => (
            Dialect::RuleExample,
            slice.rules().iter().flat_map(|rule| rule.examples()).collect(),
        ),
    }
}

fn as_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

fn state_assertion(entry: &Value) -> Option<StateAssertion> {
    let object = entry.as_object()?;
    let state_ref = object.get("stateRef")?.as_str()?;
    let example_data = object
        .get("exampleData")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    Some(StateAssertion {
        state_ref: state_ref.to_owned(),
        example_data,
    })
}

/// Builds the `{given, then}` pairs a query slice is tested against.
///
/// Returns an empty list for command and reaction slices. In the rule/example dialect the
/// example's `when` carries the given events (a query has no behavioral trigger distinct from
/// its preconditions); `given` is read only when `when` is absent. `then` entries without a
/// string `stateRef` are not state assertions and are dropped.
pub fn build_query_gwt_mapping(slice: &Slice) -> Vec<QueryGwt> {
    if slice.kind() != SliceKind::Query {
        return Vec::new();
    }

    let (dialect, examples) = examples_in_order(slice);
    examples
        .into_iter()
        .map(|example| {
            let given = match dialect {
                Dialect::Flat => example.given(),
                Dialect::RuleExample => example.when().or(example.given()),
            };
            QueryGwt {
                given: as_list(given),
                then: as_list(example.then())
                    .iter()
                    .filter_map(state_assertion)
                    .collect(),
            }
        })
        .collect()
}

/// Builds `{given, when, then}` triples for a command slice; empty for other slice types.
pub fn build_command_gwt_mapping(slice: &Slice) -> Vec<CommandGwt> {
    if slice.kind() != SliceKind::Command {
        return Vec::new();
    }

    let (_, examples) = examples_in_order(slice);
    examples
        .into_iter()
        .map(|example| CommandGwt {
            given: as_list(example.given()),
            when: example.when().filter(|when| !when.is_null()).cloned(),
            then: as_list(example.then()),
        })
        .collect()
}

/// Builds `{when, then}` pairs for a reaction slice: triggering events to issued commands.
pub fn build_reaction_gwt_mapping(slice: &Slice) -> Vec<ReactionGwt> {
    if slice.kind() != SliceKind::Reaction {
        return Vec::new();
    }

    let (_, examples) = examples_in_order(slice);
    examples
        .into_iter()
        .map(|example| ReactionGwt {
            when: as_list(example.when()),
            then: as_list(example.then()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{
        build_command_gwt_mapping, build_query_gwt_mapping, build_reaction_gwt_mapping,
        QueryGwt, StateAssertion,
    };
    use crate::model::fixtures::{checkout_model, flat_query_slice};
    use crate::model::{Example, Rule, Slice, SliceKind};

    fn slice_named(name: &str) -> Slice {
        checkout_model().narratives()[0]
            .slices()
            .iter()
            .find(|slice| slice.name() == name)
            .cloned()
            .expect("slice")
    }

    #[test]
    fn non_query_slices_yield_nothing() {
        assert!(build_query_gwt_mapping(&slice_named("place order")).is_empty());
        assert!(build_query_gwt_mapping(&slice_named("notify warehouse")).is_empty());
    }

    #[test]
    fn rule_dialect_reads_given_events_from_when() {
        let mut slice = Slice::new(SliceKind::Query, "view");
        let mut rule = Rule::new("r");
        rule.examples_mut().push(
            Example::new(None)
                .with_when(json!([{ "eventRef": "E1", "exampleData": { "x": true } }]))
                .with_then(json!([{ "stateRef": "S1", "exampleData": { "a": 1 } }])),
        );
        slice.rules_mut().push(rule);

        assert_eq!(
            build_query_gwt_mapping(&slice),
            vec![QueryGwt {
                given: vec![json!({ "eventRef": "E1", "exampleData": { "x": true } })],
                then: vec![StateAssertion {
                    state_ref: "S1".to_owned(),
                    example_data: json!({ "a": 1 }),
                }],
            }]
        );
    }

    #[test]
    fn rule_dialect_flattens_rules_then_examples_in_order() {
        let mut slice = Slice::new(SliceKind::Query, "view");
        for (rule_name, refs) in [("first", ["A", "B"]), ("second", ["C", "D"])] {
            let mut rule = Rule::new(rule_name);
            for event_ref in refs {
                rule.examples_mut().push(
                    Example::new(None).with_when(json!({ "eventRef": event_ref })),
                );
            }
            slice.rules_mut().push(rule);
        }

        let order: Vec<Value> = build_query_gwt_mapping(&slice)
            .into_iter()
            .map(|gwt| gwt.given[0]["eventRef"].clone())
            .collect();
        assert_eq!(order, [json!("A"), json!("B"), json!("C"), json!("D")]);
    }

    #[test]
    fn rule_dialect_falls_back_to_given_without_when() {
        let mut slice = Slice::new(SliceKind::Query, "view");
        let mut rule = Rule::new("r");
        rule.examples_mut()
            .push(Example::new(None).with_given(json!([{ "eventRef": "E9" }])));
        slice.rules_mut().push(rule);

        let mapping = build_query_gwt_mapping(&slice);
        assert_eq!(mapping[0].given, vec![json!({ "eventRef": "E9" })]);
        assert!(mapping[0].then.is_empty());
    }

    #[test]
    fn flat_dialect_passes_entries_through_and_drops_non_state_then() {
        let mapping = build_query_gwt_mapping(&flat_query_slice());
        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping[0].given,
            vec![json!({ "eventRef": "OrderPlaced", "exampleData": { "id": 1 } })]
        );
        assert_eq!(
            mapping[0].then,
            vec![StateAssertion {
                state_ref: "Orders".to_owned(),
                example_data: json!({ "count": 1 }),
            }]
        );
    }

    #[test]
    fn missing_example_data_defaults_to_empty_object() {
        let mut slice = Slice::new(SliceKind::Query, "view");
        slice.push_gwt(Example::new(None).with_then(json!({ "stateRef": "S" })));

        let mapping = build_query_gwt_mapping(&slice);
        assert_eq!(mapping[0].then[0].example_data, json!({}));
        assert!(mapping[0].given.is_empty());
    }

    #[test]
    fn non_string_state_ref_is_not_a_state_assertion() {
        let mut slice = Slice::new(SliceKind::Query, "view");
        slice.push_gwt(Example::new(None).with_then(json!([{ "stateRef": 7 }, "loose text"])));
        assert!(build_query_gwt_mapping(&slice)[0].then.is_empty());
    }

    #[test]
    fn command_mapping_keeps_when_payload() {
        let mapping = build_command_gwt_mapping(&slice_named("place order"));
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0].given.len(), 1);
        assert_eq!(mapping[0].when.as_ref().expect("when")["commandRef"], json!("PlaceOrder"));
        assert_eq!(mapping[0].then[0]["eventRef"], json!("OrderPlaced"));

        assert!(build_command_gwt_mapping(&slice_named("view cart")).is_empty());
    }

    #[test]
    fn reaction_mapping_reads_flat_dialect() {
        let mapping = build_reaction_gwt_mapping(&slice_named("notify warehouse"));
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0].when[0]["eventRef"], json!("OrderPlaced"));
        assert_eq!(mapping[0].then[0]["commandRef"], json!("ReserveStock"));

        assert!(build_reaction_gwt_mapping(&slice_named("place order")).is_empty());
    }
}
