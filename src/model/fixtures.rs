// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![cfg(test)]

use serde_json::json;

use super::flow::{Experience, ExperienceTarget, FlowModel, Narrative};
use super::ids::{ExperienceId, NarrativeId};
use super::slice::{Example, Rule, Slice, SliceKind};
use super::spec_tree::SpecNode;

fn nid(value: &str) -> NarrativeId {
    NarrativeId::new(value).expect("narrative id")
}

fn eid(value: &str) -> ExperienceId {
    ExperienceId::new(value).expect("experience id")
}

/// One narrative exercising every model feature: both experience targets, nested and untitled
/// spec groups, all three slice kinds, both GWT dialects, and pass-through fields.
pub(crate) fn checkout_model() -> FlowModel {
    let mut narrative = Narrative::new(nid("checkout"), "Checkout");
    narrative
        .extra_mut()
        .insert("owner".to_owned(), json!({ "team": "payments" }));

    let cart = Experience::new(eid("cart-page"), "Cart page", ExperienceTarget::Client)
        .with_spec_tree(SpecNode::root(vec![SpecNode::describe(
            "cart",
            vec![
                SpecNode::leaf("shows items"),
                SpecNode::describe("", vec![SpecNode::leaf("shows total")]),
                SpecNode::describe("empty", vec![SpecNode::leaf("shows hint")]),
            ],
        )]));
    narrative.experiences_mut().push(cart);

    let mut api = Experience::new(eid("orders-api"), "Orders API", ExperienceTarget::Server);
    api.extra_mut().insert("route".to_owned(), json!("/orders"));
    narrative.experiences_mut().push(api);

    let mut place_order = Slice::new(SliceKind::Command, "place order");
    let mut rule = Rule::new("orders need items");
    rule.examples_mut().push(
        Example::new(Some("with items".to_owned()))
            .with_given(json!([{ "eventRef": "ItemAdded", "exampleData": { "sku": "A1" } }]))
            .with_when(json!({ "commandRef": "PlaceOrder", "exampleData": {} }))
            .with_then(json!([{ "eventRef": "OrderPlaced", "exampleData": { "total": 10 } }])),
    );
    place_order.rules_mut().push(rule);
    narrative.slices_mut().push(place_order);

    let mut view_cart = Slice::new(SliceKind::Query, "view cart");
    let mut rule = Rule::new("cart lists added items");
    rule.extra_mut().insert("tags".to_owned(), json!(["smoke"]));
    rule.examples_mut().push(
        Example::new(Some("one item".to_owned()))
            .with_when(json!([{ "eventRef": "ItemAdded", "exampleData": { "sku": "A1" } }]))
            .with_then(json!([{ "stateRef": "Cart", "exampleData": { "items": 1 } }])),
    );
    view_cart.rules_mut().push(rule);
    narrative.slices_mut().push(view_cart);

    let mut notify = Slice::new(SliceKind::Reaction, "notify warehouse");
    notify.push_gwt(
        Example::new(None)
            .with_when(json!([{ "eventRef": "OrderPlaced", "exampleData": {} }]))
            .with_then(json!([{ "commandRef": "ReserveStock", "exampleData": {} }])),
    );
    narrative.slices_mut().push(notify);

    let mut model = FlowModel::new(vec![narrative]);
    model
        .extra_mut()
        .insert("generator".to_owned(), json!({ "name": "flowspec" }));
    model
}

/// A query slice authored in the flat dialect.
pub(crate) fn flat_query_slice() -> Slice {
    let mut slice = Slice::new(SliceKind::Query, "list orders");
    slice.push_gwt(
        Example::new(None)
            .with_given(json!([{ "eventRef": "OrderPlaced", "exampleData": { "id": 1 } }]))
            .with_then(json!([
                { "stateRef": "Orders", "exampleData": { "count": 1 } },
                { "note": "not a state assertion" }
            ])),
    );
    slice
}

/// Proptest generators for arbitrary models.
///
/// Pass-through keys are `x-` prefixed so they never collide with a typed document field.
pub(crate) mod strategies {
    use proptest::prelude::*;
    use serde_json::Value;

    use crate::model::{
        Example, Experience, ExperienceId, ExperienceTarget, Extra, FlowModel, Narrative,
        NarrativeId, Rule, Slice, SliceKind, SpecNode,
    };

    pub(crate) fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(2, 8, 3, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,5}", inner, 0..3)
                    .prop_map(|fields| Value::Object(fields.into_iter().collect())),
            ]
        })
    }

    pub(crate) fn extra() -> impl Strategy<Value = Extra> {
        prop::collection::btree_map("x-[a-z]{1,6}", json_value(), 1..3)
    }

    fn spec_title() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), Just("  ".to_owned()), "[a-z]{1,8}"]
    }

    /// Spec trees mixing titled and blank-titled describes and leaves.
    pub(crate) fn spec_tree() -> impl Strategy<Value = SpecNode> {
        let leaf =
            (spec_title(), extra()).prop_map(|(title, extra)| SpecNode::Leaf { title, extra });
        leaf.prop_recursive(3, 24, 4, |inner| {
            (spec_title(), prop::collection::vec(inner, 0..4), extra()).prop_map(
                |(title, children, extra)| SpecNode::Describe {
                    title,
                    children,
                    extra,
                },
            )
        })
    }

    fn example() -> impl Strategy<Value = Example> {
        (
            prop::option::of("[a-z ]{0,10}"),
            prop::option::of(json_value()),
            prop::option::of(json_value()),
            prop::option::of(json_value()),
            extra(),
        )
            .prop_map(|(description, given, when, then, extra)| {
                let mut example = Example::new(description);
                example.set_given(given);
                example.set_when(when);
                example.set_then(then);
                *example.extra_mut() = extra;
                example
            })
    }

    fn rule() -> impl Strategy<Value = Rule> {
        (
            "[a-z ]{1,12}",
            prop::collection::vec(example(), 0..3),
            extra(),
        )
            .prop_map(|(description, examples, extra)| {
                let mut rule = Rule::new(description);
                *rule.examples_mut() = examples;
                *rule.extra_mut() = extra;
                rule
            })
    }

    fn slice() -> impl Strategy<Value = Slice> {
        let kind = prop_oneof![
            Just(SliceKind::Command),
            Just(SliceKind::Query),
            Just(SliceKind::Reaction),
        ];
        (
            kind,
            "[a-z ]{1,10}",
            prop::option::of(prop::collection::vec(example(), 0..3)),
            prop::collection::vec(rule(), 0..3),
            extra(),
        )
            .prop_map(|(kind, name, gwt, rules, extra)| {
                let mut slice = Slice::new(kind, name);
                slice.set_gwt(gwt);
                *slice.rules_mut() = rules;
                *slice.extra_mut() = extra;
                slice
            })
    }

    fn experience() -> impl Strategy<Value = Experience> {
        (
            "[a-z][a-z0-9-]{0,8}",
            "[A-Za-z ]{0,10}",
            any::<bool>(),
            prop::collection::vec(spec_tree(), 0..4),
            extra(),
            extra(),
        )
            .prop_map(|(id, title, client, children, root_extra, extra)| {
                let target = if client {
                    ExperienceTarget::Client
                } else {
                    ExperienceTarget::Server
                };
                let root = SpecNode::Describe {
                    title: String::new(),
                    children,
                    extra: root_extra,
                };
                let id = ExperienceId::new(id).expect("generated experience id");
                let mut experience = Experience::new(id, title, target).with_spec_tree(root);
                *experience.extra_mut() = extra;
                experience
            })
    }

    fn narrative() -> impl Strategy<Value = Narrative> {
        (
            "[a-z][a-z0-9-]{0,8}",
            "[A-Za-z ]{0,10}",
            prop::collection::vec(experience(), 0..3),
            prop::collection::vec(slice(), 0..3),
            extra(),
        )
            .prop_map(|(id, title, experiences, slices, extra)| {
                let id = NarrativeId::new(id).expect("generated narrative id");
                let mut narrative = Narrative::new(id, title);
                *narrative.experiences_mut() = experiences;
                *narrative.slices_mut() = slices;
                *narrative.extra_mut() = extra;
                narrative
            })
    }

    /// Models with pass-through fields on every node.
    pub(crate) fn flow_model() -> impl Strategy<Value = FlowModel> {
        (prop::collection::vec(narrative(), 0..3), extra()).prop_map(|(narratives, extra)| {
            let mut model = FlowModel::new(narratives);
            *model.extra_mut() = extra;
            model
        })
    }
}
