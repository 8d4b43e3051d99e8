// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::Extra;

/// A single behavior unit with example-based specifications.
///
/// Examples arrive in one of two authoring dialects: a flat `gwt` list carried by the slice
/// itself, or `rules[].examples[]`. Both are kept as authored; `crate::query::gwt` reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    kind: SliceKind,
    name: String,
    gwt: Option<Vec<Example>>,
    rules: Vec<Rule>,
    extra: Extra,
}

impl Slice {
    pub fn new(kind: SliceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            gwt: None,
            rules: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gwt(&self) -> Option<&[Example]> {
        self.gwt.as_deref()
    }

    pub fn set_gwt(&mut self, gwt: Option<Vec<Example>>) {
        self.gwt = gwt;
    }

    /// Appends to the flat list, creating it on first use.
    pub fn push_gwt(&mut self, example: Example) {
        self.gwt.get_or_insert_with(Vec::new).push(example);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Vec<Rule> {
        &mut self.rules
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        &mut self.extra
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceKind {
    Command,
    Query,
    Reaction,
}

impl SliceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Query => "query",
            Self::Reaction => "reaction",
        }
    }
}

impl fmt::Display for SliceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSliceKindError;

impl fmt::Display for ParseSliceKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid slice type (expected command/query/reaction)")
    }
}

impl std::error::Error for ParseSliceKindError {}

impl FromStr for SliceKind {
    type Err = ParseSliceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "command" => Ok(Self::Command),
            "query" => Ok(Self::Query),
            "reaction" => Ok(Self::Reaction),
            _ => Err(ParseSliceKindError),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    description: String,
    examples: Vec<Example>,
    extra: Extra,
}

impl Rule {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            examples: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn examples_mut(&mut self) -> &mut Vec<Example> {
        &mut self.examples
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        &mut self.extra
    }
}

/// One Given/When/Then example. Payload shapes depend on slice type and dialect, so they stay
/// untyped JSON here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Example {
    description: Option<String>,
    given: Option<Value>,
    when: Option<Value>,
    then: Option<Value>,
    extra: Extra,
}

impl Example {
    pub fn new(description: Option<String>) -> Self {
        Self {
            description,
            ..Self::default()
        }
    }

    pub fn with_given(mut self, given: Value) -> Self {
        self.given = Some(given);
        self
    }

    pub fn with_when(mut self, when: Value) -> Self {
        self.when = Some(when);
        self
    }

    pub fn with_then(mut self, then: Value) -> Self {
        self.then = Some(then);
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn given(&self) -> Option<&Value> {
        self.given.as_ref()
    }

    pub fn when(&self) -> Option<&Value> {
        self.when.as_ref()
    }

    pub fn then(&self) -> Option<&Value> {
        self.then.as_ref()
    }

    pub fn set_given(&mut self, given: Option<Value>) {
        self.given = given;
    }

    pub fn set_when(&mut self, when: Option<Value>) {
        self.when = when;
    }

    pub fn set_then(&mut self, then: Option<Value>) {
        self.then = then;
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Extra {
        &mut self.extra
    }
}

#[cfg(test)]
mod tests {
    use super::{Example, Slice, SliceKind};

    #[test]
    fn slice_kind_roundtrips_via_str() {
        for kind in [SliceKind::Command, SliceKind::Query, SliceKind::Reaction] {
            let parsed: SliceKind = kind.as_str().parse().expect("parse");
            assert_eq!(parsed, kind);
        }
        assert!("event".parse::<SliceKind>().is_err());
    }

    #[test]
    fn push_gwt_switches_slice_to_flat_dialect() {
        let mut slice = Slice::new(SliceKind::Query, "view cart");
        assert!(slice.gwt().is_none());

        slice.push_gwt(Example::new(None));
        slice.push_gwt(Example::new(Some("second".to_owned())));

        let gwt = slice.gwt().expect("flat list");
        assert_eq!(gwt.len(), 2);
        assert_eq!(gwt[1].description(), Some("second"));
    }
}
