// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical in-memory flow model.
//!
//! A model owns narratives; narratives own experiences (each with a `describe`/`it` tree) and
//! slices (each with rule/example specifications). There are no back-references and nothing is
//! shared between trees.

use std::collections::BTreeMap;

pub(crate) mod fixtures;
pub mod flow;
pub mod ids;
pub mod slice;
pub mod spec_tree;
pub mod token;

pub use flow::{Experience, ExperienceTarget, FlowModel, Narrative, ParseExperienceTargetError};
pub use ids::{ExperienceId, Id, IdError, NarrativeId};
pub use slice::{Example, ParseSliceKindError, Rule, Slice, SliceKind};
pub use spec_tree::SpecNode;
pub use token::{generate_token, validate_token_prefix, TokenError, TOKEN_LEN};

/// Fields a node carried in its schema document that the compiler does not interpret.
///
/// They ride along unchanged so consumers depending on them are not broken by a round-trip.
pub type Extra = BTreeMap<String, serde_json::Value>;
