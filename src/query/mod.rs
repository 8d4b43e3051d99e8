// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over the flow model.
//!
//! Queries provide derived views (flattened spec paths, Given/When/Then mappings) that code
//! generators consume.

pub mod gwt;
pub mod specs;

pub use gwt::{
    build_command_gwt_mapping, build_query_gwt_mapping, build_reaction_gwt_mapping, CommandGwt,
    QueryGwt, ReactionGwt, StateAssertion,
};
pub use specs::{client_spec_paths, flatten_client_specs, DEFAULT_SPEC_SEPARATOR};
