// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flow sources: the host-language files in which narratives, experiences, and slices are
//! authored next to the type declarations they use.

mod builder;
mod declarations;
mod lexer;
mod literal;
mod reorder;
mod separate;

pub use builder::{parse_flow_source, FlowParseError, Scope, GENERATED_ID_PREFIX};
pub use declarations::{
    collect_type_declarations, try_collect_type_declarations, SourceParseError, TypeDeclaration,
    TypeDeclarationKind,
};
pub use reorder::sort_type_declarations;
pub use separate::{excluded_lines, extract_flow_code, split_source, SourceSplit};
