// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The schema document: the JSON form of a flow model consumed by code generators.

mod convert;
pub mod document;

pub use convert::{
    document_json_schema, export_schema_json, parse_schema_json, to_model, to_schema,
    to_schema_with_separator, SchemaError,
};
pub use document::SchemaDocument;
