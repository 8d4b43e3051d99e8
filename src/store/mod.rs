// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flow projects on disk.
//!
//! The store module reads the project config, discovers and compiles flow sources, and writes
//! the schema artifact and rewritten sources atomically.

pub mod project_folder;

pub use project_folder::{
    sort_types_in_file, CompiledProject, ExportReport, ProjectConfig, ProjectFolder,
    SortTypesOutcome, StoreError, WriteDurability, CONFIG_FILENAME, DEFAULT_FLOW_SUFFIX,
    DEFAULT_SCHEMA_PATH,
};
