// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowspec: compiler for narrative flow specifications.
//!
//! Flow sources declare narratives with `narrative`/`experience`/`describe`/`it` and slice calls
//! (`command`/`query`/`reaction` with `rule`/`example`). The crate separates type declarations
//! from flow code, builds a [`model::FlowModel`], answers queries over it, and exports it as a
//! JSON schema document.

pub mod format;
pub mod model;
pub mod query;
pub mod schema;
pub mod store;
