// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::format::flow::{parse_flow_source, sort_type_declarations, FlowParseError, SourceParseError};
use crate::model::FlowModel;
use crate::query::DEFAULT_SPEC_SEPARATOR;
use crate::schema::{export_schema_json, SchemaError};

pub const CONFIG_FILENAME: &str = "flowspec.json";
pub const DEFAULT_FLOW_SUFFIX: &str = ".flow.ts";
pub const DEFAULT_SCHEMA_PATH: &str = "schema.json";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    FlowParse {
        path: PathBuf,
        source: Box<FlowParseError>,
    },
    SourceParse {
        path: PathBuf,
        source: Box<SourceParseError>,
    },
    Schema {
        path: PathBuf,
        source: Box<SchemaError>,
    },
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    InvalidRelativePath {
        field: &'static str,
        value: PathBuf,
    },
    PathOutsideRoot {
        root: PathBuf,
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::FlowParse { path, source } => {
                write!(f, "cannot compile flow source {path:?}: {source}")
            }
            Self::SourceParse { path, source } => {
                write!(f, "cannot sort type declarations in {path:?}: {source}")
            }
            Self::Schema { path, source } => {
                write!(f, "cannot export schema to {path:?}: {source}")
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid {CONFIG_FILENAME} field {field}: {reason}")
            }
            Self::InvalidRelativePath { field, value } => {
                write!(f, "invalid relative path for {field}: {value:?}")
            }
            Self::PathOutsideRoot { root, path } => {
                write!(f, "path is outside root dir: root={root:?} path={path:?}")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::FlowParse { source, .. } => Some(source),
            Self::SourceParse { source, .. } => Some(source),
            Self::Schema { source, .. } => Some(source),
            Self::InvalidConfig { .. } => None,
            Self::InvalidRelativePath { .. } => None,
            Self::PathOutsideRoot { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Project settings read from `flowspec.json` in the context directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Explicit flow file registry, relative to the flow directory. Empty means discovery.
    pub flows: Vec<PathBuf>,
    pub flow_suffix: String,
    /// Schema artifact path, relative to the context directory.
    pub schema_path: PathBuf,
    pub separator: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            flows: Vec::new(),
            flow_suffix: DEFAULT_FLOW_SUFFIX.to_owned(),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            separator: DEFAULT_SPEC_SEPARATOR.to_owned(),
        }
    }
}

/// The merged model of every registered flow file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProject {
    pub model: FlowModel,
    /// Registered files, relative to the flow directory, in merge order.
    pub files: Vec<PathBuf>,
    /// Registered files that define no narrative.
    pub empty_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub schema_path: PathBuf,
    pub compiled: CompiledProject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTypesOutcome {
    Unchanged,
    Rewritten,
    /// Check mode: the file is not in canonical order and was left as is.
    WouldRewrite,
}

/// A flow project on disk: a context directory (config and schema artifact) and a flow
/// directory (the sources).
#[derive(Debug, Clone)]
pub struct ProjectFolder {
    context_dir: PathBuf,
    flow_dir: PathBuf,
    durability: WriteDurability,
}

impl ProjectFolder {
    pub fn new(context_dir: impl Into<PathBuf>, flow_dir: impl Into<PathBuf>) -> Self {
        Self {
            context_dir: context_dir.into(),
            flow_dir: flow_dir.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    pub fn flow_dir(&self) -> &Path {
        &self.flow_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.context_dir.join(CONFIG_FILENAME)
    }

    pub fn schema_path(&self, config: &ProjectConfig) -> PathBuf {
        self.context_dir.join(&config.schema_path)
    }

    /// Loads `flowspec.json`; a missing file yields the defaults.
    pub fn load_config(&self) -> Result<ProjectConfig, StoreError> {
        let path = self.config_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(ProjectConfig::default())
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let config_json: ProjectConfigJson =
            serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
        project_config_from_json(config_json)
    }

    /// Writes `config` to `flowspec.json` (pretty JSON, trailing newline).
    pub fn save_config(&self, config: &ProjectConfig) -> Result<(), StoreError> {
        let path = self.config_path();
        let mut text = serde_json::to_string_pretty(&project_config_to_json(config)).map_err(
            |source| StoreError::Json {
                path: path.clone(),
                source,
            },
        )?;
        text.push('\n');
        write_atomic_under(&self.context_dir, &path, text.as_bytes(), self.durability)
    }

    /// The flow files to compile, relative to the flow directory.
    ///
    /// An explicit `flows` list is used as given. Otherwise the flow directory is walked for
    /// files ending in `flow_suffix` (hidden entries, `node_modules` and symlinks are skipped)
    /// and the result is sorted by path.
    pub fn registry(&self, config: &ProjectConfig) -> Result<Vec<PathBuf>, StoreError> {
        if !config.flows.is_empty() {
            return Ok(config.flows.clone());
        }
        discover_flow_files(&self.flow_dir, &config.flow_suffix)
    }

    fn compile_file(&self, relative: &Path) -> Result<FlowModel, StoreError> {
        let path = self.flow_dir.join(relative);
        let source = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        parse_flow_source(&source).map_err(|source| StoreError::FlowParse {
            path,
            source: Box::new(source),
        })
    }

    /// Compiles every registered file in parallel and merges the fragments in registry order.
    ///
    /// The first failing file (in registry order) aborts the compile.
    pub fn compile(&self, config: &ProjectConfig) -> Result<CompiledProject, StoreError> {
        let files = self.registry(config)?;
        let fragments: Vec<Result<FlowModel, StoreError>> = files
            .par_iter()
            .map(|relative| self.compile_file(relative))
            .collect();

        let mut model = FlowModel::default();
        let mut empty_files = Vec::new();
        for (relative, fragment) in files.iter().zip(fragments) {
            let fragment = fragment?;
            if fragment.narratives().is_empty() {
                empty_files.push(relative.clone());
            }
            model.merge(fragment);
        }

        Ok(CompiledProject {
            model,
            files,
            empty_files,
        })
    }

    /// Compiles the project and writes its schema document. Nothing is written on failure.
    pub fn export_schema(&self) -> Result<ExportReport, StoreError> {
        let config = self.load_config()?;
        let compiled = self.compile(&config)?;
        let schema_path = self.schema_path(&config);

        let text = export_schema_json(&compiled.model, &config.separator).map_err(|source| {
            StoreError::Schema {
                path: schema_path.clone(),
                source: Box::new(source),
            }
        })?;
        write_atomic_under(
            &self.context_dir,
            &schema_path,
            text.as_bytes(),
            self.durability,
        )?;

        Ok(ExportReport {
            schema_path,
            compiled,
        })
    }
}

/// Rewrites `path` with its type declarations in canonical order.
///
/// With `check_only`, nothing is written and [`SortTypesOutcome::WouldRewrite`] reports a file
/// that is not canonical.
pub fn sort_types_in_file(
    path: &Path,
    check_only: bool,
    durability: WriteDurability,
) -> Result<SortTypesOutcome, StoreError> {
    let source = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sorted = sort_type_declarations(&source).map_err(|source| StoreError::SourceParse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    if sorted == source {
        return Ok(SortTypesOutcome::Unchanged);
    }
    if check_only {
        return Ok(SortTypesOutcome::WouldRewrite);
    }

    let root = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    write_atomic_under(root, path, sorted.as_bytes(), durability)?;
    Ok(SortTypesOutcome::Rewritten)
}

include!("project_folder/helpers.rs");
