// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Project folder helpers:
/// config json conversion, flow file discovery, and safe filesystem writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectConfigJson {
    #[serde(default)]
    flows: Vec<PathBuf>,
    #[serde(default = "default_flow_suffix")]
    flow_suffix: String,
    #[serde(default = "default_schema_path")]
    schema_path: PathBuf,
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_flow_suffix() -> String {
    DEFAULT_FLOW_SUFFIX.to_owned()
}

fn default_schema_path() -> PathBuf {
    PathBuf::from(DEFAULT_SCHEMA_PATH)
}

fn default_separator() -> String {
    DEFAULT_SPEC_SEPARATOR.to_owned()
}

fn project_config_to_json(config: &ProjectConfig) -> ProjectConfigJson {
    ProjectConfigJson {
        flows: config.flows.clone(),
        flow_suffix: config.flow_suffix.clone(),
        schema_path: config.schema_path.clone(),
        separator: config.separator.clone(),
    }
}

fn project_config_from_json(config_json: ProjectConfigJson) -> Result<ProjectConfig, StoreError> {
    for flow in &config_json.flows {
        validate_relative_path("flows[]", flow)?;
    }
    validate_relative_path("schema_path", &config_json.schema_path)?;
    if config_json.flow_suffix.is_empty() {
        return Err(StoreError::InvalidConfig {
            field: "flow_suffix",
            reason: "must not be empty",
        });
    }

    Ok(ProjectConfig {
        flows: config_json.flows,
        flow_suffix: config_json.flow_suffix,
        schema_path: config_json.schema_path,
        separator: config_json.separator,
    })
}

fn discover_flow_files(flow_dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, StoreError> {
    let mut found = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative_dir) = pending.pop() {
        let dir = flow_dir.join(&relative_dir);
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with('.') || name == "node_modules" {
                continue;
            }

            let file_type = entry.file_type().map_err(|source| StoreError::Io {
                path: entry.path(),
                source,
            })?;
            let relative = relative_dir.join(name);
            if file_type.is_dir() {
                pending.push(relative);
            } else if file_type.is_file() && name.ends_with(suffix) {
                found.push(relative);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn validate_relative_path(field: &'static str, path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidRelativePath {
            field,
            value: path.to_path_buf(),
        });
    }

    if path.is_absolute() {
        return Err(StoreError::InvalidRelativePath {
            field,
            value: path.to_path_buf(),
        });
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(StoreError::InvalidRelativePath {
                    field,
                    value: path.to_path_buf(),
                });
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

fn to_relative_path(root: &Path, path: &Path, field: &'static str) -> Result<PathBuf, StoreError> {
    let relative = match path.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) if path.is_absolute() => {
            return Err(StoreError::PathOutsideRoot {
                root: root.to_path_buf(),
                path: path.to_path_buf(),
            })
        }
        Err(_) => path.to_path_buf(),
    };

    validate_relative_path(field, &relative)?;
    Ok(relative)
}

fn create_dir_all_safe(root: &Path, relative: &Path) -> Result<(), StoreError> {
    if relative.as_os_str().is_empty() {
        return Ok(());
    }

    validate_relative_path("dir", relative)?;

    let mut current = root.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };

        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) => {
                if md.file_type().is_symlink() {
                    return Err(StoreError::SymlinkRefused { path: current });
                }
                if !md.is_dir() {
                    return Err(StoreError::Io {
                        path: current,
                        source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                    });
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| StoreError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: current,
                    source,
                })
            }
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Atomically replaces `path` (which must lie under `root`) with `contents`.
///
/// Missing parent directories below `root` are created; symlinks on the way are refused.
fn write_atomic_under(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(|source| StoreError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let relative = to_relative_path(root, path, "path")?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(root, parent_rel)?;

    let target = root.join(&relative);
    match fs::symlink_metadata(&target) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: target });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::Io { path: target, source }),
    }

    let Some(parent) = target.parent() else {
        return Err(StoreError::Io {
            path: target.clone(),
            source: io::Error::other("path has no parent"),
        });
    };

    let Some(file_name) = target.file_name() else {
        return Err(StoreError::Io {
            path: target.clone(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".flowspec.tmp.{}.{}.{}",
        file_name.to_string_lossy(),
        std::process::id(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, &target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: target.clone(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
