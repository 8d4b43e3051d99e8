// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowspec CLI entrypoint.
//!
//! `export-schema` compiles a project's flow sources and writes the schema artifact.
//! `sort-types` rewrites flow sources with their type declarations in canonical order.

use std::error::Error;
use std::path::PathBuf;

use flowspec::store::{sort_types_in_file, ProjectFolder, SortTypesOutcome, WriteDurability};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} export-schema <context-dir> <flow-dir> [--durable-writes]\n  {program} sort-types <file>... [--check] [--durable-writes]\n  {program} json-schema\n  {program} token [--prefix <prefix>]\n\nexport-schema reads flowspec.json from the context dir, compiles the flow dir, and writes the schema artifact.\nsort-types --check leaves files untouched and exits with 1 if any file is not in canonical order.\njson-schema prints the JSON Schema of the schema document.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliCommand {
    ExportSchema {
        context_dir: PathBuf,
        flow_dir: PathBuf,
    },
    SortTypes {
        files: Vec<PathBuf>,
        check: bool,
    },
    JsonSchema,
    Token {
        prefix: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    command: CliCommand,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let command_name = args.next().ok_or(())?;

    let mut positional = Vec::new();
    let mut check = false;
    let mut prefix = None;
    let mut durable_writes = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--check" => {
                if check {
                    return Err(());
                }
                check = true;
            }
            "--prefix" => {
                if prefix.is_some() {
                    return Err(());
                }
                prefix = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if durable_writes {
                    return Err(());
                }
                durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => positional.push(arg),
        }
    }

    let command = match command_name.as_str() {
        "export-schema" => {
            if check || prefix.is_some() || positional.len() != 2 {
                return Err(());
            }
            let flow_dir = PathBuf::from(positional.pop().ok_or(())?);
            let context_dir = PathBuf::from(positional.pop().ok_or(())?);
            CliCommand::ExportSchema {
                context_dir,
                flow_dir,
            }
        }
        "sort-types" => {
            if prefix.is_some() || positional.is_empty() {
                return Err(());
            }
            CliCommand::SortTypes {
                files: positional.into_iter().map(PathBuf::from).collect(),
                check,
            }
        }
        "json-schema" => {
            if check || prefix.is_some() || durable_writes || !positional.is_empty() {
                return Err(());
            }
            CliCommand::JsonSchema
        }
        "token" => {
            if check || durable_writes || !positional.is_empty() {
                return Err(());
            }
            CliCommand::Token { prefix }
        }
        _ => return Err(()),
    };

    Ok(CliOptions {
        command,
        durable_writes,
    })
}

fn run(options: CliOptions) -> Result<i32, Box<dyn Error>> {
    let durability = if options.durable_writes {
        WriteDurability::Durable
    } else {
        WriteDurability::BestEffort
    };

    match options.command {
        CliCommand::ExportSchema {
            context_dir,
            flow_dir,
        } => {
            let folder = ProjectFolder::new(context_dir, flow_dir).with_durability(durability);
            let report = folder.export_schema()?;
            for file in &report.compiled.empty_files {
                eprintln!(
                    "flowspec: warning: {} defines no narratives",
                    folder.flow_dir().join(file).display()
                );
            }
            println!("{}", report.schema_path.display());
            Ok(0)
        }
        CliCommand::SortTypes { files, check } => {
            let mut unsorted = 0usize;
            for file in &files {
                match sort_types_in_file(file, check, durability)? {
                    SortTypesOutcome::Unchanged => {}
                    SortTypesOutcome::Rewritten => println!("sorted {}", file.display()),
                    SortTypesOutcome::WouldRewrite => {
                        unsorted += 1;
                        println!("would sort {}", file.display());
                    }
                }
            }
            Ok(if unsorted > 0 { 1 } else { 0 })
        }
        CliCommand::JsonSchema => {
            let schema = flowspec::schema::document_json_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(0)
        }
        CliCommand::Token { prefix } => {
            println!("{}", flowspec::model::generate_token(prefix.as_deref())?);
            Ok(0)
        }
    }
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "flowspec".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    match run(options) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("flowspec: {err}");
            std::process::exit(1);
        }
    }
}
