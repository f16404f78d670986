//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a policy
//! file without resolving any image.
//!
//! ## Functionality
//!
//! - **Decoding**: the file must exist, be non-empty and hold only objects of
//!   the selected kind.
//! - **Reference syntax**: every source and mirror must parse as an image
//!   reference.
//! - **Source policy consistency**: rules for the same source must agree on
//!   `mirrorSourcePolicy`.
//! - **Warnings**: rules without mirrors are reported; `--strict` turns
//!   warnings into failures.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{anyhow, Result};
use clap::Args;

use imagemirror::error::Result as LibResult;
use imagemirror::output::{OutputConfig, Status};
use imagemirror::policy::{rules_from_documents, MirrorRule, MirrorSourcePolicy, PolicyKind};
use imagemirror::reader::{FilePolicyReader, PolicyReader};

use super::PolicyFileArgs;

/// Validate an ImageContentSourcePolicy or ImageDigestMirrorSet file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub policy: PolicyFileArgs,

    /// Use strict validation (fail on warnings).
    #[arg(long)]
    pub strict: bool,
}

struct Summary {
    objects: usize,
    rules: Vec<MirrorRule>,
}

fn load(kind: PolicyKind, path: &std::path::Path) -> LibResult<Summary> {
    let reader = FilePolicyReader;
    match kind {
        PolicyKind::Icsp => {
            let documents = reader.read_icsps(path)?;
            Ok(Summary {
                objects: documents.len(),
                rules: rules_from_documents(&documents)?,
            })
        }
        PolicyKind::Idms => {
            let documents = reader.read_idms(path)?;
            Ok(Summary {
                objects: documents.len(),
                rules: rules_from_documents(&documents)?,
            })
        }
    }
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let (kind, path) = args.policy.selected()?;
    println!(
        "{}",
        out.line(
            Status::Info,
            format!("Validating {} file: {}", kind.kind_name(), path.display())
        )
    );

    let summary = match load(kind, path) {
        Ok(summary) => summary,
        Err(e) => {
            println!("{}", out.line(Status::Error, e.to_string()));
            return Err(anyhow!("Policy validation failed: {}", e));
        }
    };

    let mirror_count: usize = summary.rules.iter().map(|r| r.mirrors.len()).sum();
    let never_contact = summary
        .rules
        .iter()
        .filter(|r| r.source_policy == MirrorSourcePolicy::NeverContactSource)
        .count();

    println!("   Objects: {}", summary.objects);
    println!("   Rules: {}", summary.rules.len());
    println!("   Mirrors: {}", mirror_count);
    if kind == PolicyKind::Idms {
        println!("   Sources never contacted: {}", never_contact);
    }

    let mut has_warnings = false;
    if summary.rules.is_empty() {
        println!("{}", out.line(Status::Warn, "File defines no mirror rules"));
        has_warnings = true;
    }
    for (idx, rule) in summary.rules.iter().enumerate() {
        if rule.mirrors.is_empty() {
            println!(
                "{}",
                out.line(
                    Status::Warn,
                    format!("Rule {} for source {} lists no mirrors", idx, rule.source)
                )
            );
            has_warnings = true;
        }
    }

    if has_warnings && args.strict {
        println!(
            "{}",
            out.line(Status::Error, "Policy file has warnings (strict mode enabled)")
        );
        return Err(anyhow!("Policy validation failed in strict mode"));
    }

    if has_warnings {
        println!("{}", out.line(Status::Warn, "Policy file is valid but has warnings"));
    } else {
        println!("{}", out.line(Status::Ok, "Policy file is valid"));
    }
    Ok(())
}
