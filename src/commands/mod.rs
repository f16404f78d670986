//! # CLI Command Implementations
//!
//! Each subcommand of `imagemirror` lives in its own file with an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `imagemirror` library.
//!
//! Arguments shared between commands, such as the policy file selection, are
//! defined here.

pub mod completions;
pub mod resolve;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;

use imagemirror::policy::PolicyKind;

/// Selects the policy file and its kind.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PolicyFileArgs {
    /// Path to an ImageContentSourcePolicy file (YAML or JSON).
    #[arg(long, value_name = "FILE", env = "IMAGEMIRROR_ICSP_FILE")]
    pub icsp_file: Option<PathBuf>,

    /// Path to an ImageDigestMirrorSet file (YAML or JSON).
    #[arg(long, value_name = "FILE", env = "IMAGEMIRROR_IDMS_FILE")]
    pub idms_file: Option<PathBuf>,
}

impl PolicyFileArgs {
    /// The kind of policy file selected and its path.
    pub fn selected(&self) -> Result<(PolicyKind, &Path)> {
        match (&self.icsp_file, &self.idms_file) {
            (Some(path), None) => Ok((PolicyKind::Icsp, path.as_path())),
            (None, Some(path)) => Ok((PolicyKind::Idms, path.as_path())),
            (Some(_), Some(_)) => bail!("--icsp-file and --idms-file cannot be used together"),
            (None, None) => bail!("one of --icsp-file or --idms-file is required"),
        }
    }
}
