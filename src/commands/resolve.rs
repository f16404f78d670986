//! # Resolve Command Implementation
//!
//! This module implements the `resolve` subcommand, which prints the
//! alternate locations a registry client would try for an image.
//!
//! ## Functionality
//!
//! - **Strategy selection**: `--strategy explicit` resolves mirrors before the
//!   first request and fails when there are none; `--strategy on-error` only
//!   resolves them after a failed request.
//! - **Phase selection**: `--phase first` or `--phase failure` picks which of
//!   the two strategy calls to make. It defaults to the call where the chosen
//!   strategy does its work.
//! - **Output**: one reference per line, or a JSON array with `--format json`.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::info;

use imagemirror::output::{OutputConfig, Status};
use imagemirror::reference::DockerImageReference;
use imagemirror::strategy::{build_strategy, StrategyMode};

use super::PolicyFileArgs;

/// When to resolve mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Before the first request; an image without mirrors is an error
    Explicit,
    /// Only after the first request failed
    OnError,
}

impl From<StrategyArg> for StrategyMode {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Explicit => StrategyMode::Explicit,
            StrategyArg::OnError => StrategyMode::OnError,
        }
    }
}

/// Which strategy call to make
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Phase {
    /// Before the first request
    First,
    /// After the first request failed
    Failure,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print the alternate locations for an image
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Image reference, e.g. quay.io/openshift-release-dev/ocp-release:4.14.0
    #[arg(value_name = "IMAGE")]
    pub image: String,

    #[command(flatten)]
    pub policy: PolicyFileArgs,

    /// Resolution strategy.
    #[arg(long, value_enum, default_value = "explicit")]
    pub strategy: StrategyArg,

    /// Strategy call to make. Defaults to `first` for explicit and
    /// `failure` for on-error.
    #[arg(long, value_enum)]
    pub phase: Option<Phase>,

    /// Apply Docker client defaults (docker.io, library/, latest) to IMAGE
    /// before matching.
    #[arg(long)]
    pub docker_defaults: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Execute the `resolve` command.
pub fn execute(args: ResolveArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let (kind, path) = args.policy.selected()?;

    let mut image = DockerImageReference::parse(&args.image)
        .with_context(|| format!("Invalid image reference: {}", args.image))?;
    if args.docker_defaults {
        image = image.docker_client_defaults();
    }

    let phase = args.phase.unwrap_or(match args.strategy {
        StrategyArg::Explicit => Phase::First,
        StrategyArg::OnError => Phase::Failure,
    });
    info!(
        "Resolving {} with {:?} strategy ({:?} phase) from {}",
        image,
        args.strategy,
        phase,
        path.display()
    );

    let strategy = build_strategy(args.strategy.into(), kind, path);
    let alternates = match phase {
        Phase::First => strategy.first_request(&image),
        Phase::Failure => strategy.on_failure(&image),
    }
    .with_context(|| format!("Failed to resolve alternates from {}", path.display()))?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&alternates)?);
        }
        OutputFormat::Text => {
            if alternates.is_empty() {
                eprintln!(
                    "{}",
                    out.line(
                        Status::Info,
                        format!("No alternates for {}; request the image as given", image)
                    )
                );
            }
            for alternate in &alternates {
                println!("{}", alternate);
            }
        }
    }

    Ok(())
}
