//! # Image Mirror CLI
//!
//! This is the binary entry point for the `imagemirror` command-line tool.
//!
//! It parses arguments with `clap`, sets up logging and hands off to the
//! selected command. All mirror resolution lives in the library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
