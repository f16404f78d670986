//! # Completions Command Implementation
//!
//! Writes a shell completion script for `imagemirror` to stdout, generated by
//! `clap_complete` from the CLI definition.
//!
//! ```bash
//! imagemirror completions bash > ~/.local/share/bash-completion/completions/imagemirror
//! imagemirror completions zsh > ~/.zfunc/_imagemirror
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn write_completions(shell: Shell, buf: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, buf);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}
