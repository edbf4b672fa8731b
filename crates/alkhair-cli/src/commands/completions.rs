use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

/// Completion script for `shell`, named after the `alkhair` binary.
pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    let mut script = Vec::new();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut command, &bin_name, &mut script),
        CompletionShell::Zsh => generate(shells::Zsh, &mut command, &bin_name, &mut script),
        CompletionShell::Fish => generate(shells::Fish, &mut command, &bin_name, &mut script),
        CompletionShell::PowerShell => {
            generate(shells::PowerShell, &mut command, &bin_name, &mut script);
        }
        CompletionShell::Elvish => generate(shells::Elvish, &mut command, &bin_name, &mut script),
    }
    script
}

pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_completions(shell);

    let Some(path) = output_path else {
        io::stdout().write_all(&script)?;
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &script)?;
    println!("Wrote {shell:?} completions to {}", path.display());
    Ok(())
}
