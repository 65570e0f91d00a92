//! `lockbox completions <shell>`: print a completion script for the
//! `lockbox` command tree (subcommands, `category` actions, sort fields).
//!
//!   lockbox completions bash > ~/.local/share/bash-completion/completions/lockbox

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_script(shell, &mut io::stdout().lock())
}

/// Generate the script for `shell` into `out`, named after the binary.
fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_script(shell, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_script_offers_lockbox_subcommands() {
        let out = script(Shell::Bash);
        for sub in ["category", "shell", "keyfile-generate", "search", "sort"] {
            assert!(out.contains(sub), "bash completions missing '{sub}'");
        }
    }

    #[test]
    fn fish_script_completes_sort_option_and_category_actions() {
        let out = script(Shell::Fish);
        assert!(out.contains("complete -c lockbox"));
        assert!(out.contains("-l by"));
        for action in ["add", "delete", "list"] {
            assert!(out.contains(action), "fish completions missing '{action}'");
        }
    }
}
