//! Completions command - print a shell completion script

use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::Shell;

pub fn execute(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}
