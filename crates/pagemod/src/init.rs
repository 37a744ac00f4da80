use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use pagemod_core::Config;
use pagemod_core::config::CONFIG_FILE;
use std::fs;

#[derive(Args, Debug, Default, Clone)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Execute the `init` command
pub fn execute(args: InitArgs) -> Result<()> {
    let path = std::env::current_dir()?.join(CONFIG_FILE);
    if path.exists() && !args.force {
        bail!("{} already exists, pass --force to overwrite it", path.display());
    }

    fs::write(&path, Config::builtin().to_toml_string()?)?;
    eprintln!("{} Wrote {}", "✓".green(), CONFIG_FILE.bold());
    Ok(())
}
