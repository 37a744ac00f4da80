use anyhow::{Context, Result};
use clap::Args;
use pagemod_core::Config;
use pagemod_core::breadcrumbs::{for_page, render};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct BreadcrumbsArgs {
    /// App the page belongs to
    #[arg(long = "app", value_name = "NAME")]
    pub app: String,

    /// Page file, relative to the app root or below its route root
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the `breadcrumbs` command
pub fn execute(args: BreadcrumbsArgs, config: Option<&Path>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, _) = Config::load(config, &cwd)?;
    let (_, app) = config
        .select(std::slice::from_ref(&args.app))?
        .into_iter()
        .next()
        .context("No app selected")?;

    println!("{}", render(&for_page(&args.path, &app)));
    Ok(())
}
