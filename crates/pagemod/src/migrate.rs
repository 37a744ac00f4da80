use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use log::debug;
use pagemod_core::{Config, FileOutcome, Mode, Pipeline, RunSummary};
use std::path::{Path, PathBuf};

/// Arguments for the `migrate` command
#[derive(Args, Debug, Default, Clone)]
pub struct MigrateArgs {
    /// App to migrate, as named in the config. Repeatable.
    /// When omitted, every configured app is migrated.
    #[arg(long = "app", value_name = "NAME")]
    pub apps: Vec<String>,

    /// Check whether pages need migration without modifying them.
    /// Exit with non-zero code if any page would change.
    #[arg(long)]
    pub check: bool,

    /// Show diffs instead of writing files
    #[arg(long, conflicts_with = "check")]
    pub diff: bool,

    /// Page tree to migrate instead of the configured root.
    /// Needs exactly one app.
    #[arg(value_name = "ROOT", value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,
}

impl MigrateArgs {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.diff {
            Mode::Diff
        } else {
            Mode::Write
        }
    }
}

/// Execute the `migrate` command
pub fn execute(args: MigrateArgs, config: Option<&Path>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, origin) = Config::load(config, &cwd)?;
    if let Some(origin) = &origin {
        debug!("Loaded {}", origin.display());
    }

    let mut apps = config.select(&args.apps)?;
    if let Some(root) = &args.root {
        if apps.len() != 1 {
            bail!("A ROOT argument needs exactly one app, select it with --app NAME");
        }
        apps[0].1.root = cwd.join(root);
    }

    let mode = args.mode();
    let mut total = RunSummary::default();
    for (name, app) in apps {
        eprintln!(
            "{} {} ({})",
            "Migrating".bold(),
            name,
            app.root.display()
        );
        let pipeline = Pipeline::new(app).with_mode(mode);
        let root = pipeline.app().root.clone();
        let summary = pipeline.run_with(|path, outcome| print_outcome(&root, path, outcome, mode));
        println!("{summary}");
        total.merge(summary);
    }

    if total.failed > 0 {
        eprintln!(
            "{} {} page(s) could not be migrated and were left untouched",
            "Warning:".yellow(),
            total.failed
        );
    }
    if mode == Mode::Check && total.pending > 0 {
        bail!("{} page(s) need migration", total.pending);
    }
    Ok(())
}

fn print_outcome(root: &Path, path: &Path, outcome: &FileOutcome, mode: Mode) {
    let rel = path.strip_prefix(root).unwrap_or(path).display().to_string();
    match outcome {
        FileOutcome::Modified => eprintln!("{} {}", "✓".green(), rel.green().bold()),
        FileOutcome::WouldModify { diff } => {
            if mode == Mode::Diff {
                print!("{diff}");
            } else {
                eprintln!("{} {} needs migration", "!".yellow(), rel.yellow().bold());
            }
        }
        FileOutcome::Failed(msg) => eprintln!("{} {}: {msg}", "✗".red(), rel.red().bold()),
        FileOutcome::Unchanged | FileOutcome::Ineligible(_) => {
            debug!("{rel}: {outcome}");
        }
    }
}
