use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use std::path::PathBuf;

mod breadcrumbs;
mod init;
mod migrate;

#[derive(Parser)]
#[command(name = "pagemod")]
#[command(about = "Migrate Next.js pages to the app layout and page header", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Config file mapping app names to page trees.
    /// Defaults to ./pagemod.toml, then the built-in apps.
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate legacy page layouts and headers
    #[command(alias = "m")]
    Migrate(migrate::MigrateArgs),

    /// Print the breadcrumb trail derived for a page
    Breadcrumbs(breadcrumbs::BreadcrumbsArgs),

    /// Write the built-in app mapping to ./pagemod.toml
    Init(init::InitArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG overrides
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Migrate(args) => migrate::execute(args, config),
        Commands::Breadcrumbs(args) => breadcrumbs::execute(args, config),
        Commands::Init(args) => init::execute(args),
    }
}
