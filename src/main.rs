// src/main.rs

use anyhow::Result;
use clap::Parser;
use srcpm::Config;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod commands;

use cli::{CatalogCommands, Cli, Commands};
use commands::{NewPackage, PackageChanges, PackageFlags};

/// Console logging on stderr plus an append-only log file
///
/// The file layer is best effort: an unwritable log file only costs a
/// warning.
fn init_logging(verbose: bool, log_file: &Path) {
    let default_level = if verbose { "info" } else { "warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new("info")),
        ),
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}", log_file.display(), e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(db_path) = &cli.db_path {
        config = config.with_db_path(db_path);
    }
    if cli.verbose {
        config = config.with_verbose(true);
    }
    Ok(config)
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Install {
            packages,
            force,
            keep,
            yes,
            no_deps,
        } => commands::cmd_install(
            config,
            &packages,
            PackageFlags {
                force,
                keep,
                yes,
                no_deps,
            },
        ),

        Commands::Uninstall {
            packages,
            keep,
            yes,
        } => commands::cmd_uninstall(
            config,
            &packages,
            PackageFlags {
                keep,
                yes,
                ..PackageFlags::default()
            },
        ),

        Commands::Update {
            packages,
            all,
            check,
            force,
            keep,
            yes,
        } => commands::cmd_update(
            config,
            &packages,
            all,
            check,
            PackageFlags {
                force,
                keep,
                yes,
                no_deps: true,
            },
        ),

        Commands::Sync { file, remote, name } => commands::cmd_sync(config, file, remote, name),

        Commands::Catalog(catalog) => match catalog {
            CatalogCommands::Add {
                name,
                version,
                description,
                build_dir,
                archive_url,
                sha512,
                deps,
            } => commands::cmd_catalog_add(
                config,
                NewPackage {
                    name,
                    version,
                    description,
                    build_dir,
                    archive_url,
                    sha512,
                    deps,
                },
            ),
            CatalogCommands::Import { file } => commands::cmd_catalog_import(config, &file),
            CatalogCommands::Manage {
                name,
                rename,
                description,
                installed,
                uninstalled,
                installed_version,
                repo_version,
                build_dir,
                archive_url,
                sha512,
                deps,
                remove,
            } => {
                let installed = match (installed, uninstalled) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                commands::cmd_catalog_manage(
                    config,
                    &name,
                    PackageChanges {
                        rename,
                        description,
                        installed,
                        installed_version,
                        repo_version,
                        build_dir,
                        archive_url,
                        sha512,
                        deps,
                        remove,
                    },
                )
            }
            CatalogCommands::Show { name } => commands::cmd_catalog_show(config, &name),
            CatalogCommands::List { installed } => commands::cmd_catalog_list(config, installed),
            CatalogCommands::License { name } => commands::cmd_catalog_license(config, &name),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    init_logging(config.verbose, &config.log_file);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
