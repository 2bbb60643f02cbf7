// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Package names, comma-separated values accepted
fn packages_arg(required: bool) -> Arg {
    Arg::new("packages")
        .required(required)
        .num_args(1..)
        .value_delimiter(',')
        .help("Package names")
}

fn flag(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(id)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("srcpm")
        .version(env!("CARGO_PKG_VERSION"))
        .author("srcpm Contributors")
        .about("Source-based package manager: build and install packages from a catalog")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Configuration file (default: $SRCPM_CONFIG or /etc/srcpm/srcpm.toml)"),
        )
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .global(true)
                .help("Path to the catalog database (default: /var/lib/srcpm/main/main.db)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show build output and info-level logs"),
        )
        .subcommand(
            Command::new("install")
                .about("Build and install package(s) and their dependencies")
                .arg(packages_arg(true))
                .arg(flag("force", 'f', "Reinstall installed packages and skip archive verification"))
                .arg(flag("keep", 'k', "Keep the extracted sources under the source directory"))
                .arg(flag("yes", 'y', "Do not ask for confirmation"))
                .arg(
                    Arg::new("no_deps")
                        .long("no-deps")
                        .action(ArgAction::SetTrue)
                        .help("Do not resolve dependencies"),
                ),
        )
        .subcommand(
            Command::new("uninstall")
                .about("Uninstall package(s) with their `make uninstall` target")
                .arg(packages_arg(true))
                .arg(flag("keep", 'k', "Keep previously kept sources"))
                .arg(flag("yes", 'y', "Do not ask for confirmation")),
        )
        .subcommand(
            Command::new("update")
                .about("Rebuild installed packages whose catalog version changed")
                .arg(packages_arg(false))
                .arg(flag("all", 'a', "Update every outdated package"))
                .arg(flag("check", 'c', "Only list available updates"))
                .arg(flag("force", 'f', "Skip archive verification"))
                .arg(flag("keep", 'k', "Keep the extracted sources under the source directory"))
                .arg(flag("yes", 'y', "Do not ask for confirmation")),
        )
        .subcommand(
            Command::new("sync")
                .about("Create or refresh the catalog from a repository manifest")
                .arg(Arg::new("file").long("file").value_name("PATH").help("Local repo.json to import"))
                .arg(Arg::new("remote").long("remote").help("Repository coordinate, e.g. github.com/owner/packages"))
                .arg(Arg::new("name").short('n').long("name").help("Repository name")),
        )
        .subcommand(
            Command::new("catalog")
                .about("Catalog administration")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Add a single package to the catalog")
                        .arg(Arg::new("name").short('n').long("name").required(true))
                        .arg(Arg::new("version").short('V').long("version").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("build_dir").long("build-dir"))
                        .arg(Arg::new("archive_url").long("archive-url"))
                        .arg(Arg::new("sha512").long("sha512"))
                        .arg(Arg::new("deps").long("deps").value_delimiter(',')),
                )
                .subcommand(
                    Command::new("import")
                        .about("Add every package of a repo.json manifest")
                        .arg(Arg::new("file").required(true)),
                )
                .subcommand(
                    Command::new("manage")
                        .about("Change fields of a catalog entry")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("rename").long("rename"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("installed").long("installed").action(ArgAction::SetTrue))
                        .arg(Arg::new("uninstalled").long("uninstalled").action(ArgAction::SetTrue))
                        .arg(Arg::new("installed_version").long("installed-version"))
                        .arg(Arg::new("repo_version").long("repo-version"))
                        .arg(Arg::new("build_dir").long("build-dir"))
                        .arg(Arg::new("archive_url").long("archive-url"))
                        .arg(Arg::new("sha512").long("sha512"))
                        .arg(Arg::new("deps").long("deps").value_delimiter(','))
                        .arg(
                            Arg::new("remove")
                                .long("remove")
                                .action(ArgAction::SetTrue)
                                .help("Remove the package from the catalog"),
                        ),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show one package")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List catalog entries")
                        .arg(flag("installed", 'i', "Only installed packages")),
                )
                .subcommand(
                    Command::new("license")
                        .about("Print a package's LICENSE file")
                        .arg(Arg::new("name").required(true)),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("srcpm.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
