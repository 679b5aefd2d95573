// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_path_arg() -> Arg {
    Arg::new("repo_path")
        .long("repo-path")
        .value_name("PATH")
        .default_value(".")
        .help("Repository root")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .global(true)
        .action(ArgAction::SetTrue)
        .help("Print results as JSON")
}

fn completions_cmd() -> Command {
    Command::new("completions")
        .about("Generate shell completion scripts")
        .arg(
            Arg::new("shell")
                .required(true)
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                .help("Shell type"),
        )
}

fn build_pkgstate() -> Command {
    Command::new("pkgstate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgstate Contributors")
        .about("Query package state repositories (expanded layout)")
        .arg(json_arg())
        .subcommand(
            Command::new("search")
                .about("Search for a package across all repositories")
                .arg(Arg::new("package").required(true).help("Package name to search for"))
                .arg(repo_path_arg().short('r')),
        )
        .subcommand(
            Command::new("list")
                .about("List packages")
                .arg(
                    Arg::new("repo")
                        .long("repo")
                        .help("Repository name to list packages from"),
                )
                .arg(repo_path_arg().short('r')),
        )
        .subcommand(
            Command::new("info")
                .about("Get package information")
                .arg(Arg::new("package").required(true).help("Package name"))
                .arg(Arg::new("repo").required(true).help("Repository name"))
                .arg(repo_path_arg().short('r')),
        )
        .subcommand(
            Command::new("repos")
                .about("List all repositories")
                .arg(repo_path_arg().short('r')),
        )
        .subcommand(completions_cmd())
}

fn build_pkgstate_txt() -> Command {
    Command::new("pkgstate-txt")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgstate Contributors")
        .about("Query package state repositories (consolidated format)")
        .arg(json_arg())
        .subcommand(
            Command::new("search")
                .about("Search for a package across all consolidated files")
                .arg(Arg::new("package").required(true).help("Package name"))
                .arg(
                    Arg::new("exact")
                        .long("exact")
                        .action(ArgAction::SetTrue)
                        .help("Exact match for package search"),
                )
                .arg(repo_path_arg()),
        )
        .subcommand(
            Command::new("list")
                .about("List all packages in a repository")
                .arg(Arg::new("repo").required(true).help("Repository name"))
                .arg(repo_path_arg()),
        )
        .subcommand(
            Command::new("repos")
                .about("List all available repositories")
                .arg(repo_path_arg()),
        )
        .subcommand(completions_cmd())
}

fn build_pkgstate_consolidate() -> Command {
    Command::new("pkgstate-consolidate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgstate Contributors")
        .about("Consolidate per-package files into one file per repository directory")
        .arg(
            Arg::new("repo_path")
                .value_name("REPO_PATH")
                .default_value(".")
                .help("Repository root holding one directory per repository"),
        )
}

fn render(cmd: Command, man_dir: &Path) {
    let name = cmd.get_name().to_string();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .expect("Failed to render man page");

    let man_path = man_dir.join(format!("{}.1", name));
    fs::write(&man_path, buffer).expect("Failed to write man page");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    for cmd in [build_pkgstate(), build_pkgstate_txt(), build_pkgstate_consolidate()] {
        render(cmd, &man_dir);
    }
}
