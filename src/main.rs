use anyhow::{anyhow, Result};
use bylines::author::{AuthorRecord, AUTHORS};
use bylines::build::build_site;
use bylines::config::Config;
use bylines::digest::ContentDigest;
use clap::{App, AppSettings, Arg, SubCommand};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("BYLINES_LOG", "info")).init();

    let matches = App::new("bylines")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds the page and slice manifest for a multi-author blog")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Sources content, links post pages and writes the manifest")
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .short("p")
                        .takes_value(true)
                        .help("Directory to search for bylines.yaml (default: current directory)"),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .help("Output directory (default: <project>/public)"),
                ),
        )
        .subcommand(SubCommand::with_name("authors").about("Prints the author catalog"))
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => {
            let project = match matches.value_of("project") {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir()?,
            };
            let output = matches.value_of("output").map(Path::new);
            let config = Config::from_directory(&project, output)?;
            let summary = build_site(&config)?;
            println!(
                "{} pages, {} slices -> {}",
                summary.pages,
                summary.slices,
                summary.manifest.display()
            );
            Ok(())
        }
        ("authors", Some(_)) => {
            for def in AUTHORS {
                let author = AuthorRecord::from(def);
                println!(
                    "{}\t{}\t{}\t{}",
                    author.author_id,
                    author.name,
                    author.record_id(),
                    ContentDigest::of(&author)?
                );
            }
            Ok(())
        }
        (name, _) => Err(anyhow!("unknown subcommand `{}`", name)),
    }
}
