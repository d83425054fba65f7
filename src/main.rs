use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use notehouse::build::{insert_note, rebuild_section, Outcome};
use notehouse::client::render_page;
use notehouse::config::Config;
use notehouse::manifest::write_manifest;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let matches = App::new("notehouse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publishes notes into a static blog index page")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .value_name("DIR")
                .default_value(".")
                .help("Directory to start searching for notehouse.yaml from"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("Log debug output"),
        )
        .arg(
            Arg::with_name("quiet")
                .long("quiet")
                .short("q")
                .conflicts_with("verbose")
                .help("Only log warnings and errors"),
        )
        .subcommand(
            SubCommand::with_name("insert")
                .about("Inserts a note into its category's section and the catch-all section")
                .arg(
                    Arg::with_name("NOTE")
                        .required(true)
                        .index(1)
                        .help("The note file name, relative to the notes directory"),
                )
                .arg(
                    Arg::with_name("CATEGORY")
                        .required(true)
                        .index(2)
                        .help("The section to insert the note into"),
                ),
        )
        .subcommand(
            SubCommand::with_name("manifest")
                .about("Writes the manifest of note files for the client renderer"),
        )
        .subcommand(
            SubCommand::with_name("rebuild")
                .about("Replaces a section's entries with every note, newest first")
                .arg(
                    Arg::with_name("SECTION")
                        .index(1)
                        .help("The section to rebuild (default: the catch-all section)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("render")
                .about("Renders the page the way the client renderer would")
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("FILE")
                        .help("Where to write the page (default: stdout)"),
                ),
        )
        .get_matches();

    init_logging(matches.is_present("verbose"), matches.is_present("quiet"));

    // `default_value` guarantees the argument is present.
    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let config = Config::from_directory(project).context("Loading configuration")?;

    match matches.subcommand() {
        ("insert", Some(m)) => insert(&config, m),
        ("manifest", Some(_)) => {
            write_manifest(&config)?;
            Ok(())
        }
        ("rebuild", Some(m)) => {
            rebuild_section(&config, m.value_of("SECTION"))?;
            Ok(())
        }
        ("render", Some(m)) => render(&config, m),
        // `SubcommandRequiredElseHelp` makes clap exit before we get here.
        _ => Ok(()),
    }
}

fn insert(config: &Config, matches: &ArgMatches) -> Result<()> {
    // Both arguments are `required`, so clap has already rejected their
    // absence.
    let note = matches.value_of("NOTE").unwrap_or_default();
    let category = matches.value_of("CATEGORY").unwrap_or_default();
    match insert_note(config, note, category)? {
        Outcome::Inserted { sections } => {
            println!("Inserted '{}' into {}", note, sections.join(", "))
        }
        Outcome::Duplicate => println!("Skipped '{}': already published", note),
    }
    Ok(())
}

fn render(config: &Config, matches: &ArgMatches) -> Result<()> {
    let page = render_page(config)?;
    match matches.value_of("output") {
        Some(path) => {
            std::fs::write(path, page).with_context(|| format!("Writing '{}'", path))?
        }
        None => print!("{}", page),
    }
    Ok(())
}

// Uses `RUST_LOG` if set, otherwise picks a level from the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
