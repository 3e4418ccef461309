//! Command-line interface for docspan
//! Locates extracted statements inside their source document and prints the spans, the
//! document split into highlighted segments, or the HTML with highlights written in.
//!
//! Usage:
//!   docspan locate `<document>` --statements `<file>` [--format json|segments|html]
//!   docspan diff `<document>` (--diff `<file>` | --older `<file>` --newer `<file>`)
//!
//! Logging goes to stderr and is controlled by `DOCSPAN_LOG` (e.g. `DOCSPAN_LOG=debug`).

mod error;
mod input;
mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use docspan_config::{DocspanConfig, Loader};
use docspan_core::align::{
    classified_fragments, classify, Aligner, Alignment, DiffEntry, DiffStatus, DocumentContent,
    FlatAligner, Fragment, ReviewSession, ScanDiff, StatementFilter,
};
use docspan_markup::{MarkupAligner, MarkupProjector};
use error::CliError;
use output::Renderer;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("locate", sub)) => handle_locate_command(sub),
        Some(("diff", sub)) => handle_diff_command(sub),
        _ => Err(CliError::Usage("Unknown command".to_string())),
    };

    match result {
        Ok(out) => print!("{}", out),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOCSPAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_cli() -> Command {
    Command::new("docspan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Locate extracted statements inside their source document")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            document_args(Command::new("locate").about("Locate a statement list in a document"))
                .arg(
                    Arg::new("statements")
                        .long("statements")
                        .short('s')
                        .help("Statement list (JSON, or YAML by extension)")
                        .required(true),
                ),
        )
        .subcommand(
            document_args(
                Command::new("diff").about("Render two scans of statements in one document"),
            )
            .arg(
                Arg::new("diff")
                    .long("diff")
                    .help("Precomputed scan diff (JSON, or YAML by extension)")
                    .conflicts_with_all(["older", "newer"]),
            )
            .arg(
                Arg::new("older")
                    .long("older")
                    .help("Statement list of the older scan")
                    .requires("newer"),
            )
            .arg(
                Arg::new("newer")
                    .long("newer")
                    .help("Statement list of the newer scan")
                    .requires("older"),
            )
            .arg(
                Arg::new("status")
                    .long("status")
                    .help("Only show statements with this diff status")
                    .value_parser(["added", "removed", "modified", "unchanged"])
                    .action(ArgAction::Append),
            )
            .arg(
                Arg::new("no-labels")
                    .long("no-labels")
                    .help("Do not insert inline status labels into highlighted HTML")
                    .action(ArgAction::SetTrue),
            ),
        )
}

/// Arguments shared by every command that reads a document.
fn document_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("document")
                .help("Path to the source document")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("markup")
                .long("markup")
                .help("Treat the document as HTML (default for .html/.htm files)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (default from configuration: json)")
                .value_parser(["json", "segments", "html"]),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print JSON on a single line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("directive")
                .long("directive")
                .short('d')
                .help("Only show statements with this directive keyword (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .short('r')
                .help("Only show statements with this role (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("no-headers")
                .long("no-headers")
                .help("Leave header statements out of the result")
                .action(ArgAction::SetTrue),
        )
}

/// Handle the locate command
fn handle_locate_command(matches: &ArgMatches) -> Result<String, CliError> {
    let config = load_config(matches)?;
    let content = load_content(matches)?;
    let statements_path = matches
        .get_one::<String>("statements")
        .ok_or_else(|| CliError::Usage("--statements is required".to_string()))?;
    let statements = input::load_statements(Path::new(statements_path))?;

    let filter = build_filter(matches);
    let alignment = run_session(&config, &content, statements, filter)?;
    render(&config, &content, &alignment, None)
}

/// Handle the diff command
fn handle_diff_command(matches: &ArgMatches) -> Result<String, CliError> {
    let config = load_config(matches)?;
    let content = load_content(matches)?;

    let diff = match (
        matches.get_one::<String>("diff"),
        matches.get_one::<String>("older"),
        matches.get_one::<String>("newer"),
    ) {
        (Some(path), _, _) => input::load_diff(Path::new(path))?,
        (None, Some(older), Some(newer)) => ScanDiff::between(
            input::load_statements(Path::new(older))?,
            input::load_statements(Path::new(newer))?,
        ),
        _ => {
            return Err(CliError::Usage(
                "Provide --diff, or both --older and --newer".to_string(),
            ))
        }
    };

    let entries = classify(&diff);
    let statements = classified_fragments(&entries);

    let mut filter = build_filter(matches);
    if let Some(statuses) = matches.get_many::<String>("status") {
        for status in statuses {
            filter = filter.with_status(parse_status(status));
        }
    }

    let alignment = run_session(&config, &content, statements, filter)?;
    render(&config, &content, &alignment, Some(&entries))
}

fn load_config(matches: &ArgMatches) -> Result<DocspanConfig, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if matches.get_flag("compact") {
        loader = loader.set_override("output.pretty", false)?;
    }
    if matches.try_get_one::<bool>("no-labels").ok().flatten() == Some(&true) {
        loader = loader.set_override("highlight.diff_labels", false)?;
    }
    Ok(loader.build()?)
}

fn load_content(matches: &ArgMatches) -> Result<DocumentContent, CliError> {
    let path = matches
        .get_one::<String>("document")
        .ok_or_else(|| CliError::Usage("A document path is required".to_string()))?;
    input::load_document(Path::new(path), matches.get_flag("markup"))
}

fn build_filter(matches: &ArgMatches) -> StatementFilter {
    let mut filter = StatementFilter::new();
    for directive in matches.get_many::<String>("directive").into_iter().flatten() {
        filter = filter.with_directive(directive);
    }
    for role in matches.get_many::<String>("role").into_iter().flatten() {
        filter = filter.with_role(role);
    }
    if matches.get_flag("no-headers") {
        filter = filter.without_headers();
    }
    filter
}

fn parse_status(value: &str) -> DiffStatus {
    match value {
        "added" => DiffStatus::Added,
        "removed" => DiffStatus::Removed,
        "modified" => DiffStatus::ModifiedNew,
        _ => DiffStatus::Unchanged,
    }
}

/// Run the statements through a review session, the same path an interactive view takes.
fn run_session(
    config: &DocspanConfig,
    content: &DocumentContent,
    statements: Vec<Fragment>,
    filter: StatementFilter,
) -> Result<Alignment, CliError> {
    let aligner: &dyn Aligner = if content.is_markup() {
        &MarkupAligner
    } else {
        &FlatAligner
    };

    tracing::debug!(
        markup = content.is_markup(),
        statements = statements.len(),
        "starting review session"
    );

    let mut session = ReviewSession::new(config.matching.clone());
    let ticket = session.open();
    session.deliver_document(ticket, content.clone())?;
    session.deliver_statements(ticket, statements)?;
    session.set_filter(filter);
    Ok(session.render(aligner)?.clone())
}

fn render(
    config: &DocspanConfig,
    content: &DocumentContent,
    alignment: &Alignment,
    entries: Option<&[DiffEntry]>,
) -> Result<String, CliError> {
    let projector = MarkupProjector::new(config.highlight.clone());
    Renderer {
        format: config.output.format,
        pretty: config.output.pretty,
        projector: &projector,
    }
    .render(content, alignment, entries)
}
