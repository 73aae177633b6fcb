use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use argtree_core::adapter::command_config_from_clap;
use argtree_core::{
    CommandConfig, Flags, Node, ParserConfig, ParserErrorList, parse_args, to_ast, unparse,
};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ARGTREE_LOG";

/// Exit status for a parse that recorded recoverable errors.
const EXIT_PARSE_ERRORS: i32 = 1;
/// Exit status for fatal errors.
const EXIT_FATAL: i32 = 2;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argtree")]
#[command(about = "Parse argument vectors against a declarative grammar", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse an argument vector and print its tree.
    Parse(ParseArgs),
    /// Rebuild an argument vector from a serialized tree.
    Unparse(UnparseArgs),
    /// Parse an argument vector and print it back out from the tree.
    Roundtrip(RoundtripArgs),
    /// Print the grammar derived from this tool's own command line.
    Grammar(GrammarArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Grammar document (.yaml, .yml or .json). Defaults to accepting any flag.
    #[arg(long)]
    grammar: Option<PathBuf>,
    /// Print the reduced AST instead of the parse tree.
    #[arg(long)]
    ast: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse; the first one is the program name.
    #[arg(last = true, required = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct UnparseArgs {
    /// Grammar document supplying the lexical dialect.
    #[arg(long)]
    grammar: Option<PathBuf>,
    /// Serialized tree (JSON, or YAML by extension). Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RoundtripArgs {
    /// Grammar document (.yaml, .yml or .json). Defaults to accepting any flag.
    #[arg(long)]
    grammar: Option<PathBuf>,
    /// Arguments to parse; the first one is the program name.
    #[arg(last = true, required = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct GrammarArgs {
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: CliOutputFormat,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Clean,
    ParseErrors,
}

#[derive(Debug, Serialize)]
struct ParseOutput<'a> {
    tree: &'a [Node],
    errors: &'a ParserErrorList,
}

/// Tree documents accepted by `unparse`: the output of `parse`, or a bare node list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TreeDocument {
    Output { tree: Vec<Node> },
    Nodes(Vec<Node>),
}

impl TreeDocument {
    fn into_nodes(self) -> Vec<Node> {
        match self {
            Self::Output { tree } => tree,
            Self::Nodes(nodes) => nodes,
        }
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Unparse(args) => run_unparse(args),
        Command::Roundtrip(args) => run_roundtrip(args),
        Command::Grammar(args) => run_grammar(args),
    };

    match result {
        Ok(Status::Clean) => {}
        Ok(Status::ParseErrors) => std::process::exit(EXIT_PARSE_ERRORS),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(EXIT_FATAL);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

// ---------------------------------------------------------------------------
// parse / roundtrip
// ---------------------------------------------------------------------------

fn run_parse(args: ParseArgs) -> Result<Status, String> {
    let config = load_grammar(args.grammar.as_deref())?;

    let (tree, errors) = parse_args(&args.args, Some(&config)).map_err(|e| e.to_string())?;
    let nodes = if args.ast { to_ast(&tree.nodes) } else { tree.nodes };

    let output = ParseOutput {
        tree: &nodes,
        errors: &errors,
    };
    println!("{}", render(&output, args.format)?);

    Ok(status_of(&errors))
}

fn run_roundtrip(args: RoundtripArgs) -> Result<Status, String> {
    let config = load_grammar(args.grammar.as_deref())?;

    let (tree, errors) = parse_args(&args.args, Some(&config)).map_err(|e| e.to_string())?;
    for err in errors.iter() {
        eprintln!("warning: {err}");
    }

    let regenerated = unparse(&tree.nodes, &config.scanner_config).map_err(|e| e.to_string())?;
    if regenerated != args.args {
        debug!(?regenerated, original = ?args.args, "round trip is not identical");
    }

    for arg in &regenerated {
        println!("{arg}");
    }

    Ok(status_of(&errors))
}

fn status_of(errors: &ParserErrorList) -> Status {
    if errors.is_empty() {
        Status::Clean
    } else {
        Status::ParseErrors
    }
}

// ---------------------------------------------------------------------------
// unparse
// ---------------------------------------------------------------------------

fn run_unparse(args: UnparseArgs) -> Result<Status, String> {
    let config = load_grammar(args.grammar.as_deref())?;

    let document: TreeDocument = match &args.input {
        Some(path) => read_document(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            serde_json::from_str(&raw)
                .map_err(|err| format!("Failed to parse tree from stdin: {err}"))?
        }
    };

    let nodes = document.into_nodes();
    let regenerated = unparse(&nodes, &config.scanner_config).map_err(|e| e.to_string())?;
    for arg in &regenerated {
        println!("{arg}");
    }

    Ok(Status::Clean)
}

// ---------------------------------------------------------------------------
// grammar
// ---------------------------------------------------------------------------

fn run_grammar(args: GrammarArgs) -> Result<Status, String> {
    let config = ParserConfig::new().with_prog(command_config_from_clap(&Cli::command()));
    println!("{}", render(&config, args.format)?);
    Ok(Status::Clean)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads a grammar document, or an automatic root when no path is given.
fn load_grammar(path: Option<&Path>) -> Result<ParserConfig, String> {
    match path {
        Some(path) => read_document(path),
        None => Ok(ParserConfig::new()
            .with_prog(CommandConfig::new().with_flags(Flags::automatic()))),
    }
}

/// Reads a YAML or JSON document, picking the format by file extension.
fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display())),
        Some("json") => serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display())),
        _ => Err(format!(
            "Unsupported document '{}': expected a .yaml, .yml or .json file",
            path.display()
        )),
    }
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}
