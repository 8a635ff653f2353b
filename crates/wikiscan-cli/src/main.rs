//! wikiscan CLI - Tokenize, validate, and inspect wiki markup
//!
//! Usage:
//!   wscan [OPTIONS] [COMMAND] <FILE>
//!
//! Commands:
//!   tokens    Print the token stream (default)
//!   validate  Check paired constructs and link targets
//!   stats     Show token statistics

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wikiscan_core::{tokenize, LinkTarget, LinkTargetError, SourcePosition, Token, TokenKind};

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;
    init_tracing(config.verbose);

    let input = read_input(&config.file)?;
    info!(file = %config.file, bytes = input.len(), "read input");

    let tokens = tokenize(&input).map_err(|e| format!("{}: {}", config.file, e))?;
    debug!(count = tokens.len(), "tokenized");

    match config.command {
        Command::Tokens => cmd_tokens(&tokens, &config),
        Command::Validate => cmd_validate(&tokens, &config),
        Command::Stats => cmd_stats(&tokens, &input, &config),
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        return Ok(input);
    }
    fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {}", file, e))
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tokens,
    Validate,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Tokens;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut file = None;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("wscan {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "tokens" if file.is_none() => command = Command::Tokens,
            "validate" if file.is_none() => command = Command::Validate,
            "stats" if file.is_none() => command = Command::Stats,
            "-" => set_file(&mut file, arg)?,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => set_file(&mut file, arg)?,
        }
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
    })
}

fn set_file(file: &mut Option<String>, arg: &str) -> Result<(), String> {
    if file.is_some() {
        return Err("multiple files specified".to_string());
    }
    *file = Some(arg.to_string());
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"wscan - wiki markup tokenizer and checker

USAGE:
    wscan [OPTIONS] [COMMAND] <FILE>

    Use - as FILE to read from stdin.

COMMANDS:
    tokens      Print one line per token (default)
    validate    Check paired constructs and link targets
    stats       Show token counts per kind

OPTIONS:
    -v, --verbose    Log lexer activity to stderr
    -j, --json       Output in JSON format
    -h, --help       Print help information
    -V, --version    Print version information

ENVIRONMENT:
    RUST_LOG         Log filter, overrides -v (e.g. RUST_LOG=trace)

EXAMPLES:
    wscan page.txt              Print the token stream
    wscan -j page.txt           Token stream as JSON
    wscan validate page.txt     Exit with 1 on unbalanced markup
    cat page.txt | wscan stats -
"#
    );
}

// =============================================================================
// Tokens Command
// =============================================================================

fn cmd_tokens(tokens: &[Token], config: &Config) -> Result<(), String> {
    match config.format {
        OutputFormat::Json => {
            let json: Vec<JsonToken<'_>> = tokens.iter().map(JsonToken::from).collect();
            print_json(&json)
        }
        OutputFormat::Text => {
            for token in tokens {
                println!("{}", describe_token(token));
            }
            Ok(())
        }
    }
}

fn describe_token(token: &Token) -> String {
    let mut line = format!(
        "{:<7} {:<18} {:?}",
        token.position.to_string(),
        token.kind.name(),
        token.text
    );
    if let Some(callout) = &token.callout {
        line.push_str(&format!(" kind={} title={:?}", callout.kind, callout.title));
    }
    if let Some(attributes) = &token.attributes {
        for (key, value) in attributes {
            line.push_str(&format!(" {}={:?}", key, value));
        }
    }
    line
}

// =============================================================================
// Validate Command
// =============================================================================

/// A paired construct that never found its partner.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Imbalance {
    kind: TokenKind,
    position: SourcePosition,
    problem: &'static str,
}

/// Match open and close tokens, innermost first.
///
/// A close with no matching open is stray; opens left on the stack at the
/// end are unclosed. Problems are reported in source order.
fn find_imbalances(tokens: &[Token]) -> Vec<Imbalance> {
    let mut open: Vec<&Token> = Vec::new();
    let mut problems = Vec::new();

    for token in tokens {
        if token.kind.is_open() {
            open.push(token);
        } else if let Some(opening) = token.kind.opening() {
            match open.iter().rposition(|t| t.kind == opening) {
                Some(index) => {
                    open.remove(index);
                }
                None => problems.push(Imbalance {
                    kind: token.kind,
                    position: token.position,
                    problem: "stray",
                }),
            }
        }
    }

    problems.extend(open.into_iter().map(|t| Imbalance {
        kind: t.kind,
        position: t.position,
        problem: "unclosed",
    }));
    problems.sort_by_key(|p| p.position);
    problems
}

/// A `[[target|...]]` whose target does not classify.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BadLink {
    position: SourcePosition,
    target: String,
    error: LinkTargetError,
}

/// Check the target of every closed link. The target is the text between
/// `[[` and the first `|` or `]]`.
fn find_bad_links(tokens: &[Token]) -> Vec<BadLink> {
    let mut bad = Vec::new();
    let mut current: Option<(SourcePosition, String)> = None;

    for token in tokens {
        match token.kind {
            TokenKind::LinkOpen => current = Some((token.position, String::new())),
            TokenKind::LinkPipe | TokenKind::LinkClose => {
                if let Some((position, target)) = current.take() {
                    if let Err(error) = LinkTarget::parse(&target) {
                        bad.push(BadLink {
                            position,
                            target,
                            error,
                        });
                    }
                }
            }
            _ => {
                if let Some((_, target)) = current.as_mut() {
                    target.push_str(&token.text);
                }
            }
        }
    }

    bad
}

fn cmd_validate(tokens: &[Token], config: &Config) -> Result<(), String> {
    let problems = find_imbalances(tokens);
    let bad_links = find_bad_links(tokens);
    let count = problems.len() + bad_links.len();
    debug!(imbalances = problems.len(), bad_links = bad_links.len(), "validated");

    if config.format == OutputFormat::Json {
        let errors: Vec<_> = problems
            .iter()
            .map(|p| {
                serde_json::json!({
                    "kind": p.kind.name(),
                    "problem": p.problem,
                    "line": p.position.line,
                    "column": p.position.column,
                })
            })
            .collect();
        let links: Vec<_> = bad_links
            .iter()
            .map(|b| {
                serde_json::json!({
                    "target": b.target,
                    "problem": b.error.to_string(),
                    "line": b.position.line,
                    "column": b.position.column,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({"valid": count == 0, "errors": errors, "links": links})
        );
    } else if count == 0 {
        println!("Valid: paired constructs are balanced and link targets resolve");
    } else {
        eprintln!("Invalid: {} problem(s) found", count);
        for p in &problems {
            eprintln!("  - {} {} at {}", p.problem, p.kind, p.position);
        }
        for b in &bad_links {
            eprintln!("  - link {:?} at {}: {}", b.target, b.position, b.error);
        }
    }

    if count == 0 {
        Ok(())
    } else {
        Err(format!("{} problem(s) found", count))
    }
}

// =============================================================================
// Stats Command
// =============================================================================

#[derive(Debug, Serialize)]
struct TokenStats {
    tokens: usize,
    lines: usize,
    chars: usize,
    kinds: BTreeMap<&'static str, usize>,
}

impl TokenStats {
    fn collect(tokens: &[Token], input: &str) -> Self {
        let mut kinds = BTreeMap::new();
        for token in tokens.iter().filter(|t| !t.is_eof()) {
            *kinds.entry(token.kind.name()).or_insert(0) += 1;
        }

        Self {
            tokens: tokens.iter().filter(|t| !t.is_eof()).count(),
            lines: input.lines().count(),
            chars: input.chars().count(),
            kinds,
        }
    }
}

fn cmd_stats(tokens: &[Token], input: &str, config: &Config) -> Result<(), String> {
    let stats = TokenStats::collect(tokens, input);

    if config.format == OutputFormat::Json {
        return print_json(&stats);
    }

    println!("Token Statistics");
    println!("----------------");
    println!("Tokens:     {}", stats.tokens);
    println!("Lines:      {}", stats.lines);
    println!("Characters: {}", stats.chars);
    println!();
    println!("By kind:");
    for (kind, count) in &stats.kinds {
        println!("  {:<20} {}", kind, count);
    }

    Ok(())
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonToken<'a> {
    kind: &'static str,
    text: &'a str,
    line: u32,
    column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callout: Option<JsonCallout<'a>>,
}

#[derive(Serialize)]
struct JsonCallout<'a> {
    kind: &'static str,
    title: &'a str,
}

impl<'a> From<&'a Token> for JsonToken<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            kind: token.kind.name(),
            text: &token.text,
            line: token.position.line,
            column: token.position.column,
            attributes: token.attributes.as_ref(),
            callout: token.callout.as_ref().map(|c| JsonCallout {
                kind: c.kind.as_str(),
                title: &c.title,
            }),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize output: {}", e))?;
    println!("{}", json);
    Ok(())
}
