//! Purpose: `statpick` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (pretty JSON by default).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
//! Invariants: All parsing and filtering goes through the pure core functions.
use std::collections::HashSet;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod render;

use render::render_tree;
use statpick::core::error::{Error, ErrorKind, to_exit_code};
use statpick::core::filter::{MatchMode, filter_tree};
use statpick::core::parse::parse_report;
use statpick::core::tree::StatsTree;

// Reference interest list from the original extraction workflow. The entry
// "writeRowHitRateoverallMisses::total" is a missing comma between two keys,
// kept verbatim: splitting it would change which stats match, and the
// original intent is ambiguous.
const REFERENCE_INTEREST: [&str; 9] = [
    "demandMissRate::total",
    "overallMissRate::total",
    "demandAvgMshrMissLatency::total",
    "overallAvgMshrMissLatency::total",
    "avgRdBWSys",
    "avgWrBWSys",
    "readRowHitRate",
    "writeRowHitRateoverallMisses::total",
    "overallHits::total",
];

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let color_mode = cli.color;
    let exit_code = match dispatch(cli.command, color_mode) {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "statpick",
    version,
    about = "Extract interesting statistics from simulation stats reports",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Reports are flat key-value dumps: one `dotted.key value [# description]`
line per statistic, two header lines, and an end-of-statistics marker.

Mental model:
  - `extract` parses a report and keeps only interesting stats (write JSON)
  - `keys` lists every dotted stat path in a report (discover keys)
"#,
    after_help = r#"EXAMPLES
  $ statpick extract m5out/stats.txt                         # built-in interest list
  $ statpick extract m5out/stats.txt --interest avgRdBWSys   # explicit keys
  $ statpick extract - < m5out/stats.txt > stats.json        # stdin to stdout
  $ statpick keys m5out/stats.txt | grep MissRate

LEARN MORE
  $ statpick <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MatchModeCli {
    Segment,
    Path,
}

impl From<MatchModeCli> for MatchMode {
    fn from(value: MatchModeCli) -> Self {
        match value {
            MatchModeCli::Segment => MatchMode::Segment,
            MatchModeCli::Path => MatchMode::Path,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Parse a report and emit the interesting stats as JSON",
        long_about = r#"Parse a stats report, filter it down to the interest set, and emit the
resulting tree as pretty JSON.

Without --interest the built-in reference list is used. Values stay strings
exactly as the report formatted them."#,
        after_help = r#"EXAMPLES
  $ statpick extract m5out/stats.txt
  $ statpick extract m5out/stats.txt -o stats.json
  $ statpick extract m5out/stats.txt --interest ipc --interest avgRdBWSys
  $ statpick extract m5out/stats.txt --match-mode path --interest system.cpu.ipc
  $ statpick extract m5out/stats.txt --full | jq '.system.cpu'

NOTES
  - Use `-` as INPUT to read the report from stdin
  - `--match-mode segment` (default) matches bare key names at any depth;
    `--match-mode path` matches full dotted paths
  - `--full` skips filtering and emits the whole parsed tree"#
    )]
    Extract {
        #[arg(help = "Report file path (use - for stdin)", value_hint = ValueHint::FilePath)]
        input: String,
        #[arg(
            short = 'o',
            long = "out",
            value_name = "PATH",
            help = "Write JSON to this file instead of stdout",
            value_hint = ValueHint::FilePath
        )]
        out: Option<PathBuf>,
        #[arg(
            long = "interest",
            value_name = "KEY",
            help = "Interest-set key (repeatable; default: built-in reference list)"
        )]
        interest: Vec<String>,
        #[arg(
            long = "match-mode",
            value_enum,
            default_value = "segment",
            help = "Interest matching: segment (bare names, any depth) or path (full dotted paths)"
        )]
        match_mode: MatchModeCli,
        #[arg(long, help = "Skip filtering and emit the full parsed tree", conflicts_with = "interest")]
        full: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "List every dotted stat path in a report",
        long_about = r#"Parse a report and print the dotted path of every leaf statistic.

Useful for discovering keys to pass to `extract --interest`."#,
        after_help = r#"EXAMPLES
  $ statpick keys m5out/stats.txt
  $ statpick keys m5out/stats.txt --json
  $ statpick keys m5out/stats.txt | grep BWSys"#
    )]
    Keys {
        #[arg(help = "Report file path (use - for stdin)", value_hint = ValueHint::FilePath)]
        input: String,
        #[arg(long, help = "Emit a JSON array instead of one path per line")]
        json: bool,
    },
    #[command(
        about = "Print version info as JSON",
        long_about = r#"Emit version info as JSON (stable, machine-readable)."#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        long_about = r#"Generate shell completion scripts.

Prints a completion script for the given shell to stdout."#,
        after_help = r#"EXAMPLES
  $ statpick completion bash > ~/.local/share/bash-completion/completions/statpick
  $ statpick completion zsh > ~/.zfunc/_statpick
  $ statpick completion fish > ~/.config/fish/completions/statpick.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn dispatch(command: Command, color_mode: ColorMode) -> Result<(), Error> {
    match command {
        Command::Extract {
            input,
            out,
            interest,
            match_mode,
            full,
        } => run_extract(&input, out.as_deref(), interest, match_mode.into(), full, color_mode),
        Command::Keys { input, json } => run_keys(&input, json),
        Command::Version => {
            let value = json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            });
            println!("{value}");
            Ok(())
        }
        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "statpick", &mut io::stdout());
            Ok(())
        }
    }
}

fn run_extract(
    input: &str,
    out: Option<&Path>,
    interest: Vec<String>,
    mode: MatchMode,
    full: bool,
    color_mode: ColorMode,
) -> Result<(), Error> {
    let text = read_input(input)?;
    let tree = parse_report(text.lines())?;
    let tree = if full {
        tree
    } else {
        filter_tree(&tree, &interest_set(interest), mode)
    };

    match out {
        Some(path) => write_tree_file(path, &tree),
        None => {
            let use_color = color_mode.use_color(io::stdout().is_terminal());
            println!("{}", render_tree(&tree, use_color));
            Ok(())
        }
    }
}

fn run_keys(input: &str, as_json: bool) -> Result<(), Error> {
    let text = read_input(input)?;
    let tree = parse_report(text.lines())?;
    let paths = tree.leaf_paths();
    if as_json {
        let encoded = serde_json::to_string(&paths).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode key list")
                .with_source(err)
        })?;
        println!("{encoded}");
    } else {
        for path in paths {
            println!("{path}");
        }
    }
    Ok(())
}

fn interest_set(explicit: Vec<String>) -> HashSet<String> {
    if explicit.is_empty() {
        REFERENCE_INTEREST.iter().map(|key| (*key).to_string()).collect()
    } else {
        explicit.into_iter().collect()
    }
}

fn read_input(input: &str) -> Result<String, Error> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read report from stdin")
                .with_source(err)
        })?;
        return Ok(text);
    }
    std::fs::read_to_string(input).map_err(|err| {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::Permission,
            _ => ErrorKind::Io,
        };
        let mut mapped = Error::new(kind)
            .with_message("failed to read report")
            .with_path(input)
            .with_source(err);
        if kind == ErrorKind::NotFound {
            mapped = mapped.with_hint("Check the report path, or use - to read from stdin.");
        }
        mapped
    })
}

fn write_tree_file(path: &Path, tree: &StatsTree) -> Result<(), Error> {
    let mut encoded = serde_json::to_string_pretty(tree).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode stats tree")
            .with_source(err)
    })?;
    encoded.push('\n');
    std::fs::write(path, encoded).map_err(|err| {
        let kind = match err.kind() {
            io::ErrorKind::PermissionDenied => ErrorKind::Permission,
            _ => ErrorKind::Io,
        };
        Error::new(kind)
            .with_message("failed to write output file")
            .with_path(path)
            .with_source(err)
    })
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let encoded = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{encoded}");
}

fn error_text(err: &Error, use_color: bool) -> String {
    let label = if use_color {
        "\u{1b}[31merror:\u{1b}[0m"
    } else {
        "error:"
    };
    let mut text = format!("{label} {}", err.message().unwrap_or("unexpected failure"));
    if let Some(path) = err.path() {
        text.push_str(&format!(" (path: {})", path.display()));
    }
    if let Some(line) = err.line() {
        text.push_str(&format!(" (line: {line})"));
    }
    if let Some(hint) = err.hint() {
        text.push_str(&format!("\nhint: {hint}"));
    }
    text
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    if let Some(message) = err.message() {
        inner.insert("message".to_string(), json!(message));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.to_string_lossy()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::{ColorMode, REFERENCE_INTEREST, error_json, error_text, interest_set};
    use statpick::core::error::{Error, ErrorKind};

    #[test]
    fn reference_interest_preserves_the_concatenated_entry() {
        assert!(REFERENCE_INTEREST.contains(&"writeRowHitRateoverallMisses::total"));
        assert!(REFERENCE_INTEREST.contains(&"readRowHitRate"));
        // The two halves must not appear split out.
        assert!(!REFERENCE_INTEREST.contains(&"writeRowHitRate"));
        assert!(!REFERENCE_INTEREST.contains(&"overallMisses::total"));
    }

    #[test]
    fn empty_explicit_interest_falls_back_to_reference_list() {
        let set = interest_set(Vec::new());
        assert_eq!(set.len(), REFERENCE_INTEREST.len());
        assert!(set.contains("avgRdBWSys"));

        let set = interest_set(vec!["ipc".to_string()]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("ipc"));
    }

    #[test]
    fn error_json_carries_kind_message_and_line() {
        let err = Error::new(ErrorKind::Malformed)
            .with_message("statistic line has a key but no value")
            .with_line(9)
            .with_hint("Offending key: orphanKey");
        let value = error_json(&err);
        let inner = value.get("error").expect("error object");
        assert_eq!(inner.get("kind").and_then(|v| v.as_str()), Some("Malformed"));
        assert_eq!(inner.get("line").and_then(|v| v.as_u64()), Some(9));
        assert!(
            inner
                .get("hint")
                .and_then(|v| v.as_str())
                .expect("hint")
                .contains("orphanKey")
        );
    }

    #[test]
    fn error_text_is_plain_without_color() {
        let err = Error::new(ErrorKind::NotFound)
            .with_message("failed to read report")
            .with_path("missing.txt");
        let text = error_text(&err, false);
        assert!(text.starts_with("error: failed to read report"));
        assert!(text.contains("missing.txt"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn color_mode_auto_follows_tty() {
        assert!(ColorMode::Auto.use_color(true));
        assert!(!ColorMode::Auto.use_color(false));
        assert!(ColorMode::Always.use_color(false));
        assert!(!ColorMode::Never.use_color(true));
    }
}
