use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use svcgraph_core::{
    LayoutOptions, TypeRegistry, export_markup, export_service_schema, export_snapshot,
    import_service_schema, import_snapshot, validate_service_schema,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Graph(svcgraph_core::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Graph(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Invalid(report) => write!(f, "{report}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<svcgraph_core::Error> for CliError {
    fn from(value: svcgraph_core::Error) -> Self {
        Self::Graph(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Validate,
    Import,
    Layout,
    Markup,
    Schema,
}

#[derive(Debug, Clone, Copy, Default)]
enum InputFormat {
    #[default]
    Schema,
    Snapshot,
}

impl FromStr for InputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" | "services" => Ok(Self::Schema),
            "snapshot" | "flat" => Ok(Self::Snapshot),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    verbose: bool,
    from: InputFormat,
    out: Option<String>,
}

fn usage() -> &'static str {
    "svcgraph\n\
\n\
USAGE:\n\
  svcgraph validate [<path>|-]\n\
  svcgraph import [--pretty] [--out <path>] [<path>|-]\n\
  svcgraph layout [--pretty] [--out <path>] [<path>|-]\n\
  svcgraph markup [--from schema|snapshot] [--out <path>] [<path>|-]\n\
  svcgraph schema [--pretty] [--out <path>] [<path>|-]\n\
\n\
COMMANDS:\n\
  validate  check a service schema and print every violation\n\
  import    convert a service schema into a laid-out flat snapshot\n\
  layout    re-run auto-layout on a flat snapshot\n\
  markup    emit flowchart markup from a service schema or a flat snapshot\n\
  schema    convert a flat snapshot back into a service schema\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Output goes to stdout unless --out is given.\n\
  - --verbose (or SVCGRAPH_LOG=<level>) enables diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "validate" => args.command = Command::Validate,
            "import" => args.command = Command::Import,
            "layout" => args.command = Command::Layout,
            "markup" => args.command = Command::Markup,
            "schema" => args.command = Command::Schema,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--from" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.from = fmt
                    .parse::<InputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        std::env::var("SVCGRAPH_LOG")
            .ok()
            .and_then(|v| v.parse::<tracing::Level>().ok())
            .unwrap_or(tracing::Level::WARN)
    };
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::debug!(path, bytes = text.len(), "wrote output");
            Ok(())
        }
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    write_text(&text, out)
}

fn run(args: Args) -> Result<(), CliError> {
    let registry = TypeRegistry::builtin();
    let layout = LayoutOptions::default();
    let text = read_input(args.input.as_deref())?;
    let out = args.out.as_deref();

    match args.command {
        Command::Validate => {
            let doc: serde_json::Value = serde_json::from_str(&text)?;
            let errors = validate_service_schema(&doc, registry);
            if !errors.is_empty() {
                let report = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(CliError::Invalid(report));
            }
            write_text("ok\n", out)
        }
        Command::Import => {
            let imported = import_service_schema(&text, registry, &layout)?;
            let snapshot = export_snapshot(&imported.nodes, &imported.edges);
            write_json(&snapshot, args.pretty, out)
        }
        Command::Layout => {
            let mut graph = import_snapshot(&text, registry)?.into_graph()?;
            graph.apply_layout(&layout);
            let snapshot = export_snapshot(graph.nodes(), graph.edges());
            write_json(&snapshot, args.pretty, out)
        }
        Command::Markup => {
            let imported = match args.from {
                InputFormat::Schema => import_service_schema(&text, registry, &layout)?,
                InputFormat::Snapshot => import_snapshot(&text, registry)?,
            };
            let markup = export_markup(&imported.nodes, &imported.edges, registry);
            write_text(&markup, out)
        }
        Command::Schema => {
            let imported = import_snapshot(&text, registry)?;
            let schema = export_service_schema(&imported.nodes, &imported.edges);
            write_json(&schema, args.pretty, out)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::Invalid(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
