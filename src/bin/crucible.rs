//! crucible: Shape JSON and CSV data from the command line
//!
//! Usage:
//!   # Flatten a document into distinct rows over two columns
//!   crucible flatten --columns /user,/posts/id data.json
//!
//!   # Regroup a fetched CSV by team then name
//!   crucible shape --paths /team,/name --url https://example.com/people.csv
//!
//!   # Query with a filter argument
//!   echo '{"posts": [{"id": 1, "title": "A"}]}' | crucible query '{ posts(id: 1) { title } }'
//!
//!   # Print the inferred schema
//!   crucible infer data.json
//!
//!   # Evaluate an operand tree
//!   crucible eval program.json --options options.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crucible::schema::sdl;
use crucible::{
    detect_format, infer_schema, HttpTransport, Node, QueryConfig, SourceFetcher, TransformOptions, Transformer,
};
use serde_json::Value;
use std::fs::File;
use std::io::{stdin, BufReader, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crucible")]
#[command(about = "Fetch, flatten, regroup, sort, encode and query JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Compact output (no pretty-printing)
    #[arg(long, global = true)]
    compact: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct Input {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Fetch the input from a URL instead
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a URL and print it as JSON
    Fetch { url: String },

    /// Flatten into rows, keeping distinct combinations of the given columns
    Flatten {
        /// Comma-separated column paths, e.g. /user,/posts/id
        #[arg(long)]
        columns: Option<String>,

        #[command(flatten)]
        input: Input,
    },

    /// Regroup flattened rows into a tree keyed by the given paths
    Shape {
        /// Comma-separated paths, outermost first
        #[arg(long)]
        paths: String,

        #[command(flatten)]
        input: Input,
    },

    /// Recursively sort object keys and string arrays
    Sort {
        #[arg(long, default_value = "ascending")]
        order: String,

        #[command(flatten)]
        input: Input,
    },

    /// Re-encode as a name/children tree
    Encode {
        #[arg(long, default_value = "name-children")]
        encoding: String,

        #[command(flatten)]
        input: Input,
    },

    /// Run a field-selection query against the input
    Query {
        /// Selection applied under the root, e.g. '{ posts { title } }'
        query: String,

        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        schema: SchemaFlags,
    },

    /// Print the schema inferred from the input
    Infer {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        schema: SchemaFlags,
    },

    /// Evaluate an operand tree read from a JSON file
    Eval {
        #[arg(value_name = "PROGRAM")]
        program: String,

        /// JSON file with transform options, e.g. {"enableFiltering": false}
        #[arg(long)]
        options: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SchemaFlags {
    /// Do not synthesize filter arguments; drop numeric keys instead
    #[arg(long)]
    no_filtering: bool,

    /// Report type-name collisions and extra filter arguments as errors
    #[arg(long)]
    strict: bool,
}

impl SchemaFlags {
    fn config(&self) -> QueryConfig {
        QueryConfig {
            enable_filtering: !self.no_filtering,
            strict: self.strict,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut options = TransformOptions::default();
    let node = match cli.cmd {
        Commands::Fetch { url } => Node::Fetch {
            url: Box::new(Node::literal(url)),
        },
        Commands::Flatten { columns, input } => Node::Flatten {
            columns: Box::new(Node::literal(split_list(columns.as_deref()))),
            data: Box::new(Node::literal(read_input(&input)?)),
        },
        Commands::Shape { paths, input } => Node::Shape {
            paths: Box::new(Node::literal(split_list(Some(&paths)))),
            data: Box::new(Node::literal(read_input(&input)?)),
        },
        Commands::Sort { order, input } => Node::Sort {
            order: Box::new(Node::literal(order)),
            data: Box::new(Node::literal(read_input(&input)?)),
        },
        Commands::Encode { encoding, input } => Node::Encode {
            encoding: Box::new(Node::literal(encoding)),
            data: Box::new(Node::literal(read_input(&input)?)),
        },
        Commands::Query { query, input, schema } => {
            options.query = schema.config();
            Node::Query {
                query: Box::new(Node::literal(query)),
                data: Box::new(Node::literal(read_input(&input)?)),
            }
        }
        Commands::Infer { input, schema } => {
            let value = read_input(&input)?;
            let inferred = infer_schema(&value, &schema.config());
            print!("{}", sdl::render(&inferred));
            for collision in &inferred.collisions {
                eprintln!("warning: {collision}");
            }
            return Ok(());
        }
        Commands::Eval { program, options: options_path } => {
            if let Some(path) = options_path {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read options: {path}"))?;
                options = serde_json::from_str(&text).context("Failed to parse options")?;
            }
            let text = std::fs::read_to_string(&program)
                .with_context(|| format!("Failed to read program: {program}"))?;
            serde_json::from_str(&text).context("Failed to parse program")?
        }
    };

    let eval = Transformer::new(options).visit(&node);

    let output = if cli.compact {
        serde_json::to_string(&eval.value)?
    } else {
        serde_json::to_string_pretty(&eval.value)?
    };
    println!("{}", output);

    if !eval.is_ok() {
        for error in &eval.errors {
            eprintln!("error: {error}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn split_list(text: Option<&str>) -> Value {
    let items: Vec<Value> = text
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
        .collect();
    Value::Array(items)
}

/// Read the input document, detecting CSV vs JSON the same way fetched
/// sources are.
fn read_input(input: &Input) -> Result<Value> {
    if let Some(url) = &input.url {
        let parsed = SourceFetcher::new(HttpTransport::new()).fetch(url)?;
        return Ok(parsed.into_value());
    }

    let (name, mut reader): (&str, Box<dyn Read>) = match &input.file {
        Some(path) => (
            path.as_str(),
            Box::new(BufReader::new(
                File::open(path).with_context(|| format!("Failed to open {path}"))?,
            )),
        ),
        None => ("-", Box::new(stdin())),
    };

    let mut body = String::new();
    reader
        .read_to_string(&mut body)
        .context("Failed to read input")?;

    Ok(detect_format(name, &body)?.into_value())
}
