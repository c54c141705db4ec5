mod config;
mod session;
mod snapshot;
mod store;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use renderer::host::{self, DEFAULT_SOURCE, DocumentStore};

use crate::config::Config;
use crate::snapshot::TextSnapshot;
use crate::store::DirStore;

const SUBCOMMANDS: &[&str] = &["render", "sections", "share", "test", "help"];

#[derive(Parser)]
#[command(name = "linky", version, about = "Render linky hypertext documents")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to ./linky.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document, optionally activating links
    Render(RenderArgs),

    /// List the sections of a document
    Sections(SectionsArgs),

    /// Publish a document to the store
    Share(ShareArgs),

    /// Run .test.linky files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Source file (the built-in document if omitted)
    file: Option<String>,

    /// Load a shared document by id instead of a file
    #[arg(long, conflicts_with = "file")]
    id: Option<String>,

    /// Store directory for --id
    #[arg(long)]
    store: Option<PathBuf>,

    /// Section to start from
    #[arg(short, long)]
    entry: Option<String>,

    /// Activate a link: a link id (`#3`) or a section name. Repeatable, applied in order.
    #[arg(short, long = "click")]
    clicks: Vec<String>,

    /// Show link ids
    #[arg(long)]
    ids: bool,

    /// Spaces per unfold level
    #[arg(long)]
    indent: Option<usize>,
}

#[derive(clap::Args)]
struct SectionsArgs {
    /// Source file (the built-in document if omitted)
    file: Option<String>,

    /// Print the section map as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ShareArgs {
    /// Source file to publish
    file: String,

    /// Store directory
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.linky file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    env_logger::init();

    // `linky doc.linky` is shorthand for `linky render doc.linky`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "render".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    let config = match config::load(cli.config.as_deref(), Path::new(".")) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Command::Render(render_args) => do_render(render_args, &config),
        Command::Sections(sections_args) => do_sections(sections_args, &config),
        Command::Share(share_args) => do_share(share_args, &config),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code =
                test_runner::run_tests(path, cli.no_color, &test_args.category, &config);
            process::exit(exit_code);
        }
    }
}

/// Index of the first argument that is neither a flag nor a flag's value.
fn first_positional(args: &[String]) -> Option<usize> {
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--config" {
            i += 2;
            continue;
        }
        if !arg.starts_with('-') {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn read_source(file: Option<&str>) -> String {
    let Some(file) = file else {
        return DEFAULT_SOURCE.to_string();
    };
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    }
}

fn do_render(args: RenderArgs, config: &Config) {
    let source = match &args.id {
        Some(id) => {
            let store = DirStore::new(args.store.clone().unwrap_or_else(|| config.store.clone()));
            host::load_source(&store, Some(id.as_str()))
        }
        None => read_source(args.file.as_deref()),
    };

    let entry = args.entry.as_deref().unwrap_or(&config.entry);
    let mut engine = session::open(&source, config.parser_options(), entry);

    if let Err(e) = session::apply_clicks(&mut engine, &args.clicks) {
        eprintln!("error: {}", e);
        process::exit(1);
    }

    let mut options = config.paint_options();
    options.show_ids |= args.ids;
    if let Some(indent) = args.indent {
        options.indent = indent;
    }
    print!("{}", engine.surface().paint(&options));
}

fn do_sections(args: SectionsArgs, config: &Config) {
    let source = read_source(args.file.as_deref());
    let sections = linky::Parser::new(source.as_str())
        .with_options(config.parser_options())
        .parse();

    if args.json {
        match serde_json::to_string_pretty(&sections) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    for section in &sections {
        println!(
            "{} (line {})",
            section.name,
            byte_offset_to_line(&source, section.span.start)
        );
    }
}

fn do_share(args: ShareArgs, config: &Config) {
    let source = read_source(Some(args.file.as_str()));
    let engine = session::open(&source, config.parser_options(), &config.entry);

    let mut snapshot = TextSnapshot {
        options: config.paint_options(),
    };
    let payload = host::share_payload(&mut snapshot, engine.surface(), &source);

    let mut store = DirStore::new(args.store.unwrap_or_else(|| config.store.clone()));
    match store.publish(&payload) {
        Ok(id) => {
            log::info!("shared to {}", store.root().display());
            println!("{}", id);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}
