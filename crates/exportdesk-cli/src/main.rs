mod display;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use exportdesk_core::{
    COUNTRIES, PRODUCTS, ReviewList, Selectable, detect_country_from_text, parse_country_text,
    parse_email_text,
};
use exportdesk_store::import::{self, SaveSummary};
use exportdesk_store::{MemoryStore, RecordStore};
use exportdesk_sync::FirestoreClient;
use tracing::{info, warn};

const PRODUCT_EXAMPLE: &str = "\
* Serums & Body Oils (6 SKUs)
Niacinamide, Hyaluronic Acid, Centella Asiatica";

const COUNTRY_EXAMPLE: &str = "\
Egypt (EG)
Requirements:
EDA product notification
Documents:
- Certificate of Analysis
- Free Sale Certificate";

#[derive(Parser)]
#[command(name = "exportdesk", version, about = "Import export records from pasted buyer emails")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Record store backend
    #[arg(long, value_enum, env = "EXPORTDESK_STORE", default_value_t = Backend::File, global = true)]
    store: Backend,

    /// JSON file used by the `file` backend
    #[arg(long, env = "EXPORTDESK_DATA", default_value = "exportdesk.json", global = true)]
    data: PathBuf,

    #[arg(
        long,
        env = "FIRESTORE_BASE_URL",
        default_value = "https://firestore.googleapis.com",
        global = true
    )]
    firestore_url: String,

    #[arg(long, env = "FIRESTORE_PROJECT", global = true)]
    firestore_project: Option<String>,

    /// OAuth bearer token sent to Firestore
    #[arg(long, env = "FIRESTORE_TOKEN", hide_env_values = true, global = true)]
    firestore_token: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// In-process only; nothing survives the command
    Memory,
    /// JSON file at --data
    File,
    Firestore,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Products,
    Countries,
}

impl Kind {
    fn collection(self) -> &'static str {
        match self {
            Kind::Products => PRODUCTS,
            Kind::Countries => COUNTRIES,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse pasted text and show the candidates without saving
    Parse {
        #[arg(value_enum)]
        kind: Kind,
        /// Read from a file instead of stdin
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse pasted text and save every candidate not skipped
    Import {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Candidate indices to leave out, as shown by `parse`
        #[arg(long, value_delimiter = ',')]
        skip: Vec<usize>,
    },
    /// List stored records
    List {
        #[arg(value_enum)]
        kind: Kind,
        /// Show raw fields, including timestamps
        #[arg(long)]
        raw: bool,
    },
    /// Delete stored records by id
    Delete {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show which country a piece of text mentions
    Detect { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { kind, input, json } => {
            let text = read_input(input.as_deref())?;
            cmd_parse(kind, &text, json)
        }
        Commands::Import { kind, input, skip } => {
            let text = read_input(input.as_deref())?;
            let store = open_store(&cli.store).await?;
            cmd_import(store.as_ref(), kind, &text, &skip).await
        }
        Commands::List { kind, raw } => {
            let store = open_store(&cli.store).await?;
            cmd_list(store.as_ref(), kind, raw).await
        }
        Commands::Delete { kind, ids } => {
            let store = open_store(&cli.store).await?;
            let summary = import::delete_records(store.as_ref(), kind.collection(), &ids).await;
            report(summary, "deleted")
        }
        Commands::Detect { text } => {
            match detect_country_from_text(&text) {
                Some(country) => println!("{} ({})", country.name, country.code),
                None => println!("no country detected"),
            }
            Ok(())
        }
    }
}

// ── Commands ──

fn cmd_parse(kind: Kind, text: &str, json: bool) -> anyhow::Result<()> {
    match kind {
        Kind::Products => {
            let candidates = parse_email_text(text);
            if candidates.is_empty() {
                print_product_hint();
            } else if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else {
                for (i, c) in candidates.iter().enumerate() {
                    display::print_product_candidate(i, c);
                }
            }
        }
        Kind::Countries => {
            let candidates = parse_country_text(text);
            if candidates.is_empty() {
                print_country_hint();
            } else if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else {
                for (i, c) in candidates.iter().enumerate() {
                    display::print_country_candidate(i, c);
                }
            }
        }
    }
    Ok(())
}

async fn cmd_import(
    store: &dyn RecordStore,
    kind: Kind,
    text: &str,
    skip: &[usize],
) -> anyhow::Result<()> {
    let summary = match kind {
        Kind::Products => {
            let candidates = parse_email_text(text);
            if candidates.is_empty() {
                print_product_hint();
                return Ok(());
            }
            let review = deselect(ReviewList::new(candidates), skip);
            import::save_products(store, review.items()).await
        }
        Kind::Countries => {
            let candidates = parse_country_text(text);
            if candidates.is_empty() {
                print_country_hint();
                return Ok(());
            }
            let review = deselect(ReviewList::new(candidates), skip);
            import::save_countries(store, review.items()).await
        }
    };
    report(summary, "saved")
}

async fn cmd_list(store: &dyn RecordStore, kind: Kind, raw: bool) -> anyhow::Result<()> {
    if raw {
        let records = store
            .list_records(kind.collection())
            .await
            .context("listing records")?;
        for r in &records {
            display::print_fields(&r.id, &r.fields);
        }
        println!("{} records", records.len());
        return Ok(());
    }

    let count = match kind {
        Kind::Products => {
            let products = import::list_products(store).await.context("listing products")?;
            for (id, p) in &products {
                display::print_product(id, p);
            }
            products.len()
        }
        Kind::Countries => {
            let countries = import::list_countries(store)
                .await
                .context("listing countries")?;
            for (id, c) in &countries {
                display::print_country(id, c);
            }
            countries.len()
        }
    };
    println!("{count} records");
    Ok(())
}

// ── Helpers ──

/// Non-interactive review step: uncheck the skipped rows.
fn deselect<T: Selectable>(mut review: ReviewList<T>, skip: &[usize]) -> ReviewList<T> {
    let len = review.len();
    for &i in skip {
        match review.get_mut(i) {
            Some(item) => item.set_selected(false),
            None => warn!(index = i, len, "skip index out of range"),
        }
    }
    review
}

fn print_product_hint() {
    println!(
        "No products found. Paste category headers followed by plain ingredient lines, e.g.\n\n{PRODUCT_EXAMPLE}"
    );
}

fn print_country_hint() {
    println!("No countries found. Paste one block per country under a header line, e.g.\n\n{COUNTRY_EXAMPLE}");
}

fn report(summary: SaveSummary, verb: &str) -> anyhow::Result<()> {
    if summary.nothing_selected() {
        println!("Nothing selected.");
        return Ok(());
    }
    let message = summary.message().replacen("saved", verb, 1);
    if !summary.all_saved() {
        bail!(message);
    }
    println!("{message}");
    Ok(())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) => {
            std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

async fn open_store(args: &StoreArgs) -> anyhow::Result<Box<dyn RecordStore>> {
    match args.store {
        Backend::Memory => Ok(Box::new(MemoryStore::open())),
        Backend::File => {
            let store = MemoryStore::open_persistent(&args.data)
                .await
                .with_context(|| format!("opening {}", args.data.display()))?;
            info!(path = %args.data.display(), "opened file store");
            Ok(Box::new(store))
        }
        Backend::Firestore => {
            let project = args
                .firestore_project
                .clone()
                .context("--firestore-project (or FIRESTORE_PROJECT) is required")?;
            let mut client = FirestoreClient::new(args.firestore_url.clone(), project);
            if let Some(token) = &args.firestore_token {
                client = client.with_token(token.clone());
            }
            Ok(Box::new(client))
        }
    }
}
