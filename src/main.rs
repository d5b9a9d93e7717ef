//! qrmint batch entrypoint

use clap::Parser;
use qrmint::store::{DocumentStore, MemoryStore};
use qrmint::{MintOptions, MintedQr, QrFlavor, QrMinter, QrmintConfig, Result, logging};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qrmint",
    version,
    about = "Mint unique short-URL QR codes backed by a remote document store"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrmint.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of QR codes to mint (overrides config)
    #[arg(long, short = 'n', value_name = "COUNT")]
    count: Option<u32>,

    /// Mint scan codes instead of plain label codes
    #[arg(long)]
    scan: bool,

    /// Override the output directory for PNG artifacts
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Override the identifier length
    #[arg(long, value_name = "LEN")]
    id_length: Option<usize>,

    /// Allocate against an in-memory store and skip file writing
    #[arg(long)]
    dry_run: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QrmintConfig::load(cli.config.as_deref())?;

    if let Some(count) = cli.count {
        config.mint.count = count;
    }
    if let Some(ref dir) = cli.out_dir {
        config.output.dir = dir.clone();
    }
    if let Some(length) = cli.id_length {
        config.mint.id_length = length.max(1);
    }

    logging::init(&config.logging)?;

    let flavor = if cli.scan {
        QrFlavor::Scan
    } else {
        QrFlavor::Label
    };

    let mut options = MintOptions::from_config(&config, flavor);
    if cli.dry_run {
        options = options.without_files();
    }

    let minted = if cli.dry_run {
        info!(count = config.mint.count, "Dry run against in-memory store");
        run_batch(MemoryStore::new(), options, config.mint.count).await?
    } else {
        let store = config.store.to_store()?;
        run_batch(store, options, config.mint.count).await?
    };

    emit(&minted, cli.json)?;
    info!(minted = minted.len(), "QR code generation and insertion completed");
    Ok(())
}

async fn run_batch<S: DocumentStore>(
    store: S,
    options: MintOptions,
    count: u32,
) -> Result<Vec<MintedQr>> {
    let minter = QrMinter::new(store, options);
    minter.mint_batch(count).await
}

fn emit(minted: &[MintedQr], as_json: bool) -> Result<()> {
    if as_json {
        let entries: Vec<_> = minted
            .iter()
            .map(|qr| {
                json!({
                    "id": qr.id,
                    "url": qr.url,
                    "file": qr.file.as_ref().map(|p| p.display().to_string()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for qr in minted {
        println!("Minted QR code {}", qr.id);
        println!("  URL: {}", qr.url);
        if let Some(file) = &qr.file {
            println!("  File: {}", file.display());
        }
    }
    Ok(())
}
