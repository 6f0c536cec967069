use anyhow::Result;
use clap::{Parser, Subcommand};
use crawler::{Analyzer, FetchArgs};
use seoscope_core::SeoAssessment;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Keyword, page and topical analysis from the command line")]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keyword density and prominence for one page
    Keywords {
        #[arg(long)]
        url: String,
    },
    /// SEO audit of up to --max-pages pages of a domain
    Pages {
        #[arg(long)]
        domain: String,
        /// Write one JSON record per page to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate a topical map for a seed topic
    Topics {
        #[arg(long)]
        topic: String,
        /// Append related entities from the knowledge graph
        #[arg(long, default_value_t = false)]
        enrich: bool,
    },
}

#[derive(Serialize)]
struct OutPage<'a> {
    id: String,
    timestamp: String,
    #[serde(flatten)]
    page: &'a SeoAssessment,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Cli::parse();
    let analyzer = Analyzer::new(args.fetch.into_config())?;

    match args.command {
        Commands::Keywords { url } => {
            let report = analyzer.analyze_keywords(&url).await?;
            print_json(&report)?;
        }
        Commands::Pages { domain, output } => {
            let batch = analyzer.analyze_pages(&domain).await?;
            if let Some(warning) = batch.partial_failure() {
                tracing::warn!(%warning, "partial batch");
            }
            match output {
                Some(path) => {
                    if let Some(dir) = std::path::Path::new(&path).parent() {
                        fs::create_dir_all(dir).ok();
                    }
                    let mut out = BufWriter::new(File::create(&path)?);
                    write_pages(&mut out, &batch.pages)?;
                    out.flush()?;
                    tracing::info!(pages = batch.pages.len(), output = %path, "done");
                }
                None => print_json(&batch)?,
            }
        }
        Commands::Topics { topic, enrich } => {
            let map = analyzer.generate_topical_map(&topic, enrich).await?;
            print_json(&map)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, value)?;
    lock.write_all(b"\n")?;
    Ok(())
}

fn write_pages<W: Write>(out: &mut W, pages: &[SeoAssessment]) -> Result<()> {
    for page in pages {
        let mut hasher = Sha1::new();
        hasher.update(page.url.as_bytes());
        let id = format!("{:x}", hasher.finalize());
        let timestamp = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        serde_json::to_writer(&mut *out, &OutPage { id, timestamp, page })?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
