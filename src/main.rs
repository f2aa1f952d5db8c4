use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use scraper::Html;
use serde::Serialize;
use tracing::{info, warn};

use genrecords::model::{GeneralizedData, InferredFacts};
use genrecords::options::Options;
use genrecords::sites::{self, Extraction, RegisteredSite};

#[derive(Parser)]
#[command(name = "genrecords", about = "Extract genealogy records from saved record pages")]
struct Cli {
    /// Options file (TOML); GENREC_* environment variables override its keys
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported sites
    Sites,
    /// Print the raw record read from a saved page
    Extract {
        /// URL the page was saved from
        #[arg(long)]
        url: String,
        /// Site id (default: chosen from the URL's host)
        #[arg(long)]
        site: Option<String>,
        file: PathBuf,
    },
    /// Print the generalized record and the facts inferred from it
    Generalize {
        #[arg(long)]
        url: String,
        #[arg(long)]
        site: Option<String>,
        /// Reference date for life-range inference (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        file: PathBuf,
    },
    /// Process a manifest of `url<TAB>file` lines, printing one JSON object per page
    Batch {
        manifest: PathBuf,
        /// Max pages to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let options = Options::load(cli.options.as_deref())?;

    match cli.command {
        Commands::Sites => {
            println!("{:<8} | {:<16} | Domains", "Id", "Name");
            println!("{}", "-".repeat(60));
            for site in sites::all() {
                println!("{:<8} | {:<16} | {}", site.id(), site.name(), site.domains().join(", "));
            }
            Ok(())
        }
        Commands::Extract { url, site, file } => {
            let site = resolve_site(site.as_deref(), &url)?;
            let document = load_page(&file)?;
            let extraction = site.process(&document, &url);
            println!("{}", serde_json::to_string_pretty(&extraction.raw)?);
            Ok(())
        }
        Commands::Generalize { url, site, as_of, file } => {
            let site = resolve_site(site.as_deref(), &url)?;
            let document = load_page(&file)?;
            let extraction = site.process(&document, &url);
            let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
            let output = GeneralizeOutput::new(&extraction.generalized, &options, as_of);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Commands::Batch { manifest, limit } => {
            let mut jobs = read_manifest(&manifest)?;
            if let Some(limit) = limit {
                jobs.truncate(limit);
            }
            if jobs.is_empty() {
                println!("No pages listed in {}.", manifest.display());
                return Ok(());
            }
            info!(pages = jobs.len(), "processing manifest");
            let started = Instant::now();
            let counts = process_jobs(&jobs)?;
            counts.print(started.elapsed());
            Ok(())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneralizeOutput<'a> {
    record: &'a GeneralizedData,
    #[serde(skip_serializing_if = "Option::is_none")]
    inferred: Option<InferredFacts>,
}

impl<'a> GeneralizeOutput<'a> {
    fn new(record: &'a GeneralizedData, options: &Options, as_of: NaiveDate) -> Self {
        GeneralizeOutput {
            record,
            inferred: record
                .has_valid_data
                .then(|| InferredFacts::compute(record, options, as_of)),
        }
    }
}

fn resolve_site(id: Option<&str>, url: &str) -> anyhow::Result<&'static dyn RegisteredSite> {
    let site = match id {
        Some(id) => sites::lookup(id)?,
        None => sites::lookup_by_url(url)?,
    };
    Ok(site)
}

fn load_page(path: &Path) -> anyhow::Result<Html> {
    let html = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Html::parse_document(&html))
}

struct PageJob {
    url: String,
    path: PathBuf,
}

/// Blank lines and `#` comments are skipped; relative files resolve against the manifest's directory.
fn read_manifest(manifest: &Path) -> anyhow::Result<Vec<PageJob>> {
    let text = fs::read_to_string(manifest).with_context(|| format!("reading {}", manifest.display()))?;
    let base = manifest.parent().unwrap_or_else(|| Path::new("."));

    let mut jobs = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('\t') {
            Some((url, file)) if !url.trim().is_empty() && !file.trim().is_empty() => jobs.push(PageJob {
                url: url.trim().to_string(),
                path: base.join(file.trim()),
            }),
            _ => warn!(line = line_no + 1, "manifest line is not url<TAB>file, skipped"),
        }
    }
    Ok(jobs)
}

#[derive(Default)]
struct BatchCounts {
    pages: usize,
    extracted: usize,
    usable: usize,
    errors: usize,
}

impl BatchCounts {
    fn per_second(count: usize, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            count as f64 / secs
        } else {
            0.0
        }
    }

    fn print(&self, elapsed: Duration) {
        eprintln!(
            "Processed {} pages in {:.1}s: {} extracted, {} usable records, {} errors.",
            self.pages,
            elapsed.as_secs_f64(),
            self.extracted,
            self.usable,
            self.errors,
        );
        eprintln!(
            "{:.1} pages/s, {:.1} usable records/s",
            Self::per_second(self.pages, elapsed),
            Self::per_second(self.usable, elapsed),
        );
    }
}

fn process_job(job: &PageJob) -> anyhow::Result<Extraction> {
    let site = sites::lookup_by_url(&job.url)?;
    let document = load_page(&job.path)?;
    Ok(site.process(&document, &job.url))
}

fn process_jobs(jobs: &[PageJob]) -> anyhow::Result<BatchCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(jobs.len() as u64).with_prefix("genrecords");
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {wide_bar} {pos}/{len} pages, {msg}")?
            .progress_chars("=> "),
    );

    let mut counts = BatchCounts::default();

    for chunk in jobs.chunks(500) {
        let results: Vec<_> = chunk.par_iter().map(process_job).collect();

        for (job, result) in chunk.iter().zip(results) {
            counts.pages += 1;
            match result {
                Ok(extraction) => {
                    counts.extracted += usize::from(extraction.status.success);
                    counts.usable += usize::from(extraction.generalized.has_valid_data);
                    println!("{}", serde_json::to_string(&extraction)?);
                }
                Err(e) => {
                    counts.errors += 1;
                    warn!(url = %job.url, file = %job.path.display(), "{:#}", e);
                }
            }
        }
        pb.set_message(format!("{} usable", counts.usable));
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}
