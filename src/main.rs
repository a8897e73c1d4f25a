#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use club_page::config::{PageSettings, RawConfig};
use club_page::dom::MemoryDocument;
use club_page::event_handler::{handle_event, PageEvent};
use club_page::tracker::ManualFrameClock;
use club_page::{boot, boot_with_config};

#[derive(Parser, Debug)]
#[command(name = "club-page", version, about = "Club page behaviour runner")]
struct Cli {
    #[arg(long, global = true, help = "Settings TOML (defaults to the user config dir)")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot a page fixture and print the resolved contact record
    Resolve {
        #[arg(long)]
        page: PathBuf,
        #[arg(long, help = "Config JSON used instead of the one embedded in the page")]
        config: Option<PathBuf>,
        #[arg(long, help = "Write the bound page fixture here")]
        write_page: Option<PathBuf>,
    },
    /// Replay scroll positions and print the active section after each
    Track {
        #[arg(long)]
        page: PathBuf,
        #[arg(long, num_args = 1.., required = true)]
        scroll: Vec<f64>,
        #[arg(long, default_value_t = 1, help = "Scroll events emitted per position")]
        burst: usize,
    },
    /// Boot a page fixture and report failed self-checks
    Check {
        #[arg(long)]
        page: PathBuf,
    },
    /// Print the effective settings
    Settings {
        #[arg(long, default_value_t = false)]
        write: bool,
    },
}

#[derive(Serialize)]
struct TrackStep {
    scroll_y: f64,
    active: Option<String>,
    changed: bool,
    evaluations: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let settings = PageSettings::load(cli.settings.as_deref())?;

    match cli.command {
        Commands::Resolve {
            page,
            config,
            write_page,
        } => resolve(&settings, &page, config.as_deref(), write_page.as_deref())?,
        Commands::Track {
            page,
            scroll,
            burst,
        } => track(&settings, &page, &scroll, burst)?,
        Commands::Check { page } => {
            if !check(&settings, &page)? {
                std::process::exit(1);
            }
        }
        Commands::Settings { write } => {
            print!("{}", settings.to_toml()?);
            if write {
                let path = cli.settings.unwrap_or_else(PageSettings::default_path);
                settings.save(&path)?;
            }
        }
    }
    Ok(())
}

fn resolve(settings: &PageSettings, page: &Path, config: Option<&Path>, write_page: Option<&Path>) -> Result<()> {
    let mut doc = MemoryDocument::load(page)?;
    let page_state = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .context(format!("Failed to read config {}", path.display()))?;
            boot_with_config(&mut doc, settings, &RawConfig::decode(&text))
        }
        None => boot(&mut doc, settings),
    };
    println!("{}", serde_json::to_string_pretty(&page_state.contact)?);

    if let Some(out) = write_page {
        let json = serde_json::to_string_pretty(&doc.snapshot())?;
        fs::write(out, json).context(format!("Failed to write page fixture {}", out.display()))?;
        info!(path = %out.display(), "Wrote bound page");
    }
    Ok(())
}

fn track(settings: &PageSettings, page: &Path, positions: &[f64], burst: usize) -> Result<()> {
    let mut doc = MemoryDocument::load(page)?;
    let mut tracker = boot(&mut doc, settings).tracker;
    let mut clock = ManualFrameClock::new();

    let mut steps = Vec::with_capacity(positions.len());
    for &y in positions {
        for _ in 0..burst.max(1) {
            doc.scroll_to(y);
            handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Scroll);
        }
        let changed = clock.take_frame()
            && handle_event(&mut tracker, &mut clock, &mut doc, PageEvent::Frame).is_some();
        steps.push(TrackStep {
            scroll_y: doc.scroll_y(),
            active: tracker.active_id().map(str::to_string),
            changed,
            evaluations: tracker.evaluations(),
        });
    }
    println!("{}", serde_json::to_string_pretty(&steps)?);
    info!(frames = clock.total_requests(), "Replay finished");
    Ok(())
}

fn check(settings: &PageSettings, page: &Path) -> Result<bool> {
    let mut doc = MemoryDocument::load(page)?;
    let failed = boot(&mut doc, settings).failed_checks;
    for failure in &failed {
        println!("FAIL {failure}");
    }
    if failed.is_empty() {
        println!("OK");
    }
    Ok(failed.is_empty())
}
