mod wizard;

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bill_maker::config::{self, Settings};
use bill_maker::error::AppError;
use bill_maker::export::{self, Destination};
use bill_maker::preview::render_preview;

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "bill-maker", version, about = "Build an invoice and export it as PDF")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a new invoice interactively
    New {
        /// Choose where to save with a native dialog
        #[arg(long)]
        dialog: bool,
        /// Write into this directory instead of the configured one
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Reveal the PDF once written
        #[arg(long)]
        open: bool,
    },
    /// Render a saved record (.json or .toml) straight to PDF
    Render {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        dialog: bool,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        open: bool,
    },
    /// Print the on-screen preview of a record
    Preview {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Configure output directory, issuer and currency
    Config,
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BILL_MAKER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::New { dialog, out_dir, open } => {
            let settings = Settings::load_or_init()?;
            let destination = destination(&settings, dialog, out_dir);
            wizard::run_form(&settings, &destination, open)?;
        }
        Commands::Render { input, dialog, out_dir, open } => {
            let settings = Settings::load_or_init()?;
            let record = export::load_record(&input)?;
            if !record.can_download() {
                return Err(AppError::IncompleteRecord(record.missing_requirements().join("; ")));
            }
            println!("🔨 Compiling PDF...");
            match export::export_pdf(&record, &settings, &destination(&settings, dialog, out_dir))? {
                Some(path) => {
                    println!("✅ PDF Generated: {:?}", path);
                    if open {
                        open_and_reveal(&path);
                    }
                }
                None => println!("Cancelled"),
            }
        }
        Commands::Preview { input } => {
            let settings = Settings::load_or_init()?;
            let record = export::load_record(&input)?;
            if !record.can_preview() {
                return Err(AppError::IncompleteRecord(
                    "customer name and every service description are required".to_string(),
                ));
            }
            println!("{}", render_preview(&record, record.total(), &settings.document_style()));
        }
        Commands::Config => {
            wizard::setup_config_wizard(&config::config_path())?;
        }
    }
    Ok(())
}

fn destination(settings: &Settings, dialog: bool, out_dir: Option<PathBuf>) -> Destination {
    if dialog {
        Destination::Dialog
    } else {
        Destination::Directory(out_dir.unwrap_or_else(|| settings.output_path()))
    }
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(format!("/select,{}", path.to_string_lossy())).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}
