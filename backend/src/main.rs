//! Starload CLI - build the star schema for one project directory
//!
//! ```bash
//! starload                              # uses ./data and ./output
//! starload --project-root /srv/retail   # explicit root
//! STARLOAD_PROJECT_ROOT=/srv/retail starload
//! ```
//!
//! Progress goes to stderr; the run report JSON is printed to stdout.

use std::path::PathBuf;

use clap::Parser;
use starload::logs::{log_error, log_success};
use starload::{run_pipeline, PipelineOptions};

#[derive(Parser)]
#[command(name = "starload")]
#[command(about = "Transform raw retail CSV extracts into a validated star schema", long_about = None)]
struct Cli {
    /// Directory containing data/raw and data/reference; output/ is written here
    #[arg(long, env = "STARLOAD_PROJECT_ROOT", default_value = ".")]
    project_root: PathBuf,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let options = PipelineOptions {
        project_root: cli.project_root,
    };

    if let Err(e) = run(&options) {
        log_error("Pipeline aborted");
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(options: &PipelineOptions) -> Result<(), Box<dyn std::error::Error>> {
    let report = run_pipeline(options)?;

    log_success(format!(
        "Loaded {} curated tables (run {})",
        report.outputs.len(),
        report.run_id
    ));
    println!("{}", serde_json::to_string_pretty(&report)?);

    eprintln!("\n✨ Done!");
    Ok(())
}
