mod parse_html;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use larder_core::PropertyMapper;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Larder recipe scraper CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a recipe from a saved HTML file and print it as JSON
    ParseHtml {
        /// HTML file to read
        file: PathBuf,
        /// Scrapers to try, in order (default: $LARDER_SCRAPERS or json_ld,microdata)
        #[arg(long = "scraper", value_delimiter = ',')]
        scrapers: Vec<String>,
        /// Also log the raw and final records
        #[arg(long)]
        print: bool,
        /// Pretty-print logged records
        #[arg(long, env = "LARDER_PRINT_PRETTY")]
        pretty: bool,
    },
    /// List the fields kept by the standard mapping table
    Fields,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ParseHtml {
            file,
            scrapers,
            print,
            pretty,
        } => {
            parse_html::parse_html(&file, &scrapers, print, pretty)?;
        }
        Commands::Fields => {
            for field in PropertyMapper::standard().field_names() {
                println!("{}", field);
            }
        }
    }

    Ok(())
}
