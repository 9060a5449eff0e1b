mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use fiche_core::catalog::CatalogLayout;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fiche",
    version,
    about = "Rename supplier technical sheets after the catalog products they describe"
)]
struct Cli {
    /// Log per-document and per-code detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract product codes from every PDF of the input directory into the ledger
    Extract {
        /// Directory holding the sheets to process
        #[arg(short, long, default_value = "A Fiches techniques a traiter")]
        input: PathBuf,

        /// Ledger file to write
        #[arg(short, long, default_value = "ean_codes.csv")]
        ledger: PathBuf,

        #[command(flatten)]
        rules: RulesArgs,

        /// Text backend: pdftotext (default) or lopdf
        #[arg(short, long, default_value = "pdftotext")]
        backend: String,

        /// Take `12345.pdf` / `123456.pdf` as a sheet of this vendor without reading it
        #[arg(long, value_name = "VENDOR", num_args = 0..=1, default_missing_value = "AUTOBEST")]
        filename_codes: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Copy each ledger row's sheet under its catalog product names
    Rename {
        /// Ledger file written by `fiche extract`
        #[arg(short, long, default_value = "ean_codes.csv")]
        ledger: PathBuf,

        /// Product catalog spreadsheet
        #[arg(short, long, default_value = "FICHIER GENERAL.xlsx")]
        catalog: PathBuf,

        /// Directory holding the sheets named in the ledger
        #[arg(short, long, default_value = "A Fiches techniques a traiter")]
        input: PathBuf,

        /// Directory receiving the renamed sheets (created if missing)
        #[arg(short, long, default_value = "B Fiches techniques traitees")]
        dest: PathBuf,

        #[command(flatten)]
        rules: RulesArgs,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Extract embedded images as PNG files
    Images {
        /// Directory holding the sheets
        #[arg(short, long, default_value = "A Fiches techniques a traiter")]
        input: PathBuf,

        /// Directory receiving `<stem>-<n>.png` files
        #[arg(short, long, default_value = "extracted_images")]
        dest: PathBuf,

        /// Only process files whose name starts with this (case-insensitive, empty for all)
        #[arg(short, long, default_value = "R")]
        prefix: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show the structure of a PDF: metadata, pages, text preview, images
    Inspect {
        /// PDF to inspect (asked for when omitted)
        input_file: Option<PathBuf>,

        /// Text backend: pdftotext (default) or lopdf
        #[arg(short, long, default_value = "pdftotext")]
        backend: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate vendor rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List the built-in vendor rules
    List,
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
}

#[derive(Args)]
struct RulesArgs {
    /// Custom JSON vendor rule file (default: built-in rules)
    #[arg(short, long = "rules", value_name = "FILE")]
    rules: Option<PathBuf>,
}

/// Catalog spreadsheet positions, 0-based as in the sheet's row/column index.
#[derive(Args)]
struct LayoutArgs {
    /// Row holding the column headers; data starts on the next row
    #[arg(long, default_value_t = 6)]
    header_row: u32,

    /// Column of the product name
    #[arg(long, default_value_t = 3)]
    name_col: u32,

    /// Column of the EAN-13 code
    #[arg(long, default_value_t = 4)]
    ean_col: u32,

    /// Column of the supplier reference
    #[arg(long, default_value_t = 5)]
    reference_col: u32,

    /// Column of the brand
    #[arg(long, default_value_t = 6)]
    brand_col: u32,
}

impl From<LayoutArgs> for CatalogLayout {
    fn from(args: LayoutArgs) -> Self {
        CatalogLayout {
            header_row: args.header_row,
            product_name_col: args.name_col,
            ean_col: args.ean_col,
            supplier_reference_col: args.reference_col,
            brand_col: args.brand_col,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,fiche_core=debug,fiche=debug"
    } else {
        "warn,fiche_core=info,fiche=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            input,
            ledger,
            rules,
            backend,
            filename_codes,
            output,
        } => commands::extract::run(&input, &ledger, rules.rules, &backend, filename_codes, &output),
        Commands::Rename {
            ledger,
            catalog,
            input,
            dest,
            rules,
            layout,
            output,
        } => commands::rename::run(
            &ledger,
            &catalog,
            &input,
            &dest,
            rules.rules,
            &layout.into(),
            &output,
        ),
        Commands::Images {
            input,
            dest,
            prefix,
            output,
        } => commands::images::run(&input, &dest, &prefix, &output),
        Commands::Inspect {
            input_file,
            backend,
            output,
        } => commands::inspect::run(input_file, &backend, &output),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
