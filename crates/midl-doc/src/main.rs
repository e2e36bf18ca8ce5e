//! MIDL documentation tool
//!
//! USAGE:
//!   midl-doc parse <PATH>... [--out-dir DIR]
//!   midl-doc document --source <PATH>=<GROUP>... [--output DIR] [--doc-version V]
//!
//! EXAMPLES:
//!   midl-doc parse idl/cwcom.idl                         # writes idl/cwcom.idl.xml
//!   midl-doc document --source idl=CWCom/Interfaces      # writes out/CWCom/Interfaces/*.xml
//!   midl-doc -vv document --source idl=CW --output docs  # debug logging

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use midl_doc::{document_sources, parse_files, BatchReport, DocConfig, Source, DEFAULT_DOC_VERSION};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "midl-doc")]
#[command(version)]
#[command(about = "Generate XML documentation from MIDL sources")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write each file's syntax tree as XML
    Parse {
        /// MIDL files or directories to scan
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Directory for the XML files; defaults to next to each input
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Extension of MIDL files when scanning directories
        #[arg(long, default_value = "idl")]
        extension: String,
    },

    /// Write one XML document per interface and enum typedef
    Document {
        /// Input path and output group, e.g. `idl/cwcom=CWCom/Interfaces`
        #[arg(long = "source", required = true, value_name = "PATH=GROUP")]
        sources: Vec<Source>,

        /// Output root directory
        #[arg(long, default_value = "out")]
        output: PathBuf,

        /// Version recorded on every document
        #[arg(long, default_value = DEFAULT_DOC_VERSION)]
        doc_version: String,

        /// Extension of MIDL files when scanning directories
        #[arg(long, default_value = "idl")]
        extension: String,
    },
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn summarize(report: &BatchReport) -> ExitCode {
    for (path, err) in &report.skipped {
        error!("skipped {}: {}", path.display(), err);
    }
    for err in &report.rejected {
        error!("rejected: {}", err);
    }
    for (key, err) in &report.failed {
        error!("not written {}: {}", key, err);
    }

    println!(
        "{} processed, {} skipped, {} written",
        report.processed,
        report.skipped.len(),
        report.written
    );

    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(args.verbose))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", err);
    }

    let report = match args.command {
        Command::Parse {
            paths,
            out_dir,
            extension,
        } => parse_files(&paths, out_dir.as_deref(), &extension),
        Command::Document {
            sources,
            output,
            doc_version,
            extension,
        } => {
            let config = DocConfig::default()
                .with_output_root(output)
                .with_version(doc_version)
                .with_extension(&extension);
            document_sources(&sources, &config)
        }
    };

    summarize(&report)
}
