use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use somindel::genomics::{
    features::FEATURE_COLUMNS, render_header, IndelFeatures, SomaticIndelWriter, WriterEvent,
};
use somindel::{WriterOptions, DEFAULT_MAX_WINDOW_FILTERED_FRAC, DEFAULT_QSI_NT_LOWER_BOUND};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "somindel", about = "Write filtered somatic indel records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the header for a run.
    Header {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Replay a JSON Lines stream of call and window events into records.
    Emit {
        /// Event stream (`-` for stdin).
        events: PathBuf,
        /// Output file (default: stdout).
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Skip the header lines.
        #[arg(long)]
        no_header: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Flatten written records into a tab-separated feature table.
    Features {
        /// Records file (`-` for stdin).
        records: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Chromosome name written in the CHROM column.
    #[arg(long, default_value = "chr1")]
    chrom: String,
    /// Normal depth ceiling for the HighDepth filter.
    #[arg(long)]
    max_depth: Option<u32>,
    /// Filtered window basecall fraction that triggers IndelBCNoise.
    #[arg(long, default_value_t = DEFAULT_MAX_WINDOW_FILTERED_FRAC)]
    max_window_filtered_frac: f64,
    /// QSI_NT lower bound for the QSI_ref filter.
    #[arg(long, default_value_t = DEFAULT_QSI_NT_LOWER_BOUND)]
    qsi_nt_lower_bound: u32,
}

impl RunArgs {
    fn options(&self) -> WriterOptions {
        WriterOptions::new(self.chrom.as_str())
            .with_max_depth(self.max_depth)
            .with_max_window_filtered_frac(self.max_window_filtered_frac)
            .with_qsi_nt_lower_bound(self.qsi_nt_lower_bound)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Header { run } => {
            print!("{}", render_header(&run.options())?);
        }
        Commands::Emit {
            events,
            output,
            no_header,
            run,
        } => run_emit(events, output, no_header, run.options())?,
        Commands::Features { records } => run_features(records)?,
    }

    Ok(())
}

fn open_input(path: &PathBuf) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn run_emit(
    events_path: PathBuf,
    output: Option<PathBuf>,
    no_header: bool,
    options: WriterOptions,
) -> Result<()> {
    let reader = open_input(&events_path)?;
    let mut writer = SomaticIndelWriter::new(options, open_output(output.as_ref())?);
    if !no_header {
        writer.write_header().context("failed to write header")?;
    }

    let mut written = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: WriterEvent = serde_json::from_str(&line)
            .with_context(|| format!("invalid event on line {}", line_no + 1))?;
        written += writer
            .apply(event)
            .with_context(|| format!("failed to apply event on line {}", line_no + 1))?;
    }

    writer.finish().context("event stream ended with unflushed calls")?;
    info!(records = written, "finished writing somatic indel records");
    Ok(())
}

fn run_features(records_path: PathBuf) -> Result<()> {
    let reader = open_input(&records_path)?;
    let mut out = BufWriter::new(io::stdout());
    writeln!(out, "{}", FEATURE_COLUMNS.join("\t"))?;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let features = IndelFeatures::parse_line(&line)
            .with_context(|| format!("invalid record on line {}", line_no + 1))?;
        writeln!(out, "{}", features.to_tsv_row())?;
    }

    out.flush()?;
    Ok(())
}
