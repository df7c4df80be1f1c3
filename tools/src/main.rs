use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use egts::{CodecOptions, Counters, Limits};
use glob::Pattern;
use trackery_tools::{
    decode_capture, format_decode_pretty, inspect_capture, parse_input, respond_capture,
    split_capture, InspectReport, SplitReport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "egts-tools",
    version,
    about = "EGTS capture inspection and decoding tools"
)]
struct Cli {
    /// Log codec decisions at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a capture into frames and report their offsets.
    Split {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Inspect frame headers, records and result codes.
    Inspect {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Decode frames into structured output.
    Decode {
        /// Path to the capture.
        capture: PathBuf,
        /// Treat the file as hex text.
        #[arg(long)]
        hex: bool,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Print the responses a platform would send, one hex frame per line.
    Respond {
        /// Path to the capture.
        capture: PathBuf,
        /// Treat the file as hex text.
        #[arg(long)]
        hex: bool,
        /// Last packet identifier issued before this capture.
        #[arg(long, default_value_t = 0)]
        packet_id: u16,
        /// Last record number issued before this capture.
        #[arg(long, default_value_t = 0)]
        record_number: u16,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Path to a capture file or a directory of captures.
    path: PathBuf,
    /// Treat files as hex text.
    #[arg(long)]
    hex: bool,
    /// Optional glob filter when scanning a directory.
    #[arg(long)]
    glob: Option<String>,
    /// Sort scanned captures.
    #[arg(long, value_enum)]
    sort: Option<CaptureSort>,
    /// Limit the number of scanned captures (after sorting).
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CaptureSort {
    Size,
    Name,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = CodecOptions::default();
    match cli.command {
        Command::Split { scan } => {
            for_each_capture(&scan, |bytes| {
                print_split_report(&split_capture(bytes, &Limits::default()));
                Ok(())
            })?;
        }
        Command::Inspect { scan } => {
            for_each_capture(&scan, |bytes| {
                for report in inspect_capture(bytes, &options) {
                    print_inspect_report(&report);
                }
                Ok(())
            })?;
        }
        Command::Decode {
            capture,
            hex,
            format,
        } => {
            let bytes = read_capture(&capture, hex)?;
            let report = decode_capture(&bytes, &options);
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&report));
                }
            }
        }
        Command::Respond {
            capture,
            hex: hex_input,
            packet_id,
            record_number,
        } => {
            let bytes = read_capture(&capture, hex_input)?;
            let counters = Counters::starting_at(packet_id, record_number);
            for response in respond_capture(&bytes, &options, &counters)? {
                println!("{}", hex::encode(response));
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_capture(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let raw = fs::read(path).with_context(|| format!("read capture {}", path.display()))?;
    parse_input(&raw, hex).with_context(|| format!("parse capture {}", path.display()))
}

fn for_each_capture(scan: &ScanArgs, mut visit: impl FnMut(&[u8]) -> Result<()>) -> Result<()> {
    if !scan.path.is_dir() {
        let bytes = read_capture(&scan.path, scan.hex)?;
        return visit(&bytes);
    }

    let mut entries = collect_capture_entries(&scan.path, scan.glob.as_deref())?;
    sort_entries(&mut entries, scan.sort);
    if let Some(limit) = scan.limit {
        entries.truncate(limit);
    }
    for entry in entries {
        let bytes = read_capture(&entry.path, scan.hex)?;
        println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
        visit(&bytes)?;
    }
    Ok(())
}

struct CaptureEntry {
    path: PathBuf,
    size: u64,
}

fn collect_capture_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<CaptureEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(CaptureEntry { path, size });
    }
    Ok(entries)
}

fn sort_entries(entries: &mut [CaptureEntry], sort: Option<CaptureSort>) {
    match sort {
        Some(CaptureSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        Some(CaptureSort::Name) | None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
}

fn print_split_report(report: &SplitReport) {
    println!(
        "{} frames in {} bytes",
        report.frames.len(),
        report.total_bytes
    );
    for span in &report.frames {
        println!("  @{}: {} bytes", span.offset, span.len);
    }
    if let Some(error) = &report.error {
        println!("error: {error}");
    }
    if let Some(bad) = &report.bad_data {
        println!("bad data: {} bytes at @{}", bad.len, bad.offset);
    }
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "frame @{} ({} bytes): {}",
        report.span.offset, report.span.len, report.result_code
    );
    if let Some(header) = &report.header {
        println!(
            "  packet_id: {} type: {} flags: 0x{:02x} skid: {} header: {} bytes",
            header.packet_id,
            header.packet_type,
            header.flags.raw(),
            header.security_key_id,
            header.header_length()
        );
        if let Some(routing) = &header.routing {
            println!(
                "  route: {} -> {} ttl {}",
                routing.peer_address, routing.recipient_address, routing.time_to_live
            );
        }
    }
    for record in &report.records {
        let object = record
            .object_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        println!(
            "  record {}: service {} -> {} object {}",
            record.record_number, record.source_service, record.recipient_service, object
        );
        for sub in &record.subrecords {
            let length = sub
                .length
                .map_or_else(|| "?".to_string(), |len| len.to_string());
            println!("    {} ({}): {} bytes", sub.kind, sub.tag, length);
        }
    }
    if let Some(error) = &report.error {
        println!("  error: {error}");
    }
}
