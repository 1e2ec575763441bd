//! `analyzer`: stdin → stdout decoder. Reads any supported raw-line
//! dialect, reassembles Fast-Packet sequences, decodes against the static
//! catalog, and renders each complete message as configured.
use std::collections::HashMap;
use std::io::{BufRead, Write};

use clap::Parser;
use tracing::{error, warn};

use canboat_n2k::catalog::lookup::{find_descriptor, find_fallback_descriptor};
use canboat_n2k::config::{FieldNameCase, GeoFormat, OutputFormat, RenderContext};
use canboat_n2k::core::PgnType;
use canboat_n2k::engine::decode::decode_pgn;
use canboat_n2k::error::AppError;
use canboat_n2k::logging;
use canboat_n2k::rawline::{self, Dialect};
use canboat_n2k::render;
use canboat_n2k::render::clock::{self, ClockAdjuster, NoopAdjuster, SystemClockAdjuster};
use canboat_n2k::transport::can_frame::CanFrame;
use canboat_n2k::transport::can_id::CanId;
use canboat_n2k::transport::fastpacket::{FastPacketPool, Progress};

#[derive(Parser, Debug)]
#[command(name = "analyzer", about = "Decode NMEA 2000 raw lines from stdin")]
struct Args {
    #[arg(long = "json", default_value_t = true)]
    json: bool,
    #[arg(long = "empty")]
    empty: bool,
    #[arg(long = "nv")]
    name_value: bool,
    #[arg(long = "si")]
    si: bool,
    #[arg(long = "geo", value_enum, default_value_t = GeoFormat::Dd)]
    geo: GeoFormat,
    #[arg(long = "camel")]
    camel: bool,
    #[arg(long = "upper-camel")]
    upper_camel: bool,
    #[arg(long = "data")]
    data: bool,
    #[arg(long = "src")]
    src_filter: Option<u8>,
    #[arg(long = "dst")]
    dst_filter: Option<u8>,
    #[arg(short = 'd', long)]
    verbose: bool,
    #[arg(short = 'q', long)]
    quiet: bool,
    /// Restrict decoding to a single PGN.
    pgn_filter: Option<u32>,
    /// Source address of a PGN 126992 (System Time) transmitter to
    /// discipline the host clock to.
    #[arg(long = "clocksrc")]
    clocksrc: Option<u8>,
}

fn build_context(args: &Args) -> RenderContext {
    let mut ctx = RenderContext {
        format: if args.json { OutputFormat::Json } else { OutputFormat::Text },
        show_empty: args.empty,
        name_value: args.name_value,
        si_units: args.si,
        geo_format: args.geo,
        field_case: FieldNameCase::Original,
        include_raw_data: args.data,
        separator: ',',
    };
    if args.upper_camel {
        ctx.field_case = FieldNameCase::UpperCamel;
    } else if args.camel {
        ctx.field_case = FieldNameCase::Camel;
    }
    ctx
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);
    let ctx = build_context(&args);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut dialect: Option<Dialect> = None;
    let mut pools: HashMap<(u32, u8), FastPacketPool> = HashMap::new();
    let adjuster: Box<dyn ClockAdjuster> = if args.clocksrc.is_some() {
        Box::new(SystemClockAdjuster)
    } else {
        Box::new(NoopAdjuster)
    };

    for line in stdin.lock().lines() {
        let line = line.map_err(AppError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let dialect = *dialect.get_or_insert_with(|| {
            rawline::detect(&line).unwrap_or(Dialect::PlainOrFast)
        });

        let raw = match rawline::parse(dialect, &line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed line: {e}");
                continue;
            }
        };

        if let Some(pgn) = args.pgn_filter {
            if raw.pgn != pgn {
                continue;
            }
        }
        if let Some(src) = args.src_filter {
            if raw.src != src {
                continue;
            }
        }
        if let Some(dst) = args.dst_filter {
            if raw.dst != dst {
                continue;
            }
        }

        let descriptor = match find_descriptor(raw.pgn, &raw.data) {
            Some(descriptor) => descriptor,
            None => match find_fallback_descriptor(raw.pgn) {
                Some(descriptor) => descriptor,
                None => continue,
            },
        };

        let payload = if descriptor.pgn_type == PgnType::Fast && raw.data.len() <= 8 {
            let frame = CanFrame {
                id: CanId(raw.src as u32),
                data: {
                    let mut buf = [0u8; 8];
                    let n = raw.data.len().min(8);
                    buf[..n].copy_from_slice(&raw.data[..n]);
                    buf
                },
                len: raw.data.len().min(8),
            };
            let pool = pools.entry((raw.pgn, raw.src)).or_default();
            match pool.ingest(raw.pgn, &frame) {
                Ok(Progress::Complete { payload, .. }) => payload,
                Ok(Progress::Pending) => continue,
                Err(e) => {
                    error!("fast-packet reassembly error: {e}");
                    continue;
                }
            }
        } else {
            raw.data.clone()
        };

        match decode_pgn(descriptor, &payload) {
            Ok(mut decoded) => {
                decoded.pgn = raw.pgn;
                if descriptor.fallback && descriptor.pgn != raw.pgn {
                    decoded.complete = false;
                }
                if decoded.pgn == 126992 && clock::should_adjust(args.clocksrc, raw.src) {
                    if let Some(time) = clock::system_time(&decoded) {
                        if let Err(e) = adjuster.set_time(time) {
                            warn!("failed to adjust system clock: {e}");
                        }
                    }
                }
                let rendered = render::render(&ctx, &raw, &decoded);
                writeln!(out, "{rendered}").map_err(AppError::Io)?;
            }
            Err(e) => error!("failed to decode PGN {}: {e}", raw.pgn),
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("analyzer: {e}");
        std::process::exit(e.exit_code());
    }
}
