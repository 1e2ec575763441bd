//! `n2kd`: multi-client fan-out server. Reads canonical raw lines from
//! stdin (typically piped from `actisense-serial`/`ikonvert-serial`),
//! decodes and rate-limits them, keeps a state map, and serves the result
//! to clients on three consecutive ports: `-p PORT` for one-shot JSON
//! dumps, `PORT+1` for a streaming JSON feed, `PORT+2` for derived NMEA
//! 0183 sentences.
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use canboat_n2k::catalog::lookup::{find_descriptor, find_fallback_descriptor};
use canboat_n2k::config::RenderContext;
use canboat_n2k::engine::decode::decode_pgn;
use canboat_n2k::error::AppError;
use canboat_n2k::logging;
use canboat_n2k::n2kd::nmea0183;
use canboat_n2k::n2kd::rate_limiter::RateLimiter;
use canboat_n2k::n2kd::server::Server;
use canboat_n2k::n2kd::state::StateKey;
use canboat_n2k::rawline::{self, Dialect};
use canboat_n2k::render;

#[derive(Parser, Debug)]
#[command(name = "n2kd", about = "Multi-client NMEA 2000 fan-out server")]
struct Args {
    #[arg(short = 'd', long)]
    verbose: bool,
    #[arg(short = 'q', long)]
    quiet: bool,
    /// Derive and forward NMEA 0183 sentences instead of decoded JSON.
    #[arg(short = 'o')]
    nmea_0183: bool,
    /// Raw pass-through mode: forward the undecoded line, no state/rate limiting.
    #[arg(short = 'r')]
    raw_passthrough: bool,
    #[arg(long = "src-filter", value_delimiter = ',')]
    src_filter: Vec<u8>,
    /// Rate limit NMEA 0183 derivation to one sentence per (src, kind) per second.
    #[arg(long = "rate-limit")]
    rate_limit: bool,
    #[arg(short = 'p', long, default_value_t = 2597)]
    port: u16,
}

/// Two-letter NMEA 0183 talker ID derived from a J1939 source address, per
/// `(src>>4)+'A', (src&0xF)+'A'` — so e.g. source 0 becomes "AA", source
/// 0x23 becomes "CD".
fn talker_id(src: u8) -> String {
    let hi = (src >> 4) + b'A';
    let lo = (src & 0xF) + b'A';
    String::from_utf8(vec![hi, lo]).expect("hi/lo are always in the printable ASCII range")
}

async fn run() -> Result<(), AppError> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    let server = Arc::new(Server::new());
    let serve_server = server.clone();
    let port = args.port;
    tokio::spawn(async move {
        if let Err(e) = serve_server.serve(port).await {
            tracing::error!("n2kd server stopped: {e}");
        }
    });

    let ctx = RenderContext::default();
    let state = server.state();
    let mut limiter = RateLimiter::new(Duration::from_secs(1));
    let mut dialect: Option<Dialect> = None;

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    while let Some(line) = lines.next_line().await.map_err(AppError::Io)? {
        if line.trim().is_empty() {
            continue;
        }

        if args.raw_passthrough {
            let _ = server.json_sender().send(Arc::from(format!("{line}\n")));
            continue;
        }

        let current_dialect = *dialect.get_or_insert_with(|| {
            rawline::detect(&line).unwrap_or(Dialect::PlainOrFast)
        });
        let raw = match rawline::parse(current_dialect, &line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed line: {e}");
                continue;
            }
        };

        if !args.src_filter.is_empty() && !args.src_filter.contains(&raw.src) {
            continue;
        }

        let descriptor = match find_descriptor(raw.pgn, &raw.data) {
            Some(descriptor) => descriptor,
            None => match find_fallback_descriptor(raw.pgn) {
                Some(descriptor) => descriptor,
                None => continue,
            },
        };
        let mut decoded = match decode_pgn(descriptor, &raw.data) {
            Ok(d) => d,
            Err(e) => {
                warn!("failed to decode PGN {}: {e}", raw.pgn);
                continue;
            }
        };
        decoded.pgn = raw.pgn;
        if descriptor.fallback && descriptor.pgn != raw.pgn {
            decoded.complete = false;
        }

        let now = Instant::now();
        {
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            state.insert(
                StateKey { pgn: raw.pgn, src: raw.src, secondary: None },
                raw.clone(),
                now,
            );
            state.prune(now);
        }

        if args.nmea_0183 {
            let Some(kind) = nmea0183::sentence_kind(decoded.pgn) else {
                continue;
            };
            if args.rate_limit && !limiter.allow(raw.src, kind, now) {
                continue;
            }
            if let Some(sentence) = nmea0183::derive(&talker_id(raw.src), &decoded) {
                let _ = server.nmea_sender().send(Arc::from(sentence.as_str()));
            }
        } else {
            let rendered = format!("{}\n", render::render(&ctx, &raw, &decoded));
            let _ = server.json_sender().send(Arc::from(rendered.as_str()));
        }
    }

    Ok(())
}

fn main() {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
    if let Err(e) = runtime.block_on(run()) {
        eprintln!("n2kd: {e}");
        std::process::exit(e.exit_code());
    }
}
