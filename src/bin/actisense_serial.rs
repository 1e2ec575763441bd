//! `actisense-serial`: bridges an Actisense NGT-1 gateway (serial or
//! `tcp://host:port`) to the canonical line-oriented text format on
//! stdout, and optionally relays lines from stdin back out to the device.
use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{error, info, warn};

use canboat_n2k::error::AppError;
use canboat_n2k::frame::ngt1::{self, Event};
use canboat_n2k::logging;
use canboat_n2k::rawline::{self, Dialect};

#[derive(Parser, Debug)]
#[command(name = "actisense-serial", about = "Bridge an Actisense NGT-1 gateway")]
struct Args {
    #[arg(short = 'r')]
    read_only: bool,
    #[arg(short = 'w')]
    write_only: bool,
    #[arg(short = 's', long = "baud", default_value_t = 115_200)]
    baud: u32,
    #[arg(short = 't', long = "timeout", default_value_t = 0)]
    timeout_secs: u64,
    #[arg(short = 'd', long)]
    verbose: bool,
    #[arg(short = 'q', long)]
    quiet: bool,
    device: String,
}

enum Link {
    Serial(tokio_serial::SerialStream),
    Tcp(tokio::net::TcpStream),
}

impl Link {
    async fn open(device: &str, baud: u32) -> std::io::Result<Self> {
        if let Some(addr) = device.strip_prefix("tcp://") {
            Ok(Link::Tcp(tokio::net::TcpStream::connect(addr).await?))
        } else {
            let stream = tokio_serial::new(device, baud).open_native_async()?;
            Ok(Link::Serial(stream))
        }
    }
}

fn format_plain_line(msg: &ngt1::N2kMessage) -> String {
    let hex: Vec<String> = msg.data.iter().map(|b| format!("{b:02X}")).collect();
    format!(
        "{},{},{},{},255,{},{}",
        Utc::now().to_rfc3339(),
        msg.priority,
        msg.pgn,
        msg.src,
        msg.data.len(),
        hex.join(",")
    )
}

async fn run() -> Result<(), AppError> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    let link = Link::open(&args.device, args.baud)
        .await
        .map_err(AppError::Io)?;

    match link {
        Link::Serial(stream) => bridge(stream, &args).await,
        Link::Tcp(stream) => bridge(stream, &args).await,
    }
}

async fn bridge<S>(stream: S, args: &Args) -> Result<(), AppError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut decoder = ngt1::Decoder::new();

    let write_only = args.write_only;
    let read_only = args.read_only;

    let writer_task = if !read_only {
        Some(tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let mut lines = tokio::io::BufReader::new(stdin).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let dialect = rawline::detect(&line).unwrap_or(Dialect::PlainOrFast);
                let Ok(raw) = rawline::parse(dialect, &line) else {
                    continue;
                };
                let frame = ngt1::encode_n2k_send(raw.priority, raw.pgn, raw.dst, &raw.data);
                if write_half.write_all(&frame).await.is_err() {
                    break;
                }
            }
        }))
    } else {
        None
    };

    if write_only {
        if let Some(task) = writer_task {
            let _ = task.await;
        }
        return Ok(());
    }

    let mut byte = [0u8; 1];
    loop {
        let n = match reader.read(&mut byte).await {
            Ok(0) => {
                warn!("device closed connection");
                return Err(AppError::Fatal("EOF on gateway serial device".into()));
            }
            Ok(n) => n,
            Err(e) => {
                error!("read error: {e}");
                return Err(AppError::Io(e));
            }
        };
        if n == 0 {
            continue;
        }
        match decoder.feed(byte[0]) {
            Ok(Some(Event::N2kReceived(msg))) => {
                println!("{}", format_plain_line(&msg));
            }
            Ok(Some(Event::NgtReceived { pgn, .. })) => {
                info!("device status message (synthetic pgn {pgn:#x})");
            }
            Ok(Some(Event::EblTimestamp(_))) | Ok(None) => {}
            Err(e) => warn!("frame error: {e}"),
        }
    }
}

fn main() {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
    if let Err(e) = runtime.block_on(run()) {
        eprintln!("actisense-serial: {e}");
        std::process::exit(e.exit_code());
    }
}
