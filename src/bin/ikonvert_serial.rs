//! `ikonvert-serial`: bridges a Digital Yacht iKonvert gateway (serial or
//! `tcp://host:port`) to the canonical line-oriented text format, driving
//! the device's scripted initialization dialog first.
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, ReadHalf, WriteHalf};
use tokio_serial::SerialPortBuilderExt;
use tracing::{info, warn};

use canboat_n2k::error::AppError;
use canboat_n2k::frame::ikonvert::{self, Event, InitDialog};
use canboat_n2k::logging;

#[derive(Parser, Debug)]
#[command(name = "ikonvert-serial", about = "Bridge a Digital Yacht iKonvert gateway")]
struct Args {
    #[arg(short = 'r')]
    read_only: bool,
    #[arg(short = 'w')]
    write_only: bool,
    #[arg(long = "rx")]
    rx_pgns: Vec<u32>,
    #[arg(long = "tx")]
    tx_pgns: Vec<u32>,
    /// Use a scripted allow-list dialog (RX_LIST/TX_LIST) instead of ONLINE,ALL.
    #[arg(short = 'l')]
    use_allow_list: bool,
    /// Hex mode instead of Base64 for the binary payload (not implemented; logged and ignored).
    #[arg(short = 'x')]
    hex_mode: bool,
    #[arg(short = 's', long = "baud", default_value_t = 230_400)]
    baud: u32,
    #[arg(short = 't', long = "timeout", default_value_t = 0)]
    timeout_secs: u64,
    #[arg(long = "reset", default_value_t = 0)]
    reset_secs: u64,
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
            Ok(Link::Serial(tokio_serial::new(device, baud).open_native_async()?))
        }
    }
}

async fn run() -> Result<(), AppError> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);
    if args.hex_mode {
        warn!("-x hex mode is not implemented; continuing in Base64");
    }

    let link = Link::open(&args.device, args.baud).await.map_err(AppError::Io)?;
    match link {
        Link::Serial(stream) => bridge(stream, &args).await,
        Link::Tcp(stream) => bridge(stream, &args).await,
    }
}

/// Drives the scripted OFFLINE/…/ONLINE dialog to completion, writing each
/// command and waiting for the device's one-line acknowledgement before
/// sending the next. Used both for the initial handshake and to re-join the
/// bus after `needs_reinit` fires.
async fn drive_init_dialog<S>(
    write_half: &mut WriteHalf<S>,
    reader: &mut Lines<BufReader<ReadHalf<S>>>,
    args: &Args,
) -> Result<(), AppError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let has_allow_list = args.use_allow_list || !args.rx_pgns.is_empty() || !args.tx_pgns.is_empty();
    let mut dialog = InitDialog::new(has_allow_list, args.verbose, false);
    while !dialog.is_complete() {
        let Some(command) = dialog.next_command(has_allow_list) else {
            break;
        };
        write_half
            .write_all(command.as_bytes())
            .await
            .map_err(AppError::Io)?;
        // Any line from the device acknowledges the current step; a real
        // gateway replies with an echo or a status line before the next
        // prompt is safe to send.
        if reader.next_line().await.map_err(AppError::Io)?.is_none() {
            return Err(AppError::Fatal("EOF on gateway serial device".into()));
        }
        dialog.acknowledge();
    }
    info!("iKonvert initialization dialog complete");
    Ok(())
}

async fn bridge<S>(stream: S, args: &Args) -> Result<(), AppError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half).lines();
    let mut decoder = ikonvert::Decoder::new();

    if !args.write_only {
        drive_init_dialog(&mut write_half, &mut reader, args).await?;
    }

    if args.write_only {
        return Ok(());
    }

    loop {
        let Some(line) = reader.next_line().await.map_err(AppError::Io)? else {
            return Err(AppError::Fatal("EOF on gateway serial device".into()));
        };
        match decoder.parse_line(line.trim_end()) {
            Ok(Some(Event::Binary(msg))) => {
                let hex: Vec<String> = msg.data.iter().map(|b| format!("{b:02X}")).collect();
                println!(
                    "{},{},{},{},{},{},{}",
                    msg.timestamp_ms,
                    msg.priority,
                    msg.pgn,
                    msg.src,
                    msg.dst,
                    msg.data.len(),
                    hex.join(",")
                );
            }
            Ok(Some(Event::Status(text))) => {
                info!("device status: {text}");
                if decoder.needs_reinit() {
                    warn!(
                        "device appears to have reset after {} status-only messages; re-running init dialog",
                        ikonvert::STATUS_ONLY_RESET_THRESHOLD
                    );
                    decoder.reset_streak();
                    drive_init_dialog(&mut write_half, &mut reader, args).await?;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("frame error: {e}"),
        }
    }
}

fn main() {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
    if let Err(e) = runtime.block_on(run()) {
        eprintln!("ikonvert-serial: {e}");
        std::process::exit(e.exit_code());
    }
}
