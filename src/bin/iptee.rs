//! `iptee`: forwards stdin, line by line, to any number of TCP or UDP
//! sinks given as `host port` pairs. With `-w`, a sink that drops its
//! connection is retried in the background instead of being given up on.
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tracing::{error, warn};

use canboat_n2k::error::AppError;
use canboat_n2k::logging;

#[derive(Parser, Debug)]
#[command(name = "iptee", about = "Tee stdin to multiple TCP/UDP sinks")]
struct Args {
    /// Retry a dropped sink connection instead of abandoning it.
    #[arg(short = 'w')]
    retry: bool,
    #[arg(short = 'u')]
    udp: bool,
    #[arg(short = 't')]
    tcp: bool,
    #[arg(short = 's')]
    stream_mode: bool,
    #[arg(short = 'd', long)]
    verbose: bool,
    #[arg(short = 'q', long)]
    quiet: bool,
    /// Alternating host, port, host, port, …
    #[arg(trailing_var_arg = true)]
    targets: Vec<String>,
}

#[derive(Debug, Clone)]
struct Sink {
    host: String,
    port: u16,
}

fn parse_sinks(targets: &[String]) -> Result<Vec<Sink>, AppError> {
    if targets.len() % 2 != 0 {
        return Err(AppError::Usage("expected alternating host/port arguments".into()));
    }
    targets
        .chunks(2)
        .map(|pair| {
            let port: u16 = pair[1]
                .parse()
                .map_err(|_| AppError::Usage(format!("invalid port: {}", pair[1])))?;
            Ok(Sink { host: pair[0].clone(), port })
        })
        .collect()
}

async fn feed_tcp(sink: Sink, mut rx: mpsc::Receiver<String>, retry: bool) {
    loop {
        let addr = format!("{}:{}", sink.host, sink.port);
        let stream = match TcpStream::connect(&addr).await {
            Ok(s) => s,
            Err(e) => {
                error!("iptee: cannot connect to {addr}: {e}");
                if !retry {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
                continue;
            }
        };
        let mut stream = stream;
        loop {
            match rx.recv().await {
                Some(line) => {
                    if stream.write_all(line.as_bytes()).await.is_err() {
                        warn!("iptee: write failed to {addr}, reconnecting");
                        break;
                    }
                }
                None => return,
            }
        }
        if !retry {
            return;
        }
    }
}

async fn feed_udp(sink: Sink, mut rx: mpsc::Receiver<String>) {
    let addr = format!("{}:{}", sink.host, sink.port);
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            error!("iptee: cannot create UDP socket: {e}");
            return;
        }
    };
    while let Some(line) = rx.recv().await {
        if let Err(e) = socket.send_to(line.as_bytes(), &addr).await {
            warn!("iptee: UDP send to {addr} failed: {e}");
        }
    }
}

async fn run() -> Result<(), AppError> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);
    let udp = args.udp && !args.tcp;

    let sinks = parse_sinks(&args.targets)?;
    if sinks.is_empty() {
        return Err(AppError::Usage("at least one host/port pair is required".into()));
    }

    let mut senders = Vec::new();
    for sink in sinks {
        let (tx, rx) = mpsc::channel::<String>(256);
        senders.push(tx);
        if udp {
            tokio::spawn(feed_udp(sink, rx));
        } else {
            tokio::spawn(feed_tcp(sink, rx, args.retry));
        }
    }

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    while let Some(line) = lines.next_line().await.map_err(AppError::Io)? {
        let line = format!("{line}\n");
        for tx in &senders {
            let _ = tx.send(line.clone()).await;
        }
    }

    Ok(())
}

fn main() {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
    if let Err(e) = runtime.block_on(run()) {
        eprintln!("iptee: {e}");
        std::process::exit(e.exit_code());
    }
}
