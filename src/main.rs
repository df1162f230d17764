use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use bytes::BytesMut;
use clap::{Parser, Subcommand};

use nasa_sniffer::analyser::PacketAnalyser;
use nasa_sniffer::constants::DEFAULT_HISTORY_CAPACITY;
use nasa_sniffer::logging::init_logger;
use nasa_sniffer::session::{AnalyserSink, LiveSession, Sink};
use nasa_sniffer::transport::{connect_with_backoff, SerialTransport, TcpTransport, Transport};
use nasa_sniffer::{decoder, persistence, reassembler};

#[derive(Parser)]
#[command(name = "nasa-sniffer")]
#[command(about = "A passive sniffer and decoder for the Samsung NASA HVAC field-bus protocol")]
struct Cli {
    /// Packet history ring capacity (§4.5).
    #[arg(long, global = true, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Bound the analyser's per-group packet retention; unbounded if unset (§4.4).
    #[arg(long, global = true)]
    retention: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture from a serial transport.
    Serial {
        #[arg(long)]
        port: String,
        #[arg(long, default_value = "9600")]
        baud: u32,
    },
    /// Capture from a TCP transport (bus-to-IP gateway).
    Tcp {
        #[arg(long)]
        host: String,
        #[arg(long)]
        port: u16,
    },
    /// Load a persisted capture into view mode and print the analyser report.
    Replay {
        #[arg(long)]
        file: String,
    },
}

const MAX_CONNECT_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let retention = cli.retention;
    match cli.command {
        Commands::Serial { port, baud } => {
            let transport = SerialTransport::new(port, baud);
            run_capture(transport, cli.history_capacity, retention).await
        }
        Commands::Tcp { host, port } => {
            let transport = TcpTransport::new(host, port);
            run_capture(transport, cli.history_capacity, retention).await
        }
        Commands::Replay { file } => run_replay(&file, retention).await,
    }
}

fn new_analyser(retention: Option<usize>) -> PacketAnalyser {
    match retention {
        Some(cap) => PacketAnalyser::with_retention(cap),
        None => PacketAnalyser::new(),
    }
}

async fn run_capture(
    mut transport: impl Transport + 'static,
    history_capacity: usize,
    retention: Option<usize>,
) -> Result<()> {
    connect_with_backoff(&mut transport, MAX_CONNECT_ATTEMPTS)
        .await
        .context("failed to connect transport")?;
    tracing::info!("transport connected");

    let session = LiveSession::with_capacity(history_capacity);
    session.start().await;

    let analyser = Arc::new(Mutex::new(new_analyser(retention)));
    session
        .register_sink(Arc::new(AnalyserSink(analyser.clone())) as Arc<dyn Sink>)
        .await;

    let mut buf = BytesMut::new();

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C received, shutting down");
                break;
            }
            chunk = transport.read() => {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::warn!(%e, "transport read failed");
                        continue;
                    }
                };
                buf.extend_from_slice(&chunk);

                let span = nasa_sniffer::util::logging::span_frame_processing("bus");
                let (frames, resyncs) = span.in_scope(|| reassembler::reassemble(&mut buf));

                for resync in resyncs {
                    tracing::warn!(skipped = resync.skipped, "reassembler resync");
                    session.report_resync(resync.skipped);
                }

                for frame in frames {
                    let raw = frame.to_vec();
                    match decoder::decode(frame) {
                        Ok(packet) => session.publish(packet).await,
                        Err(e) => {
                            tracing::warn!(%e, "decode error");
                            session.report_decode_error(e, raw);
                        }
                    }
                }
            }
        }
    }

    transport.close().await.ok();
    session.close().await;
    print_report(&analyser);
    Ok(())
}

async fn run_replay(path: &str, retention: Option<usize>) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading replay file {path}"))?;
    let packets = persistence::import(&json).context("parsing replay envelope")?;

    let session = LiveSession::from_history(packets);
    tracing::info!(count = session.history().await.len(), "loaded replay history");

    let analyser = Arc::new(Mutex::new(new_analyser(retention)));
    for packet in session.history().await {
        analyser.lock().unwrap().observe(packet);
    }

    print_report(&analyser);
    Ok(())
}

fn print_report(analyser: &Arc<Mutex<PacketAnalyser>>) {
    let analyser = analyser.lock().unwrap();
    let stats = analyser.stats();
    println!("--- capture report ---");
    println!("total packets: {}, distinct groups: {}", stats.total, stats.groups);

    for entry in analyser.report() {
        println!(
            "[{}x] {} (first {}, last {})",
            entry.count,
            entry.signature,
            entry.first_seen.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.last_seen.format("%Y-%m-%d %H:%M:%S%.3f"),
        );
        println!("    {}", entry.example_rendering);
        match entry.timestamps {
            Some(ts) => {
                if ts.len() > 1 {
                    println!("    seen at {} timestamps", ts.len());
                }
            }
            None => println!("    (too many to list)"),
        }
    }
}
