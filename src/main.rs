use std::net::{IpAddr, UdpSocket};
use std::sync::Arc;
use tokio::sync::Notify;

use quickserve::config::{Config, TunnelConfig};
use quickserve::share::ShareRoot;
use quickserve::state::AppState;
use quickserve::{logger, server, tunnel};

enum Cli {
    Run { config_path: String },
    InitConfig,
    Help,
    Version,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match parse_args(std::env::args().skip(1))? {
        Cli::Help => {
            print_usage();
            Ok(())
        }
        Cli::Version => {
            println!("quickserve {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Cli::InitConfig => {
            Config::write_default("config.toml")?;
            println!("Wrote default configuration to config.toml");
            Ok(())
        }
        Cli::Run { config_path } => {
            let cfg = Config::load_from(&config_path)?;
            cfg.validate()?;
            logger::init(&cfg.logging)?;

            let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
            runtime_builder.enable_all();
            if cfg.server.workers > 0 {
                runtime_builder.worker_threads(cfg.server.workers);
            }
            let runtime = runtime_builder.build()?;

            runtime.block_on(async_main(cfg))
        }
    }
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let root_path = cfg.prepare_share_root()?;
    let root = ShareRoot::new(&root_path)
        .map_err(|e| format!("share root {}: {e}", root_path.display()))?;

    // Bind before anything else so a taken port fails immediately.
    let listener = server::create_listener(addr)
        .map_err(|e| format!("could not listen on {addr}: {e}"))?;
    let bound_addr = listener.local_addr()?;

    logger::log_startup(&bound_addr, &cfg, lan_ip());

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    if cfg.tunnel.enabled {
        spawn_tunnel(cfg.tunnel.clone(), bound_addr.port(), Arc::clone(&shutdown));
    }

    let state = Arc::new(AppState::new(cfg, root));
    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}

/// Run the tunnel in the background. Tunnel failures are warnings; the
/// server keeps serving locally without one.
fn spawn_tunnel(config: TunnelConfig, port: u16, shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match tunnel::start_tunnel(&config, port).await {
            Ok((url, handle)) => {
                logger::log_tunnel_url(&url);
                shutdown.notified().await;
                handle.shutdown();
            }
            Err(err) => logger::log_tunnel_warning(&err.to_string()),
        }
    });
}

/// Best-effort LAN address discovery through a connected UDP socket.
/// No packet is sent; connect only picks the outbound interface.
fn lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|a| a.ip())
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut config_path = None;
    for arg in args {
        match arg.as_str() {
            "--init-config" => return Ok(Cli::InitConfig),
            "-h" | "--help" => return Ok(Cli::Help),
            "-V" | "--version" => return Ok(Cli::Version),
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            other => {
                if config_path.is_some() {
                    return Err("more than one config path given".to_string());
                }
                config_path = Some(other.to_string());
            }
        }
    }
    Ok(Cli::Run {
        config_path: config_path.unwrap_or_else(|| "config".to_string()),
    })
}

fn print_usage() {
    println!("Usage: quickserve [OPTIONS] [CONFIG]");
    println!();
    println!("Arguments:");
    println!("  CONFIG          Config file path without extension (default: config)");
    println!();
    println!("Options:");
    println!("  --init-config   Write config.toml with defaults and exit");
    println!("  -h, --help      Show this help");
    println!("  -V, --version   Show version");
}
