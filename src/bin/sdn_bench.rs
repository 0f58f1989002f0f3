use clap::Parser;
use sdn_bench::config::{BandwidthMode, MissPolicy, PairPolicy, Readiness, RunConfig};
use sdn_bench::emu::{Emulator, NetnsEmulator, NetnsOpts};
use sdn_bench::error::{BenchError, Result};
use sdn_bench::session::run_session;
use sdn_bench::topo::{self, TopologyKind};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "sdn-bench",
    about = "Measure bandwidth, transfer time and RTT across an emulated SDN topology"
)]
struct Args {
    /// Topology: single, linear, tree (or 1, 2, 3); prompts when omitted
    #[arg(long)]
    topology: Option<String>,

    /// Run config JSON; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of hosts in the single topology (4 or 16)
    #[arg(long)]
    hosts: Option<usize>,

    /// Directory for <topology>_results.json
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// TCP bandwidth trial: duration (-t 3) or bytes (-n 2G)
    #[arg(long, value_parser = ["duration", "bytes"])]
    bandwidth_mode: Option<String>,

    /// iperf server port
    #[arg(long)]
    port: Option<u16>,

    /// Fixed pair for the packet-count sweep: auto, first_second or first_last
    #[arg(long, value_parser = ["auto", "first_second", "first_last"])]
    pair: Option<String>,

    /// Failed bandwidth parses: exclude or zero
    #[arg(long, value_parser = ["exclude", "zero"])]
    miss_policy: Option<String>,

    /// Fixed settle delay (ms) instead of polling the server's listening port
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Skip the connectivity check before the sweeps
    #[arg(long)]
    no_pingall: bool,

    /// Drop into the control shell after the sweeps
    #[arg(long)]
    cli: bool,

    /// Print the topology description as JSON and exit
    #[arg(long)]
    describe: bool,

    /// Run ip/kill through sudo
    #[arg(long)]
    sudo: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let cfg = match build_config(&args) {
        Ok(cfg) => cfg,
        Err(BenchError::InvalidTopologyKind(_)) => {
            println!("Invalid choice");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let kind = match cfg.topology {
        Some(kind) => Ok(kind),
        None => prompt_topology(),
    };
    let kind = match kind {
        Ok(kind) => kind,
        Err(BenchError::InvalidTopologyKind(_)) => {
            println!("Invalid choice");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let topology = topo::build(kind, &cfg.topo_opts());
    if args.describe {
        return match serde_json::to_string_pretty(&topology) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let emulator = NetnsEmulator::new(NetnsOpts {
        sudo: args.sudo,
        ..NetnsOpts::default()
    });
    let mut net = match emulator.instantiate(&topology) {
        Ok(net) => net,
        Err(e) => {
            error!(error = %e, "拓扑实例化失败");
            return ExitCode::FAILURE;
        }
    };

    let shell = args.cli.then(|| (io::stdin().lock(), io::stdout()));
    let outcome = run_session(net.as_ref(), &cfg, shell);
    if let Err(e) = net.stop() {
        error!(error = %e, "拆除网络失败");
    }

    match outcome {
        Ok(path) => {
            println!("results written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "运行失败");
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &Args) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    if let Some(raw) = &args.topology {
        cfg.topology = Some(raw.parse()?);
    }
    if let Some(hosts) = args.hosts {
        cfg.single_hosts = hosts;
    }
    if let Some(dir) = &args.out_dir {
        cfg.out_dir = dir.clone();
    }
    if let Some(mode) = args.bandwidth_mode.as_deref() {
        cfg.trial.bandwidth_mode = match mode {
            "bytes" => BandwidthMode::Bytes,
            _ => BandwidthMode::Duration,
        };
    }
    if let Some(port) = args.port {
        cfg.trial.port = port;
    }
    if let Some(pair) = args.pair.as_deref() {
        cfg.pair = match pair {
            "first_second" => PairPolicy::FirstSecond,
            "first_last" => PairPolicy::FirstLast,
            _ => PairPolicy::Auto,
        };
    }
    if let Some(policy) = args.miss_policy.as_deref() {
        cfg.miss_policy = match policy {
            "zero" => MissPolicy::Zero,
            _ => MissPolicy::Exclude,
        };
    }
    if let Some(ms) = args.settle_ms {
        cfg.trial.readiness = Readiness::Settle { ms };
    }
    if args.no_pingall {
        cfg.pingall = false;
    }

    cfg.validate()?;
    info!(?cfg, "运行配置");
    Ok(cfg)
}

fn prompt_topology() -> Result<TopologyKind> {
    let mut out = io::stdout();
    writeln!(out, "Select topology:")?;
    for kind in TopologyKind::ALL {
        writeln!(out, "{}. {}", kind.menu_number(), kind.display_name())?;
    }
    write!(out, "Enter choice (1-3): ")?;
    out.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    TopologyKind::from_choice(&line)
}
