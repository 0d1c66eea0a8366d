pub mod menu;
pub mod output;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::warn;

use wifiscan::nm::NmAdapter;
use wifiscan::probe::IcmpProbeSender;
use wifiscan::{Finder, LineInput, ScanConfig, Subnet};

#[derive(Parser, Debug)]
#[command(name = "wifiscan")]
#[command(version, about = "Join Wi-Fi networks and find the hosts on them")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Upper bound on probes in flight during a scan
    #[arg(long, value_name = "N", global = true)]
    max_in_flight: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List visible access points, strongest first
    List,
    /// Show whether this host is connected
    Status,
    /// Scan a subnet ("a.b.c.", an address or a /24 CIDR); defaults to the local one
    Scan { subnet: Option<Subnet> },
    /// Join every network with a stored profile and scan each one
    ConnectAll,
    /// Make sure this host is connected, then scan its subnet
    Discover,
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let adapter = NmAdapter::new()
        .await
        .context("cannot reach NetworkManager on the system bus")?;
    match adapter.has_wifi_device().await {
        Ok(true) => {}
        Ok(false) => eprintln!("Warning: no wireless adapter found, connection commands will fail."),
        Err(e) => warn!("Could not enumerate devices: {e}"),
    }

    let probe = IcmpProbeSender::new()
        .context("cannot open an ICMP socket (check net.ipv4.ping_group_range)")?;

    let mut config = ScanConfig::new();
    if let Some(limit) = args.max_in_flight {
        config = config.with_max_in_flight(limit);
    }
    let finder = Finder::new(adapter, probe).with_config(config);
    let mut input = LineInput::stdio();

    let Some(command) = args.command else {
        return menu::run(&finder, &mut input).await;
    };

    let json = args.json;
    match command {
        Command::List => {
            let list = finder.list_access_points().await?;
            output::emit(&list, json, || output::access_points(&list))?;
        }
        Command::Status => {
            let status = finder.status().await?;
            output::emit(&status, json, || status.to_string())?;
        }
        Command::Scan { subnet } => {
            let subnet = match subnet {
                Some(subnet) => subnet,
                None => finder.local_subnet()?,
            };
            let result = finder.scan(&subnet).await;
            output::emit(&result, json, || output::scan_result(&result))?;
        }
        Command::ConnectAll => {
            let report = finder.connect_all().await?;
            output::emit(&report, json, || output::auto_connect_report(&report))?;
        }
        Command::Discover => {
            let result = finder.discover(&mut input).await?;
            output::emit(&result, json, || output::scan_result(&result))?;
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
