use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use enroute_ctl::{
    command_table,
    config::Config,
    logging,
    orchestration::Dispatcher,
    service::HttpTransport,
    utils::response::Reporter,
    CommandTable, Operation, Sequencer,
};

#[derive(Debug, Parser)]
#[command(name = "enroute-ctl")]
#[command(about = "Configure an Enroute standalone gateway through its REST API", long_about = None)]
struct Cli {
    /// Operation set to run
    #[arg(long, default_value = "show", value_name = "create | delete | show")]
    op: String,

    /// Dump every outgoing request before it is sent
    #[arg(long)]
    dbg: bool,

    /// Payload document (YAML); built-in defaults are used when omitted
    #[arg(short, long)]
    conf: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.conf.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    logging::init_env_logger(&config.log, cli.dbg);

    let table = match cli.op.parse::<Operation>() {
        Ok(op) => {
            info!("Running operation {op} against {}", config.base());
            command_table(op, &config)
        }
        Err(msg) => {
            println!("{msg}");
            CommandTable::default()
        }
    };

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let dispatcher = Dispatcher::new(Arc::new(transport), Reporter::stdout());
    let mut sequencer = Sequencer::new(dispatcher);

    if let Err(e) = runtime.block_on(sequencer.run(table, cli.dbg)) {
        error!("Fatal: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
