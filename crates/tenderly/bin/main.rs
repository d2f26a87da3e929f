use clap::{Args, Parser, Subcommand};
use oval_tenderly::{ForkParams, ForkTarget, SimulationParams, Tenderly};
use oval_utils::{
    config::Config,
    log::{config::LogConfig, error},
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Console log level, overrides the `log` config section.
    #[arg(short, long, global = true)]
    level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage forks.
    #[command(subcommand)]
    Fork(ForkCommand),
    /// Simulate a single transaction.
    Simulate(SimulateArgs),
}

#[derive(Subcommand, Debug)]
enum ForkCommand {
    Create {
        #[arg(long)]
        chain_id: u64,
        #[arg(long)]
        block_number: Option<u64>,
        #[arg(long, requires = "block_number")]
        tx_index: Option<u64>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Get {
        id: String,
    },
    /// Make the fork public and print its dashboard URL.
    Share {
        id: String,
    },
    Unshare {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Set an account balance in wei and print the new fork head.
    SetBalance {
        id: String,
        address: String,
        wei: String,
    },
    /// Find a fork by its exact description.
    Find {
        description: String,
    },
    /// Label a simulation that ran on a fork.
    Describe {
        fork_id: String,
        simulation_id: String,
        description: String,
    },
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long)]
    chain_id: u64,
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    input: Option<String>,
    #[arg(long)]
    value: Option<String>,
    /// Block timestamp override, in seconds.
    #[arg(long)]
    timestamp: Option<u64>,
    /// Fork to simulate on.
    #[arg(long)]
    fork: Option<String>,
    /// Earlier simulation on the same fork to start from.
    #[arg(long, requires = "fork")]
    root: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl From<SimulateArgs> for SimulationParams {
    fn from(args: SimulateArgs) -> Self {
        Self {
            chain_id: args.chain_id,
            to: args.to,
            input: args.input,
            value: args.value,
            from: args.from,
            timestamp_override: args.timestamp,
            fork: args.fork.map(|id| ForkTarget {
                id,
                root: args.root,
            }),
            description: args.description,
        }
    }
}

async fn run(tenderly: Tenderly, command: Command) -> eyre::Result<serde_json::Value> {
    let forks = &tenderly.forks;
    let output = match command {
        Command::Fork(ForkCommand::Create {
            chain_id,
            block_number,
            tx_index,
            alias,
            description,
        }) => {
            let params = ForkParams {
                chain_id,
                block_number,
                tx_index,
                alias,
                description,
            };
            serde_json::to_value(forks.create(&params).await?)?
        }
        Command::Fork(ForkCommand::Get { id }) => serde_json::to_value(forks.get(&id).await?)?,
        Command::Fork(ForkCommand::Share { id }) => json!({ "url": forks.share(&id).await? }),
        Command::Fork(ForkCommand::Unshare { id }) => {
            forks.unshare(&id).await?;
            json!({ "id": id, "shared": false })
        }
        Command::Fork(ForkCommand::Delete { id }) => {
            forks.delete(&id).await?;
            json!({ "id": id, "deleted": true })
        }
        Command::Fork(ForkCommand::SetBalance { id, address, wei }) => {
            json!({ "headId": forks.set_balance(&id, &address, &wei).await? })
        }
        Command::Fork(ForkCommand::Find { description }) => {
            serde_json::to_value(forks.find_by_description(&description).await?)?
        }
        Command::Fork(ForkCommand::Describe {
            fork_id,
            simulation_id,
            description,
        }) => {
            forks
                .set_simulation_description(&fork_id, &simulation_id, &description)
                .await?;
            json!({ "id": simulation_id, "description": description })
        }
        Command::Simulate(args) => {
            let params = SimulationParams::from(args);
            serde_json::to_value(tenderly.simulator.simulate(&params).await?)?
        }
    };
    Ok(output)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse();

    let logging = LogConfig::load_or_default()
        .map_err(eyre::Report::from)
        .and_then(|cfg| Ok(cfg.with_console_level(args.level).init()?));
    if let Err(e) = logging {
        eprintln!("failed to set up logging: {:#}", e);
        std::process::exit(1);
    }

    let result = async {
        let tenderly = Tenderly::from_env()?;
        let output = run(tenderly, args.command).await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        eyre::Result::<()>::Ok(())
    }
    .await;

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
