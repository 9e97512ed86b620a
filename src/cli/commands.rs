use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use std::path::PathBuf;

pub const DEFAULT_NODE: &str = "127.0.0.1:5000";

#[derive(Debug, Parser)]
#[command(name = "peer-ledger")]
pub struct Opt {
    #[arg(
        long = "keystore",
        global = true,
        help = "Wallet keystore file (overrides LEDGER_KEYSTORE)"
    )]
    pub keystore: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(long, help = "Port to listen on (overrides LEDGER_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "IPv4 address neighbors reach this node at (overrides LEDGER_HOST)")]
        host: Option<Ipv4Addr>,
        #[arg(
            long,
            help = "Send mining rewards to ADDRESS instead of a fresh keystore wallet"
        )]
        miner: Option<String>,
        #[arg(
            long = "peer",
            help = "Static neighbor HOST:PORT; repeat for more. Disables range scanning"
        )]
        peers: Vec<String>,
        #[arg(long = "no-mining", help = "Serve and sync without mining")]
        no_mining: bool,
    },
    #[command(name = "createwallet", about = "Create a new wallet")]
    Createwallet,
    #[command(name = "listaddresses", about = "Print local wallet addresses")]
    ListAddresses,
    #[command(name = "showwallet", about = "Print a wallet's keys and address as JSON")]
    ShowWallet {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "send", about = "Sign a transaction and submit it to a node")]
    Send {
        #[arg(help = "Source wallet address")]
        from: String,
        #[arg(help = "Destination wallet address")]
        to: String,
        #[arg(help = "Amount to send")]
        amount: f64,
        #[arg(long, default_value = DEFAULT_NODE, help = "Node to submit to")]
        node: String,
    },
    #[command(
        name = "getbalance",
        about = "Get the balance of the target address from a node"
    )]
    GetBalance {
        #[arg(help = "The wallet address")]
        address: String,
        #[arg(long, default_value = DEFAULT_NODE, help = "Node to query")]
        node: String,
    },
    #[command(name = "printchain", about = "Print all blocks held by a node")]
    Printchain {
        #[arg(long, default_value = DEFAULT_NODE, help = "Node to query")]
        node: String,
    },
    #[command(name = "mine", about = "Ask a node to mine a block now")]
    Mine {
        #[arg(long, default_value = DEFAULT_NODE, help = "Node to ask")]
        node: String,
    },
    #[command(name = "consensus", about = "Ask a node to resolve conflicts now")]
    Consensus {
        #[arg(long, default_value = DEFAULT_NODE, help = "Node to ask")]
        node: String,
    },
}
