// This is my main entry point for the ledger CLI application
// One binary does both jobs: `startnode` runs a node, everything else is a wallet client
use clap::Parser;
use log::{error, info, LevelFilter};
use peer_ledger::network::{discovery_from_config, BackgroundTasks, PeerClient, Request, Response};
use peer_ledger::{
    validate_address, Command, Config, Ledger, Opt, Server, TcpPeerClient, Wallets,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

fn main() {
    // Info level shows every mining round and consensus decision without drowning in scan attempts
    // RUST_LOG still wins when set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    // If something goes wrong, I log the error and exit with code 1
    if let Err(e) = run_command(opt.keystore, opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(keystore: Option<PathBuf>, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    // The environment gives me defaults, flags win over it
    let mut config = Config::from_env()?;
    if let Some(path) = keystore {
        config.keystore_path = path;
    }

    match command {
        Command::StartNode {
            port,
            host,
            miner,
            peers,
            no_mining,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            config.static_peers = peers;
            config.mining_enabled = !no_mining;
            config.validate()?;

            // Rewards go to --miner if given, otherwise to a keystore wallet
            let miner_address = match miner {
                Some(address) => {
                    if !validate_address(&address) {
                        return Err(format!("Invalid miner address: {address}").into());
                    }
                    address
                }
                None => {
                    let mut wallets = Wallets::load(&config.keystore_path)?;
                    match wallets.get_addresses().into_iter().next() {
                        Some(address) => address,
                        None => wallets.create_wallet()?,
                    }
                }
            };
            info!("Mining rewards go to {miner_address}");

            let peer_client = Arc::new(TcpPeerClient::new(config.peer_timeout));
            let ledger = Arc::new(Ledger::new(&miner_address, config.port, peer_client)?);
            info!("Node address {}", config.node_addr());

            let tasks = BackgroundTasks::start(
                Arc::clone(&ledger),
                discovery_from_config(&config),
                &config,
            );

            let server = Server::new(ledger);
            if let Err(e) = server.run(&config.listen_addr()) {
                tasks.stop();
                return Err(format!("Server error: {e}").into());
            }
            tasks.stop();
        }
        Command::Createwallet => {
            let mut wallets = Wallets::load(&config.keystore_path)?;
            let address = wallets.create_wallet()?;
            println!("Your new address: {address}")
        }
        Command::ListAddresses => {
            let wallets = Wallets::load(&config.keystore_path)?;
            for address in wallets.get_addresses() {
                println!("{address}")
            }
        }
        Command::ShowWallet { address } => {
            let wallets = Wallets::load(&config.keystore_path)?;
            let wallet = wallets
                .get_wallet(&address)
                .ok_or_else(|| format!("No wallet for {address} in the keystore"))?;
            println!("{}", serde_json::to_string_pretty(&wallet.to_json_summary())?);
        }
        Command::Send {
            from,
            to,
            amount,
            node,
        } => {
            if !validate_address(&to) {
                return Err(format!("Invalid recipient address: {to}").into());
            }
            if !amount.is_finite() || amount < 0.0 {
                return Err("Amount must be a non-negative number".into());
            }

            let wallets = Wallets::load(&config.keystore_path)?;
            let wallet = wallets
                .get_wallet(&from)
                .ok_or_else(|| format!("No wallet for {from} in the keystore"))?;

            let transaction = wallet.sign_transaction(&to, amount)?;
            let client = TcpPeerClient::new(config.peer_timeout);
            let response = client.call(&node, &Request::SubmitTransaction { transaction })?;
            if !response.is_success() {
                return Err(format!("{node} rejected the transaction").into());
            }
            println!("Success!")
        }
        Command::GetBalance { address, node } => {
            let client = TcpPeerClient::new(config.peer_timeout);
            let request = Request::GetBalance {
                blockchain_address: address.clone(),
            };
            match client.call(&node, &request)? {
                Response::Amount { amount } => println!("Balance of {address}: {amount}"),
                other => return Err(format!("Unexpected response from {node}: {other:?}").into()),
            }
        }
        Command::Printchain { node } => {
            let client = TcpPeerClient::new(config.peer_timeout);
            let chain = client.fetch_chain(&node)?;
            for (height, block) in chain.iter().enumerate() {
                println!("Block {height}");
                println!("Pre block hash: {}", block.get_previous_hash_hex());
                println!("Cur block hash: {}", block.hash_hex());
                println!("Cur block Timestamp: {}", block.get_timestamp());
                println!("Nonce: {}", block.get_nonce());
                for tx in block.get_transactions() {
                    println!(
                        "- {} -> {}: {}",
                        tx.get_sender(),
                        tx.get_recipient(),
                        tx.get_value()
                    );
                }
                println!()
            }
        }
        Command::Mine { node } => {
            let client = TcpPeerClient::new(config.peer_timeout);
            print_status(&node, client.call(&node, &Request::Mine)?)?;
        }
        Command::Consensus { node } => {
            let client = TcpPeerClient::new(config.peer_timeout);
            print_status(&node, client.call(&node, &Request::Consensus)?)?;
        }
    }
    Ok(())
}

fn print_status(node: &str, response: Response) -> Result<(), Box<dyn std::error::Error>> {
    match response {
        Response::Status { message } => {
            println!("{node}: {message}");
            Ok(())
        }
        other => Err(format!("Unexpected response from {node}: {other:?}").into()),
    }
}
