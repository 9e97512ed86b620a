use crate::core::{Block, Ledger, Transaction, TransactionRequest};
use crate::error::{LedgerError, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Deserializer;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TCP_READ_TIMEOUT: u64 = 60;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAIL: &str = "fail";

/// Requests a node accepts. One request per connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    GetChain,
    GetTransactions,
    /// From a wallet; admitted transactions are relayed to neighbors
    SubmitTransaction {
        transaction: TransactionRequest,
    },
    /// From a neighbor; never relayed further
    RelayTransaction {
        transaction: TransactionRequest,
    },
    ClearTransactions,
    Mine,
    GetBalance {
        blockchain_address: String,
    },
    Consensus,
}

/// The full chain, oldest block first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEnvelope {
    pub chain: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Chain(ChainEnvelope),
    Transactions {
        transactions: Vec<Transaction>,
        length: usize,
    },
    Amount {
        amount: f64,
    },
    Status {
        message: String,
    },
}

impl Response {
    pub fn success() -> Response {
        Response::status(true)
    }

    pub fn fail() -> Response {
        Response::status(false)
    }

    pub fn status(ok: bool) -> Response {
        let message = if ok { STATUS_SUCCESS } else { STATUS_FAIL };
        Response::Status {
            message: message.to_string(),
        }
    }

    /// Data responses count as success; a status only if it says so
    pub fn is_success(&self) -> bool {
        match self {
            Response::Status { message } => message == STATUS_SUCCESS,
            _ => true,
        }
    }
}

/// Serves one ledger over JSON-over-TCP, a thread per connection
pub struct Server {
    ledger: Arc<Ledger>,
}

impl Server {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Bind `addr` and serve until the process exits. Failing to bind is an error.
    pub fn run(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| LedgerError::Network(format!("Failed to bind to {addr}: {e}")))?;
        info!("Server listening on {addr}");
        self.serve(listener);
        Ok(())
    }

    /// Accept loop over an already bound listener
    pub fn serve(&self, listener: TcpListener) {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer_addr = match stream.peer_addr() {
                        Ok(addr) => addr,
                        Err(e) => {
                            error!("Failed to get peer address: {e}");
                            continue;
                        }
                    };

                    let ledger = Arc::clone(&self.ledger);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(&ledger, stream, peer_addr) {
                            error!("Error handling connection from {peer_addr}: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }
    }

    fn handle_connection(ledger: &Ledger, stream: TcpStream, peer_addr: SocketAddr) -> Result<()> {
        stream
            .set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT)))
            .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;

        let reader = BufReader::new(&stream);
        let request = match Deserializer::from_reader(reader).into_iter::<Request>().next() {
            Some(Ok(request)) => request,
            Some(Err(e)) => {
                warn!("Malformed request from {peer_addr}: {e}");
                Self::write_response(&stream, &Response::fail())?;
                let _ = stream.shutdown(Shutdown::Both);
                return Err(LedgerError::Network(format!("Failed to deserialize request: {e}")));
            }
            None => {
                let _ = stream.shutdown(Shutdown::Both);
                return Ok(());
            }
        };

        info!("Received request from {peer_addr}: {request:?}");
        let response = handle_request(ledger, request);
        Self::write_response(&stream, &response)?;

        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }

    fn write_response(mut stream: &TcpStream, response: &Response) -> Result<()> {
        serde_json::to_writer(stream, response)
            .map_err(|e| LedgerError::Network(format!("Failed to send response: {e}")))?;
        let _ = stream.flush();
        Ok(())
    }
}

/// Dispatches one decoded request to the ledger
pub fn handle_request(ledger: &Ledger, request: Request) -> Response {
    match request {
        Request::GetChain => Response::Chain(ChainEnvelope {
            chain: ledger.get_chain(),
        }),
        Request::GetTransactions => {
            let transactions = ledger.get_transaction_pool();
            let length = transactions.len();
            Response::Transactions {
                transactions,
                length,
            }
        }
        Request::SubmitTransaction { transaction } => {
            Response::status(ledger.submit_transaction(&transaction))
        }
        Request::RelayTransaction { transaction } => {
            Response::status(ledger.relay_transaction(&transaction))
        }
        Request::ClearTransactions => {
            ledger.clear_transaction_pool();
            Response::success()
        }
        Request::Mine => Response::status(ledger.mine()),
        Request::GetBalance { blockchain_address } => Response::Amount {
            amount: ledger.calculate_balance(&blockchain_address),
        },
        Request::Consensus => Response::status(ledger.resolve_conflicts()),
    }
}
