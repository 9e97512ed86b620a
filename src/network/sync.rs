// This file runs the node's two periodic jobs on their own threads:
// refreshing the neighbor set and mining
// Neither loop ever dies on an error - a failed round is logged and the next one runs

use crate::config::Config;
use crate::core::Ledger;
use crate::network::NeighborDiscovery;
use log::{info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Granularity at which sleeping loops notice shutdown
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

pub struct BackgroundTasks {
    ledger: Arc<Ledger>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Refreshes neighbors and resolves conflicts once before returning, so the
    /// node starts from the network's chain. Then starts the neighbor loop and,
    /// if enabled, the mining loop.
    pub fn start(
        ledger: Arc<Ledger>,
        discovery: Box<dyn NeighborDiscovery>,
        config: &Config,
    ) -> BackgroundTasks {
        ledger.set_neighbors(discovery.discover());
        if ledger.resolve_conflicts() {
            info!("Adopted a longer chain from the network at startup");
        }

        let mut handles = Vec::new();

        let neighbor_ledger = Arc::clone(&ledger);
        let interval = config.neighbor_sync_interval;
        handles.push(thread::spawn(move || {
            // The first refresh already happened above
            while sleep_unless_shutdown(&neighbor_ledger, interval) {
                neighbor_ledger.set_neighbors(discovery.discover());
            }
            info!("Neighbor sync stopped");
        }));

        if config.mining_enabled {
            let mining_ledger = Arc::clone(&ledger);
            let interval = config.mining_interval;
            handles.push(thread::spawn(move || {
                loop {
                    if mining_ledger.is_shutdown() {
                        break;
                    }
                    if !mining_ledger.mine() && !mining_ledger.is_shutdown() {
                        warn!("Mining round failed");
                    }
                    if !sleep_unless_shutdown(&mining_ledger, interval) {
                        break;
                    }
                }
                info!("Mining stopped");
            }));
        }

        BackgroundTasks { ledger, handles }
    }

    /// Signals shutdown, which also cancels an in-progress proof-of-work, and
    /// waits for both loops to exit
    pub fn stop(self) {
        self.ledger.shutdown();
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("A background task panicked");
            }
        }
    }
}

/// Sleeps for `duration` in short slices. Returns false as soon as shutdown is
/// requested, true once the full duration has passed.
fn sleep_unless_shutdown(ledger: &Ledger, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if ledger.is_shutdown() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SHUTDOWN_POLL.min(deadline - now));
    }
}
