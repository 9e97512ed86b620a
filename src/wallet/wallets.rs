use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize, SecretKey};
use crate::wallet::Wallet;
use log::info;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Wallets kept on disk, keyed by address. Only private keys are stored;
/// public keys and addresses are re-derived on load.
pub struct Wallets {
    wallets: HashMap<String, Wallet>,
    path: PathBuf,
}

impl Wallets {
    /// A missing file is an empty keystore. A file that exists but won't
    /// decode is an error, so a bad path never gets silently overwritten.
    pub fn load(path: impl AsRef<Path>) -> Result<Wallets> {
        let path = path.as_ref().to_path_buf();
        let mut wallets = Wallets {
            wallets: HashMap::new(),
            path,
        };
        if !wallets.path.exists() {
            return Ok(wallets);
        }

        let buf = fs::read(&wallets.path)?;
        let secrets: HashMap<String, SecretKey> = deserialize(&buf)?;
        for (address, secret) in secrets {
            let wallet = Wallet::from_pkcs8(secret.as_bytes())?;
            if wallet.get_address() != address {
                return Err(LedgerError::Wallet(format!(
                    "Keystore entry {address} does not match its key"
                )));
            }
            wallets.wallets.insert(address, wallet);
        }
        Ok(wallets)
    }

    pub fn create_wallet(&mut self) -> Result<String> {
        let wallet = Wallet::new()?;
        let address = wallet.get_address().to_string();
        self.wallets.insert(address.clone(), wallet);
        self.save()?;
        info!("Created wallet {address}");
        Ok(address)
    }

    /// Sorted so listings are stable between runs
    pub fn get_addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.wallets.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    pub fn get_wallet(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    fn save(&self) -> Result<()> {
        let secrets: HashMap<String, SecretKey> = self
            .wallets
            .iter()
            .map(|(address, wallet)| (address.clone(), wallet.get_key_pair().secret().clone()))
            .collect();

        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        let wallets_bytes = serialize(&secrets)?;
        writer.write_all(wallets_bytes.as_slice())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_keystore() {
        let dir = tempdir().unwrap();
        let wallets = Wallets::load(dir.path().join("wallet.dat")).unwrap();
        assert!(wallets.is_empty());
    }

    #[test]
    fn test_created_wallets_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.dat");

        let mut wallets = Wallets::load(&path).unwrap();
        let first = wallets.create_wallet().unwrap();
        let second = wallets.create_wallet().unwrap();

        let reloaded = Wallets::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get_addresses(), wallets.get_addresses());

        let wallet = reloaded.get_wallet(&first).unwrap();
        assert_eq!(wallet.get_address(), first);
        assert!(reloaded.get_wallet(&second).is_some());
        assert!(reloaded.get_wallet("unknown").is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.dat");
        fs::write(&path, b"definitely not bincode").unwrap();

        assert!(Wallets::load(&path).is_err());
    }
}
