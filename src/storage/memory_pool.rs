use crate::core::Transaction;

/// Pending transactions in admission order.
///
/// Has no lock of its own: the ledger keeps it behind the same mutex as the
/// chain so mining can snapshot, clear and append atomically.
#[derive(Debug, Default, Clone)]
pub struct MemoryPool {
    inner: Vec<Transaction>,
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool { inner: Vec::new() }
    }

    pub fn add(&mut self, tx: Transaction) {
        self.inner.push(tx);
    }

    pub fn get_all(&self) -> &[Transaction] {
        self.inner.as_slice()
    }

    /// Independent copy for proof-of-work; later pool changes do not affect it
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.inner.clone()
    }

    /// Removes the most recently admitted transaction
    pub fn pop(&mut self) -> Option<Transaction> {
        self.inner.pop()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
