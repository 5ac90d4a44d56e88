//! Transactions: isolation scopes threaded through every kernel call.
//!
//! A transaction starts active and reaches exactly one terminal state,
//! committed or rolled back. Anything issued after that must fail.
//!
//! [`Transaction`] is a cheap handle; clones share one lifecycle, so a
//! rollback on one clone is observed by a fixity read holding another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::TransactionError;

/// A 16-byte random transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub [u8; 16]);

impl TransactionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionState::Active)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
        };
        f.write_str(s)
    }
}

/// Handle to a transaction.
///
/// Equality is by identifier. The handle owns no resources; storage
/// sessions keyed by it live in the session manager.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<TransactionInner>,
}

struct TransactionInner {
    id: TransactionId,
    state: Mutex<TransactionState>,
}

impl Transaction {
    /// Begin a new active transaction.
    pub fn begin() -> Self {
        Self::with_id(TransactionId::generate())
    }

    /// Begin an active transaction with a caller-chosen identifier.
    pub fn with_id(id: TransactionId) -> Self {
        Self {
            inner: Arc::new(TransactionInner {
                id,
                state: Mutex::new(TransactionState::Active),
            }),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.inner.id
    }

    pub fn state(&self) -> TransactionState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_active(&self) -> bool {
        self.state() == TransactionState::Active
    }

    /// Fail unless the transaction is still active.
    pub fn ensure_active(&self) -> Result<(), TransactionError> {
        match self.state() {
            TransactionState::Active => Ok(()),
            state => Err(TransactionError::Closed {
                id: self.inner.id,
                state,
            }),
        }
    }

    /// Claim the committed state.
    ///
    /// The transition happens under the handle's lock, so of two racing
    /// `commit`/`rollback` calls on clones exactly one succeeds. Storage
    /// publishes the transaction's staged writes once it observes the
    /// committed state.
    pub fn commit(&self) -> Result<(), TransactionError> {
        self.finish(TransactionState::Committed)
    }

    /// Claim the rolled-back state. Staged writes are discarded by storage
    /// once it observes this.
    pub fn rollback(&self) -> Result<(), TransactionError> {
        self.finish(TransactionState::RolledBack)
    }

    fn finish(&self, terminal: TransactionState) -> Result<(), TransactionError> {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.is_terminal() {
            return Err(TransactionError::Closed {
                id: self.inner.id,
                state: *state,
            });
        }
        *state = terminal;
        Ok(())
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Transaction {}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}
