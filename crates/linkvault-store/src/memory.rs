//! In-memory implementation of the session traits.
//!
//! Committed state lives in one map; each active transaction stages its
//! writes in an overlay. The [`Transaction`] handle is the source of truth
//! for how a transaction ended: every entry point first reconciles, merging
//! the overlays of committed transactions and dropping those of rolled-back
//! ones, however the terminal state was reached.
//!
//! The repository root is an implicit, always-present container.
//!
//! Thread-safe via RwLock. All data is lost when the manager is dropped.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace};

use linkvault_core::{
    ContentMetadata, FedoraId, RdfStream, ResourceKind, Term, Transaction, TransactionError,
    TransactionId, TransactionState, Triple,
};

use crate::error::{Result, StoreError};
use crate::traits::{ContentReader, SessionManager, StorageSession, TripleStream};

/// In-memory session manager.
#[derive(Clone, Default)]
pub struct MemorySessionManager {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    /// Committed storage units, keyed by base identifier.
    committed: HashMap<FedoraId, StoredUnit>,

    /// Staged writes per transaction that has opened a session.
    staged: HashMap<TransactionId, Overlay>,
}

/// One transaction's staged writes. `None` marks a deletion.
struct Overlay {
    tx: Transaction,
    writes: HashMap<FedoraId, Option<StoredUnit>>,
}

impl Overlay {
    fn new(tx: &Transaction) -> Self {
        Self {
            tx: tx.clone(),
            writes: HashMap::new(),
        }
    }
}

/// One storage unit. A binary and its description share a unit.
#[derive(Debug, Clone, PartialEq)]
enum StoredUnit {
    Container {
        triples: Vec<Triple>,
    },
    Binary {
        content: Bytes,
        metadata: ContentMetadata,
        description: Vec<Triple>,
    },
}

impl MemoryInner {
    fn lookup(&self, tx: Option<TransactionId>, base: &FedoraId) -> Option<StoredUnit> {
        let staged = tx
            .and_then(|id| self.staged.get(&id))
            .and_then(|overlay| overlay.writes.get(base));
        let unit = match staged {
            Some(entry) => entry.as_ref(),
            None => self.committed.get(base),
        };
        match unit {
            Some(unit) => Some(unit.clone()),
            None if base.is_root() => Some(StoredUnit::Container {
                triples: Vec::new(),
            }),
            None => None,
        }
    }

    /// Merge or drop the overlay of one finished transaction.
    ///
    /// Returns the number of writes published. An active transaction's
    /// overlay is left alone.
    fn finish(&mut self, id: TransactionId) -> usize {
        let state = match self.staged.get(&id) {
            Some(overlay) => overlay.tx.state(),
            None => return 0,
        };
        if !state.is_terminal() {
            return 0;
        }
        let Some(overlay) = self.staged.remove(&id) else {
            return 0;
        };
        if state != TransactionState::Committed {
            trace!(tx = %id, discarded = overlay.writes.len(), "dropped overlay");
            return 0;
        }
        let writes = overlay.writes.len();
        for (base, unit) in overlay.writes {
            match unit {
                Some(unit) => {
                    self.committed.insert(base, unit);
                }
                None => {
                    self.committed.remove(&base);
                }
            }
        }
        writes
    }

    /// Settle every transaction that reached a terminal state.
    fn reconcile(&mut self) {
        let finished: Vec<TransactionId> = self
            .staged
            .iter()
            .filter(|(_, overlay)| overlay.tx.state().is_terminal())
            .map(|(id, _)| *id)
            .collect();
        for id in finished {
            self.finish(id);
        }
    }
}

impl MemorySessionManager {
    /// Create a new empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed storage units. The implicit root is not counted.
    pub fn committed_len(&self) -> usize {
        settled(&self.inner).committed.len()
    }

    /// Number of transactions with a staged overlay.
    pub fn open_sessions(&self) -> usize {
        settled(&self.inner).staged.len()
    }
}

fn write(lock: &RwLock<MemoryInner>) -> RwLockWriteGuard<'_, MemoryInner> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Lock and reconcile.
fn settled(lock: &RwLock<MemoryInner>) -> RwLockWriteGuard<'_, MemoryInner> {
    let mut inner = write(lock);
    inner.reconcile();
    inner
}

/// Fail unless `tx` is in the `wanted` terminal state.
fn expect_state(tx: &Transaction, wanted: TransactionState) -> Result<()> {
    match tx.state() {
        state if state == wanted => Ok(()),
        TransactionState::Active => Err(TransactionError::Active(tx.id()).into()),
        state => Err(TransactionError::Closed { id: tx.id(), state }.into()),
    }
}

#[async_trait]
impl SessionManager for MemorySessionManager {
    async fn session(&self, tx: &Transaction) -> Result<Arc<dyn StorageSession>> {
        tx.ensure_active()?;
        settled(&self.inner)
            .staged
            .entry(tx.id())
            .or_insert_with(|| Overlay::new(tx));
        trace!(tx = %tx.id(), "opened memory session");
        Ok(Arc::new(MemorySession {
            inner: Arc::clone(&self.inner),
            tx: Some(tx.clone()),
        }))
    }

    async fn read_only_session(&self) -> Result<Arc<dyn StorageSession>> {
        Ok(Arc::new(MemorySession {
            inner: Arc::clone(&self.inner),
            tx: None,
        }))
    }

    async fn commit(&self, tx: &Transaction) -> Result<()> {
        expect_state(tx, TransactionState::Committed)?;
        let mut inner = write(&self.inner);
        let writes = inner.finish(tx.id());
        inner.reconcile();
        debug!(tx = %tx.id(), writes, "committed memory session");
        Ok(())
    }

    async fn rollback(&self, tx: &Transaction) -> Result<()> {
        expect_state(tx, TransactionState::RolledBack)?;
        let mut inner = write(&self.inner);
        let discarded = inner
            .staged
            .get(&tx.id())
            .map(|o| o.writes.len())
            .unwrap_or(0);
        inner.finish(tx.id());
        inner.reconcile();
        debug!(tx = %tx.id(), discarded, "rolled back memory session");
        Ok(())
    }
}

/// A session over a [`MemorySessionManager`].
struct MemorySession {
    inner: Arc<RwLock<MemoryInner>>,
    tx: Option<Transaction>,
}

impl MemorySession {
    fn tx_id(&self) -> Result<Option<TransactionId>> {
        match &self.tx {
            Some(tx) => {
                tx.ensure_active()?;
                Ok(Some(tx.id()))
            }
            None => Ok(None),
        }
    }

    /// Clone the unit holding `id`, or fail with not-found.
    fn unit(&self, id: &FedoraId) -> Result<StoredUnit> {
        let tx = self.tx_id()?;
        let unit = settled(&self.inner)
            .lookup(tx, &id.base_id())
            .ok_or_else(|| StoreError::not_found(id))?;
        if id.is_description() && !matches!(unit, StoredUnit::Binary { .. }) {
            return Err(StoreError::not_found(id));
        }
        Ok(unit)
    }

    fn stage(&self, base: FedoraId, unit: Option<StoredUnit>) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(StoreError::ReadOnly)?;
        tx.ensure_active()?;
        settled(&self.inner)
            .staged
            .entry(tx.id())
            .or_insert_with(|| Overlay::new(tx))
            .writes
            .insert(base, unit);
        Ok(())
    }

    fn exists_now(&self, base: &FedoraId) -> Result<bool> {
        let tx = self.tx_id()?;
        Ok(settled(&self.inner).lookup(tx, base).is_some())
    }
}

#[async_trait]
impl StorageSession for MemorySession {
    fn transaction(&self) -> Option<&Transaction> {
        self.tx.as_ref()
    }

    async fn exists(&self, id: &FedoraId) -> Result<bool> {
        match self.unit(id) {
            Ok(_) => Ok(true),
            Err(StoreError::PathNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn resource_kind(&self, id: &FedoraId) -> Result<ResourceKind> {
        let kind = match self.unit(id)? {
            StoredUnit::Container { .. } => ResourceKind::Container,
            StoredUnit::Binary { .. } if id.is_description() => ResourceKind::Description,
            StoredUnit::Binary { .. } => ResourceKind::Binary,
        };
        Ok(kind)
    }

    async fn read_triples(&self, id: &FedoraId) -> Result<TripleStream> {
        let topic = Term::iri(id.resource_id());
        let triples = match self.unit(id)? {
            StoredUnit::Container { triples } => triples,
            StoredUnit::Binary { description, .. } if id.is_description() => description,
            StoredUnit::Binary { .. } => Vec::new(),
        };
        Ok(RdfStream::from_triples(topic, triples))
    }

    async fn read_content(&self, id: &FedoraId) -> Result<ContentReader> {
        if id.is_description() {
            return Err(StoreError::NotBinary(id.clone()));
        }
        match self.unit(id)? {
            StoredUnit::Binary { content, .. } => Ok(Box::pin(Cursor::new(content))),
            StoredUnit::Container { .. } => Err(StoreError::NotBinary(id.clone())),
        }
    }

    async fn content_metadata(&self, id: &FedoraId) -> Result<ContentMetadata> {
        if id.is_description() {
            return Err(StoreError::NotBinary(id.clone()));
        }
        match self.unit(id)? {
            StoredUnit::Binary { metadata, .. } => Ok(metadata),
            StoredUnit::Container { .. } => Err(StoreError::NotBinary(id.clone())),
        }
    }

    async fn create_container(&self, id: &FedoraId, triples: Vec<Triple>) -> Result<()> {
        if id.is_root() {
            return Err(StoreError::Conflict("the root always exists".to_string()));
        }
        if id.is_description() {
            return Err(StoreError::Conflict(format!(
                "{id} is reserved for a description"
            )));
        }
        if self.exists_now(id)? {
            return Err(StoreError::Conflict(format!("{id} already exists")));
        }
        self.stage(id.clone(), Some(StoredUnit::Container { triples }))
    }

    async fn write_binary(
        &self,
        id: &FedoraId,
        content: Bytes,
        metadata: ContentMetadata,
    ) -> Result<()> {
        if id.is_description() || id.is_root() {
            return Err(StoreError::Conflict(format!("{id} cannot hold content")));
        }
        if metadata.size != content.len() as u64 {
            return Err(StoreError::InvalidData(format!(
                "recorded size {} does not match content length {}",
                metadata.size,
                content.len()
            )));
        }
        let description = match self.unit(id) {
            Ok(StoredUnit::Binary { description, .. }) => description,
            Ok(StoredUnit::Container { .. }) => {
                return Err(StoreError::Conflict(format!("{id} is a container")));
            }
            Err(StoreError::PathNotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        self.stage(
            id.clone(),
            Some(StoredUnit::Binary {
                content,
                metadata,
                description,
            }),
        )
    }

    async fn write_triples(&self, id: &FedoraId, triples: Vec<Triple>) -> Result<()> {
        let unit = match self.unit(id)? {
            StoredUnit::Container { .. } => StoredUnit::Container { triples },
            StoredUnit::Binary {
                content, metadata, ..
            } if id.is_description() => StoredUnit::Binary {
                content,
                metadata,
                description: triples,
            },
            StoredUnit::Binary { .. } => {
                return Err(StoreError::Conflict(format!(
                    "triples about {id} belong in its description"
                )));
            }
        };
        self.stage(id.base_id(), Some(unit))
    }

    async fn delete(&self, id: &FedoraId) -> Result<()> {
        if id.is_root() {
            return Err(StoreError::Conflict("the root cannot be deleted".to_string()));
        }
        if id.is_description() {
            return Err(StoreError::Conflict(format!(
                "{id} is deleted together with its binary"
            )));
        }
        self.unit(id)?;
        self.stage(id.clone(), None)
    }
}
