//! A session manager that observes content reads.
//!
//! [`ProbeSessionManager`] delegates everything to an inner manager but
//! wraps every content reader it hands out. The wrapper counts open
//! handles and, when armed, ends the owning transaction once a set number
//! of bytes has been read. That reproduces a rollback arriving while a
//! fixity check is mid-stream.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};

use linkvault_core::{ContentMetadata, FedoraId, ResourceKind, Transaction, Triple};
use linkvault_store::{ContentReader, Result, SessionManager, StorageSession, TripleStream};

/// Shared counters for readers handed out by a [`ProbeSessionManager`].
#[derive(Debug, Default)]
pub struct ReaderProbe {
    open: AtomicUsize,
    opened: AtomicUsize,
    bytes_read: AtomicU64,
    /// Roll the transaction back once this many bytes were read; 0 disarms.
    interrupt_after: AtomicU64,
}

impl ReaderProbe {
    /// Readers currently alive.
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Readers ever opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Total bytes delivered across all readers.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::SeqCst)
    }

    /// Roll back the reading transaction after `bytes` have been delivered.
    pub fn interrupt_after(&self, bytes: u64) {
        self.interrupt_after.store(bytes, Ordering::SeqCst);
    }
}

/// Wraps a [`SessionManager`], instrumenting content readers.
pub struct ProbeSessionManager<M> {
    inner: M,
    probe: Arc<ReaderProbe>,
}

impl<M: SessionManager> ProbeSessionManager<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            probe: Arc::new(ReaderProbe::default()),
        }
    }

    pub fn probe(&self) -> Arc<ReaderProbe> {
        Arc::clone(&self.probe)
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    fn wrap(&self, session: Arc<dyn StorageSession>) -> Arc<dyn StorageSession> {
        Arc::new(ProbeSession {
            inner: session,
            probe: Arc::clone(&self.probe),
        })
    }
}

#[async_trait]
impl<M: SessionManager> SessionManager for ProbeSessionManager<M> {
    async fn session(&self, tx: &Transaction) -> Result<Arc<dyn StorageSession>> {
        Ok(self.wrap(self.inner.session(tx).await?))
    }

    async fn read_only_session(&self) -> Result<Arc<dyn StorageSession>> {
        Ok(self.wrap(self.inner.read_only_session().await?))
    }

    async fn commit(&self, tx: &Transaction) -> Result<()> {
        self.inner.commit(tx).await
    }

    async fn rollback(&self, tx: &Transaction) -> Result<()> {
        self.inner.rollback(tx).await
    }
}

struct ProbeSession {
    inner: Arc<dyn StorageSession>,
    probe: Arc<ReaderProbe>,
}

#[async_trait]
impl StorageSession for ProbeSession {
    fn transaction(&self) -> Option<&Transaction> {
        self.inner.transaction()
    }

    async fn exists(&self, id: &FedoraId) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn resource_kind(&self, id: &FedoraId) -> Result<ResourceKind> {
        self.inner.resource_kind(id).await
    }

    async fn read_triples(&self, id: &FedoraId) -> Result<TripleStream> {
        self.inner.read_triples(id).await
    }

    async fn read_content(&self, id: &FedoraId) -> Result<ContentReader> {
        let reader = self.inner.read_content(id).await?;
        self.probe.open.fetch_add(1, Ordering::SeqCst);
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::pin(ProbeReader {
            inner: reader,
            probe: Arc::clone(&self.probe),
            tx: self.inner.transaction().cloned(),
        }))
    }

    async fn content_metadata(&self, id: &FedoraId) -> Result<ContentMetadata> {
        self.inner.content_metadata(id).await
    }

    async fn create_container(&self, id: &FedoraId, triples: Vec<Triple>) -> Result<()> {
        self.inner.create_container(id, triples).await
    }

    async fn write_binary(
        &self,
        id: &FedoraId,
        content: Bytes,
        metadata: ContentMetadata,
    ) -> Result<()> {
        self.inner.write_binary(id, content, metadata).await
    }

    async fn write_triples(&self, id: &FedoraId, triples: Vec<Triple>) -> Result<()> {
        self.inner.write_triples(id, triples).await
    }

    async fn delete(&self, id: &FedoraId) -> Result<()> {
        self.inner.delete(id).await
    }
}

struct ProbeReader {
    inner: ContentReader,
    probe: Arc<ReaderProbe>,
    tx: Option<Transaction>,
}

impl AsyncRead for ProbeReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = this.inner.as_mut().poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            let n = (buf.filled().len() - before) as u64;
            let total = this.probe.bytes_read.fetch_add(n, Ordering::SeqCst) + n;
            let limit = this.probe.interrupt_after.load(Ordering::SeqCst);
            if limit > 0 && total >= limit {
                if let Some(tx) = &this.tx {
                    // Already-terminal is fine; the reader just keeps going.
                    let _ = tx.rollback();
                }
            }
        }
        poll
    }
}

impl Drop for ProbeReader {
    fn drop(&mut self) {
        self.probe.open.fetch_sub(1, Ordering::SeqCst);
    }
}
