//! # Scriptable in-memory transport for tests.
//!
//! [`MockTransport`] implements [`Transport`] over per-scope unbounded
//! channels: tests push frames or a terminal error into a scope's feed and the
//! stream handed to the reader loop replays them. While the feed is empty,
//! `read_frame` pends like a real socket. Dropping the feed (via
//! [`MockTransport::close_remote`]) looks like the remote hanging up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{StreamError, SubscribeError};

use super::{ConnectionInfo, EventStream, Scope, Transport};

type Feed = mpsc::UnboundedSender<Result<Vec<u8>, StreamError>>;

pub(crate) struct MockTransport {
    info: ConnectionInfo,
    fail_open: AtomicBool,
    opened: Mutex<Vec<Scope>>,
    feeds: Mutex<HashMap<Scope, Feed>>,
    closed: Mutex<HashMap<Scope, Arc<AtomicBool>>>,
}

impl MockTransport {
    /// New transport whose connection info reports the given default project.
    pub(crate) fn new(project: &str) -> Arc<Self> {
        Arc::new(Self {
            info: ConnectionInfo {
                project: project.to_string(),
                addr: "mock://daemon".to_string(),
            },
            fail_open: AtomicBool::new(false),
            opened: Mutex::new(Vec::new()),
            feeds: Mutex::new(HashMap::new()),
            closed: Mutex::new(HashMap::new()),
        })
    }

    /// Makes every subsequent `open_stream` fail with `ConnectionSetup`.
    pub(crate) fn fail_opens(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    /// Number of streams opened so far.
    pub(crate) fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    /// Pushes one raw frame into the scope's open stream.
    pub(crate) fn push(&self, scope: &Scope, frame: &[u8]) {
        let feeds = self.feeds.lock();
        let feed = feeds.get(scope).expect("no open stream for scope");
        feed.send(Ok(frame.to_vec())).expect("stream feed closed");
    }

    /// Fails the scope's open stream with the given terminal error.
    pub(crate) fn fail(&self, scope: &Scope, err: StreamError) {
        let feeds = self.feeds.lock();
        let feed = feeds.get(scope).expect("no open stream for scope");
        feed.send(Err(err)).expect("stream feed closed");
    }

    /// Simulates the remote closing the socket for the scope.
    pub(crate) fn close_remote(&self, scope: &Scope) {
        self.feeds.lock().remove(scope);
    }

    /// True once the stream opened for the scope has been closed locally.
    pub(crate) fn stream_closed(&self, scope: &Scope) -> bool {
        self.closed
            .lock()
            .get(scope)
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn connection_info(&self) -> ConnectionInfo {
        self.info.clone()
    }

    async fn open_stream(&self, scope: &Scope) -> Result<Box<dyn EventStream>, SubscribeError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(SubscribeError::ConnectionSetup {
                message: "mock transport refused".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        self.opened.lock().push(scope.clone());
        self.feeds.lock().insert(scope.clone(), tx);
        self.closed.lock().insert(scope.clone(), closed.clone());

        Ok(Box::new(MockStream { rx, closed }))
    }
}

struct MockStream {
    rx: mpsc::UnboundedReceiver<Result<Vec<u8>, StreamError>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl EventStream for MockStream {
    async fn read_frame(&mut self) -> Result<Vec<u8>, StreamError> {
        match self.rx.recv().await {
            Some(next) => next,
            None => Err(StreamError::Closed),
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.rx.close();
    }
}
