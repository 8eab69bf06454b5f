use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::{debug, error};

use super::model::{GraphQuery, GraphResponse};
use super::provider::{GraphDataProvider, QueryError};

pub type QueryOutcome = Result<GraphResponse, QueryError>;

/// A finished query together with the request that produced it.
#[derive(Debug)]
pub struct CompletedQuery {
    pub serial: u64,
    pub query: GraphQuery,
    pub outcome: QueryOutcome,
}

/// Tracks which request is current so late answers to superseded requests can be dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatestRequest {
    issued: u64,
}

impl LatestRequest {
    pub fn issue(&mut self) -> u64 {
        self.issued = self.issued.wrapping_add(1);
        self.issued
    }

    pub fn is_current(&self, serial: u64) -> bool {
        serial == self.issued
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// Runs provider queries on worker threads; the last issued query wins.
pub struct QueryRunner {
    provider: Arc<dyn GraphDataProvider>,
    latest: LatestRequest,
    tx: Sender<CompletedQuery>,
    rx: Receiver<CompletedQuery>,
    in_flight: usize,
}

impl QueryRunner {
    pub fn new(provider: Arc<dyn GraphDataProvider>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            latest: LatestRequest::default(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn issue(&mut self, query: GraphQuery) -> u64 {
        let serial = self.latest.issue();
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        self.in_flight += 1;

        debug!(
            "issuing query #{serial}: {} {} hops={}",
            query.focus_kind, query.focus_id, query.hops
        );
        thread::spawn(move || {
            let outcome = provider.query(&query);
            let _ = tx.send(CompletedQuery {
                serial,
                query,
                outcome,
            });
        });

        serial
    }

    /// Drains finished queries and returns the newest current one, if it has arrived.
    pub fn poll(&mut self) -> Option<CompletedQuery> {
        let mut current = None;
        loop {
            match self.rx.try_recv() {
                Ok(completed) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if self.latest.is_current(completed.serial) {
                        current = Some(completed);
                    } else {
                        debug!("discarding superseded query #{}", completed.serial);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("query worker channel disconnected");
                    break;
                }
            }
        }
        current
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_issued_serial_is_current() {
        let mut latest = LatestRequest::default();
        let first = latest.issue();
        let second = latest.issue();
        assert!(!latest.is_current(first));
        assert!(latest.is_current(second));
        assert_eq!(latest.issued(), second);
    }
}
