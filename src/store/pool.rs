//! Connection pool
//!
//! Pools engine session handles. A connection is `Idle` in the pool,
//! `Leased` while a guard holds it, and is invalidated (closed) when it sat
//! idle past the max-idle window or fails its liveness probe on checkout.
//!
//! Acquisition uses a mutex plus condition variable: with a timeout the
//! caller blocks until a connection is returned or the deadline passes; with
//! no timeout a pool at its ceiling fails fast with `PoolExhausted` rather
//! than blocking indefinitely.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::config::PoolConfig;
use crate::table::Table;

use super::engine::{evaluate, EngineShared};
use super::errors::{StoreError, StoreResult};
use super::query::StoreQuery;

/// One engine session handle.
pub struct EngineConnection {
    shared: Arc<EngineShared>,
}

impl EngineConnection {
    fn open(shared: Arc<EngineShared>) -> Self {
        Self { shared }
    }

    /// Liveness probe: a connection over poisoned state is dead.
    fn probe(&self) -> bool {
        !self.shared.state.is_poisoned()
    }

    /// Runs a typed query under the shared read lock.
    pub fn run(&self, query: &StoreQuery) -> StoreResult<Table> {
        let state = self.shared.state.read().expect("engine state poisoned");
        evaluate(&state, query)
    }
}

struct IdleEntry {
    conn: EngineConnection,
    idle_since: Instant,
}

struct PoolState {
    idle: Vec<IdleEntry>,
    /// Idle plus leased connections.
    total: usize,
    closed: bool,
}

/// Thread-safe pool of engine connections.
pub struct ConnectionPool {
    shared: Arc<EngineShared>,
    config: PoolConfig,
    state: Mutex<PoolState>,
    returned: Condvar,
}

impl ConnectionPool {
    pub(crate) fn new(shared: Arc<EngineShared>, config: PoolConfig) -> Self {
        Self {
            shared,
            config,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                total: 0,
                closed: false,
            }),
            returned: Condvar::new(),
        }
    }

    /// Acquires a connection, creating one if the pool is below its ceiling.
    ///
    /// At the ceiling: with `timeout` the call blocks until a connection is
    /// returned or `ConnectionTimeout` fires; without one it fails
    /// immediately with `PoolExhausted`.
    pub fn acquire(&self, timeout: Option<Duration>) -> StoreResult<PooledConnection<'_>> {
        let started = Instant::now();
        let mut state = self.state.lock().expect("pool lock poisoned");

        loop {
            if state.closed {
                return Err(StoreError::PoolClosed);
            }

            // Check out the most recently returned connection, discarding
            // stale or dead ones along the way.
            while let Some(entry) = state.idle.pop() {
                let expired =
                    entry.idle_since.elapsed() > Duration::from_secs(self.config.max_idle_secs);
                if expired || !entry.conn.probe() {
                    state.total -= 1;
                    continue;
                }
                return Ok(PooledConnection {
                    pool: self,
                    conn: Some(entry.conn),
                });
            }

            if state.total < self.config.max_connections {
                state.total += 1;
                let conn = EngineConnection::open(Arc::clone(&self.shared));
                return Ok(PooledConnection {
                    pool: self,
                    conn: Some(conn),
                });
            }

            match timeout {
                None => {
                    return Err(StoreError::PoolExhausted {
                        max_connections: self.config.max_connections,
                    })
                }
                Some(limit) => {
                    let elapsed = started.elapsed();
                    if elapsed >= limit {
                        return Err(StoreError::ConnectionTimeout {
                            waited_ms: elapsed.as_millis() as u64,
                        });
                    }
                    let (guard, _timed_out) = self
                        .returned
                        .wait_timeout(state, limit - elapsed)
                        .expect("pool lock poisoned");
                    state = guard;
                }
            }
        }
    }

    fn release(&self, conn: EngineConnection) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        if state.closed {
            state.total -= 1;
            return;
        }
        state.idle.push(IdleEntry {
            conn,
            idle_since: Instant::now(),
        });
        drop(state);
        self.returned.notify_one();
    }

    /// Closes the pool; subsequent acquisitions fail with `PoolClosed`.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        let drained = state.idle.drain(..).count();
        state.total -= drained;
        state.closed = true;
        drop(state);
        self.returned.notify_all();
    }

    /// (idle, total) connection counts.
    pub fn stats(&self) -> (usize, usize) {
        let state = self.state.lock().expect("pool lock poisoned");
        (state.idle.len(), state.total)
    }
}

/// Lease guard: the connection returns to the pool on drop.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<EngineConnection>,
}

impl fmt::Debug for PooledConnection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("leased", &self.conn.is_some())
            .finish()
    }
}

impl Deref for PooledConnection<'_> {
    type Target = EngineConnection;

    fn deref(&self) -> &EngineConnection {
        self.conn.as_ref().expect("connection already returned")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
