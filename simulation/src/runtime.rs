//! Fixed-cadence runtime that drives a [`Simulation`] on its own thread.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, warn};
use thiserror::Error;
use tower_defence_core::{Event, FieldPoint, Rules};

use crate::{Simulation, SimulationSnapshot};

/// Errors surfaced by the threaded tick loop.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The operating system refused to start the simulation thread.
    #[error("failed to spawn simulation thread")]
    Spawn(#[source] std::io::Error),
    /// The tick loop has already stopped and no longer accepts commands.
    #[error("simulation loop is no longer running")]
    Stopped,
    /// The simulation thread panicked before it could be joined.
    #[error("simulation thread panicked")]
    Panicked,
    /// The tick interval is zero or longer than [`Rules::MAX_TICK_INTERVAL`].
    #[error("tick interval {0:?} is outside the supported range")]
    InvalidTickInterval(Duration),
}

/// Messages delivered to the simulation thread.
#[derive(Clone, Copy, Debug)]
enum Request {
    PlaceTower(FieldPoint),
    Stop,
}

/// Handle to a simulation running on a dedicated thread.
///
/// Placements are queued and applied before the next tick. The latest
/// snapshot is published after every tick.
#[derive(Debug)]
pub struct TickLoop {
    requests: Sender<Request>,
    snapshot: Arc<RwLock<SimulationSnapshot>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickLoop {
    /// Starts ticking `simulation` every `tick_interval`.
    pub fn spawn(simulation: Simulation, tick_interval: Duration) -> Result<Self, SimulationError> {
        if tick_interval.is_zero() || tick_interval > Rules::MAX_TICK_INTERVAL {
            return Err(SimulationError::InvalidTickInterval(tick_interval));
        }

        let (requests, receiver) = mpsc::channel();
        let snapshot = Arc::new(RwLock::new(simulation.snapshot()));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            simulation,
            tick_interval,
            requests: receiver,
            pending: Vec::new(),
            snapshot: Arc::clone(&snapshot),
            stop: Arc::clone(&stop),
        };
        let handle = thread::Builder::new()
            .name("tower-defence-sim".into())
            .spawn(move || worker.run())
            .map_err(SimulationError::Spawn)?;

        Ok(Self {
            requests,
            snapshot,
            stop,
            handle: Some(handle),
        })
    }

    /// Queues a tower placement for the next tick.
    pub fn place_tower(&self, position: FieldPoint) -> Result<(), SimulationError> {
        self.requests
            .send(Request::PlaceTower(position))
            .map_err(|_| SimulationError::Stopped)
    }

    /// Clones the most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        read_snapshot(&self.snapshot).clone()
    }

    /// Reports whether the simulation thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the loop and waits for the simulation thread to exit.
    pub fn shutdown(mut self) -> Result<(), SimulationError> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<(), SimulationError> {
        self.stop.store(true, Ordering::Release);
        // The worker may already be gone, in which case there is nothing to wake.
        let _ = self.requests.send(Request::Stop);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| SimulationError::Panicked),
            None => Ok(()),
        }
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        if let Err(err) = self.stop_and_join() {
            error!("{err}");
        }
    }
}

struct Worker {
    simulation: Simulation,
    tick_interval: Duration,
    requests: Receiver<Request>,
    pending: Vec<FieldPoint>,
    snapshot: Arc<RwLock<SimulationSnapshot>>,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn run(mut self) {
        let mut pacer = Pacer::new(self.tick_interval, Instant::now());
        let mut events = Vec::new();

        while !self.stop.load(Ordering::Acquire) {
            if !self.apply_placements(&mut events) {
                debug!("simulation stop requested");
                break;
            }

            self.simulation.step(self.tick_interval, &mut events);
            events.clear();

            *write_snapshot(&self.snapshot) = self.simulation.snapshot();

            if let Some(delay) = pacer.delay(Instant::now()) {
                if !self.wait_until(Instant::now() + delay) {
                    debug!("simulation stop requested");
                    break;
                }
            }
        }
    }

    /// Applies every queued placement. Returns `false` once the loop must stop.
    fn apply_placements(&mut self, events: &mut Vec<Event>) -> bool {
        loop {
            match self.requests.try_recv() {
                Ok(Request::PlaceTower(position)) => self.pending.push(position),
                Ok(Request::Stop) | Err(TryRecvError::Disconnected) => return false,
                Err(TryRecvError::Empty) => break,
            }
        }

        for position in self.pending.drain(..) {
            self.simulation.place_tower(position, events);
        }
        true
    }

    /// Blocks until `deadline`, queueing placements that arrive meanwhile.
    ///
    /// Returns `false` as soon as a stop is requested or the handle is dropped.
    fn wait_until(&mut self, deadline: Instant) -> bool {
        loop {
            if self.stop.load(Ordering::Acquire) {
                return false;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }

            match self.requests.recv_timeout(remaining) {
                Ok(Request::PlaceTower(position)) => self.pending.push(position),
                Ok(Request::Stop) | Err(RecvTimeoutError::Disconnected) => return false,
                Err(RecvTimeoutError::Timeout) => return true,
            }
        }
    }
}

fn read_snapshot(lock: &RwLock<SimulationSnapshot>) -> RwLockReadGuard<'_, SimulationSnapshot> {
    lock.read().unwrap_or_else(|poisoned: PoisonError<_>| {
        error!("snapshot lock poisoned, recovering last published state");
        poisoned.into_inner()
    })
}

fn write_snapshot(lock: &RwLock<SimulationSnapshot>) -> RwLockWriteGuard<'_, SimulationSnapshot> {
    lock.write().unwrap_or_else(|poisoned: PoisonError<_>| {
        error!("snapshot lock poisoned, overwriting with fresh state");
        poisoned.into_inner()
    })
}

/// Deadline-based tick pacing.
///
/// Deadlines advance by a fixed interval so short sleeps do not accumulate
/// drift. A loop that falls more than one interval behind is resynchronised
/// instead of bursting through the backlog.
#[derive(Debug)]
struct Pacer {
    interval: Duration,
    next_tick: Instant,
}

impl Pacer {
    fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next_tick: start + interval,
        }
    }

    /// Returns how long to sleep before the next tick, or `None` when late.
    fn delay(&mut self, now: Instant) -> Option<Duration> {
        let deadline = self.next_tick;
        self.next_tick = deadline + self.interval;

        if deadline > now {
            return Some(deadline - now);
        }

        let behind = now - deadline;
        if behind > self.interval {
            warn!("simulation running {behind:?} behind schedule");
            self.next_tick = now + self.interval;
        }
        None
    }
}
