//! Dedicated tracking thread.
//!
//! # Responsibility
//! - Own a `TrackingService` on one background thread.
//! - Process `Fix`, `Restart` and `Stop` commands strictly in arrival order.
//!
//! # Invariants
//! - The service is started before the first command is read and stopped
//!   after the last one.
//! - Dropping the handle stops the worker and waits for it.

use crate::model::fix::Fix;
use crate::tracking::coordinator::LocationProviders;
use crate::tracking::notifier::NotificationSink;
use crate::tracking::service::{current_fix, SharedFix, TrackingService};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{Builder, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

const WORKER_THREAD_NAME: &str = "artifactly-tracker";

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

#[derive(Debug)]
pub enum TrackerError {
    Spawn(std::io::Error),
    /// The worker has exited; the command was not delivered.
    Stopped,
    WorkerPanicked,
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn tracking worker: {err}"),
            Self::Stopped => write!(f, "tracking worker is not running"),
            Self::WorkerPanicked => write!(f, "tracking worker panicked"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

enum TrackerCommand {
    Fix(Fix),
    Restart,
    Stop,
}

pub struct TrackerWorker;

impl TrackerWorker {
    /// Starts `service` on a new thread using the system clock.
    pub fn spawn<P, N>(service: TrackingService<P, N>) -> Result<TrackerHandle, TrackerError>
    where
        P: LocationProviders + 'static,
        N: NotificationSink + 'static,
    {
        Self::spawn_with_clock(service, now_epoch_ms)
    }

    /// Starts `service` on a new thread reading time from `clock`.
    pub fn spawn_with_clock<P, N, C>(
        mut service: TrackingService<P, N>,
        clock: C,
    ) -> Result<TrackerHandle, TrackerError>
    where
        P: LocationProviders + 'static,
        N: NotificationSink + 'static,
        C: Fn() -> i64 + Send + 'static,
    {
        let published = service.published_fix();
        let (sender, receiver) = channel();
        let thread = Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run(&mut service, &receiver, &clock))
            .map_err(TrackerError::Spawn)?;

        Ok(TrackerHandle {
            sender: Some(sender),
            thread: Some(thread),
            published,
        })
    }
}

fn run<P, N, C>(service: &mut TrackingService<P, N>, receiver: &Receiver<TrackerCommand>, clock: &C)
where
    P: LocationProviders,
    N: NotificationSink,
    C: Fn() -> i64,
{
    info!("event=tracker_run module=tracking status=start");
    service.start(clock());

    while let Ok(command) = receiver.recv() {
        match command {
            TrackerCommand::Fix(fix) => {
                service.handle_fix(fix, clock());
            }
            TrackerCommand::Restart => {
                service.restart(clock());
            }
            TrackerCommand::Stop => break,
        }
    }

    service.stop();
    info!("event=tracker_run module=tracking status=stopped");
}

/// Control handle for a running tracking worker.
pub struct TrackerHandle {
    sender: Option<Sender<TrackerCommand>>,
    thread: Option<JoinHandle<()>>,
    published: SharedFix,
}

impl TrackerHandle {
    /// Queues one fix for evaluation.
    pub fn submit(&self, fix: Fix) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Fix(fix))
    }

    /// Re-runs provider selection after the commands already queued.
    pub fn restart(&self) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Restart)
    }

    /// Trusted fix as last published by the worker.
    pub fn current_fix(&self) -> Option<Fix> {
        current_fix(&self.published)
    }

    /// Stops the worker after draining queued commands.
    pub fn shutdown(mut self) -> Result<(), TrackerError> {
        self.stop_and_join()
    }

    fn send(&self, command: TrackerCommand) -> Result<(), TrackerError> {
        match &self.sender {
            Some(sender) => sender.send(command).map_err(|_| TrackerError::Stopped),
            None => Err(TrackerError::Stopped),
        }
    }

    fn stop_and_join(&mut self) -> Result<(), TrackerError> {
        if let Some(sender) = self.sender.take() {
            // The worker may already be gone; joining reports how it ended.
            let _ = sender.send(TrackerCommand::Stop);
        }
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| {
                error!("event=tracker_join module=tracking status=error error_code=worker_panicked");
                TrackerError::WorkerPanicked
            }),
            None => Ok(()),
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        let _ = self.stop_and_join();
    }
}
