//! Shutdown Coordinator
//!
//! Waits for the first of an OS termination signal or a quit request from the
//! tray menu, then tears both cadences down exactly once.

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::tray::PresentationSink;

/// Process lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Starting,
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShutdownReason {
    Signal,
    Quit,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal => write!(f, "termination signal"),
            ShutdownReason::Quit => write!(f, "quit requested"),
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn os_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C")?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;

    Ok(())
}

/// Resolves on the first quit request. A closed channel never resolves:
/// losing the menu is not a reason to exit.
async fn quit_requested(quit_rx: &mut mpsc::Receiver<()>) {
    if quit_rx.recv().await.is_none() {
        debug!("Quit channel closed, waiting for signals only");
        std::future::pending::<()>().await;
    }
}

pub struct ShutdownCoordinator {
    phase: Phase,
    sink: Arc<dyn PresentationSink>,
    sampler: Option<JoinHandle<Result<()>>>,
    animation: Option<JoinHandle<()>>,
}

impl ShutdownCoordinator {
    pub fn new(sink: Arc<dyn PresentationSink>) -> Self {
        Self {
            phase: Phase::Starting,
            sink,
            sampler: None,
            animation: None,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Hand over both cadences; the process is now Running
    pub fn start(&mut self, sampler: JoinHandle<Result<()>>, animation: JoinHandle<()>) {
        self.sampler = Some(sampler);
        self.animation = Some(animation);
        self.phase = Phase::Running;
        info!("Running");
    }

    /// Wait for the first shutdown trigger and tear down.
    ///
    /// A sampler that stops on its own, or a signal listener that cannot be
    /// installed, is fatal: both cadences are aborted and the error returned
    /// without the graceful teardown.
    pub async fn run<S>(&mut self, os_signal: S, mut quit_rx: mpsc::Receiver<()>) -> Result<ShutdownReason>
    where
        S: Future<Output = Result<()>>,
    {
        let mut sampler = self.sampler.take().context("Shutdown coordinator was never started")?;

        let outcome = tokio::select! {
            result = os_signal => result.map(|()| ShutdownReason::Signal),
            () = quit_requested(&mut quit_rx) => Ok(ShutdownReason::Quit),
            joined = &mut sampler => Err(match joined {
                Ok(Err(e)) => e.context("CPU sampling failed"),
                Ok(Ok(())) => anyhow!("CPU sampler stopped unexpectedly"),
                Err(e) => anyhow!("CPU sampler task failed: {}", e),
            }),
        };

        match outcome {
            Ok(reason) => {
                self.sampler = Some(sampler);
                self.teardown(reason);
                Ok(reason)
            }
            Err(e) => {
                error!("{:#}", e);
                sampler.abort();
                if let Some(animation) = self.animation.take() {
                    animation.abort();
                }
                self.phase = Phase::Terminated;
                Err(e)
            }
        }
    }

    /// Stop both cadences and release the tray. Only the first call while
    /// Running does anything; returns whether this call performed it.
    pub fn teardown(&mut self, reason: ShutdownReason) -> bool {
        if self.phase != Phase::Running {
            debug!("Ignoring {} in phase {:?}", reason, self.phase);
            return false;
        }

        self.phase = Phase::ShuttingDown;
        info!("Shutting down ({})", reason);

        if let Some(sampler) = self.sampler.take() {
            sampler.abort();
        }
        if let Some(animation) = self.animation.take() {
            animation.abort();
        }
        self.sink.release();

        self.phase = Phase::Terminated;
        true
    }
}
