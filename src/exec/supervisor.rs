// src/exec/supervisor.rs

//! Lifetime management for the one running instance of the program.
//!
//! A single task owns the child process. Everything else talks to it
//! through a one-slot channel, so relaunch and stop requests are handled one
//! at a time and in order. The previous instance is always reaped before a
//! new one is spawned.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::BuildTarget;
use crate::errors::{RerunError, Result};

/// Request sent to the supervisor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorSignal {
    /// Stop the running instance (if any) and start a fresh one.
    Relaunch,
    /// Stop the running instance (if any).
    Stop,
}

/// Sending side of the supervisor.
#[derive(Debug)]
pub struct SupervisorHandle {
    tx: mpsc::Sender<SupervisorSignal>,
    task: JoinHandle<()>,
}

impl SupervisorHandle {
    /// Wrap an arbitrary consumer task. [`spawn_supervisor`] is the real one.
    pub fn from_parts(tx: mpsc::Sender<SupervisorSignal>, task: JoinHandle<()>) -> Self {
        Self { tx, task }
    }

    pub async fn relaunch(&self) -> Result<()> {
        self.send(SupervisorSignal::Relaunch).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(SupervisorSignal::Stop).await
    }

    async fn send(&self, signal: SupervisorSignal) -> Result<()> {
        self.tx
            .send(signal)
            .await
            .map_err(|_| RerunError::Other(anyhow::anyhow!("supervisor task has exited")))
    }

    /// Stop the running instance, close the channel and wait until the
    /// supervisor task has reaped everything.
    pub async fn shutdown(self) {
        let SupervisorHandle { tx, task } = self;
        if tx.send(SupervisorSignal::Stop).await.is_err() {
            debug!("supervisor already gone at shutdown");
        }
        drop(tx);
        if let Err(err) = task.await {
            warn!(error = %err, "supervisor task panicked");
        }
    }
}

/// Spawn the supervisor task for `target`.
///
/// `grace_period` bounds how long an interrupted instance may take to exit
/// before it is killed.
pub fn spawn_supervisor(target: BuildTarget, grace_period: Duration) -> SupervisorHandle {
    let (tx, mut rx) = mpsc::channel::<SupervisorSignal>(1);

    let task = tokio::spawn(async move {
        info!(binary = %target.bin_path.display(), "supervisor started");
        let mut supervisor = Supervisor {
            target,
            grace_period,
            child: None,
        };

        while let Some(signal) = rx.recv().await {
            supervisor.handle(signal).await;
        }

        // Channel closed: make sure nothing outlives us.
        if let Some(child) = supervisor.child.take() {
            supervisor.terminate(child).await;
        }
        debug!("supervisor finished (channel closed)");
    });

    SupervisorHandle { tx, task }
}

struct Supervisor {
    target: BuildTarget,
    grace_period: Duration,
    child: Option<Child>,
}

impl Supervisor {
    async fn handle(&mut self, signal: SupervisorSignal) {
        debug!(?signal, "supervisor received signal");

        if let Some(child) = self.child.take() {
            self.terminate(child).await;
        }

        if signal == SupervisorSignal::Relaunch {
            self.child = self.start();
        }
    }

    /// Spawn a new instance with our stdout/stderr. A failed start is logged
    /// and leaves nothing running.
    fn start(&self) -> Option<Child> {
        let mut cmdline = vec![self.target.bin_name.clone()];
        cmdline.extend(self.target.args.iter().cloned());
        info!(cmd = ?cmdline, "starting process");

        let spawned = Command::new(&self.target.bin_path)
            .args(&self.target.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(pid = ?child.id(), "process started");
                Some(child)
            }
            Err(err) => {
                warn!(
                    binary = %self.target.bin_path.display(),
                    error = %err,
                    "error on starting process"
                );
                None
            }
        }
    }

    /// Interrupt, wait up to the grace period, kill if needed, and always
    /// reap.
    async fn terminate(&self, mut child: Child) {
        let interrupted = match child.id() {
            Some(pid) => match send_interrupt(pid) {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        pid,
                        error = %err,
                        "error on sending interrupt to process, will now hard-kill it"
                    );
                    false
                }
            },
            // Already reaped.
            None => false,
        };

        if interrupted {
            match tokio::time::timeout(self.grace_period, child.wait()).await {
                Ok(Ok(status)) => {
                    info!(%status, "process exited");
                    return;
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "error waiting for process, will now hard-kill it");
                }
                Err(_) => {
                    warn!(
                        grace_period = ?self.grace_period,
                        "process did not exit after interrupt, will now hard-kill it"
                    );
                }
            }
        }

        if let Err(err) = child.start_kill() {
            debug!(error = %err, "kill failed; process probably already exited");
        }
        match child.wait().await {
            Ok(status) => info!(%status, "process exited"),
            Err(err) => warn!(error = %err, "error reaping process"),
        }
    }
}

#[cfg(unix)]
fn send_interrupt(pid: u32) -> io::Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    kill(Pid::from_raw(pid), Signal::SIGINT).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn send_interrupt(_pid: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "interrupt signals are not supported on this platform",
    ))
}
