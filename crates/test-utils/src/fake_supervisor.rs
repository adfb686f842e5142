use std::sync::{Arc, Mutex};

use rerun::engine::{BuildTarget, SupervisorFactory};
use rerun::exec::{SupervisorHandle, SupervisorSignal};
use tokio::sync::mpsc;

/// Supervisor factory that never spawns processes.
///
/// Every signal sent to any supervisor it creates is appended to the shared
/// log, and every target it was created for is remembered.
#[derive(Debug, Clone, Default)]
pub struct RecordingSupervisor {
    signals: Arc<Mutex<Vec<SupervisorSignal>>>,
    targets: Arc<Mutex<Vec<BuildTarget>>>,
}

impl RecordingSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<SupervisorSignal> {
        self.signals.lock().unwrap().clone()
    }

    pub fn relaunches(&self) -> usize {
        self.signals()
            .iter()
            .filter(|s| **s == SupervisorSignal::Relaunch)
            .count()
    }

    pub fn targets(&self) -> Vec<BuildTarget> {
        self.targets.lock().unwrap().clone()
    }

    pub fn factory(&self) -> SupervisorFactory {
        let signals = Arc::clone(&self.signals);
        let targets = Arc::clone(&self.targets);

        Box::new(move |target: &BuildTarget| {
            targets.lock().unwrap().push(target.clone());

            let (tx, mut rx) = mpsc::channel::<SupervisorSignal>(1);
            let signals = Arc::clone(&signals);
            let task = tokio::spawn(async move {
                while let Some(signal) = rx.recv().await {
                    signals.lock().unwrap().push(signal);
                }
            });
            SupervisorHandle::from_parts(tx, task)
        })
    }
}
