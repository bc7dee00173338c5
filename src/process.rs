use async_trait::async_trait;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Answers whether a process id belongs to a running process.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    async fn is_running(&self, pid: u32) -> bool;
}

/// Process table lookup through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessProbe;

#[async_trait]
impl ProcessProbe for SystemProcessProbe {
    async fn is_running(&self, pid: u32) -> bool {
        let result = tokio::task::spawn_blocking(move || {
            let pid = Pid::from_u32(pid);
            let mut sys = System::new();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing(),
            );
            sys.process(pid).is_some()
        })
        .await;

        match result {
            Ok(running) => running,
            Err(e) => {
                tracing::warn!("Process probe for pid {} failed: {}", pid, e);
                false
            }
        }
    }
}
