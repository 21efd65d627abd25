use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;

/// 关闭原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGTERM
    Term,
    /// SIGINT / Ctrl+C
    Interrupt,
    /// 程序内部触发
    Manual,
}

/// 关闭信号广播
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<ShutdownSignal>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.tx.subscribe()
    }

    pub fn trigger(&self, reason: ShutdownSignal) {
        info!(?reason, "Shutdown triggered");
        let _ = self.tx.send(reason);
    }

    /// 等待系统信号并广播
    #[cfg(unix)]
    pub async fn wait_for_system_signal(&self) -> std::io::Result<ShutdownSignal> {
        use signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let reason = tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                ShutdownSignal::Term
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
                ShutdownSignal::Interrupt
            }
        };
        let _ = self.tx.send(reason);
        Ok(reason)
    }

    #[cfg(not(unix))]
    pub async fn wait_for_system_signal(&self) -> std::io::Result<ShutdownSignal> {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C");
        let _ = self.tx.send(ShutdownSignal::Interrupt);
        Ok(ShutdownSignal::Interrupt)
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}
