//! Waiting for the process to be asked to stop.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

/// Resolves on Ctrl+C, or on the platform's termination request (SIGTERM on
/// unix; console close, logoff or system shutdown on Windows).
pub async fn wait_for_signal() -> ShutdownReason {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => ShutdownReason::Interrupt,
        _ = terminate() => ShutdownReason::Terminate,
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(windows)]
async fn terminate() {
    use tokio::signal::windows::{ctrl_break, ctrl_close, ctrl_logoff, ctrl_shutdown};

    let (Ok(mut close), Ok(mut brk), Ok(mut logoff), Ok(mut shutdown)) =
        (ctrl_close(), ctrl_break(), ctrl_logoff(), ctrl_shutdown())
    else {
        warn!("Failed to listen for console close events");
        return std::future::pending::<()>().await;
    };

    tokio::select! {
        _ = close.recv() => {},
        _ = brk.recv() => {},
        _ = logoff.recv() => {},
        _ = shutdown.recv() => {},
    }
}

#[cfg(not(any(unix, windows)))]
async fn terminate() {
    std::future::pending::<()>().await
}
