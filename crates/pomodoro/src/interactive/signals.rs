//! Termination signals for the full-screen timer
//!
//! A helper thread parks a current-thread runtime on the signal streams and
//! raises a flag when one fires. The draw loop polls the flag; nothing else
//! crosses the thread boundary.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Start watching for SIGINT, SIGTERM and SIGHUP
pub fn watch() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start signal runtime")?;

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            runtime.block_on(wait_for_shutdown());
            tracing::debug!("termination signal received");
            raised.store(true, Ordering::SeqCst);
        })
        .context("Failed to spawn signal watcher")?;

    Ok(flag)
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let streams = signal(SignalKind::terminate()).and_then(|term| Ok((term, signal(SignalKind::hangup())?)));
    let (mut term, mut hup) = match streams {
        Ok(streams) => streams,
        Err(e) => {
            tracing::warn!("Failed to install signal handlers: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
        _ = hup.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
