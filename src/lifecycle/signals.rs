//! OS signal handling.
//!
//! SIGINT and SIGTERM both request a graceful stop of the running command.

/// Wait for SIGINT or SIGTERM and return the name of the signal received.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;

    let name = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            "SIGINT"
        }
        _ = terminate.recv() => "SIGTERM",
    };

    tracing::info!(signal = name, "Shutdown signal received");
    Ok(name)
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(signal = "ctrl-c", "Shutdown signal received");
    Ok("ctrl-c")
}
