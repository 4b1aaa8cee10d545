//! Daemon mode: run the maintenance loop until interrupted.

use anyhow::Result;
use tracing::info;

use super::App;
use crate::maintenance;

pub async fn run(app: &App) -> Result<()> {
    let (handle, mut status_rx) = maintenance::spawn(
        app.store.clone(),
        app.cache.clone(),
        app.config.maintenance.clone(),
    );
    info!("dealbot running; press Ctrl-C to stop");

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let report = status_rx.borrow_and_update().clone();
                if let Some(report) = report {
                    println!("{}\n", report.summary());
                }
            }
        }
    }

    info!("Shutting down");
    handle.abort();
    app.store.close().await;
    Ok(())
}
