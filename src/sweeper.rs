//! Background task keeping stored statuses in step with the clock.

use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::time::interval;

use crate::config::ScheduleConfig;
use crate::db::contracts as contract_db;

/// Re-derive overdue statuses every `period`, forever.
///
/// A failed pass is logged and retried on the next tick.
pub async fn run(db: DatabaseConnection, config: ScheduleConfig, period: Duration) {
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        match contract_db::refresh_statuses(&db, config).await {
            Ok(0) => {}
            Ok(changed) => tracing::info!(changed, "Contract statuses refreshed"),
            Err(e) => tracing::error!("Status sweep failed: {e}"),
        }
    }
}
