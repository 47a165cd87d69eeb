// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether status` command implementation.
//!
//! Reads checkpoint, unread, and cache footprint straight from local
//! storage; it does not require (or talk to) a running serve process.

use chrono::DateTime;
use serde::Serialize;
use tether_config::model::TetherConfig;
use tether_core::TetherError;
use tether_storage::queries::{dialogs, media, sync_state};
use tether_storage::Database;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub last_sync_reason: Option<String>,
    pub last_sync_at_epoch_ms: Option<i64>,
    pub last_sync_at: Option<String>,
    pub unread_total: i64,
    pub cache_bytes: i64,
    pub cache_quota_bytes: i64,
}

/// Run the `tether status` command.
pub async fn run_status(config: &TetherConfig, json: bool) -> Result<(), TetherError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;

    let checkpoint = sync_state::last_sync(&db).await?;
    let unread_total = dialogs::total_unread(&db).await?;
    let cache_bytes = media::total_size(&db).await?;
    db.close().await?;

    let report = StatusReport {
        last_sync_reason: checkpoint.as_ref().map(|c| c.reason.clone()),
        last_sync_at_epoch_ms: checkpoint.as_ref().map(|c| c.at),
        last_sync_at: checkpoint.as_ref().and_then(|c| format_epoch_ms(c.at)),
        unread_total,
        cache_bytes,
        cache_quota_bytes: config.cache.quota_bytes,
    };

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| TetherError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    match (&report.last_sync_at, &report.last_sync_reason) {
        (Some(at), Some(reason)) => println!("last sync:  {at} ({reason})"),
        _ => println!("last sync:  never"),
    }
    println!("unread:     {}", report.unread_total);
    println!(
        "cache:      {} / {}",
        format_bytes(report.cache_bytes),
        format_bytes(report.cache_quota_bytes)
    );
    Ok(())
}

fn format_epoch_ms(at: i64) -> Option<String> {
    DateTime::from_timestamp_millis(at).map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

fn format_bytes(bytes: i64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes >= KIB * KIB * KIB {
        format!("{:.1} GiB", bytes / (KIB * KIB * KIB))
    } else if bytes >= KIB * KIB {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{bytes:.0} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_format_by_magnitude() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn epoch_millis_render_as_utc() {
        let rendered = format_epoch_ms(1_700_000_000_000).unwrap();
        assert!(rendered.ends_with("UTC"), "got: {rendered}");
    }
}
