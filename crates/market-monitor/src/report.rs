//! Plain-text rendering of engine status.

use chrono::{DateTime, Utc};
use market_cache::EngineStatus;
use std::fmt::Write;

fn timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// One line for periodic log output.
pub fn summary_line(status: &EngineStatus) -> String {
    let pairs = status
        .pairs_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    let newest = status
        .stats
        .newest_computed_at
        .map(timestamp)
        .unwrap_or_else(|| "never".to_string());

    format!(
        "mode={} entries={} pairs={} newest={}",
        status.mode, status.stats.entries, pairs, newest
    )
}

/// Multi-line report with one row per cached key.
pub fn render_status(status: &EngineStatus) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Mode:       {}", status.mode);
    match status.pairs_count {
        Some(n) => {
            let _ = writeln!(out, "Pairs:      {}", n);
        }
        None => {
            let _ = writeln!(out, "Pairs:      not initialized");
        }
    }
    let schedulers = if status.schedulers.is_empty() {
        "none".to_string()
    } else {
        status.schedulers.join(", ")
    };
    let _ = writeln!(out, "Schedulers: {}", schedulers);
    let _ = writeln!(out, "Entries:    {}", status.stats.entries);

    if status.entries.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<16} {:>8} {:>14} {:>7}  {}",
        "KEY", "CANDLES", "LAST CLOSE", "RSI", "COMPUTED AT"
    );
    for entry in &status.entries {
        let close = entry
            .last_close
            .map(|c| format!("{:.4}", c))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<16} {:>8} {:>14} {:>7.2}  {}",
            entry.key,
            entry.candles,
            close,
            entry.rsi,
            timestamp(entry.computed_at)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_cache::{CacheStats, EntryStatus, StartupMode};

    fn status() -> EngineStatus {
        EngineStatus {
            mode: StartupMode::Live,
            stats: CacheStats {
                entries: 1,
                oldest_computed_at: Some(1_700_000_000),
                newest_computed_at: Some(1_700_000_000),
            },
            entries: vec![EntryStatus {
                key: "BTCUSDT:1h".into(),
                computed_at: 1_700_000_000,
                candles: 900,
                last_close: Some(42_000.5),
                rsi: 61.234,
            }],
            pairs_count: None,
            schedulers: vec!["analysis".into(), "pairs".into()],
        }
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&status()),
            "mode=live entries=1 pairs=n/a newest=2023-11-14 22:13:20 UTC"
        );
    }

    #[test]
    fn test_render_status() {
        let text = render_status(&status());

        assert!(text.contains("Pairs:      not initialized"));
        assert!(text.contains("Schedulers: analysis, pairs"));
        assert!(text.contains("BTCUSDT:1h"));
        assert!(text.contains("42000.5000"));
        assert!(text.contains("61.23"));
    }
}
