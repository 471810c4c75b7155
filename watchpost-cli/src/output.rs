//! Plain-text rendering of statistics snapshots.
//!
//! The live view is deliberately simple line-oriented output so it
//! works in pipes and terminals alike; structured consumers should
//! use the `--json` flag instead.

use watchpost_core::types::SectionDetail;
use watchpost_monitor::StatsSnapshot;

/// Render one statistics snapshot as a plain-text block.
pub fn render_snapshot(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Statistics (last {} seconds)\n",
        snapshot.stats_window_seconds,
    ));
    out.push_str(&render_table(&snapshot.window_sections));

    out.push_str(&format!("All time ({} events)\n", snapshot.total_events));
    out.push_str(&render_table(&snapshot.alltime_sections));

    out.push_str(&format!(
        "Alert window: {} events ({:.2}/sec), state: {}\n",
        snapshot.alert_window_count, snapshot.alert_rate, snapshot.alert_state,
    ));
    out
}

fn render_table(details: &[SectionDetail]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:>8} {:>8}\n",
        "Section", "Hits", "Errors"
    ));
    out.push_str(&format!("{}\n", "-".repeat(42)));

    if details.is_empty() {
        out.push_str("(no events)\n");
    }
    for detail in details {
        out.push_str(&format!(
            "{:<24} {:>8} {:>8}\n",
            detail.section, detail.hits, detail.errors
        ));
    }
    out.push('\n');
    out
}
