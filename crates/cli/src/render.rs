//! Text rendering of registry results.

use population_core::HistoryEntry;

/// Render a history as one `{ time, data }` block per entry, oldest first.
pub fn history(entries: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str("{\n");
        out.push('\t');
        out.push_str(&entry.time);
        out.push('\n');
        out.push('\t');
        out.push_str(&entry.data.to_string());
        out.push_str("\n}\n");
    }
    out
}
