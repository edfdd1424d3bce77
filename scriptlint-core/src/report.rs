//! Output formatting - plaintext and JSON.
//!
//! Both formats run the diagnostics through the display boundary first:
//! invalid ranges are dropped and the rest sorted by start offset.

use crate::diagnostic::{for_display, line_col, Diagnostic};
use serde_json::json;

/// Render diagnostics as human-readable lines with 1-indexed positions.
pub fn render_plain(source: &str, diagnostics: &[Diagnostic]) -> String {
    let shown = for_display(diagnostics);
    if shown.is_empty() {
        return "No problems found.\n".to_string();
    }

    let mut out = String::new();
    for d in &shown {
        let (line, col) = line_col(source, d.start);
        out.push_str(&format!(
            "{}:{}: {}: {} ({})\n",
            line, col, d.severity, d.message, d.fix_hint
        ));
    }
    out.push_str(&format!("{} problem(s) found.\n", shown.len()));
    out
}

/// Prints diagnostics in plain text format.
pub fn print_plain(source: &str, diagnostics: &[Diagnostic]) {
    print!("{}", render_plain(source, diagnostics));
}

/// Prints diagnostics in JSON format.
///
/// Falls back to a minimal shape if serialization fails (should never
/// happen for these types, but the batch must not abort).
pub fn print_json(diagnostics: &[Diagnostic]) {
    let shown = for_display(diagnostics);
    match serde_json::to_string_pretty(&json!({ "diagnostics": shown })) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{{\"diagnostics\": []}}");
        }
    }
}
