//! Utility functions.

use std::time::Duration;

const UNITS: [(u64, &str); 4] = [(86400, "day"), (3600, "hour"), (60, "minute"), (1, "second")];

/// Format a duration in words, e.g. `900s` -> "15 minutes", `90s` -> "1 minute 30 seconds".
///
/// Every non-zero unit is shown, so the text never understates the delay.
pub fn format_duration(duration: Duration) -> String {
    let mut rest = duration.as_secs();
    if rest == 0 {
        return plural(0, "second");
    }

    let mut parts = Vec::new();
    for (size, unit) in UNITS {
        let n = rest / size;
        if n > 0 {
            parts.push(plural(n, unit));
            rest %= size;
        }
    }
    parts.join(" ")
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
