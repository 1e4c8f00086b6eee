//! Maps a pump model to an estimated processing duration in days.
//!
//! The model field is open-ended business data, so matching is by
//! case-insensitive substring against tiered pattern lists. Tiers are
//! checked in a fixed priority order; the first matching tier wins.

/// Duration used when no tier matches the model string.
pub const DEFAULT_DURATION_DAYS: i64 = 2;

/// Pattern tiers in priority order. Longer-lead families first so a model
/// matching several tiers gets the longer estimate.
const DURATION_TIERS: &[(&[&str], i64)] = &[
    (&["split-case", "split case", "multistage", "between-bearing"], 4),
    (&["slurry", "chopper", "grinder", "vertical turbine"], 3),
    (&["end-suction", "end suction", "ansi", "self-priming"], 2),
];

/// Estimates how many production days a pump of the given model occupies
/// on the calendar. Total over arbitrary model strings; unknown models
/// fall back to [`DEFAULT_DURATION_DAYS`].
pub fn estimate_duration_days(model: &str) -> i64 {
    let needle = model.to_ascii_lowercase();
    for (patterns, days) in DURATION_TIERS {
        if patterns.iter().any(|p| needle.contains(p)) {
            return *days;
        }
    }
    DEFAULT_DURATION_DAYS
}
