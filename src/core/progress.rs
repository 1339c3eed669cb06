//! Status text to completion percentage.

/// Ordered policy table; the first row with a matching needle wins.
const POLICY: &[(&[&str], u8)] = &[
    (&["completed", "done"], 100),
    (&["in progress"], 50),
    (&["blocked"], 10),
];

/// Map a free-text status to one of 0, 10, 50 or 100.
///
/// Matching is a case-insensitive substring test against [`POLICY`] in
/// order, so `"Completed but blocked"` is 100 and `"Blocked - in progress"`
/// is 50. Empty or unrecognized text is 0.
pub fn classify(status: &str) -> u8 {
    let lowered = status.to_lowercase();
    POLICY
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, value)| *value)
        .unwrap_or(0)
}
