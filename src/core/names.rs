// Display-name rules.
//
// In-game names are 1-12 characters of letters, digits, spaces, hyphens and
// underscores. The game treats "Iron Bru", "iron_bru" and "IRON BRU" as the
// same account, so comparisons go through normalize().

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _-]{0,11}$").expect("invalid name regex");
}

/// Returns true if the name is a legal in-game display name.
pub fn is_valid(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Canonical form used for lookups and duplicate detection: lowercase,
/// underscores folded to spaces, runs of spaces collapsed.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase().replace('_', " ");
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}
