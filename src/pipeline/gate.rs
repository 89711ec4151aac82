//! Text gate filtering recognition output before translation.

/// Decides whether a recognized candidate should enter the pipeline.
///
/// Rules are applied in order:
/// 1. Candidates that are empty after trimming are rejected.
/// 2. Candidates matching the denylist (case-insensitive, compared against
///    the trimmed candidate) are rejected. The denylist covers filler
///    phrases the recognition engine produces for near-silent audio.
/// 3. Candidates exactly equal to the previously accepted text
///    (case-sensitive) are rejected, so a speaker holding a phrase across
///    chunk boundaries does not produce duplicate translations.
///
/// Comparison uses the trimmed candidate, which is also what callers are
/// expected to store as the previously accepted text.
pub fn accept(candidate: &str, previous: Option<&str>, denylist: &[String]) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lowered = trimmed.to_lowercase();
    if denylist.iter().any(|entry| entry.to_lowercase() == lowered) {
        return false;
    }

    if previous.is_some_and(|p| p == trimmed) {
        return false;
    }

    true
}
