//! Append-with-deduplication + oldest-first truncation to a byte budget.
//!
//! `append`/`similar` are pure functions over the memory block's `value` string; the
//! memory-block manager is the only caller that talks to the agent runtime.

use chrono::{DateTime, Utc};

/// Hard byte cap on a memory block's `value` after any update.
pub const MAX_BYTES: usize = 4800;

/// Marker line prepended when truncation has dropped one or more older entries.
pub const MARKER: &str = "--- OLDER ENTRIES TRUNCATED ---";

/// Similarity threshold for the dedup check below: named constant so the contract is
/// explicit rather than a magic number scattered across the substring and n-gram checks.
pub const SIMILARITY_THRESHOLD: f64 = 0.9;

const TRUNCATED_SUFFIX: &str = " [CONTENT TRUNCATED]";

fn delimiter(now: DateTime<Utc>) -> String {
    format!(
        "\n\n--- CONTEXT ENTRY ({} UTC) ---\n\n",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

const DELIM_PREFIX: &str = "\n\n--- CONTEXT ENTRY (";
const DELIM_SUFFIX: &str = ") ---\n\n";

/// Splits `s` into entry bodies on occurrences of the timestamp delimiter, in chronological
/// (oldest-first) order. `s` must not carry the `MARKER` prefix — strip it first.
fn split_entries(s: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut rest = s;
    loop {
        match rest.find(DELIM_PREFIX) {
            Some(start) => {
                entries.push(rest[..start].to_string());
                let after_prefix = &rest[start + DELIM_PREFIX.len()..];
                match after_prefix.find(DELIM_SUFFIX) {
                    Some(end) => {
                        rest = &after_prefix[end + DELIM_SUFFIX.len()..];
                    }
                    None => {
                        // Malformed trailing delimiter; keep the remainder as-is and stop.
                        entries.push(rest[start..].to_string());
                        return entries;
                    }
                }
            }
            None => {
                entries.push(rest.to_string());
                return entries;
            }
        }
    }
}

/// Strips one leading delimiter occurrence (used right after stripping `MARKER`, which is
/// always immediately followed by a delimiter before the first kept entry).
fn strip_leading_delimiter(s: &str) -> &str {
    if let Some(after_prefix) = s.strip_prefix(DELIM_PREFIX) {
        if let Some(end) = after_prefix.find(DELIM_SUFFIX) {
            return &after_prefix[end + DELIM_SUFFIX.len()..];
        }
    }
    s
}

/// Parses a block `value` into its entry bodies, oldest first. Tolerant of a leading `MARKER`
/// from a previous truncation.
fn parse_entries(value: &str) -> Vec<String> {
    match value.strip_prefix(MARKER) {
        Some(rest) => split_entries(strip_leading_delimiter(rest)),
        None => split_entries(value),
    }
}

fn char_ngrams(s: &str, n: usize) -> std::collections::HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n {
        let mut set = std::collections::HashSet::new();
        if !s.is_empty() {
            set.insert(s.to_string());
        }
        return set;
    }
    (0..=chars.len() - n)
        .map(|i| chars[i..i + n].iter().collect())
        .collect()
}

fn ngram_overlap(a: &str, b: &str) -> f64 {
    let grams_a = char_ngrams(a, 3);
    let grams_b = char_ngrams(b, 3);
    if grams_a.is_empty() || grams_b.is_empty() {
        return 0.0;
    }
    let intersection = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    intersection as f64 / union as f64
}

/// Query-aware textual similarity. Operates on formatted entry bodies only (never on
/// timestamps, which live in the delimiter and are never passed to this function): two entries
/// produced from genuinely different knowledge-graph queries have different node/fact content
/// and fail the overlap checks below on their own, with no extra query-tag bookkeeping
/// required. See `DESIGN.md` for the full rationale.
pub fn similar(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    if a == b {
        return true;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let len_ratio = shorter.len() as f64 / longer.len() as f64;
    if len_ratio >= SIMILARITY_THRESHOLD && longer.contains(shorter) {
        return true;
    }
    len_ratio >= SIMILARITY_THRESHOLD && ngram_overlap(a, b) > SIMILARITY_THRESHOLD
}

/// Truncates a byte string to at most `max_bytes`, respecting UTF-8 character boundaries.
fn take_prefix_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn truncate(existing_entries: &[String], new_entry: &str, now: DateTime<Utc>) -> String {
    let delim = delimiter(now);

    if new_entry.len() + MARKER.len() + delim.len() > MAX_BYTES {
        // The newest entry alone doesn't fit. Keep only what fits, including the suffix, so
        // the hard `len <= MAX_BYTES` invariant holds; see DESIGN.md.
        let available = MAX_BYTES.saturating_sub(MARKER.len() + delim.len() + TRUNCATED_SUFFIX.len());
        let prefix = take_prefix_bytes(new_entry, available);
        return format!("{MARKER}{delim}{prefix}{TRUNCATED_SUFFIX}");
    }

    let mut kept = vec![new_entry.to_string()];
    let mut size = new_entry.len();
    for entry in existing_entries.iter().rev() {
        let additional = delim.len() + entry.len();
        if size + additional + MARKER.len() + delim.len() <= MAX_BYTES {
            kept.push(entry.clone());
            size += additional;
        } else {
            break;
        }
    }
    kept.reverse();
    format!("{MARKER}{delim}{}", kept.join(&delim))
}

/// Core of `append`, with the timestamp injected for determinism in tests.
pub fn append_at(existing: &str, new: &str, now: DateTime<Utc>) -> String {
    let new_trimmed = new.trim();
    if new_trimmed.is_empty() {
        return existing.to_string();
    }
    if existing.trim().is_empty() {
        if new_trimmed.len() <= MAX_BYTES {
            return new_trimmed.to_string();
        }
        return truncate(&[], new_trimmed, now);
    }

    let entries = parse_entries(existing);
    if let Some(last) = entries.last() {
        if similar(last, new_trimmed) {
            return existing.to_string();
        }
    }

    let delim = delimiter(now);
    let candidate = format!("{existing}{delim}{new_trimmed}");
    if candidate.len() <= MAX_BYTES {
        return candidate;
    }
    truncate(&entries, new_trimmed, now)
}

/// Appends `new` to `existing`, deduplicating against the most recent entry and truncating
/// oldest-first to stay within `MAX_BYTES`.
pub fn append(existing: &str, new: &str) -> String {
    append_at(existing, new, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn empty_new_leaves_existing_unchanged() {
        assert_eq!(append_at("existing value", "", ts("2026-01-01 00:00:00")), "existing value");
        assert_eq!(append_at("existing value", "   ", ts("2026-01-01 00:00:00")), "existing value");
    }

    #[test]
    fn empty_existing_returns_new_verbatim() {
        assert_eq!(append_at("", "first entry", ts("2026-01-01 00:00:00")), "first entry");
        assert_eq!(append_at("   ", "first entry", ts("2026-01-01 00:00:00")), "first entry");
    }

    #[test]
    fn appends_with_delimiter_when_distinct() {
        let now = ts("2026-01-01 12:30:45");
        let result = append_at("first entry", "second entry", now);
        assert_eq!(result, "first entry\n\n--- CONTEXT ENTRY (2026-01-01 12:30:45 UTC) ---\n\nsecond entry");
    }

    #[test]
    fn dedups_against_most_recent_entry() {
        let now = ts("2026-01-01 12:30:45");
        let first = append_at("", "Relevant Entities from Knowledge Graph:\nNode: N\nSummary: S", now);
        let second = append_at(&first, "Relevant Entities from Knowledge Graph:\nNode: N\nSummary: S", now);
        assert_eq!(second, first);
    }

    #[test]
    fn idempotent_on_immediate_repeat() {
        let now = ts("2026-01-01 12:30:45");
        let once = append_at("base entry", "new content here", now);
        let twice = append_at(&once, "new content here", now);
        assert_eq!(once, twice);
    }

    #[test]
    fn distinct_entries_are_not_deduped() {
        let now = ts("2026-01-01 12:30:45");
        let a = append_at("", "Node: N1\nSummary: first summary about cats", now);
        let b = append_at(&a, "Node: N2\nSummary: second summary about dogs", now);
        assert_ne!(a, b);
        assert!(b.contains("N1"));
        assert!(b.contains("N2"));
        assert!(b.len() <= MAX_BYTES);
    }

    #[test]
    fn single_entry_of_exactly_max_bytes_kept_verbatim() {
        let entry = "x".repeat(MAX_BYTES);
        let result = append_at("", &entry, ts("2026-01-01 00:00:00"));
        assert_eq!(result, entry);
        assert!(!result.contains(MARKER));
    }

    #[test]
    fn single_entry_over_max_bytes_is_truncated_with_marker_and_suffix() {
        let entry = "y".repeat(MAX_BYTES + 1);
        let existing = "previous entry".to_string();
        let result = append_at(&existing, &entry, ts("2026-01-01 00:00:00"));
        assert!(result.starts_with(MARKER));
        assert!(result.ends_with(TRUNCATED_SUFFIX));
        assert!(result.len() <= MAX_BYTES);
    }

    #[test]
    fn first_entry_ever_over_max_bytes_is_still_capped() {
        // A brand-new block starts with an empty `value`; a first formatted context larger
        // than MAX_BYTES must still be capped rather than written through unbounded.
        let entry = "z".repeat(MAX_BYTES + 500);
        let result = append_at("", &entry, ts("2026-01-01 00:00:00"));
        assert!(result.len() <= MAX_BYTES);
        assert!(result.ends_with(TRUNCATED_SUFFIX));
    }

    #[test]
    fn truncation_drops_oldest_entries_first_and_keeps_newest() {
        let mut value = String::new();
        let mut now = ts("2026-01-01 00:00:00");
        for i in 0..40 {
            let entry = format!("entry number {i} {}", "z".repeat(150));
            value = append_at(&value, &entry, now);
            now += chrono::Duration::seconds(1);
        }
        assert!(value.len() <= MAX_BYTES, "value exceeded cap: {}", value.len());

        let newest = format!("entry number 39 {}", "z".repeat(150));
        if value.contains(MARKER) {
            assert!(value.starts_with(MARKER));
        }
        assert!(value.contains(&newest), "newest entry missing from truncated value");
    }

    #[test]
    fn append_is_idempotent_via_append_append() {
        let now = ts("2026-01-01 00:00:00");
        let e = "base".to_string();
        let once = append_at(&e, "X", now);
        let appended_twice = append_at(&once, "X", now);
        assert_eq!(once, appended_twice);
    }

    #[test]
    fn similar_exact_match() {
        assert!(similar("hello world", "hello world"));
    }

    #[test]
    fn similar_substring_within_threshold() {
        let long = "Relevant Entities from Knowledge Graph:\nNode: Acme\nSummary: A widget company";
        let short = &long[..long.len() - 2];
        assert!(similar(long, short));
    }

    #[test]
    fn dissimilar_short_substring_below_threshold() {
        let long = "Relevant Entities from Knowledge Graph:\nNode: Acme\nSummary: A widget company making things";
        let short = "Relevant Entities";
        assert!(!similar(long, short));
    }

    #[test]
    fn dissimilar_distinct_query_results() {
        let a = "Relevant Entities from Knowledge Graph:\nNode: Weather\nSummary: Sunny in Austin";
        let b = "Relevant Entities from Knowledge Graph:\nNode: Billing\nSummary: Invoice #4521 overdue";
        assert!(!similar(a, b));
    }

    #[test]
    fn empty_strings_are_similar_to_each_other_only() {
        assert!(similar("", ""));
        assert!(!similar("", "content"));
    }
}
