//! Ordered-magnitude parsing for revenue and employee bucket labels.
//!
//! Upstream profile fields arrive as free-text labels ("$10M", "1,000+",
//! "201-500 employees"). Range comparisons must never fall back to lexical
//! string ordering, so every comparison goes through [`bucket_key`]: a label's
//! ordering key is the numeric magnitude of its lower edge. Unparseable or
//! absent labels yield `None`, and any comparison involving `None` fails
//! closed (the caller simply skips the range bonus).

/// Parses a bucket label into its ordering key (the lower edge magnitude).
///
/// Accepted forms, case-insensitive:
/// - plain numbers with optional `$` and comma grouping: `"500"`, `"$1,000"`
/// - `K`/`M`/`B` suffixes: `"$10M"`, `"250k"`
/// - open-ended labels: `"1,000+"`, `"$1B+"`
/// - ranges, keyed by their lower edge: `"201-500"`, `"$10M-$50M"`
/// - trailing words are ignored: `"500 employees"`
pub fn bucket_key(label: &str) -> Option<u64> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Ranges order by their lower edge. Split on '-' only when both sides
    // look numeric, so "mid-market" is not treated as a range.
    if let Some((lo, hi)) = trimmed.split_once('-') {
        if starts_numeric(lo) && starts_numeric(hi) {
            return parse_magnitude(lo);
        }
    }

    parse_magnitude(trimmed)
}

/// Returns true when `min <= value <= max` in bucket order. Any unparseable
/// label, or an inverted `min > max` pair, yields false.
pub fn within_range(value: &str, min: &str, max: &str) -> bool {
    match (bucket_key(value), bucket_key(min), bucket_key(max)) {
        (Some(v), Some(lo), Some(hi)) => lo <= hi && v >= lo && v <= hi,
        _ => false,
    }
}

/// Maps an employee bucket label to the coarse size tier reported in
/// `MatchDetails.companySize`.
pub fn company_size_label(employees: Option<&str>) -> &'static str {
    let key = match employees.and_then(bucket_key) {
        Some(k) => k,
        None => return "Unknown",
    };
    if key < 50 {
        "Small"
    } else if key < 250 {
        "Medium"
    } else if key < 1000 {
        "Large"
    } else {
        "Enterprise"
    }
}

fn starts_numeric(s: &str) -> bool {
    s.trim()
        .trim_start_matches('$')
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
}

fn parse_magnitude(raw: &str) -> Option<u64> {
    let cleaned = raw
        .trim()
        .trim_start_matches('$')
        .trim_end_matches('+')
        .trim()
        .to_lowercase();

    // Take the leading numeric run (digits, commas, one decimal point) and
    // an optional magnitude suffix directly after it.
    let mut digits = String::new();
    let mut rest = cleaned.as_str();
    for (i, c) in cleaned.char_indices() {
        if c.is_ascii_digit() || c == ',' || c == '.' {
            digits.push(c);
        } else {
            rest = &cleaned[i..];
            break;
        }
        rest = "";
    }
    if digits.is_empty() {
        return None;
    }

    let number: f64 = digits.replace(',', "").parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }

    let multiplier = match rest.trim_start().chars().next() {
        Some('k') => 1_000.0,
        Some('m') => 1_000_000.0,
        Some('b') => 1_000_000_000.0,
        _ => 1.0,
    };

    let value = number * multiplier;
    if value > u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}
