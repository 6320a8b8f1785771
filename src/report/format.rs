// Presentation helpers: unit-aware values, signed percentages, trimming
//
// All helpers are total. Undefined or non-finite inputs render as an empty
// string, never as "0".

use crate::metric::Unit;

/// Longest text cell shown before trimming
pub const MAX_TEXT_LEN: usize = 150;

const SI_PREFIXES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];

/// Format a value according to its unit
///
/// # Example
/// ```
/// use benchdiff::metric::Unit;
/// use benchdiff::report::format_value;
///
/// assert_eq!(format_value(&Unit::Milliseconds, Some(100.0)), "100.00ms");
/// assert_eq!(format_value(&Unit::Milliseconds, Some(75_000.0)), "1m 15.000s");
/// assert_eq!(format_value(&Unit::Bytes, Some(1_500.0)), "1.50 kB");
/// assert_eq!(format_value(&Unit::Percent, Some(42.0)), "42.00%");
/// assert_eq!(format_value(&Unit::QueryPerSecond, Some(3.5)), "3.50/s");
/// assert_eq!(format_value(&Unit::Bytes, None), "");
/// ```
pub fn format_value(unit: &Unit, value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return String::new();
    };
    match unit {
        Unit::Milliseconds => format_duration_ms(value),
        Unit::Bytes => format_bytes(value),
        Unit::Percent => format!("{:.2}%", value),
        Unit::QueryPerSecond => format!("{:.2}/s", value),
        Unit::Unitless | Unit::Other(_) => format_number(value),
    }
}

/// `mean` range of a summary as `min .. max`
pub fn format_range(unit: &Unit, min: f64, max: f64) -> String {
    format!(
        "{} .. {}",
        format_value(unit, Some(min)),
        format_value(unit, Some(max))
    )
}

/// Signed percentage with a direction arrow
///
/// # Example
/// ```
/// use benchdiff::report::format_diff_pct;
///
/// assert_eq!(format_diff_pct(Some(16.666)), "▲ 16.67%");
/// assert_eq!(format_diff_pct(Some(-5.0)), "▼ 5.00%");
/// assert_eq!(format_diff_pct(Some(0.0)), "= 0.00%");
/// assert_eq!(format_diff_pct(None), "");
/// ```
pub fn format_diff_pct(pct: Option<f64>) -> String {
    match pct.filter(|p| p.is_finite()) {
        None => String::new(),
        Some(p) if p > 0.0 => format!("▲ {:.2}%", p),
        Some(p) if p < 0.0 => format!("▼ {:.2}%", -p),
        Some(_) => "= 0.00%".to_string(),
    }
}

/// Plain number: integral values without decimals, others with two
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn format_duration_ms(ms: f64) -> String {
    let sign = if ms < 0.0 { "-" } else { "" };
    let abs = ms.abs();
    if abs < 1_000.0 {
        return format!("{}{:.2}ms", sign, abs);
    }
    if abs < 60_000.0 {
        return format!("{}{:.3}s", sign, abs / 1_000.0);
    }

    let total_secs = abs / 1_000.0;
    let hours = (total_secs / 3_600.0).floor();
    let minutes = ((total_secs - hours * 3_600.0) / 60.0).floor();
    let secs = total_secs - hours * 3_600.0 - minutes * 60.0;
    if hours > 0.0 {
        format!(
            "{}{}h {:02}m {:06.3}s",
            sign, hours as u64, minutes as u64, secs
        )
    } else {
        format!("{}{}m {:06.3}s", sign, minutes as u64, secs)
    }
}

fn format_bytes(bytes: f64) -> String {
    let sign = if bytes < 0.0 { "-" } else { "" };
    let mut scaled = bytes.abs();
    let mut prefix = 0;
    while scaled >= 1_000.0 && prefix < SI_PREFIXES.len() - 1 {
        scaled /= 1_000.0;
        prefix += 1;
    }
    if prefix == 0 {
        format!("{}{:.0} B", sign, scaled)
    } else {
        format!("{}{:.2} {}B", sign, scaled, SI_PREFIXES[prefix])
    }
}

/// First `MAX_TEXT_LEN` characters plus `...` for long or multi-line text
///
/// Line breaks inside the kept prefix are preserved.
pub fn trim_long(value: &str) -> String {
    if value.chars().count() > MAX_TEXT_LEN || value.contains('\n') {
        let mut trimmed: String = value.chars().take(MAX_TEXT_LEN).collect();
        trimmed.push_str("...");
        trimmed
    } else {
        value.to_string()
    }
}

/// File-name friendly form of a title
///
/// # Example
/// ```
/// use benchdiff::report::slugify;
///
/// assert_eq!(slugify("Top 5 Diffs (per metric)"), "top-5-diffs-per-metric");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_durations() {
        assert_eq!(format_value(&Unit::Milliseconds, Some(0.5)), "0.50ms");
        assert_eq!(format_value(&Unit::Milliseconds, Some(1_500.0)), "1.500s");
        assert_eq!(format_value(&Unit::Milliseconds, Some(65_000.0)), "1m 05.000s");
        assert_eq!(
            format_value(&Unit::Milliseconds, Some(3_700_000.0)),
            "1h 01m 40.000s"
        );
        assert_eq!(format_value(&Unit::Milliseconds, Some(-20.0)), "-20.00ms");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_value(&Unit::Bytes, Some(512.0)), "512 B");
        assert_eq!(format_value(&Unit::Bytes, Some(2_000_000.0)), "2.00 MB");
        assert_eq!(format_value(&Unit::Bytes, Some(-3_000_000_000.0)), "-3.00 GB");
    }

    #[test]
    fn test_format_other_units() {
        assert_eq!(format_value(&Unit::Unitless, Some(12.0)), "12");
        assert_eq!(format_value(&Unit::Other("ROWS".into()), Some(1.234)), "1.23");
    }

    #[test]
    fn test_undefined_values_render_empty() {
        assert_eq!(format_value(&Unit::Percent, None), "");
        assert_eq!(format_value(&Unit::Percent, Some(f64::NAN)), "");
        assert_eq!(format_diff_pct(Some(f64::INFINITY)), "");
    }

    #[test]
    fn test_format_range() {
        assert_eq!(
            format_range(&Unit::Milliseconds, 98.0, 102.0),
            "98.00ms .. 102.00ms"
        );
    }

    #[test]
    fn test_trim_long() {
        assert_eq!(trim_long("short"), "short");
        let long = "x".repeat(200);
        let trimmed = trim_long(&long);
        assert_eq!(trimmed.chars().count(), 153);
        assert!(trimmed.ends_with("..."));
        assert_eq!(trim_long("first\nsecond"), "first\nsecond...");
        assert_eq!(trim_long("only line\n"), "only line\n...");

        let long_lines = format!("{}\n{}", "a".repeat(100), "b".repeat(100));
        let trimmed = trim_long(&long_lines);
        assert_eq!(trimmed, format!("{}\n{}...", "a".repeat(100), "b".repeat(49)));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Environment Health"), "environment-health");
        assert_eq!(slugify("  --Diffs--  "), "diffs");
        assert_eq!(slugify(""), "");
    }
}
