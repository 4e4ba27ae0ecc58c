// ABOUTME: Number, duration and label formatting helpers.
// ABOUTME: Produces the short strings shown in chart labels and tooltips.

/// Average glyph advance as a fraction of font size, for label fitting
const CHAR_WIDTH_RATIO: f32 = 0.6;

const ELLIPSIS: char = '…';

/// Short human number: `950`, `1.2K`, `3.4M`, `1.0B`
pub fn compact(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let mut scaled = value.abs();

    if scaled < 1000.0 {
        return format!("{}{}", sign, plain(scaled));
    }

    let suffixes = ["K", "M", "B", "T"];
    let mut idx = 0;
    scaled /= 1000.0;
    // Step up when rounding to one decimal would print 1000.0
    while (scaled * 10.0).round() / 10.0 >= 1000.0 && idx + 1 < suffixes.len() {
        scaled /= 1000.0;
        idx += 1;
    }
    format!("{}{:.1}{}", sign, scaled, suffixes[idx])
}

/// Integer when whole, one decimal otherwise
fn plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// `0.1234` -> `12.3%` at one decimal
pub fn percent(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, ratio * 100.0)
}

/// Delta with an explicit sign: `+3.2%`, `-1.0%`, `0.0%`
pub fn signed_percent(ratio: f64, decimals: usize) -> String {
    let body = percent(ratio.abs(), decimals);
    let rounded_zero = body.trim_end_matches('%').chars().all(|c| c == '0' || c == '.');
    if rounded_zero {
        body
    } else if ratio < 0.0 {
        format!("-{}", body)
    } else {
        format!("+{}", body)
    }
}

/// Value followed by its unit; `%` attaches without a space
pub fn with_unit(value: f64, unit: &str) -> String {
    match unit {
        "" => plain(value),
        "%" => format!("{}%", plain(value)),
        _ => format!("{} {}", plain(value), unit),
    }
}

/// Elapsed time in the two most significant units: `45s`, `3m 05s`, `2h 07m`, `3d 4h`
pub fn duration(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if seconds < MINUTE {
        format!("{}s", seconds)
    } else if seconds < HOUR {
        format!("{}m {:02}s", seconds / MINUTE, seconds % MINUTE)
    } else if seconds < DAY {
        format!("{}h {:02}m", seconds / HOUR, (seconds % HOUR) / MINUTE)
    } else {
        format!("{}d {}h", seconds / DAY, (seconds % DAY) / HOUR)
    }
}

/// `1st`, `2nd`, `3rd`, `4th`, `11th`, `22nd`
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Cut `label` to at most `max_chars` characters, ending in an ellipsis if cut
pub fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = label.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Estimated rendered width of `label` in px
pub fn text_width(label: &str, font_size: f32) -> f32 {
    label.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO
}

/// Fit `label` into `width` px. None if not even one character and the
/// ellipsis would fit.
pub fn fit_label(label: &str, width: f32, font_size: f32) -> Option<String> {
    if font_size <= 0.0 || width <= 0.0 {
        return None;
    }
    let max_chars = (width / (font_size * CHAR_WIDTH_RATIO)).floor() as usize;
    if label.chars().count() <= max_chars {
        return Some(label.to_string());
    }
    if max_chars < 2 {
        return None;
    }
    Some(truncate(label, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_picks_suffix() {
        assert_eq!(compact(950.0), "950");
        assert_eq!(compact(12.5), "12.5");
        assert_eq!(compact(1234.0), "1.2K");
        assert_eq!(compact(3_400_000.0), "3.4M");
        assert_eq!(compact(1_000_000_000.0), "1.0B");
        assert_eq!(compact(-2500.0), "-2.5K");
    }

    #[test]
    fn compact_rolls_over_at_rounding_boundary() {
        assert_eq!(compact(999_960.0), "1.0M");
    }

    #[test]
    fn percent_formats() {
        assert_eq!(percent(0.1234, 1), "12.3%");
        assert_eq!(signed_percent(0.032, 1), "+3.2%");
        assert_eq!(signed_percent(-0.01, 1), "-1.0%");
        assert_eq!(signed_percent(0.00001, 1), "0.0%");
    }

    #[test]
    fn unit_spacing() {
        assert_eq!(with_unit(42.0, "ms"), "42 ms");
        assert_eq!(with_unit(99.5, "%"), "99.5%");
        assert_eq!(with_unit(7.0, ""), "7");
    }

    #[test]
    fn durations() {
        assert_eq!(duration(45), "45s");
        assert_eq!(duration(185), "3m 05s");
        assert_eq!(duration(2 * 3600 + 7 * 60 + 30), "2h 07m");
        assert_eq!(duration(3 * 86400 + 4 * 3600), "3d 4h");
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(113), "113th");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("Engineering", 20), "Engineering");
        assert_eq!(truncate("Engineering", 5), "Engi…");
        assert_eq!(truncate("Engineering", 0), "");
    }

    #[test]
    fn fit_label_respects_width() {
        // 12px font -> 7.2px per char
        assert_eq!(fit_label("Sales", 100.0, 12.0).as_deref(), Some("Sales"));
        assert_eq!(fit_label("Marketing", 40.0, 12.0).as_deref(), Some("Mark…"));
        assert_eq!(fit_label("Marketing", 10.0, 12.0), None);
    }
}
