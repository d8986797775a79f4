//! CSS length helpers shared by the dimension tracker and frame styling.
//!
//! Only pixel lengths are meaningful to the core: the canvas measures in
//! pixels and persisted dimensions are stored as numbers. Other units are
//! treated as unparseable and left to the styling surface.

/// Parse a CSS pixel length (`"120px"`, `"120"`, `" 120.5px "`) to a number.
///
/// Returns `None` for non-pixel units (`"50%"`, `"2em"`) and malformed input.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    if number.is_empty() {
        return None;
    }
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number as a CSS pixel length, dropping a trailing `.0`.
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{}px", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px_accepts_suffixed_and_bare() {
        assert_eq!(parse_px("120px"), Some(120.0));
        assert_eq!(parse_px("120"), Some(120.0));
        assert_eq!(parse_px(" 120.5px "), Some(120.5));
    }

    #[test]
    fn test_parse_px_rejects_other_units() {
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px("2em"), None);
        assert_eq!(parse_px(""), None);
        assert_eq!(parse_px("px"), None);
    }

    #[test]
    fn test_format_px_roundtrips() {
        assert_eq!(format_px(200.0), "200px");
        assert_eq!(format_px(10.5), "10.5px");
        assert_eq!(parse_px(&format_px(33.0)), Some(33.0));
    }
}
