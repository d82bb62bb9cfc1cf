//! Display formatting for money figures.
//!
//! Values keep full precision internally; only presentation rounds.

pub const DISPLAY_DECIMALS: usize = 2;

pub fn format_amount(value: f64) -> String {
    format_amount_with(value, DISPLAY_DECIMALS)
}

pub fn format_amount_with(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value);
    // Avoid "-0.00"
    if rendered.starts_with('-') && rendered[1..].chars().all(|c| c == '0' || c == '.') {
        rendered[1..].to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals() {
        assert_eq!(format_amount(3.0), "3.00");
        assert_eq!(format_amount(12.345_678), "12.35");
        assert_eq!(format_amount(-0.001), "0.00");
        assert_eq!(format_amount(-1.5), "-1.50");
    }

    #[test]
    fn test_custom_decimals() {
        assert_eq!(format_amount_with(1.23456, 4), "1.2346");
    }
}
