/// Fraction digits kept when an operand is written into a description.
pub const MAX_FRACTION_DIGITS: usize = 6;

/// Renders `value` the way the keypad display shows it: integral values
/// without a decimal point, others rounded to [`MAX_FRACTION_DIGITS`] with
/// trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == value.trunc() && value.abs() < 1e15 {
        // -0.0 prints as "-0"
        return format!("{}", value + 0.0);
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_point() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn fractions_are_rounded_and_trimmed() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(std::f64::consts::PI), "3.141593");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(-0.0000001), "0");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
