//! Float token formatting
//!
//! Floats travel in C `%g` layout: plain notation for decimal exponents in
//! `-4..16`, scientific (`d.ddde+XX`) otherwise, trailing zeros trimmed.
//! Digits come from Rust's shortest round-trip representation, so every
//! finite `f64` parses back to the identical value.

/// Exponent at which `%.16g` switches to scientific notation.
const SCIENTIFIC_THRESHOLD: i32 = 16;

/// Format a float as a wire token.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    let sci = format!("{value:e}");
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }

    if !(-4..SCIENTIFIC_THRESHOLD).contains(&exponent) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exponent.unsigned_abs()));
    } else if exponent < 0 {
        out.push_str("0.");
        for _ in 0..(-exponent - 1) {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        // 0 <= exponent < 16, so the cast is lossless
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            out.push_str(&digits);
            for _ in digits.len()..int_len {
                out.push('0');
            }
        } else {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        }
    }

    out
}

/// Parse a float token written by [`format_float`] or by the host's `%g`.
#[must_use]
pub fn parse_float(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_printf_layout() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-2.25), "-2.25");
        assert_eq!(format_float(100.0), "100");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(1e15), "1000000000000000");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e300), "1.5e+300");
        assert_eq!(format_float(-3.25e-200), "-3.25e-200");
        assert_eq!(format_float(0.0), "0");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(parse_float("inf"), Some(f64::INFINITY));
        assert_eq!(parse_float("-inf"), Some(f64::NEG_INFINITY));
        assert!(parse_float("nan").unwrap().is_nan());
    }

    #[test]
    fn test_extremes_roundtrip_exactly() {
        for value in [
            f64::MAX,
            -f64::MAX,
            f64::MIN_POSITIVE,
            5e-324,
            std::f64::consts::PI,
            0.1 + 0.2,
            1.0 / 3.0,
            123_456_789.123_456_79,
        ] {
            let token = format_float(value);
            assert_eq!(parse_float(&token), Some(value), "token {token}");
        }
    }

    #[test]
    fn test_parses_host_exponent_forms() {
        assert_eq!(parse_float("1e+308"), Some(1e308));
        assert_eq!(parse_float("2.5E-3"), Some(2.5e-3));
        assert_eq!(parse_float(" 7 "), Some(7.0));
        assert_eq!(parse_float("abc"), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every finite double survives formatting
            #[test]
            fn prop_finite_roundtrip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
                let token = format_float(value);
                prop_assert_eq!(parse_float(&token), Some(value));
            }

            /// Property: tokens never carry more than 17 significant digits
            #[test]
            fn prop_digit_count_bounded(value in any::<f64>().prop_filter("finite", |v| v.is_finite() && *v != 0.0)) {
                let token = format_float(value);
                let mantissa = token.split('e').next().unwrap_or_default();
                let significant = mantissa
                    .chars()
                    .filter(char::is_ascii_digit)
                    .collect::<String>();
                let significant = significant.trim_start_matches('0').trim_end_matches('0');
                prop_assert!(significant.len() <= 17, "token {}", token);
            }
        }
    }
}
