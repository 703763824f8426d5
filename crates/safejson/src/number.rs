/// Format a finite f64 the way JSON encoders conventionally do:
/// - plain decimal notation for magnitudes in `[1e-6, 1e21)`
/// - exponent notation (`1e+21`, `1.5e-07`) outside that range
/// - no trailing fractional zeros, so `1.0` is written `1`
/// - -0 normalized to 0
pub(crate) fn format_canonical_f64(value: f64) -> String {
    if !value.is_finite() {
        debug_assert!(false, "format_canonical_f64 called with non-finite value");
        return String::from("null");
    }
    if value == 0.0 {
        return String::from("0");
    }

    let magnitude = value.abs();
    let mut buf = ryu::Buffer::new();
    let raw = buf.format_finite(magnitude);
    let (mantissa, exp) = match raw.find(['e', 'E']) {
        Some(idx) => (&raw[..idx], raw[idx + 1..].parse::<i32>().unwrap_or(0)),
        None => (raw, 0),
    };

    let body = if (1e-6..1e21).contains(&magnitude) {
        trim_fraction(expand_exponent(mantissa, exp))
    } else {
        exponent_form(mantissa, exp)
    };

    if value < 0.0 {
        let mut out = String::with_capacity(body.len() + 1);
        out.push('-');
        out.push_str(&body);
        out
    } else {
        body
    }
}

/// `mantissa` is ryu output without sign or exponent, e.g. `1.5` or `12.0`.
fn exponent_form(mantissa: &str, exp: i32) -> String {
    // ryu keeps one digit before the point once it switches to exponents, but
    // plain outputs (no exponent) must be shifted first.
    let (digits, shift) = normalize_mantissa(mantissa);
    let exp = exp + shift;
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", digits, sign, exp.unsigned_abs())
}

/// Rewrites `mantissa` as `d[.ddd]` and returns the exponent adjustment.
fn normalize_mantissa(mantissa: &str) -> (String, i32) {
    let int_len = mantissa.find('.').unwrap_or(mantissa.len());
    let all: String = mantissa.chars().filter(|c| *c != '.').collect();
    let lead = all.find(|c| c != '0').unwrap_or(0);
    let significant = all[lead..].trim_end_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };
    let shift = int_len as i32 - lead as i32 - 1;
    let out = if significant.len() > 1 {
        format!("{}.{}", &significant[..1], &significant[1..])
    } else {
        significant.to_string()
    };
    (out, shift)
}

fn expand_exponent(mantissa: &str, exp: i32) -> String {
    if exp == 0 {
        return mantissa.to_string();
    }
    let mut digits = Vec::with_capacity(mantissa.len());
    let mut point_index = None;
    for &b in mantissa.as_bytes() {
        if b == b'.' {
            point_index = Some(digits.len());
        } else {
            digits.push(b);
        }
    }
    let point_index = point_index.unwrap_or(digits.len()) as i32 + exp;

    let mut result = String::with_capacity(digits.len() + 8);
    if point_index <= 0 {
        result.push_str("0.");
        for _ in 0..(-point_index) {
            result.push('0');
        }
        result.extend(digits.iter().map(|&d| d as char));
    } else if point_index as usize >= digits.len() {
        result.extend(digits.iter().map(|&d| d as char));
        for _ in digits.len()..point_index as usize {
            result.push('0');
        }
    } else {
        for (idx, &d) in digits.iter().enumerate() {
            if idx == point_index as usize {
                result.push('.');
            }
            result.push(d as char);
        }
    }
    result
}

fn trim_fraction(mut s: String) -> String {
    if let Some(dot_pos) = s.find('.') {
        let trimmed = s[dot_pos..].trim_end_matches('0').len();
        s.truncate(dot_pos + trimmed);
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::format_canonical_f64;

    #[test]
    fn plain_range() {
        assert_eq!(format_canonical_f64(1.0), "1");
        assert_eq!(format_canonical_f64(-0.5), "-0.5");
        assert_eq!(format_canonical_f64(1.5), "1.5");
        assert_eq!(format_canonical_f64(-0.0), "0");
        assert_eq!(format_canonical_f64(1e16), "10000000000000000");
        assert_eq!(format_canonical_f64(0.000001), "0.000001");
        assert_eq!(format_canonical_f64(123456.789), "123456.789");
    }

    #[test]
    fn exponent_range() {
        assert_eq!(format_canonical_f64(1e21), "1e+21");
        assert_eq!(format_canonical_f64(1.5e300), "1.5e+300");
        assert_eq!(format_canonical_f64(1e-7), "1e-07");
        assert_eq!(format_canonical_f64(-2.5e-9), "-2.5e-09");
    }
}
