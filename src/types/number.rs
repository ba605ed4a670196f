use super::ValueError;

/// Largest finite single precision magnitude, `(2 - 2^-23) * 2^127`.
pub const FLOAT32_MAX: f64 = 3.4028234663852886e38;

fn invalid_literal(kind: &str, text: &str) -> ValueError {
    ValueError::Value(format!("invalid literal for {}: '{}'", kind, text))
}

/// Parses an integer whose base is given by an optional `0x`, `0o` or `0b`
/// prefix. Decimal literals may not carry leading zeros, underscores may
/// separate digits.
pub fn parse_int_literal(text: &str) -> Result<i128, ValueError> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest.to_string())
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest.to_string())
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest.to_string())
    } else {
        (10, lower.clone())
    };

    let digits =
        strip_underscores(&digits, radix != 10).ok_or_else(|| invalid_literal("int", text))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid_literal("int", text));
    }
    if radix == 10 && digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0')
    {
        return Err(invalid_literal("int", text));
    }

    let magnitude = i128::from_str_radix(&digits, radix).map_err(|_| ValueError::Overflow {
        type_name: "int",
        literal: text.to_string(),
    })?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Single underscores between digits are allowed and dropped. One may also
/// follow a base prefix directly.
fn strip_underscores(digits: &str, prefixed: bool) -> Option<String> {
    let digits = match digits.strip_prefix('_') {
        Some(rest) if prefixed => rest,
        Some(_) => return None,
        None => digits,
    };
    if digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    Some(digits.replace('_', ""))
}

/// Parses a float literal, including `inf`, `infinity` and `nan` in any
/// case. Returns the value and whether the literal spelled out infinity.
pub fn parse_float_literal(text: &str) -> Result<(f64, bool), ValueError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| invalid_literal("float", text))?;
    let unsigned = trimmed.trim_start_matches(['+', '-']).to_ascii_lowercase();
    let literal_infinity = unsigned == "inf" || unsigned == "infinity";
    Ok((value, literal_infinity))
}

/// Parses a float that must fit in single precision. Values that only
/// became infinite by overflowing are rejected.
pub fn parse_float32(text: &str) -> Result<f64, ValueError> {
    let (value, literal_infinity) = parse_float_literal(text)?;
    let overflowed = if value.is_infinite() {
        !literal_infinity
    } else {
        value.abs() > FLOAT32_MAX
    };
    if overflowed {
        return Err(ValueError::Overflow {
            type_name: "Float",
            literal: text.to_string(),
        });
    }
    Ok(value)
}
