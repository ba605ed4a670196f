//! The printf-style format strings that value types may declare for their
//! string and repr forms. A format holds exactly one numeric directive,
//! surrounded by literal text where `%%` stands for a percent sign.

use std::fmt;

use super::ValueTypeError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Decimal,
    Octal,
    Hex { upper: bool },
    Exponent { upper: bool },
    Fixed { upper: bool },
    General { upper: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintfFormat {
    source: String,
    prefix: String,
    directive: Directive,
    suffix: String,
}

impl PrintfFormat {
    /// Parses a format string. `what` names the metadata field in errors.
    pub fn parse(source: &str, what: &'static str) -> Result<Self, ValueTypeError> {
        if source.contains("%s") || source.contains("%r") {
            return Err(ValueTypeError::CircularFormat(what));
        }
        let unsupported = || ValueTypeError::UnsupportedFormat(source.to_string());

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut directive = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                match directive {
                    None => prefix.push(c),
                    Some(_) => suffix.push(c),
                }
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                match directive {
                    None => prefix.push('%'),
                    Some(_) => suffix.push('%'),
                }
                continue;
            }
            if directive.is_some() {
                return Err(unsupported());
            }

            let mut flags = Flags::default();
            while let Some(&f) = chars.peek() {
                match f {
                    '-' => flags.left = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero = true,
                    '#' => flags.alternate = true,
                    _ => break,
                }
                chars.next();
            }
            let width = take_number(&mut chars);
            let precision = if chars.peek() == Some(&'.') {
                chars.next();
                Some(take_number(&mut chars).unwrap_or(0))
            } else {
                None
            };
            let conversion = match chars.next() {
                Some('d') | Some('i') | Some('u') => Conversion::Decimal,
                Some('o') => Conversion::Octal,
                Some('x') => Conversion::Hex { upper: false },
                Some('X') => Conversion::Hex { upper: true },
                Some('e') => Conversion::Exponent { upper: false },
                Some('E') => Conversion::Exponent { upper: true },
                Some('f') => Conversion::Fixed { upper: false },
                Some('F') => Conversion::Fixed { upper: true },
                Some('g') => Conversion::General { upper: false },
                Some('G') => Conversion::General { upper: true },
                _ => return Err(unsupported()),
            };
            directive = Some(Directive {
                flags,
                width,
                precision,
                conversion,
            });
        }

        Ok(Self {
            source: source.to_string(),
            prefix,
            directive: directive.ok_or_else(unsupported)?,
            suffix,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn render(&self, arg: FormatArg) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            self.directive.render(arg),
            self.suffix
        )
    }
}

impl fmt::Display for PrintfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

impl Directive {
    fn render(&self, arg: FormatArg) -> String {
        let (negative, body, numeric) = match self.conversion {
            Conversion::Decimal | Conversion::Octal | Conversion::Hex { .. } => {
                let value = match arg {
                    FormatArg::Int(v) => v as i128,
                    FormatArg::Float(v) if v.is_finite() => v.trunc() as i128,
                    FormatArg::Float(v) => return self.pad(v.is_sign_negative(), non_finite(v, false), false),
                };
                (value < 0, self.render_integer(value.unsigned_abs()), true)
            }
            _ => {
                let value = match arg {
                    FormatArg::Int(v) => v as f64,
                    FormatArg::Float(v) => v,
                };
                if !value.is_finite() {
                    let upper = matches!(
                        self.conversion,
                        Conversion::Exponent { upper: true }
                            | Conversion::Fixed { upper: true }
                            | Conversion::General { upper: true }
                    );
                    return self.pad(value.is_sign_negative() && !value.is_nan(), non_finite(value, upper), false);
                }
                (value.is_sign_negative(), self.render_float(value.abs()), true)
            }
        };
        self.pad(negative, body, numeric)
    }

    fn render_integer(&self, magnitude: u128) -> String {
        let (digits, radix_prefix) = match self.conversion {
            Conversion::Octal => (format!("{:o}", magnitude), "0o"),
            Conversion::Hex { upper: false } => (format!("{:x}", magnitude), "0x"),
            Conversion::Hex { upper: true } => (format!("{:X}", magnitude), "0X"),
            _ => (magnitude.to_string(), ""),
        };
        let digits = match self.precision {
            Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
            _ => digits,
        };
        if self.flags.alternate {
            format!("{}{}", radix_prefix, digits)
        } else {
            digits
        }
    }

    fn render_float(&self, magnitude: f64) -> String {
        let precision = self.precision.unwrap_or(6);
        match self.conversion {
            Conversion::Fixed { .. } => format!("{:.*}", precision, magnitude),
            Conversion::Exponent { upper } => exponent_form(magnitude, precision, upper),
            Conversion::General { upper } => {
                let significant = precision.max(1);
                let exponent = decimal_exponent(magnitude, significant);
                let text = if exponent < -4 || exponent >= significant as i32 {
                    exponent_form(magnitude, significant - 1, upper)
                } else {
                    let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
                    format!("{:.*}", decimals, magnitude)
                };
                if self.flags.alternate {
                    text
                } else {
                    strip_trailing_zeros(&text)
                }
            }
            _ => magnitude.to_string(),
        }
    }

    fn pad(&self, negative: bool, body: String, numeric: bool) -> String {
        let sign = if negative {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        };
        let len = sign.len() + body.len();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return format!("{}{}", sign, body);
        }
        let fill = width - len;
        if self.flags.left {
            format!("{}{}{}", sign, body, " ".repeat(fill))
        } else if self.flags.zero && numeric {
            // zeros go between the sign and any radix prefix and the digits
            let split = ["0x", "0X", "0o"]
                .iter()
                .find(|p| body.starts_with(*p))
                .map(|p| p.len())
                .unwrap_or(0);
            let (radix, digits) = body.split_at(split);
            format!("{}{}{}{}", sign, radix, "0".repeat(fill), digits)
        } else {
            format!("{}{}{}", " ".repeat(fill), sign, body)
        }
    }
}

fn non_finite(value: f64, upper: bool) -> String {
    let text = if value.is_nan() { "nan" } else { "inf" };
    if upper {
        text.to_uppercase()
    } else {
        text.to_string()
    }
}

/// `d.ddde+XX`, with at least two exponent digits.
fn exponent_form(magnitude: f64, precision: usize, upper: bool) -> String {
    let text = format!("{:.*e}", precision, magnitude);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:02}", mantissa, e, sign, exponent.abs())
}

/// Exponent of the value once rounded to the given significant digits.
fn decimal_exponent(magnitude: f64, significant: usize) -> i32 {
    if magnitude == 0.0 {
        return 0;
    }
    let text = format!("{:.*e}", significant - 1, magnitude);
    text.split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0)
}

fn strip_trailing_zeros(text: &str) -> String {
    let (number, exponent) = match text.find(['e', 'E']) {
        Some(idx) => text.split_at(idx),
        None => (text, ""),
    };
    let number = if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    };
    format!("{}{}", number, exponent)
}
