use std::fmt;

/// A typed attribute literal read from the dump.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    /// Returns the string payload, or `None` for typed literals.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write_float(f, *v),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Writes a float the way the dump tooling prints them: shortest round-trip
/// digits, positional for exponents in `-4..16` with a kept `.0` on whole
/// values, scientific with a signed two digit exponent otherwise.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if !v.is_finite() {
        return write!(f, "{v}");
    }

    let scientific = format!("{v:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        if v.fract() == 0.0 {
            write!(f, "{v:.1}")
        } else {
            write!(f, "{v}")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exponent.abs())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Strips one matching pair of surrounding double quotes.
///
/// Anything else, including single-quoted text or a lone leading/trailing
/// quote, is returned as is.
pub fn strip_quotes(raw: &str) -> &str {
    if raw.starts_with('"') && raw.ends_with('"') {
        raw.get(1..raw.len() - 1).unwrap_or("")
    } else {
        raw
    }
}

/// Interprets a raw dump literal.
///
/// Checks are applied in order: double-quoted string, boolean, float (when
/// the literal contains a `.`), integer. A literal that fails numeric
/// conversion is kept verbatim as a string.
pub fn sanitize(raw: &str) -> Value {
    if raw.starts_with('"') && raw.ends_with('"') {
        return Value::String(strip_quotes(raw).to_string());
    }

    match raw {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }

    if raw.contains('.') {
        if let Ok(v) = raw.parse::<f64>() {
            return Value::Float(v);
        }
    } else if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }

    Value::String(raw.to_string())
}
