//! Property construction.

use std::collections::BTreeMap;

use tree_sitter::Node;

use super::Property;

/// A native attribute value before it is rendered for the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl PropValue {
    fn render(&self, naming: TypeNaming) -> String {
        match self {
            PropValue::Null => String::new(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Int(i) => i.to_string(),
            PropValue::Float(f) if naming == TypeNaming::Clr => clr_double(*f),
            PropValue::Float(f) => js_number(*f),
            PropValue::Str(s) => s.clone(),
        }
    }
}

/// `Number.prototype.toString()`.
fn js_number(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let sign = if f < 0.0 { "-" } else { "" };
    let (digits, n) = decimal_digits(f);
    if (-5..=21).contains(&n) {
        format!("{sign}{}", fixed(&digits, n))
    } else {
        format!("{sign}{}", scientific(&digits, n - 1, "e", 1))
    }
}

/// .NET `Double.ToString()`: scientific outside `1e-4 <= |f| < 1e15`.
fn clr_double(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    let sign = if f.is_sign_negative() { "-" } else { "" };
    if f == 0.0 {
        return format!("{sign}0");
    }
    let (digits, n) = decimal_digits(f);
    if (-3..=15).contains(&n) {
        format!("{sign}{}", fixed(&digits, n))
    } else {
        format!("{sign}{}", scientific(&digits, n - 1, "E", 2))
    }
}

/// Shortest round-trip digits of `|f|` and the exponent `n` with
/// `|f| = 0.digits * 10^n`.
fn decimal_digits(f: f64) -> (String, i32) {
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits = mantissa.replace('.', "");
    (digits, exp.parse::<i32>().unwrap_or(0) + 1)
}

fn fixed(digits: &str, n: i32) -> String {
    let k = digits.len() as i32;
    if n >= k {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if n > 0 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else {
        format!("0.{}{digits}", "0".repeat(n.unsigned_abs() as usize))
    }
}

fn scientific(digits: &str, exp: i32, marker: &str, min_width: usize) -> String {
    let (first, rest) = digits.split_at(1);
    let mantissa = if rest.is_empty() {
        first.to_string()
    } else {
        format!("{first}.{rest}")
    };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{sign}{:0min_width$}", exp.unsigned_abs())
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropValue::Null)
    }
}

/// How a front end's host language spells the type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNaming {
    /// JavaScript `typeof`: `number`, `boolean`, `string`.
    JavaScript,
    /// .NET `GetType().Name`: `Int32`, `Int64`, `Double`, `Boolean`, `String`.
    Clr,
    /// Every value is coerced to a PHP string.
    Php,
}

impl TypeNaming {
    pub fn type_name(&self, value: &PropValue) -> &'static str {
        match (self, value) {
            (_, PropValue::Null) => "null",
            (TypeNaming::Php, _) => "string",
            (TypeNaming::JavaScript, PropValue::Bool(_)) => "boolean",
            (TypeNaming::JavaScript, PropValue::Int(_) | PropValue::Float(_)) => "number",
            (TypeNaming::JavaScript, PropValue::Str(_)) => "string",
            (TypeNaming::Clr, PropValue::Bool(_)) => "Boolean",
            (TypeNaming::Clr, PropValue::Int(i)) if i32::try_from(*i).is_ok() => "Int32",
            (TypeNaming::Clr, PropValue::Int(_)) => "Int64",
            (TypeNaming::Clr, PropValue::Float(_)) => "Double",
            (TypeNaming::Clr, PropValue::Str(_)) => "String",
        }
    }
}

/// Build one property record. Null becomes `{type: "null", value: ""}`.
pub fn make_property(naming: TypeNaming, value: impl Into<PropValue>) -> Property {
    let value = value.into();
    Property {
        type_name: naming.type_name(&value).to_string(),
        value: value.render(naming),
    }
}

/// Source span with 0-based lines and columns and byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub start_offset: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub end_offset: usize,
}

impl Span {
    /// Span from the start of `start` to the end of `end`.
    pub fn covering(start: &Node, end: &Node) -> Self {
        let (from, to) = (start.start_position(), end.end_position());
        Self {
            start_line: from.row,
            start_column: from.column,
            start_offset: start.start_byte(),
            end_line: to.row,
            end_column: to.column,
            end_offset: end.end_byte(),
        }
    }

    pub fn of(node: &Node) -> Self {
        Self::covering(node, node)
    }

    /// All-zero span used by project, directory and file facts.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// The `filename` property plus the six span properties.
pub fn make_common_properties(
    naming: TypeNaming,
    filename: &str,
    span: Span,
) -> BTreeMap<String, Property> {
    let mut props = BTreeMap::new();
    props.insert("filename".to_string(), make_property(naming, filename));
    for (name, value) in [
        ("start_line", span.start_line),
        ("start_column", span.start_column),
        ("start_offset", span.start_offset),
        ("end_line", span.end_line),
        ("end_column", span.end_column),
        ("end_offset", span.end_offset),
    ] {
        props.insert(name.to_string(), make_property(naming, value));
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_property() {
        for naming in [TypeNaming::JavaScript, TypeNaming::Clr, TypeNaming::Php] {
            let prop = make_property(naming, PropValue::Null);
            assert_eq!(prop.type_name, "null");
            assert_eq!(prop.value, "");
        }
        let absent: Option<&str> = None;
        assert_eq!(make_property(TypeNaming::JavaScript, absent).type_name, "null");
    }

    #[test]
    fn test_javascript_type_names() {
        let prop = make_property(TypeNaming::JavaScript, false);
        assert_eq!((prop.type_name.as_str(), prop.value.as_str()), ("boolean", "false"));
        let prop = make_property(TypeNaming::JavaScript, 1.5);
        assert_eq!((prop.type_name.as_str(), prop.value.as_str()), ("number", "1.5"));
        let prop = make_property(TypeNaming::JavaScript, 7usize);
        assert_eq!((prop.type_name.as_str(), prop.value.as_str()), ("number", "7"));
    }

    #[test]
    fn test_javascript_float_rendering() {
        let render = |f: f64| make_property(TypeNaming::JavaScript, f).value;
        assert_eq!(render(2.0), "2");
        assert_eq!(render(-0.5), "-0.5");
        assert_eq!(render(1e20), "100000000000000000000");
        assert_eq!(render(1e21), "1e+21");
        assert_eq!(render(1.5e300), "1.5e+300");
        assert_eq!(render(0.000001), "0.000001");
        assert_eq!(render(1e-7), "1e-7");
        assert_eq!(render(1.25e-7), "1.25e-7");
        assert_eq!(render(f64::NAN), "NaN");
        assert_eq!(render(f64::INFINITY), "Infinity");
        assert_eq!(render(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(render(-0.0), "0");
    }

    #[test]
    fn test_clr_float_rendering() {
        let render = |f: f64| make_property(TypeNaming::Clr, f).value;
        assert_eq!(render(1.5), "1.5");
        assert_eq!(render(1e14), "100000000000000");
        assert_eq!(render(1e15), "1E+15");
        assert_eq!(render(0.0001), "0.0001");
        assert_eq!(render(0.00001), "1E-05");
        assert_eq!(render(f64::INFINITY), "∞");
    }

    #[test]
    fn test_clr_type_names() {
        assert_eq!(make_property(TypeNaming::Clr, 3i64).type_name, "Int32");
        assert_eq!(make_property(TypeNaming::Clr, 1i64 << 40).type_name, "Int64");
        assert_eq!(make_property(TypeNaming::Clr, true).type_name, "Boolean");
        assert_eq!(make_property(TypeNaming::Clr, "a").type_name, "String");
    }

    #[test]
    fn test_php_coerces_to_string() {
        let prop = make_property(TypeNaming::Php, 42i64);
        assert_eq!((prop.type_name.as_str(), prop.value.as_str()), ("string", "42"));
    }

    #[test]
    fn test_zero_common_properties() {
        let props = make_common_properties(TypeNaming::JavaScript, "./a.ts", Span::zero());
        assert_eq!(props.len(), 7);
        assert_eq!(props["filename"].value, "./a.ts");
        for name in ["start_line", "start_column", "start_offset", "end_line", "end_column", "end_offset"] {
            assert_eq!(props[name].value, "0");
            assert_eq!(props[name].type_name, "number");
        }
    }
}
