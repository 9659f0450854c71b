use crate::utils::errors::{EngineResult, ErrorKind};
use crate::{engine_err, here};

/// A hand-rolled JSON value (spec §4.8 "JSON emission uses a hand-rolled
/// writer"). Objects preserve insertion order so emission has a stable key
/// order; there is no dependency on a third-party JSON crate because the
/// artifact emitter's byte-for-byte determinism is the contract, not the
/// in-memory structure (spec §9 "Artifact bytes vs. structures").
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    pub fn obj(pairs: Vec<(&str, JsonValue)>) -> Self {
        JsonValue::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// Maps `NaN`/`Inf` to `Null` when `emit_null_for_unset` is set;
    /// otherwise such values are a hard emission error (spec §4.8(b),
    /// §8 property 6 "JSON safety").
    pub fn from_f64(v: f64, emit_null_for_unset: bool) -> EngineResult<Self> {
        if v.is_finite() {
            Ok(JsonValue::Number(v))
        } else if emit_null_for_unset {
            Ok(JsonValue::Null)
        } else {
            Err(engine_err!(ErrorKind::InvalidInput, "refusing to emit non-finite JSON number {}", v))
        }
    }
}

fn escape_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_number(v: f64, out: &mut String) -> EngineResult<()> {
    if !v.is_finite() {
        return Err(engine_err!(ErrorKind::InvalidInput, "refusing to emit non-finite JSON number {}", v));
    }
    if v == v.trunc() && v.abs() < 1e15 {
        out.push_str(&format!("{}", v as i64));
    } else {
        out.push_str(&format!("{}", v));
    }
    Ok(())
}

fn write_value(value: &JsonValue, pretty: bool, indent: usize, out: &mut String) -> EngineResult<()> {
    match value {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        JsonValue::Number(n) => write_number(*n, out)?,
        JsonValue::String(s) => escape_string(s, out),
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if pretty {
                    out.push('\n');
                    out.push_str(&"  ".repeat(indent + 1));
                }
                write_value(item, pretty, indent + 1, out)?;
            }
            if pretty && !items.is_empty() {
                out.push('\n');
                out.push_str(&"  ".repeat(indent));
            }
            out.push(']');
        }
        JsonValue::Object(pairs) => {
            out.push('{');
            for (i, (key, val)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if pretty {
                    out.push('\n');
                    out.push_str(&"  ".repeat(indent + 1));
                }
                escape_string(key, out);
                out.push(':');
                if pretty {
                    out.push(' ');
                }
                write_value(val, pretty, indent + 1, out)?;
            }
            if pretty && !pairs.is_empty() {
                out.push('\n');
                out.push_str(&"  ".repeat(indent));
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Emit `value` as JSON text. Refuses to emit non-finite numbers (caller
/// should route them through `JsonValue::from_f64` first).
pub fn emit_json(value: &JsonValue, pretty: bool) -> EngineResult<String> {
    let mut out = String::new();
    write_value(value, pretty, 0, &mut out)?;
    Ok(out)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { bytes: text.as_bytes(), pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, b: u8) -> EngineResult<()> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(engine_err!(ErrorKind::ParseError, "expected '{}' at byte {}", b as char, self.pos))
        }
    }

    fn starts_with(&self, lit: &str) -> bool {
        self.bytes[self.pos..].starts_with(lit.as_bytes())
    }

    fn parse_value(&mut self) -> EngineResult<JsonValue> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => self.parse_string().map(JsonValue::String),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b't') if self.starts_with("true") => {
                self.pos += 4;
                Ok(JsonValue::Bool(true))
            }
            Some(b'f') if self.starts_with("false") => {
                self.pos += 5;
                Ok(JsonValue::Bool(false))
            }
            Some(b'n') if self.starts_with("null") => {
                self.pos += 4;
                Ok(JsonValue::Null)
            }
            Some(c) if c == b'-' || c.is_ascii_digit() => self.parse_number(),
            _ => Err(engine_err!(ErrorKind::ParseError, "unexpected token at byte {}", self.pos)),
        }
    }

    fn parse_number(&mut self) -> EngineResult<JsonValue> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' || c == b'+' || c == b'-') {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| engine_err!(ErrorKind::ParseError, "invalid utf-8 in number"))?;
        // Reject NaN/Infinity spelled out as bare identifiers leaking through
        // the digit scan above (spec §8 property 6, "a parser presented
        // with these refuses input").
        if text.is_empty() || text.contains("nan") || text.contains("inf") {
            return Err(engine_err!(ErrorKind::ParseError, "invalid JSON number literal '{}'", text));
        }
        let n: f64 = text.parse().map_err(|_| engine_err!(ErrorKind::ParseError, "invalid JSON number '{}'", text))?;
        if !n.is_finite() {
            return Err(engine_err!(ErrorKind::ParseError, "JSON number '{}' is not finite", text));
        }
        Ok(JsonValue::Number(n))
    }

    fn parse_string(&mut self) -> EngineResult<String> {
        self.expect(b'"')?;
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(engine_err!(ErrorKind::ParseError, "unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'"') => { s.push('"'); self.pos += 1; }
                        Some(b'\\') => { s.push('\\'); self.pos += 1; }
                        Some(b'/') => { s.push('/'); self.pos += 1; }
                        Some(b'n') => { s.push('\n'); self.pos += 1; }
                        Some(b'r') => { s.push('\r'); self.pos += 1; }
                        Some(b't') => { s.push('\t'); self.pos += 1; }
                        Some(b'u') => {
                            self.pos += 1;
                            let slice = self.bytes.get(self.pos..self.pos + 4)
                                .ok_or_else(|| engine_err!(ErrorKind::ParseError, "truncated \\u escape"))?;
                            let hex = std::str::from_utf8(slice)
                                .map_err(|_| engine_err!(ErrorKind::ParseError, "invalid \\u escape"))?;
                            let code = u32::from_str_radix(hex, 16)
                                .map_err(|_| engine_err!(ErrorKind::ParseError, "invalid \\u escape '{}'", hex))?;
                            s.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                            self.pos += 4;
                        }
                        _ => return Err(engine_err!(ErrorKind::ParseError, "invalid escape at byte {}", self.pos)),
                    }
                }
                Some(_) => {
                    let rest = std::str::from_utf8(&self.bytes[self.pos..])
                        .map_err(|_| engine_err!(ErrorKind::ParseError, "invalid utf-8"))?;
                    let c = rest.chars().next().unwrap();
                    s.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        Ok(s)
    }

    fn parse_object(&mut self) -> EngineResult<JsonValue> {
        self.expect(b'{')?;
        let mut pairs = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(JsonValue::Object(pairs));
        }
        loop {
            self.skip_ws();
            let key = self.parse_string()?;
            self.skip_ws();
            self.expect(b':')?;
            let val = self.parse_value()?;
            pairs.push((key, val));
            self.skip_ws();
            match self.peek() {
                Some(b',') => { self.pos += 1; }
                Some(b'}') => { self.pos += 1; break; }
                _ => return Err(engine_err!(ErrorKind::ParseError, "expected ',' or '}}' at byte {}", self.pos)),
            }
        }
        Ok(JsonValue::Object(pairs))
    }

    fn parse_array(&mut self) -> EngineResult<JsonValue> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(JsonValue::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => { self.pos += 1; }
                Some(b']') => { self.pos += 1; break; }
                _ => return Err(engine_err!(ErrorKind::ParseError, "expected ',' or ']' at byte {}", self.pos)),
            }
        }
        Ok(JsonValue::Array(items))
    }
}

/// Strict JSON parse: rejects `NaN`/`Infinity` literals, and the parse is
/// successful only if no trailing characters remain after the root value
/// (spec §4.8 "Parsing").
pub fn parse_json(text: &str) -> EngineResult<JsonValue> {
    let mut parser = Parser::new(text);
    let value = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(engine_err!(ErrorKind::ParseError, "trailing characters after JSON root value at byte {}", parser.pos));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_identity_holds() {
        let value = JsonValue::obj(vec![
            ("case_id", JsonValue::String("case-1".to_string())),
            ("thrust_n", JsonValue::Number(1234.5)),
            ("unset", JsonValue::Null),
            ("tags", JsonValue::Array(vec![JsonValue::String("a".into()), JsonValue::String("b".into())])),
        ]);
        let once = emit_json(&value, false).unwrap();
        let parsed = parse_json(&once).unwrap();
        let twice = emit_json(&parsed, false).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn refuses_to_emit_non_finite() {
        assert!(emit_json(&JsonValue::Number(f64::NAN), false).is_err());
        assert!(emit_json(&JsonValue::Number(f64::INFINITY), false).is_err());
    }

    #[test]
    fn rejects_nan_and_infinity_literals_on_parse() {
        assert!(parse_json("NaN").is_err());
        assert!(parse_json("Infinity").is_err());
        assert!(parse_json(r#"{"x": NaN}"#).is_err());
    }

    #[test]
    fn rejects_trailing_characters() {
        assert!(parse_json("{}garbage").is_err());
    }

    #[test]
    fn escapes_control_characters_and_specials() {
        let value = JsonValue::String("line1\nline2\t\"quoted\"".to_string());
        let text = emit_json(&value, false).unwrap();
        assert!(!text.contains('\n'));
        assert!(text.contains("\\n"));
        assert!(text.contains("\\\""));
    }

    #[test]
    fn nan_becomes_null_when_policy_allows() {
        let v = JsonValue::from_f64(f64::NAN, true).unwrap();
        assert_eq!(v, JsonValue::Null);
        assert!(JsonValue::from_f64(f64::NAN, false).is_err());
    }

    #[test]
    fn truncated_unicode_escape_is_parse_error_not_panic() {
        assert!(parse_json(r#""\u12"#).is_err());
        assert!(parse_json(r#""\u"#).is_err());
    }
}
