/// Fixed decimal precision for numeric CSV cells (spec §4.8 "fixed
/// numeric precision (printf-style with a known precision)").
pub const CSV_FLOAT_PRECISION: usize = 6;

/// Format a numeric cell. `NaN`/`Inf` are written literally (not quoted),
/// matching the engine's NaN-is-unset discipline carried through to CSV
/// (the JSON emitter is the one that refuses non-finite values, per the
/// split responsibility in spec §4.8).
pub fn fmt_f64(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{:.*}", CSV_FLOAT_PRECISION, v)
    }
}

/// Quote a field per RFC 4180 if it contains `,`, `"`, `\n`, or `\r`;
/// embedded quotes are doubled (spec §4.8).
pub fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Deterministic CSV writer: fixed column order, `\n` line endings, no
/// trailing blank line beyond the final row terminator (spec §4.8 "CSV
/// emission is bit-deterministic").
pub struct CsvWriter {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvWriter {
    pub fn new(header: &[&str]) -> Self {
        Self { header: header.iter().map(|s| s.to_string()).collect(), rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<String>) -> &mut Self {
        debug_assert_eq!(row.len(), self.header.len(), "CSV row width must match header width");
        self.rows.push(row);
        self
    }

    pub fn finish(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header.iter().map(|h| quote_field(h)).collect::<Vec<_>>().join(","));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.iter().map(|f| quote_field(f)).collect::<Vec<_>>().join(","));
            out.push('\n');
        }
        out
    }
}

/// Pipe-join a list of strings for a `reasons_keys`/`reasons_messages`-style
/// CSV cell (spec §6 `gonogo.csv`).
pub fn pipe_join<I: IntoIterator<Item = S>, S: AsRef<str>>(items: I) -> String {
    items.into_iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>().join("|")
}
