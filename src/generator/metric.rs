//! Metric samples and their exposition-format encoding.

use std::fmt::{self, Write};

/// The Prometheus type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sample. `label_keys` and `label_values` are parallel sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metric {
    pub label_keys: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
    /// Explicit timestamp in milliseconds since the epoch.
    pub timestamp_ms: Option<i64>,
}

impl Metric {
    /// A sample without labels.
    pub fn value(value: f64) -> Self {
        Metric {
            value,
            ..Default::default()
        }
    }

    /// A sample with the given label pairs.
    pub fn with_labels<K, V>(labels: impl IntoIterator<Item = (K, V)>, value: f64) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (label_keys, label_values) = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Metric {
            label_keys,
            label_values,
            value,
            timestamp_ms: None,
        }
    }

    /// Prepends `keys`/`values` in front of the existing labels.
    pub fn prepend_labels(&mut self, keys: &[&str], values: &[&str]) {
        debug_assert_eq!(keys.len(), values.len());
        self.label_keys
            .splice(0..0, keys.iter().map(|k| k.to_string()));
        self.label_values
            .splice(0..0, values.iter().map(|v| v.to_string()));
    }

    /// Appends `labels value[ timestamp]\n` to `out`; the family name is
    /// written by the caller.
    pub fn write(&self, out: &mut String) {
        debug_assert_eq!(
            self.label_keys.len(),
            self.label_values.len(),
            "label keys and values must have equal length"
        );

        if !self.label_keys.is_empty() {
            out.push('{');
            for (i, (key, value)) in self.label_keys.iter().zip(&self.label_values).enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(key);
                out.push_str("=\"");
                escape_label_value(out, value);
                out.push('"');
            }
            out.push('}');
        }

        out.push(' ');
        write_float(out, self.value);
        if let Some(ts) = self.timestamp_ms {
            // Writing to a String cannot fail.
            let _ = write!(out, " {}", ts);
        }
        out.push('\n');
    }
}

/// The samples one generator produced for one object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricFamily {
    pub name: String,
    pub metrics: Vec<Metric>,
}

impl MetricFamily {
    /// Renders every sample as one exposition line prefixed by the family name.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for metric in &self.metrics {
            out.push_str(&self.name);
            metric.write(&mut out);
        }
        out
    }
}

fn escape_label_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}

/// Escapes backslashes and newlines in HELP text.
pub(crate) fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Formats like Go's `strconv.FormatFloat(f, 'g', -1, 64)`, which is what
/// Prometheus tooling emits: shortest round-trip digits, exponent notation
/// when the decimal exponent is below -4 or at least 6.
pub fn write_float(out: &mut String, f: f64) {
    if f == 1.0 {
        out.push('1');
    } else if f == 0.0 {
        out.push('0');
    } else if f == -1.0 {
        out.push_str("-1");
    } else if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "+Inf" } else { "-Inf" });
    } else {
        let sci = format!("{:e}", f);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        if (-4..6).contains(&exp) {
            let _ = write!(out, "{}", f);
        } else {
            let sign = if exp < 0 { '-' } else { '+' };
            let _ = write!(out, "{}e{}{:02}", mantissa, sign, exp.abs());
        }
    }
}
