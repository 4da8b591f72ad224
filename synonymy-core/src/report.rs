//! Fixed-layout text blocks for rendered reports.
//!
//! ```text
//! ---------------------------------------------------------------------------------
//! Title
//! ---------------------------------------------------------------------------------
//! Key: value
//! ```

/// Width of the dashed rule framing every report title.
pub const RULE_WIDTH: usize = 81;

/// Builder for a titled, line-oriented report.
#[derive(Debug, Clone, Default)]
pub struct ReportBlock {
    title: String,
    lines: Vec<String>,
}

impl ReportBlock {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    /// Append a `key: value` line.
    pub fn field(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.lines.push(format!("{}: {}", key, value));
        self
    }

    /// Append a free-form line.
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    /// Append a header line followed by one line per item.
    pub fn list<I, T>(mut self, header: &str, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        self.lines.push(header.to_string());
        self.lines.extend(items.into_iter().map(|item| item.to_string()));
        self
    }

    /// Render the framed block. Every line, including the last, ends with `\n`.
    pub fn render(&self) -> String {
        let rule = "-".repeat(RULE_WIDTH);
        let mut out = String::with_capacity(2 * RULE_WIDTH + self.title.len() + 64);
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
