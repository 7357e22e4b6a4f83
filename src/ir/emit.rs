//! Append-only source text builder.
//!
//! `CodeBuilder` is purely mechanical string building: no parsing, no
//! validation, no formatting beyond literal concatenation. Callers are
//! responsible for constructing well-formed fragments, which keeps the
//! output a deterministic function of the IR.

/// One indentation unit in generated sources.
pub const INDENT: &str = "    ";

/// Accumulates generated source text.
#[derive(Debug, Default)]
pub struct CodeBuilder {
    buf: String,
}

impl CodeBuilder {
    pub fn new() -> Self {
        CodeBuilder::default()
    }

    /// Append literal text.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self
    }

    /// Append a line break.
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Append one fixed-width indent unit.
    pub fn indent(&mut self) -> &mut Self {
        self.buf.push_str(INDENT);
        self
    }

    /// Append items joined by a separator.
    pub fn append_list(&mut self, items: &[String], separator: &str) -> &mut Self {
        self.append(&items.join(separator))
    }

    /// Append `key=value` pairs joined by a separator.
    pub fn append_dict(&mut self, pairs: &[(String, String)], separator: &str) -> &mut Self {
        let rendered: Vec<String> = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        self.append_list(&rendered, separator)
    }

    /// Consume the builder and return the accumulated text.
    pub fn build(self) -> String {
        self.buf
    }
}
