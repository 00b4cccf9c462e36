use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

/// Append-only target-text sink. Tracks indentation depth and open block
/// delimiters; lowering never touches raw whitespace.
#[derive(Debug, Clone)]
pub struct CodeSink {
    buf: String,
    indent_unit: String,
    indent_level: usize,
    at_line_start: bool,
}

impl CodeSink {
    pub fn new() -> Self {
        Self::with_style(IndentStyle::Spaces(2))
    }

    pub fn with_style(style: IndentStyle) -> Self {
        Self {
            buf: String::new(),
            indent_unit: style.unit(),
            indent_level: 0,
            at_line_start: true,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Appends a fragment on the current line, indenting first if the line is
    /// fresh.
    pub fn write(&mut self, text: &str) {
        if self.at_line_start && !text.is_empty() {
            for _ in 0..self.indent_level {
                self.buf.push_str(&self.indent_unit);
            }
            self.at_line_start = false;
        }
        self.buf.push_str(text);
    }

    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.buf.push('\n');
        self.at_line_start = true;
    }

    pub fn blank_line(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
        self.buf.push('\n');
    }

    /// Opens a brace-delimited block: `header {` plus one indent level.
    pub fn begin_block(&mut self, header: &str) {
        self.write_line(&format!("{} {{", header));
        self.indent();
    }

    pub fn end_block(&mut self) {
        self.dedent();
        self.write_line("}");
    }

    pub fn block<F>(&mut self, header: &str, body: F)
    where
        F: FnOnce(&mut CodeSink),
    {
        self.begin_block(header);
        body(self);
        self.end_block();
    }

    /// Re-emits previously rendered text line by line under the current
    /// indentation; relative indentation inside `text` is preserved.
    pub fn append(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.newline();
            } else {
                self.write_line(line);
            }
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.buf.as_bytes())?;
        Ok(())
    }
}

impl Default for CodeSink {
    fn default() -> Self {
        Self::new()
    }
}
