//! Output formatting for JSON and JSONL output.
//!
//! Data payloads go to stdout; logs and error payloads go to stderr.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one compact
    /// object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    /// Write multiple items.
    ///
    /// For JSON format, writes a single array. For JSONL, one object per line.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write(&items),
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
                Ok(())
            }
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Item {
        name: &'static str,
        value: u32,
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    #[test]
    fn test_write_json_single() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf, OutputFormat::Json, false);
        writer.write(&Item { name: "a", value: 1 }).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "{\"name\":\"a\",\"value\":1}\n");
    }

    #[test]
    fn test_write_all_json_is_array() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf, OutputFormat::Json, false);
        writer
            .write_all(&[Item { name: "a", value: 1 }, Item { name: "b", value: 2 }])
            .unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with('['));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_write_all_jsonl_is_one_per_line() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf, OutputFormat::JsonLines, false);
        writer
            .write_all(&[Item { name: "a", value: 1 }, Item { name: "b", value: 2 }])
            .unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with('{')));
    }

    #[test]
    fn test_pretty_json() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf, OutputFormat::Json, true);
        writer.write(&Item { name: "a", value: 1 }).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\n  "));
    }
}
