//! Line-level tokenizer for the `aapt dump xmltree` listing.
//!
//! Every non-blank line of a dump is one of:
//!
//! ```text
//! N: android=http://schemas.android.com/apk/res/android (line=2)
//!   E: manifest (line=2)
//!     A: package="com.example" (Raw: "com.example")
//!       T: 'some text'
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Result, XmlTreeError};

static ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)E: ([a-zA-Z][a-zA-Z0-9\-_.:]*?) \(line=(\d+)\)\s*$").unwrap()
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)A: (.+?)=(.+?)(?: \(Raw: (.+?)\))?\s*$").unwrap()
});

static TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)T: (.+?)$").unwrap());

static NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)N: ([^\n\s=]+?)=(.+?) \(line=(\d+?)\)\s*$").unwrap()
});

/// Kind-specific payload of a dump line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Element {
        tag: String,
        line: i64,
    },
    Attribute {
        key: String,
        value: String,
        raw: Option<String>,
    },
    Text {
        value: String,
    },
    Namespace {
        prefix: String,
        uri: String,
        line: i64,
    },
}

/// One tokenized dump line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Number of leading whitespace characters.
    pub indent: usize,
    pub kind: RecordKind,
}

impl Record {
    pub fn name(&self) -> &'static str {
        match self.kind {
            RecordKind::Element { .. } => "E",
            RecordKind::Attribute { .. } => "A",
            RecordKind::Text { .. } => "T",
            RecordKind::Namespace { .. } => "N",
        }
    }
}

/// Classifies a single line, trying element, attribute, text then namespace
/// shapes in that order.
///
/// `line_no` is the 1-based position of the line in the dump; it is reported
/// in [`XmlTreeError::MalformedLine`] when no shape matches.
pub fn tokenize(line: &str, line_no: usize) -> Result<Record> {
    let malformed = || XmlTreeError::MalformedLine { line: line_no };
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(caps) = ELEMENT.captures(line) {
        return Ok(Record {
            indent: caps[1].chars().count(),
            kind: RecordKind::Element {
                tag: caps[2].to_string(),
                line: caps[3].parse().map_err(|_| malformed())?,
            },
        });
    }

    if let Some(caps) = ATTRIBUTE.captures(line) {
        return Ok(Record {
            indent: caps[1].chars().count(),
            kind: RecordKind::Attribute {
                key: caps[2].to_string(),
                value: caps[3].to_string(),
                raw: caps.get(4).map(|m| m.as_str().to_string()),
            },
        });
    }

    if let Some(caps) = TEXT.captures(line) {
        return Ok(Record {
            indent: caps[1].chars().count(),
            kind: RecordKind::Text {
                value: caps[2].to_string(),
            },
        });
    }

    if let Some(caps) = NAMESPACE.captures(line) {
        return Ok(Record {
            indent: caps[1].chars().count(),
            kind: RecordKind::Namespace {
                prefix: caps[2].to_string(),
                uri: caps[3].to_string(),
                line: caps[4].parse().map_err(|_| malformed())?,
            },
        });
    }

    Err(malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_android_attribute() {
        let record = tokenize(
            "        A: http://schemas.android.com/apk/res/android:title(0x010101e1)=\"Load current\" (Raw: \"Load current\")",
            1,
        )
        .unwrap();
        assert_eq!(record.indent, 8);
        assert_eq!(
            record.kind,
            RecordKind::Attribute {
                key: "http://schemas.android.com/apk/res/android:title(0x010101e1)".to_string(),
                value: "\"Load current\"".to_string(),
                raw: Some("\"Load current\"".to_string()),
            }
        );
    }

    #[test]
    fn test_tokenize_attribute_without_raw() {
        let record = tokenize("              A: value=20601", 1).unwrap();
        assert_eq!(record.indent, 14);
        assert_eq!(
            record.kind,
            RecordKind::Attribute {
                key: "value".to_string(),
                value: "20601".to_string(),
                raw: None,
            }
        );
    }

    #[test]
    fn test_tokenize_element() {
        let record = tokenize("    E: string-array (line=19)", 1).unwrap();
        assert_eq!(record.indent, 4);
        assert_eq!(
            record.kind,
            RecordKind::Element {
                tag: "string-array".to_string(),
                line: 19,
            }
        );
        assert_eq!(record.name(), "E");
    }

    #[test]
    fn test_tokenize_single_char_tag() {
        let record = tokenize("E: a (line=1)", 1).unwrap();
        assert_eq!(
            record.kind,
            RecordKind::Element {
                tag: "a".to_string(),
                line: 1,
            }
        );
    }

    #[test]
    fn test_tokenize_text() {
        let record = tokenize("      T: 'hello world'\r", 1).unwrap();
        assert_eq!(record.indent, 6);
        assert_eq!(
            record.kind,
            RecordKind::Text {
                value: "'hello world'".to_string(),
            }
        );
    }

    #[test]
    fn test_tokenize_namespace() {
        let record = tokenize("N: android=http://schemas.android.com/apk/res/android (line=2)", 1).unwrap();
        assert_eq!(record.indent, 0);
        assert_eq!(
            record.kind,
            RecordKind::Namespace {
                prefix: "android".to_string(),
                uri: "http://schemas.android.com/apk/res/android".to_string(),
                line: 2,
            }
        );
    }

    #[test]
    fn test_tokenize_malformed() {
        assert!(matches!(
            tokenize("X: nothing", 3),
            Err(XmlTreeError::MalformedLine { line: 3 })
        ));
        assert!(matches!(
            tokenize("E: tag", 7),
            Err(XmlTreeError::MalformedLine { line: 7 })
        ));
        assert!(matches!(
            tokenize("   ", 1),
            Err(XmlTreeError::MalformedLine { line: 1 })
        ));
    }

    #[test]
    fn test_tokenize_line_number_overflow() {
        let err = tokenize("E: tag (line=99999999999999999999999)", 4).unwrap_err();
        assert_eq!(err.line(), Some(4));
    }
}
