//! A library for converting `aapt dump xmltree` listings back to XML.
//!
//! The dump of a compiled Android XML resource is an indentation based listing
//! of `E:` (element), `A:` (attribute), `T:` (text) and `N:` (namespace)
//! lines. This crate rebuilds the element tree from it and prints it as
//! regular XML, optionally swapping resource ids for names found in an
//! `aapt dump resources` listing.
//!
//! # Examples
//!
//! ```
//! use xmltree2xml::{ConvertOptions, XmlTreeConverter, parse};
//!
//! let dump = "E: tag (line=1)\n  A: key=\"value\" (Raw: \"value\")";
//! let tree = parse(dump, None).unwrap();
//! assert_eq!(tree.to_xml(4), "<tag key=\"value\" />");
//!
//! let options = ConvertOptions { header: false, ..ConvertOptions::default() };
//! let xml = XmlTreeConverter::convert_str(dump, None, &options).unwrap();
//! assert_eq!(xml, "<tag key=\"value\" />");
//! ```

use std::io;
use thiserror::Error;

pub mod cli;
mod converter;
mod parser;
mod resources;
mod tokenizer;
mod tree;
mod value;

pub use converter::{ConvertOptions, XmlTreeConverter};
pub use parser::{TreeBuilder, parse};
pub use resources::{ResourceResolver, resolve_output_name};
pub use tokenizer::{Record, RecordKind, tokenize};
pub use tree::{Element, NodeId, TreeError, XmlTree, render};
pub use value::{Value, sanitize, strip_quotes};

/// Error types for dump parsing and conversion
#[derive(Error, Debug)]
pub enum XmlTreeError {
    #[error("line matches no record shape in line {line}")]
    MalformedLine { line: usize },
    #[error("too much indentation in line {line}")]
    TooMuchIndentation { line: usize },
    #[error("wrong indentation in line {line}")]
    WrongIndentation { line: usize },
    #[error("attribute before any element in line {line}")]
    AttributeBeforeElement { line: usize },
    #[error("wrong indentation for 'A' type in line {line}")]
    MisplacedAttribute { line: usize },
    #[error("wrong indentation for 'T' type in line {line}")]
    MisplacedText { line: usize },
    #[error("multiple root elements in line {line}")]
    MultipleRoots { line: usize },
    #[error("{source} in line {line}")]
    InvalidTextOrChildMix { line: usize, source: TreeError },
    #[error("namespace section declared twice in line {line}")]
    DuplicateNamespaceSection { line: usize },
    #[error("namespace declared after the root element in line {line}")]
    NamespaceAfterRoot { line: usize },
    #[error("file is empty")]
    EmptyDocument,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("from '{file}': {source}")]
    InFile {
        file: String,
        source: Box<XmlTreeError>,
    },
    #[error("Produced XML is not well-formed: {0}")]
    MalformedOutput(String),
    #[error("{failed} of {total} files failed to convert")]
    BatchFailed { failed: usize, total: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl XmlTreeError {
    /// The 1-based input line the error was raised on, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedLine { line }
            | Self::TooMuchIndentation { line }
            | Self::WrongIndentation { line }
            | Self::AttributeBeforeElement { line }
            | Self::MisplacedAttribute { line }
            | Self::MisplacedText { line }
            | Self::MultipleRoots { line }
            | Self::InvalidTextOrChildMix { line, .. }
            | Self::DuplicateNamespaceSection { line }
            | Self::NamespaceAfterRoot { line } => Some(*line),
            Self::InFile { source, .. } => source.line(),
            _ => None,
        }
    }

    /// Attaches the name of the file being converted.
    pub fn in_file(self, file: &str) -> Self {
        Self::InFile {
            file: file.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, XmlTreeError>;

/// Declaration written ahead of the converted document.
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Spaces per nesting level in the produced XML.
pub const DEFAULT_INDENT: usize = 4;
