use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::resources::ResourceResolver;
use crate::tokenizer::{Record, RecordKind, tokenize};
use crate::tree::{NodeId, XmlTree};
use crate::value::{Value, sanitize, strip_quotes};
use crate::{Result, XmlTreeError};

/// Columns per nesting level in the dump.
const LEVEL_WIDTH: usize = 4;
/// Extra columns for attribute lines, relative to their element.
const ATTRIBUTE_OFFSET: usize = 2;

/// Incremental builder turning dump records into an [`XmlTree`].
///
/// Nesting is recovered from indentation alone. Each `N:` line seen so far
/// toggles a two column shift applied to every following line.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    resolver: ResourceResolver<'a>,
    tree: XmlTree,
    /// Open elements from the root down; the last one receives attributes and text.
    open_path: Vec<NodeId>,
    depth: usize,
    pending_namespaces: IndexMap<String, String>,
    namespace_count: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(resources: Option<&'a str>) -> Self {
        Self {
            resolver: ResourceResolver::new(resources),
            tree: XmlTree::new(),
            open_path: Vec::new(),
            depth: 0,
            pending_namespaces: IndexMap::new(),
            namespace_count: 0,
        }
    }

    /// Tokenizes and applies one line. `line` is the 1-based position in the
    /// input. Blank lines are ignored.
    pub fn feed_line(&mut self, line: usize, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let record = tokenize(text, line)?;
        self.push(line, record)
    }

    /// Validates a record against the current nesting and applies it.
    pub fn push(&mut self, line: usize, record: Record) -> Result<()> {
        let shift = ATTRIBUTE_OFFSET * (self.namespace_count % 2);
        let effective = record
            .indent
            .checked_sub(shift)
            .ok_or(XmlTreeError::WrongIndentation { line })?;
        let level = effective / LEVEL_WIDTH;
        let remainder = effective % LEVEL_WIDTH;

        trace!(line, kind = record.name(), level, remainder, "record");

        self.check_indentation(line, &record.kind, level, remainder)?;

        match record.kind {
            RecordKind::Element { tag, line: source_line } => {
                self.open_element(line, &tag, source_line, level)
            }
            RecordKind::Attribute { key, value, raw } => self.add_attribute(line, &key, &value, raw),
            RecordKind::Text { value } => self.set_text(line, &value),
            RecordKind::Namespace { prefix, uri, .. } => self.declare_namespace(line, &prefix, &uri),
        }
    }

    /// Ends the parse, returning the document.
    pub fn finish(self) -> Result<XmlTree> {
        if self.tree.root().is_none() {
            return Err(XmlTreeError::EmptyDocument);
        }
        Ok(self.tree)
    }

    fn check_indentation(
        &self,
        line: usize,
        kind: &RecordKind,
        level: usize,
        remainder: usize,
    ) -> Result<()> {
        // Text has its own exact placement rule, reported as misplaced text.
        let is_text = matches!(kind, RecordKind::Text { .. });
        if level > self.depth + 1 && !is_text {
            return Err(XmlTreeError::TooMuchIndentation { line });
        }
        if remainder != 0 && remainder != ATTRIBUTE_OFFSET {
            return Err(XmlTreeError::WrongIndentation { line });
        }

        match kind {
            RecordKind::Attribute { .. } if self.open_path.is_empty() => {
                Err(XmlTreeError::AttributeBeforeElement { line })
            }
            RecordKind::Attribute { .. }
                if level != self.depth || remainder != ATTRIBUTE_OFFSET =>
            {
                Err(XmlTreeError::MisplacedAttribute { line })
            }
            RecordKind::Text { .. } if level != self.depth + 1 || remainder != 0 => {
                Err(XmlTreeError::MisplacedText { line })
            }
            RecordKind::Element { .. } if level == 0 && self.tree.root().is_some() => {
                Err(XmlTreeError::MultipleRoots { line })
            }
            _ => Ok(()),
        }
    }

    fn open_element(&mut self, line: usize, tag: &str, source_line: i64, level: usize) -> Result<()> {
        let id = self.tree.create_element(tag);
        self.tree.set_metadata(id, "line", Value::Integer(source_line));

        // Namespaces declared so far belong to the first element after them.
        for (prefix, uri) in self.pending_namespaces.drain(..) {
            self.tree.add_namespace(id, &prefix, &uri);
        }

        if self.open_path.len() > 1 && self.depth >= level {
            self.open_path.truncate(level);
        }
        self.depth = level;

        if self.tree.root().is_none() {
            self.tree.set_root(id);
        } else {
            let parent = *self
                .open_path
                .last()
                .ok_or(XmlTreeError::MultipleRoots { line })?;
            self.tree
                .append_child(parent, id)
                .map_err(|source| XmlTreeError::InvalidTextOrChildMix { line, source })?;
        }
        self.open_path.push(id);
        Ok(())
    }

    fn add_attribute(&mut self, line: usize, key: &str, value: &str, raw: Option<String>) -> Result<()> {
        let owner = *self
            .open_path
            .last()
            .ok_or(XmlTreeError::AttributeBeforeElement { line })?;
        let key = self.resolver.resolve_key(key);
        let value = self.resolver.resolve_value(value);
        let annotation = raw.as_deref().map(|raw| strip_quotes(raw).to_string());

        self.tree.set_attribute(owner, &key, value);
        self.tree.set_attribute_annotation(owner, &key, annotation);
        Ok(())
    }

    fn set_text(&mut self, line: usize, text: &str) -> Result<()> {
        let owner = *self
            .open_path
            .last()
            .ok_or(XmlTreeError::MisplacedText { line })?;
        self.tree
            .set_text(owner, text)
            .map_err(|source| XmlTreeError::InvalidTextOrChildMix { line, source })
    }

    fn declare_namespace(&mut self, line: usize, prefix: &str, uri: &str) -> Result<()> {
        if let Some(root) = self.tree.root_element() {
            return Err(if root.namespaces.is_empty() {
                XmlTreeError::NamespaceAfterRoot { line }
            } else {
                XmlTreeError::DuplicateNamespaceSection { line }
            });
        }
        self.namespace_count += 1;
        self.pending_namespaces
            .insert(prefix.to_string(), sanitize(uri).to_string());
        Ok(())
    }
}

/// Parses a complete `xmltree` dump.
///
/// `resources` is the optional `aapt dump resources` listing used to turn
/// resource ids into names.
#[instrument(level = "debug", skip_all)]
pub fn parse(dump: &str, resources: Option<&str>) -> Result<XmlTree> {
    let mut builder = TreeBuilder::new(resources);
    for (index, line) in dump.split('\n').enumerate() {
        builder.feed_line(index + 1, line)?;
    }
    let tree = builder.finish()?;
    debug!("Parsed {} elements", tree.len());
    Ok(tree)
}
