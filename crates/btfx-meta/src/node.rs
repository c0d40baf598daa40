//! Structured representation of converted XML metadata.

/// A node in the converted metadata tree.
///
/// Elements with only text content become [`MetadataNode::Text`]; everything
/// else becomes a [`MetadataNode::Map`] whose keys are `@attr` for
/// attributes, child tag names, or `#text` for text coexisting with
/// attributes or children. Repeated sibling tags collapse into a
/// [`MetadataNode::List`] in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataNode {
    /// Plain text content.
    Text(String),
    /// Insertion-ordered key/value mapping.
    Map(MetadataMap),
    /// Ordered sequence produced by repeated sibling tags.
    List(Vec<MetadataNode>),
}

impl MetadataNode {
    /// An empty mapping, the degraded result of a failed conversion.
    pub fn empty_map() -> Self {
        Self::Map(MetadataMap::new())
    }

    /// True for a mapping with no entries.
    pub fn is_empty_map(&self) -> bool {
        matches!(self, Self::Map(map) if map.is_empty())
    }

    /// Get the text value, if this node is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the mapping, if this node is a map.
    pub fn as_map(&self) -> Option<&MetadataMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get the items, if this node is a list.
    pub fn as_list(&self) -> Option<&[MetadataNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// An insertion-ordered mapping from key to [`MetadataNode`].
///
/// Metadata blocks are small, so lookups are linear scans over a vector;
/// preserving document order matters more than lookup speed here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataMap {
    entries: Vec<(String, MetadataNode)>,
}

impl MetadataMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&MetadataNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut MetadataNode> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a value under a unique key, replacing any existing value.
    ///
    /// Used for attribute keys and `#text`, which occur at most once per
    /// element.
    pub fn insert(&mut self, key: String, node: MetadataNode) {
        match self.get_mut(&key) {
            Some(existing) => *existing = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Insert a child element's node under its tag name.
    ///
    /// The second occurrence of a tag promotes the existing value to a
    /// two-element list (prior value first); later occurrences append.
    pub fn insert_child(&mut self, tag: String, node: MetadataNode) {
        match self.get_mut(&tag) {
            Some(MetadataNode::List(items)) => items.push(node),
            Some(existing) => {
                let first = std::mem::replace(existing, MetadataNode::List(Vec::with_capacity(2)));
                if let MetadataNode::List(items) = existing {
                    items.push(first);
                    items.push(node);
                }
            }
            None => self.entries.push((tag, node)),
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
