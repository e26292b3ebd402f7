use alloc::string::String;
use alloc::vec::Vec;

use crate::array::NdArrayData;
use crate::tag::SchemaTag;

/// A typed value in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An IEEE-754 double.
    Number(f64),
    /// UTF-8 text. The empty string is a distinct, round-trippable value.
    String(String),
    /// An ordered sequence of nodes.
    Array(Vec<Node>),
    /// An ordered sequence of key/node pairs.
    ///
    /// Insertion order is significant for output. Duplicate keys are
    /// retained; lookup takes the first match.
    Object(Vec<(String, Node)>),
    /// An n-dimensional array backed by a binary block.
    NdArray(NdArrayData),
    /// A JSON-pointer reference within the current tree.
    InternalRef(JsonPointer),
    /// A reference into another document.
    ExternalRef(String),
}

impl Value {
    /// Returns `true` for container values (arrays, objects, ndarrays).
    ///
    /// Containers force the surrounding mapping or sequence into block
    /// style; everything else stays in flow style.
    pub fn is_complex(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::NdArray(_)
        )
    }

    /// A short lowercase name for this value's variant, used in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::NdArray(_) => "ndarray",
            Value::InternalRef(_) => "internal reference",
            Value::ExternalRef(_) => "external reference",
        }
    }
}

/// A node pairs a [`Value`] with an optional [`SchemaTag`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The schema tag, absent for plain values.
    pub tag: SchemaTag,
    /// The node's value.
    pub value: Value,
}

impl Node {
    /// Create a node without a schema tag.
    pub fn untagged(value: Value) -> Self {
        Node {
            tag: SchemaTag::none(),
            value,
        }
    }

    /// Create a node with the given schema tag.
    pub fn tagged(tag: SchemaTag, value: Value) -> Self {
        Node { tag, value }
    }
}

/// First-match lookup in an ordered entry list.
///
/// Later duplicates are not consulted; they remain visible to iteration.
pub fn first_match<'a>(entries: &'a [(String, Node)], key: &str) -> Option<&'a Node> {
    entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
}

/// The decoded document root: the entries of the top-level mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree(pub Vec<(String, Node)>);

impl Tree {
    /// First-match lookup of a top-level key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        first_match(&self.0, key)
    }

    /// The number of top-level entries (duplicates included).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, Node)> {
        self.0.iter()
    }
}

/// A parsed JSON-pointer fragment (`#/path/to/node`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer(Vec<String>);

impl JsonPointer {
    /// Parse a fragment reference, tolerating a leading `#`.
    pub fn parse(text: &str) -> Self {
        let path = text.strip_prefix('#').unwrap_or(text);
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        JsonPointer(segments)
    }

    /// The pointer's path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl core::fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("#")?;
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ByteOrder, DataType};
    use alloc::string::ToString;
    use alloc::vec;

    fn sample_ndarray() -> NdArrayData {
        NdArrayData {
            bytes: vec![0, 0, 0, 1],
            datatype: DataType::Int32,
            byteorder: ByteOrder::Big,
            shape: vec![1],
        }
    }

    #[test]
    fn complex_predicate() {
        assert!(Value::Array(vec![]).is_complex());
        assert!(Value::Object(vec![]).is_complex());
        assert!(Value::NdArray(sample_ndarray()).is_complex());

        assert!(!Value::Null.is_complex());
        assert!(!Value::Bool(true).is_complex());
        assert!(!Value::Integer(1).is_complex());
        assert!(!Value::Number(1.5).is_complex());
        assert!(!Value::String(String::new()).is_complex());
        assert!(!Value::InternalRef(JsonPointer::parse("#/a")).is_complex());
        assert!(!Value::ExternalRef("other.asdf#/x".into()).is_complex());
    }

    #[test]
    fn structural_equality() {
        let a = Node::untagged(Value::Object(vec![(
            "x".into(),
            Node::untagged(Value::Integer(1)),
        )]));
        let b = Node::untagged(Value::Object(vec![(
            "x".into(),
            Node::untagged(Value::Integer(1)),
        )]));
        assert_eq!(a, b);
    }

    #[test]
    fn first_match_takes_earliest_duplicate() {
        let entries = vec![
            ("k".to_string(), Node::untagged(Value::Integer(1))),
            ("k".to_string(), Node::untagged(Value::Integer(2))),
        ];
        let found = first_match(&entries, "k").unwrap();
        assert_eq!(found.value, Value::Integer(1));
        // Both entries survive for iteration.
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn first_match_missing_key() {
        let entries = vec![("a".to_string(), Node::untagged(Value::Null))];
        assert!(first_match(&entries, "b").is_none());
    }

    #[test]
    fn tree_lookup_and_iteration() {
        let tree = Tree(vec![
            ("a".to_string(), Node::untagged(Value::Integer(1))),
            ("b".to_string(), Node::untagged(Value::Bool(false))),
        ]);
        assert_eq!(tree.len(), 2);
        assert!(!tree.is_empty());
        assert_eq!(tree.get("b").unwrap().value, Value::Bool(false));
        assert!(tree.get("c").is_none());
        let keys: Vec<&str> = tree.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn pointer_parse_fragment() {
        let p = JsonPointer::parse("#/foo/bar");
        assert_eq!(p.segments(), ["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn pointer_parse_without_hash() {
        let p = JsonPointer::parse("/foo/bar");
        assert_eq!(p.segments(), ["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn pointer_empty_fragment() {
        let p = JsonPointer::parse("#");
        assert!(p.segments().is_empty());
        assert_eq!(p.to_string(), "#");
    }

    #[test]
    fn pointer_display_roundtrip() {
        let p = JsonPointer::parse("#/data/wavelength");
        assert_eq!(p.to_string(), "#/data/wavelength");
        assert_eq!(JsonPointer::parse(&p.to_string()), p);
    }

    #[test]
    fn value_kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Integer(0).kind(), "integer");
        assert_eq!(Value::Object(vec![]).kind(), "object");
        assert_eq!(Value::NdArray(sample_ndarray()).kind(), "ndarray");
    }
}
