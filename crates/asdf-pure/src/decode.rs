//! Event consumption: reconstructing a tree from a YAML event stream.
//!
//! The decoder pulls from a peek-of-one event stream. Containers are read
//! with [`NodeSink::sink_while`], whose contract is load-bearing: the
//! terminator event is consumed exactly once, so nested containers never
//! leak their end events into the parent.
//!
//! Finished mappings run through ordered recognizers before falling back to
//! a plain object: an ndarray mapping (recognized by its schema-tag prefix,
//! any version), then a `$ref` mapping. A recognizer that does not apply is
//! silent; a recognizer that applies but finds malformed content fails hard.

use alloc::string::String;
use alloc::vec::Vec;
use core::iter::Peekable;

use crate::array::{ByteOrder, DataType, NdArrayData};
use crate::block::BlockStore;
use crate::error::{Error, Result};
use crate::event::{Event, YamlTag};
use crate::node::{first_match, JsonPointer, Node, Tree, Value};
use crate::scalar::sink_scalar;
use crate::tag::{SchemaTag, NDARRAY_TAG_PREFIX};

/// Decode one document into its root mapping entries.
///
/// Expects `StreamStart, DocumentStart`, then a single node that must be a
/// mapping. Trailing `DocumentEnd`/`StreamEnd` events are consumed when
/// present.
pub fn sink_tree<I>(events: I, blocks: &BlockStore) -> Result<Tree>
where
    I: IntoIterator<Item = Event>,
{
    NodeSink::new(events.into_iter(), blocks).tree()
}

/// A pull-style decoder over a buffered event stream.
pub struct NodeSink<'a, I: Iterator<Item = Event>> {
    events: Peekable<I>,
    blocks: &'a BlockStore,
}

fn schema_tag(tag: &YamlTag) -> SchemaTag {
    match tag {
        YamlTag::Uri(uri) => SchemaTag::parse(uri),
        _ => SchemaTag::none(),
    }
}

impl<'a, I: Iterator<Item = Event>> NodeSink<'a, I> {
    /// Create a decoder reading events against a populated block store.
    pub fn new(events: I, blocks: &'a BlockStore) -> Self {
        NodeSink {
            events: events.peekable(),
            blocks,
        }
    }

    fn next(&mut self) -> Result<Event> {
        self.events.next().ok_or(Error::NoInput)
    }

    fn peek(&mut self) -> Result<&Event> {
        self.events.peek().ok_or(Error::NoInput)
    }

    fn expect(&mut self, expected: &'static str, accepts: fn(&Event) -> bool) -> Result<()> {
        let event = self.next()?;
        if accepts(&event) {
            Ok(())
        } else {
            Err(Error::ExpectedEvent {
                expected,
                found: event,
            })
        }
    }

    /// Decode the whole document: framing, root mapping, trailing framing.
    pub fn tree(&mut self) -> Result<Tree> {
        self.expect("stream start", |e| matches!(e, Event::StreamStart))?;
        self.expect("document start", |e| matches!(e, Event::DocumentStart))?;
        let root = self.node()?;
        match root.value {
            Value::Object(entries) => {
                if matches!(self.events.peek(), Some(Event::DocumentEnd)) {
                    self.events.next();
                }
                if matches!(self.events.peek(), Some(Event::StreamEnd)) {
                    self.events.next();
                }
                Ok(Tree(entries))
            }
            value => Err(Error::InvalidTree {
                reason: "document root must be a mapping",
                value,
            }),
        }
    }

    /// Decode one node from the next event.
    pub fn node(&mut self) -> Result<Node> {
        match self.next()? {
            Event::Scalar { value, tag, .. } => sink_scalar(&value, &tag),
            Event::MappingStart { tag, .. } => {
                let tag = schema_tag(&tag);
                let entries = self.mapping_entries()?;
                self.resolve_mapping(tag, entries)
            }
            Event::SequenceStart { tag, .. } => {
                let tag = schema_tag(&tag);
                let items =
                    self.sink_while(|e| !matches!(e, Event::SequenceEnd), |s| s.node())?;
                Ok(Node::tagged(tag, Value::Array(items)))
            }
            other => Err(Error::ExpectedEvent {
                expected: "a node",
                found: other,
            }),
        }
    }

    /// Collect elements while the peeked event satisfies `continues`, then
    /// consume the terminator (the first event that does not) and stop.
    ///
    /// Exhaustion before the terminator is [`Error::NoInput`].
    fn sink_while<T>(
        &mut self,
        continues: impl Fn(&Event) -> bool,
        mut parse: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        loop {
            if continues(self.peek()?) {
                items.push(parse(self)?);
            } else {
                self.next()?;
                return Ok(items);
            }
        }
    }

    fn mapping_entries(&mut self) -> Result<Vec<(String, Node)>> {
        self.sink_while(|e| !matches!(e, Event::MappingEnd), |s| s.entry())
    }

    fn entry(&mut self) -> Result<(String, Node)> {
        let key = match self.next()? {
            Event::Scalar { value, .. } => String::from_utf8_lossy(&value).into_owned(),
            other => {
                return Err(Error::ExpectedEvent {
                    expected: "mapping key",
                    found: other,
                })
            }
        };
        let value = self.node()?;
        Ok((key, value))
    }

    /// Run a finished mapping through the ordered recognizers.
    fn resolve_mapping(&self, tag: SchemaTag, entries: Vec<(String, Node)>) -> Result<Node> {
        if let Some(data) = self.recognize_ndarray(&tag, &entries)? {
            return Ok(Node::tagged(tag, Value::NdArray(data)));
        }
        if let Some(value) = recognize_reference(&entries)? {
            return Ok(Node::tagged(tag, value));
        }
        Ok(Node::tagged(tag, Value::Object(entries)))
    }

    /// The ndarray recognizer: applies iff the mapping tag has the ndarray
    /// prefix (the version suffix is not inspected).
    fn recognize_ndarray(
        &self,
        tag: &SchemaTag,
        entries: &[(String, Node)],
    ) -> Result<Option<NdArrayData>> {
        if !tag.has_prefix(NDARRAY_TAG_PREFIX) {
            return Ok(None);
        }

        let source = require(entries, "source")?;
        let index = match &source.value {
            Value::Integer(n) if *n >= 0 => *n as usize,
            other => {
                return Err(Error::NdArrayExpected {
                    field: "Source",
                    value: other.clone(),
                })
            }
        };
        let bytes = self
            .blocks
            .get(index)
            .ok_or(Error::NdArrayMissingBlock(index))?
            .to_vec();

        let datatype = require(entries, "datatype")?;
        let datatype =
            DataType::from_value(&datatype.value).ok_or_else(|| Error::NdArrayExpected {
                field: "DataType",
                value: datatype.value.clone(),
            })?;

        let byteorder = require(entries, "byteorder")?;
        let byteorder = byteorder_from_value(&byteorder.value).ok_or_else(|| {
            Error::NdArrayExpected {
                field: "ByteOrder",
                value: byteorder.value.clone(),
            }
        })?;

        let shape = require(entries, "shape")?;
        let shape = axes_from_value(&shape.value).ok_or_else(|| Error::NdArrayExpected {
            field: "Shape",
            value: shape.value.clone(),
        })?;

        Ok(Some(NdArrayData {
            bytes,
            datatype,
            byteorder,
            shape,
        }))
    }
}

/// The `$ref` recognizer: applies iff the key is present; a non-string
/// target is a hard error.
fn recognize_reference(entries: &[(String, Node)]) -> Result<Option<Value>> {
    let Some(node) = first_match(entries, "$ref") else {
        return Ok(None);
    };
    match &node.value {
        Value::String(target) => {
            if target.starts_with('#') {
                Ok(Some(Value::InternalRef(JsonPointer::parse(target))))
            } else {
                Ok(Some(Value::ExternalRef(target.clone())))
            }
        }
        other => Err(Error::InvalidReference(other.clone())),
    }
}

fn require<'e>(entries: &'e [(String, Node)], key: &'static str) -> Result<&'e Node> {
    first_match(entries, key).ok_or(Error::NdArrayMissingKey(key))
}

fn byteorder_from_value(value: &Value) -> Option<ByteOrder> {
    match value {
        Value::String(s) => ByteOrder::parse(s),
        _ => None,
    }
}

fn axes_from_value(value: &Value) -> Option<Vec<usize>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|node| match node.value {
                Value::Integer(n) if n >= 0 => Some(n as usize),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CollectionStyle, ScalarStyle};
    use alloc::vec;

    fn frame(body: Vec<Event>) -> Vec<Event> {
        let mut events = vec![Event::StreamStart, Event::DocumentStart];
        events.extend(body);
        events.push(Event::DocumentEnd);
        events.push(Event::StreamEnd);
        events
    }

    fn mapping(body: Vec<Event>) -> Vec<Event> {
        let mut events = vec![Event::mapping_start(YamlTag::None, CollectionStyle::Block)];
        events.extend(body);
        events.push(Event::MappingEnd);
        events
    }

    #[test]
    fn empty_document() {
        let events = frame(mapping(vec![]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn simple_scalars() {
        let events = frame(mapping(vec![
            Event::plain("count"),
            Event::plain("42"),
            Event::plain("name"),
            Event::plain("mars"),
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert_eq!(tree.get("count").unwrap().value, Value::Integer(42));
        assert_eq!(tree.get("name").unwrap().value, Value::String("mars".into()));
    }

    #[test]
    fn untagged_integer_not_string() {
        let events = frame(mapping(vec![Event::plain("n"), Event::plain("42")]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert_eq!(tree.get("n").unwrap().value, Value::Integer(42));
    }

    #[test]
    fn quoted_empty_string() {
        let events = frame(mapping(vec![
            Event::plain("s"),
            Event::scalar("", YamlTag::Str, ScalarStyle::Plain),
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert_eq!(tree.get("s").unwrap().value, Value::String(String::new()));
    }

    #[test]
    fn nested_containers_do_not_leak_terminators() {
        let events = frame(mapping(vec![
            Event::plain("outer"),
            Event::mapping_start(YamlTag::None, CollectionStyle::Block),
            Event::plain("inner"),
            Event::sequence_start(YamlTag::None, CollectionStyle::Flow),
            Event::plain("1"),
            Event::plain("2"),
            Event::SequenceEnd,
            Event::MappingEnd,
            Event::plain("after"),
            Event::plain("true"),
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("after").unwrap().value, Value::Bool(true));
        match &tree.get("outer").unwrap().value {
            Value::Object(entries) => match &entries[0].1.value {
                Value::Array(items) => assert_eq!(items.len(), 2),
                other => panic!("expected array, got {other:?}"),
            },
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_keys_retained_first_match_wins() {
        let events = frame(mapping(vec![
            Event::plain("k"),
            Event::plain("1"),
            Event::plain("k"),
            Event::plain("2"),
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("k").unwrap().value, Value::Integer(1));
    }

    #[test]
    fn root_must_be_mapping() {
        let events = frame(vec![Event::plain("just a scalar")]);
        assert!(matches!(
            sink_tree(events, &BlockStore::new()),
            Err(Error::InvalidTree { .. })
        ));
    }

    #[test]
    fn missing_stream_start() {
        let events = vec![Event::DocumentStart];
        assert!(matches!(
            sink_tree(events, &BlockStore::new()),
            Err(Error::ExpectedEvent {
                expected: "stream start",
                ..
            })
        ));
    }

    #[test]
    fn exhausted_stream_is_no_input() {
        assert!(matches!(
            sink_tree(vec![], &BlockStore::new()),
            Err(Error::NoInput)
        ));
        // A mapping missing its end event also runs out of input.
        let events = vec![
            Event::StreamStart,
            Event::DocumentStart,
            Event::mapping_start(YamlTag::None, CollectionStyle::Block),
            Event::plain("k"),
            Event::plain("1"),
        ];
        assert!(matches!(
            sink_tree(events, &BlockStore::new()),
            Err(Error::NoInput)
        ));
    }

    #[test]
    fn mapping_key_must_be_scalar() {
        let events = frame(mapping(vec![
            Event::sequence_start(YamlTag::None, CollectionStyle::Flow),
            Event::SequenceEnd,
        ]));
        assert!(matches!(
            sink_tree(events, &BlockStore::new()),
            Err(Error::ExpectedEvent {
                expected: "mapping key",
                ..
            })
        ));
    }

    fn ndarray_mapping(tag: &str, source: &str) -> Vec<Event> {
        vec![
            Event::plain("x"),
            Event::mapping_start(YamlTag::Uri(tag.into()), CollectionStyle::Flow),
            Event::plain("source"),
            Event::plain(source),
            Event::plain("datatype"),
            Event::plain("int32"),
            Event::plain("shape"),
            Event::sequence_start(YamlTag::None, CollectionStyle::Flow),
            Event::plain("1"),
            Event::SequenceEnd,
            Event::plain("byteorder"),
            Event::plain("big"),
            Event::MappingEnd,
        ]
    }

    fn one_block() -> BlockStore {
        BlockStore::from_blocks(vec![vec![0x01, 0x02, 0x03, 0x04]])
    }

    #[test]
    fn ndarray_extraction() {
        let events = frame(mapping(ndarray_mapping("core/ndarray-1.0.0", "0")));
        let tree = sink_tree(events, &one_block()).unwrap();
        match &tree.get("x").unwrap().value {
            Value::NdArray(data) => {
                assert_eq!(data.bytes, [0x01, 0x02, 0x03, 0x04]);
                assert_eq!(data.datatype, DataType::Int32);
                assert_eq!(data.byteorder, ByteOrder::Big);
                assert_eq!(data.shape, [1]);
            }
            other => panic!("expected ndarray, got {other:?}"),
        }
    }

    #[test]
    fn ndarray_recognized_by_prefix_any_version() {
        let events = frame(mapping(ndarray_mapping("core/ndarray-99.9.9", "0")));
        let tree = sink_tree(events, &one_block()).unwrap();
        let node = tree.get("x").unwrap();
        assert!(matches!(node.value, Value::NdArray(_)));
        assert_eq!(node.tag.as_str(), Some("core/ndarray-99.9.9"));
    }

    #[test]
    fn ndarray_full_uri_tag_recognized() {
        let events = frame(mapping(ndarray_mapping(
            "tag:stsci.edu:asdf/core/ndarray-1.0.0",
            "0",
        )));
        let tree = sink_tree(events, &one_block()).unwrap();
        assert!(matches!(tree.get("x").unwrap().value, Value::NdArray(_)));
    }

    #[test]
    fn untagged_source_mapping_stays_object() {
        // Same keys, but no ndarray tag: the recognizer must stay silent.
        let mut body = ndarray_mapping("core/ndarray-1.0.0", "0");
        body[1] = Event::mapping_start(YamlTag::None, CollectionStyle::Flow);
        let events = frame(mapping(body));
        let tree = sink_tree(events, &one_block()).unwrap();
        assert!(matches!(tree.get("x").unwrap().value, Value::Object(_)));
    }

    #[test]
    fn ndarray_missing_key() {
        let events = frame(mapping(vec![
            Event::plain("x"),
            Event::mapping_start(
                YamlTag::Uri("core/ndarray-1.0.0".into()),
                CollectionStyle::Flow,
            ),
            Event::plain("source"),
            Event::plain("0"),
            Event::MappingEnd,
        ]));
        assert!(matches!(
            sink_tree(events, &one_block()),
            Err(Error::NdArrayMissingKey("datatype"))
        ));
    }

    #[test]
    fn ndarray_missing_block() {
        let events = frame(mapping(ndarray_mapping("core/ndarray-1.0.0", "5")));
        assert!(matches!(
            sink_tree(events, &one_block()),
            Err(Error::NdArrayMissingBlock(5))
        ));
    }

    #[test]
    fn ndarray_bad_source_type() {
        let events = frame(mapping(ndarray_mapping("core/ndarray-1.0.0", "zero")));
        assert!(matches!(
            sink_tree(events, &one_block()),
            Err(Error::NdArrayExpected {
                field: "Source",
                ..
            })
        ));
    }

    #[test]
    fn ndarray_bad_datatype() {
        let mut body = ndarray_mapping("core/ndarray-1.0.0", "0");
        body[5] = Event::plain("complex128");
        let events = frame(mapping(body));
        assert!(matches!(
            sink_tree(events, &one_block()),
            Err(Error::NdArrayExpected {
                field: "DataType",
                ..
            })
        ));
    }

    #[test]
    fn ndarray_bad_byteorder() {
        let mut body = ndarray_mapping("core/ndarray-1.0.0", "0");
        body[11] = Event::plain("middle");
        let events = frame(mapping(body));
        assert!(matches!(
            sink_tree(events, &one_block()),
            Err(Error::NdArrayExpected {
                field: "ByteOrder",
                ..
            })
        ));
    }

    #[test]
    fn ndarray_bad_shape() {
        let mut body = ndarray_mapping("core/ndarray-1.0.0", "0");
        // Replace the shape sequence with a lone scalar.
        body.splice(7..10, [Event::plain("not-a-list")]);
        let events = frame(mapping(body));
        assert!(matches!(
            sink_tree(events, &one_block()),
            Err(Error::NdArrayExpected { field: "Shape", .. })
        ));
    }

    #[test]
    fn internal_reference() {
        let events = frame(mapping(vec![
            Event::plain("r"),
            Event::mapping_start(YamlTag::None, CollectionStyle::Flow),
            Event::plain("$ref"),
            Event::scalar("#/foo/bar", YamlTag::Str, ScalarStyle::Plain),
            Event::MappingEnd,
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        match &tree.get("r").unwrap().value {
            Value::InternalRef(pointer) => {
                assert_eq!(pointer.segments(), ["foo".to_string(), "bar".to_string()]);
            }
            other => panic!("expected internal reference, got {other:?}"),
        }
    }

    #[test]
    fn external_reference() {
        let events = frame(mapping(vec![
            Event::plain("r"),
            Event::mapping_start(YamlTag::None, CollectionStyle::Flow),
            Event::plain("$ref"),
            Event::scalar("other.asdf#/x", YamlTag::Str, ScalarStyle::Plain),
            Event::MappingEnd,
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        assert_eq!(
            tree.get("r").unwrap().value,
            Value::ExternalRef("other.asdf#/x".into())
        );
    }

    #[test]
    fn reference_must_be_string() {
        let events = frame(mapping(vec![
            Event::plain("r"),
            Event::mapping_start(YamlTag::None, CollectionStyle::Flow),
            Event::plain("$ref"),
            Event::plain("17"),
            Event::MappingEnd,
        ]));
        assert!(matches!(
            sink_tree(events, &BlockStore::new()),
            Err(Error::InvalidReference(Value::Integer(17)))
        ));
    }

    #[test]
    fn plain_mapping_falls_through_to_object() {
        let events = frame(mapping(vec![
            Event::plain("obj"),
            Event::mapping_start(YamlTag::None, CollectionStyle::Flow),
            Event::plain("a"),
            Event::plain("1"),
            Event::MappingEnd,
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        match &tree.get("obj").unwrap().value {
            Value::Object(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, "a");
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn tagged_mapping_keeps_canonical_tag() {
        let events = frame(mapping(vec![
            Event::plain("q"),
            Event::mapping_start(
                YamlTag::Uri("tag:stsci.edu:asdf/unit/quantity-1.1.0".into()),
                CollectionStyle::Flow,
            ),
            Event::plain("value"),
            Event::plain("3"),
            Event::MappingEnd,
        ]));
        let tree = sink_tree(events, &BlockStore::new()).unwrap();
        let node = tree.get("q").unwrap();
        assert_eq!(node.tag.as_str(), Some("unit/quantity-1.1.0"));
        assert!(matches!(node.value, Value::Object(_)));
    }
}
