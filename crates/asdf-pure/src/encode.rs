//! Event production: walking a tree into a YAML event sequence.
//!
//! The walk is pre-order and deterministic; the only side effect is that
//! every ndarray node appends its payload to the document's block store, so
//! block indices count ndarray nodes in document order. Emission itself
//! cannot fail.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::array::NdArrayData;
use crate::block::BlockStore;
use crate::event::{CollectionStyle, Event, ScalarStyle, YamlTag};
use crate::node::{Node, Tree, Value};
use crate::tag::{SchemaTag, NDARRAY_TAG};

/// Emit the full event sequence for a document tree.
///
/// The tree's entries become the root mapping, wrapped in stream and
/// document framing. Ndarray payloads are appended to `blocks` as they are
/// encountered.
pub fn stream_tree(tree: &Tree, blocks: &mut BlockStore) -> Vec<Event> {
    let mut emitter = Emitter {
        events: Vec::new(),
        blocks,
    };
    emitter.events.push(Event::StreamStart);
    emitter.events.push(Event::DocumentStart);
    emitter.mapping(&SchemaTag::none(), &tree.0);
    emitter.events.push(Event::DocumentEnd);
    emitter.events.push(Event::StreamEnd);
    emitter.events
}

struct Emitter<'a> {
    events: Vec<Event>,
    blocks: &'a mut BlockStore,
}

fn event_tag(tag: &SchemaTag) -> YamlTag {
    match tag.as_str() {
        Some(uri) => YamlTag::Uri(String::from(uri)),
        None => YamlTag::None,
    }
}

/// Block style when any child is a container, flow otherwise.
fn collection_style<'a>(mut children: impl Iterator<Item = &'a Node>) -> CollectionStyle {
    if children.any(|node| node.value.is_complex()) {
        CollectionStyle::Block
    } else {
        CollectionStyle::Flow
    }
}

impl Emitter<'_> {
    fn node(&mut self, node: &Node) {
        match &node.value {
            Value::Null => self.scalar(b"~".to_vec(), &node.tag, ScalarStyle::Plain),
            Value::Bool(b) => {
                let text: &[u8] = if *b { b"true" } else { b"false" };
                self.scalar(text.to_vec(), &node.tag, ScalarStyle::Plain);
            }
            Value::Integer(n) => {
                self.scalar(n.to_string().into_bytes(), &node.tag, ScalarStyle::Plain)
            }
            Value::Number(f) => {
                self.scalar(format!("{f}").into_bytes(), &node.tag, ScalarStyle::Plain)
            }
            Value::String(s) => {
                // The empty string must stay distinguishable from a missing
                // value, so it is the one quoted scalar.
                let style = if s.is_empty() {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::Plain
                };
                self.scalar(s.clone().into_bytes(), &node.tag, style);
            }
            Value::Array(items) => self.sequence(&node.tag, items),
            Value::Object(entries) => self.mapping(&node.tag, entries),
            Value::NdArray(data) => self.ndarray(&node.tag, data),
            Value::InternalRef(pointer) => self.reference(pointer.to_string()),
            Value::ExternalRef(uri) => self.reference(uri.clone()),
        }
    }

    fn scalar(&mut self, value: Vec<u8>, tag: &SchemaTag, style: ScalarStyle) {
        self.events.push(Event::scalar(value, event_tag(tag), style));
    }

    fn mapping(&mut self, tag: &SchemaTag, entries: &[(String, Node)]) {
        let style = collection_style(entries.iter().map(|(_, node)| node));
        self.events
            .push(Event::mapping_start(event_tag(tag), style));
        for (key, value) in entries {
            self.events.push(Event::plain(key.as_bytes()));
            self.node(value);
        }
        self.events.push(Event::MappingEnd);
    }

    fn sequence(&mut self, tag: &SchemaTag, items: &[Node]) {
        let style = collection_style(items.iter());
        self.events
            .push(Event::sequence_start(event_tag(tag), style));
        for item in items {
            self.node(item);
        }
        self.events.push(Event::SequenceEnd);
    }

    /// Ndarrays serialize as a flow mapping over a freshly appended block.
    ///
    /// Key order is fixed: `source`, `datatype`, `shape`, `byteorder`.
    fn ndarray(&mut self, tag: &SchemaTag, data: &NdArrayData) {
        let source = self.blocks.append(data.bytes.clone());

        let tag = tag.clone().or(SchemaTag::parse(NDARRAY_TAG));
        self.events
            .push(Event::mapping_start(event_tag(&tag), CollectionStyle::Flow));

        self.events.push(Event::plain("source"));
        self.events.push(Event::plain(source.to_string().into_bytes()));

        self.events.push(Event::plain("datatype"));
        self.node(&Node::untagged(data.datatype.to_value()));

        self.events.push(Event::plain("shape"));
        self.events
            .push(Event::sequence_start(YamlTag::None, CollectionStyle::Flow));
        for axis in &data.shape {
            self.events.push(Event::plain(axis.to_string().into_bytes()));
        }
        self.events.push(Event::SequenceEnd);

        self.events.push(Event::plain("byteorder"));
        self.events.push(Event::plain(data.byteorder.as_str()));

        self.events.push(Event::MappingEnd);
    }

    fn reference(&mut self, target: String) {
        self.events
            .push(Event::mapping_start(YamlTag::None, CollectionStyle::Flow));
        self.events.push(Event::plain("$ref"));
        self.events.push(Event::plain(target.into_bytes()));
        self.events.push(Event::MappingEnd);
    }
}
