//! Schema tags identifying the semantic type of a tree node.
//!
//! Tags arrive either as short schema names (`core/ndarray-1.0.0`) or as
//! fully qualified URIs (`tag:stsci.edu:asdf/core/ndarray-1.0.0`). The
//! standard `stsci.edu` prefix is stripped on construction so both spellings
//! compare equal; foreign URIs are kept in full.

use alloc::string::String;

/// The URI prefix under which the standard ASDF schemas live.
pub const STSCI_TAG_PREFIX: &str = "tag:stsci.edu:asdf/";

/// The canonical tag of an n-dimensional array mapping.
pub const NDARRAY_TAG: &str = "core/ndarray-1.0.0";

/// Prefix shared by every version of the ndarray schema.
pub const NDARRAY_TAG_PREFIX: &str = "core/ndarray";

/// An optional schema identifier attached to a tree node.
///
/// The absent state is the [`Default`] and acts as the identity under
/// [`SchemaTag::or`]. Canonicalization is idempotent: re-parsing a tag's
/// canonical form yields the same tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaTag(Option<String>);

impl SchemaTag {
    /// The absent tag.
    pub const fn none() -> Self {
        SchemaTag(None)
    }

    /// Parse a tag from a short name or full URI, canonicalizing it.
    pub fn parse(uri: &str) -> Self {
        let canonical = uri.strip_prefix(STSCI_TAG_PREFIX).unwrap_or(uri);
        SchemaTag(Some(String::from(canonical)))
    }

    /// Returns `true` if no tag is attached.
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// The canonical tag string, if present.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Returns `true` if the canonical form starts with `prefix`.
    ///
    /// Version suffixes are deliberately not inspected: any
    /// `core/ndarray-…` tag matches the [`NDARRAY_TAG_PREFIX`].
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.as_deref().is_some_and(|s| s.starts_with(prefix))
    }

    /// Merge two tags, preferring `self`; the absent tag is the identity.
    pub fn or(self, other: SchemaTag) -> SchemaTag {
        if self.is_none() {
            other
        } else {
            self
        }
    }
}

impl core::fmt::Display for SchemaTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.0 {
            Some(s) => f.write_str(s),
            None => Ok(()),
        }
    }
}
