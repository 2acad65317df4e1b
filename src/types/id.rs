//! String-backed identifiers.
//!
//! Every identifier wraps an owned `String` and orders lexicographically, so
//! maps keyed by identifiers iterate in a stable, platform-independent order.

/// Declares a string-backed identifier newtype.
///
/// The generated type is `Ord` (lexicographic), serializes transparently as a
/// JSON string, and implements `Borrow<str>` so ordered maps keyed by it can be
/// queried with plain `&str` keys.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use string_id;

string_id! {
    /// Unique identifier of a node in a topology.
    NodeId
}

string_id! {
    /// Unique identifier of a directed link in a topology.
    LinkId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_lexicographic_ordering() {
        let a = LinkId::new("e12");
        let b = LinkId::new("e13");
        let c = LinkId::new("e2");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(NodeId::new("n1"), 1);
        assert_eq!(map.get("n1"), Some(&1));
        assert_eq!(map.get("n2"), None);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = NodeId::from("n7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"n7\"");
        let back: NodeId = serde_json::from_str("\"n7\"").unwrap();
        assert_eq!(back, id);
    }
}
