//! The generic document tree produced by the configuration parser.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A parsed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Mapping(Mapping),
    Sequence(Vec<Node>),
    Scalar(String),
    Null,
}

impl Node {
    /// Looks up `key` if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }
}

impl From<Option<String>> for Node {
    fn from(value: Option<String>) -> Self {
        value.map_or(Node::Null, Node::Scalar)
    }
}

/// An insertion-ordered mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: String, value: Node) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Mapping(m) => m.serialize(serializer),
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Scalar(s) => serializer.serialize_str(s),
            Node::Null => serializer.serialize_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut mapping = Mapping::new();
        mapping.insert("a".into(), Node::Scalar("1".into()));
        mapping.insert("b".into(), Node::Null);
        mapping.insert("a".into(), Node::Scalar("2".into()));

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(mapping.get("a"), Some(&Node::Scalar("2".into())));
    }

    #[test]
    fn test_json_preserves_order() {
        let mut inner = Mapping::new();
        inner.insert("z".into(), Node::Null);
        inner.insert("a".into(), Node::Sequence(vec![Node::Scalar("x".into())]));

        let mut root = Mapping::new();
        root.insert("second".into(), Node::Scalar("2".into()));
        root.insert("first".into(), Node::Mapping(inner));

        let json = serde_json::to_string(&Node::Mapping(root)).unwrap();
        assert_eq!(json, r#"{"second":"2","first":{"z":null,"a":["x"]}}"#);
    }

    #[test]
    fn test_accessors() {
        let node = Node::Sequence(vec![Node::Null]);
        assert!(node.as_sequence().is_some());
        assert!(node.as_mapping().is_none());
        assert!(node.get("anything").is_none());
        assert!(Node::from(None).is_null());
        assert_eq!(Node::from(Some("a".to_string())).as_scalar(), Some("a"));
    }
}
