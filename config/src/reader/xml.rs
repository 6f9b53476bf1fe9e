use super::{read_locked, Reader};
use crate::error::{ConfigError, Result};
use crate::value::{Tree, Value};
use roxmltree::{Document, Node};
use std::path::Path;

/// XML files. The root element is dropped and its children become the
/// top-level keys.
///
/// Repeated sibling elements become a node indexed `0`, `1`, ...; elements
/// without child elements become their trimmed text; attributes are kept
/// under an `@attributes` node, in which case the element text is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReader;

impl XmlReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub(crate) fn parse(content: &str, path: &Path) -> Result<Tree> {
        let doc = Document::parse(content).map_err(|e| ConfigError::parse("xml", path, e))?;
        match element_value(doc.root_element()) {
            Value::Node(tree) => Ok(tree),
            _ => Ok(Tree::new()),
        }
    }
}

fn element_value(node: Node<'_, '_>) -> Value {
    let mut tree = Tree::new();

    let attributes: Tree = node
        .attributes()
        .map(|attr| (attr.name().to_string(), Value::from(attr.value())))
        .collect();
    if !attributes.is_empty() {
        tree.insert("@attributes".to_string(), Value::Node(attributes));
    }

    let mut has_elements = false;
    for child in node.children().filter(Node::is_element) {
        has_elements = true;
        let name = child.tag_name().name().to_string();
        let value = element_value(child);
        match tree.get_mut(&name) {
            None => {
                tree.insert(name, value);
            }
            Some(existing) => push_sibling(existing, value),
        }
    }

    if !has_elements && tree.is_empty() {
        let text: String = node
            .children()
            .filter(Node::is_text)
            .filter_map(|c| c.text())
            .collect();
        let text = text.trim();
        if !text.is_empty() {
            return Value::from(text);
        }
    }

    Value::Node(tree)
}

/// Turns a single value into an indexed list on the second occurrence of a
/// tag, then keeps appending.
fn push_sibling(existing: &mut Value, value: Value) {
    let already_list = matches!(
        existing,
        Value::Node(tree) if !tree.is_empty() && is_indexed(tree)
    );
    if !already_list {
        let first = std::mem::take(existing);
        let mut list = Tree::new();
        list.insert("0".to_string(), first);
        *existing = Value::Node(list);
    }
    if let Value::Node(list) = existing {
        list.insert(list.len().to_string(), value);
    }
}

fn is_indexed(tree: &Tree) -> bool {
    tree.keys()
        .enumerate()
        .all(|(i, key)| key.parse::<usize>() == Ok(i))
}

impl Reader for XmlReader {
    fn extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn read(&self, path: &Path) -> Result<Tree> {
        Self::parse(&read_locked(path)?, path)
    }
}
