use super::{read_locked, Reader};
use crate::error::{ConfigError, Result};
use crate::value::{Tree, Value};
use ini::{Ini, ParseOption};
use std::path::Path;

/// INI and `.properties` files. Sections become nested nodes; keys outside any
/// section land at the top level.
///
/// Unquoted `true`/`on`/`yes` and `false`/`off`/`no`/`none` become booleans and
/// `null` becomes [`Value::Null`]. Quoted values are always strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniReader;

impl IniReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub(crate) fn parse(content: &str, path: &Path) -> Result<Tree> {
        let options = ParseOption {
            enabled_quote: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)
            .map_err(|e| ConfigError::parse("ini", path, e))?;

        let mut tree = Tree::new();
        for (section, properties) in &ini {
            let target = match section {
                None => &mut tree,
                Some(name) => {
                    let slot = tree
                        .entry(name.to_string())
                        .or_insert_with(|| Value::Node(Tree::new()));
                    if !slot.is_node() {
                        *slot = Value::Node(Tree::new());
                    }
                    let Value::Node(node) = slot else {
                        unreachable!("section slot was just made a node")
                    };
                    node
                }
            };
            for (key, raw) in properties.iter() {
                target.insert(key.to_string(), scalar(raw));
            }
        }
        Ok(tree)
    }
}

fn scalar(raw: &str) -> Value {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Value::from(inner);
        }
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Value::Bool(true),
        "false" | "off" | "no" | "none" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(raw.to_string()),
    }
}

impl Reader for IniReader {
    fn extensions(&self) -> &[&str] {
        &["ini", "properties"]
    }

    fn read(&self, path: &Path) -> Result<Tree> {
        Self::parse(&read_locked(path)?, path)
    }
}
