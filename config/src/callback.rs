//! Ready-made key callbacks.

use crate::chain::ChainConfig;
use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"))
}

/// Key callback replacing every `{dotted.key}` token with the value that key
/// resolves to in `config`. Unset keys expand to an empty string.
///
/// ```no_run
/// use chainconf::{resolve_placeholders, ChainConfig};
///
/// let mut config = ChainConfig::new();
/// config.append_key_callback(resolve_placeholders);
/// // `{app.db.type}.driver` is looked up as `mysql.driver` when
/// // `app.db.type` is `mysql`.
/// let driver = config.get("{app.db.type}.driver")?;
/// # Ok::<(), chainconf::ConfigError>(())
/// ```
///
/// # Errors
///
/// Propagates errors from the nested lookups.
pub fn resolve_placeholders(config: &mut ChainConfig, key: &str) -> Result<String> {
    let pattern = placeholder_pattern();
    if !pattern.is_match(key) {
        return Ok(key.to_string());
    }

    let mut resolved = String::with_capacity(key.len());
    let mut last = 0;
    for caps in pattern.captures_iter(key) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        resolved.push_str(&key[last..token.start()]);
        if let Some(value) = config.get(name.as_str())? {
            resolved.push_str(&value.to_string());
        }
        last = token.end();
    }
    resolved.push_str(&key[last..]);
    Ok(resolved)
}
