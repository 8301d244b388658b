//! Macro definitions, call parsing and placeholder substitution
//!
//! A macro body refers to its arguments as `${1}`, `${2}`, ... and to its
//! own name as `${0}`. A call looks like `${name "arg 1" "arg 2"}`.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    pub body: String,
}

impl MacroDefinition {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Body with placeholders replaced; missing arguments become empty text
    /// and surplus arguments are ignored
    pub fn expand(&self, arguments: &[String]) -> String {
        substitute(&self.body, &self.name, arguments)
    }
}

/// Name to definition bindings of one scanner
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    macros: HashMap<String, MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, returning the one it replaces
    pub fn add(&mut self, definition: MacroDefinition) -> Option<MacroDefinition> {
        self.macros.insert(definition.name.clone(), definition)
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<MacroDefinition> {
        self.macros.remove(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn clear(&mut self) {
        self.macros.clear();
    }
}

/// A parsed `${name "arg" ...}` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub name: String,
    pub arguments: Vec<String>,
}

/// Text after the arguments that is not a quoted string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedCall {
    pub name: String,
    pub remainder: String,
}

/// Parse the complete text of a call, from `${` to the closing `}`
pub fn parse_call(text: &str) -> Result<MacroCall, MalformedCall> {
    let inner = text.strip_prefix("${").unwrap_or(text);
    let inner = inner.strip_suffix('}').unwrap_or(inner).trim_start();

    let name_end = inner.find(char::is_whitespace).unwrap_or(inner.len());
    let (name, mut rest) = inner.split_at(name_end);

    let mut arguments = Vec::new();
    while let Some((argument, after)) = quoted_argument(rest) {
        arguments.push(argument);
        rest = after;
    }

    let remainder = rest.trim();
    if !remainder.is_empty() {
        return Err(MalformedCall {
            name: name.to_string(),
            remainder: remainder.to_string(),
        });
    }

    Ok(MacroCall {
        name: name.to_string(),
        arguments,
    })
}

/// Read one `\s*"..."\s*` argument, returning its unescaped value and the rest
fn quoted_argument(text: &str) -> Option<(String, &str)> {
    let body = text.trim_start().strip_prefix('"')?;

    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if body[i + 1..].starts_with('"') => {
                chars.next();
            }
            '"' => {
                let value = body[..i].replace("\\\"", "\"");
                return Some((value, body[i + 1..].trim_start()));
            }
            _ => {}
        }
    }

    None
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([0-9]+)\}").expect("placeholder pattern is valid"))
}

/// Replace `${0}` with `name` and `${N}` with the N-th argument
pub fn substitute(body: &str, name: &str, arguments: &[String]) -> String {
    placeholder_pattern()
        .replace_all(body, |caps: &Captures| match caps[1].parse::<usize>() {
            Ok(0) => name.to_string(),
            Ok(n) => arguments.get(n - 1).cloned().unwrap_or_default(),
            Err(_) => String::new(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_call_with_arguments() {
        let call = parse_call(r#"${greet "World" "and \"you\""}"#).unwrap();
        assert_eq!(call.name, "greet");
        assert_eq!(call.arguments, vec!["World", "and \"you\""]);
    }

    #[test]
    fn test_parse_call_tolerates_whitespace_and_line_breaks() {
        let call = parse_call("${  pair \"a\"\n    \"b\"  }").unwrap();
        assert_eq!(call.name, "pair");
        assert_eq!(call.arguments, vec!["a", "b"]);

        let bare = parse_call("${now}").unwrap();
        assert_eq!(bare.name, "now");
        assert!(bare.arguments.is_empty());
    }

    #[test]
    fn test_parse_call_reports_junk() {
        assert_matches!(
            parse_call(r#"${m "a" junk}"#),
            Err(MalformedCall { ref name, ref remainder }) if name == "m" && remainder == "junk"
        );
        assert_matches!(
            parse_call(r#"${m "unclosed}"#),
            Err(MalformedCall { ref remainder, .. }) if remainder == "\"unclosed"
        );
    }

    #[test]
    fn test_substitution_blank_fills_and_ignores_extras() {
        let def = MacroDefinition::new("m", "<${1}|${2}|${0}>");
        assert_eq!(def.expand(&["x".into()]), "<x||m>");
        assert_eq!(
            def.expand(&["a".into(), "b".into(), "c".into()]),
            "<a|b|m>"
        );
        assert_eq!(substitute("${99999999999999999999999}", "m", &[]), "");
    }

    #[test]
    fn test_macro_table() {
        let mut table = MacroTable::new();
        assert!(table.add(MacroDefinition::new("a", "1")).is_none());
        let old = table.add(MacroDefinition::new("a", "2"));
        assert_eq!(old.map(|d| d.body), Some("1".to_string()));
        assert_eq!(table.get("a").map(|d| d.body.as_str()), Some("2"));
        assert_eq!(table.len(), 1);
        assert!(table.remove("a").is_some());
        assert!(table.is_empty());
    }
}
