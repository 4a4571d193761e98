//! Flat `NAME=value` env-file text.
//!
//! Parsing skips blank lines and `#` comments, tolerates a leading `export `,
//! splits on the first `=` and strips one pair of matching surrounding quotes
//! from the value. A repeated name keeps its first position and takes the last
//! value.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered name → value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    entries: Vec<(String, String)>,
}

impl EnvVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact JSON object in insertion order, e.g. `{"A":"1","B":"2"}`.
    pub fn to_canonical_json(&self) -> String {
        // A map of strings to strings always serialises.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = EnvVars::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

impl Serialize for EnvVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parse env-file text.
pub fn parse(text: &str) -> EnvVars {
    let mut vars = EnvVars::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        vars.insert(name, unquote(value.trim()));
    }
    vars
}

/// Render as `NAME=value` lines with a trailing newline.
///
/// Values that [`parse`] would trim or unquote are wrapped in double quotes.
/// Only the outer pair is stripped on the way back, so embedded quotes need no
/// escaping.
pub fn stringify(vars: &EnvVars) -> String {
    let mut out = String::new();
    for (name, value) in vars.iter() {
        out.push_str(name);
        out.push('=');
        if needs_quotes(value) {
            out.push('"');
            out.push_str(value);
            out.push('"');
        } else {
            out.push_str(value);
        }
        out.push('\n');
    }
    out
}

fn needs_quotes(value: &str) -> bool {
    value.trim() != value || unquote(value) != value
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_in_order() {
        let vars = parse("ENV_VAR=123\nENV_VAR_2=abc\n");
        let pairs: Vec<_> = vars.iter().collect();
        assert_eq!(pairs, [("ENV_VAR", "123"), ("ENV_VAR_2", "abc")]);
    }

    #[test]
    fn skips_comments_and_blanks() {
        let vars = parse("# header\n\n  A = 1 \n#B=2\nnot a pair\nexport C='x y'\nD=\"q\"\n");
        assert_eq!(vars.get("A"), Some("1"));
        assert_eq!(vars.get("B"), None);
        assert_eq!(vars.get("C"), Some("x y"));
        assert_eq!(vars.get("D"), Some("q"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn value_may_contain_equals() {
        let vars = parse("URL=postgres://u:p@h/db?sslmode=require");
        assert_eq!(vars.get("URL"), Some("postgres://u:p@h/db?sslmode=require"));
    }

    #[test]
    fn repeated_name_keeps_first_position() {
        let vars = parse("A=1\nB=2\nA=3\n");
        let pairs: Vec<_> = vars.iter().collect();
        assert_eq!(pairs, [("A", "3"), ("B", "2")]);
    }

    #[test]
    fn stringify_round_trips() {
        let text = "ENV_VAR=123\nENV_VAR_2=abc\n";
        assert_eq!(stringify(&parse(text)), text);
    }

    #[test]
    fn stringify_preserves_padding_and_quotes() {
        let vars: EnvVars = [
            ("PADDED", "  padded  "),
            ("QUOTED", "\"already\""),
            ("SINGLE", "'x'"),
            ("HASH", "#not-a-comment"),
            ("LONE", "\""),
            ("EMPTY", ""),
        ]
        .into_iter()
        .collect();
        let text = stringify(&vars);
        assert!(text.contains("PADDED=\"  padded  \"\n"));
        assert!(text.contains("LONE=\"\n"));
        assert_eq!(parse(&text), vars);
    }

    #[test]
    fn canonical_json_is_compact_and_ordered() {
        let vars: EnvVars = [("B", "2"), ("A", "1")].into_iter().collect();
        assert_eq!(vars.to_canonical_json(), r#"{"B":"2","A":"1"}"#);
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut vars: EnvVars = [("A", "1"), ("B", "2"), ("C", "3")].into_iter().collect();
        assert_eq!(vars.remove("B").as_deref(), Some("2"));
        assert_eq!(vars.remove("B"), None);
        let names: Vec<_> = vars.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["A", "C"]);
    }
}
