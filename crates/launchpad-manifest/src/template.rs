//! Manifest template rendering.
//!
//! Templates are plain YAML with `{{placeholder}}` markers:
//!
//! | Placeholder | Expands to |
//! |---|---|
//! | `{{name}}` | resource name |
//! | `{{containerImage}}` | image reference (projects only) |
//! | `{{manifests}}` | one `- <file>` item per manifest file |
//! | `{{env}}` | one `- KEY=value` item per environment entry, sorted by key |
//!
//! List placeholders must sit alone on their line; items are written at the
//! placeholder's indentation, and an empty list renders as `[]`.
//!
//! A scalar placeholder that forms a whole token, and every list item, is
//! written as a YAML scalar that reads back unchanged: plain when the parser
//! agrees, double-quoted with escapes otherwise. A scalar spliced into a larger
//! token (`{{name}}-env`) is written raw and must consist of name characters.

use std::collections::BTreeMap;

/// Values available to a template for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    pub name: String,
    pub env: BTreeMap<String, String>,
    /// Manifest files this resource emits, in render order.
    pub manifests: Vec<String>,
    pub container_image: Option<String>,
}

impl TemplateData {
    pub fn new(name: impl Into<String>, manifests: &[&str]) -> Self {
        Self {
            name: name.into(),
            env: BTreeMap::new(),
            manifests: manifests.iter().map(|m| (*m).to_owned()).collect(),
            container_image: None,
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_container_image(mut self, image: impl Into<String>) -> Self {
        self.container_image = Some(image.into());
        self
    }

    fn scalar(&self, placeholder: &str) -> Option<&str> {
        match placeholder {
            "name" => Some(&self.name),
            "containerImage" => self.container_image.as_deref(),
            _ => None,
        }
    }

    fn list(&self, placeholder: &str) -> Option<Vec<String>> {
        match placeholder {
            "manifests" => Some(self.manifests.clone()),
            "env" => Some(self.env.iter().map(|(k, v)| format!("{k}={v}")).collect()),
            _ => None,
        }
    }
}

/// Render `source` against `data`.
///
/// # Examples
///
/// ```
/// use launchpad_manifest::TemplateData;
/// use launchpad_manifest::template::render;
///
/// let data = TemplateData::new("api", &["deployment.yml"]);
/// let out = render("name: {{name}}\nresources:\n  {{manifests}}\n", &data).unwrap();
/// assert_eq!(out, "name: api\nresources:\n  - deployment.yml\n");
/// ```
pub fn render(source: &str, data: &TemplateData) -> Result<String, RenderError> {
    let mut out = String::with_capacity(source.len());

    for (index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let (line, newline) = match raw_line.strip_suffix('\n') {
            Some(line) => (line, "\n"),
            None => (raw_line, ""),
        };

        if let Some((indent, items)) = standalone_list(line, data) {
            if items.is_empty() {
                out.push_str(indent);
                out.push_str("[]");
            }
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(indent);
                out.push_str("- ");
                out.push_str(&yaml_scalar(item));
            }
            out.push_str(newline);
            continue;
        }

        render_line(line, line_no, data, &mut out)?;
        out.push_str(newline);
    }

    Ok(out)
}

/// A line holding nothing but a list placeholder: its indentation and items.
fn standalone_list<'a>(line: &'a str, data: &TemplateData) -> Option<(&'a str, Vec<String>)> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let name = trimmed
        .trim_end()
        .strip_prefix("{{")?
        .strip_suffix("}}")?
        .trim();
    data.list(name).map(|items| (indent, items))
}

fn render_line(
    line: &str,
    line_no: usize,
    data: &TemplateData,
    out: &mut String,
) -> Result<(), RenderError> {
    let mut rest = line;
    let mut prev: Option<char> = None;

    while let Some(start) = rest.find("{{") {
        let literal = &rest[..start];
        out.push_str(literal);
        prev = literal.chars().last().or(prev);

        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or(RenderError::Unterminated { line: line_no })?;
        let name = after[..end].trim();
        rest = &after[end + 2..];

        let Some(value) = data.scalar(name) else {
            if data.list(name).is_some() {
                return Err(RenderError::InlineList {
                    name: name.to_owned(),
                    line: line_no,
                });
            }
            return Err(RenderError::UnknownPlaceholder {
                name: name.to_owned(),
                line: line_no,
            });
        };

        let whole_token = prev.is_none_or(char::is_whitespace)
            && rest.chars().next().is_none_or(char::is_whitespace);
        if whole_token {
            out.push_str(&yaml_scalar(value));
        } else if is_token_safe(value) {
            out.push_str(value);
        } else {
            return Err(RenderError::EmbeddedValue {
                name: name.to_owned(),
                line: line_no,
            });
        }
        prev = value.chars().last().or(prev);
    }

    out.push_str(rest);
    Ok(())
}

/// Indicators that change meaning at the start of a plain scalar.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// YAML 1.1 words Kubernetes tooling still resolves to booleans or null.
const RESERVED_WORDS: &[&str] = &[
    "y", "yes", "n", "no", "true", "false", "on", "off", "null", "~",
];

/// `value` as a YAML scalar that reads back unchanged.
///
/// Plain when the YAML parser agrees the plain form is the same string,
/// double-quoted with escapes otherwise.
fn yaml_scalar(value: &str) -> String {
    if is_plain_safe(value) {
        value.to_owned()
    } else {
        double_quoted(value)
    }
}

fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if first.is_ascii_digit()
        || first == '+'
        || first == '.'
        || INDICATORS.contains(&first)
        || value.chars().any(needs_escape)
        || RESERVED_WORDS.contains(&value.to_ascii_lowercase().as_str())
    {
        return false;
    }

    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(value),
        Ok(serde_yaml::Value::String(parsed)) if parsed == value
    )
}

/// Whether `value` can be spliced into a larger plain token as-is.
fn is_token_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

/// Characters YAML does not accept raw in a scalar.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}')
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown template placeholder '{{{{{name}}}}}' on line {line}")]
    UnknownPlaceholder { name: String, line: usize },

    #[error("list placeholder '{{{{{name}}}}}' must be alone on its line (line {line})")]
    InlineList { name: String, line: usize },

    #[error("unterminated placeholder on line {line}")]
    Unterminated { line: usize },

    #[error(
        "value of '{{{{{name}}}}}' cannot be embedded in a larger YAML token (line {line})"
    )]
    EmbeddedValue { name: String, line: usize },
}
