//! Front-matter and inline metadata handling.

use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Metadata block and remaining markdown body of a record file.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct SplitDocument {
    pub(super) metadata: Mapping,
    pub(super) body: String,
}

/// Separates metadata from the markdown body.
///
/// A `---` delimited YAML block at the top of the file takes precedence.
/// Without one, a leading run of `key: value` lines ending at the first
/// blank line is read as inline metadata.
pub(super) fn split(text: &str) -> Result<SplitDocument, String> {
    let content = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = content.split_inclusive('\n');

    let opens_block = content
        .lines()
        .next()
        .is_some_and(|first| first.trim_end() == DELIMITER);
    if !opens_block {
        return Ok(split_inline(content));
    }

    lines.next();
    let mut yaml = String::new();
    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            let body: String = lines.collect();
            return Ok(SplitDocument {
                metadata: parse_block(&yaml)?,
                body,
            });
        }
        yaml.push_str(line);
    }
    Err("front-matter block is not terminated by '---'".to_owned())
}

fn parse_block(yaml: &str) -> Result<Mapping, String> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let parsed: Value = serde_yaml::from_str(yaml).map_err(|err| err.to_string())?;
    let mapping = match parsed {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => return Err("front-matter must be a mapping of fields".to_owned()),
    };
    if let Some(key) = mapping.keys().find(|key| !key.is_string()) {
        return Err(format!("front-matter key {key:?} is not a string"));
    }
    Ok(mapping)
}

fn split_inline(content: &str) -> SplitDocument {
    let mut metadata = Mapping::new();
    let mut consumed = 0;
    let mut lines = content.split_inclusive('\n');
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            consumed += 1;
            break;
        }
        let Some((key, value)) = inline_field(line) else {
            return SplitDocument {
                metadata: Mapping::new(),
                body: content.to_owned(),
            };
        };
        if !metadata.contains_key(key) {
            metadata.insert(Value::String(key.to_owned()), inline_value(value));
        }
        consumed += 1;
    }

    if metadata.is_empty() {
        return SplitDocument {
            metadata,
            body: content.to_owned(),
        };
    }
    SplitDocument {
        metadata,
        body: content.split_inclusive('\n').skip(consumed).collect(),
    }
}

fn inline_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.trim_end().split_once(':')?;
    let mut chars = key.chars();
    let starts_well = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    let rest_ok = chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    (starts_well && rest_ok).then_some((key, value.trim()))
}

fn inline_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Sequence(_))) => value,
        _ => Value::String(raw.to_owned()),
    }
}

/// Renders a metadata mapping as a delimited front-matter block.
pub(super) fn render(metadata: &Mapping) -> Result<String, String> {
    let yaml = serde_yaml::to_string(metadata).map_err(|err| err.to_string())?;
    let mut block = String::with_capacity(yaml.len() + 8);
    block.push_str(DELIMITER);
    block.push('\n');
    block.push_str(&yaml);
    if !yaml.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(DELIMITER);
    block.push('\n');
    Ok(block)
}
