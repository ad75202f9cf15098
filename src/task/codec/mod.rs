//! Document codec for task record files.
//!
//! A record file is an optional `---` delimited YAML front-matter block (or,
//! failing that, inline `key: value` lines) followed by a markdown body with
//! an H1 title, a free-text preamble, and H2 sections. Decoding keeps the
//! order of front-matter keys and sections so that a read-modify-write cycle
//! leaves untouched content where it was.

mod body;
mod filename;
mod front_matter;

pub use filename::{RECORD_EXTENSION, file_name_for, id_from_file_name, is_record_file_name};

use crate::task::domain::{
    CURRENT_SCHEMA, CallerId, ErrorCode, TaskDomainError, TaskId, TaskRecord, TaskRecordParts,
    TaskStatus, Version, is_reserved_field,
};
use camino::Utf8Path;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::warn;

const UPDATED: &str = "updated";

/// Errors raised while decoding or encoding a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The text is not a well-formed record.
    #[error("cannot parse {location}: {message}")]
    Parse {
        /// File path or `<memory>` for in-memory text.
        location: String,
        /// Description of the problem.
        message: String,
    },

    /// The filename-derived id disagrees with the declared id.
    #[error("id mismatch in {location}: filename says '{filename_id}', front-matter says '{declared_id}'")]
    IdMismatch {
        /// File path of the record.
        location: String,
        /// Id taken from the file name.
        filename_id: String,
        /// Id declared in the metadata.
        declared_id: String,
    },

    /// The record could not be serialized.
    #[error("cannot encode record {task_id}: {message}")]
    Encode {
        /// Record identifier.
        task_id: TaskId,
        /// Description of the problem.
        message: String,
    },
}

impl CodecError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } | Self::Encode { .. } => ErrorCode::ParseError,
            Self::IdMismatch { .. } => ErrorCode::IdMismatch,
        }
    }
}

/// Decodes record text.
///
/// `location` is the file the text came from; its name supplies the
/// default id and is checked against any declared id.
///
/// # Errors
///
/// Returns [`CodecError::Parse`] for malformed or unterminated front-matter
/// and invalid field values, and [`CodecError::IdMismatch`] when the
/// declared id differs from the filename-derived id.
pub fn decode(text: &str, location: Option<&Utf8Path>) -> Result<TaskRecord, CodecError> {
    let place = location.map_or_else(|| "<memory>".to_owned(), ToString::to_string);
    let parse_error = |message: String| CodecError::Parse {
        location: place.clone(),
        message,
    };

    let split = front_matter::split(text).map_err(&parse_error)?;
    let metadata = split.metadata;
    let document = body::parse(&split.body);

    let filename_id = location
        .and_then(Utf8Path::file_name)
        .and_then(id_from_file_name);
    let declared_id = scalar_text(metadata.get("id"))
        .map_err(|message| parse_error(format!("id: {message}")))?
        .filter(|value| !value.trim().is_empty());

    let id = match (filename_id, declared_id) {
        (Some(from_name), Some(declared)) => {
            let named = TaskId::new(from_name).map_err(|err| parse_error(err.to_string()))?;
            let stated = TaskId::new(declared.as_str())
                .map_err(|err| parse_error(err.to_string()))?;
            if named != stated {
                return Err(CodecError::IdMismatch {
                    location: place.clone(),
                    filename_id: named.to_string(),
                    declared_id: stated.to_string(),
                });
            }
            stated
        }
        (Some(from_name), None) => {
            TaskId::new(from_name).map_err(|err| parse_error(err.to_string()))?
        }
        (None, Some(declared)) => {
            TaskId::new(declared).map_err(|err| parse_error(err.to_string()))?
        }
        (None, None) => return Err(parse_error("record has no id".to_owned())),
    };

    let fields = TypedFields::read(&metadata).map_err(&parse_error)?;
    let keep_raw_updated = fields.updated_at.is_none()
        && metadata.get(UPDATED).is_some_and(|value| !value.is_null());
    if keep_raw_updated {
        warn!(
            location = %place,
            "updated is not an RFC 3339 timestamp or date; kept as written until the next write"
        );
    }
    let field_order = metadata
        .keys()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    let extra_fields: Mapping = metadata
        .into_iter()
        .filter(|(key, _)| {
            key.as_str().is_some_and(|name| {
                !is_reserved_field(name) || (keep_raw_updated && name == UPDATED)
            })
        })
        .collect();

    Ok(TaskRecord::from_parts(TaskRecordParts {
        id,
        status: fields.status,
        version: fields.version,
        assignee: fields.assignee,
        depends_on: fields.depends_on,
        schema: fields.schema,
        updated_at: fields.updated_at,
        extra_fields,
        field_order,
        document,
        source_path: location.map(Utf8Path::to_path_buf),
    }))
}

/// Encodes a record as file text.
///
/// Front-matter keys keep the order they were read in; keys new to the file
/// are appended. The body is followed by exactly one trailing newline.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when the metadata cannot be serialized.
pub fn encode(record: &TaskRecord) -> Result<String, CodecError> {
    let metadata = metadata_for(record);
    let block = front_matter::render(&metadata).map_err(|message| CodecError::Encode {
        task_id: record.id().clone(),
        message,
    })?;

    let markdown = body::render(record.document());
    if markdown.trim().is_empty() {
        return Ok(block);
    }
    let mut out = block;
    out.push('\n');
    out.push_str(&body::finish(&markdown));
    Ok(out)
}

struct TypedFields {
    status: Option<TaskStatus>,
    version: Version,
    assignee: Option<CallerId>,
    depends_on: Vec<TaskId>,
    schema: u32,
    updated_at: Option<DateTime<Utc>>,
}

impl TypedFields {
    fn read(metadata: &Mapping) -> Result<Self, String> {
        let field = |key: &str| {
            scalar_text(metadata.get(key)).map_err(|message| format!("{key}: {message}"))
        };
        let invalid = |key: &str, err: TaskDomainError| format!("{key}: {err}");

        let status = field("status")?
            .filter(|value| !value.trim().is_empty())
            .map(TaskStatus::new)
            .transpose()
            .map_err(|err| invalid("status", err))?;

        let version = match field("version")? {
            None => Version::INITIAL,
            Some(raw) => {
                let number = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| format!("version: '{raw}' is not an integer >= 1"))?;
                Version::new(number).map_err(|err| invalid("version", err))?
            }
        };

        let assignee = field("assignee")?
            .filter(|value| !value.trim().is_empty())
            .map(CallerId::new)
            .transpose()
            .map_err(|err| invalid("assignee", err))?;

        let depends_on = read_depends_on(metadata.get("depends_on"))?;

        let schema = match field("schema")? {
            None => CURRENT_SCHEMA,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("schema: '{raw}' is not an integer"))?,
        };

        let updated_at = metadata
            .get(UPDATED)
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        Ok(Self {
            status,
            version,
            assignee,
            depends_on,
            schema,
            updated_at,
        })
    }
}

fn scalar_text(value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(_) => Err("expected a scalar value".to_owned()),
    }
}

fn read_depends_on(value: Option<&Value>) -> Result<Vec<TaskId>, String> {
    let raw: Vec<String> = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(list)) => list.split(',').map(str::to_owned).collect(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| scalar_text(Some(item)).map(Option::unwrap_or_default))
            .collect::<Result<_, _>>()
            .map_err(|message| format!("depends_on: {message}"))?,
        Some(_) => return Err("depends_on: expected a list or comma-separated string".to_owned()),
    };

    let mut ids: Vec<TaskId> = Vec::new();
    for entry in raw.iter().map(|item| item.trim()).filter(|item| !item.is_empty()) {
        let id = TaskId::new(entry).map_err(|err| format!("depends_on: {err}"))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn typed_value(record: &TaskRecord, key: &str, listed: bool) -> Option<Value> {
    match key {
        "id" => Some(Value::String(record.id().to_string())),
        "status" => record.status().map(|status| Value::String(status.to_string())),
        "version" => Some(Value::Number(record.version().value().into())),
        "assignee" => record
            .assignee()
            .map(|caller| Value::String(caller.to_string())),
        "depends_on" => (listed || !record.depends_on().is_empty()).then(|| {
            Value::Sequence(
                record
                    .depends_on()
                    .iter()
                    .map(|id| Value::String(id.to_string()))
                    .collect(),
            )
        }),
        "schema" => Some(Value::Number(record.schema().into())),
        UPDATED => record
            .updated_at()
            .map(|stamp| Value::String(stamp.to_rfc3339_opts(SecondsFormat::Secs, true))),
        _ => None,
    }
}

fn metadata_for(record: &TaskRecord) -> Mapping {
    let mut metadata = Mapping::new();
    let order = record.field_order();

    for key in order {
        let value = if is_reserved_field(key) {
            typed_value(record, key, true).or_else(|| record.field(key).cloned())
        } else {
            record.field(key).cloned()
        };
        if let Some(present) = value {
            metadata.insert(Value::String(key.clone()), present);
        }
    }

    for key in crate::task::domain::RESERVED_FIELDS {
        if order.iter().any(|listed| listed == key) {
            continue;
        }
        if let Some(present) = typed_value(record, key, false) {
            metadata.insert(Value::String(key.to_owned()), present);
        }
    }

    for (key, value) in record.extra_fields() {
        if !metadata.contains_key(key) {
            metadata.insert(key.clone(), value.clone());
        }
    }
    metadata
}
