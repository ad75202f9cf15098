//! Unit tests for the record document codec.

use crate::task::{
    codec::{CodecError, decode, encode, file_name_for, id_from_file_name, is_record_file_name},
    domain::{ErrorCode, Version},
};
use camino::Utf8Path;
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_yaml::Value;

#[fixture]
fn sample() -> &'static str {
    concat!(
        "---\n",
        "id: task-001\n",
        "priority: high\n",
        "status: Backlog\n",
        "version: 3\n",
        "depends_on:\n",
        "- task-000\n",
        "labels:\n",
        "- codec\n",
        "- storage\n",
        "---\n",
        "# Ship the codec\n",
        "\n",
        "Free text before any section.\n",
        "\n",
        "## Acceptance\n",
        "\n",
        "- decodes\n",
        "- encodes\n",
        "\n",
        "## Notes\n",
        "\n",
        "Later.\n",
    )
}

fn key_position(text: &str, key: &str) -> eyre::Result<usize> {
    let prefix = format!("{key}:");
    text.lines()
        .position(|line| line.starts_with(&prefix))
        .ok_or_else(|| eyre::eyre!("key {key} missing from:\n{text}"))
}

#[rstest]
fn decode_reads_typed_fields_and_document(sample: &str) -> eyre::Result<()> {
    let record = decode(sample, None)?;

    ensure!(record.id().as_str() == "task-001");
    ensure!(record.status().map(|s| s.as_str()) == Some("Backlog"));
    ensure!(record.version() == Version::new(3)?);
    ensure!(record.depends_on().len() == 1);
    ensure!(record.field("priority") == Some(&Value::String("high".to_owned())));
    ensure!(record.field("status").is_none(), "typed keys stay out of the side-map");

    let document = record.document();
    ensure!(document.title.as_deref() == Some("Ship the codec"));
    ensure!(document.preamble.as_deref() == Some("Free text before any section."));
    ensure!(document.sections.headings().collect::<Vec<_>>() == ["Acceptance", "Notes"]);
    ensure!(document.sections.get("Acceptance") == Some("- decodes\n- encodes"));
    Ok(())
}

#[rstest]
fn reencoding_preserves_fields_sections_and_key_order(sample: &str) -> eyre::Result<()> {
    let first = decode(sample, None)?;
    let text = encode(&first)?;
    let second = decode(&text, None)?;

    ensure!(second.id() == first.id());
    ensure!(second.version() == first.version());
    ensure!(second.status() == first.status());
    ensure!(second.depends_on() == first.depends_on());
    ensure!(second.extra_fields() == first.extra_fields());
    ensure!(second.document() == first.document());

    ensure!(key_position(&text, "id")? < key_position(&text, "priority")?);
    ensure!(key_position(&text, "priority")? < key_position(&text, "status")?);
    ensure!(key_position(&text, "status")? < key_position(&text, "version")?);
    ensure!(key_position(&text, "version")? < key_position(&text, "labels")?);
    Ok(())
}

#[rstest]
fn encode_appends_new_fields_after_existing_ones(sample: &str) -> eyre::Result<()> {
    let mut record = decode(sample, None)?;
    record.set_field("reviewer", Value::String("bea".to_owned()))?;
    let text = encode(&record)?;

    ensure!(key_position(&text, "labels")? < key_position(&text, "reviewer")?);
    Ok(())
}

#[rstest]
fn removing_a_field_keeps_the_others_in_order(sample: &str) -> eyre::Result<()> {
    let mut record = decode(sample, None)?;
    let removed = record.remove_field("priority")?;
    ensure!(removed == Some(Value::String("high".to_owned())));

    let text = encode(&record)?;
    ensure!(!text.contains("priority:"));
    ensure!(key_position(&text, "id")? < key_position(&text, "status")?);
    Ok(())
}

#[rstest]
fn encode_collapses_blank_runs_and_ends_with_one_newline() -> eyre::Result<()> {
    let text = "# Title\n\nfirst\n\n\n\n\nsecond\n\n\n";
    let record = decode(text, Some(Utf8Path::new("tasks/task-004 - Title.md")))?;
    let out = encode(&record)?;

    ensure!(!out.contains("\n\n\n"), "unexpected blank run in:\n{out}");
    ensure!(out.ends_with("second\n"));
    ensure!(!out.ends_with("\n\n"));
    Ok(())
}

#[rstest]
fn filename_supplies_the_id_when_none_is_declared() -> eyre::Result<()> {
    let record = decode(
        "---\nstatus: Ready\n---\n# Named by file\n",
        Some(Utf8Path::new("tasks/task-003 - Named by file.md")),
    )?;
    ensure!(record.id().as_str() == "task-003");
    ensure!(record.version() == Version::INITIAL);
    Ok(())
}

#[rstest]
fn inline_metadata_is_read_when_no_block_exists() -> eyre::Result<()> {
    let record = decode("id: task-009\nstatus: Ready\n\n# Inline\n", None)?;
    ensure!(record.id().as_str() == "task-009");
    ensure!(record.status().map(|s| s.as_str()) == Some("Ready"));
    ensure!(record.document().title.as_deref() == Some("Inline"));
    Ok(())
}

#[rstest]
fn comma_separated_dependencies_are_split_and_deduplicated() -> eyre::Result<()> {
    let record = decode(
        "---\nid: task-010\ndepends_on: task-001, task-002 ,task-001\n---\n",
        None,
    )?;
    let ids: Vec<&str> = record.depends_on().iter().map(|id| id.as_str()).collect();
    ensure!(ids == ["task-001", "task-002"]);
    Ok(())
}

#[rstest]
fn headings_inside_code_fences_are_content() -> eyre::Result<()> {
    let text = "---\nid: task-011\n---\n## Notes\n\n```\n## not a heading\n```\n";
    let record = decode(text, None)?;
    let sections = &record.document().sections;
    ensure!(sections.len() == 1);
    ensure!(sections.get("Notes") == Some("```\n## not a heading\n```"));
    Ok(())
}

#[rstest]
fn repeated_headings_merge_into_the_first_section() -> eyre::Result<()> {
    let text = "---\nid: task-012\n---\n## Log\n\none\n\n## Other\n\nx\n\n## Log\n\ntwo\n";
    let record = decode(text, None)?;
    let sections = &record.document().sections;
    ensure!(sections.headings().collect::<Vec<_>>() == ["Log", "Other"]);
    ensure!(sections.get("Log") == Some("one\n\ntwo"));
    Ok(())
}

#[rstest]
fn plain_dates_are_accepted_for_updated() -> eyre::Result<()> {
    let record = decode("---\nid: task-013\nupdated: 2024-05-01\n---\n", None)?;
    let Some(updated) = record.updated_at() else {
        bail!("updated timestamp missing");
    };
    ensure!(updated.to_rfc3339() == "2024-05-01T00:00:00+00:00");
    Ok(())
}

#[rstest]
fn unreadable_updated_values_pass_through_until_the_next_write() -> eyre::Result<()> {
    let text = "---\nid: task-001\nversion: 1\nupdated: 2024-01-01 10:00:00\nowner: bob\n---\n# T\n";
    let mut record = decode(text, Some(Utf8Path::new("task-001 - T.md")))?;
    ensure!(record.updated_at().is_none());
    ensure!(record.field("updated") == Some(&Value::from("2024-01-01 10:00:00")));
    ensure!(record.field("owner") == Some(&Value::from("bob")));

    let untouched = encode(&record)?;
    let position = |key: &str| untouched.find(key);
    ensure!(untouched.contains("2024-01-01 10:00:00"));
    ensure!(position("version:") < position("updated:"));
    ensure!(position("updated:") < position("owner:"));

    record.advance_version(&DefaultClock)?;
    let stamped = decode(&encode(&record)?, None)?;
    ensure!(stamped.updated_at().is_some());
    ensure!(stamped.field("updated").is_none());
    ensure!(stamped.version() == Version::new(2)?);
    Ok(())
}

#[rstest]
#[case::unterminated("---\nid: task-001\n")]
#[case::not_a_mapping("---\n- a\n- b\n---\n")]
#[case::zero_version("---\nid: task-001\nversion: 0\n---\n")]
#[case::text_version("---\nid: task-001\nversion: three\n---\n")]
#[case::bad_id("---\nid: a/b\n---\n")]
#[case::no_id("# Orphan\n")]
fn malformed_records_are_parse_errors(#[case] text: &str) -> eyre::Result<()> {
    match decode(text, None) {
        Err(err @ CodecError::Parse { .. }) => {
            ensure!(err.code() == ErrorCode::ParseError);
            Ok(())
        }
        other => bail!("expected parse error, got {other:?}"),
    }
}

#[rstest]
fn declared_id_must_match_the_filename() -> eyre::Result<()> {
    let result = decode(
        "---\nid: task-002\n---\n",
        Some(Utf8Path::new("tasks/task-001 - Mismatch.md")),
    );
    match result {
        Err(CodecError::IdMismatch {
            filename_id,
            declared_id,
            ..
        }) => {
            ensure!(filename_id == "task-001");
            ensure!(declared_id == "task-002");
            Ok(())
        }
        other => bail!("expected id mismatch, got {other:?}"),
    }
}

#[rstest]
#[case("task-001 - Ship it.md", Some("task-001"))]
#[case("task-001.md", Some("task-001"))]
#[case("ABC-7 - A - B.md", Some("ABC-7"))]
#[case("notes.txt", None)]
#[case("task-001 - Ship it.md.lock", None)]
fn ids_come_from_the_filename_prefix(#[case] name: &str, #[case] expected: Option<&str>) {
    assert_eq!(id_from_file_name(name), expected);
    assert_eq!(is_record_file_name(name), expected.is_some());
}

#[rstest]
fn file_names_drop_unsafe_title_characters() -> eyre::Result<()> {
    let id = crate::task::domain::TaskId::new("task-020")?;
    ensure!(file_name_for(&id, Some("Fix a/b: now?")) == "task-020 - Fix ab now.md");
    ensure!(file_name_for(&id, None) == "task-020.md");
    Ok(())
}
