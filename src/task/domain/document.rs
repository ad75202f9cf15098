//! Markdown body of a task record: title, preamble, and ordered sections.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};

/// A named H2 section and its body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    heading: String,
    body: String,
}

impl Section {
    /// Returns the exact heading text.
    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Returns the section body without surrounding blank lines.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Sections in document order, addressed by exact heading text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sections(Vec<Section>);

impl Sections {
    /// Creates an empty section list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the body of the section with `heading`, if present.
    #[must_use]
    pub fn get(&self, heading: &str) -> Option<&str> {
        self.position(heading)
            .and_then(|index| self.0.get(index))
            .map(Section::body)
    }

    /// Returns whether a section with `heading` exists.
    #[must_use]
    pub fn contains(&self, heading: &str) -> bool {
        self.position(heading).is_some()
    }

    /// Returns headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Section::heading)
    }

    /// Iterates sections in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.0.iter()
    }

    /// Returns the number of sections.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no sections.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replaces the body of `heading`, keeping its position, or appends a new
    /// section at the end.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidSectionHeading`] when the heading is
    /// blank, padded with whitespace, or spans several lines, and
    /// [`TaskDomainError::InvalidSectionBody`] when the body would not read
    /// back as a single section.
    pub fn upsert(
        &mut self,
        heading: impl Into<String>,
        body: &str,
    ) -> Result<(), TaskDomainError> {
        let validated = validate_heading(heading.into())?;
        let normalized = normalize_body(body);
        check_body(&validated, &normalized)?;
        match self.position(&validated) {
            Some(index) => {
                if let Some(section) = self.0.get_mut(index) {
                    section.body = normalized;
                }
            }
            None => self.0.push(Section {
                heading: validated,
                body: normalized,
            }),
        }
        Ok(())
    }

    /// Appends `text` to the body of `heading`, separated by a blank line,
    /// creating the section when absent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidSectionHeading`] when the heading is
    /// blank, padded with whitespace, or spans several lines, and
    /// [`TaskDomainError::InvalidSectionBody`] when the combined body would
    /// not read back as a single section.
    pub fn append(
        &mut self,
        heading: impl Into<String>,
        text: &str,
    ) -> Result<(), TaskDomainError> {
        let validated = validate_heading(heading.into())?;
        let combined = joined(self.get(&validated).unwrap_or_default(), normalize_body(text));
        check_body(&validated, &combined)?;
        self.store(validated, combined);
        Ok(())
    }

    /// Adds a parsed section, merging bodies when the heading repeats.
    pub(crate) fn merge(&mut self, heading: String, text: &str) {
        let combined = joined(self.get(&heading).unwrap_or_default(), normalize_body(text));
        self.store(heading, combined);
    }

    fn store(&mut self, heading: String, body: String) {
        match self.position(&heading).and_then(|index| self.0.get_mut(index)) {
            Some(section) => section.body = body,
            None => self.0.push(Section { heading, body }),
        }
    }

    fn position(&self, heading: &str) -> Option<usize> {
        self.0.iter().position(|section| section.heading == heading)
    }
}

impl<'a> IntoIterator for &'a Sections {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Markdown content of a task record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    /// Text of the first H1 heading, if any.
    pub title: Option<String>,
    /// Free text between the title and the first section.
    pub preamble: Option<String>,
    /// Named H2 sections in document order.
    pub sections: Sections,
}

fn validate_heading(heading: String) -> Result<String, TaskDomainError> {
    let trimmed = heading.trim();
    if trimmed.is_empty() || trimmed.len() != heading.len() || trimmed.contains(['\n', '\r']) {
        return Err(TaskDomainError::InvalidSectionHeading(heading));
    }
    Ok(heading)
}

fn joined(existing: &str, addition: String) -> String {
    match (existing.is_empty(), addition.is_empty()) {
        (true, _) => addition,
        (false, true) => existing.to_owned(),
        (false, false) => format!("{existing}\n\n{addition}"),
    }
}

/// Rejects bodies that a reader would split into further sections: an
/// unfenced `## ` line, or a code fence left open at the end.
fn check_body(heading: &str, body: &str) -> Result<(), TaskDomainError> {
    let invalid = |reason: &str| TaskDomainError::InvalidSectionBody {
        heading: heading.to_owned(),
        reason: reason.to_owned(),
    };
    let mut in_fence = false;
    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && section_heading(line).is_some() {
            return Err(invalid("contains an unfenced '## ' heading line"));
        }
    }
    if in_fence {
        return Err(invalid("leaves a code fence open"));
    }
    Ok(())
}

/// Returns the heading text when `line` opens an H2 section.
pub(crate) fn section_heading(line: &str) -> Option<&str> {
    line.strip_prefix("## ")
        .map(str::trim_end)
        .filter(|text| !text.trim().is_empty())
}

/// Returns whether `line` opens or closes a fenced code block.
pub(crate) fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Drops leading and trailing blank lines and normalizes line endings.
pub(crate) fn normalize_body(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    match (first, last) {
        (Some(start), Some(end)) => lines
            .get(start..=end)
            .map(|kept| kept.join("\n"))
            .unwrap_or_default(),
        _ => String::new(),
    }
}
