//! The findings of one validation.

use crate::path::Path;
use serde::Serialize;
use std::fmt;

/// Contains a single problem with a document when validated against a schema.
///
/// Note that, despite being an entry of an "error" report, `ErrorEntry` is
/// not an error in the usual Rust sense. It is an ordinary struct describing
/// where a document was unsatisfactory and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    path: Path,
    message: String,
}

impl ErrorEntry {
    pub fn new(path: Path, message: String) -> ErrorEntry {
        ErrorEntry { path, message }
    }

    /// Where in the document the problem is.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.path, self.message)
    }
}

/// An ordered list of [`ErrorEntry`](struct.ErrorEntry.html)s.
///
/// Entries appear depth-first: fields in declaration order at each level,
/// list elements in index order. Entries are never deduplicated; a value that
/// breaks three rules has three entries at the same path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    entries: Vec<ErrorEntry>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, path: &Path, message: String) {
        self.entries.push(ErrorEntry::new(path.clone(), message));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Each entry rendered as `"<path> <message>"`.
    pub fn formatted_messages(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ErrorReport {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::Segment;
    use serde_json::json;

    #[test]
    fn formats_and_keeps_duplicates() {
        let path = Path::root().join(Segment::Key("a".to_owned()));
        let mut report = ErrorReport::new();
        assert!(report.is_empty());

        report.push(&path, "can't be blank".to_owned());
        report.push(&path, "must not be empty".to_owned());
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.formatted_messages(),
            vec!["/a can't be blank", "/a must not be empty"]
        );
    }

    #[test]
    fn serializes() {
        let mut report = ErrorReport::new();
        report.push(
            &Path::root()
                .join(Segment::Key("a".to_owned()))
                .join(Segment::Index(1)),
            "is invalid".to_owned(),
        );
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!([{ "path": "/a[1]", "message": "is invalid" }])
        );
    }
}
