use std::{fs, path::Path};

use crate::error::ClassifierError;

/// Class names indexed by model output position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::EmptyLabels);
        }
        Ok(Self { labels })
    }

    /// One label per line; surrounding whitespace and blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, ClassifierError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_skips_blank_lines() {
        let t = LabelTable::parse("1\n 2 \n\noutpost\r\nnegative\n").unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.get(1), Some("2"));
        assert_eq!(t.get(2), Some("outpost"));
        assert_eq!(t.get(4), None);
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(
            LabelTable::parse("\n\n"),
            Err(ClassifierError::EmptyLabels)
        ));
    }

    #[test]
    fn load_reads_from_disk_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\n2\n3").unwrap();
        assert_eq!(LabelTable::load(file.path()).unwrap().len(), 3);

        let dir = tempfile::tempdir().unwrap();
        let err = LabelTable::load(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
    }
}
