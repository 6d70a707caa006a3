use std::path::Path;

use tcd_core::Label;

use crate::{TcdError, TcdResult};

/// One image of a persisted split: filename plus its class label
/// (0 = clear, 1 = textured).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub filename: String,
    pub label: Label,
}

/// An ordered, immutable collection of samples read from a line-oriented
/// `filename,label` split file.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    records: Vec<SampleRecord>,
}

impl SampleSet {
    /// Load a split file. With `require_labels` false a bare filename line
    /// is accepted and labelled 0, matching test lists without ground truth.
    pub fn load<P: AsRef<Path>>(path: P, require_labels: bool) -> TcdResult<Self> {
        let display = path.as_ref().display().to_string();
        let content = std::fs::read_to_string(&path)
            .map_err(|_| TcdError::SplitNotFound { path: display.clone() })?;

        let mut records = Vec::new();
        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(',') {
                Some((name, label)) => {
                    let label: Label = label.trim().parse().map_err(|_| TcdError::Parse {
                        path: display.clone(),
                        line: number + 1,
                        reason: format!("class label \"{}\" is not an integer", label.trim()),
                    })?;
                    records.push(SampleRecord { filename: name.trim().to_string(), label });
                }
                None if require_labels => {
                    return Err(TcdError::Parse {
                        path: display.clone(),
                        line: number + 1,
                        reason: "expected filename,label".to_string(),
                    });
                }
                None => {
                    records.push(SampleRecord { filename: line.to_string(), label: 0 });
                }
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn filenames(&self) -> Vec<String> {
        self.records.iter().map(|r| r.filename.clone()).collect()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("tcd-split-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_filename_label_records_in_order() {
        let path = temp_file("ok.csv", "a.png,0\nb.png,1\n\nc.png, 1\n");
        let set = SampleSet::load(&path, true).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.filenames(), vec!["a.png", "b.png", "c.png"]);
        assert_eq!(set.labels(), vec![0, 1, 1]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn bare_filenames_allowed_without_ground_truth() {
        let path = temp_file("bare.csv", "a.png\nb.png\n");
        let set = SampleSet::load(&path, false).unwrap();
        assert_eq!(set.labels(), vec![0, 0]);

        let err = SampleSet::load(&path, true).unwrap_err();
        assert!(matches!(err, TcdError::Parse { line: 1, .. }));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn bad_label_reports_the_offending_line() {
        let path = temp_file("bad.csv", "a.png,0\nb.png,maybe\n");
        let err = SampleSet::load(&path, true).unwrap_err();
        assert!(matches!(err, TcdError::Parse { line: 2, .. }));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_split_is_its_own_error() {
        let err = SampleSet::load("/nonexistent/split.csv", true).unwrap_err();
        assert!(matches!(err, TcdError::SplitNotFound { .. }));
    }
}
