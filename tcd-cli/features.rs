use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use tcd_core::{FeatureVector, Histogram};
use tcd_learn::zscore;

use crate::splits::SampleSet;
use crate::{TcdError, TcdResult};

/// Feature file name for one (kernel size, bit depth) combination.
pub fn feature_filename(base: &str, kernel_size: usize, bit_depth: usize) -> String {
    format!("{}_filter_{}_{}_{}.csv", base, kernel_size, kernel_size, bit_depth)
}

/// Write one CSV record per image: `filename,bin_1,..,bin_{2^bits}`.
///
/// Bin 0 is reserved and never written; codes start at 1.
pub fn write_features(path: &Path, rows: &[(String, Histogram)]) -> TcdResult<()> {
    let file = std::fs::File::create(path)?;
    let mut out = std::io::BufWriter::new(file);
    for (name, histogram) in rows {
        write!(out, "{}", name)?;
        for bin in &histogram[1..] {
            write!(out, ",{}", bin)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Load features for every sample of a split, z-scored per sample.
///
/// Rows are returned in split order; a sample without a stored record is an
/// error, as is a record of the wrong width.
pub fn load_features(
    path: &Path,
    set: &SampleSet,
    bit_depth: usize,
) -> TcdResult<Vec<FeatureVector>> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|_| TcdError::FeatureFileNotFound { path: display.clone() })?;
    let expected_bins = 1usize << bit_depth;

    let mut by_name: HashMap<&str, FeatureVector> = HashMap::new();
    for (number, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(',');
        let name = fields.next().unwrap_or_default();
        let values: Result<FeatureVector, _> =
            fields.map(|field| field.trim().parse::<f32>()).collect();
        let values = values.map_err(|_| TcdError::Parse {
            path: display.clone(),
            line: number + 1,
            reason: "non-numeric histogram bin".to_string(),
        })?;
        if values.len() != expected_bins {
            return Err(TcdError::Parse {
                path: display.clone(),
                line: number + 1,
                reason: format!("expected {} bins, found {}", expected_bins, values.len()),
            });
        }
        by_name.insert(name, values);
    }

    let mut out = Vec::with_capacity(set.len());
    for record in set.records() {
        match by_name.get(record.filename.as_str()) {
            Some(values) => {
                let mut sample = values.clone();
                zscore(&mut sample);
                out.push(sample);
            }
            None => {
                return Err(TcdError::MissingFeatures {
                    file: display.clone(),
                    name: record.filename.clone(),
                });
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splits::SampleSet;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tcd-feat-{}-{}", std::process::id(), name))
    }

    fn sample_set(content: &str, tag: &str) -> SampleSet {
        let path = temp_path(&format!("split-{}", tag));
        std::fs::write(&path, content).unwrap();
        let set = SampleSet::load(&path, true).unwrap();
        std::fs::remove_file(path).ok();
        set
    }

    #[test]
    fn filenames_are_deterministic() {
        assert_eq!(feature_filename("features", 9, 8), "features_filter_9_9_8.csv");
        assert_eq!(feature_filename("run2", 3, 12), "run2_filter_3_3_12.csv");
    }

    #[test]
    fn round_trip_returns_zscored_rows_in_split_order() {
        let bits = 5;
        let mut hist_a = vec![0u32; (1 << bits) + 1];
        hist_a[1] = 81;
        let mut hist_b = vec![0u32; (1 << bits) + 1];
        hist_b[3] = 40;
        hist_b[17] = 41;

        let path = temp_path("roundtrip.csv");
        write_features(&path, &[("a.png".to_string(), hist_a), ("b.png".to_string(), hist_b)])
            .unwrap();

        let set = sample_set("b.png,1\na.png,0\n", "roundtrip");
        let features = load_features(&path, &set, bits).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].len(), 1 << bits);
        // rows come back in split order: b.png first
        assert!(features[0][2] > 0.0 && features[0][16] > 0.0);
        assert!(features[1][0] > 0.0);
        // z-scored rows sum to ~0
        for row in &features {
            let sum: f32 = row.iter().sum();
            assert!(sum.abs() < 1e-3);
        }
    }

    #[test]
    fn missing_sample_is_an_error() {
        let bits = 5;
        let mut hist = vec![0u32; (1 << bits) + 1];
        hist[1] = 9;
        let path = temp_path("missing.csv");
        write_features(&path, &[("a.png".to_string(), hist)]).unwrap();

        let set = sample_set("a.png,0\nz.png,1\n", "missing");
        let err = load_features(&path, &set, bits).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, TcdError::MissingFeatures { .. }));
    }

    #[test]
    fn wrong_width_is_rejected() {
        let path = temp_path("width.csv");
        std::fs::write(&path, "a.png,1,2,3\n").unwrap();
        let set = sample_set("a.png,0\n", "width");
        let err = load_features(&path, &set, 5).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, TcdError::Parse { .. }));
    }

    #[test]
    fn missing_feature_file_is_reported() {
        let set = sample_set("a.png,0\n", "nofile");
        let err = load_features(Path::new("/nonexistent/f.csv"), &set, 5).unwrap_err();
        assert!(matches!(err, TcdError::FeatureFileNotFound { .. }));
    }
}
