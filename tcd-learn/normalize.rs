use tcd_core::FeatureVector;

/// Z-score a single sample in place over its own elements.
///
/// Mean and population standard deviation are computed from this vector
/// alone; a constant vector normalizes to all zeros rather than dividing by
/// zero.
pub fn zscore(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();
    if stddev == 0.0 {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    for v in values.iter_mut() {
        *v = ((*v as f64 - mean) / stddev) as f32;
    }
}

/// Z-scored copy of a sample.
pub fn zscored(values: &[f32]) -> FeatureVector {
    let mut out = values.to_vec();
    zscore(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_vector_has_zero_mean_unit_variance() {
        let mut values = vec![2.0f32, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        zscore(&mut values);

        let mean: f32 = values.iter().sum::<f32>() / values.len() as f32;
        let variance: f32 =
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32;
        assert!(mean.abs() < 1e-6);
        assert!((variance - 1.0).abs() < 1e-5);
        // population stddev of the input is exactly 2
        assert!((values[0] - (-2.0)).abs() < 1e-6);
    }

    #[test]
    fn constant_vector_becomes_all_zeros() {
        let mut values = vec![7.5f32; 16];
        zscore(&mut values);
        assert!(values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_vector_is_a_no_op() {
        let mut values: Vec<f32> = Vec::new();
        zscore(&mut values);
        assert!(values.is_empty());
    }

    #[test]
    fn zscored_leaves_input_untouched() {
        let values = vec![1.0f32, 2.0, 3.0];
        let normalized = zscored(&values);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(normalized[0] < 0.0 && normalized[2] > 0.0);
        assert!(normalized[1].abs() < 1e-6);
    }
}
