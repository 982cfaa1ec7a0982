//! Scans a (size, ns/access) curve and emits boundaries where latency steps
//! up by a sustained ratio, interpreted as the working set overflowing a
//! cache level.
//!
//! Comparing each new sample against a running plateau mean (not just the
//! previous sample) suppresses gradual drift; a one-sample lookahead
//! confirmation prevents a single noisy point from triggering a false
//! boundary. Emitted boundaries are labeled L1..L4, L? in emission order —
//! this is purely cosmetic positional labeling, not a guarantee that the
//! first detected boundary really is L1 (e.g. if `min_bytes` already starts
//! above L1's capacity, the first boundary found is really L2).

use crate::measure::Sample;

const STEP_RATIO: f64 = 1.25;
const LOOKAHEAD_SLACK: f64 = 0.95;
const MIN_PLATEAU_POINTS: usize = 2;
const MAX_BOUNDARIES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub approx_size_bytes: u64,
    pub ratio: f64,
}

/// Detect boundaries in `samples`, which must be in ascending
/// `working_set_bytes` order.
pub fn detect(samples: &[Sample]) -> Vec<Boundary> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let mut boundaries = Vec::new();
    let mut plateau_sum = samples[0].ns_per_access;
    let mut plateau_count: usize = 1;

    let mut i = 1;
    while i < samples.len() {
        if boundaries.len() >= MAX_BOUNDARIES {
            break;
        }
        let plateau_avg = plateau_sum / plateau_count as f64;
        let ratio = samples[i].ns_per_access / plateau_avg;

        if ratio > STEP_RATIO && plateau_count >= MIN_PLATEAU_POINTS {
            let confirmed = match samples.get(i + 1) {
                Some(next) => (next.ns_per_access / plateau_avg) > STEP_RATIO * LOOKAHEAD_SLACK,
                None => true,
            };
            if confirmed {
                boundaries.push(Boundary {
                    approx_size_bytes: samples[i - 1].working_set_bytes,
                    ratio,
                });
                plateau_sum = samples[i].ns_per_access;
                plateau_count = 1;
                i += 1;
                continue;
            }
        }

        plateau_sum += samples[i].ns_per_access;
        plateau_count += 1;
        i += 1;
    }

    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(bytes: u64, ns: f64) -> Sample {
        Sample {
            working_set_bytes: bytes,
            ns_per_access: ns,
        }
    }

    #[test]
    fn synthetic_curve_matches_spec_example() {
        let samples = vec![
            sample(4 * 1024, 1.0),
            sample(8 * 1024, 1.0),
            sample(16 * 1024, 1.0),
            sample(32 * 1024, 1.0),
            sample(64 * 1024, 2.5),
            sample(128 * 1024, 2.6),
            sample(256 * 1024, 2.7),
            sample(1024 * 1024, 8.0),
            sample(4 * 1024 * 1024, 8.2),
        ];
        let boundaries = detect(&samples);
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].approx_size_bytes, 32 * 1024);
        assert!((boundaries[0].ratio - 2.5).abs() < 0.1);
        assert_eq!(boundaries[1].approx_size_bytes, 256 * 1024);
        assert!((boundaries[1].ratio - 3.0).abs() < 0.3);
    }

    #[test]
    fn flat_curve_yields_no_boundaries() {
        let samples: Vec<Sample> = (0..10).map(|i| sample(4096 * (i + 1), 1.0)).collect();
        assert!(detect(&samples).is_empty());
    }

    #[test]
    fn single_sustained_step_yields_one_boundary() {
        let samples = vec![
            sample(4096, 1.0),
            sample(8192, 1.0),
            sample(16384, 1.0),
            sample(32768, 2.0),
            sample(65536, 2.0),
        ];
        let boundaries = detect(&samples);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].approx_size_bytes, 16384);
    }

    #[test]
    fn scaling_transform_preserves_boundary_indices() {
        // Ratios are preserved only under pure multiplicative scaling, not
        // under an affine shift with nonzero intercept (adding a constant
        // changes sample[i].ns / plateau_avg unless all values share it).
        let base = vec![
            sample(4096, 1.0),
            sample(8192, 1.1),
            sample(16384, 1.0),
            sample(32768, 3.0),
            sample(65536, 3.1),
            sample(131072, 3.0),
        ];
        let scaled: Vec<Sample> = base
            .iter()
            .map(|s| sample(s.working_set_bytes, s.ns_per_access * 2.0))
            .collect();

        let base_boundaries = detect(&base);
        let scaled_boundaries = detect(&scaled);
        assert_eq!(base_boundaries.len(), scaled_boundaries.len());
        for (a, b) in base_boundaries.iter().zip(scaled_boundaries.iter()) {
            assert_eq!(a.approx_size_bytes, b.approx_size_bytes);
        }
    }
}
