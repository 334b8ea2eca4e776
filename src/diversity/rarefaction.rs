use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::abundance::{AbundanceData, SampleSet};
use crate::core::types::SampleId;
use crate::diversity::alpha::chao1;
use crate::matching::scoring::count_to_f64;
use crate::utils::validation::{validate_positive, ValidationError, MAX_READS_PER_SAMPLE};

/// Default number of depths sampled along a curve
pub const DEFAULT_STEPS: usize = 20;

/// Default number of random subsamples per depth
pub const DEFAULT_ITERATIONS: usize = 10;

/// Points needed before saturation can be judged
const SATURATION_MIN_POINTS: usize = 4;

/// Trailing points that must each stay within one species of their predecessor
const SATURATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarefactionConfig {
    pub steps: usize,
    pub iterations: usize,
}

impl Default for RarefactionConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl RarefactionConfig {
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if `steps` or `iterations` is 0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_positive("steps", self.steps)?;
        validate_positive("iterations", self.iterations)?;
        Ok(())
    }
}

/// Expected richness at one subsampling depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarefactionPoint {
    pub depth: usize,

    /// Mean observed species over the iterations, rounded to 2 decimals
    pub mean_richness: f64,

    /// Standard error of the mean
    pub std_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarefactionCurve {
    pub sample_id: SampleId,
    pub points: Vec<RarefactionPoint>,

    /// Chao1 on the full sample
    pub estimated_richness: f64,

    pub saturation_reached: bool,
}

/// Bootstrap a rarefaction curve for one sample.
///
/// Each read becomes a token in a pool. At every depth the pool is partially
/// shuffled (Fisher-Yates) and the distinct species among the first `depth`
/// tokens are counted. A sample without reads yields an empty curve.
///
/// # Errors
///
/// Returns a `ValidationError` if the configuration is out of range, or
/// `ValidationError::TooManyReads` when the sample holds more than
/// [`MAX_READS_PER_SAMPLE`] reads.
pub fn rarefaction_curve<R: Rng + ?Sized>(
    sample_id: &str,
    abundance: &AbundanceData,
    config: &RarefactionConfig,
    rng: &mut R,
) -> Result<RarefactionCurve, ValidationError> {
    config.validate()?;

    // One pool token per read
    let reads = abundance.total_reads();
    if reads > MAX_READS_PER_SAMPLE {
        return Err(ValidationError::TooManyReads {
            sample: sample_id.to_string(),
            total: reads,
        });
    }

    let species: Vec<u64> = abundance.observed().map(|(_, count)| count).collect();
    let mut pool: Vec<usize> = species
        .iter()
        .enumerate()
        .flat_map(|(index, &count)| (0..count).map(move |_| index))
        .collect();

    let total = pool.len();
    let mut points = Vec::new();
    if total > 0 {
        let step = (total / config.steps).max(1);
        let mut seen = vec![false; species.len()];
        let mut richness = Vec::with_capacity(config.iterations);

        for depth in (step..=total).step_by(step) {
            richness.clear();
            for _ in 0..config.iterations {
                let (subsample, _) = pool.partial_shuffle(rng, depth);
                seen.fill(false);
                let mut distinct = 0usize;
                for &index in subsample.iter() {
                    if !seen[index] {
                        seen[index] = true;
                        distinct += 1;
                    }
                }
                richness.push(count_to_f64(distinct));
            }
            points.push(summarize(depth, &richness));
        }
    }

    let saturation_reached = is_saturated(&points);
    Ok(RarefactionCurve {
        sample_id: sample_id.to_string(),
        points,
        estimated_richness: chao1(abundance),
        saturation_reached,
    })
}

/// Rarefaction curves for every sample, ordered by sample id
///
/// # Errors
///
/// Returns a `ValidationError` if the configuration is out of range.
pub fn rarefaction_curves<R: Rng + ?Sized>(
    samples: &SampleSet,
    config: &RarefactionConfig,
    rng: &mut R,
) -> Result<Vec<RarefactionCurve>, ValidationError> {
    samples
        .iter()
        .map(|(sample_id, abundance)| rarefaction_curve(sample_id, abundance, config, &mut *rng))
        .collect()
}

/// Mean (rounded to 2 decimals) and standard error from the population variance
fn summarize(depth: usize, richness: &[f64]) -> RarefactionPoint {
    let n = count_to_f64(richness.len());
    let mean = richness.iter().sum::<f64>() / n;
    let variance = richness.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    RarefactionPoint {
        depth,
        mean_richness: (mean * 100.0).round() / 100.0,
        std_error: (variance / n).sqrt(),
    }
}

/// Whether the tail of a curve has flattened out.
///
/// Each of the last three points must lie within one species (inclusive) of
/// the point before it. Three comparisons need a predecessor for the first of
/// them, so curves with fewer than four points are never saturated.
#[must_use]
pub fn is_saturated(points: &[RarefactionPoint]) -> bool {
    if points.len() < SATURATION_MIN_POINTS {
        return false;
    }
    points[points.len() - SATURATION_WINDOW - 1..]
        .windows(2)
        .all(|pair| (pair[1].mean_richness - pair[0].mean_richness).abs() <= 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn point(depth: usize, mean_richness: f64) -> RarefactionPoint {
        RarefactionPoint {
            depth,
            mean_richness,
            std_error: 0.0,
        }
    }

    #[test]
    fn test_empty_sample_gives_empty_curve() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let curve = rarefaction_curve(
            "S1",
            &AbundanceData::new(),
            &RarefactionConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert!(curve.points.is_empty());
        assert!(!curve.saturation_reached);
        assert_eq!(curve.estimated_richness, 0.0);
    }

    #[test]
    fn test_depths_follow_step_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let data: AbundanceData = [("a", 30), ("b", 12), ("c", 3)].into_iter().collect();
        let config = RarefactionConfig {
            steps: 4,
            iterations: 5,
        };
        let curve = rarefaction_curve("S1", &data, &config, &mut rng).unwrap();

        // 45 reads, 4 steps: step 11, depths 11..=44
        let depths: Vec<usize> = curve.points.iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![11, 22, 33, 44]);
    }

    #[test]
    fn test_small_sample_uses_unit_step() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let data: AbundanceData = [("a", 2), ("b", 1)].into_iter().collect();
        let curve =
            rarefaction_curve("S1", &data, &RarefactionConfig::default(), &mut rng).unwrap();
        let depths: Vec<usize> = curve.points.iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
        assert_eq!(curve.points[0].mean_richness, 1.0);
        assert_eq!(curve.points[2].mean_richness, 2.0);
    }

    #[test]
    fn test_full_depth_equals_observed_richness() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let data: AbundanceData = (0..50).map(|i| (format!("sp{i}"), 2u64)).collect();
        let curve =
            rarefaction_curve("S1", &data, &RarefactionConfig::default(), &mut rng).unwrap();

        let last = curve.points.last().unwrap();
        assert_eq!(last.depth, 100);
        assert_eq!(last.mean_richness, 50.0);
        assert_eq!(last.std_error, 0.0);
        assert_eq!(curve.estimated_richness, 50.0);
    }

    #[test]
    fn test_mean_richness_grows_with_depth() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let data: AbundanceData = (0..50).map(|i| (format!("sp{i}"), 2u64)).collect();
        let config = RarefactionConfig {
            steps: 20,
            iterations: 200,
        };
        let curve = rarefaction_curve("S1", &data, &config, &mut rng).unwrap();

        assert_eq!(curve.points.len(), 20);
        for pair in curve.points.windows(2) {
            assert!(pair[1].mean_richness >= pair[0].mean_richness - 0.1);
        }
        assert!(curve.points[0].mean_richness <= 5.0);
    }

    #[test]
    fn test_singletons_never_saturate() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let data: AbundanceData = (0..100).map(|i| (format!("sp{i}"), 1u64)).collect();
        let curve =
            rarefaction_curve("S1", &data, &RarefactionConfig::default(), &mut rng).unwrap();

        // Every token is a distinct species: richness equals depth
        for p in &curve.points {
            assert_eq!(p.mean_richness, count_to_f64(p.depth));
        }
        assert!(!curve.saturation_reached);
    }

    #[test]
    fn test_single_species_saturates() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let data: AbundanceData = [("a", 1000)].into_iter().collect();
        let curve =
            rarefaction_curve("S1", &data, &RarefactionConfig::default(), &mut rng).unwrap();
        assert!(curve.points.iter().all(|p| p.mean_richness == 1.0));
        assert!(curve.saturation_reached);
    }

    #[test]
    fn test_is_saturated() {
        let flat = [point(1, 3.0), point(2, 8.0), point(3, 8.5), point(4, 9.0), point(5, 9.2)];
        assert!(is_saturated(&flat));

        let rising = [point(1, 3.0), point(2, 8.0), point(3, 8.5), point(4, 10.0)];
        assert!(!is_saturated(&rising));

        // Too few points to judge
        assert!(!is_saturated(&flat[..3]));
    }

    #[test]
    fn test_unit_steps_count_as_saturated() {
        let unit = [point(1, 5.0), point(2, 6.0), point(3, 7.0), point(4, 8.0)];
        assert!(is_saturated(&unit));

        let over = [point(1, 5.0), point(2, 6.0), point(3, 7.0), point(4, 8.01)];
        assert!(!is_saturated(&over));
    }

    #[test]
    fn test_three_point_curve_never_saturates() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let data: AbundanceData = [("a", 3)].into_iter().collect();
        let curve =
            rarefaction_curve("S1", &data, &RarefactionConfig::default(), &mut rng).unwrap();
        assert_eq!(curve.points.len(), 3);
        assert!(curve.points.iter().all(|p| p.mean_richness == 1.0));
        assert!(!curve.saturation_reached);
    }

    #[test]
    fn test_oversized_sample_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let data: AbundanceData = [("a", 100_000_000_000u64)].into_iter().collect();
        let result = rarefaction_curve("S1", &data, &RarefactionConfig::default(), &mut rng);
        assert_eq!(
            result,
            Err(ValidationError::TooManyReads {
                sample: "S1".to_string(),
                total: 100_000_000_000,
            })
        );
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let data: AbundanceData = [("a", 10)].into_iter().collect();
        let config = RarefactionConfig {
            steps: 0,
            iterations: 10,
        };
        assert!(rarefaction_curve("S1", &data, &config, &mut rng).is_err());
    }

    #[test]
    fn test_curves_for_sample_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let set: SampleSet = [
            ("S2", [("a", 10u64)].into_iter().collect::<AbundanceData>()),
            ("S1", AbundanceData::new()),
        ]
        .into_iter()
        .collect();
        let curves = rarefaction_curves(&set, &RarefactionConfig::default(), &mut rng).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].sample_id, "S1");
        assert!(curves[0].points.is_empty());
        assert_eq!(curves[1].points.len(), 10);
    }
}
