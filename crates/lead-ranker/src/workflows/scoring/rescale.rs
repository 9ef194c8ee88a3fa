use super::config::RescaleConfig;
use super::domain::{clamp_score, round1};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescaled {
    pub percentile: f64,
    pub final_score: f64,
}

/// Mid-rank percentile of every score within the batch: `100 * (below + 0.5 * equal) / n`.
/// Equal scores always share a percentile; a lone score sits at 50.
pub fn percentile_ranks(scores: &[f64]) -> Vec<f64> {
    let n = scores.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    scores
        .iter()
        .map(|score| {
            let below = sorted.partition_point(|other| other < score);
            let up_to = sorted.partition_point(|other| other <= score);
            let equal = up_to - below;
            100.0 * (below as f64 + 0.5 * equal as f64) / n as f64
        })
        .collect()
}

/// Blends each composite score with its batch percentile. Order of `scores` does not matter:
/// each output depends only on its own value and the multiset of values.
pub fn rescale(scores: &[f64], config: &RescaleConfig) -> Vec<Rescaled> {
    let weight = config.percentile_weight;
    percentile_ranks(scores)
        .into_iter()
        .zip(scores)
        .map(|(percentile, composite)| Rescaled {
            percentile: round1(percentile),
            final_score: round1(clamp_score(weight * percentile + (1.0 - weight) * composite)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::scoring::report::quartiles;

    #[test]
    fn single_score_sits_at_median() {
        assert_eq!(percentile_ranks(&[42.0]), vec![50.0]);
    }

    #[test]
    fn ties_share_a_percentile() {
        let ranks = percentile_ranks(&[10.0, 20.0, 20.0, 30.0]);

        assert_eq!(ranks, vec![12.5, 50.0, 50.0, 87.5]);
    }

    #[test]
    fn higher_composite_never_ranks_lower() {
        let scores = [55.0, 71.5, 12.0, 71.5, 90.0, 33.3];
        let rescaled = rescale(&scores, &RescaleConfig::default());

        for (i, a) in scores.iter().enumerate() {
            for (j, b) in scores.iter().enumerate() {
                if a > b {
                    assert!(rescaled[i].final_score >= rescaled[j].final_score);
                }
            }
        }
    }

    #[test]
    fn zero_weight_keeps_composite() {
        let config = RescaleConfig {
            percentile_weight: 0.0,
        };

        let rescaled = rescale(&[12.3, 88.8], &config);

        assert_eq!(rescaled[0].final_score, 12.3);
        assert_eq!(rescaled[1].final_score, 88.8);
    }

    #[test]
    fn clustered_scores_spread_out() {
        let scores: Vec<f64> = (0..10_000)
            .map(|i| 60.0 + ((i * 37) % 41) as f64 / 10.0 - 2.0)
            .collect();

        let finals: Vec<f64> = rescale(&scores, &RescaleConfig::default())
            .into_iter()
            .map(|item| item.final_score)
            .collect();

        let before = quartiles(&scores).expect("scores present");
        let after = quartiles(&finals).expect("scores present");
        assert!(after.iqr() > before.iqr() * 2.0);
    }
}
