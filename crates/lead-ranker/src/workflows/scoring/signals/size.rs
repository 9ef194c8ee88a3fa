use crate::workflows::scoring::config::CompanySizeConfig;
use crate::workflows::scoring::domain::{CleanedLead, DataAvailability, Factor, FactorScore};

/// Scores headcount against the ideal band on a log2 scale. Inside the band the score falls
/// linearly from the peak at the geometric midpoint to the edge score at either limit; outside
/// it tapers per doubling of distance down to the floor.
pub fn score_company_size(lead: &CleanedLead, config: &CompanySizeConfig) -> FactorScore {
    let Some(count) = lead.employee_count else {
        return FactorScore::new(
            Factor::CompanySize,
            config.missing_score,
            DataAvailability::Absent,
        )
        .with_evidence("Employee count unavailable; size scored conservatively");
    };

    let low = f64::from(config.ideal_min.max(1)).log2();
    let high = f64::from(config.ideal_max.max(1)).log2();
    let position = f64::from(count.max(1)).log2();

    let (score, note) = if position < low {
        let doublings = low - position;
        (
            (config.edge_score - config.taper_per_doubling * doublings).max(config.floor_score),
            format!(
                "Small company ({count} employees, below ideal {}-{})",
                config.ideal_min, config.ideal_max
            ),
        )
    } else if position > high {
        let doublings = position - high;
        (
            (config.edge_score - config.taper_per_doubling * doublings).max(config.floor_score),
            format!(
                "Large company ({count} employees, above ideal {}-{})",
                config.ideal_min, config.ideal_max
            ),
        )
    } else {
        let midpoint = (low + high) / 2.0;
        let half_width = (high - low) / 2.0;
        let offset = if half_width > 0.0 {
            (position - midpoint).abs() / half_width
        } else {
            0.0
        };
        (
            config.peak_score - (config.peak_score - config.edge_score) * offset,
            format!(
                "Optimal company size ({count} employees within {}-{})",
                config.ideal_min, config.ideal_max
            ),
        )
    };

    FactorScore::new(Factor::CompanySize, score, DataAvailability::Present).with_evidence(note)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_count(count: Option<u32>) -> CleanedLead {
        let mut lead = CleanedLead::empty(1);
        lead.employee_count = count;
        lead
    }

    fn score(count: u32) -> f64 {
        score_company_size(&with_count(Some(count)), &CompanySizeConfig::default()).score
    }

    #[test]
    fn band_edges_score_edge_value() {
        assert!((score(50) - 85.0).abs() < 1e-9);
        assert!((score(300) - 85.0).abs() < 1e-9);
    }

    #[test]
    fn geometric_midpoint_scores_peak() {
        let midpoint = (50.0_f64 * 300.0).sqrt().round() as u32;
        assert!((score(midpoint) - 95.0).abs() < 0.1);
        assert!(score(midpoint) > score(60));
        assert!(score(midpoint) > score(250));
    }

    #[test]
    fn tapers_per_doubling_outside_band() {
        assert!((score(25) - 73.0).abs() < 1e-9);
        assert!((score(600) - 73.0).abs() < 1e-9);
        assert_eq!(score(1), 20.0);
        assert_eq!(score(1_000_000), 20.0);
    }

    #[test]
    fn score_is_monotonic_towards_the_band() {
        let below: Vec<f64> = [2, 5, 10, 20, 40, 50].into_iter().map(score).collect();
        assert!(below.windows(2).all(|pair| pair[0] <= pair[1]));

        let above: Vec<f64> = [300, 500, 1000, 5000, 20000].into_iter().map(score).collect();
        assert!(above.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn missing_count_uses_fallback() {
        let result = score_company_size(&with_count(None), &CompanySizeConfig::default());

        assert_eq!(result.score, 30.0);
        assert_eq!(result.availability, DataAvailability::Absent);
        assert!(result.headline().is_some_and(|note| note.contains("unavailable")));
    }
}
