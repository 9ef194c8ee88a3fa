use crate::workflows::scoring::config::FinancialConfig;
use crate::workflows::scoring::domain::{CleanedLead, DataAvailability, Factor, FactorScore};

/// Mean of whichever of revenue, growth and margin are present.
pub fn score_financials(lead: &CleanedLead, config: &FinancialConfig) -> FactorScore {
    let mut parts = Vec::with_capacity(3);
    let mut details = Vec::with_capacity(3);

    if let Some(revenue) = lead.revenue {
        let score = config.revenue.score(revenue);
        parts.push(("revenue", score));
        details.push(format!("Revenue {} scored {score:.0}", format_money(revenue)));
    }
    if let Some(growth) = lead.growth_rate {
        let score = config.growth.score(growth);
        parts.push(("growth", score));
        details.push(format!("Growth rate {growth:.1}% scored {score:.0}"));
    }
    if let Some(margin) = lead.profit_margin {
        let score = config.margin.score(margin);
        parts.push(("margin", score));
        details.push(format!("Profit margin {margin:.1}% scored {score:.0}"));
    }

    if parts.is_empty() {
        return FactorScore::new(Factor::Financial, config.missing_score, DataAvailability::Absent)
            .with_evidence("No financial data (revenue, growth, margin)");
    }

    let mean = parts.iter().map(|(_, score)| score).sum::<f64>() / parts.len() as f64;
    let availability = if parts.len() == 3 {
        DataAvailability::Present
    } else {
        DataAvailability::Partial
    };
    let basis = parts
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");
    let strength = if mean >= 80.0 {
        "Strong"
    } else if mean >= 60.0 {
        "Solid"
    } else {
        "Modest"
    };

    let mut result = FactorScore::new(Factor::Financial, mean, availability)
        .with_evidence(format!("{strength} financial profile (based on {basis})"));
    result.evidence.extend(details);
    result
}

pub(crate) fn format_money(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        format!("${value:.0}")
    }
}
