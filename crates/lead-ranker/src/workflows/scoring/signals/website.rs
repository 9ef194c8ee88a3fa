use std::collections::BTreeSet;

use super::{capped_bonus, matched_terms};
use crate::workflows::scoring::config::WebsiteConfig;
use crate::workflows::scoring::domain::{CleanedLead, DataAvailability, Factor, FactorScore};

const IDEAL_NAME_LENGTH: std::ops::RangeInclusive<usize> = 4..=12;
const ACCEPTABLE_NAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=15;
const IDEAL_LENGTH_BONUS: f64 = 15.0;
const ACCEPTABLE_LENGTH_BONUS: f64 = 10.0;
const DIGIT_PENALTY: f64 = 5.0;
const HYPHEN_PENALTY: f64 = 3.0;
const ALPHABETIC_BONUS: f64 = 5.0;
const ALPHABETIC_MIN_LENGTH: usize = 5;
/// Registry labels that sit between a two-letter country code and the brand ("co.uk").
const SECOND_LEVEL_LABELS: &[&str] = &["co", "com", "org", "net", "ac", "gov", "edu"];

/// Judges digital presence from the domain alone; no network lookups.
pub fn score_website(lead: &CleanedLead, config: &WebsiteConfig) -> FactorScore {
    let (Some(domain), Some(tld)) = (lead.domain.as_deref(), lead.tld.as_deref()) else {
        let note = if lead.website.is_some() {
            "Website could not be parsed"
        } else {
            "No website provided"
        };
        return FactorScore::new(Factor::Website, config.missing_score, DataAvailability::Absent)
            .with_evidence(note);
    };

    let name = brand_label(domain);

    let mut score = config.base_score;
    let mut details = Vec::new();

    let tld_bonus = config.tld_bonus(tld);
    score += tld_bonus;
    details.push(format!(".{tld} domain (+{tld_bonus:.0})"));

    let length = name.chars().count();
    if IDEAL_NAME_LENGTH.contains(&length) {
        score += IDEAL_LENGTH_BONUS;
        details.push(format!("Memorable domain length ({length} characters)"));
    } else if ACCEPTABLE_NAME_LENGTH.contains(&length) {
        score += ACCEPTABLE_LENGTH_BONUS;
    }

    let mut keywords: BTreeSet<&str> = matched_terms(&name.replace('-', " "), &config.tech_keywords);
    keywords.extend(matched_terms(name, &config.tech_keywords));
    for text in [lead.company_key.as_deref(), lead.description_key.as_deref()]
        .into_iter()
        .flatten()
    {
        keywords.extend(matched_terms(text, &config.tech_keywords));
    }
    if !keywords.is_empty() {
        let bonus = capped_bonus(keywords.len(), config.keyword_bonus, config.keyword_cap);
        score += bonus;
        details.push(format!(
            "Tech keywords: {} (+{bonus:.0})",
            keywords.iter().copied().collect::<Vec<_>>().join(", ")
        ));
    }

    if name.chars().any(|c| c.is_ascii_digit()) {
        score -= DIGIT_PENALTY;
        details.push("Digits in domain name".to_string());
    }
    if name.contains('-') {
        score -= HYPHEN_PENALTY;
        details.push("Hyphenated domain name".to_string());
    }
    if length >= ALPHABETIC_MIN_LENGTH && name.chars().all(|c| c.is_ascii_alphabetic()) {
        score += ALPHABETIC_BONUS;
    }

    let strength = if score >= 70.0 {
        "Strong digital presence"
    } else if score >= 40.0 {
        "Moderate digital presence"
    } else {
        "Weak digital footprint"
    };

    let mut result = FactorScore::new(Factor::Website, score, DataAvailability::Present)
        .with_evidence(format!("{strength} ({domain})"));
    result.evidence.extend(details);
    result
}

/// The label left of the registrable suffix.
fn brand_label(domain: &str) -> &str {
    let labels: Vec<&str> = domain.split('.').collect();
    let mut suffix_start = labels.len().saturating_sub(1);
    let country_code = labels.last().is_some_and(|tld| tld.len() == 2);
    if country_code
        && suffix_start >= 2
        && SECOND_LEVEL_LABELS.contains(&labels[suffix_start - 1])
    {
        suffix_start -= 1;
    }
    suffix_start
        .checked_sub(1)
        .and_then(|index| labels.get(index))
        .copied()
        .unwrap_or(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::scoring::normalize::parse_website;

    fn lead_with(website: Option<&str>, company_key: Option<&str>) -> CleanedLead {
        let mut lead = CleanedLead::empty(1);
        lead.website = website.map(str::to_string);
        if let Some(parts) = website.and_then(parse_website) {
            lead.domain = Some(parts.domain);
            lead.tld = Some(parts.tld);
        }
        lead.company_key = company_key.map(str::to_string);
        lead
    }

    #[test]
    fn tech_domain_scores_high() {
        let result = score_website(
            &lead_with(Some("https://acmetech.io"), Some("acme tech")),
            &WebsiteConfig::default(),
        );

        assert_eq!(result.score, 90.0);
        assert_eq!(result.headline(), Some("Strong digital presence (acmetech.io)"));
    }

    #[test]
    fn digits_and_hyphens_are_penalized() {
        let clean = score_website(&lead_with(Some("northwind.net"), None), &WebsiteConfig::default());
        let noisy = score_website(&lead_with(Some("north-wind2.net"), None), &WebsiteConfig::default());

        assert_eq!(clean.score, 70.0);
        assert_eq!(noisy.score, 57.0);
    }

    #[test]
    fn keyword_bonus_is_capped() {
        let result = score_website(
            &lead_with(Some("clouddata.com"), Some("digital platform tech")),
            &WebsiteConfig::default(),
        );

        assert_eq!(result.score, 95.0);
    }

    #[test]
    fn country_second_level_domains_score_the_brand() {
        let config = WebsiteConfig::default();
        let plain = score_website(&lead_with(Some("acmesoft.uk"), None), &config);
        let registry = score_website(&lead_with(Some("www.acmesoft.co.uk"), None), &config);
        let australian = score_website(&lead_with(Some("acmesoft.com.au"), None), &config);

        assert_eq!(plain.score, 70.0);
        assert_eq!(registry.score, 70.0);
        assert_eq!(australian.score, 70.0);
        assert!(registry
            .evidence
            .iter()
            .any(|note| note == "Memorable domain length (8 characters)"));
        assert!(registry.evidence.iter().any(|note| note.starts_with("Tech keywords: soft")));
    }

    #[test]
    fn brand_label_skips_registry_labels() {
        assert_eq!(brand_label("acmesoft.co.uk"), "acmesoft");
        assert_eq!(brand_label("shop.acmesoft.com.au"), "acmesoft");
        assert_eq!(brand_label("app.acmetech.io"), "acmetech");
        assert_eq!(brand_label("acme.co"), "acme");
    }

    #[test]
    fn unparseable_website_scores_fallback() {
        let result = score_website(&lead_with(Some("n/a"), None), &WebsiteConfig::default());

        assert_eq!(result.score, 20.0);
        assert_eq!(result.headline(), Some("Website could not be parsed"));
    }

    #[test]
    fn missing_website_scores_fallback() {
        let result = score_website(&lead_with(None, None), &WebsiteConfig::default());

        assert_eq!(result.score, 20.0);
        assert!(result.is_absent());
        assert_eq!(result.headline(), Some("No website provided"));
    }
}
