use super::normalizer::normalize_header;
use crate::workflows::scoring::LeadField;
use std::collections::HashMap;
use std::sync::OnceLock;

static HEADER_ALIAS_MAP: OnceLock<HashMap<String, LeadField>> = OnceLock::new();

/// Minimum alias length for the containment fallback; shorter aliases ("url", "hq") must
/// match a header exactly.
const MIN_CONTAINED_ALIAS_LEN: usize = 6;

/// Field for a header that is exactly one of the known aliases.
pub(crate) fn exact_field(header: &str) -> Option<LeadField> {
    header_alias_map().get(&normalize_header(header)).copied()
}

/// Fallback for decorated headers: the longest known alias contained in the header wins
/// ("Company Website URL" carries the website).
pub(crate) fn contained_field(header: &str) -> Option<LeadField> {
    let normalized = normalize_header(header);
    header_alias_map()
        .iter()
        .filter(|(alias, _)| {
            alias.len() >= MIN_CONTAINED_ALIAS_LEN && normalized.contains(alias.as_str())
        })
        .max_by(|(a, a_field), (b, b_field)| {
            a.len().cmp(&b.len()).then_with(|| b_field.cmp(a_field))
        })
        .map(|(_, field)| *field)
}

#[cfg(test)]
pub(crate) fn field_for_header(header: &str) -> Option<LeadField> {
    exact_field(header).or_else(|| contained_field(header))
}

fn header_alias_map() -> &'static HashMap<String, LeadField> {
    HEADER_ALIAS_MAP.get_or_init(|| {
        const ALIASES: &[(&str, LeadField)] = &[
            // Identity
            ("Company", LeadField::Company),
            ("Company Name", LeadField::Company),
            ("Name", LeadField::Company),
            ("Organization", LeadField::Company),
            ("Organization Name", LeadField::Company),
            ("Account Name", LeadField::Company),
            ("Business Name", LeadField::Company),
            // Sector
            ("Industry", LeadField::Industry),
            ("Sector", LeadField::Industry),
            ("Category", LeadField::Industry),
            ("Vertical", LeadField::Industry),
            // Web
            ("Website", LeadField::Website),
            ("Company Website", LeadField::Website),
            ("URL", LeadField::Website),
            ("Domain", LeadField::Website),
            ("Web", LeadField::Website),
            // Size
            ("EmployeeCount", LeadField::EmployeeCount),
            ("Employees", LeadField::EmployeeCount),
            ("Number of Employees", LeadField::EmployeeCount),
            ("# Employees", LeadField::EmployeeCount),
            ("Headcount", LeadField::EmployeeCount),
            ("Company Size", LeadField::EmployeeCount),
            ("Staff", LeadField::EmployeeCount),
            // Financials
            ("Revenue", LeadField::Revenue),
            ("Annual Revenue", LeadField::Revenue),
            ("Growth", LeadField::GrowthRate),
            ("Growth Rate", LeadField::GrowthRate),
            ("Revenue Growth", LeadField::GrowthRate),
            ("YoY Growth", LeadField::GrowthRate),
            ("Profit Margin", LeadField::ProfitMargin),
            ("ProfitMargin", LeadField::ProfitMargin),
            ("Margin", LeadField::ProfitMargin),
            ("Profit", LeadField::ProfitMargin),
            // Background
            ("Founded", LeadField::FoundedYear),
            ("Founded Year", LeadField::FoundedYear),
            ("Year Founded", LeadField::FoundedYear),
            ("Founding Year", LeadField::FoundedYear),
            ("Description", LeadField::Description),
            ("About", LeadField::Description),
            ("Summary", LeadField::Description),
            ("Location", LeadField::Location),
            ("HQ", LeadField::Location),
            ("Headquarters", LeadField::Location),
            ("City", LeadField::Location),
            ("Country", LeadField::Location),
        ];

        ALIASES
            .iter()
            .map(|(alias, field)| (normalize_header(alias), *field))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_aliases_resolve() {
        assert_eq!(field_for_header("Company Name"), Some(LeadField::Company));
        assert_eq!(field_for_header("number_of_employees"), Some(LeadField::EmployeeCount));
        assert_eq!(field_for_header("URL"), Some(LeadField::Website));
        assert_eq!(field_for_header("Revenue Growth"), Some(LeadField::GrowthRate));
    }

    #[test]
    fn contained_aliases_resolve_to_longest() {
        assert_eq!(field_for_header("Company Website URL"), Some(LeadField::Website));
        assert_eq!(field_for_header("Industry Type"), Some(LeadField::Industry));
        assert_eq!(field_for_header("Estimated Annual Revenue (USD)"), Some(LeadField::Revenue));
    }

    #[test]
    fn unknown_headers_are_ignored() {
        assert_eq!(field_for_header("Owner"), None);
        assert_eq!(field_for_header(""), None);
        assert_eq!(field_for_header("Curl"), None);
    }
}
