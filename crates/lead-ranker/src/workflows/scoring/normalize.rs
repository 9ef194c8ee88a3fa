use url::Url;

use super::config::NormalizerSettings;
use super::domain::{CleanedLead, FieldIssue, IssueKind, LeadBatch, LeadField, RawLead};

const LEGAL_SUFFIXES: &[&str] = &[
    "inc",
    "incorporated",
    "llc",
    "ltd",
    "corp",
    "corporation",
    "co",
    "company",
    "gmbh",
    "plc",
    "limited",
];

/// Cleans every row of the batch. A field the dataset has no column for is not reported
/// as missing on each row.
pub fn normalize_batch(batch: &LeadBatch, settings: &NormalizerSettings) -> Vec<CleanedLead> {
    let reference_year = settings.resolved_reference_year();
    batch
        .leads
        .iter()
        .map(|raw| {
            let mut lead = normalize_lead(raw, reference_year, settings.min_founding_year);
            lead.issues.retain(|issue| {
                issue.kind != IssueKind::Missing || batch.recognized.contains(&issue.field)
            });
            lead
        })
        .collect()
}

/// Cleans one row. Bad values become `None` plus a [`FieldIssue`]; nothing here fails.
pub fn normalize_lead(raw: &RawLead, reference_year: i32, min_founding_year: i32) -> CleanedLead {
    let row = raw.row;
    let mut lead = CleanedLead::empty(row);
    lead.original = raw.columns.clone();
    let mut issues = Vec::new();
    let text = |field: LeadField| raw.field(field).and_then(clean_text);

    lead.company = text(LeadField::Company);
    if lead.company.is_none() {
        issues.push(issue(row, LeadField::Company, IssueKind::Missing, None));
    }
    lead.company_key = lead.company.as_deref().map(matching_key);

    lead.industry = text(LeadField::Industry);
    lead.industry_key = lead
        .industry
        .as_deref()
        .map(matching_key)
        .filter(|key| !key.is_empty());
    if lead.industry_key.is_none() {
        issues.push(issue(row, LeadField::Industry, IssueKind::Missing, None));
    }

    lead.description_key = text(LeadField::Description).map(|value| matching_key(&value));
    lead.location = text(LeadField::Location);

    match text(LeadField::Website) {
        None => issues.push(issue(row, LeadField::Website, IssueKind::Missing, None)),
        Some(website) => {
            match parse_website(&website) {
                Some(parts) => {
                    lead.domain = Some(parts.domain);
                    lead.tld = Some(parts.tld);
                }
                None => issues.push(issue(
                    row,
                    LeadField::Website,
                    IssueKind::Malformed,
                    Some(&website),
                )),
            }
            lead.website = Some(website);
        }
    }

    match text(LeadField::EmployeeCount) {
        None => issues.push(issue(row, LeadField::EmployeeCount, IssueKind::Missing, None)),
        Some(value) => match parse_employee_count(&value) {
            Ok(count) => lead.employee_count = Some(count),
            Err(kind) => issues.push(issue(row, LeadField::EmployeeCount, kind, Some(&value))),
        },
    }

    lead.revenue = numeric_field(raw, LeadField::Revenue, &mut issues, |value| value >= 0.0);
    lead.growth_rate = numeric_field(raw, LeadField::GrowthRate, &mut issues, |_| true);
    lead.profit_margin = numeric_field(raw, LeadField::ProfitMargin, &mut issues, |_| true);

    let founded = numeric_field(raw, LeadField::FoundedYear, &mut issues, |year| {
        year.fract() == 0.0
            && year >= f64::from(min_founding_year)
            && year <= f64::from(reference_year)
    });
    if let Some(year) = founded {
        let year = year as i32;
        lead.founded_year = Some(year);
        lead.company_age = u32::try_from(reference_year - year).ok();
    }

    lead.issues = issues;
    lead
}

fn numeric_field(
    raw: &RawLead,
    field: LeadField,
    issues: &mut Vec<FieldIssue>,
    in_range: impl Fn(f64) -> bool,
) -> Option<f64> {
    let Some(value) = raw.field(field).and_then(clean_text) else {
        issues.push(issue(raw.row, field, IssueKind::Missing, None));
        return None;
    };
    match parse_number(&value) {
        Some(number) if in_range(number) => Some(number),
        Some(_) => {
            issues.push(issue(raw.row, field, IssueKind::OutOfRange, Some(&value)));
            None
        }
        None => {
            issues.push(issue(raw.row, field, IssueKind::Malformed, Some(&value)));
            None
        }
    }
}

fn issue(row: usize, field: LeadField, kind: IssueKind, value: Option<&str>) -> FieldIssue {
    FieldIssue {
        row,
        field,
        kind,
        value: value.map(str::to_string),
    }
}

/// Trims, strips zero-width characters and collapses inner whitespace. Blank becomes `None`.
pub fn clean_text(value: &str) -> Option<String> {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Lower-case, punctuation-free form used for every keyword and industry comparison.
pub fn matching_key(value: &str) -> String {
    let mut key = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => key.push_str(" and "),
            c if c.is_alphanumeric() || c == '#' => key.extend(c.to_lowercase()),
            _ => key.push(' '),
        }
    }
    key.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Company name reduced for identity comparison: legal suffixes such as "Inc." are dropped.
pub fn normalize_company_name(name: &str) -> Option<String> {
    let key = matching_key(name);
    let mut tokens: Vec<&str> = key.split_whitespace().collect();
    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|token| LEGAL_SUFFIXES.contains(token))
    {
        tokens.pop();
    }
    (!tokens.is_empty()).then(|| tokens.join(" "))
}

/// Parses human-entered numbers: "$1,200", "15%", "2.5M", "800k", "1.1bn".
pub fn parse_number(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '_') && !c.is_whitespace())
        .collect();
    let unsigned_percent = compact.strip_suffix('%').unwrap_or(&compact);
    if unsigned_percent.is_empty() {
        return None;
    }

    let lower = unsigned_percent.to_ascii_lowercase();
    let (digits, multiplier) = if let Some(stripped) = lower.strip_suffix("bn") {
        (stripped, 1e9)
    } else if let Some(stripped) = lower.strip_suffix('b') {
        (stripped, 1e9)
    } else if let Some(stripped) = lower.strip_suffix('m') {
        (stripped, 1e6)
    } else if let Some(stripped) = lower.strip_suffix('k') {
        (stripped, 1e3)
    } else {
        (lower.as_str(), 1.0)
    };

    digits
        .parse::<f64>()
        .ok()
        .map(|value| value * multiplier)
        .filter(|value| value.is_finite())
}

/// Accepts plain counts, "500+" and ranges such as "51-200" (midpoint, rounded).
pub fn parse_employee_count(raw: &str) -> Result<u32, IssueKind> {
    let text = raw.trim();
    let text = text.strip_suffix('+').unwrap_or(text);

    let value = match split_range(text) {
        Some((low, high)) => {
            let low = parse_number(low).ok_or(IssueKind::Malformed)?;
            let high = parse_number(high).ok_or(IssueKind::Malformed)?;
            if low > high {
                return Err(IssueKind::Malformed);
            }
            ((low + high) / 2.0).round()
        }
        None => {
            let value = parse_number(text).ok_or(IssueKind::Malformed)?;
            if value.fract() != 0.0 {
                return Err(IssueKind::Malformed);
            }
            value
        }
    };

    if value <= 0.0 {
        return Err(IssueKind::Malformed);
    }
    if value > f64::from(u32::MAX) {
        return Err(IssueKind::OutOfRange);
    }
    Ok(value as u32)
}

fn split_range(text: &str) -> Option<(&str, &str)> {
    if let Some((low, high)) = text.split_once(" to ") {
        return Some((low, high));
    }
    text.char_indices()
        .skip(1)
        .find(|(_, c)| matches!(c, '-' | '\u{2013}' | '\u{2014}'))
        .map(|(index, c)| (&text[..index], &text[index + c.len_utf8()..]))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteParts {
    pub domain: String,
    pub tld: String,
}

/// Extracts the host (without `www.`) and its top-level label. Anything that is not a
/// dotted hostname, including bare IP addresses, is rejected.
pub fn parse_website(raw: &str) -> Option<WebsiteParts> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).ok()?;
    let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }
    let tld = labels.last()?.to_string();
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some(WebsiteParts { domain, tld })
}
