use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::config::DedupPolicy;
use super::domain::{CleanedLead, LeadIdentity};

/// A dropped row and the row it was merged into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub row: usize,
    pub kept_row: usize,
    pub identity: LeadIdentity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    pub leads: Vec<CleanedLead>,
    pub duplicates: Vec<DuplicateRecord>,
}

impl DedupOutcome {
    pub fn removed(&self) -> usize {
        self.duplicates.len()
    }
}

/// Collapses leads sharing an identity. The first occurrence survives in its original position;
/// leads whose identity is unusable are never merged.
pub fn deduplicate(leads: Vec<CleanedLead>, policy: DedupPolicy) -> DedupOutcome {
    let mut kept: Vec<CleanedLead> = Vec::with_capacity(leads.len());
    let mut index_by_identity: HashMap<LeadIdentity, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for lead in leads {
        let identity = lead.identity();
        if !identity.is_usable() {
            kept.push(lead);
            continue;
        }

        match index_by_identity.get(&identity) {
            Some(&index) => {
                let survivor = &mut kept[index];
                if policy == DedupPolicy::FillMissing {
                    survivor.fill_from(&lead);
                }
                duplicates.push(DuplicateRecord {
                    row: lead.row,
                    kept_row: survivor.row,
                    identity,
                });
            }
            None => {
                index_by_identity.insert(identity, kept.len());
                kept.push(lead);
            }
        }
    }

    DedupOutcome {
        leads: kept,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::scoring::domain::{IssueKind, LeadField, RawLead};
    use crate::workflows::scoring::normalize::normalize_lead;

    fn cleaned(row: usize, fields: &[(LeadField, &str)]) -> CleanedLead {
        let raw = fields
            .iter()
            .fold(RawLead::new(row), |lead, (field, value)| {
                lead.with_field(*field, *value)
            });
        normalize_lead(&raw, 2024, 1800)
    }

    #[test]
    fn first_occurrence_wins() {
        let leads = vec![
            cleaned(1, &[(LeadField::Company, "Acme Inc"), (LeadField::Website, "acme.com")]),
            cleaned(2, &[(LeadField::Company, "Beta"), (LeadField::Website, "beta.io")]),
            cleaned(
                3,
                &[
                    (LeadField::Company, "ACME"),
                    (LeadField::Website, "https://www.acme.com"),
                    (LeadField::EmployeeCount, "80"),
                ],
            ),
        ];

        let outcome = deduplicate(leads, DedupPolicy::FirstWins);

        assert_eq!(outcome.removed(), 1);
        assert_eq!(
            outcome.leads.iter().map(|lead| lead.row).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(outcome.duplicates[0].row, 3);
        assert_eq!(outcome.duplicates[0].kept_row, 1);
        assert_eq!(outcome.leads[0].employee_count, None);
    }

    #[test]
    fn same_name_on_different_domains_is_kept() {
        let leads = vec![
            cleaned(1, &[(LeadField::Company, "Acme"), (LeadField::Website, "acme.com")]),
            cleaned(2, &[(LeadField::Company, "Acme"), (LeadField::Website, "acme.de")]),
        ];

        assert_eq!(deduplicate(leads, DedupPolicy::FirstWins).removed(), 0);
    }

    #[test]
    fn unusable_identities_never_merge() {
        let leads = vec![
            cleaned(1, &[(LeadField::Industry, "SaaS")]),
            cleaned(2, &[(LeadField::Industry, "SaaS")]),
        ];

        let outcome = deduplicate(leads, DedupPolicy::FirstWins);

        assert_eq!(outcome.leads.len(), 2);
        assert!(outcome.duplicates.is_empty());
    }

    #[test]
    fn fill_missing_merges_later_values() {
        let leads = vec![
            cleaned(1, &[(LeadField::Company, "Acme"), (LeadField::Website, "acme.com")]),
            cleaned(
                2,
                &[
                    (LeadField::Company, "Acme LLC"),
                    (LeadField::Website, "acme.com"),
                    (LeadField::EmployeeCount, "120"),
                    (LeadField::Revenue, "$4M"),
                ],
            ),
        ];

        let outcome = deduplicate(leads, DedupPolicy::FillMissing);
        let survivor = &outcome.leads[0];

        assert_eq!(outcome.removed(), 1);
        assert_eq!(survivor.row, 1);
        assert_eq!(survivor.employee_count, Some(120));
        assert_eq!(survivor.revenue, Some(4_000_000.0));
        assert_eq!(survivor.issues_for(LeadField::EmployeeCount).count(), 0);
        assert!(survivor
            .issues_for(LeadField::GrowthRate)
            .any(|issue| issue.kind == IssueKind::Missing));
    }

    #[test]
    fn deduplication_is_idempotent() {
        let leads = vec![
            cleaned(1, &[(LeadField::Company, "Acme"), (LeadField::Website, "acme.com")]),
            cleaned(2, &[(LeadField::Company, "acme inc"), (LeadField::Website, "acme.com")]),
            cleaned(3, &[(LeadField::Company, "Beta")]),
        ];

        let once = deduplicate(leads, DedupPolicy::FillMissing);
        let twice = deduplicate(once.leads.clone(), DedupPolicy::FillMissing);

        assert_eq!(twice.leads, once.leads);
        assert_eq!(twice.removed(), 0);
    }
}
