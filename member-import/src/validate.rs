//! Data-quality audit
//!
//! Read-only pass over the normalized batch. Findings are logged as
//! warnings; nothing here blocks the import.

use std::collections::HashMap;

use shared::NormalizedMember;

#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Membership numbers held by more than one record
    pub duplicate_membership_numbers: Vec<i64>,
    /// Active members left without a contact email
    pub active_without_email: usize,
}

/// Audit the batch after sanitization and conflict resolution
pub fn validate_members(members: &[NormalizedMember]) -> ValidationReport {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for member in members {
        if let Some(number) = member.membership_number {
            *counts.entry(number).or_default() += 1;
        }
    }

    let mut duplicates: Vec<i64> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(number, _)| number)
        .collect();
    duplicates.sort_unstable();

    let active_without_email = members
        .iter()
        .filter(|m| !m.blocked && m.email.is_none())
        .count();

    if duplicates.is_empty() {
        tracing::info!("No duplicate membership numbers");
    } else {
        tracing::warn!(
            count = duplicates.len(),
            numbers = ?duplicates,
            "Found duplicate membership numbers"
        );
    }
    if active_without_email > 0 {
        tracing::warn!(active_without_email, "Active members without a contact email");
    }

    ValidationReport {
        duplicate_membership_numbers: duplicates,
        active_without_email,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(number: Option<i64>, email: Option<&str>, blocked: bool) -> NormalizedMember {
        NormalizedMember {
            membership_number: number,
            email: email.map(str::to_string),
            blocked,
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_membership_numbers_are_reported() {
        let members = vec![
            member(Some(1234), Some("a@example.com"), false),
            member(Some(1234), Some("b@example.com"), false),
            member(Some(5678), Some("c@example.com"), false),
        ];
        let report = validate_members(&members);
        assert_eq!(report.duplicate_membership_numbers, vec![1234]);
    }

    #[test]
    fn test_clean_batch_produces_empty_report() {
        let members = vec![
            member(Some(1234), Some("a@example.com"), false),
            member(None, Some("b@example.com"), false),
        ];
        let report = validate_members(&members);
        assert!(report.duplicate_membership_numbers.is_empty());
        assert_eq!(report.active_without_email, 0);
    }

    #[test]
    fn test_active_members_without_email_are_counted() {
        let members = vec![
            member(None, None, false),
            member(None, None, true),
            member(None, Some("a@example.com"), false),
        ];
        let report = validate_members(&members);
        assert_eq!(report.active_without_email, 1);
    }
}
