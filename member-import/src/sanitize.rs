//! Batch sanitizer
//!
//! Legacy exports carry placeholder membership numbers below 100 that were
//! never real memberships. They are cleared here, together with the username
//! derived from them, before any matching happens.

use shared::NormalizedMember;

/// Membership numbers below this are legacy placeholders
const MIN_MEMBERSHIP_NUMBER: i64 = 100;

/// Clear implausible membership numbers, returns the number of corrections
pub fn sanitize_members(members: &mut [NormalizedMember]) -> usize {
    let mut corrected = 0;
    for member in members.iter_mut() {
        if member
            .membership_number
            .is_some_and(|n| n < MIN_MEMBERSHIP_NUMBER)
        {
            member.membership_number = None;
            member.derived_username = None;
            corrected += 1;
        }
    }

    tracing::info!(corrected, total = members.len(), "Sanitized membership numbers");
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_with_number(number: i64) -> NormalizedMember {
        NormalizedMember {
            external_id: Some(1),
            membership_number: Some(number),
            derived_username: Some(number.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_small_membership_number_is_cleared() {
        let mut members = vec![member_with_number(42)];
        assert_eq!(sanitize_members(&mut members), 1);
        assert!(members[0].membership_number.is_none());
        assert!(members[0].derived_username.is_none());
    }

    #[test]
    fn test_regular_membership_number_is_untouched() {
        let mut members = vec![member_with_number(4200)];
        assert_eq!(sanitize_members(&mut members), 0);
        assert_eq!(members[0].membership_number, Some(4200));
        assert_eq!(members[0].derived_username.as_deref(), Some("4200"));
    }

    #[test]
    fn test_boundary_value_is_kept() {
        let mut members = vec![member_with_number(100)];
        assert_eq!(sanitize_members(&mut members), 0);
        assert_eq!(members[0].membership_number, Some(100));
    }

    #[test]
    fn test_absent_number_is_ignored() {
        let mut members = vec![NormalizedMember::default()];
        assert_eq!(sanitize_members(&mut members), 0);
    }
}
