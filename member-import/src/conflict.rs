//! Email conflict resolver
//!
//! Two legacy records must never both claim the same contact email, or the
//! later upsert would silently steal the address from the earlier one.
//! Resolution happens entirely in memory, before any remote call.
//!
//! Rules per lowercase-email group with more than one record:
//! - active and blocked records mixed: the blocked records lose the email
//! - several active records: the lowest external id keeps the email, the
//!   rest lose it (records without an external id rank last, ties keep
//!   input order)
//! - all records blocked: left untouched

use std::collections::HashMap;

use shared::NormalizedMember;

/// Deduplicate contact emails across the batch, returns emails cleared
pub fn resolve_email_conflicts(members: &mut [NormalizedMember]) -> usize {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, member) in members.iter().enumerate() {
        if let Some(email) = &member.email {
            groups.entry(email.to_lowercase()).or_default().push(index);
        }
    }

    let mut cleared = 0;
    for (email, indices) in groups {
        if indices.len() < 2 {
            continue;
        }

        let actives: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| !members[i].blocked)
            .collect();

        if actives.is_empty() {
            // All blocked: nothing claims the address, leave the group alone
            continue;
        }

        if actives.len() < indices.len() {
            for &index in &indices {
                if members[index].blocked {
                    tracing::warn!(
                        email,
                        external_id = members[index].external_id,
                        "Clearing email of blocked member, address claimed by an active one"
                    );
                    members[index].email = None;
                    cleared += 1;
                }
            }
        }

        if actives.len() > 1 {
            // Tie-break between active claimants: lowest external id wins
            let winner = actives
                .iter()
                .copied()
                .min_by_key(|&i| (members[i].external_id.is_none(), members[i].external_id, i))
                .unwrap_or(actives[0]);
            for &index in &actives {
                if index != winner {
                    tracing::warn!(
                        email,
                        external_id = members[index].external_id,
                        winner_external_id = members[winner].external_id,
                        "Clearing email of duplicate active member"
                    );
                    members[index].email = None;
                    cleared += 1;
                }
            }
        }
    }

    tracing::info!(cleared, "Resolved email conflicts");
    cleared
}
