//! Identity matching and upsert orchestration
//!
//! Each member walks a small state machine: identify -> match against the
//! snapshot -> create, update or skip -> breeder upsert. Records are
//! processed strictly in order; every remote side effect is mirrored into
//! the snapshot so the next record sees it.

use chrono::Utc;

use directory_client::{Directory, DirectoryResult};
use shared::{
    BreederPayload, NormalizedMember, RemoteBreeder, RemoteUser, UserPayload, changed_fields,
    opt_str_eq,
};

use crate::snapshot::DirectorySnapshot;

/// Domain of all synthetic login and placeholder addresses
const AUTH_EMAIL_DOMAIN: &str = "hovawarte.com";

/// Aggregate counters for one run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Records without any stable identity
    pub rejected: usize,
    /// Records whose remote call failed terminally
    pub failed: usize,
    /// Remote accounts evicted from a contested email
    pub conflicts_blocked: usize,
    pub breeders_created: usize,
    pub breeders_updated: usize,
}

/// Sequential upsert driver over one batch
pub struct Importer<'a, D: Directory> {
    directory: &'a D,
    snapshot: DirectorySnapshot,
    dry_run: bool,
    summary: ImportSummary,
}

/// Synthetic login email, derived from the identity alone
fn login_email(username: &str) -> String {
    format!("{username}@{AUTH_EMAIL_DOMAIN}")
}

/// Placeholder contact address for a blocked member
fn blocked_placeholder(username: &str) -> String {
    format!("blocked_{username}@{AUTH_EMAIL_DOMAIN}")
}

/// Timestamped address an evicted account is parked on
fn eviction_email(username: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    format!("blocked_{stamp}_{username}@{AUTH_EMAIL_DOMAIN}")
}

impl<'a, D: Directory> Importer<'a, D> {
    pub fn new(directory: &'a D, snapshot: DirectorySnapshot, dry_run: bool) -> Self {
        Self {
            directory,
            snapshot,
            dry_run,
            summary: ImportSummary::default(),
        }
    }

    /// Process the whole batch; terminal per-record failures are counted,
    /// never abort the run
    pub async fn run(mut self, members: &[NormalizedMember]) -> ImportSummary {
        for member in members {
            self.summary.total += 1;
            if let Err(e) = self.process_member(member).await {
                tracing::error!(
                    external_id = member.external_id,
                    "Member failed terminally: {e}"
                );
                self.summary.failed += 1;
            }
        }
        self.summary
    }

    async fn process_member(&mut self, member: &NormalizedMember) -> DirectoryResult<()> {
        // Identify: derived username, else synthesized from the external id
        let username = match (&member.derived_username, member.external_id) {
            (Some(username), _) => username.clone(),
            (None, Some(external_id)) => format!("user-{external_id}"),
            (None, None) => {
                tracing::warn!("Rejecting record without membership number or external id");
                self.summary.rejected += 1;
                return Ok(());
            }
        };

        // A blocked member never keeps a reusable real address
        let contact_email = if member.blocked {
            Some(blocked_placeholder(&username))
        } else {
            member.email.clone()
        };

        let matched = self.match_member(member, contact_email.as_deref()).await?;

        let user_doc_id = match matched {
            Some(remote) => {
                self.update_member(member, &username, contact_email.as_deref(), remote)
                    .await?
            }
            None => {
                self.create_member(member, &username, contact_email.as_deref())
                    .await?
            }
        };

        if member.is_breeder {
            if let Some(doc_id) = user_doc_id {
                self.upsert_breeder(member, &username, &doc_id).await?;
            }
        }
        Ok(())
    }

    /// Resolve the record against the snapshot: external id first, then
    /// contact email. Email hits on a foreign identity evict that account.
    async fn match_member(
        &mut self,
        member: &NormalizedMember,
        contact_email: Option<&str>,
    ) -> DirectoryResult<Option<RemoteUser>> {
        if let Some(external_id) = member.external_id {
            if let Some(remote) = self.snapshot.find_by_external_id(external_id) {
                return Ok(Some(remote.clone()));
            }
            // Fallback point lookup for accounts the snapshot fetch missed
            if !self.dry_run {
                if let Some(doc_id) = self
                    .directory
                    .find_user_by_external_id(external_id)
                    .await?
                {
                    tracing::warn!(external_id, "Account missing from snapshot, found by lookup");
                    return Ok(Some(RemoteUser::skeleton(doc_id, Some(external_id))));
                }
            }
        }

        let Some(email) = contact_email else {
            return Ok(None);
        };
        let Some(remote) = self.snapshot.find_by_email(email).cloned() else {
            return Ok(None);
        };

        match (remote.c_id, member.external_id) {
            // Unlinked legacy account holding our address: same identity
            (None, _) => Ok(Some(remote)),
            (Some(remote_id), Some(external_id)) if remote_id == external_id => Ok(Some(remote)),
            // A different identity holds the address: evict it
            (Some(remote_id), _) => {
                let parked = eviction_email(remote.username.as_deref().unwrap_or(&remote.document_id));
                tracing::warn!(
                    email,
                    remote_external_id = remote_id,
                    external_id = member.external_id,
                    "Email held by a different account, blocking it"
                );
                if !self.dry_run {
                    self.directory
                        .update_user(&remote.document_id, &UserPayload::eviction(&parked))
                        .await?;
                }
                self.snapshot.block_user(&remote.document_id, &parked);
                self.summary.conflicts_blocked += 1;
                Ok(None)
            }
        }
    }

    async fn create_member(
        &mut self,
        member: &NormalizedMember,
        username: &str,
        contact_email: Option<&str>,
    ) -> DirectoryResult<Option<String>> {
        let login = login_email(username);
        tracing::info!(username, external_id = member.external_id, "Creating member");

        let doc_id = if self.dry_run {
            format!("dry-run-{username}")
        } else {
            let Some(doc_id) = self.directory.register_user(username, &login).await? else {
                self.summary.failed += 1;
                return Ok(None);
            };
            let payload = UserPayload::from_member(member, username, contact_email);
            if !self.directory.update_user(&doc_id, &payload).await? {
                self.summary.failed += 1;
                return Ok(None);
            }
            doc_id
        };

        self.snapshot.insert_user(RemoteUser::from_member(
            member,
            doc_id.clone(),
            username,
            &login,
            contact_email,
        ));
        self.summary.created += 1;
        Ok(Some(doc_id))
    }

    async fn update_member(
        &mut self,
        member: &NormalizedMember,
        username: &str,
        contact_email: Option<&str>,
        remote: RemoteUser,
    ) -> DirectoryResult<Option<String>> {
        let changed = changed_fields(member, username, contact_email, &remote);
        if changed.is_empty() {
            tracing::debug!(username, "Member unchanged, skipping");
            self.summary.skipped += 1;
            return Ok(Some(remote.document_id));
        }

        tracing::info!(username, fields = ?changed, "Updating member");
        if !self.dry_run {
            let payload = UserPayload::from_member(member, username, contact_email);
            if !self
                .directory
                .update_user(&remote.document_id, &payload)
                .await?
            {
                self.summary.failed += 1;
                return Ok(None);
            }
        }

        let login = remote
            .email
            .clone()
            .unwrap_or_else(|| login_email(username));
        self.snapshot.insert_user(RemoteUser::from_member(
            member,
            remote.document_id.clone(),
            username,
            &login,
            contact_email,
        ));
        self.summary.updated += 1;
        Ok(Some(remote.document_id))
    }

    async fn upsert_breeder(
        &mut self,
        member: &NormalizedMember,
        username: &str,
        user_doc_id: &str,
    ) -> DirectoryResult<()> {
        let payload = BreederPayload::from_member(member, user_doc_id);

        if let Some(existing) = self.snapshot.breeder_for_user(user_doc_id) {
            let unchanged = existing.is_active == member.is_active_breeder
                && opt_str_eq(existing.kennel_name.as_deref(), member.kennel_name.as_deref())
                && existing.external_id == member.external_id;
            if unchanged {
                return Ok(());
            }

            tracing::info!(username, "Updating breeder record");
            let breeder_doc_id = existing.document_id.clone();
            if !self.dry_run
                && !self
                    .directory
                    .update_breeder(&breeder_doc_id, &payload)
                    .await?
            {
                self.summary.failed += 1;
                return Ok(());
            }
            self.snapshot.upsert_breeder(
                user_doc_id,
                RemoteBreeder {
                    document_id: breeder_doc_id,
                    is_active: member.is_active_breeder,
                    kennel_name: member.kennel_name.clone(),
                    external_id: member.external_id,
                },
            );
            self.summary.breeders_updated += 1;
            return Ok(());
        }

        // Fallback point lookup: the breeder may exist remotely without the
        // snapshot knowing about it
        if !self.dry_run {
            if let Some(external_id) = member.external_id {
                if let Some(breeder_doc_id) = self
                    .directory
                    .find_breeder_by_external_id(external_id)
                    .await?
                {
                    tracing::info!(username, "Updating breeder record found by lookup");
                    if !self
                        .directory
                        .update_breeder(&breeder_doc_id, &payload)
                        .await?
                    {
                        self.summary.failed += 1;
                        return Ok(());
                    }
                    self.snapshot.upsert_breeder(
                        user_doc_id,
                        RemoteBreeder {
                            document_id: breeder_doc_id,
                            is_active: member.is_active_breeder,
                            kennel_name: member.kennel_name.clone(),
                            external_id: member.external_id,
                        },
                    );
                    self.summary.breeders_updated += 1;
                    return Ok(());
                }
            }
        }

        tracing::info!(username, "Creating breeder record");
        let breeder_doc_id = if self.dry_run {
            format!("dry-run-breeder-{username}")
        } else {
            match self.directory.create_breeder(&payload).await? {
                Some(doc_id) => doc_id,
                None => {
                    self.summary.failed += 1;
                    return Ok(());
                }
            }
        };
        self.snapshot.upsert_breeder(
            user_doc_id,
            RemoteBreeder {
                document_id: breeder_doc_id,
                is_active: member.is_active_breeder,
                kennel_name: member.kennel_name.clone(),
                external_id: member.external_id,
            },
        );
        self.summary.breeders_created += 1;
        Ok(())
    }
}
