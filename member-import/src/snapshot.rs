//! In-memory snapshot of the remote directory
//!
//! Fetched once at run start, then kept in sync with every mutation the
//! importer issues. The orchestrator never queries the remote system for
//! matching; it resolves identities against these indices, so conflict side
//! effects applied here are visible to every later record in the batch.

use std::collections::HashMap;

use shared::{RemoteBreeder, RemoteUser};

/// Owned index over the remote user and breeder population
#[derive(Debug, Default)]
pub struct DirectorySnapshot {
    /// Users by document id
    users: HashMap<String, RemoteUser>,
    /// External id -> user document id
    by_external_id: HashMap<i64, String>,
    /// Lowercase contact email -> user document id
    by_email: HashMap<String, String>,
    /// Breeders by owning user document id
    breeders: HashMap<String, RemoteBreeder>,
}

impl DirectorySnapshot {
    pub fn new(users: Vec<RemoteUser>, breeders: HashMap<String, RemoteBreeder>) -> Self {
        let mut snapshot = Self {
            breeders,
            ..Self::default()
        };
        for user in users {
            snapshot.insert_user(user);
        }
        snapshot
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn breeder_count(&self) -> usize {
        self.breeders.len()
    }

    /// Insert or replace a user, rebinding both lookup indices
    pub fn insert_user(&mut self, user: RemoteUser) {
        if let Some(previous) = self.users.get(&user.document_id) {
            if let Some(external_id) = previous.c_id {
                self.by_external_id.remove(&external_id);
            }
            if let Some(email) = &previous.c_email {
                self.by_email.remove(&email.to_lowercase());
            }
        }

        if let Some(external_id) = user.c_id {
            self.by_external_id
                .insert(external_id, user.document_id.clone());
        }
        if let Some(email) = &user.c_email {
            self.by_email
                .insert(email.to_lowercase(), user.document_id.clone());
        }
        self.users.insert(user.document_id.clone(), user);
    }

    pub fn find_by_external_id(&self, external_id: i64) -> Option<&RemoteUser> {
        self.by_external_id
            .get(&external_id)
            .and_then(|doc_id| self.users.get(doc_id))
    }

    /// Case-insensitive lookup by contact email
    pub fn find_by_email(&self, email: &str) -> Option<&RemoteUser> {
        self.by_email
            .get(&email.to_lowercase())
            .and_then(|doc_id| self.users.get(doc_id))
    }

    /// Mirror a remote eviction: block the account, rewrite both of its
    /// emails to the placeholder, and free its slot in the email index
    pub fn block_user(&mut self, document_id: &str, blocked_email: &str) {
        let Some(user) = self.users.get_mut(document_id) else {
            return;
        };
        if let Some(email) = &user.c_email {
            self.by_email.remove(&email.to_lowercase());
        }
        user.blocked = true;
        user.email = Some(blocked_email.to_string());
        user.c_email = Some(blocked_email.to_string());
        self.by_email
            .insert(blocked_email.to_lowercase(), document_id.to_string());
    }

    pub fn breeder_for_user(&self, user_document_id: &str) -> Option<&RemoteBreeder> {
        self.breeders.get(user_document_id)
    }

    pub fn upsert_breeder(&mut self, user_document_id: &str, breeder: RemoteBreeder) {
        self.breeders.insert(user_document_id.to_string(), breeder);
    }
}
