//! Remote directory entities and typed mutation payloads
//!
//! `RemoteUser`/`RemoteBreeder` mirror the directory's wire shapes (the
//! legacy backend keeps its original field casing, including `cId`, `cEmail`
//! and `IsActiveBreeder`). `UserPayload`/`BreederPayload` are the projections
//! sent with mutations: every field is optional and unset fields are dropped
//! from the wire body.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::member::NormalizedMember;

/// Directory user as fetched into the local snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub document_id: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Login email (synthetic, derived from the username)
    #[serde(default)]
    pub email: Option<String>,
    /// Real contact email
    #[serde(default)]
    pub c_email: Option<String>,
    /// Legacy primary key, absent on accounts created outside the migration
    #[serde(default)]
    pub c_id: Option<i64>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub c_flag_breeder: Option<bool>,
    #[serde(default, rename = "IsActiveBreeder")]
    pub is_active_breeder: Option<bool>,
    #[serde(default)]
    pub membership_number: Option<i64>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
    #[serde(default)]
    pub member_since: Option<NaiveDate>,
    #[serde(default)]
    pub cancellation_on: Option<NaiveDate>,
}

/// Breeder record linked one-to-one to a directory user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBreeder {
    pub document_id: String,
    #[serde(default, rename = "IsActive")]
    pub is_active: bool,
    #[serde(default)]
    pub kennel_name: Option<String>,
    #[serde(default, rename = "cId")]
    pub external_id: Option<i64>,
}

/// Mutation body for user updates; unset fields stay off the wire
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_flag_breeder: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "IsActiveBreeder")]
    pub is_active_breeder: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_since: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_on: Option<NaiveDate>,
}

impl UserPayload {
    /// Full business-field projection of a normalized member
    ///
    /// `contact_email` is the member's effective contact address (already
    /// scrubbed for blocked members); the login email is never touched here.
    pub fn from_member(
        member: &NormalizedMember,
        username: &str,
        contact_email: Option<&str>,
    ) -> Self {
        Self {
            username: Some(username.to_string()),
            email: None,
            c_id: member.external_id,
            c_email: contact_email.map(str::to_string),
            blocked: Some(member.blocked),
            sex: member.sex.map(|s| s.as_str().to_string()),
            title: member.title.clone(),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            address1: member.address1.clone(),
            zip: member.zip.clone(),
            city: member.city.clone(),
            region: member.region.map(|r| r.as_str().to_string()),
            country_code: member.country_code.clone(),
            phone: member.phone.clone(),
            c_flag_breeder: Some(member.is_breeder),
            is_active_breeder: Some(member.is_active_breeder),
            membership_number: member.membership_number,
            date_of_birth: member.date_of_birth,
            date_of_death: member.date_of_death,
            member_since: member.member_since,
            cancellation_on: member.cancellation_on,
        }
    }

    /// Projection that evicts a conflicting account: blocked, with login and
    /// contact email rewritten to the given placeholder
    pub fn eviction(blocked_email: &str) -> Self {
        Self {
            email: Some(blocked_email.to_string()),
            c_email: Some(blocked_email.to_string()),
            blocked: Some(true),
            ..Self::default()
        }
    }
}

/// Mutation body for breeder creates/updates
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreederPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "IsActive")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kennel_name: Option<String>,
    /// Document id of the owning user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

impl BreederPayload {
    pub fn from_member(member: &NormalizedMember, user_document_id: &str) -> Self {
        Self {
            c_id: member.external_id,
            is_active: Some(member.is_active_breeder),
            kennel_name: member.kennel_name.clone(),
            member: Some(user_document_id.to_string()),
        }
    }
}

/// Compare two optional strings as trimmed text; empty equals absent
pub fn opt_str_eq(a: Option<&str>, b: Option<&str>) -> bool {
    fn norm(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|s| !s.is_empty())
    }
    norm(a) == norm(b)
}

/// Field-by-field comparison of a normalized member against its snapshot
/// entry; returns the names of the fields that would change.
///
/// Strings compare trimmed, booleans by identity, dates as canonical dates.
/// An empty result means the upsert can be skipped entirely.
pub fn changed_fields(
    member: &NormalizedMember,
    username: &str,
    contact_email: Option<&str>,
    remote: &RemoteUser,
) -> Vec<&'static str> {
    let mut changed = Vec::new();

    if !opt_str_eq(Some(username), remote.username.as_deref()) {
        changed.push("username");
    }
    if member.external_id != remote.c_id {
        changed.push("cId");
    }
    if !opt_str_eq(contact_email, remote.c_email.as_deref()) {
        changed.push("cEmail");
    }
    if member.blocked != remote.blocked {
        changed.push("blocked");
    }
    if !opt_str_eq(member.sex.map(|s| s.as_str()), remote.sex.as_deref()) {
        changed.push("sex");
    }
    if !opt_str_eq(member.title.as_deref(), remote.title.as_deref()) {
        changed.push("title");
    }
    if !opt_str_eq(member.first_name.as_deref(), remote.first_name.as_deref()) {
        changed.push("firstName");
    }
    if !opt_str_eq(member.last_name.as_deref(), remote.last_name.as_deref()) {
        changed.push("lastName");
    }
    if !opt_str_eq(member.address1.as_deref(), remote.address1.as_deref()) {
        changed.push("address1");
    }
    if !opt_str_eq(member.zip.as_deref(), remote.zip.as_deref()) {
        changed.push("zip");
    }
    if !opt_str_eq(member.city.as_deref(), remote.city.as_deref()) {
        changed.push("city");
    }
    if !opt_str_eq(member.region.map(|r| r.as_str()), remote.region.as_deref()) {
        changed.push("region");
    }
    if !opt_str_eq(
        member.country_code.as_deref(),
        remote.country_code.as_deref(),
    ) {
        changed.push("countryCode");
    }
    if !opt_str_eq(member.phone.as_deref(), remote.phone.as_deref()) {
        changed.push("phone");
    }
    if member.is_breeder != remote.c_flag_breeder.unwrap_or(false) {
        changed.push("cFlagBreeder");
    }
    if member.is_active_breeder != remote.is_active_breeder.unwrap_or(false) {
        changed.push("IsActiveBreeder");
    }
    if member.membership_number != remote.membership_number {
        changed.push("membershipNumber");
    }
    if member.date_of_birth != remote.date_of_birth {
        changed.push("dateOfBirth");
    }
    if member.date_of_death != remote.date_of_death {
        changed.push("dateOfDeath");
    }
    if member.member_since != remote.member_since {
        changed.push("memberSince");
    }
    if member.cancellation_on != remote.cancellation_on {
        changed.push("cancellationOn");
    }

    changed
}

impl RemoteUser {
    /// Entry for an account known only by document id
    ///
    /// Every business field is unknown, so any diff against it forces a
    /// full push.
    pub fn skeleton(document_id: String, external_id: Option<i64>) -> Self {
        Self {
            document_id,
            username: None,
            email: None,
            c_email: None,
            c_id: external_id,
            blocked: false,
            sex: None,
            title: None,
            first_name: None,
            last_name: None,
            address1: None,
            zip: None,
            city: None,
            region: None,
            country_code: None,
            phone: None,
            c_flag_breeder: None,
            is_active_breeder: None,
            membership_number: None,
            date_of_birth: None,
            date_of_death: None,
            member_since: None,
            cancellation_on: None,
        }
    }

    /// Snapshot entry for a freshly created or just-updated account
    pub fn from_member(
        member: &NormalizedMember,
        document_id: String,
        username: &str,
        login_email: &str,
        contact_email: Option<&str>,
    ) -> Self {
        Self {
            document_id,
            username: Some(username.to_string()),
            email: Some(login_email.to_string()),
            c_email: contact_email.map(str::to_string),
            c_id: member.external_id,
            blocked: member.blocked,
            sex: member.sex.map(|s| s.as_str().to_string()),
            title: member.title.clone(),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            address1: member.address1.clone(),
            zip: member.zip.clone(),
            city: member.city.clone(),
            region: member.region.map(|r| r.as_str().to_string()),
            country_code: member.country_code.clone(),
            phone: member.phone.clone(),
            c_flag_breeder: Some(member.is_breeder),
            is_active_breeder: Some(member.is_active_breeder),
            membership_number: member.membership_number,
            date_of_birth: member.date_of_birth,
            date_of_death: member.date_of_death,
            member_since: member.member_since,
            cancellation_on: member.cancellation_on,
        }
    }
}
