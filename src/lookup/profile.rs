//! Profile record projection.

use grammers_tl_types as tl;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::status::PresenceStatus;

/// Extended profile fields for one Telegram account.
///
/// Field names and order match the JSON report layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRecord {
    pub id: i64,
    pub username: Option<String>,
    pub usernames: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub fake: bool,
    pub verified: bool,
    pub premium: bool,
    pub mutual_contact: bool,
    pub bot: bool,
    pub bot_chat_history: bool,
    pub restricted: bool,
    pub restriction_reason: Vec<String>,
    pub user_was_online: String,
    pub deleted: bool,
    pub phone: Option<String>,
}

impl ProfileRecord {
    /// Projects a raw user object into the record's named fields.
    #[must_use]
    pub fn from_user(id: i64, user: &tl::types::User) -> Self {
        Self {
            id,
            username: user.username.clone(),
            usernames: username_strings(user.usernames.as_deref()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            fake: user.fake,
            verified: user.verified,
            premium: user.premium,
            mutual_contact: user.mutual_contact,
            bot: user.bot,
            bot_chat_history: user.bot_chat_history,
            restricted: user.restricted,
            restriction_reason: restriction_strings(user.restriction_reason.as_deref()),
            user_was_online: PresenceStatus::from_raw(user.status.as_ref()).human_readable(),
            deleted: user.deleted,
            phone: user.phone.clone(),
        }
    }
}

/// Collected usernames, including the collectible ones Premium accounts
/// can hold in addition to the primary username.
fn username_strings(usernames: Option<&[tl::enums::Username]>) -> Vec<String> {
    usernames
        .unwrap_or_default()
        .iter()
        .map(|username| {
            let tl::enums::Username::Username(inner) = username;
            inner.username.clone()
        })
        .collect()
}

fn restriction_strings(reasons: Option<&[tl::enums::RestrictionReason]>) -> Vec<String> {
    reasons
        .unwrap_or_default()
        .iter()
        .map(|reason| {
            let tl::enums::RestrictionReason::Reason(inner) = reason;
            format!("{}-{}: {}", inner.platform, inner.reason, inner.text)
        })
        .collect()
}

/// Result of looking up a single phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No Telegram account is associated with the number.
    NoAccount,

    /// Profile data for the resolved account.
    Account(Box<ProfileRecord>),
}

impl Serialize for LookupOutcome {
    /// The empty record serializes as `{}`, an account as its full record.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NoAccount => serializer.serialize_map(Some(0))?.end(),
            Self::Account(record) => record.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProfileRecord {
        ProfileRecord {
            id: 123_456,
            username: Some("someone".to_owned()),
            usernames: vec!["someone".to_owned()],
            first_name: Some("Some".to_owned()),
            last_name: None,
            fake: false,
            verified: true,
            premium: false,
            mutual_contact: false,
            bot: false,
            bot_chat_history: false,
            restricted: false,
            restriction_reason: Vec::new(),
            user_was_online: "Last seen recently".to_owned(),
            deleted: false,
            phone: Some("15550100".to_owned()),
        }
    }

    #[test]
    fn test_empty_record_serializes_to_empty_object() {
        let json = serde_json::to_string(&LookupOutcome::NoAccount).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_account_serializes_with_all_fields() {
        let outcome = LookupOutcome::Account(Box::new(sample_record()));
        let value = serde_json::to_value(&outcome).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 16);
        assert_eq!(object["id"], 123_456);
        assert_eq!(object["username"], "someone");
        assert_eq!(object["last_name"], serde_json::Value::Null);
        assert_eq!(object["verified"], true);
        assert_eq!(object["user_was_online"], "Last seen recently");
    }

    #[test]
    fn test_field_order_starts_with_id() {
        let json = serde_json::to_string(&sample_record()).unwrap();
        assert!(json.starts_with("{\"id\":"));
        assert!(json.ends_with("\"phone\":\"15550100\"}"));
    }
}
