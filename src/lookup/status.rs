//! Presence status formatting.

use chrono::{DateTime, Utc};
use grammers_tl_types as tl;

/// When a remote account was last active, as reported by Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceStatus {
    /// The service reported no status at all.
    Unknown,

    /// The account is online right now.
    Online,

    /// The account went offline at the given time.
    Offline(DateTime<Utc>),

    /// Last seen recently (exact time hidden by privacy settings).
    Recently,

    /// Last seen within the last week.
    LastWeek,

    /// Last seen within the last month.
    LastMonth,

    /// The service returned a status this tool does not know about.
    Unrecognized,
}

impl PresenceStatus {
    /// Builds a status from the raw API representation.
    ///
    /// An absent status is treated the same as an explicitly empty one.
    #[must_use]
    pub fn from_raw(status: Option<&tl::enums::UserStatus>) -> Self {
        match status {
            None | Some(tl::enums::UserStatus::Empty) => Self::Unknown,
            Some(tl::enums::UserStatus::Online(_)) => Self::Online,
            Some(tl::enums::UserStatus::Offline(offline)) => {
                DateTime::from_timestamp(i64::from(offline.was_online), 0)
                    .map_or(Self::Unrecognized, Self::Offline)
            }
            Some(tl::enums::UserStatus::Recently(_)) => Self::Recently,
            Some(tl::enums::UserStatus::LastWeek(_)) => Self::LastWeek,
            Some(tl::enums::UserStatus::LastMonth(_)) => Self::LastMonth,
            Some(_) => Self::Unrecognized,
        }
    }

    /// Returns the display string for this status.
    ///
    /// Offline statuses render their timestamp as an absolute UTC time;
    /// every other variant maps to a fixed label.
    #[must_use]
    pub fn human_readable(&self) -> String {
        match self {
            Self::Unknown => "Unknown".to_owned(),
            Self::Online => "Currently online".to_owned(),
            Self::Offline(was_online) => was_online.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
            Self::Recently => "Last seen recently".to_owned(),
            Self::LastWeek => "Last seen last week".to_owned(),
            Self::LastMonth => "Last seen last month".to_owned(),
            Self::Unrecognized => "Unknown status returned".to_owned(),
        }
    }
}
