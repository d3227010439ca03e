//! Contact list reconciliation.
//!
//! Telegram only returns rich profile data for contacts, so numbers that
//! are not already in the contact list are imported before the lookup and
//! removed again afterwards, leaving the permanent contact list untouched.

use std::collections::BTreeSet;

use tracing::debug;

use super::LookupApi;
use crate::telegram::TelegramError;

/// A contact created for the duration of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedContact {
    /// Account identifier of the created contact.
    pub user_id: i64,

    /// Access credential required to delete the contact again.
    pub access_hash: i64,

    /// Phone number the service reports for the contact.
    pub phone: String,
}

/// Normalizes a phone number for contact-list comparison.
///
/// Strips spaces and `+` so that `+1 555 0100` and `15550100` compare
/// equal.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ' && *c != '+').collect()
}

fn is_known(contact_phones: &[String], phone: &str) -> bool {
    let target = normalize_phone(phone);
    contact_phones
        .iter()
        .any(|contact| normalize_phone(contact) == target)
}

/// Checks whether a phone number is already in the contact list.
pub async fn is_contact<A: LookupApi>(api: &A, phone: &str) -> Result<bool, TelegramError> {
    let known = api.contact_phones().await?;
    Ok(is_known(&known, phone))
}

/// Returns the subset of `numbers` that are not currently contacts.
///
/// The contact list is fetched once for the whole batch; membership is
/// checked locally by normalized phone equality.
pub async fn missing_from_contacts<A: LookupApi>(
    api: &A,
    numbers: &BTreeSet<String>,
) -> Result<BTreeSet<String>, TelegramError> {
    let known = api.contact_phones().await?;
    Ok(numbers
        .iter()
        .filter(|number| !is_known(&known, number))
        .cloned()
        .collect())
}

/// Imports the given numbers as temporary contacts.
///
/// Numbers without an associated account are accepted by the service but
/// produce no contact entry; only actually created contacts are returned.
pub async fn import_temporary<A: LookupApi>(
    api: &A,
    numbers: &BTreeSet<String>,
) -> Result<Vec<ImportedContact>, TelegramError> {
    let phones: Vec<String> = numbers.iter().cloned().collect();
    println!("Temporarily adding {} to the contact list.", phones.join(", "));

    let imported = api.import_contacts(&phones).await?;

    let added: Vec<&str> = imported.iter().map(|contact| contact.phone.as_str()).collect();
    println!("Successfully added {} to the contact list.", added.join(", "));
    debug!("Imported {} of {} submitted numbers", imported.len(), phones.len());

    Ok(imported)
}

/// Deletes exactly the contacts created by [`import_temporary`] this run.
pub async fn remove_temporary<A: LookupApi>(
    api: &A,
    imported: &[ImportedContact],
) -> Result<(), TelegramError> {
    println!("Removing users temporarily added to the contact list.");
    api.delete_contacts(imported).await
}
