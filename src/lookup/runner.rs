//! Lookup batch orchestration.
//!
//! The workflow over one batch of numbers:
//! 1. Determine which numbers are not yet contacts
//! 2. Import those as temporary contacts
//! 3. Fetch every profile, strictly one after another
//! 4. Remove the temporary contacts, on every exit path
//!
//! A fetch error aborts the batch with no partial result, but only after
//! the cleanup step has run. Cleanup is attempted exactly once; if it
//! fails, its error supersedes an in-flight fetch error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::{LookupApi, LookupOutcome, contacts};
use crate::telegram::TelegramError;

/// Mapping from each queried phone number to its lookup outcome.
pub type ResultSet = BTreeMap<String, LookupOutcome>;

/// Parses a comma-separated phone number list into a deduplicated set.
///
/// Spaces are removed before splitting; empty segments are dropped.
#[must_use]
pub fn parse_numbers(raw: &str) -> BTreeSet<String> {
    raw.replace(' ', "")
        .split(',')
        .filter(|number| !number.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Runs the full lookup workflow over a deduplicated set of numbers.
///
/// Owns the temporary contacts created for the run and removes them
/// before returning, whether the fetch phase succeeded or failed.
pub async fn run_lookup<A: LookupApi>(
    api: &A,
    numbers: &BTreeSet<String>,
) -> Result<ResultSet, TelegramError> {
    let missing = contacts::missing_from_contacts(api, numbers).await?;
    debug!("{} of {} numbers are not yet contacts", missing.len(), numbers.len());

    let imported = if missing.is_empty() {
        Vec::new()
    } else {
        contacts::import_temporary(api, &missing).await?
    };

    let outcome = fetch_all(api, numbers).await;

    if !imported.is_empty() {
        if outcome.is_err() {
            warn!("Lookup failed, removing temporary contacts before propagating");
        }
        contacts::remove_temporary(api, &imported).await?;
    }

    outcome
}

async fn fetch_all<A: LookupApi>(
    api: &A,
    numbers: &BTreeSet<String>,
) -> Result<ResultSet, TelegramError> {
    let mut results = ResultSet::new();
    for number in numbers {
        let outcome = api.fetch_profile(number).await?;
        results.insert(number.clone(), outcome);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::lookup::{ImportedContact, ProfileRecord, normalize_phone};

    /// In-memory stand-in for the remote service.
    struct FakeApi {
        /// Phones currently in the contact list.
        contacts: RefCell<Vec<String>>,

        /// Phones that correspond to real accounts, with their ids.
        accounts: Vec<(String, i64)>,

        /// Phone whose profile fetch fails with a remote error.
        fail_on: Option<String>,

        /// Every phone ever submitted to `import_contacts`.
        imports: RefCell<Vec<String>>,

        /// Every phone ever submitted to `delete_contacts`.
        deletes: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn new(contacts: &[&str], accounts: &[(&str, i64)]) -> Self {
            Self {
                contacts: RefCell::new(contacts.iter().map(ToString::to_string).collect()),
                accounts: accounts
                    .iter()
                    .map(|(phone, id)| ((*phone).to_owned(), *id))
                    .collect(),
                fail_on: None,
                imports: RefCell::new(Vec::new()),
                deletes: RefCell::new(Vec::new()),
            }
        }

        fn failing_on(mut self, phone: &str) -> Self {
            self.fail_on = Some(phone.to_owned());
            self
        }

        fn account_id(&self, phone: &str) -> Option<i64> {
            let target = normalize_phone(phone);
            self.accounts
                .iter()
                .find(|(known, _)| normalize_phone(known) == target)
                .map(|(_, id)| *id)
        }

        fn contact_list(&self) -> Vec<String> {
            self.contacts.borrow().clone()
        }

        fn record(id: i64, phone: &str) -> ProfileRecord {
            ProfileRecord {
                id,
                username: None,
                usernames: Vec::new(),
                first_name: Some("Test".to_owned()),
                last_name: None,
                fake: false,
                verified: false,
                premium: false,
                mutual_contact: false,
                bot: false,
                bot_chat_history: false,
                restricted: false,
                restriction_reason: Vec::new(),
                user_was_online: "Last seen recently".to_owned(),
                deleted: false,
                phone: Some(normalize_phone(phone)),
            }
        }
    }

    impl LookupApi for FakeApi {
        async fn contact_phones(&self) -> Result<Vec<String>, TelegramError> {
            Ok(self.contact_list())
        }

        async fn import_contacts(
            &self,
            phones: &[String],
        ) -> Result<Vec<ImportedContact>, TelegramError> {
            self.imports.borrow_mut().extend(phones.iter().cloned());

            // As on the real service, numbers without an account are
            // accepted but create no contact entry.
            let mut created = Vec::new();
            for phone in phones {
                if let Some(id) = self.account_id(phone) {
                    self.contacts.borrow_mut().push(phone.clone());
                    created.push(ImportedContact {
                        user_id: id,
                        access_hash: id.wrapping_mul(31),
                        phone: normalize_phone(phone),
                    });
                }
            }
            Ok(created)
        }

        async fn delete_contacts(
            &self,
            contacts: &[ImportedContact],
        ) -> Result<(), TelegramError> {
            for contact in contacts {
                self.deletes.borrow_mut().push(contact.phone.clone());
                let target = normalize_phone(&contact.phone);
                self.contacts
                    .borrow_mut()
                    .retain(|phone| normalize_phone(phone) != target);
            }
            Ok(())
        }

        async fn fetch_profile(&self, phone: &str) -> Result<LookupOutcome, TelegramError> {
            if self.fail_on.as_deref() == Some(phone) {
                return Err(TelegramError::Invocation(
                    "rpc error 500: INTERNAL_SERVER_ERROR".to_owned(),
                ));
            }
            Ok(match self.account_id(phone) {
                Some(id) => LookupOutcome::Account(Box::new(Self::record(id, phone))),
                None => LookupOutcome::NoAccount,
            })
        }
    }

    #[test]
    fn test_parse_numbers_deduplicates() {
        let numbers = parse_numbers("+1555,+1555, +1555");
        assert_eq!(numbers.len(), 1);
        assert!(numbers.contains("+1555"));
    }

    #[test]
    fn test_parse_numbers_strips_spaces_and_empty_segments() {
        let numbers = parse_numbers(" +1 555 0100 ,, +49 30 901820 ,");
        assert_eq!(numbers.len(), 2);
        assert!(numbers.contains("+15550100"));
        assert!(numbers.contains("+4930901820"));
    }

    #[test]
    fn test_parse_numbers_empty_input() {
        assert!(parse_numbers("").is_empty());
    }

    #[tokio::test]
    async fn test_existing_contacts_are_not_imported() {
        let api = FakeApi::new(&["15550100"], &[("+15550100", 7)]);
        let numbers = parse_numbers("+15550100");

        let results = run_lookup(&api, &numbers).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(api.imports.borrow().is_empty());
        assert!(api.deletes.borrow().is_empty());
        assert_eq!(api.contact_list(), vec!["15550100".to_owned()]);
    }

    #[tokio::test]
    async fn test_temporary_contacts_are_removed_after_success() {
        let api = FakeApi::new(&[], &[("+15550100", 7)]);
        let numbers = parse_numbers("+15550100");

        let results = run_lookup(&api, &numbers).await.unwrap();

        match results.get("+15550100") {
            Some(LookupOutcome::Account(record)) => assert_eq!(record.id, 7),
            other => panic!("expected an account record, got {other:?}"),
        }
        assert!(api.contact_list().is_empty());
        assert_eq!(api.deletes.borrow().as_slice(), ["15550100".to_owned()]);
    }

    #[tokio::test]
    async fn test_unknown_number_yields_empty_record() {
        let api = FakeApi::new(&[], &[]);
        let numbers = parse_numbers("+15551234567");

        let results = run_lookup(&api, &numbers).await.unwrap();

        assert_eq!(results.get("+15551234567"), Some(&LookupOutcome::NoAccount));
        // The number never became a lasting contact.
        assert!(api.contact_list().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_still_removes_temporary_contacts() {
        let api = FakeApi::new(
            &[],
            &[("+15550001", 1), ("+15550002", 2), ("+15550003", 3)],
        )
        .failing_on("+15550002");
        let numbers = parse_numbers("+15550001,+15550002,+15550003");

        let result = run_lookup(&api, &numbers).await;

        assert!(matches!(result, Err(TelegramError::Invocation(_))));
        assert!(api.contact_list().is_empty());
        assert_eq!(api.deletes.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_mixed_batch_restores_original_contact_list() {
        let api = FakeApi::new(&["15550100"], &[("+15550100", 1), ("+15550101", 2)]);
        let numbers = parse_numbers("+15550100,+15550101,+15550199");

        let results = run_lookup(&api, &numbers).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results.get("+15550199"), Some(&LookupOutcome::NoAccount));

        // Only the numbers missing from the contact list were imported.
        let imports = api.imports.borrow();
        assert!(imports.contains(&"+15550101".to_owned()));
        assert!(imports.contains(&"+15550199".to_owned()));
        assert!(!imports.contains(&"+15550100".to_owned()));

        // Pre-existing contacts survive, temporary ones are gone.
        assert_eq!(api.contact_list(), vec!["15550100".to_owned()]);
    }
}
