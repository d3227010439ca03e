//! Telegram client wrapper for phone number lookups.

use std::sync::Arc;

use grammers_client::{Client, InvocationError, SenderPool, SignInError, sender};
use grammers_session::storages::SqliteSession;
use grammers_tl_types as tl;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::CheckerConfig;
use crate::lookup::{ImportedContact, LookupApi, LookupOutcome, ProfileRecord};

/// Re-export types for external use.
pub use grammers_client::client::{LoginToken, PasswordToken};

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Password required for 2FA")]
    PasswordRequired(PasswordToken),

    #[error("Invalid password")]
    InvalidPassword(PasswordToken),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        Self::Invocation(err.to_string())
    }
}

/// Checks whether an invocation error means "no account for this phone".
///
/// `PHONE_NOT_OCCUPIED` is the documented response for unregistered
/// numbers; `PHONE_NUMBER_INVALID` covers garbage input the service
/// refuses to parse. Both are expected outcomes, not failures.
fn is_phone_not_found(err: &InvocationError) -> bool {
    let err_str = err.to_string();
    err_str.contains("PHONE_NOT_OCCUPIED") || err_str.contains("PHONE_NUMBER_INVALID")
}

/// High-level Telegram client wrapper.
pub struct LookupClient {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl LookupClient {
    /// Connects to Telegram with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be opened or the
    /// connection fails.
    pub async fn connect(config: &CheckerConfig) -> Result<Self, TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates: _updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        // Spawn the sender pool runner
        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))?;

        info!("Connected to Telegram. Authorized: {}", is_authorized);

        Ok(Self {
            client,
            handle: handle.thin,
            _pool_task: pool_task,
        })
    }

    /// Checks if the client is authorized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Requests a login code to be sent to the phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn request_login_code(
        &self,
        phone: &str,
        api_hash: &str,
    ) -> Result<LoginToken, TelegramError> {
        info!("Requesting login code for phone: {}...", mask_phone(phone));

        self.client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| TelegramError::SignInFailed(e.to_string()))
    }

    /// Signs in with the login code.
    ///
    /// # Errors
    ///
    /// Returns an error if sign in fails.
    pub async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<(), TelegramError> {
        info!("Signing in with login code...");

        match self.client.sign_in(token, code).await {
            Ok(_user) => {
                info!("Successfully signed in!");
                Ok(())
            }
            Err(SignInError::PasswordRequired(password_token)) => {
                debug!("2FA password required, hint: {:?}", password_token.hint());
                Err(TelegramError::PasswordRequired(password_token))
            }
            Err(SignInError::InvalidCode) => {
                Err(TelegramError::SignInFailed("Invalid code".to_owned()))
            }
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    /// Checks the 2FA password.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is invalid.
    pub async fn check_password(
        &self,
        password_token: PasswordToken,
        password: &str,
    ) -> Result<(), TelegramError> {
        info!("Checking 2FA password...");

        match self.client.check_password(password_token, password).await {
            Ok(_user) => {
                info!("Successfully authenticated with 2FA!");
                Ok(())
            }
            Err(SignInError::InvalidPassword(token)) => Err(TelegramError::InvalidPassword(token)),
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    /// Resolves a phone number to its account id and access hash.
    ///
    /// Returns `None` when no Telegram account is associated with the
    /// number. The number must already be a contact for the resolution
    /// to succeed, which the lookup workflow guarantees.
    async fn resolve_phone(&self, phone: &str) -> Result<Option<(i64, i64)>, TelegramError> {
        let request = tl::functions::contacts::ResolvePhone {
            phone: phone.to_owned(),
        };

        match self.client.invoke(&request).await {
            Ok(resolved) => {
                let tl::enums::contacts::ResolvedPeer::Peer(resolved) = resolved;

                let tl::enums::Peer::User(peer) = resolved.peer else {
                    return Ok(None);
                };

                let access_hash = resolved.users.iter().find_map(|user| match user {
                    tl::enums::User::User(user) if user.id == peer.user_id => user.access_hash,
                    _ => None,
                });

                Ok(Some((peer.user_id, access_hash.unwrap_or_default())))
            }
            Err(err) if is_phone_not_found(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches the full user object for a resolved account.
    async fn full_user(
        &self,
        user_id: i64,
        access_hash: i64,
    ) -> Result<tl::types::User, TelegramError> {
        let request = tl::functions::users::GetFullUser {
            id: tl::enums::InputUser::User(tl::types::InputUser {
                user_id,
                access_hash,
            }),
        };

        let tl::enums::users::UserFull::Full(full) = self.client.invoke(&request).await?;

        full.users
            .into_iter()
            .find_map(|user| match user {
                tl::enums::User::User(user) if user.id == user_id => Some(user),
                _ => None,
            })
            .ok_or_else(|| {
                TelegramError::Invocation(format!(
                    "full user response did not include user {user_id}"
                ))
            })
    }

    /// Disconnects from Telegram.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

impl LookupApi for LookupClient {
    async fn contact_phones(&self) -> Result<Vec<String>, TelegramError> {
        debug!("Fetching contact list...");

        let request = tl::functions::contacts::GetContacts { hash: 0 };

        match self.client.invoke(&request).await? {
            tl::enums::contacts::Contacts::Contacts(contacts) => Ok(contacts
                .users
                .iter()
                .filter_map(|user| match user {
                    tl::enums::User::User(user) => user.phone.clone(),
                    tl::enums::User::Empty(_) => None,
                })
                .collect()),
            tl::enums::contacts::Contacts::NotModified => Ok(Vec::new()),
        }
    }

    async fn import_contacts(
        &self,
        phones: &[String],
    ) -> Result<Vec<ImportedContact>, TelegramError> {
        debug!("Importing {} contact(s)...", phones.len());

        let contacts = phones
            .iter()
            .map(|phone| {
                tl::enums::InputContact::InputPhoneContact(tl::types::InputPhoneContact {
                    client_id: 0,
                    phone: phone.clone(),
                    first_name: String::new(),
                    last_name: String::new(),
                    note: None,
                })
            })
            .collect();

        let request = tl::functions::contacts::ImportContacts { contacts };
        let tl::enums::contacts::ImportedContacts::Contacts(imported) =
            self.client.invoke(&request).await?;

        Ok(imported
            .users
            .iter()
            .filter_map(|user| match user {
                tl::enums::User::User(user) => Some(ImportedContact {
                    user_id: user.id,
                    access_hash: user.access_hash.unwrap_or_default(),
                    phone: user.phone.clone().unwrap_or_default(),
                }),
                tl::enums::User::Empty(_) => None,
            })
            .collect())
    }

    async fn delete_contacts(&self, contacts: &[ImportedContact]) -> Result<(), TelegramError> {
        debug!("Deleting {} temporary contact(s)...", contacts.len());

        let id = contacts
            .iter()
            .map(|contact| {
                tl::enums::InputUser::User(tl::types::InputUser {
                    user_id: contact.user_id,
                    access_hash: contact.access_hash,
                })
            })
            .collect();

        let request = tl::functions::contacts::DeleteContacts { id };
        self.client
            .invoke(&request)
            .await
            .map(|_updates| ())
            .map_err(Into::into)
    }

    async fn fetch_profile(&self, phone: &str) -> Result<LookupOutcome, TelegramError> {
        println!("Checking {phone} ...");

        let Some((user_id, access_hash)) = self.resolve_phone(phone).await? else {
            println!("Could not find a Telegram account associated with {phone}");
            return Ok(LookupOutcome::NoAccount);
        };

        let user = self.full_user(user_id, access_hash).await?;
        Ok(LookupOutcome::Account(Box::new(ProfileRecord::from_user(
            user_id, &user,
        ))))
    }
}

impl std::fmt::Debug for LookupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupClient").finish_non_exhaustive()
    }
}

/// Masks a phone number for logging (shows last 4 digits).
fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > 4 {
        format!("***{}", &digits[digits.len() - 4..])
    } else {
        "****".to_owned()
    }
}
