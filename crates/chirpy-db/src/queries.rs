use chirpy_types::Id;
use chirpy_types::models::{Chirp, User};

use crate::error::{Result, StoreError};
use crate::models::{Snapshot, SortOrder};
use crate::Store;

impl Store {
    // -- Chirps --

    /// Store a chirp whose body has already been validated and masked.
    pub fn create_chirp(&self, body: &str, author_id: Id) -> Result<Chirp> {
        self.with_state_mut(|state| {
            let chirp = Chirp {
                id: state.allocate_id()?,
                author_id,
                body: body.to_string(),
            };
            state.chirps.insert(chirp.id, chirp.clone());
            Ok(chirp)
        })
    }

    pub fn get_chirp(&self, id: Id) -> Result<Chirp> {
        self.with_state(|state| state.chirps.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    /// All chirps sorted by id, reversed for [`SortOrder::Desc`], then
    /// narrowed to one author if asked. An author with no chirps yields an
    /// empty list.
    pub fn list_chirps(&self, order: SortOrder, author_id: Option<Id>) -> Result<Vec<Chirp>> {
        let mut chirps = self.with_state(|state| Ok(state.chirps.values().cloned().collect::<Vec<_>>()))?;

        chirps.sort_by_key(|c| c.id);
        if order == SortOrder::Desc {
            chirps.reverse();
        }
        if let Some(author_id) = author_id {
            chirps.retain(|c| c.author_id == author_id);
        }
        Ok(chirps)
    }

    /// Remove a chirp. Ownership is the caller's concern.
    pub fn delete_chirp(&self, id: Id) -> Result<()> {
        self.with_state_mut(|state| {
            state.chirps.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
        })
    }

    // -- Users --

    /// Create a user, hashing `password` before the write lock is taken.
    pub fn create_user(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = self.credentials().hash(password)?;

        self.with_state_mut(|state| {
            if find_by_email(state, email).is_some() {
                return Err(StoreError::EmailTaken);
            }
            let user = User {
                id: state.allocate_id()?,
                email: email.to_string(),
                password_hash,
                is_upgraded: false,
                access_token: String::new(),
                access_token_ttl: 0,
                refresh_token: String::new(),
                refresh_token_ttl: 0,
                refresh_token_expires_at: 0,
            };
            state.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    pub fn get_user(&self, id: Id) -> Result<User> {
        self.with_state(|state| state.users.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    /// Case-insensitive email lookup.
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.with_state(|state| find_by_email(state, email).cloned().ok_or(StoreError::NotFound))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.with_state(|state| Ok(state.users.values().cloned().collect::<Vec<_>>()))?;
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    /// Change email and, when given, the password. Without a new password the
    /// stored hash is kept as is.
    pub fn update_user_profile(
        &self,
        id: Id,
        email: &str,
        new_password: Option<&str>,
    ) -> Result<User> {
        let new_hash = match new_password {
            Some(password) => Some(self.credentials().hash(password)?),
            None => None,
        };

        self.with_state_mut(|state| {
            if find_by_email(state, email).is_some_and(|other| other.id != id) {
                return Err(StoreError::EmailTaken);
            }
            let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
            user.email = email.to_string();
            if let Some(hash) = new_hash {
                user.password_hash = hash;
            }
            Ok(user.clone())
        })
    }

    /// Overwrite the token fields only. The refresh token stays valid for
    /// `refresh_ttl` seconds from now.
    pub fn update_user_tokens(
        &self,
        id: Id,
        access_token: &str,
        access_ttl: i64,
        refresh_token: &str,
        refresh_ttl: i64,
    ) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        self.with_state_mut(|state| {
            let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
            user.access_token = access_token.to_string();
            user.access_token_ttl = access_ttl;
            user.refresh_token = refresh_token.to_string();
            user.refresh_token_ttl = refresh_ttl;
            user.refresh_token_expires_at = now.saturating_add(refresh_ttl);
            Ok(user.clone())
        })
    }

    /// The user currently holding `refresh_token`. Expiry is left to the
    /// caller, which compares `refresh_token_expires_at` against its clock.
    pub fn find_user_by_refresh_token(&self, refresh_token: &str) -> Result<User> {
        if refresh_token.is_empty() {
            return Err(StoreError::NotFound);
        }
        self.with_state(|state| {
            state
                .users
                .values()
                .find(|u| u.refresh_token == refresh_token)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    /// Clear the refresh token from whichever user holds it.
    pub fn revoke_refresh_token(&self, refresh_token: &str) -> Result<()> {
        if refresh_token.is_empty() {
            return Err(StoreError::NotFound);
        }
        self.with_state_mut(|state| {
            let user = state
                .users
                .values_mut()
                .find(|u| u.refresh_token == refresh_token)
                .ok_or(StoreError::NotFound)?;
            user.refresh_token.clear();
            user.refresh_token_ttl = 0;
            user.refresh_token_expires_at = 0;
            Ok(())
        })
    }

    pub fn set_upgraded(&self, id: Id, status: bool) -> Result<User> {
        self.with_state_mut(|state| {
            let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
            user.is_upgraded = status;
            Ok(user.clone())
        })
    }
}

fn find_by_email<'a>(state: &'a Snapshot, email: &str) -> Option<&'a User> {
    let wanted = email.to_lowercase();
    state
        .users
        .values()
        .find(|u| u.email.to_lowercase() == wanted)
}
