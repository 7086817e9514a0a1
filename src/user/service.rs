use crate::database::{Collection, JsonStore};
use crate::user::model::{User, UserIndex, UsersDocument, index_users};
use crate::utils::error::CustomError;

#[derive(Debug, Clone)]
pub struct UserService {
    store: JsonStore,
}

impl UserService {
    pub fn new(store: JsonStore) -> Self {
        UserService { store }
    }

    fn load_document(&self) -> Result<UsersDocument, CustomError> {
        Ok(self.store.load(Collection::Users)?)
    }

    pub fn list(&self) -> Result<Vec<User>, CustomError> {
        Ok(self.load_document()?.users)
    }

    pub fn find(&self, id: &str) -> Result<Option<User>, CustomError> {
        Ok(self.list()?.into_iter().find(|u| u.id == id))
    }

    /// Public author fields of every user, keyed by id.
    pub fn index(&self) -> Result<UserIndex, CustomError> {
        Ok(index_users(&self.list()?))
    }

    /// Record a successful external login: create the user on first sight,
    /// otherwise refresh name and avatar. The admin flag is never touched here.
    pub fn upsert_login(
        &self,
        id: &str,
        name: &str,
        avatar: Option<String>,
    ) -> Result<User, CustomError> {
        let mut document = self.load_document()?;

        let user = match document.users.iter_mut().find(|u| u.id == id) {
            Some(existing) => {
                existing.name = name.to_string();
                existing.avatar = avatar;
                existing.clone()
            }
            None => {
                let user = User {
                    id: id.to_string(),
                    name: name.to_string(),
                    avatar,
                    is_admin: false,
                    extra: Default::default(),
                };
                document.users.push(user.clone());
                log::info!("new user {} ({}) registered", user.id, user.name);
                user
            }
        };

        self.store.save(Collection::Users, &document)?;
        Ok(user)
    }

    pub fn set_admin(&self, id: &str, is_admin: bool) -> Result<User, CustomError> {
        let mut document = self.load_document()?;
        let user = document
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))?;

        user.is_admin = is_admin;
        let updated = user.clone();
        self.store.save(Collection::Users, &document)?;

        log::info!("user {} admin flag set to {}", id, is_admin);
        Ok(updated)
    }
}
