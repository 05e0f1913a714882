use rust_decimal::Decimal;

use super::model::{User, UserValidationStatus};
use super::validator::validate_user;
use crate::account::model::DeleteStatus;
use crate::error::{CustomError, map_user_insert_error};
use crate::repo::{DbConnection, LedgerTx};
use crate::utils::{generate_salt, hash_password, is_password_valid};

pub struct UserService<DB: DbConnection> {
    db: DB,
}

impl<DB: DbConnection> UserService<DB> {
    pub fn new(db: DB) -> Self {
        UserService { db }
    }

    /// Validates and stores a new user.
    ///
    /// The user is built (salt and hash included) before validation so that a
    /// rejected registration can still be echoed back; only a `Valid` user is
    /// written and carries an `id`.
    pub async fn register(
        &self,
        user_name: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<(User, UserValidationStatus), CustomError> {
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);
        let mut user = User::new(user_name, first_name, last_name, salt.to_vec(), password_hash);

        let status = validate_user(user_name, first_name, last_name, password);
        if status != UserValidationStatus::Valid {
            tracing::warn!(user_name, ?status, "registration rejected");
            return Ok((user, status));
        }

        match self.insert_unique(&user).await {
            Ok(id) => {
                user.id = Some(id);
                tracing::info!(user_name, id, "user registered");
                Ok((user, UserValidationStatus::Valid))
            }
            Err(CustomError::UsernameExists) => {
                tracing::warn!(user_name, "registration rejected, user name taken");
                Ok((user, UserValidationStatus::UserNameAlreadyTaken))
            }
            Err(err) => {
                tracing::error!(user_name, error = ?err, "registration failed");
                Err(err)
            }
        }
    }

    async fn insert_unique(&self, user: &User) -> Result<i32, CustomError> {
        let mut tx = self.db.begin().await?;
        if tx.fetch_user_by_user_name(&user.user_name).await?.is_some() {
            return Err(CustomError::UsernameExists);
        }
        let id = tx.insert_user(user).await.map_err(map_user_insert_error)?;
        tx.commit().await.map_err(map_user_insert_error)?;
        Ok(id)
    }

    /// Returns `true` when the password hashes to the stored digest.
    pub async fn authorize_login(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<bool, CustomError> {
        let mut tx = self.db.begin().await?;
        let stored = tx.fetch_user_by_user_name(user_name).await?;
        tx.commit().await?;

        let Some(stored) = stored else {
            tracing::info!(user_name, "login for unknown user");
            return Ok(false);
        };
        let authorized = is_password_valid(password, &stored.password_salt, &stored.password_hash);
        if !authorized {
            tracing::info!(user_name, "wrong password");
        }
        Ok(authorized)
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, CustomError> {
        let mut tx = self.db.begin().await?;
        let user = tx.fetch_user_by_id(id).await?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn get_users(&self, take: i64) -> Result<Vec<User>, CustomError> {
        let mut tx = self.db.begin().await?;
        let users = tx.fetch_users(take.max(0)).await?;
        tx.commit().await?;
        Ok(users)
    }

    /// Removes a user and every account it owns.
    ///
    /// Refused with `FundsRemaining` while any of those accounts holds money.
    pub async fn delete_user(&self, id: i32) -> Result<DeleteStatus, CustomError> {
        let mut tx = self.db.begin().await?;
        if tx.fetch_user_by_id(id).await?.is_none() {
            return Ok(DeleteStatus::NotFound);
        }

        let accounts = tx.lock_accounts_by_owner(id).await?;
        if accounts.iter().any(|account| account.balance != Decimal::ZERO) {
            tracing::warn!(user_id = id, "user still owns funded accounts");
            return Ok(DeleteStatus::FundsRemaining);
        }
        for account in &accounts {
            tx.delete_account(account.id).await?;
        }
        tx.delete_user(id).await?;
        tx.commit().await?;

        tracing::info!(user_id = id, accounts = accounts.len(), "user deleted");
        Ok(DeleteStatus::Deleted)
    }
}
