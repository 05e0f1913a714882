use rust_decimal::Decimal;

use super::model::{Account, AccountStatus, DeleteStatus, NewAccount};
use crate::constants::MAX_ACCOUNT_NUMBER_ATTEMPTS;
use crate::error::{CustomError, is_unique_violation};
use crate::repo::{DbConnection, LedgerTx};
use crate::utils::{generate_account_number, validate_account_name, validate_owner_id};

type NumberGenerator = Box<dyn Fn() -> i32 + Send + Sync>;

pub struct AccountService<DB: DbConnection> {
    db: DB,
    next_number: NumberGenerator,
}

impl<DB: DbConnection> AccountService<DB> {
    pub fn new(db: DB) -> Self {
        Self::with_number_generator(db, generate_account_number)
    }

    pub fn with_number_generator<F>(db: DB, next_number: F) -> Self
    where
        F: Fn() -> i32 + Send + Sync + 'static,
    {
        AccountService {
            db,
            next_number: Box::new(next_number),
        }
    }

    /// Opens an empty account for an existing user.
    ///
    /// Candidate numbers that are already taken are redrawn, up to
    /// `MAX_ACCOUNT_NUMBER_ATTEMPTS` times.
    pub async fn create_account(
        &self,
        name: &str,
        owner_id: i32,
    ) -> Result<(Option<Account>, AccountStatus), CustomError> {
        if !validate_account_name(name) {
            tracing::warn!(name, "invalid account name");
            return Ok((None, AccountStatus::InvalidAccountName));
        }
        if !validate_owner_id(owner_id) {
            tracing::warn!(owner_id, "invalid owner id");
            return Ok((None, AccountStatus::InvalidOwnerId));
        }

        let mut tx = self.db.begin().await?;
        let owner = tx.fetch_user_by_id(owner_id).await?;
        tx.commit().await?;
        if owner.is_none() {
            tracing::warn!(owner_id, "owner not found");
            return Ok((None, AccountStatus::NotFound));
        }

        // Each draw gets its own unit of work: a failed insert poisons a
        // PostgreSQL transaction, so a lost race is retried from scratch.
        for _ in 0..MAX_ACCOUNT_NUMBER_ATTEMPTS {
            let account_number = (self.next_number)();
            let mut tx = self.db.begin().await?;
            if tx.fetch_account_by_number(account_number).await?.is_some() {
                tracing::debug!(account_number, "account number taken, drawing another");
                continue;
            }

            let new_account = NewAccount::new(account_number, name, owner_id);
            let id = match tx.insert_account(&new_account).await {
                Ok(id) => id,
                Err(err) if is_unique_violation(&err) => {
                    tracing::debug!(account_number, "account number claimed concurrently");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            tx.commit().await?;

            tracing::info!(id, account_number, owner_id, "account created");
            return Ok((Some(new_account.into_account(id)), AccountStatus::Valid));
        }

        tracing::error!(owner_id, "no free account number found");
        Err(CustomError::AccountNumberExhausted)
    }

    pub async fn get_account(&self, id: i32) -> Result<Option<Account>, CustomError> {
        let mut tx = self.db.begin().await?;
        let account = tx.fetch_account_by_id(id).await?;
        tx.commit().await?;
        Ok(account)
    }

    pub async fn get_account_by_number(
        &self,
        account_number: i32,
    ) -> Result<Option<Account>, CustomError> {
        let mut tx = self.db.begin().await?;
        let account = tx.fetch_account_by_number(account_number).await?;
        tx.commit().await?;
        Ok(account)
    }

    pub async fn get_accounts_by_owner(&self, owner_id: i32) -> Result<Vec<Account>, CustomError> {
        let mut tx = self.db.begin().await?;
        let accounts = tx.fetch_accounts_by_owner(owner_id).await?;
        tx.commit().await?;
        Ok(accounts)
    }

    /// Deletes an empty account along with its ledger rows.
    pub async fn delete_account(&self, id: i32) -> Result<DeleteStatus, CustomError> {
        let mut tx = self.db.begin().await?;
        let Some(account) = tx.lock_account_by_id(id).await? else {
            return Ok(DeleteStatus::NotFound);
        };
        if account.balance != Decimal::ZERO {
            tracing::warn!(id, balance = %account.balance, "account still holds funds");
            return Ok(DeleteStatus::FundsRemaining);
        }

        tx.delete_account(id).await?;
        tx.commit().await?;
        tracing::info!(id, account_number = account.account_number, "account deleted");
        Ok(DeleteStatus::Deleted)
    }
}
