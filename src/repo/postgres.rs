use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use super::{DbConnection, LedgerTx};
use crate::account::model::{Account, NewAccount};
use crate::transaction::model::{NewTransactionRecord, TransactionRecord};
use crate::user::model::User;

const USER_COLUMNS: &str = "id, user_name, first_name, last_name, password_salt, password_hash";
const ACCOUNT_COLUMNS: &str = "id, account_number, name, owner_id, balance";
const RECORD_COLUMNS: &str = "id, receiving_account_number, sending_account_number, amount, \
     timestamp, transaction_type, account_id, account_balance, message";

#[async_trait]
impl DbConnection for PgPool {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error> {
        self.print_pool_stats();
        sqlx::Pool::begin(self).await
    }

    fn print_pool_stats(&self) {
        tracing::debug!(
            total = self.size(),
            idle = self.num_idle(),
            active = self.size() - self.num_idle() as u32,
            "db pool stats"
        );
    }
}

#[async_trait]
impl LedgerTx for Transaction<'static, Postgres> {
    async fn fetch_user_by_id(&mut self, id: i32) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut **self)
            .await
    }

    async fn fetch_user_by_user_name(
        &mut self,
        user_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = $1"
        ))
        .bind(user_name)
        .fetch_optional(&mut **self)
        .await
    }

    async fn fetch_users(&mut self, take: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1"
        ))
        .bind(take)
        .fetch_all(&mut **self)
        .await
    }

    async fn insert_user(&mut self, user: &User) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (user_name, first_name, last_name, password_salt, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id"#,
        )
        .bind(&user.user_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_salt)
        .bind(&user.password_hash)
        .fetch_one(&mut **self)
        .await?;
        Ok(row.0)
    }

    async fn delete_user(&mut self, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut **self)
        .await
    }

    async fn lock_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **self)
        .await
    }

    async fn fetch_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = $1"
        ))
        .bind(account_number)
        .fetch_optional(&mut **self)
        .await
    }

    async fn lock_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = $1 FOR UPDATE"
        ))
        .bind(account_number)
        .fetch_optional(&mut **self)
        .await
    }

    async fn fetch_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&mut **self)
        .await
    }

    // Same lock order as transfers: ascending account number.
    async fn lock_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE owner_id = $1 \
             ORDER BY account_number FOR UPDATE"
        ))
        .bind(owner_id)
        .fetch_all(&mut **self)
        .await
    }

    async fn insert_account(&mut self, account: &NewAccount) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO accounts (account_number, name, owner_id, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id"#,
        )
        .bind(account.account_number)
        .bind(&account.name)
        .bind(account.owner_id)
        .bind(account.balance)
        .fetch_one(&mut **self)
        .await?;
        Ok(row.0)
    }

    async fn update_balance(
        &mut self,
        account_id: i32,
        balance: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(account_id)
            .execute(&mut **self)
            .await?;
        Ok(())
    }

    async fn delete_account(&mut self, id: i32) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM transaction_records WHERE account_id = $1")
            .bind(id)
            .execute(&mut **self)
            .await?;
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut **self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_record(&mut self, record: &NewTransactionRecord) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO transaction_records (
                receiving_account_number, sending_account_number, amount, timestamp,
                transaction_type, account_id, account_balance, message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id"#,
        )
        .bind(record.receiving_account_number)
        .bind(record.sending_account_number)
        .bind(record.amount)
        .bind(record.timestamp)
        .bind(record.transaction_type.as_str())
        .bind(record.account_id)
        .bind(record.account_balance)
        .bind(&record.message)
        .fetch_one(&mut **self)
        .await?;
        Ok(row.0)
    }

    async fn fetch_record(&mut self, id: i32) -> Result<Option<TransactionRecord>, sqlx::Error> {
        sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut **self)
        .await
    }

    async fn fetch_records_by_account(
        &mut self,
        account_id: i32,
    ) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records WHERE account_id = $1 ORDER BY id"
        ))
        .bind(account_id)
        .fetch_all(&mut **self)
        .await
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        Transaction::commit(self).await
    }
}
