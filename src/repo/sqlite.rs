//! SQLite backend. SQLite has no decimal type, so money columns are stored as
//! TEXT and parsed back into [`Decimal`] on the way out.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{DbConnection, LedgerTx};
use crate::account::model::{Account, NewAccount};
use crate::transaction::model::{NewTransactionRecord, TransactionRecord, TransactionType};
use crate::user::model::User;

const USER_COLUMNS: &str = "id, user_name, first_name, last_name, password_salt, password_hash";
const ACCOUNT_COLUMNS: &str = "id, account_number, name, owner_id, balance";
const RECORD_COLUMNS: &str = "id, receiving_account_number, sending_account_number, amount, \
     timestamp, transaction_type, account_id, account_balance, message";

/// Statements creating the ledger tables.
pub const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_name TEXT UNIQUE NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        password_salt BLOB NOT NULL,
        password_hash TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_number INTEGER UNIQUE NOT NULL,
        name TEXT NOT NULL,
        owner_id INTEGER NOT NULL REFERENCES users (id),
        balance TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS transaction_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        receiving_account_number INTEGER NOT NULL,
        sending_account_number INTEGER,
        amount TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        transaction_type TEXT NOT NULL,
        account_id INTEGER NOT NULL REFERENCES accounts (id),
        account_balance TEXT NOT NULL,
        message TEXT
    )"#,
];

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

fn parse_decimal(raw: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    account_number: i32,
    name: String,
    owner_id: i32,
    balance: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = sqlx::Error;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            account_number: row.account_number,
            name: row.name,
            owner_id: row.owner_id,
            balance: parse_decimal(&row.balance)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i32,
    receiving_account_number: i32,
    sending_account_number: Option<i32>,
    amount: String,
    timestamp: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    transaction_type: TransactionType,
    account_id: i32,
    account_balance: String,
    message: Option<String>,
}

impl TryFrom<RecordRow> for TransactionRecord {
    type Error = sqlx::Error;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(TransactionRecord {
            id: row.id,
            receiving_account_number: row.receiving_account_number,
            sending_account_number: row.sending_account_number,
            amount: parse_decimal(&row.amount)?,
            timestamp: row.timestamp,
            transaction_type: row.transaction_type,
            account_id: row.account_id,
            account_balance: parse_decimal(&row.account_balance)?,
            message: row.message,
        })
    }
}

#[async_trait]
impl DbConnection for SqlitePool {
    type Tx = Transaction<'static, Sqlite>;

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
impl LedgerTx for Transaction<'static, Sqlite> {
    async fn fetch_user_by_id(&mut self, id: i32) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut **self)
            .await
    }

    async fn fetch_user_by_user_name(
        &mut self,
        user_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_name = ?"
        ))
        .bind(user_name)
        .fetch_optional(&mut **self)
        .await
    }

    async fn fetch_users(&mut self, take: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ?"))
            .bind(take)
            .fetch_all(&mut **self)
            .await
    }

    async fn insert_user(&mut self, user: &User) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (user_name, first_name, last_name, password_salt, password_hash)
            VALUES (?, ?, ?, ?, ?)
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
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut **self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut **self)
        .await?
        .map(Account::try_from)
        .transpose()
    }

    async fn lock_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error> {
        self.fetch_account_by_id(id).await
    }

    async fn fetch_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = ?"
        ))
        .bind(account_number)
        .fetch_optional(&mut **self)
        .await?
        .map(Account::try_from)
        .transpose()
    }

    // SQLite locks the whole database on the first write of a transaction, so
    // a plain read is the closest equivalent of a row lock here. The same
    // holds for the other lock_* methods.
    async fn lock_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        self.fetch_account_by_number(account_number).await
    }

    async fn fetch_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE owner_id = ? ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&mut **self)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect()
    }

    async fn lock_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE owner_id = ? ORDER BY account_number"
        ))
        .bind(owner_id)
        .fetch_all(&mut **self)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect()
    }

    async fn insert_account(&mut self, account: &NewAccount) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO accounts (account_number, name, owner_id, balance)
            VALUES (?, ?, ?, ?)
            RETURNING id"#,
        )
        .bind(account.account_number)
        .bind(&account.name)
        .bind(account.owner_id)
        .bind(account.balance.to_string())
        .fetch_one(&mut **self)
        .await?;
        Ok(row.0)
    }

    async fn update_balance(
        &mut self,
        account_id: i32,
        balance: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
            .bind(balance.to_string())
            .bind(account_id)
            .execute(&mut **self)
            .await?;
        Ok(())
    }

    async fn delete_account(&mut self, id: i32) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM transaction_records WHERE account_id = ?")
            .bind(id)
            .execute(&mut **self)
            .await?;
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
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
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id"#,
        )
        .bind(record.receiving_account_number)
        .bind(record.sending_account_number)
        .bind(record.amount.to_string())
        .bind(record.timestamp)
        .bind(record.transaction_type.as_str())
        .bind(record.account_id)
        .bind(record.account_balance.to_string())
        .bind(&record.message)
        .fetch_one(&mut **self)
        .await?;
        Ok(row.0)
    }

    async fn fetch_record(&mut self, id: i32) -> Result<Option<TransactionRecord>, sqlx::Error> {
        sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut **self)
        .await?
        .map(TransactionRecord::try_from)
        .transpose()
    }

    async fn fetch_records_by_account(
        &mut self,
        account_id: i32,
    ) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM transaction_records WHERE account_id = ? ORDER BY id"
        ))
        .bind(account_id)
        .fetch_all(&mut **self)
        .await?
        .into_iter()
        .map(TransactionRecord::try_from)
        .collect()
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        Transaction::commit(self).await
    }
}
