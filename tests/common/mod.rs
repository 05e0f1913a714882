#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bank_ledger::account::model::{Account, NewAccount};
use bank_ledger::repo::sqlite::create_schema;
use bank_ledger::repo::{DbConnection, LedgerTx};
use bank_ledger::transaction::model::{NewTransactionRecord, TransactionRecord};
use bank_ledger::user::model::User;
use bank_ledger::utils::{generate_salt, hash_password};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// One connection that never expires, so the in-memory database lives as long
/// as the pool.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite DB");

    create_schema(&pool).await.expect("Failed to create test tables");
    pool
}

pub async fn seed_user(pool: &SqlitePool, user_name: &str) -> i32 {
    let salt = generate_salt();
    let password_hash = hash_password("Passw0rd!", &salt);
    let user = User::new(user_name, "Test", "Användare", salt.to_vec(), password_hash);

    let mut tx = pool.begin().await.expect("Failed to begin");
    let id = tx.insert_user(&user).await.expect("Failed to insert test user");
    tx.commit().await.expect("Failed to commit");
    id
}

pub async fn seed_account(
    pool: &SqlitePool,
    owner_id: i32,
    account_number: i32,
    balance: Decimal,
) -> Account {
    let new_account =
        NewAccount::new(account_number, "Test account", owner_id).with_balance(balance);

    let mut tx = pool.begin().await.expect("Failed to begin");
    let id = tx.insert_account(&new_account).await.expect("Failed to insert test account");
    tx.commit().await.expect("Failed to commit");
    new_account.into_account(id)
}

pub async fn find_account(pool: &SqlitePool, account_number: i32) -> Option<Account> {
    let mut tx = pool.begin().await.expect("Failed to begin");
    let account = tx
        .fetch_account_by_number(account_number)
        .await
        .expect("Failed to fetch account");
    tx.commit().await.expect("Failed to commit");
    account
}

pub async fn balance_of(pool: &SqlitePool, account_number: i32) -> Decimal {
    find_account(pool, account_number)
        .await
        .expect("account should exist")
        .balance
}

pub async fn record_count(pool: &SqlitePool) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transaction_records")
        .fetch_one(pool)
        .await
        .expect("Failed to count records");
    row.0
}

/// Wraps the test pool and logs every store call made through it, in order.
#[derive(Clone)]
pub struct RecordingPool {
    pool: SqlitePool,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingPool {
    pub fn new(pool: SqlitePool) -> Self {
        RecordingPool {
            pool,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct RecordingTx {
    inner: Transaction<'static, Sqlite>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingTx {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DbConnection for RecordingPool {
    type Tx = RecordingTx;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error> {
        Ok(RecordingTx {
            inner: self.pool.begin().await?,
            calls: Arc::clone(&self.calls),
        })
    }

    fn print_pool_stats(&self) {
        self.pool.print_pool_stats();
    }
}

#[async_trait]
impl LedgerTx for RecordingTx {
    async fn fetch_user_by_id(&mut self, id: i32) -> Result<Option<User>, sqlx::Error> {
        self.record("fetch_user_by_id");
        self.inner.fetch_user_by_id(id).await
    }

    async fn fetch_user_by_user_name(
        &mut self,
        user_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.record("fetch_user_by_user_name");
        self.inner.fetch_user_by_user_name(user_name).await
    }

    async fn fetch_users(&mut self, take: i64) -> Result<Vec<User>, sqlx::Error> {
        self.record("fetch_users");
        self.inner.fetch_users(take).await
    }

    async fn insert_user(&mut self, user: &User) -> Result<i32, sqlx::Error> {
        self.record("insert_user");
        self.inner.insert_user(user).await
    }

    async fn delete_user(&mut self, id: i32) -> Result<u64, sqlx::Error> {
        self.record("delete_user");
        self.inner.delete_user(id).await
    }

    async fn fetch_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error> {
        self.record("fetch_account_by_id");
        self.inner.fetch_account_by_id(id).await
    }

    async fn lock_account_by_id(&mut self, id: i32) -> Result<Option<Account>, sqlx::Error> {
        self.record("lock_account_by_id");
        self.inner.lock_account_by_id(id).await
    }

    async fn fetch_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        self.record("fetch_account_by_number");
        self.inner.fetch_account_by_number(account_number).await
    }

    async fn lock_account_by_number(
        &mut self,
        account_number: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        self.record("lock_account_by_number");
        self.inner.lock_account_by_number(account_number).await
    }

    async fn fetch_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error> {
        self.record("fetch_accounts_by_owner");
        self.inner.fetch_accounts_by_owner(owner_id).await
    }

    async fn lock_accounts_by_owner(
        &mut self,
        owner_id: i32,
    ) -> Result<Vec<Account>, sqlx::Error> {
        self.record("lock_accounts_by_owner");
        self.inner.lock_accounts_by_owner(owner_id).await
    }

    async fn insert_account(&mut self, account: &NewAccount) -> Result<i32, sqlx::Error> {
        self.record("insert_account");
        self.inner.insert_account(account).await
    }

    async fn update_balance(
        &mut self,
        account_id: i32,
        balance: Decimal,
    ) -> Result<(), sqlx::Error> {
        self.record("update_balance");
        self.inner.update_balance(account_id, balance).await
    }

    async fn delete_account(&mut self, id: i32) -> Result<u64, sqlx::Error> {
        self.record("delete_account");
        self.inner.delete_account(id).await
    }

    async fn insert_record(&mut self, record: &NewTransactionRecord) -> Result<i32, sqlx::Error> {
        self.record("insert_record");
        self.inner.insert_record(record).await
    }

    async fn fetch_record(&mut self, id: i32) -> Result<Option<TransactionRecord>, sqlx::Error> {
        self.record("fetch_record");
        self.inner.fetch_record(id).await
    }

    async fn fetch_records_by_account(
        &mut self,
        account_id: i32,
    ) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        self.record("fetch_records_by_account");
        self.inner.fetch_records_by_account(account_id).await
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.record("commit");
        self.inner.commit().await
    }
}
