//! Money movement.
//!
//! Deposits credit one account and write one `Deposit` record. Transfers
//! debit the sender, credit the receiver and write one `Transaction` record
//! per side. Every check runs before the first write, and all writes of one
//! operation share a single unit of work, so a rejected or failed operation
//! leaves both balances and the ledger untouched.

use rust_decimal::Decimal;

use super::model::{NewTransactionRecord, TransactionRecord, TransactionStatus, TransferReceipt};
use crate::account::model::Account;
use crate::error::CustomError;
use crate::repo::{DbConnection, LedgerTx};
use crate::utils::is_valid_amount;

pub struct TransactionService<DB: DbConnection> {
    db: DB,
}

impl<DB: DbConnection> TransactionService<DB> {
    pub fn new(db: DB) -> Self {
        TransactionService { db }
    }

    pub async fn deposit(
        &self,
        receiving_account_number: i32,
        amount: Decimal,
        message: Option<String>,
    ) -> Result<(Option<TransactionRecord>, TransactionStatus), CustomError> {
        let outcome = self
            .apply_deposit(receiving_account_number, amount, message)
            .await
            .inspect_err(|e| {
                tracing::error!(receiving_account_number, error = ?e, "deposit failed")
            })?;

        match &outcome {
            (Some(record), _) => tracing::info!(
                receiving_account_number,
                amount = %amount,
                balance = %record.account_balance,
                "deposit applied"
            ),
            (None, status) => tracing::warn!(
                receiving_account_number,
                amount = %amount,
                ?status,
                "deposit rejected"
            ),
        }
        Ok(outcome)
    }

    async fn apply_deposit(
        &self,
        receiving_account_number: i32,
        amount: Decimal,
        message: Option<String>,
    ) -> Result<(Option<TransactionRecord>, TransactionStatus), CustomError> {
        if !is_valid_amount(amount) {
            return Ok((None, TransactionStatus::InvalidAmount));
        }

        let mut tx = self.db.begin().await?;
        let Some(account) = tx.lock_account_by_number(receiving_account_number).await? else {
            return Ok((None, TransactionStatus::BankAccountNotFound));
        };
        let Some(new_balance) = account.balance.checked_add(amount) else {
            return Ok((None, TransactionStatus::InvalidAmount));
        };

        tx.update_balance(account.id, new_balance).await?;
        let record = NewTransactionRecord::deposit(
            receiving_account_number,
            amount,
            account.id,
            new_balance,
            message,
        );
        let id = tx.insert_record(&record).await?;
        tx.commit().await?;

        Ok((Some(record.into_record(id)), TransactionStatus::Success))
    }

    /// Moves `amount` from one account to another.
    ///
    /// On success both ledger entries are returned; the sender's entry carries
    /// the sender's new balance and the receiver's entry the receiver's.
    pub async fn transfer(
        &self,
        sending_account_number: i32,
        receiving_account_number: i32,
        amount: Decimal,
        message: Option<String>,
    ) -> Result<(Option<TransferReceipt>, TransactionStatus), CustomError> {
        let outcome = self
            .apply_transfer(sending_account_number, receiving_account_number, amount, message)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    sending_account_number,
                    receiving_account_number,
                    error = ?e,
                    "transfer failed"
                )
            })?;

        match &outcome {
            (Some(receipt), _) => tracing::info!(
                sending_account_number,
                receiving_account_number,
                amount = %amount,
                sender_balance = %receipt.sender.account_balance,
                receiver_balance = %receipt.receiver.account_balance,
                "transfer applied"
            ),
            (None, status) => tracing::warn!(
                sending_account_number,
                receiving_account_number,
                amount = %amount,
                ?status,
                "transfer rejected"
            ),
        }
        Ok(outcome)
    }

    async fn apply_transfer(
        &self,
        sending_account_number: i32,
        receiving_account_number: i32,
        amount: Decimal,
        message: Option<String>,
    ) -> Result<(Option<TransferReceipt>, TransactionStatus), CustomError> {
        if !is_valid_amount(amount) {
            return Ok((None, TransactionStatus::InvalidAmount));
        }
        if sending_account_number == receiving_account_number {
            return Ok((None, TransactionStatus::SameAccount));
        }

        let mut tx = self.db.begin().await?;
        let locked = lock_pair(&mut tx, sending_account_number, receiving_account_number).await?;
        let (Some(sender), Some(receiver)) = locked else {
            return Ok((None, TransactionStatus::BankAccountNotFound));
        };
        if sender.balance < amount {
            return Ok((None, TransactionStatus::InsufficientFunds));
        }
        let sender_balance = sender.balance - amount;
        let Some(receiver_balance) = receiver.balance.checked_add(amount) else {
            return Ok((None, TransactionStatus::InvalidAmount));
        };

        tx.update_balance(sender.id, sender_balance).await?;
        tx.update_balance(receiver.id, receiver_balance).await?;

        let sender_record = NewTransactionRecord::transfer_side(
            sending_account_number,
            receiving_account_number,
            amount,
            sender.id,
            sender_balance,
            message.clone(),
        );
        let sender_record_id = tx.insert_record(&sender_record).await?;

        let receiver_record = NewTransactionRecord::transfer_side(
            sending_account_number,
            receiving_account_number,
            amount,
            receiver.id,
            receiver_balance,
            message,
        );
        let receiver_record_id = tx.insert_record(&receiver_record).await?;

        tx.commit().await?;

        let receipt = TransferReceipt {
            sender: sender_record.into_record(sender_record_id),
            receiver: receiver_record.into_record(receiver_record_id),
        };
        Ok((Some(receipt), TransactionStatus::Success))
    }

    pub async fn get_transaction(&self, id: i32) -> Result<Option<TransactionRecord>, CustomError> {
        let mut tx = self.db.begin().await?;
        let record = tx.fetch_record(id).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Ledger entries of one account, oldest first.
    pub async fn get_transactions_by_account(
        &self,
        account_id: i32,
    ) -> Result<(Option<Vec<TransactionRecord>>, TransactionStatus), CustomError> {
        let mut tx = self.db.begin().await?;
        if tx.fetch_account_by_id(account_id).await?.is_none() {
            return Ok((None, TransactionStatus::BankAccountNotFound));
        }
        let records = tx.fetch_records_by_account(account_id).await?;
        tx.commit().await?;
        Ok((Some(records), TransactionStatus::Success))
    }
}

// Rows are always locked lowest account number first so two opposing
// transfers cannot deadlock.
async fn lock_pair<T: LedgerTx>(
    tx: &mut T,
    sending_account_number: i32,
    receiving_account_number: i32,
) -> Result<(Option<Account>, Option<Account>), sqlx::Error> {
    if sending_account_number < receiving_account_number {
        let sender = tx.lock_account_by_number(sending_account_number).await?;
        let receiver = tx.lock_account_by_number(receiving_account_number).await?;
        Ok((sender, receiver))
    } else {
        let receiver = tx.lock_account_by_number(receiving_account_number).await?;
        let sender = tx.lock_account_by_number(sending_account_number).await?;
        Ok((sender, receiver))
    }
}
