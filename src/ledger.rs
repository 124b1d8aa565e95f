//! The ordered list of transactions and its persistence

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::Error,
    storage::{Storage, TRANSACTIONS_KEY},
    types::{Transaction, TransactionId},
};

/// All recorded transactions, in insertion order.
///
/// The ledger is the single source of truth: totals, month options and exports are all
/// derived from it on demand.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ledger {
    /// Storage for transactions, oldest first
    pub(crate) transactions: Vec<Transaction>,
}

impl Ledger {
    /// Creates a new, empty [`Ledger`]
    #[must_use]
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Reads the persisted ledger.
    ///
    /// A missing value, or one that is not a JSON array, yields an empty ledger.
    /// Array elements that do not have the shape of a [`Transaction`] are skipped.
    ///
    /// # Errors
    /// Only when the storage itself fails to read.
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Result<Self, Error> {
        let Some(stored) = storage.load(TRANSACTIONS_KEY)? else {
            debug!("no stored ledger, starting empty");
            return Ok(Self::new());
        };
        Ok(Self::from_json(&stored))
    }

    /// Builds a ledger from its persisted JSON text, skipping anything unreadable
    #[must_use]
    pub fn from_json(stored: &str) -> Self {
        let elements = match serde_json::from_str::<Value>(stored) {
            Ok(Value::Array(elements)) => elements,
            Ok(other) => {
                warn!("stored ledger is not a list (found {}), starting empty", kind(&other));
                return Self::new();
            }
            Err(err) => {
                warn!("stored ledger is not valid JSON ({err}), starting empty");
                return Self::new();
            }
        };
        let total = elements.len();
        let transactions: Vec<Transaction> = elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| match serde_json::from_value(element) {
                Ok(transaction) => Some(transaction),
                Err(err) => {
                    warn!("skipping stored transaction #{index}: {err}");
                    None
                }
            })
            .collect();
        debug!("loaded {} of {total} stored transactions", transactions.len());
        Self { transactions }
    }

    /// Serializes every transaction as a JSON array
    ///
    /// # Errors
    /// [`Error::Json`] if an amount cannot be written as a JSON number
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.transactions)?)
    }

    /// Writes the whole ledger to storage, unconditionally
    ///
    /// # Errors
    /// If serialization or the storage write fails
    pub fn persist<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), Error> {
        storage.save(TRANSACTIONS_KEY, &self.to_json()?)
    }

    /// Appends a transaction at the end
    pub fn add(&mut self, transaction: Transaction) {
        debug!("adding transaction {}", transaction.id);
        self.transactions.push(transaction);
    }

    /// Removes every transaction with the given id.
    ///
    /// Returns whether anything was removed; an unknown id leaves the ledger untouched.
    pub fn remove(&mut self, id: TransactionId) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|transaction| transaction.id != id);
        let removed = before - self.transactions.len();
        if removed == 0 {
            debug!("no transaction with id {id} to remove");
        }
        removed > 0
    }

    /// Fetches a transaction by id, if one exists
    #[must_use]
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|transaction| transaction.id == id)
    }

    /// Returns all transactions, in insertion order
    #[must_use]
    #[inline]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns the number of transactions
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns whether there are no transactions
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Picks the id for a transaction created at `timestamp_millis`.
    ///
    /// The timestamp is used as-is unless an existing id is equal or later, in which case
    /// the id after the largest one is used instead.
    #[must_use]
    pub fn next_id(&self, timestamp_millis: u64) -> TransactionId {
        let after_last = self
            .transactions
            .iter()
            .map(|transaction| transaction.id.value())
            .max()
            .map_or(0, |last| last.saturating_add(1));
        TransactionId::from(timestamp_millis.max(after_last))
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

/// An amount in the exact form it takes in stored JSON
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct StoredAmount(#[serde(with = "rust_decimal::serde::float")] Decimal);

/// Returns `amount` as it will read back from storage.
///
/// Stored amounts are JSON numbers, which keep about 15 significant digits.
///
/// # Errors
/// [`Error::Json`] if the amount has no JSON number form
pub fn stored_amount(amount: Decimal) -> Result<Decimal, Error> {
    let json = serde_json::to_string(&StoredAmount(amount))?;
    let StoredAmount(stored) = serde_json::from_str(&json)?;
    Ok(stored)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::storage::MemoryStorage;

    use super::*;

    fn salary() -> Transaction {
        Transaction::new(1.into(), "Salary", dec!(1000), "Salary", "January")
    }

    fn rent() -> Transaction {
        Transaction::new(2.into(), "Rent", dec!(-400), "Bills", "January")
    }

    #[test]
    fn test_load_missing() {
        let storage = MemoryStorage::new();
        assert!(Ledger::load(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_load_not_a_list() {
        for stored in ["{\"id\":1}", "null", "42", "not json at all", ""] {
            let mut storage = MemoryStorage::new();
            storage.save(TRANSACTIONS_KEY, stored).unwrap();
            assert!(Ledger::load(&storage).unwrap().is_empty(), "{stored:?}");
        }
    }

    #[test]
    fn test_load_skips_bad_elements() {
        let mut storage = MemoryStorage::new();
        storage
            .save(
                TRANSACTIONS_KEY,
                r#"[
                    {"id":1,"text":"Salary","amount":1000,"category":"Salary","month":"January"},
                    {"id":2,"text":"Broken","amount":null,"category":"Food","month":"January"},
                    "junk",
                    {"id":3,"text":"Rent","amount":-400,"category":"Bills","month":"January"}
                ]"#,
            )
            .unwrap();
        let ledger = Ledger::load(&storage).unwrap();
        let ids: Vec<u64> = ledger.into_iter().map(|t| t.id().value()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_persist_and_reload() {
        let mut storage = MemoryStorage::new();
        let mut ledger = Ledger::new();
        ledger.add(salary());
        ledger.add(rent());
        ledger.persist(&mut storage).unwrap();
        assert_eq!(Ledger::load(&storage).unwrap(), ledger);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut ledger = Ledger::new();
        ledger.add(rent());
        ledger.add(salary());
        assert_eq!(ledger.transactions()[0].text(), "Rent");
        assert_eq!(ledger.transactions()[1].text(), "Salary");
    }

    #[test]
    fn test_remove() {
        let mut ledger = Ledger::new();
        ledger.add(salary());
        ledger.add(rent());
        assert!(ledger.remove(1.into()));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(1.into()).is_none());
        assert!(ledger.get(2.into()).is_some());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut ledger = Ledger::new();
        ledger.add(salary());
        let before = ledger.clone();
        assert!(!ledger.remove(99.into()));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remove_all_duplicates() {
        let mut ledger = Ledger::new();
        ledger.add(salary());
        ledger.add(salary());
        ledger.add(rent());
        assert!(ledger.remove(1.into()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_stored_amount() {
        assert_eq!(stored_amount(dec!(-12.5)).unwrap(), dec!(-12.5));
        assert_eq!(stored_amount(dec!(1000)).unwrap(), dec!(1000));
        let long = stored_amount(dec!(0.1234567890123456789)).unwrap();
        assert_ne!(long, dec!(0.1234567890123456789));
        assert_eq!(stored_amount(long).unwrap(), long);
    }

    #[test]
    fn test_next_id() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.next_id(500), TransactionId::from(500));
        ledger.add(Transaction::new(500.into(), "a", dec!(1), "Other", "May"));
        // Same millisecond
        assert_eq!(ledger.next_id(500), TransactionId::from(501));
        // Clock went backwards
        assert_eq!(ledger.next_id(10), TransactionId::from(501));
        assert_eq!(ledger.next_id(900), TransactionId::from(900));
    }
}
