//! Common datatypes supporting functions throughout Pocketbook

use std::{convert::Infallible, fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The number of decimals shown for all totals
pub const DECIMAL_SCALE: u32 = 2;

/// Filter token selecting every month
pub const ALL_MONTHS_TOKEN: &str = "all";

/// Unique identifier for a transaction, derived from its creation time in milliseconds
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Returns the raw numeric value of this identifier
    #[must_use]
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for TransactionId {
    fn from(transaction_id: u64) -> Self {
        Self(transaction_id)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single income or expense entry in the ledger.
///
/// This is also the persisted shape: the ledger is stored as a JSON array of these,
/// with `amount` written as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, used for deletion
    pub(crate) id: TransactionId,
    /// Free-form label
    pub(crate) text: String,
    /// Signed amount; positive values are income, negative values are expenses
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
    /// Free-form category name
    pub(crate) category: String,
    /// Full month name of the creation time, used as a filter key
    pub(crate) month: String,
}

impl Transaction {
    /// Creates a transaction from all of its parts
    #[must_use]
    pub fn new(
        id: TransactionId,
        text: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        month: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            amount,
            category: category.into(),
            month: month.into(),
        }
    }

    /// Returns the unique identifier
    #[must_use]
    #[inline]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the label
    #[must_use]
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the signed amount
    #[must_use]
    #[inline]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the category name
    #[must_use]
    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the month tag
    #[must_use]
    #[inline]
    pub fn month(&self) -> &str {
        &self.month
    }

    /// Returns whether this entry is an expense
    #[must_use]
    #[inline]
    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

/// The user-supplied part of a transaction, before an id and month are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Free-form label
    pub text: String,
    /// Signed amount
    pub amount: Decimal,
    /// Free-form category name
    pub category: String,
}

impl NewTransaction {
    /// Creates a new unsaved transaction
    #[must_use]
    pub fn new(text: impl Into<String>, amount: Decimal, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            amount,
            category: category.into(),
        }
    }
}

/// Balance, income and expense totals over a list of transactions, rounded to
/// [`DECIMAL_SCALE`] places
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of all amounts
    pub(crate) balance: Decimal,
    /// Sum of strictly positive amounts
    pub(crate) income: Decimal,
    /// Absolute value of the sum of strictly negative amounts
    pub(crate) expense: Decimal,
}

impl Totals {
    /// Returns the net balance
    #[must_use]
    #[inline]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Returns the total income
    #[must_use]
    #[inline]
    pub fn income(&self) -> Decimal {
        self.income
    }

    /// Returns the total expense, as a non-negative number
    #[must_use]
    #[inline]
    pub fn expense(&self) -> Decimal {
        self.expense
    }

    /// Formats the balance, e.g. `$600.00`
    #[must_use]
    pub fn balance_display(&self) -> String {
        format!("${:.2}", self.balance)
    }

    /// Formats the income, e.g. `+$1000.00`
    #[must_use]
    pub fn income_display(&self) -> String {
        format!("+${:.2}", self.income)
    }

    /// Formats the expense, e.g. `-$400.00`
    #[must_use]
    pub fn expense_display(&self) -> String {
        format!("-${:.2}", self.expense)
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            balance: Decimal::new(0, DECIMAL_SCALE),
            income: Decimal::new(0, DECIMAL_SCALE),
            expense: Decimal::new(0, DECIMAL_SCALE),
        }
    }
}

/// Signed sums per category, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    pub(crate) entries: Vec<(String, Decimal)>,
}

impl CategoryTotals {
    /// Returns the sum for a category, if it appeared at all
    #[must_use]
    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    /// Iterates over `(category, total)` pairs in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
    }

    /// Returns the number of distinct categories
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no categories appeared
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The month selection used to narrow down the displayed transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum MonthFilter {
    /// Every transaction, regardless of month
    #[default]
    All,
    /// Only transactions tagged with exactly this month name
    Month(String),
}

impl MonthFilter {
    /// Returns whether a transaction passes this filter
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(month) => transaction.month == *month,
        }
    }

    /// Returns the human-readable label for a month picker
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            MonthFilter::All => "All Months",
            MonthFilter::Month(month) => month,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = Infallible;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(if token == ALL_MONTHS_TOKEN {
            MonthFilter::All
        } else {
            MonthFilter::Month(token.to_owned())
        })
    }
}

impl Display for MonthFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthFilter::All => f.write_str(ALL_MONTHS_TOKEN),
            MonthFilter::Month(month) => f.write_str(month),
        }
    }
}

/// Light or dark display theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// The default theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl Theme {
    /// Returns the other theme
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Returns whether this is the dark theme
    #[must_use]
    #[inline]
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl From<bool> for Theme {
    fn from(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}
