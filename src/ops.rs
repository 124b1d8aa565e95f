use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{CategoryTotals, MonthFilter, Transaction, Totals, DECIMAL_SCALE};

/// Rounds an amount to [`DECIMAL_SCALE`] places, halves away from zero.
///
/// Values too large to carry [`DECIMAL_SCALE`] places keep their own scale.
#[must_use]
pub fn round_amount(amount: Decimal) -> Decimal {
    let rounded =
        amount.round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let mut rescaled = rounded;
    rescaled.rescale(DECIMAL_SCALE);
    if rescaled == rounded {
        rescaled
    } else {
        rounded
    }
}

/// Computes the balance, income and expense totals of `transactions`.
///
/// Empty input yields zero for all three. Sums beyond the range of [`Decimal`]
/// saturate at [`Decimal::MAX`] or [`Decimal::MIN`].
#[must_use]
pub fn totals<'a, I>(transactions: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut balance = Decimal::ZERO;
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for transaction in transactions {
        let amount = transaction.amount;
        balance = balance.saturating_add(amount);
        if amount > Decimal::ZERO {
            income = income.saturating_add(amount);
        } else if amount < Decimal::ZERO {
            expense = expense.saturating_sub(amount);
        }
    }
    Totals {
        balance: round_amount(balance),
        income: round_amount(income),
        expense: round_amount(expense),
    }
}

/// Sums signed amounts per category, keeping categories in order of first appearance.
///
/// A category is listed even if its amounts cancel out to zero. Sums saturate like
/// [`totals`].
#[must_use]
pub fn category_totals<'a, I>(transactions: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut entries: Vec<(String, Decimal)> = Vec::new();
    for transaction in transactions {
        match entries
            .iter_mut()
            .find(|(name, _)| *name == transaction.category)
        {
            Some((_, total)) => *total = total.saturating_add(transaction.amount),
            None => entries.push((transaction.category.clone(), transaction.amount)),
        }
    }
    CategoryTotals { entries }
}

/// Lists the choices for the month picker: [`MonthFilter::All`] first, then every
/// distinct month in order of first appearance.
#[must_use]
pub fn month_options<'a, I>(transactions: I) -> Vec<MonthFilter>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut options = vec![MonthFilter::All];
    for transaction in transactions {
        let seen = options
            .iter()
            .any(|option| matches!(option, MonthFilter::Month(month) if *month == transaction.month));
        if !seen {
            options.push(MonthFilter::Month(transaction.month.clone()));
        }
    }
    options
}

/// Returns the transactions selected by `filter`, in their original order.
#[must_use]
pub fn filter<'a>(transactions: &'a [Transaction], filter: &MonthFilter) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .collect()
}
