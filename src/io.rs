//! Helpers for reading user input and writing exports and reports

use std::{fmt::Write as _, io::Write, str::FromStr};

use csv::{QuoteStyle, Terminator};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Serialize;

use crate::{
    app::View,
    errors::Error,
    types::{Theme, Transaction},
};

/// Default file name for CSV exports
pub const EXPORT_FILE_NAME: &str = "transactions.csv";

/// Header line of CSV exports
pub const CSV_HEADER: [&str; 4] = ["Text", "Amount", "Category", "Month"];

/// Largest magnitude accepted for a single amount
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Widest bar drawn in the category breakdown
const CHART_WIDTH: usize = 30;

/// How free-text fields are written in CSV exports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvStyle {
    /// Fields containing a comma, quote or line break are quoted
    #[default]
    Quoted,
    /// Fields are written exactly as entered, even when that breaks the CSV structure
    Raw,
}

impl From<CsvStyle> for QuoteStyle {
    fn from(style: CsvStyle) -> Self {
        match style {
            CsvStyle::Quoted => QuoteStyle::Necessary,
            CsvStyle::Raw => QuoteStyle::Never,
        }
    }
}

/// Parses an amount as typed by a user.
///
/// Accepts an optionally signed decimal number, with surrounding whitespace, in plain
/// (`-12.50`) or scientific (`1.5e3`) notation, up to [`MAX_AMOUNT`] either way.
///
/// # Errors
/// [`Error::InvalidAmount`] for empty or non-numeric text, or a magnitude above
/// [`MAX_AMOUNT`]
pub fn parse_amount(input: &str) -> Result<Decimal, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidAmount(input.to_owned()));
    }
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| Error::InvalidAmount(input.to_owned()))?;
    if amount.abs() > MAX_AMOUNT {
        return Err(Error::InvalidAmount(input.to_owned()));
    }
    Ok(amount)
}

/// Type used for serializing a [`Transaction`] as one CSV line.
#[derive(Serialize, Debug)]
struct ExportRow<'a> {
    /// The transaction's label
    text: &'a str,
    /// The signed amount, without trailing zeros
    amount: String,
    /// The category name
    category: &'a str,
    /// The month tag
    month: &'a str,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            text: &transaction.text,
            amount: transaction.amount.normalize().to_string(),
            category: &transaction.category,
            month: &transaction.month,
        }
    }
}

/// Serializes `transactions` to CSV text.
///
/// Output has a header and one line per transaction, in the given order, joined by `\n`
/// with no trailing line break:
/// ```csv
/// Text,Amount,Category,Month
/// Salary,1000,Salary,January
/// Rent,-400,Bills,January
/// ```
///
/// # Errors
/// If CSV encoding fails
pub fn export_csv<'a, I>(transactions: I, style: CsvStyle) -> Result<String, Error>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(style.into())
        .from_writer(vec![]);
    csv_writer.write_record(CSV_HEADER)?;
    for transaction in transactions {
        csv_writer.serialize(ExportRow::from(transaction))?;
    }
    let bytes = csv_writer
        .into_inner()
        .map_err(|err| Error::Io(err.into_error()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Writes `transactions` as CSV to `writer`. See [`export_csv`] for the format.
///
/// # Errors
/// If CSV encoding or the write fails
pub fn write_ledger_to_csv<'a, W, I>(
    writer: &mut W,
    transactions: I,
    style: CsvStyle,
) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    writer.write_all(export_csv(transactions, style)?.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Formats a line item amount the way the list shows it, e.g. `+$1000` or `-$12.5`
#[must_use]
pub fn signed_amount(transaction: &Transaction) -> String {
    let sign = if transaction.is_expense() { '-' } else { '+' };
    format!("{sign}${}", transaction.amount.abs().normalize())
}

/// Renders the line items, totals and category breakdown of a [`View`] as plain text.
#[must_use]
pub fn render_view(view: &View) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Month: {}", view.selected.label());
    let _ = writeln!(out);
    if view.transactions.is_empty() {
        let _ = writeln!(out, "  (no transactions)");
    }
    for transaction in &view.transactions {
        let _ = writeln!(
            out,
            "  {:>14}  {} ({})  {}",
            transaction.id,
            transaction.text,
            transaction.category,
            signed_amount(transaction)
        );
    }
    let _ = writeln!(out);
    out.push_str(&render_totals(view));
    if !view.categories.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "By category:");
        out.push_str(&render_categories(view));
    }
    out
}

/// Renders just the balance, income and expense lines of a [`View`]
#[must_use]
pub fn render_totals(view: &View) -> String {
    format!(
        "Balance: {}\nIncome:  {}\nExpense: {}\n",
        view.totals.balance_display(),
        view.totals.income_display(),
        view.totals.expense_display()
    )
}

/// Renders the category breakdown as horizontal bars scaled to the largest magnitude
fn render_categories(view: &View) -> String {
    let name_width = view
        .categories
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    let largest = view
        .categories
        .iter()
        .map(|(_, total)| total.abs())
        .max()
        .unwrap_or(Decimal::ZERO);
    let mark = if view.theme == Theme::Dark { '=' } else { '#' };
    let mut out = String::new();
    for (name, total) in view.categories.iter() {
        let width = if largest.is_zero() {
            0
        } else {
            // Scale the ratio, not the total, so the product stays below the width
            (total.abs() / largest * Decimal::from(CHART_WIDTH))
                .round()
                .to_usize()
                .unwrap_or(0)
        };
        let total = format!("{total:.2}");
        let _ = writeln!(
            out,
            "  {name:<name_width$}  {total:>12}  {}",
            mark.to_string().repeat(width)
        );
    }
    out
}

/// Renders the month picker choices, marking the selected one
#[must_use]
pub fn render_months(view: &View) -> String {
    let mut out = String::new();
    for option in &view.months {
        let marker = if *option == view.selected { '*' } else { ' ' };
        let token = option.to_string();
        let _ = writeln!(out, "{marker} {token:<10} {}", option.label());
    }
    out
}
