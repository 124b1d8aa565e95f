//! The application controller: owns all state and keeps storage in step with it

use chrono::{DateTime, Local};
use log::info;

use crate::{
    errors::Error,
    io::{self, CsvStyle},
    ledger::{self, Ledger},
    ops,
    storage::Storage,
    theme,
    types::{CategoryTotals, MonthFilter, NewTransaction, Theme, Totals, Transaction, TransactionId},
};

/// A render-ready snapshot of the application, derived from the ledger on demand
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Transactions passing the selected filter, in ledger order
    pub transactions: Vec<Transaction>,
    /// Totals over [`View::transactions`]
    pub totals: Totals,
    /// Per-category sums over [`View::transactions`]
    pub categories: CategoryTotals,
    /// Month picker choices, computed over the whole ledger
    pub months: Vec<MonthFilter>,
    /// The month selection this view was computed for
    pub selected: MonthFilter,
    /// The current theme
    pub theme: Theme,
}

/// Holds the ledger, theme and month selection, together with the storage they persist to.
///
/// Every mutation is written through to storage before the call returns.
#[derive(Debug)]
pub struct App<S: Storage> {
    storage: S,
    ledger: Ledger,
    theme: Theme,
    selected: MonthFilter,
}

impl<S: Storage> App<S> {
    /// Loads the ledger and theme from `storage`.
    ///
    /// # Errors
    /// If the storage cannot be read. Malformed stored data is not an error.
    pub fn open(storage: S) -> Result<Self, Error> {
        let ledger = Ledger::load(&storage)?;
        let theme = theme::load_theme(&storage)?;
        info!("opened ledger with {} transactions", ledger.len());
        Ok(Self {
            storage,
            ledger,
            theme,
            selected: MonthFilter::All,
        })
    }

    /// Records a transaction created now. See [`App::add_transaction_at`].
    ///
    /// # Errors
    /// If the ledger cannot be persisted
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<&Transaction, Error> {
        self.add_transaction_at(new, Local::now())
    }

    /// Records a transaction created at `now`, tagging it with the month name of `now`
    /// and an id derived from its timestamp, then persists the ledger.
    ///
    /// The amount is kept at the precision storage holds, so a reload gives back the
    /// same ledger.
    ///
    /// # Errors
    /// If the ledger cannot be persisted
    pub fn add_transaction_at(
        &mut self,
        new: NewTransaction,
        now: DateTime<Local>,
    ) -> Result<&Transaction, Error> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let id = self.ledger.next_id(millis);
        let month = now.format("%B").to_string();
        let amount = ledger::stored_amount(new.amount)?;
        let transaction = Transaction::new(id, new.text, amount, new.category, month);
        info!(
            "recording {} {} in {} for {}",
            transaction.text, transaction.amount, transaction.category, transaction.month
        );
        self.ledger.add(transaction);
        self.ledger.persist(&mut self.storage)?;
        Ok(&self.ledger.transactions()[self.ledger.len() - 1])
    }

    /// Deletes every transaction with `id` and persists the ledger.
    ///
    /// Returns whether anything was deleted. An unknown id is not an error.
    ///
    /// # Errors
    /// If the ledger cannot be persisted
    pub fn remove_transaction(&mut self, id: TransactionId) -> Result<bool, Error> {
        let removed = self.ledger.remove(id);
        if removed {
            info!("removed transaction {id}");
        }
        self.ledger.persist(&mut self.storage)?;
        Ok(removed)
    }

    /// Changes which month the [`View`] shows
    pub fn select_month(&mut self, filter: MonthFilter) {
        self.selected = filter;
    }

    /// Recomputes the filtered transactions and everything derived from them
    #[must_use]
    pub fn view(&self) -> View {
        let filtered = ops::filter(self.ledger.transactions(), &self.selected);
        View {
            totals: ops::totals(filtered.iter().copied()),
            categories: ops::category_totals(filtered.iter().copied()),
            months: ops::month_options(&self.ledger),
            transactions: filtered.into_iter().cloned().collect(),
            selected: self.selected.clone(),
            theme: self.theme,
        }
    }

    /// Serializes the whole ledger, ignoring the month selection
    ///
    /// # Errors
    /// If CSV encoding fails
    pub fn export_csv(&self, style: CsvStyle) -> Result<String, Error> {
        io::export_csv(self.ledger.transactions(), style)
    }

    /// Writes the whole ledger as CSV to `writer`, ignoring the month selection
    ///
    /// # Errors
    /// If CSV encoding or the write fails
    pub fn write_csv<W: std::io::Write>(&self, writer: &mut W, style: CsvStyle) -> Result<(), Error> {
        io::write_ledger_to_csv(writer, self.ledger.transactions(), style)
    }

    /// Switches between light and dark theme and persists the choice
    ///
    /// # Errors
    /// If the theme cannot be persisted
    pub fn toggle_theme(&mut self) -> Result<Theme, Error> {
        self.theme = self.theme.toggled();
        theme::save_theme(&mut self.storage, self.theme)?;
        info!("switched to {} theme", self.theme);
        Ok(self.theme)
    }

    /// Returns the current theme
    #[must_use]
    #[inline]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Returns the full, unfiltered ledger
    #[must_use]
    #[inline]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns the storage backend
    #[must_use]
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::storage::{FileStorage, MemoryStorage, TRANSACTIONS_KEY};

    use super::*;

    fn january(day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    fn february(day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 2, day, 12, 0, 0).unwrap()
    }

    fn sample_app() -> App<MemoryStorage> {
        let mut app = App::open(MemoryStorage::new()).unwrap();
        app.add_transaction_at(NewTransaction::new("Salary", dec!(1000), "Salary"), january(1))
            .unwrap();
        app.add_transaction_at(NewTransaction::new("Rent", dec!(-400), "Bills"), january(2))
            .unwrap();
        app
    }

    #[test]
    fn test_add_assigns_id_and_month() {
        let mut app = App::open(MemoryStorage::new()).unwrap();
        let now = january(15);
        let transaction = app
            .add_transaction_at(NewTransaction::new("Lunch", dec!(-12.5), "Food"), now)
            .unwrap();
        assert_eq!(transaction.id().value(), now.timestamp_millis() as u64);
        assert_eq!(transaction.month(), "January");
        assert_eq!(transaction.text(), "Lunch");
    }

    #[test]
    fn test_add_persists_immediately() {
        let app = sample_app();
        let reopened = App::open(app.storage().clone()).unwrap();
        assert_eq!(reopened.ledger(), app.ledger());
    }

    #[test]
    fn test_long_amount_matches_after_reopen() {
        let mut app = App::open(MemoryStorage::new()).unwrap();
        let amount = crate::io::parse_amount("0.1234567890123456789").unwrap();
        app.add_transaction_at(NewTransaction::new("Interest", amount, "Other"), january(4))
            .unwrap();
        let reopened = App::open(app.storage().clone()).unwrap();
        assert_eq!(reopened.ledger(), app.ledger());
    }

    #[test]
    fn test_large_amounts_view() {
        let mut app = App::open(MemoryStorage::new()).unwrap();
        let amount = crate::io::parse_amount("1e15").unwrap();
        for day in 1..=3 {
            app.add_transaction_at(NewTransaction::new("Sale", amount, "Sales"), january(day))
                .unwrap();
        }
        let view = app.view();
        assert_eq!(view.totals.balance_display(), "$3000000000000000.00");
        assert!(crate::io::render_view(&view).contains(&"#".repeat(30)));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut app = App::open(MemoryStorage::new()).unwrap();
        let now = january(3);
        let first = app
            .add_transaction_at(NewTransaction::new("a", dec!(1), "Other"), now)
            .unwrap()
            .id();
        let second = app
            .add_transaction_at(NewTransaction::new("b", dec!(2), "Other"), now)
            .unwrap()
            .id();
        assert!(second > first);
    }

    #[test]
    fn test_view_of_sample() {
        let view = sample_app().view();
        assert_eq!(view.transactions.len(), 2);
        assert_eq!(view.totals.balance_display(), "$600.00");
        assert_eq!(view.totals.income_display(), "+$1000.00");
        assert_eq!(view.totals.expense_display(), "-$400.00");
        assert_eq!(view.categories.get("Salary"), Some(dec!(1000)));
        assert_eq!(view.categories.get("Bills"), Some(dec!(-400)));
        assert_eq!(
            view.months,
            vec![MonthFilter::All, MonthFilter::Month("January".into())]
        );
        assert_eq!(view.theme, Theme::Light);
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let mut app = sample_app();
        let ledger_before = app.ledger().clone();
        let stored_before = app.storage().load(TRANSACTIONS_KEY).unwrap();
        let id = app
            .add_transaction_at(NewTransaction::new("Bonus", dec!(50), "Salary"), february(1))
            .unwrap()
            .id();
        assert_eq!(app.ledger().len(), 3);
        assert!(app.remove_transaction(id).unwrap());
        assert_eq!(app.ledger(), &ledger_before);
        assert_eq!(app.storage().load(TRANSACTIONS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn test_remove_unknown_leaves_store_identical() {
        let mut app = sample_app();
        let stored_before = app.storage().load(TRANSACTIONS_KEY).unwrap();
        assert!(!app.remove_transaction(TransactionId::from(42)).unwrap());
        assert_eq!(app.ledger().len(), 2);
        assert_eq!(app.storage().load(TRANSACTIONS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn test_month_filter_view() {
        let mut app = sample_app();
        app.add_transaction_at(NewTransaction::new("Groceries", dec!(-80.25), "Food"), february(5))
            .unwrap();
        app.select_month(MonthFilter::Month("February".into()));
        let view = app.view();
        assert_eq!(view.transactions.len(), 1);
        assert_eq!(view.totals.balance_display(), "$-80.25");
        assert_eq!(view.totals.expense_display(), "-$80.25");
        assert_eq!(view.categories.len(), 1);
        // Month options always cover the whole ledger
        assert_eq!(view.months.len(), 3);

        app.select_month(MonthFilter::Month("July".into()));
        let view = app.view();
        assert!(view.transactions.is_empty());
        assert_eq!(view.totals, Totals::default());

        app.select_month(MonthFilter::All);
        assert_eq!(app.view().transactions.len(), app.ledger().len());
    }

    #[test]
    fn test_export_ignores_filter() {
        let mut app = sample_app();
        app.select_month(MonthFilter::Month("March".into()));
        assert_eq!(
            app.export_csv(CsvStyle::Quoted).unwrap(),
            "Text,Amount,Category,Month\nSalary,1000,Salary,January\nRent,-400,Bills,January"
        );
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut app = App::open(MemoryStorage::new()).unwrap();
        assert_eq!(app.toggle_theme().unwrap(), Theme::Dark);
        let reopened = App::open(app.storage().clone()).unwrap();
        assert_eq!(reopened.theme(), Theme::Dark);
        // The ledger key is untouched by theme changes
        assert_eq!(reopened.storage().load(TRANSACTIONS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_backed_app_reopens() {
        let temp = tempfile::tempdir().unwrap();
        let mut app = App::open(FileStorage::new(temp.path())).unwrap();
        let id = app
            .add_transaction_at(NewTransaction::new("Salary", dec!(1000), "Salary"), january(1))
            .unwrap()
            .id();
        app.toggle_theme().unwrap();

        let reopened = App::open(FileStorage::new(temp.path())).unwrap();
        assert_eq!(reopened.ledger().get(id).map(Transaction::text), Some("Salary"));
        assert_eq!(reopened.theme(), Theme::Dark);
        assert_eq!(reopened.storage().dir(), temp.path());
    }

    #[test]
    fn test_open_with_corrupt_ledger() {
        let mut storage = MemoryStorage::new();
        storage.save(TRANSACTIONS_KEY, "{oops").unwrap();
        let app = App::open(storage).unwrap();
        assert!(app.ledger().is_empty());
        assert_eq!(app.view().totals, Totals::default());
    }
}
