use std::{fs::File, io::BufWriter, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use pocketbook::{
    io::{self, CsvStyle, EXPORT_FILE_NAME},
    storage::FileStorage,
    types::{MonthFilter, NewTransaction, TransactionId},
    App, Error,
};

/// Track income and expenses, month by month.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding the stored ledger and settings
    #[arg(long, env = "POCKETBOOK_DATA_DIR", default_value = ".pocketbook")]
    data_dir: PathBuf,

    /// Log more detail; repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an income (positive) or expense (negative) amount
    Add {
        /// Description of the entry
        text: String,
        /// Signed amount, e.g. 1000 or -12.50
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category, e.g. Salary, Food, Bills, Shopping, Entertainment
        #[arg(short, long, default_value = "Other")]
        category: String,
    },
    /// Delete an entry by id
    Remove {
        /// Id shown by `list`
        id: TransactionId,
    },
    /// Show entries, totals and the category breakdown
    List {
        /// Month name to show, or "all"
        #[arg(short, long, default_value = "all")]
        month: MonthFilter,
    },
    /// Show balance, income and expense only
    Summary {
        /// Month name to show, or "all"
        #[arg(short, long, default_value = "all")]
        month: MonthFilter,
    },
    /// List the months that have entries
    Months,
    /// Export every entry as CSV
    Export {
        /// File to write, or "-" for standard output
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
        /// Write free text unquoted, even if it contains commas or line breaks
        #[arg(long)]
        raw: bool,
    },
    /// Show or switch the display theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pocketbook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let storage = FileStorage::new(cli.data_dir);
    info!("using data directory {}", storage.dir().display());
    let mut app = App::open(storage)?;
    match cli.command {
        Command::Add {
            text,
            amount,
            category,
        } => {
            let amount = io::parse_amount(&amount)?;
            let transaction = app.add_transaction(NewTransaction::new(text, amount, category))?;
            println!(
                "Added {} {} ({}, {})",
                transaction.id(),
                io::signed_amount(transaction),
                transaction.category(),
                transaction.month()
            );
        }
        Command::Remove { id } => {
            if app.remove_transaction(id)? {
                println!("Removed {id}");
            } else {
                println!("No entry with id {id}");
            }
        }
        Command::List { month } => {
            app.select_month(month);
            print!("{}", io::render_view(&app.view()));
        }
        Command::Summary { month } => {
            app.select_month(month);
            print!("{}", io::render_totals(&app.view()));
        }
        Command::Months => print!("{}", io::render_months(&app.view())),
        Command::Export { output, raw } => {
            let style = if raw { CsvStyle::Raw } else { CsvStyle::Quoted };
            if output.as_os_str() == "-" {
                let mut stdout = std::io::stdout().lock();
                app.write_csv(&mut stdout, style)?;
                println!();
            } else {
                let mut writer = BufWriter::new(File::create(&output)?);
                app.write_csv(&mut writer, style)?;
                println!(
                    "Exported {} entries to {}",
                    app.ledger().len(),
                    output.display()
                );
            }
        }
        Command::Theme { action } => {
            let theme = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => app.theme(),
                ThemeAction::Toggle => app.toggle_theme()?,
            };
            println!("{theme}");
        }
    }
    Ok(())
}
