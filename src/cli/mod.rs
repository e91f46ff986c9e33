//! Argument-driven command line over [`BillBook`].

pub mod output;

use clap::{Parser, Subcommand};

use tracker_config::{default_data_root, Config, ConfigManager};
use tracker_core::{
    BillDraft, LocaleCurrency, SessionService, SignUpMetadata, StubAuthProvider, SummaryService,
};
use tracker_storage_json::JsonSessionStore;

use crate::{
    book::{json_store, BillBook},
    errors::{Result, TrackerError},
};

#[derive(Parser)]
#[command(name = "bill_tracker_cli")]
#[command(about = "Track bills paid at once or in installments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every bill with its payment status
    List {
        /// Only bills with something left to pay
        #[arg(long)]
        open: bool,
    },
    /// Show a bill and its installment schedule
    Show {
        /// Bill id or unique id prefix
        id: String,
    },
    /// Register a new bill
    Add {
        title: String,
        /// Total amount, e.g. `1.234,56` or `1234.56`
        #[arg(allow_hyphen_values = true)]
        total: String,
        /// Split the total into this many installments
        #[arg(short, long)]
        installments: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Amount already paid on a single-payment bill
        #[arg(long, conflicts_with = "installments")]
        paid: Option<String>,
    },
    /// Replace a bill's title, total and payment shape
    Edit {
        id: String,
        title: String,
        #[arg(allow_hyphen_values = true)]
        total: String,
        #[arg(short, long, conflicts_with = "single")]
        installments: Option<String>,
        /// Convert the bill to a single payment
        #[arg(long)]
        single: bool,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Toggle an installment, or the whole bill when paid at once
    Pay { id: String, number: Option<u32> },
    /// Delete a bill
    Delete { id: String },
    /// Show totals across all bills
    Summary,
    /// List saved backups of the bill file, newest first
    Backups,
    /// Replace the bill file with a saved backup
    Restore {
        /// Backup name as shown by `backups`
        backup: String,
    },
    /// Sign in with the local account provider
    Login {
        email: String,
        password: String,
        /// Remember the session for later runs
        #[arg(long)]
        remember: bool,
    },
    /// Create an account with the local account provider
    Register {
        email: String,
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Request a password reset email
    ResetPassword { email: String },
    /// Forget the remembered session
    Logout,
    /// Print the remembered user, if any
    Whoami,
}

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<()> {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }
    let cli = Cli::parse();
    let config = ConfigManager::with_base_dir(default_data_root())?.load()?;
    run(cli.command, &config)
}

pub fn run(command: Commands, config: &Config) -> Result<()> {
    let money = LocaleCurrency::for_locale(&config.locale, &config.currency);
    let sessions = || JsonSessionStore::new(&config.resolve_data_root());
    let open = || BillBook::open(config);

    match command {
        Commands::List { open: only_open } => {
            let book = open()?;
            let bills: Vec<_> = if only_open {
                SummaryService::open_bills(book.bills())
            } else {
                book.bills().iter().collect()
            };
            if bills.is_empty() {
                output::info(if only_open {
                    "No open bills."
                } else {
                    "No bills recorded."
                });
            }
            for bill in bills {
                println!("{}", output::bill_line(bill, &money));
            }
        }
        Commands::Show { id } => {
            let book = open()?;
            let id = book.resolve(&id)?;
            println!("{}", output::bill_details(book.bill(id)?, &money));
        }
        Commands::Add {
            title,
            total,
            installments,
            description,
            paid,
        } => {
            let mut book = open()?;
            let mut draft = BillDraft::new(title, total).with_description(description);
            if let Some(count) = installments {
                draft = draft.with_installments(count);
            }
            if let Some(paid) = paid {
                draft = draft.with_paid_value(paid);
            }
            let bill = book.create(&draft)?;
            output::success(format!("Bill added: {}", output::bill_line(bill, &money)));
        }
        Commands::Edit {
            id,
            title,
            total,
            installments,
            single,
            description,
        } => {
            let mut book = open()?;
            let id = book.resolve(&id)?;
            let existing = book.bill(id)?;
            let mut draft = BillDraft::new(title, total)
                .with_description(description.unwrap_or_else(|| existing.description.clone()));
            let count = match installments {
                Some(count) => Some(count),
                None if !single && existing.has_installments() => {
                    Some(existing.installment_count().to_string())
                }
                None => None,
            };
            if let Some(count) = count {
                draft = draft.with_installments(count);
            }
            let bill = book.edit(id, &draft)?;
            output::success(format!("Bill updated: {}", output::bill_line(bill, &money)));
        }
        Commands::Pay { id, number } => {
            let mut book = open()?;
            let id = book.resolve(&id)?;
            let bill = match (book.bill(id)?.has_installments(), number) {
                (true, Some(number)) => book.toggle_installment(id, number)?,
                (true, None) => {
                    return Err(TrackerError::InvalidInput(
                        "installment number is required for this bill".into(),
                    ))
                }
                (false, None) => book.toggle_paid(id)?,
                (false, Some(_)) => {
                    return Err(TrackerError::InvalidInput(
                        "this bill is paid at once and has no installments".into(),
                    ))
                }
            };
            output::success(format!("Payment updated: {}", output::bill_line(bill, &money)));
        }
        Commands::Delete { id } => {
            let mut book = open()?;
            let id = book.resolve(&id)?;
            book.delete(id)?;
            output::success("Bill deleted.");
        }
        Commands::Summary => {
            let book = open()?;
            println!("{}", output::summary(&book.summary(), &money));
        }
        Commands::Backups => {
            let backups = json_store(config)?.list_backups()?;
            if backups.is_empty() {
                output::info("No backups yet.");
            }
            for backup in &backups {
                println!("{}", output::backup_line(backup));
            }
        }
        Commands::Restore { backup } => {
            let restored = json_store(config)?.restore_backup(&backup)?;
            output::success(format!(
                "Restored {} bill(s) from {}.",
                restored.len(),
                backup
            ));
        }
        Commands::Login {
            email,
            password,
            remember,
        } => {
            let session = SessionService::sign_in(
                &StubAuthProvider::default(),
                &sessions(),
                &email,
                &password,
                remember || config.remember_session,
            )?;
            if let Some(user) = session.user {
                output::success(format!("Signed in as {}", output::user_label(&user)));
            }
        }
        Commands::Register {
            email,
            password,
            name,
        } => {
            let user = SessionService::sign_up(
                &StubAuthProvider::default(),
                &email,
                &password,
                SignUpMetadata { display_name: name },
            )?;
            output::success(format!("Account created for {}", output::user_label(&user)));
        }
        Commands::ResetPassword { email } => {
            SessionService::reset_password(&StubAuthProvider::default(), &email)?;
            output::success(format!("Password reset requested for {}", email.trim()));
        }
        Commands::Logout => {
            SessionService::sign_out(&sessions());
            output::success("Signed out.");
        }
        Commands::Whoami => match SessionService::restore(&sessions()).user {
            Some(user) => output::info(output::user_label(&user)),
            None => output::info("Not signed in."),
        },
    }
    Ok(())
}
