use colored::Colorize;
use std::fmt;

use tracker_core::{BillService, CurrencyFormatter, LedgerSummary};
use tracker_domain::{Bill, Displayable, User};
use tracker_storage_json::BackupInfo;

const SHORT_ID_LEN: usize = 8;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Success => text.bright_green().to_string(),
        MessageKind::Warning => text.bright_yellow().to_string(),
        MessageKind::Info => text,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    println!("{}", apply_style(kind, message));
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn short_id(bill: &Bill) -> String {
    bill.id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// One-line listing entry: short id, label and paid / total amounts.
pub fn bill_line(bill: &Bill, money: &dyn CurrencyFormatter) -> String {
    let label = if BillService::is_settled(bill) {
        bill.display_label().green().to_string()
    } else {
        bill.display_label()
    };
    format!(
        "{}  {}  {} / {}",
        short_id(bill).dimmed(),
        label,
        money.format_amount(BillService::paid_total(bill)),
        money.format_amount(bill.total_value)
    )
}

pub fn bill_details(bill: &Bill, money: &dyn CurrencyFormatter) -> String {
    let mut lines = vec![
        bill.title.bold().to_string(),
        format!("  id:        {}", bill.id),
    ];
    if !bill.description.is_empty() {
        lines.push(format!("  notes:     {}", bill.description));
    }
    lines.push(format!(
        "  created:   {}",
        bill.created_at.format(DATE_FORMAT)
    ));
    lines.push(format!("  total:     {}", money.format_amount(bill.total_value)));
    lines.push(format!(
        "  paid:      {}",
        money.format_amount(BillService::paid_total(bill))
    ));
    lines.push(format!(
        "  remaining: {}",
        money.format_amount(BillService::remaining(bill))
    ));
    match BillService::progress(bill) {
        Ok(progress) => {
            lines.push(format!("  progress:  {:.0}%", progress));
            for installment in bill.installments() {
                let mark = if installment.paid {
                    "[x]".green().to_string()
                } else {
                    "[ ]".to_string()
                };
                let mut line = format!(
                    "  {} #{:<3} {}",
                    mark,
                    installment.number,
                    money.format_amount(installment.amount)
                );
                if let Some(paid_at) = installment.paid_at {
                    line.push_str(&format!("  paid {}", paid_at.format(DATE_FORMAT)));
                }
                lines.push(line);
            }
        }
        Err(_) => lines.push(format!("  status:    {}", bill.payment)),
    }
    lines.join("\n")
}

pub fn summary(summary: &LedgerSummary, money: &dyn CurrencyFormatter) -> String {
    let remaining = money.format_amount(summary.remaining_value);
    let remaining = if summary.open_count() > 0 {
        apply_style(MessageKind::Warning, remaining)
    } else {
        remaining
    };
    [
        format!(
            "Bills:     {} ({} settled, {} open)",
            summary.bill_count,
            summary.settled_count,
            summary.open_count()
        ),
        format!("Total:     {}", money.format_amount(summary.total_value)),
        format!("Paid:      {}", money.format_amount(summary.paid_value)),
        format!("Remaining: {}", remaining),
    ]
    .join("\n")
}

pub fn backup_line(backup: &BackupInfo) -> String {
    match backup.created_at {
        Some(created_at) => format!(
            "{}  {}",
            backup.id,
            created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        ),
        None => backup.id.clone(),
    }
}

pub fn user_label(user: &User) -> String {
    match (&user.display_name, &user.email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (None, Some(email)) => email.clone(),
        (Some(name), None) => name.clone(),
        (None, None) => user.id.clone(),
    }
}
