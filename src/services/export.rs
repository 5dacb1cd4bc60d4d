use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::models::contracts::Contract;

pub const EXPORT_HEADERS: [&str; 14] = [
    "Contract ID",
    "Status",
    "Contractor ID",
    "Worker ID",
    "Daily Wage",
    "Days",
    "Workers Required",
    "Hours/Day",
    "Overtime Rate",
    "Total Amount",
    "Contractor Signed",
    "Worker Signed",
    "Created At",
    "Posted At",
];

const NOT_ASSIGNED: &str = "Not Assigned";
const NOT_SIGNED: &str = "Not Signed";

/// Header row plus one fully quoted row per contract, `\n`-separated.
pub fn contracts_to_csv(contracts: &[Contract]) -> String {
    let mut lines = Vec::with_capacity(contracts.len() + 1);
    lines.push(EXPORT_HEADERS.join(","));
    lines.extend(contracts.iter().map(|c| {
        row(c)
            .iter()
            .map(|cell| quote(cell))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("contracts_{}.csv", date.format("%Y-%m-%d"))
}

fn row(c: &Contract) -> [String; 14] {
    [
        c.id.clone(),
        c.status.as_str().to_string(),
        c.contractor_id.clone(),
        c.worker_id
            .clone()
            .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
        c.daily_wage.to_string(),
        c.number_of_days.to_string(),
        c.workers_required.to_string(),
        c.work_hours_per_day.to_string(),
        c.overtime_rate_per_hour.to_string(),
        c.total_contract_amount.to_string(),
        signed(c.contractor_accepted_at),
        signed(c.worker_accepted_at),
        timestamp(c.created_at),
        timestamp(c.posted_at),
    ]
}

fn signed(at: Option<DateTime<Utc>>) -> String {
    at.map(timestamp).unwrap_or_else(|| NOT_SIGNED.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
