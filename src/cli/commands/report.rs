use chrono::{Datelike, Utc};
use clap::Subcommand;

use crate::cli::utils::{pool, print_json};
use crate::cli::OutputFormat;
use crate::config::CONFIG;
use crate::services::reports::ReportService;

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Monthly income, expense and tithes for a year")]
    Summary {
        #[arg(long, help = "Defaults to the current year")]
        year: Option<i32>,
    },

    #[command(about = "Budgeted against actual per category")]
    Budget {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, help = "Omit for the annual budgets")]
        month: Option<i32>,
    },
}

pub async fn handle(cmd: ReportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let reports = ReportService::new(pool()?);
    let currency = &CONFIG.finance.currency;

    match cmd {
        ReportCommands::Summary { year } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let summary = reports.financial_summary(year).await?;
            match output_format {
                OutputFormat::Json => print_json(&summary),
                OutputFormat::Text => {
                    println!("Financial summary {} ({})", summary.year, currency);
                    println!("{:<6} {:>14} {:>14} {:>14} {:>14}", "MONTH", "INCOME", "EXPENSE", "TITHES", "BALANCE");
                    println!("{}", "-".repeat(66));
                    for m in &summary.months {
                        println!(
                            "{:<6} {:>14} {:>14} {:>14} {:>14}",
                            m.month, m.income, m.expense, m.tithes, m.balance
                        );
                    }
                    println!("{}", "-".repeat(66));
                    let t = &summary.totals;
                    println!("{:<6} {:>14} {:>14} {:>14} {:>14}", "TOTAL", t.income, t.expense, t.tithes, t.balance);
                    Ok(())
                }
            }
        }
        ReportCommands::Budget { year, month } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let execution = reports.budget_execution(year, month).await?;
            match output_format {
                OutputFormat::Json => print_json(&execution),
                OutputFormat::Text => {
                    let period = match month {
                        Some(m) => format!("{}-{:02}", year, m),
                        None => year.to_string(),
                    };
                    println!("Budget execution {} ({})", period, currency);
                    println!("{:<28} {:>12} {:>12} {:>12} {:>8}", "CATEGORY", "BUDGETED", "ACTUAL", "VARIANCE", "USED %");
                    println!("{}", "-".repeat(76));
                    for line in &execution.lines {
                        let used = line.percent_used.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<28} {:>12} {:>12} {:>12} {:>8}",
                            line.category_name, line.budgeted, line.actual, line.variance, used
                        );
                    }
                    Ok(())
                }
            }
        }
    }
}
