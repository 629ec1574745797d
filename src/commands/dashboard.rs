//! Dashboard command

use colored::Colorize;
use prettytable::{cell, row, Table};

use crate::commands::{paint, print_json};
use crate::error::Result;
use crate::issues::{DashboardSnapshot, IssueService};

/// Width of the longest distribution bar.
const BAR_WIDTH: u64 = 30;

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let (count, max) = (u128::from(count), u128::from(max));
    let len = (count * u128::from(BAR_WIDTH) + max - 1) / max;
    "█".repeat(len as usize)
}

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

fn render(snapshot: &DashboardSnapshot) {
    println!("\n{}\n", "Dashboard".bold());
    println!("Total tasks:      {}", snapshot.total_tasks);
    println!("Completed tasks:  {}", snapshot.completed_tasks);
    println!("Completion rate:  {}", percent(snapshot.completion_rate));

    println!("\n{}", "Status distribution".bold());
    if snapshot.has_distribution_data() {
        let max = snapshot
            .task_status_distribution
            .iter()
            .map(|slice| slice.count)
            .max()
            .unwrap_or(0);
        for slice in &snapshot.task_status_distribution {
            println!(
                "  {:<12} {:>4}  {}",
                slice.label,
                slice.count,
                paint(&bar(slice.count, max), slice.color)
            );
        }
    } else {
        println!("  No data available");
    }

    if !snapshot.task_completion_trend.is_empty() {
        println!("\n{}", "Completion trend".bold());
        let mut table = Table::new();
        table.add_row(row!["Period".bold(), "Completed".bold()]);
        for point in &snapshot.task_completion_trend {
            table.add_row(row![point.label, point.data]);
        }
        table.printstd();
    }
    println!();
}

/// Fetch and print the dashboard snapshot.
pub async fn show(service: &IssueService, json: bool) -> Result<()> {
    let snapshot = service.dashboard().await?;
    if json {
        return print_json(&snapshot);
    }
    render(&snapshot);
    Ok(())
}
