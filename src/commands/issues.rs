//! Issue commands
//!
//! Status and priority arguments are taken as display labels ("In Progress",
//! "High"); wire codes are accepted as well. Both are converted before any
//! request is sent.

use colored::Colorize;
use prettytable::{cell, row, Table};

use crate::commands::{paint_badge, print_json};
use crate::error::{IssueDeskError, Result};
use crate::issues::{
    parse_issue_id, priority_api_value, status_api_value, IssuePriority, IssueService,
    IssueStatus, NewIssue, UiIssue,
};

/// Convert a status argument to its wire code.
fn status_arg(value: &str) -> Result<&'static str> {
    status_api_value(value)
        .or_else(|_| IssueStatus::from_code(value).map(IssueStatus::code))
        .map_err(|_| {
            IssueDeskError::Validation(format!(
                "unknown status {:?}; expected one of: {}",
                value,
                IssueStatus::ALL
                    .iter()
                    .map(|s| s.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
}

/// Convert a priority argument to its wire code.
fn priority_arg(value: &str) -> Result<&'static str> {
    priority_api_value(value)
        .or_else(|_| IssuePriority::from_code(value).map(IssuePriority::code))
        .map_err(|_| {
            IssueDeskError::Validation(format!(
                "unknown priority {:?}; expected one of: {}",
                value,
                IssuePriority::ALL
                    .iter()
                    .map(|p| p.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
}

fn build_payload(title: &str, description: &str, status: &str, priority: &str) -> Result<NewIssue> {
    Ok(NewIssue {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        status: status_arg(status)?.to_string(),
        priority: priority_arg(priority)?.to_string(),
    })
}

fn issues_table(issues: &[UiIssue]) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "ID".bold(),
        "Title".bold(),
        "Status".bold(),
        "Priority".bold(),
        "Created".bold()
    ]);
    for issue in issues {
        table.add_row(row![
            issue.id,
            issue.title,
            paint_badge(&issue.status),
            paint_badge(&issue.priority),
            issue.created
        ]);
    }
    table
}

fn print_issue(issue: &UiIssue) {
    println!("\n{} {}\n", format!("#{}", issue.id).dimmed(), issue.title.bold());
    println!("Status:       {}", paint_badge(&issue.status));
    println!("Priority:     {}", paint_badge(&issue.priority));
    println!("Created:      {}", issue.created);
    println!("\n{}\n", issue.description);
}

/// List all issues.
pub async fn list(service: &IssueService, json: bool) -> Result<()> {
    let issues = service.list().await?;
    if json {
        return print_json(&issues);
    }
    if issues.is_empty() {
        println!("No issues found");
        return Ok(());
    }
    println!();
    issues_table(&issues).printstd();
    println!("\n{} issue(s)\n", issues.len());
    Ok(())
}

/// Show a single issue.
pub async fn show(service: &IssueService, id: &str, json: bool) -> Result<()> {
    let issue = service.get_by_id(parse_issue_id(id)?).await?;
    if json {
        return print_json(&issue);
    }
    print_issue(&issue);
    Ok(())
}

/// Create an issue.
pub async fn create(
    service: &IssueService,
    title: &str,
    description: &str,
    status: &str,
    priority: &str,
) -> Result<()> {
    let payload = build_payload(title, description, status, priority)?;
    let created = service.create(&payload).await?;
    match created.as_slice() {
        [] => println!("{} Issue created", "✓".green()),
        issues => {
            for issue in issues {
                println!("{} Created issue #{}: {}", "✓".green(), issue.id, issue.title);
            }
        }
    }
    Ok(())
}

/// Replace an issue's title, description, status and priority.
pub async fn update(
    service: &IssueService,
    id: &str,
    title: &str,
    description: &str,
    status: &str,
    priority: &str,
) -> Result<()> {
    let id = parse_issue_id(id)?;
    let payload = build_payload(title, description, status, priority)?;
    match service.update(id, &payload).await? {
        Some(issue) => print_issue(&issue),
        None => println!("{} Issue #{} updated", "✓".green(), id),
    }
    Ok(())
}

/// Delete an issue. Deleting an issue that is already gone is reported, not
/// treated as a failure.
pub async fn delete(service: &IssueService, id: &str) -> Result<()> {
    let id = parse_issue_id(id)?;
    match service.remove(id).await {
        Ok(()) => println!("{} Issue #{} deleted", "✓".green(), id),
        Err(e) if e.is_not_found() => {
            println!("{} Issue #{} was already deleted", "!".yellow(), id)
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_arg_accepts_labels_and_codes() {
        assert_eq!(status_arg("In Progress").unwrap(), "in_progress");
        assert_eq!(status_arg("in_progress").unwrap(), "in_progress");
        assert_eq!(status_arg("Backlog").unwrap(), "backlog");
    }

    #[test]
    fn test_status_arg_unknown_is_validation() {
        let err = status_arg("Blocked").unwrap_err();
        assert!(matches!(err, IssueDeskError::Validation(_)));
        assert!(err.to_string().contains("In Progress"));
    }

    #[test]
    fn test_priority_arg() {
        assert_eq!(priority_arg("High").unwrap(), "high");
        assert_eq!(priority_arg("low").unwrap(), "low");
        assert!(matches!(
            priority_arg("Urgent"),
            Err(IssueDeskError::Validation(_))
        ));
    }

    #[test]
    fn test_build_payload_uses_wire_codes() {
        let payload = build_payload(" t ", "d", "Todo", "Medium").unwrap();
        assert_eq!(payload.title, "t");
        assert_eq!(payload.status, "todo");
        assert_eq!(payload.priority, "medium");
    }

    #[test]
    fn test_issues_table_has_header_and_rows() {
        let issue = UiIssue {
            id: "1".to_string(),
            title: "Fix login".to_string(),
            description: "d".to_string(),
            status: IssueStatus::Todo.badge(),
            priority: IssuePriority::High.badge(),
            created: "Sep 17".to_string(),
        };
        let table = issues_table(&[issue]);
        assert_eq!(table.len(), 2);
    }
}
