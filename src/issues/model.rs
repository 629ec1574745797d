//! Issue data shapes and the wire/UI mapping
//!
//! The service speaks in *wire codes* (`in_progress`, `high`) and ISO-8601
//! timestamps; presentation code works with *display labels*
//! (`In Progress`, `High`), badge colors and short dates. This module owns
//! the fixed code tables and the conversions between the two shapes.
//!
//! | status code   | label       | badge     | chart     |
//! |---------------|-------------|-----------|-----------|
//! | `backlog`     | Backlog     | `#777777` | `#a0a0a0` |
//! | `todo`        | Todo        | `#9B59B6` | `#feca57` |
//! | `in_progress` | In Progress | `#F0AD4E` | `#575fcf` |
//! | `done`        | Done        | `#5CB85C` | `#1dd1a1` |
//!
//! | priority code | label  | badge     |
//! |---------------|--------|-----------|
//! | `low`         | Low    | `#3498DB` |
//! | `medium`      | Medium | `#9B59B6` |
//! | `high`        | High   | `#D9534F` |
//!
//! Lookups are exact. A value outside the tables is an
//! [`IssueDeskError::UnrecognizedCode`], never a silent default.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IssueDeskError, Result};

/// Issue workflow state.
///
/// Variants are declared in the fixed display order, so `status as usize`
/// is the position in [`IssueStatus::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Not yet scheduled
    Backlog,
    /// Scheduled, not started
    Todo,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

impl IssueStatus {
    /// All statuses in the fixed display order.
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Backlog,
        IssueStatus::Todo,
        IssueStatus::InProgress,
        IssueStatus::Done,
    ];

    /// Wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Badge color used in lists and detail views.
    pub fn color(self) -> &'static str {
        match self {
            Self::Backlog => "#777777",
            Self::Todo => "#9B59B6",
            Self::InProgress => "#F0AD4E",
            Self::Done => "#5CB85C",
        }
    }

    /// Slice color used in the dashboard status chart.
    pub fn chart_color(self) -> &'static str {
        match self {
            Self::Backlog => "#a0a0a0",
            Self::Todo => "#feca57",
            Self::InProgress => "#575fcf",
            Self::Done => "#1dd1a1",
        }
    }

    /// Looks up a wire code.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| IssueDeskError::unrecognized_status(code))
    }

    /// Looks up a display label.
    pub fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label() == label)
            .ok_or_else(|| IssueDeskError::unrecognized_status(label))
    }

    /// Badge for this status.
    pub fn badge(self) -> Badge {
        Badge {
            label: self.label(),
            color: self.color(),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IssueStatus {
    type Err = IssueDeskError;

    /// Accepts either a wire code or a display label.
    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s).or_else(|_| Self::from_label(s))
    }
}

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    /// Low priority
    Low,
    /// Medium priority
    Medium,
    /// High priority
    High,
}

impl IssuePriority {
    /// All priorities in display order.
    pub const ALL: [IssuePriority; 3] = [
        IssuePriority::Low,
        IssuePriority::Medium,
        IssuePriority::High,
    ];

    /// Wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Badge color.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#3498DB",
            Self::Medium => "#9B59B6",
            Self::High => "#D9534F",
        }
    }

    /// Looks up a wire code.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| IssueDeskError::unrecognized_priority(code))
    }

    /// Looks up a display label.
    pub fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == label)
            .ok_or_else(|| IssueDeskError::unrecognized_priority(label))
    }

    /// Badge for this priority.
    pub fn badge(self) -> Badge {
        Badge {
            label: self.label(),
            color: self.color(),
        }
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IssuePriority {
    type Err = IssueDeskError;

    /// Accepts either a wire code or a display label.
    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s).or_else(|_| Self::from_label(s))
    }
}

/// Converts a status display label to its wire code.
///
/// # Examples
///
/// ```
/// use issuedesk::issues::status_api_value;
///
/// assert_eq!(status_api_value("In Progress").unwrap(), "in_progress");
/// assert!(status_api_value("Open").is_err());
/// ```
pub fn status_api_value(label: &str) -> Result<&'static str> {
    IssueStatus::from_label(label).map(IssueStatus::code)
}

/// Converts a priority display label to its wire code.
pub fn priority_api_value(label: &str) -> Result<&'static str> {
    IssuePriority::from_label(label).map(IssuePriority::code)
}

/// Converts a status wire code to its display label.
pub fn status_label(code: &str) -> Result<&'static str> {
    IssueStatus::from_code(code).map(IssueStatus::label)
}

/// Converts a priority wire code to its display label.
pub fn priority_label(code: &str) -> Result<&'static str> {
    IssuePriority::from_code(code).map(IssuePriority::label)
}

/// Display label plus color, consumed by presentation code as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    /// Display label
    pub label: &'static str,
    /// Hex color
    pub color: &'static str,
}

/// Issue exactly as exchanged with the service.
///
/// `status` and `priority` stay raw strings here so that an unknown code
/// surfaces as [`IssueDeskError::UnrecognizedCode`] during mapping rather
/// than as an opaque decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireIssue {
    /// Server-assigned identifier
    pub id: u64,
    /// Short summary
    pub title: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Status wire code
    pub status: String,
    /// Priority wire code
    pub priority: String,
    /// Creation timestamp (ISO-8601)
    pub created_at: String,
    /// Last update timestamp (ISO-8601)
    #[serde(default)]
    pub updated_at: String,
    /// Owner
    #[serde(default)]
    pub user_id: String,
}

impl WireIssue {
    /// Maps to the display shape.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::UnrecognizedCode`] for an unknown status or
    /// priority and [`IssueDeskError::Unknown`] for an unparsable
    /// `createdAt`.
    pub fn to_ui(&self) -> Result<UiIssue> {
        let status = IssueStatus::from_code(&self.status)?;
        let priority = IssuePriority::from_code(&self.priority)?;
        Ok(UiIssue {
            id: self.id.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: status.badge(),
            priority: priority.badge(),
            created: format_short_date(&self.created_at)?,
        })
    }
}

/// Issue as consumed by presentation code. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiIssue {
    /// Stringified wire id
    pub id: String,
    /// Short summary
    pub title: String,
    /// Long description
    pub description: String,
    /// Status badge
    pub status: Badge,
    /// Priority badge
    pub priority: Badge,
    /// Short creation date, e.g. `Sep 17`
    pub created: String,
}

/// Payload of a new issue, using wire codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    /// Short summary
    pub title: String,
    /// Long description
    pub description: String,
    /// Status wire code
    pub status: String,
    /// Priority wire code
    pub priority: String,
}

impl NewIssue {
    /// Builds a payload from typed status and priority.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: IssueStatus,
        priority: IssuePriority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: status.code().to_string(),
            priority: priority.code().to_string(),
        }
    }

    /// Checks required fields and codes before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Validation`] for an empty title or
    /// description, or a status/priority outside the code tables.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.description, &self.status, &self.priority)
    }
}

/// Full replacement of an issue's editable fields, using wire codes.
pub type IssueUpdate = NewIssue;

/// Body of `PUT /issues/{id}`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateBody<'a> {
    pub id: u64,
    #[serde(flatten)]
    pub fields: &'a IssueUpdate,
}

fn validate_fields(title: &str, description: &str, status: &str, priority: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(IssueDeskError::Validation("title cannot be empty".to_string()));
    }
    if description.trim().is_empty() {
        return Err(IssueDeskError::Validation(
            "description cannot be empty".to_string(),
        ));
    }
    IssueStatus::from_code(status).map_err(|_| {
        IssueDeskError::Validation(format!(
            "status must be one of backlog, todo, in_progress, done; got {:?}",
            status
        ))
    })?;
    IssuePriority::from_code(priority).map_err(|_| {
        IssueDeskError::Validation(format!(
            "priority must be one of low, medium, high; got {:?}",
            priority
        ))
    })?;
    Ok(())
}

/// Renders an ISO-8601 timestamp as `%b %-d` (e.g. `Sep 17`).
///
/// Timestamps with an offset are converted to UTC; naive timestamps are
/// taken as UTC.
///
/// # Errors
///
/// Returns [`IssueDeskError::Unknown`] if `timestamp` cannot be parsed.
///
/// # Examples
///
/// ```
/// use issuedesk::issues::format_short_date;
///
/// assert_eq!(format_short_date("2025-09-17T10:00:00Z").unwrap(), "Sep 17");
/// assert_eq!(format_short_date("2025-01-05T08:30:00.123456").unwrap(), "Jan 5");
/// ```
pub fn format_short_date(timestamp: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .map_err(|e| IssueDeskError::Unknown(format!("invalid timestamp {:?}: {}", timestamp, e)))?;
    Ok(parsed.format("%b %-d").to_string())
}

/// One point of the completion trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Axis label
    pub label: String,
    /// Value
    pub data: f64,
}

/// One raw entry of the server's status distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCountWire {
    /// Status wire code
    pub status: String,
    /// Number of issues
    pub count: u64,
}

/// Dashboard payload exactly as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWire {
    /// Total number of issues
    pub total_tasks: u64,
    /// Number of finished issues
    pub completed_tasks: u64,
    /// Completion rate as reported by the server
    pub completion_rate: f64,
    /// Trend series
    #[serde(default)]
    pub task_completion_trend: Vec<TrendPoint>,
    /// Per-status counts; statuses may be missing
    #[serde(default)]
    pub task_status_distribution: Vec<StatusCountWire>,
}

/// One slice of the merged status distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
    /// Status
    pub status: IssueStatus,
    /// Display label
    pub label: &'static str,
    /// Chart color
    pub color: &'static str,
    /// Number of issues (zero when the server omitted the status)
    pub count: u64,
}

/// Dashboard snapshot handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Total number of issues
    pub total_tasks: u64,
    /// Number of finished issues
    pub completed_tasks: u64,
    /// Completion rate as reported by the server
    pub completion_rate: f64,
    /// Trend series, in server order
    pub task_completion_trend: Vec<TrendPoint>,
    /// Exactly one slice per status, ordered backlog, todo, in_progress, done
    pub task_status_distribution: Vec<StatusSlice>,
}

impl DashboardSnapshot {
    /// Returns `true` if any status has a non-zero count.
    pub fn has_distribution_data(&self) -> bool {
        self.task_status_distribution.iter().any(|s| s.count > 0)
    }

    /// Trend labels, for the chart x-axis.
    pub fn trend_labels(&self) -> Vec<&str> {
        self.task_completion_trend
            .iter()
            .map(|p| p.label.as_str())
            .collect()
    }

    /// Trend values, in the same order as [`Self::trend_labels`].
    pub fn trend_values(&self) -> Vec<f64> {
        self.task_completion_trend.iter().map(|p| p.data).collect()
    }
}

impl DashboardWire {
    /// Merges the distribution against the fixed status set.
    ///
    /// Statuses absent from the response get a zero count; when the server
    /// repeats a status the last entry wins.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::UnrecognizedCode`] for an unknown status.
    pub fn into_snapshot(self) -> Result<DashboardSnapshot> {
        let mut counts = [0u64; IssueStatus::ALL.len()];
        for entry in &self.task_status_distribution {
            let status = IssueStatus::from_code(&entry.status)?;
            counts[status as usize] = entry.count;
        }

        let task_status_distribution = IssueStatus::ALL
            .into_iter()
            .zip(counts)
            .map(|(status, count)| StatusSlice {
                status,
                label: status.label(),
                color: status.chart_color(),
                count,
            })
            .collect();

        Ok(DashboardSnapshot {
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            completion_rate: self.completion_rate,
            task_completion_trend: self.task_completion_trend,
            task_status_distribution,
        })
    }
}
