//! Issue mapping layer
//!
//! CRUD against the issue resource, dashboard retrieval, and the
//! normalization of every response into the display shape. Failures are
//! never papered over: a call either returns fully mapped data or an error,
//! and nothing is cached between calls.

use std::sync::Arc;

use reqwest::Method;

use crate::error::{IssueDeskError, Result};
use crate::http::ApiClient;
use crate::sequence::{RequestSequencer, Sequenced};

pub mod model;

pub use model::{
    format_short_date, priority_api_value, priority_label, status_api_value, status_label, Badge,
    DashboardSnapshot, DashboardWire, IssuePriority, IssueStatus, IssueUpdate, NewIssue,
    StatusCountWire, StatusSlice, TrendPoint, UiIssue, WireIssue,
};

use model::UpdateBody;

const LIST_PATH: &str = "/issues/list";

/// Parses the string id carried by a [`UiIssue`] back into a wire id.
///
/// # Errors
///
/// Returns [`IssueDeskError::Validation`] unless `id` is a positive integer.
///
/// # Examples
///
/// ```
/// use issuedesk::issues::parse_issue_id;
///
/// assert_eq!(parse_issue_id("17").unwrap(), 17);
/// assert!(parse_issue_id("0").is_err());
/// assert!(parse_issue_id("abc").is_err());
/// ```
pub fn parse_issue_id(id: &str) -> Result<u64> {
    match id.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(IssueDeskError::Validation(format!(
            "issue id must be a positive integer, got {:?}",
            id
        ))),
    }
}

fn check_id(id: u64) -> Result<()> {
    if id == 0 {
        return Err(IssueDeskError::Validation(
            "issue id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn map_all(issues: &[WireIssue]) -> Result<Vec<UiIssue>> {
    issues.iter().map(WireIssue::to_ui).collect()
}

/// Issue operations over a shared [`ApiClient`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use issuedesk::config::ApiConfig;
/// use issuedesk::http::ApiClient;
/// use issuedesk::issues::IssueService;
/// use issuedesk::session::MemorySessionStore;
///
/// # async fn example() -> issuedesk::error::Result<()> {
/// let client = ApiClient::new(&ApiConfig::default(), Arc::new(MemorySessionStore::new()))?;
/// let issues = IssueService::new(Arc::new(client));
/// for issue in issues.list().await? {
///     println!("{} [{}]", issue.title, issue.status.label);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IssueService {
    client: Arc<ApiClient>,
}

impl IssueService {
    /// Creates the service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Sequencer that stamps list requests.
    ///
    /// Other issue calls never advance it, so a list ticket stays the latest
    /// until the next list is sent.
    pub fn list_sequencer(&self) -> Arc<RequestSequencer> {
        self.client.sequencer(&Method::GET, LIST_PATH)
    }

    /// Fetches every issue visible to the current session.
    ///
    /// # Errors
    ///
    /// Any HTTP or mapping failure fails the whole call; no partial list is
    /// ever returned.
    pub async fn list(&self) -> Result<Vec<UiIssue>> {
        Ok(self.list_sequenced().await?.value)
    }

    /// Like [`Self::list`], with the ticket of the request that produced the
    /// result so callers can discard stale responses.
    pub async fn list_sequenced(&self) -> Result<Sequenced<Vec<UiIssue>>> {
        let response = self.client.get(LIST_PATH).await?;
        let wire: Vec<WireIssue> = response.json()?;
        let value = map_all(&wire)?;
        tracing::debug!(count = value.len(), "Fetched issue list");
        Ok(Sequenced {
            ticket: response.ticket,
            value,
        })
    }

    /// Fetches a single issue.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Validation`] for id `0` without sending a
    /// request.
    pub async fn get_by_id(&self, id: u64) -> Result<UiIssue> {
        check_id(id)?;
        let response = self.client.get(&format!("/issues/{}", id)).await?;
        let wire: WireIssue = response.json()?;
        wire.to_ui()
    }

    /// Creates an issue through the bulk-create endpoint.
    ///
    /// The payload is sent as a one-element array. Created issues echoed by
    /// the server are returned in display form; an empty body yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Validation`] before any request if a field
    /// is empty or a code is outside the tables.
    pub async fn create(&self, issue: &NewIssue) -> Result<Vec<UiIssue>> {
        issue.validate()?;
        let response = self
            .client
            .post("/issues/bulk-add", Some(std::slice::from_ref(issue)))
            .await?;
        if response.is_empty() {
            return Ok(Vec::new());
        }
        let created: Vec<WireIssue> = response.json()?;
        tracing::info!(count = created.len(), "Created issue");
        map_all(&created)
    }

    /// Replaces title, description, status and priority of an issue.
    ///
    /// Returns the updated issue if the server echoes it.
    pub async fn update(&self, id: u64, update: &IssueUpdate) -> Result<Option<UiIssue>> {
        check_id(id)?;
        update.validate()?;
        let body = UpdateBody { id, fields: update };
        let response = self.client.put(&format!("/issues/{}", id), &body).await?;
        tracing::info!(id, "Updated issue");
        if response.is_empty() {
            return Ok(None);
        }
        let wire: WireIssue = response.json()?;
        wire.to_ui().map(Some)
    }

    /// Deletes an issue.
    ///
    /// A repeated delete surfaces the server's error; callers may check
    /// [`IssueDeskError::is_not_found`] and treat it as already deleted.
    pub async fn remove(&self, id: u64) -> Result<()> {
        check_id(id)?;
        self.client.delete(&format!("/issues/{}", id)).await?;
        tracing::info!(id, "Deleted issue");
        Ok(())
    }

    /// Fetches the dashboard snapshot.
    ///
    /// Aggregates are taken as reported; only the status distribution is
    /// merged against the fixed status set.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot> {
        let response = self.client.get("/issues/dashboard").await?;
        let wire: DashboardWire = response.json()?;
        wire.into_snapshot()
    }
}
