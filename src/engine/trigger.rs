//! engine::trigger
//!
//! The synchronization trigger exposed to outside callers.
//!
//! A call always yields a [`TriggerResponse`]; failures are reported in the
//! body rather than as an error.
//!
//! ```json
//! {"success":true,"updated":3,"skipped":3,
//!  "correlations":{"slugGroupId":"…/slug","redirectGroupId":"…/redirect"}}
//! {"success":false,"message":"actor 'eve' may not synchronize slugs"}
//! ```

use serde::{Deserialize, Serialize};

use super::sync::{SyncError, SyncReport, Synchronizer};
use super::Context;
use crate::core::ops::CorrelationGroup;
use crate::core::types::NodeId;

/// Correlation ids of a run, as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlations {
    pub slug_group_id: String,
    pub redirect_group_id: String,
}

impl From<&CorrelationGroup> for Correlations {
    fn from(group: &CorrelationGroup) -> Self {
        Self {
            slug_group_id: group.slug.to_string(),
            redirect_group_id: group.redirect.to_string(),
        }
    }
}

/// Body returned to the caller of the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlations: Option<Correlations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TriggerResponse {
    pub fn from_result(result: &Result<SyncReport, SyncError>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                updated: Some(report.updated),
                skipped: Some(report.skipped),
                correlations: Some(Correlations::from(&report.correlation)),
                message: None,
            },
            Err(err) => Self {
                success: false,
                updated: None,
                skipped: None,
                correlations: None,
                message: Some(err.to_string()),
            },
        }
    }
}

/// Synchronize `node` and render the outcome.
pub fn trigger(sync: &Synchronizer<'_>, node: NodeId, ctx: &Context) -> TriggerResponse {
    TriggerResponse::from_result(&sync.synchronize(node, ctx))
}
