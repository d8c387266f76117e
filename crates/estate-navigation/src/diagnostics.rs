use serde::Serialize;

use crate::error::NavigationError;
use crate::history::PushOutcome;
use crate::state::{AccountTab, ProfileRoute, Section};
use crate::transitions::TransitionRequest;

/// Counters and the latest failure, exported to the page for debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDiagnostics {
    pub active_section: Option<Section>,
    pub profile_route: Option<ProfileRoute>,
    pub account_tab: Option<AccountTab>,
    pub last_transition: Option<TransitionRequest>,
    pub pushes: u64,
    pub deduplicated_pushes: u64,
    pub suppressed_pushes: u64,
    pub failed_pushes: u64,
    pub restores: u64,
    pub aborted_steps: u64,
    pub last_error: Option<String>,
}

impl NavigationDiagnostics {
    pub(crate) fn record_push(&mut self, outcome: &PushOutcome) {
        match outcome {
            PushOutcome::Pushed(_) => self.pushes += 1,
            PushOutcome::Unchanged => self.deduplicated_pushes += 1,
            PushOutcome::Suppressed(_) => self.suppressed_pushes += 1,
            PushOutcome::Failed(error) => {
                self.failed_pushes += 1;
                self.last_error = Some(error.to_string());
            }
        }
    }

    pub(crate) fn record_error(&mut self, error: &NavigationError) {
        self.aborted_steps += 1;
        self.last_error = Some(error.to_string());
    }

    pub fn to_json(&self) -> Result<String, NavigationError> {
        serde_json::to_string(self).map_err(|error| NavigationError::Encode {
            message: error.to_string(),
        })
    }
}
