use futures_util::future::LocalBoxFuture;

use crate::collaborators::Collaborators;
use crate::config::NavigationConfig;
use crate::context::{Guard, NavigationContext, OperationToken};
use crate::diagnostics::NavigationDiagnostics;
use crate::error::NavigationError;
use crate::history::HistoryPort;
use crate::profile::ProfileStep;
use crate::sequencer::Sequencer;
use crate::state::NavigationState;
use crate::subsections::SubsectionStep;
use crate::surface::ViewSurface;
use crate::transitions::SectionStep;

/// A deferred navigation step.
#[derive(Debug)]
pub(crate) enum Step {
    Subsection(SubsectionStep),
    Section(SectionStep),
    Profile(ProfileStep),
    RestoreProfile {
        state: NavigationState,
        token: OperationToken,
    },
    ReplaceHistory {
        token: OperationToken,
    },
    ReleaseGuard {
        guard: Guard,
        token: OperationToken,
    },
}

/// Borrowed view of everything a controller may touch while handling one
/// call or one step.
pub(crate) struct Stage<'a> {
    pub surface: &'a mut dyn ViewSurface,
    pub history: &'a mut dyn HistoryPort,
    pub collaborators: &'a mut dyn Collaborators,
    pub sequencer: &'a mut Sequencer<Step>,
    pub context: &'a mut NavigationContext,
    pub config: &'a NavigationConfig,
    pub diagnostics: &'a mut NavigationDiagnostics,
    pub loads: &'a mut Vec<LocalBoxFuture<'static, ()>>,
}

impl Stage<'_> {
    /// Ends the current sub-step. The surrounding operation carries on.
    pub fn abort(&mut self, step: &'static str, error: NavigationError) {
        tracing::warn!(step, error = %error, "navigation step aborted");
        self.diagnostics.record_error(&error);
    }
}
