//! Section, profile-route and browser-history navigation for the estate
//! listing shell.

pub mod codec;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod history;
pub mod memory;
pub mod navigator;
pub mod profile;
pub mod registry;
mod runtime;
pub mod sequencer;
pub mod state;
pub mod subsections;
pub mod surface;
pub mod transitions;

pub use codec::{decode_fragment, decode_payload, encode_fragment, encode_payload};
pub use collaborators::{AccountTabsHooks, Collaborators, SectionLoad, ViewId};
pub use config::{NavigationConfig, ProfileSettleTimings};
pub use context::{Guard, NavigationContext, OperationToken};
pub use diagnostics::NavigationDiagnostics;
pub use error::NavigationError;
pub use history::{
    HistoryPort, NavigationHistoryManager, ProfileRestore, PushOutcome, SuppressReason,
};
pub use navigator::Navigator;
pub use profile::ProfileRouteController;
pub use registry::{Direction, SectionRegistry};
pub use state::{AccountTab, NavigationState, ProfileRoute, Section, Subsection};
pub use subsections::{SubsectionTarget, SubsectionVisibilityController};
pub use surface::ViewSurface;
pub use transitions::{SectionTransitionEngine, TransitionKind, TransitionRequest};
