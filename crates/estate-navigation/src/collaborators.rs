use futures_util::future::LocalBoxFuture;
use serde::Serialize;

use crate::error::NavigationError;
use crate::state::{AccountTab, ProfileRoute, Section};

/// A view that receives explicit lifecycle calls when a transition settles
/// into or out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ViewId {
    Section(Section),
    Profile(ProfileRoute),
}

pub type SectionLoad = LocalBoxFuture<'static, Result<(), NavigationError>>;

/// Optional hooks exposed by the account-info tabs widget.
pub trait AccountTabsHooks {
    fn switch_tab(&mut self, tab: AccountTab);
    fn go_back(&mut self);
    fn update_sticky_positions(&mut self);
    fn update_layout(&mut self) {}
}

/// Everything outside the navigation core that the controllers call into.
pub trait Collaborators {
    /// Fetches and renders the cards of `section`. A rejection is logged by
    /// the caller and never rolls back the navigation.
    fn reload_section_data(&mut self, section: Section) -> SectionLoad;

    /// One-time initialisation of the controller behind a profile view.
    fn init_view(&mut self, route: ProfileRoute);

    fn on_activate(&mut self, _view: ViewId) {}

    fn on_deactivate(&mut self, _view: ViewId) {}

    fn account_tabs(&mut self) -> Option<&mut dyn AccountTabsHooks> {
        None
    }
}
