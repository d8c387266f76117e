//! Browser history synchronisation.
//!
//! The history manager is the single authority on what the Back button
//! does. It reads the displayed state from the surface, writes entries
//! through a [`HistoryPort`], and decides how a popped or hashed state is
//! reproduced. Executing those decisions is left to the navigator, which
//! owns the controllers.

use serde::Serialize;

use crate::codec::{encode_fragment, encode_payload};
use crate::context::{Guard, NavigationContext};
use crate::error::NavigationError;
use crate::state::{AccountTab, NavigationState, ProfileRoute, Section, Subsection};
use crate::surface::{
    ViewSurface, account_tab_view_id, profile_view_id, section_element_id, subsection_element_id,
};

/// Session-history primitives. Payloads are the serialized
/// [`NavigationState`] and urls are canonical fragments.
pub trait HistoryPort {
    fn current_payload(&self) -> Option<String>;
    fn push(&mut self, payload: &str, url: &str) -> Result<(), NavigationError>;
    fn replace(&mut self, payload: Option<&str>, url: &str) -> Result<(), NavigationError>;
    fn len(&self) -> usize;
    /// Moves to the previous entry. The move is reported back through the
    /// host's `popstate` delivery, not by this call.
    fn go_back(&mut self) -> Result<(), NavigationError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    Skipped,
    RestoringFromHistory,
    NavigatingWithinProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed(NavigationState),
    Unchanged,
    Suppressed(SuppressReason),
    Failed(NavigationError),
}

/// How a restored profile state is reproduced. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRestore {
    AccountTab(AccountTab),
    TabsOverview,
    Route(ProfileRoute),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationHistoryManager;

impl NavigationHistoryManager {
    /// Reads what is displayed right now. Never mutates the surface.
    pub fn capture_current_state(&self, surface: &dyn ViewSurface) -> NavigationState {
        let section = Section::HOSTS
            .into_iter()
            .find(|host| surface.is_active(section_element_id(*host)))
            .unwrap_or(Section::Home);

        match section {
            Section::Profile => {
                let route = [
                    ProfileRoute::AccountInfo,
                    ProfileRoute::Settings,
                    ProfileRoute::Favorites,
                ]
                .into_iter()
                .find(|route| surface.is_active(profile_view_id(*route)))
                .unwrap_or(ProfileRoute::Menu);
                let account_tab = match route {
                    ProfileRoute::AccountInfo => AccountTab::ALL
                        .into_iter()
                        .find(|tab| surface.is_active(&account_tab_view_id(*tab))),
                    _ => None,
                };
                NavigationState {
                    account_tab,
                    ..NavigationState::profile(route)
                }
            }
            Section::MyActions => NavigationState::my_actions(),
            _ => {
                let visible: Vec<Subsection> = Subsection::ALL
                    .into_iter()
                    .filter(|subsection| surface.is_displayed(subsection_element_id(*subsection)))
                    .collect();
                match visible.as_slice() {
                    [only] => NavigationState::subsection(*only),
                    _ => NavigationState::home(),
                }
            }
        }
    }

    pub fn push_state(
        &self,
        context: &NavigationContext,
        surface: &dyn ViewSurface,
        history: &mut dyn HistoryPort,
        skip: bool,
    ) -> PushOutcome {
        if skip {
            return PushOutcome::Suppressed(SuppressReason::Skipped);
        }
        if context.is_active(Guard::RestoringFromHistory) {
            tracing::debug!("history push suppressed while restoring");
            return PushOutcome::Suppressed(SuppressReason::RestoringFromHistory);
        }
        if context.is_active(Guard::NavigatingWithinProfile) {
            tracing::debug!("history push suppressed during profile navigation");
            return PushOutcome::Suppressed(SuppressReason::NavigatingWithinProfile);
        }

        let state = self.capture_current_state(surface);
        let payload = match encode_payload(&state) {
            Ok(payload) => payload,
            Err(error) => return PushOutcome::Failed(error),
        };
        if history.current_payload().as_deref() == Some(payload.as_str()) {
            return PushOutcome::Unchanged;
        }

        let url = encode_fragment(&state);
        match history.push(&payload, &url) {
            Ok(()) => {
                tracing::info!(url = %url, "history entry pushed");
                PushOutcome::Pushed(state)
            }
            Err(error) => PushOutcome::Failed(error),
        }
    }

    /// Rewrites the current entry to describe what is displayed.
    pub fn replace_current(
        &self,
        surface: &dyn ViewSurface,
        history: &mut dyn HistoryPort,
    ) -> Result<NavigationState, NavigationError> {
        let state = self.capture_current_state(surface);
        let payload = encode_payload(&state)?;
        history.replace(Some(&payload), &encode_fragment(&state))?;
        Ok(state)
    }

    /// One logical level up from `current`.
    pub fn back_target(&self, current: &NavigationState) -> NavigationState {
        let current = current.normalized();
        match (current.section, current.profile_route, current.account_tab) {
            (Section::Profile, Some(ProfileRoute::AccountInfo), Some(_)) => {
                NavigationState::profile(ProfileRoute::AccountInfo)
            }
            (
                Section::Profile,
                Some(ProfileRoute::AccountInfo | ProfileRoute::Settings | ProfileRoute::Favorites),
                None,
            ) => NavigationState::profile(ProfileRoute::Menu),
            _ => NavigationState::home(),
        }
    }

    /// Chooses the single profile path that reproduces `state`.
    pub fn profile_restore(&self, state: &NavigationState) -> Option<ProfileRestore> {
        let state = state.normalized();
        if state.section != Section::Profile {
            return None;
        }
        if let Some(tab) = state.account_tab {
            return Some(ProfileRestore::AccountTab(tab));
        }
        match state.profile_route.unwrap_or(ProfileRoute::Menu) {
            ProfileRoute::AccountInfo => Some(ProfileRestore::TabsOverview),
            route => Some(ProfileRestore::Route(route)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_payload;
    use crate::memory::{MemoryHistory, MemorySurface};
    use crate::surface::{
        ACCOUNT_INFO_VIEW_ID, HOME_SECTION_ID, PROFILE_MENU_ID, PROFILE_SECTION_ID,
    };

    fn profile_surface() -> MemorySurface {
        let mut surface = MemorySurface::standard();
        let _ = surface.deactivate(HOME_SECTION_ID);
        let _ = surface.activate(PROFILE_SECTION_ID);
        surface
    }

    #[test]
    fn capture_reads_nested_profile_state() {
        let mut surface = profile_surface();
        let manager = NavigationHistoryManager;
        assert_eq!(
            manager.capture_current_state(&surface),
            NavigationState::profile(ProfileRoute::Menu)
        );

        let _ = surface.deactivate(PROFILE_MENU_ID);
        let _ = surface.activate(ACCOUNT_INFO_VIEW_ID);
        let _ = surface.activate(&account_tab_view_id(AccountTab::Documents));
        assert_eq!(
            manager.capture_current_state(&surface),
            NavigationState::account_tab(AccountTab::Documents)
        );
    }

    #[test]
    fn capture_reports_single_visible_subsection() {
        let mut surface = MemorySurface::standard();
        let manager = NavigationHistoryManager;
        assert_eq!(manager.capture_current_state(&surface), NavigationState::home());

        let _ = surface.hide(subsection_element_id(Subsection::Auctions));
        let _ = surface.hide(subsection_element_id(Subsection::Buy));
        assert_eq!(
            manager.capture_current_state(&surface),
            NavigationState::subsection(Subsection::Rent)
        );
    }

    #[test]
    fn immediate_second_push_is_deduplicated() {
        let surface = profile_surface();
        let mut history = MemoryHistory::default();
        let context = NavigationContext::new();
        let manager = NavigationHistoryManager;

        let first = manager.push_state(&context, &surface, &mut history, false);
        let second = manager.push_state(&context, &surface, &mut history, false);

        assert_eq!(
            first,
            PushOutcome::Pushed(NavigationState::profile(ProfileRoute::Menu))
        );
        assert_eq!(second, PushOutcome::Unchanged);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_url(), Some("#/profile"));
    }

    #[test]
    fn guards_suppress_push() {
        let surface = MemorySurface::standard();
        let mut history = MemoryHistory::default();
        let mut context = NavigationContext::new();
        let manager = NavigationHistoryManager;

        assert_eq!(
            manager.push_state(&context, &surface, &mut history, true),
            PushOutcome::Suppressed(SuppressReason::Skipped)
        );
        let token = context.begin(Guard::RestoringFromHistory);
        assert_eq!(
            manager.push_state(&context, &surface, &mut history, false),
            PushOutcome::Suppressed(SuppressReason::RestoringFromHistory)
        );
        context.release(Guard::RestoringFromHistory, token);
        context.begin(Guard::NavigatingWithinProfile);
        assert_eq!(
            manager.push_state(&context, &surface, &mut history, false),
            PushOutcome::Suppressed(SuppressReason::NavigatingWithinProfile)
        );
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn replace_current_writes_displayed_state() {
        let surface = profile_surface();
        let mut history = MemoryHistory::new("#/profile/settings");
        let manager = NavigationHistoryManager;

        let state = manager
            .replace_current(&surface, &mut history)
            .expect("replace succeeds");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_url(), Some("#/profile"));
        let payload = history.current_payload().expect("payload written");
        assert_eq!(decode_payload(&payload).expect("payload decodes"), state);
    }

    #[test]
    fn back_target_walks_one_level_up() {
        let manager = NavigationHistoryManager;
        let cases = [
            (
                NavigationState::account_tab(AccountTab::BasicData),
                NavigationState::profile(ProfileRoute::AccountInfo),
            ),
            (
                NavigationState::profile(ProfileRoute::AccountInfo),
                NavigationState::profile(ProfileRoute::Menu),
            ),
            (
                NavigationState::profile(ProfileRoute::Favorites),
                NavigationState::profile(ProfileRoute::Menu),
            ),
            (
                NavigationState::profile(ProfileRoute::Menu),
                NavigationState::home(),
            ),
            (NavigationState::subsection(Subsection::Buy), NavigationState::home()),
            (NavigationState::my_actions(), NavigationState::home()),
            (NavigationState::home(), NavigationState::home()),
        ];
        for (current, expected) in cases {
            assert_eq!(manager.back_target(&current), expected, "from {current:?}");
        }
    }

    #[test]
    fn profile_restore_prefers_account_tab() {
        let manager = NavigationHistoryManager;
        assert_eq!(
            manager.profile_restore(&NavigationState::account_tab(AccountTab::Addresses)),
            Some(ProfileRestore::AccountTab(AccountTab::Addresses))
        );
        assert_eq!(
            manager.profile_restore(&NavigationState::profile(ProfileRoute::AccountInfo)),
            Some(ProfileRestore::TabsOverview)
        );
        assert_eq!(
            manager.profile_restore(&NavigationState::profile(ProfileRoute::Menu)),
            Some(ProfileRestore::Route(ProfileRoute::Menu))
        );
        assert_eq!(manager.profile_restore(&NavigationState::home()), None);
    }
}
