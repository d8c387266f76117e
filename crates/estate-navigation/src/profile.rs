//! Routes inside the profile section.
//!
//! The profile section hosts a menu and three nested views. Account info
//! has a second level: the tabs overview and one open tab. The controller
//! only touches elements inside the profile section, apart from re-asserting
//! the section itself when returning to the menu.

use std::collections::BTreeSet;

use crate::codec::encode_fragment;
use crate::collaborators::ViewId;
use crate::context::{Guard, OperationToken};
use crate::error::NavigationError;
use crate::history::ProfileRestore;
use crate::runtime::{Stage, Step};
use crate::state::{AccountTab, NavigationState, ProfileRoute};
use crate::surface::{
    ACCOUNT_INFO_VIEW_ID, ACCOUNT_TABS_CONTAINER_ID, ACCOUNT_TABS_HEADER_ID, ACTIVE_CLASS,
    FAVORITES_HEADER_ID, FAVORITES_VIEW_ID, PROFILE_MENU_ID, PROFILE_SECTION_ID, PROFILE_TITLE_ID,
    SETTINGS_HEADER_ID, SETTINGS_VIEW_ID, VISIBLE_CLASS, ViewSurface, account_tab_button_id,
    account_tab_header_id, account_tab_view_id, profile_header_id, profile_view_id,
};

#[derive(Debug)]
pub(crate) enum ProfileStep {
    /// Lowers the within-profile guard, records history, then lowers the
    /// route guard.
    Settle {
        route_token: OperationToken,
        within: Option<OperationToken>,
    },
}

#[derive(Debug)]
pub struct ProfileRouteController {
    route: ProfileRoute,
    account_tab: Option<AccountTab>,
    initialized: BTreeSet<ProfileRoute>,
}

impl Default for ProfileRouteController {
    fn default() -> Self {
        Self::starting_at(ProfileRoute::Menu, None)
    }
}

impl ProfileRouteController {
    pub fn starting_at(route: ProfileRoute, account_tab: Option<AccountTab>) -> Self {
        Self {
            route,
            account_tab: account_tab.filter(|_| route == ProfileRoute::AccountInfo),
            initialized: BTreeSet::new(),
        }
    }

    pub fn route(&self) -> ProfileRoute {
        self.route
    }

    pub fn account_tab(&self) -> Option<AccountTab> {
        self.account_tab
    }

    pub fn is_initialized(&self, route: ProfileRoute) -> bool {
        self.initialized.contains(&route)
    }

    /// `profile_settled` tells the menu whether it may re-assert the
    /// profile section as active.
    pub(crate) fn navigate_to(
        &mut self,
        stage: &mut Stage<'_>,
        route: ProfileRoute,
        profile_settled: bool,
    ) -> bool {
        if stage.context.is_active(Guard::ProfileRouteInFlight) {
            tracing::debug!(route = route.slug(), "profile navigation already in flight");
            return false;
        }
        if route == self.route {
            tracing::debug!(route = route.slug(), "profile route already shown");
            return false;
        }
        self.enter(stage, route, profile_settled)
    }

    pub(crate) fn switch_tab(&mut self, stage: &mut Stage<'_>, tab: AccountTab) -> bool {
        if self.route == ProfileRoute::AccountInfo && self.account_tab == Some(tab) {
            tracing::debug!(tab = tab.slug(), "account tab already open");
            return false;
        }

        let timings = &stage.config.profile_settle;
        let entering = self.route != ProfileRoute::AccountInfo;
        let delay = if entering {
            timings.account_info_ms.max(timings.account_tab_ms)
        } else {
            timings.account_tab_ms
        };
        schedule_settle(stage, delay, true);

        if entering {
            if let Err(error) = show_account_info(stage) {
                stage.abort("profile_account_info", error);
                return false;
            }
            self.change_route(stage, ProfileRoute::AccountInfo);
        }

        match show_tab(stage, tab) {
            Ok(()) => {
                self.account_tab = Some(tab);
                tracing::info!(tab = tab.slug(), "account tab opened");
                true
            }
            Err(error) => {
                stage.abort("profile_account_tab", error);
                false
            }
        }
    }

    /// One level up: an open tab returns to the tabs overview, a nested
    /// route returns to the menu.
    pub(crate) fn go_back(&mut self, stage: &mut Stage<'_>, profile_settled: bool) -> bool {
        match (self.route, self.account_tab) {
            (ProfileRoute::AccountInfo, Some(_)) => self.close_tab(stage),
            (ProfileRoute::Menu, _) => {
                tracing::debug!("profile already at menu");
                false
            }
            _ => self.enter(stage, ProfileRoute::Menu, profile_settled),
        }
    }

    /// Reproduces a restored profile state. Restores win over an in-flight
    /// route change.
    pub(crate) fn restore(
        &mut self,
        stage: &mut Stage<'_>,
        restore: ProfileRestore,
        profile_settled: bool,
    ) {
        match restore {
            ProfileRestore::AccountTab(tab) => {
                self.switch_tab(stage, tab);
            }
            ProfileRestore::TabsOverview => match (self.route, self.account_tab) {
                (ProfileRoute::AccountInfo, Some(_)) => {
                    self.close_tab(stage);
                }
                (ProfileRoute::AccountInfo, None) => {}
                _ => {
                    self.enter(stage, ProfileRoute::AccountInfo, profile_settled);
                }
            },
            ProfileRestore::Route(route) => {
                if route != self.route {
                    self.enter(stage, route, profile_settled);
                }
            }
        }
    }

    fn enter(&mut self, stage: &mut Stage<'_>, route: ProfileRoute, profile_settled: bool) -> bool {
        let from = self.route;
        let within = from.is_nested() || route.is_nested();
        let delay = stage.config.profile_settle.for_route(route);
        schedule_settle(stage, delay, within);

        let shown = match route {
            ProfileRoute::Menu => show_menu(stage.surface, profile_settled),
            ProfileRoute::AccountInfo => show_account_info(stage),
            ProfileRoute::Settings | ProfileRoute::Favorites => {
                show_dedicated(stage.surface, route)
            }
        };
        if let Err(error) = shown {
            stage.abort("profile_route", error);
            return false;
        }

        self.change_route(stage, route);
        tracing::info!(from = from.slug(), to = route.slug(), "profile route changed");
        true
    }

    fn close_tab(&mut self, stage: &mut Stage<'_>) -> bool {
        let delay = stage.config.profile_settle.account_tab_ms;
        schedule_settle(stage, delay, true);
        if let Err(error) = show_tabs_overview(stage.surface) {
            stage.abort("profile_tabs_overview", error);
            return false;
        }
        if let Some(tabs) = stage.collaborators.account_tabs() {
            tabs.go_back();
        }
        self.account_tab = None;
        true
    }

    fn change_route(&mut self, stage: &mut Stage<'_>, route: ProfileRoute) {
        if self.route != route {
            stage
                .collaborators
                .on_deactivate(ViewId::Profile(self.route));
        }
        self.route = route;
        self.account_tab = None;
        if route.is_nested() && self.initialized.insert(route) {
            stage.collaborators.init_view(route);
        }
        stage.collaborators.on_activate(ViewId::Profile(route));
    }
}

fn schedule_settle(stage: &mut Stage<'_>, delay_ms: u64, within: bool) {
    let route_token = stage.context.begin(Guard::ProfileRouteInFlight);
    let within = within.then(|| stage.context.begin(Guard::NavigatingWithinProfile));
    stage.sequencer.after(
        delay_ms,
        Step::Profile(ProfileStep::Settle {
            route_token,
            within,
        }),
    );
}

fn show_menu(surface: &mut dyn ViewSurface, profile_settled: bool) -> Result<(), NavigationError> {
    surface.require(PROFILE_MENU_ID)?;
    deactivate_present(
        surface,
        [ACCOUNT_INFO_VIEW_ID, SETTINGS_VIEW_ID, FAVORITES_VIEW_ID],
    )?;
    hide_present(
        surface,
        [ACCOUNT_TABS_HEADER_ID, SETTINGS_HEADER_ID, FAVORITES_HEADER_ID],
    )?;
    reset_account_tabs(surface)?;
    if surface.contains(ACCOUNT_TABS_CONTAINER_ID) {
        surface.remove_class(ACCOUNT_TABS_CONTAINER_ID, VISIBLE_CLASS)?;
    }
    show_present(surface, [PROFILE_TITLE_ID])?;
    surface.activate(PROFILE_MENU_ID)?;
    if profile_settled && surface.contains(PROFILE_SECTION_ID) {
        surface.activate(PROFILE_SECTION_ID)?;
    }
    Ok(())
}

fn show_account_info(stage: &mut Stage<'_>) -> Result<(), NavigationError> {
    let surface = &mut *stage.surface;
    surface.require(ACCOUNT_INFO_VIEW_ID)?;
    surface.require(ACCOUNT_TABS_CONTAINER_ID)?;
    deactivate_present(surface, [PROFILE_MENU_ID, SETTINGS_VIEW_ID, FAVORITES_VIEW_ID])?;
    hide_present(
        surface,
        [PROFILE_TITLE_ID, SETTINGS_HEADER_ID, FAVORITES_HEADER_ID],
    )?;
    show_present(surface, [ACCOUNT_TABS_HEADER_ID])?;
    reset_account_tabs(surface)?;
    surface.add_class(ACCOUNT_TABS_CONTAINER_ID, VISIBLE_CLASS)?;
    surface.activate(ACCOUNT_INFO_VIEW_ID)?;

    let payload = stage.history.current_payload();
    let url = encode_fragment(&NavigationState::profile(ProfileRoute::AccountInfo));
    stage.history.replace(payload.as_deref(), &url)?;

    if let Some(tabs) = stage.collaborators.account_tabs() {
        tabs.update_sticky_positions();
    }
    Ok(())
}

fn show_dedicated(surface: &mut dyn ViewSurface, route: ProfileRoute) -> Result<(), NavigationError> {
    let view = profile_view_id(route);
    surface.require(view)?;

    for other in ProfileRoute::ALL {
        if other == route {
            continue;
        }
        deactivate_present(surface, [profile_view_id(other)])?;
        if let Some(header) = profile_header_id(other) {
            hide_present(surface, [header])?;
        }
    }
    hide_present(surface, [PROFILE_TITLE_ID])?;
    reset_account_tabs(surface)?;
    if surface.contains(ACCOUNT_TABS_CONTAINER_ID) {
        surface.remove_class(ACCOUNT_TABS_CONTAINER_ID, VISIBLE_CLASS)?;
    }
    if let Some(header) = profile_header_id(route) {
        show_present(surface, [header])?;
    }
    surface.activate(view)
}

fn show_tab(stage: &mut Stage<'_>, tab: AccountTab) -> Result<(), NavigationError> {
    let surface = &mut *stage.surface;
    surface.require(&account_tab_view_id(tab))?;
    hide_present(surface, [ACCOUNT_TABS_HEADER_ID])?;

    for candidate in AccountTab::ALL {
        let view = account_tab_view_id(candidate);
        let header = account_tab_header_id(candidate);
        let button = account_tab_button_id(candidate);
        if candidate == tab {
            show_present(surface, [header])?;
            surface.activate(&view)?;
            if surface.contains(&button) {
                surface.add_class(&button, ACTIVE_CLASS)?;
            }
        } else {
            hide_present(surface, [header])?;
            deactivate_present(surface, [view])?;
            if surface.contains(&button) {
                surface.remove_class(&button, ACTIVE_CLASS)?;
            }
        }
    }

    if let Some(tabs) = stage.collaborators.account_tabs() {
        tabs.switch_tab(tab);
        tabs.update_layout();
    }
    Ok(())
}

fn show_tabs_overview(surface: &mut dyn ViewSurface) -> Result<(), NavigationError> {
    surface.require(ACCOUNT_INFO_VIEW_ID)?;
    reset_account_tabs(surface)?;
    show_present(surface, [ACCOUNT_TABS_HEADER_ID])
}

fn reset_account_tabs(surface: &mut dyn ViewSurface) -> Result<(), NavigationError> {
    for tab in AccountTab::ALL {
        deactivate_present(surface, [account_tab_view_id(tab)])?;
        hide_present(surface, [account_tab_header_id(tab)])?;
        let button = account_tab_button_id(tab);
        if surface.contains(&button) {
            surface.remove_class(&button, ACTIVE_CLASS)?;
        }
    }
    Ok(())
}

fn show_present<I>(surface: &mut dyn ViewSurface, ids: I) -> Result<(), NavigationError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for id in ids {
        let id = id.as_ref();
        if surface.contains(id) {
            surface.show(id)?;
        }
    }
    Ok(())
}

fn hide_present<I>(surface: &mut dyn ViewSurface, ids: I) -> Result<(), NavigationError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for id in ids {
        let id = id.as_ref();
        if surface.contains(id) {
            surface.hide(id)?;
        }
    }
    Ok(())
}

fn deactivate_present<I>(surface: &mut dyn ViewSurface, ids: I) -> Result<(), NavigationError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for id in ids {
        let id = id.as_ref();
        if surface.contains(id) {
            surface.deactivate(id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures_util::future::LocalBoxFuture;

    use super::*;
    use crate::config::NavigationConfig;
    use crate::context::NavigationContext;
    use crate::diagnostics::NavigationDiagnostics;
    use crate::history::{HistoryPort, NavigationHistoryManager};
    use crate::memory::{CollaboratorCall, MemoryHistory, MemorySurface, RecordingCollaborators};
    use crate::sequencer::Sequencer;
    use crate::surface::HOME_SECTION_ID;

    struct Harness {
        surface: MemorySurface,
        history: MemoryHistory,
        collaborators: RecordingCollaborators,
        sequencer: Sequencer<Step>,
        context: NavigationContext,
        config: NavigationConfig,
        diagnostics: NavigationDiagnostics,
        loads: Vec<LocalBoxFuture<'static, ()>>,
        profile: ProfileRouteController,
    }

    macro_rules! stage {
        ($harness:expr) => {
            Stage {
                surface: &mut $harness.surface,
                history: &mut $harness.history,
                collaborators: &mut $harness.collaborators,
                sequencer: &mut $harness.sequencer,
                context: &mut $harness.context,
                config: &$harness.config,
                diagnostics: &mut $harness.diagnostics,
                loads: &mut $harness.loads,
            }
        };
    }

    impl Harness {
        fn new() -> Self {
            let mut surface = MemorySurface::standard();
            let _ = surface.deactivate(HOME_SECTION_ID);
            let _ = surface.activate(PROFILE_SECTION_ID);
            Self {
                surface,
                history: MemoryHistory::new("#/profile"),
                collaborators: RecordingCollaborators::with_account_tabs(),
                sequencer: Sequencer::new(16),
                context: NavigationContext::new(),
                config: NavigationConfig::default(),
                diagnostics: NavigationDiagnostics::default(),
                loads: Vec::new(),
                profile: ProfileRouteController::default(),
            }
        }

        fn navigate(&mut self, route: ProfileRoute) -> bool {
            let mut stage = stage!(self);
            self.profile.navigate_to(&mut stage, route, true)
        }

        fn switch_tab(&mut self, tab: AccountTab) -> bool {
            let mut stage = stage!(self);
            self.profile.switch_tab(&mut stage, tab)
        }

        fn go_back(&mut self) -> bool {
            let mut stage = stage!(self);
            self.profile.go_back(&mut stage, true)
        }

        fn advance(&mut self, ms: u64) {
            let until = self.sequencer.now_ms() + ms;
            while let Some(step) = self.sequencer.pop_simulated(until) {
                if let Step::Profile(ProfileStep::Settle {
                    route_token,
                    within,
                }) = step
                {
                    if let Some(within) = within {
                        self.context.release(Guard::NavigatingWithinProfile, within);
                    }
                    NavigationHistoryManager.push_state(
                        &self.context,
                        &self.surface,
                        &mut self.history,
                        false,
                    );
                    self.context.release(Guard::ProfileRouteInFlight, route_token);
                }
            }
            self.sequencer.settle_clock(until);
        }

        fn captured(&self) -> NavigationState {
            NavigationHistoryManager.capture_current_state(&self.surface)
        }
    }

    #[test]
    fn account_info_shows_tabs_overview_and_rewrites_url() {
        let mut harness = Harness::new();
        assert!(harness.navigate(ProfileRoute::AccountInfo));

        assert!(harness.surface.is_active(ACCOUNT_INFO_VIEW_ID));
        assert!(!harness.surface.is_active(PROFILE_MENU_ID));
        assert!(!harness.surface.is_displayed(PROFILE_TITLE_ID));
        assert!(harness.surface.is_displayed(ACCOUNT_TABS_HEADER_ID));
        assert!(harness.surface.has_class(ACCOUNT_TABS_CONTAINER_ID, VISIBLE_CLASS));
        assert_eq!(harness.history.current_url(), Some("#/profile/account-info"));
        assert!(harness.context.is_navigating_within_profile());
        assert_eq!(
            harness.collaborators.tab_calls(),
            vec![CollaboratorCall::UpdateStickyPositions]
        );

        harness.advance(400);
        assert!(!harness.context.is_navigating_within_profile());
        assert!(!harness.context.is_active(Guard::ProfileRouteInFlight));
        assert_eq!(
            harness.captured(),
            NavigationState::profile(ProfileRoute::AccountInfo)
        );
        assert_eq!(harness.history.len(), 2);
    }

    #[test]
    fn in_flight_navigation_ignores_second_request() {
        let mut harness = Harness::new();
        assert!(harness.navigate(ProfileRoute::Settings));
        assert!(!harness.navigate(ProfileRoute::Favorites));
        assert_eq!(harness.profile.route(), ProfileRoute::Settings);

        harness.advance(350);
        assert!(harness.navigate(ProfileRoute::Favorites));
        assert!(!harness.navigate(ProfileRoute::Favorites));
    }

    #[test]
    fn dedicated_views_initialise_once_and_activate_every_time() {
        let mut harness = Harness::new();
        harness.navigate(ProfileRoute::Settings);
        harness.advance(350);
        assert!(harness.surface.is_displayed(SETTINGS_HEADER_ID));
        assert!(harness.surface.is_active(SETTINGS_VIEW_ID));

        harness.navigate(ProfileRoute::Menu);
        harness.advance(300);
        harness.navigate(ProfileRoute::Settings);
        harness.advance(350);

        let collaborators = &harness.collaborators;
        assert_eq!(
            collaborators.count(&CollaboratorCall::InitView(ProfileRoute::Settings)),
            1
        );
        assert_eq!(
            collaborators.count(&CollaboratorCall::Activate(ViewId::Profile(
                ProfileRoute::Settings
            ))),
            2
        );
        assert_eq!(
            collaborators.count(&CollaboratorCall::Deactivate(ViewId::Profile(
                ProfileRoute::Settings
            ))),
            1
        );
        assert!(harness.profile.is_initialized(ProfileRoute::Settings));
        assert!(!harness.profile.is_initialized(ProfileRoute::Favorites));
    }

    #[test]
    fn menu_reasserts_profile_section() {
        let mut harness = Harness::new();
        harness.navigate(ProfileRoute::Favorites);
        harness.advance(350);
        let _ = harness.surface.remove_class(PROFILE_SECTION_ID, ACTIVE_CLASS);

        harness.navigate(ProfileRoute::Menu);
        assert!(harness.surface.is_active(PROFILE_SECTION_ID));
        assert!(harness.surface.is_active(PROFILE_MENU_ID));
        assert!(harness.surface.is_displayed(PROFILE_TITLE_ID));
        assert!(!harness.surface.is_displayed(FAVORITES_HEADER_ID));
    }

    #[test]
    fn switch_tab_from_menu_applies_account_info_first() {
        let mut harness = Harness::new();
        assert!(harness.switch_tab(AccountTab::ContactInfo));

        assert_eq!(harness.profile.route(), ProfileRoute::AccountInfo);
        assert_eq!(harness.profile.account_tab(), Some(AccountTab::ContactInfo));
        assert!(harness.surface.is_active("account-tab-view-contact-info"));
        assert!(harness.surface.is_active("account-tab-contact-info"));
        assert!(harness.surface.is_displayed("account-tab-header-contact-info"));
        assert!(!harness.surface.is_displayed(ACCOUNT_TABS_HEADER_ID));
        assert_eq!(
            harness.collaborators.tab_calls(),
            vec![
                CollaboratorCall::UpdateStickyPositions,
                CollaboratorCall::SwitchTab(AccountTab::ContactInfo),
                CollaboratorCall::UpdateLayout,
            ]
        );

        harness.advance(400);
        assert_eq!(
            harness.captured(),
            NavigationState::account_tab(AccountTab::ContactInfo)
        );
    }

    #[test]
    fn go_back_walks_tab_then_route() {
        let mut harness = Harness::new();
        harness.switch_tab(AccountTab::BasicData);
        harness.advance(400);

        assert!(harness.go_back());
        assert_eq!(harness.profile.account_tab(), None);
        assert_eq!(harness.profile.route(), ProfileRoute::AccountInfo);
        assert!(harness.surface.is_displayed(ACCOUNT_TABS_HEADER_ID));
        harness.advance(300);
        assert_eq!(
            harness.captured(),
            NavigationState::profile(ProfileRoute::AccountInfo)
        );

        assert!(harness.go_back());
        harness.advance(300);
        assert_eq!(harness.profile.route(), ProfileRoute::Menu);
        assert_eq!(harness.captured(), NavigationState::profile(ProfileRoute::Menu));

        assert!(!harness.go_back());
        assert_eq!(
            harness
                .collaborators
                .tab_calls()
                .iter()
                .filter(|call| **call == CollaboratorCall::TabsGoBack)
                .count(),
            1
        );
    }

    #[test]
    fn missing_view_aborts_and_keeps_route() {
        let mut harness = Harness::new();
        harness.surface.remove_element(FAVORITES_VIEW_ID);

        assert!(!harness.navigate(ProfileRoute::Favorites));
        assert_eq!(harness.profile.route(), ProfileRoute::Menu);
        assert_eq!(harness.diagnostics.aborted_steps, 1);

        harness.advance(350);
        assert!(!harness.context.is_active(Guard::ProfileRouteInFlight));
    }
}
