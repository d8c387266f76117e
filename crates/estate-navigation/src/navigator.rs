//! The facade hosts drive.
//!
//! A `Navigator` owns the surface, history and collaborator ports together
//! with the controllers and the step queue. Public operations never fail:
//! problems are logged and kept in [`NavigationDiagnostics`].

use futures_util::future::LocalBoxFuture;

use crate::codec::{decode_fragment, decode_payload};
use crate::collaborators::Collaborators;
use crate::config::NavigationConfig;
use crate::context::{Guard, NavigationContext, OperationToken};
use crate::diagnostics::NavigationDiagnostics;
use crate::history::{HistoryPort, NavigationHistoryManager, PushOutcome};
use crate::profile::{ProfileRouteController, ProfileStep};
use crate::runtime::{Stage, Step};
use crate::sequencer::Sequencer;
use crate::state::{AccountTab, NavigationState, ProfileRoute, Section};
use crate::subsections::SubsectionTarget;
use crate::surface::ViewSurface;
use crate::transitions::SectionTransitionEngine;

pub struct Navigator<S, H, C> {
    surface: S,
    history: H,
    collaborators: C,
    config: NavigationConfig,
    context: NavigationContext,
    sequencer: Sequencer<Step>,
    engine: SectionTransitionEngine,
    profile: ProfileRouteController,
    history_manager: NavigationHistoryManager,
    diagnostics: NavigationDiagnostics,
    loads: Vec<LocalBoxFuture<'static, ()>>,
    /// States of the session entries up to the current one, as far as this
    /// navigator wrote or saw them.
    trail: Vec<NavigationState>,
}

impl<S, H, C> Navigator<S, H, C>
where
    S: ViewSurface,
    H: HistoryPort,
    C: Collaborators,
{
    pub fn new(surface: S, history: H, collaborators: C) -> Self {
        Self::with_config(surface, history, collaborators, NavigationConfig::default())
    }

    /// Builds a navigator whose controllers start from what `surface`
    /// currently displays.
    pub fn with_config(surface: S, history: H, collaborators: C, config: NavigationConfig) -> Self {
        let history_manager = NavigationHistoryManager;
        let initial = history_manager.capture_current_state(&surface);
        let profile = match initial.profile_route {
            Some(route) => ProfileRouteController::starting_at(route, initial.account_tab),
            None => ProfileRouteController::default(),
        };
        Self {
            sequencer: Sequencer::new(config.frame_interval_ms),
            engine: SectionTransitionEngine::starting_at(initial.target_section()),
            profile,
            surface,
            history,
            collaborators,
            config,
            context: NavigationContext::new(),
            history_manager,
            diagnostics: NavigationDiagnostics::default(),
            loads: Vec::new(),
            trail: Vec::new(),
        }
    }

    /// Applies the deep link in `fragment` and makes the initial history
    /// entry describe the displayed state.
    pub fn bootstrap(&mut self, fragment: &str) {
        let requested = decode_fragment(fragment).unwrap_or_else(|| {
            tracing::debug!(fragment, "unrecognised fragment on load");
            NavigationState::home()
        });
        if requested == self.capture_current_state() {
            self.replace_current();
        } else {
            tracing::info!(fragment, "restoring deep link");
            self.restore_state(requested);
        }
    }

    pub fn switch_to(&mut self, section: Section) {
        let (mut stage, engine, _, _) = self.parts();
        engine.switch_to(&mut stage, section);
    }

    pub fn show_subsections(&mut self, target: SubsectionTarget) {
        let (mut stage, engine, _, _) = self.parts();
        engine.show_subsections(&mut stage, target);
    }

    /// Navigates to a profile route, entering the profile section first
    /// when another section is showing.
    pub fn navigate_profile(&mut self, route: ProfileRoute) {
        self.enter_profile_section();
        let settled = self.engine.is_settled_on(Section::Profile);
        let (mut stage, _, profile, _) = self.parts();
        profile.navigate_to(&mut stage, route, settled);
    }

    pub fn switch_account_tab(&mut self, tab: AccountTab) {
        self.enter_profile_section();
        let (mut stage, _, profile, _) = self.parts();
        profile.switch_tab(&mut stage, tab);
    }

    pub fn account_go_back(&mut self) {
        if self.engine.current_section() != Section::Profile {
            tracing::debug!("account back ignored outside profile");
            return;
        }
        let settled = self.engine.is_settled_on(Section::Profile);
        let (mut stage, _, profile, _) = self.parts();
        profile.go_back(&mut stage, settled);
    }

    /// In-app back. Steps the session history back when the previous entry
    /// is the logical back target, so no duplicate entry is left behind.
    /// Otherwise falls back to [`Self::handle_back_navigation`].
    pub fn navigate_back(&mut self) {
        let current = self.capture_current_state();
        let target = self.history_manager.back_target(&current);
        let previous = self
            .trail
            .len()
            .checked_sub(2)
            .and_then(|index| self.trail.get(index));
        let traversable = target != current
            && !self.context.is_restoring_from_history()
            && self.trail.last() == Some(&current)
            && previous == Some(&target);
        if traversable {
            match self.history.go_back() {
                Ok(()) => {
                    tracing::info!(from = ?current, to = ?target, "back through session history");
                    return;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "history back failed");
                    self.diagnostics.record_error(&error);
                }
            }
        }
        self.handle_back_navigation();
    }

    /// Moves one logical level up without adding a history entry.
    pub fn handle_back_navigation(&mut self) {
        let current = self.capture_current_state();
        let target = self.history_manager.back_target(&current);
        if target == current {
            self.replace_current();
            return;
        }
        tracing::info!(from = ?current, to = ?target, "logical back navigation");
        self.restore_state(target);
    }

    /// `payload` is the state attached to the entry the browser moved to.
    pub fn handle_popstate(&mut self, payload: Option<&str>) {
        let Some(raw) = payload else {
            self.trail.clear();
            self.handle_back_navigation();
            return;
        };
        match decode_payload(raw) {
            Ok(state) => {
                self.follow_trail(state.normalized());
                self.restore_state(state);
            }
            Err(error) => {
                self.trail.clear();
                tracing::warn!(error = %error, "unrecognised history payload, returning home");
                self.diagnostics.record_error(&error);
                self.restore_state(NavigationState::home());
            }
        }
    }

    pub fn handle_hash_change(&mut self, fragment: &str) {
        // The browser added an entry this navigator did not write.
        self.trail.clear();
        if self.context.is_navigating_within_profile() {
            tracing::debug!(fragment, "hash change ignored during profile navigation");
            return;
        }
        let Some(requested) = decode_fragment(fragment) else {
            tracing::debug!(fragment, "hash change not understood");
            return;
        };
        if requested != self.capture_current_state() {
            self.restore_state(requested);
        }
    }

    pub fn push_state(&mut self, skip: bool) -> PushOutcome {
        let outcome = self.history_manager.push_state(
            &self.context,
            &self.surface,
            &mut self.history,
            skip,
        );
        self.diagnostics.record_push(&outcome);
        if let PushOutcome::Pushed(state) = &outcome {
            self.trail.push(*state);
        }
        outcome
    }

    /// Reproduces `state` without adding history entries. The restoring
    /// guard is held until every step scheduled here has run, and the
    /// final step rewrites the current entry to match the screen.
    pub fn restore_state(&mut self, state: NavigationState) {
        if self.context.is_navigating_within_profile() {
            tracing::debug!("restore ignored during profile navigation");
            return;
        }
        let state = state.normalized();
        let token = self.context.begin(Guard::RestoringFromHistory);
        self.diagnostics.restores += 1;
        tracing::info!(state = ?state, "restoring navigation state");

        let target = state.target_section();
        let mut span = 0;
        if target != self.engine.current_section() {
            let (mut stage, engine, _, _) = self.parts();
            if engine.switch_to(&mut stage, target) {
                span = self.config.section_push_delay_ms();
            }
        }
        if self.history_manager.profile_restore(&state).is_some() {
            let delay = self.config.restore_profile_delay_ms;
            self.sequencer
                .after(delay, Step::RestoreProfile { state, token });
            span = span.max(delay.saturating_add(self.config.profile_settle.longest()));
        }

        self.sequencer.after(span, Step::ReplaceHistory { token });
        self.sequencer.after(
            span.saturating_add(self.config.guard_release_margin_ms),
            Step::ReleaseGuard {
                guard: Guard::RestoringFromHistory,
                token,
            },
        );
    }

    pub fn capture_current_state(&self) -> NavigationState {
        self.history_manager.capture_current_state(&self.surface)
    }

    /// Runs every timer step due at or before `now_ms`. Frame steps wait for
    /// `run_frame`.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(step) = self.sequencer.pop_due(now_ms) {
            self.run_step(step);
        }
        self.sequencer.settle_clock(now_ms);
    }

    /// Moves the clock forward by `delta_ms` with frames ticking every
    /// configured frame interval, for hosts without a real frame source.
    pub fn advance_by(&mut self, delta_ms: u64) {
        let until = self.sequencer.now_ms().saturating_add(delta_ms);
        while let Some(step) = self.sequencer.pop_simulated(until) {
            self.run_step(step);
        }
        self.sequencer.settle_clock(until);
    }

    /// Runs one animation frame at `now_ms`: the steps queued before the
    /// frame started, after the timers due by then. Steps queued while the
    /// frame runs, including those queued by the timers, wait for the next
    /// frame.
    pub fn run_frame(&mut self, now_ms: u64) {
        let boundary = self.sequencer.frame_boundary();
        self.advance_to(now_ms);
        while let Some(step) = self.sequencer.pop_frame(boundary) {
            self.run_step(step);
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.sequencer.now_ms()
    }

    pub fn next_wake_ms(&self) -> Option<u64> {
        self.sequencer.next_due_ms()
    }

    pub fn has_pending_frames(&self) -> bool {
        self.sequencer.has_pending_frames()
    }

    pub fn is_idle(&self) -> bool {
        self.sequencer.is_empty()
    }

    /// Section data loads started since the last call. The host drives
    /// them; each one logs its own failure.
    pub fn take_loads(&mut self) -> Vec<LocalBoxFuture<'static, ()>> {
        std::mem::take(&mut self.loads)
    }

    pub fn current_section(&self) -> Section {
        self.engine.current_section()
    }

    pub fn profile_route(&self) -> ProfileRoute {
        self.profile.route()
    }

    pub fn account_tab(&self) -> Option<AccountTab> {
        self.profile.account_tab()
    }

    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn collaborators(&self) -> &C {
        &self.collaborators
    }

    pub fn collaborators_mut(&mut self) -> &mut C {
        &mut self.collaborators
    }

    pub fn diagnostics(&self) -> NavigationDiagnostics {
        let mut diagnostics = self.diagnostics.clone();
        diagnostics.active_section = Some(self.engine.current_section());
        if self.engine.current_section() == Section::Profile {
            diagnostics.profile_route = Some(self.profile.route());
            diagnostics.account_tab = self.profile.account_tab();
        }
        diagnostics
    }

    fn enter_profile_section(&mut self) {
        if self.engine.current_section() != Section::Profile {
            self.switch_to(Section::Profile);
        }
    }

    fn replace_current(&mut self) {
        match self
            .history_manager
            .replace_current(&self.surface, &mut self.history)
        {
            Ok(state) => match self.trail.last_mut() {
                Some(last) => *last = state,
                None => self.trail.push(state),
            },
            Err(error) => {
                tracing::warn!(error = %error, "history replace failed");
                self.diagnostics.record_error(&error);
            }
        }
    }

    /// A popstate to the entry before the current one shortens the trail.
    /// Any other move loses track of the neighbours.
    fn follow_trail(&mut self, state: NavigationState) {
        let previous = self
            .trail
            .len()
            .checked_sub(2)
            .and_then(|index| self.trail.get(index));
        if previous == Some(&state) {
            self.trail.pop();
        } else {
            self.trail.clear();
            self.trail.push(state);
        }
    }

    fn run_step(&mut self, step: Step) {
        match step {
            Step::Subsection(step) => {
                let (mut stage, engine, _, _) = self.parts();
                engine.run_subsection(&mut stage, step);
            }
            Step::Section(step) => {
                let (mut stage, engine, _, _) = self.parts();
                if engine.run(&mut stage, step) {
                    self.push_state(false);
                }
            }
            Step::Profile(ProfileStep::Settle {
                route_token,
                within,
            }) => {
                if let Some(within) = within {
                    self.context.release(Guard::NavigatingWithinProfile, within);
                }
                self.push_state(false);
                self.context.release(Guard::ProfileRouteInFlight, route_token);
            }
            Step::RestoreProfile { state, token } => self.restore_profile(state, token),
            Step::ReplaceHistory { token } => {
                if self.owns_restore(token) {
                    self.replace_current();
                }
            }
            Step::ReleaseGuard { guard, token } => {
                self.context.release(guard, token);
            }
        }
    }

    fn restore_profile(&mut self, state: NavigationState, token: OperationToken) {
        if !self.owns_restore(token) {
            tracing::debug!(token = token.value(), "dropping superseded profile restore");
            return;
        }
        if self.engine.current_section() != Section::Profile {
            tracing::debug!("profile restore skipped, profile no longer active");
            return;
        }
        let Some(restore) = self.history_manager.profile_restore(&state) else {
            return;
        };
        let settled = self.engine.is_settled_on(Section::Profile);
        let (mut stage, _, profile, _) = self.parts();
        profile.restore(&mut stage, restore, settled);
    }

    fn owns_restore(&self, token: OperationToken) -> bool {
        self.context.holder(Guard::RestoringFromHistory) == Some(token)
    }

    fn parts(
        &mut self,
    ) -> (
        Stage<'_>,
        &mut SectionTransitionEngine,
        &mut ProfileRouteController,
        &NavigationHistoryManager,
    ) {
        (
            Stage {
                surface: &mut self.surface,
                history: &mut self.history,
                collaborators: &mut self.collaborators,
                sequencer: &mut self.sequencer,
                context: &mut self.context,
                config: &self.config,
                diagnostics: &mut self.diagnostics,
                loads: &mut self.loads,
            },
            &mut self.engine,
            &mut self.profile,
            &self.history_manager,
        )
    }
}
