//! Top-level section switching.
//!
//! Three kinds of transition exist. Emphasis stays inside the home host and
//! only changes which subsections are shown. Paired transitions animate the
//! outgoing and incoming hosts in the same frame. Everything else slides:
//! the target is parked off-screen, laid out, and activated on the second
//! animation frame so the parked style is committed before the transition
//! starts.
//!
//! Every transition draws a token. Steps carrying an older token are
//! dropped, and the cleanup of the live transition re-establishes that
//! exactly one host is active.

use futures_util::FutureExt;
use serde::Serialize;

use crate::collaborators::ViewId;
use crate::context::OperationToken;
use crate::error::NavigationError;
use crate::registry::{Direction, SectionRegistry};
use crate::runtime::{Stage, Step};
use crate::state::Section;
use crate::subsections::{SubsectionStep, SubsectionTarget, SubsectionVisibilityController};
use crate::surface::{
    ACTIVE_CLASS, HOME_CONTENT_ID, VISIBLE_CLASS, ViewSurface, nav_item_ids, section_element_id,
};

const ANIMATION_CLASSES: [&str; 8] = [
    "slide-out-left",
    "slide-out-right",
    "offscreen-left",
    "offscreen-right",
    "paired-enter-from-left",
    "paired-enter-from-right",
    "paired-exit-to-left",
    "paired-exit-to-right",
];

fn slide_out_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "slide-out-left",
        Direction::Right => "slide-out-right",
    }
}

fn offscreen_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "offscreen-left",
        Direction::Right => "offscreen-right",
    }
}

fn paired_enter_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "paired-enter-from-left",
        Direction::Right => "paired-enter-from-right",
    }
}

fn paired_exit_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "paired-exit-to-left",
        Direction::Right => "paired-exit-to-right",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionKind {
    Emphasis,
    Paired { direction: Direction },
    Generic { direction: Direction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRequest {
    pub from: Section,
    pub to: Section,
    pub kind: TransitionKind,
}

impl TransitionRequest {
    pub fn classify(registry: &SectionRegistry, from: Section, to: Section) -> Self {
        let kind = if from.host() == to.host() {
            TransitionKind::Emphasis
        } else if from.host() == Section::MyActions
            || to.host() == Section::MyActions
            || registry.is_home_subsection(to)
        {
            TransitionKind::Paired {
                direction: registry.paired_direction(from, to),
            }
        } else {
            TransitionKind::Generic {
                direction: registry.direction(from, to),
            }
        };
        Self { from, to, kind }
    }
}

#[derive(Debug)]
pub(crate) enum SectionStep {
    EnterFrame {
        token: OperationToken,
        host: Section,
        direction: Direction,
        frames_left: u8,
    },
    PairedFrame {
        token: OperationToken,
        from_host: Section,
        to_host: Section,
    },
    HomeContentFadeIn {
        token: OperationToken,
    },
    Cleanup {
        token: OperationToken,
        previous_host: Section,
    },
    PushHistory {
        token: OperationToken,
    },
}

#[derive(Debug)]
pub struct SectionTransitionEngine {
    registry: SectionRegistry,
    active: Section,
    live: Option<OperationToken>,
    settled: bool,
    lifecycle_host: Section,
    subsections: SubsectionVisibilityController,
    last_request: Option<TransitionRequest>,
}

impl Default for SectionTransitionEngine {
    fn default() -> Self {
        Self::starting_at(Section::Home)
    }
}

impl SectionTransitionEngine {
    pub fn starting_at(section: Section) -> Self {
        Self {
            registry: SectionRegistry,
            active: section,
            live: None,
            settled: true,
            lifecycle_host: section.host(),
            subsections: SubsectionVisibilityController::default(),
            last_request: None,
        }
    }

    /// The section most recently requested, subsection aliases included.
    pub fn current_section(&self) -> Section {
        self.active
    }

    pub fn last_request(&self) -> Option<TransitionRequest> {
        self.last_request
    }

    pub fn subsection_target(&self) -> Option<SubsectionTarget> {
        self.subsections.target()
    }

    /// True once the live transition has cleaned up and `section` is the
    /// host it left active.
    pub fn is_settled_on(&self, section: Section) -> bool {
        self.settled && self.active.host() == section.host()
    }

    fn is_live(&self, token: OperationToken) -> bool {
        self.live == Some(token)
    }

    /// Starts a transition to `target`. Returns false when nothing was
    /// started.
    pub(crate) fn switch_to(&mut self, stage: &mut Stage<'_>, target: Section) -> bool {
        let from = self.active;
        if from == target {
            match target.as_subsection() {
                Some(subsection) => {
                    tracing::debug!(section = %target, "re-emphasising active subsection");
                    self.show_subsections(stage, SubsectionTarget::Only(subsection));
                }
                None => tracing::debug!(section = %target, "section already active"),
            }
            return false;
        }

        let request = TransitionRequest::classify(&self.registry, from, target);
        let token = stage.context.next_token();
        self.live = Some(token);
        self.active = target;
        self.settled = false;
        self.last_request = Some(request);
        stage.diagnostics.last_transition = Some(request);
        tracing::info!(from = %from, to = %target, kind = ?request.kind, "section transition");

        let entered = match request.kind {
            TransitionKind::Emphasis => Ok(()),
            TransitionKind::Paired { direction } => {
                begin_paired(stage, token, from.host(), target.host(), direction)
            }
            TransitionKind::Generic { direction } => {
                begin_generic(stage, token, from.host(), target.host(), direction)
            }
        };
        if let Err(error) = entered {
            stage.abort("section_enter", error);
        }

        if target.host() == Section::Home && (from.host() != Section::Home || target == Section::Home)
        {
            let fast = from == Section::Profile || from.as_subsection().is_some();
            let delay = if fast {
                stage.config.home_content_fast_delay_ms
            } else {
                stage.config.home_content_slow_delay_ms
            };
            if let Err(error) = hide_home_content(stage.surface) {
                stage.abort("home_content_hide", error);
            } else {
                stage.sequencer.after(
                    delay,
                    Step::Section(SectionStep::HomeContentFadeIn { token }),
                );
            }
        }

        match (target, target.as_subsection()) {
            (_, Some(subsection)) => {
                self.show_subsections(stage, SubsectionTarget::Only(subsection))
            }
            (Section::Home, None) => self.show_subsections(stage, SubsectionTarget::All),
            _ => {}
        }

        highlight_nav_items(stage.surface, target);
        spawn_reload(stage, target);

        let transition_ms = stage.config.section_transition_ms;
        let push_ms = stage.config.section_push_delay_ms();
        stage.sequencer.after(
            transition_ms,
            Step::Section(SectionStep::Cleanup {
                token,
                previous_host: from.host(),
            }),
        );
        stage
            .sequencer
            .after(push_ms, Step::Section(SectionStep::PushHistory { token }));
        true
    }

    pub(crate) fn show_subsections(&mut self, stage: &mut Stage<'_>, target: SubsectionTarget) {
        self.subsections
            .show(stage.surface, stage.sequencer, stage.config, target);
    }

    pub(crate) fn run_subsection(&mut self, stage: &mut Stage<'_>, step: SubsectionStep) {
        self.subsections
            .run(stage.surface, stage.sequencer, stage.config, step);
    }

    /// Runs one deferred step. Returns true when the caller should record a
    /// history entry for the settled state.
    pub(crate) fn run(&mut self, stage: &mut Stage<'_>, step: SectionStep) -> bool {
        match step {
            SectionStep::EnterFrame {
                token,
                host,
                direction,
                frames_left,
            } => {
                if !self.is_live(token) {
                    tracing::debug!(token = token.value(), "dropping stale enter frame");
                    return false;
                }
                if frames_left > 0 {
                    stage.sequencer.next_frame(Step::Section(SectionStep::EnterFrame {
                        token,
                        host,
                        direction,
                        frames_left: frames_left - 1,
                    }));
                    return false;
                }
                if let Err(error) = finish_enter(stage.surface, host, direction) {
                    stage.abort("section_enter_frame", error);
                }
                false
            }
            SectionStep::PairedFrame {
                token,
                from_host,
                to_host,
            } => {
                if !self.is_live(token) {
                    tracing::debug!(token = token.value(), "dropping stale paired frame");
                    return false;
                }
                if let Err(error) = swap_paired(stage.surface, from_host, to_host) {
                    stage.abort("section_paired_frame", error);
                }
                false
            }
            SectionStep::HomeContentFadeIn { token } => {
                if !self.is_live(token) {
                    return false;
                }
                if let Err(error) = show_home_content(stage.surface) {
                    stage.abort("home_content_fade_in", error);
                }
                false
            }
            SectionStep::Cleanup {
                token,
                previous_host,
            } => {
                self.cleanup(stage, token, previous_host);
                false
            }
            SectionStep::PushHistory { token } => {
                let live = self.is_live(token);
                if !live {
                    tracing::debug!(token = token.value(), "superseded transition skips history");
                }
                live
            }
        }
    }

    fn cleanup(&mut self, stage: &mut Stage<'_>, token: OperationToken, previous_host: Section) {
        let live_host = self.active.host();
        if !self.is_live(token) {
            let id = section_element_id(previous_host);
            if previous_host != live_host && stage.surface.contains(id) {
                clear_animation_classes(stage.surface, id);
                if let Err(error) = stage.surface.deactivate(id) {
                    stage.abort("section_cleanup", error);
                }
            }
            return;
        }

        for host in Section::HOSTS {
            let id = section_element_id(host);
            if !stage.surface.contains(id) {
                continue;
            }
            clear_animation_classes(stage.surface, id);
            let result = if host == live_host {
                stage.surface.activate(id)
            } else {
                stage.surface.deactivate(id)
            };
            if let Err(error) = result {
                stage.abort("section_cleanup", error);
            }
        }

        self.settled = true;
        if self.lifecycle_host != live_host {
            stage
                .collaborators
                .on_deactivate(ViewId::Section(self.lifecycle_host));
            stage.collaborators.on_activate(ViewId::Section(live_host));
            self.lifecycle_host = live_host;
        }
    }
}

fn begin_generic(
    stage: &mut Stage<'_>,
    token: OperationToken,
    from_host: Section,
    to_host: Section,
    direction: Direction,
) -> Result<(), NavigationError> {
    let from_id = section_element_id(from_host);
    let to_id = section_element_id(to_host);
    stage.surface.require(to_id)?;

    if stage.surface.contains(from_id) {
        clear_animation_classes(stage.surface, from_id);
        stage.surface.remove_class(from_id, ACTIVE_CLASS)?;
        stage
            .surface
            .add_class(from_id, slide_out_class(direction.opposite()))?;
    }

    clear_animation_classes(stage.surface, to_id);
    stage.surface.remove_class(to_id, ACTIVE_CLASS)?;
    stage.surface.add_class(to_id, offscreen_class(direction))?;
    stage.surface.show(to_id)?;
    stage.surface.flush_layout(to_id)?;

    stage.sequencer.next_frame(Step::Section(SectionStep::EnterFrame {
        token,
        host: to_host,
        direction,
        frames_left: 1,
    }));
    Ok(())
}

fn begin_paired(
    stage: &mut Stage<'_>,
    token: OperationToken,
    from_host: Section,
    to_host: Section,
    direction: Direction,
) -> Result<(), NavigationError> {
    let from_id = section_element_id(from_host);
    let to_id = section_element_id(to_host);
    stage.surface.require(to_id)?;

    clear_animation_classes(stage.surface, to_id);
    stage.surface.add_class(to_id, paired_enter_class(direction))?;
    stage.surface.show(to_id)?;
    if stage.surface.contains(from_id) {
        clear_animation_classes(stage.surface, from_id);
        stage
            .surface
            .add_class(from_id, paired_exit_class(direction.opposite()))?;
    }
    stage.surface.flush_layout(to_id)?;

    stage.sequencer.next_frame(Step::Section(SectionStep::PairedFrame {
        token,
        from_host,
        to_host,
    }));
    Ok(())
}

fn finish_enter(
    surface: &mut dyn ViewSurface,
    host: Section,
    direction: Direction,
) -> Result<(), NavigationError> {
    let id = section_element_id(host);
    surface.remove_class(id, offscreen_class(direction))?;
    surface.add_class(id, ACTIVE_CLASS)
}

fn swap_paired(
    surface: &mut dyn ViewSurface,
    from_host: Section,
    to_host: Section,
) -> Result<(), NavigationError> {
    let from_id = section_element_id(from_host);
    if surface.contains(from_id) {
        surface.remove_class(from_id, ACTIVE_CLASS)?;
    }
    surface.add_class(section_element_id(to_host), ACTIVE_CLASS)
}

fn hide_home_content(surface: &mut dyn ViewSurface) -> Result<(), NavigationError> {
    surface.require(HOME_CONTENT_ID)?;
    surface.remove_class(HOME_CONTENT_ID, VISIBLE_CLASS)?;
    surface.set_style(HOME_CONTENT_ID, "opacity", "0")
}

fn show_home_content(surface: &mut dyn ViewSurface) -> Result<(), NavigationError> {
    surface.set_style(HOME_CONTENT_ID, "opacity", "1")?;
    surface.add_class(HOME_CONTENT_ID, VISIBLE_CLASS)
}

fn clear_animation_classes(surface: &mut dyn ViewSurface, id: &str) {
    for class in ANIMATION_CLASSES {
        let _ = surface.remove_class(id, class);
    }
}

fn highlight_nav_items(surface: &mut dyn ViewSurface, target: Section) {
    for section in Section::ALL {
        for id in nav_item_ids(section) {
            if !surface.contains(&id) {
                continue;
            }
            let _ = if section == target {
                surface.add_class(&id, ACTIVE_CLASS)
            } else {
                surface.remove_class(&id, ACTIVE_CLASS)
            };
        }
    }
}

fn spawn_reload(stage: &mut Stage<'_>, section: Section) {
    let load = stage.collaborators.reload_section_data(section);
    stage.loads.push(
        async move {
            if let Err(error) = load.await {
                tracing::warn!(section = %section, error = %error, "section data load failed");
            }
        }
        .boxed_local(),
    );
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
    use crate::state::Subsection;
    use crate::surface::{HOME_SECTION_ID, MY_ACTIONS_SECTION_ID, PROFILE_SECTION_ID};

    struct Harness {
        surface: MemorySurface,
        history: MemoryHistory,
        collaborators: RecordingCollaborators,
        sequencer: Sequencer<Step>,
        context: NavigationContext,
        config: NavigationConfig,
        diagnostics: NavigationDiagnostics,
        loads: Vec<LocalBoxFuture<'static, ()>>,
        engine: SectionTransitionEngine,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                surface: MemorySurface::standard(),
                history: MemoryHistory::default(),
                collaborators: RecordingCollaborators::new(),
                sequencer: Sequencer::new(16),
                context: NavigationContext::new(),
                config: NavigationConfig::default(),
                diagnostics: NavigationDiagnostics::default(),
                loads: Vec::new(),
                engine: SectionTransitionEngine::default(),
            }
        }

        fn switch(&mut self, target: Section) -> bool {
            let mut stage = Stage {
                surface: &mut self.surface,
                history: &mut self.history,
                collaborators: &mut self.collaborators,
                sequencer: &mut self.sequencer,
                context: &mut self.context,
                config: &self.config,
                diagnostics: &mut self.diagnostics,
                loads: &mut self.loads,
            };
            self.engine.switch_to(&mut stage, target)
        }

        fn advance(&mut self, ms: u64) {
            let until = self.sequencer.now_ms() + ms;
            while let Some(step) = self.sequencer.pop_simulated(until) {
                let mut stage = Stage {
                    surface: &mut self.surface,
                    history: &mut self.history,
                    collaborators: &mut self.collaborators,
                    sequencer: &mut self.sequencer,
                    context: &mut self.context,
                    config: &self.config,
                    diagnostics: &mut self.diagnostics,
                    loads: &mut self.loads,
                };
                match step {
                    Step::Section(step) => {
                        if self.engine.run(&mut stage, step) {
                            NavigationHistoryManager.push_state(
                                stage.context,
                                stage.surface,
                                stage.history,
                                false,
                            );
                        }
                    }
                    Step::Subsection(step) => self.engine.run_subsection(&mut stage, step),
                    _ => {}
                }
            }
            self.sequencer.settle_clock(until);
        }
    }

    #[test]
    fn classify_matches_transition_table() {
        let registry = SectionRegistry;
        let kind = |from, to| TransitionRequest::classify(&registry, from, to).kind;

        assert_eq!(kind(Section::Home, Section::Buy), TransitionKind::Emphasis);
        assert_eq!(kind(Section::Rent, Section::Home), TransitionKind::Emphasis);
        assert_eq!(
            kind(Section::Profile, Section::MyActions),
            TransitionKind::Paired {
                direction: Direction::Left
            }
        );
        assert_eq!(
            kind(Section::Profile, Section::Rent),
            TransitionKind::Paired {
                direction: Direction::Left
            }
        );
        assert_eq!(
            kind(Section::Home, Section::Profile),
            TransitionKind::Generic {
                direction: Direction::Right
            }
        );
    }

    #[test]
    fn generic_slide_activates_on_second_frame() {
        let mut harness = Harness::new();
        assert!(harness.switch(Section::Profile));

        assert!(harness.surface.has_class(PROFILE_SECTION_ID, "offscreen-right"));
        assert!(harness.surface.has_class(HOME_SECTION_ID, "slide-out-left"));
        assert!(harness.surface.is_displayed(PROFILE_SECTION_ID));
        assert_eq!(harness.surface.layout_flushes(), 1);

        harness.advance(16);
        assert!(!harness.surface.is_active(PROFILE_SECTION_ID));
        harness.advance(16);
        assert!(harness.surface.is_active(PROFILE_SECTION_ID));
        assert!(!harness.surface.has_class(PROFILE_SECTION_ID, "offscreen-right"));

        harness.advance(400);
        assert_eq!(harness.surface.active_sections(), vec![Section::Profile]);
        assert_eq!(harness.surface.displayed_sections(), vec![Section::Profile]);
        assert!(!harness.surface.has_class(HOME_SECTION_ID, "slide-out-left"));
        assert_eq!(harness.history.current_url(), Some("#/profile"));
    }

    #[test]
    fn paired_hosts_swap_in_the_same_frame() {
        let mut harness = Harness::new();
        harness.switch(Section::MyActions);

        assert!(harness.surface.has_class(MY_ACTIONS_SECTION_ID, "paired-enter-from-right"));
        assert!(harness.surface.has_class(HOME_SECTION_ID, "paired-exit-to-left"));

        harness.advance(16);
        assert!(harness.surface.is_active(MY_ACTIONS_SECTION_ID));
        assert!(!harness.surface.is_active(HOME_SECTION_ID));

        harness.advance(400);
        assert_eq!(harness.surface.displayed_sections(), vec![Section::MyActions]);
        assert_eq!(harness.history.current_url(), Some("#/my-actions"));
    }

    #[test]
    fn rapid_switches_settle_on_the_last_target() {
        let mut harness = Harness::new();
        harness.switch(Section::Profile);
        harness.advance(10);
        harness.switch(Section::MyActions);
        harness.advance(20);
        harness.switch(Section::Home);
        harness.advance(1_000);

        assert_eq!(harness.surface.active_sections(), vec![Section::Home]);
        assert_eq!(harness.surface.displayed_sections(), vec![Section::Home]);
        assert_eq!(harness.history.len(), 2);
        assert_eq!(harness.history.current_url(), Some("#/"));
    }

    #[test]
    fn emphasis_keeps_home_host_and_pushes_subsection() {
        let mut harness = Harness::new();
        harness.switch(Section::Buy);
        harness.advance(500);

        assert_eq!(harness.engine.current_section(), Section::Buy);
        assert_eq!(harness.surface.active_sections(), vec![Section::Home]);
        assert_eq!(harness.surface.visible_subsections(), vec![Subsection::Buy]);
        assert_eq!(
            harness.engine.subsection_target(),
            Some(SubsectionTarget::Only(Subsection::Buy))
        );
        assert_eq!(harness.history.current_url(), Some("#/buy"));
        assert_eq!(
            harness
                .collaborators
                .count(&CollaboratorCall::ReloadSectionData(Section::Buy)),
            1
        );
    }

    #[test]
    fn reclicking_active_subsection_re_emphasises_without_push() {
        let mut harness = Harness::new();
        harness.switch(Section::Buy);
        harness.advance(500);
        let entries = harness.history.len();

        assert!(!harness.switch(Section::Buy));
        assert_eq!(
            harness.surface.style("buy-subsection", "opacity").as_deref(),
            Some("0")
        );
        harness.advance(500);

        assert_eq!(harness.history.len(), entries);
        assert_eq!(harness.surface.visible_subsections(), vec![Subsection::Buy]);
        assert_eq!(
            harness.surface.style("buy-subsection", "opacity").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn home_content_fades_in_fast_when_leaving_profile() {
        let mut harness = Harness::new();
        harness.switch(Section::Profile);
        harness.advance(500);

        harness.switch(Section::Home);
        assert_eq!(
            harness.surface.style(HOME_CONTENT_ID, "opacity").as_deref(),
            Some("0")
        );
        harness.advance(100);
        assert_eq!(
            harness.surface.style(HOME_CONTENT_ID, "opacity").as_deref(),
            Some("1")
        );
        assert!(harness.surface.has_class(HOME_CONTENT_ID, VISIBLE_CLASS));
    }

    #[test]
    fn home_content_waits_for_slow_delay_from_my_actions() {
        let mut harness = Harness::new();
        harness.switch(Section::MyActions);
        harness.advance(500);

        harness.switch(Section::Home);
        harness.advance(300);
        assert_eq!(
            harness.surface.style(HOME_CONTENT_ID, "opacity").as_deref(),
            Some("0")
        );
        harness.advance(100);
        assert_eq!(
            harness.surface.style(HOME_CONTENT_ID, "opacity").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn lifecycle_and_nav_items_follow_the_settled_host() {
        let mut harness = Harness::new();
        harness.switch(Section::Profile);
        assert!(harness.surface.is_active("bottom-nav-profile"));
        assert!(harness.surface.is_active("top-nav-profile"));
        assert!(!harness.surface.is_active("bottom-nav-home"));
        assert!(harness.collaborators.calls().iter().all(|call| !matches!(
            call,
            CollaboratorCall::Activate(_) | CollaboratorCall::Deactivate(_)
        )));

        harness.advance(350);
        let calls = harness.collaborators.calls();
        assert!(calls.contains(&CollaboratorCall::Deactivate(ViewId::Section(Section::Home))));
        assert!(calls.contains(&CollaboratorCall::Activate(ViewId::Section(Section::Profile))));
        assert!(harness.engine.is_settled_on(Section::Profile));
    }

    #[test]
    fn missing_target_aborts_only_the_slide() {
        let mut harness = Harness::new();
        harness.surface.remove_element(PROFILE_SECTION_ID);

        assert!(harness.switch(Section::Profile));
        harness.advance(500);

        assert_eq!(harness.diagnostics.aborted_steps, 1);
        assert_eq!(
            harness.diagnostics.last_error.as_deref(),
            Some("navigation_element_missing:profile-section")
        );
        assert_eq!(harness.engine.current_section(), Section::Profile);
    }
}
