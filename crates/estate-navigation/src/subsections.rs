//! Staggered show/hide of the three home subsections.

use serde::Serialize;

use crate::config::NavigationConfig;
use crate::runtime::Step;
use crate::sequencer::Sequencer;
use crate::state::Subsection;
use crate::surface::{ViewSurface, subsection_element_id};

const FADE_OUT_TRANSFORM: &str = "translateY(12px)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsectionTarget {
    All,
    Only(Subsection),
}

impl SubsectionTarget {
    fn members(self) -> Vec<Subsection> {
        match self {
            SubsectionTarget::All => Subsection::ALL.to_vec(),
            SubsectionTarget::Only(subsection) => vec![subsection],
        }
    }
}

#[derive(Debug)]
pub(crate) enum SubsectionStep {
    Collapse {
        cycle: u64,
        target: SubsectionTarget,
    },
    FadeIn {
        cycle: u64,
        subsection: Subsection,
    },
}

/// Each `show` call opens a new cycle; steps from older cycles are dropped
/// so rapid calls converge on the last requested target.
#[derive(Debug, Default)]
pub struct SubsectionVisibilityController {
    cycle: u64,
    target: Option<SubsectionTarget>,
}

impl SubsectionVisibilityController {
    pub fn target(&self) -> Option<SubsectionTarget> {
        self.target
    }

    pub(crate) fn show(
        &mut self,
        surface: &mut dyn ViewSurface,
        sequencer: &mut Sequencer<Step>,
        config: &NavigationConfig,
        target: SubsectionTarget,
    ) {
        self.cycle = self.cycle.wrapping_add(1);
        self.target = Some(target);

        for subsection in Subsection::ALL {
            let id = subsection_element_id(subsection);
            if !surface.contains(id) {
                continue;
            }
            let _ = surface.set_style(id, "opacity", "0");
            let _ = surface.set_style(id, "transform", FADE_OUT_TRANSFORM);
            let _ = surface.set_style(id, "visibility", "hidden");
        }

        sequencer.after(
            config.subsection_fade_ms,
            Step::Subsection(SubsectionStep::Collapse {
                cycle: self.cycle,
                target,
            }),
        );
    }

    pub(crate) fn run(
        &mut self,
        surface: &mut dyn ViewSurface,
        sequencer: &mut Sequencer<Step>,
        config: &NavigationConfig,
        step: SubsectionStep,
    ) {
        match step {
            SubsectionStep::Collapse { cycle, target } => {
                if cycle != self.cycle {
                    tracing::debug!(cycle, live = self.cycle, "dropping stale subsection collapse");
                    return;
                }
                for subsection in Subsection::ALL {
                    let _ = surface.hide(subsection_element_id(subsection));
                }

                let stagger = match target {
                    SubsectionTarget::All => config.subsection_stagger_ms,
                    SubsectionTarget::Only(_) => 0,
                };
                let mut delay = 0;
                for subsection in target.members() {
                    let id = subsection_element_id(subsection);
                    if !surface.contains(id) {
                        continue;
                    }
                    let _ = surface.show(id);
                    let _ = surface.set_style(id, "visibility", "visible");
                    if delay == 0 {
                        fade_in(surface, subsection);
                    } else {
                        sequencer.after(
                            delay,
                            Step::Subsection(SubsectionStep::FadeIn { cycle, subsection }),
                        );
                    }
                    delay = delay.saturating_add(stagger);
                }
            }
            SubsectionStep::FadeIn { cycle, subsection } => {
                if cycle != self.cycle {
                    return;
                }
                fade_in(surface, subsection);
            }
        }
    }
}

fn fade_in(surface: &mut dyn ViewSurface, subsection: Subsection) {
    let id = subsection_element_id(subsection);
    let _ = surface.set_style(id, "opacity", "1");
    let _ = surface.set_style(id, "transform", "none");
}
