//! In-memory implementations of the surface, history and collaborator
//! ports. Used by the test suites and by hosts without a DOM.

use std::collections::{BTreeMap, BTreeSet};

use futures_util::FutureExt;
use futures_util::future::ready;

use crate::collaborators::{AccountTabsHooks, Collaborators, SectionLoad, ViewId};
use crate::error::NavigationError;
use crate::history::HistoryPort;
use crate::state::{AccountTab, ProfileRoute, Section, Subsection};
use crate::surface::{
    ACTIVE_CLASS, HOME_SECTION_ID, MY_ACTIONS_SECTION_ID, PROFILE_MENU_ID, PROFILE_SECTION_ID,
    ViewSurface, account_tab_header_id, account_tab_view_id, known_element_ids,
    profile_header_id, profile_view_id, section_element_id, subsection_element_id,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: BTreeMap<String, MemoryElement>,
    layout_flushes: usize,
}

impl MemorySurface {
    /// The markup the shell ships with: home active with all subsections
    /// shown, other sections hidden, profile on its menu.
    pub fn standard() -> Self {
        let mut surface = Self::default();
        for id in known_element_ids() {
            surface.insert_element(&id);
        }
        let _ = surface.activate(HOME_SECTION_ID);
        let _ = surface.hide(MY_ACTIONS_SECTION_ID);
        let _ = surface.hide(PROFILE_SECTION_ID);
        let _ = surface.activate(PROFILE_MENU_ID);
        for route in ProfileRoute::ALL {
            if route != ProfileRoute::Menu {
                let _ = surface.hide(profile_view_id(route));
            }
            if let Some(header) = profile_header_id(route) {
                let _ = surface.hide(header);
            }
        }
        for tab in AccountTab::ALL {
            let _ = surface.hide(&account_tab_view_id(tab));
            let _ = surface.hide(&account_tab_header_id(tab));
        }
        surface
    }

    pub fn insert_element(&mut self, id: &str) {
        self.elements.entry(id.to_string()).or_default();
    }

    pub fn remove_element(&mut self, id: &str) -> Option<MemoryElement> {
        self.elements.remove(id)
    }

    pub fn element(&self, id: &str) -> Option<&MemoryElement> {
        self.elements.get(id)
    }

    pub fn layout_flushes(&self) -> usize {
        self.layout_flushes
    }

    /// Host sections carrying the active class.
    pub fn active_sections(&self) -> Vec<Section> {
        Section::HOSTS
            .into_iter()
            .filter(|section| self.has_class(section_element_id(*section), ACTIVE_CLASS))
            .collect()
    }

    pub fn displayed_sections(&self) -> Vec<Section> {
        Section::HOSTS
            .into_iter()
            .filter(|section| self.is_displayed(section_element_id(*section)))
            .collect()
    }

    pub fn visible_subsections(&self) -> Vec<Subsection> {
        Subsection::ALL
            .into_iter()
            .filter(|subsection| self.is_displayed(subsection_element_id(*subsection)))
            .collect()
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut MemoryElement, NavigationError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| NavigationError::missing(id))
    }
}

impl ViewSurface for MemorySurface {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .get(id)
            .is_some_and(|element| element.classes.contains(class))
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), NavigationError> {
        self.element_mut(id)?.classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), NavigationError> {
        self.element_mut(id)?.classes.remove(class);
        Ok(())
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> Result<(), NavigationError> {
        self.element_mut(id)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        self.elements
            .get(id)
            .and_then(|element| element.styles.get(property).cloned())
    }

    fn flush_layout(&mut self, id: &str) -> Result<(), NavigationError> {
        self.element_mut(id)?;
        self.layout_flushes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistoryEntry {
    pub payload: Option<String>,
    pub url: String,
}

/// Session history with a cursor, mirroring `history.back()` and
/// `history.forward()` semantics.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<MemoryHistoryEntry>,
    cursor: usize,
    pending_popstate: Option<Option<String>>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("#/")
    }
}

impl MemoryHistory {
    /// Starts with the single state-less entry a fresh page load has.
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![MemoryHistoryEntry {
                payload: None,
                url: initial_url.to_string(),
            }],
            cursor: 0,
            pending_popstate: None,
        }
    }

    pub fn entries(&self) -> &[MemoryHistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&MemoryHistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current().map(|entry| entry.url.as_str())
    }

    /// Moves the cursor back and returns the payload a `popstate` would
    /// carry, or `None` when already at the first entry.
    pub fn back(&mut self) -> Option<Option<String>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.current().map(|entry| entry.payload.clone())
    }

    /// Payload of the `popstate` a `go_back` call queued, if any.
    pub fn take_popstate(&mut self) -> Option<Option<String>> {
        self.pending_popstate.take()
    }

    pub fn forward(&mut self) -> Option<Option<String>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current().map(|entry| entry.payload.clone())
    }
}

impl HistoryPort for MemoryHistory {
    fn current_payload(&self) -> Option<String> {
        self.current().and_then(|entry| entry.payload.clone())
    }

    fn push(&mut self, payload: &str, url: &str) -> Result<(), NavigationError> {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(MemoryHistoryEntry {
            payload: Some(payload.to_string()),
            url: url.to_string(),
        });
        self.cursor = self.entries.len() - 1;
        Ok(())
    }

    fn replace(&mut self, payload: Option<&str>, url: &str) -> Result<(), NavigationError> {
        let entry = self
            .entries
            .get_mut(self.cursor)
            .ok_or_else(|| NavigationError::history("history cursor out of range"))?;
        entry.payload = payload.map(str::to_string);
        entry.url = url.to_string();
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn go_back(&mut self) -> Result<(), NavigationError> {
        let payload = self
            .back()
            .ok_or_else(|| NavigationError::history("no earlier entry"))?;
        self.pending_popstate = Some(payload);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorCall {
    ReloadSectionData(Section),
    InitView(ProfileRoute),
    Activate(ViewId),
    Deactivate(ViewId),
    SwitchTab(AccountTab),
    TabsGoBack,
    UpdateStickyPositions,
    UpdateLayout,
}

#[derive(Debug, Default)]
struct RecordingTabs {
    calls: Vec<CollaboratorCall>,
}

impl AccountTabsHooks for RecordingTabs {
    fn switch_tab(&mut self, tab: AccountTab) {
        self.calls.push(CollaboratorCall::SwitchTab(tab));
    }

    fn go_back(&mut self) {
        self.calls.push(CollaboratorCall::TabsGoBack);
    }

    fn update_sticky_positions(&mut self) {
        self.calls.push(CollaboratorCall::UpdateStickyPositions);
    }

    fn update_layout(&mut self) {
        self.calls.push(CollaboratorCall::UpdateLayout);
    }
}

/// Records every collaborator call in order. Section loads resolve
/// immediately, failing for the sections listed in `failing_sections`.
#[derive(Debug, Default)]
pub struct RecordingCollaborators {
    calls: Vec<CollaboratorCall>,
    tabs: Option<RecordingTabs>,
    pub failing_sections: BTreeSet<Section>,
}

impl RecordingCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account_tabs() -> Self {
        Self {
            tabs: Some(RecordingTabs::default()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CollaboratorCall> {
        self.calls.clone()
    }

    pub fn tab_calls(&self) -> Vec<CollaboratorCall> {
        self.tabs
            .as_ref()
            .map(|tabs| tabs.calls.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, call: &CollaboratorCall) -> usize {
        self.calls.iter().filter(|recorded| *recorded == call).count()
    }
}

impl Collaborators for RecordingCollaborators {
    fn reload_section_data(&mut self, section: Section) -> SectionLoad {
        self.calls.push(CollaboratorCall::ReloadSectionData(section));
        let result = if self.failing_sections.contains(&section) {
            Err(NavigationError::DataLoad {
                section: section.slug().to_string(),
                message: "listing feed unavailable".to_string(),
            })
        } else {
            Ok(())
        };
        ready(result).boxed_local()
    }

    fn init_view(&mut self, route: ProfileRoute) {
        self.calls.push(CollaboratorCall::InitView(route));
    }

    fn on_activate(&mut self, view: ViewId) {
        self.calls.push(CollaboratorCall::Activate(view));
    }

    fn on_deactivate(&mut self, view: ViewId) {
        self.calls.push(CollaboratorCall::Deactivate(view));
    }

    fn account_tabs(&mut self) -> Option<&mut dyn AccountTabsHooks> {
        self.tabs
            .as_mut()
            .map(|tabs| tabs as &mut dyn AccountTabsHooks)
    }
}
