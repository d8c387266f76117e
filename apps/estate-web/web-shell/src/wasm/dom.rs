use super::*;

/// `ViewSurface` over the live document. Lookups go through
/// `getElementById` on every call so re-rendered nodes are picked up.
#[derive(Debug, Default)]
pub(super) struct DomSurface;

impl DomSurface {
    fn element(&self, id: &str) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(id)
    }

    fn html_element(&self, id: &str) -> Result<HtmlElement, NavigationError> {
        self.element(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| NavigationError::missing(id))
    }
}

impl ViewSurface for DomSurface {
    fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), NavigationError> {
        let element = self.element(id).ok_or_else(|| NavigationError::missing(id))?;
        element
            .class_list()
            .add_1(class)
            .map_err(|_| NavigationError::missing(id))
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), NavigationError> {
        let element = self.element(id).ok_or_else(|| NavigationError::missing(id))?;
        element
            .class_list()
            .remove_1(class)
            .map_err(|_| NavigationError::missing(id))
    }

    fn set_style(
        &mut self,
        id: &str,
        property: &str,
        value: &str,
    ) -> Result<(), NavigationError> {
        self.html_element(id)?
            .style()
            .set_property(property, value)
            .map_err(|_| NavigationError::missing(id))
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        let element = self.html_element(id).ok()?;
        element
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn flush_layout(&mut self, id: &str) -> Result<(), NavigationError> {
        // Reading offsetHeight forces the pending style to apply before the
        // next class change.
        let _ = self.html_element(id)?.offset_height();
        Ok(())
    }
}

/// Reads the navigation attributes of the closest element carrying any.
pub(super) fn nav_attributes_for(target: &web_sys::Element) -> Option<NavAttributes> {
    let element = target.closest(NAV_CLICK_SELECTOR).ok()??;
    let attributes = NavAttributes {
        section: element.get_attribute(DATA_NAV_SECTION),
        profile_route: element.get_attribute(DATA_PROFILE_ROUTE),
        account_tab: element.get_attribute(DATA_ACCOUNT_TAB),
        back: element.get_attribute(DATA_NAV_BACK),
    };
    (!attributes.is_empty()).then_some(attributes)
}

pub(super) fn view_element_id(view: ViewId) -> &'static str {
    match view {
        ViewId::Section(section) => section_element_id(section),
        ViewId::Profile(route) => profile_view_id(route),
    }
}

pub(super) fn notify_view(view: ViewId, event_name: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let Some(element) = document.get_element_by_id(view_element_id(view)) else {
        return;
    };
    let Ok(event) = web_sys::Event::new(event_name) else {
        return;
    };
    let _ = element.dispatch_event(&event);
}
