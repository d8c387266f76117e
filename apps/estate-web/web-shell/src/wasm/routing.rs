use super::*;

/// `HistoryPort` over `window.history`. Payloads are stored as JSON
/// strings in the entry's state object.
#[derive(Debug, Default)]
pub(super) struct BrowserHistory;

impl BrowserHistory {
    fn history(&self) -> Result<web_sys::History, NavigationError> {
        let window =
            web_sys::window().ok_or_else(|| NavigationError::history("window is unavailable"))?;
        window
            .history()
            .map_err(|_| NavigationError::history("history is unavailable"))
    }
}

impl HistoryPort for BrowserHistory {
    fn current_payload(&self) -> Option<String> {
        let state = self.history().ok()?.state().ok()?;
        state_payload(&state)
    }

    fn push(&mut self, payload: &str, url: &str) -> Result<(), NavigationError> {
        self.history()?
            .push_state_with_url(&JsValue::from_str(payload), "", Some(url))
            .map_err(|_| NavigationError::history("pushState rejected"))
    }

    fn replace(&mut self, payload: Option<&str>, url: &str) -> Result<(), NavigationError> {
        let state = payload.map_or(JsValue::NULL, JsValue::from_str);
        self.history()?
            .replace_state_with_url(&state, "", Some(url))
            .map_err(|_| NavigationError::history("replaceState rejected"))
    }

    fn len(&self) -> usize {
        self.history()
            .ok()
            .and_then(|history| history.length().ok())
            .unwrap_or(0) as usize
    }

    fn go_back(&mut self) -> Result<(), NavigationError> {
        self.history()?
            .back()
            .map_err(|_| NavigationError::history("history.back rejected"))
    }
}

/// Entries written by other scripts may carry an object instead of a
/// string; those are serialised so the decoder sees the same shape.
pub(super) fn state_payload(state: &JsValue) -> Option<String> {
    if state.is_null() || state.is_undefined() {
        return None;
    }
    if let Some(raw) = state.as_string() {
        return Some(raw);
    }
    js_sys::JSON::stringify(state).ok()?.as_string()
}

pub(super) fn current_hash() -> String {
    web_sys::window()
        .and_then(|window| window.location().hash().ok())
        .unwrap_or_default()
}

pub(super) fn install_popstate_handler(window: &web_sys::Window) -> Result<(), String> {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
        |event: web_sys::Event| {
            let payload = event
                .dyn_into::<web_sys::PopStateEvent>()
                .ok()
                .and_then(|event| state_payload(&event.state()));
            with_navigator(|navigator| navigator.handle_popstate(payload.as_deref()));
        },
    ));
    window
        .add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref())
        .map_err(|_| "failed to register popstate listener".to_string())?;
    POPSTATE_HANDLER.with(|slot| {
        *slot.borrow_mut() = Some(callback);
    });
    Ok(())
}

pub(super) fn install_hashchange_handler(window: &web_sys::Window) -> Result<(), String> {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
        |_event: web_sys::Event| {
            let hash = current_hash();
            with_navigator(|navigator| navigator.handle_hash_change(&hash));
        },
    ));
    window
        .add_event_listener_with_callback("hashchange", callback.as_ref().unchecked_ref())
        .map_err(|_| "failed to register hashchange listener".to_string())?;
    HASHCHANGE_HANDLER.with(|slot| {
        *slot.borrow_mut() = Some(callback);
    });
    Ok(())
}

/// One delegated listener on the document routes every navigation click.
pub(super) fn install_click_delegation(document: &web_sys::Document) -> Result<(), String> {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
        |event: web_sys::Event| {
            let Some(target) = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            else {
                return;
            };
            let Some(attributes) = dom::nav_attributes_for(&target) else {
                return;
            };
            let Some(command) = NavCommand::from_attributes(&attributes) else {
                return;
            };
            event.prevent_default();
            dispatch_parsed(command);
        },
    ));
    document
        .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        .map_err(|_| "failed to register navigation click listener".to_string())?;
    NAV_CLICK_HANDLER.with(|slot| {
        *slot.borrow_mut() = Some(callback);
    });
    Ok(())
}
