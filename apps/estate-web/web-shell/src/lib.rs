#![allow(clippy::needless_pass_by_value)]

#[cfg(any(target_arch = "wasm32", test))]
#[cfg_attr(test, allow(dead_code))]
mod nav_command;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::{Cell, RefCell};

    use estate_navigation::surface::{profile_view_id, section_element_id};
    use estate_navigation::{
        AccountTab, AccountTabsHooks, Collaborators, HistoryPort, NavigationConfig,
        NavigationError, Navigator, ProfileRoute, Section, SectionLoad, ViewId, ViewSurface,
    };
    use futures_util::FutureExt;
    use gloo_timers::future::sleep;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::HtmlElement;
    use web_time::{Duration, Instant};

    use crate::nav_command::{NavAttributes, NavCommand};
    use crate::wasm_constants::*;

    mod bridge;
    mod dom;
    mod lifecycle;
    mod routing;

    use bridge::JsCollaborators;
    use dom::DomSurface;
    use lifecycle::*;
    use routing::*;

    type BrowserNavigator = Navigator<DomSurface, BrowserHistory, JsCollaborators>;

    thread_local! {
        static NAVIGATOR: RefCell<Option<BrowserNavigator>> = const { RefCell::new(None) };
        static CLOCK_ORIGIN: Cell<Option<Instant>> = const { Cell::new(None) };
        static TIMER_GENERATION: Cell<u64> = const { Cell::new(0) };
        static TIMER_DUE_MS: Cell<Option<u64>> = const { Cell::new(None) };
        static FRAME_REQUESTED: Cell<bool> = const { Cell::new(false) };
        static FRAME_CALLBACK: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
        static POPSTATE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static HASHCHANGE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static NAV_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        install_console_tracing();
        if let Err(error) = boot() {
            tracing::error!(error = %error, "estate navigation failed to boot");
        }
    }

    #[wasm_bindgen]
    pub fn navigate_section(id: String) {
        dispatch_parsed(NavCommand::section(&id));
    }

    #[wasm_bindgen]
    pub fn navigate_profile(route: String) {
        dispatch_parsed(NavCommand::profile_route(&route));
    }

    #[wasm_bindgen]
    pub fn switch_account_tab(tab: String) {
        dispatch_parsed(NavCommand::account_tab(&tab));
    }

    #[wasm_bindgen]
    pub fn account_go_back() {
        dispatch(NavCommand::AccountBack);
    }

    #[wasm_bindgen]
    pub fn navigate_back() {
        dispatch(NavCommand::Back);
    }

    #[wasm_bindgen]
    pub fn navigation_state_json() -> String {
        let state = NAVIGATOR.with(|slot| {
            slot.try_borrow()
                .ok()
                .and_then(|navigator| navigator.as_ref().map(Navigator::capture_current_state))
        });
        state
            .and_then(|state| serde_json::to_string(&state).ok())
            .unwrap_or_else(|| "null".to_string())
    }

    #[wasm_bindgen]
    pub fn navigation_diagnostics_json() -> String {
        NAVIGATOR
            .with(|slot| {
                slot.try_borrow()
                    .ok()
                    .and_then(|navigator| {
                        navigator
                            .as_ref()
                            .and_then(|navigator| navigator.diagnostics().to_json().ok())
                    })
            })
            .unwrap_or_else(|| {
                "{\"phase\":\"booting\",\"detail\":\"navigation not initialised\"}".to_string()
            })
    }

    pub(crate) fn dispatch_parsed(
        command: Result<NavCommand, crate::nav_command::CommandParseError>,
    ) {
        match command {
            Ok(command) => dispatch(command),
            Err(error) => tracing::warn!(error = %error, "navigation request ignored"),
        }
    }

    pub(crate) fn dispatch(command: NavCommand) {
        with_navigator(|navigator| match command {
            NavCommand::Section(section) => navigator.switch_to(section),
            NavCommand::ProfileRoute(route) => navigator.navigate_profile(route),
            NavCommand::AccountTab(tab) => navigator.switch_account_tab(tab),
            NavCommand::AccountBack => navigator.account_go_back(),
            NavCommand::Back => navigator.navigate_back(),
        });
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{navigation_diagnostics_json, navigation_state_json};

#[cfg(not(target_arch = "wasm32"))]
pub fn navigation_diagnostics_json() -> String {
    "{\"phase\":\"native\",\"detail\":\"navigation diagnostics only available on wasm\"}"
        .to_string()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn navigation_state_json() -> String {
    "null".to_string()
}
