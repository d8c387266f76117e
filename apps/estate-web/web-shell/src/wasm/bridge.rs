use super::*;

/// Page scripts reached through `window` globals. Absent globals make the
/// matching hook a no-op.
#[derive(Debug, Default)]
pub(super) struct JsCollaborators {
    account_tabs: JsAccountTabs,
}

#[derive(Debug, Default)]
struct JsAccountTabs;

impl Collaborators for JsCollaborators {
    fn reload_section_data(&mut self, section: Section) -> SectionLoad {
        let slug = section.slug();
        let args = [JsValue::from_str(slug)];
        let returned = match call_global_function(RELOAD_SECTION_DATA_FN, &args) {
            Ok(Some(value)) => value,
            Ok(None) => return futures_util::future::ready(Ok(())).boxed_local(),
            Err(message) => {
                let error = NavigationError::DataLoad {
                    section: slug.to_string(),
                    message,
                };
                return futures_util::future::ready(Err(error)).boxed_local();
            }
        };

        async move {
            if let Ok(promise) = returned.dyn_into::<js_sys::Promise>() {
                JsFuture::from(promise)
                    .await
                    .map_err(|error| NavigationError::DataLoad {
                        section: slug.to_string(),
                        message: describe_js_error(&error),
                    })?;
            }
            refresh_icons();
            Ok::<(), NavigationError>(())
        }
        .boxed_local()
    }

    fn init_view(&mut self, route: ProfileRoute) {
        let global = match route {
            ProfileRoute::Menu => return,
            ProfileRoute::AccountInfo => ACCOUNT_TABS_GLOBAL,
            ProfileRoute::Settings => SETTINGS_PAGE_GLOBAL,
            ProfileRoute::Favorites => FAVORITES_PAGE_GLOBAL,
        };
        call_global_method(global, PAGE_INIT_FN, &[]);
    }

    fn on_activate(&mut self, view: ViewId) {
        dom::notify_view(view, VIEW_ACTIVATED_EVENT);
    }

    fn on_deactivate(&mut self, view: ViewId) {
        dom::notify_view(view, VIEW_DEACTIVATED_EVENT);
    }

    fn account_tabs(&mut self) -> Option<&mut dyn AccountTabsHooks> {
        if global_object(ACCOUNT_TABS_GLOBAL).is_some() {
            Some(&mut self.account_tabs)
        } else {
            None
        }
    }
}

impl AccountTabsHooks for JsAccountTabs {
    fn switch_tab(&mut self, tab: AccountTab) {
        call_global_method(
            ACCOUNT_TABS_GLOBAL,
            ACCOUNT_TABS_SWITCH_FN,
            &[JsValue::from_str(tab.slug())],
        );
    }

    fn go_back(&mut self) {
        call_global_method(ACCOUNT_TABS_GLOBAL, ACCOUNT_TABS_GO_BACK_FN, &[]);
    }

    fn update_sticky_positions(&mut self) {
        call_global_method(ACCOUNT_TABS_GLOBAL, ACCOUNT_TABS_STICKY_FN, &[]);
    }

    fn update_layout(&mut self) {
        call_global_method(ACCOUNT_TABS_GLOBAL, ACCOUNT_TABS_LAYOUT_FN, &[]);
    }
}

fn global_object(name: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn call_global_function(name: &str, args: &[JsValue]) -> Result<Option<JsValue>, String> {
    let Some(window) = web_sys::window() else {
        return Ok(None);
    };
    let Some(function) =
        global_object(name).and_then(|value| value.dyn_into::<js_sys::Function>().ok())
    else {
        return Ok(None);
    };
    let args = args.iter().cloned().collect::<js_sys::Array>();
    function
        .apply(&window, &args)
        .map(Some)
        .map_err(|error| describe_js_error(&error))
}

fn call_global_method(global: &str, method: &str, args: &[JsValue]) {
    let Some(object) = global_object(global) else {
        return;
    };
    let Ok(function) = js_sys::Reflect::get(&object, &JsValue::from_str(method)) else {
        return;
    };
    let Ok(function) = function.dyn_into::<js_sys::Function>() else {
        return;
    };
    let args = args.iter().cloned().collect::<js_sys::Array>();
    if let Err(error) = function.apply(&object, &args) {
        tracing::warn!(
            global,
            method,
            error = %describe_js_error(&error),
            "page hook threw"
        );
    }
}

fn refresh_icons() {
    call_global_method(LUCIDE_GLOBAL, LUCIDE_CREATE_ICONS_FN, &[]);
}

fn describe_js_error(error: &JsValue) -> String {
    if let Some(message) = error.as_string() {
        return message;
    }
    js_sys::Reflect::get(error, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| "unknown script error".to_string())
}
