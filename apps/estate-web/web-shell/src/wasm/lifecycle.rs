use super::*;

pub(super) fn boot() -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let document = window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())?;

    CLOCK_ORIGIN.set(Some(Instant::now()));
    let config = load_config(&window);
    let navigator = Navigator::with_config(
        DomSurface,
        BrowserHistory,
        JsCollaborators::default(),
        config,
    );
    NAVIGATOR.with(|slot| {
        *slot.borrow_mut() = Some(navigator);
    });

    install_popstate_handler(&window)?;
    install_hashchange_handler(&window)?;
    install_click_delegation(&document)?;

    let fragment = current_hash();
    with_navigator(|navigator| navigator.bootstrap(&fragment));
    tracing::info!(fragment = %fragment, "estate navigation ready");
    Ok(())
}

/// Reads `window.__ESTATE_NAV_CONFIG__`, given either as a JSON string or
/// a plain object. Anything unusable falls back to the defaults.
pub(super) fn load_config(window: &web_sys::Window) -> NavigationConfig {
    let Ok(value) = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL)) else {
        return NavigationConfig::default();
    };
    if value.is_undefined() || value.is_null() {
        return NavigationConfig::default();
    }
    let raw = value.as_string().or_else(|| {
        js_sys::JSON::stringify(&value)
            .ok()
            .and_then(|raw| raw.as_string())
    });
    let Some(raw) = raw else {
        tracing::warn!("navigation config override is not serialisable");
        return NavigationConfig::default();
    };
    NavigationConfig::from_json(&raw).unwrap_or_else(|error| {
        tracing::warn!(error = %error, "navigation config override rejected");
        NavigationConfig::default()
    })
}

/// Milliseconds since boot. The navigator's clock is synced to this before
/// every operation.
pub(super) fn now_ms() -> u64 {
    let origin = CLOCK_ORIGIN.get().unwrap_or_else(|| {
        let origin = Instant::now();
        CLOCK_ORIGIN.set(Some(origin));
        origin
    });
    u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Syncs the navigator's timers to the wall clock, then runs `apply`.
pub(super) fn with_navigator(apply: impl FnOnce(&mut BrowserNavigator)) {
    drive(|navigator| {
        navigator.advance_to(now_ms());
        apply(navigator);
    });
}

/// Runs `apply` against the navigator, then hands out its pending loads and
/// re-arms the timer and frame wakes. Calls arriving while the navigator is
/// already borrowed (a page hook calling back in) are dropped.
fn drive(apply: impl FnOnce(&mut BrowserNavigator)) {
    let outcome = NAVIGATOR.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            tracing::debug!("navigation busy; nested request dropped");
            return None;
        };
        let navigator = slot.as_mut()?;
        apply(navigator);
        Some((
            navigator.take_loads(),
            navigator.next_wake_ms(),
            navigator.has_pending_frames(),
        ))
    });
    let Some((loads, next_wake_ms, frames_pending)) = outcome else {
        return;
    };
    for load in loads {
        spawn_local(load);
    }
    arm_timer(next_wake_ms);
    if frames_pending {
        request_frame();
    }
}

fn arm_timer(next_wake_ms: Option<u64>) {
    let Some(due_ms) = next_wake_ms else {
        return;
    };
    if TIMER_DUE_MS.get().is_some_and(|armed| armed <= due_ms) {
        return;
    }
    let generation = TIMER_GENERATION.get().wrapping_add(1);
    TIMER_GENERATION.set(generation);
    TIMER_DUE_MS.set(Some(due_ms));

    let delay_ms = due_ms.saturating_sub(now_ms()) + TIMER_SLACK_MS;
    spawn_local(async move {
        sleep(Duration::from_millis(delay_ms)).await;
        if TIMER_GENERATION.get() != generation {
            return;
        }
        TIMER_DUE_MS.set(None);
        with_navigator(|_| {});
    });
}

fn request_frame() {
    if FRAME_REQUESTED.get() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    FRAME_CALLBACK.with(|slot| {
        let mut slot = slot.borrow_mut();
        let callback = slot.get_or_insert_with(|| {
            Closure::<dyn FnMut(f64)>::wrap(Box::new(|_timestamp: f64| {
                FRAME_REQUESTED.set(false);
                drive(|navigator| navigator.run_frame(now_ms()));
            }))
        });
        if window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .is_ok()
        {
            FRAME_REQUESTED.set(true);
        }
    });
}

struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl std::io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&JsValue::from_str(line));
        }
    }
}

pub(super) fn install_console_tracing() {
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(|| ConsoleWriter { buffer: Vec::new() })
        .try_init();
}
