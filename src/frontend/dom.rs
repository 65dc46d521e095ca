use js_sys::Promise;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, AddEventListenerOptions, Event, EventTarget, HtmlElement, MediaQueryList};

use crate::motion::ScrollMetrics;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
pub const COARSE_POINTER_QUERY: &str = "(pointer: coarse)";
const NO_HOVER_QUERY: &str = "(hover: none)";

pub fn media_query(query: &str) -> Option<MediaQueryList> {
    window().and_then(|w| w.match_media(query).ok().flatten())
}

fn matches_media(query: &str) -> bool {
    media_query(query).map(|mq| mq.matches()).unwrap_or(false)
}

pub fn prefers_reduced_motion() -> bool {
    matches_media(REDUCED_MOTION_QUERY)
}

pub fn is_coarse_pointer() -> bool {
    matches_media(COARSE_POINTER_QUERY) || matches_media(NO_HOVER_QUERY)
}

pub fn viewport_size() -> (f64, f64) {
    let Some(win) = window() else {
        return (1280.0, 720.0);
    };

    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0);

    (width, height)
}

pub fn scroll_y() -> f64 {
    window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

pub fn scroll_metrics() -> ScrollMetrics {
    let (_, viewport_height) = viewport_size();
    let document_height = window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(viewport_height);

    ScrollMetrics {
        scroll_y: scroll_y(),
        viewport_height,
        document_height,
    }
}

pub fn random_index(bound: usize) -> usize {
    (js_sys::Math::random() * bound as f64) as usize
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

/// `onerror` handler that takes a failed image out of the layout.
pub fn hide_broken_image(event: Event) {
    if let Some(image) = event.target().and_then(|target| target.dyn_into::<HtmlElement>().ok()) {
        set_style(&image, "display", "none");
    }
}

pub fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

pub async fn sleep_ms(ms: u32) {
    let delay = i32::try_from(ms).unwrap_or(i32::MAX);
    let promise = Promise::new(&mut |resolve, _reject| {
        let scheduled = window()
            .map(|win| {
                win.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
                    .is_ok()
            })
            .unwrap_or(false);

        if !scheduled {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });

    let _ = JsFuture::from(promise).await;
}

/// Passive DOM listener, unregistered on drop.
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(target: &EventTarget, event: &'static str, callback: impl FnMut(Event) + 'static) -> Self {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        );

        Self {
            target: target.clone(),
            event,
            callback,
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

struct FrameLoopState {
    callback: Option<Closure<dyn FnMut(f64)>>,
    handle: Option<i32>,
}

/// `requestAnimationFrame` loop that runs until `tick` returns false or the
/// handle is dropped.
pub struct FrameLoop {
    state: Rc<RefCell<FrameLoopState>>,
}

impl FrameLoop {
    pub fn start(mut tick: impl FnMut(f64) -> bool + 'static) -> Self {
        let state = Rc::new(RefCell::new(FrameLoopState {
            callback: None,
            handle: None,
        }));

        let weak = Rc::downgrade(&state);
        let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };

            if !tick(timestamp) {
                state.borrow_mut().handle = None;
                return;
            }

            let handle = state.borrow().callback.as_ref().and_then(request_frame);
            state.borrow_mut().handle = handle;
        });

        let handle = request_frame(&callback);
        {
            let mut borrowed = state.borrow_mut();
            borrowed.handle = handle;
            borrowed.callback = Some(callback);
        }

        Self { state }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().handle.is_some()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if let (Some(handle), Some(win)) = (state.handle.take(), window()) {
            let _ = win.cancel_animation_frame(handle);
        }
        state.callback = None;
    }
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Option<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}
