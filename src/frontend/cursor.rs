use glam::DVec2;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::JsCast;
use web_sys::{window, Element, Event, HtmlElement, MouseEvent};
use yew::prelude::*;

use super::dom::{
    is_coarse_pointer, media_query, prefers_reduced_motion, set_style, EventListener, FrameLoop,
    COARSE_POINTER_QUERY, REDUCED_MOTION_QUERY,
};
use crate::motion::{CursorMode, CursorState, CURSOR_HOVER_SELECTOR};

const BODY_CLASS: &str = "has-custom-cursor";

struct CursorBindings {
    body: HtmlElement,
    _listeners: Vec<EventListener>,
    _frames: FrameLoop,
}

impl Drop for CursorBindings {
    fn drop(&mut self) {
        let _ = self.body.class_list().remove_1(BODY_CLASS);
    }
}

#[function_component(CustomCursor)]
pub fn custom_cursor() -> Html {
    let enabled = use_state_eq(cursor_allowed);
    let dot = use_node_ref();
    let ring = use_node_ref();

    {
        let enabled = enabled.clone();
        use_effect_with((), move |_| {
            let recheck = move || enabled.set(cursor_allowed());
            let mut listeners: Vec<EventListener> = [COARSE_POINTER_QUERY, REDUCED_MOTION_QUERY]
                .into_iter()
                .filter_map(media_query)
                .map(|query| {
                    let recheck = recheck.clone();
                    EventListener::new(&query, "change", move |_| recheck())
                })
                .collect();
            if let Some(win) = window() {
                listeners.push(EventListener::new(&win, "resize", move |_| recheck()));
            }

            move || drop(listeners)
        });
    }

    {
        let dot = dot.clone();
        let ring = ring.clone();
        use_effect_with(*enabled, move |enabled| {
            let bindings = if *enabled { attach(&dot, &ring) } else { None };
            move || drop(bindings)
        });
    }

    if !*enabled {
        return html! {};
    }

    html! {
        <div class="cursor" aria-hidden="true">
            <div ref={ring} class="cursor-ring cursor-hidden" />
            <div ref={dot} class="cursor-dot cursor-hidden" />
        </div>
    }
}

fn cursor_allowed() -> bool {
    !is_coarse_pointer() && !prefers_reduced_motion()
}

fn attach(dot: &NodeRef, ring: &NodeRef) -> Option<CursorBindings> {
    let document = window()?.document()?;
    let root = document.document_element()?;
    let body = document.body()?;
    let dot = dot.cast::<HtmlElement>()?;
    let ring = ring.cast::<HtmlElement>()?;
    let state = Rc::new(RefCell::new(CursorState::default()));

    let listeners = vec![
        EventListener::new(&document, "mousemove", {
            let state = state.clone();
            move |event: Event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let mut cursor = state.borrow_mut();
                cursor.move_to(DVec2::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())));
                cursor.hovering = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .and_then(|element| element.closest(CURSOR_HOVER_SELECTOR).ok().flatten())
                    .is_some();
            }
        }),
        EventListener::new(&document, "mousedown", {
            let state = state.clone();
            move |_| state.borrow_mut().pressed = true
        }),
        EventListener::new(&document, "mouseup", {
            let state = state.clone();
            move |_| state.borrow_mut().pressed = false
        }),
        EventListener::new(&root, "mouseleave", {
            let state = state.clone();
            move |_| state.borrow_mut().leave()
        }),
    ];

    let frames = FrameLoop::start({
        let mut last_mode: Option<CursorMode> = None;
        move |_timestamp| {
            let mut cursor = state.borrow_mut();
            cursor.step();
            let mode = cursor.mode();

            set_style(
                &dot,
                "transform",
                &format!("translate3d({:.2}px, {:.2}px, 0)", cursor.pointer.x, cursor.pointer.y),
            );
            set_style(
                &ring,
                "transform",
                &format!(
                    "translate3d({:.2}px, {:.2}px, 0) scale({:.2})",
                    cursor.ring.x,
                    cursor.ring.y,
                    mode.ring_scale()
                ),
            );

            if last_mode != Some(mode) {
                dot.set_class_name(&format!("cursor-dot {}", mode.class()));
                ring.set_class_name(&format!("cursor-ring {}", mode.class()));
                last_mode = Some(mode);
            }
            true
        }
    });

    let _ = body.class_list().add_1(BODY_CLASS);

    Some(CursorBindings {
        body,
        _listeners: listeners,
        _frames: frames,
    })
}
