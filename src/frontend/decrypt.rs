use js_sys::Array;
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};
use yew::prelude::*;

use super::dom::{prefers_reduced_motion, random_index, sleep_ms};
use crate::motion::{DecryptReveal, DECRYPT_INTERVAL_MS};

const REVEAL_THRESHOLD: f64 = 0.4;

#[derive(Properties, PartialEq)]
pub struct DecryptTextProps {
    pub text: AttrValue,
    #[prop_or_default]
    pub class: Classes,
}

type ObserverParts = (IntersectionObserver, Closure<dyn FnMut(Array, IntersectionObserver)>);

#[function_component(DecryptText)]
pub fn decrypt_text(props: &DecryptTextProps) -> Html {
    let node = use_node_ref();
    let display = {
        let text = props.text.clone();
        use_state(move || {
            if prefers_reduced_motion() {
                text.to_string()
            } else {
                DecryptReveal::new(&text).frame(random_index)
            }
        })
    };

    {
        let node = node.clone();
        let display = display.clone();
        use_effect_with(props.text.clone(), move |text| {
            let text = text.to_string();
            let alive = Rc::new(Cell::new(true));
            let mut observer: Option<ObserverParts> = None;

            if prefers_reduced_motion() {
                display.set(text);
            } else if let Some(element) = node.cast::<Element>() {
                observer = observe_once(&element, text, display, alive.clone());
            }

            move || {
                alive.set(false);
                if let Some((observer, _callback)) = observer {
                    observer.disconnect();
                }
            }
        });
    }

    html! {
        <span ref={node} class={classes!("decrypt-text", props.class.clone())} aria-label={props.text.clone()}>
            <span aria-hidden="true">{(*display).clone()}</span>
        </span>
    }
}

fn observe_once(
    element: &Element,
    text: String,
    display: UseStateHandle<String>,
    alive: Rc<Cell<bool>>,
) -> Option<ObserverParts> {
    let started = Rc::new(Cell::new(false));
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            let visible = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .any(|entry| entry.is_intersecting());

            if visible && !started.replace(true) {
                observer.disconnect();
                start_reveal(text.clone(), display.clone(), alive.clone());
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options).ok()?;
    observer.observe(element);

    Some((observer, callback))
}

fn start_reveal(text: String, display: UseStateHandle<String>, alive: Rc<Cell<bool>>) {
    spawn_local(async move {
        let mut reveal = DecryptReveal::new(&text);

        while !reveal.is_complete() && alive.get() {
            display.set(reveal.frame(random_index));
            sleep_ms(DECRYPT_INTERVAL_MS).await;
            reveal.tick();
        }

        if alive.get() {
            display.set(text);
        }
    });
}
