use futures_util::future::join_all;
use js_sys::Promise;
use std::rc::Rc;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{window, HtmlImageElement};
use yew::prelude::*;

use super::dom::sleep_ms;
use crate::content::PROJECTS;
use crate::motion::{
    LoadEvent, LoadPhase, LoadingProgress, LOAD_FADE_MS, LOAD_SCHEDULE, LOAD_TIMEOUT_MS,
};

const BODY_CLASS: &str = "is-loading";

impl Reducible for LoadingProgress {
    type Action = LoadEvent;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = (*self).apply(action);
        if next == *self {
            self
        } else {
            Rc::new(next)
        }
    }
}

#[function_component(LoadingOverlay)]
pub fn loading_overlay() -> Html {
    let progress = use_reducer_eq(LoadingProgress::default);
    let removed = use_state_eq(|| false);

    {
        let dispatcher = progress.dispatcher();
        use_effect_with((), move |_| {
            run_schedule(dispatcher.clone());
            watch_assets(dispatcher);
            || ()
        });
    }

    {
        let removed = removed.clone();
        use_effect_with(progress.phase, move |phase| {
            set_body_loading(*phase == LoadPhase::Loading);
            if *phase == LoadPhase::Loaded {
                spawn_local(async move {
                    sleep_ms(LOAD_FADE_MS).await;
                    removed.set(true);
                });
            }
            || ()
        });
    }

    if *removed {
        return html! {};
    }

    let fill = format!("transform: scaleX({:.2});", f64::from(progress.percent) / 100.0);

    html! {
        <div
            class={classes!("loading-overlay", (progress.phase == LoadPhase::Loaded).then_some("is-done"))}
            role="progressbar"
            aria-label="Loading portfolio"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow={progress.percent.to_string()}
        >
            <span class="loading-percent">{format!("{}%", progress.percent)}</span>
            <div class="loading-bar">
                <div class="loading-bar-fill" style={fill} />
            </div>
        </div>
    }
}

fn run_schedule(dispatcher: UseReducerDispatcher<LoadingProgress>) {
    spawn_local(async move {
        for step in LOAD_SCHEDULE {
            sleep_ms(step.delay_ms).await;
            dispatcher.dispatch(LoadEvent::Step(step.percent));
        }
        dispatcher.dispatch(LoadEvent::ScheduleFinished);

        sleep_ms(LOAD_TIMEOUT_MS).await;
        dispatcher.dispatch(LoadEvent::TimedOut);
    });
}

fn watch_assets(dispatcher: UseReducerDispatcher<LoadingProgress>) {
    spawn_local(async move {
        join_all(PROJECTS.iter().map(|project| image_settled(project.image))).await;
        fonts_ready().await;
        dispatcher.dispatch(LoadEvent::AssetsReady);
    });
}

/// Resolves once the image has either loaded or failed.
async fn image_settled(src: &'static str) {
    let Ok(image) = HtmlImageElement::new() else {
        return;
    };

    let promise = Promise::new(&mut |resolve, _reject| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&resolve));
    });
    image.set_src(src);

    let _ = JsFuture::from(promise).await;
    image.set_onload(None);
    image.set_onerror(None);
}

async fn fonts_ready() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    if let Ok(ready) = document.fonts().ready() {
        let _ = JsFuture::from(ready).await;
    }
}

fn set_body_loading(loading: bool) {
    let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) else {
        return;
    };

    let classes = body.class_list();
    let _ = if loading {
        classes.add_1(BODY_CLASS)
    } else {
        classes.remove_1(BODY_CLASS)
    };
}
