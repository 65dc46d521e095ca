use glam::DVec2;
use web_sys::{FocusEvent, HtmlElement, MouseEvent};
use yew::prelude::*;

use super::dom::{hide_broken_image, prefers_reduced_motion, set_style, viewport_size, FrameLoop};
use crate::content::{Project, PROJECTS};
use crate::motion::{focus_preview_target, pointer_preview_target, Spring, PREVIEW_GUTTER};

#[derive(Clone, Copy, PartialEq)]
struct PreviewState {
    visible: bool,
    index: usize,
}

impl PreviewState {
    fn hidden() -> Self {
        Self {
            visible: false,
            index: 0,
        }
    }
}

#[derive(Properties, PartialEq)]
struct ProjectCardProps {
    index: usize,
    project: &'static Project,
    on_pointer_preview: Callback<(usize, f64, f64)>,
    on_focus_preview: Callback<usize>,
    on_hide_preview: Callback<()>,
}

#[function_component(ProjectCard)]
fn project_card(props: &ProjectCardProps) -> Html {
    let project = props.project;

    let onmousemove = {
        let index = props.index;
        let on_pointer_preview = props.on_pointer_preview.clone();
        Callback::from(move |event: MouseEvent| {
            on_pointer_preview.emit((index, f64::from(event.client_x()), f64::from(event.client_y())));
        })
    };

    let onmouseleave = {
        let on_hide_preview = props.on_hide_preview.clone();
        Callback::from(move |_: MouseEvent| on_hide_preview.emit(()))
    };

    let onfocus = {
        let index = props.index;
        let on_focus_preview = props.on_focus_preview.clone();
        Callback::from(move |_event: FocusEvent| on_focus_preview.emit(index))
    };

    let onblur = {
        let on_hide_preview = props.on_hide_preview.clone();
        Callback::from(move |_: FocusEvent| on_hide_preview.emit(()))
    };

    html! {
        <a
            class="project-card"
            href={project.link}
            target="_blank"
            rel="noopener noreferrer"
            style={format!("--accent: {};", project.accent)}
            data-cursor="view"
            onmouseenter={onmousemove.clone()}
            onmousemove={onmousemove}
            onmouseleave={onmouseleave}
            onfocus={onfocus}
            onblur={onblur}
        >
            <span class="project-year">{project.year.to_string()}</span>
            <h3 class="project-title">
                {project.title}
                <span class="external-mark" aria-hidden="true">{"↗"}</span>
            </h3>
            <p class="project-description">{project.description}</p>
            <ul class="project-tags">
                { for project.tags.iter().map(|tag| html! { <li>{*tag}</li> }) }
            </ul>
            <span class="sr-only">{" (opens in a new tab)"}</span>
        </a>
    }
}

#[function_component(ProjectGallery)]
pub fn project_gallery() -> Html {
    let preview_state = use_state_eq(PreviewState::hidden);
    let preview = use_node_ref();
    let target = use_mut_ref(|| DVec2::splat(PREVIEW_GUTTER));
    let spring = use_mut_ref(|| Spring::at(DVec2::splat(PREVIEW_GUTTER)));
    let showing = use_mut_ref(|| false);

    {
        let preview = preview.clone();
        let target = target.clone();
        let spring = spring.clone();
        use_effect_with((), move |_| {
            let reduced_motion = prefers_reduced_motion();
            let mut last_timestamp: Option<f64> = None;
            let mut written: Option<DVec2> = None;

            let frames = FrameLoop::start(move |timestamp| {
                let dt = last_timestamp.map_or(0.0, |last| (timestamp - last) / 1000.0);
                last_timestamp = Some(timestamp);

                let goal = *target.borrow();
                let mut spring = spring.borrow_mut();
                if reduced_motion {
                    spring.snap(goal);
                } else if !spring.is_settled(goal) {
                    spring.step(goal, dt);
                }

                if written != Some(spring.position) {
                    if let Some(element) = preview.cast::<HtmlElement>() {
                        set_style(
                            &element,
                            "transform",
                            &format!(
                                "translate3d({:.2}px, {:.2}px, 0)",
                                spring.position.x, spring.position.y
                            ),
                        );
                        written = Some(spring.position);
                    }
                }
                true
            });

            move || drop(frames)
        });
    }

    let on_pointer_preview = {
        let preview_state = preview_state.clone();
        let target = target.clone();
        let spring = spring.clone();
        let showing = showing.clone();
        Callback::from(move |(index, client_x, client_y): (usize, f64, f64)| {
            let next = pointer_preview_target(client_x, client_y, viewport_size());
            *target.borrow_mut() = next;
            if !showing.replace(true) {
                spring.borrow_mut().snap(next);
            }
            preview_state.set(PreviewState {
                visible: true,
                index,
            });
        })
    };

    let on_focus_preview = {
        let preview_state = preview_state.clone();
        let target = target.clone();
        let spring = spring.clone();
        let showing = showing.clone();
        Callback::from(move |index: usize| {
            let next = focus_preview_target(viewport_size());
            *target.borrow_mut() = next;
            spring.borrow_mut().snap(next);
            *showing.borrow_mut() = true;
            preview_state.set(PreviewState {
                visible: true,
                index,
            });
        })
    };

    let on_hide_preview = {
        let preview_state = preview_state.clone();
        Callback::from(move |_| {
            *showing.borrow_mut() = false;
            let mut next = *preview_state;
            next.visible = false;
            preview_state.set(next);
        })
    };

    let shown = PROJECTS.get(preview_state.index);

    html! {
        <>
            <div class="project-grid">
                { for PROJECTS.iter().enumerate().map(|(index, project)| html! {
                    <ProjectCard
                        key={project.title}
                        index={index}
                        project={project}
                        on_pointer_preview={on_pointer_preview.clone()}
                        on_focus_preview={on_focus_preview.clone()}
                        on_hide_preview={on_hide_preview.clone()}
                    />
                }) }
            </div>
            <aside
                ref={preview}
                class={classes!("project-preview", preview_state.visible.then_some("is-visible"))}
                aria-hidden="true"
            >
                if let Some(project) = shown {
                    <div class="project-preview-body" style={format!("--accent: {};", project.accent)}>
                        <img
                            key={preview_state.index}
                            class="project-preview-media"
                            src={project.image}
                            alt={project.title}
                            onerror={Callback::from(hide_broken_image)}
                        />
                        <p class="project-preview-title">{project.title}</p>
                    </div>
                }
            </aside>
        </>
    }
}
