mod backdrop;
mod cursor;
mod decrypt;
mod dom;
mod glass;
mod loader;
mod projects;
mod social;

use web_sys::window;
use yew::prelude::*;

use crate::content::{
    CONTACT_LINKS, OWNER_EMAIL, OWNER_NAME, OWNER_ROLE, RESUME_PATH, SECTIONS, SKILLS, TECH_STACK,
};
use crate::motion::{active_section, NAV_OFFSET};
use backdrop::FluidBackdrop;
use cursor::CustomCursor;
use decrypt::DecryptText;
use dom::{hide_broken_image, scroll_metrics, EventListener};
use glass::GlassPanel;
use loader::LoadingOverlay;
use projects::ProjectGallery;
use social::SocialLink;

const NAV_MENU_ID: &str = "site-nav-links";

fn current_section() -> Option<&'static str> {
    let document = window()?.document()?;
    let metrics = scroll_metrics();
    let tops: Vec<(&'static str, f64)> = SECTIONS
        .iter()
        .filter_map(|section| {
            let element = document.get_element_by_id(section.id)?;
            Some((section.id, element.get_bounding_client_rect().top() + metrics.scroll_y))
        })
        .collect();

    active_section(&tops, metrics, NAV_OFFSET)
}

#[derive(Properties, PartialEq)]
struct NavProps {
    active: &'static str,
}

#[function_component(SiteNav)]
fn site_nav(props: &NavProps) -> Html {
    let menu_open = use_state_eq(|| false);

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };

    // Picking a destination collapses the small-screen menu.
    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(false))
    };

    html! {
        <nav class="site-nav" aria-label="Sections">
            <a class="site-mark" href="#hero">{OWNER_NAME}</a>
            <button
                type="button"
                class="nav-toggle"
                aria-controls={NAV_MENU_ID}
                aria-expanded={menu_open.to_string()}
                aria-label={if *menu_open { "Close menu" } else { "Open menu" }}
                onclick={toggle_menu}
            >
                <svg viewBox="0 0 24 24" aria-hidden="true">
                    if *menu_open {
                        <path d="M6 6l12 12M18 6L6 18" />
                    } else {
                        <path d="M4 7h16M4 12h16M4 17h16" />
                    }
                </svg>
            </button>
            <ul id={NAV_MENU_ID} class={classes!((*menu_open).then_some("is-open"))}>
                { for SECTIONS.iter().map(|section| {
                    let active = section.id == props.active;
                    html! {
                        <li key={section.id}>
                            <a
                                href={format!("#{}", section.id)}
                                class={classes!("nav-link", active.then_some("is-active"))}
                                aria-current={active.then_some("location")}
                                onclick={close_menu.clone()}
                            >
                                {section.label}
                            </a>
                        </li>
                    }
                }) }
            </ul>
        </nav>
    }
}

#[function_component(SignalClip)]
fn signal_clip() -> Html {
    html! {
        <svg class="signal-clip" viewBox="0 0 240 120" aria-hidden="true">
            <path class="signal-wave signal-wave-a" d="M0 60 Q 30 10 60 60 T 120 60 T 180 60 T 240 60" />
            <path class="signal-wave signal-wave-b" d="M0 60 Q 30 110 60 60 T 120 60 T 180 60 T 240 60" />
            <circle class="signal-pulse" cx="120" cy="60" r="6" />
        </svg>
    }
}

#[function_component(App)]
fn app() -> Html {
    let active = use_state_eq(|| SECTIONS[0].id);

    {
        let active = active.clone();
        use_effect_with((), move |_| {
            let update = move || {
                if let Some(id) = current_section() {
                    active.set(id);
                }
            };
            update();

            let listeners = window().map(|win| {
                vec![
                    EventListener::new(&win, "scroll", {
                        let update = update.clone();
                        move |_| update()
                    }),
                    EventListener::new(&win, "resize", move |_| update()),
                ]
            });

            move || drop(listeners)
        });
    }

    html! {
        <>
            <LoadingOverlay />
            <FluidBackdrop />
            <CustomCursor />
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <SiteNav active={*active} />

            <main id="content">
                <section id="hero" class="section hero" aria-labelledby="hero-heading">
                    <p class="eyebrow">{"Portfolio"}</p>
                    <h1 id="hero-heading">
                        <DecryptText text={OWNER_NAME} />
                    </h1>
                    <p class="hero-role">{OWNER_ROLE}</p>
                    <div class="hero-actions">
                        <a class="button button-primary" href="#projects">{"View projects"}</a>
                        <a class="button" href={RESUME_PATH} target="_blank" rel="noopener noreferrer">
                            {"Resume"}
                        </a>
                    </div>
                    <SignalClip />
                </section>

                <section id="about" class="section" aria-labelledby="about-heading">
                    <h2 id="about-heading"><DecryptText text="About" /></h2>
                    <GlassPanel class="about-panel">
                        <p>
                            {"I design and build interfaces that feel physical: pointer-aware surfaces, "}
                            {"scroll-driven storytelling and real-time graphics that stay fast on modest hardware."}
                        </p>
                        <p>
                            {"Most of my work sits where systems programming meets the browser, "}
                            {"from Rust compiled to WebAssembly to shader pipelines tuned frame by frame."}
                        </p>
                    </GlassPanel>
                    <div class="skill-grid">
                        { for SKILLS.iter().map(|(name, detail)| html! {
                            <GlassPanel key={*name} class="skill-panel">
                                <h3>{*name}</h3>
                                <p class="muted">{*detail}</p>
                            </GlassPanel>
                        }) }
                    </div>
                </section>

                <section id="stack" class="section" aria-labelledby="stack-heading">
                    <h2 id="stack-heading"><DecryptText text="Tech stack" /></h2>
                    <div class="stack-grid">
                        { for TECH_STACK.iter().map(|category| html! {
                            <GlassPanel key={category.name} class="stack-panel">
                                <h3>{category.name}</h3>
                                <ul class="stack-list">
                                    { for category.items.iter().map(|item| html! {
                                        <li key={item.name}>
                                            <img
                                                class="stack-icon"
                                                src={item.icon}
                                                alt=""
                                                loading="lazy"
                                                onerror={Callback::from(hide_broken_image)}
                                            />
                                            <span>{item.name}</span>
                                        </li>
                                    }) }
                                </ul>
                            </GlassPanel>
                        }) }
                    </div>
                </section>

                <section id="projects" class="section" aria-labelledby="projects-heading">
                    <h2 id="projects-heading"><DecryptText text="Selected projects" /></h2>
                    <ProjectGallery />
                </section>

                <section id="contact" class="section" aria-labelledby="contact-heading">
                    <h2 id="contact-heading"><DecryptText text="Contact" /></h2>
                    <GlassPanel class="contact-panel">
                        <p class="contact-lead">
                            {"Open to collaborations and full-time roles. Say hi at "}
                            <a class="link" href={format!("mailto:{OWNER_EMAIL}")}>{OWNER_EMAIL}</a>
                        </p>
                        <ul class="social-row">
                            { for CONTACT_LINKS.iter().map(|link| html! {
                                <li key={link.label}><SocialLink link={link} /></li>
                            }) }
                        </ul>
                    </GlassPanel>
                </section>
            </main>

            <footer class="site-footer">
                <p class="muted">{format!("© {OWNER_NAME}")}</p>
            </footer>
        </>
    }
}

pub fn run() {
    let root = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"));

    match root {
        Some(root) => yew::Renderer::<App>::with_root(root).render(),
        None => yew::Renderer::<App>::new().render(),
    };
}
