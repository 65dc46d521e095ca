use glam::DVec2;
use std::{cell::RefCell, rc::Rc};
use web_sys::{HtmlElement, MouseEvent};
use yew::prelude::*;

use super::dom::{prefers_reduced_motion, set_style, FrameLoop};
use crate::content::ContactLink;
use crate::motion::{offset_from_center, Spring, ICON_SPRING};

struct IconMotion {
    target: DVec2,
    spring: Spring,
}

#[derive(Properties, PartialEq)]
pub struct SocialLinkProps {
    pub link: &'static ContactLink,
}

/// Round contact icon that leans toward the pointer and springs back on leave.
#[function_component(SocialLink)]
pub fn social_link(props: &SocialLinkProps) -> Html {
    let link = props.link;
    let anchor = use_node_ref();
    let icon = use_node_ref();
    let motion = use_mut_ref(|| IconMotion {
        target: DVec2::ZERO,
        spring: Spring::with_config(DVec2::ZERO, ICON_SPRING),
    });
    let frames = use_mut_ref(|| None::<FrameLoop>);

    let onmousemove = {
        let anchor = anchor.clone();
        let icon = icon.clone();
        let motion = motion.clone();
        let frames = frames.clone();
        Callback::from(move |event: MouseEvent| {
            let Some(element) = anchor.cast::<HtmlElement>() else {
                return;
            };
            let rect = element.get_bounding_client_rect();
            let offset = offset_from_center(
                DVec2::new(f64::from(event.client_x()), f64::from(event.client_y())),
                DVec2::new(rect.left(), rect.top()),
                DVec2::new(rect.width(), rect.height()),
            );
            drive_icon(&icon, &motion, &frames, offset);
        })
    };

    let onmouseleave = {
        let icon = icon.clone();
        Callback::from(move |_: MouseEvent| drive_icon(&icon, &motion, &frames, DVec2::ZERO))
    };

    let external = link.href.starts_with("http");

    html! {
        <a
            ref={anchor}
            class="social-link"
            href={link.href}
            target="_blank"
            rel={external.then_some("noopener noreferrer")}
            aria-label={link.label}
            onmousemove={onmousemove}
            onmouseleave={onmouseleave}
        >
            <span class="social-orb" aria-hidden="true" />
            <span ref={icon} class="social-icon" aria-hidden="true">
                <svg viewBox="0 0 24 24">
                    <path d={link.icon} />
                </svg>
            </span>
            <span class="social-tooltip" aria-hidden="true">{link.label}</span>
        </a>
    }
}

fn drive_icon(
    icon: &NodeRef,
    motion: &Rc<RefCell<IconMotion>>,
    frames: &Rc<RefCell<Option<FrameLoop>>>,
    goal: DVec2,
) {
    motion.borrow_mut().target = goal;

    if prefers_reduced_motion() {
        let mut motion = motion.borrow_mut();
        motion.spring.snap(goal);
        write_offset(icon, motion.spring.position);
        return;
    }

    if frames.borrow().as_ref().is_some_and(FrameLoop::is_running) {
        return;
    }

    let icon = icon.clone();
    let motion = motion.clone();
    let mut last_timestamp: Option<f64> = None;
    let frame_loop = FrameLoop::start(move |timestamp| {
        let dt = last_timestamp.map_or(0.0, |last| (timestamp - last) / 1000.0);
        last_timestamp = Some(timestamp);

        let mut motion = motion.borrow_mut();
        let target = motion.target;
        motion.spring.step(target, dt);
        let settled = motion.spring.is_settled(target);
        if settled {
            motion.spring.snap(target);
        }

        write_offset(&icon, motion.spring.position);
        !settled
    });
    *frames.borrow_mut() = Some(frame_loop);
}

fn write_offset(icon: &NodeRef, offset: DVec2) {
    if let Some(element) = icon.cast::<HtmlElement>() {
        set_style(
            &element,
            "transform",
            &format!("translate3d({:.2}px, {:.2}px, 0)", offset.x, offset.y),
        );
    }
}
