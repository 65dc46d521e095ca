use web_sys::{HtmlElement, MouseEvent};
use yew::prelude::*;

use super::dom::set_style;
use crate::motion::glow_percent;

#[derive(Properties, PartialEq)]
pub struct GlassPanelProps {
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub children: Children,
}

/// Frosted container with a light that follows the pointer while hovered.
#[function_component(GlassPanel)]
pub fn glass_panel(props: &GlassPanelProps) -> Html {
    let node = use_node_ref();

    let onmousemove = {
        let node = node.clone();
        Callback::from(move |event: MouseEvent| {
            let Some(panel) = node.cast::<HtmlElement>() else {
                return;
            };
            let rect = panel.get_bounding_client_rect();
            let x = glow_percent(f64::from(event.client_x()), rect.left(), rect.width());
            let y = glow_percent(f64::from(event.client_y()), rect.top(), rect.height());

            set_style(&panel, "--glow-x", &format!("{x:.2}%"));
            set_style(&panel, "--glow-y", &format!("{y:.2}%"));
            set_style(&panel, "--glow-opacity", "1");
        })
    };

    let onmouseleave = {
        let node = node.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(panel) = node.cast::<HtmlElement>() {
                set_style(&panel, "--glow-opacity", "0");
            }
        })
    };

    html! {
        <div
            ref={node}
            class={classes!("glass-panel", props.class.clone())}
            onmousemove={onmousemove}
            onmouseleave={onmouseleave}
        >
            { for props.children.iter() }
        </div>
    }
}
