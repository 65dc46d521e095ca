//! Static display data for the page.
//!
//! The server only reads the asset paths; everything else is page copy.

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const OWNER_NAME: &str = "Mara Okafor";
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const OWNER_ROLE: &str = "Creative developer building fast, tactile interfaces";
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const OWNER_EMAIL: &str = "hello@maraokafor.dev";
pub const RESUME_PATH: &str = "/resume.pdf";
pub const MODEL_PATH: &str = "/models/hero.obj";

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section {
    pub id: &'static str,
    pub label: &'static str,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const SECTIONS: &[Section] = &[
    Section { id: "hero", label: "Home" },
    Section { id: "about", label: "About" },
    Section { id: "stack", label: "Stack" },
    Section { id: "projects", label: "Projects" },
    Section { id: "contact", label: "Contact" },
];

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub accent: &'static str,
    pub image: &'static str,
    pub link: &'static str,
    pub year: u16,
}

pub const PROJECTS: &[Project] = &[
    Project {
        title: "Tidewatch",
        description: "Realtime coastal sensor dashboard streaming buoy telemetry into live charts.",
        tags: &["Rust", "WebSockets", "D3"],
        accent: "#38bdf8",
        image: "/previews/tidewatch.svg",
        link: "https://github.com/maraokafor/tidewatch",
        year: 2025,
    },
    Project {
        title: "Lumen Notes",
        description: "Offline-first markdown notebook with instant full-text search.",
        tags: &["TypeScript", "IndexedDB", "PWA"],
        accent: "#f472b6",
        image: "/previews/lumen.svg",
        link: "https://github.com/maraokafor/lumen-notes",
        year: 2024,
    },
    Project {
        title: "Gridline",
        description: "Procedural city generator rendered with instanced WebGL meshes.",
        tags: &["WebGL", "GLSL", "Rust"],
        accent: "#a3e635",
        image: "/previews/gridline.svg",
        link: "https://github.com/maraokafor/gridline",
        year: 2024,
    },
    Project {
        title: "Cadence",
        description: "Habit tracker that turns streaks into generative music loops.",
        tags: &["Web Audio", "React", "Node"],
        accent: "#fbbf24",
        image: "/previews/cadence.svg",
        link: "https://github.com/maraokafor/cadence",
        year: 2023,
    },
];

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TechItem {
    pub name: &'static str,
    pub icon: &'static str,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TechCategory {
    pub name: &'static str,
    pub items: &'static [TechItem],
}

macro_rules! devicon {
    ($slug:literal, $variant:literal) => {
        concat!(
            "https://cdn.jsdelivr.net/gh/devicons/devicon/icons/",
            $slug,
            "/",
            $slug,
            "-",
            $variant,
            ".svg"
        )
    };
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const TECH_STACK: &[TechCategory] = &[
    TechCategory {
        name: "Languages",
        items: &[
            TechItem { name: "Rust", icon: devicon!("rust", "original") },
            TechItem { name: "TypeScript", icon: devicon!("typescript", "original") },
            TechItem { name: "Python", icon: devicon!("python", "original") },
            TechItem { name: "GLSL", icon: devicon!("opengl", "original") },
        ],
    },
    TechCategory {
        name: "Frontend",
        items: &[
            TechItem { name: "React", icon: devicon!("react", "original") },
            TechItem { name: "Svelte", icon: devicon!("svelte", "original") },
            TechItem { name: "Three.js", icon: devicon!("threejs", "original") },
            TechItem { name: "Tailwind", icon: devicon!("tailwindcss", "original") },
        ],
    },
    TechCategory {
        name: "Backend & Infra",
        items: &[
            TechItem { name: "Node.js", icon: devicon!("nodejs", "original") },
            TechItem { name: "PostgreSQL", icon: devicon!("postgresql", "original") },
            TechItem { name: "Docker", icon: devicon!("docker", "original") },
            TechItem { name: "AWS", icon: devicon!("amazonwebservices", "original-wordmark") },
        ],
    },
];

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const SKILLS: &[(&str, &str)] = &[
    ("Interaction", "Motion design, pointer physics, scroll choreography"),
    ("Graphics", "WebGL pipelines, shaders, post-processing"),
    ("Systems", "Rust services, WebAssembly, realtime data"),
    ("Craft", "Accessibility, performance budgets, design systems"),
];

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactLink {
    pub label: &'static str,
    pub href: &'static str,
    /// Stroke path data on a 24x24 grid.
    pub icon: &'static str,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const CONTACT_LINKS: &[ContactLink] = &[
    ContactLink {
        label: "Email",
        href: "mailto:hello@maraokafor.dev",
        icon: "M3 6h18v12H3z M3 6l9 7 9-7",
    },
    ContactLink {
        label: "GitHub",
        href: "https://github.com/maraokafor",
        icon: "M8 7l-5 5 5 5 M16 7l5 5-5 5 M14 4l-4 16",
    },
    ContactLink {
        label: "LinkedIn",
        href: "https://www.linkedin.com/in/maraokafor",
        icon: "M5 10v9 M5 5v.01 M10 19v-9 M10 14a4 4 0 0 1 8 0v5",
    },
    ContactLink {
        label: "Resume",
        href: RESUME_PATH,
        icon: "M6 3h9l4 4v14H6z M15 3v4h4 M9 12h7 M9 16h7",
    },
];

/// Site-relative asset paths the page expects the static root to provide.
pub fn local_asset_paths() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = PROJECTS.iter().map(|project| project.image).collect();
    paths.push(MODEL_PATH);
    paths.push(RESUME_PATH);
    paths
}
