//! Animation math shared by the page components.
//!
//! Nothing in here touches the DOM, so every behavior can be exercised by the
//! native test run.

use glam::{DVec2, Vec2};
use std::collections::VecDeque;

pub const RING_FOLLOW: f64 = 0.18;
pub const CURSOR_HOVER_SELECTOR: &str = "a, button, [data-cursor]";

pub const PREVIEW_SPRING: SpringConfig = SpringConfig {
    stiffness: 170.0,
    damping: 26.0,
};
pub const ICON_SPRING: SpringConfig = SpringConfig {
    stiffness: 400.0,
    damping: 20.0,
};
pub const SPRING_MAX_DT: f64 = 1.0 / 30.0;
pub const SPRING_REST_THRESHOLD: f64 = 0.1;

pub const PREVIEW_WIDTH: f64 = 360.0;
pub const PREVIEW_HEIGHT: f64 = 230.0;
pub const PREVIEW_GUTTER: f64 = 14.0;
pub const PREVIEW_CURSOR_OFFSET_X: f64 = 24.0;
pub const PREVIEW_CURSOR_OFFSET_Y: f64 = 18.0;
pub const PREVIEW_FOCUS_TOP: f64 = 96.0;

pub const DECRYPT_INTERVAL_MS: u32 = 30;
pub const DECRYPT_TICKS_PER_CHAR: usize = 3;
pub const DECRYPT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!<>-_\\/[]{}=+*^?#";

pub const LOAD_SCHEDULE: &[LoadStep] = &[
    LoadStep { delay_ms: 120, percent: 12 },
    LoadStep { delay_ms: 260, percent: 31 },
    LoadStep { delay_ms: 320, percent: 54 },
    LoadStep { delay_ms: 380, percent: 72 },
    LoadStep { delay_ms: 420, percent: 88 },
];
pub const LOAD_TIMEOUT_MS: u32 = 3_500;
pub const LOAD_FADE_MS: u32 = 600;

pub const NAV_OFFSET: f64 = 120.0;
pub const NEAR_BOTTOM_THRESHOLD: f64 = 100.0;

pub const PARALLAX_MAX: f32 = 3.0;
pub const PARALLAX_EASE: f32 = 0.1;
pub const BOB_AMPLITUDE: f32 = 0.05;
pub const BOB_RATE: f32 = 0.5;

pub const SPLAT_CAPACITY: usize = 16;
pub const SPLAT_DECAY_PER_SECOND: f32 = 1.6;
pub const SPLAT_VELOCITY_SCALE: f32 = 2.5;
pub const SPLAT_MAX_VELOCITY: f32 = 0.08;

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

pub fn follow(current: DVec2, target: DVec2, factor: f64) -> DVec2 {
    DVec2::new(
        lerp(current.x, target.x, factor),
        lerp(current.y, target.y, factor),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
}

/// Damped spring driving pointer-following elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub position: DVec2,
    pub velocity: DVec2,
    pub config: SpringConfig,
}

impl Spring {
    pub fn at(position: DVec2) -> Self {
        Self::with_config(position, PREVIEW_SPRING)
    }

    pub fn with_config(position: DVec2, config: SpringConfig) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            config,
        }
    }

    pub fn snap(&mut self, position: DVec2) {
        self.position = position;
        self.velocity = DVec2::ZERO;
    }

    pub fn step(&mut self, target: DVec2, dt: f64) {
        let dt = dt.clamp(0.0, SPRING_MAX_DT);
        let force = (target - self.position) * self.config.stiffness
            - self.velocity * self.config.damping;
        self.velocity += force * dt;
        self.position += self.velocity * dt;
    }

    pub fn is_settled(&self, target: DVec2) -> bool {
        self.position.distance(target) < SPRING_REST_THRESHOLD
            && self.velocity.length() < SPRING_REST_THRESHOLD
    }
}

pub fn clamp_preview_position(x: f64, y: f64, viewport: (f64, f64)) -> DVec2 {
    let (viewport_width, viewport_height) = viewport;
    let min_x = PREVIEW_GUTTER;
    let min_y = PREVIEW_GUTTER;
    let max_x = (viewport_width - PREVIEW_WIDTH - PREVIEW_GUTTER).max(min_x);
    let max_y = (viewport_height - PREVIEW_HEIGHT - PREVIEW_GUTTER).max(min_y);

    DVec2::new(x.clamp(min_x, max_x), y.clamp(min_y, max_y))
}

pub fn pointer_preview_target(client_x: f64, client_y: f64, viewport: (f64, f64)) -> DVec2 {
    clamp_preview_position(
        client_x + PREVIEW_CURSOR_OFFSET_X,
        client_y + PREVIEW_CURSOR_OFFSET_Y,
        viewport,
    )
}

pub fn focus_preview_target(viewport: (f64, f64)) -> DVec2 {
    let (viewport_width, _) = viewport;
    clamp_preview_position(
        viewport_width - PREVIEW_WIDTH - PREVIEW_GUTTER * 2.0,
        PREVIEW_FOCUS_TOP,
        viewport,
    )
}

/// Pointer position relative to the centre of a box at `origin` with `size`.
pub fn offset_from_center(pointer: DVec2, origin: DVec2, size: DVec2) -> DVec2 {
    pointer - (origin + size * 0.5)
}

/// Position of the pointer along one axis of a box, as a percentage.
pub fn glow_percent(pointer: f64, start: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 50.0;
    }
    ((pointer - start) / extent * 100.0).clamp(0.0, 100.0)
}

/// Window scroll position together with the heights it is measured against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Fraction of the scrollable distance covered, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let max_scroll = self.max_scroll();
        if max_scroll <= 0.0 {
            return 0.0;
        }
        (self.scroll_y / max_scroll).clamp(0.0, 1.0)
    }

    pub fn is_near_bottom(&self) -> bool {
        self.scroll_y + self.viewport_height >= self.document_height - NEAR_BOTTOM_THRESHOLD
    }
}

/// Picks the section the reader is in. `sections` holds `(id, top)` pairs in
/// document order. The last section wins once the page is scrolled to the
/// bottom, since a short final section may never reach the nav line.
pub fn active_section<'a>(
    sections: &[(&'a str, f64)],
    metrics: ScrollMetrics,
    nav_offset: f64,
) -> Option<&'a str> {
    if metrics.is_near_bottom() && metrics.max_scroll() > 0.0 {
        return sections.last().map(|(id, _)| *id);
    }

    let line = metrics.scroll_y + nav_offset;
    sections
        .iter()
        .rev()
        .find(|(_, top)| *top <= line)
        .or_else(|| sections.first())
        .map(|(id, _)| *id)
}

/// Vertical lift of the backdrop model for the current scroll progress.
pub fn parallax_offset(metrics: ScrollMetrics) -> f32 {
    metrics.progress() as f32 * PARALLAX_MAX
}

/// Eases the model toward its parallax target and adds the idle bob.
pub fn ease_parallax(current: f32, target: f32, time: f32) -> (f32, f32) {
    let eased = lerp(f64::from(current), f64::from(target), f64::from(PARALLAX_EASE)) as f32;
    (eased, eased + (time * BOB_RATE).sin() * BOB_AMPLITUDE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorMode {
    Default,
    Hover,
    Pressed,
    Hidden,
}

impl CursorMode {
    pub fn class(self) -> &'static str {
        match self {
            Self::Default => "cursor-default",
            Self::Hover => "cursor-hover",
            Self::Pressed => "cursor-pressed",
            Self::Hidden => "cursor-hidden",
        }
    }

    pub fn ring_scale(self) -> f64 {
        match self {
            Self::Default => 1.0,
            Self::Hover => 1.8,
            Self::Pressed => 0.7,
            Self::Hidden => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CursorState {
    pub pointer: DVec2,
    pub ring: DVec2,
    pub hovering: bool,
    pub pressed: bool,
    pub visible: bool,
}

impl CursorState {
    pub fn mode(&self) -> CursorMode {
        if !self.visible {
            CursorMode::Hidden
        } else if self.pressed {
            CursorMode::Pressed
        } else if self.hovering {
            CursorMode::Hover
        } else {
            CursorMode::Default
        }
    }

    pub fn move_to(&mut self, pointer: DVec2) {
        // First sighting: no easing in from the corner.
        if !self.visible {
            self.ring = pointer;
        }
        self.pointer = pointer;
        self.visible = true;
    }

    pub fn leave(&mut self) {
        self.visible = false;
        self.pressed = false;
    }

    pub fn step(&mut self) {
        self.ring = follow(self.ring, self.pointer, RING_FOLLOW);
    }
}

/// Character-substitution reveal, advanced one tick at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptReveal {
    source: Vec<char>,
    ticks: usize,
}

impl DecryptReveal {
    pub fn new(text: &str) -> Self {
        Self {
            source: text.chars().collect(),
            ticks: 0,
        }
    }

    pub fn revealed(&self) -> usize {
        (self.ticks / DECRYPT_TICKS_PER_CHAR).min(self.source.len())
    }

    pub fn is_complete(&self) -> bool {
        self.revealed() >= self.source.len()
    }

    pub fn tick(&mut self) {
        if !self.is_complete() {
            self.ticks += 1;
        }
    }

    pub fn finish(&mut self) {
        self.ticks = self.source.len() * DECRYPT_TICKS_PER_CHAR;
    }

    /// Renders the current frame; `pick` returns an index below its argument.
    pub fn frame(&self, mut pick: impl FnMut(usize) -> usize) -> String {
        let revealed = self.revealed();
        self.source
            .iter()
            .enumerate()
            .map(|(index, &ch)| {
                if index < revealed || ch.is_whitespace() {
                    ch
                } else {
                    let slot = pick(DECRYPT_CHARSET.len()) % DECRYPT_CHARSET.len();
                    char::from(DECRYPT_CHARSET[slot])
                }
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadStep {
    pub delay_ms: u32,
    pub percent: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Loaded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    Step(u8),
    ScheduleFinished,
    AssetsReady,
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadingProgress {
    pub percent: u8,
    pub schedule_done: bool,
    pub assets_ready: bool,
    pub phase: LoadPhase,
}

impl Default for LoadingProgress {
    fn default() -> Self {
        Self {
            percent: 0,
            schedule_done: false,
            assets_ready: false,
            phase: LoadPhase::Loading,
        }
    }
}

impl LoadingProgress {
    pub fn apply(mut self, event: LoadEvent) -> Self {
        if self.phase == LoadPhase::Loaded {
            return self;
        }

        match event {
            // Simulated steps never claim completion on their own.
            LoadEvent::Step(percent) => self.percent = self.percent.max(percent.min(99)),
            LoadEvent::ScheduleFinished => self.schedule_done = true,
            LoadEvent::AssetsReady => self.assets_ready = true,
            LoadEvent::TimedOut => {
                self.schedule_done = true;
                return self.complete();
            }
        }

        if self.schedule_done && self.assets_ready {
            return self.complete();
        }
        self
    }

    fn complete(mut self) -> Self {
        self.percent = 100;
        self.phase = LoadPhase::Loaded;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Splat {
    pub position: Vec2,
    pub velocity: Vec2,
    pub strength: f32,
}

/// Decaying pointer trail feeding the distortion pass. Positions are in
/// texture space with the origin at the bottom left.
#[derive(Clone, Debug, Default)]
pub struct SplatTrail {
    splats: VecDeque<Splat>,
    last: Option<Vec2>,
}

impl SplatTrail {
    pub fn push_pointer(&mut self, uv: Vec2) {
        if let Some(last) = self.last {
            let delta = uv - last;
            if delta.length_squared() > f32::EPSILON {
                if self.splats.len() == SPLAT_CAPACITY {
                    self.splats.pop_front();
                }
                self.splats.push_back(Splat {
                    position: uv,
                    velocity: (delta * SPLAT_VELOCITY_SCALE).clamp_length_max(SPLAT_MAX_VELOCITY),
                    strength: 1.0,
                });
            }
        }
        self.last = Some(uv);
    }

    pub fn decay(&mut self, dt: f32) {
        let loss = SPLAT_DECAY_PER_SECOND * dt.max(0.0);
        for splat in &mut self.splats {
            splat.strength -= loss;
        }
        self.splats.retain(|splat| splat.strength > 0.0);
    }

    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    /// Packs `(x, y, vx, vy)` quads and strengths; returns the live count.
    pub fn write_uniforms(
        &self,
        splats: &mut [f32; SPLAT_CAPACITY * 4],
        strengths: &mut [f32; SPLAT_CAPACITY],
    ) -> usize {
        splats.fill(0.0);
        strengths.fill(0.0);
        for (index, splat) in self.splats.iter().enumerate() {
            splats[index * 4] = splat.position.x;
            splats[index * 4 + 1] = splat.position.y;
            splats[index * 4 + 2] = splat.velocity.x;
            splats[index * 4 + 3] = splat.velocity.y;
            strengths[index] = splat.strength;
        }
        self.splats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: (f64, f64) = (1280.0, 720.0);

    #[test]
    fn spring_settles_on_target() {
        let mut spring = Spring::at(DVec2::ZERO);
        let target = DVec2::new(400.0, 220.0);

        for _ in 0..240 {
            spring.step(target, 1.0 / 60.0);
        }

        assert!(spring.is_settled(target), "spring at {:?}", spring.position);
    }

    #[test]
    fn spring_ignores_huge_frame_gaps() {
        let mut spring = Spring::at(DVec2::ZERO);
        spring.step(DVec2::new(100.0, 0.0), 5.0);

        assert!(spring.position.x > 0.0);
        assert!(spring.position.x < 100.0);
    }

    #[test]
    fn preview_stays_inside_viewport() {
        let corner = pointer_preview_target(1275.0, 715.0, VIEWPORT);
        assert_eq!(corner.x, VIEWPORT.0 - PREVIEW_WIDTH - PREVIEW_GUTTER);
        assert_eq!(corner.y, VIEWPORT.1 - PREVIEW_HEIGHT - PREVIEW_GUTTER);

        let origin = pointer_preview_target(-50.0, -50.0, VIEWPORT);
        assert_eq!(origin, DVec2::splat(PREVIEW_GUTTER));
    }

    #[test]
    fn tiny_viewport_pins_preview_to_gutter() {
        let position = pointer_preview_target(200.0, 200.0, (200.0, 150.0));
        assert_eq!(position, DVec2::splat(PREVIEW_GUTTER));
    }

    #[test]
    fn focus_preview_sits_top_right() {
        let position = focus_preview_target(VIEWPORT);
        assert_eq!(position.y, PREVIEW_FOCUS_TOP);
        assert!(position.x + PREVIEW_WIDTH < VIEWPORT.0);
    }

    #[test]
    fn glow_percent_tracks_and_clamps() {
        assert_eq!(glow_percent(150.0, 100.0, 200.0), 25.0);
        assert_eq!(glow_percent(10.0, 100.0, 200.0), 0.0);
        assert_eq!(glow_percent(900.0, 100.0, 200.0), 100.0);
        assert_eq!(glow_percent(5.0, 0.0, 0.0), 50.0);
    }

    const PAGE_SECTIONS: [(&str, f64); 5] = [
        ("hero", 0.0),
        ("about", 800.0),
        ("stack", 1500.0),
        ("projects", 2300.0),
        ("contact", 3400.0),
    ];

    /// Contact is a short section followed by the footer.
    fn page_metrics(scroll_y: f64) -> ScrollMetrics {
        let viewport_height = 900.0;
        ScrollMetrics {
            scroll_y,
            viewport_height,
            document_height: 3400.0 + viewport_height * 3.0 / 5.0 + 130.0,
        }
    }

    #[test]
    fn scroll_spy_highlights_projects_at_its_offset() {
        let at = |scroll_y| active_section(&PAGE_SECTIONS, page_metrics(scroll_y), NAV_OFFSET);

        assert_eq!(at(2300.0 - NAV_OFFSET), Some("projects"));
        assert_eq!(at(2299.0 - NAV_OFFSET), Some("stack"));
        assert_eq!(at(0.0), Some("hero"));
    }

    #[test]
    fn scroll_spy_selects_last_section_at_page_bottom() {
        let bottom = page_metrics(0.0).max_scroll();
        assert!(bottom + NAV_OFFSET < 3400.0, "contact never reaches the nav line");

        assert_eq!(
            active_section(&PAGE_SECTIONS, page_metrics(bottom), NAV_OFFSET),
            Some("contact")
        );
        assert_eq!(
            active_section(&PAGE_SECTIONS, page_metrics(bottom - NEAR_BOTTOM_THRESHOLD), NAV_OFFSET),
            Some("contact")
        );
        assert_eq!(
            active_section(&PAGE_SECTIONS, page_metrics(bottom - NEAR_BOTTOM_THRESHOLD - 1.0), NAV_OFFSET),
            Some("projects")
        );
    }

    #[test]
    fn scroll_spy_defaults_to_first_section() {
        let sections = [("hero", 400.0), ("about", 900.0)];
        let tall = ScrollMetrics {
            scroll_y: 0.0,
            viewport_height: 800.0,
            document_height: 4000.0,
        };
        assert_eq!(active_section(&sections, tall, 0.0), Some("hero"));
        assert_eq!(active_section(&[], tall, 0.0), None);

        let short = ScrollMetrics {
            document_height: 600.0,
            ..tall
        };
        assert_eq!(active_section(&sections, short, 0.0), Some("hero"));
    }

    #[test]
    fn parallax_lifts_model_with_scroll_progress() {
        let page = |scroll_y| ScrollMetrics {
            scroll_y,
            viewport_height: 900.0,
            document_height: 2700.0,
        };

        assert_eq!(parallax_offset(page(0.0)), 0.0);
        assert!((parallax_offset(page(900.0)) - 1.5).abs() < 1e-6);
        assert_eq!(parallax_offset(page(1800.0)), PARALLAX_MAX);
        assert_eq!(parallax_offset(page(5000.0)), PARALLAX_MAX);
        assert_eq!(
            parallax_offset(ScrollMetrics {
                scroll_y: 300.0,
                viewport_height: 900.0,
                document_height: 600.0,
            }),
            0.0
        );
    }

    #[test]
    fn parallax_eases_toward_target_with_bob() {
        let (eased, placed) = ease_parallax(0.0, 3.0, 0.0);
        assert!((eased - 0.3).abs() < 1e-6);
        assert_eq!(placed, eased);

        let mut current = 0.0;
        for _ in 0..200 {
            current = ease_parallax(current, 3.0, 0.0).0;
        }
        assert!((current - 3.0).abs() < 1e-3);

        let quarter_turn = std::f32::consts::FRAC_PI_2 / BOB_RATE;
        let (_, bobbed) = ease_parallax(1.0, 1.0, quarter_turn);
        assert!((bobbed - (1.0 + BOB_AMPLITUDE)).abs() < 1e-5);
    }

    #[test]
    fn icon_offset_is_measured_from_centre() {
        let origin = DVec2::new(100.0, 40.0);
        let size = DVec2::splat(60.0);

        assert_eq!(offset_from_center(DVec2::new(130.0, 70.0), origin, size), DVec2::ZERO);
        assert_eq!(
            offset_from_center(DVec2::new(150.0, 52.0), origin, size),
            DVec2::new(20.0, -18.0)
        );
    }

    #[test]
    fn icon_spring_is_stiffer_and_returns_home() {
        let mut preview = Spring::at(DVec2::ZERO);
        let mut icon = Spring::with_config(DVec2::ZERO, ICON_SPRING);
        let target = DVec2::new(20.0, -18.0);
        for _ in 0..4 {
            preview.step(target, 1.0 / 60.0);
            icon.step(target, 1.0 / 60.0);
        }
        assert!(icon.position.distance(target) < preview.position.distance(target));

        for _ in 0..240 {
            icon.step(DVec2::ZERO, 1.0 / 60.0);
        }
        assert!(icon.is_settled(DVec2::ZERO), "icon at {:?}", icon.position);

        icon.snap(target);
        assert_eq!(icon.position, target);
        assert_eq!(icon.velocity, DVec2::ZERO);
    }

    #[test]
    fn cursor_hover_selector_matches_interactive_elements() {
        for needle in ["a", "button", "[data-cursor]"] {
            assert!(CURSOR_HOVER_SELECTOR.split(", ").any(|selector| selector == needle));
        }
    }

    #[test]
    fn cursor_snaps_ring_on_first_move_then_eases() {
        let mut cursor = CursorState::default();
        assert_eq!(cursor.mode(), CursorMode::Hidden);

        cursor.move_to(DVec2::new(100.0, 100.0));
        assert_eq!(cursor.ring, DVec2::new(100.0, 100.0));
        assert_eq!(cursor.mode(), CursorMode::Default);

        cursor.move_to(DVec2::new(200.0, 100.0));
        cursor.step();
        assert!((cursor.ring.x - 118.0).abs() < 1e-9);
    }

    #[test]
    fn cursor_mode_prefers_pressed_over_hover() {
        let mut cursor = CursorState::default();
        cursor.move_to(DVec2::ZERO);
        cursor.hovering = true;
        assert_eq!(cursor.mode(), CursorMode::Hover);
        cursor.pressed = true;
        assert_eq!(cursor.mode(), CursorMode::Pressed);
        cursor.leave();
        assert_eq!(cursor.mode(), CursorMode::Hidden);
        assert_eq!(CursorMode::Hidden.ring_scale(), 0.0);
        assert_eq!(CursorMode::Pressed.class(), "cursor-pressed");
    }

    #[test]
    fn decrypt_text_eventually_equals_source() {
        let source = "Hello, world";
        let mut reveal = DecryptReveal::new(source);
        let mut seed = 7usize;
        let mut pick = |n: usize| {
            seed = seed.wrapping_mul(31).wrapping_add(17);
            seed % n
        };

        let mut ticks = 0;
        while !reveal.is_complete() {
            let frame = reveal.frame(&mut pick);
            assert_eq!(frame.chars().count(), source.chars().count());
            reveal.tick();
            ticks += 1;
        }

        assert_eq!(ticks, source.chars().count() * DECRYPT_TICKS_PER_CHAR);
        assert_eq!(reveal.frame(&mut pick), source);
    }

    #[test]
    fn decrypt_headings_resolve_quickly() {
        let mut heading = DecryptReveal::new("Selected projects");
        let mut elapsed_ms = 0;
        while !heading.is_complete() {
            heading.tick();
            elapsed_ms += DECRYPT_INTERVAL_MS;
        }
        assert_eq!(elapsed_ms, 17 * 3 * 30);
    }

    #[test]
    fn decrypt_reveals_left_to_right_and_keeps_spaces() {
        let mut reveal = DecryptReveal::new("ab cd");
        for _ in 0..DECRYPT_TICKS_PER_CHAR * 2 {
            reveal.tick();
        }

        let frame: Vec<char> = reveal.frame(|_| 0).chars().collect();
        assert_eq!(&frame[..2], &['a', 'b']);
        assert_eq!(frame[2], ' ');
        assert_eq!(frame[3], char::from(DECRYPT_CHARSET[0]));
    }

    #[test]
    fn decrypt_finish_shows_literal_text() {
        let mut reveal = DecryptReveal::new("Ünïcode ok");
        reveal.finish();
        assert!(reveal.is_complete());
        assert_eq!(reveal.frame(|_| 3), "Ünïcode ok");
    }

    #[test]
    fn loading_waits_for_both_schedule_and_assets() {
        let mut progress = LoadingProgress::default();
        for step in LOAD_SCHEDULE {
            progress = progress.apply(LoadEvent::Step(step.percent));
        }
        assert_eq!(progress.phase, LoadPhase::Loading);
        assert_eq!(progress.percent, 88);

        progress = progress.apply(LoadEvent::ScheduleFinished);
        assert_eq!(progress.phase, LoadPhase::Loading);

        progress = progress.apply(LoadEvent::AssetsReady);
        assert_eq!(progress.phase, LoadPhase::Loaded);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn loading_timeout_completes_without_assets() {
        let progress = LoadingProgress::default()
            .apply(LoadEvent::Step(40))
            .apply(LoadEvent::ScheduleFinished)
            .apply(LoadEvent::TimedOut);

        assert_eq!(progress.phase, LoadPhase::Loaded);
        assert_eq!(progress.percent, 100);
        assert!(!progress.assets_ready);
    }

    #[test]
    fn loading_progress_never_decreases() {
        let progress = LoadingProgress::default()
            .apply(LoadEvent::Step(54))
            .apply(LoadEvent::Step(31))
            .apply(LoadEvent::Step(100));
        assert_eq!(progress.percent, 99);
        assert_eq!(progress.phase, LoadPhase::Loading);

        let done = progress.apply(LoadEvent::TimedOut).apply(LoadEvent::Step(10));
        assert_eq!(done.percent, 100);
    }

    #[test]
    fn overlay_lifetime_is_bounded() {
        let schedule: u32 = LOAD_SCHEDULE.iter().map(|step| step.delay_ms).sum();
        assert!(schedule + LOAD_TIMEOUT_MS + LOAD_FADE_MS < 6_000);
    }

    #[test]
    fn schedule_percentages_are_increasing() {
        assert!(LOAD_SCHEDULE.windows(2).all(|pair| pair[0].percent < pair[1].percent));
        assert!(LOAD_SCHEDULE.iter().all(|step| step.percent < 100));
    }

    #[test]
    fn splat_trail_records_motion_and_decays() {
        let mut trail = SplatTrail::default();
        trail.push_pointer(Vec2::new(0.5, 0.5));
        assert!(trail.is_empty(), "first sample only seeds the trail");

        trail.push_pointer(Vec2::new(0.52, 0.5));
        assert_eq!(trail.len(), 1);

        trail.decay(0.5);
        assert_eq!(trail.len(), 1);
        trail.decay(0.2);
        assert!(trail.is_empty());
    }

    #[test]
    fn splat_trail_is_bounded_and_packs_uniforms() {
        let mut trail = SplatTrail::default();
        for step in 0..(SPLAT_CAPACITY + 5) {
            trail.push_pointer(Vec2::new(step as f32 * 0.5, 0.0));
        }
        assert_eq!(trail.len(), SPLAT_CAPACITY);

        let mut splats = [1.0; SPLAT_CAPACITY * 4];
        let mut strengths = [1.0; SPLAT_CAPACITY];
        let count = trail.write_uniforms(&mut splats, &mut strengths);

        assert_eq!(count, SPLAT_CAPACITY);
        let velocity = Vec2::new(splats[2], splats[3]);
        assert!(velocity.length() <= SPLAT_MAX_VELOCITY + 1e-6);
        assert!(strengths.iter().all(|strength| *strength == 1.0));
    }
}
