use crate::config::{ConfigError, DriftConfig};
use crate::geometry::{Point, Viewport};
use crate::host::{FrameId, Host, Signal, Subscription};
use crate::random::RandomSource;
use crate::stage::Effect;
use crate::surface::Surface;
use log::debug;
use std::f64::consts::TAU;

/// One floating note glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub position: Point,
    pub velocity: Point,
    pub size: f64,
    pub opacity: f64,
    pub symbol: char,
    pub rotation: f64,
    pub spin: f64,
}

impl Glyph {
    fn is_alive(&self, cull_above: f64) -> bool {
        self.position.y > cull_above && self.opacity > 0.0
    }
}

/// Decorative overlay of note glyphs rising from the bottom edge and fading
/// out. Independent of the zone map; shares nothing with it.
pub struct NoteDrift<S, R> {
    config: DriftConfig,
    surface: Option<S>,
    rng: R,
    viewport: Viewport,
    glyphs: Vec<Glyph>,
    paused: bool,
    pending: Option<FrameId>,
    listeners: Vec<Subscription>,
    spawn_timer: Option<u64>,
    frames_drawn: u64,
}

impl<S: Surface, R: RandomSource> NoteDrift<S, R> {
    pub fn mount(host: &mut dyn Host, surface: Option<S>, rng: R, config: DriftConfig) -> Self {
        Self::try_mount(host, surface, rng, config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Attach resize, page-visibility and spawn-timer listeners and start
    /// animating on the next tick. Inert when reduced motion is preferred or
    /// no surface is available.
    pub fn try_mount(
        host: &mut dyn Host,
        surface: Option<S>,
        rng: R,
        config: DriftConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut drift = Self {
            viewport: host.viewport(),
            config,
            surface: None,
            rng,
            glyphs: Vec::new(),
            paused: false,
            pending: None,
            listeners: Vec::new(),
            spawn_timer: None,
            frames_drawn: 0,
        };
        if host.prefers_reduced_motion() || surface.is_none() {
            debug!("note drift inert at mount");
            return Ok(drift);
        }
        drift.surface = surface;
        let timer = host.subscribe(Signal::Timer {
            period_ms: drift.config.spawn_period_ms,
        });
        drift.spawn_timer = Some(timer.id());
        drift.listeners = vec![
            host.subscribe(Signal::Resize),
            host.subscribe(Signal::PageVisibility),
            timer,
        ];
        drift.pending = Some(host.request_frame());
        Ok(drift)
    }

    pub fn is_inert(&self) -> bool {
        self.surface.is_none()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Add one glyph below the bottom edge unless paused or already crowded.
    pub fn spawn(&mut self) -> bool {
        if self.is_inert() || self.paused || self.glyphs.len() > self.config.max_alive {
            return false;
        }
        let c = &self.config;
        let rng = &mut self.rng;
        let glyph = Glyph {
            position: Point::new(
                rng.unit() * self.viewport.width,
                self.viewport.height + c.spawn_below,
            ),
            velocity: Point::new(
                (rng.unit() * 2.0 - 1.0) * c.max_drift_x,
                -(rng.unit() * c.rise_spread + c.min_rise),
            ),
            size: rng.unit() * c.size_spread + c.min_size,
            opacity: rng.unit() * c.opacity_spread + c.min_opacity,
            symbol: c.glyphs[rng.pick(c.glyphs.len())],
            rotation: rng.unit() * TAU,
            spin: (rng.unit() * 2.0 - 1.0) * c.max_spin,
        };
        self.glyphs.push(glyph);
        true
    }

    fn draw_frame(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear(self.viewport.width, self.viewport.height);
        let cull_above = self.config.cull_above;
        self.glyphs.retain(|g| g.is_alive(cull_above));
        for g in &mut self.glyphs {
            g.position.x += g.velocity.x;
            g.position.y += g.velocity.y;
            g.rotation += g.spin;
            g.opacity -= self.config.fade_per_tick;
            surface.fill_glyph(g.symbol, g.position, g.size, g.rotation, g.opacity.max(0.0));
        }
        self.frames_drawn += 1;
    }
}

impl<S: Surface, R: RandomSource> Effect for NoteDrift<S, R> {
    fn on_frame(&mut self, host: &mut dyn Host, frame: FrameId) {
        if self.pending != Some(frame) {
            return;
        }
        self.pending = None;
        if self.paused {
            return;
        }
        self.draw_frame();
        self.pending = Some(host.request_frame());
    }

    fn on_resize(&mut self, _host: &mut dyn Host, viewport: Viewport) {
        if !self.is_inert() {
            self.viewport = viewport;
        }
    }

    fn on_page_visibility(&mut self, host: &mut dyn Host, visible: bool) {
        if self.is_inert() {
            return;
        }
        self.paused = !visible;
        if self.paused {
            if let Some(id) = self.pending.take() {
                host.cancel_frame(id);
            }
        } else if self.pending.is_none() {
            self.pending = Some(host.request_frame());
        }
    }

    fn on_timer(&mut self, _host: &mut dyn Host, subscription: u64) {
        if self.spawn_timer == Some(subscription) {
            self.spawn();
        }
    }

    fn teardown(mut self: Box<Self>, host: &mut dyn Host) {
        if let Some(id) = self.pending.take() {
            host.cancel_frame(id);
        }
        for sub in std::mem::take(&mut self.listeners) {
            host.release(sub);
        }
        debug!("note drift torn down with {} glyphs alive", self.glyphs.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::GridAnimator;
    use crate::config::AnimatorConfig;
    use crate::host::ManualHost;
    use crate::random::ScriptedSource;
    use crate::stage::Stage;
    use crate::surface::{DrawCommand, Recorder};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Drift = NoteDrift<Recorder, ChaCha12Rng>;

    fn mount(host: &mut ManualHost) -> Drift {
        NoteDrift::mount(
            host,
            Some(Recorder::new()),
            ChaCha12Rng::seed_from_u64(3),
            DriftConfig::default(),
        )
    }

    fn tick(host: &mut ManualHost, drift: &mut Drift) {
        for frame in host.take_due_frames() {
            drift.on_frame(host, frame);
        }
    }

    #[test]
    fn starts_animating_on_first_tick() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0));
        let mut drift = mount(&mut host);
        assert_eq!(host.live_subscriptions(), 3);
        assert_eq!(drift.frames_drawn(), 0);
        tick(&mut host, &mut drift);
        assert_eq!(drift.frames_drawn(), 1);
    }

    #[test]
    fn spawned_glyph_uses_configured_ranges() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0));
        let mut drift: NoteDrift<Recorder, ScriptedSource> = NoteDrift::mount(
            &mut host,
            Some(Recorder::new()),
            ScriptedSource::constant(1).with_unit(0.5),
            DriftConfig::default(),
        );
        assert!(drift.spawn());
        let g = &drift.glyphs()[0];
        assert_eq!(g.position, Point::new(400.0, 620.0));
        assert_eq!(g.velocity.x, 0.0);
        assert!((g.velocity.y + 0.35).abs() < 1e-12);
        assert_eq!(g.size, 16.0);
        assert!((g.opacity - 0.09).abs() < 1e-12);
        assert_eq!(g.symbol, '\u{266B}');
        assert!((g.rotation - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(g.spin, 0.0);
    }

    #[test]
    fn spawning_stops_once_more_than_cap_alive() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0));
        let mut drift = mount(&mut host);
        let mut spawned = 0;
        for _ in 0..30 {
            if drift.spawn() {
                spawned += 1;
            }
        }
        assert_eq!(spawned, 13);
        assert_eq!(drift.glyphs().len(), 13);
    }

    #[test]
    fn glyphs_rise_fade_and_are_culled() {
        let mut host = ManualHost::new(Viewport::new(800.0, 100.0));
        let mut drift = mount(&mut host);
        drift.spawn();
        let start = drift.glyphs()[0].clone();
        tick(&mut host, &mut drift);
        let moved = &drift.glyphs()[0];
        assert!(moved.position.y < start.position.y);
        assert!((start.opacity - moved.opacity - 0.00015).abs() < 1e-12);

        // Slowest rise is 0.15 px/tick from 120 px to past -40 px.
        for _ in 0..1_200 {
            tick(&mut host, &mut drift);
        }
        assert!(drift.glyphs().is_empty());
    }

    #[test]
    fn draws_each_live_glyph_at_clamped_alpha() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0));
        let mut drift = mount(&mut host);
        drift.spawn();
        drift.spawn();
        tick(&mut host, &mut drift);
        let frame = drift.surface().unwrap().last_frame();
        let glyphs: Vec<f64> = frame
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Glyph { alpha, .. } => Some(*alpha),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs.len(), 2);
        assert!(glyphs.iter().all(|a| (0.0..=0.15).contains(a)));
    }

    #[test]
    fn hidden_overlay_neither_draws_nor_spawns() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0));
        let mut drift = mount(&mut host);
        drift.on_page_visibility(&mut host, false);
        assert!(drift.is_paused());
        assert!(!drift.spawn());
        tick(&mut host, &mut drift);
        assert_eq!(drift.frames_drawn(), 0);

        drift.on_page_visibility(&mut host, true);
        assert_eq!(drift.frames_drawn(), 0);
        tick(&mut host, &mut drift);
        assert_eq!(drift.frames_drawn(), 1);
    }

    #[test]
    fn reduced_motion_is_inert() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0)).with_reduced_motion(true);
        let mut drift = mount(&mut host);
        assert!(drift.is_inert());
        assert!(!drift.spawn());
        drift.on_page_visibility(&mut host, true);
        assert_eq!(host.frames_requested(), 0);
        assert_eq!(host.live_subscriptions(), 0);
    }

    #[test]
    fn resize_keeps_glyphs_and_clears_at_new_size() {
        let mut host = ManualHost::new(Viewport::new(800.0, 600.0));
        let mut drift = mount(&mut host);
        drift.spawn();
        drift.spawn();
        let before: Vec<Point> = drift.glyphs().iter().map(|g| g.position).collect();

        let bigger = Viewport::new(1024.0, 768.0);
        host.set_viewport(bigger);
        drift.on_resize(&mut host, bigger);
        assert_eq!(drift.glyphs().len(), 2);
        let after: Vec<Point> = drift.glyphs().iter().map(|g| g.position).collect();
        assert_eq!(before, after);

        tick(&mut host, &mut drift);
        let frame = drift.surface().unwrap().last_frame();
        assert_eq!(
            frame.first(),
            Some(&DrawCommand::Clear {
                width: 1024.0,
                height: 768.0
            })
        );
        assert_eq!(drift.glyphs().len(), 2);
    }

    #[test]
    fn overlay_ignores_container_visibility_and_map_ignores_page_visibility() {
        let map = Rc::new(RefCell::new(Recorder::new()));
        let notes = Rc::new(RefCell::new(Recorder::new()));
        let mut stage = Stage::new(ManualHost::new(Viewport::new(800.0, 600.0)));
        let surface = Rc::clone(&map);
        stage.mount(move |host| {
            GridAnimator::mount(
                host,
                Some(surface),
                ChaCha12Rng::seed_from_u64(1),
                AnimatorConfig::default(),
            )
        });
        let surface = Rc::clone(&notes);
        stage.mount(move |host| {
            NoteDrift::mount(
                host,
                Some(surface),
                ChaCha12Rng::seed_from_u64(2),
                DriftConfig::default(),
            )
        });
        let clears = |r: &Rc<RefCell<Recorder>>| {
            r.borrow()
                .count_where(|c| matches!(c, DrawCommand::Clear { .. }))
        };

        stage.set_container_visible(true);
        stage.run(10);
        assert_eq!((clears(&map), clears(&notes)), (10, 10));

        // Map scrolled away: the overlay keeps drawing.
        stage.set_container_visible(false);
        stage.run(10);
        assert_eq!((clears(&map), clears(&notes)), (10, 20));

        // Map back in view, tab hidden: only the overlay pauses.
        stage.set_container_visible(true);
        stage.set_page_visible(false);
        stage.run(10);
        assert_eq!((clears(&map), clears(&notes)), (20, 20));
    }

    #[test]
    fn spawn_timer_drives_spawning_on_stage() {
        let shared = Rc::new(RefCell::new(Recorder::new()));
        let mut stage = Stage::new(ManualHost::new(Viewport::new(800.0, 600.0)));
        let surface = Rc::clone(&shared);
        stage.mount(move |host| {
            NoteDrift::mount(
                host,
                Some(surface),
                ChaCha12Rng::seed_from_u64(8),
                DriftConfig::default(),
            )
        });
        // 1200 ms spawn period at 16 ms per tick: 75 ticks per spawn.
        stage.run(75 * 3);
        let last = shared.borrow().last_frame().to_vec();
        let glyphs = last.iter().filter(|c| matches!(c, DrawCommand::Glyph { .. })).count();
        assert_eq!(glyphs, 3);

        let host = stage.teardown();
        assert_eq!(host.live_subscriptions(), 0);
        assert!(host.pending_frames().is_empty());
    }
}
