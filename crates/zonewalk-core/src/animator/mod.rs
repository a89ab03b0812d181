mod render;

use crate::config::{AnimatorConfig, ConfigError};
use crate::geometry::Viewport;
use crate::grid::ZoneGrid;
use crate::host::{FrameId, Host, Signal, Subscription};
use crate::path::{AgentPath, Walker};
use crate::random::RandomSource;
use crate::stage::Effect;
use crate::surface::Surface;
use log::{debug, warn};

/// Why an animator will never run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisabledReason {
    ReducedMotion,
    NoSurface,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Mounted and built, waiting for the first visibility signal.
    Uninitialized,
    Running,
    Suspended,
    /// Inert for its whole lifetime: no listeners, frames or draws.
    Disabled(DisabledReason),
}

/// Grid, path and agent built together for one viewport size. Replaced as a
/// whole on resize.
#[derive(Clone, Debug)]
pub struct MapScene {
    viewport: Viewport,
    grid: ZoneGrid,
    path: AgentPath,
    walker: Option<Walker>,
}

impl MapScene {
    pub fn build<R: RandomSource + ?Sized>(
        viewport: Viewport,
        config: &AnimatorConfig,
        rng: &mut R,
    ) -> Self {
        let (cols, rows) = viewport.grid_dims(config.cell_size);
        let grid = ZoneGrid::generate_with(cols, rows, &config.seeding, rng);
        let path = AgentPath::generate_len(cols, rows, config.cell_size, config.path_len, rng);
        let walker = Walker::at_start(&path);
        Self {
            viewport,
            grid,
            path,
            walker,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn grid(&self) -> &ZoneGrid {
        &self.grid
    }

    pub fn path(&self) -> &AgentPath {
        &self.path
    }

    pub fn walker(&self) -> Option<&Walker> {
        self.walker.as_ref()
    }
}

/// Animated zone map: shimmering zone blocks over a faint street grid with a
/// glowing agent walking a precomputed path.
pub struct GridAnimator<S, R> {
    config: AnimatorConfig,
    phase: Phase,
    surface: Option<S>,
    rng: R,
    scene: MapScene,
    clock: f64,
    pending: Option<FrameId>,
    listeners: Vec<Subscription>,
    frames_drawn: u64,
}

impl<S: Surface, R: RandomSource> GridAnimator<S, R> {
    pub fn mount(host: &mut dyn Host, surface: Option<S>, rng: R, config: AnimatorConfig) -> Self {
        Self::try_mount(host, surface, rng, config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Build the first scene and attach resize and visibility listeners.
    /// Nothing is drawn until the host reports the container visible.
    ///
    /// A reduced-motion preference or a missing surface produces a disabled
    /// animator that never touches the host again.
    pub fn try_mount(
        host: &mut dyn Host,
        surface: Option<S>,
        mut rng: R,
        config: AnimatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let disabled = if host.prefers_reduced_motion() {
            Some(DisabledReason::ReducedMotion)
        } else if surface.is_none() {
            Some(DisabledReason::NoSurface)
        } else {
            None
        };

        if let Some(reason) = disabled {
            match reason {
                DisabledReason::ReducedMotion => {
                    debug!("zone map skipped: reduced motion preferred")
                }
                DisabledReason::NoSurface => {
                    warn!("zone map has no drawing surface, staying inert")
                }
            }
            return Ok(Self {
                scene: MapScene::build(Viewport::default(), &config, &mut rng),
                config,
                phase: Phase::Disabled(reason),
                surface: None,
                rng,
                clock: 0.0,
                pending: None,
                listeners: Vec::new(),
                frames_drawn: 0,
            });
        }

        let viewport = host.viewport();
        let scene = MapScene::build(viewport, &config, &mut rng);
        debug!(
            "zone map mounted: {}x{} cells, {} zoned, path of {}",
            scene.grid.cols(),
            scene.grid.rows(),
            scene.grid.occupied_count(),
            scene.path.len()
        );
        let listeners = vec![
            host.subscribe(Signal::Resize),
            host.subscribe(Signal::ContainerVisibility),
        ];
        Ok(Self {
            config,
            phase: Phase::Uninitialized,
            surface,
            rng,
            scene,
            clock: 0.0,
            pending: None,
            listeners,
            frames_drawn: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    fn is_disabled(&self) -> bool {
        matches!(self.phase, Phase::Disabled(_))
    }

    /// One animation tick: advance the clock, redraw the map, move the agent
    /// and draw it on top.
    fn draw_frame(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.clock += self.config.time_step;
        let scene = &mut self.scene;
        surface.clear(scene.viewport.width, scene.viewport.height);
        if scene.grid.is_empty() {
            self.frames_drawn += 1;
            return;
        }
        render::draw_streets(surface, &scene.grid, &self.config);
        render::draw_zones(surface, &scene.grid, &self.config, self.clock);
        if let Some(walker) = scene.walker.as_mut() {
            walker.advance(&scene.path, self.config.agent_speed, self.config.arrive_radius);
            render::draw_agent(surface, walker.position, &self.config);
        }
        self.frames_drawn += 1;
    }
}

impl<S: Surface, R: RandomSource> Effect for GridAnimator<S, R> {
    fn on_frame(&mut self, host: &mut dyn Host, frame: FrameId) {
        if self.pending != Some(frame) {
            return;
        }
        self.pending = None;
        if self.phase != Phase::Running {
            return;
        }
        self.draw_frame();
        self.pending = Some(host.request_frame());
    }

    /// Discard the scene and build a fresh one for the new size. The agent
    /// restarts at the new center; the shimmer clock carries on.
    fn on_resize(&mut self, _host: &mut dyn Host, viewport: Viewport) {
        if self.is_disabled() {
            return;
        }
        let scene = MapScene::build(viewport, &self.config, &mut self.rng);
        debug!(
            "zone map rebuilt for {}x{}: {}x{} cells",
            viewport.width,
            viewport.height,
            scene.grid.cols(),
            scene.grid.rows()
        );
        self.scene = scene;
    }

    /// Showing schedules a frame for the next tick; hiding cancels it.
    fn on_container_visibility(&mut self, host: &mut dyn Host, visible: bool) {
        match (self.phase, visible) {
            (Phase::Disabled(_), _) => {}
            (Phase::Running, true) => {
                if self.pending.is_none() {
                    self.pending = Some(host.request_frame());
                }
            }
            (Phase::Uninitialized | Phase::Suspended, true) => {
                debug!("zone map visible, resuming");
                self.phase = Phase::Running;
                if self.pending.is_none() {
                    self.pending = Some(host.request_frame());
                }
            }
            (Phase::Running, false) => {
                debug!("zone map hidden, suspending");
                self.phase = Phase::Suspended;
                if let Some(id) = self.pending.take() {
                    host.cancel_frame(id);
                }
            }
            (Phase::Uninitialized | Phase::Suspended, false) => {}
        }
    }

    fn teardown(mut self: Box<Self>, host: &mut dyn Host) {
        if let Some(id) = self.pending.take() {
            host.cancel_frame(id);
        }
        for sub in std::mem::take(&mut self.listeners) {
            host.release(sub);
        }
        debug!("zone map torn down after {} frames", self.frames_drawn);
    }
}
