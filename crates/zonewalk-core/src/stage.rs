use crate::geometry::Viewport;
use crate::host::{FrameId, Host, ManualHost};

/// A visual effect mounted on a host. All callbacks run on the host's single
/// thread, one at a time.
pub trait Effect {
    /// A frame this effect may or may not have requested; effects ignore
    /// ids they are not waiting on.
    fn on_frame(&mut self, host: &mut dyn Host, frame: FrameId);

    fn on_resize(&mut self, host: &mut dyn Host, viewport: Viewport);

    fn on_container_visibility(&mut self, _host: &mut dyn Host, _visible: bool) {}

    fn on_page_visibility(&mut self, _host: &mut dyn Host, _visible: bool) {}

    /// A timer fired for the subscription with this id.
    fn on_timer(&mut self, _host: &mut dyn Host, _subscription: u64) {}

    /// Cancel outstanding frames and release every listener.
    fn teardown(self: Box<Self>, host: &mut dyn Host);
}

/// Per-tick counters returned by `Stage::tick`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub frames_delivered: usize,
    pub timers_fired: usize,
}

/// Drives a set of effects against a `ManualHost`.
pub struct Stage {
    host: ManualHost,
    effects: Vec<Box<dyn Effect>>,
    frame_ms: u64,
}

impl Stage {
    pub const DEFAULT_FRAME_MS: u64 = 16;

    pub fn new(host: ManualHost) -> Self {
        Self {
            host,
            effects: Vec::new(),
            frame_ms: Self::DEFAULT_FRAME_MS,
        }
    }

    pub fn with_frame_ms(mut self, frame_ms: u64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    pub fn host(&self) -> &ManualHost {
        &self.host
    }

    /// Mount an effect with the stage's host and keep it.
    pub fn mount<E, F>(&mut self, mount: F)
    where
        E: Effect + 'static,
        F: FnOnce(&mut dyn Host) -> E,
    {
        let effect = mount(&mut self.host);
        self.effects.push(Box::new(effect));
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Advance one frame interval: deliver due timers, then the frames that
    /// were pending when the tick began.
    pub fn tick(&mut self) -> TickReport {
        let fired = self.host.advance(self.frame_ms);
        for &sub in &fired {
            for effect in &mut self.effects {
                effect.on_timer(&mut self.host, sub);
            }
        }
        let due = self.host.take_due_frames();
        for &frame in &due {
            for effect in &mut self.effects {
                effect.on_frame(&mut self.host, frame);
            }
        }
        TickReport {
            frames_delivered: due.len(),
            timers_fired: fired.len(),
        }
    }

    pub fn run(&mut self, ticks: usize) -> TickReport {
        let mut total = TickReport::default();
        for _ in 0..ticks {
            let r = self.tick();
            total.frames_delivered += r.frames_delivered;
            total.timers_fired += r.timers_fired;
        }
        total
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.host.set_viewport(viewport);
        for effect in &mut self.effects {
            effect.on_resize(&mut self.host, viewport);
        }
    }

    /// The container the effects draw into scrolled in or out of view.
    pub fn set_container_visible(&mut self, visible: bool) {
        for effect in &mut self.effects {
            effect.on_container_visibility(&mut self.host, visible);
        }
    }

    /// The page as a whole was shown or hidden.
    pub fn set_page_visible(&mut self, visible: bool) {
        for effect in &mut self.effects {
            effect.on_page_visibility(&mut self.host, visible);
        }
    }

    /// Tear down every effect and hand back the host for inspection.
    pub fn teardown(mut self) -> ManualHost {
        for effect in self.effects.drain(..) {
            effect.teardown(&mut self.host);
        }
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Signal, Subscription};

    /// Requests a frame on every frame it receives while shown.
    struct Ticker {
        pending: Option<FrameId>,
        frames: usize,
        timers: usize,
        sub: Subscription,
    }

    impl Ticker {
        fn mount(host: &mut dyn Host) -> Self {
            Self {
                pending: Some(host.request_frame()),
                frames: 0,
                timers: 0,
                sub: host.subscribe(Signal::Timer { period_ms: 32 }),
            }
        }
    }

    impl Effect for Ticker {
        fn on_frame(&mut self, host: &mut dyn Host, frame: FrameId) {
            if self.pending != Some(frame) {
                return;
            }
            self.frames += 1;
            self.pending = Some(host.request_frame());
        }

        fn on_resize(&mut self, _host: &mut dyn Host, _viewport: Viewport) {}

        fn on_container_visibility(&mut self, host: &mut dyn Host, visible: bool) {
            if !visible {
                if let Some(id) = self.pending.take() {
                    host.cancel_frame(id);
                }
            }
        }

        fn on_timer(&mut self, _host: &mut dyn Host, subscription: u64) {
            if subscription == self.sub.id() {
                self.timers += 1;
            }
        }

        fn teardown(self: Box<Self>, host: &mut dyn Host) {
            if let Some(id) = self.pending {
                host.cancel_frame(id);
            }
            host.release(self.sub);
        }
    }

    #[test]
    fn each_tick_delivers_one_frame_per_looping_effect() {
        let mut stage = Stage::new(ManualHost::new(Viewport::new(10.0, 10.0)));
        stage.mount(Ticker::mount);
        stage.mount(Ticker::mount);
        assert_eq!(stage.effect_count(), 2);
        let report = stage.run(4);
        assert_eq!(report.frames_delivered, 8);
        assert_eq!(report.timers_fired, 4);
    }

    #[test]
    fn hidden_effect_stops_receiving_frames() {
        let mut stage = Stage::new(ManualHost::default());
        stage.mount(Ticker::mount);
        stage.tick();
        stage.set_container_visible(false);
        assert_eq!(stage.tick().frames_delivered, 0);
    }

    #[test]
    fn longer_frames_fire_timers_sooner() {
        let mut stage = Stage::new(ManualHost::default()).with_frame_ms(32);
        stage.mount(Ticker::mount);
        assert_eq!(stage.run(3).timers_fired, 3);
        assert_eq!(stage.host().now_ms(), 96);
    }

    #[test]
    fn teardown_leaves_no_listeners_or_frames() {
        let mut stage = Stage::new(ManualHost::default());
        stage.mount(Ticker::mount);
        stage.run(3);
        let host = stage.teardown();
        assert_eq!(host.live_subscriptions(), 0);
        assert!(host.pending_frames().is_empty());
    }
}
