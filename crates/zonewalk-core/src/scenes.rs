use crate::geometry::Viewport;
use crate::host::{FrameId, Host, Signal, Subscription};
use crate::stage::Effect;
use crate::surface::Rgba;
use crate::zone::ZoneType;
use log::debug;
use serde::Serialize;
use std::{error::Error, fmt};

pub const SCENE_PERIOD_MS: u32 = 4500;

/// A demo "now playing" card: where you are and what the zone plays.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub zone: ZoneType,
    pub location: &'static str,
    pub track: &'static str,
    pub source: &'static str,
    pub time_of_day: &'static str,
    pub activity: &'static str,
    pub accent: Rgba,
}

pub const SCENES: [Scene; 3] = [
    Scene {
        zone: ZoneType::Beach,
        location: "Alki Beach, Seattle",
        track: "Aquarium",
        source: "Maplestory OST",
        time_of_day: "Afternoon",
        activity: "Walking",
        accent: Rgba::opaque(0x1d, 0xd3, 0xb0),
    },
    Scene {
        zone: ZoneType::UrbanDense,
        location: "Capitol Hill, Seattle",
        track: "Lazy Afternoons",
        source: "Kingdom Hearts II",
        time_of_day: "Evening",
        activity: "Exploring",
        accent: Rgba::opaque(0x7b, 0x6b, 0xdb),
    },
    Scene {
        zone: ZoneType::Park,
        location: "Discovery Park, Seattle",
        track: "Kokiri Forest",
        source: "Zelda: Ocarina of Time",
        time_of_day: "Morning",
        activity: "Walking",
        accent: Rgba::opaque(0x4a, 0xde, 0x80),
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneOutOfRange {
    pub index: usize,
    pub len: usize,
}

impl fmt::Display for SceneOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene {} out of range (have {})", self.index, self.len)
    }
}

impl Error for SceneOutOfRange {}

/// Auto-advancing scene switcher for the demo card. Draws nothing itself.
pub struct SceneCarousel {
    current: usize,
    timer: Option<Subscription>,
}

impl SceneCarousel {
    pub fn mount(host: &mut dyn Host) -> Self {
        Self {
            current: 0,
            timer: Some(host.subscribe(Signal::Timer {
                period_ms: SCENE_PERIOD_MS,
            })),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &'static Scene {
        &SCENES[self.current]
    }

    pub fn advance(&mut self) -> &'static Scene {
        self.current = (self.current + 1) % SCENES.len();
        self.current()
    }

    /// Jump straight to a scene. The auto-advance cadence is not reset.
    pub fn select(&mut self, index: usize) -> Result<&'static Scene, SceneOutOfRange> {
        if index >= SCENES.len() {
            return Err(SceneOutOfRange {
                index,
                len: SCENES.len(),
            });
        }
        self.current = index;
        Ok(self.current())
    }
}

impl Effect for SceneCarousel {
    fn on_frame(&mut self, _host: &mut dyn Host, _frame: FrameId) {}

    fn on_resize(&mut self, _host: &mut dyn Host, _viewport: Viewport) {}

    fn on_timer(&mut self, _host: &mut dyn Host, subscription: u64) {
        if self.timer.as_ref().map(Subscription::id) == Some(subscription) {
            let scene = self.advance();
            debug!("demo card now playing {} at {}", scene.track, scene.location);
        }
    }

    fn teardown(mut self: Box<Self>, host: &mut dyn Host) {
        if let Some(timer) = self.timer.take() {
            host.release(timer);
        }
    }
}
