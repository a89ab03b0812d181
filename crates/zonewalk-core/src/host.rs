use crate::geometry::Viewport;
use std::collections::BTreeMap;

/// Handle for one scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(u64);

/// Host events an effect can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    Resize,
    /// The effect's own container entering or leaving the viewport.
    ContainerVisibility,
    /// The whole page being shown or hidden, as with a background tab.
    PageVisibility,
    Timer { period_ms: u32 },
}

/// Attached listener. Move-only: it is handed back to `Host::release`
/// exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    signal: Signal,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }
}

/// The rendering host: container size, motion preference, frame scheduling
/// and listener bookkeeping.
pub trait Host {
    fn viewport(&self) -> Viewport;

    /// Read once per effect, at mount.
    fn prefers_reduced_motion(&self) -> bool;

    /// Schedule a callback for the next tick.
    fn request_frame(&mut self) -> FrameId;

    fn cancel_frame(&mut self, id: FrameId);

    fn subscribe(&mut self, signal: Signal) -> Subscription;

    fn release(&mut self, subscription: Subscription);
}

#[derive(Clone, Copy, Debug)]
struct TimerState {
    period_ms: u32,
    next_due_ms: u64,
}

/// Deterministic in-memory host driven by explicit clock advances.
#[derive(Debug, Default)]
pub struct ManualHost {
    viewport: Viewport,
    reduced_motion: bool,
    now_ms: u64,
    next_frame: u64,
    next_subscription: u64,
    pending: Vec<FrameId>,
    live: BTreeMap<u64, Signal>,
    timers: BTreeMap<u64, TimerState>,
    frames_requested: u64,
    frames_cancelled: u64,
    released: u64,
}

impl ManualHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance the clock and return the subscription ids of timers that
    /// fired, once per elapsed period, in due order.
    pub fn advance(&mut self, ms: u64) -> Vec<u64> {
        self.now_ms += ms;
        let mut fired: Vec<(u64, u64)> = Vec::new();
        for (&id, timer) in self.timers.iter_mut() {
            while timer.next_due_ms <= self.now_ms {
                fired.push((timer.next_due_ms, id));
                timer.next_due_ms += u64::from(timer.period_ms.max(1));
            }
        }
        fired.sort_unstable();
        fired.into_iter().map(|(_, id)| id).collect()
    }

    /// Frames due this tick. Frames requested while these run are queued for
    /// the following tick.
    pub fn take_due_frames(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_frames(&self) -> &[FrameId] {
        &self.pending
    }

    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    pub fn frames_cancelled(&self) -> u64 {
        self.frames_cancelled
    }

    pub fn live_subscriptions(&self) -> usize {
        self.live.len()
    }

    pub fn released_subscriptions(&self) -> u64 {
        self.released
    }

    pub fn is_subscribed(&self, signal: Signal) -> bool {
        self.live.values().any(|s| *s == signal)
    }
}

impl Host for ManualHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn request_frame(&mut self) -> FrameId {
        self.next_frame += 1;
        let id = FrameId(self.next_frame);
        self.pending.push(id);
        self.frames_requested += 1;
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let before = self.pending.len();
        self.pending.retain(|f| *f != id);
        if self.pending.len() != before {
            self.frames_cancelled += 1;
        }
    }

    fn subscribe(&mut self, signal: Signal) -> Subscription {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.live.insert(id, signal);
        if let Signal::Timer { period_ms } = signal {
            self.timers.insert(
                id,
                TimerState {
                    period_ms,
                    next_due_ms: self.now_ms + u64::from(period_ms.max(1)),
                },
            );
        }
        Subscription { id, signal }
    }

    fn release(&mut self, subscription: Subscription) {
        let removed = self.live.remove(&subscription.id);
        debug_assert!(removed.is_some(), "subscription {} released twice", subscription.id);
        self.timers.remove(&subscription.id);
        self.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_queued_until_taken() {
        let mut host = ManualHost::new(Viewport::new(100.0, 100.0));
        let a = host.request_frame();
        let b = host.request_frame();
        assert_ne!(a, b);
        assert_eq!(host.take_due_frames(), vec![a, b]);
        assert!(host.pending_frames().is_empty());
        assert_eq!(host.frames_requested(), 2);
    }

    #[test]
    fn cancelled_frame_is_not_delivered() {
        let mut host = ManualHost::default();
        let a = host.request_frame();
        host.cancel_frame(a);
        host.cancel_frame(a);
        assert!(host.take_due_frames().is_empty());
        assert_eq!(host.frames_cancelled(), 1);
    }

    #[test]
    fn release_detaches_listener() {
        let mut host = ManualHost::default();
        let sub = host.subscribe(Signal::Resize);
        assert_eq!(sub.signal(), Signal::Resize);
        assert!(host.is_subscribed(Signal::Resize));
        host.release(sub);
        assert_eq!(host.live_subscriptions(), 0);
        assert_eq!(host.released_subscriptions(), 1);
    }

    #[test]
    fn timers_fire_once_per_period() {
        let mut host = ManualHost::default();
        let sub = host.subscribe(Signal::Timer { period_ms: 100 });
        let id = sub.id();
        assert!(host.advance(99).is_empty());
        assert_eq!(host.advance(1), vec![id]);
        assert_eq!(host.advance(250), vec![id, id]);
        host.release(sub);
        assert!(host.advance(1_000).is_empty());
    }

    #[test]
    fn timers_fire_in_due_order() {
        let mut host = ManualHost::default();
        let slow = host.subscribe(Signal::Timer { period_ms: 300 });
        let fast = host.subscribe(Signal::Timer { period_ms: 200 });
        let fired = host.advance(600);
        assert_eq!(fired, vec![fast.id(), slow.id(), fast.id(), slow.id(), fast.id()]);
    }
}
