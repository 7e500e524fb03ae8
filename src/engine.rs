//! Engine lifecycle
//!
//! `Uninitialized -> Running -> Stopped`. Mounting sizes the surface, seeds
//! the nodes, attaches the resize and pointer listeners and schedules the
//! first frame. Every frame reschedules itself. Stopping cancels the pending
//! frame and detaches both listeners; it is idempotent and terminal, and it
//! also runs when the engine is dropped.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::FieldConfig;
use crate::driver::{FrameDriver, FrameStats};
use crate::error::{FieldError, FieldResult};
use crate::events::EventKind;
use crate::host::Host;

/// Observable lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
    Stopped,
}

struct Running<H: Host> {
    ctx: H::Context,
    driver: FrameDriver,
    /// The scheduled next frame, if one is outstanding
    pending: Option<H::FrameHandle>,
    listeners: Vec<H::Listener>,
}

enum Lifecycle<H: Host> {
    Uninitialized,
    Running(Box<Running<H>>),
    Stopped,
}

/// A particle field mounted on a host surface
pub struct Engine<H: Host> {
    host: H,
    config: FieldConfig,
    rng: StdRng,
    lifecycle: Lifecycle<H>,
}

impl<H: Host> Engine<H> {
    /// Create an unmounted engine; `seed` fixes the initial node layout
    pub fn new(host: H, config: FieldConfig, seed: u64) -> Self {
        Self {
            host,
            config,
            rng: StdRng::seed_from_u64(seed),
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Uninitialized => Phase::Uninitialized,
            Lifecycle::Running(_) => Phase::Running,
            Lifecycle::Stopped => Phase::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    /// The frame driver while running
    pub fn driver(&self) -> Option<&FrameDriver> {
        match &self.lifecycle {
            Lifecycle::Running(run) => Some(&run.driver),
            _ => None,
        }
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Mount, swallowing setup failures
    ///
    /// A surface without a drawing context leaves the engine stopped with
    /// nothing attached; the failure is logged once.
    pub fn mount(&mut self) {
        if let Err(e) = self.try_mount() {
            tracing::warn!(error = %e, "particle field not started");
        }
    }

    /// Mount, reporting why setup failed
    ///
    /// Only valid from `Uninitialized`; later calls are ignored. On error the
    /// engine ends up `Stopped` and holds no listeners or frames.
    pub fn try_mount(&mut self) -> FieldResult<()> {
        if !matches!(self.lifecycle, Lifecycle::Uninitialized) {
            tracing::debug!(phase = ?self.phase(), "mount ignored");
            return Ok(());
        }

        let Some(ctx) = self.host.acquire_context() else {
            self.lifecycle = Lifecycle::Stopped;
            return Err(FieldError::SetupUnavailable(
                "no 2d drawing context".to_string(),
            ));
        };

        let surface = self.host.fit_surface();
        let driver = FrameDriver::seeded(self.config.clone(), surface, &mut self.rng);

        let mut listeners = Vec::with_capacity(2);
        for kind in [EventKind::Resize, EventKind::PointerMove] {
            match self.host.subscribe(kind, driver.sender()) {
                Ok(listener) => listeners.push(listener),
                Err(e) => {
                    self.release(None, listeners);
                    self.lifecycle = Lifecycle::Stopped;
                    return Err(FieldError::Host(e));
                }
            }
        }

        let pending = match self.host.request_frame() {
            Ok(handle) => handle,
            Err(e) => {
                self.release(None, listeners);
                self.lifecycle = Lifecycle::Stopped;
                return Err(FieldError::SetupUnavailable(e.to_string()));
            }
        };

        tracing::debug!(
            nodes = driver.state().nodes.len(),
            width = surface.width,
            height = surface.height,
            "particle field mounted"
        );
        self.lifecycle = Lifecycle::Running(Box::new(Running {
            ctx,
            driver,
            pending: Some(pending),
            listeners,
        }));
        Ok(())
    }

    /// Run one scheduled frame and schedule the next
    ///
    /// Frames that fire after the engine stopped are ignored.
    pub fn frame(&mut self) -> Option<FrameStats> {
        let Lifecycle::Running(run) = &mut self.lifecycle else {
            tracing::trace!("frame ignored, engine not running");
            return None;
        };

        // The frame being run is no longer cancellable
        run.pending = None;
        let now = self.host.now_ms();
        let stats = run.driver.tick(&mut run.ctx, now);

        match self.host.request_frame() {
            Ok(handle) => run.pending = Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "could not schedule next frame, stopping");
                self.stop();
            }
        }
        Some(stats)
    }

    /// Cancel the pending frame and detach listeners
    ///
    /// Safe to call any number of times; the engine stays `Stopped`.
    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running(run) => {
                let Running {
                    pending, listeners, ..
                } = *run;
                self.release(pending, listeners);
                tracing::debug!("particle field stopped");
            }
            Lifecycle::Uninitialized | Lifecycle::Stopped => {}
        }
    }

    fn release(&mut self, pending: Option<H::FrameHandle>, listeners: Vec<H::Listener>) {
        if let Some(handle) = pending {
            self.host.cancel_frame(handle);
        }
        for listener in listeners {
            self.host.unsubscribe(listener);
        }
    }
}

impl<H: Host> Drop for Engine<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::error::HostError;
    use crate::events::{EventSender, FieldEvent};
    use crate::node::{Pointer, SurfaceSize};
    use crate::recording::RecordingCanvas;

    #[derive(Default)]
    struct HostLog {
        requested: Vec<u32>,
        cancelled: Vec<u32>,
        subscribed: Vec<EventKind>,
        unsubscribed: Vec<EventKind>,
        senders: Vec<(EventKind, EventSender)>,
    }

    /// Host whose scheduler only records calls; tests fire frames by hand
    struct MockHost {
        log: Rc<RefCell<HostLog>>,
        has_context: bool,
        size: SurfaceSize,
        next_handle: u32,
        /// Fail `request_frame` once this many frames have been requested
        request_limit: Option<usize>,
        failing_kind: Option<EventKind>,
    }

    impl MockHost {
        fn new() -> (Self, Rc<RefCell<HostLog>>) {
            let log = Rc::new(RefCell::new(HostLog::default()));
            let host = Self {
                log: Rc::clone(&log),
                has_context: true,
                size: SurfaceSize::new(800.0, 600.0),
                next_handle: 1,
                request_limit: None,
                failing_kind: None,
            };
            (host, log)
        }
    }

    impl Host for MockHost {
        type Context = RecordingCanvas;
        type FrameHandle = u32;
        type Listener = EventKind;

        fn acquire_context(&mut self) -> Option<RecordingCanvas> {
            self.has_context.then(RecordingCanvas::new)
        }

        fn fit_surface(&mut self) -> SurfaceSize {
            self.size
        }

        fn now_ms(&self) -> f64 {
            0.0
        }

        fn subscribe(
            &mut self,
            kind: EventKind,
            sender: EventSender,
        ) -> Result<EventKind, HostError> {
            if self.failing_kind == Some(kind) {
                return Err(HostError::new("listener rejected"));
            }
            let mut log = self.log.borrow_mut();
            log.subscribed.push(kind);
            log.senders.push((kind, sender));
            Ok(kind)
        }

        fn unsubscribe(&mut self, listener: EventKind) {
            self.log.borrow_mut().unsubscribed.push(listener);
        }

        fn request_frame(&mut self) -> Result<u32, HostError> {
            let mut log = self.log.borrow_mut();
            if self
                .request_limit
                .is_some_and(|limit| log.requested.len() >= limit)
            {
                return Err(HostError::new("scheduler gone"));
            }
            let handle = self.next_handle;
            self.next_handle += 1;
            log.requested.push(handle);
            Ok(handle)
        }

        fn cancel_frame(&mut self, handle: u32) {
            self.log.borrow_mut().cancelled.push(handle);
        }
    }

    fn sender_for(log: &Rc<RefCell<HostLog>>, kind: EventKind) -> EventSender {
        log.borrow()
            .senders
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s.clone())
            .expect("listener was not attached")
    }

    #[test]
    fn mount_attaches_listeners_and_schedules_first_frame() {
        let (host, log) = MockHost::new();
        let mut engine = Engine::new(host, FieldConfig::default(), 1);
        assert_eq!(engine.phase(), Phase::Uninitialized);

        engine.try_mount().unwrap();

        assert_eq!(engine.phase(), Phase::Running);
        let log = log.borrow();
        assert_eq!(
            log.subscribed,
            vec![EventKind::Resize, EventKind::PointerMove]
        );
        assert_eq!(log.requested, vec![1]);
        assert_eq!(engine.driver().unwrap().state().nodes.len(), 60);
    }

    #[test]
    fn each_frame_schedules_exactly_one_more() {
        let (host, log) = MockHost::new();
        let mut engine = Engine::new(host, FieldConfig::default(), 1);
        engine.mount();

        for _ in 0..5 {
            let stats = engine.frame().unwrap();
            assert_eq!(stats.nodes_drawn, 60);
        }

        assert_eq!(log.borrow().requested.len(), 6);
        assert_eq!(engine.driver().unwrap().frames(), 5);
    }

    #[test]
    fn teardown_twice_is_safe_and_stops_scheduling() {
        let (host, log) = MockHost::new();
        let mut engine = Engine::new(host, FieldConfig::default(), 1);
        engine.mount();
        engine.frame();

        engine.stop();
        engine.stop();

        assert_eq!(engine.phase(), Phase::Stopped);
        {
            let log = log.borrow();
            // Only the outstanding frame (handle 2) is cancelled
            assert_eq!(log.cancelled, vec![2]);
            assert_eq!(
                log.unsubscribed,
                vec![EventKind::Resize, EventKind::PointerMove]
            );
        }

        // A callback the host had already queued must not reschedule
        assert!(engine.frame().is_none());
        assert_eq!(log.borrow().requested.len(), 2);
    }

    #[test]
    fn missing_context_is_a_silent_noop() {
        let (mut host, log) = MockHost::new();
        host.has_context = false;
        let mut engine = Engine::new(host, FieldConfig::default(), 1);

        engine.mount();

        assert_eq!(engine.phase(), Phase::Stopped);
        assert!(engine.frame().is_none());
        let log = log.borrow();
        assert!(log.subscribed.is_empty());
        assert!(log.requested.is_empty());
    }

    #[test]
    fn try_mount_reports_setup_unavailable() {
        let (mut host, _log) = MockHost::new();
        host.has_context = false;
        let mut engine = Engine::new(host, FieldConfig::default(), 1);

        assert!(matches!(
            engine.try_mount(),
            Err(FieldError::SetupUnavailable(_))
        ));
    }

    #[test]
    fn failed_listener_releases_earlier_ones() {
        let (mut host, log) = MockHost::new();
        host.failing_kind = Some(EventKind::PointerMove);
        let mut engine = Engine::new(host, FieldConfig::default(), 1);

        assert!(matches!(engine.try_mount(), Err(FieldError::Host(_))));

        let log = log.borrow();
        assert_eq!(log.subscribed, vec![EventKind::Resize]);
        assert_eq!(log.unsubscribed, vec![EventKind::Resize]);
        assert!(log.requested.is_empty());
        assert_eq!(engine.phase(), Phase::Stopped);
    }

    #[test]
    fn failed_first_request_releases_listeners() {
        let (mut host, log) = MockHost::new();
        host.request_limit = Some(0);
        let mut engine = Engine::new(host, FieldConfig::default(), 1);

        assert!(engine.try_mount().is_err());
        assert_eq!(log.borrow().unsubscribed.len(), 2);
        assert_eq!(engine.phase(), Phase::Stopped);
    }

    #[test]
    fn scheduling_failure_mid_loop_stops_engine() {
        let (mut host, log) = MockHost::new();
        host.request_limit = Some(3);
        let mut engine = Engine::new(host, FieldConfig::default(), 1);
        engine.mount();

        assert!(engine.frame().is_some());
        assert!(engine.frame().is_some());
        // Third reschedule fails: the frame still ran, then the engine stops
        assert!(engine.frame().is_some());
        assert_eq!(engine.phase(), Phase::Stopped);
        assert!(engine.frame().is_none());

        let log = log.borrow();
        assert_eq!(log.unsubscribed.len(), 2);
        assert!(log.cancelled.is_empty());
    }

    #[test]
    fn dropping_engine_releases_everything() {
        let (host, log) = MockHost::new();
        {
            let mut engine = Engine::new(host, FieldConfig::default(), 1);
            engine.mount();
        }

        let log = log.borrow();
        assert_eq!(log.cancelled, vec![1]);
        assert_eq!(log.unsubscribed.len(), 2);
    }

    #[test]
    fn listener_events_reach_the_next_frame() {
        let (host, log) = MockHost::new();
        let mut engine = Engine::new(host, FieldConfig::default(), 1);
        engine.mount();

        sender_for(&log, EventKind::Resize).send(FieldEvent::Resize(SurfaceSize::new(400.0, 300.0)));
        sender_for(&log, EventKind::PointerMove)
            .send(FieldEvent::PointerMove(Pointer::new(12.0, 34.0)));
        engine.frame();

        let state = engine.driver().unwrap().state();
        assert_eq!(state.surface, SurfaceSize::new(400.0, 300.0));
        assert_eq!(state.pointer, Pointer::new(12.0, 34.0));
        assert!(state.all_in_bounds());
    }

    #[test]
    fn mount_is_only_honored_once() {
        let (host, log) = MockHost::new();
        let mut engine = Engine::new(host, FieldConfig::default(), 1);
        engine.mount();
        engine.mount();
        assert_eq!(log.borrow().subscribed.len(), 2);

        engine.stop();
        engine.mount();
        assert_eq!(engine.phase(), Phase::Stopped);
        assert_eq!(log.borrow().subscribed.len(), 2);
    }

    #[test]
    fn same_seed_same_layout() {
        let (host_a, _) = MockHost::new();
        let (host_b, _) = MockHost::new();
        let mut a = Engine::new(host_a, FieldConfig::default(), 42);
        let mut b = Engine::new(host_b, FieldConfig::default(), 42);
        a.mount();
        b.mount();

        assert_eq!(
            a.driver().unwrap().state().nodes,
            b.driver().unwrap().state().nodes
        );
    }
}
