use crate::geometry::SurfaceSize;
use anyhow::{anyhow, Result};
use log::{debug, error};

/// Handle returned by the host's refresh callback registration.
pub type FrameId = i32;
/// Handle returned by the host's one-shot timer.
pub type TimerId = i32;

/// The two event sources the scheduler needs from its host.
/// - in the browser: `requestAnimationFrame` and `setTimeout`
/// - in tests: a fake with a virtual clock
pub trait Host {
    fn request_frame(&mut self) -> Result<FrameId>;
    fn cancel_frame(&mut self, frame: FrameId);
    fn set_timer(&mut self, delay_ms: u32) -> Result<TimerId>;
    fn clear_timer(&mut self, timer: TimerId);
}

/// ```text
/// ┌──────┐  start  ┌─────────┐  stop  ┌─────────┐
/// │ Idle ├────────►│ Running ├───────►│ Stopped │
/// └──┬───┘         └────┬────┘        └─────────┘
///    │      stop        │ tick: draw, then request next frame
///    └──────────────────┼───────────────────►
///                       └──► (loops)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    timer: TimerId,
    size: SurfaceSize,
}

/// Drives the draw loop and owns the current surface size.
///
/// Resize notifications are debounced: each one cancels the pending timer and
/// arms a new one, so a burst collapses into a single size update once the
/// burst has been quiet for `debounce_ms`.
pub struct FrameScheduler<H: Host> {
    host: H,
    state: SchedulerState,
    surface: SurfaceSize,
    pending_frame: Option<FrameId>,
    pending_resize: Option<PendingResize>,
    debounce_ms: u32,
}

impl<H: Host> FrameScheduler<H> {
    pub fn new(host: H, surface: SurfaceSize, debounce_ms: u32) -> Self {
        FrameScheduler {
            host,
            state: SchedulerState::Idle,
            surface,
            pending_frame: None,
            pending_resize: None,
            debounce_ms,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Idle -> Running and ask for the first frame.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SchedulerState::Running => Ok(()),
            SchedulerState::Stopped => Err(anyhow!("FrameScheduler: a stopped loop cannot be restarted")),
            SchedulerState::Idle => {
                self.pending_frame = Some(self.host.request_frame()?);
                self.state = SchedulerState::Running;
                debug!("frame loop started at {:?}", self.surface);
                Ok(())
            }
        }
    }

    /// Run one frame. Called from the host's refresh callback.
    /// # Returns
    /// * `Ok(true)`  - `draw` ran and the next frame was requested
    /// * `Ok(false)` - not running, nothing drawn
    /// * `Err`       - the host refused the next frame, the loop is stopped
    pub fn tick<F>(&mut self, draw: F) -> Result<bool>
    where
        F: FnOnce(SurfaceSize),
    {
        if self.state != SchedulerState::Running {
            return Ok(false);
        }
        self.pending_frame = None;
        draw(self.surface);

        // only after this frame's drawing is done
        match self.host.request_frame() {
            Ok(frame) => {
                self.pending_frame = Some(frame);
                Ok(true)
            }
            Err(err) => {
                error!("could not request the next frame, stopping : {:#}", err);
                self.stop();
                Err(err)
            }
        }
    }

    /// The surface container reported a new size.
    pub fn notify_resize(&mut self, size: SurfaceSize) -> Result<()> {
        if self.state == SchedulerState::Stopped {
            return Ok(());
        }
        if let Some(pending) = self.pending_resize.take() {
            self.host.clear_timer(pending.timer);
        }
        let timer = self.host.set_timer(self.debounce_ms)?;
        self.pending_resize = Some(PendingResize { timer, size });
        Ok(())
    }

    /// The debounce timer fired.
    /// # Returns
    /// * `Some(size)` - the caller must resize its surface to `size`
    /// * `None`       - nothing pending, or the size did not change
    pub fn on_debounce_elapsed(&mut self) -> Option<SurfaceSize> {
        let pending = self.pending_resize.take()?;
        if pending.size == self.surface {
            debug!("resize to {:?} skipped, size unchanged", pending.size);
            return None;
        }
        debug!("surface resized {:?} -> {:?}", self.surface, pending.size);
        self.surface = pending.size;
        Some(pending.size)
    }

    /// Cancel the outstanding frame and debounce timer. Terminal.
    pub fn stop(&mut self) {
        if let Some(frame) = self.pending_frame.take() {
            self.host.cancel_frame(frame);
        }
        if let Some(pending) = self.pending_resize.take() {
            self.host.clear_timer(pending.timer);
        }
        if self.state != SchedulerState::Stopped {
            debug!("frame loop stopped");
        }
        self.state = SchedulerState::Stopped;
    }
}
