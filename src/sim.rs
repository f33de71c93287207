//! Headless host: a virtual clock plus recording stage and synth.
//!
//! Time only moves when [`VirtualClock::advance`] is called, which makes effect
//! timelines reproducible outside a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::effects::confetti::ConfettiPiece;
use crate::effects::hover::HoverParticle;
use crate::effects::tone::Tone;
use crate::scene::{Stage, Synth, Timers};

enum Task {
    Once(Box<dyn FnOnce()>),
    Every { period_ms: u64, task: Box<dyn FnMut()> },
}

struct Pending {
    due_ms: u64,
    seq: u64,
    id: u64,
    task: Task,
}

#[derive(Default)]
struct ClockState {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Pending>,
    cancelled: HashSet<u64>,
}

impl ClockState {
    fn push(&mut self, due_ms: u64, id: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due_ms,
            seq,
            id,
            task,
        });
    }

    /// Remove the earliest task due at or before `limit_ms` (FIFO among equals).
    fn pop_due(&mut self, limit_ms: u64) -> Option<Pending> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= limit_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(idx))
    }
}

/// Deterministic [`Timers`] implementation.
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

/// Handle of a repeating task on a [`VirtualClock`]. Dropping it cancels the task.
#[derive(Debug)]
pub struct IntervalId {
    id: u64,
    clock: Weak<RefCell<ClockState>>,
}

impl Drop for IntervalId {
    fn drop(&mut self) {
        let Some(state) = self.clock.upgrade() else {
            return;
        };
        let Ok(mut st) = state.try_borrow_mut() else {
            return;
        };
        let before = st.pending.len();
        st.pending.retain(|p| p.id != self.id);
        if st.pending.len() == before {
            // Cancelled from inside its own callback; drop it on reschedule.
            st.cancelled.insert(self.id);
        }
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    /// Number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Move time forward by `ms`, running everything that falls due in order.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms() + ms;
        self.advance_to(target);
    }

    pub fn advance_to(&self, target_ms: u64) {
        loop {
            // Borrow released before the task runs: tasks schedule more tasks.
            let next = self.state.borrow_mut().pop_due(target_ms);
            let Some(Pending {
                due_ms, id, task, ..
            }) = next
            else {
                break;
            };
            self.state.borrow_mut().now_ms = due_ms;
            match task {
                Task::Once(task) => task(),
                Task::Every {
                    period_ms,
                    mut task,
                } => {
                    task();
                    let mut st = self.state.borrow_mut();
                    if !st.cancelled.remove(&id) {
                        st.push(due_ms + period_ms, id, Task::Every { period_ms, task });
                    }
                }
            }
        }
        let mut st = self.state.borrow_mut();
        st.now_ms = st.now_ms.max(target_ms);
    }

    /// Run until nothing is pending. Repeating tasks must be cancelled first or
    /// this never returns.
    pub fn run_until_idle(&self) {
        loop {
            let next_due = self.state.borrow().pending.iter().map(|p| p.due_ms).min();
            match next_due {
                Some(due) => self.advance_to(due),
                None => break,
            }
        }
    }

    fn schedule(&self, delay_ms: u32, task: Task) -> u64 {
        let mut st = self.state.borrow_mut();
        let id = st.next_seq;
        let due = st.now_ms + u64::from(delay_ms);
        st.push(due, id, task);
        id
    }
}

impl Timers for VirtualClock {
    type Interval = IntervalId;

    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        self.schedule(delay_ms, Task::Once(task));
    }

    fn every(&self, period_ms: u32, task: Box<dyn FnMut()>) -> IntervalId {
        // Zero periods would spin forever inside a single advance.
        let period = period_ms.max(1);
        let id = self.schedule(
            period,
            Task::Every {
                period_ms: u64::from(period),
                task,
            },
        );
        IntervalId {
            id,
            clock: Rc::downgrade(&self.state),
        }
    }

    fn cancel(&self, handle: IntervalId) {
        drop(handle);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    Confetti,
    Particle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StageEvent {
    Attached { node: u64, kind: SpriteKind, at_ms: u64 },
    Detached { node: u64, at_ms: u64 },
    Flipped { on: bool, at_ms: u64 },
}

/// [`Stage`] that records every mutation against the virtual clock.
#[derive(Clone)]
pub struct RecordingStage {
    clock: VirtualClock,
    next_node: Rc<Cell<u64>>,
    events: Rc<RefCell<Vec<StageEvent>>>,
    confetti: Rc<RefCell<Vec<ConfettiPiece>>>,
}

/// A sprite's time on stage; `removed_ms` is `None` while it is still attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifetime {
    pub node: u64,
    pub created_ms: u64,
    pub removed_ms: Option<u64>,
}

impl RecordingStage {
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            next_node: Rc::new(Cell::new(0)),
            events: Rc::new(RefCell::new(Vec::new())),
            confetti: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events.borrow().clone()
    }

    /// Confetti pieces in the order they were attached.
    pub fn confetti(&self) -> Vec<ConfettiPiece> {
        self.confetti.borrow().clone()
    }

    /// Lifetimes of every sprite of `kind`, in creation order.
    pub fn lifetimes(&self, kind: SpriteKind) -> Vec<Lifetime> {
        let events = self.events.borrow();
        let mut out: Vec<Lifetime> = Vec::new();
        for ev in events.iter() {
            match *ev {
                StageEvent::Attached {
                    node,
                    kind: k,
                    at_ms,
                } if k == kind => out.push(Lifetime {
                    node,
                    created_ms: at_ms,
                    removed_ms: None,
                }),
                StageEvent::Detached { node, at_ms } => {
                    if let Some(l) = out.iter_mut().find(|l| l.node == node) {
                        l.removed_ms = Some(at_ms);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Sprites of `kind` currently attached.
    pub fn live(&self, kind: SpriteKind) -> usize {
        self.lifetimes(kind)
            .iter()
            .filter(|l| l.removed_ms.is_none())
            .count()
    }

    /// Last flip state applied, if any.
    pub fn flipped(&self) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|ev| match ev {
            StageEvent::Flipped { on, .. } => Some(*on),
            _ => None,
        })
    }

    fn attach(&self, kind: SpriteKind) -> u64 {
        let node = self.next_node.get();
        self.next_node.set(node + 1);
        self.events.borrow_mut().push(StageEvent::Attached {
            node,
            kind,
            at_ms: self.clock.now_ms(),
        });
        node
    }
}

impl Stage for RecordingStage {
    type Node = u64;

    fn attach_confetti(&self, piece: &ConfettiPiece) -> Option<u64> {
        self.confetti.borrow_mut().push(piece.clone());
        Some(self.attach(SpriteKind::Confetti))
    }

    fn attach_particle(&self, _particle: &HoverParticle) -> Option<u64> {
        Some(self.attach(SpriteKind::Particle))
    }

    fn detach(&self, node: &u64) {
        self.events.borrow_mut().push(StageEvent::Detached {
            node: *node,
            at_ms: self.clock.now_ms(),
        });
    }

    fn set_flipped(&self, flipped: bool) {
        self.events.borrow_mut().push(StageEvent::Flipped {
            on: flipped,
            at_ms: self.clock.now_ms(),
        });
    }
}

/// A tone as it was started on the virtual clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Voice {
    pub started_ms: u64,
    pub tone: Tone,
}

impl Voice {
    pub fn ends_ms(&self) -> u64 {
        self.started_ms + (self.tone.duration_s * 1000.0).round() as u64
    }

    /// Whether the voice is sounding at `at_ms`.
    pub fn is_audible_at(&self, at_ms: u64) -> bool {
        at_ms >= self.started_ms && at_ms < self.ends_ms()
    }
}

/// [`Synth`] that keeps every voice it was asked to play. With `muted` it models a
/// host without audio output.
#[derive(Clone)]
pub struct RecordingSynth {
    clock: VirtualClock,
    muted: bool,
    voices: Rc<RefCell<Vec<Voice>>>,
}

impl RecordingSynth {
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            muted: false,
            voices: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn muted(clock: VirtualClock) -> Self {
        Self {
            muted: true,
            ..Self::new(clock)
        }
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.voices.borrow().clone()
    }
}

impl Synth for RecordingSynth {
    fn play(&self, tone: &Tone) {
        if self.muted {
            return;
        }
        self.voices.borrow_mut().push(Voice {
            started_ms: self.clock.now_ms(),
            tone: tone.clone(),
        });
    }
}
