//! Work scheduler
//!
//! Rendering is split into units of work (one fiber each). The host calls
//! [`Renderer::step`] with a [`Deadline`]; the scheduler performs units until
//! the deadline runs short, then yields and picks up at the same fiber on
//! the next step. Once the whole tree has been visited it commits.

use alloc::rc::Rc;
use core::cell::Cell;
use core::time::Duration;

use crate::commit::{commit_root, CommitReport};
use crate::error::Result;
use crate::reconciler::{dispose_tree, perform_unit_of_work};
use crate::renderer::Renderer;

/// Time budget for one step.
pub trait Deadline {
    /// Time left in the current slice. Reading it spends nothing.
    fn time_remaining(&self) -> Duration;

    /// Called by the scheduler once after every unit of work.
    fn unit_done(&self) {}
}

/// A deadline that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Deadline measured in units of work: allows `n` units per slice.
///
/// Budget is spent through [`Deadline::unit_done`], so a fresh
/// `UnitBudget::new(1)` lets exactly one fiber through no matter how often
/// the remaining time is read.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    /// Create a budget of `units` units.
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Refill the budget for another slice.
    pub fn reset(&self, units: usize) {
        self.remaining.set(units);
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        if self.remaining.get() > 0 {
            Duration::MAX
        } else {
            Duration::ZERO
        }
    }

    fn unit_done(&self) {
        self.remaining.set(self.remaining.get().saturating_sub(1));
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Deadline that expires a fixed budget after its creation.
pub struct ClockDeadline<C: Clock> {
    clock: C,
    expires_at: Duration,
}

impl<C: Clock> ClockDeadline<C> {
    /// Start a slice of `budget` from now.
    pub fn new(clock: C, budget: Duration) -> Self {
        let expires_at = clock.now().saturating_add(budget);
        Self { clock, expires_at }
    }
}

impl<C: Clock> Deadline for ClockDeadline<C> {
    fn time_remaining(&self) -> Duration {
        self.expires_at.saturating_sub(self.clock.now())
    }
}

/// Wall clock measured from the moment it was created.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and deterministic hosts.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Set the current time.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Render cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// No cycle in flight.
    Idle,
    /// Units of work are being performed.
    Traversing,
    /// The last step ran out of time with work left.
    Yielded,
    /// Traversal finished; the tree is about to be committed.
    Done,
    /// The last cycle was committed.
    Committed,
}

/// Result of one scheduler step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// There was nothing to do.
    Idle,
    /// The deadline ran short before traversal finished.
    Yielded { units: usize },
    /// Traversal finished and the tree was committed.
    Committed { units: usize, report: CommitReport },
}

impl Renderer {
    /// Run one slice of work against `deadline`.
    ///
    /// The first unit of a slice always runs. After each unit the deadline
    /// is checked against the configured yield threshold.
    pub fn step(&mut self, deadline: &dyn Deadline) -> Result<StepOutcome> {
        if self.requester.take() {
            match self.lifecycle.committed_root {
                Some(committed) => self.rerender(committed)?,
                // nothing to re-render from yet, retry after the first commit
                None => self.requester.request(),
            }
        }

        if self.lifecycle.next_unit_of_work.is_none() && self.lifecycle.wip_root.is_none() {
            self.state = WorkState::Idle;
            return Ok(StepOutcome::Idle);
        }

        let mut units = 0;
        if self.lifecycle.next_unit_of_work.is_some() {
            self.state = WorkState::Traversing;
        }
        while let Some(id) = self.lifecycle.next_unit_of_work {
            let next = match perform_unit_of_work(&mut self.work_context(), id) {
                Ok(next) => next,
                Err(err) => {
                    self.abort_cycle(id, &err);
                    return Err(err);
                }
            };
            self.lifecycle.next_unit_of_work = next;
            units += 1;
            deadline.unit_done();

            if next.is_none() {
                break;
            }
            if let Some(max) = self.config.max_units_per_step {
                if units >= max {
                    break;
                }
            }
            if deadline.time_remaining() < self.config.yield_threshold {
                break;
            }
        }

        if self.lifecycle.next_unit_of_work.is_some() {
            self.state = WorkState::Yielded;
            log::trace!("[Scheduler] yielded after {} units", units);
            return Ok(StepOutcome::Yielded { units });
        }

        self.state = WorkState::Done;
        let report = match commit_root(&mut self.work_context()) {
            Ok(report) => report,
            Err(err) => {
                log::error!("[Scheduler] commit failed: {}", err);
                if let Some(root) = self.lifecycle.abort() {
                    dispose_tree(&mut self.document, &mut self.fibers, root, false);
                }
                self.state = WorkState::Idle;
                return Err(err);
            }
        };
        self.state = WorkState::Committed;
        log::debug!("[Scheduler] committed after {} units", units);
        Ok(StepOutcome::Committed { units, report })
    }

    /// Step with an unbounded deadline until no work and no request are left.
    /// Returns the report of the last commit.
    pub fn run_until_idle(&mut self) -> Result<CommitReport> {
        let mut last = CommitReport::default();
        loop {
            match self.step(&Unbounded)? {
                StepOutcome::Committed { report, .. } => last = report,
                StepOutcome::Yielded { .. } => {}
                StepOutcome::Idle => return Ok(last),
            }
        }
    }

    /// Drop the in-flight cycle after a failed unit of work.
    fn abort_cycle(&mut self, at: crate::fiber::FiberId, err: &crate::error::ReactError) {
        let name = self
            .fibers
            .get(at)
            .map(|f| f.element.kind().display_name())
            .unwrap_or("?");
        log::error!("[Scheduler] render aborted at {} <{}>: {}", at, name, err);
        if let Some(root) = self.lifecycle.abort() {
            dispose_tree(
                &mut self.document,
                &mut self.fibers,
                root,
                self.config.dispose_abandoned_nodes,
            );
        }
        self.state = WorkState::Idle;
    }
}
