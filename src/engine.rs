//! The scheduler engine
//!
//! [`Scheduler`] owns the event queue, the listener registry, the injected
//! clock, and the RNG that resolves random rule operators. Everything runs
//! on the thread driving [`Scheduler::run`]: actions execute to completion
//! before the loop considers the next entry, and re-entrant scheduling
//! calls made from inside an action take effect on the next pass.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Local;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::cron::{check_rule, CronRule};
use crate::emitter::{Listener, Registry};
use crate::error::{Error, Result};
use crate::queue::{EventHandle, EventQueue, When};

type BoxedAction<C> = Box<dyn FnOnce(&mut Scheduler<C>)>;
type SharedRepeat<C> = Rc<RefCell<dyn FnMut(&mut Scheduler<C>) -> Repeat>>;
type SharedCronAction<C> = Rc<RefCell<dyn FnMut(&mut Scheduler<C>)>>;

// ============================================================================
// Recurrence Outcome
// ============================================================================

/// Outcome returned by a recurring action
///
/// [`Repeat::Continue`] re-inserts the action after its configured delay;
/// [`Repeat::Stop`] ends the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// Keep firing at the configured interval
    Continue,
    /// End the recurrence; nothing is re-inserted
    Stop,
}

/// Fixed parameters of one recurrence, passed explicitly into every
/// re-insertion
#[derive(Debug, Clone, Copy)]
struct RepeatPlan {
    delay: f64,
    priority: i32,
}

// ============================================================================
// Scheduler
// ============================================================================

/// In-process event scheduler
///
/// Holds a time-ordered queue of pending actions and executes them when
/// their scheduled time arrives, with recurring execution ([`repeat`],
/// [`every`]), calendar rules ([`cron`]), and event emission ([`on`],
/// [`emit`]) riding the same queue.
///
/// Each instance owns its queue and listener registry exclusively; nothing
/// is shared between schedulers.
///
/// [`repeat`]: Scheduler::repeat
/// [`every`]: Scheduler::every
/// [`cron`]: Scheduler::cron
/// [`on`]: Scheduler::on
/// [`emit`]: Scheduler::emit
pub struct Scheduler<C: Clock = SystemClock> {
    queue: EventQueue<BoxedAction<C>>,
    registry: Registry<C>,
    clock: C,
    rng: ChaCha8Rng,
}

impl Scheduler<SystemClock> {
    /// Create a scheduler on the system clock with an entropy-seeded RNG
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a scheduler with a custom clock or RNG seed
    pub fn builder() -> SchedulerBuilder<SystemClock> {
        SchedulerBuilder::default()
    }
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + 'static> Scheduler<C> {
    // ------------------------------------------------------------------
    // Queue operations
    // ------------------------------------------------------------------

    /// Schedule `action` to run once, after a delay or at an absolute time
    ///
    /// The returned handle can cancel the entry until it fires.
    pub fn enter<F>(&mut self, when: impl Into<When>, priority: i32, action: F) -> EventHandle
    where
        F: FnOnce(&mut Scheduler<C>) + 'static,
    {
        let time = match when.into() {
            When::Delay(delay) => self.clock.now() + delay,
            When::At(time) => time,
        };
        let handle = self.queue.insert(time, priority, Box::new(action));
        tracing::trace!(handle = handle.id(), time, priority, "event queued");
        handle
    }

    /// Remove a queued entry
    ///
    /// Fails with [`Error::NotFound`] if the entry already fired or was
    /// already cancelled; the queue is left unchanged.
    pub fn cancel(&mut self, handle: EventHandle) -> Result<()> {
        self.queue.cancel(handle)?;
        tracing::debug!(handle = handle.id(), "event cancelled");
        Ok(())
    }

    /// Drive the queue
    ///
    /// Blocking mode pops the earliest entry, sleeps on the clock until its
    /// time, invokes it, and repeats until the queue is empty. Non-blocking
    /// mode invokes only the entries already due when the call began, in
    /// `(time, priority, insertion)` order, and returns without sleeping.
    /// Future entries stay queued, and entries inserted during the pass
    /// wait for the next one.
    pub fn run(&mut self, blocking: bool) {
        if blocking {
            self.run_until_empty();
        } else {
            self.run_due();
        }
    }

    fn run_until_empty(&mut self) {
        while let Some((time, _priority)) = self.queue.peek() {
            let now = self.clock.now();
            if time > now {
                self.clock.sleep(time - now);
                continue;
            }
            if let Some(entry) = self.queue.pop_front() {
                tracing::trace!(seq = entry.seq, "event fired");
                (entry.action)(self);
            }
        }
    }

    fn run_due(&mut self) {
        let now = self.clock.now();
        let horizon = self.queue.next_seq();
        while let Some(entry) = self.queue.pop_due(now, horizon) {
            tracing::trace!(seq = entry.seq, "event fired");
            (entry.action)(self);
        }
    }

    /// Current time on the scheduler's clock
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Time and priority of the next entry to fire, if any
    pub fn peek(&self) -> Option<(f64, i32)> {
        self.queue.peek()
    }

    // ------------------------------------------------------------------
    // Recurrence
    // ------------------------------------------------------------------

    /// Schedule `action` to run at a fixed interval
    ///
    /// The first firing is immediate when `immediate` is true, otherwise
    /// after `delay`. On each firing the action decides whether to
    /// [`Repeat::Continue`] (re-inserted at `now + delay`, same priority)
    /// or [`Repeat::Stop`].
    ///
    /// A recurrence has no single "next absolute time", so an absolute
    /// [`When::At`] delay fails with [`Error::InvalidDelay`] before the
    /// queue is touched.
    ///
    /// The returned handle refers to the first pending firing; once the
    /// action has fired, the recurrence is controlled solely by its
    /// [`Repeat`] outcome.
    pub fn repeat<F>(
        &mut self,
        delay: impl Into<When>,
        priority: i32,
        immediate: bool,
        action: F,
    ) -> Result<EventHandle>
    where
        F: FnMut(&mut Scheduler<C>) -> Repeat + 'static,
    {
        let delay = match delay.into() {
            When::Delay(delay) => delay,
            When::At(_) => return Err(Error::InvalidDelay),
        };

        let plan = RepeatPlan { delay, priority };
        let action: SharedRepeat<C> = Rc::new(RefCell::new(action));
        let first = if immediate { 0.0 } else { plan.delay };
        Ok(self.schedule_repeat(plan, action, first))
    }

    fn schedule_repeat(
        &mut self,
        plan: RepeatPlan,
        action: SharedRepeat<C>,
        delay: f64,
    ) -> EventHandle {
        self.enter(delay, plan.priority, move |scheduler: &mut Scheduler<C>| {
            let outcome = (&mut *action.borrow_mut())(scheduler);
            if outcome == Repeat::Continue {
                scheduler.schedule_repeat(plan, action, plan.delay);
            }
        })
    }

    /// Builder form of [`repeat`](Scheduler::repeat) with defaults
    /// priority 0 and immediate first run
    pub fn every(&mut self, delay: impl Into<When>) -> Every<'_, C> {
        Every {
            scheduler: self,
            delay: delay.into(),
            priority: 0,
            immediate: true,
        }
    }

    // ------------------------------------------------------------------
    // Calendar rules
    // ------------------------------------------------------------------

    /// Schedule an action on a five-field calendar rule
    ///
    /// The rule is parsed immediately: a malformed rule fails here, at
    /// registration time, with [`Error::MalformedRule`]. Random operators
    /// are resolved against the scheduler's RNG once and stay fixed for
    /// the life of the job.
    pub fn cron(&mut self, rule: &str) -> Result<CronJob<'_, C>> {
        let rule = CronRule::parse(rule, &mut self.rng)?;
        Ok(CronJob {
            scheduler: self,
            rule,
            priority: 0,
        })
    }

    fn fire_cron(&mut self, runner: CronRunner<C>) {
        if !runner.active.get() {
            return;
        }
        if check_rule(&runner.rule, &Local::now()) {
            let action = Rc::clone(&runner.action);
            self.enter(0.0, runner.priority, move |scheduler: &mut Scheduler<C>| {
                (&mut *action.borrow_mut())(scheduler);
            });
        }
        // wake again at the next whole-minute boundary
        let delay = 60.0 - self.clock.now() % 60.0;
        let next = runner.clone();
        let handle = self.enter(delay, 0, move |scheduler: &mut Scheduler<C>| {
            scheduler.fire_cron(next);
        });
        runner.entry.set(handle);
    }

    /// Stop a cron job and remove its pending minute check
    ///
    /// Fails with [`Error::NotFound`] if the job was already cancelled.
    /// An action entry already enqueued by a matching minute still fires.
    pub fn cancel_cron(&mut self, handle: &CronHandle) -> Result<()> {
        if !handle.active.get() {
            return Err(Error::NotFound);
        }
        handle.active.set(false);
        // the runner entry may be mid-flight when cancelled re-entrantly
        let _ = self.queue.cancel(handle.entry.get());
        tracing::debug!("cron job cancelled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event emission
    // ------------------------------------------------------------------

    /// Register a listener for a named event
    ///
    /// Listeners are delivered in ascending priority order on each emit
    /// and are never removed.
    pub fn on<F>(&mut self, event: impl Into<String>, priority: i32, action: F)
    where
        F: FnMut(&mut Scheduler<C>, &Value) + 'static,
    {
        self.registry.register(event.into(), priority, action);
    }

    /// Emit an event now, delivering `payload` to every listener
    pub fn emit(&mut self, event: &str, payload: Value) {
        self.emit_after(event, 0.0, payload);
    }

    /// Emit an event after `delay` seconds
    ///
    /// A no-op if nothing is registered for `event`. One queue entry is
    /// created per listener at `now + delay`, each at the listener's own
    /// priority, so lower-priority-number listeners fire first.
    pub fn emit_after(&mut self, event: &str, delay: f64, payload: Value) {
        let Some(listeners) = self.registry.sorted(event) else {
            return;
        };
        tracing::debug!(event, listeners = listeners.len(), delay, "event emitted");
        for listener in listeners {
            let action = listener.shared();
            let payload = payload.clone();
            self.enter(delay, listener.priority(), move |scheduler: &mut Scheduler<C>| {
                (&mut *action.borrow_mut())(scheduler, &payload);
            });
        }
    }

    /// Snapshot of the listener registry
    ///
    /// Mutating the returned map does not affect the live registry.
    pub fn listeners(&self) -> HashMap<String, Vec<Listener<C>>> {
        self.registry.snapshot()
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builder for [`Scheduler`]
#[derive(Debug)]
pub struct SchedulerBuilder<C: Clock = SystemClock> {
    clock: C,
    seed: Option<u64>,
}

impl Default for SchedulerBuilder<SystemClock> {
    fn default() -> Self {
        Self {
            clock: SystemClock::new(),
            seed: None,
        }
    }
}

impl<C: Clock> SchedulerBuilder<C> {
    /// Drive the scheduler with a custom clock
    pub fn clock<D: Clock>(self, clock: D) -> SchedulerBuilder<D> {
        SchedulerBuilder {
            clock,
            seed: self.seed,
        }
    }

    /// Pin the RNG seed, making random rule operators reproducible
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the scheduler
    pub fn build(self) -> Scheduler<C> {
        let rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Scheduler {
            queue: EventQueue::new(),
            registry: Registry::new(),
            clock: self.clock,
            rng,
        }
    }
}

/// Configurator returned by [`Scheduler::every`]
#[must_use = "an interval does nothing until .run() registers an action"]
pub struct Every<'s, C: Clock> {
    scheduler: &'s mut Scheduler<C>,
    delay: When,
    priority: i32,
    immediate: bool,
}

impl<'s, C: Clock + 'static> Every<'s, C> {
    /// Queue priority for each firing (default 0)
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the first firing is immediate (default true)
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Register the recurring action
    pub fn run<F>(self, action: F) -> Result<EventHandle>
    where
        F: FnMut(&mut Scheduler<C>) -> Repeat + 'static,
    {
        self.scheduler
            .repeat(self.delay, self.priority, self.immediate, action)
    }
}

/// Configurator returned by [`Scheduler::cron`], holding the parsed rule
#[must_use = "a cron job does nothing until .run() registers an action"]
pub struct CronJob<'s, C: Clock> {
    scheduler: &'s mut Scheduler<C>,
    rule: CronRule,
    priority: i32,
}

impl<'s, C: Clock + 'static> CronJob<'s, C> {
    /// Queue priority for matched firings (default 0); the minute check
    /// itself always runs at priority 0
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The resolved rule this job will fire on
    pub fn rule(&self) -> &CronRule {
        &self.rule
    }

    /// Install the job: check the rule now, then once per minute boundary
    pub fn run<F>(self, action: F) -> CronHandle
    where
        F: FnMut(&mut Scheduler<C>) + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let entry = Rc::new(Cell::new(EventHandle(0)));
        let runner = CronRunner {
            rule: Rc::new(self.rule),
            priority: self.priority,
            action: Rc::new(RefCell::new(action)),
            active: Rc::clone(&active),
            entry: Rc::clone(&entry),
        };
        tracing::info!(priority = self.priority, "cron job installed");
        self.scheduler.fire_cron(runner);
        CronHandle { active, entry }
    }
}

// ============================================================================
// Cron Runner
// ============================================================================

struct CronRunner<C: Clock> {
    rule: Rc<CronRule>,
    priority: i32,
    action: SharedCronAction<C>,
    active: Rc<Cell<bool>>,
    entry: Rc<Cell<EventHandle>>,
}

impl<C: Clock> Clone for CronRunner<C> {
    fn clone(&self) -> Self {
        Self {
            rule: Rc::clone(&self.rule),
            priority: self.priority,
            action: Rc::clone(&self.action),
            active: Rc::clone(&self.active),
            entry: Rc::clone(&self.entry),
        }
    }
}

/// Handle to a running cron job, usable with
/// [`Scheduler::cancel_cron`]
#[derive(Clone)]
pub struct CronHandle {
    active: Rc<Cell<bool>>,
    entry: Rc<Cell<EventHandle>>,
}

impl CronHandle {
    /// Whether the job is still rescheduling itself
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn scheduler(clock: &ManualClock) -> Scheduler<ManualClock> {
        Scheduler::builder().clock(clock.clone()).seed(0).build()
    }

    fn log_action(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> impl FnOnce(&mut Scheduler<ManualClock>) {
        let log = Rc::clone(log);
        move |_| log.borrow_mut().push(name)
    }

    #[test]
    fn test_enter_and_run_due() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let log = Rc::new(RefCell::new(Vec::new()));

        sched.enter(1.0, 0, log_action(&log, "later"));
        sched.enter(0.0, 0, log_action(&log, "now"));

        sched.run(false);
        assert_eq!(*log.borrow(), vec!["now"]);
        assert_eq!(sched.len(), 1);

        clock.set(1.0);
        sched.run(false);
        assert_eq!(*log.borrow(), vec!["now", "later"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_equal_time_runs_by_priority_then_insertion() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let log = Rc::new(RefCell::new(Vec::new()));

        sched.enter(0.0, 2, log_action(&log, "low"));
        sched.enter(0.0, 1, log_action(&log, "high-first"));
        sched.enter(0.0, 1, log_action(&log, "high-second"));

        sched.run(false);
        assert_eq!(*log.borrow(), vec!["high-first", "high-second", "low"]);
    }

    #[test]
    fn test_enter_at_absolute_time() {
        let clock = ManualClock::starting_at(100.0);
        let mut sched = scheduler(&clock);
        let log = Rc::new(RefCell::new(Vec::new()));

        sched.enter(When::At(150.0), 0, log_action(&log, "absolute"));

        sched.run(false);
        assert!(log.borrow().is_empty());

        clock.set(150.0);
        sched.run(false);
        assert_eq!(*log.borrow(), vec!["absolute"]);
    }

    #[test]
    fn test_cancel_removes_pending_entry() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let log = Rc::new(RefCell::new(Vec::new()));

        let handle = sched.enter(0.0, 0, log_action(&log, "never"));
        sched.cancel(handle).unwrap();

        sched.run(false);
        assert!(log.borrow().is_empty());
        assert_eq!(sched.cancel(handle), Err(Error::NotFound));
    }

    #[test]
    fn test_blocking_run_drains_future_entries() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let log = Rc::new(RefCell::new(Vec::new()));

        sched.enter(3.0, 0, log_action(&log, "third"));
        sched.enter(1.0, 0, log_action(&log, "first"));
        sched.enter(2.0, 0, log_action(&log, "second"));

        sched.run(true);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_entries_inserted_during_pass_wait_for_next() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let fired = Rc::new(Cell::new(0));

        let inner = Rc::clone(&fired);
        sched.enter(0.0, 0, move |s: &mut Scheduler<ManualClock>| {
            let inner = Rc::clone(&inner);
            // due immediately, but must not run in this same pass
            s.enter(0.0, 0, move |_| inner.set(inner.get() + 1));
        });

        sched.run(false);
        assert_eq!(fired.get(), 0);
        assert_eq!(sched.len(), 1);

        sched.run(false);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_repeat_reschedules_until_stopped() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        sched
            .repeat(1.0, 0, false, move |_| {
                counter.set(counter.get() + 1);
                if counter.get() == 3 {
                    Repeat::Stop
                } else {
                    Repeat::Continue
                }
            })
            .unwrap();

        assert_eq!(sched.len(), 1);

        for tick in 1..=5 {
            clock.set(tick as f64);
            sched.run(false);
        }

        assert_eq!(calls.get(), 3);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_repeat_immediate_first_run() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        sched
            .repeat(5.0, 0, true, move |_| {
                counter.set(counter.get() + 1);
                Repeat::Continue
            })
            .unwrap();

        sched.run(false);
        assert_eq!(calls.get(), 1);
        // re-queued for now + delay
        assert_eq!(sched.peek(), Some((5.0, 0)));
    }

    #[test]
    fn test_repeat_rejects_absolute_time() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);

        let result = sched.repeat(When::At(10.0), 0, false, |_| Repeat::Stop);
        assert_eq!(result.unwrap_err(), Error::InvalidDelay);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_every_builder_registers_repeat() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        sched
            .every(1.0)
            .priority(3)
            .immediate(false)
            .run(move |_| {
                counter.set(counter.get() + 1);
                Repeat::Continue
            })
            .unwrap();

        assert_eq!(sched.len(), 1);
        sched.run(false);
        assert_eq!(calls.get(), 0);

        clock.set(1.0);
        sched.run(false);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_emit_fans_out_by_priority() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let log = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&log);
        sched.on("x", 2, move |_, _| a.borrow_mut().push("a"));
        let b = Rc::clone(&log);
        sched.on("x", 1, move |_, _| b.borrow_mut().push("b"));

        sched.emit("x", Value::Null);
        sched.run(false);

        assert_eq!(*log.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);

        sched.emit("nobody", Value::Null);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_emit_delivers_payload() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let seen = Rc::new(RefCell::new(Value::Null));

        let sink = Rc::clone(&seen);
        sched.on("data", 0, move |_, payload| {
            *sink.borrow_mut() = payload.clone();
        });

        sched.emit("data", json!({"answer": 42}));
        sched.run(false);

        assert_eq!(*seen.borrow(), json!({"answer": 42}));
    }

    #[test]
    fn test_delayed_emission() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        sched.on("event", 1, move |_, _| counter.set(counter.get() + 1));
        sched.emit_after("event", 5.0, Value::Null);

        sched.run(false);
        assert_eq!(calls.get(), 0);

        clock.set(10.0);
        sched.run(false);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_listeners_snapshot_is_detached() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);

        sched.on("x", 0, |_, _| {});
        let mut snapshot = sched.listeners();
        snapshot.clear();

        assert_eq!(sched.listeners().len(), 1);
    }

    #[test]
    fn test_cron_matching_rule_fires_and_reschedules() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        let handle = sched
            .cron("* * * * *")
            .unwrap()
            .run(move |_| counter.set(counter.get() + 1));
        assert!(handle.is_active());

        // the matched action plus the next minute check
        assert_eq!(sched.len(), 2);

        sched.run(false);
        assert_eq!(calls.get(), 1);
        // minute check waits at the boundary
        assert_eq!(sched.peek(), Some((60.0, 0)));

        clock.set(60.0);
        sched.run(false); // runner fires, enqueues the next match
        sched.run(false); // matched action fires
        assert_eq!(calls.get(), 2);
        assert_eq!(sched.peek(), Some((120.0, 0)));
    }

    #[test]
    fn test_cron_malformed_rule_fails_at_registration() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);

        let result = sched.cron("61 * * * *");
        assert!(matches!(result, Err(Error::MalformedRule { .. })));
        assert!(sched.is_empty());
    }

    #[test]
    fn test_cancel_cron_stops_the_cadence() {
        let clock = ManualClock::new();
        let mut sched = scheduler(&clock);
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        let handle = sched
            .cron("* * * * *")
            .unwrap()
            .run(move |_| counter.set(counter.get() + 1));

        sched.run(false);
        assert_eq!(calls.get(), 1);

        sched.cancel_cron(&handle).unwrap();
        assert!(!handle.is_active());
        assert!(sched.is_empty());

        clock.set(120.0);
        sched.run(false);
        assert_eq!(calls.get(), 1);

        assert_eq!(sched.cancel_cron(&handle), Err(Error::NotFound));
    }

    #[test]
    fn test_seeded_schedulers_resolve_identical_rules() {
        let clock = ManualClock::new();
        let mut first = scheduler(&clock);
        let mut second = scheduler(&clock);

        let a = first.cron("~/30 * * * *").unwrap().rule().clone();
        let b = second.cron("~/30 * * * *").unwrap().rule().clone();
        assert_eq!(a, b);
    }
}
