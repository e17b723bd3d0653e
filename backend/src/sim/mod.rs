//! Deterministic discrete-event engine
//!
//! Runs a set of cooperatively scheduled actors against a simulated clock.
//! Each actor owns a named FIFO mailbox; actors yield whenever they want to
//! sleep or wait for mail, and the engine resumes them in
//! `(time, sequence)` order.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Simulation                   │
//! │                                              │
//! │  EventQueue (time, sequence) ──► resume ──┐  │
//! │        ▲                                  │  │
//! │        │          ┌───────────────┐       ▼  │
//! │        └── Yield ─┤  Actor::resume├─► outbox │
//! │                   └───────────────┘       │  │
//! │  mailboxes: name → VecDeque<M>  ◄─────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Sends are fire-and-forget: messages are appended to the target mailbox
//! when the sending actor yields, and a parked receiver is woken at the
//! same simulated instant.

mod event_queue;

pub use event_queue::{ActorId, EventQueue, ScheduledWake};

use crate::core::time::{SimClock, SimDuration, SimTime};
use crate::models::event::EventLog;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::{debug, warn};

/// What an actor wants to do after a resume returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yield {
    /// Resume again after this much simulated time
    Sleep(SimDuration),

    /// Resume when the next message is available in the actor's own mailbox
    Receive,

    /// Leave the simulation
    Exit,
}

/// A cooperatively scheduled unit of execution
///
/// `resume` runs until the actor's next suspension point. When the actor
/// was parked on [`Yield::Receive`], `delivered` carries the message taken
/// from the front of its mailbox; otherwise it is `None`.
pub trait Actor<M, E> {
    fn name(&self) -> &str;

    fn resume(&mut self, delivered: Option<M>, ctx: &mut Context<'_, M, E>) -> Yield;
}

/// Capabilities handed to an actor for the duration of one resume
pub struct Context<'a, M, E> {
    now: SimTime,
    name: &'a str,
    outbox: &'a mut Vec<(String, M)>,
    events: &'a mut EventLog<E>,
}

impl<'a, M, E> Context<'a, M, E> {
    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Name of the running actor
    pub fn name(&self) -> &str {
        self.name
    }

    /// Queue `message` for the mailbox named `to`
    ///
    /// Delivery happens when the current resume returns, in send order.
    pub fn send(&mut self, to: impl Into<String>, message: M) {
        self.outbox.push((to.into(), message));
    }

    /// Append an event to the simulation's event log
    pub fn log(&mut self, event: E) {
        self.events.log(event);
    }
}

/// Errors raised by the engine itself
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Actor name already registered: {0}")]
    DuplicateActor(String),

    #[error("Actor {from} sent to unknown mailbox {to}")]
    UnknownMailbox { from: String, to: String },

    #[error("Deadlock: actors waiting on empty mailboxes with nothing scheduled: {0:?}")]
    Deadlock(Vec<String>),

    #[error("Event budget of {0} exhausted before the simulation finished")]
    EventBudgetExhausted(u64),
}

/// Counters describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Simulated time of the last processed event
    pub final_time: SimTime,

    /// Actor resumes executed
    pub events_processed: u64,

    /// Messages appended to mailboxes
    pub messages_delivered: u64,

    /// Actors registered with the engine
    pub actors_spawned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorStatus {
    /// A resume is queued (initial start or after a sleep)
    Runnable,

    /// Parked on its mailbox
    Receiving { wake_pending: bool },

    Exited,
}

struct ActorSlot<M, E> {
    name: String,
    actor: Box<dyn Actor<M, E>>,
    status: ActorStatus,
}

struct Mailbox<M> {
    owner: ActorId,
    queue: VecDeque<M>,
}

/// The simulation engine
///
/// # Example
///
/// ```rust
/// use cluster_simulator_core_rs::sim::{Actor, Context, Simulation, Yield};
/// use cluster_simulator_core_rs::SimDuration;
///
/// struct Napper;
///
/// impl Actor<(), ()> for Napper {
///     fn name(&self) -> &str {
///         "napper"
///     }
///
///     fn resume(&mut self, _msg: Option<()>, ctx: &mut Context<'_, (), ()>) -> Yield {
///         if ctx.now().as_micros() == 0 {
///             Yield::Sleep(SimDuration::from_secs(3))
///         } else {
///             Yield::Exit
///         }
///     }
/// }
///
/// let mut sim: Simulation<(), ()> = Simulation::new();
/// sim.spawn(Box::new(Napper)).unwrap();
/// let stats = sim.run().unwrap();
/// assert_eq!(stats.final_time.as_secs_f64(), 3.0);
/// ```
pub struct Simulation<M, E> {
    clock: SimClock,
    queue: EventQueue,
    actors: Vec<ActorSlot<M, E>>,
    mailboxes: HashMap<String, Mailbox<M>>,
    events: EventLog<E>,
    max_events: Option<u64>,
    stats: EngineStats,
}

impl<M, E> Default for Simulation<M, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, E> Simulation<M, E> {
    pub fn new() -> Self {
        Self {
            clock: SimClock::new(),
            queue: EventQueue::new(),
            actors: Vec::new(),
            mailboxes: HashMap::new(),
            events: EventLog::new(),
            max_events: None,
            stats: EngineStats::default(),
        }
    }

    /// Abort the run with [`EngineError::EventBudgetExhausted`] after `max` resumes
    pub fn with_max_events(mut self, max: u64) -> Self {
        self.max_events = Some(max);
        self
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn events(&self) -> &EventLog<E> {
        &self.events
    }

    pub fn into_events(self) -> EventLog<E> {
        self.events
    }

    /// Number of messages waiting in the mailbox named `name`
    pub fn pending_messages(&self, name: &str) -> Option<usize> {
        self.mailboxes.get(name).map(|mb| mb.queue.len())
    }

    /// Register an actor and its mailbox; it first runs at the current time
    pub fn spawn(&mut self, actor: Box<dyn Actor<M, E>>) -> Result<ActorId, EngineError> {
        let name = actor.name().to_string();
        if self.mailboxes.contains_key(&name) {
            return Err(EngineError::DuplicateActor(name));
        }

        let id = ActorId(self.actors.len());
        self.mailboxes.insert(
            name.clone(),
            Mailbox {
                owner: id,
                queue: VecDeque::new(),
            },
        );
        self.actors.push(ActorSlot {
            name: name.clone(),
            actor,
            status: ActorStatus::Runnable,
        });
        self.queue.schedule(self.clock.now(), id);
        self.stats.actors_spawned += 1;

        debug!(actor = %name, time = %self.clock.now(), "Actor spawned");
        Ok(id)
    }

    /// Run until no actor has anything left to do
    pub fn run(&mut self) -> Result<EngineStats, EngineError> {
        while let Some(wake) = self.queue.pop_earliest() {
            if let Some(max) = self.max_events {
                if self.stats.events_processed >= max {
                    return Err(EngineError::EventBudgetExhausted(max));
                }
            }

            self.clock.advance_to(wake.time());
            self.stats.events_processed += 1;
            self.stats.final_time = self.clock.now();
            self.step(wake.actor())?;
        }

        let blocked: Vec<String> = self
            .actors
            .iter()
            .filter(|slot| matches!(slot.status, ActorStatus::Receiving { .. }))
            .map(|slot| slot.name.clone())
            .collect();
        if !blocked.is_empty() {
            return Err(EngineError::Deadlock(blocked));
        }

        Ok(self.stats.clone())
    }

    fn step(&mut self, id: ActorId) -> Result<(), EngineError> {
        let now = self.clock.now();
        let slot = &mut self.actors[id.0];

        let delivered = match slot.status {
            ActorStatus::Exited => return Ok(()),
            ActorStatus::Runnable => None,
            ActorStatus::Receiving { .. } => self
                .mailboxes
                .get_mut(&slot.name)
                .and_then(|mb| mb.queue.pop_front()),
        };

        let mut outbox = Vec::new();
        let next = {
            let mut ctx = Context {
                now,
                name: &slot.name,
                outbox: &mut outbox,
                events: &mut self.events,
            };
            slot.actor.resume(delivered, &mut ctx)
        };

        match next {
            Yield::Sleep(duration) => {
                slot.status = ActorStatus::Runnable;
                self.queue.schedule(now + duration, id);
            }
            Yield::Receive => {
                let has_mail = self
                    .mailboxes
                    .get(&slot.name)
                    .map_or(false, |mb| !mb.queue.is_empty());
                slot.status = ActorStatus::Receiving {
                    wake_pending: has_mail,
                };
                if has_mail {
                    self.queue.schedule(now, id);
                }
            }
            Yield::Exit => {
                slot.status = ActorStatus::Exited;
                let leftover = self.pending_messages(&self.actors[id.0].name).unwrap_or(0);
                if leftover > 0 {
                    warn!(
                        actor = %self.actors[id.0].name,
                        leftover,
                        "Actor exited with undelivered messages"
                    );
                }
                debug!(actor = %self.actors[id.0].name, time = %now, "Actor exited");
            }
        }

        self.deliver(id, outbox)
    }

    fn deliver(&mut self, from: ActorId, outbox: Vec<(String, M)>) -> Result<(), EngineError> {
        let now = self.clock.now();
        for (to, message) in outbox {
            let mailbox = match self.mailboxes.get_mut(&to) {
                Some(mb) => mb,
                None => {
                    return Err(EngineError::UnknownMailbox {
                        from: self.actors[from.0].name.clone(),
                        to,
                    })
                }
            };
            mailbox.queue.push_back(message);
            self.stats.messages_delivered += 1;

            let owner = mailbox.owner;
            let receiver = &mut self.actors[owner.0];
            if receiver.status == (ActorStatus::Receiving { wake_pending: false }) {
                receiver.status = ActorStatus::Receiving { wake_pending: true };
                self.queue.schedule(now, owner);
            }
        }
        Ok(())
    }
}
