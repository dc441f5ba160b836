//! Tick-driven state machine that runs state callbacks.

use crate::builder::{BuildError, StateDef};
use crate::core::{Guard, State, StateHistory, StateTransition};
use crate::effects::transition::{Hook, StateHandle, Transition};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, trace};

static NEXT_MACHINE_ID: AtomicU32 = AtomicU32::new(1);

/// Result of a single call to [`StateMachine::tick`].
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome<S: State> {
    /// `startup()` has not been called yet; nothing ran.
    NotStarted,

    /// No guard held; the machine is still in this state.
    Stayed(S),

    /// Exactly one transition fired.
    Transitioned { from: S, to: S },
}

impl<S: State> TickOutcome<S> {
    pub fn transitioned(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}

struct StateEntry<S: State, C> {
    tag: S,
    enter: Option<Hook<C>>,
    exit: Option<Hook<C>>,
    tick: Option<Hook<C>>,
}

/// Cooperative state machine over a caller-owned context `C`.
///
/// The machine owns its state table, its transitions in registration order,
/// and the global enter hooks. The context is lent to `startup` and `tick`
/// for the duration of the call: callbacks get `&mut C`, guards get `&C`.
/// Because guards and callbacks never see the machine itself, evaluation is
/// non-reentrant by construction.
///
/// On each tick the first transition (in registration order) whose source
/// is the current state and whose guard holds is fired; later transitions
/// from the same source are not evaluated on that tick.
pub struct StateMachine<S: State, C> {
    id: u32,
    states: Vec<StateEntry<S, C>>,
    transitions: Vec<Transition<C>>,
    global_enter: Vec<Hook<C>>,
    current: Option<StateHandle>,
    history: StateHistory<S>,
    ticks: u64,
}

impl<S: State, C> Default for StateMachine<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, C> StateMachine<S, C> {
    /// Create an empty machine with the default journal capacity.
    pub fn new() -> Self {
        Self::with_history(StateHistory::new())
    }

    /// Create an empty machine keeping at most `capacity` journal records.
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self::with_history(StateHistory::with_capacity(capacity))
    }

    fn with_history(history: StateHistory<S>) -> Self {
        Self {
            id: NEXT_MACHINE_ID.fetch_add(1, Ordering::Relaxed),
            states: Vec::new(),
            transitions: Vec::new(),
            global_enter: Vec::new(),
            current: None,
            history,
            ticks: 0,
        }
    }

    /// Register a state and return its handle.
    ///
    /// Tags must be unique within a machine.
    pub fn add_state(&mut self, def: StateDef<S, C>) -> Result<StateHandle, BuildError> {
        if self.states.iter().any(|entry| entry.tag == def.tag) {
            return Err(BuildError::DuplicateState {
                name: def.tag.name().to_string(),
            });
        }

        let handle = StateHandle::new(self.id, self.states.len());
        self.states.push(StateEntry {
            tag: def.tag,
            enter: def.enter,
            exit: def.exit,
            tick: def.tick,
        });
        Ok(handle)
    }

    /// Register a hook run on every state entry, right after that state's
    /// own enter callback.
    pub fn add_global_enter<F>(&mut self, hook: F)
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.global_enter.push(Box::new(hook));
    }

    /// Register a guarded transition. Registration order is priority order.
    pub fn add_transition<F>(
        &mut self,
        from: StateHandle,
        to: StateHandle,
        guard: F,
    ) -> Result<(), BuildError>
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.add_guarded(from, to, Guard::new(guard))
    }

    /// Register a transition with a prebuilt [`Guard`].
    pub fn add_guarded(
        &mut self,
        from: StateHandle,
        to: StateHandle,
        guard: Guard<C>,
    ) -> Result<(), BuildError> {
        self.validate(from)?;
        self.validate(to)?;
        self.transitions.push(Transition { from, to, guard });
        Ok(())
    }

    /// Enter `initial` without evaluating any guard.
    ///
    /// Runs the state's enter callback followed by the global enter hooks.
    pub fn startup(&mut self, initial: StateHandle, context: &mut C) -> Result<(), BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }
        if let Some(current) = self.current_state() {
            return Err(BuildError::AlreadyStarted {
                current: current.name().to_string(),
            });
        }
        self.validate(initial)?;

        debug!(state = self.tag(initial).name(), "starting state machine");
        self.current = Some(initial);
        self.enter(initial, context);
        Ok(())
    }

    /// Run one scheduler step.
    ///
    /// Invokes the current state's tick callback, then fires at most one
    /// transition: the first registered edge out of the current state whose
    /// guard holds. With no match the call has no further side effects.
    pub fn tick(&mut self, context: &mut C) -> TickOutcome<S> {
        let Some(current) = self.current else {
            return TickOutcome::NotStarted;
        };
        self.ticks += 1;

        if let Some(hook) = &self.state_entry(current).tick {
            hook(context);
        }

        let view: &C = context;
        let next = self
            .transitions_from(current)
            .find(|t| {
                let holds = t.guard.check(view);
                trace!(
                    from = self.tag(t.from).name(),
                    to = self.tag(t.to).name(),
                    holds,
                    "guard evaluated"
                );
                holds
            })
            .map(|t| t.to);

        match next {
            Some(next) => self.fire(current, next, context),
            None => TickOutcome::Stayed(self.tag(current).clone()),
        }
    }

    fn fire(&mut self, from: StateHandle, to: StateHandle, context: &mut C) -> TickOutcome<S> {
        if let Some(hook) = &self.state_entry(from).exit {
            hook(context);
        }
        self.current = Some(to);
        self.enter(to, context);

        let from_tag = self.tag(from).clone();
        let to_tag = self.tag(to).clone();
        debug!(
            from = from_tag.name(),
            to = to_tag.name(),
            tick = self.ticks,
            "transition fired"
        );
        self.history.record(StateTransition {
            from: from_tag.clone(),
            to: to_tag.clone(),
            tick: self.ticks,
        });

        TickOutcome::Transitioned {
            from: from_tag,
            to: to_tag,
        }
    }

    fn enter(&self, handle: StateHandle, context: &mut C) {
        if let Some(hook) = &self.state_entry(handle).enter {
            hook(context);
        }
        for hook in &self.global_enter {
            hook(context);
        }
    }

    fn validate(&self, handle: StateHandle) -> Result<(), BuildError> {
        if handle.machine() != self.id || handle.index() >= self.states.len() {
            return Err(BuildError::UnknownState {
                handle,
                registered: self.states.len(),
            });
        }
        Ok(())
    }

    // Handles reaching these have passed `validate`.
    fn state_entry(&self, handle: StateHandle) -> &StateEntry<S, C> {
        &self.states[handle.index()]
    }

    fn tag(&self, handle: StateHandle) -> &S {
        &self.state_entry(handle).tag
    }

    /// Handle of the current state, `None` before `startup()`.
    pub fn current_handle(&self) -> Option<StateHandle> {
        self.current
    }

    /// Tag of the current state, `None` before `startup()`.
    pub fn current_state(&self) -> Option<&S> {
        self.current.map(|handle| self.tag(handle))
    }

    /// Tag registered under `handle`, if the handle belongs to this machine.
    pub fn state(&self, handle: StateHandle) -> Option<&S> {
        self.validate(handle).ok().map(|_| self.tag(handle))
    }

    /// Handle registered for `tag`.
    pub fn handle_of(&self, tag: &S) -> Option<StateHandle> {
        self.states
            .iter()
            .position(|entry| entry.tag == *tag)
            .map(|index| StateHandle::new(self.id, index))
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Outgoing transitions of `handle`, in priority order.
    pub fn transitions_from(&self, handle: StateHandle) -> impl Iterator<Item = &Transition<C>> {
        self.transitions.iter().filter(move |t| t.from == handle)
    }

    /// Number of `tick()` calls made since startup.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }
}
