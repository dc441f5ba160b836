//! Builder for describing a state before registration.

use crate::core::State;
use crate::effects::Hook;

/// Description of a state and its optional callbacks.
///
/// Any callback left unset is simply skipped by the engine.
///
/// # Example
///
/// ```
/// use kickguard::builder::StateDef;
/// use kickguard::state_enum;
///
/// state_enum! {
///     enum Lamp {
///         Off = "OFF",
///         On = "ON",
///     }
/// }
///
/// struct Bench {
///     lit: bool,
///     ticks: u32,
/// }
///
/// let on = StateDef::new(Lamp::On)
///     .on_enter(|b: &mut Bench| b.lit = true)
///     .on_exit(|b: &mut Bench| b.lit = false)
///     .on_tick(|b: &mut Bench| b.ticks += 1);
/// let off: StateDef<Lamp, Bench> = StateDef::new(Lamp::Off);
///
/// assert!(on.has_enter());
/// assert!(!off.has_enter());
/// ```
pub struct StateDef<S: State, C> {
    pub(crate) tag: S,
    pub(crate) enter: Option<Hook<C>>,
    pub(crate) exit: Option<Hook<C>>,
    pub(crate) tick: Option<Hook<C>>,
}

impl<S: State, C> StateDef<S, C> {
    /// Start describing the state identified by `tag`.
    pub fn new(tag: S) -> Self {
        Self {
            tag,
            enter: None,
            exit: None,
            tick: None,
        }
    }

    /// Callback run once each time the state is entered.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.enter = Some(Box::new(hook));
        self
    }

    /// Callback run once each time the state is left.
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.exit = Some(Box::new(hook));
        self
    }

    /// Callback run on every engine tick while the state is current.
    pub fn on_tick<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.tick = Some(Box::new(hook));
        self
    }

    pub fn tag(&self) -> &S {
        &self.tag
    }

    pub fn has_enter(&self) -> bool {
        self.enter.is_some()
    }

    pub fn has_exit(&self) -> bool {
        self.exit.is_some()
    }

    pub fn has_tick(&self) -> bool {
        self.tick.is_some()
    }
}
