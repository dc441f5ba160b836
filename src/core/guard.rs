//! Guard predicates for controlling state transitions.
//!
//! Guards are boolean functions over a shared context that decide whether
//! a transition fires. They may read sensors and clocks reachable through
//! the context, but they only ever see it by shared reference, so they can
//! neither mutate it nor reach the engine evaluating them.

use std::fmt;

/// Predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use kickguard::core::Guard;
///
/// struct Switches {
///     button: bool,
///     kickstand: bool,
/// }
///
/// let both_engaged = Guard::new(|s: &Switches| s.button && s.kickstand);
///
/// assert!(both_engaged.check(&Switches { button: true, kickstand: true }));
/// assert!(!both_engaged.check(&Switches { button: true, kickstand: false }));
/// ```
pub struct Guard<C> {
    predicate: Box<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    /// Create a guard from a total predicate function.
    ///
    /// The predicate must not panic; a guard has no failure channel.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the predicate against the context.
    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
