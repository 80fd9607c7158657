//! [`Condition`] – composable boolean predicates.
//!
//! A `Condition` wraps a zero-argument closure returning `bool`.  It is
//! immutable once constructed: the [`and`][Condition::and] and
//! [`or`][Condition::or] combinators build new conditions without
//! mutating their operands, and cloning is a cheap `Arc` bump.
//! Conditions are pure and side-effect-free by convention – they are
//! evaluated once per scheduler tick, often from several places.
//!
//! # Example
//!
//! ```rust
//! use sling_types::Condition;
//!
//! let armed = Condition::new(|| true);
//! let loaded = Condition::new(|| false);
//! assert!(!armed.and(&loaded).test());
//! assert!(armed.or(&loaded).test());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A shareable boolean predicate.
///
/// Evaluation is lazy and short-circuiting: for `a.and(&b)` the left
/// operand is always evaluated first and the right only when the left
/// is `true`; for `a.or(&b)` the right only when the left is `false`.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> bool + Send + Sync>);

impl Condition {
    /// Wrap a closure as a condition.
    pub fn new(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A condition that is always `true`.
    pub fn always() -> Self {
        Self::new(|| true)
    }

    /// A condition that is never `true`.
    pub fn never() -> Self {
        Self::new(|| false)
    }

    /// A condition that becomes `true` once `threshold` has elapsed.
    ///
    /// The clock starts at *construction*, not at the first call to
    /// [`test`][Condition::test] – callers that want the window to open
    /// relative to some later event must construct the condition at
    /// that event.
    pub fn after(threshold: Duration) -> Self {
        let start = Instant::now();
        Self::new(move || start.elapsed() >= threshold)
    }

    /// Evaluate the predicate.
    pub fn test(&self) -> bool {
        (self.0)()
    }

    /// Logical AND of two conditions, short-circuiting left to right.
    pub fn and(&self, other: &Condition) -> Condition {
        let a = self.clone();
        let b = other.clone();
        Condition::new(move || a.test() && b.test())
    }

    /// Logical OR of two conditions, short-circuiting left to right.
    pub fn or(&self, other: &Condition) -> Condition {
        let a = self.clone();
        let b = other.clone();
        Condition::new(move || a.test() || b.test())
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn constants_evaluate_as_named() {
        assert!(Condition::always().test());
        assert!(!Condition::never().test());
    }

    #[test]
    fn and_or_truth_table() {
        let t = Condition::always;
        let f = Condition::never;
        assert!(t().and(&t()).test());
        assert!(!t().and(&f()).test());
        assert!(!f().and(&t()).test());
        assert!(t().or(&f()).test());
        assert!(f().or(&t()).test());
        assert!(!f().or(&f()).test());
    }

    #[test]
    fn and_short_circuits_right_operand() {
        let right_evals = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&right_evals);
        let right = Condition::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        // Left is false; right must not be evaluated.
        assert!(!Condition::never().and(&right).test());
        assert_eq!(right_evals.load(Ordering::SeqCst), 0);

        // Left is true; right is evaluated exactly once.
        assert!(Condition::always().and(&right).test());
        assert_eq!(right_evals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn or_short_circuits_right_operand() {
        let right_evals = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&right_evals);
        let right = Condition::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        assert!(Condition::always().or(&right).test());
        assert_eq!(right_evals.load(Ordering::SeqCst), 0);

        assert!(!Condition::never().or(&right).test());
        assert_eq!(right_evals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn after_anchors_at_construction() {
        let cond = Condition::after(Duration::from_millis(20));
        assert!(!cond.test());
        thread::sleep(Duration::from_millis(30));
        // The window opened while nobody was testing; the first test
        // after the threshold still reports true.
        assert!(cond.test());
    }

    #[test]
    fn combinators_do_not_mutate_operands() {
        let a = Condition::always();
        let b = Condition::never();
        let _combined = a.and(&b);
        assert!(a.test());
        assert!(!b.test());
    }
}
