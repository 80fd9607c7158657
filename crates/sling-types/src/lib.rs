//! `sling-types` – Shared vocabulary of the SlingOS control core.
//!
//! The foundation crate every other layer depends on.  It carries no
//! hardware, no tasks, and no policy; only the types the layers use to
//! talk to each other.
//!
//! # Modules
//!
//! - [`condition`] – [`Condition`][condition::Condition]: a cheaply
//!   clonable boolean predicate with short-circuit `and`/`or`
//!   combinators, used for command termination and controller-level
//!   cancellation.
//! - [`error`] – [`SlingError`][error::SlingError]: the single error
//!   type spanning hardware faults, configuration rejections, and
//!   channel failures.  Most of the core handles failures locally and
//!   logs them; `Result` appears only on genuinely fallible
//!   collaborator calls.

pub mod condition;
pub mod error;

pub use condition::Condition;
pub use error::SlingError;
