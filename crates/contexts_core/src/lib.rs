//! Provide the pure, IO-free helpers shared by the `contexts` runner and the `#[spec]` macro.
//!
//! Both the proc-macro (at expansion time) and the runner (at run time) must agree on which method plays which
//! lifecycle role. Keeping the rules here, with no dependencies and no global state, guarantees that agreement.
//!
//! ## Notes
//!
//! - [`roles`]: the method-role registry and the name classifier.
//! - [`plan`]: turning an ordered list of method names into a lifecycle plan, rejecting malformed specs.
//! - [`readable`]: the identifier → human-readable string transformation used by reporters.
//!
//! ## Examples
//! ```rust
//! use contexts_core::roles::{classify, MethodRole};
//! use contexts_core::readable::make_readable;
//!
//! assert_eq!(classify("given_an_empty_stack"), MethodRole::Establish);
//! assert_eq!(classify("it_should_be_empty"), MethodRole::Assertion);
//! assert_eq!(make_readable("WhenPushingAnItem"), "When pushing an item");
//! ```

pub mod plan;
pub mod readable;
pub mod roles;

pub use plan::{LifecyclePlan, MalformedSpec, plan_lifecycle};
pub use readable::make_readable;
pub use roles::{MethodRole, classify};
