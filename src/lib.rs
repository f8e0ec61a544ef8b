//! Shared state, duration, and tree-structure types for the Cirrus climate
//! modeling framework.
//!
//! This crate defines the small value types the rest of the framework
//! passes through its numeric engine:
//!
//! - [`ModelState`] — simulation state split into prognostic, diagnostic,
//!   and randomness groups
//! - [`Randomness`] — the state of the model's random process
//! - [`Timedelta`] — a duration in days and seconds, normalized like
//!   `datetime` deltas
//! - [`KeyWithCosLatFactor`] — a sortable (name, factor order) key
//! - [`TreeNode`] and [`Tree`] — the decompose/recompose contract a
//!   traversal engine uses to map functions over every numeric leaf
//!
//! All of these are pure values: operations return new instances, and the
//! only failure modes are the unsupported-operand signals on [`Timedelta`]
//! and structural mismatches when recombining trees.
//!
//! Unit-safe quantities come from [`uom`], re-exported here as [`units`]
//! and [`Quantity`].

mod key;
mod numeric;
mod state;
mod timedelta;
mod tree;

pub use key::KeyWithCosLatFactor;
pub use numeric::{Numeric, SECONDS_PER_DAY};
pub use state::{ModelState, ModelStateMeta, Randomness};
pub use timedelta::{Operand, Timedelta, Timestep, UnsupportedOperand};
pub use tree::{Tree, TreeError, TreeNode, TreeShape};

/// Unit definitions from the SI system, for building [`Quantity`] values.
pub use uom::si as units;

/// A dimensioned quantity from [`uom`].
pub use uom::si::Quantity;

/// A post-processing hook applied to framework outputs.
pub type PostProcessFn<T, U = T> = Box<dyn Fn(T) -> U + Send + Sync>;
