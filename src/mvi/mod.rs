//! Model-View-Intent (MVI) architecture primitives.
//!
//! This module provides the base traits for unidirectional data flow.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Reducer ──→ (State, Effect)
//!    ↑                          │
//!    └──── EffectRunner ←───────┘
//! ```
//!
//! - **State**: Immutable snapshot, replaced wholesale on every transition
//! - **Action**: User input, async completions, lifecycle signals
//! - **Reducer**: Pure function computing the next state and a description
//!   of the follow-up work

mod action;
mod reducer;
mod state;

pub use action::Action;
pub use reducer::{combine, BoxedReducer, Combined, Logged, Reducer};
pub use state::State;
