//! Reactive translation client core.
//!
//! A pure [`mvi::Reducer`] turns actions into new state plus an
//! [`effect::Effect`] description; the [`store::Store`] serializes
//! dispatches and hands effects to the [`effect::EffectRunner`].

pub mod app;
pub mod cli;
pub mod config;
pub mod effect;
pub mod error;
pub mod language;
pub mod logging;
pub mod mvi;
pub mod services;
pub mod store;
