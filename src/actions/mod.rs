//! # Actions delivered by the dispatcher.
//!
//! This module provides [`Action`], the immutable event handed to every store
//! during one dispatch pass: a mandatory `type` discriminator plus an opaque
//! JSON payload.

mod action;

pub use action::Action;
