//! Turning snapshots into things on screen.
//!
//! The reconciler and registry decide what exists and with which
//! properties; a [`presenter::Presenter`] decides what that looks like.
//! [`session::Session`] ties them to the connection.

/// Outbound action gating and validation.
pub mod dispatcher;

/// Entity keys and render descriptors.
pub mod entity;

/// The render primitive trait frontends implement.
pub mod presenter;

/// Snapshot diffing into render plans.
pub mod reconciler;

/// Live entity handles keyed by [`entity::EntityKey`].
pub mod registry;

/// Deterministic seat layout.
pub mod seats;

/// The adapter composing connection, reconciler and dispatcher.
pub mod session;
