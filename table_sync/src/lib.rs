//! # Table Sync
//!
//! Client side state reconciliation for a networked card table.
//!
//! The server owns every game rule and pushes full table snapshots as JSON
//! over a websocket. This crate keeps that connection alive, turns each
//! snapshot into create/update/destroy calls against a frontend supplied
//! [`Presenter`], and gates the actions the local player may send back.
//!
//! ## Core Modules
//!
//! - [`game`]: Snapshot data model and table constants
//! - [`net`]: Wire frames, connection state machine, websocket driver
//! - [`view`]: Reconciler, entity registry, action dispatcher, session
//!
//! ## Example
//!
//! ```
//! use table_sync::{Session, view::presenter::RecordingPresenter};
//!
//! let session = Session::new(RecordingPresenter::new()).with_name("alice");
//! assert_eq!(session.name(), Some("alice"));
//! ```

/// Snapshot data model.
pub mod game;
pub use game::{
    constants,
    entities::{self, Card, Chips, GamePhase, PlayerId, PlayerView, Snapshot},
};

/// Networking components for the table connection.
pub mod net;
pub use net::{
    client::{ClientEvent, TableClient},
    connection::{ConnectionManager, ConnectionStatus, ReconnectPolicy},
    messages::{self, ClientFrame, Outbound, ServerFrame},
};

/// Reconciliation and presentation.
pub mod view;
pub use view::{
    dispatcher::{ActionDispatcher, ActionError},
    presenter::Presenter,
    reconciler::{ReconcilerContext, RenderOp, RenderPlan, reconcile, render_set},
    session::{Intent, Session},
};
