//! Headless board state for native-bomber clients.
//!
//! This crate contains:
//! - The grid surface (last rendered visual per cell)
//! - The reconciler merging entity deltas onto the grid
//! - Session tracking and message routing
//! - Log template rendering and bounded log history
//! - The input relay forwarding player actions to a transport
//!
//! Nothing here touches a browser or a socket; front-ends feed decoded
//! frames in and read [`Frame`]s out.

mod error;
mod game;
mod grid;
mod log;
mod reconcile;
mod relay;
mod router;
mod session;
mod visual;

pub use error::BoardError;
pub use game::{Board, Frame, Game, SelfStatus};
pub use grid::{Dimensions, GridSurface, MAX_CELLS};
pub use log::{LogHistory, LogLine, LogSegment, LogToken, MAX_LOG, tokenize};
pub use reconcile::{CATEGORY_ORDER, Category, ReconcileReport, Reconciler};
pub use relay::{InputRelay, RelayError, SendOutcome, Transport};
pub use router::{MessageHandler, MessageRouter};
pub use session::{SessionState, SessionTracker};
pub use visual::{Skin, Visual, VisualSource};

pub use protocol::{Action, Position, SessionId};
