//! Client-side board: everything a front-end needs to present one session.

use crate::BoardError;
use crate::grid::{Dimensions, GridSurface};
use crate::log::{LogHistory, LogLine};
use crate::reconcile::Reconciler;
use crate::router::{MessageHandler, MessageRouter};
use crate::session::SessionTracker;
use crate::visual::{Skin, Visual};
use protocol::{InitMessage, LogBatch, MapUpdate, MessageKind, Position, ServerMessage, SessionId};
use tracing::{debug, info, warn};

/// Status of our own player, shown outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelfStatus {
    /// `None` when the server sent a skin we have no visual for.
    pub skin: Option<Skin>,
    pub killed: u32,
    pub deaths: u32,
    pub suicides: u32,
    /// Whether a bomb can be dropped right now.
    pub can_drop: bool,
}

/// Presentation work accumulated since the last [`Game::take_frame`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// The grid was rebuilt; redraw every cell as grass before `cells`.
    pub resized: Option<Dimensions>,
    /// Changed cells, row-major.
    pub cells: Vec<(Position, Visual)>,
    pub status: Option<SelfStatus>,
    /// Lines appended to the log, oldest first.
    pub logs: Vec<LogLine>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.resized.is_none() && self.cells.is_empty() && self.status.is_none() && self.logs.is_empty()
    }
}

/// Grid, self status and log history; the handler behind the router.
#[derive(Debug, Default)]
pub struct Board {
    grid: GridSurface,
    status: Option<SelfStatus>,
    logs: LogHistory,
    pending: Frame,
}

impl Board {
    pub fn grid(&self) -> &GridSurface {
        &self.grid
    }

    pub fn status(&self) -> Option<&SelfStatus> {
        self.status.as_ref()
    }

    pub fn logs(&self) -> &LogHistory {
        &self.logs
    }

    fn apply(&mut self, identity: &SessionId, update: &MapUpdate) {
        let report = Reconciler::new(&mut self.grid, Some(identity)).apply(update);
        debug!(
            written = report.written,
            suppressed = report.suppressed,
            out_of_bounds = report.out_of_bounds,
            unresolved = report.unresolved,
            malformed = report.malformed,
            "applied board update"
        );
        if let Some(status) = report.self_status {
            self.status = Some(status);
            self.pending.status = Some(status);
        }
    }
}

impl MessageHandler for Board {
    fn on_init(&mut self, identity: &SessionId, init: InitMessage) -> Result<(), BoardError> {
        // Status belongs to the previous session until this one reports ours
        self.status = None;
        self.grid.initialize(init.length, init.width)?;
        let dims = self.grid.dimensions();
        info!(%identity, height = dims.height, width = dims.width, "session established");

        self.pending.resized = Some(dims);
        self.apply(identity, &init.board);
        Ok(())
    }

    fn on_map(&mut self, identity: &SessionId, update: MapUpdate) {
        self.apply(identity, &update);
    }

    fn on_log(&mut self, _identity: &SessionId, batch: LogBatch) {
        let own_skin = self.status.and_then(|status| status.skin);
        for (speaker, template) in batch.entries() {
            let mut line = LogLine::render(speaker, template);
            line.from_self = own_skin.is_some() && line.speaker_skin() == own_skin;
            self.logs.push(line.clone());
            self.pending.logs.push(line);
        }
    }
}

/// One connection's worth of client state: router plus board.
///
/// ```
/// use board::{Game, Position, Visual};
///
/// let mut game = Game::new();
/// game.handle_text(r#"{"type":"init","id":1,"length":2,"width":2}"#).unwrap();
/// game.handle_text(r#"{"type":"map","wall":[{"x":1,"y":0,"dead":false}]}"#).unwrap();
///
/// let frame = game.take_frame();
/// assert_eq!(frame.cells, vec![(Position::new(1, 0), Visual::Wall)]);
/// ```
#[derive(Debug, Default)]
pub struct Game {
    router: MessageRouter,
    board: Board,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one inbound JSON text frame. Errors are logged and returned;
    /// they never leave the board half-updated.
    pub fn handle_text(&mut self, text: &str) -> Result<MessageKind, BoardError> {
        let result = self.router.route_text(text, &mut self.board);
        if let Err(e) = &result {
            warn!("Dropped server message: {}", e);
        }
        result
    }

    pub fn handle(&mut self, message: ServerMessage) -> Result<MessageKind, BoardError> {
        let result = self.router.route(message, &mut self.board);
        if let Err(e) = &result {
            warn!("Dropped server message: {}", e);
        }
        result
    }

    /// Drain presentation work since the last call.
    pub fn take_frame(&mut self) -> Frame {
        let mut frame = std::mem::take(&mut self.board.pending);
        frame.cells = self.board.grid.take_dirty();
        frame
    }

    /// Forget the session for a new connection. The grid stays as last
    /// drawn until the next `init` rebuilds it; our status is dropped.
    pub fn reset_session(&mut self) {
        self.router.reset();
        self.board.status = None;
    }

    pub fn session(&self) -> &SessionTracker {
        self.router.session()
    }

    pub fn identity(&self) -> Option<&SessionId> {
        self.router.session().identity()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &GridSurface {
        self.board.grid()
    }

    pub fn status(&self) -> Option<&SelfStatus> {
        self.board.status()
    }

    pub fn logs(&self) -> &LogHistory {
        self.board.logs()
    }
}
