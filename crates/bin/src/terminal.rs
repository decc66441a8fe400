//! Plain-text rendering of a board for the terminal spectator.

use board::{Game, GridSurface, LogLine, SelfStatus, Visual};

pub fn glyph(visual: Visual) -> char {
    match visual {
        Visual::Grass => '.',
        Visual::Wall => '#',
        Visual::BombFresh => 'o',
        Visual::BombArmed => 'O',
        Visual::ExplosionDefault => '*',
        Visual::ExplosionVertical => '|',
        Visual::ExplosionHorizontal => '-',
        Visual::User(skin) => char::from(b'0' + skin.ordinal()),
    }
}

/// One line per row, top row first.
pub fn render_grid(grid: &GridSurface) -> String {
    let mut out = String::with_capacity(grid.height() * (grid.width() + 1));
    for row in grid.rows() {
        out.extend(row.iter().copied().map(glyph));
        out.push('\n');
    }
    out
}

pub fn render_status(status: &SelfStatus) -> String {
    let skin = status
        .skin
        .map(|skin| format!("P{skin}"))
        .unwrap_or_else(|| "P?".to_string());
    let bomb = if status.can_drop { "bomb: ready" } else { "bomb: -" };
    format!(
        "{skin} killed:{} deaths:{} suicides:{}  {bomb}",
        status.killed, status.deaths, status.suicides
    )
}

pub fn render_log(line: &LogLine) -> String {
    if line.from_self {
        format!("> {}", line.plain_text())
    } else {
        format!("  {}", line.plain_text())
    }
}

/// Grid followed by the status line, if known.
pub fn render_board(game: &Game) -> String {
    let mut out = render_grid(game.grid());
    if let Some(status) = game.status() {
        out.push_str(&render_status(status));
        out.push('\n');
    }
    out
}
