//! Merges sparse entity deltas onto the grid surface.

use crate::game::SelfStatus;
use crate::grid::GridSurface;
use crate::visual::{Skin, VisualSource};
use protocol::{DeltaItem, MapUpdate, SessionId, UserDelta};
use tracing::debug;

/// Delta category, in the order a batch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Explosion,
    Bomb,
    Wall,
    User,
    Entity,
}

/// Later categories overwrite earlier ones at the same coordinate within a
/// batch: the server lists superseding entities after the ones they replace.
pub const CATEGORY_ORDER: [Category; 5] = [
    Category::Explosion,
    Category::Bomb,
    Category::Wall,
    Category::User,
    Category::Entity,
];

/// What one batch did to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Cells whose visual changed.
    pub written: usize,
    /// Deltas resolving to the visual already stored.
    pub suppressed: usize,
    pub out_of_bounds: usize,
    /// Deltas with no visual (unknown skin); the cell kept its visual.
    pub unresolved: usize,
    pub malformed: usize,
    /// Latest status of our own player, if the batch mentioned it.
    pub self_status: Option<SelfStatus>,
}

/// Applies one [`MapUpdate`] to a [`GridSurface`].
///
/// Per delta: resolve the visual, skip out-of-bounds cells, skip writes of
/// the value already stored, otherwise write and mark for presentation.
/// Nothing here fails; bad deltas are counted and skipped.
pub struct Reconciler<'a> {
    grid: &'a mut GridSurface,
    identity: Option<&'a SessionId>,
    report: ReconcileReport,
}

impl<'a> Reconciler<'a> {
    pub fn new(grid: &'a mut GridSurface, identity: Option<&'a SessionId>) -> Self {
        Self {
            grid,
            identity,
            report: ReconcileReport::default(),
        }
    }

    pub fn apply(mut self, update: &MapUpdate) -> ReconcileReport {
        for category in CATEGORY_ORDER {
            match category {
                Category::Explosion => self.apply_items(category, &update.explosion),
                Category::Bomb => self.apply_items(category, &update.bomb),
                Category::Wall => self.apply_items(category, &update.wall),
                Category::User => {
                    for user in update.user.iter().filter_map(DeltaItem::valid) {
                        self.track_self(user);
                    }
                    self.apply_items(category, &update.user);
                }
                Category::Entity => self.apply_items(category, &update.entity),
            }
        }
        self.report
    }

    fn apply_items<T: VisualSource>(&mut self, category: Category, items: &[DeltaItem<T>]) {
        for item in items {
            match item {
                DeltaItem::Valid(delta) => self.apply_one(category, delta),
                DeltaItem::Malformed(raw) => {
                    debug!(?category, %raw, "skipping malformed delta");
                    self.report.malformed += 1;
                }
            }
        }
    }

    fn apply_one<T: VisualSource>(&mut self, category: Category, delta: &T) {
        let pos = delta.position();
        let Some(visual) = delta.visual() else {
            debug!(?category, x = pos.x, y = pos.y, "unresolvable visual, keeping cell");
            self.report.unresolved += 1;
            return;
        };
        if !self.grid.contains(pos) {
            debug!(?category, x = pos.x, y = pos.y, "delta outside grid");
            self.report.out_of_bounds += 1;
            return;
        }
        if self.grid.current_visual(pos) == visual {
            self.report.suppressed += 1;
            return;
        }
        self.grid.set_visual(pos, visual);
        self.report.written += 1;
    }

    /// Self status follows every delta about us, even when its grid write
    /// is suppressed or lands outside the grid.
    fn track_self(&mut self, user: &UserDelta) {
        let is_self = match (self.identity, user.id.as_ref()) {
            (Some(me), Some(id)) => me == id,
            _ => false,
        };
        if is_self {
            self.report.self_status = Some(SelfStatus {
                skin: Skin::new(user.skin),
                killed: user.killed,
                deaths: user.deaths,
                suicides: user.suicides,
                can_drop: user.can_drop,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::Visual;
    use protocol::{BombDelta, EntityDelta, Position, WallDelta};

    fn user(id: &str, x: i32, y: i32, skin: i64) -> UserDelta {
        UserDelta {
            x,
            y,
            id: Some(SessionId::new(id)),
            skin,
            can_drop: true,
            killed: 1,
            deaths: 2,
            suicides: 3,
        }
    }

    #[test]
    fn test_later_category_wins() {
        let mut grid = GridSurface::with_dimensions(3, 3).unwrap();
        let update = MapUpdate {
            bomb: vec![BombDelta { x: 1, y: 1, bomb_state: 1, dead: false }.into()],
            wall: vec![WallDelta { x: 1, y: 1, dead: false }.into()],
            ..MapUpdate::default()
        };

        let report = Reconciler::new(&mut grid, None).apply(&update);
        assert_eq!(grid.current_visual(Position::new(1, 1)), Visual::Wall);
        assert_eq!(report.written, 2);
    }

    #[test]
    fn test_entity_applied_last() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        let update = MapUpdate {
            user: vec![user("x", 0, 1, 2).into()],
            entity: vec![EntityDelta { x: 0, y: 1 }.into()],
            ..MapUpdate::default()
        };

        Reconciler::new(&mut grid, None).apply(&update);
        assert_eq!(grid.current_visual(Position::new(0, 1)), Visual::Grass);
    }

    #[test]
    fn test_counts_suppressed_and_out_of_bounds() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        let update = MapUpdate {
            wall: vec![
                WallDelta { x: 0, y: 0, dead: true }.into(),
                WallDelta { x: 5, y: 0, dead: false }.into(),
                WallDelta { x: 1, y: 1, dead: false }.into(),
            ],
            ..MapUpdate::default()
        };

        let report = Reconciler::new(&mut grid, None).apply(&update);
        assert_eq!(report.suppressed, 1);
        assert_eq!(report.out_of_bounds, 1);
        assert_eq!(report.written, 1);
    }

    #[test]
    fn test_unresolvable_skin_keeps_cell() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        grid.set_visual(Position::new(1, 0), Visual::Wall);
        grid.take_dirty();

        let update = MapUpdate {
            user: vec![user("x", 1, 0, 9).into()],
            ..MapUpdate::default()
        };
        let report = Reconciler::new(&mut grid, None).apply(&update);

        assert_eq!(report.unresolved, 1);
        assert_eq!(grid.current_visual(Position::new(1, 0)), Visual::Wall);
        assert!(grid.take_dirty().is_empty());
    }

    #[test]
    fn test_self_status_only_for_own_id() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        let me = SessionId::new("me");

        let other = MapUpdate {
            user: vec![user("them", 0, 0, 1).into()],
            ..MapUpdate::default()
        };
        let report = Reconciler::new(&mut grid, Some(&me)).apply(&other);
        assert_eq!(report.self_status, None);
        assert_eq!(grid.current_visual(Position::ZERO), Visual::User(Skin::new(1).unwrap()));

        // Out of bounds and unresolvable skin still update self status
        let mine = MapUpdate {
            user: vec![user("me", 9, 9, 7).into()],
            ..MapUpdate::default()
        };
        let report = Reconciler::new(&mut grid, Some(&me)).apply(&mine);
        let status = report.self_status.unwrap();
        assert_eq!(status.skin, None);
        assert_eq!((status.killed, status.deaths, status.suicides), (1, 2, 3));
        assert!(status.can_drop);
    }

    #[test]
    fn test_malformed_item_does_not_stop_batch() {
        let mut grid = GridSurface::with_dimensions(2, 2).unwrap();
        let update = MapUpdate {
            wall: vec![
                DeltaItem::Malformed(serde_json::json!({"x": "?"})),
                WallDelta { x: 1, y: 0, dead: false }.into(),
            ],
            ..MapUpdate::default()
        };

        let report = Reconciler::new(&mut grid, None).apply(&update);
        assert_eq!(report.malformed, 1);
        assert_eq!(grid.current_visual(Position::new(1, 0)), Visual::Wall);
    }
}
