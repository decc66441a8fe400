//! Visual identifiers and the per-category status -> visual mapping.

use protocol::{BombDelta, Direction, EntityDelta, ExplosionDelta, Position, UserDelta, WallDelta};
use std::fmt;

/// Player skin ordinal, always within `1..=Skin::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Skin(u8);

impl Skin {
    pub const COUNT: u8 = 4;

    /// Returns `None` for ordinals the client has no visual for.
    pub fn new(ordinal: i64) -> Option<Self> {
        match ordinal {
            1..=4 => Some(Self(ordinal as u8)),
            _ => None,
        }
    }

    /// Parse a skin from its textual ordinal, as used by log speaker keys.
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<i64>().ok().and_then(Self::new)
    }

    #[inline]
    pub fn ordinal(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a single grid cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visual {
    /// Empty cell. Every cell starts here.
    #[default]
    Grass,
    Wall,
    /// Bomb just dropped.
    BombFresh,
    /// Bomb about to blow.
    BombArmed,
    ExplosionDefault,
    ExplosionVertical,
    ExplosionHorizontal,
    User(Skin),
}

impl Visual {
    /// Stable name of the visual, usable as a CSS class or asset key.
    pub fn name(self) -> &'static str {
        match self {
            Visual::Grass => "grass",
            Visual::Wall => "wall",
            Visual::BombFresh => "bomb-fresh",
            Visual::BombArmed => "bomb-armed",
            Visual::ExplosionDefault => "explosion",
            Visual::ExplosionVertical => "explosion-vertical",
            Visual::ExplosionHorizontal => "explosion-horizontal",
            Visual::User(skin) => match skin.ordinal() {
                1 => "user-1",
                2 => "user-2",
                3 => "user-3",
                _ => "user-4",
            },
        }
    }
}

/// A delta that targets one cell and resolves to a visual.
pub trait VisualSource {
    fn position(&self) -> Position;

    /// `None` when the delta cannot be mapped; the cell is then left as is.
    fn visual(&self) -> Option<Visual>;
}

impl VisualSource for ExplosionDelta {
    fn position(&self) -> Position {
        ExplosionDelta::position(self)
    }

    fn visual(&self) -> Option<Visual> {
        if self.dead {
            return Some(Visual::Grass);
        }
        Some(match self.direction {
            Direction::Vertical => Visual::ExplosionVertical,
            Direction::Horizontal => Visual::ExplosionHorizontal,
            Direction::Other => Visual::ExplosionDefault,
        })
    }
}

impl VisualSource for BombDelta {
    fn position(&self) -> Position {
        BombDelta::position(self)
    }

    fn visual(&self) -> Option<Visual> {
        if self.dead {
            return Some(Visual::Grass);
        }
        Some(match self.bomb_state {
            3 => Visual::ExplosionDefault,
            2 => Visual::BombArmed,
            _ => Visual::BombFresh,
        })
    }
}

impl VisualSource for WallDelta {
    fn position(&self) -> Position {
        WallDelta::position(self)
    }

    fn visual(&self) -> Option<Visual> {
        Some(if self.dead { Visual::Grass } else { Visual::Wall })
    }
}

impl VisualSource for UserDelta {
    fn position(&self) -> Position {
        UserDelta::position(self)
    }

    fn visual(&self) -> Option<Visual> {
        Skin::new(self.skin).map(Visual::User)
    }
}

impl VisualSource for EntityDelta {
    fn position(&self) -> Position {
        EntityDelta::position(self)
    }

    fn visual(&self) -> Option<Visual> {
        Some(Visual::Grass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bomb(state: i64, dead: bool) -> BombDelta {
        BombDelta { x: 0, y: 0, bomb_state: state, dead }
    }

    fn explosion(direction: Direction, dead: bool) -> ExplosionDelta {
        ExplosionDelta { x: 0, y: 0, direction, dead }
    }

    fn user(skin: i64) -> UserDelta {
        UserDelta {
            x: 0,
            y: 0,
            id: None,
            skin,
            can_drop: false,
            killed: 0,
            deaths: 0,
            suicides: 0,
        }
    }

    #[test]
    fn test_explosion_mapping() {
        assert_eq!(explosion(Direction::Vertical, false).visual(), Some(Visual::ExplosionVertical));
        assert_eq!(explosion(Direction::Horizontal, false).visual(), Some(Visual::ExplosionHorizontal));
        assert_eq!(explosion(Direction::Other, false).visual(), Some(Visual::ExplosionDefault));
        // dead wins over direction
        assert_eq!(explosion(Direction::Vertical, true).visual(), Some(Visual::Grass));
    }

    #[test]
    fn test_bomb_mapping() {
        assert_eq!(bomb(1, false).visual(), Some(Visual::BombFresh));
        assert_eq!(bomb(2, false).visual(), Some(Visual::BombArmed));
        assert_eq!(bomb(3, false).visual(), Some(Visual::ExplosionDefault));
        assert_eq!(bomb(0, false).visual(), Some(Visual::BombFresh));
        assert_eq!(bomb(3, true).visual(), Some(Visual::Grass));
    }

    #[test]
    fn test_wall_and_entity_mapping() {
        assert_eq!(WallDelta { x: 0, y: 0, dead: false }.visual(), Some(Visual::Wall));
        assert_eq!(WallDelta { x: 0, y: 0, dead: true }.visual(), Some(Visual::Grass));
        assert_eq!(EntityDelta { x: 0, y: 0 }.visual(), Some(Visual::Grass));
    }

    #[test]
    fn test_user_mapping() {
        for ordinal in 1..=4 {
            let visual = user(ordinal).visual().unwrap();
            assert_eq!(visual, Visual::User(Skin::new(ordinal).unwrap()));
        }
        assert_eq!(user(0).visual(), None);
        assert_eq!(user(5).visual(), None);
        assert_eq!(user(-1).visual(), None);
    }

    #[test]
    fn test_skin_parse() {
        assert_eq!(Skin::parse("3").map(Skin::ordinal), Some(3));
        assert_eq!(Skin::parse("9"), None);
        assert_eq!(Skin::parse("x"), None);
    }
}
