use strum::Display;

/// A point in viewport percentage space. `vertical` grows upwards from the bottom edge and
/// `horizontal` grows rightwards from the left edge. Values outside `0..=100` are legal and mean
/// the entity is (partly) off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub vertical: f64,
    pub horizontal: f64,
}

impl Position {
    pub const fn new(vertical: f64, horizontal: f64) -> Self {
        Self { vertical, horizontal }
    }
}

/// Hitbox extent, in the same percentage space as [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub height: f64,
    pub width: f64,
}

impl Size {
    pub const fn new(height: f64, width: f64) -> Self {
        Self { height, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ObstacleSide {
    Bottom,
    /// Drawn upside down.
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntityKind {
    Bird,
    Obstacle(ObstacleSide),
    Ground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIds {
    next: u64,
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    position: Position,
    size: Size,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, position: Position, size: Size) -> Self {
        let mut entity = Entity { id, kind, position, size };
        // Keep ground pinned even when constructed with a stray vertical.
        entity.set_vertical(position.vertical);
        entity
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn vertical(&self) -> f64 {
        self.position.vertical
    }

    pub fn horizontal(&self) -> f64 {
        self.position.horizontal
    }

    /// Ground tiles always sit at vertical 0.
    pub fn set_vertical(&mut self, vertical: f64) {
        self.position.vertical = match self.kind {
            EntityKind::Ground => 0.0,
            _ => vertical,
        };
    }

    pub fn set_horizontal(&mut self, horizontal: f64) {
        self.position.horizontal = horizontal;
    }

    pub fn set_position(&mut self, position: Position) {
        self.set_horizontal(position.horizontal);
        self.set_vertical(position.vertical);
    }

    pub fn move_up(&mut self, step: f64) {
        self.set_vertical(self.vertical() + step);
    }

    pub fn move_down(&mut self, step: f64) {
        self.set_vertical(self.vertical() - step);
    }

    pub fn move_left(&mut self, step: f64) {
        self.set_horizontal(self.horizontal() - step);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn bird() -> Entity {
        Entity::new(EntityId(0), EntityKind::Bird, Position::new(58.3, 37.5), Size::new(8.3, 12.5))
    }

    #[test]
    fn test_reads_back_writes_immediately() {
        let mut bird = bird();
        bird.set_vertical(12.0);
        assert_eq!(bird.vertical(), 12.0);
        bird.set_horizontal(-40.25);
        assert_eq!(bird.horizontal(), -40.25);
        assert_eq!(bird.position(), Position::new(12.0, -40.25));
    }

    #[test]
    fn test_no_range_validation() {
        let mut bird = bird();
        bird.set_vertical(-500.0);
        bird.set_horizontal(1e6);
        assert_eq!(bird.position(), Position::new(-500.0, 1e6));
    }

    #[test]
    fn test_moves_are_relative() {
        let mut bird = bird();
        bird.move_up(6.6);
        bird.move_left(0.5);
        assert_eq!(bird.vertical(), 58.3 + 6.6);
        assert_eq!(bird.horizontal(), 37.0);
    }

    #[test]
    fn test_ground_is_pinned_to_zero() {
        let mut ground = Entity::new(EntityId(1), EntityKind::Ground, Position::new(5.0, 100.0), Size::new(16.6, 100.0));
        assert_eq!(ground.vertical(), 0.0);
        ground.set_vertical(30.0);
        ground.move_up(1.0);
        assert_eq!(ground.vertical(), 0.0);
        ground.move_left(0.33);
        assert_eq!(ground.horizontal(), 100.0 - 0.33);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
    }
}
