use crate::pages::game::object::Entity;

/// Axis-aligned overlap test between the bird and one obstacle. Edges that merely touch do not
/// count, so a bird whose right edge sits exactly on an obstacle's left edge is clear.
pub fn overlaps(bird: &Entity, obstacle: &Entity) -> bool {
    let (bird_pos, bird_size) = (bird.position(), bird.size());
    let (obstacle_pos, obstacle_size) = (obstacle.position(), obstacle.size());

    interval_sec(bird_pos.horizontal, bird_size.width, obstacle_pos.horizontal, obstacle_size.width)
        && interval_sec(bird_pos.vertical, bird_size.height, obstacle_pos.vertical, obstacle_size.height)
}

/// Open-interval intersection of `(l1, l1 + len1)` and `(l2, l2 + len2)`.
fn interval_sec(l1: f64, len1: f64, l2: f64, len2: f64) -> bool {
    l1 + len1 > l2 && l1 < l2 + len2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::game::object::{EntityId, EntityKind, ObstacleSide, Position, Size};

    fn bird_at(vertical: f64, horizontal: f64) -> Entity {
        Entity::new(EntityId(0), EntityKind::Bird, Position::new(vertical, horizontal), Size::new(8.3, 12.5))
    }

    fn obstacle_at(vertical: f64, horizontal: f64) -> Entity {
        Entity::new(
            EntityId(1),
            EntityKind::Obstacle(ObstacleSide::Bottom),
            Position::new(vertical, horizontal),
            Size::new(50.0, 15.0),
        )
    }

    #[test]
    fn test_touching_left_edge_is_clear() {
        let bird = bird_at(20.0, 25.0);
        assert!(!overlaps(&bird, &obstacle_at(0.0, 37.5)));
        assert!(overlaps(&bird, &obstacle_at(0.0, 37.49)));
    }

    #[test]
    fn test_touching_right_edge_is_clear() {
        // Obstacle spans 10..25 horizontally.
        assert!(!overlaps(&bird_at(20.0, 25.0), &obstacle_at(0.0, 10.0)));
        assert!(overlaps(&bird_at(20.0, 24.99), &obstacle_at(0.0, 10.0)));
    }

    #[test]
    fn test_touching_vertical_edges_is_clear() {
        // Obstacle spans 0..50 vertically, bird is 8.3 tall.
        assert!(!overlaps(&bird_at(50.0, 30.0), &obstacle_at(0.0, 30.0)));
        assert!(overlaps(&bird_at(49.9, 30.0), &obstacle_at(0.0, 30.0)));
        assert!(!overlaps(&bird_at(-8.3, 30.0), &obstacle_at(0.0, 30.0)));
        assert!(overlaps(&bird_at(-8.2, 30.0), &obstacle_at(0.0, 30.0)));
    }

    #[test]
    fn test_needs_both_axes() {
        // Horizontal overlap only.
        assert!(!overlaps(&bird_at(70.0, 30.0), &obstacle_at(0.0, 30.0)));
        // Vertical overlap only.
        assert!(!overlaps(&bird_at(10.0, 80.0), &obstacle_at(0.0, 30.0)));
    }

    #[test]
    fn test_bird_inside_gap_is_clear() {
        // Bottom obstacle spans 0..50, top obstacle spans 75..125; the gap is 50..75.
        let bird = bird_at(58.3, 37.5);
        assert!(!overlaps(&bird, &obstacle_at(0.0, 30.0)));
        assert!(!overlaps(&bird, &obstacle_at(75.0, 30.0)));
    }
}
