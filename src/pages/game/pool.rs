//! FIFO entity pools. Both pools scroll left every tick and recycle their oldest members once
//! they pass a threshold. The front of each deque is always the oldest member.

use std::collections::VecDeque;

use color_eyre::eyre::{bail, eyre, Result};
use rand::Rng;

use crate::{
    config::GameConfig,
    constants::game::GROUND_SEGMENTS,
    pages::game::object::{Entity, EntityIds, EntityKind, ObstacleSide, Position, Size},
};

#[derive(Debug, Clone)]
pub struct ObstaclePool {
    obstacles: VecDeque<Entity>,
    size: Size,
    offset_max: f64,
    offset_span: f64,
    pair_offset: f64,
    spawn_horizontal: f64,
    recycle_threshold: f64,
    spawn_trigger: f64,
}

impl ObstaclePool {
    pub fn new(config: &GameConfig) -> Self {
        ObstaclePool {
            obstacles: VecDeque::with_capacity(4),
            size: config.obstacle_size(),
            offset_max: config.obstacle_offset_max,
            offset_span: config.obstacle_offset_span,
            pair_offset: config.pair_offset,
            spawn_horizontal: config.obstacle_spawn_horizontal,
            recycle_threshold: config.obstacle_recycle_threshold,
            spawn_trigger: config.spawn_trigger,
        }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.obstacles.iter()
    }

    /// Vertical offset of a new bottom obstacle, drawn from `(max - span, max]`.
    fn sample_offset<R: Rng>(&self, rng: &mut R) -> f64 {
        self.offset_max - rng.gen::<f64>() * self.offset_span
    }

    /// Appends a bottom obstacle and its mirrored top partner at the spawn column.
    pub fn spawn_pair<R: Rng>(&mut self, rng: &mut R, ids: &mut EntityIds) -> [Entity; 2] {
        let bottom = self.sample_offset(rng);
        let pair = [
            Entity::new(
                ids.next_id(),
                EntityKind::Obstacle(ObstacleSide::Bottom),
                Position::new(bottom, self.spawn_horizontal),
                self.size,
            ),
            Entity::new(
                ids.next_id(),
                EntityKind::Obstacle(ObstacleSide::Top),
                Position::new(bottom + self.pair_offset, self.spawn_horizontal),
                self.size,
            ),
        ];
        self.obstacles.extend(pair);
        pair
    }

    pub fn advance(&mut self, delta: f64) {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.move_left(delta);
        }
    }

    fn oldest(&self) -> Result<&Entity> {
        self.obstacles.front().ok_or_else(|| eyre!("obstacle pool is empty"))
    }

    /// Drops the oldest pair once it has scrolled past the recycle threshold.
    pub fn recycle_if_passed(&mut self) -> Result<Option<[Entity; 2]>> {
        if self.oldest()?.horizontal() >= self.recycle_threshold {
            return Ok(None);
        }
        if self.obstacles.len() < 2 {
            bail!("obstacle pool holds a half pair ({} member)", self.obstacles.len());
        }
        match (self.obstacles.pop_front(), self.obstacles.pop_front()) {
            (Some(bottom), Some(top)) => Ok(Some([bottom, top])),
            _ => Err(eyre!("obstacle pool lost a member while recycling")),
        }
    }

    /// Spawns the next pair once a lone pair has scrolled past the spawn trigger.
    pub fn maybe_spawn<R: Rng>(&mut self, rng: &mut R, ids: &mut EntityIds) -> Result<Option<[Entity; 2]>> {
        let oldest = self.oldest()?.horizontal();
        if self.obstacles.len() == 2 && oldest < self.spawn_trigger {
            return Ok(Some(self.spawn_pair(rng, ids)));
        }
        Ok(None)
    }

    pub fn clear(&mut self) -> Vec<Entity> {
        self.obstacles.drain(..).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundRecycle {
    pub removed: Entity,
    pub added: Entity,
}

#[derive(Debug, Clone)]
pub struct GroundPool {
    segments: VecDeque<Entity>,
    size: Size,
    spawn_horizontal: f64,
    recycle_threshold: f64,
}

impl GroundPool {
    /// Lays two tiles edge to edge, starting at the left edge of the screen.
    pub fn new(config: &GameConfig, ids: &mut EntityIds) -> Self {
        let size = config.ground_size();
        let segments = (0..GROUND_SEGMENTS)
            .map(|index| {
                Entity::new(ids.next_id(), EntityKind::Ground, Position::new(0.0, index as f64 * size.width), size)
            })
            .collect();
        GroundPool {
            segments,
            size,
            spawn_horizontal: config.ground_spawn_horizontal,
            recycle_threshold: config.ground_recycle_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.segments.iter()
    }

    pub fn advance(&mut self, delta: f64) {
        for segment in self.segments.iter_mut() {
            segment.move_left(delta);
        }
    }

    /// Replaces the oldest tile with a fresh one at the spawn column once it has fully
    /// scrolled off. Each replacement is worth one point.
    pub fn recycle_if_passed(&mut self, ids: &mut EntityIds) -> Result<Option<GroundRecycle>> {
        if self.segments.len() != GROUND_SEGMENTS {
            bail!("ground pool holds {} tiles, expected {GROUND_SEGMENTS}", self.segments.len());
        }
        let oldest = self.segments.front().ok_or_else(|| eyre!("ground pool is empty"))?;
        if oldest.horizontal() > self.recycle_threshold {
            return Ok(None);
        }
        let removed = self.segments.pop_front().ok_or_else(|| eyre!("ground pool is empty"))?;
        let added = Entity::new(ids.next_id(), EntityKind::Ground, Position::new(0.0, self.spawn_horizontal), self.size);
        self.segments.push_back(added);
        Ok(Some(GroundRecycle { removed, added }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn setup() -> (GameConfig, EntityIds, ChaCha8Rng) {
        (GameConfig::default(), EntityIds::default(), ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn test_spawn_pair_is_mirrored() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        let [bottom, top] = pool.spawn_pair(&mut rng, &mut ids);

        assert_eq!(pool.len(), 2);
        assert_eq!(bottom.kind(), EntityKind::Obstacle(ObstacleSide::Bottom));
        assert_eq!(top.kind(), EntityKind::Obstacle(ObstacleSide::Top));
        assert_eq!(bottom.horizontal(), 100.0);
        assert_eq!(top.horizontal(), 100.0);
        assert_eq!(top.vertical(), bottom.vertical() + 75.0);
        assert_eq!(pool.iter().map(|o| o.id()).collect::<Vec<_>>(), vec![bottom.id(), top.id()]);
    }

    #[test]
    fn test_spawn_offsets_stay_in_range() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        for _ in 0..500 {
            let [bottom, _] = pool.spawn_pair(&mut rng, &mut ids);
            assert!(bottom.vertical() > 16.6 - 33.3 - 1e-9, "offset {} too low", bottom.vertical());
            assert!(bottom.vertical() <= 16.6, "offset {} too high", bottom.vertical());
        }
    }

    #[test]
    fn test_recycle_removes_whole_pair() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        let [first, _] = pool.spawn_pair(&mut rng, &mut ids);
        pool.advance(60.0);
        let [second, _] = pool.spawn_pair(&mut rng, &mut ids);
        assert_eq!(pool.len(), 4);

        // Oldest pair sits at 40: not passed yet.
        assert_eq!(pool.recycle_if_passed().unwrap(), None);

        pool.advance(52.6);
        let removed = pool.recycle_if_passed().unwrap().unwrap();
        assert_eq!(removed[0].id(), first.id());
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.iter().next().unwrap().id(), second.id());
    }

    #[test]
    fn test_recycle_threshold_is_strict() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        pool.spawn_pair(&mut rng, &mut ids);
        pool.advance(112.5);
        assert_eq!(pool.recycle_if_passed().unwrap(), None);
        pool.advance(0.01);
        assert!(pool.recycle_if_passed().unwrap().is_some());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_maybe_spawn_only_for_lone_pair() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        pool.spawn_pair(&mut rng, &mut ids);

        pool.advance(62.5);
        // Exactly at the trigger: not yet.
        assert_eq!(pool.maybe_spawn(&mut rng, &mut ids).unwrap(), None);

        pool.advance(0.01);
        assert!(pool.maybe_spawn(&mut rng, &mut ids).unwrap().is_some());
        assert_eq!(pool.len(), 4);

        pool.advance(30.0);
        assert_eq!(pool.maybe_spawn(&mut rng, &mut ids).unwrap(), None);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_empty_obstacle_pool_is_a_fault() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        assert!(pool.recycle_if_passed().is_err());
        assert!(pool.maybe_spawn(&mut rng, &mut ids).is_err());
    }

    #[test]
    fn test_clear_drains_everything() {
        let (config, mut ids, mut rng) = setup();
        let mut pool = ObstaclePool::new(&config);
        pool.spawn_pair(&mut rng, &mut ids);
        pool.spawn_pair(&mut rng, &mut ids);
        assert_eq!(pool.clear().len(), 4);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_ground_starts_tiled() {
        let (config, mut ids, _) = setup();
        let pool = GroundPool::new(&config, &mut ids);
        let lefts: Vec<f64> = pool.iter().map(|g| g.horizontal()).collect();
        assert_eq!(lefts, vec![0.0, 100.0]);
        assert!(pool.iter().all(|g| g.vertical() == 0.0));
    }

    #[test]
    fn test_ground_recycles_at_threshold() {
        let (config, mut ids, _) = setup();
        let mut pool = GroundPool::new(&config, &mut ids);
        pool.advance(99.0);
        assert_eq!(pool.recycle_if_passed(&mut ids).unwrap(), None);

        pool.advance(1.0);
        let recycle = pool.recycle_if_passed(&mut ids).unwrap().unwrap();
        assert_eq!(recycle.removed.horizontal(), -100.0);
        assert_eq!(recycle.added.horizontal(), 100.0);
        assert_eq!(pool.len(), 2);

        let lefts: Vec<f64> = pool.iter().map(|g| g.horizontal()).collect();
        assert_eq!(lefts, vec![0.0, 100.0]);
        assert_eq!(pool.iter().last().unwrap().id(), recycle.added.id());
    }

    #[test]
    fn test_ground_pool_with_wrong_tile_count_is_a_fault() {
        let (config, mut ids, _) = setup();
        let mut pool = GroundPool::new(&config, &mut ids);
        pool.segments.pop_back();
        assert!(pool.recycle_if_passed(&mut ids).is_err());
        pool.segments.clear();
        assert!(pool.recycle_if_passed(&mut ids).is_err());
    }
}
