use color_eyre::eyre::Result;
use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::{
    config::GameConfig,
    pages::game::{
        collision::overlaps,
        object::{Entity, EntityIds, EntityKind},
        pool::{GroundPool, ObstaclePool},
        render::{GameEvent, RenderSink},
        state::{GameState, Status},
    },
};

/// Owns the bird, both pools and the game state, and advances them one tick at a time.
/// Every change is reported to the [`RenderSink`] passed into the call that caused it.
pub struct Engine<R: Rng> {
    config: GameConfig,
    rng: R,
    ids: EntityIds,
    bird: Entity,
    obstacles: ObstaclePool,
    grounds: GroundPool,
    state: GameState,
}

impl<R: Rng> Engine<R> {
    /// Lays out the opening scene and waits in [`Status::Ready`] for [`Engine::start`].
    pub fn new<S: RenderSink>(config: GameConfig, rng: R, sink: &mut S) -> Self {
        let mut ids = EntityIds::default();
        let bird = Entity::new(ids.next_id(), EntityKind::Bird, config.bird_start(), config.bird_size());
        let grounds = GroundPool::new(&config, &mut ids);
        let obstacles = ObstaclePool::new(&config);
        let state = GameState::new(&config);

        let mut engine = Engine { config, rng, ids, bird, obstacles, grounds, state };

        emit_spawned(sink, &engine.bird);
        for ground in engine.grounds.iter() {
            emit_spawned(sink, ground);
        }
        let pair = engine.obstacles.spawn_pair(&mut engine.rng, &mut engine.ids);
        for obstacle in &pair {
            emit_spawned(sink, obstacle);
        }
        engine.emit_board(sink);
        engine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bird(&self) -> &Entity {
        &self.bird
    }

    #[cfg(test)]
    pub fn bird_mut(&mut self) -> &mut Entity {
        &mut self.bird
    }

    pub fn obstacles(&self) -> &ObstaclePool {
        &self.obstacles
    }

    pub fn grounds(&self) -> &GroundPool {
        &self.grounds
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// All live entities, back to front.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.grounds.iter().chain(self.obstacles.iter()).chain(std::iter::once(&self.bird))
    }

    pub fn start<S: RenderSink>(&mut self, sink: &mut S) -> bool {
        if !self.state.start() {
            warn!("start ignored while {}", self.state.status());
            return false;
        }
        info!("game started");
        sink.on_event(&GameEvent::StatusChanged(self.state.status()));
        true
    }

    /// Boosts the bird right away. Input outside of play is dropped.
    pub fn jump<S: RenderSink>(&mut self, sink: &mut S) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.bird.move_up(self.config.jump_boost);
        emit_moved(sink, &self.bird);
        true
    }

    /// One step of the simulation. Does nothing unless the game is being played.
    pub fn tick<S: RenderSink>(&mut self, sink: &mut S) -> Result<Status> {
        if !self.state.is_playing() {
            return Ok(self.state.status());
        }

        self.bird.move_down(self.config.fall_rate);
        emit_moved(sink, &self.bird);

        self.grounds.advance(self.config.scroll_rate);
        if let Some(recycle) = self.grounds.recycle_if_passed(&mut self.ids)? {
            sink.on_event(&GameEvent::Despawned { id: recycle.removed.id() });
            emit_spawned(sink, &recycle.added);
            if let Some(score) = self.state.record_ground_recycle() {
                debug!("score {score}");
                sink.on_event(&GameEvent::Score(score));
            }
        }
        for ground in self.grounds.iter() {
            emit_moved(sink, ground);
        }

        self.obstacles.advance(self.config.scroll_rate);
        if let Some(pair) = self.obstacles.recycle_if_passed()? {
            for obstacle in &pair {
                sink.on_event(&GameEvent::Despawned { id: obstacle.id() });
            }
        }
        if let Some(pair) = self.obstacles.maybe_spawn(&mut self.rng, &mut self.ids)? {
            debug!("spawned pair at offset {:.2}", pair[0].vertical());
            for obstacle in &pair {
                emit_spawned(sink, obstacle);
            }
        }
        for obstacle in self.obstacles.iter() {
            emit_moved(sink, obstacle);
        }

        let collided = self.obstacles.iter().any(|obstacle| overlaps(&self.bird, obstacle));
        if let Some(health) = self.state.resolve_collision(collided) {
            debug!("hit, health {health}");
            sink.on_event(&GameEvent::Health { value: health, level: self.state.health_level() });
        }

        if let Some(cause) = self.state.check_terminal(self.bird.vertical()) {
            info!("game over ({cause}) with score {}", self.state.score());
            sink.on_event(&GameEvent::StatusChanged(self.state.status()));
        }

        trace!(
            bird = self.bird.vertical(),
            obstacles = self.obstacles.len(),
            collided,
            health = self.state.health(),
            "tick"
        );
        Ok(self.state.status())
    }

    /// Fresh bird, fresh obstacles, full health and zero score. Ground keeps scrolling from
    /// where it is.
    pub fn restart<S: RenderSink>(&mut self, sink: &mut S) -> bool {
        if !self.state.restart() {
            warn!("restart ignored while {}", self.state.status());
            return false;
        }

        self.bird.set_position(self.config.bird_start());
        emit_moved(sink, &self.bird);

        for obstacle in self.obstacles.clear() {
            sink.on_event(&GameEvent::Despawned { id: obstacle.id() });
        }
        let pair = self.obstacles.spawn_pair(&mut self.rng, &mut self.ids);
        for obstacle in &pair {
            emit_spawned(sink, obstacle);
        }

        self.emit_board(sink);
        sink.on_event(&GameEvent::StatusChanged(self.state.status()));
        info!("game restarted");
        true
    }

    fn emit_board<S: RenderSink>(&self, sink: &mut S) {
        sink.on_event(&GameEvent::Score(self.state.score()));
        sink.on_event(&GameEvent::Health { value: self.state.health(), level: self.state.health_level() });
    }
}

fn emit_spawned<S: RenderSink>(sink: &mut S, entity: &Entity) {
    sink.on_event(&GameEvent::Spawned { id: entity.id(), kind: entity.kind(), position: entity.position() });
}

fn emit_moved<S: RenderSink>(sink: &mut S, entity: &Entity) {
    sink.on_event(&GameEvent::Moved { id: entity.id(), position: entity.position() });
}
