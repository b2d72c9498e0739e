use strum::Display;

use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GameOverCause {
    GroundImpact,
    HealthDepleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Status {
    /// Waiting for the start event.
    Ready,
    Playing,
    GameOver(GameOverCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HealthLevel {
    Healthy,
    Warning,
    Critical,
}

/// Score counter and health with its once-per-episode decay latch.
#[derive(Debug, Clone)]
pub struct GameState {
    score: u32,
    health: u8,
    collided: bool,
    health_latched: bool,
    status: Status,
    full_health: u8,
    warning_health: u8,
    ground_line: f64,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        GameState {
            score: 0,
            health: config.starting_health,
            collided: false,
            health_latched: false,
            status: Status::Ready,
            full_health: config.starting_health,
            warning_health: config.health_warning,
            ground_line: config.ground_line,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn full_health(&self) -> u8 {
        self.full_health
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == Status::Playing
    }

    pub fn collided(&self) -> bool {
        self.collided
    }

    pub fn health_latched(&self) -> bool {
        self.health_latched
    }

    pub fn health_level(&self) -> HealthLevel {
        if self.health >= self.full_health {
            HealthLevel::Healthy
        } else if self.health == self.warning_health {
            HealthLevel::Warning
        } else {
            HealthLevel::Critical
        }
    }

    pub fn start(&mut self) -> bool {
        if self.status != Status::Ready {
            return false;
        }
        self.status = Status::Playing;
        true
    }

    /// Back to a fresh game. Only valid once the previous one is over.
    pub fn restart(&mut self) -> bool {
        if !matches!(self.status, Status::GameOver(_)) {
            return false;
        }
        self.score = 0;
        self.health = self.full_health;
        self.collided = false;
        self.health_latched = false;
        self.status = Status::Playing;
        true
    }

    /// A ground tile was recycled. Returns the new score while playing.
    pub fn record_ground_recycle(&mut self) -> Option<u32> {
        if !self.is_playing() {
            return None;
        }
        self.score += 1;
        Some(self.score)
    }

    /// Feeds this tick's collision flag into the decay latch. Returns the new health when it
    /// dropped; at most once per run of colliding ticks.
    pub fn resolve_collision(&mut self, collided: bool) -> Option<u8> {
        self.collided = collided;
        if !collided {
            self.health_latched = false;
            return None;
        }
        if self.health_latched || self.health == 0 {
            return None;
        }
        self.health = self.health.saturating_sub(1);
        self.health_latched = true;
        Some(self.health)
    }

    /// Moves to `GameOver` when health is gone or the bird dropped below the ground line.
    pub fn check_terminal(&mut self, bird_vertical: f64) -> Option<GameOverCause> {
        if !self.is_playing() {
            return None;
        }
        let cause = if self.health == 0 {
            GameOverCause::HealthDepleted
        } else if bird_vertical < self.ground_line {
            GameOverCause::GroundImpact
        } else {
            return None;
        };
        self.status = Status::GameOver(cause);
        Some(cause)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::new(&GameConfig::default());
        assert!(state.start());
        state
    }

    #[test]
    fn test_initial_values() {
        let state = GameState::new(&GameConfig::default());
        assert_eq!(state.score(), 0);
        assert_eq!(state.health(), 3);
        assert_eq!(state.status(), Status::Ready);
        assert_eq!(state.health_level(), HealthLevel::Healthy);
    }

    #[test]
    fn test_one_decay_per_episode() {
        let mut state = playing();
        let decays: Vec<Option<u8>> = (0..5).map(|_| state.resolve_collision(true)).collect();
        assert_eq!(decays, vec![Some(2), None, None, None, None]);
        assert_eq!(state.health(), 2);
        assert!(state.health_latched());
    }

    #[test]
    fn test_clear_tick_rearms_latch() {
        let mut state = playing();
        assert_eq!(state.resolve_collision(true), Some(2));
        assert_eq!(state.resolve_collision(false), None);
        assert!(!state.health_latched());
        assert_eq!(state.resolve_collision(true), Some(1));
    }

    #[test]
    fn test_health_never_below_zero() {
        let mut state = playing();
        for _ in 0..10 {
            state.resolve_collision(true);
            state.resolve_collision(false);
        }
        assert_eq!(state.health(), 0);
    }

    #[test]
    fn test_health_levels() {
        let mut state = playing();
        state.resolve_collision(true);
        assert_eq!(state.health_level(), HealthLevel::Warning);
        state.resolve_collision(false);
        state.resolve_collision(true);
        assert_eq!(state.health_level(), HealthLevel::Critical);
        state.resolve_collision(false);
        state.resolve_collision(true);
        assert_eq!(state.health_level(), HealthLevel::Critical);
    }

    #[test]
    fn test_score_only_while_playing() {
        let mut state = GameState::new(&GameConfig::default());
        assert_eq!(state.record_ground_recycle(), None);
        state.start();
        assert_eq!(state.record_ground_recycle(), Some(1));
        assert_eq!(state.record_ground_recycle(), Some(2));
        state.check_terminal(0.0);
        assert_eq!(state.record_ground_recycle(), None);
        assert_eq!(state.score(), 2);
    }

    #[test]
    fn test_ground_impact_ends_game_at_full_health() {
        let mut state = playing();
        assert_eq!(state.check_terminal(16.6), None);
        assert_eq!(state.check_terminal(16.59), Some(GameOverCause::GroundImpact));
        assert_eq!(state.status(), Status::GameOver(GameOverCause::GroundImpact));
        assert_eq!(state.health(), 3);
    }

    #[test]
    fn test_depleted_health_ends_game() {
        let mut state = playing();
        for _ in 0..3 {
            state.resolve_collision(true);
            state.resolve_collision(false);
        }
        assert_eq!(state.check_terminal(50.0), Some(GameOverCause::HealthDepleted));
        // Already over: no second transition.
        assert_eq!(state.check_terminal(0.0), None);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut state = playing();
        assert!(!state.restart());
        assert!(!state.start());

        state.record_ground_recycle();
        state.resolve_collision(true);
        state.check_terminal(0.0);
        assert!(state.restart());
        assert_eq!(state.score(), 0);
        assert_eq!(state.health(), 3);
        assert!(!state.health_latched());
        assert_eq!(state.status(), Status::Playing);
    }
}
