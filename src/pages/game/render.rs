use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Widget,
};
use tracing::trace;

use crate::{
    constants::game,
    pages::game::{
        object::{Entity, EntityId, EntityKind, ObstacleSide, Position, Size},
        state::{HealthLevel, Status},
    },
};

/// Everything the engine tells the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Spawned { id: EntityId, kind: EntityKind, position: Position },
    Moved { id: EntityId, position: Position },
    Despawned { id: EntityId },
    Score(u32),
    Health { value: u8, level: HealthLevel },
    StatusChanged(Status),
}

pub trait RenderSink {
    fn on_event(&mut self, event: &GameEvent);
}

impl RenderSink for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(*event);
    }
}

/// Score board and health bar, kept up to date from [`GameEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub health: u8,
    pub full_health: u8,
    pub level: HealthLevel,
    pub status: Status,
}

impl Default for Hud {
    fn default() -> Self {
        Hud::new(game::STARTING_HEALTH)
    }
}

impl Hud {
    pub fn new(full_health: u8) -> Self {
        Hud { score: 0, health: full_health, full_health, level: HealthLevel::Healthy, status: Status::Ready }
    }

    pub fn health_color(&self) -> Color {
        match self.level {
            HealthLevel::Healthy => game::HEALTHY_COLOR,
            HealthLevel::Warning => game::WARNING_COLOR,
            HealthLevel::Critical => game::CRITICAL_COLOR,
        }
    }

    pub fn health_bar_width(&self) -> u16 {
        u16::from(self.health) * game::HEALTH_BAR_SCALE
    }
}

impl RenderSink for Hud {
    fn on_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Score(score) => self.score = score,
            GameEvent::Health { value, level } => {
                self.health = value;
                self.level = level;
            },
            GameEvent::StatusChanged(status) => self.status = status,
            GameEvent::Spawned { id, kind, .. } => trace!("spawned {kind} {id:?}"),
            GameEvent::Despawned { id } => trace!("despawned {id:?}"),
            GameEvent::Moved { .. } => {},
        }
    }
}

/// Maps a percentage-space box onto terminal cells inside `area`, with the origin at the
/// bottom-left corner. Parts outside the area are cut off; `None` if nothing is left.
pub fn project(area: Rect, position: Position, size: Size) -> Option<Rect> {
    let width = f64::from(area.width);
    let height = f64::from(area.height);

    let left = (position.horizontal / 100.0 * width).round().clamp(0.0, width);
    let right = ((position.horizontal + size.width) / 100.0 * width).round().clamp(0.0, width);
    let bottom = (position.vertical / 100.0 * height).round().clamp(0.0, height);
    let top = ((position.vertical + size.height) / 100.0 * height).round().clamp(0.0, height);

    if right <= left || top <= bottom {
        return None;
    }

    Some(Rect {
        x: area.x + left as u16,
        y: area.y + (height - top) as u16,
        width: (right - left) as u16,
        height: (top - bottom) as u16,
    })
}

/// Sky, ground, obstacles and bird. Drawing only reads the entities.
pub struct WorldView<'a> {
    entities: Vec<&'a Entity>,
}

impl<'a> WorldView<'a> {
    pub fn new(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        WorldView { entities: entities.into_iter().collect() }
    }

    fn draw_entity(entity: &Entity, area: Rect, buf: &mut Buffer) {
        let Some(rect) = project(area, entity.position(), entity.size()) else {
            return;
        };
        match entity.kind() {
            EntityKind::Ground => {
                buf.set_style(rect, Style::default().bg(game::GROUND_COLOR));
                // Grass line on the top row, only where the tile is actually visible.
                buf.set_style(Rect { height: 1, ..rect }, Style::default().bg(game::GROUND_EDGE_COLOR));
            },
            EntityKind::Obstacle(side) => {
                buf.set_style(rect, Style::default().bg(game::OBSTACLE_COLOR));
                let cap_row = match side {
                    ObstacleSide::Bottom => rect.y,
                    ObstacleSide::Top => rect.bottom().saturating_sub(1),
                };
                buf.set_style(Rect { y: cap_row, height: 1, ..rect }, Style::default().bg(game::OBSTACLE_EDGE_COLOR));
            },
            EntityKind::Bird => {
                buf.set_style(rect, Style::default().bg(game::BIRD_COLOR));
                let row = rect.y + rect.height / 2;
                buf.set_stringn(
                    rect.x,
                    row,
                    game::BIRD_GLYPH,
                    rect.width as usize,
                    Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
                );
            },
        }
    }
}

impl Widget for WorldView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(game::SKY_COLOR));

        // Painter's order: ground, then obstacles, then the bird on top.
        let layer = |entity: &&Entity| match entity.kind() {
            EntityKind::Ground => 0,
            EntityKind::Obstacle(_) => 1,
            EntityKind::Bird => 2,
        };
        let mut entities = self.entities;
        entities.sort_by_key(layer);
        for entity in entities {
            Self::draw_entity(entity, area, buf);
        }
    }
}

pub struct HudView<'a> {
    hud: &'a Hud,
}

impl<'a> HudView<'a> {
    pub fn new(hud: &'a Hud) -> Self {
        HudView { hud }
    }
}

impl Widget for HudView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bar = " ".repeat(self.hud.health_bar_width() as usize);
        let empty = " ".repeat(
            (u16::from(self.hud.full_health) * game::HEALTH_BAR_SCALE).saturating_sub(self.hud.health_bar_width())
                as usize,
        );
        let line = Line::from(vec![
            Span::raw(" Score ").bold(),
            Span::raw(format!("{:<6}", self.hud.score)),
            Span::raw("Health ").bold(),
            Span::styled(bar, Style::default().bg(self.hud.health_color())),
            Span::styled(empty, Style::default().bg(Color::DarkGray)),
        ]);
        line.render(area, buf);
    }
}
