mod collision;
mod engine;
mod object;
mod pool;
mod render;
mod state;
mod timer;

pub use object::{Position, Size};

use std::collections::HashMap;

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{MouseEvent, MouseEventKind};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, trace};

use super::{Frame, Page, PageId};
use crate::{
    action::{act, Action, ActionState, Command, GameAction},
    config::{key_event_to_string, GameConfig, PageKeyBindings},
    constants::INSTRUCTIONS,
    pages::game::{
        engine::Engine,
        render::{Hud, HudView, WorldView},
        state::Status,
        timer::TickTimer,
    },
};

pub struct GamePage {
    pub action_tx: Option<UnboundedSender<Action>>,
    pub keymap: PageKeyBindings,
    engine: Engine<StdRng>,
    hud: Hud,
    timer: TickTimer,
}

impl GamePage {
    /// `seed` pins the obstacle layout; without it the layout is random.
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut hud = Hud::new(config.starting_health);
        let timer = TickTimer::new(config.tick_interval());
        let engine = Engine::new(config, rng, &mut hud);
        GamePage { action_tx: None, keymap: PageKeyBindings::default(), engine, hud, timer }
    }

    fn action_tx(&self) -> Result<UnboundedSender<Action>> {
        self.action_tx.clone().ok_or_else(|| eyre!("game page has no action handler"))
    }

    fn start(&mut self) -> Result<()> {
        let tx = self.action_tx()?;
        if self.engine.start(&mut self.hud) {
            self.timer.start(tx);
        }
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        let tx = self.action_tx()?;
        if self.engine.restart(&mut self.hud) {
            self.timer.start(tx);
        }
        Ok(())
    }

    fn tick(&mut self, generation: u64) -> Result<()> {
        if !self.timer.accepts(generation) {
            trace!("dropping tick from stale timer {generation}");
            return Ok(());
        }
        if let Status::GameOver(cause) = self.engine.tick(&mut self.hud)? {
            self.timer.stop();
            info!("stopped ticking after {cause}");
        }
        Ok(())
    }

    /// Key shown to the player for `action`, taken from the active keymap.
    fn key_for(&self, action: GameAction) -> String {
        let mut keys: Vec<String> = self
            .keymap
            .iter()
            .filter(|(_, bound)| bound.command == Command::Game(action) && bound.state == ActionState::Start)
            .map(|(event, _)| key_event_to_string(event))
            .collect();
        keys.sort();
        keys.into_iter().next().unwrap_or_else(|| "?".to_string())
    }

    fn draw_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let prompt = match self.engine.status() {
            Status::Ready => "Play",
            Status::GameOver(_) => "Restart",
            Status::Playing => return,
        };
        let mut lines = vec![Line::from(INSTRUCTIONS)];
        if let Status::GameOver(cause) = self.engine.status() {
            lines.insert(0, Line::from(format!("Game over: {cause}, score {}", self.hud.score)).bold());
        }
        lines.push(Line::from(""));
        let key = match self.engine.status() {
            Status::GameOver(_) => self.key_for(GameAction::Restart),
            _ => self.key_for(GameAction::Jump),
        };
        lines.push(Line::from(format!("[ {key} ] {prompt}")).style(Style::default().fg(Color::Black).bg(Color::Cyan)));

        let width = lines.iter().map(|line| line.width()).max().unwrap_or(0) as u16 + 4;
        let height = lines.len() as u16 + 2;
        let [_, area, _] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(height), Constraint::Fill(1)]).areas(area);
        let [_, area, _] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(width), Constraint::Fill(1)]).areas(area);

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .style(Style::default().bg(Color::Black).fg(Color::White));
        f.render_widget(Clear, area);
        f.render_widget(paragraph, area);
    }
}

impl Page for GamePage {
    fn id(&self) -> PageId {
        PageId::Game
    }

    fn register_keymap(&mut self, keymaps: &HashMap<PageId, PageKeyBindings>) -> Result<()> {
        if let Some(keymap) = keymaps.get(&self.id()) {
            self.keymap = keymap.clone();
        }
        Ok(())
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::Down(_) => Ok(Some(act!(Command::Game(GameAction::Jump)))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action.command {
            Command::StartGame => self.start()?,
            Command::Game(GameAction::Jump) if action.state == ActionState::Start => {
                self.engine.jump(&mut self.hud);
            },
            Command::Game(GameAction::Restart) => self.restart()?,
            Command::Game(GameAction::Tick(generation)) => self.tick(generation)?,
            _ => {},
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [hud_area, world_area] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        f.render_widget(HudView::new(&self.hud), hud_area);
        f.render_widget(WorldView::new(self.engine.entities()), world_area);
        self.draw_overlay(f, world_area);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyModifiers, MouseButton};
    use pretty_assertions::assert_eq;
    use tokio::{sync::mpsc, time::timeout};

    use super::*;
    use crate::pages::game::{object::Position, state::GameOverCause};

    fn page() -> (GamePage, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut page = GamePage::new(GameConfig::default(), Some(3));
        page.register_action_handler(tx).unwrap();
        (page, rx)
    }

    async fn next_action(rx: &mut mpsc::UnboundedReceiver<Action>) -> Action {
        timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_start_runs_the_timer() {
        let (mut page, mut rx) = page();
        page.update(act!(Command::StartGame)).unwrap();
        assert_eq!(page.engine.status(), Status::Playing);
        assert!(page.timer.is_running());

        let before = page.engine.bird().vertical();
        let action = next_action(&mut rx).await;
        page.update(action).unwrap();
        assert!(page.engine.bird().vertical() < before);
    }

    #[tokio::test]
    async fn test_game_over_stops_the_timer_once() {
        let (mut page, mut rx) = page();
        page.update(act!(Command::StartGame)).unwrap();
        page.engine.bird_mut().set_position(Position::new(16.7, 37.5));

        let action = next_action(&mut rx).await;
        page.update(action).unwrap();
        assert_eq!(page.engine.status(), Status::GameOver(GameOverCause::GroundImpact));
        assert!(!page.timer.is_running());
        assert_eq!(page.hud.status, Status::GameOver(GameOverCause::GroundImpact));
    }

    #[tokio::test]
    async fn test_stale_ticks_are_dropped() {
        let (mut page, mut rx) = page();
        page.update(act!(Command::StartGame)).unwrap();
        let stale = page.timer.generation();
        page.engine.bird_mut().set_position(Position::new(16.7, 37.5));
        let action = next_action(&mut rx).await;
        page.update(action).unwrap();

        page.update(act!(Command::Game(GameAction::Restart))).unwrap();
        assert_eq!(page.engine.status(), Status::Playing);
        assert_ne!(page.timer.generation(), stale);

        let bird = page.engine.bird().position();
        page.update(act!(Command::Game(GameAction::Tick(stale)))).unwrap();
        assert_eq!(page.engine.bird().position(), bird);
        assert_eq!(bird, Position::new(58.3, 37.5));
    }

    #[tokio::test]
    async fn test_restart_while_playing_keeps_the_timer() {
        let (mut page, _rx) = page();
        page.update(act!(Command::StartGame)).unwrap();
        let generation = page.timer.generation();
        page.update(act!(Command::Game(GameAction::Restart))).unwrap();
        page.update(act!(Command::StartGame)).unwrap();
        assert_eq!(page.timer.generation(), generation);
    }

    #[test]
    fn test_jump_ignored_before_start() {
        let (mut page, _rx) = page();
        page.update(act!(Command::Game(GameAction::Jump))).unwrap();
        assert_eq!(page.engine.bird().vertical(), 58.3);
    }

    #[tokio::test]
    async fn test_jump_only_on_press() {
        let (mut page, _rx) = page();
        page.update(act!(Command::StartGame)).unwrap();

        for state in [ActionState::Repeat, ActionState::End] {
            page.update(Action { command: Command::Game(GameAction::Jump), state }).unwrap();
            assert_eq!(page.engine.bird().vertical(), 58.3);
        }

        page.update(act!(Command::Game(GameAction::Jump))).unwrap();
        assert!((page.engine.bird().vertical() - (58.3 + 6.6)).abs() < 1e-9);
    }

    #[test]
    fn test_mouse_press_is_a_jump() {
        let (mut page, _rx) = page();
        let press = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(page.handle_mouse_events(press).unwrap(), Some(act!(Command::Game(GameAction::Jump))));

        let release = MouseEvent { kind: MouseEventKind::Up(MouseButton::Left), ..press };
        assert_eq!(page.handle_mouse_events(release).unwrap(), None);
    }

    #[test]
    fn test_start_without_action_handler_fails() {
        let mut page = GamePage::new(GameConfig::default(), Some(3));
        assert!(page.update(act!(Command::StartGame)).is_err());
        assert_eq!(page.engine.status(), Status::Ready);
        assert!(!page.timer.is_running());
    }
}
