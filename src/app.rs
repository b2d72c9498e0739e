use color_eyre::eyre::Result;
use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
    action::{act, Action, Command, GameAction},
    cli::Cli,
    config::Config,
    constants::{HEIGHT, WIDTH},
    pages::{game::GamePage, home::HomePage, Page, PageId},
    tui,
};

pub struct App {
    config: Config,
    tick_rate: f64,
    frame_rate: f64,
    should_quit: bool,
    should_suspend: bool,
    pages: Vec<Box<dyn Page>>,
    active_page_index: usize,
}

impl App {
    pub fn new(args: &Cli) -> Result<Self> {
        let config = Config::new()?;

        let home_page = HomePage::new()?;
        let game_page = GamePage::new(config.game.clone(), args.seed);

        Ok(Self {
            tick_rate: args.tick_rate,
            frame_rate: args.frame_rate,
            should_quit: false,
            should_suspend: false,
            config,
            pages: vec![Box::new(home_page), Box::new(game_page)],
            active_page_index: 0,
        })
    }

    fn active_page(&mut self) -> Option<&mut Box<dyn Page>> {
        self.pages.get_mut(self.active_page_index)
    }

    fn set_active_page(&mut self, id: PageId) {
        if let Some(index) = self.pages.iter().position(|page| page.id() == id) {
            log::info!("switching to page {id}");
            self.active_page_index = index;
        }
    }

    fn new_tui(&self) -> Result<tui::Tui> {
        Ok(tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).mouse(true))
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = self.new_tui()?;
        tui.enter()?;

        for page in self.pages.iter_mut() {
            page.register_keymap(&self.config.keybindings.pages)?;
        }

        for page in self.pages.iter_mut() {
            page.register_action_handler(action_tx.clone())?;
        }

        for page in self.pages.iter_mut() {
            page.register_config_handler(self.config.clone())?;
        }

        for page in self.pages.iter_mut() {
            page.init()?;
        }

        loop {
            let queued = tokio::select! {
                event = tui.next() => {
                    let Some(e) = event else { break };
                    self.handle_event(e, &action_tx)?;
                    None
                },
                action = action_rx.recv() => action,
            };
            if let Some(action) = queued {
                self.dispatch(action, &mut tui, &action_tx)?;
            }

            while let Ok(action) = action_rx.try_recv() {
                self.dispatch(action, &mut tui, &action_tx)?;
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(act!(Command::Resume))?;
                tui = self.new_tui()?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, e: tui::Event, action_tx: &UnboundedSender<Action>) -> Result<()> {
        match e {
            tui::Event::Quit => action_tx.send(act!(Command::Quit))?,
            tui::Event::Tick => action_tx.send(act!(Command::Tick))?,
            tui::Event::Render => action_tx.send(act!(Command::Render))?,
            tui::Event::Resize(x, y) => action_tx.send(act!(Command::Resize(x, y)))?,
            tui::Event::Key(key) => {
                if let Some(action) = self.lookup_key(&key) {
                    log::debug!("Got action: {action:?}");
                    action_tx.send(action)?;
                }
            },
            _ => {},
        }
        if let Some(page) = self.active_page() {
            if let Some(action) = page.handle_events(Some(e))? {
                action_tx.send(action)?;
            }
        }
        Ok(())
    }

    /// Global bindings shadow page bindings.
    fn lookup_key(&mut self, key: &crossterm::event::KeyEvent) -> Option<Action> {
        if let Some(action) = self.config.keybindings.global.get(key) {
            return Some(action.clone());
        }
        let page_id = self.active_page()?.id();
        self.config.keybindings.pages.get(&page_id)?.get(key).cloned()
    }

    fn dispatch(&mut self, action: Action, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        let Action { command, .. } = &action;
        match command {
            Command::Tick | Command::Render | Command::Game(GameAction::Tick(_)) => {},
            _ => log::debug!("{command:?}"),
        }
        match command {
            Command::Quit => self.should_quit = true,
            Command::Suspend => self.should_suspend = true,
            Command::Resume => self.should_suspend = false,
            Command::Error(message) => log::error!("{message}"),
            Command::Resize(w, h) => {
                tui.resize(Rect::new(0, 0, *w, *h))?;
                self.render(tui, action_tx)?;
            },
            Command::Render => {
                self.render(tui, action_tx)?;
            },
            Command::StartGame => self.set_active_page(PageId::Game),
            _ => {},
        }
        if let Some(page) = self.active_page() {
            if let Some(action) = page.update(action)? {
                action_tx.send(action)?
            }
        }
        Ok(())
    }

    fn render(&mut self, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        let mut draw_error = None;
        tui.draw(|f| {
            let area = f.area();

            let [_, area, _] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(HEIGHT), Constraint::Fill(1)]).areas(area);
            let [_, area, _] =
                Layout::horizontal([Constraint::Fill(1), Constraint::Length(WIDTH), Constraint::Fill(1)]).areas(area);

            let border = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().bg(Color::Black));
            f.render_widget(border, area);

            let area = area.inner(Margin { horizontal: 1, vertical: 1 });

            if let Some(page) = self.pages.get_mut(self.active_page_index) {
                if let Err(e) = page.draw(f, area) {
                    draw_error = Some(e);
                }
            }
        })?;

        if let Some(e) = draw_error {
            action_tx.send(act!(Command::Error(format!("Failed to draw: {:?}", e))))?;
        }
        Ok(())
    }
}
