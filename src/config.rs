use std::{collections::HashMap, fmt::Debug, path::PathBuf, time::Duration};

use color_eyre::eyre::{ensure, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{
    de::{self, Deserializer},
    Deserialize,
};

use crate::{
    action::{Action, ActionState, Command, GameAction, HomeAction},
    constants::game,
    pages::{
        game::{Position, Size},
        PageId,
    },
};

const CONFIG: &str = include_str!("../.config/config.yaml");

parse_and_map_actions![(PageId::Home, HomeAction, Command::Home), (PageId::Game, GameAction, Command::Game)];

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

/// Every tunable of the simulation. Units are viewport percentages and ticks.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub tick_interval_ms: u64,
    pub fall_rate: f64,
    pub jump_boost: f64,
    pub scroll_rate: f64,
    pub bird_start_vertical: f64,
    pub bird_start_horizontal: f64,
    pub bird_height: f64,
    pub bird_width: f64,
    pub obstacle_height: f64,
    pub obstacle_width: f64,
    pub obstacle_offset_max: f64,
    pub obstacle_offset_span: f64,
    pub pair_offset: f64,
    pub obstacle_spawn_horizontal: f64,
    pub obstacle_recycle_threshold: f64,
    pub spawn_trigger: f64,
    pub ground_tile_width: f64,
    pub ground_spawn_horizontal: f64,
    pub ground_recycle_threshold: f64,
    pub ground_line: f64,
    pub starting_health: u8,
    pub health_warning: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tick_interval_ms: game::TICK_INTERVAL_MS,
            fall_rate: game::FALL_RATE,
            jump_boost: game::JUMP_BOOST,
            scroll_rate: game::SCROLL_RATE,
            bird_start_vertical: game::BIRD_START_VERTICAL,
            bird_start_horizontal: game::BIRD_START_HORIZONTAL,
            bird_height: game::BIRD_HEIGHT,
            bird_width: game::BIRD_WIDTH,
            obstacle_height: game::OBSTACLE_HEIGHT,
            obstacle_width: game::OBSTACLE_WIDTH,
            obstacle_offset_max: game::OBSTACLE_OFFSET_MAX,
            obstacle_offset_span: game::OBSTACLE_OFFSET_SPAN,
            pair_offset: game::PAIR_OFFSET,
            obstacle_spawn_horizontal: game::OBSTACLE_SPAWN_HORIZONTAL,
            obstacle_recycle_threshold: game::OBSTACLE_RECYCLE_THRESHOLD,
            spawn_trigger: game::SPAWN_TRIGGER,
            ground_tile_width: game::GROUND_TILE_WIDTH,
            ground_spawn_horizontal: game::GROUND_SPAWN_HORIZONTAL,
            ground_recycle_threshold: game::GROUND_RECYCLE_THRESHOLD,
            ground_line: game::GROUND_LINE,
            starting_health: game::STARTING_HEALTH,
            health_warning: game::HEALTH_WARNING,
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn bird_start(&self) -> Position {
        Position::new(self.bird_start_vertical, self.bird_start_horizontal)
    }

    pub fn bird_size(&self) -> Size {
        Size::new(self.bird_height, self.bird_width)
    }

    pub fn obstacle_size(&self) -> Size {
        Size::new(self.obstacle_height, self.obstacle_width)
    }

    /// Ground tiles reach up to the ground line.
    pub fn ground_size(&self) -> Size {
        Size::new(self.ground_line, self.ground_tile_width)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.tick_interval_ms > 0, "game.tick_interval_ms must be positive");
        ensure!(self.starting_health > 0, "game.starting_health must be positive");
        ensure!(self.scroll_rate > 0.0, "game.scroll_rate must be positive");
        ensure!(self.bird_height > 0.0 && self.bird_width > 0.0, "game bird size must be positive");
        ensure!(self.obstacle_height > 0.0 && self.obstacle_width > 0.0, "game obstacle size must be positive");
        ensure!(self.ground_tile_width > 0.0, "game.ground_tile_width must be positive");
        // A lone pair has to trigger its successor before it is recycled, even within one scroll step.
        ensure!(
            self.spawn_trigger - self.scroll_rate > self.obstacle_recycle_threshold,
            "game.spawn_trigger must lie more than one scroll step above game.obstacle_recycle_threshold"
        );
        ensure!(
            self.obstacle_spawn_horizontal >= self.spawn_trigger,
            "game.obstacle_spawn_horizontal must not lie below game.spawn_trigger"
        );
        ensure!(
            self.ground_spawn_horizontal > self.ground_recycle_threshold,
            "game.ground_spawn_horizontal must lie above game.ground_recycle_threshold"
        );
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    pub fn new() -> Result<Self> {
        let default_config: Config = serde_yaml::from_str(CONFIG)?;
        let data_dir = crate::utils::get_data_dir();
        let config_dir = crate::utils::get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("_data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("_config_dir", config_dir.to_string_lossy().as_ref())?;

        let config_files = [("config.yaml", config::FileFormat::Yaml)];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!("No user configuration file found, using defaults");
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.merge_default_keybindings(default_config.keybindings);
        cfg.game.validate()?;
        log::debug!("game settings: {:?}", cfg.game);

        Ok(cfg)
    }

    /// User bindings win; defaults fill every key the user left alone.
    fn merge_default_keybindings(&mut self, defaults: KeyBindings) {
        for (scope, default_bindings) in defaults.pages.into_iter() {
            let user_bindings = self.keybindings.pages.entry(scope).or_default();
            for (key, cmd) in default_bindings.0.into_iter() {
                user_bindings.0.entry(key).or_insert(cmd);
            }
        }
        let user_bindings = &mut self.keybindings.global;
        for (key, cmd) in defaults.global.0.into_iter() {
            user_bindings.0.entry(key).or_insert(cmd);
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct _RawPageKeyBindings {
    pub click: Option<HashMap<String, String>>,
    pub hold: Option<HashMap<String, String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct _RawKeyBindings {
    #[serde(default)]
    pub global: _RawPageKeyBindings,
    #[serde(default)]
    pub pages: HashMap<String, _RawPageKeyBindings>,
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct PageKeyBindings(pub HashMap<KeyEvent, Action>);

#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    pub global: PageKeyBindings,
    pub pages: HashMap<PageId, PageKeyBindings>,
}

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_keybindings: _RawKeyBindings = _RawKeyBindings::deserialize(deserializer)?;

        let global_keybindings = PageKeyBindings(
            parse_page_keybindings::<Command>(&raw_keybindings.global)
                .map_err(de::Error::custom)?
                .into_iter()
                .map(|(event, (command, state))| (event, Action { command, state }))
                .collect(),
        );
        let page_keybindings = raw_keybindings
            .pages
            .into_iter()
            .map(|(page, keybindings)| match_page_keybindings(&page, keybindings))
            .collect::<Result<HashMap<_, _>, String>>()
            .map_err(de::Error::custom)?;

        Ok(KeyBindings { global: global_keybindings, pages: page_keybindings })
    }
}

macro_rules! parse_and_map_actions {
    ( $( ( $page_id_variant:path, $action_type:ty, $action_variant:path ) ),* ) => {
        fn match_page_keybindings(
            page: &str,
            raw_page_keybindings: _RawPageKeyBindings,
        ) -> Result<(PageId, PageKeyBindings), String> {
            let page_id: PageId = serde_yaml::from_str(page).map_err(|e| format!("Unknown page `{page}`: {e}"))?;
            let map = match page_id {
                $(
                    $page_id_variant => {
                        parse_page_keybindings::<$action_type>(&raw_page_keybindings)?
                            .into_iter()
                            .map(|(event, (command, state))| (event, Action { command: $action_variant(command), state }))
                            .collect()
                    },
                )*
            };

            Ok((page_id, PageKeyBindings(map)))
        }
    };
}

use parse_and_map_actions;

fn parse_binding_pairs<T>(map: &Option<HashMap<String, String>>) -> Result<HashMap<KeyEvent, T>, String>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(inner_map) = map else {
        return Ok(HashMap::new());
    };
    inner_map
        .iter()
        .map(|(key_str, action_str)| {
            let action: T = serde_yaml::from_str(action_str).map_err(|e| format!("Unknown action `{action_str}`: {e}"))?;
            Ok((parse_key_event(key_str)?, action))
        })
        .collect()
}

fn parse_page_keybindings<T>(raw_page_keybindings: &_RawPageKeyBindings) -> Result<HashMap<KeyEvent, (T, ActionState)>, String>
where
    T: for<'de> Deserialize<'de> + Clone + Debug,
{
    let click_keybindings = parse_binding_pairs(&raw_page_keybindings.click)?;
    let hold_keybindings = parse_binding_pairs(&raw_page_keybindings.hold)?;

    Ok(merge_keybinding_maps(click_keybindings, hold_keybindings))
}

fn merge_keybinding_maps<A: Clone>(
    click: HashMap<KeyEvent, A>,
    hold: HashMap<KeyEvent, A>,
) -> HashMap<KeyEvent, (A, ActionState)> {
    let mut click: HashMap<KeyEvent, (A, ActionState)> =
        click.into_iter().map(|(event, command)| (event, (command, ActionState::default()))).collect();
    for (mut key_event, action) in hold {
        click.insert(key_event, (action.clone(), ActionState::Start));
        key_event.kind = KeyEventKind::Release;
        click.insert(key_event, (action.clone(), ActionState::End));
        key_event.kind = KeyEventKind::Repeat;
        click.insert(key_event, (action.clone(), ActionState::Repeat));
    }

    click
}

pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
        return Err(format!("Unable to parse `{}`", raw));
    }
    let raw = if !raw.contains("><") {
        let raw = raw.strip_prefix('<').unwrap_or(raw);
        let raw = raw.strip_prefix('>').unwrap_or(raw);
        raw
    } else {
        raw
    };
    let raw = raw.trim_start_matches('<').trim_end_matches('>');

    let raw_lower = raw.to_ascii_lowercase();
    let (remaining, modifiers) = extract_modifiers(&raw_lower);
    parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;

    loop {
        match current {
            rest if rest.starts_with("ctrl-") => {
                modifiers.insert(KeyModifiers::CONTROL);
                current = &rest[5..];
            },
            rest if rest.starts_with("alt-") => {
                modifiers.insert(KeyModifiers::ALT);
                current = &rest[4..];
            },
            rest if rest.starts_with("shift-") => {
                modifiers.insert(KeyModifiers::SHIFT);
                current = &rest[6..];
            },
            _ => break,
        };
    }

    (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent, String> {
    let c = match raw {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        },
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        "tab" => KeyCode::Tab,
        f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(format!("Unable to parse {raw}")),
        },
        c if c.chars().count() == 1 => {
            let mut c = c.chars().next().ok_or_else(|| format!("Unable to parse {raw}"))?;
            if modifiers.contains(KeyModifiers::SHIFT) {
                c = c.to_ascii_uppercase();
            }
            KeyCode::Char(c)
        },
        _ => return Err(format!("Unable to parse {raw}")),
    };
    Ok(KeyEvent::new(c, modifiers))
}

pub fn key_event_to_string(key_event: &KeyEvent) -> String {
    let char;
    let key_code = match key_event.code {
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab => "Tab",
        KeyCode::BackTab => "BackTab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::F(c) => {
            char = format!("F{c}");
            &char
        },
        KeyCode::Char(' ') => "Space",
        KeyCode::Char(c) => {
            char = c.to_string();
            &char
        },
        KeyCode::Esc => "Esc",
        _ => "",
    };

    let mut modifiers = Vec::with_capacity(3);

    if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
        modifiers.push("Ctrl");
    }

    if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
        modifiers.push("Shift");
    }

    if key_event.modifiers.intersects(KeyModifiers::ALT) {
        modifiers.push("Alt");
    }

    let mut key = modifiers.join("-");

    if !key.is_empty() {
        key.push('-');
    }
    key.push_str(key_code);

    key
}
