use ratatui::style::Color;

pub const TICK_INTERVAL_MS: u64 = 20;

pub const FALL_RATE: f64 = 0.33;
pub const JUMP_BOOST: f64 = 6.6;
pub const SCROLL_RATE: f64 = 0.33;

pub const BIRD_START_VERTICAL: f64 = 58.3;
pub const BIRD_START_HORIZONTAL: f64 = 37.5;
pub const BIRD_HEIGHT: f64 = 8.3;
pub const BIRD_WIDTH: f64 = 12.5;

pub const OBSTACLE_HEIGHT: f64 = 50.0;
pub const OBSTACLE_WIDTH: f64 = 15.0;
// Offsets are drawn as `max - U(0, span)`, i.e. from (-16.7, 16.6].
pub const OBSTACLE_OFFSET_MAX: f64 = 16.6;
pub const OBSTACLE_OFFSET_SPAN: f64 = 33.3;
pub const PAIR_OFFSET: f64 = 75.0;
pub const OBSTACLE_SPAWN_HORIZONTAL: f64 = 100.0;
pub const OBSTACLE_RECYCLE_THRESHOLD: f64 = -12.5;
pub const SPAWN_TRIGGER: f64 = 37.5;

pub const GROUND_TILE_WIDTH: f64 = 100.0;
pub const GROUND_SPAWN_HORIZONTAL: f64 = 100.0;
pub const GROUND_RECYCLE_THRESHOLD: f64 = -100.0;
pub const GROUND_LINE: f64 = 16.6;
pub const GROUND_SEGMENTS: usize = 2;

pub const STARTING_HEALTH: u8 = 3;
pub const HEALTH_WARNING: u8 = 2;

pub const BIRD_GLYPH: &str = ">o)";
pub const BIRD_COLOR: Color = Color::Yellow;
pub const OBSTACLE_COLOR: Color = Color::LightGreen;
pub const OBSTACLE_EDGE_COLOR: Color = Color::Green;
pub const GROUND_COLOR: Color = Color::Rgb(222, 216, 149);
pub const GROUND_EDGE_COLOR: Color = Color::Rgb(115, 191, 46);
pub const SKY_COLOR: Color = Color::Rgb(112, 197, 206);

pub const HEALTHY_COLOR: Color = Color::Rgb(0, 238, 20);
pub const WARNING_COLOR: Color = Color::Rgb(255, 165, 0);
pub const CRITICAL_COLOR: Color = Color::Red;
// Health bar cells per health point.
pub const HEALTH_BAR_SCALE: u16 = 2;
