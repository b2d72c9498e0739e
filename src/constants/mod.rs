pub mod game;

pub const WIDTH: u16 = 96;
pub const HEIGHT: u16 = 32;

pub const TITLE_TEXT: &str = r#"
 _____ _
|  ___| | __ _ _ __  _ __  _   _
| |_  | |/ _` | '_ \| '_ \| | | |
|  _| | | (_| | |_) | |_) | |_| |
|_|   |_|\__,_| .__/| .__/ \__, |
              |_|   |_|    |___/
"#;

pub const INSTRUCTIONS: &str = "Press SPACE or tap the screen to jump.";
