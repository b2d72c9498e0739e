use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum GameAction {
    Jump,
    Restart,
    /// Emitted by the tick timer; carries the timer generation that produced it.
    Tick(u64),
}
