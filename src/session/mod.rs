//! Game sessions: the registry, its views, and idle eviction.

mod gc;
mod registry;
mod view;

pub use gc::spawn_garbage_collector;
pub use registry::{AiPlayerInfo, AiSettings, GameId, SessionManager};
pub use view::{GameView, ScoreView};
