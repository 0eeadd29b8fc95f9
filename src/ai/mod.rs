//! AI players: in-process strategies, external processes, and the catalog
//! that names them.

mod catalog;
mod driver;
mod process;
mod protocol;
mod search;
mod seat;
mod strategy;

pub use catalog::{AiCatalog, AiPlayerDescriptor, StrategySpec};
pub use driver::run_player;
pub use process::ProcessPlayer;
pub use protocol::{
    MAX_LINE_LEN, PING, PONG, decode_reply, decode_request, encode_reply, encode_request, read_line,
};
pub use search::{AlphaBetaStrategy, Evaluation};
pub use seat::AiSeat;
pub use strategy::{RandomStrategy, Strategy};
