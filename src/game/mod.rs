// Price-guessing game logic: round session, closest-match resolution,
// and the board projection consumed by the TUI.

pub mod board;
pub mod resolver;
pub mod session;
