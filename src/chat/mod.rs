// Conversation core: history, directive parsing, the turn state machine

pub mod conversation;
pub mod directive;
pub mod turn;

pub use conversation::{Conversation, Message};
pub use turn::{TurnController, TurnOutcome};
