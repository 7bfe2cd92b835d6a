// Wren - terminal chat with in-band command execution
// Library exports

pub mod api;
pub mod chat;
pub mod cli;
pub mod command;
pub mod config;
pub mod context;
