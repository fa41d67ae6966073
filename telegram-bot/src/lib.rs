//! Telegram front end: configuration, keyboards, handlers, the chat
//! service and the dispatcher.

pub mod admin_state;
pub mod config;
pub mod handlers;
pub mod keyboards;
pub mod messages;
pub mod runner;
pub mod service;
