//! Telegram Bot API messaging transport

pub mod client;
pub mod messages;

pub use client::TelegramTransport;
