//! Yahoo Finance chart API market data provider

pub mod client;
pub mod messages;

pub use client::YahooChartProvider;
