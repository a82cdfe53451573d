//! Core application primitives (snapshot builder, command channel, monitor loop)

pub mod alerts;
pub mod board;
pub mod commands;
pub mod http;
pub mod monitor;
pub mod snapshot;

pub use board::SnapshotBoard;
pub use commands::{ChannelState, Command, CommandChannel, CommandCursor, PollReport};
pub use monitor::{ControlIntent, MonitorLoop, RunState, TickReport};
pub use snapshot::{MarketSnapshot, MarketSnapshotBuilder, SkipReason, SkippedSymbol, SymbolOutcome};
