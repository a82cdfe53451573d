//! External collaborators: market data and messaging.

pub mod market_data;
pub mod messaging;
pub mod telegram;
pub mod yahoo;

pub use market_data::{MarketDataError, MarketDataProvider};
pub use messaging::{InboundMessage, MessagingTransport, TransportError};
pub use telegram::TelegramTransport;
pub use yahoo::YahooChartProvider;
