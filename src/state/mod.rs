pub mod market_store;
pub mod notifier;

pub use market_store::MarketStore;
pub use notifier::ChangeNotifier;
