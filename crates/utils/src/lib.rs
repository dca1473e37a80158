pub mod quotes;

pub use quotes::QuoteClient;
