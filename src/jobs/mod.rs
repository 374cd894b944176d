pub mod price_sync;
