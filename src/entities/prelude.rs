pub use super::crypto_prices::Entity as CryptoPrices;
pub use super::cryptocurrencies::Entity as Cryptocurrencies;
