pub mod currency_client;
pub mod reports;
