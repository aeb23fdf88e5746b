pub mod auth;
pub mod http_client;
pub mod sheet_client;
pub mod spreadsheet_locator;
pub mod value_range_factory;
