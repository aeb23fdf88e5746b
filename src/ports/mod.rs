pub mod command_handler;
pub mod credential_provider;
pub mod sheet_store;
