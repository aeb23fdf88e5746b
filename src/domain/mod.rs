pub mod choices;
pub mod request;
pub mod schema;
pub mod validation;
