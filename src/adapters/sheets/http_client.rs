use error_stack::ResultExt;
use google_sheets4::{hyper, hyper_rustls};

use crate::error::InfrastructureError;

pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;
pub type HttpClient = hyper::Client<HttpsConnector>;

/// HTTPS client trusting the platform's root certificates. Fails when the
/// host has no usable CA store.
pub fn http_client() -> error_stack::Result<HttpClient, InfrastructureError> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .change_context(InfrastructureError::Connection)
        .attach_printable("could not load the native root certificates")?
        .https_only()
        .enable_http1()
        .build();
    Ok(hyper::Client::builder().build(connector))
}
