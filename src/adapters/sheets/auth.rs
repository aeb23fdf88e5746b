use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::instrument;

use crate::error::InfrastructureError;
use crate::ports::credential_provider::CredentialBundle;

use super::http_client::{HttpClient, HttpsConnector};

pub type SheetsAuthenticator = Authenticator<HttpsConnector>;

#[instrument(skip(client))]
pub async fn auth(
    bundle: &CredentialBundle,
    client: HttpClient,
) -> error_stack::Result<SheetsAuthenticator, InfrastructureError> {
    let secret: oauth2::ServiceAccountKey = oauth2::parse_service_account_key(bundle.to_json())
        .change_context(InfrastructureError::Auth)
        .attach_printable("service account key is malformed")?;

    let client_email = secret.client_email.clone();

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(InfrastructureError::Auth)
        .attach_printable_lazy(|| {
            format!("could not create an authenticator for '{}'", client_email)
        })
}
