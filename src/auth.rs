//! Google OAuth2 authorization-code flow and profile lookup.

use anyhow::{bail, Context, Result};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::session::{MailboxCredential, OwnerProfile};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Full mailbox access plus enough profile to show who is logged in.
const SCOPES: &[&str] = &[
    "https://mail.google.com/",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

fn build_client(config: &GoogleConfig) -> Result<BasicClient> {
    let client = BasicClient::new(
        ClientId::new(config.client_id.clone()),
        Some(ClientSecret::new(config.client_secret.clone())),
        AuthUrl::new(AUTH_URL.to_string()).context("Invalid Google auth URL")?,
        Some(TokenUrl::new(TOKEN_URL.to_string()).context("Invalid Google token URL")?),
    )
    .set_redirect_uri(
        RedirectUrl::new(config.redirect_uri.clone())
            .with_context(|| format!("Invalid redirect URI: {}", config.redirect_uri))?,
    );

    Ok(client)
}

/// Build the consent-screen URL the frontend sends the user to.
// TODO: persist the state parameter and verify it in the callback once the
// frontend echoes it back.
pub fn authorization_url(config: &GoogleConfig, force_account_selection: bool) -> Result<String> {
    let client = build_client(config)?;

    let mut request = client
        .authorize_url(CsrfToken::new_random)
        .add_extra_param("access_type", "offline");
    for scope in SCOPES {
        request = request.add_scope(Scope::new((*scope).to_string()));
    }
    if force_account_selection {
        request = request.add_extra_param("prompt", "select_account");
    }

    let (url, _csrf) = request.url();
    Ok(url.to_string())
}

/// Exchange the callback code for tokens and load the user's profile.
pub async fn complete_login(
    config: &GoogleConfig,
    http: &reqwest::Client,
    code: String,
) -> Result<(OwnerProfile, MailboxCredential)> {
    let client = build_client(config)?;

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await
        .context("OAuth code exchange failed")?;

    let access_token = token.access_token().secret().to_string();
    let owner = fetch_profile(http, &access_token).await?;

    Ok((owner, MailboxCredential { access_token }))
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: String,
}

async fn fetch_profile(http: &reqwest::Client, access_token: &str) -> Result<OwnerProfile> {
    let response = http
        .get(USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .context("Userinfo request failed")?;

    if !response.status().is_success() {
        bail!("Userinfo request failed with status {}", response.status());
    }

    let info: UserInfo = response
        .json()
        .await
        .context("Failed to parse userinfo response")?;

    Ok(OwnerProfile {
        email: info.email,
        name: info.name,
        picture: info.picture,
    })
}
