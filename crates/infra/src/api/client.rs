//! Bitbucket API client
//!
//! Entry point for callers: owns the configuration, the transport and the
//! authenticator of one session, and exposes typed lookups and paginated
//! collections on top of them.
//!
//! Every resource request goes through [`Authenticator::authenticate_request`]
//! before it reaches the transport. A 404 on a single resource is reported as
//! `Ok(None)`; every other non-success status is an error.

use std::sync::Arc;

use bitbucket_common::auth::{Authenticator, CredentialState, Grant, OAuthClient, OAuthConfig};
use bitbucket_common::http::{HttpRequest, HttpResponse, HttpTransport};
use bitbucket_common::time::{Clock, SystemClock};
use bitbucket_domain::{
    decode, Account, ClientConfig, DecodeError, Issue, Repository, Resource, TeamAccount,
    UserAccount,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::{ApiError, ApiResult};
use super::pagination::{PageFetcher, PaginatedSequence};

/// Longest response body kept in a [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Blocking Bitbucket Cloud 2.0 client.
///
/// Cheap accessors borrow; collection calls return a [`PaginatedSequence`]
/// that borrows the client, so a client can serve many sequences at once.
pub struct BitbucketClient<T, C = SystemClock> {
    config: ClientConfig,
    api_base: Url,
    transport: Arc<T>,
    auth: Authenticator<OAuthClient<Arc<T>>, C>,
}

impl<T: HttpTransport> BitbucketClient<T> {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the configuration does not validate.
    pub fn new(config: ClientConfig, transport: T) -> ApiResult<Self> {
        Self::with_clock(config, transport, SystemClock)
    }
}

impl<T: HttpTransport, C: Clock> BitbucketClient<T, C> {
    /// Create a client whose token expiry is judged by `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the configuration does not validate.
    pub fn with_clock(config: ClientConfig, transport: T, clock: C) -> ApiResult<Self> {
        config.validate()?;
        let api_base = config.api_base_url()?;
        let oauth = OAuthConfig::new(
            config.token_endpoint()?,
            config.client_id.clone(),
            config.client_secret.clone(),
        );

        let transport = Arc::new(transport);
        let auth = Authenticator::with_clock(
            OAuthClient::new(oauth, Arc::clone(&transport)),
            api_base.as_str(),
            clock,
        );

        info!(api_base = %api_base, "Bitbucket client configured");
        Ok(Self { config, api_base, transport, auth })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// The session's authenticator, for token persistence and refresh
    /// listeners.
    pub const fn authenticator(&self) -> &Authenticator<OAuthClient<Arc<T>>, C> {
        &self.auth
    }

    // --- session -----------------------------------------------------------

    /// Log in with the resource owner password grant.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] if the server rejects the credentials,
    /// [`ApiError::TokenEndpointUnreachable`] if it cannot be reached.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> ApiResult<CredentialState> {
        let grant = Grant::Password { username: username.to_string(), password: password.to_string() };
        let credentials = self.auth.request_token(&grant)?;
        info!("logged in with password grant");
        Ok(credentials)
    }

    /// Exchange an authorization code obtained through
    /// [`authorization_url`](Self::authorization_url).
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login).
    #[instrument(skip(self, code))]
    pub fn login_with_authorization_code(
        &self,
        code: &str,
        redirect_uri: Option<Url>,
    ) -> ApiResult<CredentialState> {
        let grant = Grant::AuthorizationCode { code: code.to_string(), redirect_uri };
        let credentials = self.auth.request_token(&grant)?;
        info!("logged in with authorization code");
        Ok(credentials)
    }

    /// Browser URL that starts the authorization-code flow.
    ///
    /// # Errors
    ///
    /// [`ApiError::Config`] without a configured client id.
    pub fn authorization_url(&self, state: Option<&str>) -> ApiResult<Url> {
        Ok(self.config.authorization_url(state)?)
    }

    /// Forget all tokens. No network traffic.
    pub fn logout(&self) {
        self.auth.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    // --- single resources --------------------------------------------------

    /// `GET /users/{name}`
    ///
    /// # Errors
    ///
    /// Request, status or decode failures; a missing user is `Ok(None)`.
    pub fn get_user(&self, name: &str) -> ApiResult<Option<UserAccount>> {
        self.get_resource(&format!("users/{}", encode_segment(name)?))
    }

    /// `GET /teams/{name}`
    ///
    /// # Errors
    ///
    /// Same as [`get_user`](Self::get_user).
    pub fn get_team(&self, name: &str) -> ApiResult<Option<TeamAccount>> {
        self.get_resource(&format!("teams/{}", encode_segment(name)?))
    }

    /// Account lookup accepting either a user or a team document.
    ///
    /// # Errors
    ///
    /// Same as [`get_user`](Self::get_user).
    pub fn get_account(&self, name: &str) -> ApiResult<Option<Account>> {
        self.get_resource(&format!("users/{}", encode_segment(name)?))
    }

    /// `GET /repositories/{owner}/{slug}`
    ///
    /// # Errors
    ///
    /// Same as [`get_user`](Self::get_user).
    pub fn get_repository(&self, full_name: &str) -> ApiResult<Option<Repository>> {
        self.get_resource(&format!("repositories/{}", encode_full_name(full_name)?))
    }

    /// `GET /repositories/{owner}/{slug}/issues/{id}`
    ///
    /// # Errors
    ///
    /// Same as [`get_user`](Self::get_user).
    pub fn get_issue(&self, full_name: &str, id: u64) -> ApiResult<Option<Issue>> {
        self.get_resource(&format!("repositories/{}/issues/{id}", encode_full_name(full_name)?))
    }

    // --- collections -------------------------------------------------------

    /// Issues of a repository, optionally filtered with a query (`q`).
    ///
    /// Nothing is fetched until the sequence is read.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] if the endpoint URL cannot be built.
    pub fn get_issues(&self, full_name: &str, filter: Option<&str>) -> ApiResult<PaginatedSequence<'_, Issue>> {
        let url = self.endpoint(&format!("repositories/{}/issues", encode_full_name(full_name)?))?;
        Ok(PaginatedSequence::new(self, with_filter(url, filter)))
    }

    /// Repositories owned by a user or team.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] if the endpoint URL cannot be built.
    pub fn repositories(&self, owner: &str) -> ApiResult<PaginatedSequence<'_, Repository>> {
        let url = self.endpoint(&format!("repositories/{}", encode_segment(owner)?))?;
        Ok(PaginatedSequence::new(self, url))
    }

    /// Issues of an already decoded repository, following its `issues` link
    /// when the server supplied one.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] if the repository has neither an issues link
    /// nor a full name.
    pub fn repository_issues(
        &self,
        repository: &Repository,
        filter: Option<&str>,
    ) -> ApiResult<PaginatedSequence<'_, Issue>> {
        if let Some(link) = repository.issues_link() {
            return Ok(PaginatedSequence::new(self, with_filter(link.clone(), filter)));
        }
        match repository.full_name.as_deref() {
            Some(full_name) => self.get_issues(full_name, filter),
            None => Err(ApiError::InvalidUrl {
                url: String::new(),
                reason: "repository has neither an issues link nor a full name".to_string(),
            }),
        }
    }

    // --- raw access --------------------------------------------------------

    /// Authenticated GET of any JSON document. 404 is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Transport failures, refresh failures, non-success statuses other than
    /// 404, and bodies that are not JSON.
    pub fn get_json(&self, url: &Url) -> ApiResult<Option<Value>> {
        let response = self.send_get(url)?;
        if response.is_not_found() {
            debug!(%url, "resource not found");
            return Ok(None);
        }
        check_status(url, &response)?;
        parse_json(&response).map(Some)
    }

    fn get_resource<R: Resource>(&self, path: &str) -> ApiResult<Option<R>> {
        let url = self.endpoint(path)?;
        match self.get_json(&url)? {
            Some(document) => Ok(Some(decode(&document)?)),
            None => Ok(None),
        }
    }

    fn send_get(&self, url: &Url) -> ApiResult<HttpResponse> {
        let mut request = HttpRequest::get(url.clone());
        self.auth.authenticate_request(&mut request)?;
        Ok(self.transport.execute(request)?)
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.api_base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl { url: path.to_string(), reason: err.to_string() })
    }
}

impl<T: HttpTransport, C: Clock> PageFetcher for BitbucketClient<T, C> {
    fn fetch_page(&self, url: &Url) -> ApiResult<Value> {
        let response = self.send_get(url)?;
        if response.is_not_found() {
            warn!(%url, "page not found");
            return Err(ApiError::MalformedPage {
                url: url.to_string(),
                reason: "page not found (HTTP 404)".to_string(),
            });
        }
        check_status(url, &response)?;
        parse_json(&response).map_err(|err| ApiError::MalformedPage {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

fn check_status(url: &Url, response: &HttpResponse) -> ApiResult<()> {
    if response.is_success() {
        return Ok(());
    }
    warn!(%url, status = response.status, "request failed");
    let body: String = response.body.chars().take(MAX_ERROR_BODY).collect();
    Err(ApiError::Status { status: response.status, url: url.to_string(), body })
}

fn parse_json(response: &HttpResponse) -> ApiResult<Value> {
    response.json::<Value>().map_err(|err| {
        ApiError::Decode(DecodeError::MalformedField {
            path: "$".to_string(),
            expected: "JSON document",
            found: err.to_string(),
        })
    })
}

/// Percent-encode one path segment. Empty and dot segments are rejected,
/// since `Url::join` would resolve them against the API base.
fn encode_segment(segment: &str) -> ApiResult<String> {
    if matches!(segment, "" | "." | "..") {
        return Err(ApiError::InvalidUrl {
            url: segment.to_string(),
            reason: "empty or dot path segment".to_string(),
        });
    }
    Ok(urlencoding::encode(segment).into_owned())
}

/// Percent-encode each segment of `owner/slug`, keeping the separator.
fn encode_full_name(full_name: &str) -> ApiResult<String> {
    Ok(full_name.split('/').map(encode_segment).collect::<ApiResult<Vec<_>>>()?.join("/"))
}

fn with_filter(mut url: Url, filter: Option<&str>) -> Url {
    if let Some(query) = filter {
        url.query_pairs_mut().append_pair("q", query);
    }
    url
}
