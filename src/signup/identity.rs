//! Identity endpoint client.
//!
//! One URL, three calls:
//!
//! | Call            | Request                                   | Success        |
//! |-----------------|-------------------------------------------|----------------|
//! | `check_session` | `GET`, `Authorization: Basic <token>`     | any 2xx        |
//! | `login`         | `GET`, basic auth `email:password`        | 2xx + X-Token  |
//! | `register`      | `PUT`, JSON `{email, password}`           | 2xx + X-Token  |

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Response header carrying the session token.
pub const TOKEN_HEADER: &str = "X-Token";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("credentials rejected ({0})")]
    Rejected(StatusCode),

    #[error("identity service error ({status}): {message}")]
    Service { status: StatusCode, message: String },

    #[error("response has no X-Token header")]
    MissingToken,
}

#[allow(async_fn_in_trait)]
pub trait IdentityClient {
    /// Whether the service still honors `token`.
    async fn check_session(&self, token: &str) -> Result<(), IdentityError>;

    /// Authenticate existing credentials. Returns the session token.
    async fn login(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Create an account. Returns the session token.
    async fn register(&self, email: &str, password: &str) -> Result<String, IdentityError>;
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ServiceError {
    message: Option<String>,
}

/// [`IdentityClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    client: Client,
    endpoint: String,
}

impl HttpIdentityClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .user_agent(concat!("lander/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IdentityClient for HttpIdentityClient {
    async fn check_session(&self, token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("Basic {token}"))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(IdentityError::Rejected(response.status()));
        }
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let response = self
            .client
            .get(&self.endpoint)
            .basic_auth(email, Some(password))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(IdentityError::Rejected(response.status()));
        }
        token(response.headers())
    }

    async fn register(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let response = self
            .client
            .put(&self.endpoint)
            .json(&RegisterRequest { email, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(service_error(response).await);
        }
        token(response.headers())
    }
}

fn token(headers: &HeaderMap) -> Result<String, IdentityError> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(IdentityError::MissingToken)
}

/// Read `{message}` from an error body, falling back to a generic message.
async fn service_error(response: Response) -> IdentityError {
    let status = response.status();
    let message = response
        .json::<ServiceError>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "Registration failed".to_string());
    IdentityError::Service { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread::JoinHandle;
    use tiny_http::{Header, Response as MockResponse, Server};

    /// What the mock endpoint saw.
    #[derive(Debug)]
    struct Seen {
        method: String,
        authorization: Option<String>,
        body: String,
    }

    /// Serve one request with `status`, optional token and body.
    fn mock(status: u16, token: Option<&'static str>, body: &'static str) -> (String, JoinHandle<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let authorization = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            let mut seen_body = String::new();
            request.as_reader().read_to_string(&mut seen_body).unwrap();
            let seen = Seen {
                method: request.method().as_str().to_string(),
                authorization,
                body: seen_body,
            };

            let mut response = MockResponse::from_string(body).with_status_code(status);
            if let Some(token) = token {
                response.add_header(Header::from_bytes(&b"X-Token"[..], token.as_bytes()).unwrap());
            }
            request.respond(response).unwrap();
            seen
        });
        (format!("http://127.0.0.1:{port}/identity"), handle)
    }

    #[tokio::test]
    async fn test_login_sends_basic_auth() {
        let (url, server) = mock(200, Some("tok-1"), "");
        let client = HttpIdentityClient::new(url).unwrap();

        let token = client.login("user@example.com", "password1").await.unwrap();
        assert_eq!(token, "tok-1");

        let seen = server.join().unwrap();
        assert_eq!(seen.method, "GET");
        // base64("user@example.com:password1")
        assert_eq!(
            seen.authorization.as_deref(),
            Some("Basic dXNlckBleGFtcGxlLmNvbTpwYXNzd29yZDE=")
        );
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (url, server) = mock(401, None, "");
        let client = HttpIdentityClient::new(url).unwrap();
        let err = client.login("user@example.com", "password1").await.unwrap_err();
        assert!(matches!(err, IdentityError::Rejected(StatusCode::UNAUTHORIZED)));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_success_without_token_is_error() {
        let (url, server) = mock(200, None, "");
        let client = HttpIdentityClient::new(url).unwrap();
        let err = client.login("user@example.com", "password1").await.unwrap_err();
        assert!(matches!(err, IdentityError::MissingToken));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_register_sends_json() {
        let (url, server) = mock(201, Some("tok-2"), "");
        let client = HttpIdentityClient::new(url).unwrap();
        let token = client.register("user@example.com", "password1").await.unwrap();
        assert_eq!(token, "tok-2");

        let seen = server.join().unwrap();
        assert_eq!(seen.method, "PUT");
        let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(body["email"], "user@example.com");
        assert_eq!(body["password"], "password1");
    }

    #[tokio::test]
    async fn test_register_error_message() {
        let (url, server) = mock(409, None, r#"{"message":"Email already taken"}"#);
        let client = HttpIdentityClient::new(url).unwrap();
        match client.register("user@example.com", "password1").await.unwrap_err() {
            IdentityError::Service { status, message } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(message, "Email already taken");
            }
            other => panic!("unexpected error: {other}"),
        }
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_check_session_sends_token() {
        let (url, server) = mock(204, None, "");
        let client = HttpIdentityClient::new(url).unwrap();
        client.check_session("stored-token").await.unwrap();
        let seen = server.join().unwrap();
        assert_eq!(seen.authorization.as_deref(), Some("Basic stored-token"));
    }
}
