//! Authentication material for registry sessions.
//!
//! Two kinds of material flow through a resolution: the caller's
//! [`Credentials`], presented to the index, and the [`AccessTokens`] the
//! index hands back for talking to its mirrors.


/// Credentials for registry authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    /// No authentication required (anonymous access)
    #[default]
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic {
        /// Username for authentication
        username: String,
        /// Password for authentication
        password: String,
    },
}

impl Credentials {
    /// Creates anonymous credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::auth::Credentials;
    ///
    /// let creds = Credentials::anonymous();
    /// assert!(creds.to_header_value().is_none());
    /// ```
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::auth::Credentials;
    ///
    /// let creds = Credentials::basic("username", "password");
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the Authorization header value for these credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::auth::Credentials;
    ///
    /// let creds = Credentials::basic("user", "pass");
    /// assert_eq!(creds.to_header_value().as_deref(), Some("Basic dXNlcjpwYXNz"));
    /// ```
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                use base64::{Engine as _, engine::general_purpose};
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials);
                Some(format!("Basic {}", encoded))
            }
        }
    }
}

/// Tokens issued by the index in `X-Docker-Token` headers.
///
/// Mirrors expect every token back, comma-joined, in a `Token` authorization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessTokens(Vec<String>);

impl AccessTokens {
    /// Wraps the given token values, dropping blank ones.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            tokens
                .into_iter()
                .map(Into::into)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Returns true when the index issued no tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the Authorization header value for mirror requests.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtailor::auth::AccessTokens;
    ///
    /// let tokens = AccessTokens::new(["signature=abc", "repository=\"team/app\""]);
    /// assert_eq!(
    ///     tokens.to_header_value().as_deref(),
    ///     Some("Token signature=abc,repository=\"team/app\"")
    /// );
    /// ```
    pub fn to_header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(format!("Token {}", self.0.join(",")))
    }
}
