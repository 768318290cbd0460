use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Scopes requested from the identity provider when `OAUTH2_SCOPES` is not set.
pub const DEFAULT_SCOPES: &str = "openid profile email \
    https://www.googleapis.com/auth/user.birthday.read \
    https://www.googleapis.com/auth/user.gender.read";

/// Google People API endpoint returning the signed-in user's genders and birthdays.
pub const DEFAULT_PROFILE_API_URL: &str =
    "https://people.googleapis.com/v1/people/me?personFields=genders,birthdays";

/// Browsers cap cookie lifetimes at 400 days.
pub const MAX_SESSION_EXPIRY_SECONDS: u64 = 400 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Secret key material used to sign the session cookie
    #[arg(long, env = "FLASK_SECRET", hide_env_values = true)]
    session_secret: String,

    /// The OAuth 2.0 client ID registered with the identity provider
    #[arg(long, env = "OAUTH2_CLIENT_ID")]
    client_id: String,

    /// The OAuth 2.0 client secret registered with the identity provider
    #[arg(long, env = "OAUTH2_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// URL of the identity provider's OpenID discovery document
    #[arg(long, env = "OAUTH2_META_URL")]
    metadata_url: String,

    /// Space separated list of scopes to request during authorization
    #[arg(long, env = "OAUTH2_SCOPES", value_delimiter = ' ', default_value = DEFAULT_SCOPES)]
    pub scopes: Vec<String>,

    /// The profile endpoint called with the user's access token after sign-in
    #[arg(long, env = "PROFILE_API_URL", default_value = DEFAULT_PROFILE_API_URL)]
    profile_api_url: String,

    /// Public base URL of this application, used to build the OAuth callback URL.
    /// Defaults to http://localhost:<port>.
    #[arg(long, env = "EXTERNAL_URL")]
    external_url: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env = "INTERFACE", default_value = "0.0.0.0")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env = "FLASK_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Session lifetime in seconds (default: 24 hours = 86400 seconds, at most 400 days)
    #[arg(
        long,
        env,
        default_value_t = 86400,
        value_parser = clap::value_parser!(u64).range(1..=MAX_SESSION_EXPIRY_SECONDS),
    )]
    pub session_expiry_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn session_secret(&self) -> &str {
        &self.session_secret
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn metadata_url(&self) -> &str {
        &self.metadata_url
    }

    /// Returns the profile API URL called after a successful code exchange.
    pub fn profile_api_url(&self) -> &str {
        &self.profile_api_url
    }

    /// Returns the public base URL without a trailing slash.
    pub fn external_url(&self) -> String {
        match &self.external_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }

    pub fn set_external_url(mut self, external_url: String) -> Self {
        self.external_url = Some(external_url);
        self
    }

    pub fn set_metadata_url(mut self, metadata_url: String) -> Self {
        self.metadata_url = metadata_url;
        self
    }

    pub fn set_profile_api_url(mut self, profile_api_url: String) -> Self {
        self.profile_api_url = profile_api_url;
        self
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(extra: &[&str]) -> Config {
        let mut args = vec![
            "profile_login",
            "--session-secret",
            "not-so-secret",
            "--client-id",
            "client-123",
            "--client-secret",
            "shh",
            "--metadata-url",
            "https://accounts.example.com/.well-known/openid-configuration",
        ];
        args.extend_from_slice(extra);
        Config::parse_from(args)
    }

    #[test]
    fn test_defaults_match_the_google_setup() {
        let config = parse(&[]);

        assert_eq!(config.port, 5000);
        assert_eq!(config.interface, "0.0.0.0");
        assert_eq!(config.profile_api_url(), DEFAULT_PROFILE_API_URL);
        assert_eq!(
            config.scopes,
            vec![
                "openid",
                "profile",
                "email",
                "https://www.googleapis.com/auth/user.birthday.read",
                "https://www.googleapis.com/auth/user.gender.read",
            ]
        );
        assert_eq!(config.runtime_env(), RustEnv::Development);
        assert!(!config.is_production());
    }

    #[test]
    fn test_external_url_defaults_to_localhost_and_port() {
        let config = parse(&["--port", "8080"]);
        assert_eq!(config.external_url(), "http://localhost:8080");
    }

    #[test]
    fn test_external_url_trims_trailing_slash() {
        let config = parse(&["--external-url", "https://login.example.com/"]);
        assert_eq!(config.external_url(), "https://login.example.com");
    }

    #[test]
    fn test_scopes_are_space_separated() {
        let config = parse(&["--scopes", "openid email"]);
        assert_eq!(config.scopes, vec!["openid", "email"]);
    }

    #[test]
    fn test_runtime_env_is_case_insensitive() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn test_session_expiry_is_bounded() {
        assert_eq!(parse(&[]).session_expiry_seconds, 86400);
        assert!(Config::try_parse_from([
            "profile_login",
            "--session-secret",
            "s",
            "--client-id",
            "client-123",
            "--client-secret",
            "shh",
            "--metadata-url",
            "https://accounts.example.com",
            "--session-expiry-seconds",
            "9223372036854775808",
        ])
        .is_err());
        assert_eq!(
            parse(&["--session-expiry-seconds", "34560000"]).session_expiry_seconds,
            MAX_SESSION_EXPIRY_SECONDS
        );
    }

    #[test]
    fn test_environment_variable_names() {
        let command = Config::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|env| env.to_str())
                .map(str::to_string)
        };

        assert_eq!(env_of("session_secret").as_deref(), Some("FLASK_SECRET"));
        assert_eq!(env_of("client_id").as_deref(), Some("OAUTH2_CLIENT_ID"));
        assert_eq!(env_of("client_secret").as_deref(), Some("OAUTH2_CLIENT_SECRET"));
        assert_eq!(env_of("metadata_url").as_deref(), Some("OAUTH2_META_URL"));
        assert_eq!(env_of("port").as_deref(), Some("FLASK_PORT"));
        assert_eq!(
            env_of("session_expiry_seconds").as_deref(),
            Some("SESSION_EXPIRY_SECONDS")
        );
    }

    #[test]
    fn test_missing_client_id_is_rejected() {
        let result = Config::try_parse_from([
            "profile_login",
            "--session-secret",
            "s",
            "--client-secret",
            "shh",
            "--metadata-url",
            "https://accounts.example.com",
        ]);
        assert!(result.is_err());
    }
}
