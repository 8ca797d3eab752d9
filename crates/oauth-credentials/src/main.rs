//! OAuth credential engine - diagnostic CLI
//!
//! Computes PKCE challenges, checks verifiers, hashes scopes, evaluates token
//! validity and resolves partitioned token tables with the engine's own rules.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use oauth_credentials::config::Config;
use oauth_credentials::models::AccessTokenRecord;
use oauth_credentials::oauth::{PkcePolicy, TokenLifecycleCalculator, partition, pkce, scope};

#[derive(Parser, Debug)]
#[command(name = "oauth-credentials")]
#[command(about = "Inspect OAuth 2.0 credentials, PKCE parameters and token lifetimes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Clock skew in seconds (overrides OAUTH_TIMESTAMP_SKEW_SECS)
    #[arg(long, global = true)]
    skew_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the S256 challenge for a code verifier
    Challenge {
        verifier: String,
    },
    /// Verify a code verifier against a stored challenge
    Verify {
        #[arg(long)]
        challenge: Option<String>,
        #[arg(long)]
        verifier: Option<String>,
        /// plain or S256 (absent means plain)
        #[arg(long)]
        method: Option<String>,
        /// The application requires PKCE
        #[arg(long)]
        mandatory: bool,
        /// The application accepts the plain method
        #[arg(long)]
        allow_plain: bool,
    },
    /// Canonicalize and hash a space-delimited scope string
    Scopes {
        scope: String,
    },
    /// Remaining validity of a token
    Validity {
        /// Issue time, RFC 3339
        #[arg(long)]
        issued_at: DateTime<Utc>,
        /// Access token lifetime in seconds, negative for infinite
        #[arg(long, allow_hyphen_values = true)]
        validity_secs: i64,
        /// Refresh token lifetime in seconds, negative for infinite
        #[arg(long, allow_hyphen_values = true)]
        refresh_validity_secs: i64,
        /// Refresh token issue time, RFC 3339 (defaults to --issued-at)
        #[arg(long)]
        refresh_issued_at: Option<DateTime<Utc>>,
        /// Evaluation time, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Resolve the token table of a user id or encoded access token
    Partition {
        #[arg(long, conflicts_with = "access_token", required_unless_present = "access_token")]
        user_id: Option<String>,
        #[arg(long)]
        access_token: Option<String>,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

fn emit(json: bool, value: &serde_json::Value, text: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}

fn secs(secs: i64) -> anyhow::Result<TimeDelta> {
    TimeDelta::try_seconds(secs).with_context(|| format!("{secs} seconds is out of range"))
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(skew) = cli.skew_secs {
        config.timestamp_skew = Duration::from_secs(skew);
    }
    tracing::debug!(skew = ?config.timestamp_skew, pkce_enabled = config.pkce_enabled, "Loaded configuration");

    match cli.command {
        Command::Challenge { verifier } => {
            if !pkce::is_valid_verifier(&verifier) {
                anyhow::bail!("code verifier is not up to RFC 7636 specifications");
            }
            let challenge = pkce::compute_s256_challenge(&verifier);
            emit(cli.json, &json!({ "code_challenge": challenge, "method": "S256" }), &challenge)?;
        }
        Command::Verify { challenge, verifier, method, mandatory, allow_plain } => {
            let policy = PkcePolicy { pkce_enabled: config.pkce_enabled, pkce_mandatory: mandatory, allow_plain };
            let outcome = pkce::verify(challenge.as_deref(), verifier.as_deref(), method.as_deref(), &policy);
            let (value, text) = match outcome {
                Ok(valid) => (json!({ "valid": valid }), if valid { "valid" } else { "mismatch" }.to_string()),
                Err(e) => (json!({ "valid": false, "error": e.error_code(), "message": e.to_string() }), e.to_string()),
            };
            emit(cli.json, &value, &text)?;
        }
        Command::Scopes { scope: raw } => {
            let scopes = scope::parse(Some(&raw));
            let canonical = scope::canonicalize(Some(scopes.as_slice())).unwrap_or_default();
            let hash = scope::hash(Some(scopes.as_slice())).unwrap_or_default();
            let openid = scope::is_oidc_request(&scopes);
            emit(
                cli.json,
                &json!({ "canonical": canonical, "hash": hash, "openid": openid }),
                &format!("{canonical}\n{hash}"),
            )?;
        }
        Command::Validity { issued_at, validity_secs, refresh_validity_secs, refresh_issued_at, now } => {
            let record = AccessTokenRecord::new("cli", "cli", issued_at, secs(validity_secs)?, secs(refresh_validity_secs)?)
                .with_refresh_issued_at(refresh_issued_at.unwrap_or(issued_at));
            let now = now.unwrap_or_else(Utc::now);
            let calculator = TokenLifecycleCalculator::from_config(&config)?;

            let access = calculator.remaining_access_validity(&record, now)?.as_millis();
            let refresh = calculator.remaining_refresh_validity(&record, now)?.as_millis();
            let expiry = calculator.access_token_expiry(&record, now)?.as_millis();
            emit(
                cli.json,
                &json!({ "access_ms": access, "refresh_ms": refresh, "access_expiry_ms": expiry }),
                &format!("access: {access} ms\nrefresh: {refresh} ms\naccess expiry: {expiry} ms"),
            )?;
        }
        Command::Partition { user_id, access_token } => {
            let mappings = config.domain_mappings()?;
            let user_id = match (user_id, access_token) {
                (Some(id), _) => Some(id),
                (None, Some(token)) => partition::user_id_from_access_token(&token),
                (None, None) => None,
            };
            let table = user_id.as_deref().map_or_else(
                || oauth_credentials::config::defaults::ACCESS_TOKEN_STORE_TABLE.to_string(),
                |id| mappings.token_store_table(id),
            );
            let domain = user_id.as_deref().and_then(|id| mappings.user_store_domain(id));
            emit(
                cli.json,
                &json!({ "user_id": user_id, "user_store_domain": domain, "table": table }),
                &table,
            )?;
        }
    }

    Ok(())
}
