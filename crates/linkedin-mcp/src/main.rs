use clap::Parser;
use linkedin_auth::{
    ClientIdentity, CredentialManager, HttpTokenEndpoint, CLIENT_ID_ENV, CLIENT_SECRET_ENV,
    DEFAULT_AUTH_BASE,
};
use linkedin_client::{ClientConfig, LinkedInClient, DEFAULT_API_BASE};
use linkedin_server::{register_linkedin_tools, McpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const SERVER_INSTRUCTIONS: &str = "Search LinkedIn people and jobs, look up profiles, \
    send messages and inspect network statistics.";

#[derive(Parser, Debug)]
#[command(
    name = "linkedin-mcp",
    about = "LinkedIn MCP Server - Expose LinkedIn data operations as MCP tools over stdio",
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// LinkedIn OAuth client id
    #[arg(long, env = CLIENT_ID_ENV)]
    client_id: Option<String>,

    /// LinkedIn OAuth client secret
    #[arg(long, env = CLIENT_SECRET_ENV, hide_env_values = true)]
    client_secret: Option<String>,

    /// LinkedIn REST API base URL
    #[arg(long, env = "LINKEDIN_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// LinkedIn OAuth base URL (the token endpoint is `{auth_base}/accessToken`)
    #[arg(long, env = "LINKEDIN_AUTH_BASE", default_value = DEFAULT_AUTH_BASE)]
    auth_base: String,

    /// Timeout for every outbound HTTP request, in seconds
    #[arg(long, env = "LINKEDIN_HTTP_TIMEOUT_SECS", default_value = "30")]
    http_timeout_secs: u64,

    /// Allow plain HTTP base URLs (default is HTTPS only)
    #[arg(long)]
    allow_http: bool,

    /// Enable debug logging
    #[arg(long, short)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    init_logging(args.debug);

    info!("LinkedIn MCP server starting");

    // Missing credentials are fatal before anything touches the network
    let identity = ClientIdentity::new(args.client_id.clone(), args.client_secret.clone())
        .inspect_err(|e| error!("{}", e))?;

    let api_base = validate_base_url(&args.api_base, args.allow_http)?;
    let auth_base = validate_base_url(&args.auth_base, args.allow_http)?;
    let timeout = Duration::from_secs(args.http_timeout_secs);

    info!("API base: {}", api_base);
    info!("Auth base: {}", auth_base);

    let endpoint = HttpTokenEndpoint::new(&auth_base, Some(timeout))?;
    let credentials = Arc::new(CredentialManager::new(identity, Arc::new(endpoint)));

    // Grant failures are reported per tool call; the server still starts
    match credentials.ensure_valid().await {
        Ok(()) => {
            let status = credentials.status();
            info!("Authenticated, token expires at {:?}", status.expires_at);
        }
        Err(e) => warn!("Initial authentication failed, retrying on first request: {}", e),
    }

    let config = ClientConfig::new()
        .with_api_base(api_base)
        .with_timeout(timeout);
    let client = Arc::new(LinkedInClient::new(config, credentials)?);

    let server = McpServer::new("linkedin-mcp-server", env!("CARGO_PKG_VERSION"))
        .with_title("LinkedIn MCP Server")
        .with_instructions(SERVER_INSTRUCTIONS);
    register_linkedin_tools(&server, client).await;

    // Handle shutdown gracefully
    let result = tokio::select! {
        result = server.run() => {
            match result {
                Ok(()) => {
                    info!("Client disconnected");
                    Ok(())
                }
                Err(e) => {
                    error!("Server error: {}", e);
                    Err(anyhow::anyhow!("Server failed: {}", e))
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received interrupt signal, shutting down gracefully");
            Ok(())
        }
    };

    info!("LinkedIn MCP server stopped");
    result
}

/// Log to stderr; stdout carries the MCP protocol
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn validate_base_url(url: &str, allow_http: bool) -> anyhow::Result<String> {
    use url::Url;

    let parsed = Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;

    match parsed.scheme() {
        "https" => Ok(url.trim_end_matches('/').to_string()),
        "http" => {
            if allow_http {
                Ok(url.trim_end_matches('/').to_string())
            } else {
                anyhow::bail!(
                    "HTTP URLs are not allowed by default. Use --allow-http for local testing."
                );
            }
        }
        scheme => {
            anyhow::bail!("Unsupported URL scheme '{}'. Use http:// or https://", scheme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkedin_auth::AuthError;

    #[test]
    fn test_validate_base_url_https() {
        let result = validate_base_url("https://api.linkedin.com/v2/", false);
        assert_eq!(result.unwrap(), "https://api.linkedin.com/v2");
    }

    #[test]
    fn test_validate_base_url_http_disallowed() {
        assert!(validate_base_url("http://localhost:8080/v2", false).is_err());
    }

    #[test]
    fn test_validate_base_url_http_allowed() {
        let result = validate_base_url("http://localhost:8080/v2", true);
        assert_eq!(result.unwrap(), "http://localhost:8080/v2");
    }

    #[test]
    fn test_validate_base_url_invalid() {
        assert!(validate_base_url("invalid-url", false).is_err());
        assert!(validate_base_url("ftp://example.com", false).is_err());
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::try_parse_from([
            "linkedin-mcp",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--api-base",
            "http://localhost:9000/v2",
            "--http-timeout-secs",
            "5",
            "--allow-http",
            "-d",
        ])
        .unwrap();

        assert_eq!(args.client_id.as_deref(), Some("id"));
        assert_eq!(args.api_base, "http://localhost:9000/v2");
        assert_eq!(args.http_timeout_secs, 5);
        assert!(args.allow_http);
        assert!(args.debug);
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = ClientIdentity::new(Some("id".into()), None).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential(CLIENT_SECRET_ENV)));
    }
}
