use anyhow::{Context, Result};

use super::config_model::{Auth, BackendServer, Database, DotEnvyConfig};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup so parsing can be tested without
/// touching the process environment.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| lookup(key).with_context(|| format!("{key} is invalid"));

    let backend_server = BackendServer {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS is invalid")?,
            None => DEFAULT_MAX_CONNECTIONS,
        },
    };

    let auth = Auth {
        jwt_secret: required("JWT_SECRET")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
    })
}
