#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: Auth,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Request body limit in MiB.
    pub body_limit: u64,
    /// Request timeout in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}
