use anyhow::Result;
use axum::Router;
use std::{net::SocketAddr, path::PathBuf};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Configuration for the static file server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Directory to serve
    pub root: PathBuf,
    /// Auto-open browser
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: PathBuf::from("site"),
            open: false,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Serves a finished output directory over HTTP. Directory requests get
/// their `index.html`.
pub struct StaticServer {
    config: ServerConfig,
}

impl StaticServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .fallback_service(ServeDir::new(&self.config.root))
            .layer(TraceLayer::new_for_http())
    }

    /// Run until the process is interrupted
    pub async fn run(self) -> Result<()> {
        if !self.config.root.is_dir() {
            return Err(anyhow::anyhow!(
                "Root directory does not exist: {}",
                self.config.root.display()
            ));
        }

        let addr = self.config.addr()?;
        let app = self.router();

        tracing::info!("Serving {} at http://{}", self.config.root.display(), addr);

        // Open browser if requested
        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
