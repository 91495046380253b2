use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::connector::adapter::http::{serve, AppState};

use super::super::Container;

pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn serve(&self, port: u16, public: bool) -> Result<String> {
        let ip = if public {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };

        info!(
            "Starting HTTP server (store: {}, region: {})",
            self.container.store().as_str(),
            self.container.gcp_settings().region()
        );

        let state = AppState::new(Arc::new(self.container.analyze_use_case()));
        serve(state, SocketAddr::new(ip, port)).await?;

        Ok("Server stopped.".to_string())
    }
}
