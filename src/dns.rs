use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;
use url::Url;

use crate::probe::{ExistenceProber, NO_ADDRESS};

/// ASCII (punycode) form of a possibly internationalised host name.
pub(crate) fn ascii_host(name: &str) -> Option<String> {
    Url::parse(&format!("http://{}/", name))
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

/// Existence prober backed by the system-independent async resolver.
pub struct DnsProber {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsProber {
    pub fn new(query_timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = query_timeout;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            timeout: query_timeout,
        }
    }

    async fn addresses(&self, name: &str) -> Vec<IpAddr> {
        let Some(host) = ascii_host(name) else {
            debug!(name, "not representable as a DNS name");
            return Vec::new();
        };

        match timeout(self.timeout, self.resolver.lookup_ip(host.as_str())).await {
            Ok(Ok(lookup)) => lookup.iter().collect(),
            Ok(Err(err)) => {
                debug!(name, error = %err, "no DNS records");
                Vec::new()
            }
            Err(_) => {
                debug!(name, "DNS lookup timed out");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ExistenceProber for DnsProber {
    async fn exists(&self, name: &str) -> bool {
        !self.addresses(name).await.is_empty()
    }

    async fn resolve(&self, name: &str) -> String {
        self.addresses(name)
            .await
            .first()
            .map(IpAddr::to_string)
            .unwrap_or_else(|| NO_ADDRESS.to_string())
    }
}
