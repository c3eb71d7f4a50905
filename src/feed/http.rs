//! NuGet v3 feed over HTTP
//!
//! Only the flat container (`PackageBaseAddress/3.0.0`) resource is used:
//!
//! - versions: `GET {base}/{id}/index.json`
//! - archive:  `GET {base}/{id}/{version}/{id}.{version}.nupkg`
//!
//! with id and version lower-cased. A source url ending in `index.json` is a
//! service index and the base address is looked up in it on first use;
//! any other url is taken as the base address itself.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::PackageRepository;
use crate::error::{Result, feed};
use crate::version::PackageVersion;

const BASE_ADDRESS_TYPE: &str = "PackageBaseAddress/3.0.0";
/// Sent with every feed request
pub const USER_AGENT: &str = concat!("nuvend/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ServiceIndex {
    #[serde(default)]
    resources: Vec<ServiceResource>,
}

#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct VersionList {
    #[serde(default)]
    versions: Vec<String>,
}

/// Client for one NuGet v3 feed
pub struct HttpFeed {
    url: String,
    http_client: reqwest::blocking::Client,
    base_address: OnceLock<String>,
}

impl HttpFeed {
    /// Create a feed client. No request is made until the feed is used.
    pub fn new(url: &str) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| feed::request_failed(url, e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            http_client,
            base_address: OnceLock::new(),
        })
    }

    fn base_address(&self) -> Result<&str> {
        if let Some(base) = self.base_address.get() {
            return Ok(base.as_str());
        }
        let base = if self.url.ends_with("index.json") {
            self.lookup_base_address()?
        } else {
            self.url.clone()
        };
        let base = base.trim_end_matches('/').to_string();
        debug!(feed = %self.url, base = %base, "resolved package base address");
        Ok(self.base_address.get_or_init(|| base).as_str())
    }

    fn lookup_base_address(&self) -> Result<String> {
        let response = self.http_client.get(&self.url).send()?;
        if !response.status().is_success() {
            return Err(feed::request_failed(
                &self.url,
                format!("service index returned status {}", response.status()),
            ));
        }
        let index: ServiceIndex = response.json()?;
        find_base_address(&index).ok_or_else(|| {
            feed::request_failed(&self.url, format!("no {BASE_ADDRESS_TYPE} resource"))
        })
    }
}

fn find_base_address(index: &ServiceIndex) -> Option<String> {
    index
        .resources
        .iter()
        .find(|r| r.kind == BASE_ADDRESS_TYPE)
        .map(|r| r.id.clone())
}

fn archive_url(base: &str, package_id: &str, version: &PackageVersion) -> String {
    let id = package_id.to_lowercase();
    let version = version.to_normalized_string().to_lowercase();
    format!("{base}/{id}/{version}/{id}.{version}.nupkg")
}

impl PackageRepository for HttpFeed {
    fn all_versions(&self, package_id: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/{}/index.json",
            self.base_address()?,
            package_id.to_lowercase()
        );
        let response = self.http_client.get(&url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(feed::request_failed(&url, format!("status {}", response.status())));
        }
        let list: VersionList = response.json()?;
        Ok(list.versions)
    }

    fn copy_archive(
        &self,
        package_id: &str,
        version: &PackageVersion,
        sink: &mut dyn Write,
    ) -> Result<bool> {
        let url = archive_url(self.base_address()?, package_id, version);
        debug!(url = %url, "downloading archive");
        let mut response = self.http_client.get(&url).send()?;
        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "archive not available");
            return Ok(false);
        }
        let bytes = response.copy_to(sink)?;
        debug!(url = %url, bytes, "archive downloaded");
        Ok(true)
    }
}
