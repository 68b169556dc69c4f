use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use uwcal_core::{Error, PageFetcher};

const TIMEOUT: Duration = Duration::from_secs(20);

pub struct HttpFetcher {
	client: Client,
}

impl HttpFetcher {
	pub fn new() -> anyhow::Result<Self> {
		let client = ClientBuilder::new()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.timeout(TIMEOUT)
			.build()?;

		Ok(Self { client })
	}

	async fn fetch_body(&self, url: &str) -> reqwest::Result<String> {
		let response = self.client.get(url).send().await?.error_for_status()?;

		response.text().await
	}
}

impl PageFetcher for HttpFetcher {
	async fn fetch_page(&self, url: &str) -> uwcal_core::Result<String> {
		self.fetch_body(url).await.map_err(|err| Error::Fetch {
			url: url.to_string(),
			message: err.to_string(),
		})
	}
}
