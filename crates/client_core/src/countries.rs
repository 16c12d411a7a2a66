use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::Country, protocol::RestCountryRecord};
use tracing::{debug, warn};

use crate::{
    error::{parse_base_url, ClientError, ClientResult},
    CountryDirectory,
};

/// Reads the country list from a restcountries-compatible endpoint.
#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    http: Client,
    url: url::Url,
}

impl RestCountriesClient {
    pub fn new(url: &str, timeout: Duration) -> ClientResult<Self> {
        let url = parse_base_url(url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    pub async fn fetch(&self) -> ClientResult<Vec<Country>> {
        let res = self.http.get(self.url.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body = res.bytes().await?;
        let records: Vec<RestCountryRecord> = serde_json::from_slice(&body)?;
        let total = records.len();

        let countries: Vec<Country> = records
            .into_iter()
            .filter_map(|record| {
                if record.latlng.len() != 2 {
                    warn!(country = %record.name.common, "skipping country without coordinates");
                    return None;
                }
                record.into_country()
            })
            .collect();
        debug!(total, kept = countries.len(), "fetched country list");
        Ok(countries)
    }
}

#[async_trait]
impl CountryDirectory for RestCountriesClient {
    async fn list_countries(&self) -> Result<Vec<Country>> {
        Ok(self.fetch().await?)
    }
}
