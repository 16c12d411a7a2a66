use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{CreateTripRequest, CreateTripResponse};
use tracing::{info, warn};

use crate::{
    error::{parse_base_url, ClientError, ClientResult},
    TripCreator,
};

/// Posts trip drafts to the generation endpoint.
///
/// A non-2xx status with a JSON body is an application-level rejection and
/// comes back as a response without an id. Transport errors and undecodable
/// bodies are errors, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpTripCreator {
    http: Client,
    url: url::Url,
}

impl HttpTripCreator {
    pub fn new(url: &str, timeout: Duration) -> ClientResult<Self> {
        let url = parse_base_url(url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    pub async fn post(&self, request: &CreateTripRequest) -> ClientResult<CreateTripResponse> {
        let res = self
            .http
            .post(self.url.clone())
            .json(request)
            .send()
            .await?;
        let status = res.status();
        let body = res.bytes().await?;
        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).into_owned();
            if serde_json::from_slice::<serde_json::Value>(&body).is_err() {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            warn!(status = status.as_u16(), body = %message, "trip endpoint rejected request");
            return Ok(CreateTripResponse::default());
        }
        let response: CreateTripResponse = serde_json::from_slice(&body)?;
        info!(
            country = %request.country,
            days = request.number_of_days,
            has_id = response.trip_id().is_some(),
            "trip endpoint responded"
        );
        Ok(response)
    }
}

#[async_trait]
impl TripCreator for HttpTripCreator {
    async fn create_trip(&self, request: CreateTripRequest) -> Result<CreateTripResponse> {
        Ok(self.post(&request).await?)
    }
}
