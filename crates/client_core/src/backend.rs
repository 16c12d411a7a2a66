use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::{
    domain::{AuthUser, TripId, UserId},
    error::BackendError,
    protocol::{AccountResponse, DocumentList, TripDocument, UserDocument},
};
use tracing::{debug, warn};

use crate::{
    config::Settings,
    error::{parse_base_url, ClientError, ClientResult},
    AuthProvider, TripPage, TripStore, UserPage, UserStore,
};

/// REST client for the backend-as-a-service holding accounts, users and trips.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    endpoint: String,
    project_id: String,
    api_key: Option<String>,
    session_jwt: Option<String>,
    database_id: String,
    users_collection: String,
    trips_collection: String,
}

impl BackendClient {
    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        let endpoint = parse_base_url(&settings.backend_endpoint)?;
        let project_id = settings
            .project_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ClientError::Config("project_id"))?;
        let http = Client::builder().timeout(settings.http_timeout()).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
            project_id,
            api_key: settings.api_key.clone(),
            session_jwt: settings.session_jwt.clone(),
            database_id: settings.database_id.clone(),
            users_collection: settings.users_collection.clone(),
            trips_collection: settings.trips_collection.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder.header("X-Appwrite-Project", &self.project_id);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Appwrite-Key", key);
        }
        if let Some(jwt) = &self.session_jwt {
            builder = builder.header("X-Appwrite-JWT", jwt);
        }
        builder
    }

    fn documents_path(&self, collection: &str) -> String {
        format!(
            "databases/{}/collections/{}/documents",
            self.database_id, collection
        )
    }

    /// The account behind the configured session, `None` when the backend
    /// answers 401.
    pub async fn current_account(&self) -> ClientResult<Option<AccountResponse>> {
        let res = self
            .with_auth(self.http.get(self.url("account")))
            .send()
            .await?;
        if res.status() == StatusCode::UNAUTHORIZED {
            debug!("no active backend session");
            return Ok(None);
        }
        decode(res).await.map(Some)
    }

    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        collection: &str,
        queries: &[String],
    ) -> ClientResult<DocumentList<T>> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let res = self
            .with_auth(self.http.get(self.url(&self.documents_path(collection))))
            .query(&params)
            .send()
            .await?;
        decode(res).await
    }

    pub async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
    ) -> ClientResult<Option<T>> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        let res = self.with_auth(self.http.get(self.url(&path))).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(res).await.map(Some)
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let status = res.status();
    let body = res.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<BackendError>(&body)
            .map(|err| err.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        warn!(status = status.as_u16(), %message, "backend request failed");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

pub(crate) fn query_equal(attribute: &str, values: &[&str]) -> String {
    json!({"method": "equal", "attribute": attribute, "values": values}).to_string()
}

pub(crate) fn query_limit(limit: u32) -> String {
    json!({"method": "limit", "values": [limit]}).to_string()
}

pub(crate) fn query_offset(offset: u32) -> String {
    json!({"method": "offset", "values": [offset]}).to_string()
}

pub(crate) fn query_order_desc(attribute: &str) -> String {
    json!({"method": "orderDesc", "attribute": attribute}).to_string()
}

#[async_trait]
impl AuthProvider for BackendClient {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        let account = self.current_account().await?;
        Ok(account.map(|account| AuthUser {
            id: UserId::new(account.id),
            name: account.name,
            email: account.email,
        }))
    }
}

#[async_trait]
impl TripStore for BackendClient {
    async fn get_trip(&self, trip_id: &TripId) -> Result<Option<TripDocument>> {
        Ok(self
            .get_document(&self.trips_collection, trip_id.as_str())
            .await?)
    }

    async fn list_trips(&self, limit: u32, offset: u32) -> Result<TripPage> {
        let queries = [
            query_limit(limit),
            query_offset(offset),
            query_order_desc("$createdAt"),
        ];
        Ok(self
            .list_documents(&self.trips_collection, &queries)
            .await?)
    }
}

#[async_trait]
impl UserStore for BackendClient {
    async fn list_users(&self, limit: u32, offset: u32) -> Result<UserPage> {
        let queries = [query_limit(limit), query_offset(offset)];
        Ok(self
            .list_documents(&self.users_collection, &queries)
            .await?)
    }

    async fn find_by_account(&self, account_id: &str) -> Result<Option<UserDocument>> {
        let queries = [query_equal("accountId", &[account_id]), query_limit(1)];
        let page: UserPage = self
            .list_documents(&self.users_collection, &queries)
            .await?;
        Ok(page.documents.into_iter().next())
    }
}
