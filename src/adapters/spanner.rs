use crate::config::DatabaseConfig;
use crate::domain::model::Row;
use crate::domain::ports::BatchWriter;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Minimal Cloud Spanner client over the v1 REST API.
///
/// A session is created on first use and reused for every commit after that.
/// Each commit runs in its own single-use read-write transaction.
pub struct SpannerClient {
    client: Client,
    endpoint: String,
    database_path: String,
    token: Option<String>,
    session: Mutex<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Insert(Write),
}

#[derive(Debug, Clone, Serialize)]
pub struct Write {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitRequest<'a> {
    single_use_transaction: TransactionOptions,
    mutations: &'a [Mutation],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionOptions {
    read_write: ReadWrite,
}

#[derive(Debug, Serialize)]
struct ReadWrite {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub commit_timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Session {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// A group of mutations applied atomically by [`MutationBatch::commit`].
pub struct MutationBatch<'a> {
    client: &'a SpannerClient,
    mutations: Vec<Mutation>,
}

impl MutationBatch<'_> {
    pub fn insert(&mut self, table: &str, columns: &[String], rows: &[Row]) -> &mut Self {
        self.mutations.push(Mutation::Insert(Write {
            table: table.to_string(),
            columns: columns.to_vec(),
            values: rows.iter().map(|row| row.fields.clone()).collect(),
        }));
        self
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub async fn commit(self) -> Result<CommitResponse> {
        self.client.commit(&self.mutations).await
    }
}

impl SpannerClient {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            database_path: config.database_path(),
            token: config.bearer_token().map(str::to_string),
            session: Mutex::new(None),
        })
    }

    pub fn database_path(&self) -> &str {
        &self.database_path
    }

    pub fn batch(&self) -> MutationBatch<'_> {
        MutationBatch {
            client: self,
            mutations: Vec::new(),
        }
    }

    fn post(&self, url: &str) -> RequestBuilder {
        let request = self.client.post(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn session(&self) -> Result<String> {
        let mut cached = self.session.lock().await;
        if let Some(name) = cached.as_ref() {
            return Ok(name.clone());
        }

        let url = format!("{}/v1/{}/sessions", self.endpoint, self.database_path);
        tracing::debug!("Creating session on {}", self.database_path);
        let response = self.post(&url).json(&serde_json::json!({})).send().await?;
        let session: Session = check_status(response).await?.json().await?;

        tracing::debug!("Session created: {}", session.name);
        *cached = Some(session.name.clone());
        Ok(session.name)
    }

    async fn commit(&self, mutations: &[Mutation]) -> Result<CommitResponse> {
        let session = self.session().await?;
        let url = format!("{}/v1/{}:commit", self.endpoint, session);
        let body = CommitRequest {
            single_use_transaction: TransactionOptions {
                read_write: ReadWrite {},
            },
            mutations,
        };

        let response = self.post(&url).json(&body).send().await?;
        match check_status(response).await {
            Ok(response) => Ok(response.json().await?),
            Err(EtlError::DatabaseError { status, message })
                if status == StatusCode::NOT_FOUND.as_u16() && message.contains("Session") =>
            {
                // Expired sessions are dropped so the next batch opens a new one.
                tracing::warn!("Session {} expired, discarding it", session);
                *self.session.lock().await = None;
                Err(EtlError::DatabaseError { status, message })
            }
            Err(e) => Err(e),
        }
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(EtlError::DatabaseError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl BatchWriter for SpannerClient {
    async fn write(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<usize> {
        let mut batch = self.batch();
        batch.insert(table, columns, rows);
        let response = batch.commit().await?;

        tracing::debug!(
            "Committed {} rows into {} at {}",
            rows.len(),
            table,
            response.commit_timestamp.as_deref().unwrap_or("unknown time")
        );
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const DB_PATH: &str = "projects/p/instances/i/databases/d";
    const SESSION: &str = "projects/p/instances/i/databases/d/sessions/s1";

    fn config(server: &MockServer) -> DatabaseConfig {
        DatabaseConfig {
            endpoint: server.base_url(),
            project_id: "p".to_string(),
            instance_id: "i".to_string(),
            database_id: "d".to_string(),
            access_token: Some("test-token".to_string()),
            timeout_seconds: Some(5),
        }
    }

    fn columns() -> Vec<String> {
        vec!["transaction_id".to_string(), "amount".to_string()]
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new(2, vec!["t1".to_string(), "10.50".to_string()]),
            Row::new(3, vec!["t2".to_string(), "99.00".to_string()]),
        ]
    }

    #[tokio::test]
    async fn test_write_creates_session_once_and_commits() {
        let server = MockServer::start();

        let session_mock = server.mock(|when, then| {
            when.method(POST)
                .path(format!("/v1/{}/sessions", DB_PATH))
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({ "name": SESSION }));
        });

        let commit_mock = server.mock(|when, then| {
            when.method(POST)
                .path(format!("/v1/{}:commit", SESSION))
                .header("authorization", "Bearer test-token")
                .json_body(json!({
                    "singleUseTransaction": { "readWrite": {} },
                    "mutations": [{
                        "insert": {
                            "table": "activity",
                            "columns": ["transaction_id", "amount"],
                            "values": [["t1", "10.50"], ["t2", "99.00"]]
                        }
                    }]
                }));
            then.status(200)
                .json_body(json!({ "commitTimestamp": "2024-01-01T00:00:00Z" }));
        });

        let client = SpannerClient::new(&config(&server)).unwrap();

        assert_eq!(client.write("activity", &columns(), &rows()).await.unwrap(), 2);
        assert_eq!(client.write("activity", &columns(), &rows()).await.unwrap(), 2);

        session_mock.assert_hits(1);
        commit_mock.assert_hits(2);
    }

    #[tokio::test]
    async fn test_error_status_becomes_database_error() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path(format!("/v1/{}/sessions", DB_PATH));
            then.status(200).json_body(json!({ "name": SESSION }));
        });

        server.mock(|when, then| {
            when.method(POST).path(format!("/v1/{}:commit", SESSION));
            then.status(400).json_body(json!({
                "error": {
                    "code": 400,
                    "message": "Table not found: activity",
                    "status": "INVALID_ARGUMENT"
                }
            }));
        });

        let client = SpannerClient::new(&config(&server)).unwrap();
        let result = client.write("activity", &columns(), &rows()).await;

        match result {
            Err(EtlError::DatabaseError { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Table not found: activity");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_session_is_recreated_on_next_write() {
        let server = MockServer::start();

        let session_mock = server.mock(|when, then| {
            when.method(POST).path(format!("/v1/{}/sessions", DB_PATH));
            then.status(200).json_body(json!({ "name": SESSION }));
        });

        let mut expired_mock = server.mock(|when, then| {
            when.method(POST).path(format!("/v1/{}:commit", SESSION));
            then.status(404)
                .json_body(json!({ "error": { "message": "Session not found: s1" } }));
        });

        let client = SpannerClient::new(&config(&server)).unwrap();
        assert!(client.write("activity", &columns(), &rows()).await.is_err());
        expired_mock.assert_hits(1);
        expired_mock.delete();

        let commit_mock = server.mock(|when, then| {
            when.method(POST).path(format!("/v1/{}:commit", SESSION));
            then.status(200).json_body(json!({}));
        });

        assert_eq!(client.write("activity", &columns(), &rows()).await.unwrap(), 2);
        session_mock.assert_hits(2);
        commit_mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path(format!("/v1/{}/sessions", DB_PATH));
            then.status(503).body("upstream unavailable");
        });

        let client = SpannerClient::new(&config(&server)).unwrap();
        let result = client.write("activity", &columns(), &rows()).await;

        assert!(matches!(
            result,
            Err(EtlError::DatabaseError { status: 503, ref message }) if message == "upstream unavailable"
        ));
    }

    #[test]
    fn test_batch_collects_insert_mutation() {
        let database = DatabaseConfig::default();
        let client = SpannerClient::new(&database).unwrap();

        let mut batch = client.batch();
        batch.insert("activity", &columns(), &rows());

        assert_eq!(client.database_path(), database.database_path());
        let body = serde_json::to_value(batch.mutations()).unwrap();
        assert_eq!(
            body,
            json!([{
                "insert": {
                    "table": "activity",
                    "columns": ["transaction_id", "amount"],
                    "values": [["t1", "10.50"], ["t2", "99.00"]]
                }
            }])
        );
    }
}
