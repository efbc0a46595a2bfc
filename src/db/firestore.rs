// SPDX-License-Identifier: MIT

//! Firestore implementation of [`DocumentStore`].
//!
//! Documents are written as plain maps, so field names and value shapes are
//! exactly those of the JSON models. Metadata fields the client library adds
//! on read (`_firestore_*`) are stripped.

use super::{Document, DocumentStore, FieldFilter};
use crate::config::{Config, FirebaseCredentials};
use crate::error::AppError;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;
use gcloud_sdk::google::firestore::v1::Document as RawDocument;

const METADATA_PREFIX: &str = "_firestore_";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStore {
    /// Connect using the credentials resolved from configuration.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let project_id = config.firebase_project_id.as_str();

        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = match &config.credentials {
            FirebaseCredentials::ServiceAccountFile(path) => {
                tracing::info!(path = %path.display(), "Using service account key file");
                firestore::FirestoreDb::with_options_service_account_key_file(
                    options,
                    path.clone(),
                )
                .await
            }
            FirebaseCredentials::ServiceAccountFields {
                client_email,
                private_key,
            } => {
                tracing::info!(client_email = %client_email, "Using service account from environment");
                let key_json = serde_json::json!({
                    "type": "service_account",
                    "project_id": project_id,
                    "client_email": client_email,
                    "private_key": private_key,
                    "token_uri": "https://oauth2.googleapis.com/token",
                })
                .to_string();

                firestore::FirestoreDb::with_options_token_source(
                    options,
                    gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
                    gcloud_sdk::TokenSourceType::Json(key_json),
                )
                .await
            }
            FirebaseCredentials::ApplicationDefault => {
                tracing::info!("Using application default credentials");
                firestore::FirestoreDb::with_options(options).await
            }
        }
        .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

/// Split a raw Firestore document into its id and a plain field map.
fn decode_document(raw: &RawDocument) -> Result<(String, Document), AppError> {
    let id = raw
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Database(format!("Document without id: {}", raw.name)))?
        .to_string();

    let mut doc: Document = firestore::firestore_document_to_serializable(raw)
        .map_err(|e| AppError::Database(format!("Failed to decode document {id}: {e}")))?;
    doc.retain(|key, _| !key.starts_with(METADATA_PREFIX));

    Ok((id, doc))
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        let raw = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        raw.map(|raw| decode_document(&raw).map(|(_, doc)| doc))
            .transpose()
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, AppError> {
        let raw = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        raw.iter().map(decode_document).collect()
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, AppError> {
        if filters.is_empty() {
            return self.list(collection).await;
        }

        let filters = filters.to_vec();
        let raw = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                q.for_all(
                    filters
                        .iter()
                        .map(|f| q.field(f.field).eq(f.value.clone())),
                )
            })
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        raw.iter().map(decode_document).collect()
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();

        let _: Document = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(&id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), AppError> {
        let _: Document = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), AppError> {
        let mask: Vec<String> = fields.keys().cloned().collect();

        let _: Document = self
            .get_client()?
            .fluent()
            .update()
            .fields(mask)
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .object(&fields)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataNotFoundError(_) => {
                    AppError::NotFound(format!("No document to update: {collection}/{id}"))
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
