//! Firestore REST client for user profiles and blog documents.
//!
//! Two collections are in play: `users` (one profile document per
//! account, readable and writable only with the owner's ID token) and
//! `blog` (articles written from the Firebase console, publicly
//! readable).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use m2verse_core::{ArticleId, Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::FirebaseConfig;
use crate::services::auth::{ProfileStore, UserProfile};
use crate::services::blog::{Article, ArticleStore};

use super::value::{Document, Value};
use super::{FirebaseError, error_from_response};

const USERS_COLLECTION: &str = "users";
const BLOG_COLLECTION: &str = "blog";

/// Client for the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: SecretString,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.firestore_url.trim_end_matches('/').to_string(),
                project_id: config.project_id.clone(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{collection}/{id}?key={}",
            self.inner.base_url,
            self.inner.project_id,
            self.inner.api_key.expose_secret()
        )
    }

    fn query_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents:runQuery?key={}",
            self.inner.base_url,
            self.inner.project_id,
            self.inner.api_key.expose_secret()
        )
    }

    /// Fetch a single document. 404 means the document does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
        id_token: Option<&str>,
    ) -> Result<Option<Document>, FirebaseError> {
        let mut request = self.inner.client.get(self.document_url(collection, id));
        if let Some(token) = id_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let document = response
            .json::<Document>()
            .await
            .map_err(|e| FirebaseError::Decode(e.to_string()))?;
        Ok(Some(document))
    }

    /// Write a document, creating it if missing (PATCH upsert).
    async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: HashMap<&'static str, Value>,
        id_token: &str,
    ) -> Result<(), FirebaseError> {
        let response = self
            .inner
            .client
            .patch(self.document_url(collection, id))
            .bearer_auth(id_token)
            .json(&WriteBody { fields })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FirestoreClient {
    #[instrument(skip(self, id_token))]
    async fn get_profile(
        &self,
        uid: &UserId,
        id_token: &str,
    ) -> Result<Option<UserProfile>, FirebaseError> {
        let document = self
            .get_document(USERS_COLLECTION, uid.as_str(), Some(id_token))
            .await?;
        document.as_ref().map(profile_from_document).transpose()
    }

    #[instrument(skip(self, id_token, profile))]
    async fn put_profile(
        &self,
        uid: &UserId,
        id_token: &str,
        profile: &UserProfile,
    ) -> Result<(), FirebaseError> {
        let mut fields: HashMap<&'static str, Value> = HashMap::new();
        fields.insert("name", Value::from(profile.name.clone()));
        fields.insert("email", Value::from(profile.email.as_str()));
        if let Some(photo) = &profile.photo_url {
            fields.insert("photoURL", Value::from(photo.clone()));
        }
        fields.insert(
            "createdAt",
            Value::from(profile.created_at.unwrap_or_else(Utc::now)),
        );

        self.patch_document(USERS_COLLECTION, uid.as_str(), fields, id_token)
            .await
    }
}

#[async_trait]
impl ArticleStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn list_articles(&self) -> Result<Vec<Article>, FirebaseError> {
        let response = self
            .inner
            .client
            .post(self.query_url())
            .json(&blog_query_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let results = response
            .json::<Vec<QueryResult>>()
            .await
            .map_err(|e| FirebaseError::Decode(e.to_string()))?;

        // An empty collection comes back as a single result with no
        // document attached.
        results
            .iter()
            .filter_map(|r| r.document.as_ref())
            .map(article_from_document)
            .collect()
    }

    #[instrument(skip(self), fields(article = %id))]
    async fn get_article(&self, id: &ArticleId) -> Result<Option<Article>, FirebaseError> {
        let document = self.get_document(BLOG_COLLECTION, id.as_str(), None).await?;
        document.as_ref().map(article_from_document).transpose()
    }
}

/// Body of a document write.
#[derive(Serialize)]
struct WriteBody {
    fields: HashMap<&'static str, Value>,
}

/// One entry of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    document: Option<Document>,
}

/// Structured query for all blog articles, newest first.
fn blog_query_body() -> serde_json::Value {
    serde_json::json!({
        "structuredQuery": {
            "from": [{"collectionId": BLOG_COLLECTION}],
            "orderBy": [{
                "field": {"fieldPath": "createdAt"},
                "direction": "DESCENDING"
            }]
        }
    })
}

fn profile_from_document(doc: &Document) -> Result<UserProfile, FirebaseError> {
    let name = doc
        .get_str("name")
        .ok_or_else(|| FirebaseError::Decode("profile document missing name".to_string()))?
        .to_string();
    let email = doc
        .get_str("email")
        .and_then(|raw| Email::parse(raw).ok())
        .ok_or_else(|| FirebaseError::Decode("profile document missing email".to_string()))?;

    Ok(UserProfile {
        name,
        email,
        photo_url: doc.get_str("photoURL").map(ToString::to_string),
        created_at: doc.get_timestamp("createdAt"),
    })
}

fn article_from_document(doc: &Document) -> Result<Article, FirebaseError> {
    let title = doc.get_str("title").ok_or_else(|| {
        FirebaseError::Decode(format!("blog document {} missing title", doc.id()))
    })?;
    let read_time = doc
        .get_int("readTime")
        .and_then(|minutes| u32::try_from(minutes).ok())
        .unwrap_or(1);

    Ok(Article {
        id: ArticleId::from(doc.id()),
        title: title.to_string(),
        content: doc.get_str("content").unwrap_or_default().to_string(),
        excerpt: doc.get_str("excerpt").unwrap_or_default().to_string(),
        image: doc.get_str("image").unwrap_or_default().to_string(),
        date: doc.get_str("date").unwrap_or_default().to_string(),
        category: doc.get_str("category").unwrap_or_default().to_string(),
        author: doc.get_str("author").unwrap_or_default().to_string(),
        read_time,
        created_at: doc.get_timestamp("createdAt"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_query_wire_shape() {
        assert_eq!(
            blog_query_body(),
            serde_json::json!({
                "structuredQuery": {
                    "from": [{"collectionId": "blog"}],
                    "orderBy": [{
                        "field": {"fieldPath": "createdAt"},
                        "direction": "DESCENDING"
                    }]
                }
            })
        );
    }

    #[test]
    fn test_profile_from_document() {
        let doc: Document = serde_json::from_str(
            r#"{
                "name": "projects/m2verse/databases/(default)/documents/users/x7GqPz2mK3hF6gB0",
                "fields": {
                    "name": {"stringValue": "Alex Rodriguez"},
                    "email": {"stringValue": "alex@m2verse.com.br"},
                    "photoURL": {"stringValue": "https://lh3.googleusercontent.com/a/photo"},
                    "createdAt": {"timestampValue": "2025-03-14T09:26:53Z"}
                }
            }"#,
        )
        .unwrap();

        let profile = profile_from_document(&doc).unwrap();
        assert_eq!(profile.name, "Alex Rodriguez");
        assert_eq!(profile.email.as_str(), "alex@m2verse.com.br");
        assert!(profile.photo_url.is_some());
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn test_profile_missing_name_is_a_decode_error() {
        let doc: Document = serde_json::from_str(
            r#"{
                "name": "projects/p/databases/(default)/documents/users/u1",
                "fields": {"email": {"stringValue": "alex@m2verse.com.br"}}
            }"#,
        )
        .unwrap();

        assert!(matches!(
            profile_from_document(&doc),
            Err(FirebaseError::Decode(_))
        ));
    }

    #[test]
    fn test_article_from_document() {
        let doc: Document = serde_json::from_str(
            r#"{
                "name": "projects/m2verse/databases/(default)/documents/blog/colecionaveis-2025",
                "fields": {
                    "title": {"stringValue": "Guia de Colecionáveis 2025"},
                    "content": {"stringValue": "<p>O mercado de action figures...</p>"},
                    "excerpt": {"stringValue": "Tudo sobre o mercado."},
                    "image": {"stringValue": "/blog/guia.jpg"},
                    "date": {"stringValue": "14 Mar 2025"},
                    "category": {"stringValue": "Colecionáveis"},
                    "author": {"stringValue": "Equipe M² Verse"},
                    "readTime": {"integerValue": "8"},
                    "createdAt": {"timestampValue": "2025-03-14T09:26:53Z"}
                }
            }"#,
        )
        .unwrap();

        let article = article_from_document(&doc).unwrap();
        assert_eq!(article.id.as_str(), "colecionaveis-2025");
        assert_eq!(article.title, "Guia de Colecionáveis 2025");
        assert_eq!(article.read_time, 8);
        assert_eq!(article.category, "Colecionáveis");
    }

    #[test]
    fn test_article_defaults_for_optional_fields() {
        let doc: Document = serde_json::from_str(
            r#"{
                "name": "projects/p/databases/(default)/documents/blog/rascunho",
                "fields": {"title": {"stringValue": "Rascunho"}}
            }"#,
        )
        .unwrap();

        let article = article_from_document(&doc).unwrap();
        assert_eq!(article.read_time, 1);
        assert_eq!(article.author, "");
        assert!(article.created_at.is_none());
    }

    #[test]
    fn test_query_result_without_document_is_skipped() {
        let results: Vec<QueryResult> =
            serde_json::from_str(r#"[{"readTime": "2025-03-14T09:26:53.123Z"}]"#).unwrap();
        assert!(results.first().unwrap().document.is_none());
    }
}
