//! Google Books catalog implementation.
//!
//! Uses the Google Books volumes API.
//! API documentation: <https://developers.google.com/books/docs/v1/using>
//!
//! Requests are sent with an API key when one is configured.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Book, BookBuilder, SearchQuery, SearchResponse, UNKNOWN_AUTHOR};
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::{clean_description, redact_key, secure_url, HttpClient};

const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

/// Google Books catalog
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksSource {
    /// Create a source against the public API, reading the key from `GOOGLE_BOOKS_API_KEY`
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            HttpClient::new()?,
            GOOGLE_BOOKS_API_BASE,
            std::env::var("GOOGLE_BOOKS_API_KEY").ok(),
        ))
    }

    /// Create a source with an explicit client, endpoint and key
    pub fn with_client(client: HttpClient, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn key_param(&self) -> String {
        match &self.api_key {
            Some(key) => format!("key={}", urlencoding::encode(key)),
            None => String::new(),
        }
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/volumes?q={}&maxResults={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results
        );
        if self.api_key.is_some() {
            url.push('&');
            url.push_str(&self.key_param());
        }
        url
    }

    fn volume_url(&self, id: &str) -> String {
        let mut url = format!("{}/volumes/{}", self.base_url, urlencoding::encode(id));
        if self.api_key.is_some() {
            url.push('?');
            url.push_str(&self.key_param());
        }
        url
    }

    /// Map a volume to a book; volumes without a title are unusable
    fn parse_volume(volume: GBVolume) -> Option<Book> {
        let info = volume.volume_info?;
        let title = info.title.filter(|t| !t.trim().is_empty())?;

        let author = info
            .authors
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let isbn = info
            .industry_identifiers
            .into_iter()
            .find(|id| id.kind == "ISBN_13")
            .map(|id| id.identifier);

        Some(
            BookBuilder::new(volume.id, title, author)
                .cover_image(
                    info.image_links
                        .and_then(|links| links.thumbnail)
                        .map(|thumb| secure_url(&thumb)),
                )
                .description(clean_description(info.description.as_deref()))
                .publisher(info.publisher)
                .publish_date(info.published_date)
                .page_count(info.page_count)
                .language(info.language)
                .subjects(info.categories)
                .isbn(isbn)
                .build(),
        )
    }
}

#[async_trait]
impl Source for GoogleBooksSource {
    fn id(&self) -> &str {
        "google_books"
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::ID_LOOKUP
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        if self.api_key.is_none() {
            tracing::warn!("GOOGLE_BOOKS_API_KEY not set - requests are anonymous and heavily rate limited");
        }

        let url = self.search_url(query);
        tracing::debug!(url = %redact_key(&url), "searching Google Books");

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search Google Books: {}", e)))?;

        // An error status from the catalog yields no results rather than a failed search.
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Google Books search returned an error status");
            return Ok(SearchResponse::empty(self.name(), &query.query));
        }

        let data: VolumesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let total = data.total_items;
        let books: Vec<Book> = data
            .items
            .into_iter()
            .filter_map(|volume| {
                let id = volume.id.clone();
                let book = Self::parse_volume(volume);
                if book.is_none() {
                    tracing::debug!(%id, "skipping Google Books volume without a title");
                }
                book
            })
            .collect();

        tracing::debug!(count = books.len(), "Google Books search complete");

        let mut response = SearchResponse::new(books, self.name(), &query.query);
        response.total_results = total;
        Ok(response)
    }

    async fn get_by_id(&self, id: &str) -> Result<Book, SourceError> {
        if id.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty volume id".to_string()));
        }

        let volume: GBVolume = self.client.get_json(&self.volume_url(id)).await?;

        Self::parse_volume(volume)
            .ok_or_else(|| SourceError::NotFound(format!("Google Books volume {}", id)))
    }
}

// ===== Google Books API Types =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    total_items: Option<usize>,
    #[serde(default)]
    items: Vec<GBVolume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GBVolume {
    #[serde(default)]
    id: String,
    volume_info: Option<GBVolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GBVolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
    image_links: Option<GBImageLinks>,
    published_date: Option<String>,
    publisher: Option<String>,
    page_count: Option<u32>,
    language: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    industry_identifiers: Vec<GBIndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
struct GBImageLinks {
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GBIndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const DUNE_VOLUME: &str = r#"{
        "id": "B1hSG45JCX4C",
        "volumeInfo": {
            "title": "Dune",
            "authors": ["Frank Herbert", "Brian Herbert"],
            "publisher": "Penguin",
            "publishedDate": "2005-08-02",
            "description": "<b>A classic.</b> Set on the desert planet <i>Arrakis</i>.",
            "industryIdentifiers": [
                {"type": "ISBN_10", "identifier": "0441013597"},
                {"type": "ISBN_13", "identifier": "9780441013593"}
            ],
            "pageCount": 896,
            "categories": ["Fiction"],
            "imageLinks": {"thumbnail": "http://books.google.com/books/content?id=B1hSG45JCX4C"},
            "language": "en"
        }
    }"#;

    fn source(server: &mockito::Server, key: Option<&str>) -> GoogleBooksSource {
        GoogleBooksSource::with_client(
            HttpClient::new().unwrap(),
            &server.url(),
            key.map(str::to_string),
        )
    }

    #[test]
    fn test_parse_volume() {
        let volume: GBVolume = serde_json::from_str(DUNE_VOLUME).unwrap();
        let book = GoogleBooksSource::parse_volume(volume).unwrap();

        assert_eq!(book.id, "B1hSG45JCX4C");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(book.page_count, Some(896));
        assert_eq!(book.subjects, vec!["Fiction".to_string()]);
        assert_eq!(
            book.cover_image.as_deref(),
            Some("https://books.google.com/books/content?id=B1hSG45JCX4C")
        );
        assert_eq!(
            book.description.as_deref(),
            Some("Set on the desert planet Arrakis.")
        );
    }

    #[test]
    fn test_parse_volume_defaults() {
        let volume: GBVolume =
            serde_json::from_str(r#"{"id": "x", "volumeInfo": {"title": "Anonymous Poems"}}"#)
                .unwrap();
        let book = GoogleBooksSource::parse_volume(volume).unwrap();

        assert_eq!(book.author, UNKNOWN_AUTHOR);
        assert!(book.cover_image.is_none());
        assert!(book.isbn.is_none());
    }

    #[test]
    fn test_parse_volume_without_title() {
        let volume: GBVolume = serde_json::from_str(r#"{"id": "x", "volumeInfo": {}}"#).unwrap();
        assert!(GoogleBooksSource::parse_volume(volume).is_none());

        let volume: GBVolume = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(GoogleBooksSource::parse_volume(volume).is_none());
    }

    #[tokio::test]
    async fn test_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/volumes")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "dune".into()),
                Matcher::UrlEncoded("maxResults".into(), "10".into()),
                Matcher::UrlEncoded("key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"totalItems": 2, "items": [{}, {{"id": "untitled", "volumeInfo": {{}}}}]}}"#,
                DUNE_VOLUME
            ))
            .create_async()
            .await;

        let response = source(&server, Some("test-key"))
            .search(&SearchQuery::new("dune"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.books.len(), 1);
        assert_eq!(response.total_results, Some(2));
        assert_eq!(response.source, "Google Books");
    }

    #[tokio::test]
    async fn test_search_without_items() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"kind": "books#volumes", "totalItems": 0}"#)
            .create_async()
            .await;

        let response = source(&server, None)
            .search(&SearchQuery::new("zzzzqqq"))
            .await
            .unwrap();
        assert!(response.books.is_empty());
    }

    #[tokio::test]
    async fn test_search_error_status_yields_no_results() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
            .create_async()
            .await;

        let response = source(&server, None)
            .search(&SearchQuery::new("dune"))
            .await
            .unwrap();
        assert!(response.books.is_empty());
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = source(&server, None).search(&SearchQuery::new("dune")).await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes/B1hSG45JCX4C")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(DUNE_VOLUME)
            .create_async()
            .await;

        let book = source(&server, None).get_by_id("B1hSG45JCX4C").await.unwrap();
        assert_eq!(book.title, "Dune");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes/OL45883W")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = source(&server, None).get_by_id("OL45883W").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
