//! Open Library catalog implementation.
//!
//! Search goes through `/search.json`, which returns thin document stubs.
//! Each stub can be enriched from its edition (`/books/{edition}.json`) and
//! work (`/works/{id}.json`) records. Lookup by id resolves a work and its
//! first author.
//!
//! API documentation: <https://openlibrary.org/developers/api>

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Book, BookBuilder, SearchQuery, SearchResponse, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::{last_path_segment, HttpClient};

const OPEN_LIBRARY_API_BASE: &str = "https://openlibrary.org";
const OPEN_LIBRARY_COVERS_BASE: &str = "https://covers.openlibrary.org/b";

/// Open Library catalog
#[derive(Debug, Clone)]
pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
    covers_url: String,
}

impl OpenLibrarySource {
    /// Create a source against the public API
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            HttpClient::new()?,
            OPEN_LIBRARY_API_BASE,
            OPEN_LIBRARY_COVERS_BASE,
        ))
    }

    /// Create a source with an explicit client and endpoints
    pub fn with_client(client: HttpClient, base_url: &str, covers_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            covers_url: covers_url.trim_end_matches('/').to_string(),
        }
    }

    fn cover_url(&self, cover_id: i64) -> Option<String> {
        (cover_id > 0).then(|| format!("{}/id/{}-L.jpg", self.covers_url, cover_id))
    }

    async fn fetch_edition(&self, edition_key: &str) -> Option<OLEdition> {
        let url = format!(
            "{}/books/{}.json",
            self.base_url,
            urlencoding::encode(last_path_segment(edition_key))
        );
        match self.client.get_json::<OLEdition>(&url).await {
            Ok(edition) => Some(edition),
            Err(e) => {
                tracing::warn!(edition = %edition_key, error = %e, "failed to fetch Open Library edition");
                None
            }
        }
    }

    async fn fetch_work(&self, work_key: &str) -> Option<OLWork> {
        let url = format!("{}{}.json", self.base_url, work_key);
        match self.client.get_json::<OLWork>(&url).await {
            Ok(work) => Some(work),
            Err(e) => {
                tracing::warn!(work = %work_key, error = %e, "failed to fetch Open Library work");
                None
            }
        }
    }

    async fn fetch_author_name(&self, author_key: &str) -> Option<String> {
        let url = format!("{}{}.json", self.base_url, author_key);
        match self.client.get_json::<OLAuthor>(&url).await {
            Ok(author) => author.name.filter(|n| !n.trim().is_empty()),
            Err(e) => {
                tracing::warn!(author = %author_key, error = %e, "failed to fetch Open Library author");
                None
            }
        }
    }

    /// Build a book from a search stub, pulling edition and work records when asked
    async fn enrich(&self, doc: OLDoc, fetch_details: bool) -> Book {
        let edition_key = doc.edition_key.first().cloned();

        let (edition, work) = if fetch_details {
            let edition = async {
                match &edition_key {
                    Some(key) => self.fetch_edition(key).await,
                    None => None,
                }
            };
            tokio::join!(edition, self.fetch_work(&doc.key))
        } else {
            (None, None)
        };

        self.merge_records(doc, edition_key, edition, work)
    }

    /// Edition values win over the stub's, work values win over both
    fn merge_records(
        &self,
        doc: OLDoc,
        edition_key: Option<String>,
        edition: Option<OLEdition>,
        work: Option<OLWork>,
    ) -> Book {
        let edition = edition.unwrap_or_default();
        let work = work.unwrap_or_default();

        let id = last_path_segment(&doc.key).to_string();
        let title = doc
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let author = doc
            .author_name
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let publish_date = edition
            .publish_date
            .or_else(|| doc.first_publish_year.map(|y| y.to_string()));
        let publisher = edition
            .publishers
            .into_iter()
            .next()
            .or_else(|| doc.publisher.into_iter().next());
        let page_count = edition
            .number_of_pages
            .or(doc.number_of_pages)
            .or(doc.number_of_pages_median);
        let language = edition
            .languages
            .first()
            .map(|lang| last_path_segment(&lang.key).to_string())
            .or_else(|| doc.language.into_iter().next());
        let isbn = edition
            .isbn_13
            .into_iter()
            .next()
            .or_else(|| edition.isbn_10.into_iter().next())
            .or_else(|| pick_isbn(doc.isbn));

        let subjects = if !work.subjects.is_empty() {
            work.subjects
        } else if !edition.subjects.is_empty() {
            edition.subjects
        } else {
            doc.subject
        };

        BookBuilder::new(id, title, author)
            .cover_image(doc.cover_i.and_then(|c| self.cover_url(c)))
            .description(work.description.map(OLText::into_string))
            .publisher(publisher)
            .publish_date(publish_date)
            .page_count(page_count)
            .language(language)
            .subjects(subjects)
            .isbn(isbn)
            .edition_key(edition_key)
            .work_key(Some(doc.key))
            .build()
    }
}

/// Prefer a 13-digit ISBN from a stub's mixed list
fn pick_isbn(isbns: Vec<String>) -> Option<String> {
    isbns
        .iter()
        .find(|isbn| isbn.len() == 13)
        .or_else(|| isbns.first())
        .cloned()
}

#[async_trait]
impl Source for OpenLibrarySource {
    fn id(&self) -> &str {
        "open_library"
    }

    fn name(&self) -> &str {
        "Open Library"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::ID_LOOKUP
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        let url = format!(
            "{}/search.json?q={}&limit={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results
        );

        let data: OLSearchResponse = self.client.get_json(&url).await.map_err(|e| match e {
            SourceError::NotFound(what) => {
                SourceError::Api(format!("Open Library search endpoint missing: {}", what))
            }
            other => other,
        })?;

        let docs: Vec<OLDoc> = data
            .docs
            .into_iter()
            .filter(|doc| {
                let keep = !doc.key.is_empty();
                if !keep {
                    tracing::debug!("skipping Open Library doc without a key");
                }
                keep
            })
            .collect();

        let books = futures_util::future::join_all(
            docs.into_iter()
                .map(|doc| self.enrich(doc, query.fetch_details)),
        )
        .await;

        tracing::debug!(count = books.len(), "Open Library search complete");

        let mut response = SearchResponse::new(books, self.name(), &query.query);
        response.total_results = data.num_found;
        Ok(response)
    }

    async fn get_by_id(&self, id: &str) -> Result<Book, SourceError> {
        let id = last_path_segment(id.trim());
        if id.is_empty() {
            return Err(SourceError::InvalidRequest("empty work id".to_string()));
        }

        let url = format!("{}/works/{}.json", self.base_url, urlencoding::encode(id));
        let work: OLWork = self.client.get_json(&url).await?;

        let author = match work.authors.iter().find_map(|a| a.author.as_ref()) {
            Some(author_ref) => self.fetch_author_name(&author_ref.key).await,
            None => None,
        }
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let title = work
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        Ok(BookBuilder::new(id, title, author)
            .cover_image(work.covers.first().and_then(|c| self.cover_url(*c)))
            .description(work.description.map(OLText::into_string))
            .subjects(work.subjects)
            .work_key(Some(format!("/works/{}", id)))
            .build())
    }
}

// ===== Open Library API Types =====

#[derive(Debug, Deserialize)]
struct OLSearchResponse {
    #[serde(rename = "numFound", alias = "num_found")]
    num_found: Option<usize>,
    #[serde(default)]
    docs: Vec<OLDoc>,
}

#[derive(Debug, Deserialize)]
struct OLDoc {
    #[serde(default)]
    key: String,
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    cover_i: Option<i64>,
    first_publish_year: Option<i32>,
    #[serde(default)]
    edition_key: Vec<String>,
    #[serde(default)]
    language: Vec<String>,
    #[serde(default)]
    publisher: Vec<String>,
    number_of_pages: Option<u32>,
    number_of_pages_median: Option<u32>,
    #[serde(default)]
    subject: Vec<String>,
    #[serde(default)]
    isbn: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OLEdition {
    #[serde(default)]
    publishers: Vec<String>,
    publish_date: Option<String>,
    number_of_pages: Option<u32>,
    #[serde(default)]
    languages: Vec<OLKeyRef>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    isbn_13: Vec<String>,
    #[serde(default)]
    isbn_10: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OLKeyRef {
    key: String,
}

#[derive(Debug, Default, Deserialize)]
struct OLWork {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<OLWorkAuthor>,
    description: Option<OLText>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    covers: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct OLWorkAuthor {
    author: Option<OLKeyRef>,
}

/// Text fields come either bare or as `{"type": "/type/text", "value": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OLText {
    Plain(String),
    Typed { value: String },
}

impl OLText {
    fn into_string(self) -> String {
        match self {
            OLText::Plain(s) => s,
            OLText::Typed { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OLAuthor {
    name: Option<String>,
}
