//! ComicVine API client

use crate::config::ComicVineConfig;
use anyhow::{bail, Context, Result};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, warn};

const ISSUE_PREFIX: &str = "4000-";
const VOLUME_PREFIX: &str = "4050-";

const VOLUME_FIELDS: &str =
    "id,name,publisher,start_year,count_of_issues,description,site_detail_url,issues";
const SEARCH_FIELDS: &str =
    "id,name,publisher,start_year,count_of_issues,description,site_detail_url";
const PEOPLE_FIELDS: &str = "id,name,volumes";

/// Volumes of a matched person fetched in full for an author-first search
const MAX_AUTHOR_VOLUMES: usize = 10;

/// Provider status codes inside the response envelope
const CV_OK: i64 = 1;
const CV_INVALID_KEY: i64 = 100;
const CV_NOT_FOUND: i64 = 101;
const CV_RATE_LIMITED: i64 = 107;

// ============================================================================
// ComicVine Response Structs
// ============================================================================

/// Full issue record as returned by `issue/4000-{id}/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvIssue {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub issue_number: Option<String>,
    pub site_detail_url: Option<String>,
    pub aliases: Option<String>,
    pub cover_date: Option<String>,
    pub store_date: Option<String>,
    pub description: Option<String>,
    pub deck: Option<String>,
    pub volume: Option<CvVolumeRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub person_credits: Vec<CvCredit>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub character_credits: Vec<CvNamed>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub team_credits: Vec<CvNamed>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location_credits: Vec<CvNamed>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub story_arc_credits: Vec<CvNamed>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub concept_credits: Vec<CvNamed>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub object_credits: Vec<CvNamed>,
}

/// Volume summary embedded in an issue
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvVolumeRef {
    pub name: Option<String>,
    pub publisher: Option<CvNamed>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub count_of_issues: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub start_year: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvCredit {
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvNamed {
    pub name: Option<String>,
}

/// Volume record from `volume/4050-{id}/` or the `volumes/` search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvVolume {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub publisher: Option<CvNamed>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub start_year: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub count_of_issues: Option<String>,
    pub description: Option<String>,
    pub site_detail_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issues: Vec<CvIssueRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CvIssueRef {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub issue_number: Option<String>,
}

/// Person record from `people/`, with the volumes they are credited on
#[derive(Debug, Clone, Default, Deserialize)]
struct CvPerson {
    name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    volumes: Vec<CvVolumeSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CvVolumeSummary {
    id: Option<u64>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CvEnvelope {
    #[serde(default)]
    error: String,
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    results: serde_json::Value,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// ComicVine is inconsistent about quoting numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// Envelope handling
// ============================================================================

enum Outcome<T> {
    Done(T),
    RateLimited,
}

fn parse_envelope<T: DeserializeOwned>(envelope: CvEnvelope) -> Result<Outcome<T>> {
    match envelope.status_code {
        CV_OK => {
            let results = serde_json::from_value(envelope.results)
                .context("Failed to parse ComicVine results")?;
            Ok(Outcome::Done(results))
        }
        CV_RATE_LIMITED => Ok(Outcome::RateLimited),
        CV_INVALID_KEY => bail!("ComicVine rejected the API key (status 100)"),
        CV_NOT_FOUND => bail!("ComicVine object not found (status 101)"),
        code => bail!("ComicVine returned an error: {} (status {})", envelope.error, code),
    }
}

// ============================================================================
// Search filters
// ============================================================================

/// Volume search criteria; name, author and publisher go to the API filter,
/// the rest are applied locally
#[derive(Debug, Clone, Default)]
pub struct VolumeQuery {
    pub name: Option<String>,
    /// Creator credited on the volume
    pub author: Option<String>,
    /// Matched against the volume name or description
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub start_year: Option<u32>,
    pub count_of_issues: Option<u32>,
}

impl VolumeQuery {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.title.is_none()
            && self.publisher.is_none()
            && self.start_year.is_none()
            && self.count_of_issues.is_none()
    }

    /// The `filter` query parameter, e.g. `name:Sandman,publisher:Vertigo`
    fn api_filter(&self) -> Option<String> {
        let mut filters = Vec::new();
        if let Some(name) = &self.name {
            filters.push(format!("name:{}", filter_value(name)));
        }
        if let Some(author) = &self.author {
            filters.push(format!("person:{}", filter_value(author)));
        }
        if let Some(publisher) = &self.publisher {
            filters.push(format!("publisher:{}", filter_value(publisher)));
        }
        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    }

    pub fn matches(&self, volume: &CvVolume) -> bool {
        if let Some(name) = &self.name {
            let have = volume.name.as_deref().unwrap_or("").to_lowercase();
            if !have.contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            let title = title.to_lowercase();
            let in_name = volume
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&title));
            let in_description = volume
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&title));
            if !in_name && !in_description {
                return false;
            }
        }
        if let Some(publisher) = &self.publisher {
            let have = volume
                .publisher
                .as_ref()
                .and_then(|p| p.name.as_deref())
                .unwrap_or("")
                .to_lowercase();
            if !have.contains(&publisher.to_lowercase()) {
                return false;
            }
        }
        if let Some(year) = self.start_year {
            let have = volume.start_year.as_deref().and_then(|y| y.trim().parse::<u32>().ok());
            if have != Some(year) {
                return false;
            }
        }
        if let Some(count) = self.count_of_issues {
            let have = volume
                .count_of_issues
                .as_deref()
                .and_then(|c| c.trim().parse::<u32>().ok());
            if have != Some(count) {
                return false;
            }
        }
        true
    }
}

/// Commas and colons delimit filters, so they cannot appear in values
fn filter_value(value: &str) -> String {
    value.replace([',', ':'], " ").trim().to_string()
}

// ============================================================================
// API Client
// ============================================================================

pub struct ComicVineClient {
    http: reqwest::Client,
    config: ComicVineConfig,
}

impl ComicVineClient {
    pub fn new(config: ComicVineConfig) -> Result<Self> {
        if config.api_key().is_none() {
            bail!(
                "No ComicVine API key configured. Set api_key under [comicvine] in {} or export CV_API_KEY",
                crate::config::Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            );
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    /// Fetch a full issue record by its numeric ComicVine id
    pub async fn fetch_issue(&self, id: u64) -> Result<CvIssue> {
        self.request(&format!("issue/{}{}/", ISSUE_PREFIX, id), &[])
            .await
            .with_context(|| format!("Failed to fetch ComicVine issue {}", id))
    }

    pub async fn fetch_volume(&self, id: u64) -> Result<CvVolume> {
        self.request(
            &format!("volume/{}{}/", VOLUME_PREFIX, id),
            &[("field_list", VOLUME_FIELDS)],
        )
        .await
        .with_context(|| format!("Failed to fetch ComicVine volume {}", id))
    }

    /// Search volumes, filtering the API's candidates by the whole query
    pub async fn search_volumes(&self, query: &VolumeQuery) -> Result<Vec<CvVolume>> {
        if let (Some(author), None) = (query.author.as_deref(), query.name.as_deref()) {
            return self.search_volumes_by_author(author, query).await;
        }

        let filter = query.api_filter();
        let sort = if query.name.is_some() {
            "date_last_updated:desc"
        } else {
            "name:asc"
        };

        let mut params = vec![("field_list", SEARCH_FIELDS), ("limit", "100"), ("sort", sort)];
        if let Some(filter) = filter.as_deref() {
            params.push(("filter", filter));
        }

        let volumes: Vec<CvVolume> = self
            .request("volumes/", &params)
            .await
            .context("Failed to search ComicVine volumes")?;
        let total = volumes.len();

        let matched: Vec<CvVolume> = volumes.into_iter().filter(|v| query.matches(v)).collect();
        debug!(total, matched = matched.len(), "filtered volume search results");
        Ok(matched)
    }

    /// Find the person first, then fetch and filter the volumes they are
    /// credited on
    async fn search_volumes_by_author(
        &self,
        author: &str,
        query: &VolumeQuery,
    ) -> Result<Vec<CvVolume>> {
        let filter = format!("name:{}", filter_value(author));
        let people: Vec<CvPerson> = self
            .request("people/", &[("field_list", PEOPLE_FIELDS), ("filter", filter.as_str())])
            .await
            .with_context(|| format!("Failed to search ComicVine people for {:?}", author))?;

        let Some(person) = people.into_iter().next() else {
            debug!(author, "no matching person");
            return Ok(Vec::new());
        };
        debug!(
            person = person.name.as_deref().unwrap_or("?"),
            volumes = person.volumes.len(),
            "author-first volume search"
        );

        let ids: Vec<u64> = person.volumes.iter().filter_map(|v| v.id).collect();
        if ids.len() > MAX_AUTHOR_VOLUMES {
            warn!(
                "{:?} is credited on {} volumes, fetching the first {}",
                person.name.as_deref().unwrap_or(author),
                ids.len(),
                MAX_AUTHOR_VOLUMES
            );
        }

        let mut matched = Vec::new();
        for id in ids.into_iter().take(MAX_AUTHOR_VOLUMES) {
            let volume = self.fetch_volume(id).await?;
            if query.matches(&volume) {
                matched.push(volume);
            }
        }
        Ok(matched)
    }

    fn build_url(&self, resource: &str, params: &[(&str, &str)]) -> String {
        let api_key = self.config.api_key().unwrap_or_default();
        let mut url = format!(
            "{}{}?api_key={}&format=json",
            self.base_url(),
            resource,
            urlencoding::encode(api_key)
        );
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn base_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{}/", base)
    }

    async fn request<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = self.build_url(resource, params);
        let mut retries = 0;

        loop {
            // The URL carries the API key, so only the resource is logged
            debug!(resource, ?params, "ComicVine request");

            let response = self
                .http
                .get(&url)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(reqwest::Error::without_url)
                .context("Failed to send request to ComicVine")?;

            match response.status() {
                status if status.is_success() => {
                    let envelope: CvEnvelope = response
                        .json()
                        .await
                        .map_err(reqwest::Error::without_url)
                        .context("Failed to parse ComicVine response")?;
                    match parse_envelope(envelope)? {
                        Outcome::Done(results) => return Ok(results),
                        Outcome::RateLimited => {}
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => {}
                StatusCode::UNAUTHORIZED => {
                    bail!("ComicVine rejected the request (401): check the API key")
                }
                StatusCode::NOT_FOUND => bail!("ComicVine resource not found (404): {}", resource),
                status => bail!("ComicVine returned unexpected status {}", status),
            }

            if retries >= self.config.max_retries {
                bail!(
                    "ComicVine rate limit still exceeded after {} retries",
                    self.config.max_retries
                );
            }
            retries += 1;
            warn!(
                "ComicVine rate limit exceeded, waiting {}s before retry {}/{}",
                self.config.rate_limit_wait_secs, retries, self.config.max_retries
            );
            tokio::time::sleep(Duration::from_secs(self.config.rate_limit_wait_secs)).await;
        }
    }
}

// ============================================================================
// Sync wrappers for the commands
// ============================================================================

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create async runtime")
}

pub fn fetch_issue_sync(client: &ComicVineClient, id: u64) -> Result<CvIssue> {
    runtime()?.block_on(client.fetch_issue(id))
}

pub fn fetch_volume_sync(client: &ComicVineClient, id: u64) -> Result<CvVolume> {
    runtime()?.block_on(client.fetch_volume(id))
}

pub fn search_volumes_sync(client: &ComicVineClient, query: &VolumeQuery) -> Result<Vec<CvVolume>> {
    runtime()?.block_on(client.search_volumes(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    const ISSUE_OK: &str =
        r#"{"error": "OK", "status_code": 1, "results": {"id": 42, "name": "Sleep of the Just"}}"#;
    const RATE_LIMITED: &str = r#"{"error": "Rate limited", "status_code": 107, "results": []}"#;

    /// Serve the canned `(status, body)` responses in order, one per
    /// connection, recording each request line
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/api/", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }
                log.lock().unwrap().push(request_line.trim().to_string());
                write!(
                    stream,
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
            }
        });

        (base_url, requests)
    }

    fn stub_client(base_url: String, max_retries: u32) -> ComicVineClient {
        ComicVineClient::new(ComicVineConfig {
            api_key: Some("secret key".to_string()),
            base_url,
            timeout_secs: 5,
            max_retries,
            rate_limit_wait_secs: 0,
            ..ComicVineConfig::default()
        })
        .unwrap()
    }

    fn test_config() -> ComicVineConfig {
        ComicVineConfig {
            api_key: Some("secret key".to_string()),
            base_url: "https://example.invalid/api".to_string(),
            ..ComicVineConfig::default()
        }
    }

    fn volume(name: &str, publisher: &str, year: &str, count: &str) -> CvVolume {
        CvVolume {
            name: Some(name.to_string()),
            publisher: Some(CvNamed {
                name: Some(publisher.to_string()),
            }),
            start_year: Some(year.to_string()),
            count_of_issues: Some(count.to_string()),
            ..CvVolume::default()
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = ComicVineConfig {
            api_key: None,
            ..ComicVineConfig::default()
        };
        assert!(ComicVineClient::new(config).is_err());
    }

    #[test]
    fn test_build_url_encodes_params() {
        let client = ComicVineClient::new(test_config()).unwrap();
        let url = client.build_url("volumes/", &[("filter", "name:The Sandman")]);
        assert_eq!(
            url,
            "https://example.invalid/api/volumes/?api_key=secret%20key&format=json&filter=name%3AThe%20Sandman"
        );
    }

    #[test]
    fn test_parse_issue_envelope() {
        let json = r#"{
            "error": "OK",
            "status_code": 1,
            "results": {
                "id": 42,
                "name": "Sleep of the Just",
                "issue_number": "1",
                "cover_date": "1989-01-01",
                "volume": {"id": 7, "name": "The Sandman", "start_year": 1989},
                "person_credits": [{"name": "Neil Gaiman", "role": "writer"}],
                "character_credits": null
            }
        }"#;
        let envelope: CvEnvelope = serde_json::from_str(json).unwrap();
        let issue = match parse_envelope::<CvIssue>(envelope).unwrap() {
            Outcome::Done(issue) => issue,
            Outcome::RateLimited => panic!("unexpected rate limit"),
        };
        assert_eq!(issue.name.as_deref(), Some("Sleep of the Just"));
        assert_eq!(issue.volume.unwrap().start_year.as_deref(), Some("1989"));
        assert_eq!(issue.person_credits.len(), 1);
        assert!(issue.character_credits.is_empty());
    }

    #[test]
    fn test_parse_envelope_errors() {
        let not_found: CvEnvelope =
            serde_json::from_str(r#"{"error": "Object Not Found", "status_code": 101, "results": []}"#)
                .unwrap();
        assert!(parse_envelope::<CvIssue>(not_found).is_err());

        let bad_key: CvEnvelope =
            serde_json::from_str(r#"{"error": "Invalid API Key", "status_code": 100, "results": []}"#)
                .unwrap();
        assert!(parse_envelope::<CvIssue>(bad_key).is_err());

        let limited: CvEnvelope =
            serde_json::from_str(r#"{"error": "Rate limited", "status_code": 107, "results": []}"#)
                .unwrap();
        assert!(matches!(
            parse_envelope::<CvIssue>(limited),
            Ok(Outcome::RateLimited)
        ));
    }

    #[test]
    fn test_api_filter() {
        let query = VolumeQuery {
            name: Some("Batman: Year One".to_string()),
            publisher: Some("DC Comics".to_string()),
            ..VolumeQuery::default()
        };
        assert_eq!(
            query.api_filter().as_deref(),
            Some("name:Batman  Year One,publisher:DC Comics")
        );

        let with_author = VolumeQuery {
            name: Some("Sandman".to_string()),
            author: Some("Neil Gaiman".to_string()),
            ..VolumeQuery::default()
        };
        assert_eq!(
            with_author.api_filter().as_deref(),
            Some("name:Sandman,person:Neil Gaiman")
        );
        assert_eq!(VolumeQuery::default().api_filter(), None);
    }

    #[test]
    fn test_volume_query_matches() {
        let sandman = volume("The Sandman", "Vertigo", "1989", "75");
        let query = VolumeQuery {
            name: Some("sandman".to_string()),
            publisher: Some("vert".to_string()),
            start_year: Some(1989),
            count_of_issues: Some(75),
            ..VolumeQuery::default()
        };
        assert!(query.matches(&sandman));

        let wrong_year = VolumeQuery {
            start_year: Some(2012),
            ..VolumeQuery::default()
        };
        assert!(!wrong_year.matches(&sandman));

        let wrong_publisher = VolumeQuery {
            publisher: Some("Marvel".to_string()),
            ..VolumeQuery::default()
        };
        assert!(!wrong_publisher.matches(&sandman));
        assert!(VolumeQuery::default().matches(&sandman));
    }

    #[test]
    fn test_volume_query_title_matches_name_or_description() {
        let mut sandman = volume("The Sandman", "Vertigo", "1989", "75");
        sandman.description = Some("Morpheus, lord of Dreams, escapes captivity".to_string());

        let by_name = VolumeQuery {
            title: Some("SANDMAN".to_string()),
            ..VolumeQuery::default()
        };
        assert!(by_name.matches(&sandman));

        let by_description = VolumeQuery {
            title: Some("lord of dreams".to_string()),
            ..VolumeQuery::default()
        };
        assert!(by_description.matches(&sandman));

        let neither = VolumeQuery {
            title: Some("Swamp Thing".to_string()),
            ..VolumeQuery::default()
        };
        assert!(!neither.matches(&sandman));
        assert!(!neither.is_empty());
    }

    #[tokio::test]
    async fn test_request_retries_after_http_429() {
        let (base_url, requests) = serve(vec![(429, "{}"), (200, ISSUE_OK)]);
        let client = stub_client(base_url, 3);

        let issue = client.fetch_issue(42).await.unwrap();
        assert_eq!(issue.name.as_deref(), Some("Sleep of the Just"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("GET /api/issue/4000-42/?api_key="));
        assert!(requests[0].contains("format=json"));
    }

    #[tokio::test]
    async fn test_request_retries_provider_rate_limit() {
        let (base_url, requests) = serve(vec![(200, RATE_LIMITED), (200, ISSUE_OK)]);
        let client = stub_client(base_url, 3);

        let issue = client.fetch_issue(42).await.unwrap();
        assert_eq!(issue.id, Some(42));
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_request_gives_up_after_max_retries() {
        let (base_url, requests) = serve(vec![(429, "{}"), (200, RATE_LIMITED), (429, "{}")]);
        let client = stub_client(base_url, 2);

        let err = client.fetch_issue(42).await.unwrap_err();
        assert!(format!("{:#}", err).contains("rate limit"), "{:#}", err);
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_request_unauthorized_is_an_error_without_the_key() {
        let (base_url, requests) = serve(vec![(401, "{}")]);
        let client = stub_client(base_url, 3);

        let err = client.fetch_issue(42).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("401"), "{}", message);
        assert!(!message.contains("secret"), "{}", message);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_request_not_found_is_an_error() {
        let (base_url, requests) = serve(vec![(404, "{}")]);
        let client = stub_client(base_url, 3);

        let err = client.fetch_volume(7).await.unwrap_err();
        assert!(format!("{:#}", err).contains("404"), "{:#}", err);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_by_author_fetches_credited_volumes() {
        let people = r#"{"error": "OK", "status_code": 1, "results": [
            {"id": 40439, "name": "Neil Gaiman", "volumes": [
                {"id": 1, "name": "The Sandman"},
                {"id": 2, "name": "Marvel 1602"}
            ]}
        ]}"#;
        let sandman = r#"{"error": "OK", "status_code": 1, "results":
            {"id": 1, "name": "The Sandman", "publisher": {"name": "Vertigo"}, "start_year": "1989"}}"#;
        let marvel = r#"{"error": "OK", "status_code": 1, "results":
            {"id": 2, "name": "Marvel 1602", "publisher": {"name": "Marvel"}, "start_year": "2003"}}"#;
        let (base_url, requests) = serve(vec![(200, people), (200, sandman), (200, marvel)]);
        let client = stub_client(base_url, 3);

        let query = VolumeQuery {
            author: Some("Neil Gaiman".to_string()),
            publisher: Some("vertigo".to_string()),
            ..VolumeQuery::default()
        };
        let volumes = client.search_volumes(&query).await.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name.as_deref(), Some("The Sandman"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].contains("/api/people/"));
        assert!(requests[0].contains("filter=name%3ANeil%20Gaiman"));
        assert!(requests[1].contains("/api/volume/4050-1/"));
        assert!(requests[2].contains("/api/volume/4050-2/"));
    }
}
