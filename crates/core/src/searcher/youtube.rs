//! YouTube Data API v3 backend for search and detail lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::YouTubeConfig;
use crate::metrics;

use super::duration::parse_iso8601_duration;
use super::{
    CandidateReference, MetadataError, MetadataFetcher, RegionRestriction, SearchError,
    SearchPage, SearchResponse, Searcher, Thumbnail, Thumbnails, VideoDetails, MAX_DETAIL_BATCH,
};

/// Failure classification shared by both endpoints before it is mapped
/// into the endpoint-specific error type.
enum CallFailure {
    Timeout,
    Connection(String),
    Quota(String),
    Api(String),
}

impl From<CallFailure> for SearchError {
    fn from(f: CallFailure) -> Self {
        match f {
            CallFailure::Timeout => SearchError::Timeout,
            CallFailure::Connection(m) => SearchError::ConnectionFailed(m),
            CallFailure::Quota(m) => SearchError::QuotaExceeded(m),
            CallFailure::Api(m) => SearchError::ApiError(m),
        }
    }
}

impl From<CallFailure> for MetadataError {
    fn from(f: CallFailure) -> Self {
        match f {
            CallFailure::Timeout => MetadataError::Timeout,
            CallFailure::Connection(m) => MetadataError::ConnectionFailed(m),
            CallFailure::Quota(m) => MetadataError::QuotaExceeded(m),
            CallFailure::Api(m) => MetadataError::ApiError(m),
        }
    }
}

/// YouTube-backed [`Searcher`] and [`MetadataFetcher`].
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: YouTubeConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(concat!("clipcurator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Build the `search.list` URL for one page.
    fn build_search_url(&self, keyword: &str, page: &SearchPage) -> String {
        let mut url = format!(
            "{}/search?part=snippet&type=video&order=relevance&q={}&maxResults={}&key={}",
            self.base_url(),
            urlencoding::encode(keyword),
            page.effective_page_size(),
            urlencoding::encode(&self.config.api_key)
        );

        if let Some(token) = &page.continuation_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        if let Some(duration) = &self.config.video_duration {
            url.push_str(&format!("&videoDuration={}", urlencoding::encode(duration)));
        }
        if let Some(region) = &self.config.region_code {
            url.push_str(&format!("&regionCode={}", urlencoding::encode(region)));
        }
        if let Some(lang) = &self.config.relevance_language {
            url.push_str(&format!("&relevanceLanguage={}", urlencoding::encode(lang)));
        }
        if let Some(safe) = &self.config.safe_search {
            url.push_str(&format!("&safeSearch={}", urlencoding::encode(safe)));
        }

        url
    }

    /// Build the `videos.list` URL for a batch of ids.
    fn build_videos_url(&self, video_ids: &[String]) -> String {
        let ids = video_ids.join(",");
        format!(
            "{}/videos?part=snippet,contentDetails,statistics,status&id={}&maxResults={}&key={}",
            self.base_url(),
            urlencoding::encode(&ids),
            video_ids.len(),
            urlencoding::encode(&self.config.api_key)
        )
    }

    /// Issue a GET with a per-call timeout and decode the JSON body.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        timeout: Duration,
        operation: &str,
    ) -> Result<T, CallFailure> {
        let start = Instant::now();
        let result = self.get_json_inner(url, timeout).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["youtube", operation])
            .observe(start.elapsed().as_secs_f64());
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["youtube", operation, status])
            .inc();

        result
    }

    async fn get_json_inner<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, CallFailure> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallFailure::Timeout
                } else if e.is_connect() {
                    CallFailure::Connection(e.to_string())
                } else {
                    CallFailure::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &body));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                CallFailure::Timeout
            } else {
                CallFailure::Api(format!("Failed to parse response: {}", e))
            }
        })
    }
}

#[async_trait]
impl Searcher for YouTubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    fn unit_cost(&self) -> u32 {
        self.config.search_unit_cost
    }

    async fn search(
        &self,
        keyword: &str,
        page: &SearchPage,
    ) -> Result<SearchResponse, SearchError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SearchError::InvalidKeyword);
        }

        let url = self.build_search_url(keyword, page);
        debug!(
            keyword = keyword,
            page_size = page.effective_page_size(),
            has_token = page.continuation_token.is_some(),
            "Searching YouTube"
        );

        let response: ApiSearchResponse = self
            .get_json(
                &url,
                Duration::from_secs(self.config.search_timeout_secs),
                "search",
            )
            .await?;

        let total_available = response.page_info.map(|p| p.total_results).unwrap_or(0);
        let candidates: Vec<_> = response
            .items
            .into_iter()
            .filter_map(into_candidate)
            .collect();

        debug!(
            keyword = keyword,
            results = candidates.len(),
            has_next = response.next_page_token.is_some(),
            "YouTube search complete"
        );

        Ok(SearchResponse {
            candidates,
            next_token: response.next_page_token.filter(|t| !t.is_empty()),
            total_available,
            units_consumed: self.config.search_unit_cost,
        })
    }
}

#[async_trait]
impl MetadataFetcher for YouTubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    fn batch_unit_cost(&self) -> u32 {
        self.config.detail_unit_cost
    }

    async fn fetch_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoDetails>, MetadataError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }
        if video_ids.len() > MAX_DETAIL_BATCH {
            return Err(MetadataError::BatchTooLarge {
                requested: video_ids.len(),
                limit: MAX_DETAIL_BATCH,
            });
        }

        let url = self.build_videos_url(video_ids);
        debug!(ids = video_ids.len(), "Fetching YouTube video details");

        let response: ApiVideosResponse = self
            .get_json(
                &url,
                Duration::from_secs(self.config.detail_timeout_secs),
                "videos",
            )
            .await?;

        let details: Vec<_> = response.items.into_iter().map(into_details).collect();
        if details.len() < video_ids.len() {
            debug!(
                requested = video_ids.len(),
                returned = details.len(),
                "Some videos missing from detail response"
            );
        }

        Ok(details)
    }
}

fn classify_http_error(status: StatusCode, body: &str) -> CallFailure {
    let snippet: String = body.chars().take(200).collect();
    if status == StatusCode::FORBIDDEN
        && (body.contains("quotaExceeded") || body.contains("dailyLimitExceeded"))
    {
        warn!(status = %status, "YouTube quota exhausted");
        return CallFailure::Quota(snippet);
    }
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return CallFailure::Timeout;
    }
    CallFailure::Api(format!("HTTP {}: {}", status, snippet))
}

fn into_candidate(item: ApiSearchItem) -> Option<CandidateReference> {
    let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
    let snippet = item.snippet.unwrap_or_default();

    Some(CandidateReference {
        video_id,
        title: snippet.title,
        description: snippet.description,
        channel_id: snippet.channel_id,
        channel_title: snippet.channel_title,
        thumbnails: into_thumbnails(snippet.thumbnails),
        published_at: snippet.published_at.as_deref().and_then(parse_timestamp),
    })
}

fn into_details(item: ApiVideo) -> VideoDetails {
    let snippet = item.snippet.unwrap_or_default();
    let content = item.content_details.unwrap_or_default();
    let stats = item.statistics.unwrap_or_default();
    let status = item.status.unwrap_or_default();
    let region = content.region_restriction.unwrap_or_default();

    VideoDetails {
        video_id: item.id,
        title: snippet.title,
        description: snippet.description,
        channel_id: snippet.channel_id,
        channel_title: snippet.channel_title,
        thumbnails: into_thumbnails(snippet.thumbnails),
        published_at: snippet.published_at.as_deref().and_then(parse_timestamp),
        tags: snippet.tags.unwrap_or_default(),
        category_id: snippet.category_id,
        default_language: snippet.default_language,
        duration_seconds: content.duration.as_deref().and_then(parse_iso8601_duration),
        view_count: parse_counter(stats.view_count.as_deref()),
        like_count: parse_counter(stats.like_count.as_deref()),
        comment_count: parse_counter(stats.comment_count.as_deref()),
        embeddable: status.embeddable,
        privacy_status: status.privacy_status,
        upload_status: status.upload_status,
        has_captions: content.caption.as_deref() == Some("true"),
        licensed_content: content.licensed_content.unwrap_or(false),
        region_restriction: RegionRestriction {
            allowed: region.allowed.unwrap_or_default(),
            blocked: region.blocked.unwrap_or_default(),
        },
        definition: content.definition,
    }
}

fn into_thumbnails(raw: Option<HashMap<String, ApiThumbnail>>) -> Thumbnails {
    raw.unwrap_or_default()
        .into_iter()
        .filter(|(_, t)| !t.url.is_empty())
        .map(|(name, t)| {
            (
                name,
                Thumbnail {
                    url: t.url,
                    width: t.width,
                    height: t.height,
                },
            )
        })
        .collect()
}

/// Counters arrive as decimal strings; hidden or missing counters are zero.
fn parse_counter(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// YouTube API response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSearchResponse {
    next_page_token: Option<String>,
    page_info: Option<ApiPageInfo>,
    #[serde(default)]
    items: Vec<ApiSearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPageInfo {
    #[serde(default)]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct ApiSearchItem {
    id: ApiSearchId,
    snippet: Option<ApiSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSearchId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiSnippet {
    published_at: Option<String>,
    channel_id: String,
    title: String,
    description: String,
    thumbnails: Option<HashMap<String, ApiThumbnail>>,
    channel_title: String,
    tags: Option<Vec<String>>,
    category_id: Option<String>,
    default_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiThumbnail {
    #[serde(default)]
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiVideosResponse {
    #[serde(default)]
    items: Vec<ApiVideo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVideo {
    #[serde(default)]
    id: String,
    snippet: Option<ApiSnippet>,
    content_details: Option<ApiContentDetails>,
    statistics: Option<ApiStatistics>,
    status: Option<ApiStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiContentDetails {
    duration: Option<String>,
    definition: Option<String>,
    caption: Option<String>,
    licensed_content: Option<bool>,
    region_restriction: Option<ApiRegionRestriction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiRegionRestriction {
    allowed: Option<Vec<String>>,
    blocked: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiStatus {
    upload_status: Option<String>,
    privacy_status: Option<String>,
    embeddable: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> YouTubeConfig {
        YouTubeConfig {
            api_key: "test-key".to_string(),
            base_url: "https://example.test/youtube/v3/".to_string(),
            ..YouTubeConfig::default()
        }
    }

    #[test]
    fn test_build_search_url_first_page() {
        let client = YouTubeClient::new(test_config()).unwrap();
        let url = client.build_search_url("cat videos", &SearchPage::first(50));

        assert!(url.starts_with("https://example.test/youtube/v3/search?"));
        assert!(url.contains("q=cat%20videos"));
        assert!(url.contains("maxResults=50"));
        assert!(url.contains("key=test-key"));
        assert!(url.contains("videoDuration=short"));
        assert!(!url.contains("pageToken"));
    }

    #[test]
    fn test_build_search_url_with_token_and_cap() {
        let client = YouTubeClient::new(test_config()).unwrap();
        let page = SearchPage {
            continuation_token: Some("CDIQAA".to_string()),
            page_size: 500,
        };
        let url = client.build_search_url("cats", &page);

        assert!(url.contains("pageToken=CDIQAA"));
        assert!(url.contains("maxResults=50"));
    }

    #[test]
    fn test_build_videos_url() {
        let client = YouTubeClient::new(test_config()).unwrap();
        let url = client.build_videos_url(&["a1".to_string(), "b2".to_string()]);

        assert!(url.contains("/videos?part=snippet,contentDetails,statistics,status"));
        assert!(url.contains("id=a1%2Cb2"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "nextPageToken": "NEXT",
            "pageInfo": {"totalResults": 1000000, "resultsPerPage": 2},
            "items": [
                {
                    "id": {"kind": "youtube#video", "videoId": "vid1"},
                    "snippet": {
                        "publishedAt": "2024-05-01T12:00:00Z",
                        "channelId": "chan1",
                        "title": "First",
                        "description": "search description",
                        "thumbnails": {"default": {"url": "https://i.test/1.jpg", "width": 120, "height": 90}},
                        "channelTitle": "Channel One"
                    }
                },
                {
                    "id": {"kind": "youtube#channel", "channelId": "chan2"}
                }
            ]
        }"#;
        let parsed: ApiSearchResponse = serde_json::from_str(json).unwrap();
        let candidates: Vec<_> = parsed.items.into_iter().filter_map(into_candidate).collect();

        assert_eq!(parsed.next_page_token.as_deref(), Some("NEXT"));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].video_id, "vid1");
        assert_eq!(candidates[0].description, "search description");
        assert_eq!(candidates[0].thumbnails["default"].width, Some(120));
        assert!(candidates[0].published_at.is_some());
    }

    #[test]
    fn test_parse_video_details() {
        let json = r#"{
            "items": [{
                "id": "vid1",
                "snippet": {
                    "publishedAt": "2024-05-01T12:00:00Z",
                    "channelId": "chan1",
                    "title": "First",
                    "description": "detail description",
                    "channelTitle": "Channel One",
                    "tags": ["funny", "cats"],
                    "categoryId": "15"
                },
                "contentDetails": {
                    "duration": "PT45S",
                    "definition": "hd",
                    "caption": "true",
                    "licensedContent": true,
                    "regionRestriction": {"blocked": ["DE"]}
                },
                "statistics": {"viewCount": "150000", "likeCount": "9000", "commentCount": "300"},
                "status": {"uploadStatus": "processed", "privacyStatus": "public", "embeddable": true}
            }]
        }"#;
        let parsed: ApiVideosResponse = serde_json::from_str(json).unwrap();
        let details = into_details(parsed.items.into_iter().next().unwrap());

        assert_eq!(details.video_id, "vid1");
        assert_eq!(details.duration_seconds, Some(45));
        assert_eq!(details.view_count, 150_000);
        assert_eq!(details.like_count, 9_000);
        assert_eq!(details.comment_count, 300);
        assert_eq!(details.tags, vec!["funny", "cats"]);
        assert!(details.has_captions);
        assert!(details.licensed_content);
        assert_eq!(details.region_restriction.blocked, vec!["DE"]);
        assert!(details.is_well_formed());
        assert!(details.is_public());
    }

    #[test]
    fn test_parse_video_details_sparse() {
        let json = r#"{"items": [{"id": "vid2", "statistics": {"viewCount": "12"}}]}"#;
        let parsed: ApiVideosResponse = serde_json::from_str(json).unwrap();
        let details = into_details(parsed.items.into_iter().next().unwrap());

        assert_eq!(details.view_count, 12);
        assert_eq!(details.like_count, 0);
        assert!(details.tags.is_empty());
        assert!(!details.has_captions);
        assert!(!details.is_well_formed());
    }

    #[test]
    fn test_parse_video_details_tolerates_malformed_items() {
        let json = r#"{
            "items": [
                {
                    "snippet": {"title": "No id"},
                    "contentDetails": {"duration": "PT30S"},
                    "status": {"privacyStatus": "public", "embeddable": true}
                },
                {
                    "id": "vid3",
                    "snippet": {
                        "title": "Broken thumbnail",
                        "thumbnails": {
                            "default": {"width": 120},
                            "high": {"url": "https://i.test/3.jpg"}
                        }
                    },
                    "contentDetails": {"duration": "PT30S"},
                    "status": {"privacyStatus": "public", "embeddable": true}
                }
            ]
        }"#;
        let parsed: ApiVideosResponse = serde_json::from_str(json).unwrap();
        let details: Vec<_> = parsed.items.into_iter().map(into_details).collect();

        assert_eq!(details.len(), 2);
        assert!(details[0].video_id.is_empty());
        assert!(!details[0].is_well_formed());

        assert_eq!(details[1].video_id, "vid3");
        assert!(details[1].is_well_formed());
        assert!(!details[1].thumbnails.contains_key("default"));
        assert_eq!(details[1].thumbnails["high"].url, "https://i.test/3.jpg");
    }

    #[test]
    fn test_classify_quota_error() {
        let body = r#"{"error": {"code": 403, "errors": [{"reason": "quotaExceeded"}]}}"#;
        let err: SearchError = classify_http_error(StatusCode::FORBIDDEN, body).into();
        assert!(matches!(err, SearchError::QuotaExceeded(_)));

        let err: MetadataError = classify_http_error(StatusCode::INTERNAL_SERVER_ERROR, "boom").into();
        assert!(matches!(err, MetadataError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_search_rejects_empty_keyword() {
        let client = YouTubeClient::new(test_config()).unwrap();
        let result = client.search("   ", &SearchPage::first(10)).await;
        assert!(matches!(result, Err(SearchError::InvalidKeyword)));
    }

    #[tokio::test]
    async fn test_fetch_details_rejects_oversized_batch() {
        let client = YouTubeClient::new(test_config()).unwrap();
        let ids: Vec<String> = (0..51).map(|i| format!("id{}", i)).collect();
        let result = client.fetch_details(&ids).await;
        assert!(matches!(
            result,
            Err(MetadataError::BatchTooLarge { requested: 51, limit: 50 })
        ));
    }
}
