//! Request and response shapes for the space search endpoint
//!
//! This module turns a page request into query parameters and a response
//! body into a [`PageResponse`], normalizing each platform record into a
//! [`VideoRecord`] while keeping the original object for the raw export.

use crate::config::FingerprintConfig;
use crate::signing::Params;
use crate::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of the search, before signing
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub creator_id: &'a str,
    pub page_number: u32,
    pub fingerprint: &'a FingerprintConfig,
}

impl<'a> PageRequest<'a> {
    pub fn new(creator_id: &'a str, page_number: u32, fingerprint: &'a FingerprintConfig) -> Self {
        Self {
            creator_id,
            page_number,
            fingerprint,
        }
    }

    /// Query parameters in the order the endpoint documents them
    pub fn to_params(&self) -> Params {
        vec![
            ("mid".to_string(), self.creator_id.to_string()),
            ("pn".to_string(), self.page_number.to_string()),
            ("dm_img_list".to_string(), self.fingerprint.dm_img_list.clone()),
            ("dm_img_str".to_string(), self.fingerprint.dm_img_str.clone()),
            (
                "dm_cover_img_str".to_string(),
                self.fingerprint.dm_cover_img_str.clone(),
            ),
        ]
    }
}

/// Paging metadata returned with every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "count")]
    pub total_item_count: u64,

    #[serde(rename = "ps")]
    pub page_size: u64,
}

impl PageInfo {
    /// Number of pages needed to cover every item
    ///
    /// Returns `None` when the page size is zero for a non-empty catalogue.
    pub fn page_count(&self) -> Option<u32> {
        page_count(self.total_item_count, self.page_size)
    }
}

/// Computes `ceil(total / page_size)` with integer arithmetic
///
/// An empty catalogue still occupies one (empty) page.
pub fn page_count(total_item_count: u64, page_size: u64) -> Option<u32> {
    if total_item_count == 0 {
        return Some(1);
    }
    if page_size == 0 {
        return None;
    }

    let pages = total_item_count / page_size + u64::from(total_item_count % page_size != 0);
    u32::try_from(pages).ok()
}

/// A single video, reduced to the columns that are exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub title: String,
    pub play_count: u64,
    pub duration_label: String,
}

/// A decoded page of search results
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status_code: i64,
    pub page_info: PageInfo,
    pub items: Vec<VideoRecord>,
    /// The platform objects the items were extracted from, same order
    pub raw_items: Vec<Value>,
}

#[derive(Deserialize)]
struct Envelope {
    code: Option<i64>,
    #[serde(default)]
    message: String,
    data: Option<Value>,
}

#[derive(Deserialize)]
struct SearchData {
    page: PageInfo,
    list: VideoList,
}

#[derive(Deserialize)]
struct VideoList {
    // An empty catalogue sends `null`; the key itself is always present.
    vlist: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawVideo {
    title: String,
    play: PlayCount,
    length: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlayCount {
    Number(i64),
    Text(String),
}

impl PlayCount {
    // Hidden counts are reported as "--".
    fn normalize(self) -> u64 {
        match self {
            PlayCount::Number(n) => u64::try_from(n).unwrap_or(0),
            PlayCount::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

impl PageResponse {
    /// Decodes a response body for `page`
    ///
    /// # Returns
    ///
    /// * `Ok(PageResponse)` - The envelope code was zero and the payload was complete
    /// * `Err(FetchError::Api)` - The envelope carried a non-zero code
    /// * `Err(FetchError::Envelope)` - The body was not the expected JSON shape
    pub fn from_body(page: u32, body: &str) -> Result<Self, FetchError> {
        let envelope_error = |detail: String| FetchError::Envelope { page, detail };

        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| envelope_error(format!("body is not a JSON envelope: {}", e)))?;

        let code = envelope
            .code
            .ok_or_else(|| envelope_error("missing 'code'".to_string()))?;

        if code != 0 {
            return Err(FetchError::Api {
                page,
                code,
                message: envelope.message,
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| envelope_error("missing 'data'".to_string()))?;
        if data.pointer("/list/vlist").is_none() {
            return Err(envelope_error("missing 'data.list.vlist'".to_string()));
        }
        let data: SearchData = serde_json::from_value(data)
            .map_err(|e| envelope_error(format!("unexpected 'data' shape: {}", e)))?;

        let raw_items = data.list.vlist.unwrap_or_default();
        let items = raw_items
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                RawVideo::deserialize(raw)
                    .map(|v| VideoRecord {
                        title: v.title,
                        play_count: v.play.normalize(),
                        duration_label: v.length,
                    })
                    .map_err(|e| envelope_error(format!("video #{} is malformed: {}", index, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            status_code: code,
            page_info: data.page,
            items,
            raw_items,
        })
    }
}

/// Every video of a crawl, in page order then in-page order
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    records: Vec<VideoRecord>,
    raw: Vec<Value>,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page's items after everything collected so far
    pub fn extend(&mut self, page: PageResponse) {
        self.records.extend(page.items);
        self.raw.extend(page.raw_items);
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    /// Untouched platform objects, aligned with [`records`](Self::records)
    pub fn raw_items(&self) -> &[Value] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<VideoRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_BODY: &str = r#"{
        "code": 0,
        "message": "0",
        "data": {
            "list": {
                "tlist": {},
                "vlist": [
                    {"aid": 1, "title": "First", "play": 1200, "length": "03:21"},
                    {"aid": 2, "title": "Second", "play": "--", "length": "10:00"}
                ]
            },
            "page": {"pn": 1, "ps": 30, "count": 2}
        }
    }"#;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(75, 30), Some(3));
        assert_eq!(page_count(60, 30), Some(2));
        assert_eq!(page_count(30, 30), Some(1));
        assert_eq!(page_count(1, 30), Some(1));
        assert_eq!(page_count(31, 30), Some(2));
        assert_eq!(page_count(0, 30), Some(1));
        assert_eq!(page_count(0, 0), Some(1));
        assert_eq!(page_count(5, 0), None);
    }

    #[test]
    fn test_page_count_matches_div_plus_remainder() {
        for total in 1..200u64 {
            for size in 1..40u64 {
                let expected = total / size + if total % size > 0 { 1 } else { 0 };
                assert_eq!(page_count(total, size), Some(expected as u32));
            }
        }
    }

    #[test]
    fn test_request_params() {
        let fingerprint = FingerprintConfig::default();
        let params = PageRequest::new("12345", 3, &fingerprint).to_params();

        let names: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["mid", "pn", "dm_img_list", "dm_img_str", "dm_cover_img_str"]
        );
        assert_eq!(params[0].1, "12345");
        assert_eq!(params[1].1, "3");
        assert_eq!(params[2].1, "[]");
    }

    #[test]
    fn test_decode_page() {
        let page = PageResponse::from_body(1, PAGE_BODY).unwrap();

        assert_eq!(page.status_code, 0);
        assert_eq!(
            page.page_info,
            PageInfo {
                total_item_count: 2,
                page_size: 30
            }
        );
        assert_eq!(
            page.items,
            vec![
                VideoRecord {
                    title: "First".to_string(),
                    play_count: 1200,
                    duration_label: "03:21".to_string(),
                },
                VideoRecord {
                    title: "Second".to_string(),
                    play_count: 0,
                    duration_label: "10:00".to_string(),
                },
            ]
        );
        assert_eq!(page.raw_items[0]["aid"], 1);
    }

    #[test]
    fn test_decode_empty_catalogue() {
        let body = r#"{"code":0,"data":{"list":{"vlist":null},"page":{"pn":1,"ps":30,"count":0}}}"#;
        let page = PageResponse::from_body(1, body).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page_info.page_count(), Some(1));
    }

    #[test]
    fn test_non_zero_code() {
        let body = r#"{"code":-352,"message":"风控校验失败","data":null}"#;
        let err = PageResponse::from_body(2, body).unwrap_err();

        match err {
            FetchError::Api {
                page,
                code,
                ref message,
            } => {
                assert_eq!(page, 2);
                assert_eq!(code, -352);
                assert_eq!(message, "风控校验失败");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_envelopes() {
        for body in [
            "<html>blocked</html>",
            r#"{"message":"no code"}"#,
            r#"{"code":0}"#,
            r#"{"code":0,"data":{"list":{"vlist":[]}}}"#,
            r#"{"code":0,"data":{"list":{"tlist":{}},"page":{"pn":2,"ps":30,"count":75}}}"#,
            r#"{"code":0,"data":{"page":{"pn":1,"ps":30,"count":0}}}"#,
            r#"{"code":0,"data":{"page":{"count":1,"ps":30},"list":{"vlist":[{"title":"x"}]}}}"#,
        ] {
            let err = PageResponse::from_body(4, body).unwrap_err();
            assert!(err.is_envelope(), "expected envelope error for {}", body);
            assert_eq!(err.page(), 4);
        }
    }

    #[test]
    fn test_aggregate_preserves_order() {
        let mut aggregate = AggregateResult::new();
        aggregate.extend(PageResponse::from_body(1, PAGE_BODY).unwrap());
        aggregate.extend(PageResponse::from_body(2, PAGE_BODY).unwrap());

        let titles: Vec<&str> = aggregate
            .records()
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["First", "Second", "First", "Second"]);
        assert_eq!(aggregate.raw_items().len(), 4);
    }
}
