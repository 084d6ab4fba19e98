use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default page size for [`crate::Bucket::list`].
pub const DEFAULT_LIST_LIMIT: u32 = 100;
/// Default `cacheControl` (seconds) for uploads.
pub const DEFAULT_CACHE_CONTROL: u64 = 3600;
/// Default MIME type for uploads.
pub const DEFAULT_MIME_TYPE: &str = "text/plain;charset=UTF-8";

/// Parsing of the ISO-8601 timestamps the Storage API returns.
///
/// Accepts calendar dates in extended (`2024-01-01`) or basic (`20240101`)
/// form, optionally followed by `T`, `t` or a space and a time of `HH`,
/// `HH:MM`, `HH:MM:SS` or their basic forms (`HHMM`, `HHMMSS`). Seconds may
/// carry a fraction after `.` or `,`. The offset is `Z`, `±HH`, `±HHMM` or
/// `±HH:MM`. Timestamps without an offset, and bare dates, are taken as UTC.
///
/// Week dates (`2024-W01-1`), ordinal dates (`2024-001`) and offsets with
/// seconds are rejected.
pub mod timestamp {
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parse an ISO-8601 string into a UTC timestamp.
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if !value.is_ascii() {
            return None;
        }
        let (date, rest) = split_date(value)?;
        let Some(rest) = rest else {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        };

        let (time, offset) = split_offset(rest)?;
        let naive = date.and_time(parse_time(time)?);
        match offset {
            None => Some(Utc.from_utc_datetime(&naive)),
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    fn all_digits(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }

    fn digits(s: &str) -> Option<u32> {
        if !all_digits(s) {
            return None;
        }
        s.parse().ok()
    }

    /// Date plus whatever follows the date/time separator.
    fn split_date(value: &str) -> Option<(NaiveDate, Option<&str>)> {
        let (date, rest) = match value.get(4..5) {
            Some("-") => (value.get(..10)?, value.get(10..)?),
            _ => (value.get(..8)?, value.get(8..)?),
        };
        let date = if date.len() == 10 {
            if date.as_bytes()[7] != b'-' {
                return None;
            }
            NaiveDate::from_ymd_opt(
                digits(&date[..4])? as i32,
                digits(&date[5..7])?,
                digits(&date[8..10])?,
            )?
        } else {
            NaiveDate::from_ymd_opt(
                digits(&date[..4])? as i32,
                digits(&date[4..6])?,
                digits(&date[6..8])?,
            )?
        };

        if rest.is_empty() {
            return Some((date, None));
        }
        let time = rest
            .strip_prefix('T')
            .or_else(|| rest.strip_prefix('t'))
            .or_else(|| rest.strip_prefix(' '))?;
        Some((date, Some(time)))
    }

    fn split_offset(rest: &str) -> Option<(&str, Option<FixedOffset>)> {
        if let Some(time) = rest.strip_suffix('Z').or_else(|| rest.strip_suffix('z')) {
            return Some((time, FixedOffset::east_opt(0)));
        }
        let Some(at) = rest.rfind(['+', '-']) else {
            return Some((rest, None));
        };
        let (time, offset) = rest.split_at(at);
        let sign = if offset.starts_with('-') { -1 } else { 1 };
        let offset = &offset[1..];
        let (hours, minutes) = match (offset.len(), offset.find(':')) {
            (2, None) => (digits(offset)?, 0),
            (4, None) => (digits(&offset[..2])?, digits(&offset[2..])?),
            (5, Some(2)) => (digits(&offset[..2])?, digits(&offset[3..])?),
            _ => return None,
        };
        if hours > 23 || minutes > 59 {
            return None;
        }
        let seconds = sign * (hours * 3600 + minutes * 60) as i32;
        Some((time, Some(FixedOffset::east_opt(seconds)?)))
    }

    fn parse_time(time: &str) -> Option<NaiveTime> {
        let (clock, fraction) = match time.find(['.', ',']) {
            Some(at) => (&time[..at], Some(&time[at + 1..])),
            None => (time, None),
        };

        let parts: Vec<&str> = if clock.contains(':') {
            clock.split(':').collect()
        } else {
            (0..clock.len())
                .step_by(2)
                .map(|i| clock.get(i..i + 2))
                .collect::<Option<_>>()?
        };
        if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.len() != 2) {
            return None;
        }
        // A fraction only applies to seconds.
        if fraction.is_some() && parts.len() != 3 {
            return None;
        }

        let hour = digits(parts[0])?;
        let minute = parts.get(1).map_or(Some(0), |p| digits(p))?;
        let second = parts.get(2).map_or(Some(0), |p| digits(p))?;
        let nanos = match fraction {
            Some(f) => {
                if !all_digits(f) {
                    return None;
                }
                let mut padded: String = f.chars().take(9).collect();
                while padded.len() < 9 {
                    padded.push('0');
                }
                digits(&padded)?
            }
            None => 0,
        };
        NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {:?}", raw))
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Bucket metadata as the Storage API returns it.
///
/// Turned into a [`crate::Bucket`] handle together with the client it was
/// fetched through.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BucketRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

/// A stored object returned from list/remove operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    #[serde(default)]
    pub bucket_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    pub id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_accessed_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl File {
    /// A metadata entry as a string, e.g. `mimetype` or `eTag`.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Object size in bytes, when the service reported one.
    pub fn size(&self) -> Option<u64> {
        self.metadata.get("size").and_then(Value::as_u64)
    }
}

/// Options for creating or updating a bucket.
#[derive(Debug, Clone, Default)]
pub struct BucketOptions {
    /// Display name; the bucket id is used when unset.
    pub name: Option<String>,
    pub public: bool,
}

impl BucketOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

/// Request body for bucket creation and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BucketBody<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub public: bool,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort configuration for file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub column: String,
    pub order: SortOrder,
}

impl Default for SortBy {
    fn default() -> Self {
        Self {
            column: "name".to_string(),
            order: SortOrder::Asc,
        }
    }
}

/// Caller overrides for listing files. Unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_by: Option<SortBy>,
    pub search: Option<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort_by(mut self, column: &str, order: SortOrder) -> Self {
        self.sort_by = Some(SortBy {
            column: column.to_string(),
            order,
        });
        self
    }

    pub fn search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }
}

/// Body sent to `/object/list/{bucket}`: the defaults with any
/// [`SearchOptions`] applied field by field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRequest {
    pub prefix: String,
    pub limit: u32,
    pub offset: u32,
    #[serde(rename = "sortBy")]
    pub sort_by: SortBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListRequest {
    pub fn new(path: Option<&str>, options: SearchOptions) -> Self {
        let defaults = Self {
            prefix: path.unwrap_or_default().to_string(),
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            sort_by: SortBy::default(),
            search: None,
        };
        Self {
            limit: options.limit.unwrap_or(defaults.limit),
            offset: options.offset.unwrap_or(defaults.offset),
            sort_by: options.sort_by.unwrap_or(defaults.sort_by),
            search: options.search.or(defaults.search),
            prefix: defaults.prefix,
        }
    }
}

/// Options for file upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    /// Seconds the object may be cached, sent as `cacheControl`.
    pub cache_control: u64,
    pub mime_type: String,
    /// Overwrite an existing object instead of failing.
    pub upsert: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            cache_control: DEFAULT_CACHE_CONTROL,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            upsert: false,
        }
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_control(mut self, seconds: u64) -> Self {
        self.cache_control = seconds;
        self
    }

    pub fn mime_type(mut self, value: &str) -> Self {
        self.mime_type = value.to_string();
        self
    }

    pub fn upsert(mut self, value: bool) -> Self {
        self.upsert = value;
        self
    }
}

/// Body shared by the move and copy endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TransferBody<'a> {
    #[serde(rename = "bucketId")]
    pub bucket_id: &'a str,
    #[serde(rename = "sourceKey")]
    pub source_key: &'a str,
    #[serde(rename = "destinationKey")]
    pub destination_key: &'a str,
}

/// Response from create_signed_url.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    pub signed_url: String,
}
