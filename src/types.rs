// Response models for the Premiumize.me API.
//
// Every model implements `ApiResponse`, which ties the Rust type to the
// shape its JSON must have. The client validates against that shape
// before serde ever sees the body, so a successful decode always means
// the body matched the declared contract.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ValidationIssue};
use crate::field;
use crate::shape::Shape;

const STATUS: Shape = Shape::Enum(&["success", "error"]);
const ITEM_KIND: Shape = Shape::Enum(&["file", "folder"]);
const TRANSCODE_STATUS: Shape = Shape::Enum(&[
    "not_applicable",
    "running",
    "finished",
    "pending",
    "good_as_is",
    "error",
    "fetch_pending",
]);
const VIRUS_SCAN: Shape = Shape::Enum(&["ok", "infected", "error"]);

/// A response model with a declared JSON shape.
pub trait ApiResponse: DeserializeOwned {
    const SHAPE: Shape;

    /// Cross-field rules the shape alone cannot express.
    fn invariant_issues(&self) -> Vec<ValidationIssue> {
        Vec::new()
    }
}

/// Responses carrying the API's own `status` tag.
///
/// A body can pass validation and still report `"error"`; transport
/// success says nothing about logical success, so callers check this.
pub trait StatusTagged: Sized {
    fn status(&self) -> ResponseStatus;
    fn message(&self) -> Option<&str>;

    /// Turn a `status: "error"` body into [`ApiError::Logical`].
    fn into_success(self) -> Result<Self, ApiError> {
        match self.status() {
            ResponseStatus::Success => Ok(self),
            ResponseStatus::Error => Err(ApiError::Logical {
                message: self.message().unwrap_or("no message provided").to_string(),
            }),
        }
    }
}

macro_rules! status_tagged {
    ($($ty:ty),+ $(,)?) => {
        $(impl StatusTagged for $ty {
            fn status(&self) -> ResponseStatus {
                self.status
            }

            fn message(&self) -> Option<&str> {
                self.message.as_deref()
            }
        })+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeStatus {
    NotApplicable,
    Running,
    Finished,
    Pending,
    GoodAsIs,
    Error,
    FetchPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirusScan {
    Ok,
    Infected,
    Error,
}

// ─── services/list ──────────────────────────────────────────────────────

/// Hosts the account can use, grouped by download mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub cache: Vec<String>,
    pub directdl: Vec<String>,
    pub queue: Vec<String>,
    pub fairusefactor: BTreeMap<String, f64>,
    pub aliases: BTreeMap<String, Vec<String>>,
    pub regexpatterns: BTreeMap<String, Vec<String>>,
}

impl ApiResponse for ServiceCatalog {
    const SHAPE: Shape = Shape::Object(&[
        field!("cache", Shape::Array(&Shape::String)),
        field!("directdl", Shape::Array(&Shape::String)),
        field!("queue", Shape::Array(&Shape::String)),
        field!("fairusefactor", Shape::Record(&Shape::Number)),
        field!("aliases", Shape::Record(&Shape::Array(&Shape::String))),
        field!("regexpatterns", Shape::Record(&Shape::Array(&Shape::String))),
    ]);
}

// ─── cache/check ────────────────────────────────────────────────────────

/// Cache lookup result. The API answers with parallel arrays, index `i`
/// of each describing the `i`-th queried URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheCheckResult {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response: Vec<bool>,
    pub transcoded: Vec<bool>,
    pub filename: Vec<String>,
    pub filesize: Vec<String>,
}

/// One queried URL's row out of a [`CacheCheckResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry<'a> {
    pub filename: &'a str,
    pub cached: bool,
    pub transcoded: bool,
    pub filesize: &'a str,
}

impl CacheCheckResult {
    pub fn empty() -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            response: Vec::new(),
            transcoded: Vec::new(),
            filename: Vec::new(),
            filesize: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.filename.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filename.is_empty()
    }

    /// Record-per-URL view. Relies on the equal-length invariant the
    /// client enforces before handing the value out.
    pub fn entries(&self) -> impl Iterator<Item = CacheEntry<'_>> {
        self.filename
            .iter()
            .zip(&self.response)
            .zip(&self.transcoded)
            .zip(&self.filesize)
            .map(|(((filename, cached), transcoded), filesize)| CacheEntry {
                filename,
                cached: *cached,
                transcoded: *transcoded,
                filesize,
            })
    }
}

impl ApiResponse for CacheCheckResult {
    const SHAPE: Shape = Shape::Object(&[
        field!("status", STATUS),
        field!("message"?, Shape::String),
        field!("response", Shape::Array(&Shape::Bool)),
        field!("transcoded", Shape::Array(&Shape::Bool)),
        field!("filename", Shape::Array(&Shape::String)),
        field!("filesize", Shape::Array(&Shape::String)),
    ]);

    fn invariant_issues(&self) -> Vec<ValidationIssue> {
        let expected = self.filename.len();
        [
            ("response", self.response.len()),
            ("transcoded", self.transcoded.len()),
            ("filesize", self.filesize.len()),
        ]
        .into_iter()
        .filter(|(_, len)| *len != expected)
        .map(|(name, len)| {
            ValidationIssue::new(
                name,
                format!("length {len} does not match filename length {expected}"),
            )
        })
        .collect()
    }
}

// ─── folder/list, folder/search ─────────────────────────────────────────

/// A file or folder as it appears inside a folder listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcode_status: Option<TranscodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virus_scan: Option<VirusScan>,
}

const ITEM: Shape = Shape::Object(&[
    field!("id", Shape::String),
    field!("name", Shape::String),
    field!("type", ITEM_KIND),
    field!("size"?, Shape::Number),
    field!("created_at"?, Shape::Integer),
    field!("mime_type"?, Shape::String),
    field!("transcode_status"?, TRANSCODE_STATUS),
    field!("link"?, Shape::String),
    field!("stream_link"?, Shape::String),
    field!("virus_scan"?, VIRUS_SCAN),
]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

const BREADCRUMB: Shape = Shape::Object(&[
    field!("id", Shape::String),
    field!("name", Shape::String),
    field!("parent_id"?, Shape::String),
]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListing {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub content: Vec<Item>,
    /// Ancestors from the root down to the listed folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Vec<Breadcrumb>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl ApiResponse for FolderListing {
    const SHAPE: Shape = Shape::Object(&[
        field!("status", STATUS),
        field!("message"?, Shape::String),
        field!("content", Shape::Array(&ITEM)),
        field!("breadcrumbs"?, Shape::Array(&BREADCRUMB)),
        field!("name"?, Shape::String),
        field!("parent_id"?, Shape::String),
        field!("folder_id"?, Shape::String),
    ]);
}

// ─── folder/create, folder/rename, folder/delete ────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMutationResult {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Only set by `folder/create`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ApiResponse for FolderMutationResult {
    const SHAPE: Shape = Shape::Object(&[
        field!("status", STATUS),
        field!("message"?, Shape::String),
        field!("id"?, Shape::String),
    ]);
}

// ─── item/listall ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedFile {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub size: f64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virus_scan: Option<VirusScan>,
    /// Full path from the account root.
    pub path: String,
}

const LISTED_FILE: Shape = Shape::Object(&[
    field!("id", Shape::String),
    field!("name", Shape::String),
    field!("created_at", Shape::Integer),
    field!("size", Shape::Number),
    field!("mime_type", Shape::String),
    field!("virus_scan"?, VIRUS_SCAN),
    field!("path", Shape::String),
]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemListAllResult {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub files: Vec<ListedFile>,
}

impl ApiResponse for ItemListAllResult {
    const SHAPE: Shape = Shape::Object(&[
        field!("status", STATUS),
        field!("message"?, Shape::String),
        field!("files", Shape::Array(&LISTED_FILE)),
    ]);
}

// ─── item/details ───────────────────────────────────────────────────────

/// Full detail view of a single item. Media fields are only present
/// when they apply to the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcode_status: Option<TranscodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virus_scan: Option<VirusScan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl ItemDetails {
    /// Streaming URL if the item was transcoded, otherwise the direct link.
    pub fn playable_link(&self) -> Option<&str> {
        self.stream_link.as_deref().or(self.link.as_deref())
    }
}

impl ApiResponse for ItemDetails {
    const SHAPE: Shape = Shape::Object(&[
        field!("status"?, STATUS),
        field!("message"?, Shape::String),
        field!("id", Shape::String),
        field!("name", Shape::String),
        field!("type", ITEM_KIND),
        field!("size"?, Shape::Number),
        field!("created_at"?, Shape::Integer),
        field!("folder_id"?, Shape::String),
        field!("mime_type"?, Shape::String),
        field!("transcode_status"?, TRANSCODE_STATUS),
        field!("virus_scan"?, VIRUS_SCAN),
        field!("link"?, Shape::String),
        field!("stream_link"?, Shape::String),
        field!("acodec"?, Shape::String),
        field!("vcodec"?, Shape::String),
        field!("resx"?, Shape::Number),
        field!("resy"?, Shape::Number),
        field!("duration"?, Shape::Number),
    ]);
}

impl StatusTagged for ItemDetails {
    fn status(&self) -> ResponseStatus {
        self.status.unwrap_or(ResponseStatus::Success)
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

// ─── transfer/list, transfer/create ─────────────────────────────────────

/// A download job on the Premiumize side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    /// Free-form state reported by the API (`running`, `finished`, ...).
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

const TRANSFER: Shape = Shape::Object(&[
    field!("id", Shape::String),
    field!("status", Shape::String),
    field!("name"?, Shape::String),
    field!("message"?, Shape::String),
    field!("progress"?, Shape::Number),
    field!("src"?, Shape::String),
    field!("folder_id"?, Shape::String),
    field!("file_id"?, Shape::String),
]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferList {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub transfers: Vec<Transfer>,
}

impl ApiResponse for TransferList {
    const SHAPE: Shape = Shape::Object(&[
        field!("status", STATUS),
        field!("message"?, Shape::String),
        field!("transfers", Shape::Array(&TRANSFER)),
    ]);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCreated {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ApiResponse for TransferCreated {
    const SHAPE: Shape = Shape::Object(&[
        field!("status", STATUS),
        field!("message"?, Shape::String),
        field!("id"?, Shape::String),
        field!("name"?, Shape::String),
        field!("type"?, Shape::String),
    ]);
}

status_tagged!(
    CacheCheckResult,
    FolderListing,
    FolderMutationResult,
    ItemListAllResult,
    TransferList,
    TransferCreated,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode<T: ApiResponse>(value: serde_json::Value) -> T {
        assert!(T::SHAPE.validate(&value).is_empty(), "shape rejected {value}");
        serde_json::from_value(value).expect("decode")
    }

    #[test]
    fn minimal_values_decode_for_every_model() {
        let _: ServiceCatalog = decode(ServiceCatalog::SHAPE.minimal());
        let _: CacheCheckResult = decode(CacheCheckResult::SHAPE.minimal());
        let _: FolderListing = decode(FolderListing::SHAPE.minimal());
        let _: FolderMutationResult = decode(FolderMutationResult::SHAPE.minimal());
        let _: ItemListAllResult = decode(ItemListAllResult::SHAPE.minimal());
        let _: ItemDetails = decode(ItemDetails::SHAPE.minimal());
        let _: TransferList = decode(TransferList::SHAPE.minimal());
        let _: TransferCreated = decode(TransferCreated::SHAPE.minimal());
    }

    #[test]
    fn cache_entries_zip_parallel_arrays() {
        let result: CacheCheckResult = decode(json!({
            "status": "success",
            "response": [true, false],
            "transcoded": [false, false],
            "filename": ["a.mkv", ""],
            "filesize": ["1024", ""]
        }));
        assert!(result.invariant_issues().is_empty());
        let entries: Vec<_> = result.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "a.mkv");
        assert!(entries[0].cached);
        assert!(!entries[1].cached);
    }

    #[test]
    fn cache_length_mismatch_is_reported_per_array() {
        let result: CacheCheckResult = decode(json!({
            "status": "success",
            "response": [true],
            "transcoded": [],
            "filename": ["a", "b"],
            "filesize": ["1", "2"]
        }));
        let paths: Vec<_> = result.invariant_issues().into_iter().map(|i| i.path).collect();
        assert_eq!(paths, vec!["response", "transcoded"]);
    }

    #[test]
    fn folder_item_keeps_type_on_serialize() {
        let listing: FolderListing = decode(json!({
            "status": "success",
            "content": [{"id": "1", "name": "Movies", "type": "folder"}],
            "breadcrumbs": [{"id": "0", "name": "root"}]
        }));
        assert_eq!(listing.content[0].kind, ItemKind::Folder);
        let out = serde_json::to_value(&listing).unwrap();
        assert_eq!(out["content"][0]["type"], "folder");
        assert!(out["content"][0].get("size").is_none());
    }

    #[test]
    fn into_success_maps_error_status() {
        let result = FolderMutationResult {
            status: ResponseStatus::Error,
            message: Some("duplicate name".into()),
            id: None,
        };
        match result.into_success() {
            Err(ApiError::Logical { message }) => assert_eq!(message, "duplicate name"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn item_details_without_status_counts_as_success() {
        let details: ItemDetails = decode(json!({
            "id": "x", "name": "clip.mp4", "type": "file",
            "link": "https://dl/x", "stream_link": null
        }));
        assert_eq!(details.playable_link(), Some("https://dl/x"));
        assert!(details.into_success().is_ok());
    }
}
