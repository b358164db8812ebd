//! Backend store contract
//!
//! Every debrid/file-hosting backend sits behind the same capability
//! surface: check cached hashes, add magnets, poll status, generate
//! links. Dispatch is by an explicit backend enumeration, never runtime
//! type inspection.
//!
//! - `http` - generic JSON-over-HTTP implementation of the contract
//! - `multi` - priority-ordered bindings and the multi-store cache check

pub mod http;
pub mod multi;

pub use http::HttpStore;
pub use multi::{check_magnets, CacheCheckOutcome, StoreBinding};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Store Identity
// =============================================================================

/// The known backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreName {
    AllDebrid,
    DebridLink,
    EasyDebrid,
    Offcloud,
    Premiumize,
    PikPak,
    RealDebrid,
    TorBox,
}

impl StoreName {
    /// Short code used in display names, links and cache-check results
    pub fn code(&self) -> &'static str {
        match self {
            StoreName::AllDebrid => "ad",
            StoreName::DebridLink => "dl",
            StoreName::EasyDebrid => "ed",
            StoreName::Offcloud => "oc",
            StoreName::Premiumize => "pm",
            StoreName::PikPak => "pp",
            StoreName::RealDebrid => "rd",
            StoreName::TorBox => "tb",
        }
    }

    pub fn from_code(code: &str) -> Option<StoreName> {
        match code.to_lowercase().as_str() {
            "ad" => Some(StoreName::AllDebrid),
            "dl" => Some(StoreName::DebridLink),
            "ed" => Some(StoreName::EasyDebrid),
            "oc" => Some(StoreName::Offcloud),
            "pm" => Some(StoreName::Premiumize),
            "pp" | "pkp" => Some(StoreName::PikPak),
            "rd" => Some(StoreName::RealDebrid),
            "tb" | "trb" => Some(StoreName::TorBox),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<StoreName> {
        match name.to_lowercase().as_str() {
            "alldebrid" => Some(StoreName::AllDebrid),
            "debridlink" => Some(StoreName::DebridLink),
            "easydebrid" => Some(StoreName::EasyDebrid),
            "offcloud" => Some(StoreName::Offcloud),
            "premiumize" => Some(StoreName::Premiumize),
            "pikpak" => Some(StoreName::PikPak),
            "realdebrid" => Some(StoreName::RealDebrid),
            "torbox" => Some(StoreName::TorBox),
            _ => None,
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreName::AllDebrid => "alldebrid",
            StoreName::DebridLink => "debridlink",
            StoreName::EasyDebrid => "easydebrid",
            StoreName::Offcloud => "offcloud",
            StoreName::Premiumize => "premiumize",
            StoreName::PikPak => "pikpak",
            StoreName::RealDebrid => "realdebrid",
            StoreName::TorBox => "torbox",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Magnet State
// =============================================================================

/// Magnet status across all backends; `cached` is only meaningful for
/// cache checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnetStatus {
    Cached,
    Queued,
    Downloading,
    Processing,
    Downloaded,
    Uploading,
    Failed,
    Invalid,
    Unknown,
}

impl fmt::Display for MagnetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MagnetStatus::Cached => "cached",
            MagnetStatus::Queued => "queued",
            MagnetStatus::Downloading => "downloading",
            MagnetStatus::Processing => "processing",
            MagnetStatus::Downloaded => "downloaded",
            MagnetStatus::Uploading => "uploading",
            MagnetStatus::Failed => "failed",
            MagnetStatus::Invalid => "invalid",
            MagnetStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// One file inside a magnet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagnetFile {
    #[serde(rename = "index", default)]
    pub idx: i64,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

// =============================================================================
// Request / Response Shapes
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GetUserParams {
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Premium,
    Trial,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub subscription_status: SubscriptionStatus,
}

#[derive(Debug, Clone, Default)]
pub struct CheckMagnetParams {
    pub api_key: String,
    pub magnets: Vec<String>,
    pub client_ip: Option<String>,
    pub sid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckMagnetItem {
    pub hash: String,
    #[serde(default)]
    pub magnet: String,
    pub status: MagnetStatus,
    #[serde(default)]
    pub files: Vec<MagnetFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckMagnetData {
    pub items: Vec<CheckMagnetItem>,
}

#[derive(Debug, Clone, Default)]
pub struct AddMagnetParams {
    pub api_key: String,
    pub magnet: String,
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMagnetData {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub magnet: String,
    #[serde(default)]
    pub name: String,
    pub status: MagnetStatus,
    #[serde(default)]
    pub files: Vec<MagnetFile>,
}

#[derive(Debug, Clone, Default)]
pub struct GetMagnetParams {
    pub api_key: String,
    pub id: String,
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMagnetData {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub name: String,
    pub status: MagnetStatus,
    #[serde(default)]
    pub files: Vec<MagnetFile>,
}

#[derive(Debug, Clone, Default)]
pub struct ListMagnetsParams {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMagnetsItem {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub name: String,
    pub status: MagnetStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMagnetsData {
    pub items: Vec<ListMagnetsItem>,
}

#[derive(Debug, Clone, Default)]
pub struct RemoveMagnetParams {
    pub api_key: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMagnetData {
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateLinkParams {
    pub api_key: String,
    pub link: String,
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateLinkData {
    pub link: String,
}

// =============================================================================
// Errors & Contract
// =============================================================================

/// Store API error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store not configured: {0}")]
    NotConfigured(String),

    #[error("unauthorized (401)")]
    Unauthorized,

    #[error("not found (404)")]
    NotFound,

    #[error("store returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// The uniform backend capability contract
#[async_trait]
pub trait Store: Send + Sync {
    fn name(&self) -> StoreName;

    async fn get_user(&self, params: &GetUserParams) -> Result<User, StoreError>;
    async fn check_magnet(&self, params: &CheckMagnetParams)
        -> Result<CheckMagnetData, StoreError>;
    async fn add_magnet(&self, params: &AddMagnetParams) -> Result<AddMagnetData, StoreError>;
    async fn get_magnet(&self, params: &GetMagnetParams) -> Result<GetMagnetData, StoreError>;
    async fn list_magnets(&self, params: &ListMagnetsParams)
        -> Result<ListMagnetsData, StoreError>;
    async fn remove_magnet(
        &self,
        params: &RemoveMagnetParams,
    ) -> Result<RemoveMagnetData, StoreError>;
    async fn generate_link(
        &self,
        params: &GenerateLinkParams,
    ) -> Result<GenerateLinkData, StoreError>;
}
