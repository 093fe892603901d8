use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Anonymous public file host used as an image store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CdnProvider {
    /// uguu.se - `files[]` part, JSON response
    #[default]
    Uguu,
    /// catbox.moe - `reqtype=fileupload` + `fileToUpload`, plain-text response
    Catbox,
}

impl CdnProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "uguu" => Some(CdnProvider::Uguu),
            "catbox" | "catxbox" => Some(CdnProvider::Catbox),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CdnProvider::Uguu => "uguu",
            CdnProvider::Catbox => "catbox",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            CdnProvider::Uguu => "https://uguu.se/upload.php",
            CdnProvider::Catbox => "https://catbox.moe/user/api.php",
        }
    }

    /// Multipart field carrying the file
    pub fn file_field(self) -> &'static str {
        match self {
            CdnProvider::Uguu => "files[]",
            CdnProvider::Catbox => "fileToUpload",
        }
    }

    /// Text fields sent alongside the file part
    pub fn extra_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            CdnProvider::Uguu => &[],
            CdnProvider::Catbox => &[("reqtype", "fileupload")],
        }
    }
}

impl std::fmt::Display for CdnProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL returned by a CDN after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadResult {
    pub url: String,
    pub provider: CdnProvider,
}
