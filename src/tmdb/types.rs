use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(rename = "type")]
    #[serde(default)]
    pub video_type: Option<String>,
}

impl Video {
    pub fn is_youtube(&self) -> bool {
        self.site.as_deref() == Some("YouTube")
    }

    pub fn is_trailer(&self) -> bool {
        self.video_type.as_deref() == Some("Trailer")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailerResponse {
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TrailerResponse {
    pub fn found(key: String) -> Self {
        Self {
            key: Some(key),
            message: None,
        }
    }

    pub fn missing(message: &str) -> Self {
        Self {
            key: None,
            message: Some(message.to_string()),
        }
    }
}
