use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// YouTube URL shapes, checked in order; the first capture group is the video id.
static YOUTUBE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_\-]{6,})",
        r"(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_\-]{6,})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("youtube pattern"))
    .collect()
});

static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpe?g|gif|webp|avif|svg)(\?.*)?$").expect("image extension pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedKind {
    Video,
    Photo,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    #[serde(rename = "type")]
    pub kind: DetectedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub url: String,
}

/// YouTube video id if `url` is a watch page or short link.
pub fn youtube_id(url: &str) -> Option<String> {
    YOUTUBE_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Classify a URL as a video, a photo or a plain link.
pub fn classify(url: &str) -> Detection {
    if let Some(id) = youtube_id(url) {
        return Detection {
            kind: DetectedKind::Video,
            platform: Some("youtube".to_string()),
            id: Some(id),
        };
    }

    let kind = if IMAGE_EXTENSION.is_match(url) {
        DetectedKind::Photo
    } else {
        DetectedKind::Link
    };
    Detection {
        kind,
        platform: None,
        id: None,
    }
}
