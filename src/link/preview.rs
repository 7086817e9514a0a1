use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

use crate::utils::error::CustomError;

const USER_AGENT: &str = "Mozilla/5.0";

fn selectors(raw: &[&str]) -> Vec<Selector> {
    raw.iter()
        .map(|s| Selector::parse(s).expect("static preview selector"))
        .collect()
}

static TITLE_CHAIN: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"meta[property="og:title"]"#, "title"]));

static DESCRIPTION_CHAIN: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"meta[property="og:description"]"#,
        r#"meta[name="description"]"#,
        r#"meta[name="twitter:description"]"#,
    ])
});

static IMAGE_CHAIN: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"meta[property="og:image"]"#,
        r#"meta[name="twitter:image"]"#,
        r#"link[rel="apple-touch-icon"]"#,
        r#"link[rel="icon"]"#,
        r#"link[rel="shortcut icon"]"#,
    ])
});

/// Preview of a remote page. On fetch failure every metadata field is `None`
/// and `error` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkPreview {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LinkPreview {
    fn failed(url: String, error: String) -> Self {
        LinkPreview {
            url,
            title: None,
            description: None,
            image: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub url: Option<String>,
}

/// Prefix schemeless input with `http://`.
pub fn normalize_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("http://{}", input)
    }
}

fn element_value(el: ElementRef<'_>) -> Option<String> {
    let value = match el.value().name() {
        "meta" => el.value().attr("content").map(str::to_string),
        "title" => Some(el.text().collect::<String>()),
        _ => el
            .value()
            .attr("href")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| el.value().attr("content"))
            .map(str::to_string),
    };
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First non-empty value down the chain, looking only at the first match of each selector.
fn first_value(document: &Html, chain: &[Selector]) -> Option<String> {
    chain
        .iter()
        .find_map(|selector| document.select(selector).next().and_then(element_value))
}

pub fn favicon_fallback(page: &Url) -> String {
    let host = page.host_str().unwrap_or("example.com");
    format!("https://www.google.com/s2/favicons?domain={}&sz=128", host)
}

/// Resolve title, description and image from `html`, served from `page`.
///
/// Relative image URLs resolve against `page`; with no image at all the host's
/// favicon from a public favicon service is used.
pub fn extract_metadata(html: &str, page: &Url) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = first_value(&document, &TITLE_CHAIN);
    let description = first_value(&document, &DESCRIPTION_CHAIN);
    let image = match first_value(&document, &IMAGE_CHAIN) {
        Some(raw) => page.join(&raw).map(|u| u.to_string()).unwrap_or(raw),
        None => favicon_fallback(page),
    };

    PageMetadata {
        title,
        description,
        image: Some(image),
    }
}

/// Fetches pages and extracts preview metadata, never failing the caller.
#[derive(Debug, Clone)]
pub struct LinkPreviewer {
    client: reqwest::Client,
}

impl LinkPreviewer {
    pub fn new(timeout: Duration) -> Result<Self, CustomError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(LinkPreviewer { client })
    }

    pub async fn preview(&self, input: &str) -> LinkPreview {
        let url = normalize_url(input);

        match self.fetch(&url).await {
            Ok((page, html)) => {
                let meta = extract_metadata(&html, &page);
                LinkPreview {
                    url,
                    title: meta.title,
                    description: meta.description,
                    image: meta.image,
                    error: None,
                }
            }
            Err(e) => {
                log::warn!("link preview for {} failed: {}", url, e);
                LinkPreview::failed(url, e.to_string())
            }
        }
    }

    /// GET the page, returning the post-redirect URL and the body.
    async fn fetch(&self, url: &str) -> Result<(Url, String), reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let page = response.url().clone();
        let body = response.text().await?;
        Ok((page, body))
    }
}
