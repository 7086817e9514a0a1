use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::model::present;

/// The singleton profile document at `posts/site.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteProfile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub tab_text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        SiteProfile {
            title: Some("Antisocial".to_string()),
            description: None,
            avatar: None,
            logo: None,
            favicon: None,
            tab_text: Some("Antisocial".to_string()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSiteRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub logo: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub favicon: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tab_text: Option<Option<String>>,
}

impl UpdateSiteRequest {
    pub fn apply(self, site: &mut SiteProfile) {
        let fields = [
            (self.title, &mut site.title),
            (self.description, &mut site.description),
            (self.avatar, &mut site.avatar),
            (self.logo, &mut site.logo),
            (self.favicon, &mut site.favicon),
            (self.tab_text, &mut site.tab_text),
        ];
        for (patch, slot) in fields {
            if let Some(value) = patch {
                *slot = value;
            }
        }
    }
}
