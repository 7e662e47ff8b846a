use serde::{Deserialize, Serialize};

/// Runtime knobs for the extension. Defaults are the values the extension
/// ships with; a JSON override can be stored under `speckle_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub poller: PollerConfig,
    pub watcher: WatcherConfig,
    pub vote: VoteConfig,
    /// Extension page opened by injected buttons
    pub popup_page: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u32,
    pub initial_rescan_delay_ms: u32,
    pub url_update_rescan_delay_ms: u32,

    // Host page structure (class names are space separated lists)
    pub content_class: String,
    pub button_container_class: String,
    pub augmented_marker: String,
    pub button_wrapper_class: String,
    pub root_element_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteConfig {
    pub refresh_interval_ms: u32,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            poller: PollerConfig::default(),
            watcher: WatcherConfig::default(),
            vote: VoteConfig::default(),
            popup_page: "popup.html".to_string(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            retry_delay_ms: 500,
            initial_rescan_delay_ms: 500,
            url_update_rescan_delay_ms: 1000,
            content_class: "css-1dbjc4n r-1iusvr4 r-16y2uox r-1777fci r-5f2r5o r-1mi0q7o"
                .to_string(),
            button_container_class: "css-1dbjc4n r-18u37iz r-1wtj0ep r-156q2ks r-1mdbhws"
                .to_string(),
            augmented_marker: "speckle-button-added".to_string(),
            button_wrapper_class: "rn-1oszu61 rn-1efd50x rn-14skgim rn-rull8r rn-mm0ijv \
                rn-13yce4e rn-fnigne rn-ndvcnb rn-gxnn5r rn-deolkf rn-6koalj rn-1qe8dj5 \
                rn-1iusvr4 rn-18u37iz rn-16y2uox rn-1h0z5md rn-1mnahxq rn-61z16t rn-p1pxzi \
                rn-11wrixw rn-ifefl9 rn-bcqeeo rn-wk8lta rn-9aemit rn-1mdbw0j rn-gy4na3 \
                rn-bnwqim rn-1lgpqti"
                .to_string(),
            root_element_id: "react-root".to_string(),
        }
    }
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
        }
    }
}

impl ExtensionConfig {
    /// Parse a stored override. Anything unreadable falls back to defaults.
    pub fn from_override(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring malformed config override: {}", e);
                Self::default()
            }
        }
    }
}
