use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// `#<network><action><identifier>`, e.g. `#kusamavote12`
const DETECTOR: &str = r"#(.*?)(vote|tip|stake)(\w*)";

fn detector() -> Option<&'static Regex> {
    static DETECTOR_RE: OnceLock<Option<Regex>> = OnceLock::new();
    DETECTOR_RE
        .get_or_init(|| match Regex::new(DETECTOR) {
            Ok(re) => Some(re),
            Err(e) => {
                log::error!("Directive pattern does not compile: {}", e);
                None
            }
        })
        .as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Vote,
    Tip,
    Stake,
}

impl UserAction {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "vote" => Some(UserAction::Vote),
            "tip" => Some(UserAction::Tip),
            "stake" => Some(UserAction::Stake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::Vote => "vote",
            UserAction::Tip => "tip",
            UserAction::Stake => "stake",
        }
    }

    /// Popup route segment; tips open the send view.
    pub fn route_segment(&self) -> &'static str {
        match self {
            UserAction::Tip => "send",
            other => other.as_str(),
        }
    }

    pub fn button_class(&self) -> String {
        format!("speckle-button-{}", self.as_str())
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action embedded in a post's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub network: String,
    pub action: UserAction,
    pub identifier: String,
}

impl Directive {
    /// First directive found in `text`, if any.
    pub fn detect(text: &str) -> Option<Self> {
        let captures = detector()?.captures(text)?;
        let action = UserAction::parse(captures.get(2)?.as_str())?;
        Some(Directive {
            network: captures.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            action,
            identifier: captures.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    /// Hash route of the popup view handling this directive.
    pub fn route(&self) -> String {
        format!(
            "#/{}/{}/{}",
            self.action.route_segment(),
            self.network,
            self.identifier
        )
    }

    /// Full popup URL given the extension page base URL.
    pub fn popup_url(&self, page_url: &str) -> String {
        format!("{}{}", page_url, self.route())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_vote_directive() {
        let directive = Directive::detect("Referendum is live! #kusamavote12 go vote").unwrap();
        assert_eq!(directive.network, "kusama");
        assert_eq!(directive.action, UserAction::Vote);
        assert_eq!(directive.identifier, "12");
        assert_eq!(directive.route(), "#/vote/kusama/12");
    }

    #[test]
    fn test_tip_routes_to_send_but_keeps_class() {
        let directive = Directive::detect("thanks #alexandertip5GrwvaEF").unwrap();
        assert_eq!(directive.action, UserAction::Tip);
        assert_eq!(directive.identifier, "5GrwvaEF");
        assert_eq!(directive.action.button_class(), "speckle-button-tip");
        assert_eq!(
            directive.popup_url("chrome-extension://abc/popup.html"),
            "chrome-extension://abc/popup.html#/send/alexander/5GrwvaEF"
        );
    }

    #[test]
    fn test_network_is_lazy() {
        // the first action word ends the network name
        let directive = Directive::detect("#edgewarestakevote").unwrap();
        assert_eq!(directive.network, "edgeware");
        assert_eq!(directive.action, UserAction::Stake);
        assert_eq!(directive.identifier, "vote");
    }

    #[test]
    fn test_plain_text_has_no_directive() {
        assert_eq!(Directive::detect("no hashtags here, just vote"), None);
        assert_eq!(Directive::detect("#polkadot rocks"), None);
    }

    #[test]
    fn test_detector_pattern_builds() {
        assert!(detector().is_some());
    }
}
