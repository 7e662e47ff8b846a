// Popup routes, addressed by the location hash: #/<action>/<network>/<identifier>

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Vote { network: String, id: u32 },
    /// A directive the popup has no view for yet (send, stake)
    Unsupported { action: String, network: String, identifier: String },
}

impl Route {
    pub fn from_hash(hash: &str) -> Self {
        let path = hash.trim_start_matches('#').trim_start_matches('/');
        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["vote", network, id] => match id.parse() {
                Ok(id) => Route::Vote {
                    network: network.to_string(),
                    id,
                },
                Err(_) => {
                    log::warn!("Referendum id '{}' is not a number", id);
                    Route::Home
                }
            },
            [action @ ("send" | "stake"), network, identifier] => Route::Unsupported {
                action: action.to_string(),
                network: network.to_string(),
                identifier: identifier.to_string(),
            },
            _ => Route::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_route() {
        assert_eq!(
            Route::from_hash("#/vote/kusama/12"),
            Route::Vote {
                network: "kusama".to_string(),
                id: 12
            }
        );
    }

    #[test]
    fn test_send_and_stake_are_unsupported() {
        assert!(matches!(
            Route::from_hash("#/send/alexander/5Grw"),
            Route::Unsupported { ref action, .. } if action == "send"
        ));
        assert!(matches!(Route::from_hash("#/stake/kusama/x"), Route::Unsupported { .. }));
    }

    #[test]
    fn test_everything_else_is_home() {
        assert_eq!(Route::from_hash(""), Route::Home);
        assert_eq!(Route::from_hash("#/"), Route::Home);
        assert_eq!(Route::from_hash("#/vote/kusama/twelve"), Route::Home);
        assert_eq!(Route::from_hash("#/vote/kusama"), Route::Home);
    }
}
