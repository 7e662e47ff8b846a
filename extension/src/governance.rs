// Referendum data and vote tallying

use crate::chain::{
    deserialize_balance, format_balance, ChainClient, ChainProperties, TxStatus, VoteRequest,
};
use crate::error::ChainError;
use futures::StreamExt;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Referendum {
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub documentation: String,
}

impl Referendum {
    pub fn header(&self) -> String {
        format!("{}.{}", self.section, self.method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferendumVote {
    #[serde(deserialize_with = "deserialize_balance")]
    pub balance: u128,
    pub aye: bool,
}

/// Tally of the votes cast on one referendum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    pub vote_count: u32,
    pub vote_count_aye: u32,
    pub vote_count_nay: u32,
    pub voted_aye: u128,
    pub voted_nay: u128,
    pub voted_total: u128,
}

impl Ballot {
    pub fn tally(votes: &[ReferendumVote]) -> Self {
        votes.iter().fold(Ballot::default(), |mut ballot, vote| {
            if vote.aye {
                ballot.vote_count_aye += 1;
                ballot.voted_aye = ballot.voted_aye.saturating_add(vote.balance);
            } else {
                ballot.vote_count_nay += 1;
                ballot.voted_nay = ballot.voted_nay.saturating_add(vote.balance);
            }
            ballot.vote_count += 1;
            ballot.voted_total = ballot.voted_total.saturating_add(vote.balance);
            ballot
        })
    }

    pub fn aye_percent(&self) -> f64 {
        self.share_of_total(self.voted_aye)
    }

    pub fn nay_percent(&self) -> f64 {
        self.share_of_total(self.voted_nay)
    }

    // Two decimals of precision, computed in integers first.
    fn share_of_total(&self, voted: u128) -> f64 {
        if self.vote_count == 0 || self.voted_total == 0 {
            return 0.0;
        }
        let basis_points = voted.saturating_mul(10_000) / self.voted_total;
        basis_points as f64 / 100.0
    }
}

/// Everything the vote view shows once the referendum has loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferendumView {
    pub referendum: Referendum,
    pub ballot: Ballot,
    pub properties: ChainProperties,
}

impl ReferendumView {
    pub fn aye_label(&self) -> String {
        format!(
            "Aye, {} ({})",
            format_balance(self.ballot.voted_aye, &self.properties),
            self.ballot.vote_count_aye
        )
    }

    pub fn nay_label(&self) -> String {
        format!(
            "Nay, {} ({})",
            format_balance(self.ballot.voted_nay, &self.properties),
            self.ballot.vote_count_nay
        )
    }
}

/// Convert a tip typed by the user into base units.
///
/// `si_power` is the power of the selected SI prefix (0 for the plain unit).
/// Invalid input yields 0, matching what the vote form submits for garbage.
pub fn parse_tip(input: &str, decimals: u32, si_power: i32) -> u128 {
    let precision = decimals as i64 + si_power as i64;
    if !(0..=38).contains(&precision) {
        return 0;
    }
    let precision = precision as u32;

    let parts: Vec<&str> = input.trim().split('.').collect();
    let parse_digits = |s: &str| -> Option<u128> {
        if s.is_empty() {
            return Some(0);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };

    let tip = match parts.as_slice() {
        [whole] => parse_digits(whole).and_then(|w| w.checked_mul(10u128.pow(precision))),
        [whole, fraction] => {
            let Some(shift) = precision.checked_sub(fraction.len() as u32) else {
                return 0;
            };
            let big = parse_digits(whole).and_then(|w| w.checked_mul(10u128.pow(precision)));
            let small = parse_digits(fraction).and_then(|f| f.checked_mul(10u128.pow(shift)));
            big.zip(small).and_then(|(b, s)| b.checked_add(s))
        }
        _ => None,
    };
    tip.unwrap_or(0)
}

/// Fetch a referendum with its current tally. `None` when no such
/// referendum exists.
pub async fn load_referendum(
    client: &dyn ChainClient,
    properties: ChainProperties,
    id: u32,
) -> Result<Option<ReferendumView>, ChainError> {
    let Some(referendum) = client.referendum(id).await? else {
        log::debug!("Referendum #{} not found", id);
        return Ok(None);
    };
    let votes = client.referendum_votes(id).await?;
    Ok(Some(ReferendumView {
        referendum,
        ballot: Ballot::tally(&votes),
        properties,
    }))
}

/// A vote as entered in the popup, before the tip is converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteIntent {
    pub address: String,
    pub referendum_id: u32,
    pub aye: bool,
    pub tip_input: String,
    pub si_power: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Included { block_hash: String },
    Rejected(String),
}

/// Submit a vote and follow its status until it settles.
///
/// `on_submitted` runs once the extrinsic has been handed to the chain
/// client. Accounts without free balance are refused before signing.
pub async fn cast_vote(
    client: &dyn ChainClient,
    properties: &ChainProperties,
    intent: VoteIntent,
    on_submitted: impl FnOnce(),
) -> Result<VoteOutcome, ChainError> {
    let free = client.free_balance(&intent.address).await?;
    if free == 0 {
        return Err(ChainError::ZeroBalance);
    }

    let request = VoteRequest {
        address: intent.address,
        referendum_id: intent.referendum_id,
        aye: intent.aye,
        tip: parse_tip(&intent.tip_input, properties.token_decimals, intent.si_power),
    };
    log::info!(
        "Voting {} on referendum #{} (tip {})",
        if request.aye { "aye" } else { "nay" },
        request.referendum_id,
        request.tip
    );
    let mut statuses = client.submit_vote(request).await?;
    on_submitted();

    while let Some(status) = statuses.next().await {
        match status {
            TxStatus::Pending | TxStatus::Ready => log::debug!("Vote status: {:?}", status),
            TxStatus::Finalized { block_hash, events } => {
                if let Some(failed) = events.iter().find(|e| e.is_failure()) {
                    return Ok(VoteOutcome::Rejected(format!(
                        "{}.{} {}",
                        failed.section, failed.method, failed.data
                    )));
                }
                if events.iter().any(|e| e.is_success()) {
                    log::info!("Vote included in block {}", block_hash);
                    return Ok(VoteOutcome::Included { block_hash });
                }
                return Ok(VoteOutcome::Rejected(format!(
                    "finalized in {} without a result event",
                    block_hash
                )));
            }
            TxStatus::Invalid => return Ok(VoteOutcome::Rejected("transaction invalid".into())),
            TxStatus::Dropped => return Ok(VoteOutcome::Rejected("transaction dropped".into())),
            TxStatus::Usurped => return Ok(VoteOutcome::Rejected("transaction usurped".into())),
        }
    }
    Ok(VoteOutcome::Rejected("status stream closed early".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ApiStatus, TxEvent, TxStatusStream};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    struct FakeClient {
        free: u128,
        statuses: Vec<TxStatus>,
        submitted: RefCell<Vec<VoteRequest>>,
    }

    impl FakeClient {
        fn new(free: u128, statuses: Vec<TxStatus>) -> Self {
            Self {
                free,
                statuses,
                submitted: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl ChainClient for FakeClient {
        fn status(&self) -> ApiStatus {
            ApiStatus::Ready
        }

        async fn properties(&self) -> Result<ChainProperties, ChainError> {
            Ok(ksm())
        }

        async fn free_balance(&self, _address: &str) -> Result<u128, ChainError> {
            Ok(self.free)
        }

        async fn referendum(&self, _id: u32) -> Result<Option<Referendum>, ChainError> {
            Ok(None)
        }

        async fn referendum_votes(&self, _id: u32) -> Result<Vec<ReferendumVote>, ChainError> {
            Ok(Vec::new())
        }

        async fn submit_vote(&self, request: VoteRequest) -> Result<TxStatusStream, ChainError> {
            self.submitted.borrow_mut().push(request);
            Ok(futures::stream::iter(self.statuses.clone()).boxed_local())
        }
    }

    fn ksm() -> ChainProperties {
        ChainProperties {
            token_decimals: 12,
            token_symbol: "KSM".to_string(),
        }
    }

    fn intent(aye: bool, tip: &str) -> VoteIntent {
        VoteIntent {
            address: "5Grw".to_string(),
            referendum_id: 7,
            aye,
            tip_input: tip.to_string(),
            si_power: 0,
        }
    }

    fn event(method: &str) -> TxEvent {
        TxEvent {
            section: "system".to_string(),
            method: method.to_string(),
            data: String::new(),
        }
    }

    fn vote(balance: u128, aye: bool) -> ReferendumVote {
        ReferendumVote { balance, aye }
    }

    #[test]
    fn test_tally_splits_aye_and_nay() {
        let ballot = Ballot::tally(&[vote(300, true), vote(100, false), vote(600, true)]);
        assert_eq!(ballot.vote_count, 3);
        assert_eq!(ballot.vote_count_aye, 2);
        assert_eq!(ballot.vote_count_nay, 1);
        assert_eq!(ballot.voted_aye, 900);
        assert_eq!(ballot.voted_nay, 100);
        assert_eq!(ballot.voted_total, 1000);
        assert_eq!(ballot.aye_percent(), 90.0);
        assert_eq!(ballot.nay_percent(), 10.0);
    }

    #[test]
    fn test_percentages_keep_two_decimals() {
        let ballot = Ballot::tally(&[vote(1, true), vote(2, false)]);
        assert_eq!(ballot.aye_percent(), 33.33);
        assert_eq!(ballot.nay_percent(), 66.66);
    }

    #[test]
    fn test_empty_ballot_is_zero() {
        let ballot = Ballot::tally(&[]);
        assert_eq!(ballot, Ballot::default());
        assert_eq!(ballot.aye_percent(), 0.0);
    }

    #[test]
    fn test_votes_decode_from_string_balances() {
        let votes: Vec<ReferendumVote> =
            serde_json::from_str(r#"[{"balance":"1000000000000","aye":true}]"#).unwrap();
        assert_eq!(votes[0], vote(1_000_000_000_000, true));
    }

    #[test]
    fn test_referendum_header() {
        let referendum = Referendum {
            section: "system".to_string(),
            method: "setCode".to_string(),
            documentation: String::new(),
        };
        assert_eq!(referendum.header(), "system.setCode");
    }

    #[test]
    fn test_view_labels() {
        let view = ReferendumView {
            referendum: Referendum {
                section: "democracy".to_string(),
                method: "propose".to_string(),
                documentation: String::new(),
            },
            ballot: Ballot::tally(&[vote(2_000, true), vote(500, false), vote(1_000, false)]),
            properties: ChainProperties {
                token_decimals: 3,
                token_symbol: "KSM".to_string(),
            },
        };
        assert_eq!(view.aye_label(), "Aye, 2.0000 KSM (1)");
        assert_eq!(view.nay_label(), "Nay, 1.5000 KSM (2)");
    }

    #[test]
    fn test_parse_tip() {
        assert_eq!(parse_tip("2", 12, 0), 2_000_000_000_000);
        assert_eq!(parse_tip("1.5", 12, 0), 1_500_000_000_000);
        assert_eq!(parse_tip("0.001", 3, 0), 1);
        assert_eq!(parse_tip("1", 12, -3), 1_000_000_000);
        assert_eq!(parse_tip("", 12, 0), 0);
    }

    #[test]
    fn test_parse_tip_rejects_garbage() {
        assert_eq!(parse_tip("1.2.3", 12, 0), 0);
        assert_eq!(parse_tip("abc", 12, 0), 0);
        assert_eq!(parse_tip("0.0001", 3, 0), 0);
        assert_eq!(parse_tip("-1", 12, 0), 0);
    }

    #[test]
    fn test_missing_referendum_is_none() {
        let client = FakeClient::new(5, vec![]);
        assert_eq!(block_on(load_referendum(&client, ksm(), 3)), Ok(None));
    }

    #[test]
    fn test_cast_vote_refuses_empty_account() {
        let client = FakeClient::new(0, vec![]);
        let submitted = Cell::new(false);
        let result = block_on(cast_vote(&client, &ksm(), intent(true, ""), || submitted.set(true)));
        assert_eq!(result, Err(ChainError::ZeroBalance));
        assert!(!submitted.get());
        assert!(client.submitted.borrow().is_empty());
    }

    #[test]
    fn test_cast_vote_included() {
        let client = FakeClient::new(
            5,
            vec![
                TxStatus::Ready,
                TxStatus::Finalized {
                    block_hash: "0xabc".to_string(),
                    events: vec![event("ExtrinsicSuccess")],
                },
            ],
        );
        let submitted = Cell::new(false);
        let result = block_on(cast_vote(&client, &ksm(), intent(false, "0.5"), || submitted.set(true)));
        assert_eq!(
            result,
            Ok(VoteOutcome::Included {
                block_hash: "0xabc".to_string()
            })
        );
        assert!(submitted.get());
        let request = &client.submitted.borrow()[0];
        assert!(!request.aye);
        assert_eq!(request.referendum_id, 7);
        assert_eq!(request.tip, 500_000_000_000);
    }

    #[test]
    fn test_cast_vote_rejections() {
        let failed = FakeClient::new(
            5,
            vec![TxStatus::Finalized {
                block_hash: "0xdef".to_string(),
                events: vec![event("ExtrinsicFailed")],
            }],
        );
        let result = block_on(cast_vote(&failed, &ksm(), intent(true, ""), || {}));
        assert!(matches!(result, Ok(VoteOutcome::Rejected(ref why)) if why.contains("ExtrinsicFailed")));

        let dropped = FakeClient::new(5, vec![TxStatus::Pending, TxStatus::Dropped]);
        let result = block_on(cast_vote(&dropped, &ksm(), intent(true, ""), || {}));
        assert_eq!(result, Ok(VoteOutcome::Rejected("transaction dropped".to_string())));

        let silent = FakeClient::new(5, vec![TxStatus::Ready]);
        let result = block_on(cast_vote(&silent, &ksm(), intent(true, ""), || {}));
        assert!(matches!(result, Ok(VoteOutcome::Rejected(_))));
    }
}
