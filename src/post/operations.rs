//! Blockchain operations broadcast for a post.
//!
//! Operations serialize in the `[name, payload]` pair form the broadcast
//! API expects.

use super::RewardOption;
use serde::ser::{SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};

/// Payout cap written into the comment options
pub const MAX_ACCEPTED_PAYOUT: &str = "1000000.000 SBD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentOperation {
    pub parent_author: String,
    pub parent_permlink: String,
    pub author: String,
    pub permlink: String,
    pub title: String,
    pub body: String,
    /// Metadata as a JSON string
    pub json_metadata: String,
}

/// A reward beneficiary of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Beneficiary {
    pub account: String,
    pub weight: u16,
}

/// Extensions of the comment options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOptionsExtension {
    Beneficiaries(Vec<Beneficiary>),
}

impl Serialize for CommentOptionsExtension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct BeneficiariesPayload<'a> {
            beneficiaries: &'a [Beneficiary],
        }

        let mut tuple = serializer.serialize_tuple(2)?;
        match self {
            CommentOptionsExtension::Beneficiaries(beneficiaries) => {
                tuple.serialize_element(&0u8)?;
                tuple.serialize_element(&BeneficiariesPayload { beneficiaries })?;
            }
        }
        tuple.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentOptionsOperation {
    pub author: String,
    pub permlink: String,
    pub max_accepted_payout: String,
    pub percent_steem_dollars: u16,
    pub allow_votes: bool,
    pub allow_curation_rewards: bool,
    pub extensions: Vec<CommentOptionsExtension>,
}

/// A single chain operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Comment(CommentOperation),
    CommentOptions(CommentOptionsOperation),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Comment(_) => "comment",
            Operation::CommentOptions(_) => "comment_options",
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.name())?;
        match self {
            Operation::Comment(op) => seq.serialize_element(op)?,
            Operation::CommentOptions(op) => seq.serialize_element(op)?,
        }
        seq.end()
    }
}

/// Inputs of [`build_operations`].
#[derive(Debug, Clone)]
pub struct OperationParams<'a> {
    pub parent_author: &'a str,
    pub parent_permlink: &'a str,
    pub author: &'a str,
    pub permlink: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub json_metadata: String,
    /// Reward and beneficiaries; `None` for updates
    pub options: Option<(RewardOption, &'a [Beneficiary])>,
}

/// Build the ordered operation list: the comment, then its options on
/// creation.
pub fn build_operations(params: OperationParams<'_>) -> Vec<Operation> {
    let mut operations = vec![Operation::Comment(CommentOperation {
        parent_author: params.parent_author.to_string(),
        parent_permlink: params.parent_permlink.to_string(),
        author: params.author.to_string(),
        permlink: params.permlink.to_string(),
        title: params.title.to_string(),
        body: params.body.to_string(),
        json_metadata: params.json_metadata,
    })];

    let Some((reward, beneficiaries)) = params.options else {
        return operations;
    };

    // The chain requires beneficiaries sorted by account
    let mut beneficiaries = beneficiaries.to_vec();
    beneficiaries.sort_by(|a, b| a.account.cmp(&b.account));
    let extensions = if beneficiaries.is_empty() {
        Vec::new()
    } else {
        vec![CommentOptionsExtension::Beneficiaries(beneficiaries)]
    };

    operations.push(Operation::CommentOptions(CommentOptionsOperation {
        author: params.author.to_string(),
        permlink: params.permlink.to_string(),
        max_accepted_payout: MAX_ACCEPTED_PAYOUT.to_string(),
        percent_steem_dollars: reward.percent_steem_dollars(),
        allow_votes: true,
        allow_curation_rewards: true,
        extensions,
    }));

    operations
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
