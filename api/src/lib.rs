pub mod bracket;
pub mod client;
pub mod wire;

pub use bracket::{Battle, BattleId, Bracket, BracketError, ROUND_WIDTH, SLOT_SPACING, Slot};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the backend wire format
// ---------------------------------------------------------------------------

/// One generated prompt, as created and edited before the tournament starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: u64,
    pub value: String,
    /// Response text generated by the backend; empty until prompts are saved.
    pub response: String,
    pub group_id: u64,
}

impl Prompt {
    pub fn to_ref(&self) -> PromptRef {
        PromptRef { id: self.id, value: self.value.clone() }
    }
}

/// Lightweight participant reference held in a battle slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRef {
    pub id: u64,
    pub value: String,
}

/// A battle row as the backend reports it. Used to bridge backend row ids onto
/// the locally built bracket and to reopen prior tournaments.
#[derive(Debug, Clone, Default)]
pub struct RemoteBattle {
    pub id: u64,
    pub round: u32,
    pub slot_a: Option<PromptRef>,
    pub slot_b: Option<PromptRef>,
    /// Decided winner, resolved to a prompt id. None when undecided or when the
    /// backend's carried-forward winner value matches neither slot.
    pub winner_id: Option<u64>,
    pub next_id: Option<u64>,
}

/// A saved prompt group, listed on the Groups screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: u64,
    pub question: String,
    pub size: u32,
}

/// Full slot texts for one battle, fetched on demand when the user opens it.
#[derive(Debug, Clone, Default)]
pub struct BattleDetail {
    pub battle_id: u64,
    pub value_a: Option<String>,
    pub response_a: Option<String>,
    pub value_b: Option<String>,
    pub response_b: Option<String>,
}
