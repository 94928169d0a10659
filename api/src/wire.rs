/// Backend raw wire types — serde shapes for the battle store's JSON.
/// These map to our clean domain types via the mapping fns in client.rs.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Prompt groups
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CreateGroupRequest {
    pub question: String,
    pub size: u32,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PromptRow {
    pub id: Option<u64>,
    pub value: Option<String>,
    pub response: Option<String>,
    pub prompt_group_id: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GroupRow {
    pub id: Option<u64>,
    pub question: Option<String>,
    pub group_size: Option<u32>,
}

// ---------------------------------------------------------------------------
// Saving prompts / building the backend bracket
// ---------------------------------------------------------------------------

/// Body element for the prompt-update call; the backend regenerates the
/// response text itself, so only id and value matter to it.
#[derive(Debug, Serialize)]
pub struct PromptUpdate {
    pub id: u64,
    pub value: String,
    pub response: String,
    pub prompt_group_id: u64,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePromptsResponse {
    pub message: Option<String>,
    pub battles: Option<Vec<BattleRow>>,
}

/// One battle as the backend reports it, both from the bracket-construction
/// response and from the per-group listing.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct BattleRow {
    pub id: Option<u64>,
    pub round: Option<u32>,
    #[serde(rename = "teamA")]
    pub team_a: Option<String>,
    #[serde(rename = "teamB")]
    pub team_b: Option<String>,
    #[serde(rename = "teamA_ID")]
    pub team_a_id: Option<u64>,
    #[serde(rename = "teamB_ID")]
    pub team_b_id: Option<u64>,
    /// Winner *value* text, not an id. The listing endpoint carries the most
    /// recently seen winner value forward onto later rows, so it is only
    /// trusted when it matches one of this row's own slots.
    pub winner: Option<String>,
    #[serde(rename = "nextBattleId")]
    pub next_battle_id: Option<u64>,
    pub prompt_group_index: Option<u32>,
    #[serde(rename = "Yposition")]
    pub y_position: Option<f64>,
    #[serde(rename = "Xposition")]
    pub x_position: Option<f64>,
}

// ---------------------------------------------------------------------------
// Battles
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct BattleDetailRow {
    pub id: Option<u64>,
    #[serde(rename = "prompt1Value")]
    pub prompt1_value: Option<String>,
    #[serde(rename = "prompt1Response")]
    pub prompt1_response: Option<String>,
    #[serde(rename = "prompt2Value")]
    pub prompt2_value: Option<String>,
    #[serde(rename = "prompt2Response")]
    pub prompt2_response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateWinnerRequest {
    pub battle_id: u64,
    pub winner_prompt_id: u64,
}

#[derive(Debug, Deserialize, Default)]
pub struct MessageResponse {
    pub message: Option<String>,
    pub error: Option<String>,
}
