use crate::wire::{
    BattleDetailRow, BattleRow, CreateGroupRequest, GroupRow, MessageResponse, PromptRow,
    PromptUpdate, UpdatePromptsResponse, UpdateWinnerRequest,
};
use crate::{BattleDetail, GroupSummary, Prompt, PromptRef, RemoteBattle};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Battle store client backed by the prompt-battle HTTP backend.
#[derive(Debug, Clone)]
pub struct BattleApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for BattleApi {
    fn default() -> Self {
        let base_url = std::env::var("PBTUI_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self::with_base_url(base_url)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl BattleApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("pbtui/0.1 (terminal prompt battles)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Create a prompt group: the backend generates `size` candidate prompts
    /// for the question and returns them for local editing.
    pub async fn create_group(&self, question: &str, size: u32) -> ApiResult<Vec<Prompt>> {
        let url = format!("{}/create_group", self.base_url);
        let body = CreateGroupRequest { question: question.to_owned(), size };
        let rows: Vec<PromptRow> = self.post(&url, &body).await?;
        Ok(rows.iter().map(map_prompt_row).collect())
    }

    /// Persist the (possibly edited) prompts. The backend regenerates each
    /// prompt's response text and builds its own battle rows, which we return
    /// so their ids can be bridged onto the locally built bracket.
    pub async fn update_prompts(&self, prompts: &[Prompt]) -> ApiResult<Vec<RemoteBattle>> {
        let url = format!("{}/update_prompts", self.base_url);
        let body: Vec<PromptUpdate> = prompts
            .iter()
            .map(|p| PromptUpdate {
                id: p.id,
                value: p.value.clone(),
                response: p.response.clone(),
                prompt_group_id: p.group_id,
            })
            .collect();
        let raw: UpdatePromptsResponse = self.post(&url, &body).await?;
        Ok(raw.battles.unwrap_or_default().iter().map(map_battle_row).collect())
    }

    /// Fetch the two generated response texts for one battle.
    pub async fn fetch_battle_detail(&self, remote_id: u64) -> ApiResult<BattleDetail> {
        let url = format!("{}/get_battle?battle_id={remote_id}", self.base_url);
        let raw: BattleDetailRow = self.get(&url).await?;
        Ok(map_detail_row(raw))
    }

    /// Record a battle winner. Fire-and-forget from the caller's point of
    /// view; the local bracket has already advanced.
    pub async fn record_winner(&self, remote_id: u64, winner_prompt_id: u64) -> ApiResult<()> {
        let url = format!("{}/update_battle_winner", self.base_url);
        let body = UpdateWinnerRequest { battle_id: remote_id, winner_prompt_id };
        let _: MessageResponse = self.post(&url, &body).await?;
        Ok(())
    }

    /// List saved groups that already have a bracket.
    pub async fn list_groups(&self) -> ApiResult<Vec<GroupSummary>> {
        let url = format!("{}/list_groups", self.base_url);
        let rows: Vec<GroupRow> = self.get(&url).await?;
        Ok(rows.iter().map(map_group_row).collect())
    }

    /// List a group's battle rows in bracket order, for reopening its bracket.
    pub async fn list_battles(&self, group_id: u64) -> ApiResult<Vec<RemoteBattle>> {
        let url = format!("{}/list_battles_by_group?prompt_group_id={group_id}", self.base_url);
        let rows: Vec<BattleRow> = self.get(&url).await?;
        Ok(rows.iter().map(map_battle_row).collect())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        Self::decode(url, response).await
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> ApiResult<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        Self::decode(url, response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
                    Err(ApiError::NotFound(url.to_owned()))
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: backend wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_prompt_row(row: &PromptRow) -> Prompt {
    Prompt {
        id: row.id.unwrap_or_default(),
        value: row.value.clone().unwrap_or_default(),
        response: row.response.clone().unwrap_or_default(),
        group_id: row.prompt_group_id.unwrap_or_default(),
    }
}

fn map_group_row(row: &GroupRow) -> GroupSummary {
    GroupSummary {
        id: row.id.unwrap_or_default(),
        question: row.question.clone().unwrap_or_default(),
        size: row.group_size.unwrap_or_default(),
    }
}

/// Map a backend battle row, resolving its winner *value* to a prompt id.
///
/// The listing endpoint carries the most recently decided winner value forward
/// onto every later row, so the value is trusted only when it matches one of
/// this row's own slots; anything else is treated as undecided.
fn map_battle_row(row: &BattleRow) -> RemoteBattle {
    let slot_a = map_slot(row.team_a_id, row.team_a.as_deref());
    let slot_b = map_slot(row.team_b_id, row.team_b.as_deref());

    let winner_id = row.winner.as_deref().and_then(|value| {
        [&slot_a, &slot_b]
            .into_iter()
            .flatten()
            .find(|p| p.value == value)
            .map(|p| p.id)
    });

    RemoteBattle {
        id: row.id.unwrap_or_default(),
        round: row.round.unwrap_or(1),
        slot_a,
        slot_b,
        winner_id,
        next_id: row.next_battle_id,
    }
}

fn map_slot(id: Option<u64>, value: Option<&str>) -> Option<PromptRef> {
    id.map(|id| PromptRef { id, value: value.unwrap_or_default().to_owned() })
}

fn map_detail_row(row: BattleDetailRow) -> BattleDetail {
    BattleDetail {
        battle_id: row.id.unwrap_or_default(),
        value_a: row.prompt1_value,
        response_a: row.prompt1_response,
        value_b: row.prompt2_value,
        response_b: row.prompt2_response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battle_row(json: serde_json::Value) -> BattleRow {
        serde_json::from_value(json).expect("row should deserialize")
    }

    #[test]
    fn battle_row_winner_resolves_against_own_slots() {
        let row = battle_row(serde_json::json!({
            "id": 7,
            "round": 1,
            "teamA": "first prompt?",
            "teamB": "second prompt?",
            "teamA_ID": 1,
            "teamB_ID": 2,
            "winner": "second prompt?",
            "nextBattleId": 9,
            "Yposition": 140,
            "Xposition": 0
        }));
        let battle = map_battle_row(&row);
        assert_eq!(battle.id, 7);
        assert_eq!(battle.winner_id, Some(2));
        assert_eq!(battle.next_id, Some(9));
        assert_eq!(battle.slot_a.as_ref().map(|p| p.id), Some(1));
    }

    #[test]
    fn battle_row_drops_carried_forward_winner_value() {
        // A stale winner value from an earlier battle must not decide this one.
        let row = battle_row(serde_json::json!({
            "id": 8,
            "round": 2,
            "teamA": "third prompt?",
            "teamB": null,
            "teamA_ID": 3,
            "teamB_ID": null,
            "winner": "second prompt?",
            "nextBattleId": null
        }));
        let battle = map_battle_row(&row);
        assert_eq!(battle.winner_id, None);
        assert!(battle.slot_b.is_none());
    }

    #[tokio::test]
    async fn create_group_parses_prompt_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/create_group")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id": 1, "value": "why is the sky blue?", "response": "", "prompt_group_id": 5},
                    {"id": 2, "value": "how do magnets work?", "response": "", "prompt_group_id": 5}
                ]"#,
            )
            .create_async()
            .await;

        let api = BattleApi::with_base_url(server.url());
        let prompts = api.create_group("a question", 2).await.expect("should parse");
        mock.assert_async().await;

        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].id, 1);
        assert_eq!(prompts[1].value, "how do magnets work?");
        assert_eq!(prompts[0].group_id, 5);
    }

    #[tokio::test]
    async fn update_prompts_returns_bridgeable_battle_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/update_prompts")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"message": "Prompts updated", "battles": [
                    {"id": 10, "round": 1, "teamA": "a?", "teamB": "b?",
                     "teamA_ID": 1, "teamB_ID": 2, "winner": null,
                     "nextBattleId": 12, "Yposition": 0, "Xposition": 0},
                    {"id": 11, "round": 1, "teamA": "c?", "teamB": "",
                     "teamA_ID": 3, "teamB_ID": null, "winner": null,
                     "nextBattleId": 12, "Yposition": 140, "Xposition": 0},
                    {"id": 12, "round": 2, "teamA": "", "teamB": "",
                     "teamA_ID": null, "teamB_ID": null, "winner": null,
                     "nextBattleId": null, "Yposition": 70, "Xposition": 200}
                ]}"#,
            )
            .create_async()
            .await;

        let api = BattleApi::with_base_url(server.url());
        let prompts = vec![Prompt { id: 1, value: "a?".into(), response: String::new(), group_id: 5 }];
        let battles = api.update_prompts(&prompts).await.expect("should parse");
        mock.assert_async().await;

        assert_eq!(battles.len(), 3);
        assert_eq!(battles[0].next_id, Some(12));
        assert!(battles[1].slot_b.is_none());
        assert!(battles[2].slot_a.is_none() && battles[2].slot_b.is_none());
    }

    #[tokio::test]
    async fn battle_detail_maps_missing_battle_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/get_battle?battle_id=99")
            .with_status(404)
            .with_body(r#"{"error": "Battle not found"}"#)
            .create_async()
            .await;

        let api = BattleApi::with_base_url(server.url());
        let err = api.fetch_battle_detail(99).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "got: {err}");
    }

    #[tokio::test]
    async fn list_groups_parses_group_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/list_groups")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 5, "question": "what is best?", "group_size": 4}]"#)
            .create_async()
            .await;

        let api = BattleApi::with_base_url(server.url());
        let groups = api.list_groups().await.expect("should parse");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].question, "what is best?");
        assert_eq!(groups[0].size, 4);
    }

    #[tokio::test]
    async fn record_winner_posts_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/update_battle_winner")
            .match_body(mockito::Matcher::JsonString(
                r#"{"battle_id": 10, "winner_prompt_id": 2}"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Battle winner updated"}"#)
            .create_async()
            .await;

        let api = BattleApi::with_base_url(server.url());
        api.record_winner(10, 2).await.expect("should succeed");
        mock.assert_async().await;
    }
}
