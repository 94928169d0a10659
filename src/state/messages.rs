use crate::state::network::LoadingState;
use battle_api::{BattleDetail, GroupSummary, Prompt, RemoteBattle};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    CreateGroup { question: String, size: u32 },
    SavePrompts { prompts: Vec<Prompt> },
    LoadGroups,
    LoadGroupBattles { group_id: u64 },
    LoadBattleDetail { remote_id: u64 },
    /// Best-effort write of an already-applied local decision.
    PersistWinner { remote_id: u64, winner_prompt_id: u64 },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    GroupCreated { prompts: Vec<Prompt> },
    /// The backend built its battle rows; their ids get bridged onto the
    /// locally built bracket.
    PromptsSaved { battles: Vec<RemoteBattle> },
    GroupsLoaded { groups: Vec<GroupSummary> },
    GroupBattlesLoaded { battles: Vec<RemoteBattle> },
    BattleDetailLoaded { detail: BattleDetail },
    WinnerPersisted { remote_id: u64 },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
