use crate::state::messages::{NetworkRequest, NetworkResponse};
use battle_api::client::{ApiError, BattleApi};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: BattleApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: BattleApi::new(),
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::CreateGroup { question, size } => {
                    self.handle_create_group(question, size).await
                }
                NetworkRequest::SavePrompts { prompts } => {
                    self.handle_save_prompts(prompts).await
                }
                NetworkRequest::LoadGroups => self.handle_load_groups().await,
                NetworkRequest::LoadGroupBattles { group_id } => {
                    self.handle_load_group_battles(group_id).await
                }
                NetworkRequest::LoadBattleDetail { remote_id } => {
                    self.handle_load_battle_detail(remote_id).await
                }
                NetworkRequest::PersistWinner { remote_id, winner_prompt_id } => {
                    self.handle_persist_winner(remote_id, winner_prompt_id).await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_create_group(
        &self,
        question: String,
        size: u32,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("creating prompt group of size {size}");
        let prompts = self.client.create_group(&question, size).await?;
        Ok(NetworkResponse::GroupCreated { prompts })
    }

    async fn handle_save_prompts(
        &self,
        prompts: Vec<battle_api::Prompt>,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("saving {} prompts", prompts.len());
        let battles = self.client.update_prompts(&prompts).await?;
        Ok(NetworkResponse::PromptsSaved { battles })
    }

    async fn handle_load_groups(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading saved groups");
        let groups = self.client.list_groups().await?;
        Ok(NetworkResponse::GroupsLoaded { groups })
    }

    async fn handle_load_group_battles(&self, group_id: u64) -> Result<NetworkResponse, ApiError> {
        debug!("loading battles for group {group_id}");
        let battles = self.client.list_battles(group_id).await?;
        Ok(NetworkResponse::GroupBattlesLoaded { battles })
    }

    async fn handle_load_battle_detail(&self, remote_id: u64) -> Result<NetworkResponse, ApiError> {
        debug!("loading detail for battle {remote_id}");
        let detail = self.client.fetch_battle_detail(remote_id).await?;
        Ok(NetworkResponse::BattleDetailLoaded { detail })
    }

    async fn handle_persist_winner(
        &self,
        remote_id: u64,
        winner_prompt_id: u64,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("persisting winner {winner_prompt_id} for battle {remote_id}");
        self.client.record_winner(remote_id, winner_prompt_id).await?;
        Ok(NetworkResponse::WinnerPersisted { remote_id })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
