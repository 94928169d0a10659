use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::NetworkRequest;
use battle_api::{BattleDetail, Bracket, GroupSummary, Prompt, RemoteBattle, Slot};
use log::{info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Screen {
    #[default]
    Question,
    Prompts,
    Groups,
    Bracket,
    BattleDetail,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();

        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_group_created(&mut self, prompts: Vec<Prompt>) {
        self.state.last_error = None;
        info!("group created with {} prompts", prompts.len());
        self.state.prompt_edit.load(prompts);
        self.update_screen(Screen::Prompts);
    }

    /// The backend persisted the prompts and built its battle rows. Build the
    /// bracket locally from the edited prompts, bridge the backend ids on, and
    /// return the writes needed to persist battles that resolved on their own.
    pub fn on_prompts_saved(&mut self, battles: Vec<RemoteBattle>) -> Vec<NetworkRequest> {
        self.state.last_error = None;

        let refs: Vec<_> = self.state.prompt_edit.prompts.iter().map(|p| p.to_ref()).collect();
        let mut bracket = match Bracket::build(&refs) {
            Ok(bracket) => bracket,
            Err(err) => {
                self.on_error(err.to_string());
                return Vec::new();
            }
        };
        bracket.adopt_remote(&battles);

        let persists = pending_bye_writes(&bracket);
        let question = self.state.question.input.trim().to_owned();
        self.state.session.load(bracket, question);
        self.update_screen(Screen::Bracket);
        persists
    }

    pub fn on_groups_loaded(&mut self, groups: Vec<GroupSummary>) {
        self.state.last_error = None;
        self.state.groups.load(groups);
    }

    pub fn on_group_battles_loaded(&mut self, battles: Vec<RemoteBattle>) {
        self.state.last_error = None;
        let question = self
            .state
            .groups
            .selected_group()
            .map(|g| g.question.clone())
            .unwrap_or_default();

        match Bracket::from_remote(&battles) {
            Ok(bracket) => {
                self.state.session.load(bracket, question);
                self.update_screen(Screen::Bracket);
            }
            Err(err) => self.on_error(format!("could not rebuild bracket: {err}")),
        }
    }

    pub fn on_battle_detail_loaded(&mut self, detail: BattleDetail) {
        self.state.last_error = None;
        self.state.battle_detail.detail = Some(detail);
        self.state.battle_detail.scroll_offset = 0;
    }

    pub fn on_winner_persisted(&mut self, remote_id: u64) {
        info!("winner stored for backend battle {remote_id}");
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Screen management
    // -----------------------------------------------------------------------

    pub fn update_screen(&mut self, next: Screen) {
        if self.state.active_screen == next {
            return;
        }
        self.state.previous_screen = self.state.active_screen;
        self.state.active_screen = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_screen == Screen::Help {
            self.state.active_screen = self.state.previous_screen;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Bracket navigation — delegated to BracketSession
    // -----------------------------------------------------------------------

    pub fn bracket_next_round(&mut self) {
        self.state.session.navigate_round_next();
    }

    pub fn bracket_prev_round(&mut self) {
        self.state.session.navigate_round_prev();
    }

    pub fn bracket_battle_down(&mut self) {
        self.state.session.navigate_battle_down();
    }

    pub fn bracket_battle_up(&mut self) {
        self.state.session.navigate_battle_up();
    }

    /// Open the selected battle's detail view. Returns the fetch request when
    /// the backend knows the battle; locally padded battles have nothing to
    /// fetch, so the screen just shows the slot values.
    pub fn open_selected_battle(&mut self) -> Option<NetworkRequest> {
        let battle = self.state.session.selected_battle()?;
        let id = battle.id;
        let remote_id = battle.remote_id;

        self.state.battle_detail.battle_id = Some(id);
        self.state.battle_detail.detail = None;
        self.state.battle_detail.scroll_offset = 0;
        self.update_screen(Screen::BattleDetail);

        remote_id.map(|remote_id| NetworkRequest::LoadBattleDetail { remote_id })
    }

    /// Record the winner occupying `slot` of the active battle. The local
    /// bracket advances immediately; the returned request (if any) persists
    /// the decision in the background.
    pub fn pick_winner(&mut self, slot: Slot) -> Option<NetworkRequest> {
        let id = match self.state.active_screen {
            Screen::BattleDetail => self.state.battle_detail.battle_id?,
            _ => self.state.session.selected_id()?,
        };

        let bracket = self.state.session.bracket.as_mut()?;
        let battle = bracket.get(id)?;
        let Some(winner) = battle.slot(slot).map(|p| p.id) else {
            self.on_error("that side of the battle is empty".into());
            return None;
        };
        let remote_id = battle.remote_id;

        if let Err(err) = bracket.record_winner(id, winner) {
            self.on_error(err.to_string());
            return None;
        }
        self.state.last_error = None;

        if let Some(champion) = bracket.champion() {
            info!("tournament complete: \"{}\" wins", champion.value);
        }
        self.state.session.focus_first_open();

        match remote_id {
            Some(remote_id) => {
                Some(NetworkRequest::PersistWinner { remote_id, winner_prompt_id: winner })
            }
            None => {
                warn!("battle {id} has no backend id; winner kept locally only");
                None
            }
        }
    }
}

/// Writes for battles that decided themselves during construction (byes) and
/// are known to the backend.
fn pending_bye_writes(bracket: &Bracket) -> Vec<NetworkRequest> {
    bracket
        .battles()
        .iter()
        .filter_map(|b| {
            let remote_id = b.remote_id?;
            let winner = b.winner.as_ref()?;
            Some(NetworkRequest::PersistWinner { remote_id, winner_prompt_id: winner.id })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_api::PromptRef;

    fn app_with_session(n: u64) -> App {
        let mut app = App {
            settings: AppSettings::default(),
            state: AppState::new(),
        };
        let refs: Vec<PromptRef> =
            (1..=n).map(|i| PromptRef { id: i, value: format!("prompt {i}") }).collect();
        let bracket = Bracket::build(&refs).unwrap();
        app.state.session.load(bracket, "q".into());
        app.state.active_screen = Screen::Bracket;
        app
    }

    #[test]
    fn pick_winner_advances_and_refocuses() {
        let mut app = app_with_session(4);
        assert_eq!(app.state.session.selected, 0);

        // No backend ids were bridged, so nothing to persist.
        assert!(app.pick_winner(Slot::A).is_none());
        let bracket = app.state.session.bracket.as_ref().unwrap();
        assert_eq!(bracket.round(1)[0].winner.as_ref().map(|p| p.id), Some(1));
        // Selection moved on to the next open battle.
        assert_eq!(app.state.session.selected, 1);
    }

    #[test]
    fn picking_an_empty_slot_sets_an_error() {
        let mut app = app_with_session(3);
        // Navigate to the bye battle: its B slot is empty and it is already decided.
        app.state.session.selected = 1;
        assert!(app.pick_winner(Slot::B).is_none());
        assert!(app.state.last_error.is_some());
    }

    #[test]
    fn prompts_saved_builds_bracket_and_queues_bye_writes() {
        let mut app = App {
            settings: AppSettings::default(),
            state: AppState::new(),
        };
        app.state.prompt_edit.load(
            (1..=3u64)
                .map(|i| Prompt { id: i, value: format!("prompt {i}"), ..Default::default() })
                .collect(),
        );

        let rows = vec![
            RemoteBattle {
                id: 11,
                round: 1,
                slot_a: Some(PromptRef { id: 1, value: "prompt 1".into() }),
                slot_b: Some(PromptRef { id: 2, value: "prompt 2".into() }),
                next_id: Some(13),
                ..Default::default()
            },
            RemoteBattle {
                id: 12,
                round: 1,
                slot_a: Some(PromptRef { id: 3, value: "prompt 3".into() }),
                next_id: Some(13),
                ..Default::default()
            },
            RemoteBattle { id: 13, round: 2, ..Default::default() },
        ];

        let persists = app.on_prompts_saved(rows);
        assert_eq!(app.state.active_screen, Screen::Bracket);
        // The lone round-1 bye resolved and needs one backend write.
        assert_eq!(persists.len(), 1);
        assert!(matches!(
            persists[0],
            NetworkRequest::PersistWinner { remote_id: 12, winner_prompt_id: 3 }
        ));
    }
}
