use crate::app::Screen;
use battle_api::{Battle, BattleDetail, BattleId, Bracket, GroupSummary, Prompt};

// ---------------------------------------------------------------------------
// Question entry state
// ---------------------------------------------------------------------------

pub const MIN_GROUP_SIZE: u32 = 2;
pub const MAX_GROUP_SIZE: u32 = 32;

#[derive(Debug)]
pub struct QuestionState {
    pub input: String,
    pub size: u32,
    pub composing: bool,
}

impl Default for QuestionState {
    fn default() -> Self {
        Self { input: String::new(), size: 8, composing: false }
    }
}

impl QuestionState {
    pub fn size_up(&mut self) {
        self.size = (self.size + 1).min(MAX_GROUP_SIZE);
    }

    pub fn size_down(&mut self) {
        self.size = (self.size - 1).max(MIN_GROUP_SIZE);
    }

    /// Trimmed question text, if the form is ready to submit.
    pub fn submission(&self) -> Option<String> {
        let question = self.input.trim();
        (!question.is_empty()).then(|| question.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Prompt editing state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PromptEditState {
    pub prompts: Vec<Prompt>,
    pub selected: usize,
    pub editing: bool,
    pub input: String,
}

impl PromptEditState {
    pub fn load(&mut self, prompts: Vec<Prompt>) {
        self.prompts = prompts;
        self.selected = 0;
        self.editing = false;
        self.input.clear();
    }

    pub fn select_next(&mut self) {
        let max = self.prompts.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn start_edit(&mut self) {
        if let Some(prompt) = self.prompts.get(self.selected) {
            self.input = prompt.value.clone();
            self.editing = true;
        }
    }

    /// Commit the edit buffer back into the selected prompt. Empty edits are
    /// discarded so a prompt can never be blanked out.
    pub fn commit_edit(&mut self) {
        if self.editing
            && let Some(prompt) = self.prompts.get_mut(self.selected)
            && !self.input.trim().is_empty()
        {
            prompt.value = self.input.trim().to_owned();
        }
        self.editing = false;
        self.input.clear();
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.input.clear();
    }
}

// ---------------------------------------------------------------------------
// Groups list state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct GroupsState {
    pub groups: Vec<GroupSummary>,
    pub selected: usize,
    pub loaded: bool,
}

impl GroupsState {
    pub fn load(&mut self, groups: Vec<GroupSummary>) {
        self.groups = groups;
        self.selected = 0;
        self.loaded = true;
    }

    pub fn select_next(&mut self) {
        let max = self.groups.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_group(&self) -> Option<&GroupSummary> {
        self.groups.get(self.selected)
    }
}

// ---------------------------------------------------------------------------
// Bracket session state
// ---------------------------------------------------------------------------

/// One open tournament: the engine bracket plus the user's position in it.
/// Navigation only ever lands on live battles; bye-vs-bye padding battles are
/// invisible to selection.
#[derive(Debug, Default)]
pub struct BracketSession {
    pub bracket: Option<Bracket>,
    pub question: String,
    /// 1-based round the selection is in.
    pub view_round: u32,
    /// Index within the live battles of `view_round`.
    pub selected: usize,
}

impl BracketSession {
    pub fn load(&mut self, bracket: Bracket, question: String) {
        self.question = question;
        self.view_round = 1;
        self.selected = 0;
        self.bracket = Some(bracket);
        self.focus_first_open();
    }

    /// Live battles of one round, bracket order.
    pub fn live_in_round(&self, round: u32) -> Vec<&Battle> {
        let Some(bracket) = &self.bracket else { return Vec::new() };
        bracket
            .round(round)
            .iter()
            .filter(|b| !bracket.is_dead(b.id))
            .collect()
    }

    pub fn selected_battle(&self) -> Option<&Battle> {
        self.live_in_round(self.view_round).get(self.selected).copied()
    }

    pub fn selected_id(&self) -> Option<BattleId> {
        self.selected_battle().map(|b| b.id)
    }

    pub fn navigate_round_next(&mut self) {
        let Some(bracket) = &self.bracket else { return };
        if self.view_round < bracket.round_count() {
            self.view_round += 1;
            self.clamp_selection();
        }
    }

    pub fn navigate_round_prev(&mut self) {
        if self.view_round > 1 {
            self.view_round -= 1;
            self.clamp_selection();
        }
    }

    pub fn navigate_battle_down(&mut self) {
        let max = self.live_in_round(self.view_round).len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn navigate_battle_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move the selection to the first battle that can actually be played:
    /// both slots filled and no winner yet. Stays put if the tournament is
    /// already complete.
    pub fn focus_first_open(&mut self) {
        let Some(bracket) = &self.bracket else { return };
        for round in 1..=bracket.round_count() {
            let open = self
                .live_in_round(round)
                .iter()
                .position(|b| b.winner.is_none() && b.slot_a.is_some() && b.slot_b.is_some());
            if let Some(idx) = open {
                self.view_round = round;
                self.selected = idx;
                return;
            }
        }
    }

    fn clamp_selection(&mut self) {
        let max = self.live_in_round(self.view_round).len().saturating_sub(1);
        self.selected = self.selected.min(max);
    }
}

// ---------------------------------------------------------------------------
// Battle detail state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BattleDetailState {
    /// The local battle being inspected, so winner picks made from the detail
    /// screen land on the right engine battle.
    pub battle_id: Option<BattleId>,
    pub detail: Option<BattleDetail>,
    pub scroll_offset: u16,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_screen: Screen,
    pub previous_screen: Screen,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub question: QuestionState,
    pub prompt_edit: PromptEditState,
    pub groups: GroupsState,
    pub session: BracketSession,
    pub battle_detail: BattleDetailState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_api::PromptRef;

    fn prompts(n: u64) -> Vec<PromptRef> {
        (1..=n).map(|i| PromptRef { id: i, value: format!("prompt {i}") }).collect()
    }

    #[test]
    fn session_navigation_skips_dead_battles() {
        // 5 prompts pad to 4 round-1 battles, the last of which is dead.
        let mut session = BracketSession::default();
        let bracket = Bracket::build(&prompts(5)).unwrap();
        session.load(bracket, "q".into());

        session.view_round = 1;
        session.selected = 0;
        let live = session.live_in_round(1);
        assert_eq!(live.len(), 3);

        session.navigate_battle_down();
        session.navigate_battle_down();
        session.navigate_battle_down(); // clamped at the last live battle
        assert_eq!(session.selected, 2);
    }

    #[test]
    fn load_focuses_the_first_playable_battle() {
        let mut session = BracketSession::default();
        let mut bracket = Bracket::build(&prompts(4)).unwrap();
        let first = bracket.round(1)[0].id;
        bracket.record_winner(first, 1).unwrap();
        session.load(bracket, "q".into());

        // Battle 0 is decided, battle 1 is the first still open.
        assert_eq!(session.view_round, 1);
        assert_eq!(session.selected, 1);
    }

    #[test]
    fn question_form_rejects_blank_input() {
        let mut question = QuestionState::default();
        question.input = "   ".into();
        assert!(question.submission().is_none());
        question.input = " why? ".into();
        assert_eq!(question.submission().as_deref(), Some("why?"));
    }

    #[test]
    fn group_size_stays_within_bounds() {
        let mut question = QuestionState::default();
        for _ in 0..50 {
            question.size_up();
        }
        assert_eq!(question.size, MAX_GROUP_SIZE);
        for _ in 0..50 {
            question.size_down();
        }
        assert_eq!(question.size, MIN_GROUP_SIZE);
    }

    #[test]
    fn empty_prompt_edit_is_discarded() {
        let mut edit = PromptEditState::default();
        edit.load(vec![Prompt { id: 1, value: "keep me?".into(), ..Default::default() }]);
        edit.start_edit();
        edit.input = "  ".into();
        edit.commit_edit();
        assert_eq!(edit.prompts[0].value, "keep me?");
    }
}
