use crate::app::{App, Screen};
use crate::state::messages::NetworkRequest;
use battle_api::Slot;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut request: Option<NetworkRequest> = None;

    // Text entry modes capture every key except their own exits.
    if guard.state.active_screen == Screen::Question && guard.state.question.composing {
        match key_event.code {
            KeyCode::Enter | KeyCode::Esc => guard.state.question.composing = false,
            KeyCode::Backspace => {
                guard.state.question.input.pop();
            }
            Char(c) => guard.state.question.input.push(c),
            _ => {}
        }
        return;
    }
    if guard.state.active_screen == Screen::Prompts && guard.state.prompt_edit.editing {
        match key_event.code {
            KeyCode::Enter => guard.state.prompt_edit.commit_edit(),
            KeyCode::Esc => guard.state.prompt_edit.cancel_edit(),
            KeyCode::Backspace => {
                guard.state.prompt_edit.input.pop();
            }
            Char(c) => guard.state.prompt_edit.input.push(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_screen, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Screen switching
        (_, Char('n'), _) => guard.update_screen(Screen::Question),
        (_, Char('g'), _) => {
            guard.update_screen(Screen::Groups);
            request = Some(NetworkRequest::LoadGroups);
        }
        (_, Char('?'), _) => guard.update_screen(Screen::Help),
        (Screen::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Question form
        (Screen::Question, Char('i') | KeyCode::Enter, _) if guard.state.question.input.is_empty() => {
            guard.state.question.composing = true;
        }
        (Screen::Question, Char('i'), _) => guard.state.question.composing = true,
        (Screen::Question, Char('+') | KeyCode::Right, _) => guard.state.question.size_up(),
        (Screen::Question, Char('-') | KeyCode::Left, _) => guard.state.question.size_down(),
        (Screen::Question, Char('s') | KeyCode::Enter, _) => {
            if let Some(question) = guard.state.question.submission() {
                let size = guard.state.question.size;
                request = Some(NetworkRequest::CreateGroup { question, size });
            } else {
                guard.on_error("enter a question first (press i to type)".into());
            }
        }

        // Prompt editing
        (Screen::Prompts, Char('j') | KeyCode::Down, _) => guard.state.prompt_edit.select_next(),
        (Screen::Prompts, Char('k') | KeyCode::Up, _) => guard.state.prompt_edit.select_prev(),
        (Screen::Prompts, Char('e') | KeyCode::Enter, _) => guard.state.prompt_edit.start_edit(),
        (Screen::Prompts, Char('s'), _) => {
            let prompts = guard.state.prompt_edit.prompts.clone();
            if prompts.is_empty() {
                guard.on_error("no prompts to save".into());
            } else {
                request = Some(NetworkRequest::SavePrompts { prompts });
            }
        }

        // Groups list
        (Screen::Groups, Char('j') | KeyCode::Down, _) => guard.state.groups.select_next(),
        (Screen::Groups, Char('k') | KeyCode::Up, _) => guard.state.groups.select_prev(),
        (Screen::Groups, Char('r'), _) => request = Some(NetworkRequest::LoadGroups),
        (Screen::Groups, KeyCode::Enter, _) => {
            if let Some(group) = guard.state.groups.selected_group() {
                request = Some(NetworkRequest::LoadGroupBattles { group_id: group.id });
            }
        }

        // Bracket navigation
        (Screen::Bracket, Char('l') | KeyCode::Right, _) => guard.bracket_next_round(),
        (Screen::Bracket, Char('h') | KeyCode::Left, _) => guard.bracket_prev_round(),
        (Screen::Bracket, Char('j') | KeyCode::Down, _) => guard.bracket_battle_down(),
        (Screen::Bracket, Char('k') | KeyCode::Up, _) => guard.bracket_battle_up(),
        (Screen::Bracket, KeyCode::Enter, _) => request = guard.open_selected_battle(),
        (Screen::Bracket, Char('1'), _) => request = guard.pick_winner(Slot::A),
        (Screen::Bracket, Char('2'), _) => request = guard.pick_winner(Slot::B),

        // Battle detail
        (Screen::BattleDetail, Char('j') | KeyCode::Down, _) => {
            guard.state.battle_detail.scroll_offset =
                guard.state.battle_detail.scroll_offset.saturating_add(1);
        }
        (Screen::BattleDetail, Char('k') | KeyCode::Up, _) => {
            guard.state.battle_detail.scroll_offset =
                guard.state.battle_detail.scroll_offset.saturating_sub(1);
        }
        (Screen::BattleDetail, Char('1'), _) => {
            request = guard.pick_winner(Slot::A);
            if guard.state.last_error.is_none() {
                guard.update_screen(Screen::Bracket);
            }
        }
        (Screen::BattleDetail, Char('2'), _) => {
            request = guard.pick_winner(Slot::B);
            if guard.state.last_error.is_none() {
                guard.update_screen(Screen::Bracket);
            }
        }
        (Screen::BattleDetail, KeyCode::Esc, _) => guard.update_screen(Screen::Bracket),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}
