use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, Screen};
use crate::components::bracket::{BracketGrid, BracketView};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use battle_api::{Battle, BattleId};

static TABS: &[&str; 5] = &["Question", "Prompts", "Groups", "Bracket", "Battle"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal
        .draw(|f| {
            layout.update(f.area(), app.settings.full_screen);

            if !app.settings.full_screen {
                draw_tabs(f, layout.tab_bar, app);
            }

            match app.state.active_screen {
                Screen::Question => draw_question(f, layout.main, app),
                Screen::Prompts => draw_prompts(f, layout.main, app),
                Screen::Groups => draw_groups(f, layout.main, app),
                Screen::Bracket => draw_bracket(f, layout.main, app),
                Screen::BattleDetail => draw_battle_detail(f, layout.main, app),
                Screen::Help => draw_placeholder(
                    f,
                    layout.main,
                    "Help: q=quit  n=new group  g=groups  h/l=round  j/k=move  Enter=select  1/2=pick winner  f=fullscreen  \"=logs  Esc=back",
                ),
            }

            if app.state.show_logs {
                draw_log_overlay(f, layout.main);
            }

            draw_loading_spinner(f, f.area(), app, loading);
        })
        .unwrap();
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_screen {
        Screen::Question => 0,
        Screen::Prompts => 1,
        Screen::Groups => 2,
        Screen::Bracket => 3,
        Screen::BattleDetail => 4,
        Screen::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_question(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" New Prompt Group ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let question = &app.state.question;
    let input_line = if question.composing {
        format!("> {}_", question.input)
    } else if question.input.is_empty() {
        "> (press i to type the question)".to_string()
    } else {
        format!("> {}", question.input)
    };
    let input_style = if question.composing {
        Style::default().fg(Color::Yellow)
    } else if question.input.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Ask a question, collect prompts, battle them out.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(input_line, input_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Prompts in group: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", question.size),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (+/- to adjust)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Keys: i=type  Enter/Esc=done typing  +/-=group size  s=create  g=existing groups",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    push_error_line(&mut lines, app);

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_prompts(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Prompts ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let edit = &app.state.prompt_edit;
    if edit.prompts.is_empty() {
        f.render_widget(
            Paragraph::new("No prompts yet. Create a group first (n).")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Edit each prompt, then save to build the bracket.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "Keys: j/k=move  e/Enter=edit  s=save & build bracket",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let max_width = inner.width.saturating_sub(8) as usize;
    for (idx, prompt) in edit.prompts.iter().enumerate() {
        let selected = idx == edit.selected;
        let marker = if selected { '>' } else { ' ' };
        let text = if selected && edit.editing {
            format!("{marker} {:>2}. {}_", idx + 1, edit.input)
        } else {
            let clipped: String = prompt.value.chars().take(max_width).collect();
            format!("{marker} {:>2}. {clipped}", idx + 1)
        };
        let style = if selected && edit.editing {
            Style::default().fg(Color::Yellow)
        } else if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    push_error_line(&mut lines, app);
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_groups(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Prompt Groups ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let groups = &app.state.groups;
    if !groups.loaded {
        f.render_widget(
            Paragraph::new("Loading groups...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }
    if groups.groups.is_empty() {
        f.render_widget(
            Paragraph::new("No battle-ready groups on the backend. Press n to create one.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Keys: j/k=move  Enter=open bracket  r=reload",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    let max_width = inner.width.saturating_sub(14) as usize;
    for (idx, group) in groups.groups.iter().enumerate() {
        let selected = idx == groups.selected;
        let marker = if selected { '>' } else { ' ' };
        let question: String = group.question.chars().take(max_width).collect();
        let style = if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} #{:<4} {question}  ({} prompts)", group.id, group.size),
            style,
        )));
    }

    push_error_line(&mut lines, app);
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let session = &app.state.session;
    let Some(bracket) = session.bracket.as_ref() else {
        let msg = if let Some(err) = app.state.last_error.as_deref() {
            format!("Bracket load failed:\n{err}")
        } else {
            "No bracket open. Create a group (n) or pick one from Groups (g).".to_string()
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)])
            .areas(inner);

    let standing = match bracket.champion() {
        Some(champion) => format!("champion: {}", champion.value),
        None => format!("round {}/{}", session.view_round, bracket.round_count()),
    };
    let header_text = format!("{} | {standing}", session.question);
    f.render_widget(Paragraph::new(header_text), header);
    f.render_widget(
        Paragraph::new("Keys: h/l=round  j/k=move  Enter=responses  1/2=pick winner  ?=help")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let grid = BracketGrid::compute(bracket, content.width);
    let selected = session.selected_id();
    let scroll_offset = bracket_scroll(&grid, selected, content.height);

    f.render_widget(
        BracketView { bracket, grid: &grid, selected, scroll_offset },
        content,
    );

    if let Some(err) = app.state.last_error.as_deref() {
        let bottom = Rect::new(content.x, content.y + content.height.saturating_sub(1), content.width, 1);
        f.render_widget(
            Paragraph::new(err).style(Style::default().fg(Color::Red)),
            bottom,
        );
    }
}

/// Keep the selected battle vertically centered once the grid outgrows the
/// viewport.
fn bracket_scroll(grid: &BracketGrid, selected: Option<BattleId>, height: u16) -> u16 {
    if grid.total_height <= height {
        return 0;
    }
    let center = selected
        .and_then(|id| grid.cell_for(id))
        .map(|c| c.center_row)
        .unwrap_or(0);
    center
        .saturating_sub(height / 2)
        .min(grid.total_height - height)
}

fn draw_battle_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Battle ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let detail_state = &app.state.battle_detail;
    let battle = detail_state
        .battle_id
        .and_then(|id| app.state.session.bracket.as_ref().and_then(|b| b.get(id)));
    let Some(battle) = battle else {
        f.render_widget(
            Paragraph::new("Select a battle in the bracket and press Enter")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("{} | round {}", app.state.session.question, battle.round),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(Span::styled(
        "Keys: 1/2=pick winner  j/k=scroll  Esc=back",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    push_side_lines(&mut lines, battle, '1', true, detail_state.detail.as_ref());
    lines.push(Line::from(""));
    push_side_lines(&mut lines, battle, '2', false, detail_state.detail.as_ref());
    lines.push(Line::from(""));

    if let Some(winner) = battle.winner.as_ref() {
        lines.push(Line::from(Span::styled(
            format!("winner: {}", winner.value),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    } else if detail_state.detail.is_none() && battle.remote_id.is_some() {
        lines.push(Line::from(Span::styled(
            "Loading responses...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    push_error_line(&mut lines, app);

    let offset = detail_state.scroll_offset.min(lines.len().saturating_sub(1) as u16);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((offset, 0)),
        inner,
    );
}

/// One side of the detail view: the prompt value plus its model response when
/// the backend has one.
fn push_side_lines(
    lines: &mut Vec<Line>,
    battle: &Battle,
    marker: char,
    side_a: bool,
    detail: Option<&battle_api::BattleDetail>,
) {
    let slot = if side_a { &battle.slot_a } else { &battle.slot_b };
    let value = slot.as_ref().map(|p| p.value.as_str());
    let is_winner = match (slot, &battle.winner) {
        (Some(p), Some(w)) => p.id == w.id,
        _ => false,
    };

    let title_style = if is_winner {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(Span::styled(
        format!("{marker}) {}", value.unwrap_or("(empty)")),
        title_style,
    )));

    let response = detail.and_then(|d| {
        if side_a { d.response_a.as_deref() } else { d.response_b.as_deref() }
    });
    if let Some(response) = response {
        lines.push(Line::from(Span::styled(
            format!("   {response}"),
            Style::default().fg(Color::Gray),
        )));
    } else if value.is_some() {
        lines.push(Line::from(Span::styled(
            "   (no response recorded)",
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn push_error_line(lines: &mut Vec<Line>, app: &App) {
    if let Some(err) = app.state.last_error.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.to_owned(),
            Style::default().fg(Color::Red),
        )));
    }
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn draw_log_overlay(f: &mut Frame, area: Rect) {
    let height = (area.height / 3).max(6).min(area.height);
    let overlay = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height),
        area.width,
        height,
    );
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, overlay);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
