use battle_api::{Battle, BattleId, Bracket, PromptRef, ROUND_WIDTH, SLOT_SPACING};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per battle cell: slot-A line, status line, slot-B line.
pub const BATTLE_HEIGHT: u16 = 3;

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum battle cell width in wider terminals.
const CELL_W_FULL: u16 = 26;

/// Engine layout units → terminal rows. One round-1 slot of 140 units spans
/// 4 rows (3-row cell + 1 gap); +1 puts the center on the cell's middle row.
/// Engine `y` values are always multiples of 70, so this stays exact.
fn layout_row(y: u32) -> u16 {
    (y * (BATTLE_HEIGHT as u32 + 1) / SLOT_SPACING) as u16 + 1
}

// ---------------------------------------------------------------------------
// BattleCell — pre-computed position for one battle
// ---------------------------------------------------------------------------

/// Pre-computed position for one battle within the bracket grid.
#[derive(Debug, Clone)]
pub struct BattleCell {
    /// Row index of the status line (center of the 3-row cell).
    /// Relative to the bracket origin. Not scroll-adjusted.
    pub center_row: u16,
    /// Starting x-column for this cell within the grid (origin-relative).
    pub col: u16,
    pub cell_width: u16,
    pub battle_id: BattleId,
}

// ---------------------------------------------------------------------------
// BracketGrid — layout for the whole tournament tree
// ---------------------------------------------------------------------------

/// Terminal-space projection of the engine's bracket layout. One column per
/// round (left → right), cells vertically centered between their feeders.
#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// One cell per battle, in the engine's round-major order.
    pub cells: Vec<BattleCell>,
    pub cell_width: u16,
    /// Total grid height in terminal rows.
    pub total_height: u16,
}

impl BracketGrid {
    /// Project the engine layout into terminal cells for the given width.
    /// Cell width is chosen so every round column fits when possible.
    pub fn compute(bracket: &Bracket, terminal_width: u16) -> Self {
        let rounds = bracket.round_count() as u16;
        let connector_total = CONNECTOR_WIDTH * rounds.saturating_sub(1);
        let per_col = terminal_width.saturating_sub(connector_total) / rounds.max(1);
        let cell_width = per_col.max(8).min(CELL_W_FULL);
        let stride = (cell_width + CONNECTOR_WIDTH) as u32;

        let cells: Vec<BattleCell> = bracket
            .battles()
            .iter()
            .map(|b| BattleCell {
                center_row: layout_row(b.pos.y),
                col: (b.pos.x / ROUND_WIDTH * stride) as u16,
                cell_width,
                battle_id: b.id,
            })
            .collect();

        let total_height = cells.iter().map(|c| c.center_row).max().unwrap_or(1) + 2;
        Self { cells, cell_width, total_height }
    }

    pub fn cell_for(&self, id: BattleId) -> Option<&BattleCell> {
        self.cells.iter().find(|c| c.battle_id == id)
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Renders the tournament tree: 3-row battle cells joined by box-drawing
/// connectors. Dead padding battles draw nothing; a connector into a parent
/// comes only from its live feeders.
pub struct BracketView<'a> {
    pub bracket: &'a Bracket,
    /// Pre-computed projection. Rebuild only on terminal resize.
    pub grid: &'a BracketGrid,
    pub selected: Option<BattleId>,
    /// Vertical scroll offset in terminal rows.
    pub scroll_offset: u16,
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 12 || area.height < BATTLE_HEIGHT {
            return;
        }

        // Pass 1: battle cells.
        for (battle, cell) in self.bracket.battles().iter().zip(&self.grid.cells) {
            if self.bracket.is_dead(battle.id) {
                continue;
            }
            let selected = self.selected == Some(battle.id);
            draw_battle_cell(battle, cell, selected, area, self.scroll_offset, buf);
        }

        // Pass 2: connectors. Each parent in round r+1 is fed by the battles
        // at indices 2k and 2k+1 of round r; dead feeders contribute no line.
        for round in 1..self.bracket.round_count() {
            let children = self.bracket.round(round);
            let parents = self.bracket.round(round + 1);
            for (k, parent) in parents.iter().enumerate() {
                if self.bracket.is_dead(parent.id) {
                    continue;
                }
                let Some(parent_cell) = self.grid.cell_for(parent.id) else { continue };
                let live_row = |child: &Battle| {
                    (!self.bracket.is_dead(child.id))
                        .then(|| self.grid.cell_for(child.id).map(|c| c.center_row))
                        .flatten()
                };
                let top = children.get(2 * k).and_then(live_row);
                let bot = children.get(2 * k + 1).and_then(live_row);

                let conn_x = area.x
                    + self
                        .grid
                        .cell_for(children[2 * k].id)
                        .map(|c| c.col + c.cell_width)
                        .unwrap_or(0);
                draw_connector(
                    top,
                    parent_cell.center_row,
                    bot,
                    conn_x,
                    area,
                    self.scroll_offset,
                    buf,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

/// Convert a bracket-relative row to an absolute screen y, applying scroll +
/// area bounds. Returns `None` if the row is off-screen.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

/// Draw one battle cell (3 rows) into the buffer, with scroll + clip handling.
fn draw_battle_cell(
    battle: &Battle,
    cell: &BattleCell,
    selected: bool,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let x = area.x + cell.col;
    if x >= area.x + area.width {
        return;
    }
    let avail_w = (area.x + area.width).saturating_sub(x) as usize;

    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let dim = Style::default().fg(Color::DarkGray);
    let winner_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let ready_style = Style::default().fg(Color::Yellow);

    let top_row = cell.center_row.saturating_sub(1);
    let mid_row = cell.center_row;
    let bot_row = cell.center_row.saturating_add(1);
    let width = cell.cell_width as usize;

    let ready = battle.winner.is_none() && battle.slot_a.is_some() && battle.slot_b.is_some();

    for (bracket_row, slot_idx) in [(top_row, 0u8), (mid_row, 1), (bot_row, 2)] {
        let Some(sy) = screen_y(bracket_row, scroll, area) else {
            continue;
        };

        let (content, style) = match slot_idx {
            1 => {
                let status = if battle.winner.is_some() {
                    " decided".to_string()
                } else if ready {
                    " 1/2 to pick".to_string()
                } else {
                    String::new()
                };
                (pad(&status, width), if ready { ready_style } else { dim })
            }
            _ => {
                let slot = if slot_idx == 0 { &battle.slot_a } else { &battle.slot_b };
                let marker = if slot_idx == 0 { '1' } else { '2' };
                let content = format_slot_line(slot.as_ref(), battle.round, marker, width);
                let is_winner = match (slot, &battle.winner) {
                    (Some(p), Some(w)) => p.id == w.id,
                    _ => false,
                };
                let style = if is_winner {
                    winner_style
                } else if slot.is_none() {
                    dim
                } else {
                    base_style
                };
                (content, style)
            }
        };

        let text: String = content.chars().take(avail_w).collect();
        buf.set_string(x, sy, &text, style);
    }
}

/// Format a slot line: `"1 <prompt value>"`, padded to `width`.
/// Round-1 empty slots are byes; later-round empties are still undecided.
fn format_slot_line(slot: Option<&PromptRef>, round: u32, marker: char, width: usize) -> String {
    let text = match slot {
        Some(p) => format!("{marker} {}", p.value),
        None if round == 1 => format!("{marker} — bye"),
        None => format!("{marker} …"),
    };
    pad(&text, width)
}

fn pad(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// Draw box-drawing connectors between one parent and its live feeders.
///
/// ```text
///  child_top  ──┐
///               │
///  parent      ─├──
///               │
///  child_bot  ──┘
/// ```
///
/// With a single live feeder the elbow degenerates to one corner and the
/// vertical run between child and parent rows.
fn draw_connector(
    r_top: Option<u16>,
    r_mid: u16,
    r_bot: Option<u16>,
    conn_base_x: u16,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let style = Style::default().fg(Color::DarkGray);
    let col_a = conn_base_x;
    let col_b = conn_base_x + 1;
    let col_c = conn_base_x + 2;
    let limit_x = area.x + area.width;

    macro_rules! put {
        ($x:expr, $row:expr, $ch:expr) => {
            if $x < limit_x {
                if let Some(sy) = screen_y($row, scroll, area) {
                    put_char(buf, $x, sy, $ch, style);
                }
            }
        };
    }

    match (r_top, r_bot) {
        (Some(top), Some(bot)) => {
            put!(col_a, top, '─');
            put!(col_b, top, '┐');
            for row in (top + 1)..r_mid {
                put!(col_b, row, '│');
            }
            put!(col_b, r_mid, '├');
            put!(col_c, r_mid, '─');
            for row in (r_mid + 1)..bot {
                put!(col_b, row, '│');
            }
            put!(col_a, bot, '─');
            put!(col_b, bot, '┘');
        }
        (Some(child), None) | (None, Some(child)) => {
            put!(col_a, child, '─');
            if child < r_mid {
                put!(col_b, child, '┐');
                for row in (child + 1)..r_mid {
                    put!(col_b, row, '│');
                }
                put!(col_b, r_mid, '└');
            } else if child > r_mid {
                put!(col_b, child, '┘');
                for row in (r_mid + 1)..child {
                    put!(col_b, row, '│');
                }
                put!(col_b, r_mid, '┌');
            } else {
                put!(col_b, r_mid, '─');
            }
            put!(col_c, r_mid, '─');
        }
        (None, None) => {}
    }
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket(n: u64) -> Bracket {
        let refs: Vec<PromptRef> =
            (1..=n).map(|i| PromptRef { id: i, value: format!("prompt {i}") }).collect();
        Bracket::build(&refs).expect("bracket should build")
    }

    #[test]
    fn layout_row_maps_engine_units_to_terminal_rows() {
        assert_eq!(layout_row(0), 1);
        assert_eq!(layout_row(70), 3);
        assert_eq!(layout_row(140), 5);
        assert_eq!(layout_row(210), 7);
        assert_eq!(layout_row(420), 13);
    }

    #[test]
    fn grid_has_one_cell_per_battle() {
        let b = bracket(8);
        let grid = BracketGrid::compute(&b, 100);
        assert_eq!(grid.cells.len(), 7);
    }

    #[test]
    fn eight_prompt_centers_follow_the_triangle() {
        let b = bracket(8);
        let grid = BracketGrid::compute(&b, 100);
        let centers_in = |round: u32| -> Vec<u16> {
            b.round(round)
                .iter()
                .map(|battle| grid.cell_for(battle.id).unwrap().center_row)
                .collect()
        };
        assert_eq!(centers_in(1), vec![1, 5, 9, 13]);
        assert_eq!(centers_in(2), vec![3, 11]);
        assert_eq!(centers_in(3), vec![7]);
    }

    #[test]
    fn parent_center_is_midpoint_of_children() {
        let b = bracket(16);
        let grid = BracketGrid::compute(&b, 140);
        for round in 1..b.round_count() {
            let children = b.round(round);
            let parents = b.round(round + 1);
            for (k, parent) in parents.iter().enumerate() {
                let top = grid.cell_for(children[2 * k].id).unwrap().center_row;
                let bot = grid.cell_for(children[2 * k + 1].id).unwrap().center_row;
                let mid = grid.cell_for(parent.id).unwrap().center_row;
                assert_eq!(mid, (top + bot) / 2, "round {round} parent {k}");
            }
        }
    }

    #[test]
    fn columns_advance_one_stride_per_round() {
        let b = bracket(8);
        let grid = BracketGrid::compute(&b, 100);
        let stride = grid.cell_width + CONNECTOR_WIDTH;
        for battle in b.battles() {
            let cell = grid.cell_for(battle.id).unwrap();
            assert_eq!(cell.col, stride * (battle.round as u16 - 1));
        }
    }

    #[test]
    fn cell_width_caps_at_full_width_limit() {
        let b = bracket(4);
        let grid = BracketGrid::compute(&b, 300);
        assert_eq!(grid.cell_width, CELL_W_FULL);
    }

    #[test]
    fn slot_lines_are_exactly_cell_width() {
        let slot = PromptRef { id: 1, value: "a rather long prompt value that overflows".into() };
        let line = format_slot_line(Some(&slot), 1, '1', 20);
        assert_eq!(line.chars().count(), 20);
        let bye = format_slot_line(None, 1, '2', 20);
        assert_eq!(bye.chars().count(), 20);
        assert!(bye.contains("bye"));
    }
}
