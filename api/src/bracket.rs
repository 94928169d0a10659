use crate::{PromptRef, RemoteBattle};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Horizontal stride between round columns, in abstract layout units.
pub const ROUND_WIDTH: u32 = 200;

/// Vertical spacing between adjacent round-1 battles, in abstract layout units.
pub const SLOT_SPACING: u32 = 140;

/// Smallest and largest supported participant counts.
pub const MIN_PROMPTS: usize = 2;
pub const MAX_PROMPTS: usize = 32;

// ---------------------------------------------------------------------------
// Battle — the atomic unit of competition
// ---------------------------------------------------------------------------

/// Stable identifier of a battle within one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BattleId(pub u32);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of a battle's two participant positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

/// Layout coordinates computed by [`Bracket::layout`]. `x` is derived from the
/// round, `y` recursively from the feeding battles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone)]
pub struct Battle {
    pub id: BattleId,
    /// Backend row id, bridged in via [`Bracket::adopt_remote`] after the
    /// tournament is persisted. None for padding battles the backend never saw.
    pub remote_id: Option<u64>,
    /// 1-based round index; the final battle is in the highest round.
    pub round: u32,
    pub slot_a: Option<PromptRef>,
    pub slot_b: Option<PromptRef>,
    pub winner: Option<PromptRef>,
    /// The battle in `round + 1` that receives this battle's winner.
    /// None only for the final.
    pub next: Option<BattleId>,
    pub pos: Position,
}

impl Battle {
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn slot(&self, slot: Slot) -> Option<&PromptRef> {
        match slot {
            Slot::A => self.slot_a.as_ref(),
            Slot::B => self.slot_b.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    /// Participant count outside the supported bounds.
    InvalidInput(String),
    /// Winner is not one of the battle's slots, the battle does not exist, or
    /// the battle is already decided with a different winner.
    InvalidWinner(String),
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            BracketError::InvalidWinner(msg) => write!(f, "invalid winner: {msg}"),
        }
    }
}

impl std::error::Error for BracketError {}

// ---------------------------------------------------------------------------
// Bracket — the full single-elimination tree for one tournament
// ---------------------------------------------------------------------------

/// Arena-backed match tree. Battles are stored in round-major order (all of
/// round 1, then round 2, …) and addressed by [`BattleId`] through an index.
///
/// Slot routing follows one explicit parity rule, relied on by both
/// construction and advancement: the battle at *even* index within its round
/// feeds slot A of its next battle, the one at *odd* index feeds slot B.
#[derive(Debug, Clone)]
pub struct Bracket {
    battles: Vec<Battle>,
    index: HashMap<BattleId, usize>,
    /// Offset of each round's first battle in `battles`.
    round_starts: Vec<usize>,
    /// Battles whose entire subtree is byes. They never decide and feed nothing.
    dead: Vec<bool>,
}

impl Bracket {
    /// Build a bracket from an ordered participant list (2–32 entries).
    ///
    /// The first round is padded with byes up to `2^ceil(log2(N))` leaf slots
    /// so the bracket is a full binary tree and every later battle has exactly
    /// two feeders. Consecutive participants (index 2k, 2k+1) are paired.
    /// Battles with a single live participant resolve immediately; resolution
    /// cascades round-by-round until every undecided battle has two live slots.
    pub fn build(prompts: &[PromptRef]) -> Result<Self, BracketError> {
        let n = prompts.len();
        if !(MIN_PROMPTS..=MAX_PROMPTS).contains(&n) {
            return Err(BracketError::InvalidInput(format!(
                "participant count must be between {MIN_PROMPTS} and {MAX_PROMPTS}, got {n}"
            )));
        }

        let round_count = (n as u32).next_power_of_two().trailing_zeros();
        let leaves = 1usize << (round_count - 1);

        let mut battles: Vec<Battle> = Vec::with_capacity(2 * leaves - 1);
        let mut round_starts = vec![0usize];

        for i in 0..leaves {
            battles.push(Battle {
                id: BattleId(battles.len() as u32),
                remote_id: None,
                round: 1,
                slot_a: prompts.get(2 * i).cloned(),
                slot_b: prompts.get(2 * i + 1).cloned(),
                winner: None,
                next: None,
                pos: Position::default(),
            });
        }

        let mut prev_start = 0usize;
        let mut prev_len = leaves;
        for round in 2..=round_count {
            let start = battles.len();
            round_starts.push(start);
            for _ in 0..prev_len / 2 {
                battles.push(Battle {
                    id: BattleId(battles.len() as u32),
                    remote_id: None,
                    round,
                    slot_a: None,
                    slot_b: None,
                    winner: None,
                    next: None,
                    pos: Position::default(),
                });
            }
            for j in 0..prev_len {
                battles[prev_start + j].next = Some(battles[start + j / 2].id);
            }
            prev_start = start;
            prev_len /= 2;
        }

        let index = battles.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
        let dead = vec![false; battles.len()];
        let mut bracket = Self { battles, index, round_starts, dead };
        bracket.resolve_byes();
        bracket.layout();
        Ok(bracket)
    }

    /// Rebuild a bracket from backend rows (reopening a saved tournament).
    ///
    /// Round-1 slots are taken in row order as the participant list, the
    /// bracket is rebuilt locally, backend ids are bridged on, and recorded
    /// winners are replayed through [`Self::record_winner`] in round order.
    /// Replay is tolerant: re-recording an auto-resolved bye is a no-op and a
    /// carried-forward stale winner that matches neither slot never reaches us
    /// (the client already drops it).
    pub fn from_remote(rows: &[RemoteBattle]) -> Result<Self, BracketError> {
        let mut seeds: Vec<PromptRef> = Vec::new();
        for row in rows.iter().filter(|r| r.round == 1) {
            seeds.extend(row.slot_a.clone());
            seeds.extend(row.slot_b.clone());
        }

        let mut bracket = Self::build(&seeds)?;
        bracket.adopt_remote(rows);

        let mut decided: Vec<(u32, BattleId, u64)> = Vec::new();
        for battle in &bracket.battles {
            if let Some(rid) = battle.remote_id
                && let Some(row) = rows.iter().find(|r| r.id == rid)
                && let Some(winner_id) = row.winner_id
            {
                decided.push((battle.round, battle.id, winner_id));
            }
        }
        decided.sort_by_key(|&(round, id, _)| (round, id));
        for (_, id, winner_id) in decided {
            let _ = bracket.record_winner(id, winner_id);
        }
        Ok(bracket)
    }

    /// Bridge backend row ids onto local battles. Round 1 matches positionally
    /// (the backend pairs the same consecutive participants); later rounds are
    /// reached by following `next` links from already-mapped children, since
    /// the backend's unpadded row layout does not line up index-for-index.
    pub fn adopt_remote(&mut self, rows: &[RemoteBattle]) {
        let by_id: HashMap<u64, &RemoteBattle> = rows.iter().map(|r| (r.id, r)).collect();

        let r1: Vec<u64> = rows.iter().filter(|r| r.round == 1).map(|r| r.id).collect();
        for (k, rid) in r1.into_iter().enumerate() {
            if k < self.round_len(1) {
                self.battles[k].remote_id = Some(rid);
            }
        }

        for idx in 0..self.battles.len() {
            let Some(rid) = self.battles[idx].remote_id else { continue };
            let Some(row) = by_id.get(&rid) else { continue };
            if let Some(next_remote) = row.next_id
                && let Some(next_id) = self.battles[idx].next
            {
                let next_idx = self.index[&next_id];
                self.battles[next_idx].remote_id = Some(next_remote);
            }
        }
    }

    /// Record the user's winner for one battle and propagate it one hop.
    ///
    /// `winner_id` must be the prompt occupying slot A or slot B. Recording
    /// the same winner again is a no-op; a decided battle rejects any other
    /// winner — there is no cascading re-propagation.
    pub fn record_winner(&mut self, id: BattleId, winner_id: u64) -> Result<(), BracketError> {
        let idx = *self
            .index
            .get(&id)
            .ok_or_else(|| BracketError::InvalidWinner(format!("no battle with id {id}")))?;

        let battle = &self.battles[idx];
        let chosen = battle
            .slot_a
            .as_ref()
            .filter(|p| p.id == winner_id)
            .or_else(|| battle.slot_b.as_ref().filter(|p| p.id == winner_id))
            .cloned()
            .ok_or_else(|| {
                BracketError::InvalidWinner(format!(
                    "prompt {winner_id} is not a participant of battle {id}"
                ))
            })?;

        if let Some(prev) = &battle.winner {
            if prev.id == winner_id {
                return Ok(());
            }
            return Err(BracketError::InvalidWinner(format!(
                "battle {id} is already decided; changing the winner is not supported"
            )));
        }

        self.battles[idx].winner = Some(chosen);
        self.propagate(idx);
        Ok(())
    }

    /// Recompute layout coordinates for every battle.
    ///
    /// `x = ROUND_WIDTH * (round - 1)`. Round-1 battles are evenly spaced by
    /// index; every later battle sits at the midpoint of its two feeders, which
    /// centers parents between their children. Pure in the bracket's topology
    /// and round-1 ordering, so repeated calls yield identical coordinates.
    pub fn layout(&mut self) {
        for idx in 0..self.battles.len() {
            let round = self.battles[idx].round;
            let x = ROUND_WIDTH * (round - 1);
            let y = if round == 1 {
                SLOT_SPACING * self.index_in_round(idx) as u32
            } else {
                let (fa, fb) = self.feeder_indices(idx);
                (self.battles[fa].pos.y + self.battles[fb].pos.y) / 2
            };
            self.battles[idx].pos = Position { x, y };
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }

    pub fn get(&self, id: BattleId) -> Option<&Battle> {
        self.index.get(&id).map(|&i| &self.battles[i])
    }

    pub fn round_count(&self) -> u32 {
        self.round_starts.len() as u32
    }

    /// Battles of one 1-based round, in bracket order.
    pub fn round(&self, round: u32) -> &[Battle] {
        let r = round as usize;
        if r == 0 || r > self.round_starts.len() {
            return &[];
        }
        let start = self.round_starts[r - 1];
        let end = self.round_starts.get(r).copied().unwrap_or(self.battles.len());
        &self.battles[start..end]
    }

    pub fn final_battle(&self) -> &Battle {
        &self.battles[self.battles.len() - 1]
    }

    /// The tournament winner, once the final battle is decided.
    pub fn champion(&self) -> Option<&PromptRef> {
        self.final_battle().winner.as_ref()
    }

    /// True for battles whose entire subtree is byes.
    pub fn is_dead(&self, id: BattleId) -> bool {
        self.index.get(&id).map(|&i| self.dead[i]).unwrap_or(false)
    }

    /// All battles that can actually be played or displayed, bracket order.
    pub fn live(&self) -> impl Iterator<Item = &Battle> {
        self.battles
            .iter()
            .enumerate()
            .filter(|&(i, _)| !self.dead[i])
            .map(|(_, b)| b)
    }

    /// Which slot of the next battle this battle feeds (the parity rule).
    pub fn slot_in_next(&self, id: BattleId) -> Option<Slot> {
        let idx = *self.index.get(&id)?;
        self.battles[idx].next?;
        Some(self.slot_for(idx))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn round_len(&self, round: u32) -> usize {
        self.round(round).len()
    }

    fn index_in_round(&self, idx: usize) -> usize {
        let round = self.battles[idx].round as usize;
        idx - self.round_starts[round - 1]
    }

    fn slot_for(&self, idx: usize) -> Slot {
        if self.index_in_round(idx) % 2 == 0 { Slot::A } else { Slot::B }
    }

    /// Global indices of the two round-(r−1) battles feeding `idx`. Caller must
    /// ensure `idx` is not in round 1.
    fn feeder_indices(&self, idx: usize) -> (usize, usize) {
        let round = self.battles[idx].round as usize;
        let k = self.index_in_round(idx);
        let prev_start = self.round_starts[round - 2];
        (prev_start + 2 * k, prev_start + 2 * k + 1)
    }

    /// Write a decided battle's winner into its designated slot of the next
    /// battle. Exactly one hop; never recurses.
    fn propagate(&mut self, idx: usize) {
        let Some(next_id) = self.battles[idx].next else { return };
        let Some(winner) = self.battles[idx].winner.clone() else { return };
        let next_idx = self.index[&next_id];
        match self.slot_for(idx) {
            Slot::A => self.battles[next_idx].slot_a = Some(winner),
            Slot::B => self.battles[next_idx].slot_b = Some(winner),
        }
    }

    /// Construction-time bye resolution, ascending round-major order: a battle
    /// with one live slot whose opposing feed can never produce a participant
    /// resolves immediately; a battle whose feeds are all byes is marked dead.
    /// Ascending order makes the cascade transitive — a winner propagated into
    /// round r is visible when round r is scanned.
    fn resolve_byes(&mut self) {
        for idx in 0..self.battles.len() {
            if self.battles[idx].winner.is_some() {
                continue;
            }
            let (a_open, b_open) = self.open_slots(idx);
            let a = self.battles[idx].slot_a.clone();
            let b = self.battles[idx].slot_b.clone();
            match (a, b) {
                (None, None) if !a_open && !b_open => self.dead[idx] = true,
                (Some(p), None) if !b_open => {
                    self.battles[idx].winner = Some(p);
                    self.propagate(idx);
                }
                (None, Some(p)) if !a_open => {
                    self.battles[idx].winner = Some(p);
                    self.propagate(idx);
                }
                _ => {}
            }
        }
    }

    /// Whether each currently empty slot of `idx` can still be filled by an
    /// undecided feeder. Round-1 slots are never open: filled or bye, nothing
    /// feeds them.
    fn open_slots(&self, idx: usize) -> (bool, bool) {
        let battle = &self.battles[idx];
        if battle.round == 1 {
            return (false, false);
        }
        let (fa, fb) = self.feeder_indices(idx);
        let open = |f: usize| !self.dead[f] && self.battles[f].winner.is_none();
        (battle.slot_a.is_none() && open(fa), battle.slot_b.is_none() && open(fb))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts(n: u64) -> Vec<PromptRef> {
        (1..=n).map(|i| PromptRef { id: i, value: format!("prompt {i}") }).collect()
    }

    fn build(n: u64) -> Bracket {
        Bracket::build(&prompts(n)).expect("bracket should build")
    }

    #[test]
    fn build_produces_full_binary_tree_counts() {
        for n in 2u64..=32 {
            let bracket = build(n);
            let leaf_slots = (n as usize).next_power_of_two();
            assert_eq!(
                bracket.battles().len(),
                leaf_slots - 1,
                "n={n}: total battles must be 2^ceil(log2 n) - 1"
            );

            let round_one = bracket.round(1);
            assert_eq!(round_one.len(), leaf_slots / 2, "n={n}");
            let real: usize = round_one
                .iter()
                .map(|b| b.slot_a.iter().count() + b.slot_b.iter().count())
                .sum();
            assert_eq!(real, n as usize, "n={n}: round 1 must hold every participant");

            // Byes only exist in round 1; later rounds halve exactly.
            let mut expected = leaf_slots / 2;
            for r in 1..=bracket.round_count() {
                assert_eq!(bracket.round(r).len(), expected, "n={n} round {r}");
                expected /= 2;
            }
        }
    }

    #[test]
    fn every_next_link_points_one_round_up_and_is_shared_by_two() {
        for n in [2u64, 3, 5, 8, 13, 32] {
            let bracket = build(n);
            let mut fan_in: HashMap<BattleId, usize> = HashMap::new();
            for battle in bracket.battles() {
                match battle.next {
                    None => assert_eq!(
                        battle.id,
                        bracket.final_battle().id,
                        "n={n}: only the final may lack a next battle"
                    ),
                    Some(next) => {
                        let parent = bracket.get(next).expect("next must resolve");
                        assert_eq!(parent.round, battle.round + 1, "n={n}");
                        *fan_in.entry(next).or_default() += 1;
                    }
                }
            }
            assert!(
                fan_in.values().all(|&c| c == 2),
                "n={n}: every battle past round 1 must be fed by exactly two battles"
            );
        }
    }

    #[test]
    fn layout_is_idempotent() {
        for n in [2u64, 5, 7, 16] {
            let mut bracket = build(n);
            let before: Vec<Position> = bracket.battles().iter().map(|b| b.pos).collect();
            bracket.layout();
            let after: Vec<Position> = bracket.battles().iter().map(|b| b.pos).collect();
            assert_eq!(before, after, "n={n}");
        }
    }

    #[test]
    fn round_one_battles_are_evenly_spaced() {
        let bracket = build(8);
        let ys: Vec<u32> = bracket.round(1).iter().map(|b| b.pos.y).collect();
        assert_eq!(ys, vec![0, SLOT_SPACING, 2 * SLOT_SPACING, 3 * SLOT_SPACING]);
        for battle in bracket.battles() {
            assert_eq!(battle.pos.x, ROUND_WIDTH * (battle.round - 1));
        }
    }

    #[test]
    fn parent_y_is_midpoint_of_children() {
        let bracket = build(16);
        for battle in bracket.battles().iter().filter(|b| b.round > 1) {
            let feeders: Vec<&Battle> = bracket
                .battles()
                .iter()
                .filter(|b| b.next == Some(battle.id))
                .collect();
            assert_eq!(feeders.len(), 2);
            let mid = (feeders[0].pos.y + feeders[1].pos.y) / 2;
            assert_eq!(battle.pos.y, mid, "battle {} round {}", battle.id, battle.round);
        }
    }

    #[test]
    fn even_index_feeds_slot_a_odd_feeds_slot_b() {
        let mut bracket = build(4);
        let (first, second) = (bracket.round(1)[0].id, bracket.round(1)[1].id);
        assert_eq!(bracket.slot_in_next(first), Some(Slot::A));
        assert_eq!(bracket.slot_in_next(second), Some(Slot::B));

        bracket.record_winner(first, 2).unwrap();
        bracket.record_winner(second, 3).unwrap();
        let last = bracket.final_battle();
        assert_eq!(last.slot_a.as_ref().map(|p| p.id), Some(2));
        assert_eq!(last.slot_b.as_ref().map(|p| p.id), Some(3));
    }

    #[test]
    fn bye_resolves_without_an_explicit_record_call() {
        let bracket = build(3);
        let bye_battle = &bracket.round(1)[1];
        assert!(bye_battle.slot_b.is_none());
        assert_eq!(bye_battle.winner.as_ref().map(|p| p.id), Some(3));
        // ...and the winner already advanced into the final's B slot.
        assert_eq!(bracket.final_battle().slot_b.as_ref().map(|p| p.id), Some(3));
    }

    #[test]
    fn bye_resolution_cascades_through_dead_subtrees() {
        // n=5 pads to 8 leaves: battle 2 is (p5, bye), battle 3 is bye-vs-bye.
        let bracket = build(5);
        let round_one = bracket.round(1);
        assert_eq!(round_one[2].winner.as_ref().map(|p| p.id), Some(5));
        assert!(bracket.is_dead(round_one[3].id));

        // Battle 3 being dead makes round 2's second battle a bye for p5 too.
        let round_two = bracket.round(2);
        assert_eq!(round_two[1].winner.as_ref().map(|p| p.id), Some(5));
        assert_eq!(bracket.final_battle().slot_b.as_ref().map(|p| p.id), Some(5));
        // p5 stops at the first battle with two live participants.
        assert!(bracket.final_battle().winner.is_none());
    }

    #[test]
    fn five_prompt_playthrough_leaves_one_undecided_final() {
        let mut bracket = build(5);
        let (m0, m1) = (bracket.round(1)[0].id, bracket.round(1)[1].id);
        bracket.record_winner(m0, 1).unwrap();
        bracket.record_winner(m1, 4).unwrap();
        let semi = bracket.round(2)[0].id;
        bracket.record_winner(semi, 4).unwrap();

        let last = bracket.final_battle();
        assert!(last.slot_a.is_some() && last.slot_b.is_some());
        assert!(last.winner.is_none());

        let final_id = last.id;
        bracket.record_winner(final_id, 4).unwrap();
        assert_eq!(bracket.champion().map(|p| p.id), Some(4));
    }

    #[test]
    fn two_prompts_make_a_single_battle_with_no_next() {
        let mut bracket = build(2);
        assert_eq!(bracket.battles().len(), 1);
        assert_eq!(bracket.round_count(), 1);
        let only = bracket.final_battle().id;
        assert!(bracket.final_battle().next.is_none());
        assert_eq!(bracket.slot_in_next(only), None);

        bracket.record_winner(only, 1).unwrap();
        assert_eq!(bracket.champion().map(|p| p.id), Some(1));
    }

    #[test]
    fn rejects_out_of_bounds_participant_counts() {
        for n in [0u64, 1, 33, 40] {
            let err = Bracket::build(&prompts(n)).unwrap_err();
            assert!(matches!(err, BracketError::InvalidInput(_)), "n={n}: {err}");
        }
    }

    #[test]
    fn rejects_winner_that_is_not_a_slot() {
        let mut bracket = build(4);
        let first = bracket.round(1)[0].id;
        let err = bracket.record_winner(first, 99).unwrap_err();
        assert!(matches!(err, BracketError::InvalidWinner(_)));

        let err = bracket.record_winner(BattleId(999), 1).unwrap_err();
        assert!(matches!(err, BracketError::InvalidWinner(_)));
    }

    #[test]
    fn recording_the_same_winner_twice_is_a_no_op() {
        let mut bracket = build(4);
        let first = bracket.round(1)[0].id;
        bracket.record_winner(first, 1).unwrap();
        let snapshot: Vec<Option<u64>> = bracket
            .battles()
            .iter()
            .map(|b| b.winner.as_ref().map(|p| p.id))
            .collect();

        bracket.record_winner(first, 1).unwrap();
        let after: Vec<Option<u64>> = bracket
            .battles()
            .iter()
            .map(|b| b.winner.as_ref().map(|p| p.id))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn decided_battles_refuse_a_different_winner() {
        let mut bracket = build(4);
        let first = bracket.round(1)[0].id;
        bracket.record_winner(first, 1).unwrap();
        let err = bracket.record_winner(first, 2).unwrap_err();
        assert!(matches!(err, BracketError::InvalidWinner(_)));
        // The propagated slot is untouched.
        assert_eq!(bracket.final_battle().slot_a.as_ref().map(|p| p.id), Some(1));
    }

    #[test]
    fn dead_battles_never_decide() {
        let mut bracket = build(5);
        let dead = bracket.round(1)[3].id;
        assert!(bracket.is_dead(dead));
        assert!(bracket.record_winner(dead, 1).is_err());
        assert!(bracket.get(dead).unwrap().winner.is_none());
        assert!(bracket.live().all(|b| b.id != dead));
    }

    // -----------------------------------------------------------------------
    // Remote bridging and replay
    // -----------------------------------------------------------------------

    fn pref(id: u64) -> Option<PromptRef> {
        Some(PromptRef { id, value: format!("prompt {id}") })
    }

    /// Backend rows for a 3-prompt group: two round-1 rows feeding one final.
    fn remote_rows_n3() -> Vec<RemoteBattle> {
        vec![
            RemoteBattle {
                id: 11,
                round: 1,
                slot_a: pref(1),
                slot_b: pref(2),
                winner_id: Some(1),
                next_id: Some(13),
            },
            RemoteBattle {
                id: 12,
                round: 1,
                slot_a: pref(3),
                slot_b: None,
                winner_id: None,
                next_id: Some(13),
            },
            RemoteBattle { id: 13, round: 2, ..Default::default() },
        ]
    }

    #[test]
    fn from_remote_rebuilds_and_replays_winners() {
        let bracket = Bracket::from_remote(&remote_rows_n3()).unwrap();
        assert_eq!(bracket.battles().len(), 3);
        assert_eq!(bracket.round(1)[0].winner.as_ref().map(|p| p.id), Some(1));
        // The bye resolved on its own during the rebuild.
        assert_eq!(bracket.round(1)[1].winner.as_ref().map(|p| p.id), Some(3));
        let last = bracket.final_battle();
        assert_eq!(last.slot_a.as_ref().map(|p| p.id), Some(1));
        assert_eq!(last.slot_b.as_ref().map(|p| p.id), Some(3));
        assert!(last.winner.is_none());
    }

    #[test]
    fn adopt_remote_bridges_unpadded_rows_by_next_links() {
        // 5 prompts: the backend emits 3+2+1 rows, we pad to 4+2+1 battles.
        let rows = vec![
            RemoteBattle { id: 1, round: 1, slot_a: pref(1), slot_b: pref(2), next_id: Some(4), ..Default::default() },
            RemoteBattle { id: 2, round: 1, slot_a: pref(3), slot_b: pref(4), next_id: Some(4), ..Default::default() },
            RemoteBattle { id: 3, round: 1, slot_a: pref(5), slot_b: None, next_id: Some(5), ..Default::default() },
            RemoteBattle { id: 4, round: 2, next_id: Some(6), ..Default::default() },
            RemoteBattle { id: 5, round: 2, next_id: Some(6), ..Default::default() },
            RemoteBattle { id: 6, round: 3, ..Default::default() },
        ];

        let mut bracket = build(5);
        bracket.adopt_remote(&rows);

        let remote_ids: Vec<Option<u64>> =
            bracket.battles().iter().map(|b| b.remote_id).collect();
        // The padding battle (index 3) has no backend counterpart.
        assert_eq!(
            remote_ids,
            vec![Some(1), Some(2), Some(3), None, Some(4), Some(5), Some(6)]
        );
    }
}
