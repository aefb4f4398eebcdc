// Roster construction and slot assignment.

use std::borrow::Borrow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::pick::{SlotKind, STANDARD_ROSTER};
use crate::player::{Player, PlayerId};

/// A single slot on a team's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSlot {
    /// Which players this slot accepts.
    pub kind: SlotKind,
    /// The player occupying this slot, if any.
    pub player: Option<Player>,
}

/// A team's complete roster, aligned 1:1 with its slot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub slots: Vec<RosterSlot>,
}

impl Roster {
    /// An empty roster with one slot per entry of `layout`, in order.
    pub fn new(layout: &[SlotKind]) -> Self {
        Roster {
            slots: layout
                .iter()
                .map(|&kind| RosterSlot { kind, player: None })
                .collect(),
        }
    }

    /// An empty roster with the standard 13-slot lineup.
    pub fn standard() -> Self {
        Roster::new(&STANDARD_ROSTER)
    }

    pub fn layout(&self) -> Vec<SlotKind> {
        self.slots.iter().map(|s| s.kind).collect()
    }

    /// Rostered players in slot order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().filter_map(|s| s.player.as_ref())
    }

    /// Whether a player with this stable identifier is on the roster.
    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.slot_of(id).is_some()
    }

    /// Slot index holding the player with this stable identifier.
    pub fn slot_of(&self, id: &PlayerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.player.as_ref().is_some_and(|p| &p.id() == id))
    }

    /// Number of filled (non-empty) slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.player.is_some()).count()
    }

    pub fn empty_slots(&self) -> usize {
        self.total_count() - self.filled_count()
    }

    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.player.is_some())
    }
}

// ---------------------------------------------------------------------------
// Eligibility resolution
// ---------------------------------------------------------------------------

/// Outcome of placing a set of players onto a slot layout.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub roster: Roster,
    /// `placements[i]` is the slot index given to input player `i`, or
    /// `None` if it could not be placed.
    pub placements: Vec<Option<usize>>,
}

impl Resolution {
    /// Whether every input player was placed.
    pub fn is_total(&self) -> bool {
        self.placements.iter().all(Option::is_some)
    }

    pub fn placed_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_some()).count()
    }
}

/// Indices of the slots in `layout` that `player` may occupy.
pub fn eligible_slots(layout: &[SlotKind], player: &Player) -> Vec<usize> {
    let positions = player.positions();
    layout
        .iter()
        .enumerate()
        .filter(|(_, kind)| kind.accepts(&positions))
        .map(|(idx, _)| idx)
        .collect()
}

/// Assign `players` to the slots of `layout`, one player per slot.
///
/// Runs an exhaustive backtracking search, most-constrained player first.
/// If no complete assignment exists, falls back to a greedy pass in input
/// order that gives each player its first open eligible slot. Callers that
/// pass existing roster members in slot order followed by a newcomer get
/// every existing member placed by that pass.
pub fn resolve<P: Borrow<Player>>(layout: &[SlotKind], players: &[P]) -> Resolution {
    let eligible: Vec<Vec<usize>> = players
        .iter()
        .map(|p| eligible_slots(layout, p.borrow()))
        .collect();

    let placements = place(layout, &eligible);

    let mut roster = Roster::new(layout);
    for (player, placement) in players.iter().zip(&placements) {
        if let Some(slot) = placement {
            roster.slots[*slot].player = Some(player.borrow().clone());
        }
    }

    Resolution { roster, placements }
}

/// Whether `candidate` can join `roster`, possibly by reshuffling the
/// players already on it.
pub fn can_fit_player_in_team(roster: &Roster, candidate: &Player) -> bool {
    if roster.is_full() {
        return false;
    }
    let layout = roster.layout();
    let mut players: Vec<&Player> = roster.players().collect();
    players.push(candidate);

    let eligible: Vec<Vec<usize>> = players.iter().map(|p| eligible_slots(&layout, p)).collect();
    place(&layout, &eligible).last().is_some_and(Option::is_some)
}

fn place(layout: &[SlotKind], eligible: &[Vec<usize>]) -> Vec<Option<usize>> {
    backtrack(layout, eligible).unwrap_or_else(|| greedy(layout.len(), eligible))
}

/// Slots in the same class accept exactly the same players.
fn slot_class(kind: SlotKind) -> SlotKind {
    if kind.is_meta_slot() {
        SlotKind::Utility
    } else {
        kind
    }
}

struct Search<'a> {
    order: Vec<usize>,
    eligible: &'a [Vec<usize>],
    classes: Vec<SlotKind>,
    occupied: Vec<bool>,
    placements: Vec<Option<usize>>,
    /// `(depth, occupancy)` pairs already known to be dead ends.
    failed: HashSet<(usize, Vec<bool>)>,
}

fn backtrack(layout: &[SlotKind], eligible: &[Vec<usize>]) -> Option<Vec<Option<usize>>> {
    // Pigeonhole: no complete assignment exists.
    if eligible.len() > layout.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..eligible.len()).collect();
    order.sort_by_key(|&idx| eligible[idx].len());

    let mut search = Search {
        order,
        eligible,
        classes: layout.iter().map(|&kind| slot_class(kind)).collect(),
        occupied: vec![false; layout.len()],
        placements: vec![None; eligible.len()],
        failed: HashSet::new(),
    };
    if search.run(0) {
        Some(search.placements)
    } else {
        None
    }
}

impl Search<'_> {
    fn run(&mut self, depth: usize) -> bool {
        let Some(&player) = self.order.get(depth) else {
            return true;
        };
        // What remains to be searched depends only on the depth and the
        // occupied slots, so a failed pair fails from any path.
        if self.failed.contains(&(depth, self.occupied.clone())) {
            return false;
        }

        // Trying a second open slot of an already-failed class is a mirror
        // image of the first attempt.
        let eligible = self.eligible;
        let mut tried: Vec<SlotKind> = Vec::new();
        for &slot in &eligible[player] {
            if self.occupied[slot] || tried.contains(&self.classes[slot]) {
                continue;
            }
            tried.push(self.classes[slot]);

            self.occupied[slot] = true;
            self.placements[player] = Some(slot);
            if self.run(depth + 1) {
                return true;
            }
            self.occupied[slot] = false;
            self.placements[player] = None;
        }

        self.failed.insert((depth, self.occupied.clone()));
        false
    }
}

// Bench accepts anyone, so an open bench slot is always among a player's
// eligible slots; no separate bench pass is needed.
fn greedy(slot_count: usize, eligible: &[Vec<usize>]) -> Vec<Option<usize>> {
    let mut occupied = vec![false; slot_count];
    eligible
        .iter()
        .map(|slots| {
            let slot = slots.iter().copied().find(|&s| !occupied[s])?;
            occupied[slot] = true;
            Some(slot)
        })
        .collect()
}
