//! Card board engine — row/gradient assignment and reordering.
//!
//! Cards live in one flat sequence; rows are buckets of five consecutive
//! cards and every row wears one gradient of a six-entry palette. Row and
//! gradient are pure functions of position (`row = index / 5`,
//! `gradient = palette[row]`) and get recomputed eagerly after every
//! structural change (reorder, delete), so derived fields can never go
//! stale. Content edits travel a separate path and never touch them.
//!
//! Invalid operations are prevented by the guard predicates the UI binds
//! to `add_enabled`, not raised as errors.

use crate::store::{next_card_id, CardPatch, CardType, ContentCard, Gradient, Store, StoreState};

pub const CARDS_PER_ROW: usize = 5;
/// One row per palette entry (the palette has six).
pub const MAX_ROWS: usize = 6;

pub static GRADIENTS: [Gradient; 6] = [
    Gradient {
        name: "Purple",
        url: "assets/gradients/time-up-purple.png",
        top: [192, 132, 252],
        bottom: [124, 58, 237],
    },
    Gradient {
        name: "Green",
        url: "assets/gradients/time-up-green.png",
        top: [74, 222, 128],
        bottom: [5, 150, 105],
    },
    Gradient {
        name: "Blue",
        url: "assets/gradients/time-up-blue.png",
        top: [96, 165, 250],
        bottom: [8, 145, 178],
    },
    Gradient {
        name: "Orange",
        url: "assets/gradients/time-up-orange.png",
        top: [251, 146, 60],
        bottom: [239, 68, 68],
    },
    Gradient {
        name: "Tangerine",
        url: "assets/gradients/time-up-tangerine.png",
        top: [253, 186, 116],
        bottom: [244, 114, 182],
    },
    Gradient {
        name: "Brown",
        url: "assets/gradients/time-up-brown.png",
        top: [217, 119, 6],
        bottom: [154, 52, 18],
    },
];

// ── Guard predicates ────────────────────────────────────────────────────

pub fn row_count(state: &StoreState) -> usize {
    (state.cards.len().div_ceil(CARDS_PER_ROW)).max(1)
}

pub fn can_add_row(state: &StoreState) -> bool {
    row_count(state) < MAX_ROWS
}

pub fn can_remove_row(state: &StoreState) -> bool {
    row_count(state) > 1
}

fn last_row_len(state: &StoreState) -> usize {
    match state.cards.len() % CARDS_PER_ROW {
        0 if state.cards.is_empty() => 0,
        0 => CARDS_PER_ROW,
        n => n,
    }
}

pub fn can_add_card(state: &StoreState) -> bool {
    last_row_len(state) != CARDS_PER_ROW || can_add_row(state)
}

// ── Gradient selection ──────────────────────────────────────────────────

fn gradient_usage(state: &StoreState) -> [usize; MAX_ROWS] {
    let mut counts = [0usize; MAX_ROWS];
    for card in &state.cards {
        if let Some(i) = GRADIENTS.iter().position(|g| g.name == card.gradient.name) {
            counts[i] += 1;
        }
    }
    counts
}

/// Gradient for a single added card: the first palette entry that still has
/// room in its row, else the least-used entry (ties by palette order).
pub fn next_card_gradient(state: &StoreState) -> Gradient {
    let counts = gradient_usage(state);
    if let Some(i) = counts.iter().position(|&c| c < CARDS_PER_ROW) {
        return GRADIENTS[i];
    }
    least_used(&counts)
}

/// Gradient for a whole new row: the first palette entry not used by any
/// card, else the least-used entry.
pub fn next_row_gradient(state: &StoreState) -> Gradient {
    let counts = gradient_usage(state);
    if let Some(i) = counts.iter().position(|&c| c == 0) {
        return GRADIENTS[i];
    }
    least_used(&counts)
}

fn least_used(counts: &[usize; MAX_ROWS]) -> Gradient {
    let mut best = 0;
    for i in 1..MAX_ROWS {
        if counts[i] < counts[best] {
            best = i;
        }
    }
    GRADIENTS[best]
}

// ── Structural operations ───────────────────────────────────────────────

fn default_card(gradient: Gradient, row: usize) -> ContentCard {
    ContentCard {
        id: next_card_id(),
        card_type: CardType::Text,
        title: "New Card".into(),
        content: "Enter content...".into(),
        gradient,
        row,
    }
}

/// Append a full row of five default cards. No-op once the palette is
/// exhausted (six rows).
pub fn add_row(store: &mut Store) {
    if !can_add_row(store.state()) {
        return;
    }
    let gradient = next_row_gradient(store.state());
    let row = row_count(store.state());
    for _ in 0..CARDS_PER_ROW {
        store.add_card(default_card(gradient, row));
    }
}

/// Drop the trailing five cards by position. No-op on a single-row board.
pub fn remove_row(store: &mut Store) {
    let state = store.state();
    if !can_remove_row(state) {
        return;
    }
    let keep = (row_count(state) - 1) * CARDS_PER_ROW;
    let ids: Vec<String> = state.cards[keep..].iter().map(|c| c.id.clone()).collect();
    for id in ids {
        store.remove_card(&id);
    }
}

/// Append one default card, wearing the next available gradient.
pub fn add_card(store: &mut Store) {
    let state = store.state();
    if !can_add_card(state) {
        return;
    }
    let gradient = next_card_gradient(state);
    let row = state.cards.len() / CARDS_PER_ROW;
    store.add_card(default_card(gradient, row));
}

/// Drop the trailing card of the sequence.
pub fn remove_last_card(store: &mut Store) {
    if let Some(last) = store.state().cards.last() {
        let id = last.id.clone();
        store.remove_card(&id);
    }
}

/// Move the card `from_id` to the position of `to_id` (remove, then insert
/// at the target index), then recompute every row/gradient from the new
/// positions. Unknown ids leave the sequence untouched.
pub fn reorder(store: &mut Store, from_id: &str, to_id: &str) {
    if from_id == to_id {
        return;
    }
    let cards = &store.state().cards;
    let (Some(old), Some(new)) = (
        cards.iter().position(|c| c.id == from_id),
        cards.iter().position(|c| c.id == to_id),
    ) else {
        return;
    };

    let mut next = cards.clone();
    let moved = next.remove(old);
    next.insert(new, moved);
    reassign(&mut next);
    store.reorder_cards(next);
}

/// Remove one card by id, recompute the survivors' rows/gradients, and
/// clear the selection when it pointed at the removed card.
pub fn delete_card(store: &mut Store, id: &str) {
    if store.state().card(id).is_none() {
        return;
    }
    store.remove_card(id);
    let mut next = store.state().cards.clone();
    reassign(&mut next);
    store.reorder_cards(next);
}

/// Content-path update: merges the user-editable fields only. Row and
/// gradient belong to the structural path and are stripped here.
pub fn update_card(store: &mut Store, id: &str, mut patch: CardPatch) {
    patch.row = None;
    patch.gradient = None;
    store.update_content(id, patch);
}

/// Re-derive `row` and `gradient` for every card from its position.
pub fn reassign(cards: &mut [ContentCard]) {
    for (i, card) in cards.iter_mut().enumerate() {
        let row = i / CARDS_PER_ROW;
        card.row = row;
        card.gradient = GRADIENTS[row.min(MAX_ROWS - 1)];
    }
}

/// The three starter cards. Their ids match the `card_id` tags baked into
/// the prototype model so the planes light up out of the box.
pub fn seed_cards(store: &mut Store) {
    let seeds = [
        ("1", CardType::Script, "Beat Pattern 1", "kick, snare, kick, snare"),
        ("2", CardType::Audio, "Sample Loop", "sample.wav"),
        ("3", CardType::Text, "Notes", "Remember to add reverb"),
    ];
    for (id, card_type, title, content) in seeds {
        store.add_card(ContentCard {
            id: id.into(),
            card_type,
            title: title.into(),
            content: content.into(),
            gradient: GRADIENTS[0],
            row: 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Store {
        let mut store = Store::new();
        seed_cards(&mut store);
        store
    }

    fn ids(store: &Store) -> Vec<String> {
        store.state().cards.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn rows_follow_position_after_reorder() {
        let mut store = seeded();
        for _ in 0..7 {
            add_card(&mut store);
        }
        let first = store.state().cards[0].id.clone();
        let last = store.state().cards[9].id.clone();
        reorder(&mut store, &first, &last);

        for (i, card) in store.state().cards.iter().enumerate() {
            assert_eq!(card.row, i / CARDS_PER_ROW);
            assert_eq!(card.gradient, GRADIENTS[i / CARDS_PER_ROW]);
        }
    }

    #[test]
    fn reorder_is_a_permutation() {
        let mut store = seeded();
        for _ in 0..7 {
            add_card(&mut store);
        }
        let mut before = ids(&store);
        let from = before[2].clone();
        let to = before[8].clone();
        reorder(&mut store, &from, &to);

        let mut after = ids(&store);
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn reorder_with_unknown_id_is_noop() {
        let mut store = seeded();
        let before = ids(&store);
        reorder(&mut store, "ghost", &before[0]);
        assert_eq!(ids(&store), before);
    }

    // Three cards in row 0, then seven single adds: rows 0 and 1 end up
    // full, wearing the first and second palette entries.
    #[test]
    fn single_adds_fill_rows_in_palette_order() {
        let mut store = seeded();
        for _ in 0..7 {
            add_card(&mut store);
        }

        let cards = &store.state().cards;
        assert_eq!(cards.len(), 10);
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card.row, i / CARDS_PER_ROW);
            let expected = if i < 5 { GRADIENTS[0] } else { GRADIENTS[1] };
            assert_eq!(card.gradient, expected, "card {} gradient", i);
        }
    }

    #[test]
    fn card_gradient_choice_has_capacity_or_is_minimal() {
        // Spare capacity available: the pick must still have room.
        let store = seeded();
        let counts = gradient_usage(store.state());
        let pick = next_card_gradient(store.state());
        let idx = GRADIENTS.iter().position(|g| g.name == pick.name).unwrap();
        assert!(counts[idx] < CARDS_PER_ROW);

        // All at capacity: the pick must be minimal across the palette.
        let mut full = Store::new();
        for _ in 0..MAX_ROWS {
            add_row(&mut full);
        }
        let counts = gradient_usage(full.state());
        let pick = next_card_gradient(full.state());
        let idx = GRADIENTS.iter().position(|g| g.name == pick.name).unwrap();
        assert!(counts.iter().all(|&c| counts[idx] <= c));
    }

    #[test]
    fn add_row_uses_first_unused_gradient() {
        let mut store = seeded(); // three Purple cards
        add_row(&mut store);
        let new_cards = &store.state().cards[3..];
        assert_eq!(new_cards.len(), CARDS_PER_ROW);
        assert!(new_cards.iter().all(|c| c.gradient == GRADIENTS[1]));
    }

    #[test]
    fn add_row_at_six_rows_is_noop() {
        let mut store = seeded();
        for _ in 0..5 {
            add_row(&mut store);
        }
        assert_eq!(row_count(store.state()), MAX_ROWS);
        let count = store.state().cards.len();

        add_row(&mut store);
        assert_eq!(store.state().cards.len(), count);
    }

    #[test]
    fn remove_row_on_single_row_is_noop() {
        let mut store = seeded();
        remove_row(&mut store);
        assert_eq!(store.state().cards.len(), 3);
    }

    #[test]
    fn remove_row_drops_trailing_five() {
        let mut store = seeded();
        add_row(&mut store); // 8 cards, 2 rows
        remove_row(&mut store);
        assert_eq!(store.state().cards.len(), 5);
    }

    #[test]
    fn add_card_disabled_on_full_board() {
        let mut store = Store::new();
        for _ in 0..MAX_ROWS {
            add_row(&mut store);
        }
        assert_eq!(store.state().cards.len(), MAX_ROWS * CARDS_PER_ROW);
        assert!(!can_add_card(store.state()));

        add_card(&mut store);
        assert_eq!(store.state().cards.len(), MAX_ROWS * CARDS_PER_ROW);
    }

    #[test]
    fn remove_last_card_on_empty_board_is_noop() {
        let mut store = Store::new();
        remove_last_card(&mut store);
        assert!(store.state().cards.is_empty());
    }

    #[test]
    fn delete_recomputes_and_clears_selection() {
        let mut store = seeded();
        for _ in 0..7 {
            add_card(&mut store);
        }
        let victim = store.state().cards[1].id.clone();
        store.select_card(Some(&victim));

        delete_card(&mut store, &victim);

        assert!(store.state().selected_id.is_none());
        assert_eq!(store.state().cards.len(), 9);
        for (i, card) in store.state().cards.iter().enumerate() {
            assert_eq!(card.row, i / CARDS_PER_ROW);
        }
    }

    #[test]
    fn update_card_never_touches_structural_fields() {
        let mut store = seeded();
        let patch = CardPatch {
            title: Some("Renamed".into()),
            row: Some(4),
            gradient: Some(GRADIENTS[5]),
            ..Default::default()
        };
        update_card(&mut store, "1", patch);

        let card = store.state().card("1").unwrap();
        assert_eq!(card.title, "Renamed");
        assert_eq!(card.row, 0);
        assert_eq!(card.gradient, GRADIENTS[0]);
    }
}
