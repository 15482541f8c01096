//! Content store — the single source of truth for cards, selection and
//! view state.
//!
//! An explicit state container owned by the application shell and passed
//! down by handle. Components observe it through `subscribe`: a selector
//! projects the state, the projection is value-compared against the last
//! one seen, and the callback only fires when the projection changed.
//! All mutators are synchronous; subscribers run before the mutator
//! returns. Nothing is persisted — state dies with the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The five content flavours a card can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Script,
    Text,
    Audio,
    Image,
    Video,
}

impl CardType {
    pub const ALL: [CardType; 5] = [
        CardType::Script,
        CardType::Text,
        CardType::Audio,
        CardType::Image,
        CardType::Video,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CardType::Script => "script",
            CardType::Text => "text",
            CardType::Audio => "audio",
            CardType::Image => "image",
            CardType::Video => "video",
        }
    }
}

/// A named background gradient. `url` points at a static swatch PNG; the
/// two colours are the fill used when the file is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub name: &'static str,
    pub url: &'static str,
    pub top: [u8; 3],
    pub bottom: [u8; 3],
}

/// A user-editable unit of typed content, positioned in a row of the board.
///
/// `row` and `gradient` are derived from the card's position in the overall
/// sequence; the board engine recomputes them on structural changes. The
/// content fields (`title`, `content`, `card_type`) belong to the user and
/// are only touched through [`CardPatch`] merges.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentCard {
    pub id: String,
    pub card_type: CardType,
    pub title: String,
    pub content: String,
    pub gradient: Gradient,
    pub row: usize,
}

/// Partial update for a card. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub card_type: Option<CardType>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub gradient: Option<Gradient>,
    pub row: Option<usize>,
}

impl CardPatch {
    fn apply(self, card: &mut ContentCard) {
        if let Some(t) = self.card_type {
            card.card_type = t;
        }
        if let Some(t) = self.title {
            card.title = t;
        }
        if let Some(c) = self.content {
            card.content = c;
        }
        if let Some(g) = self.gradient {
            card.gradient = g;
        }
        if let Some(r) = self.row {
            card.row = r;
        }
    }
}

/// How the 2D board and the 3D stage share the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    TwoD,
    ThreeD,
    Hybrid,
}

/// Full store state snapshot.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub mode: ViewMode,
    pub is_playing: bool,
    pub selected_id: Option<String>,
    pub cards: Vec<ContentCard>,
}

impl StoreState {
    /// Look up a card by id.
    pub fn card(&self, id: &str) -> Option<&ContentCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn selected_card(&self) -> Option<&ContentCard> {
        self.selected_id.as_deref().and_then(|id| self.card(id))
    }
}

/// Handle returned by `subscribe`, used to drop the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreState)>;

pub struct Store {
    state: StoreState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            state: StoreState {
                mode: ViewMode::Hybrid,
                is_playing: false,
                selected_id: None,
                cards: Vec::new(),
            },
            listeners: Vec::new(),
            next_listener: 0,
        }
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot.
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Watch a projection of the state. The callback fires after any
    /// mutator whose effect changed the projected value (compared with
    /// `PartialEq`); it does not fire at subscription time.
    pub fn subscribe<T, S, F>(&mut self, selector: S, mut callback: F) -> SubscriptionId
    where
        T: Clone + PartialEq + 'static,
        S: Fn(&StoreState) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_listener);
        self.next_listener += 1;

        let mut last = selector(&self.state);
        self.listeners.push((
            id,
            Box::new(move |state| {
                let current = selector(state);
                if current != last {
                    callback(&current);
                    last = current;
                }
            }),
        ));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sub, _)| *sub != id);
    }

    // ── Mutators ────────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.state.mode = mode;
        self.notify();
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.state.is_playing = playing;
        self.notify();
    }

    pub fn select_card(&mut self, id: Option<&str>) {
        self.state.selected_id = id.map(String::from);
        self.notify();
    }

    /// Merge `patch` into the card with `id`. Absent ids are a silent
    /// no-op — the caller is expected to hold an id it got from the store.
    pub fn update_content(&mut self, id: &str, patch: CardPatch) {
        let Some(card) = self.state.cards.iter_mut().find(|c| c.id == id) else {
            return;
        };
        patch.apply(card);
        self.notify();
    }

    pub fn add_card(&mut self, card: ContentCard) {
        self.state.cards.push(card);
        self.notify();
    }

    /// Remove a card. Clears the selection when it pointed at the removed
    /// card. Absent ids leave the state untouched.
    pub fn remove_card(&mut self, id: &str) {
        let before = self.state.cards.len();
        self.state.cards.retain(|c| c.id != id);
        if self.state.cards.len() == before {
            return;
        }
        if self.state.selected_id.as_deref() == Some(id) {
            self.state.selected_id = None;
        }
        self.notify();
    }

    /// Replace the card sequence wholesale (drag-reorder commit).
    pub fn reorder_cards(&mut self, cards: Vec<ContentCard>) {
        self.state.cards = cards;
        self.notify();
    }

    fn notify(&mut self) {
        // Listeners may not touch the store re-entrantly; take them out so
        // the borrow on `self.state` stays shared.
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&self.state);
        }
        listeners.extend(self.listeners.drain(..));
        self.listeners = listeners;
    }
}

/// Time-based card id token, unique within the process.
pub fn next_card_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}-{}", millis, COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn card(id: &str) -> ContentCard {
        ContentCard {
            id: id.to_string(),
            card_type: CardType::Text,
            title: "New Card".into(),
            content: "Enter content...".into(),
            gradient: crate::board::GRADIENTS[0],
            row: 0,
        }
    }

    #[test]
    fn selector_fires_only_on_projection_change() {
        let mut store = Store::new();
        let fired = Rc::new(Cell::new(0));
        let seen = Rc::clone(&fired);
        store.subscribe(
            |s| s.selected_id.clone(),
            move |_| seen.set(seen.get() + 1),
        );

        store.set_playing(true); // unrelated mutation
        assert_eq!(fired.get(), 0);

        store.add_card(card("a"));
        store.select_card(Some("a"));
        assert_eq!(fired.get(), 1);

        store.select_card(Some("a")); // same projection, no fire
        assert_eq!(fired.get(), 1);

        store.select_card(None);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn remove_clears_matching_selection() {
        let mut store = Store::new();
        store.add_card(card("a"));
        store.add_card(card("b"));
        store.select_card(Some("a"));

        store.remove_card("a");
        assert!(store.state().selected_id.is_none());
        assert_eq!(store.state().cards.len(), 1);
    }

    #[test]
    fn remove_absent_id_is_idempotent() {
        let mut store = Store::new();
        store.add_card(card("a"));
        store.select_card(Some("a"));
        let before = store.state().clone();

        store.remove_card("nope");
        assert_eq!(store.state().cards, before.cards);
        assert_eq!(store.state().selected_id, before.selected_id);
    }

    #[test]
    fn update_absent_id_is_noop() {
        let mut store = Store::new();
        store.add_card(card("a"));

        let mut patch = CardPatch::default();
        patch.title = Some("changed".into());
        store.update_content("missing", patch);

        assert_eq!(store.state().cards[0].title, "New Card");
    }

    #[test]
    fn update_merges_partial_fields() {
        let mut store = Store::new();
        store.add_card(card("a"));

        let mut patch = CardPatch::default();
        patch.content = Some("kick, snare".into());
        store.update_content("a", patch);

        let c = store.state().card("a").unwrap();
        assert_eq!(c.content, "kick, snare");
        assert_eq!(c.title, "New Card"); // untouched
    }

    #[test]
    fn card_ids_are_unique() {
        let a = next_card_id();
        let b = next_card_id();
        assert_ne!(a, b);
    }
}
