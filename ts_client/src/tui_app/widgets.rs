use ratatui::widgets::{ListItem, ListState, ScrollbarState};

/// A bounded list of items shown bottom to top, newest first, with a
/// selection used for scrolling.
pub struct ScrollableList {
    max_items: usize,
    pub list_items: Vec<ListItem<'static>>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
}

impl ScrollableList {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            list_items: Vec::new(),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    /// Add an item at the bottom. Keeps the view pinned to the newest item
    /// unless the user scrolled away from it.
    pub fn push(&mut self, item: ListItem<'static>) {
        self.list_items.insert(0, item);
        self.list_items.truncate(self.max_items);
        if let Some(selected) = self.list_state.selected() {
            if selected > 0 {
                self.select(selected + 1);
                return;
            }
        }
        self.select(0);
    }

    pub fn move_up(&mut self) {
        let selected = self.list_state.selected().unwrap_or(0);
        self.select(selected + 1);
    }

    pub fn move_down(&mut self) {
        let selected = self.list_state.selected().unwrap_or(0);
        self.select(selected.saturating_sub(1));
    }

    /// Scroll to the oldest item.
    pub fn jump_to_first(&mut self) {
        self.select(self.list_items.len().saturating_sub(1));
    }

    /// Scroll to the newest item.
    pub fn jump_to_last(&mut self) {
        self.select(0);
    }

    pub fn len(&self) -> usize {
        self.list_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list_items.is_empty()
    }

    fn select(&mut self, idx: usize) {
        let last = self.list_items.len().saturating_sub(1);
        let idx = idx.min(last);
        self.list_state.select(Some(idx));
        self.scroll_state = self
            .scroll_state
            .content_length(self.list_items.len())
            .position(last - idx);
    }
}

/// Single line text input with a character cursor.
#[derive(Default)]
pub struct UserInput {
    pub value: String,
    /// Cursor position in characters, not bytes
    pub char_idx: usize,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_idx(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.char_idx)
            .map_or(self.value.len(), |(idx, _)| idx)
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn input(&mut self, c: char) {
        let idx = self.byte_idx();
        self.value.insert(idx, c);
        self.char_idx += 1;
    }

    pub fn backspace(&mut self) {
        if self.char_idx == 0 {
            return;
        }
        self.char_idx -= 1;
        let idx = self.byte_idx();
        self.value.remove(idx);
    }

    pub fn delete(&mut self) {
        if self.char_idx < self.char_count() {
            let idx = self.byte_idx();
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.char_idx = self.char_idx.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.char_idx = (self.char_idx + 1).min(self.char_count());
    }

    pub fn jump_to_first(&mut self) {
        self.char_idx = 0;
    }

    pub fn jump_to_last(&mut self) {
        self.char_idx = self.char_count();
    }

    /// Take the current value and reset the input.
    pub fn submit(&mut self) -> String {
        self.char_idx = 0;
        std::mem::take(&mut self.value)
    }
}
