//! Interactive menu state.
//!
//! A [`Session`] owns the item store, the query buffer, the current match set,
//! the visible page and the selection. The host feeds it one [`Action`] at a
//! time; each action runs to completion, after which the session asks for a
//! redraw and possibly queues output lines or reaches a terminal status.

use crate::item::Item;
use crate::matcher::{match_items, Comparator, MatchSet};
use crate::pager::{compute_page, Layout, PageWindow, TextMeasure};
use crate::text_buffer::{Direction, TextBuffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Accepted,
    Cancelled,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Running
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Insert(Vec<u8>),
    DeleteBackward,
    DeleteForward,
    DeleteWordBackward,
    KillToEnd,
    KillToStart,
    WordLeft,
    WordRight,
    /// Text cursor left, or previous item once the cursor cannot move.
    Left,
    /// Text cursor right, or next item once the cursor is at the end.
    Right,
    MovePrev,
    MoveNext,
    PagePrev,
    PageNext,
    Home,
    End,
    Complete,
    /// Print the selected item, or the typed text when nothing matches.
    Confirm { keep_open: bool },
    /// Print the typed text regardless of the selection.
    ConfirmInput { keep_open: bool },
    Cancel,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub comparator: Comparator,
    pub layout: Layout,
    pub prompt: String,
    pub initial_query: Vec<u8>,
    pub word_delimiters: Vec<u8>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            comparator: Comparator::CaseSensitive,
            layout: Layout::Vertical { rows: 10 },
            prompt: String::new(),
            initial_query: Vec::new(),
            word_delimiters: b" ".to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleItem {
    pub text: Vec<u8>,
    pub selected: bool,
    pub multi_accepted: bool,
}

/// Snapshot of everything the renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleState {
    pub prompt: String,
    pub buffer: Vec<u8>,
    /// Byte offset of the text cursor in `buffer`.
    pub cursor: usize,
    pub items: Vec<VisibleItem>,
    pub has_prev: bool,
    pub has_next: bool,
}

pub struct Session {
    items: Vec<Item>,
    buffer: TextBuffer,
    comparator: Comparator,
    layout: Layout,
    prompt: String,
    word_delimiters: Vec<u8>,
    measure: Box<dyn TextMeasure>,
    matches: MatchSet,
    page: PageWindow,
    sel: Option<usize>,
    status: Status,
    output: Vec<Vec<u8>>,
    redraw: bool,
}

impl Session {
    pub fn new(items: Vec<Item>, config: SessionConfig, measure: Box<dyn TextMeasure>) -> Self {
        let mut session = Self {
            items,
            buffer: TextBuffer::with_text(&config.initial_query),
            comparator: config.comparator,
            layout: config.layout,
            prompt: config.prompt,
            word_delimiters: config.word_delimiters,
            measure,
            matches: MatchSet::default(),
            page: PageWindow::default(),
            sel: None,
            status: Status::Running,
            output: Vec::new(),
            redraw: true,
        };
        session.rematch();
        session
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub fn page(&self) -> PageWindow {
        self.page
    }

    /// Selected position in the match set.
    pub fn selection(&self) -> Option<usize> {
        self.sel
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn selected_text(&self) -> Option<&[u8]> {
        self.sel
            .and_then(|pos| self.matches.get(pos))
            .map(|index| self.items[index].text.as_slice())
    }

    /// Lines emitted since the last call, in order.
    pub fn take_output(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.output)
    }

    /// Whether a redraw was requested since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }

    pub fn handle(&mut self, action: Action) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }

        match action {
            Action::Insert(text) => self.edit(|buffer, _| {
                buffer.insert(&text);
            }),
            Action::DeleteBackward => self.edit(|buffer, _| buffer.delete_rune_backward()),
            Action::DeleteForward => self.edit(|buffer, _| buffer.delete_rune_forward()),
            Action::DeleteWordBackward => {
                self.edit(|buffer, delimiters| buffer.delete_word_backward(delimiters))
            }
            Action::KillToEnd => self.edit(|buffer, _| buffer.kill_to_end()),
            Action::KillToStart => self.edit(|buffer, _| buffer.kill_to_start()),
            Action::WordLeft => self
                .buffer
                .move_word_edge(Direction::Backward, &self.word_delimiters),
            Action::WordRight => self
                .buffer
                .move_word_edge(Direction::Forward, &self.word_delimiters),
            Action::Left => self.left(),
            Action::Right => self.right(),
            Action::MovePrev => self.move_prev(),
            Action::MoveNext => self.move_next(),
            Action::PagePrev => self.jump_page_prev(),
            Action::PageNext => self.jump_page_next(),
            Action::Home => self.jump_home(),
            Action::End => self.jump_end(),
            Action::Complete => self.accept_tab(),
            Action::Confirm { keep_open } => self.confirm_selection(keep_open),
            Action::ConfirmInput { keep_open } => self.confirm_input(keep_open),
            Action::Cancel => self.cancel(),
        }

        self.redraw = true;
        self.status
    }

    pub fn move_next(&mut self) {
        let Some(sel) = self.sel else {
            return;
        };
        if sel + 1 >= self.matches.len() {
            return;
        }
        let sel = sel + 1;
        self.sel = Some(sel);
        if self.page.next == Some(sel) {
            self.recompute_page(sel);
        }
    }

    pub fn move_prev(&mut self) {
        let Some(sel) = self.sel else {
            return;
        };
        if sel == 0 {
            return;
        }
        let sel = sel - 1;
        self.sel = Some(sel);
        if sel + 1 == self.page.curr {
            self.recompute_page(self.page.prev.unwrap_or(0));
        }
    }

    pub fn jump_page_next(&mut self) {
        if let Some(next) = self.page.next {
            self.recompute_page(next);
            self.sel = Some(self.page.curr);
        }
    }

    pub fn jump_page_prev(&mut self) {
        if let Some(prev) = self.page.prev {
            self.recompute_page(prev);
            self.sel = Some(self.page.curr);
        }
    }

    /// On the first match this moves the text cursor to the start of the
    /// query; anywhere else it moves the selection to the first match.
    pub fn jump_home(&mut self) {
        let head = (!self.matches.is_empty()).then_some(0);
        if self.sel == head {
            self.buffer.set_cursor(0);
            return;
        }
        self.sel = head;
        self.recompute_page(0);
    }

    /// On the last match this moves the text cursor to the end of the query;
    /// anywhere else it pages forward until the last match is visible and
    /// selects it.
    pub fn jump_end(&mut self) {
        let tail = self.matches.len().checked_sub(1);
        let Some(last) = tail.filter(|_| self.sel != tail) else {
            self.buffer.set_cursor(self.buffer.len());
            return;
        };

        if self.page.next.is_some() {
            self.recompute_page(last);
            self.recompute_page(self.page.prev.unwrap_or(0));
            while self.page.next.is_some() && self.page.curr < last {
                self.recompute_page(self.page.curr + 1);
            }
        }
        self.sel = Some(last);
    }

    /// Copy the selected item into the query.
    pub fn accept_tab(&mut self) {
        let Some(text) = self.selected_text().map(<[u8]>::to_vec) else {
            return;
        };
        self.buffer.replace(&text);
        self.rematch();
    }

    pub fn confirm_selection(&mut self, multi_accept: bool) {
        let chosen = match self.selected_text() {
            Some(text) => text.to_vec(),
            None => self.buffer.as_bytes().to_vec(),
        };
        self.emit(chosen, multi_accept);
    }

    pub fn confirm_input(&mut self, multi_accept: bool) {
        let chosen = self.buffer.as_bytes().to_vec();
        self.emit(chosen, multi_accept);
    }

    pub fn cancel(&mut self) {
        log::debug!("session cancelled");
        self.status = Status::Cancelled;
    }

    pub fn set_layout(&mut self, layout: Layout) {
        if layout == self.layout {
            return;
        }
        self.layout = layout;
        self.recompute_page(self.page.curr);
        if let Some(sel) = self.sel {
            if !self.page.contains(sel, self.matches.len()) {
                self.recompute_page(sel);
            }
        }
        self.redraw = true;
    }

    pub fn visible_state(&self) -> VisibleState {
        let end = self.page.end(self.matches.len());
        let items = (self.page.curr..end)
            .filter_map(|pos| {
                let item = &self.items[self.matches.get(pos)?];
                Some(VisibleItem {
                    text: item.text.clone(),
                    selected: self.sel == Some(pos),
                    multi_accepted: item.out,
                })
            })
            .collect();

        VisibleState {
            prompt: self.prompt.clone(),
            buffer: self.buffer.as_bytes().to_vec(),
            cursor: self.buffer.cursor(),
            items,
            has_prev: self.page.prev.is_some(),
            has_next: self.page.next.is_some(),
        }
    }

    fn left(&mut self) {
        let vertical = matches!(self.layout, Layout::Vertical { .. });
        let sel_has_left = matches!(self.sel, Some(sel) if sel > 0);
        if self.buffer.cursor() > 0 && (!sel_has_left || vertical) {
            self.buffer.move_rune(Direction::Backward);
        } else if !vertical {
            self.move_prev();
        }
    }

    fn right(&mut self) {
        if !self.buffer.at_end() {
            self.buffer.move_rune(Direction::Forward);
        } else if matches!(self.layout, Layout::Horizontal { .. }) {
            self.move_next();
        }
    }

    fn emit(&mut self, chosen: Vec<u8>, multi_accept: bool) {
        self.output.push(chosen);
        if !multi_accept {
            log::debug!("session accepted");
            self.status = Status::Accepted;
            return;
        }
        if let Some(index) = self.sel.and_then(|pos| self.matches.get(pos)) {
            self.items[index].out = true;
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut TextBuffer, &[u8])) {
        let before = self.buffer.as_bytes().to_vec();
        apply(&mut self.buffer, &self.word_delimiters);
        if self.buffer.as_bytes() != before.as_slice() {
            self.rematch();
        }
    }

    fn rematch(&mut self) {
        self.matches = match_items(&self.items, self.buffer.as_bytes(), self.comparator);
        log::debug!(
            "query {:?}: {} of {} items match (bands {:?})",
            self.buffer.to_string_lossy(),
            self.matches.len(),
            self.items.len(),
            self.matches.band_lens()
        );
        self.sel = (!self.matches.is_empty()).then_some(0);
        self.recompute_page(0);
    }

    fn recompute_page(&mut self, curr: usize) {
        self.page = compute_page(
            &self.matches,
            &self.items,
            curr,
            self.layout,
            self.measure.as_ref(),
        );
        log::trace!("page {:?}", self.page);
    }
}
