//! Page boundaries over a [`MatchSet`].

use crate::item::Item;
use crate::matcher::MatchSet;

/// Width measurement supplied by the renderer.
///
/// Widths include whatever padding the renderer puts around an item, so the
/// pager can sum them directly against the available budget.
pub trait TextMeasure {
    fn measure_text(&self, text: &[u8]) -> u16;

    fn measure_clamped_text(&self, text: &[u8], budget: u16) -> u16 {
        self.measure_text(text).min(budget)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// One item per row, `rows` rows per page.
    Vertical { rows: usize },
    /// Items side by side within `budget` columns.
    Horizontal { budget: u16 },
}

/// Match positions delimiting the visible page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageWindow {
    /// Start of the previous page; `None` on the first page.
    pub prev: Option<usize>,
    pub curr: usize,
    /// Start of the following page; `None` on the last page.
    pub next: Option<usize>,
}

impl PageWindow {
    /// End (exclusive) of the current page.
    pub fn end(&self, len: usize) -> usize {
        self.next.unwrap_or(len)
    }

    pub fn contains(&self, pos: usize, len: usize) -> bool {
        pos >= self.curr && pos < self.end(len)
    }
}

pub fn compute_page(
    matches: &MatchSet,
    items: &[Item],
    curr: usize,
    layout: Layout,
    measure: &dyn TextMeasure,
) -> PageWindow {
    let len = matches.len();
    let curr = curr.min(len.saturating_sub(1));
    let budget = match layout {
        Layout::Vertical { rows } => rows.max(1),
        Layout::Horizontal { budget } => usize::from(budget.max(1)),
    };
    let cost = |pos: usize| -> usize {
        match layout {
            Layout::Vertical { .. } => 1,
            Layout::Horizontal { budget } => {
                let text = matches
                    .get(pos)
                    .and_then(|index| items.get(index))
                    .map_or(&[][..], |item| item.text.as_slice());
                usize::from(measure.measure_clamped_text(text, budget.max(1)))
            }
        }
    };

    let mut used = 0usize;
    let mut next = None;
    for pos in curr..len {
        used += cost(pos);
        if used > budget {
            next = Some(pos);
            break;
        }
    }

    let mut used = 0usize;
    let mut prev = curr;
    while prev > 0 {
        used += cost(prev - 1);
        if used > budget {
            break;
        }
        prev -= 1;
    }

    PageWindow {
        prev: (curr > 0).then_some(prev),
        curr,
        next,
    }
}
