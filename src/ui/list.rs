//! Paginated list widget backing every scrollable panel.
//!
//! `PagedList` keeps the logical model (item sequence, page table, cursor)
//! separate from drawing. Pages are contiguous slices sized to the panel's
//! interior height and are recomputed whenever the item set or the viewport
//! changes; `render` draws only the current page each frame.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::util::pad_to_width;

/// Capability required of anything displayed in a [`PagedList`]:
/// a single-line row text.
pub trait RowItem {
    fn row_text(&self) -> String;
}

impl RowItem for String {
    fn row_text(&self) -> String {
        self.clone()
    }
}

/// A contiguous slice descriptor over the item sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

/// Paged, focus-aware list over items of type `T`.
///
/// Invariants (upheld by every mutating operation):
/// - `current_page < max(1, pages.len())`
/// - `cursor_row < current page limit` whenever the list is non-empty
/// - `current_item() == items[page.offset + cursor_row]`
pub struct PagedList<T> {
    items: Vec<T>,
    pages: Vec<Page>,
    current_page: usize,
    cursor_row: usize,
    /// Interior columns of the owning panel.
    width: usize,
    /// Interior rows of the owning panel.
    height: usize,
    base_title: String,
    numbered: bool,
    focused: bool,
}

impl<T: RowItem> PagedList<T> {
    pub fn new(numbered: bool) -> Self {
        Self {
            items: Vec::new(),
            pages: Vec::new(),
            current_page: 0,
            cursor_row: 0,
            width: 0,
            height: 1,
            base_title: String::new(),
            numbered,
            focused: false,
        }
    }

    /// Updates the panel's interior dimensions and recomputes the page
    /// table, keeping the current page and cursor in bounds.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        let height = height.max(1);
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.rebuild_pages();
        self.clamp_position();
    }

    /// Clears items and pages; cursor returns to (0, 0). Idempotent.
    pub fn reset(&mut self) {
        self.items.clear();
        self.pages.clear();
        self.current_page = 0;
        self.cursor_row = 0;
    }

    /// Replaces the item set wholesale and returns to page 0, row 0.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.rebuild_pages();
        self.current_page = 0;
        self.cursor_row = 0;
    }

    /// Appends one item, reflowing the page table. The current page is
    /// retained so a live results view keeps showing the same page.
    pub fn append_item(&mut self, item: T) {
        self.items.push(item);
        self.rebuild_pages();
        self.clamp_position();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Interior width of the owning panel, as last pushed via
    /// [`set_viewport`](Self::set_viewport).
    pub fn viewport_width(&self) -> usize {
        self.width
    }

    /// The item under the cursor, regardless of which page is displayed.
    pub fn current_item(&self) -> Option<&T> {
        let page = self.pages.get(self.current_page)?;
        self.items.get(page.offset + self.cursor_row)
    }

    /// In-place replacement of the item backing the cursor position,
    /// without changing pagination.
    pub fn update_current_item(&mut self, item: T) {
        if let Some(page) = self.pages.get(self.current_page) {
            let idx = page.offset + self.cursor_row;
            if idx < self.items.len() {
                self.items[idx] = item;
            }
        }
    }

    /// Advances the cursor one row, wrapping to the next page (circularly)
    /// at the bottom of the current page. No-op on an empty list.
    pub fn move_down(&mut self) {
        if self.is_empty() {
            return;
        }
        let page = self.pages[self.current_page];
        if self.cursor_row + 1 >= page.limit {
            self.current_page = (self.current_page + 1) % self.pages.len();
            self.cursor_row = 0;
        } else {
            self.cursor_row += 1;
        }
    }

    /// Retreats the cursor one row, wrapping to the last row of the
    /// previous page (circularly) at the top. No-op on an empty list.
    pub fn move_up(&mut self) {
        if self.is_empty() {
            return;
        }
        if self.cursor_row == 0 {
            self.current_page = if self.current_page == 0 {
                self.pages.len() - 1
            } else {
                self.current_page - 1
            };
            self.cursor_row = self.pages[self.current_page].limit - 1;
        } else {
            self.cursor_row -= 1;
        }
    }

    /// Jumps to the next page circularly; cursor resets to row 0.
    pub fn move_page_down(&mut self) {
        if self.is_empty() {
            return;
        }
        self.current_page = (self.current_page + 1) % self.pages.len();
        self.cursor_row = 0;
    }

    /// Jumps to the previous page circularly; cursor resets to row 0.
    pub fn move_page_up(&mut self) {
        if self.is_empty() {
            return;
        }
        self.current_page = if self.current_page == 0 {
            self.pages.len() - 1
        } else {
            self.current_page - 1
        };
        self.cursor_row = 0;
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn unfocus(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_title(&mut self, base: impl Into<String>) {
        self.base_title = base.into();
    }

    /// The rendered title: `"{page}/{pages} - {base}"` when the list spans
    /// more than one page, else the base title alone.
    pub fn title(&self) -> String {
        if self.pages.len() > 1 {
            format!(
                "{}/{} - {}",
                self.current_page + 1,
                self.pages.len(),
                self.base_title
            )
        } else {
            self.base_title.clone()
        }
    }

    /// Draws the current page into `area`. Rows are padded to the interior
    /// width so the selection highlight spans the full row; the cursor row
    /// is highlighted only while the list has focus.
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(self.title());

        let mut lines: Vec<Line> = Vec::new();
        if let Some(page) = self.pages.get(self.current_page) {
            for (row, i) in (page.offset..page.offset + page.limit).enumerate() {
                let text = pad_to_width(&self.row_text_at(i), self.width);
                let style = if self.focused && row == self.cursor_row {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };
                lines.push(Line::styled(text, style));
            }
        }

        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// Row text for the item at absolute index `i`: numbered lists get a
    /// 2-digit-minimum index prefix, unnumbered a single leading space.
    fn row_text_at(&self, i: usize) -> String {
        let text = self.items[i].row_text();
        if self.numbered {
            format!("{:>2}. {}", i + 1, text)
        } else {
            format!(" {}", text)
        }
    }

    fn rebuild_pages(&mut self) {
        self.pages.clear();
        let n = self.items.len();
        let h = self.height.max(1);
        let mut offset = 0;
        while offset < n {
            // An exact multiple of the height yields a full last page.
            let limit = (n - offset).min(h);
            self.pages.push(Page { offset, limit });
            offset += h;
        }
    }

    /// Clamps page index and cursor row after a reflow.
    fn clamp_position(&mut self) {
        if self.pages.is_empty() {
            self.current_page = 0;
            self.cursor_row = 0;
            return;
        }
        if self.current_page >= self.pages.len() {
            self.current_page = self.pages.len() - 1;
        }
        let limit = self.pages[self.current_page].limit;
        if self.cursor_row >= limit {
            self.cursor_row = limit - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list_of(n: usize, height: usize) -> PagedList<String> {
        let mut list = PagedList::new(true);
        list.set_viewport(20, height);
        list.set_items((0..n).map(|i| format!("item {}", i)).collect());
        list
    }

    #[test]
    fn test_page_count_is_ceil() {
        assert_eq!(list_of(0, 5).page_count(), 0);
        assert_eq!(list_of(1, 5).page_count(), 1);
        assert_eq!(list_of(5, 5).page_count(), 1);
        assert_eq!(list_of(6, 5).page_count(), 2);
        assert_eq!(list_of(11, 5).page_count(), 3);
    }

    #[test]
    fn test_exact_multiple_last_page_is_full() {
        // n = 10, h = 5: last page limit must be 5, not 0
        let list = list_of(10, 5);
        assert_eq!(list.page_count(), 2);
        assert_eq!(list.pages[1], Page { offset: 5, limit: 5 });
    }

    #[test]
    fn test_remainder_last_page() {
        let list = list_of(7, 5);
        assert_eq!(list.pages[1], Page { offset: 5, limit: 2 });
    }

    #[test]
    fn test_set_items_selects_first() {
        let list = list_of(3, 5);
        assert_eq!(list.current_item().map(String::as_str), Some("item 0"));
    }

    #[test]
    fn test_empty_list_behavior() {
        let mut list: PagedList<String> = PagedList::new(false);
        list.set_viewport(20, 5);
        assert!(list.is_empty());
        assert_eq!(list.page_count(), 0);
        assert!(list.current_item().is_none());
        // navigation is a no-op, not a panic
        list.move_down();
        list.move_up();
        list.move_page_down();
        list.move_page_up();
        assert!(list.current_item().is_none());
    }

    #[test]
    fn test_down_visits_every_item_once_and_cycles() {
        let mut list = list_of(7, 3);
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(list.current_item().unwrap().clone());
            list.move_down();
        }
        let want: Vec<String> = (0..7).map(|i| format!("item {}", i)).collect();
        assert_eq!(seen, want);
        // back at the start after n presses
        assert_eq!(list.current_item().map(String::as_str), Some("item 0"));
    }

    #[test]
    fn test_up_wraps_to_last_row_of_last_page() {
        let mut list = list_of(7, 3);
        list.move_up();
        // last page holds item 6 on its last row
        assert_eq!(list.current_item().map(String::as_str), Some("item 6"));
    }

    #[test]
    fn test_page_down_on_single_page_is_noop_with_cursor_reset() {
        let mut list = list_of(3, 5);
        list.move_down();
        assert_eq!(list.current_item().map(String::as_str), Some("item 1"));
        list.move_page_down();
        assert_eq!(list.page_count(), 1);
        assert_eq!(list.current_item().map(String::as_str), Some("item 0"));
    }

    #[test]
    fn test_page_navigation_is_circular() {
        let mut list = list_of(10, 3); // 4 pages
        list.move_page_up();
        assert_eq!(list.current_item().map(String::as_str), Some("item 9"));
        list.move_page_down();
        assert_eq!(list.current_item().map(String::as_str), Some("item 0"));
    }

    #[test]
    fn test_append_keeps_current_page() {
        let mut list = list_of(6, 3);
        list.move_page_down();
        assert_eq!(list.current_item().map(String::as_str), Some("item 3"));
        list.append_item("item 6".to_string());
        // still on page 1 while results stream in
        assert_eq!(list.current_item().map(String::as_str), Some("item 3"));
        assert_eq!(list.page_count(), 3);
    }

    #[test]
    fn test_append_from_empty() {
        let mut list: PagedList<String> = PagedList::new(false);
        list.set_viewport(20, 3);
        list.append_item("first".to_string());
        assert_eq!(list.current_item().map(String::as_str), Some("first"));
    }

    #[test]
    fn test_update_current_item_in_place() {
        let mut list = list_of(5, 3);
        list.move_down();
        list.update_current_item("replaced".to_string());
        assert_eq!(list.current_item().map(String::as_str), Some("replaced"));
        assert_eq!(list.len(), 5);
        assert_eq!(list.page_count(), 2);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut list = list_of(5, 3);
        list.reset();
        list.reset();
        assert!(list.is_empty());
        assert_eq!(list.page_count(), 0);
    }

    #[test]
    fn test_title_paging_prefix() {
        let mut list = list_of(3, 5);
        list.set_title("Sites");
        assert_eq!(list.title(), "Sites");

        let mut list = list_of(7, 3);
        list.set_title("Sites");
        assert_eq!(list.title(), "1/3 - Sites");
        list.move_page_down();
        assert_eq!(list.title(), "2/3 - Sites");
    }

    #[test]
    fn test_viewport_shrink_clamps_cursor() {
        let mut list = list_of(10, 10);
        for _ in 0..9 {
            list.move_down();
        }
        assert_eq!(list.current_item().map(String::as_str), Some("item 9"));
        list.set_viewport(20, 4); // pages: 4/4/2, cursor row 9 out of range
        let item = list.current_item().cloned();
        assert!(item.is_some());
    }

    proptest! {
        #[test]
        fn prop_page_table_partitions_items(n in 0usize..200, h in 1usize..25) {
            let list = list_of(n, h);
            prop_assert_eq!(list.page_count(), n.div_ceil(h));
            let mut covered = 0;
            for (i, page) in list.pages.iter().enumerate() {
                prop_assert_eq!(page.offset, covered);
                prop_assert!(page.limit >= 1 && page.limit <= h);
                if i + 1 < list.pages.len() {
                    prop_assert_eq!(page.limit, h);
                }
                covered += page.limit;
            }
            prop_assert_eq!(covered, n);
        }

        #[test]
        fn prop_down_n_times_returns_to_origin(n in 1usize..100, h in 1usize..20) {
            let mut list = list_of(n, h);
            for _ in 0..n {
                prop_assert!(list.current_item().is_some());
                list.move_down();
            }
            prop_assert_eq!(list.current_item().map(String::as_str), Some("item 0"));
        }

        #[test]
        fn prop_up_then_down_is_identity(n in 1usize..100, h in 1usize..20, steps in 0usize..50) {
            let mut list = list_of(n, h);
            for _ in 0..steps {
                list.move_down();
            }
            let before = list.current_item().cloned();
            list.move_up();
            list.move_down();
            prop_assert_eq!(list.current_item().cloned(), before);
        }
    }
}
