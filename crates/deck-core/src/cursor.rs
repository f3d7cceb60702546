//! Cursor and scroll state over a [`FlatList`].
//!
//! Outside a method call the cursor always rests on a selectable row (or is 0
//! when no row is selectable) and always lies inside the visible window
//! `scroll..scroll + height`.

use crate::list::FlatItem;
use crate::list::FlatList;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportCursor<T> {
    list: FlatList<T>,
    cursor: usize,
    scroll: usize,
    height: usize,
}

impl<T> Default for ViewportCursor<T> {
    fn default() -> Self {
        Self {
            list: FlatList::default(),
            cursor: 0,
            scroll: 0,
            height: 1,
        }
    }
}

impl<T: FlatItem> ViewportCursor<T> {
    pub fn new(list: FlatList<T>) -> Self {
        let mut view = Self {
            list,
            ..Self::default()
        };
        view.settle(1);
        view.ensure_visible(view.height);
        view
    }

    /// Like [`ViewportCursor::new`] with a known window height.
    pub fn with_height(list: FlatList<T>, height: usize) -> Self {
        let mut view = Self::new(list);
        view.ensure_visible(height);
        view
    }

    pub fn list(&self) -> &FlatList<T> {
        &self.list
    }

    pub fn items(&self) -> &[T] {
        self.list.items()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn selected(&self) -> Option<&T> {
        self.list
            .get(self.cursor)
            .filter(|item| item.selectable())
    }

    /// Rows currently inside the window, paired with their list index.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &T)> {
        self.list
            .items()
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(self.height)
    }

    /// Moves by `delta` rows, then skips non-selectable rows in the direction
    /// of travel. If that runs off the end of the list, scans back from the
    /// boundary instead.
    pub fn move_by(&mut self, delta: isize) {
        if self.list.is_empty() {
            self.cursor = 0;
            self.scroll = 0;
            return;
        }
        let last = self.list.len() - 1;
        let target = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta.unsigned_abs()).min(last)
        };
        self.cursor = target;
        self.settle(if delta < 0 { -1 } else { 1 });
        self.ensure_visible(self.height);
    }

    pub fn jump_to_next_group(&mut self) {
        let jumps = self.list.jumps();
        let Some(&first) = jumps.first() else {
            return;
        };
        self.cursor = jumps
            .iter()
            .copied()
            .find(|&index| index > self.cursor)
            .unwrap_or(first);
        self.settle(1);
        self.ensure_visible(self.height);
    }

    pub fn jump_to_prev_group(&mut self) {
        let jumps = self.list.jumps();
        let Some(&last) = jumps.last() else {
            return;
        };
        self.cursor = jumps
            .iter()
            .rev()
            .copied()
            .find(|&index| index < self.cursor)
            .unwrap_or(last);
        self.settle(1);
        self.ensure_visible(self.height);
    }

    /// Swaps in a freshly flattened list, keeping the cursor on the same
    /// logical row when it still exists and clamping otherwise.
    pub fn rebuild_against(&mut self, next: FlatList<T>) {
        let previous = self.selected().map(FlatItem::key);
        self.list = next;
        self.cursor = previous
            .and_then(|key| self.list.position(&key))
            .unwrap_or_else(|| self.cursor.min(self.list.len().saturating_sub(1)));
        self.settle(1);
        self.ensure_visible(self.height);
    }

    /// Scrolls by the smallest amount that brings the cursor into view.
    pub fn ensure_visible(&mut self, visible_height: usize) {
        self.height = visible_height.max(1);
        if self.list.is_empty() {
            self.scroll = 0;
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + self.height {
            self.scroll = self.cursor + 1 - self.height;
        }
        let max_scroll = self.list.len().saturating_sub(self.height);
        self.scroll = self.scroll.min(max_scroll).min(self.cursor);
    }

    /// Places the cursor on the first row matching `pred`. Returns false and
    /// leaves the cursor alone when nothing matches.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) -> bool {
        let Some(index) = self
            .list
            .items()
            .iter()
            .position(|item| item.selectable() && pred(item))
        else {
            return false;
        };
        self.cursor = index;
        self.ensure_visible(self.height);
        true
    }

    /// Returns to the top of the list.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.scroll = 0;
        self.settle(1);
        self.ensure_visible(self.height);
    }

    fn settle(&mut self, step: isize) {
        let items = self.list.items();
        if items.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = items.len() - 1;
        let mut index = self.cursor.min(last);
        while !items[index].selectable() {
            let next = index as isize + step;
            if next < 0 || next as usize > last {
                break;
            }
            index = next as usize;
        }
        if !items[index].selectable() {
            index = match Self::scan_back(items, index, -step) {
                Some(found) => found,
                None => 0,
            };
        }
        self.cursor = index;
    }

    fn scan_back(items: &[T], from: usize, step: isize) -> Option<usize> {
        let mut index = from as isize;
        while index >= 0 && (index as usize) < items.len() {
            if items[index as usize].selectable() {
                return Some(index as usize);
            }
            index += step;
        }
        None
    }
}
