//! Review list: the candidates an admin toggles, edits and prunes before saving.

use crate::candidate::Selectable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewList<T> {
    items: Vec<T>,
}

impl<T> Default for ReviewList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Selectable> ReviewList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Flip one row's checkbox. Returns `false` if the index is out of range.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                let selected = item.is_selected();
                item.set_selected(!selected);
                true
            }
            None => false,
        }
    }

    /// Select or deselect every row.
    pub fn set_all_selected(&mut self, selected: bool) {
        for item in &mut self.items {
            item.set_selected(selected);
        }
    }

    pub fn all_selected(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(Selectable::is_selected)
    }

    /// Delete a row; later rows shift up.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Selected rows, in list order.
    pub fn selected(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| item.is_selected())
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
