//! Busy tracking and in-place collection patches.
//!
//! Mutations wait for server confirmation and then patch the loaded page by
//! id. Nothing here is optimistic, so there is never anything to roll back.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DeskError, Result};
use crate::remote::Page;
use crate::resources::Identified;

/// What a mutation is working on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BusyKey {
    Creating,
    Item(String),
}

impl fmt::Display for BusyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusyKey::Creating => write!(f, "new item"),
            BusyKey::Item(id) => write!(f, "{id}"),
        }
    }
}

/// Keys with a mutation in flight
#[derive(Debug, Default)]
pub struct BusySet {
    keys: HashSet<BusyKey>,
}

impl BusySet {
    pub fn begin(&mut self, key: BusyKey) -> Result<()> {
        if self.keys.contains(&key) {
            return Err(DeskError::Busy(key.to_string()));
        }
        self.keys.insert(key);
        Ok(())
    }

    pub fn finish(&mut self, key: &BusyKey) {
        self.keys.remove(key);
    }

    pub fn is_busy(&self, key: &BusyKey) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> Vec<BusyKey> {
        self.keys.iter().cloned().collect()
    }
}

/// Releases its key when dropped, whichever way the mutation ends.
pub struct BusyGuard {
    set: Arc<Mutex<BusySet>>,
    key: BusyKey,
}

impl BusyGuard {
    pub fn claim(set: &Arc<Mutex<BusySet>>, key: BusyKey) -> Result<Self> {
        set.lock().begin(key.clone())?;
        Ok(Self {
            set: set.clone(),
            key,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.set.lock().finish(&self.key);
    }
}

/// The loaded page plus the server-reported total.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub count: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }
}

impl<T: Identified> Collection<T> {
    pub fn replace_all(&mut self, page: Page<T>) {
        self.items = page.items;
        self.count = page.count;
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Newly created item goes on top.
    pub fn prepend(&mut self, item: T) {
        self.items.retain(|existing| existing.id() != item.id());
        self.items.insert(0, item);
        self.count += 1;
    }

    /// Swap in the server's copy of an item. Returns false if it is not loaded.
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Drop a deleted item. The total always shrinks by one, floored at zero.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.count = self.count.saturating_sub(1);
        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        label: &'static str,
    }

    impl Identified for Row {
        fn id(&self) -> &str {
            self.id
        }
    }

    fn rows(ids: &[&'static str]) -> Collection<Row> {
        Collection {
            items: ids.iter().map(|id| Row { id, label: "old" }).collect(),
            count: ids.len() as u64,
        }
    }

    #[test]
    fn test_busy_set_rejects_duplicates() {
        let mut busy = BusySet::default();
        busy.begin(BusyKey::Item("abc".into())).unwrap();
        let err = busy.begin(BusyKey::Item("abc".into())).unwrap_err();
        assert!(matches!(err, DeskError::Busy(ref id) if id == "abc"));
        busy.begin(BusyKey::Item("def".into())).unwrap();
        busy.begin(BusyKey::Creating).unwrap();

        busy.finish(&BusyKey::Item("abc".into()));
        assert!(!busy.is_busy(&BusyKey::Item("abc".into())));
        assert!(busy.is_busy(&BusyKey::Creating));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let set = Arc::new(Mutex::new(BusySet::default()));
        {
            let _guard = BusyGuard::claim(&set, BusyKey::Creating).unwrap();
            assert!(BusyGuard::claim(&set, BusyKey::Creating).is_err());
        }
        assert!(!set.lock().is_busy(&BusyKey::Creating));
    }

    #[test]
    fn test_replace_keeps_single_copy() {
        let mut c = rows(&["a", "b", "c"]);
        assert!(c.replace(Row { id: "b", label: "new" }));
        assert_eq!(c.items.iter().filter(|r| r.id == "b").count(), 1);
        assert_eq!(c.find("b").unwrap().label, "new");
        assert_eq!(c.items[1].id, "b");
        assert!(!c.replace(Row { id: "z", label: "new" }));
        assert_eq!(c.items.len(), 3);
    }

    #[test]
    fn test_remove_and_count_floor() {
        let mut c = rows(&["abc", "def"]);
        assert!(c.remove("abc"));
        assert_eq!(c.items, vec![Row { id: "def", label: "old" }]);
        assert_eq!(c.count, 1);

        let mut empty: Collection<Row> = Collection::default();
        assert!(!empty.remove("x"));
        assert_eq!(empty.count, 0);
    }

    #[test]
    fn test_prepend_increments_count() {
        let mut c = rows(&["a"]);
        c.prepend(Row { id: "n", label: "new" });
        assert_eq!(c.items[0].id, "n");
        assert_eq!(c.count, 2);
    }
}
