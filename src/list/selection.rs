use serde::Serialize;

use crate::resources::Identified;

/// Modal dialog a row action opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Create,
    Edit,
    Delete,
    Details,
    Reject,
}

/// Selected item and open dialog. Cleared together when the dialog closes.
#[derive(Debug, Clone)]
pub struct Selection<T> {
    pub selected: Option<T>,
    pub dialog: Option<DialogKind>,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self {
            selected: None,
            dialog: None,
        }
    }
}

impl<T: Identified> Selection<T> {
    pub fn open(&mut self, kind: DialogKind, item: Option<T>) {
        self.dialog = Some(kind);
        self.selected = item;
    }

    pub fn close(&mut self) {
        self.dialog = None;
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// True when the selection is about item `id`
    pub fn references(&self, id: &str) -> bool {
        self.selected.as_ref().is_some_and(|item| item.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str);

    impl Identified for Row {
        fn id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_open_and_close() {
        let mut selection = Selection::default();
        selection.open(DialogKind::Reject, Some(Row("abc")));
        assert!(selection.references("abc"));
        assert!(!selection.references("def"));
        assert_eq!(selection.dialog, Some(DialogKind::Reject));

        selection.close();
        assert!(!selection.is_open());
        assert!(!selection.references("abc"));
    }
}
