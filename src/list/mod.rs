//! List management: debounced search, fetching, pagination, selection and
//! wait-then-patch mutations, composed by [`ListController`].

pub mod controller;
pub mod debounce;
pub mod fetch;
pub mod mutation;
pub mod pagination;
pub mod selection;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ListController, ListEvent, ListSnapshot, LoadState};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use fetch::Fetcher;
pub use mutation::{BusyGuard, BusyKey, BusySet, Collection};
pub use pagination::Pagination;
pub use selection::{DialogKind, Selection};
