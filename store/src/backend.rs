use crate::Result;
use std::{collections::HashMap, future::Future};

/// Name of the attribute every item is keyed by.
pub const KEY_ATTRIBUTE: &str = "ID";

/// A single attribute of a stored item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    S(String),
    /// Numbers travel as their decimal representation.
    N(String),
}

impl Attribute {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Attribute::S(value) => Some(value),
            Attribute::N(_) => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            Attribute::N(value) => Some(value),
            Attribute::S(_) => None,
        }
    }
}

/// An item as it is stored in the table.
pub type Item = HashMap<String, Attribute>;

/// One page of a table scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Key to resume the scan from, if more pages follow.
    pub next: Option<Item>,
}

/// Access to a table of items keyed by a single string attribute.
pub trait Backend: Clone + Send + Sync + 'static {
    /// Replace the item stored under the key contained in `item`.
    fn put_item(&self, item: Item) -> impl Future<Output = Result<()>> + Send;

    /// Fetch the item stored under `key`.
    fn get_item(&self, key: &str) -> impl Future<Output = Result<Option<Item>>> + Send;

    /// Fetch one page of a full scan, starting after `start` when given.
    fn scan_page(&self, start: Option<Item>) -> impl Future<Output = Result<Page>> + Send;
}
