use crate::{Attribute, Backend, Error, Item, Page, Result, KEY_ATTRIBUTE};
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{Arc, Mutex, PoisonError},
};

const DEFAULT_PAGE_SIZE: usize = 100;

struct Inner {
    items: BTreeMap<String, Item>,
    page_size: usize,
    fail_writes: bool,
    fail_reads: bool,
    scan_budget: Option<usize>,
}

/// An in-process table. Scans return items ordered by key.
///
/// Records do not survive a restart.
#[derive(Clone)]
pub struct Memory {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items: BTreeMap::new(),
                page_size: page_size.max(1),
                fail_writes: false,
                fail_reads: false,
                scan_budget: None,
            })),
        }
    }

    /// Make every subsequent put fail.
    #[cfg(any(test, feature = "mocks"))]
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make every subsequent get fail.
    #[cfg(any(test, feature = "mocks"))]
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Serve `pages` more scan pages, then fail every scan request.
    #[cfg(any(test, feature = "mocks"))]
    pub fn fail_scan_after(&self, pages: usize) {
        self.lock().scan_budget = Some(pages);
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key_of(item: &Item) -> Result<String> {
    item.get(KEY_ATTRIBUTE)
        .and_then(Attribute::as_s)
        .map(str::to_string)
        .ok_or(Error::Malformed(KEY_ATTRIBUTE))
}

impl Backend for Memory {
    async fn put_item(&self, item: Item) -> Result<()> {
        let key = key_of(&item)?;
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(Error::unavailable("memory store rejected write"));
        }
        inner.items.insert(key, item);
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(Error::unavailable("memory store rejected read"));
        }
        Ok(inner.items.get(key).cloned())
    }

    async fn scan_page(&self, start: Option<Item>) -> Result<Page> {
        let start = start.as_ref().map(key_of).transpose()?;
        let mut inner = self.lock();
        if let Some(budget) = inner.scan_budget.as_mut() {
            if *budget == 0 {
                return Err(Error::unavailable("memory store rejected scan"));
            }
            *budget -= 1;
        }
        let page_size = inner.page_size;

        let lower = match &start {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };
        let mut remaining = inner.items.range((lower, Bound::Unbounded));
        let items: Vec<Item> = remaining
            .by_ref()
            .take(page_size)
            .map(|(_, item)| item.clone())
            .collect();

        let next = match (remaining.next(), items.last()) {
            (Some(_), Some(last)) => {
                let key = key_of(last)?;
                Some(Item::from([(KEY_ATTRIBUTE.to_string(), Attribute::S(key))]))
            }
            _ => None,
        };
        Ok(Page { items, next })
    }
}
