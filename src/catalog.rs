//! Catalog selection.
//!
//! A request picks its catalog in this order:
//! 1. the catalog set on the [`Query`](crate::Query),
//! 2. the innermost [`scoped`] override active on the current thread,
//! 3. the catalog configured on the [`Client`](crate::Client),
//! 4. the process-wide default ([`set_default_catalog`]),
//! 5. [`DEFAULT_CATALOG`].
//!
//! Scoped overrides are per thread. The process-wide default is shared by every
//! thread in the process.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::RwLock;

/// Host of the main CBS open data catalog.
pub const DEFAULT_CATALOG: &str = "opendata.cbs.nl";

static PROCESS_DEFAULT: RwLock<Option<String>> = RwLock::new(None);

thread_local! {
    // Active overrides, innermost last, tagged with the id of their guard.
    static SCOPED: RefCell<Vec<(u64, String)>> = const { RefCell::new(Vec::new()) };
    static NEXT_SCOPE_ID: Cell<u64> = const { Cell::new(0) };
}

/// The process-wide default catalog.
pub fn default_catalog() -> String {
    PROCESS_DEFAULT
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .unwrap_or_else(|| DEFAULT_CATALOG.to_string())
}

/// Replaces the process-wide default catalog and returns the previous one.
pub fn set_default_catalog(catalog: impl Into<String>) -> String {
    let catalog = catalog.into();
    let mut guard = PROCESS_DEFAULT.write().unwrap_or_else(|e| e.into_inner());
    let old = guard
        .replace(catalog.clone())
        .unwrap_or_else(|| DEFAULT_CATALOG.to_string());
    log::info!("Setting 'catalog_url' changed from '{}' to '{}'.", old, catalog);
    old
}

/// Restores [`DEFAULT_CATALOG`] as the process-wide default.
pub fn reset_default_catalog() {
    let mut guard = PROCESS_DEFAULT.write().unwrap_or_else(|e| e.into_inner());
    if let Some(old) = guard.take() {
        log::info!(
            "Setting 'catalog_url' changed from '{}' to '{}'.",
            old,
            DEFAULT_CATALOG
        );
    }
}

/// The innermost scoped override on this thread, if any.
pub fn active_catalog() -> Option<String> {
    SCOPED.with(|s| s.borrow().last().map(|(_, catalog)| catalog.clone()))
}

/// Switches the current thread to `catalog` until the returned guard is dropped.
///
/// ```no_run
/// use cbsodata::{Client, Query, catalog};
///
/// let client = Client::from_env()?;
/// {
///     let _scope = catalog::scoped("dataderden.cbs.nl");
///     let tables = client.get_table_list(&Query::new())?;
///     println!("{} tables", tables.len());
/// }
/// // back on the previous catalog here
/// # Ok::<(), cbsodata::Error>(())
/// ```
pub fn scoped(catalog: impl Into<String>) -> CatalogScope {
    let catalog = catalog.into();
    log::debug!("entering catalog scope '{}'", catalog);
    let id = NEXT_SCOPE_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    });
    SCOPED.with(|s| s.borrow_mut().push((id, catalog)));
    CatalogScope {
        id,
        _not_send: PhantomData,
    }
}

/// Guard returned by [`scoped`]. Dropping it removes its own override,
/// including when unwinding or returning early with `?`.
///
/// Guards may be dropped in any order: the active catalog is always the most
/// recent override whose guard is still alive.
#[must_use = "the catalog override ends when the guard is dropped"]
#[derive(Debug)]
pub struct CatalogScope {
    id: u64,
    // The override lives in a thread local; the guard must stay on that thread.
    _not_send: PhantomData<*const ()>,
}

impl Drop for CatalogScope {
    fn drop(&mut self) {
        SCOPED.with(|s| {
            let mut stack = s.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|(id, _)| *id == self.id) {
                let (_, catalog) = stack.remove(pos);
                log::debug!("leaving catalog scope '{}'", catalog);
            }
        });
    }
}
