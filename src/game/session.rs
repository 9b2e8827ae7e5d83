//! The live store for this page.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The store is installed once by `boot()` and lives for the lifetime of
//! the page; every `handle_request` call borrows it.

use std::cell::RefCell;

use crate::game::store::Store;

thread_local! {
    static STORE: RefCell<Option<Store>> = const { RefCell::new(None) };
}

/// Install (or replace) the session store.
pub fn install(store: Store) {
    STORE.with(|s| {
        *s.borrow_mut() = Some(store);
    });
}

pub fn is_installed() -> bool {
    STORE.with(|s| s.borrow().is_some())
}

/// Run `f` with read access to the store. `None` before `install`.
pub fn with_store<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Store) -> R,
{
    STORE.with(|s| s.borrow().as_ref().map(f))
}

/// Run `f` with mutable access to the store. `None` before `install`.
pub fn with_store_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Store) -> R,
{
    STORE.with(|s| s.borrow_mut().as_mut().map(f))
}

#[cfg(test)]
pub fn uninstall() {
    STORE.with(|s| *s.borrow_mut() = None);
}

/// Install a store backed by fresh in-memory storage.
#[cfg(test)]
pub fn install_for_test() {
    use crate::game::platform::ScriptedPlatform;
    use crate::game::storage::MemoryStorage;

    install(Store::open(
        Box::new(MemoryStorage::default()),
        Box::new(ScriptedPlatform::new(1_700_000_000_000, &[0.5])),
        crate::catalog::catalog(),
    ));
}
