//! Per-server-name mutual exclusion.
//!
//! Configuration read-modify-write and activate/deactivate sequences for
//! the same server name must not interleave; operations on different names
//! proceed independently. The map hands out one mutex per name, created on
//! first use and held for the duration of the whole operation.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

#[derive(Default)]
pub struct ServerNameLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ServerNameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex for a server name. Callers lock it for the whole
    /// read-modify-write or lifecycle sequence.
    pub fn for_server(&self, server_name: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(server_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Lock a server name for the duration of the returned guard.
pub fn lock_server<'a>(lock: &'a Arc<Mutex<()>>) -> MutexGuard<'a, ()> {
    lock.lock().expect("server name mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn same_name_returns_same_lock() {
        let locks = ServerNameLocks::new();
        let a = locks.for_server("srv1");
        let b = locks.for_server("srv1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_names_do_not_contend() {
        let locks = Arc::new(ServerNameLocks::new());
        let l1 = locks.for_server("srv1");
        let _guard = lock_server(&l1);

        let locks2 = locks.clone();
        let handle = thread::spawn(move || {
            let l2 = locks2.for_server("srv2");
            let _g = lock_server(&l2);
        });
        handle.join().unwrap();
    }
}
