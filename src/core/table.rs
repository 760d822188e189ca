use crate::core::snapshot::Snapshot;
use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};

/*-------------------------------------------------------------------------------------------------
  Table
-------------------------------------------------------------------------------------------------*/

/// Holds the current [Snapshot] of blocked AWS IP Prefixes.
///
/// The refresh loop is the only writer; any number of request handlers may call
/// [Table::lookup] concurrently. The lock guards an `Arc<Snapshot>` only: a replace swaps the
/// pointer and lookups clone it before scanning, so readers hold the lock for the duration of
/// a reference-count increment and never observe a partially built snapshot.
#[derive(Debug, Default)]
pub struct Table {
    current: RwLock<Arc<Snapshot>>,
}

/*--------------------------------------------------------------------------------------
  Table Implementation
--------------------------------------------------------------------------------------*/

impl Table {
    /// Create an empty table; it matches nothing until the first snapshot is published.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        // The guarded value is a plain `Arc`; a panic elsewhere cannot leave it torn.
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// Install `snapshot` as the current snapshot, returning the one it replaces.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, snapshot)
    }

    /// Check whether `ip` falls inside any prefix of the current snapshot.
    pub fn lookup(&self, ip: IpAddr) -> bool {
        self.snapshot().contains(ip)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::Selector;
    use crate::core::snapshot::tests::test_document;
    use std::thread;
    use test_log::test;

    fn test_snapshot(prefixes: &[&str]) -> Snapshot {
        let entries: Vec<(&str, &str, &str)> = prefixes
            .iter()
            .map(|prefix| (*prefix, "us-east-1", "EC2"))
            .collect();
        Snapshot::build(&test_document(&entries), &Selector::new())
    }

    #[test]
    fn test_new_table_is_empty() {
        let table = Table::new();

        assert!(table.snapshot().is_empty());
        assert!(!table.lookup("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_replace_and_lookup() {
        let table = Table::new();

        table.replace(test_snapshot(&["10.0.0.0/8"]));
        assert!(table.lookup("10.1.2.3".parse().unwrap()));
        assert!(!table.lookup("172.16.5.5".parse().unwrap()));

        let previous = table.replace(test_snapshot(&["172.16.0.0/12"]));
        assert_eq!(previous.len(), 1);
        assert!(!table.lookup("10.1.2.3".parse().unwrap()));
        assert!(table.lookup("172.16.5.5".parse().unwrap()));
    }

    #[test]
    fn test_snapshot_is_shared_until_replaced() {
        let table = Table::new();
        table.replace(test_snapshot(&["10.0.0.0/8"]));

        let first = table.snapshot();
        assert!(Arc::ptr_eq(&first, &table.snapshot()));

        table.replace(test_snapshot(&["10.0.0.0/8"]));
        assert!(!Arc::ptr_eq(&first, &table.snapshot()));

        // Readers holding the old snapshot keep a consistent view
        assert!(first.contains("10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_replace_is_atomic_under_concurrency() {
        // Every snapshot blocks both addresses of one generation and nothing of the other, so a
        // reader sees either both addresses of a generation or neither.
        let generations = [
            test_snapshot(&["10.0.0.0/24", "10.0.1.0/24"]),
            test_snapshot(&["172.16.0.0/24", "172.16.1.0/24"]),
        ];
        let table = Arc::new(Table::new());
        table.replace(generations[0].clone());

        let writer = {
            let table = Arc::clone(&table);
            let generations = generations.clone();
            thread::spawn(move || {
                for round in 0..2_000 {
                    table.replace(generations[round % 2].clone());
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let snapshot = table.snapshot();
                        let a = snapshot.contains("10.0.0.1".parse().unwrap());
                        let b = snapshot.contains("10.0.1.1".parse().unwrap());
                        let c = snapshot.contains("172.16.0.1".parse().unwrap());
                        let d = snapshot.contains("172.16.1.1".parse().unwrap());
                        assert_eq!(a, b);
                        assert_eq!(c, d);
                        assert_ne!(a, c);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
