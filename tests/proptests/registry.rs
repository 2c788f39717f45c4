//! Property-Based Tests: Logger Name Table
//!
//! These tests use the `proptest` framework to drive the registry's
//! open-addressing name table with random sequences of inserts and removals,
//! checking it against a `HashMap` model after every step.
//!
//! # Coverage
//!
//! - **Lookup agreement:** every name the model holds is found with the
//!   value last inserted under it, and removed names are never found.
//! - **Collisions and resizing:** names come from a small pool and the
//!   table starts tiny, so chains collide, tombstones pile up, and the
//!   table doubles and resets repeatedly.
//! - **Registry round trip:** loggers created and deleted in random order
//!   through `LoggerRegistry` stay findable exactly while they exist.

#[cfg(test)]
mod tests {
    use mintboy::logging::{LoggerRegistry, NameTable, NullSink, RegistryConfig};
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(usize, u32),
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0..24usize, any::<u32>()).prop_map(|(n, v)| Op::Insert(n, v)),
            2 => (0..24usize).prop_map(Op::Remove),
        ]
    }

    fn name(n: usize) -> String {
        format!("logger-{}", n)
    }

    proptest! {
        /// **Property:** the table behaves like a map under any sequence of
        /// inserts and removals.
        #[test]
        fn test_table_matches_model(
            ops in prop::collection::vec(op(), 1..200),
            initial in 1usize..8,
        ) {
            let mut table = NameTable::new(initial, 0.7);
            let mut model: HashMap<String, u32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Insert(n, v) => {
                        let (_, replaced) = table.insert(&name(n), v).unwrap();
                        prop_assert_eq!(replaced, model.insert(name(n), v));
                    }
                    Op::Remove(n) => {
                        prop_assert_eq!(table.remove(&name(n)), model.remove(&name(n)));
                    }
                }

                prop_assert_eq!(table.len(), model.len());
                for n in 0..24 {
                    prop_assert_eq!(table.get(&name(n)), model.get(&name(n)));
                }
                if model.is_empty() {
                    prop_assert_eq!(table.capacity(), 0);
                } else {
                    prop_assert!(table.len() <= table.capacity());
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// **Property:** a registry finds a logger exactly while it exists.
        #[test]
        fn test_registry_create_delete(
            ops in prop::collection::vec((0..8usize, any::<bool>()), 1..24),
        ) {
            let registry = LoggerRegistry::with_config(RegistryConfig {
                initial_capacity: 2,
                load_factor: 0.7,
            });
            let mut live = [false; 8];

            for (n, create) in ops {
                let logger = name(n);
                if create {
                    let id = registry
                        .create_logger(&logger, None, Some(Box::new(NullSink)))
                        .unwrap();
                    prop_assert_eq!(registry.find(&logger).map(|h| h.id()), Some(id));
                    live[n] = true;
                } else {
                    registry.delete_logger(&logger);
                    live[n] = false;
                }

                for (i, &alive) in live.iter().enumerate() {
                    prop_assert_eq!(registry.contains(&name(i)), alive);
                }
                prop_assert_eq!(registry.len(), live.iter().filter(|&&alive| alive).count());
            }

            registry.delete_loggers();
            prop_assert!(registry.is_empty());
        }
    }
}
