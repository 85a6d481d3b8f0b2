//! A shared cache of parsed signatures.
//!
//! Introspection data names the same handful of signatures over and over.
//! [`SignatureRegistry`] parses each distinct one once and hands out shared
//! trees afterwards, and can be used from any number of threads.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::error::Result;
use crate::signature::{parse, parse_sequence, TypeNode};

#[derive(Default)]
pub struct SignatureRegistry {
    types: RwLock<HashMap<String, Arc<TypeNode>>>,
    sequences: RwLock<HashMap<String, Arc<Vec<TypeNode>>>>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed form of `sig`. Malformed signatures are cached too, as
    /// nodes of kind [`TypeKind::Invalid`](crate::signature::TypeKind::Invalid).
    pub fn get(&self, sig: &str) -> Arc<TypeNode> {
        if let Some(node) = self.types.read().get(sig) {
            return Arc::clone(node);
        }

        // Parse without holding the lock; if another thread got there
        // first, its tree is kept.
        debug!("parsing signature {:?}", sig);
        let node = Arc::new(parse(sig));
        let mut types = self.types.write();
        Arc::clone(types.entry(sig.to_owned()).or_insert(node))
    }

    /// The parsed form of a multi-type signature. Failures are not cached.
    pub fn get_sequence(&self, sig: &str) -> Result<Arc<Vec<TypeNode>>> {
        if let Some(nodes) = self.sequences.read().get(sig) {
            return Ok(Arc::clone(nodes));
        }

        debug!("parsing signature sequence {:?}", sig);
        let nodes = Arc::new(parse_sequence(sig)?);
        let mut sequences = self.sequences.write();
        Ok(Arc::clone(sequences.entry(sig.to_owned()).or_insert(nodes)))
    }

    /// Number of distinct single-type signatures cached.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::SignatureRegistry;
    use crate::error::Result;
    use crate::signature::{parse, TypeKind};
    use std::sync::Arc;
    use std::thread;
    use test_log::test;

    #[test]
    fn caches_trees() {
        let registry = SignatureRegistry::new();
        assert!(registry.is_empty());
        let first = registry.get("a{sv}");
        let second = registry.get("a{sv}");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, parse("a{sv}"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn caches_invalid_signatures() {
        let registry = SignatureRegistry::new();
        assert_eq!(registry.get("a{s").kind, TypeKind::Invalid);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn sequences() -> Result<()> {
        let registry = SignatureRegistry::new();
        let first = registry.get_sequence("sa{sv}i")?;
        assert_eq!(first.len(), 3);
        assert!(Arc::ptr_eq(&first, &registry.get_sequence("sa{sv}i")?));
        assert!(registry.get_sequence("s()").is_err());
        Ok(())
    }

    #[test]
    fn shared_between_threads() {
        let registry = Arc::new(SignatureRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.get("(sa{sv}as)"))
            })
            .collect();
        let nodes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect();
        for node in &nodes[1..] {
            assert!(Arc::ptr_eq(&nodes[0], node));
        }
        assert_eq!(registry.len(), 1);
    }
}
