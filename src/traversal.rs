// Cycle-safe walk over parsed JSON
//
// Iterative pre-order DFS over an explicit worklist of (value, inherited
// name) frames. Children are pushed in reverse so they are processed in
// original array/key order; that order is the deterministic tie-break for
// the store's first-write-wins rule.

use crate::classifier::FieldClassifier;
use crate::store::TemplateStore;
use fxhash::FxHashSet;
use serde_json::Value;
use tracing::debug;

pub struct Walker {
    classifier: FieldClassifier,
    max_nodes: usize,
}

impl Walker {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            classifier: FieldClassifier::new(),
            max_nodes,
        }
    }

    /// Walk `root`, inserting every (identifier, effective name) observation
    /// into the store. Each container is visited at most once per call, and
    /// at most `max_nodes` containers are visited in total; a walk that
    /// would exceed the ceiling stops where it is and keeps what it found.
    pub fn walk(&self, root: &Value, store: &mut TemplateStore) {
        if !is_container(root) {
            return;
        }

        // Visited set is keyed by value address, so a node shared between
        // branches is walked once no matter how many paths reach it.
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut stack: Vec<(&Value, String)> = vec![(root, String::new())];

        while let Some((value, inherited)) = stack.pop() {
            if !visited.insert(value as *const Value as usize) {
                continue;
            }
            if visited.len() > self.max_nodes {
                debug!("walk truncated after {} nodes", self.max_nodes);
                return;
            }

            match value {
                Value::Array(items) => {
                    // Arrays carry no name of their own
                    for item in items.iter().rev() {
                        if is_container(item) {
                            stack.push((item, inherited.clone()));
                        }
                    }
                }
                Value::Object(map) => {
                    let local = self.classifier.extract_name_candidate(map);
                    let effective = if local.is_empty() { inherited } else { local };

                    for id in self.classifier.extract_identifiers(map) {
                        store.insert(&id, &effective);
                    }
                    for (_, child) in map.iter().rev() {
                        if is_container(child) {
                            stack.push((child, effective.clone()));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}
