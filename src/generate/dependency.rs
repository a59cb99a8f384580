use crate::schema::{ModelDefinition, ReferenceType};
use log::warn;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependent: String,
    pub depends_on: String,
    pub field: String,
    pub reference_type: ReferenceType,
}

/// One edge per reference field. to_one points owner -> target; to_many is
/// inverted so the target is the dependent side.
pub fn analyze_dependencies(models: &[ModelDefinition]) -> Vec<DependencyEdge> {
    let mut edges = Vec::new();
    for model in models {
        for (field, target, rt) in model.reference_fields() {
            let (dependent, depends_on) = match rt {
                ReferenceType::ToOne => (model.name.clone(), target.to_string()),
                ReferenceType::ToMany => (target.to_string(), model.name.clone()),
            };
            edges.push(DependencyEdge {
                dependent,
                depends_on,
                field: field.name.clone(),
                reference_type: rt,
            });
        }
    }
    edges
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOrder {
    pub models: Vec<ModelDefinition>,
    /// Model names re-entered while still on the DFS stack.
    pub cycle_breaks: Vec<String>,
}

impl GenerationOrder {
    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}

struct Sequencer<'a> {
    by_name: HashMap<&'a str, &'a ModelDefinition>,
    deps: HashMap<&'a str, Vec<&'a str>>,
    visiting: HashSet<&'a str>,
    visited: HashSet<&'a str>,
    out: GenerationOrder,
}

impl<'a> Sequencer<'a> {
    fn visit(&mut self, name: &'a str) {
        if self.visiting.contains(name) {
            warn!("dependency cycle detected at model {name}, treating as resolved");
            self.out.cycle_breaks.push(name.to_string());
            return;
        }
        if self.visited.contains(name) {
            return;
        }
        let Some(model) = self.by_name.get(name).copied() else {
            return;
        };

        self.visiting.insert(name);
        let deps = self.deps.get(name).cloned().unwrap_or_default();
        for dep in deps {
            self.visit(dep);
        }
        self.visiting.remove(name);
        self.visited.insert(name);
        self.out.models.push(model.clone());
    }
}

/// Orders models so every to_one target comes before the model holding the
/// reference. Cycles are broken where they are re-entered; every model
/// appears exactly once.
pub fn sequence_models(models: &[ModelDefinition], edges: &[DependencyEdge]) -> GenerationOrder {
    let mut by_name = HashMap::new();
    for m in models {
        by_name.entry(m.name.as_str()).or_insert(m);
    }

    let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for e in edges.iter().filter(|e| e.reference_type == ReferenceType::ToOne) {
        deps.entry(e.dependent.as_str())
            .or_default()
            .push(e.depends_on.as_str());
    }

    let mut seq = Sequencer {
        by_name,
        deps,
        visiting: HashSet::new(),
        visited: HashSet::new(),
        out: GenerationOrder::default(),
    };

    // dependents of to_one edges first, then everything else, both in input order
    for m in models {
        if seq.deps.contains_key(m.name.as_str()) {
            seq.visit(m.name.as_str());
        }
    }
    for m in models {
        seq.visit(m.name.as_str());
    }

    seq.out
}
