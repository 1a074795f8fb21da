//! Dependency Analyzer (C5).
//!
//! Builds the directed message→message dependency graph induced by typed
//! fields (§4.5) and detects cycles, reporting the offending path in
//! source order. Built on a `petgraph::Graph<String, ()>` plus a
//! `HashMap<String, NodeIndex>` name index, the same shape used to detect
//! recursive Rust types that need boxing, generalized here to detect and
//! reject cyclic proto3 message dependencies (§3.3 invariant 6).

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::Graph;

use crate::ast::{Label, Type};
use crate::error::{Result, ValidationError};
use crate::fqn::Fqn;
use crate::resolver;
use crate::state::{Definition, ValidationState};

pub struct DependencyGraph {
    index: HashMap<String, NodeIndex>,
    graph: Graph<String, ()>,
}

impl DependencyGraph {
    /// Constructs the graph from every message in the Symbol Table (§4.5).
    /// Also records each edge into `state.dependencies`, per §3.2's
    /// `Dependency Set`.
    pub fn build(state: &mut ValidationState) -> Self {
        let mut dep_graph = DependencyGraph { index: HashMap::new(), graph: Graph::new() };

        let fqns: Vec<Fqn> = state.symbols.keys_in_order().cloned().collect();
        for fqn in &fqns {
            dep_graph.get_or_insert_index(fqn.as_str());
        }

        for fqn in &fqns {
            let Some(Definition::Message(message)) = state.symbols.get(fqn) else {
                continue;
            };
            let oneof_fields = message.oneofs.iter().flat_map(|o| o.fields.iter());
            for field in message.fields.iter().chain(oneof_fields) {
                if let Type::Named(reference) = &field.ty {
                    if let Some(target) =
                        resolver::resolve_for_dependency_graph(state, reference, fqn)
                    {
                        // Only message targets induce a dependency edge;
                        // enum-typed fields carry no nesting hazard.
                        if matches!(state.symbols.get(&target), Some(Definition::Message(_))) {
                            dep_graph.add_edge(fqn.as_str(), target.as_str());
                            state.dependencies.insert_edge(fqn.clone(), target);
                        }
                    }
                }
            }
        }

        dep_graph
    }

    fn get_or_insert_index(&mut self, fqn: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(fqn) {
            return *idx;
        }
        let idx = self.graph.add_node(fqn.to_owned());
        self.index.insert(fqn.to_owned(), idx);
        idx
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.get_or_insert_index(from);
        let to = self.get_or_insert_index(to);
        self.graph.update_edge(from, to, ());
    }

    /// Depth-first cycle detection rooted at every symbol, in Symbol-Table
    /// insertion order (§4.5). Returns the first cycle found, as the
    /// ordered list of FQNs from the stack entry of the revisited node
    /// through to that node's repeat at the end.
    pub fn detect_cycle(&self, state: &ValidationState) -> Result<()> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();

        for fqn in state.symbols.keys_in_order() {
            let Some(&start) = self.index.get(fqn.as_str()) else {
                continue;
            };
            if visited.contains(&start) {
                continue;
            }
            let mut on_stack: Vec<NodeIndex> = Vec::new();
            let mut on_stack_set: HashSet<NodeIndex> = HashSet::new();
            if let Some(path) =
                self.dfs(start, &mut visited, &mut on_stack, &mut on_stack_set)
            {
                let names = path.iter().map(|idx| self.graph[*idx].clone()).collect();
                return Err(ValidationError::CyclicDependency { path: names });
            }
        }
        Ok(())
    }

    fn dfs(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut Vec<NodeIndex>,
        on_stack_set: &mut HashSet<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        on_stack.push(node);
        on_stack_set.insert(node);

        for neighbor in self.graph.neighbors(node) {
            if on_stack_set.contains(&neighbor) {
                let start = on_stack.iter().position(|&n| n == neighbor).unwrap();
                let mut cycle: Vec<NodeIndex> = on_stack[start..].to_vec();
                cycle.push(neighbor);
                return Some(cycle);
            }
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs(neighbor, visited, on_stack, on_stack_set) {
                    return Some(cycle);
                }
            }
        }

        on_stack.pop();
        on_stack_set.remove(&node);
        visited.insert(node);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, Comments, Span};
    use crate::state::{Definition, ImportedTypes};

    fn field_named(name: &str, number: i32, type_name: &str) -> ast::Field {
        ast::Field {
            name: name.into(),
            number,
            ty: Type::Named(type_name.into()),
            label: Label::Singular,
            oneof_index: None,
            options: vec![],
            comments: Comments::default(),
            span: Span::default(),
        }
    }

    fn message(name: &str, fields: Vec<ast::Field>) -> ast::Message {
        ast::Message {
            name: name.into(),
            fields,
            oneofs: vec![],
            nested_messages: vec![],
            nested_enums: vec![],
            options: vec![],
            reserved: vec![],
            comments: Comments::default(),
            span: Span::default(),
        }
    }

    #[test]
    fn detects_direct_cycle() {
        let a = message("A", vec![field_named("b", 1, "B")]);
        let b = message("B", vec![field_named("a", 1, "A")]);
        let mut state = ValidationState::new(String::new(), ImportedTypes::new());
        state.symbols.insert(Fqn::from_str("A"), Definition::Message(&a));
        state.symbols.insert(Fqn::from_str("B"), Definition::Message(&b));

        let graph = DependencyGraph::build(&mut state);
        let err = graph.detect_cycle(&state).unwrap_err();
        match err {
            ValidationError::CyclicDependency { path } => {
                assert_eq!(path.first(), path.last());
                assert!(path.contains(&"A".to_string()));
                assert!(path.contains(&"B".to_string()));
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }

    #[test]
    fn repeated_field_still_creates_an_edge_and_can_cycle() {
        let mut a_field = field_named("b", 1, "B");
        a_field.label = Label::Repeated;
        let a = message("A", vec![a_field]);
        let b = message("B", vec![field_named("a", 1, "A")]);
        let mut state = ValidationState::new(String::new(), ImportedTypes::new());
        state.symbols.insert(Fqn::from_str("A"), Definition::Message(&a));
        state.symbols.insert(Fqn::from_str("B"), Definition::Message(&b));

        let graph = DependencyGraph::build(&mut state);
        assert_eq!(state.dependencies.edges_from(&Fqn::from_str("A")).count(), 1);
        let err = graph.detect_cycle(&state).unwrap_err();
        assert!(matches!(err, ValidationError::CyclicDependency { .. }));
    }

    #[test]
    fn oneof_member_field_creates_an_edge() {
        use crate::ast::Oneof;

        let a = message(
            "A",
            vec![],
        );
        let mut a = a;
        a.oneofs = vec![Oneof {
            name: "choice".into(),
            fields: vec![field_named("b", 1, "B")],
            options: vec![],
            comments: Comments::default(),
            span: Span::default(),
        }];
        let b = message("B", vec![]);
        let mut state = ValidationState::new(String::new(), ImportedTypes::new());
        state.symbols.insert(Fqn::from_str("A"), Definition::Message(&a));
        state.symbols.insert(Fqn::from_str("B"), Definition::Message(&b));

        let graph = DependencyGraph::build(&mut state);
        assert!(graph.detect_cycle(&state).is_ok());
        assert_eq!(state.dependencies.edges_from(&Fqn::from_str("A")).count(), 1);
    }

    #[test]
    fn acyclic_graph_is_accepted() {
        let a = message("A", vec![field_named("b", 1, "B")]);
        let b = message("B", vec![]);
        let mut state = ValidationState::new(String::new(), ImportedTypes::new());
        state.symbols.insert(Fqn::from_str("A"), Definition::Message(&a));
        state.symbols.insert(Fqn::from_str("B"), Definition::Message(&b));

        let graph = DependencyGraph::build(&mut state);
        assert!(graph.detect_cycle(&state).is_ok());
        assert_eq!(state.dependencies.edges_from(&Fqn::from_str("A")).count(), 1);
    }
}
