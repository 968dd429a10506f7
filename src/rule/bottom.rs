//! Bottom rules: concrete paths sampled from the graph (spec §3, §4.B).

use std::collections::HashSet;

use crate::graph::{StepDirection, Triple};
use crate::intern::EntityId;
use crate::rule::StartFrom;

/// A concrete path through the graph, anchored on a head triple.
#[derive(Debug, Clone)]
pub struct BottomRule {
    pub head: Triple,
    pub start_from: StartFrom,
    pub body: Vec<Triple>,
    pub steps: Vec<StepDirection>,
    pub visited: HashSet<EntityId>,
    pub is_cyclical: bool,
}

impl BottomRule {
    /// Start a new bottom rule from a head triple and starting endpoint.
    /// `visited` is seeded with both head endpoints (spec §4.B step 3).
    pub fn new(head: Triple, start_from: StartFrom) -> Self {
        let visited = HashSet::from([head.subject, head.object]);
        Self {
            head,
            start_from,
            body: Vec::new(),
            steps: Vec::new(),
            visited,
            is_cyclical: false,
        }
    }

    /// The endpoint the walk currently stands on: the starting endpoint if
    /// the body is empty, otherwise the far endpoint of the last body step.
    pub fn current_node(&self) -> EntityId {
        match self.body.last() {
            None => match self.start_from {
                StartFrom::Subject => self.head.subject,
                StartFrom::Object => self.head.object,
            },
            Some(last) => match self.steps.last().unwrap() {
                StepDirection::Forward => last.object,
                StepDirection::Backward => last.subject,
            },
        }
    }

    pub fn push_step(&mut self, triple: Triple, direction: StepDirection) {
        let new_endpoint = match direction {
            StepDirection::Forward => triple.object,
            StepDirection::Backward => triple.subject,
        };
        self.body.push(triple);
        self.steps.push(direction);
        self.visited.insert(new_endpoint);
    }

    /// Canonical chained view (spec §4.C): the head re-oriented so its
    /// starting endpoint is always in the second position, and every body
    /// atom re-oriented to follow the direction it was walked in.
    pub fn chained(&self) -> (Triple, Vec<Triple>) {
        let head = match self.start_from {
            StartFrom::Object => self.head,
            StartFrom::Subject => self.head.flipped(),
        };
        let body = self
            .steps
            .iter()
            .zip(self.body.iter())
            .map(|(step, triple)| match step {
                StepDirection::Forward => *triple,
                StepDirection::Backward => triple.flipped(),
            })
            .collect();
        (head, body)
    }

    /// `[head-start, head-end, body[0].first, body[0].second, …]`, with
    /// duplicates preserved (spec §4.C).
    pub fn flattened_nodes(&self) -> Vec<EntityId> {
        let (head, body) = self.chained();
        let mut nodes = Vec::with_capacity(2 + body.len() * 2);
        nodes.push(head.subject);
        nodes.push(head.object);
        for atom in &body {
            nodes.push(atom.subject);
            nodes.push(atom.object);
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::index::KnowledgeGraph;

    fn ids(kg: &KnowledgeGraph, s: &str, r: &str, o: &str) -> Triple {
        let s = kg.entity_interner.lookup(s).unwrap();
        let o = kg.entity_interner.lookup(o).unwrap();
        let r = kg.relation_interner.lookup(r).unwrap();
        Triple::new(s, r, o)
    }

    #[test]
    fn chained_flips_head_when_started_from_subject() {
        let kg = KnowledgeGraph::from_string_triples(vec![("a", "r", "b", None)]);
        let head = ids(&kg, "a", "r", "b");
        let rule = BottomRule::new(head, StartFrom::Subject);
        let (chained_head, _) = rule.chained();
        // start_from subject => head is flipped so the walk-start ends up second.
        assert_eq!(chained_head.subject, head.object);
        assert_eq!(chained_head.object, head.subject);
    }

    #[test]
    fn chained_keeps_head_when_started_from_object() {
        let kg = KnowledgeGraph::from_string_triples(vec![("a", "r", "b", None)]);
        let head = ids(&kg, "a", "r", "b");
        let rule = BottomRule::new(head, StartFrom::Object);
        let (chained_head, _) = rule.chained();
        assert_eq!(chained_head, head);
    }

    // Scenario-adjacent: invariant 2 — len(body) == n - 1; no internal
    // revisit except a final cycle-closing endpoint.
    #[test]
    fn flattened_nodes_preserve_duplicates_for_cycles() {
        let kg = KnowledgeGraph::from_string_triples(vec![
            ("a", "r", "b", None),
            ("b", "r", "c", None),
            ("c", "r", "a", None),
        ]);
        let head = ids(&kg, "a", "r", "b");
        let mut rule = BottomRule::new(head, StartFrom::Object);
        rule.push_step(ids(&kg, "b", "r", "c"), StepDirection::Forward);
        rule.push_step(ids(&kg, "c", "r", "a"), StepDirection::Forward);
        let nodes = rule.flattened_nodes();
        // a appears at position 0 (head start) and again at the last body close.
        assert_eq!(nodes.first(), nodes.last());
    }
}
