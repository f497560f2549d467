use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{KoCode, MapCode};

/// One pathway map and the KO codes of every gene known to participate in
/// it. `members` stays sorted lexicographically and duplicate-free, so
/// the iteration order seen by the compositor and by reports is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayNode {
    pub map_code: MapCode,
    pub name: String,
    members: Vec<KoCode>,
}

impl PathwayNode {
    pub fn new(map_code: MapCode, name: String) -> Self {
        Self {
            map_code,
            name,
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[KoCode] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, code: &KoCode) -> bool {
        self.members.binary_search(code).is_ok()
    }

    /// Inserts at the sorted position; a code already present is a no-op.
    pub fn add_member(&mut self, code: KoCode) {
        if let Err(position) = self.members.binary_search(&code) {
            self.members.insert(position, code);
        }
    }
}

/// In-memory bipartite gene/pathway graph, pathway side. Nodes are unique
/// per map code and kept in first-seen order, which is also the order the
/// checkpoint serializes them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathwayGraph {
    nodes: Vec<PathwayNode>,
    index: HashMap<MapCode, usize>,
}

impl PathwayGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the lookup index from checkpointed nodes.
    pub fn from_nodes(nodes: Vec<PathwayNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.map_code.clone(), position))
            .collect();
        Self { nodes, index }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, map_code: &MapCode) -> Option<&PathwayNode> {
        self.index.get(map_code).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> &[PathwayNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<PathwayNode> {
        self.nodes
    }

    pub fn has_member(&self, map_code: &MapCode, code: &KoCode) -> bool {
        self.get(map_code)
            .map(|node| node.has_member(code))
            .unwrap_or(false)
    }

    /// Creates the node on first sight of `map_code` (with the supplied
    /// display name), then records the gene's membership. Two genes
    /// referencing the same map code share one node.
    pub fn upsert_pathway_reference(
        &mut self,
        map_code: &MapCode,
        name_if_new: &str,
        code: &KoCode,
    ) {
        let position = match self.index.get(map_code) {
            Some(&position) => position,
            None => {
                let position = self.nodes.len();
                self.nodes
                    .push(PathwayNode::new(map_code.clone(), name_if_new.to_string()));
                self.index.insert(map_code.clone(), position);
                position
            }
        };
        self.nodes[position].add_member(code.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(code: &str) -> MapCode {
        code.parse().unwrap()
    }

    fn ko(code: &str) -> KoCode {
        code.parse().unwrap()
    }

    #[test]
    fn members_stay_sorted_and_unique() {
        let mut graph = PathwayGraph::new();
        for code in ["K00003", "K00001", "K00002", "K00001"] {
            graph.upsert_pathway_reference(&map("map00010"), "Glycolysis", &ko(code));
        }
        let node = graph.get(&map("map00010")).unwrap();
        let members: Vec<&str> = node.members().iter().map(KoCode::as_str).collect();
        assert_eq!(members, vec!["K00001", "K00002", "K00003"]);
    }

    #[test]
    fn repeated_upsert_is_idempotent() {
        let mut graph = PathwayGraph::new();
        graph.upsert_pathway_reference(&map("map00010"), "Glycolysis", &ko("K00001"));
        let before = graph.get(&map("map00010")).unwrap().clone();
        graph.upsert_pathway_reference(&map("map00010"), "ignored name", &ko("K00001"));
        let after = graph.get(&map("map00010")).unwrap();
        assert_eq!(&before, after);
        assert_eq!(after.name, "Glycolysis");
    }

    #[test]
    fn nodes_are_shared_across_genes() {
        let mut graph = PathwayGraph::new();
        graph.upsert_pathway_reference(&map("map04020"), "Calcium signaling", &ko("K04958"));
        graph.upsert_pathway_reference(&map("map04020"), "", &ko("K05858"));
        assert_eq!(graph.len(), 1);
        assert!(graph.has_member(&map("map04020"), &ko("K04958")));
        assert!(graph.has_member(&map("map04020"), &ko("K05858")));
        assert!(!graph.has_member(&map("map04020"), &ko("K99999")));
    }

    #[test]
    fn index_survives_round_trip_through_nodes() {
        let mut graph = PathwayGraph::new();
        graph.upsert_pathway_reference(&map("map00010"), "Glycolysis", &ko("K00001"));
        graph.upsert_pathway_reference(&map("map00020"), "TCA cycle", &ko("K00002"));
        let rebuilt = PathwayGraph::from_nodes(graph.nodes().to_vec());
        assert!(rebuilt.has_member(&map("map00020"), &ko("K00002")));
        assert_eq!(rebuilt.nodes()[0].map_code.as_str(), "map00010");
    }
}
