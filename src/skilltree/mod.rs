//! Passive skill tree.
//!
//! Nodes live in an undirected `petgraph` graph built from the symmetric
//! union of every node's listed connections. The allocated set always
//! contains the start node and stays connected: a node can only be
//! allocated next to an allocated node, and only deallocated if every
//! other allocated node is still reachable from start without it.

pub mod data;

use std::collections::{HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, NodeFiltered};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;
use crate::stats::Bonuses;

/// Cluster a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Str,
    Dex,
    Int,
    Neutral,
}

/// Node size / role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Start,
    Small,
    Notable,
    Keystone,
    SkillUnlock,
}

/// Static node definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNodeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: NodeKind,
    pub category: NodeCategory,
    #[serde(default)]
    pub bonuses: Bonuses,
    pub connections: Vec<String>,
    #[serde(default)]
    pub min_level: Option<u32>,
    /// Layout hint for tree views
    #[serde(default)]
    pub position: (f32, f32),
}

/// Why an allocation or deallocation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeRejection {
    #[error("no such node")]
    UnknownNode,
    #[error("no skill points available")]
    NoPoints,
    #[error("node already allocated")]
    AlreadyAllocated,
    #[error("requires level {required}")]
    LevelTooLow { required: u32 },
    #[error("node is not adjacent to an allocated node")]
    NotAdjacent,
    #[error("the start node cannot be removed")]
    StartNode,
    #[error("node is not allocated")]
    NotAllocated,
    #[error("removing this node would disconnect the tree")]
    WouldDisconnect,
}

/// Allocation state over a fixed node graph
#[derive(Debug, Clone)]
pub struct SkillTree {
    graph: UnGraph<SkillNodeDef, ()>,
    index: HashMap<String, NodeIndex>,
    start: NodeIndex,
    allocated: HashSet<NodeIndex>,
}

impl SkillTree {
    /// Build the graph. Fails on duplicate ids, dangling connections, or
    /// anything other than exactly one start node.
    pub fn from_defs(defs: &[SkillNodeDef]) -> Result<Self, ConfigError> {
        let mut graph = UnGraph::<SkillNodeDef, ()>::default();
        let mut index = HashMap::with_capacity(defs.len());

        for def in defs {
            if index.contains_key(&def.id) {
                return Err(ConfigError::DuplicateId {
                    kind: "skill node",
                    id: def.id.clone(),
                });
            }
            let idx = graph.add_node(def.clone());
            index.insert(def.id.clone(), idx);
        }

        for def in defs {
            let from = index[&def.id];
            for target in &def.connections {
                let to = *index.get(target).ok_or_else(|| ConfigError::UnknownTreeNode {
                    node: def.id.clone(),
                    target: target.clone(),
                })?;
                if from != to {
                    graph.update_edge(from, to, ());
                }
            }
        }

        let starts: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&n| graph[n].kind == NodeKind::Start)
            .collect();
        let start = match starts.as_slice() {
            [only] => *only,
            other => return Err(ConfigError::StartNodeCount(other.len())),
        };

        let mut allocated = HashSet::new();
        allocated.insert(start);

        Ok(Self {
            graph,
            index,
            start,
            allocated,
        })
    }

    pub fn node(&self, id: &str) -> Option<&SkillNodeDef> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SkillNodeDef> {
        self.graph.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn start_id(&self) -> &str {
        &self.graph[self.start].id
    }

    /// Ids adjacent to `id` in the undirected graph
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        match self.index.get(id) {
            Some(&idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn is_allocated(&self, id: &str) -> bool {
        self.index
            .get(id)
            .is_some_and(|idx| self.allocated.contains(idx))
    }

    /// Allocated ids, sorted
    pub fn allocated_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .allocated
            .iter()
            .map(|&n| self.graph[n].id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Allocated nodes excluding start
    pub fn allocated_count(&self) -> usize {
        self.allocated.len() - 1
    }

    fn touches_allocated(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors(idx)
            .any(|n| self.allocated.contains(&n))
    }

    /// Full allocation check: points, state, level requirement, adjacency.
    pub fn check_allocate(&self, id: &str, points: u32, level: u32) -> Result<(), TreeRejection> {
        if points == 0 {
            return Err(TreeRejection::NoPoints);
        }
        let idx = *self.index.get(id).ok_or(TreeRejection::UnknownNode)?;
        if self.allocated.contains(&idx) {
            return Err(TreeRejection::AlreadyAllocated);
        }
        if let Some(required) = self.graph[idx].min_level {
            if level < required {
                return Err(TreeRejection::LevelTooLow { required });
            }
        }
        if !self.touches_allocated(idx) {
            return Err(TreeRejection::NotAdjacent);
        }
        Ok(())
    }

    pub fn can_allocate(&self, id: &str, points: u32, level: u32) -> bool {
        self.check_allocate(id, points, level).is_ok()
    }

    /// Add a node to the allocated set. The caller owns the point pool;
    /// adjacency is still enforced so the set stays connected.
    pub fn allocate(&mut self, id: &str) -> Result<(), TreeRejection> {
        let idx = *self.index.get(id).ok_or(TreeRejection::UnknownNode)?;
        if self.allocated.contains(&idx) {
            return Err(TreeRejection::AlreadyAllocated);
        }
        if !self.touches_allocated(idx) {
            return Err(TreeRejection::NotAdjacent);
        }
        self.allocated.insert(idx);
        debug!(node = id, "Allocated skill node");
        Ok(())
    }

    /// Number of allocated nodes reachable from start through allocated
    /// nodes, optionally treating `without` as removed.
    fn reachable_allocated(&self, without: Option<NodeIndex>) -> usize {
        let allocated = &self.allocated;
        let filtered = NodeFiltered::from_fn(&self.graph, |n: NodeIndex| {
            Some(n) != without && allocated.contains(&n)
        });
        let mut bfs = Bfs::new(&filtered, self.start);
        let mut count = 0;
        while bfs.next(&filtered).is_some() {
            count += 1;
        }
        count
    }

    pub fn check_deallocate(&self, id: &str) -> Result<(), TreeRejection> {
        let idx = *self.index.get(id).ok_or(TreeRejection::UnknownNode)?;
        if idx == self.start {
            return Err(TreeRejection::StartNode);
        }
        if !self.allocated.contains(&idx) {
            return Err(TreeRejection::NotAllocated);
        }
        if self.reachable_allocated(Some(idx)) != self.allocated.len() - 1 {
            return Err(TreeRejection::WouldDisconnect);
        }
        Ok(())
    }

    pub fn can_deallocate(&self, id: &str) -> bool {
        self.check_deallocate(id).is_ok()
    }

    /// Remove a node if that keeps the set connected. State is untouched on refusal.
    pub fn deallocate(&mut self, id: &str) -> Result<(), TreeRejection> {
        self.check_deallocate(id)?;
        if let Some(idx) = self.index.get(id) {
            self.allocated.remove(idx);
        }
        debug!(node = id, "Deallocated skill node");
        Ok(())
    }

    /// Every allocated node reachable from start
    pub fn is_connected(&self) -> bool {
        self.allocated.contains(&self.start)
            && self.reachable_allocated(None) == self.allocated.len()
    }

    /// Sum of all allocated nodes' bonuses
    pub fn total_bonuses(&self) -> Bonuses {
        let mut total = Bonuses::new();
        for &idx in &self.allocated {
            total.merge(&self.graph[idx].bonuses);
        }
        total
    }

    /// Nodes that could be allocated right now
    pub fn available(&self, points: u32, level: u32) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .graph
            .node_indices()
            .filter(|&n| self.can_allocate(&self.graph[n].id, points, level))
            .map(|n| self.graph[n].id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Clear back to just the start node; returns how many nodes were freed
    pub fn reset(&mut self) -> usize {
        let freed = self.allocated_count();
        self.allocated.clear();
        self.allocated.insert(self.start);
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatKey;

    fn tree() -> SkillTree {
        SkillTree::from_defs(&data::default_nodes()).unwrap()
    }

    fn node(id: &str, kind: NodeKind, connections: &[&str]) -> SkillNodeDef {
        SkillNodeDef {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            kind,
            category: NodeCategory::Neutral,
            bonuses: Bonuses::new(),
            connections: connections.iter().map(|c| c.to_string()).collect(),
            min_level: None,
            position: (0.0, 0.0),
        }
    }

    #[test]
    fn test_start_allocated_from_the_beginning() {
        let t = tree();
        assert!(t.is_allocated("start"));
        assert_eq!(t.allocated_count(), 0);
        assert!(t.total_bonuses().is_empty());
    }

    #[test]
    fn test_allocate_requires_adjacency() {
        let t = tree();
        assert!(t.can_allocate("str_path_1", 1, 1));
        assert_eq!(
            t.check_allocate("str_keystone", 10, 99),
            Err(TreeRejection::NotAdjacent)
        );
    }

    #[test]
    fn test_allocate_requires_points() {
        let t = tree();
        assert_eq!(t.check_allocate("str_path_1", 0, 1), Err(TreeRejection::NoPoints));
    }

    #[test]
    fn test_hybrid_connections_are_symmetric() {
        // hybrid_str_dex lists str_path_1, but str_path_1 does not list it back
        let mut t = tree();
        t.allocate("str_path_1").unwrap();
        assert!(t.can_allocate("hybrid_str_dex", 1, 1));
        assert!(t.neighbors("str_path_1").contains(&"hybrid_str_dex"));
    }

    #[test]
    fn test_deallocate_start_refused() {
        let mut t = tree();
        assert_eq!(t.deallocate("start"), Err(TreeRejection::StartNode));
    }

    #[test]
    fn test_deallocate_cut_vertex_refused() {
        let mut t = tree();
        t.allocate("str_path_1").unwrap();
        t.allocate("str_path_2").unwrap();
        assert_eq!(t.check_deallocate("str_path_1"), Err(TreeRejection::WouldDisconnect));
        let before = t.allocated_ids().len();
        assert!(t.deallocate("str_path_1").is_err());
        assert_eq!(t.allocated_ids().len(), before, "Refusal leaves state unchanged");
        assert!(t.deallocate("str_path_2").is_ok());
        assert!(t.deallocate("str_path_1").is_ok());
        assert!(t.is_connected());
    }

    #[test]
    fn test_deallocate_leaf_of_cycle_allowed() {
        // str_path_1 -> 2 -> notable_1 <- 3 <- 1a <- str_path_1 forms a cycle
        let mut t = tree();
        for id in ["str_path_1", "str_path_2", "str_notable_1", "str_path_3", "str_path_1a"] {
            t.allocate(id).unwrap();
        }
        assert!(t.can_deallocate("str_path_2"), "Cycle keeps notable reachable");
    }

    #[test]
    fn test_total_bonuses_sum() {
        let mut t = tree();
        t.allocate("str_path_1").unwrap();
        t.allocate("hybrid_str_int").unwrap();
        let b = t.total_bonuses();
        assert_eq!(b.get(StatKey::MaxHp), 20.0);
        assert_eq!(b.get(StatKey::Str), 2.0);
        assert_eq!(b.get(StatKey::Int), 2.0);
    }

    #[test]
    fn test_reset_returns_freed_count() {
        let mut t = tree();
        t.allocate("int_path_1").unwrap();
        t.allocate("int_path_2").unwrap();
        assert_eq!(t.reset(), 2);
        assert_eq!(t.allocated_ids(), vec!["start"]);
    }

    #[test]
    fn test_level_requirement() {
        let mut gated = node("gated", NodeKind::Keystone, &["origin"]);
        gated.min_level = Some(5);
        let t = SkillTree::from_defs(&[node("origin", NodeKind::Start, &[]), gated]).unwrap();
        assert_eq!(
            t.check_allocate("gated", 1, 4),
            Err(TreeRejection::LevelTooLow { required: 5 })
        );
        assert!(t.can_allocate("gated", 1, 5));
    }

    #[test]
    fn test_from_defs_rejects_bad_graphs() {
        let dangling = [node("s", NodeKind::Start, &["ghost"])];
        assert!(matches!(
            SkillTree::from_defs(&dangling),
            Err(ConfigError::UnknownTreeNode { .. })
        ));
        let no_start = [node("a", NodeKind::Small, &[])];
        assert!(matches!(
            SkillTree::from_defs(&no_start),
            Err(ConfigError::StartNodeCount(0))
        ));
        let dup = [node("s", NodeKind::Start, &[]), node("s", NodeKind::Small, &[])];
        assert!(matches!(
            SkillTree::from_defs(&dup),
            Err(ConfigError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_available_lists_frontier() {
        let t = tree();
        assert_eq!(
            t.available(1, 1),
            vec!["dex_path_1", "int_path_1", "str_path_1"]
        );
        assert!(t.available(0, 1).is_empty());
    }
}
