use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::RouterId;

/// Shortest path from the source to one destination.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub distance: u32,
    /// The source's direct neighbor the path leaves through.
    pub first_hop: RouterId,
}

/// Single-source Dijkstra over a link-state database.
///
/// Nodes are the routers that have an LSDB entry; edges are directed per
/// the reporting side (`lsdb[reporter][neighbor] = metric`). Neighbors
/// without an LSDB entry of their own are ignored. The heap is ordered by
/// `(distance, id)` and relaxation is strictly-less, so equal-cost ties
/// settle on the path relaxed first in that order. The tie-break is
/// deterministic but arbitrary.
pub fn shortest_paths(
    lsdb: &HashMap<RouterId, HashMap<RouterId, u32>>,
    source: &str,
) -> HashMap<RouterId, ShortestPath> {
    let mut distances: HashMap<RouterId, u32> = HashMap::new();
    let mut previous: HashMap<RouterId, RouterId> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u32, RouterId)>> = BinaryHeap::new();

    distances.insert(source.to_string(), 0);
    heap.push(Reverse((0, source.to_string())));

    while let Some(Reverse((distance, router))) = heap.pop() {
        if distance > *distances.get(&router).unwrap_or(&u32::MAX) {
            continue;
        }

        let Some(neighbors) = lsdb.get(&router) else {
            continue;
        };

        for (neighbor, metric) in neighbors {
            if !lsdb.contains_key(neighbor) {
                continue;
            }

            let candidate = distance.saturating_add(*metric);
            if candidate < *distances.get(neighbor).unwrap_or(&u32::MAX) {
                distances.insert(neighbor.clone(), candidate);
                previous.insert(neighbor.clone(), router.clone());
                heap.push(Reverse((candidate, neighbor.clone())));
            }
        }
    }

    let mut paths = HashMap::new();

    for (destination, &distance) in &distances {
        if destination == source {
            continue;
        }

        // Walk the predecessor chain back to the source's direct neighbor.
        let mut first_hop = destination.clone();
        while let Some(prev) = previous.get(&first_hop) {
            if prev == source {
                break;
            }
            first_hop = prev.clone();
        }

        paths.insert(
            destination.clone(),
            ShortestPath {
                distance,
                first_hop,
            },
        );
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lsdb(edges: &[(&str, &str, u32)]) -> HashMap<RouterId, HashMap<RouterId, u32>> {
        let mut db: HashMap<RouterId, HashMap<RouterId, u32>> = HashMap::new();
        for (from, to, metric) in edges {
            db.entry(from.to_string())
                .or_default()
                .insert(to.to_string(), *metric);
            db.entry(to.to_string())
                .or_default()
                .insert(from.to_string(), *metric);
        }
        db
    }

    #[test]
    fn prefers_cheapest_path_over_fewest_hops() {
        // A-B-C at cost 1+1 beats the direct A-C link at cost 5.
        let db = lsdb(&[("A", "B", 1), ("B", "C", 1), ("A", "C", 5)]);
        let paths = shortest_paths(&db, "A");

        assert_eq!(paths["C"].distance, 2);
        assert_eq!(paths["C"].first_hop, "B");
        assert_eq!(paths["B"].distance, 1);
        assert_eq!(paths["B"].first_hop, "B");
    }

    #[test]
    fn equal_cost_tie_settles_on_first_relaxation() {
        // Both A-C (3) and A-B-C (1+2) cost 3. The direct edge is relaxed
        // straight from the source, and strictly-less relaxation never
        // replaces it with the equal-cost alternative.
        let db = lsdb(&[("A", "C", 3), ("A", "B", 1), ("B", "C", 2)]);
        let paths = shortest_paths(&db, "A");

        assert_eq!(paths["C"].distance, 3);
        assert_eq!(paths["C"].first_hop, "C");
    }

    #[test]
    fn unreachable_nodes_are_absent() {
        let mut db = lsdb(&[("A", "B", 1)]);
        db.insert("Z".to_string(), HashMap::new());
        let paths = shortest_paths(&db, "A");

        assert!(paths.contains_key("B"));
        assert!(!paths.contains_key("Z"));
    }

    #[test]
    fn neighbors_without_lsdb_entries_are_ignored() {
        let mut db: HashMap<RouterId, HashMap<RouterId, u32>> = HashMap::new();
        db.insert(
            "A".to_string(),
            HashMap::from([("ghost".to_string(), 1)]),
        );
        let paths = shortest_paths(&db, "A");
        assert!(paths.is_empty());
    }

    #[test]
    fn edges_are_directed_per_reporter() {
        // B reports a link back to A but A reports none to B, so A cannot
        // reach B.
        let mut db: HashMap<RouterId, HashMap<RouterId, u32>> = HashMap::new();
        db.insert("A".to_string(), HashMap::new());
        db.insert("B".to_string(), HashMap::from([("A".to_string(), 1)]));

        let paths = shortest_paths(&db, "A");
        assert!(!paths.contains_key("B"));
    }
}
