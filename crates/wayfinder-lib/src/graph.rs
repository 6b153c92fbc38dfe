use crate::model::{GraphSnapshot, Waypoint};

/// Read-only routing view over a [`GraphSnapshot`].
///
/// Adjacency is consumed exactly as declared by the snapshot (directed, not
/// auto-symmetrized). Neighbor ids that do not resolve to a snapshot member
/// are skipped rather than treated as an error.
#[derive(Debug, Clone, Copy)]
pub struct GraphModel<'a> {
    snapshot: &'a GraphSnapshot,
}

impl<'a> GraphModel<'a> {
    pub fn new(snapshot: &'a GraphSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn lookup(&self, id: &str) -> Option<&'a Waypoint> {
        self.snapshot.get(id)
    }

    /// Waypoints directly reachable from `id`, in declared order.
    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = &'a Waypoint> + '_ {
        self.snapshot
            .get(id)
            .into_iter()
            .flat_map(|waypoint| waypoint.neighbors.iter())
            .filter_map(|neighbor| self.snapshot.get(neighbor))
    }

    /// Edge weight: Euclidean distance between the two waypoint positions.
    pub fn edge_weight(&self, from: &Waypoint, to: &Waypoint) -> f64 {
        from.position.distance_to(&to.position)
    }
}
