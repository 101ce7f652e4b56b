use std::sync::Arc;

use shared::{ModelRecord, ObservationId, ObservationPoint};

/// What the editor currently has selected.
///
/// An object and an observation point can never be selected at the same time.
#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    None,
    /// Snapshot of the selected object, refreshed whenever the object changes
    Object(Arc<ModelRecord>),
    /// Copy of the selected observation point
    Observation(ObservationPoint),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn object(&self) -> Option<&Arc<ModelRecord>> {
        match self {
            Selection::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn observation(&self) -> Option<&ObservationPoint> {
        match self {
            Selection::Observation(p) => Some(p),
            _ => None,
        }
    }

    /// Check if the object with this id is selected
    pub fn is_object(&self, id: &str) -> bool {
        self.object().map(|m| m.id == id).unwrap_or(false)
    }

    /// Check if the observation point with this id is selected
    pub fn is_observation(&self, id: ObservationId) -> bool {
        self.observation().map(|p| p.id == id).unwrap_or(false)
    }

    /// Re-resolve the selection against fresh lists by id.
    ///
    /// A selection whose target no longer exists becomes `None`.
    pub fn resolve(&self, objects: &[Arc<ModelRecord>], points: &[ObservationPoint]) -> Selection {
        match self {
            Selection::None => Selection::None,
            Selection::Object(m) => objects
                .iter()
                .find(|o| o.id == m.id)
                .map(|o| Selection::Object(Arc::clone(o)))
                .unwrap_or_default(),
            Selection::Observation(p) => points
                .iter()
                .find(|q| q.id == p.id)
                .map(|q| Selection::Observation(q.clone()))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects() -> Vec<Arc<ModelRecord>> {
        vec![
            Arc::new(ModelRecord::new("a")),
            Arc::new(ModelRecord::new("b")),
        ]
    }

    #[test]
    fn test_initial_empty() {
        let s = Selection::default();
        assert!(s.is_none());
        assert!(s.object().is_none());
        assert!(s.observation().is_none());
    }

    #[test]
    fn test_object_excludes_observation() {
        let s = Selection::Object(Arc::new(ModelRecord::new("a")));
        assert!(s.is_object("a"));
        assert!(!s.is_object("b"));
        assert!(s.observation().is_none());
    }

    #[test]
    fn test_observation_excludes_object() {
        let s = Selection::Observation(ObservationPoint::new(3));
        assert!(s.is_observation(3));
        assert!(s.object().is_none());
    }

    #[test]
    fn test_resolve_picks_fresh_reference() {
        let list = objects();
        let stale = Selection::Object(Arc::new(ModelRecord::new("b")));
        let fresh = stale.resolve(&list, &[]);
        assert!(Arc::ptr_eq(fresh.object().unwrap(), &list[1]));
    }

    #[test]
    fn test_resolve_missing_clears() {
        let s = Selection::Object(Arc::new(ModelRecord::new("zzz")));
        assert!(s.resolve(&objects(), &[]).is_none());

        let s = Selection::Observation(ObservationPoint::new(9));
        assert!(s.resolve(&[], &[ObservationPoint::new(1)]).is_none());
    }
}
