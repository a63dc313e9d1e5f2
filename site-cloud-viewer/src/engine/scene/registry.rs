use bevy::prelude::*;
use std::collections::HashMap;

use crate::tools::measure::MeasurementId;

/// Group an entity belongs to. Every entity spawned for the reconstruction
/// or for a measurement carries one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneOwner {
    Reconstruction,
    Measurement(MeasurementId),
}

/// Root entity of each owned group. Teardown goes through here rather than
/// scanning the world for tags.
#[derive(Resource, Debug, Default)]
pub struct SceneRegistry {
    reconstruction: Option<Entity>,
    measurements: HashMap<MeasurementId, Entity>,
}

impl SceneRegistry {
    /// Install a new reconstruction root, returning the one it replaces.
    pub fn replace_reconstruction(&mut self, root: Entity) -> Option<Entity> {
        self.reconstruction.replace(root)
    }

    pub fn take_reconstruction(&mut self) -> Option<Entity> {
        self.reconstruction.take()
    }

    pub fn reconstruction(&self) -> Option<Entity> {
        self.reconstruction
    }

    pub fn register_measurement(&mut self, id: MeasurementId, root: Entity) {
        self.measurements.insert(id, root);
    }

    /// Drain every measurement root for despawning.
    pub fn take_measurements(&mut self) -> Vec<Entity> {
        self.measurements.drain().map(|(_, root)| root).collect()
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_reconstruction_hands_back_previous_root() {
        let mut world = World::new();
        let first = world.spawn_empty().id();
        let second = world.spawn_empty().id();

        let mut registry = SceneRegistry::default();
        assert_eq!(registry.replace_reconstruction(first), None);
        assert_eq!(registry.replace_reconstruction(second), Some(first));
        assert_eq!(registry.take_reconstruction(), Some(second));
        assert_eq!(registry.reconstruction(), None);
    }

    #[test]
    fn taking_measurements_leaves_reconstruction_in_place() {
        let mut world = World::new();
        let scan = world.spawn_empty().id();
        let m1 = world.spawn_empty().id();
        let m2 = world.spawn_empty().id();

        let mut registry = SceneRegistry::default();
        registry.replace_reconstruction(scan);
        registry.register_measurement(MeasurementId(1), m1);
        registry.register_measurement(MeasurementId(2), m2);

        let mut taken = registry.take_measurements();
        taken.sort();
        let mut expected = vec![m1, m2];
        expected.sort();
        assert_eq!(taken, expected);
        assert_eq!(registry.measurement_count(), 0);
        assert_eq!(registry.reconstruction(), Some(scan));
    }
}
