//! Level load and save against a [`LevelStore`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use ecs_component::{AnyComponent, Entity, EntityManager};
use tracing::{debug, info, warn};

use crate::codec::ComponentCodecs;
use crate::error::DataError;
use crate::level::LevelInfo;
use crate::store::{ComponentRow, LevelStore, LevelTransaction};
use crate::transform::Transformer;

/// Moves levels between an [`EntityManager`] and a store.
///
/// The `try_*` methods report what went wrong; the plain ones log the error
/// and return `false`.
pub struct DataAdapter<S> {
    store: S,
    codecs: ComponentCodecs,
    transformer: Option<Box<dyn Transformer>>,
}

impl<S: LevelStore> DataAdapter<S> {
    #[must_use]
    pub fn new(store: S, codecs: ComponentCodecs) -> Self {
        Self {
            store,
            codecs,
            transformer: None,
        }
    }

    /// Run `transformer` around every save and load.
    #[must_use]
    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformer = Some(Box::new(transformer));
        self
    }

    /// Replace (or with `None`, remove) the transformer.
    pub fn set_transformer(&mut self, transformer: Option<Box<dyn Transformer>>) {
        self.transformer = transformer;
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn codecs(&self) -> &ComponentCodecs {
        &self.codecs
    }

    /// Every level in the store, or an empty list if the store fails.
    #[must_use]
    pub fn get_levels(&self) -> Vec<LevelInfo> {
        self.try_get_levels().unwrap_or_else(|err| {
            warn!(error = %err, "failed to list levels");
            Vec::new()
        })
    }

    /// Every level in the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn try_get_levels(&self) -> Result<Vec<LevelInfo>, DataError> {
        self.store.levels()
    }

    /// Load level `number` into `entities`. Returns `true` on success.
    pub fn load_level(&mut self, entities: &mut EntityManager, number: i32) -> bool {
        match self.try_load_level(entities, number) {
            Ok(_) => true,
            Err(err) => {
                warn!(level = number, error = %err, "failed to load level");
                false
            }
        }
    }

    /// Load level `number` into `entities`.
    ///
    /// Every stored entity becomes a fresh entity in `entities`, alongside
    /// whatever the manager already holds. Rows are decoded before the
    /// manager is touched, and if adding them fails part way the entities
    /// created so far are removed again. The post-load transform runs only
    /// after a successful load.
    ///
    /// Returns the number of entities created.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownLevel`], [`DataError::UnknownKind`] or
    /// [`DataError::Decode`] without touching `entities`, or
    /// [`DataError::Ecs`] if the manager rejects the loaded data.
    pub fn try_load_level(
        &mut self,
        entities: &mut EntityManager,
        number: i32,
    ) -> Result<usize, DataError> {
        let rows = self.store.rows(number)?;
        let decoded = rows
            .iter()
            .map(|row| {
                self.codecs
                    .decode(row.entity, &row.kind, &row.data)
                    .map(|component| (row.entity, component))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = HashMap::new();
        if let Err(err) = populate(entities, decoded, &mut created) {
            for entity in created.into_values() {
                entities.remove_entity(entity);
            }
            return Err(err);
        }

        if let Some(transformer) = &mut self.transformer {
            transformer.transform_post_load(entities);
        }

        info!(
            level = number,
            entities = created.len(),
            rows = rows.len(),
            "level loaded"
        );
        Ok(created.len())
    }

    /// Save `entities` as level `number`. Returns `true` on success.
    pub fn save_level(&mut self, entities: &mut EntityManager, number: i32) -> bool {
        match self.try_save_level(entities, number) {
            Ok(_) => true,
            Err(err) => {
                warn!(level = number, error = %err, "failed to save level");
                false
            }
        }
    }

    /// Save `entities` as level `number`, replacing whatever the level held.
    ///
    /// Runs the pre-save transform, then writes every (entity, component)
    /// pair in one transaction. Each distinct entity gets one store-local
    /// id. Entities without components are not written. On any failure the
    /// transaction is rolled back and the level keeps its previous rows.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownLevel`] if the level is not defined,
    /// [`DataError::UnknownKind`] for a component with no codec,
    /// [`DataError::Encode`] if a component fails to serialise, or whatever
    /// the store reports.
    pub fn try_save_level(
        &mut self,
        entities: &mut EntityManager,
        number: i32,
    ) -> Result<usize, DataError> {
        if let Some(transformer) = &mut self.transformer {
            transformer.transform_pre_save(entities);
        }

        let mut pairs: Vec<(Entity, &dyn AnyComponent)> = entities.iter().collect();
        pairs.sort_by_key(|(entity, component)| (*entity, component.kind_name()));

        let mut tx = self.store.begin(number)?;
        tx.clear_level()?;

        let mut store_ids = HashMap::new();
        for (entity, component) in &pairs {
            let data = self.codecs.encode(*entity, *component)?;
            let store_entity = match store_ids.entry(*entity) {
                Entry::Occupied(slot) => *slot.get(),
                Entry::Vacant(slot) => *slot.insert(tx.create_entity()?),
            };
            tx.insert_row(ComponentRow {
                entity: store_entity,
                kind: component.kind_name().to_owned(),
                data,
            })?;
        }
        tx.commit()?;

        info!(
            level = number,
            entities = store_ids.len(),
            rows = pairs.len(),
            "level saved"
        );
        Ok(pairs.len())
    }
}

/// Create one entity per distinct stored id and attach the components.
///
/// `created` maps stored ids to the entities made so far, so the caller can
/// undo them on failure.
fn populate(
    entities: &mut EntityManager,
    decoded: Vec<(u64, Box<dyn AnyComponent>)>,
    created: &mut HashMap<u64, Entity>,
) -> Result<(), DataError> {
    for (stored, component) in decoded {
        let entity = match created.entry(stored) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                let entity = entities.create_entity()?;
                debug!(stored, %entity, "loaded entity");
                *slot.insert(entity)
            }
        };
        entities.add_boxed(entity, component)?;
    }
    Ok(())
}

impl<S: std::fmt::Debug> std::fmt::Debug for DataAdapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAdapter")
            .field("store", &self.store)
            .field("codecs", &self.codecs)
            .field("transformer", &self.transformer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ecs_component::Component;
    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize, Serializer};

    use super::*;
    use crate::memory::MemoryLevelStore;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Position {
        x: i32,
        y: i32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Name(String);

    impl Component for Name {
        fn type_name() -> &'static str {
            "Name"
        }
    }

    /// Runtime-only marker that is never registered for persistence.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Selected;

    impl Component for Selected {
        fn type_name() -> &'static str {
            "Selected"
        }
    }

    /// Always fails to serialise.
    #[derive(Debug, Deserialize)]
    struct Faulty;

    impl Serialize for Faulty {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("faulty component"))
        }
    }

    impl Component for Faulty {
        fn type_name() -> &'static str {
            "Faulty"
        }
    }

    fn codecs() -> ComponentCodecs {
        ComponentCodecs::new()
            .with::<Position>()
            .with::<Name>()
            .with::<Faulty>()
    }

    fn adapter() -> DataAdapter<MemoryLevelStore> {
        let mut store = MemoryLevelStore::new();
        store.define_level(LevelInfo::new(1, "Meadow", "Rolling hills"));
        store.define_level(LevelInfo::new(2, "Cave", "Dark and damp"));
        DataAdapter::new(store, codecs())
    }

    fn populated() -> EntityManager {
        let mut entities = EntityManager::new();
        let hero = entities.create_entity().unwrap();
        entities.add_component(hero, Position { x: 1, y: 2 }).unwrap();
        entities.add_component(hero, Name("hero".into())).unwrap();
        let rock = entities.create_entity().unwrap();
        entities.add_component(rock, Position { x: 5, y: 5 }).unwrap();
        entities
    }

    /// Sorted (name, position) view of a manager, independent of entity ids.
    fn snapshot(entities: &EntityManager) -> Vec<(Option<String>, Option<(i32, i32)>)> {
        let mut view: Vec<_> = entities
            .entities()
            .into_iter()
            .map(|entity| {
                (
                    entities.get_component::<Name>(entity).map(|n| n.0.clone()),
                    entities
                        .get_component::<Position>(entity)
                        .map(|p| (p.x, p.y)),
                )
            })
            .collect();
        view.sort();
        view
    }

    #[test]
    fn test_save_then_load_restores_pairs() {
        let mut adapter = adapter();
        let mut original = populated();

        assert_eq!(adapter.try_save_level(&mut original, 1).unwrap(), 3);
        assert_eq!(adapter.store().row_count(1), Some(3));

        let mut loaded = EntityManager::new();
        assert_eq!(adapter.try_load_level(&mut loaded, 1).unwrap(), 2);
        assert_eq!(loaded.entity_count(), 2);
        assert_eq!(loaded.component_count(), 3);
        assert_eq!(snapshot(&loaded), snapshot(&original));
    }

    #[test]
    fn test_save_assigns_one_store_id_per_entity() {
        let mut adapter = adapter();
        let mut entities = populated();
        adapter.try_save_level(&mut entities, 1).unwrap();

        let rows = adapter.store().rows(1).unwrap();
        let mut ids: Vec<_> = rows.iter().map(|row| row.entity).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            rows.iter().map(|row| row.kind.as_str()).collect::<Vec<_>>(),
            vec!["Name", "Position", "Position"]
        );
    }

    #[test]
    fn test_resave_replaces_level() {
        let mut adapter = adapter();
        let mut entities = populated();
        adapter.try_save_level(&mut entities, 1).unwrap();

        let mut smaller = EntityManager::new();
        let e = smaller.create_entity().unwrap();
        smaller.add_component(e, Name("alone".into())).unwrap();
        assert!(adapter.save_level(&mut smaller, 1));
        assert_eq!(adapter.store().row_count(1), Some(1));
    }

    #[test]
    fn test_encode_failure_rolls_back() {
        let mut adapter = adapter();
        let mut entities = populated();
        adapter.try_save_level(&mut entities, 1).unwrap();
        let before = adapter.store().rows(1).unwrap();

        let broken = entities.create_entity().unwrap();
        entities.add_component(broken, Faulty).unwrap();
        let err = adapter.try_save_level(&mut entities, 1).unwrap_err();
        assert!(matches!(err, DataError::Encode { ref kind, .. } if kind == "Faulty"));
        assert_eq!(adapter.store().rows(1).unwrap(), before);

        assert!(!adapter.save_level(&mut entities, 1));
        assert_eq!(adapter.store().rows(1).unwrap(), before);
    }

    #[test]
    fn test_unregistered_kind_refused_on_save() {
        let mut adapter = adapter();
        let mut entities = populated();
        let e = entities.create_entity().unwrap();
        entities.add_component(e, Selected).unwrap();

        let err = adapter.try_save_level(&mut entities, 1).unwrap_err();
        assert!(matches!(err, DataError::UnknownKind(ref kind) if kind == "Selected"));
        assert_eq!(adapter.store().row_count(1), Some(0));
    }

    #[test]
    fn test_unknown_level() {
        let mut adapter = adapter();
        let mut entities = populated();
        assert!(matches!(
            adapter.try_save_level(&mut entities, 7),
            Err(DataError::UnknownLevel(7))
        ));
        assert!(!adapter.load_level(&mut entities, 7));
        assert_eq!(entities.entity_count(), 2);
    }

    #[test]
    fn test_load_with_unknown_kind_leaves_manager_untouched() {
        let mut adapter = adapter();
        {
            let mut tx = adapter.store_mut().begin(2).unwrap();
            let id = tx.create_entity().unwrap();
            tx.insert_row(ComponentRow {
                entity: id,
                kind: "Position".into(),
                data: rmp_serde::to_vec_named(&Position { x: 0, y: 0 }).unwrap(),
            })
            .unwrap();
            tx.insert_row(ComponentRow {
                entity: id,
                kind: "Velocity".into(),
                data: vec![0x90],
            })
            .unwrap();
            tx.commit().unwrap();
        }

        let mut entities = EntityManager::new();
        let err = adapter.try_load_level(&mut entities, 2).unwrap_err();
        assert!(matches!(err, DataError::UnknownKind(ref kind) if kind == "Velocity"));
        assert_eq!(entities.entity_count(), 0);
    }

    #[test]
    fn test_load_undoes_partial_population() {
        let mut adapter = adapter();
        let data = rmp_serde::to_vec_named(&Position { x: 0, y: 0 }).unwrap();
        {
            let mut tx = adapter.store_mut().begin(2).unwrap();
            let first = tx.create_entity().unwrap();
            let second = tx.create_entity().unwrap();
            for entity in [first, second, second] {
                tx.insert_row(ComponentRow {
                    entity,
                    kind: "Position".into(),
                    data: data.clone(),
                })
                .unwrap();
            }
            tx.commit().unwrap();
        }

        let mut entities = populated();
        let err = adapter.try_load_level(&mut entities, 2).unwrap_err();
        assert!(matches!(
            err,
            DataError::Ecs(ecs_component::EcsError::DuplicateComponent { .. })
        ));
        assert_eq!(entities.entity_count(), 2);
        assert_eq!(entities.component_count(), 3);
    }

    #[test]
    fn test_empty_entities_are_not_saved() {
        let mut adapter = adapter();
        let mut entities = EntityManager::new();
        entities.create_entity().unwrap();
        assert_eq!(adapter.try_save_level(&mut entities, 1).unwrap(), 0);

        let mut loaded = EntityManager::new();
        assert_eq!(adapter.try_load_level(&mut loaded, 1).unwrap(), 0);
        assert_eq!(loaded.entity_count(), 0);
    }

    /// Strips `Selected` before saving and tags every named entity after
    /// loading.
    struct SelectionTransformer {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Transformer for SelectionTransformer {
        fn transform_pre_save(&mut self, entities: &mut EntityManager) {
            self.calls.lock().push("pre_save");
            let selected: Vec<_> = entities.entities_with::<Selected>().collect();
            for entity in selected {
                let _ = entities.remove_component::<Selected>(entity);
            }
        }

        fn transform_post_load(&mut self, entities: &mut EntityManager) {
            self.calls.lock().push("post_load");
            let named: Vec<_> = entities.entities_with::<Name>().collect();
            for entity in named {
                let _ = entities.add_component(entity, Selected);
            }
        }
    }

    #[test]
    fn test_transformer_runs_around_persistence() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut adapter = adapter().with_transformer(SelectionTransformer {
            calls: Arc::clone(&calls),
        });

        let mut entities = populated();
        let hero = entities.first_entity_with::<Name>().unwrap();
        entities.add_component(hero, Selected).unwrap();

        assert!(adapter.save_level(&mut entities, 1));
        assert!(!entities.has_component::<Selected>(hero));

        let mut loaded = EntityManager::new();
        assert!(adapter.load_level(&mut loaded, 1));
        assert_eq!(loaded.components::<Selected>().count(), 1);

        // No post-load transform after a failed load.
        assert!(!adapter.load_level(&mut loaded, 9));
        assert_eq!(*calls.lock(), vec!["pre_save", "post_load"]);
    }

    #[test]
    fn test_get_levels() {
        let adapter = adapter();
        let names: Vec<_> = adapter.get_levels().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Meadow", "Cave"]);
    }
}
