//! Substrate en memoria: objetos por kind, índices secundarios
//! materializados en cada escritura y despacho síncrono de watches.
//!
//! Cada kind vive en su propia entrada de `DashMap`; una escritura toma el
//! lock de esa entrada, actualiza objeto + índices, lo suelta y sólo entonces
//! despacha los watches. Las funciones de mapeo pueden volver a leer del
//! store (y los sinks escribir) sin bloqueos.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use artiflow_core::store::{IndexFn, MapFn};
use artiflow_core::{Context, EventPredicate, GroupKind, ObjectKey, ObjectStore, RequestSink, Resource, StoreError,
                    Watch, WatchEvent, WatchRegistrar};
use dashmap::DashMap;
use log::{debug, warn};
use uuid::Uuid;

use crate::config::StoreConfig;

/// Índice secundario de un kind.
struct IndexState {
    index_fn: IndexFn,
    entries: HashMap<String, BTreeSet<ObjectKey>>,
    keys_by_object: HashMap<ObjectKey, Vec<String>>,
}

impl IndexState {
    fn new(index_fn: IndexFn) -> Self {
        Self { index_fn,
               entries: HashMap::new(),
               keys_by_object: HashMap::new() }
    }

    fn remove(&mut self, key: &ObjectKey) {
        let Some(old_keys) = self.keys_by_object.remove(key) else {
            return;
        };
        for k in old_keys {
            if let Some(set) = self.entries.get_mut(&k) {
                set.remove(key);
                if set.is_empty() {
                    self.entries.remove(&k);
                }
            }
        }
    }

    fn insert(&mut self, index: &str, key: &ObjectKey, obj: &dyn Resource) {
        self.remove(key);
        let keys = match (self.index_fn)(obj) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("index '{index}' rejected {key}: {e}; object left unindexed");
                return;
            }
        };
        for k in &keys {
            self.entries.entry(k.clone()).or_default().insert(key.clone());
        }
        self.keys_by_object.insert(key.clone(), keys);
    }
}

/// Objetos e índices de un kind.
#[derive(Default)]
struct KindState {
    objects: BTreeMap<ObjectKey, Arc<dyn Resource>>,
    indices: HashMap<String, IndexState>,
}

impl KindState {
    fn store(&mut self, key: ObjectKey, obj: Arc<dyn Resource>) -> Option<Arc<dyn Resource>> {
        for (name, index) in self.indices.iter_mut() {
            index.insert(name, &key, obj.as_ref());
        }
        self.objects.insert(key, obj)
    }

    fn evict(&mut self, key: &ObjectKey) -> Option<Arc<dyn Resource>> {
        for index in self.indices.values_mut() {
            index.remove(key);
        }
        self.objects.remove(key)
    }
}

#[derive(Clone)]
struct Registration {
    predicate: Arc<dyn EventPredicate>,
    map: MapFn,
    sink: Arc<dyn RequestSink>,
}

/// Substrate de almacenamiento/watch en memoria.
pub struct InMemoryObjectStore {
    config: StoreConfig,
    kinds: DashMap<GroupKind, KindState>,
    watches: DashMap<GroupKind, Vec<Registration>>,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl InMemoryObjectStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config,
               kinds: DashMap::new(),
               watches: DashMap::new() }
    }

    pub fn from_env() -> Self {
        Self::new(StoreConfig::from_env())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Crea el objeto; asigna `uid` si falta. Error si ya existe.
    pub fn create<R: Resource>(&self, obj: R) -> Result<Arc<dyn Resource>, StoreError> {
        self.create_dyn(Box::new(obj))
    }

    pub fn create_dyn(&self, mut obj: Box<dyn Resource>) -> Result<Arc<dyn Resource>, StoreError> {
        let kind = obj.group_kind();
        let key = ObjectKey::of(obj.as_ref());
        let meta = obj.meta_mut();
        meta.uid.get_or_insert_with(Uuid::new_v4);
        if meta.generation == 0 {
            meta.generation = 1;
        }
        let obj: Arc<dyn Resource> = Arc::from(obj);
        {
            let mut state = self.kinds.entry(kind.clone()).or_default();
            if state.objects.contains_key(&key) {
                return Err(StoreError::AlreadyExists { kind, key });
            }
            state.store(key.clone(), Arc::clone(&obj));
        }
        debug!("store:create kind={kind} key={key}");
        self.dispatch(&kind, WatchEvent::Create { object: Arc::clone(&obj) });
        Ok(obj)
    }

    /// Reemplaza un objeto existente conservando su `uid`.
    pub fn update<R: Resource>(&self, obj: R) -> Result<Arc<dyn Resource>, StoreError> {
        self.update_dyn(Box::new(obj))
    }

    pub fn update_dyn(&self, mut obj: Box<dyn Resource>) -> Result<Arc<dyn Resource>, StoreError> {
        let kind = obj.group_kind();
        let key = ObjectKey::of(obj.as_ref());
        let (old, new) = {
            let Some(mut state) = self.kinds.get_mut(&kind) else {
                return Err(StoreError::NotFound { kind, key });
            };
            let Some(old) = state.objects.get(&key).cloned() else {
                return Err(StoreError::NotFound { kind, key });
            };
            obj.meta_mut().uid = old.meta().uid;
            let new: Arc<dyn Resource> = Arc::from(obj);
            state.store(key.clone(), Arc::clone(&new));
            (old, new)
        };
        debug!("store:update kind={kind} key={key}");
        self.dispatch(&kind,
                      WatchEvent::Update { old: Some(old),
                                           new: Some(Arc::clone(&new)) });
        Ok(new)
    }

    /// Crea o actualiza.
    pub fn apply<R: Resource>(&self, obj: R) -> Result<Arc<dyn Resource>, StoreError> {
        let exists = self.kinds
                         .get(&obj.group_kind())
                         .map(|s| s.objects.contains_key(&ObjectKey::of(&obj)))
                         .unwrap_or(false);
        if exists {
            self.update(obj)
        } else {
            self.create(obj)
        }
    }

    pub fn delete(&self, kind: &GroupKind, key: &ObjectKey) -> Result<Arc<dyn Resource>, StoreError> {
        let removed = self.kinds.get_mut(kind).and_then(|mut s| s.evict(key));
        let Some(object) = removed else {
            return Err(StoreError::NotFound { kind: kind.clone(),
                                              key: key.clone() });
        };
        debug!("store:delete kind={kind} key={key}");
        self.dispatch(kind, WatchEvent::Delete { object: Arc::clone(&object) });
        Ok(object)
    }

    /// Todos los objetos de un kind, ordenados por clave.
    pub fn list_kind(&self, kind: &GroupKind) -> Vec<Arc<dyn Resource>> {
        self.kinds
            .get(kind)
            .map(|s| s.objects.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Número total de objetos almacenados.
    pub fn len(&self) -> usize {
        self.kinds.iter().map(|s| s.objects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reentrega un evento `Generic` para un objeto existente.
    pub fn touch(&self, kind: &GroupKind, key: &ObjectKey) -> Result<(), StoreError> {
        let object = self.get(&Context::background(), kind, key)?;
        self.dispatch(kind, WatchEvent::Generic { object });
        Ok(())
    }

    fn dispatch(&self, kind: &GroupKind, event: WatchEvent) {
        let registrations = match self.watches.get(kind) {
            Some(r) => r.clone(),
            None => return,
        };
        let Some(object) = event.object().cloned() else {
            return;
        };
        for reg in registrations {
            if !reg.predicate.accepts(&event) {
                continue;
            }
            let ctx = self.config.dispatch_context();
            let requests = (reg.map)(&ctx, object.as_ref());
            debug!("store:dispatch kind={kind} event={} requests={}", event.name(), requests.len());
            if !requests.is_empty() {
                reg.sink.enqueue(requests);
            }
        }
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, ctx: &Context, kind: &GroupKind, key: &ObjectKey) -> Result<Arc<dyn Resource>, StoreError> {
        ctx.check()?;
        self.kinds
            .get(kind)
            .and_then(|s| s.objects.get(key).cloned())
            .ok_or_else(|| StoreError::NotFound { kind: kind.clone(),
                                                  key: key.clone() })
    }

    fn list(&self, ctx: &Context, kind: &GroupKind, index: &str, key: &str) -> Result<Vec<Arc<dyn Resource>>, StoreError> {
        ctx.check()?;
        let state = self.kinds
                        .get(kind)
                        .ok_or_else(|| StoreError::UnknownIndex { kind: kind.clone(),
                                                                  index: index.to_string() })?;
        let idx = state.indices
                       .get(index)
                       .ok_or_else(|| StoreError::UnknownIndex { kind: kind.clone(),
                                                                 index: index.to_string() })?;
        let Some(keys) = idx.entries.get(key) else {
            return Ok(Vec::new());
        };
        Ok(keys.iter()
               .filter_map(|k| state.objects.get(k).cloned())
               .collect())
    }

    fn register_index(&self, kind: &GroupKind, index: &str, index_fn: IndexFn) -> Result<(), StoreError> {
        let mut state = self.kinds.entry(kind.clone()).or_default();
        if state.indices.contains_key(index) {
            return Err(StoreError::IndexConflict { kind: kind.clone(),
                                                   index: index.to_string() });
        }
        let mut idx = IndexState::new(index_fn);
        for (key, obj) in &state.objects {
            idx.insert(index, key, obj.as_ref());
        }
        state.indices.insert(index.to_string(), idx);
        debug!("store:register_index kind={kind} index={index}");
        Ok(())
    }
}

impl WatchRegistrar for InMemoryObjectStore {
    fn watch(&self, watch: Watch, sink: Arc<dyn RequestSink>) -> Result<(), StoreError> {
        let Watch { kind, predicate, map } = watch;
        debug!("store:watch kind={kind}");
        self.watches
            .entry(kind)
            .or_default()
            .push(Registration { predicate,
                                 map,
                                 sink });
        Ok(())
    }
}
