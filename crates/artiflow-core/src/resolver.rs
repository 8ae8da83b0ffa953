//! Resolución síncrona del Source declarado por una Action.
//!
//! Orden de comprobaciones:
//! 0. referencia válida (kind y name presentes);
//! 1. normalización contra el namespace de la Action;
//! 2. política de namespaces (`AccessDenied`);
//! 3. kinds permitidos (`KindNotAllowed`);
//! 4. kind builtin: `get` directo;
//! 5. kind dinámico: lookup en el índice de dueños del proxy `Artifact`,
//!    0 / 1 / >1 resultados.
//!
//! La cancelación del substrate se devuelve siempre como
//! `ResolveError::Resolution`, nunca como `SourceNotFound`.
use std::sync::Arc;

use log::{debug, error};

use crate::constants::ARTIFACT_OWNER_INDEX;
use crate::context::Context;
use crate::errors::{InvalidReference, ResolveError, StoreError};
use crate::kinds::ArtifactResource;
use crate::matchers::{dynamic_sources, KindRegistry, SourceMatcher};
use crate::model::Artifact;
use crate::object::{ActionResource, Resource};
use crate::options::Options;
use crate::reference::{ObjectKey, Reference};
use crate::store::ObjectStore;

/// Source concreto encontrado para una Action.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    object: Arc<dyn Resource>,
    reference: Reference,
}

impl ResolvedSource {
    /// Objeto resuelto: el Source builtin o el proxy `Artifact`.
    pub fn object(&self) -> &Arc<dyn Resource> {
        &self.object
    }

    /// Referencia normalizada que se resolvió.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Artifact actual; `None` si el Source aún no produjo contenido.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.object.as_source().and_then(|s| s.artifact())
    }

    pub fn into_object(self) -> Arc<dyn Resource> {
        self.object
    }
}

fn resolution(reference: &Reference, source: StoreError) -> ResolveError {
    ResolveError::Resolution { key: reference.key(),
                               source }
}

fn fetch_error(reference: &Reference, err: StoreError) -> ResolveError {
    if err.is_not_found() {
        ResolveError::SourceNotFound(reference.key())
    } else {
        resolution(reference, err)
    }
}

/// Resuelve el Source declarado por `action`.
pub fn get_source(ctx: &Context,
                  store: &dyn ObjectStore,
                  registry: &KindRegistry,
                  action: &dyn ActionResource,
                  options: &Options)
                  -> Result<ResolvedSource, ResolveError> {
    let source_ref = action.source_ref()?;
    if source_ref.kind.is_empty() {
        return Err(InvalidReference(format!("source ref '{}' has no kind", source_ref.name)).into());
    }

    let action_ns = &action.meta().namespace;
    let reference = source_ref.to_reference().normalize(action_ns);
    debug!("get_source:start action={action_ns}/{} source={reference}", action.meta().name);

    if options.cross_namespace_refs_forbidden() && &reference.namespace != action_ns {
        return Err(ResolveError::AccessDenied { kind: reference.kind.clone(),
                                                namespace: reference.namespace.clone() });
    }

    let gk = reference.group_kind();
    if let Some(allowed) = &options.allowed_source_kinds {
        if !allowed.matches(&gk) {
            return Err(ResolveError::KindNotAllowed(gk));
        }
    }

    ctx.check().map_err(|e| resolution(&reference, e))?;

    if dynamic_sources(registry).matches(&gk) {
        return resolve_through_artifact(ctx, store, reference);
    }

    let object = store.get(ctx, &gk, &reference.object_key())
                      .map_err(|e| fetch_error(&reference, e))?;
    if object.as_source().is_none() {
        return Err(resolution(&reference,
                              StoreError::Internal(format!("{gk} does not expose an artifact"))));
    }
    debug!("get_source:done source={reference} path=builtin");
    Ok(ResolvedSource { object, reference })
}

/// Kind dinámico: el único proxy `Artifact` cuyo índice de dueños contiene la
/// referencia, leído en su propio namespace.
fn resolve_through_artifact(ctx: &Context,
                            store: &dyn ObjectStore,
                            reference: Reference)
                            -> Result<ResolvedSource, ResolveError> {
    let artifact_kind = ArtifactResource::kind();
    let candidates = store.list(ctx, &artifact_kind, ARTIFACT_OWNER_INDEX, &reference.key())
                          .map_err(|e| resolution(&reference, e))?;
    match candidates.as_slice() {
        [] => Err(ResolveError::SourceNotFound(reference.key())),
        [proxy] => {
            let object = store.get(ctx, &artifact_kind, &ObjectKey::of(proxy.as_ref()))
                              .map_err(|e| fetch_error(&reference, e))?;
            debug!("get_source:done source={reference} path=artifact proxy={}",
                   Reference::from_object(object.as_ref()));
            Ok(ResolvedSource { object, reference })
        }
        many => {
            let candidates: Vec<String> = many.iter()
                                              .map(|c| Reference::from_object(c.as_ref()).key())
                                              .collect();
            error!("multiple artifacts found for {reference}: {candidates:?}");
            Err(ResolveError::AmbiguousSource { key: reference.key(),
                                                candidates })
        }
    }
}
