mod common;

use std::sync::Arc;

use artiflow_core::{get_source, Artifact, ArtifactResource, Context, ErrorClass, GenericSource, GitRepository,
                    GroupKind, KindRegistry, Options, OwnerReference, Resource, ResolveError, SourceRef,
                    StoreError};
use artiflow_store::{apply_generic_source, InMemoryObjectStore};
use common::{harness, Kustomization, BUILTIN, SERVER};
use rayon::prelude::*;

fn cv_ref(name: &str) -> SourceRef {
    SourceRef::new("ocm.software/v1alpha1", "ComponentVersion", name)
}

fn cv(namespace: &str, name: &str) -> GenericSource {
    GenericSource::new(GroupKind::new("ocm.software", "ComponentVersion"), namespace, name)
}

fn resolve(store: &InMemoryObjectStore, action: &Kustomization, options: &Options) -> Result<Arc<dyn Resource>, ResolveError> {
    get_source(&Context::background(), store, &BUILTIN, action, options).map(|r| r.into_object())
}

#[test]
fn builtin_kind_resolves_by_namespace_and_name() {
    let h = harness(&Options::new());
    h.store
     .create(GitRepository::new("app", "repo1").with_artifact(Artifact::new("u", "v1")))
     .expect("create repo");
    let ks = Kustomization::new("app", "myapp").with_source_ref(SourceRef::new("", "GitRepository", "repo1"));
    let resolved = get_source(&Context::background(), h.store.as_ref(), &BUILTIN, &ks, &Options::new())
        .expect("resolves");
    assert_eq!(resolved.object().group_kind(), GitRepository::kind());
    assert_eq!(resolved.artifact().map(|a| a.revision.clone()), Some("v1".to_string()));

    let missing = Kustomization::new("app", "other").with_source_ref(SourceRef::new("", "GitRepository", "nope"));
    let err = resolve(&h.store, &missing, &Options::new()).unwrap_err();
    assert!(matches!(err, ResolveError::SourceNotFound(_)));
    assert_eq!(err.classify(), ErrorClass::Transient);
}

#[test]
fn namespace_policy_is_enforced_only_when_requested() {
    let h = harness(&Options::new());
    h.store.create(GitRepository::new("b", "repo1")).expect("create repo");
    let ks = Kustomization::new("a", "myapp").with_source_ref(SourceRef::new("", "GitRepository", "repo1").in_namespace("b"));

    assert!(resolve(&h.store, &ks, &Options::new()).is_ok());

    let err = resolve(&h.store, &ks, &Options::new().with_no_cross_namespace_refs(true)).unwrap_err();
    assert_eq!(err,
               ResolveError::AccessDenied { kind: "GitRepository".into(),
                                            namespace: "b".into() });
    assert_eq!(err.classify(), ErrorClass::Permanent);

    // Mismo namespace explícito: permitido.
    let same = Kustomization::new("b", "local").with_source_ref(SourceRef::new("", "GitRepository", "repo1").in_namespace("b"));
    assert!(resolve(&h.store, &same, &Options::new().with_no_cross_namespace_refs(true)).is_ok());
}

#[test]
fn allowed_kinds_restrict_resolution() {
    let h = harness(&Options::new());
    h.store.create(GitRepository::new("app", "repo1")).expect("create repo");
    let ks = Kustomization::new("app", "myapp").with_source_ref(SourceRef::new("", "GitRepository", "repo1"));
    let opts = Options::new().with_allowed_source_kinds(Arc::new(KindRegistry::helm_index_sources()));
    assert!(matches!(resolve(&h.store, &ks, &opts), Err(ResolveError::KindNotAllowed(_))));
}

#[test]
fn dynamic_kind_resolves_to_its_artifact_proxy() {
    let h = harness(&Options::new());
    apply_generic_source(&h.store, &SERVER, cv("app", "cv1"), "cv1.tgz", b"cv1", "1.0.0").expect("publish");
    let ks = Kustomization::new("app", "myapp").with_source_ref(cv_ref("cv1"));

    let resolved = get_source(&Context::background(), h.store.as_ref(), &BUILTIN, &ks, &Options::new())
        .expect("resolves");
    assert_eq!(resolved.object().group_kind(), ArtifactResource::kind());
    assert_eq!(resolved.artifact().map(|a| a.revision.as_str()), Some("1.0.0"));
    assert_eq!(resolved.reference().key(), "ocm.software/ComponentVersion/app/cv1");
}

#[test]
fn dynamic_kind_in_other_namespace_resolves_there() {
    let h = harness(&Options::new());
    apply_generic_source(&h.store, &SERVER, cv("shared", "cv1"), "cv1.tgz", b"cv1", "1.0.0").expect("publish");
    let ks = Kustomization::new("app", "myapp").with_source_ref(cv_ref("cv1").in_namespace("shared"));
    let obj = resolve(&h.store, &ks, &Options::new()).expect("resolves");
    assert_eq!(obj.meta().namespace, "shared");
}

#[test]
fn dynamic_kind_without_proxy_is_not_found() {
    let h = harness(&Options::new());
    let ks = Kustomization::new("app", "myapp").with_source_ref(cv_ref("cv1"));
    assert_eq!(resolve(&h.store, &ks, &Options::new()).unwrap_err(),
               ResolveError::SourceNotFound("ocm.software/ComponentVersion/app/cv1".into()));
}

#[test]
fn two_proxies_for_one_owner_are_ambiguous() {
    let h = harness(&Options::new());
    let owner = OwnerReference { api_version: "ocm.software/v1alpha1".into(),
                                 kind: "ComponentVersion".into(),
                                 name: "cv1".into(),
                                 uid: None };
    for name in ["cv1-a", "cv1-b"] {
        let mut proxy = ArtifactResource::new("app", name, Artifact::new("u", "1.0.0"));
        proxy.metadata.owner_references.push(owner.clone());
        h.store.create(proxy).expect("create proxy");
    }
    let ks = Kustomization::new("app", "myapp").with_source_ref(cv_ref("cv1"));
    match resolve(&h.store, &ks, &Options::new()) {
        Err(ResolveError::AmbiguousSource { key, candidates }) => {
            assert_eq!(key, "ocm.software/ComponentVersion/app/cv1");
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn cancellation_is_never_reported_as_not_found() {
    let h = harness(&Options::new());
    let ctx = Context::background();
    ctx.cancel();
    for sref in [SourceRef::new("", "GitRepository", "repo1"), cv_ref("cv1")] {
        let ks = Kustomization::new("app", "myapp").with_source_ref(sref);
        let err = get_source(&ctx, h.store.as_ref(), &BUILTIN, &ks, &Options::new()).unwrap_err();
        assert!(matches!(err, ResolveError::Resolution { source: StoreError::Cancelled, .. }),
                "got {err:?}");
        assert!(err.is_retryable());
    }
}

#[test]
fn dynamic_lookup_without_owner_index_is_a_resolution_error() {
    let store = InMemoryObjectStore::default();
    let ks = Kustomization::new("app", "myapp").with_source_ref(cv_ref("cv1"));
    assert!(matches!(resolve(&store, &ks, &Options::new()),
                     Err(ResolveError::Resolution { source: StoreError::UnknownIndex { .. }, .. })));
}

#[test]
fn invalid_reference_fails_before_any_lookup() {
    let store = InMemoryObjectStore::default();
    let err = resolve(&store, &Kustomization::new("app", "myapp"), &Options::new()).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidReference(_)));
    assert!(!err.is_retryable());
}

#[test]
fn concurrent_resolutions_are_independent() {
    let h = harness(&Options::new());
    for i in 0..16 {
        h.store
         .create(GitRepository::new("app", format!("repo{i}")).with_artifact(Artifact::new("u", format!("v{i}"))))
         .expect("create repo");
    }
    let revisions: Vec<String> = (0..64).into_par_iter()
                                        .map(|i| {
                                            let ks = Kustomization::new("app", format!("ks{i}"))
                                                .with_source_ref(SourceRef::new("", "GitRepository", format!("repo{}", i % 16)));
                                            get_source(&Context::background(), h.store.as_ref(), &BUILTIN, &ks, &Options::new())
                                                .expect("resolves")
                                                .artifact()
                                                .map(|a| a.revision.clone())
                                                .unwrap_or_default()
                                        })
                                        .collect();
    for (i, rev) in revisions.iter().enumerate() {
        assert_eq!(rev, &format!("v{}", i % 16));
    }
}
