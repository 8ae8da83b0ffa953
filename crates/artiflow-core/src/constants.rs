//! Constantes del motor.
//!
//! Nombres de grupos/kinds bien conocidos y de los índices secundarios que el
//! motor registra en el substrate. Cambiar los nombres de índice rompe la
//! compatibilidad con substrates que ya los tengan registrados.

/// Grupo de los sources builtin.
pub const SOURCE_GROUP: &str = "source.toolkit.fluxcd.io";
/// Grupo del recurso proxy `Artifact`.
pub const ARTIFACT_GROUP: &str = "artifact.openfluxcd.io";

pub const GIT_REPOSITORY_KIND: &str = "GitRepository";
pub const BUCKET_KIND: &str = "Bucket";
pub const OCI_REPOSITORY_KIND: &str = "OCIRepository";
pub const HELM_REPOSITORY_KIND: &str = "HelmRepository";
pub const HELM_CHART_KIND: &str = "HelmChart";
pub const ARTIFACT_KIND: &str = "Artifact";

/// Índice inverso: clave de la referencia declarada -> Actions.
pub const SOURCE_REF_INDEX: &str = ".metadata.sourceref";
/// Índice de cadena de dueños: clave propia/dueño -> Artifacts.
pub const ARTIFACT_OWNER_INDEX: &str = ".metadata.artifactowner";

/// Anotación con la que un usuario pide una reconciliación manual.
pub const RECONCILE_REQUESTED_ANNOTATION: &str = "reconcile.fluxcd.io/requestedAt";
