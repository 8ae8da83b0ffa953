//! Macros para declarar kinds de Source y de Action sin boilerplate.
//!
//! Exportadas en la raíz del crate:
//!   use artiflow_core::{action_kind, source_kind};

/// Declara un kind de Source con `metadata` + `status.artifact`.
///
/// - source_kind!(Name, "group", "Kind");
#[macro_export]
macro_rules! source_kind {
    ($name:ident, $group:expr, $kind:expr) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub metadata: $crate::object::ObjectMeta,
            pub status: $crate::kinds::SourceStatus,
        }

        impl $name {
            pub const GROUP: &'static str = $group;
            pub const KIND: &'static str = $kind;

            pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
                Self { metadata: $crate::object::ObjectMeta::new(namespace, name),
                       status: ::std::default::Default::default() }
            }

            pub fn kind() -> $crate::reference::GroupKind {
                $crate::reference::GroupKind::new(Self::GROUP, Self::KIND)
            }

            pub fn with_artifact(mut self, artifact: $crate::model::Artifact) -> Self {
                self.status.artifact = Some(artifact);
                self
            }
        }

        impl $crate::object::Resource for $name {
            fn group_kind(&self) -> $crate::reference::GroupKind { Self::kind() }
            fn meta(&self) -> &$crate::object::ObjectMeta { &self.metadata }
            fn meta_mut(&mut self) -> &mut $crate::object::ObjectMeta { &mut self.metadata }
            fn clone_resource(&self) -> Box<dyn $crate::object::Resource> { Box::new(self.clone()) }
            fn as_any(&self) -> &dyn ::std::any::Any { self }
            fn as_source(&self) -> Option<&dyn $crate::object::ArtifactSource> { Some(self) }
        }

        impl $crate::object::ArtifactSource for $name {
            fn artifact(&self) -> Option<&$crate::model::Artifact> { self.status.artifact.as_ref() }
        }
    };
}

/// Declara un kind de Action cuyo spec contiene `source_ref`.
///
/// - action_kind!(Name, "group", "Kind");
#[macro_export]
macro_rules! action_kind {
    ($name:ident, $group:expr, $kind:expr) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub metadata: $crate::object::ObjectMeta,
            pub spec: $crate::kinds::ActionSpec,
        }

        impl $name {
            pub const GROUP: &'static str = $group;
            pub const KIND: &'static str = $kind;

            pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
                Self { metadata: $crate::object::ObjectMeta::new(namespace, name),
                       spec: ::std::default::Default::default() }
            }

            pub fn kind() -> $crate::reference::GroupKind {
                $crate::reference::GroupKind::new(Self::GROUP, Self::KIND)
            }

            pub fn with_source_ref(mut self, source_ref: $crate::reference::SourceRef) -> Self {
                self.spec.source_ref = Some(source_ref);
                self
            }
        }

        impl $crate::object::Resource for $name {
            fn group_kind(&self) -> $crate::reference::GroupKind { Self::kind() }
            fn meta(&self) -> &$crate::object::ObjectMeta { &self.metadata }
            fn meta_mut(&mut self) -> &mut $crate::object::ObjectMeta { &mut self.metadata }
            fn clone_resource(&self) -> Box<dyn $crate::object::Resource> { Box::new(self.clone()) }
            fn as_any(&self) -> &dyn ::std::any::Any { self }
            fn as_action(&self) -> Option<&dyn $crate::object::ActionResource> { Some(self) }
        }

        impl $crate::object::ActionResource for $name {
            fn source_ref(&self) -> Result<$crate::reference::SourceRef, $crate::errors::InvalidReference> {
                $crate::object::require_source_ref(self.spec.source_ref.as_ref())
            }
        }
    };
}
