//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`). Los valores mal formados caen al default; los avisos quedan en
//! `warnings` para registrarlos una vez inicializado el logger.
use std::collections::BTreeSet;
use std::env;
use std::sync::Arc;

use artiflow_core::constants::SOURCE_GROUP;
use artiflow_core::matchers::MatchFn;
use artiflow_core::{GroupKind, Options};
use artiflow_store::StoreConfig;
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

use crate::logging::DEFAULT_FILTER;

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directivas de `EnvFilter` (`ARTIFLOW_LOG`).
    pub log_filter: String,
    /// Prohíbe referencias entre namespaces (`ARTIFLOW_NO_CROSS_NAMESPACE_REFS`).
    pub no_cross_namespace_refs: bool,
    /// Kinds de Source permitidos (`ARTIFLOW_ALLOWED_SOURCE_KINDS`); `None` = sin restricción.
    pub allowed_source_kinds: Option<BTreeSet<GroupKind>>,
    pub store: StoreConfig,
    /// Avisos de parseo pendientes de registrar.
    pub warnings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_filter: DEFAULT_FILTER.to_string(),
               no_cross_namespace_refs: false,
               allowed_source_kinds: None,
               store: StoreConfig::default(),
               warnings: Vec::new() }
    }
}

/// `Kind.group`; sin grupo se asume el de los sources builtin.
pub fn parse_group_kind(raw: &str) -> Option<GroupKind> {
    let raw = raw.trim();
    let (kind, group) = raw.split_once('.').unwrap_or((raw, SOURCE_GROUP));
    if kind.is_empty() || group.is_empty() {
        return None;
    }
    Some(GroupKind::new(group, kind))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Lee el entorno (tras cargar `.env`).
    pub fn from_env() -> Self {
        artiflow_store::config::init_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Construye la configuración a partir de una función de lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = AppConfig::default();

        if let Some(raw) = lookup("ARTIFLOW_LOG").filter(|r| !r.trim().is_empty()) {
            match EnvFilter::try_new(raw.trim()) {
                Ok(_) => cfg.log_filter = raw.trim().to_string(),
                Err(e) => cfg.warnings
                             .push(format!("invalid ARTIFLOW_LOG '{raw}' ({e}), using {DEFAULT_FILTER}")),
            }
        }

        if let Some(raw) = lookup("ARTIFLOW_NO_CROSS_NAMESPACE_REFS") {
            match parse_bool(&raw) {
                Some(b) => cfg.no_cross_namespace_refs = b,
                None => cfg.warnings
                           .push(format!("invalid ARTIFLOW_NO_CROSS_NAMESPACE_REFS '{raw}', using false")),
            }
        }

        if let Some(raw) = lookup("ARTIFLOW_ALLOWED_SOURCE_KINDS") {
            let mut kinds = BTreeSet::new();
            for item in raw.split(',').filter(|s| !s.trim().is_empty()) {
                match parse_group_kind(item) {
                    Some(gk) => {
                        kinds.insert(gk);
                    }
                    None => cfg.warnings.push(format!("ignoring malformed source kind '{item}'")),
                }
            }
            if !kinds.is_empty() {
                cfg.allowed_source_kinds = Some(kinds);
            }
        }

        cfg.store = StoreConfig::from_timeout_var(lookup("ARTIFLOW_LOOKUP_TIMEOUT_MS").as_deref());
        cfg
    }

    /// Opciones del motor derivadas de la configuración.
    pub fn options(&self) -> Options {
        let mut opts = Options::new().with_no_cross_namespace_refs(self.no_cross_namespace_refs);
        if let Some(kinds) = self.allowed_source_kinds.clone() {
            opts = opts.with_allowed_source_kinds(Arc::new(MatchFn(move |gk: &GroupKind| kinds.contains(gk))));
        }
        opts
    }
}
