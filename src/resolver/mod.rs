//! Entity resolver: identifiers to human-readable names.
//!
//! Lookup tables are built once, from built-in defaults overlaid with an
//! [`InferenceConfig`], and are read-only afterwards. A resolver is shared
//! by reference across concurrent analyses.

pub mod templates;

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult, InferenceConfig, NamePattern};

pub use templates::{ConflictContext, DescriptionTemplates, substitute};

const SOA_PREFIX: &str = "soa_";
const EVENTUALITY_PREFIX: &str = "soa_e";
const NEGATED_PREFIX: &str = "soa_en";
const DEFAULT_PRIMARY_VESSEL: &str = "soa_ALEXANDRA_MAERSK";

// ---------------------------------------------------------------------------
// Negation algebra
// ---------------------------------------------------------------------------

/// Whether `id` names a negated eventuality (`soa_en...`).
pub fn is_negated_entity(id: &str) -> bool {
    id.starts_with(NEGATED_PREFIX)
}

/// `soa_eX` → `soa_enX`; already-negated ids are returned unchanged and
/// anything else becomes `not_<id>`.
pub fn negated_form(id: &str) -> String {
    if is_negated_entity(id) {
        return id.to_string();
    }
    match id.strip_prefix(EVENTUALITY_PREFIX) {
        Some(rest) => format!("{NEGATED_PREFIX}{rest}"),
        None => format!("not_{id}"),
    }
}

/// Inverse of [`negated_form`] on eventuality names.
pub fn base_form(id: &str) -> String {
    match id.strip_prefix(NEGATED_PREFIX) {
        Some(rest) => format!("{EVENTUALITY_PREFIX}{rest}"),
        None => id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Verb forms of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionForms {
    pub base: String,
    pub present: String,
    pub past: String,
}

impl ActionForms {
    pub fn new(base: &str, present: &str, past: &str) -> Self {
        Self {
            base: base.to_string(),
            present: present.to_string(),
            past: past.to_string(),
        }
    }

    pub fn get(&self, tense: Tense) -> &str {
        match tense {
            Tense::Present => &self.present,
            Tense::Past => &self.past,
            Tense::Base => &self.base,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tense {
    #[default]
    Present,
    Past,
    Base,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum NameRewrite {
    Literal { from: String, to: String },
    Regex { re: Regex, replacement: String },
}

impl NameRewrite {
    fn compile(pattern: &NamePattern) -> ConfigResult<Self> {
        if !pattern.regex {
            return Ok(Self::Literal {
                from: pattern.pattern.clone(),
                to: pattern.replacement.clone(),
            });
        }
        let re = Regex::new(&pattern.pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.pattern.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::Regex {
            re,
            replacement: pattern.replacement.clone(),
        })
    }

    fn apply(&self, text: &str) -> String {
        match self {
            Self::Literal { from, to } if !from.is_empty() => text.replace(from.as_str(), to),
            Self::Literal { .. } => text.to_string(),
            Self::Regex { re, replacement } => {
                re.replace_all(text, replacement.as_str()).into_owned()
            }
        }
    }
}

/// Identifier → display-name tables with fallback humanization.
#[derive(Debug, Clone)]
pub struct EntityResolver {
    entities: BTreeMap<String, String>,
    special_characters: Vec<(String, String)>,
    name_rewrites: Vec<NameRewrite>,
    actions: BTreeMap<String, ActionForms>,
    instruments: BTreeMap<String, String>,
    ports: BTreeMap<String, String>,
    primary_vessel: String,
}

impl Default for EntityResolver {
    fn default() -> Self {
        let mut resolver = Self {
            entities: BTreeMap::new(),
            special_characters: Vec::new(),
            name_rewrites: Vec::new(),
            actions: BTreeMap::new(),
            instruments: BTreeMap::new(),
            ports: BTreeMap::new(),
            primary_vessel: DEFAULT_PRIMARY_VESSEL.to_string(),
        };
        resolver.load_defaults();
        resolver
    }
}

impl EntityResolver {
    /// Built-in tables only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in tables overlaid with `config`.
    pub fn with_config(config: &InferenceConfig) -> ConfigResult<Self> {
        let mut resolver = Self::default();
        for (id, name) in &config.entity_mappings {
            resolver.add_entity_mapping(id, name);
        }
        for mapping in &config.special_characters {
            resolver.add_special_char_mapping(&mapping.from, &mapping.to);
        }
        for pattern in &config.name_patterns {
            resolver.add_name_pattern(pattern)?;
        }
        for (id, forms) in &config.action_mappings {
            resolver.add_action_mapping(id, forms.clone());
        }
        for (id, name) in &config.instrument_mappings {
            resolver.add_instrument_mapping(id, name);
        }
        for (id, name) in &config.port_mappings {
            resolver.add_port_mapping(id, name);
        }
        if let Some(vessel) = &config.primary_vessel {
            resolver.set_primary_vessel(vessel);
        }
        Ok(resolver)
    }

    fn load_defaults(&mut self) {
        self.add_special_char_mapping("MAERSK", "MÆRSK");
        self.add_special_char_mapping("AERSK", "ÆRSK");

        self.add_entity_mapping("soa_ALEXANDRA_MAERSK", "ALEXANDRA MÆRSK");
        self.add_entity_mapping("soa_LAURA_MAERSK", "LAURA MÆRSK");
        self.add_entity_mapping("soa_MICT", "MICT Smart Port");
        self.add_entity_mapping("soa_sptMICT", "MICT Smart Port Treasury");

        // Eventualities of the smart port scenario, by their agent.
        for id in [
            "soa_emam",
            "soa_enmam",
            "soa_eplm",
            "soa_enplm",
            "soa_elam",
            "soa_enlam",
            "soa_epam",
            "soa_enpam",
        ] {
            self.add_entity_mapping(id, "ALEXANDRA MÆRSK");
        }

        for code in ["USDS", "INRS", "USD", "EUR"] {
            self.add_instrument_mapping(&format!("{SOA_PREFIX}{code}"), code);
        }

        let moor = ActionForms::new("moor", "moors", "moored");
        let pay = ActionForms::new("pay", "pays", "paid");
        let leave = ActionForms::new("leave", "leaves", "left");
        self.add_action_mapping("soaMoor", moor.clone());
        self.add_action_mapping("soaPay", pay.clone());
        self.add_action_mapping("soaLeave", leave.clone());
        self.add_action_mapping("soaArrive", ActionForms::new("arrive", "arrives", "arrived"));
        self.add_action_mapping("soaDock", ActionForms::new("dock", "docks", "docked"));
        self.add_action_mapping("soaDeliver", ActionForms::new("deliver", "delivers", "delivered"));
        self.add_action_mapping("soaLoad", ActionForms::new("load", "loads", "loaded"));
        self.add_action_mapping("soaUnload", ActionForms::new("unload", "unloads", "unloaded"));

        for (ids, forms) in [
            (["soa_emam", "soa_enmam"], &moor),
            (["soa_eplm", "soa_enplm"], &pay),
            (["soa_elam", "soa_enlam"], &leave),
            (["soa_epam", "soa_enpam"], &pay),
        ] {
            for id in ids {
                self.add_action_mapping(id, forms.clone());
            }
        }
    }

    // -- construction -------------------------------------------------------

    pub fn add_entity_mapping(&mut self, id: &str, display_name: &str) {
        self.entities.insert(id.to_string(), display_name.to_string());
    }

    /// Replace the target of an existing `from`, or append a new rewrite.
    pub fn add_special_char_mapping(&mut self, from: &str, to: &str) {
        match self.special_characters.iter_mut().find(|(f, _)| f == from) {
            Some(entry) => entry.1 = to.to_string(),
            None => self.special_characters.push((from.to_string(), to.to_string())),
        }
    }

    pub fn add_name_pattern(&mut self, pattern: &NamePattern) -> ConfigResult<()> {
        self.name_rewrites.push(NameRewrite::compile(pattern)?);
        Ok(())
    }

    pub fn add_action_mapping(&mut self, id: &str, forms: ActionForms) {
        self.actions.insert(id.to_string(), forms);
    }

    pub fn add_instrument_mapping(&mut self, id: &str, name: &str) {
        self.instruments.insert(id.to_string(), name.to_string());
    }

    pub fn add_port_mapping(&mut self, id: &str, name: &str) {
        self.ports.insert(id.to_string(), name.to_string());
    }

    /// Vessel whose leave permission the port regulations are about.
    pub fn set_primary_vessel(&mut self, id: &str) {
        self.primary_vessel = id.to_string();
    }

    // -- resolution ---------------------------------------------------------

    /// Display name for an entity identifier.
    pub fn resolve_entity(&self, id: &str) -> String {
        match self.entities.get(id) {
            Some(name) => name.clone(),
            None => self.entity_to_human_readable(id),
        }
    }

    /// Fallback humanization: drop `soa_`, underscores to spaces, then the
    /// special-character table and name patterns in order. Identifiers
    /// without the prefix are returned unchanged.
    pub fn entity_to_human_readable(&self, id: &str) -> String {
        let Some(rest) = id.strip_prefix(SOA_PREFIX) else {
            return id.to_string();
        };
        let spaced = rest.replace('_', " ");
        let special = self.apply_special_chars(&spaced);
        self.name_rewrites
            .iter()
            .fold(special, |text, rewrite| rewrite.apply(&text))
    }

    /// Apply each special-character rewrite to every occurrence, in table
    /// order. Later entries see the output of earlier ones.
    pub fn apply_special_chars(&self, text: &str) -> String {
        self.special_characters
            .iter()
            .filter(|(from, _)| !from.is_empty())
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }

    /// Verb for an action or eventuality identifier.
    ///
    /// Unknown `soa`-prefixed identifiers drop the prefix and lowercase the
    /// next character, with an `s` appended in the present tense.
    pub fn resolve_action(&self, id: &str, tense: Tense) -> String {
        if let Some(forms) = self.actions.get(id) {
            return forms.get(tense).to_string();
        }
        match id.strip_prefix("soa") {
            Some(rest) if !rest.is_empty() => {
                let mut chars = rest.chars();
                let mut verb: String =
                    chars.next().into_iter().flat_map(char::to_lowercase).collect();
                verb.push_str(chars.as_str());
                if tense == Tense::Present {
                    verb.push('s');
                }
                verb
            }
            _ => id.to_string(),
        }
    }

    /// Display name of the primary vessel.
    pub fn primary_vessel(&self) -> String {
        self.resolve_entity(&self.primary_vessel)
    }

    /// Whether `id` has verb forms in the action table.
    pub fn has_action(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    /// Display name for a payment instrument.
    pub fn resolve_instrument(&self, id: &str) -> String {
        match self.instruments.get(id) {
            Some(name) => name.clone(),
            None => id.strip_prefix(SOA_PREFIX).unwrap_or(id).to_string(),
        }
    }

    /// Display name for a port. `soa_sptX` falls back to `X Smart Port`.
    pub fn resolve_port(&self, id: &str) -> String {
        if let Some(name) = self.ports.get(id).or_else(|| self.entities.get(id)) {
            return name.clone();
        }
        let Some(rest) = id.strip_prefix(SOA_PREFIX) else {
            return id.to_string();
        };
        match rest.strip_prefix("spt") {
            Some(port) => format!("{port} Smart Port"),
            None => rest.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpecialCharMapping;

    #[test]
    fn direct_entity_mappings() {
        let r = EntityResolver::new();
        assert_eq!(r.resolve_entity("soa_ALEXANDRA_MAERSK"), "ALEXANDRA MÆRSK");
        assert_eq!(r.resolve_entity("soa_enpam"), "ALEXANDRA MÆRSK");
        assert_eq!(r.resolve_entity("soa_MICT"), "MICT Smart Port");
    }

    #[test]
    fn fallback_humanizes_and_applies_special_chars() {
        let r = EntityResolver::new();
        assert_eq!(r.resolve_entity("soa_EMMA_MAERSK"), "EMMA MÆRSK");
        assert_eq!(r.resolve_entity("soa_epam15k"), "epam15k");
        assert_eq!(r.resolve_entity("not_opt"), "not_opt");
    }

    #[test]
    fn special_chars_apply_in_table_order() {
        let mut r = EntityResolver::new();
        r.add_special_char_mapping("MÆRSK", "MÆRSK LINE");
        // MAERSK → MÆRSK, then the new entry rewrites the result.
        assert_eq!(r.apply_special_chars("MAERSK"), "MÆRSK LINE");
        // A bare AERSK is handled by the second entry.
        assert_eq!(r.apply_special_chars("HAERSK"), "HÆRSK");
    }

    #[test]
    fn actions() {
        let r = EntityResolver::new();
        assert_eq!(r.resolve_action("soaPay", Tense::Present), "pays");
        assert_eq!(r.resolve_action("soaLeave", Tense::Past), "left");
        assert_eq!(r.resolve_action("soa_enmam", Tense::Base), "moor");
        assert_eq!(r.resolve_action("soaBerth", Tense::Present), "berths");
        assert_eq!(r.resolve_action("soaBerth", Tense::Past), "berth");
        assert_eq!(r.resolve_action("soa", Tense::Present), "soa");
        assert_eq!(r.resolve_action("anchor", Tense::Present), "anchor");
    }

    #[test]
    fn instruments_and_ports() {
        let r = EntityResolver::new();
        assert_eq!(r.resolve_instrument("soa_INRS"), "INRS");
        assert_eq!(r.resolve_instrument("soa_GBP"), "GBP");
        assert_eq!(r.resolve_instrument("GBP"), "GBP");
        assert_eq!(r.resolve_port("soa_sptMICT"), "MICT Smart Port Treasury");
        assert_eq!(r.resolve_port("soa_sptRotterdam"), "Rotterdam Smart Port");
        assert_eq!(r.resolve_port("soa_Manila"), "Manila");
    }

    #[test]
    fn negation_algebra() {
        assert!(is_negated_entity("soa_enpam"));
        assert!(!is_negated_entity("soa_epam"));
        assert_eq!(negated_form("soa_epam"), "soa_enpam");
        assert_eq!(negated_form("soa_enpam"), "soa_enpam");
        assert_eq!(negated_form("opt"), "not_opt");
        assert_eq!(base_form("soa_enpam"), "soa_epam");
        assert_eq!(base_form("soa_epam"), "soa_epam");
    }

    #[test]
    fn negation_is_an_involution_on_eventuality_names() {
        for id in ["soa_emam", "soa_epam15k", "soa_elam", "soa_eXYZ"] {
            assert_eq!(base_form(&negated_form(id)), id);
        }
    }

    #[test]
    fn config_overlays_defaults() {
        let config = InferenceConfig {
            entity_mappings: BTreeMap::from([("soa_MICT".into(), "Manila Port".into())]),
            special_characters: vec![SpecialCharMapping {
                from: "OE".into(),
                to: "Ø".into(),
            }],
            name_patterns: vec![NamePattern {
                pattern: r"(\d+)k$".into(),
                replacement: "${1}000".into(),
                regex: true,
            }],
            ..InferenceConfig::default()
        };
        let r = EntityResolver::with_config(&config).unwrap();
        assert_eq!(r.resolve_entity("soa_MICT"), "Manila Port");
        assert_eq!(r.resolve_entity("soa_ALEXANDRA_MAERSK"), "ALEXANDRA MÆRSK");
        assert_eq!(r.resolve_entity("soa_BJOERN"), "BJØRN");
        assert_eq!(r.resolve_entity("soa_pay_15k"), "pay 15000");
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let config = InferenceConfig {
            name_patterns: vec![NamePattern {
                pattern: "(unclosed".into(),
                replacement: String::new(),
                regex: true,
            }],
            ..InferenceConfig::default()
        };
        assert!(matches!(
            EntityResolver::with_config(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EntityResolver>();
    }
}
