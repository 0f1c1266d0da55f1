//! Closed vocabularies for knowledge documents.
//!
//! The engine's vocabulary evolves, so membership checks here drive
//! warnings rather than rejections everywhere except eventuality
//! validation.

/// Known eventuality types.
pub const EVENTUALITY_TYPES: &[&str] = &[
    // Smart port
    "soaMoor",
    "soaPay",
    "soaLeave",
    "soaContainerVessel",
    "soa_mooringBerth",
    "smartport",
    // Demand-side stablecoin primitives
    "soaIdentify",
    "soaDevelop",
    "soaOnboard",
    "soaActivate",
    "soaInvoke",
    "soaCreate",
    "soaUpdate",
    "soaReview",
    "soaReward",
    "soaUnreward",
    "soaCalculate",
    "soaIssue",
    "soaSettle",
    "soaReimburse",
    "soaVerify",
    "soaDeclare",
    "soaRegister",
    "soaTransfer",
    "soaValidate",
    // Abbreviated forms
    "Pay",
    "Moor",
    "Leave",
];

/// Known role predicates.
pub const ROLES: &[&str] = &[
    "soaHas_agent",
    "soaHas_beneficiary",
    "soaHas_cause",
    "soaHas_goal",
    "soaHas_instrument",
    "soaHas_partner",
    "soaHas_patient",
    "soaHas_pivot",
    "soaHas_purpose",
    "soaHas_reason",
    "soaHas_result",
    "soaHas_setting",
    "soaHas_source",
    "soaHas_theme",
    "soaHas_time",
    "soaHas_manner",
    "soaHas_medium",
    "soaHas_means",
    "soaHas_location",
    "soaHas_initial-location",
    "soaHas_final-location",
    "soaHas_distance",
    "soaHas_duration",
    "soaHas_initial-time",
    "soaHas_final-time",
    "soaHas_path",
    "soaHas_amount",
    "soaHas_attribute",
];

/// Existential and deontic modalities.
pub const MODALITIES: &[&str] = &["rexist", "obligatory", "permitted", "optional"];

/// The modality asserted by state-of-affairs facts.
pub const REXIST: &str = "rexist";

/// Prefix shared by every role predicate.
pub const ROLE_PREFIX: &str = "soaHas_";

/// Prefix reserved for eventuality names.
pub const EVENTUALITY_PREFIX: &str = "soa_e";

pub fn is_eventuality_type(kind: &str) -> bool {
    EVENTUALITY_TYPES.contains(&kind)
}

pub fn is_role(role: &str) -> bool {
    ROLES.contains(&role)
}

pub fn is_modality(modality: &str) -> bool {
    MODALITIES.contains(&modality)
}
