//! Description templates with `{placeholder}` substitution.

use std::collections::BTreeMap;

use crate::config::InferenceConfig;

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (
        "contradiction_existence",
        "Contradiction: {entity} cannot both {action1} and {action2}",
    ),
    (
        "contradiction_payment",
        "Contradiction: Payment declared in {instrument1} but {instrument2} is required",
    ),
    (
        "contradiction_action",
        "Contradiction: {entity} cannot both {action} and not {action} at the same time",
    ),
    (
        "conflict_regulation",
        "Regulatory conflict: {regulation1} prohibits {action} while {regulation2} requires it",
    ),
    ("conflict_payment", "{entity} faces a conflict: {reason}"),
    ("violation_necessary", "The {rule} must be violated due to {reason}"),
    ("violation_constraint", "{entity} violates {rule} because of {constraint}"),
    (
        "compliance_fulfilled",
        "{entity} successfully fulfills {obligation} by {action}",
    ),
    ("compliance_met", "Requirement {requirement} is met by {entity}"),
];

/// Replace every `{key}` in `template` with its value. Unknown
/// placeholders are left in place.
pub fn substitute(template: &str, vars: &BTreeMap<&str, &str>) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

/// Split `"ALEXANDRA MÆRSK moor"` into `("ALEXANDRA MÆRSK", "moor")`.
fn split_last_word(text: &str) -> Option<(&str, &str)> {
    text.rsplit_once(' ')
}

/// Inputs for a conflict description.
#[derive(Debug, Clone, Copy)]
pub struct ConflictContext<'a> {
    pub entity: &'a str,
    pub regulation1: &'a str,
    pub regulation2: &'a str,
    pub reason: &'a str,
    pub action: &'a str,
}

/// Template table keyed by id (`<category>_<variant>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionTemplates {
    templates: BTreeMap<String, String>,
}

impl Default for DescriptionTemplates {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(id, pattern)| (id.to_string(), pattern.to_string()))
                .collect(),
        }
    }
}

impl DescriptionTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the templates of `config`.
    pub fn with_config(config: &InferenceConfig) -> Self {
        let mut templates = Self::default();
        for (id, pattern) in &config.templates {
            templates.add_template(id, pattern);
        }
        templates
    }

    pub fn add_template(&mut self, id: &str, pattern: &str) {
        self.templates.insert(id.to_string(), pattern.to_string());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.templates.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Substitute `vars` into the template `id`, if it exists.
    pub fn render(&self, id: &str, vars: &BTreeMap<&str, &str>) -> Option<String> {
        self.get(id).map(|template| substitute(template, vars))
    }

    /// First template id (in id order) starting with `category`.
    pub fn find_best_template(&self, category: &str) -> Option<&str> {
        self.templates
            .keys()
            .find(|id| id.starts_with(category))
            .map(String::as_str)
    }

    /// Describe a contradiction between two statements.
    ///
    /// `context` selects the template: `payment_method` (or any context
    /// naming USDS/INRS) uses the payment template, `action` the action
    /// template, anything else the existence template.
    pub fn contradiction_description(&self, entity1: &str, entity2: &str, context: &str) -> String {
        let mut vars =
            BTreeMap::from([("entity1", entity1), ("entity2", entity2), ("context", context)]);

        let names_instrument = context.contains("USDS") || context.contains("INRS");
        let id = if context == "payment_method" || names_instrument {
            let source = if context.contains("USDS") || context.contains("INRS") {
                context
            } else {
                entity1
            };
            if source.contains("USDS") {
                vars.insert("instrument1", "USDS");
                vars.insert("instrument2", "INRS");
            } else if source.contains("INRS") {
                vars.insert("instrument1", "INRS");
                vars.insert("instrument2", "USDS");
            }
            "contradiction_payment"
        } else if context == "action" {
            let (entity, action) = split_last_word(entity1).unwrap_or((entity1, "act"));
            vars.insert("entity", entity);
            vars.insert("action", action);
            "contradiction_action"
        } else {
            match (split_last_word(entity1), split_last_word(entity2)) {
                (Some((entity, action1)), Some((_, action2))) => {
                    vars.insert("entity", entity);
                    vars.insert("action1", action1);
                    vars.insert("action2", action2);
                }
                _ => {
                    vars.insert("entity", entity1);
                    vars.insert("action1", entity1);
                    vars.insert("action2", entity2);
                }
            }
            "contradiction_existence"
        };

        self.render(id, &vars)
            .unwrap_or_else(|| format!("Contradiction between {entity1} and {entity2}"))
    }

    /// Describe a regulatory conflict. Reasons mentioning payment use the
    /// payment template.
    pub fn conflict_description(&self, ctx: ConflictContext<'_>) -> String {
        let vars = BTreeMap::from([
            ("entity", ctx.entity),
            ("entity1", ctx.regulation1),
            ("entity2", ctx.regulation2),
            ("regulation1", ctx.regulation1),
            ("regulation2", ctx.regulation2),
            ("reason", ctx.reason),
            ("action", ctx.action),
        ]);
        let id = if ctx.reason.contains("payment") {
            "conflict_payment"
        } else {
            "conflict_regulation"
        };
        self.render(id, &vars).unwrap_or_else(|| {
            format!(
                "Conflict between {} and {}: {}",
                ctx.regulation1, ctx.regulation2, ctx.reason
            )
        })
    }

    pub fn violation_description(&self, violator: &str, rule: &str, reason: &str) -> String {
        let vars = BTreeMap::from([
            ("entity", violator),
            ("violator", violator),
            ("rule", rule),
            ("reason", reason),
            ("constraint", reason),
        ]);
        self.render("violation_necessary", &vars)
            .unwrap_or_else(|| format!("{rule} violated by {violator}"))
    }

    pub fn compliance_description(&self, entity: &str, obligation: &str, action: &str) -> String {
        let vars = BTreeMap::from([
            ("entity", entity),
            ("obligation", obligation),
            ("requirement", obligation),
            ("action", action),
        ]);
        self.render("compliance_fulfilled", &vars)
            .unwrap_or_else(|| format!("{entity} complies with {obligation}"))
    }
}
