//! Knowledge data model and canonical renderings.
//!
//! Every `Display` impl here produces text the document parsers read back
//! into an equal value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::vocabulary::{EVENTUALITY_PREFIX, REXIST};

// ---------------------------------------------------------------------------
// Triples
// ---------------------------------------------------------------------------

/// Which triple form a fact was written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripleKind {
    /// `ct-triple`: a state-of-affairs fact.
    #[default]
    Fact,
    /// `meta-triple`: a fact about facts.
    Meta,
}

impl TripleKind {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Fact => "ct-triple",
            Self::Meta => "meta-triple",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "ct-triple" => Some(Self::Fact),
            "meta-triple" => Some(Self::Meta),
            _ => None,
        }
    }
}

/// A subject–predicate–object fact.
///
/// The object is either an atom or the canonical rendering of a nested
/// expression such as `(15000 USD)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub kind: TripleKind,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub object_is_nested: bool,
}

impl Triple {
    /// A `ct-triple` fact with an atom object.
    pub fn fact(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            kind: TripleKind::Fact,
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            object_is_nested: false,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} {} {} {})",
            self.kind.symbol(),
            self.subject,
            self.predicate,
            self.object
        )
    }
}

// ---------------------------------------------------------------------------
// Norms
// ---------------------------------------------------------------------------

/// One `let*` binding of a norm body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub variable: String,
    /// Condition call without its outer parentheses.
    pub expression: String,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} ({}))", self.variable, self.expression)
    }
}

/// A named rule: `(= (name params...) (let* (conditions...) True))`.
///
/// Consequences are the facts the rule adds, written as separate
/// `ct-triple-for-add` rules that call back into the norm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Norm {
    pub name: String,
    pub parameters: Vec<String>,
    pub conditions: Vec<Condition>,
    pub consequences: Vec<Triple>,
    pub description: String,
}

impl Norm {
    fn call(&self) -> String {
        let mut call = format!("({}", self.name);
        for param in &self.parameters {
            call.push(' ');
            call.push_str(param);
        }
        call.push(')');
        call
    }
}

impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.description.is_empty() {
            writeln!(f, "; {}", self.description)?;
        }

        let call = self.call();
        writeln!(f, "(= {call}")?;
        if self.conditions.is_empty() {
            writeln!(f, "  True)")?;
        } else {
            f.write_str("  (let* (")?;
            for (i, condition) in self.conditions.iter().enumerate() {
                if i > 0 {
                    f.write_str("\n         ")?;
                }
                write!(f, "{condition}")?;
            }
            writeln!(f, ")\n    True))")?;
        }

        for triple in &self.consequences {
            writeln!(
                f,
                "(= (ct-triple-for-add {} {} {})",
                triple.subject, triple.predicate, triple.object
            )?;
            writeln!(f, "   (let* ((True {call}))\n     True))")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Eventualities
// ---------------------------------------------------------------------------

/// A named event or state asserted to exist with a type, modality and agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eventuality {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub modality: String,
    pub agent: String,
    /// Role predicate (`soaHas_*`) to value, agent excluded.
    pub roles: BTreeMap<String, String>,
}

impl Eventuality {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Name, type and agent present, with modality `rexist`.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.kind.is_empty()
            && self.modality == REXIST
            && !self.agent.is_empty()
    }

    /// The name the naming convention assigns to this eventuality.
    pub fn expected_name(&self) -> String {
        derive_expected_name(&self.kind, &self.agent)
    }
}

/// Conventional eventuality name for a type and agent.
///
/// `"soa_e"`, then the type initial (the character after a `soa` prefix,
/// else the first character), then the first letter of every `_`/`-`
/// separated word of the agent with any `soa_` prefix removed. All
/// initials are lowercased. Empty when either input is empty.
pub fn derive_expected_name(kind: &str, agent: &str) -> String {
    if kind.is_empty() || agent.is_empty() {
        return String::new();
    }

    let type_initial = match kind.strip_prefix("soa") {
        Some(rest) if !rest.is_empty() => rest.chars().next(),
        _ => kind.chars().next(),
    };

    let agent = agent.strip_prefix("soa_").unwrap_or(agent);
    let agent_initials = agent
        .split(['_', '-'])
        .filter_map(|word| word.chars().find(|c| c.is_alphabetic()));

    let mut name = String::from(EVENTUALITY_PREFIX);
    name.extend(type_initial.into_iter().chain(agent_initials).flat_map(char::to_lowercase));
    name
}

// ---------------------------------------------------------------------------
// Logical expressions, negations, entities
// ---------------------------------------------------------------------------

/// Logical combinator of a `(= ...)` definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
    Not,
    /// A named definition that is not one of the combinators.
    #[default]
    Equal,
}

impl LogicalOp {
    /// The combinator symbol, `None` for named definitions.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::And => Some("ct-and"),
            Self::Or => Some("ct-or"),
            Self::Not => Some("ct-not"),
            Self::Equal => None,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "ct-and" => Some(Self::And),
            "ct-or" => Some(Self::Or),
            "ct-not" => Some(Self::Not),
            _ => None,
        }
    }
}

/// A `(= ...)` definition: a combinator over named operands, or a named
/// equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalExpression {
    pub op: LogicalOp,
    pub name: String,
    pub operands: Vec<String>,
}

impl fmt::Display for LogicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op.symbol() {
            Some(symbol) => {
                write!(f, "(= ({symbol} {})", self.name)?;
                if !self.operands.is_empty() {
                    write!(f, " ({})", self.operands.join(" "))?;
                }
            }
            None => {
                write!(f, "(= ({}", self.name)?;
                if let Some(first) = self.operands.first() {
                    write!(f, " {first}")?;
                }
                f.write_str(")")?;
                if self.operands.len() > 1 {
                    write!(f, " ({})", self.operands[1..].join(" "))?;
                }
            }
        }
        f.write_str(")")
    }
}

/// `(ct-simple-not name negated)`: `name` is the negation of `negated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Negation {
    pub name: String,
    pub negated_entity: String,
}

impl Negation {
    /// The companion fact asserting the negation exists.
    pub fn existence_fact(&self) -> Triple {
        Triple::fact(&self.name, "type", REXIST)
    }
}

impl fmt::Display for Negation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ct-simple-not {} {})", self.name, self.negated_entity)
    }
}

/// A typed non-eventuality individual with its properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: BTreeMap<String, String>,
}

impl Entity {
    /// The facts this entity renders to: its type, then each property.
    pub fn facts(&self) -> Vec<Triple> {
        std::iter::once(Triple::fact(&self.name, "type", &self.kind))
            .chain(
                self.properties
                    .iter()
                    .map(|(key, value)| Triple::fact(&self.name, key, value)),
            )
            .collect()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fact) in self.facts().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{fact}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Knowledge sets and documents
// ---------------------------------------------------------------------------

/// Everything a state-of-affairs section asserts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSet {
    pub description: String,
    pub facts: Vec<Triple>,
    pub eventualities: BTreeMap<String, Eventuality>,
    pub entities: BTreeMap<String, Entity>,
    pub logical_expressions: Vec<LogicalExpression>,
    pub negations: Vec<Negation>,
}

impl KnowledgeSet {
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.logical_expressions.is_empty() && self.negations.is_empty()
    }

    fn has_fact(&self, triple: &Triple) -> bool {
        self.facts.contains(triple)
    }
}

/// Logical expressions, facts, negations, then entities. Facts derived from
/// negations and entities are only written when not already among the
/// facts, so re-reading the rendering yields the same set.
impl fmt::Display for KnowledgeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.description.is_empty() {
            writeln!(f, "; State of Affairs ({})\n", self.description)?;
        }
        for expr in &self.logical_expressions {
            writeln!(f, "{expr}")?;
        }
        for fact in &self.facts {
            writeln!(f, "{fact}")?;
        }
        for negation in &self.negations {
            writeln!(f, "{negation}")?;
            let existence = negation.existence_fact();
            if !negation.name.is_empty() && !self.has_fact(&existence) {
                writeln!(f, "{existence}")?;
            }
        }
        for entity in self.entities.values() {
            for fact in entity.facts() {
                if !self.has_fact(&fact) {
                    writeln!(f, "{fact}")?;
                }
            }
        }
        Ok(())
    }
}

/// A knowledge document: free-form header, norms, and a state of affairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MettaDocument {
    pub header: String,
    pub norms: Vec<Norm>,
    pub knowledge: KnowledgeSet,
}

impl fmt::Display for MettaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.header.is_empty() {
            write!(f, "{}\n\n", self.header)?;
        }
        if !self.norms.is_empty() {
            f.write_str("; ========== NORMS ==========\n\n")?;
            for norm in &self.norms {
                writeln!(f, "{norm}")?;
            }
        }
        if !self.knowledge.is_empty() {
            f.write_str("\n; ========== STATE OF AFFAIRS ==========\n\n")?;
            write!(f, "{}", self.knowledge)?;
        }
        Ok(())
    }
}
