//! Canonical rule representation: a structured dedup key plus the printable
//! string grammar used for I/O and round-tripping (spec §6, Design Notes §9).

use std::fmt;
use std::str::FromStr;

use crate::error::RuleError;
use crate::intern::{EntityId, Interner, RelationId};
use crate::rule::{RuleAtom, Term, Var};

/// Structured, id-based dedup key for a generalized rule. Equality and
/// hashing are derived directly from relation/term ids — no string
/// formatting is involved, per the Design Notes' recommendation to keep
/// string rendering an I/O-only concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub head: RuleAtom,
    pub body: Vec<RuleAtom>,
}

impl CanonicalKey {
    pub fn new(head: RuleAtom, body: Vec<RuleAtom>) -> Self {
        Self { head, body }
    }

    /// Render the printable canonical string: `head <- body_atom, body_atom, …`.
    pub fn display<'a>(
        &'a self,
        entities: &'a Interner<EntityId>,
        relations: &'a Interner<RelationId>,
    ) -> CanonicalDisplay<'a> {
        CanonicalDisplay { key: self, entities, relations }
    }
}

/// Deferred `Display` for a [`CanonicalKey`] that needs interners to resolve
/// constant labels and relation names.
pub struct CanonicalDisplay<'a> {
    key: &'a CanonicalKey,
    entities: &'a Interner<EntityId>,
    relations: &'a Interner<RelationId>,
}

fn fmt_term(term: Term, entities: &Interner<EntityId>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match term {
        Term::Variable(v) => write!(f, "{v}"),
        Term::Constant(id) => {
            let label = entities.resolve(id).unwrap_or_else(|| format!("<unknown:{id:?}>"));
            write!(f, "{label}")
        }
    }
}

fn fmt_atom(
    atom: &RuleAtom,
    entities: &Interner<EntityId>,
    relations: &Interner<RelationId>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let relation = relations.resolve(atom.relation).unwrap_or_else(|| format!("<unknown:{:?}>", atom.relation));
    write!(f, "{relation}(")?;
    fmt_term(atom.subject, entities, f)?;
    write!(f, ",")?;
    fmt_term(atom.object, entities, f)?;
    write!(f, ")")
}

impl fmt::Display for CanonicalDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_atom(&self.key.head, self.entities, self.relations, f)?;
        write!(f, " <- ")?;
        for (i, atom) in self.key.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            fmt_atom(atom, self.entities, self.relations, f)?;
        }
        Ok(())
    }
}

fn parse_term(raw: &str, entities: &Interner<EntityId>) -> Term {
    match raw {
        "Y" => Term::Variable(Var::Y),
        "X" => Term::Variable(Var::X),
        _ if raw.starts_with('A') && raw[1..].chars().all(|c| c.is_ascii_digit()) && raw.len() > 1 => {
            let n: u16 = raw[1..].parse().expect("validated all-digit suffix");
            Term::Variable(Var::Aux(n))
        }
        _ => Term::Constant(entities.intern(raw)),
    }
}

fn parse_atom(raw: &str, entities: &Interner<EntityId>, relations: &Interner<RelationId>) -> Option<RuleAtom> {
    let open = raw.find('(')?;
    if !raw.ends_with(')') {
        return None;
    }
    let relation_name = &raw[..open];
    let inner = &raw[open + 1..raw.len() - 1];
    let (subject_raw, object_raw) = inner.split_once(',')?;
    Some(RuleAtom {
        subject: parse_term(subject_raw.trim(), entities),
        relation: relations.intern(relation_name),
        object: parse_term(object_raw.trim(), entities),
    })
}

/// Parse a canonical rule string of the grammar
/// `head <- body_atom (, body_atom)*`. Constants are interned into
/// `entities`/`relations` on first sight, matching how a freshly loaded
/// rule file is expected to be merged into an existing graph's id space.
pub fn parse_canonical(
    input: &str,
    entities: &Interner<EntityId>,
    relations: &Interner<RelationId>,
) -> Result<CanonicalKey, RuleError> {
    let (head_raw, body_raw) = input
        .split_once("<-")
        .ok_or_else(|| RuleError::CanonicalParse { input: input.to_string() })?;

    let head = parse_atom(head_raw.trim(), entities, relations)
        .ok_or_else(|| RuleError::CanonicalParse { input: input.to_string() })?;

    let body = body_raw
        .split(',')
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|chunk| chunk.join(","))
        .map(|atom_raw| {
            parse_atom(atom_raw.trim(), entities, relations)
                .ok_or_else(|| RuleError::CanonicalParse { input: input.to_string() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CanonicalKey::new(head, body))
}

/// Owned, standalone parsed rule for contexts without access to a shared
/// [`KnowledgeGraph`](crate::graph::index::KnowledgeGraph)'s interners —
/// builds fresh ones. Implements [`FromStr`] so canonical strings round-trip
/// through ordinary Rust string parsing (spec §8 invariant 6).
pub struct ParsedRule {
    pub key: CanonicalKey,
    pub entities: Interner<EntityId>,
    pub relations: Interner<RelationId>,
}

impl FromStr for ParsedRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entities = Interner::new();
        let relations = Interner::new();
        let key = parse_canonical(s, &entities, &relations)?;
        Ok(Self { key, entities, relations })
    }
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key.display(&self.entities, &self.relations))
    }
}
