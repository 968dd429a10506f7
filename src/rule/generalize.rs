//! Lifting a concrete bottom rule into variable-typed rule templates
//! (spec §4.D).

use std::collections::HashMap;

use crate::error::RuleError;
use crate::intern::EntityId;
use crate::rule::bottom::BottomRule;
use crate::rule::canonical::CanonicalKey;
use crate::rule::{RuleAtom, Term, Var};

/// Which head endpoint was kept a constant for an `AC1` rule derived from a
/// cyclical bottom rule. Only meaningful when `rule_type == RuleType::Ac1`
/// and the source bottom rule was cyclical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ac1Variant {
    YAsConstant,
    XAsConstant,
}

/// The three rule templates a bottom rule can be generalized into
/// (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    /// Closed/cyclic: every node becomes a variable.
    C,
    /// One head endpoint stays a constant.
    Ac1,
    /// Only the `Y`-position head endpoint stays a constant.
    Ac2,
}

/// A rule template lifted from a [`BottomRule`] by a node→term mapping.
#[derive(Debug, Clone)]
pub struct GeneralizedRule {
    pub rule_type: RuleType,
    pub ac1_variant: Option<Ac1Variant>,
    pub node_mappings: HashMap<EntityId, Term>,
    pub generalized_head: RuleAtom,
    pub generalized_body: Vec<RuleAtom>,
}

fn assign_variables(flattened: &[EntityId]) -> HashMap<EntityId, Var> {
    let mut mappings: HashMap<EntityId, Var> = HashMap::new();
    let mut aux_candidate: u16 = 2;
    for &node in flattened {
        if mappings.contains_key(&node) {
            continue;
        }
        let var = match mappings.len() {
            0 => Var::Y,
            1 => Var::X,
            _ => {
                while mappings.values().any(|v| *v == Var::Aux(aux_candidate)) {
                    aux_candidate += 1;
                }
                let v = Var::Aux(aux_candidate);
                aux_candidate += 1;
                v
            }
        };
        mappings.insert(node, var);
    }
    mappings
}

impl GeneralizedRule {
    fn build(
        bottom_rule: &BottomRule,
        rule_type: RuleType,
        ac1_variant: Option<Ac1Variant>,
    ) -> Result<Self, RuleError> {
        match (rule_type, ac1_variant) {
            (RuleType::Ac1, Some(_)) if !bottom_rule.is_cyclical => {
                return Err(RuleError::UnexpectedAc1Variant)
            }
            (RuleType::Ac1, None) if bottom_rule.is_cyclical => {
                return Err(RuleError::MissingAc1Variant)
            }
            (RuleType::Ac1, _) => {}
            (_, Some(_)) => return Err(RuleError::UnexpectedAc1Variant),
            (_, None) => {}
        }

        let flattened = bottom_rule.flattened_nodes();
        let by_var = assign_variables(&flattened);
        let mut node_mappings: HashMap<EntityId, Term> =
            by_var.into_iter().map(|(node, var)| (node, Term::Variable(var))).collect();

        let first = flattened[0];
        let second = flattened[1];
        let last = *flattened.last().unwrap();

        match (rule_type, ac1_variant) {
            (RuleType::C, _) => {}
            (RuleType::Ac2, _) => {
                node_mappings.insert(first, Term::Constant(first));
            }
            (RuleType::Ac1, Some(Ac1Variant::YAsConstant)) => {
                node_mappings.insert(first, Term::Constant(first));
            }
            (RuleType::Ac1, Some(Ac1Variant::XAsConstant)) => {
                node_mappings.insert(second, Term::Constant(second));
            }
            (RuleType::Ac1, None) => {
                // Acyclic: both head endpoints stay constants.
                node_mappings.insert(first, Term::Constant(first));
                node_mappings.insert(last, Term::Constant(last));
            }
        }

        let map_term = |node: EntityId| node_mappings[&node];
        let generalized_head = RuleAtom {
            subject: map_term(bottom_rule.head.subject),
            relation: bottom_rule.head.relation,
            object: map_term(bottom_rule.head.object),
        };
        let generalized_body = bottom_rule
            .body
            .iter()
            .map(|atom| RuleAtom {
                subject: map_term(atom.subject),
                relation: atom.relation,
                object: map_term(atom.object),
            })
            .collect();

        Ok(Self {
            rule_type,
            ac1_variant,
            node_mappings,
            generalized_head,
            generalized_body,
        })
    }
}

impl GeneralizedRule {
    /// Structured dedup key (spec §3's "canonical string", kept id-based
    /// rather than formatted) — two rules are the same entry in the global
    /// rule map iff their keys are equal.
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new(self.generalized_head, self.generalized_body.clone())
    }
}

/// Generalize a bottom rule into the templates spec §4.D prescribes: three
/// variants (`AC1` Y-constant, `AC1` X-constant, `C`) when cyclical, two
/// (`AC1`, `AC2`) otherwise.
pub fn generalize(bottom_rule: &BottomRule) -> Vec<GeneralizedRule> {
    if bottom_rule.is_cyclical {
        vec![
            GeneralizedRule::build(bottom_rule, RuleType::Ac1, Some(Ac1Variant::YAsConstant))
                .expect("cyclical + AC1 + variant is always valid"),
            GeneralizedRule::build(bottom_rule, RuleType::Ac1, Some(Ac1Variant::XAsConstant))
                .expect("cyclical + AC1 + variant is always valid"),
            GeneralizedRule::build(bottom_rule, RuleType::C, None).expect("C rule construction is always valid"),
        ]
    } else {
        vec![
            GeneralizedRule::build(bottom_rule, RuleType::Ac1, None)
                .expect("acyclic + AC1 + no variant is always valid"),
            GeneralizedRule::build(bottom_rule, RuleType::Ac2, None).expect("AC2 construction is always valid"),
        ]
    }
}
