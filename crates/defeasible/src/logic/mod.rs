pub mod collectors;
pub mod tseytin_cnf;
pub mod visitor;

use std::{collections::BTreeSet, fmt, sync::Arc};

use serde::{
    de::{Error, Visitor},
    Deserialize, Serialize,
};

use crate::parse::prop::parse_formula;

use self::collectors::collect_atoms;

/// A propositional formula, possibly a top-level defeasible implication.
///
/// `DImpl` is its own variant rather than a flavour of `Impl` so that
/// materialisation and dematerialisation stay exhaustive matches.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Formula {
    Prop(Arc<str>),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Impl(Box<Formula>, Box<Formula>),
    DImpl(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn prop(name: &str) -> Self {
        Formula::Prop(name.into())
    }

    pub fn not(f: Formula) -> Self {
        Formula::Not(Box::new(f))
    }

    pub fn implies(antecedent: Formula, consequent: Formula) -> Self {
        Formula::Impl(Box::new(antecedent), Box::new(consequent))
    }

    pub fn typically(antecedent: Formula, consequent: Formula) -> Self {
        Formula::DImpl(Box::new(antecedent), Box::new(consequent))
    }

    pub fn negate(&self) -> Self {
        Formula::Not(Box::new(self.clone()))
    }

    pub fn is_defeasible(&self) -> bool {
        matches!(self, Formula::DImpl(..))
    }

    pub fn antecedent(&self) -> Option<&Formula> {
        match self {
            Formula::Impl(a, _) | Formula::DImpl(a, _) => Some(a),
            _ => None,
        }
    }

    pub fn materialise(&self) -> Self {
        match self {
            Formula::DImpl(a, c) => Formula::Impl(a.clone(), c.clone()),
            Formula::Prop(_)
            | Formula::Not(_)
            | Formula::And(_)
            | Formula::Or(_)
            | Formula::Impl(..) => self.clone(),
        }
    }

    pub fn dematerialise(&self) -> Self {
        match self {
            Formula::Impl(a, c) => Formula::DImpl(a.clone(), c.clone()),
            Formula::Prop(_)
            | Formula::Not(_)
            | Formula::And(_)
            | Formula::Or(_)
            | Formula::DImpl(..) => self.clone(),
        }
    }

    pub fn atoms(&self) -> BTreeSet<Arc<str>> {
        collect_atoms(self)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Prop(name) => write!(f, "{}", name),
            Formula::Not(c) => write!(f, "¬{}", c),
            Formula::And(cs) => write_joined(f, cs, " ∧ "),
            Formula::Or(cs) => write_joined(f, cs, " ∨ "),
            Formula::Impl(l, r) => write!(f, "({} => {})", l, r),
            Formula::DImpl(l, r) => write!(f, "{} ~> {}", l, r),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Formula], sep: &str) -> fmt::Result {
    let parts: Vec<String> = children.iter().map(ToString::to_string).collect();
    write!(f, "({})", parts.join(sep))
}

impl Serialize for Formula {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FormulaVisitor;

        impl<'de> Visitor<'de> for FormulaVisitor {
            type Value = Formula;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a formula")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                parse_formula(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(FormulaVisitor)
    }
}
