// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core types for kernel proof obligations
//!
//! Obligations arrive from the verification-condition generator and are
//! never mutated afterwards. Transformations produce new obligations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// First-order term shared by goals and hypotheses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// Variable or nullary constant
    Var(String),

    /// Integer literal
    Int(i64),

    /// Boolean literal
    Bool(bool),

    /// Function application f(args...), interpreted or uninterpreted
    App {
        func: String,
        args: Vec<Term>,
    },
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn app(func: impl Into<String>, args: Vec<Term>) -> Self {
        Term::App {
            func: func.into(),
            args,
        }
    }

    pub fn eq(lhs: Term, rhs: Term) -> Self {
        Term::app("=", vec![lhs, rhs])
    }

    pub fn and(args: Vec<Term>) -> Self {
        Term::app("and", args)
    }

    pub fn implies(lhs: Term, rhs: Term) -> Self {
        Term::app("=>", vec![lhs, rhs])
    }

    pub fn not(t: Term) -> Self {
        Term::app("not", vec![t])
    }

    /// Head symbol of an application
    pub fn head(&self) -> Option<&str> {
        match self {
            Term::App { func, .. } => Some(func.as_str()),
            _ => None,
        }
    }

    /// Number of nodes in the term
    pub fn size(&self) -> usize {
        match self {
            Term::App { args, .. } => 1 + args.iter().map(Term::size).sum::<usize>(),
            _ => 1,
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Term::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Term::Bool(false))
    }

    /// Rebuild the term bottom-up, giving `f` every node after its children
    pub fn map_bottom_up(&self, f: &mut impl FnMut(Term) -> Term) -> Term {
        let rebuilt = match self {
            Term::App { func, args } => Term::App {
                func: func.clone(),
                args: args.iter().map(|a| a.map_bottom_up(f)).collect(),
            },
            other => other.clone(),
        };
        f(rebuilt)
    }

    /// Visit every subterm in pre-order
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Term)) {
        f(self);
        if let Term::App { args, .. } = self {
            for arg in args {
                arg.visit(f);
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) => write!(f, "{}", name),
            Term::Int(n) if *n < 0 => write!(f, "(- {})", n.unsigned_abs()),
            Term::Int(n) => write!(f, "{}", n),
            Term::Bool(b) => write!(f, "{}", b),
            Term::App { func, args } => {
                if args.is_empty() {
                    return write!(f, "{}", func);
                }
                write!(f, "({}", func)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A single proof obligation: prove `goal` assuming every hypothesis
///
/// Equality and hashing are structural over the hypotheses and the goal.
/// The name is carried for reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obligation {
    /// Label used in reports (not part of identity)
    #[serde(default)]
    pub name: String,

    /// Supporting context
    #[serde(default)]
    pub hypotheses: Vec<Term>,

    /// Formula to show valid
    pub goal: Term,
}

impl Obligation {
    pub fn new(name: impl Into<String>, hypotheses: Vec<Term>, goal: Term) -> Self {
        Obligation {
            name: name.into(),
            hypotheses,
            goal,
        }
    }

    /// Derive a new obligation that keeps this one's name
    pub fn derive(&self, hypotheses: Vec<Term>, goal: Term) -> Self {
        Obligation {
            name: self.name.clone(),
            hypotheses,
            goal,
        }
    }

    /// Total term size of goal and hypotheses
    pub fn size(&self) -> usize {
        self.goal.size() + self.hypotheses.iter().map(Term::size).sum::<usize>()
    }

    /// Multi-line display form for reports
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Obligation {
    fn eq(&self, other: &Self) -> bool {
        self.goal == other.goal && self.hypotheses == other.hypotheses
    }
}

impl Eq for Obligation {}

impl Hash for Obligation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hypotheses.hash(state);
        self.goal.hash(state);
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            writeln!(f, "[{}]", self.name)?;
        }
        for hyp in &self.hypotheses {
            writeln!(f, "  {}", hyp)?;
        }
        write!(f, "  |- {}", self.goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(o: &Obligation) -> u64 {
        let mut h = DefaultHasher::new();
        o.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_equality_ignores_name() {
        let a = Obligation::new("a", vec![Term::var("p")], Term::var("q"));
        let b = Obligation::new("b", vec![Term::var("p")], Term::var("q"));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_context_matters() {
        let a = Obligation::new("a", vec![Term::var("p")], Term::var("q"));
        let b = Obligation::new("a", vec![], Term::var("q"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_size_and_display() {
        let goal = Term::eq(Term::app("f", vec![Term::var("x")]), Term::Int(-3));
        assert_eq!(goal.size(), 4);
        assert_eq!(goal.to_string(), "(= (f x) (- 3))");

        let o = Obligation::new("k1", vec![Term::var("p")], goal);
        assert_eq!(o.size(), 5);
        assert!(o.render().contains("|- (= (f x) (- 3))"));
    }

    #[test]
    fn test_serde_shape() {
        let o = Obligation::new("k", vec![], Term::eq(Term::var("x"), Term::Int(1)));
        let json = serde_json::to_string(&o).unwrap();
        let back: Obligation = serde_json::from_str(&json).unwrap();
        assert_eq!(o, back);
        assert!(json.contains("\"app\""));
    }
}
