// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Obligation transformations
//!
//! Every strategy is pure: it maps one obligation to zero or more new ones.
//! An empty result means the strategy showed the obligation trivially true.

pub mod congruence;

use crate::core::{Obligation, Term};
use congruence::CongruenceClosure;

/// Transformation strategies used by the proof phases
pub trait Simplifier: Send + Sync {
    /// Premise rewriting, implication introduction and goal splitting
    fn simplify(&self, obligation: &Obligation) -> Vec<Obligation>;

    /// Remove a transparent helper function symbol
    fn eliminate_auxiliary(&self, obligation: &Obligation, symbol: &str) -> Vec<Obligation>;

    /// Rewrite the goal modulo hypothesis equalities.
    ///
    /// `None` when the closure does not apply to this obligation.
    fn congruence(&self, obligation: &Obligation) -> Option<Vec<Obligation>>;

    /// Replace a positive equality in the goal by `false`, strengthening it
    fn weaken_equality(&self, obligation: &Obligation) -> Vec<Obligation>;
}

/// Built-in strategies over [`Term`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSimplifier;

impl BasicSimplifier {
    pub fn new() -> Self {
        BasicSimplifier
    }

    /// Constant folding and boolean normalization, bottom-up
    pub fn fold(&self, term: &Term) -> Term {
        term.map_bottom_up(&mut fold_node)
    }

    fn split(
        &self,
        obligation: &Obligation,
        mut hyps: Vec<Term>,
        mut goal: Term,
        out: &mut Vec<Obligation>,
    ) {
        loop {
            let (premise, conclusion) = match &goal {
                Term::App { func, args } if func == "=>" && args.len() == 2 => {
                    (args[0].clone(), args[1].clone())
                }
                _ => break,
            };
            push_conjuncts(self.fold(&premise), &mut hyps);
            goal = conclusion;
        }

        if goal.is_true() || hyps.iter().any(Term::is_false) || hyps.contains(&goal) {
            return;
        }
        match goal {
            Term::App { ref func, ref args } if func == "and" => {
                for conjunct in args {
                    self.split(obligation, hyps.clone(), conjunct.clone(), out);
                }
            }
            goal => out.push(obligation.derive(hyps, goal)),
        }
    }
}

impl Simplifier for BasicSimplifier {
    fn simplify(&self, obligation: &Obligation) -> Vec<Obligation> {
        let mut hyps = Vec::new();
        for hyp in &obligation.hypotheses {
            push_conjuncts(self.fold(hyp), &mut hyps);
        }
        let goal = self.fold(&obligation.goal);

        let mut out = Vec::new();
        self.split(obligation, hyps, goal, &mut out);
        if out.len() > 1 && !obligation.name.is_empty() {
            for (i, o) in out.iter_mut().enumerate() {
                o.name = format!("{}#{}", obligation.name, i + 1);
            }
        }
        out
    }

    fn eliminate_auxiliary(&self, obligation: &Obligation, symbol: &str) -> Vec<Obligation> {
        let mut unwrap = |t: Term| match t {
            Term::App { func, mut args } if func == symbol && args.len() == 1 => args.remove(0),
            other => other,
        };
        let hyps = obligation
            .hypotheses
            .iter()
            .map(|h| h.map_bottom_up(&mut unwrap))
            .collect();
        let goal = obligation.goal.map_bottom_up(&mut unwrap);
        vec![obligation.derive(hyps, goal)]
    }

    fn congruence(&self, obligation: &Obligation) -> Option<Vec<Obligation>> {
        let equalities: Vec<(Term, Term)> = obligation
            .hypotheses
            .iter()
            .filter_map(|h| match h {
                Term::App { func, args } if func == "=" && args.len() == 2 => {
                    Some((args[0].clone(), args[1].clone()))
                }
                _ => None,
            })
            .collect();
        if equalities.is_empty() {
            return None;
        }

        let closure = CongruenceClosure::new(&equalities, &[&obligation.goal]);
        let goal = closure.rewrite(&obligation.goal);
        if goal == obligation.goal {
            return None;
        }
        Some(self.simplify(&obligation.derive(obligation.hypotheses.clone(), goal)))
    }

    fn weaken_equality(&self, obligation: &Obligation) -> Vec<Obligation> {
        let mut replaced = false;
        let goal = replace_first_equality(&obligation.goal, Polarity::Positive, &mut replaced);
        vec![obligation.derive(obligation.hypotheses.clone(), goal)]
    }
}

/// Append the conjuncts of `term`, skipping `true` and duplicates
fn push_conjuncts(term: Term, out: &mut Vec<Term>) {
    match term {
        Term::App { func, args } if func == "and" => {
            for arg in args {
                push_conjuncts(arg, out);
            }
        }
        Term::Bool(true) => {}
        t => {
            if !out.contains(&t) {
                out.push(t);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn flip(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Replace the first equality in a strictly positive position by `false`.
///
/// Only `and`, `or`, `not` and `=>` carry polarity. Arguments of any other
/// symbol (`ite`, `=`, `xor`, `distinct`, uninterpreted functions) are left
/// alone. The result always implies the input.
fn replace_first_equality(term: &Term, polarity: Polarity, replaced: &mut bool) -> Term {
    let Term::App { func, args } = term else {
        return term.clone();
    };
    if *replaced {
        return term.clone();
    }
    let rebuilt = |args: Vec<Term>| Term::App {
        func: func.clone(),
        args,
    };
    match (func.as_str(), args.as_slice()) {
        ("=", _) if polarity == Polarity::Positive => {
            *replaced = true;
            Term::Bool(false)
        }
        ("and" | "or", _) => rebuilt(
            args.iter()
                .map(|a| replace_first_equality(a, polarity, replaced))
                .collect(),
        ),
        ("not", [inner]) => rebuilt(vec![replace_first_equality(inner, polarity.flip(), replaced)]),
        ("=>", [premise, conclusion]) => {
            let premise = replace_first_equality(premise, polarity.flip(), replaced);
            let conclusion = replace_first_equality(conclusion, polarity, replaced);
            rebuilt(vec![premise, conclusion])
        }
        _ => term.clone(),
    }
}

fn int_args(args: &[Term]) -> Option<Vec<i64>> {
    args.iter()
        .map(|a| match a {
            Term::Int(n) => Some(*n),
            _ => None,
        })
        .collect()
}

fn fold_node(term: Term) -> Term {
    let (func, args) = match term {
        Term::App { func, args } => (func, args),
        other => return other,
    };

    match (func.as_str(), args.as_slice()) {
        ("and", _) => {
            let mut kept = Vec::new();
            for arg in args {
                match arg {
                    Term::Bool(false) => return Term::Bool(false),
                    Term::Bool(true) => {}
                    Term::App { func, args } if func == "and" => {
                        kept.extend(args.into_iter().filter(|a| !a.is_true()))
                    }
                    t => kept.push(t),
                }
            }
            let mut unique: Vec<Term> = Vec::new();
            for t in kept {
                if !unique.contains(&t) {
                    unique.push(t);
                }
            }
            match unique.len() {
                0 => Term::Bool(true),
                1 => unique.remove(0),
                _ => Term::and(unique),
            }
        }
        ("or", _) => {
            let mut kept = Vec::new();
            for arg in args {
                match arg {
                    Term::Bool(true) => return Term::Bool(true),
                    Term::Bool(false) => {}
                    t => {
                        if !kept.contains(&t) {
                            kept.push(t);
                        }
                    }
                }
            }
            match kept.len() {
                0 => Term::Bool(false),
                1 => kept.remove(0),
                _ => Term::app("or", kept),
            }
        }
        ("not", [Term::Bool(b)]) => Term::Bool(!b),
        ("not", [Term::App { func, args: inner }]) if func == "not" && inner.len() == 1 => {
            inner[0].clone()
        }
        ("=>", [lhs, rhs]) => {
            if lhs.is_false() || rhs.is_true() || lhs == rhs {
                Term::Bool(true)
            } else if lhs.is_true() {
                rhs.clone()
            } else if rhs.is_false() {
                fold_node(Term::not(lhs.clone()))
            } else {
                Term::App { func, args }
            }
        }
        ("=", [lhs, rhs]) if lhs == rhs => Term::Bool(true),
        ("=", [Term::Int(a), Term::Int(b)]) => Term::Bool(a == b),
        ("=", [Term::Bool(a), Term::Bool(b)]) => Term::Bool(a == b),
        ("distinct", [Term::Int(a), Term::Int(b)]) => Term::Bool(a != b),
        ("<", [Term::Int(a), Term::Int(b)]) => Term::Bool(a < b),
        ("<=", [Term::Int(a), Term::Int(b)]) => Term::Bool(a <= b),
        (">", [Term::Int(a), Term::Int(b)]) => Term::Bool(a > b),
        (">=", [Term::Int(a), Term::Int(b)]) => Term::Bool(a >= b),
        ("<=", [lhs, rhs]) | (">=", [lhs, rhs]) if lhs == rhs => Term::Bool(true),
        ("<", [lhs, rhs]) | (">", [lhs, rhs]) if lhs == rhs => Term::Bool(false),
        ("ite", [Term::Bool(c), then, other]) => {
            if *c {
                then.clone()
            } else {
                other.clone()
            }
        }
        ("ite", [_, then, other]) if then == other => then.clone(),
        ("+" | "-" | "*", _) if !args.is_empty() => match int_args(&args) {
            Some(values) => {
                let folded = match func.as_str() {
                    "+" => values.iter().try_fold(0i64, |acc, v| acc.checked_add(*v)),
                    "*" => values.iter().try_fold(1i64, |acc, v| acc.checked_mul(*v)),
                    _ if values.len() == 1 => values[0].checked_neg(),
                    _ => values[1..]
                        .iter()
                        .try_fold(values[0], |acc, v| acc.checked_sub(*v)),
                };
                folded.map(Term::Int).unwrap_or(Term::App { func, args })
            }
            None => Term::App { func, args },
        },
        _ => Term::App { func, args },
    }
}
