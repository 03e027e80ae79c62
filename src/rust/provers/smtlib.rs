// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SMT-LIB 2 rendering of obligations
//!
//! An obligation is valid iff its hypotheses together with the negated goal
//! are unsatisfiable. Symbols are declared with inferred sorts: anything in
//! a boolean position is `Bool`, everything else defaults to `Int`.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::core::{Obligation, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Bool,
    Int,
}

impl Sort {
    fn name(self) -> &'static str {
        match self {
            Sort::Bool => "Bool",
            Sort::Int => "Int",
        }
    }
}

const BOOL_CONNECTIVES: &[&str] = &["and", "or", "not", "=>", "xor"];
const COMPARISONS: &[&str] = &["<", "<=", ">", ">="];
const ARITHMETIC: &[&str] = &["+", "-", "*", "div", "mod", "abs"];
const POLYMORPHIC: &[&str] = &["=", "distinct"];

/// Whether `func` is interpreted by the solver
pub fn is_interpreted(func: &str) -> bool {
    BOOL_CONNECTIVES.contains(&func)
        || COMPARISONS.contains(&func)
        || ARITHMETIC.contains(&func)
        || POLYMORPHIC.contains(&func)
        || func == "ite"
}

/// Declared signature of an uninterpreted symbol
#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    args: Vec<Sort>,
    result: Sort,
}

#[derive(Debug, Default)]
struct SortInference {
    symbols: BTreeMap<String, Declaration>,
}

impl SortInference {
    /// Sort a term has regardless of context, if determined syntactically
    fn natural_sort(&self, term: &Term) -> Option<Sort> {
        match term {
            Term::Bool(_) => Some(Sort::Bool),
            Term::Int(_) => Some(Sort::Int),
            Term::Var(name) => self.symbols.get(name).map(|d| d.result),
            Term::App { func, args } => {
                let f = func.as_str();
                if BOOL_CONNECTIVES.contains(&f) || COMPARISONS.contains(&f) || POLYMORPHIC.contains(&f) {
                    Some(Sort::Bool)
                } else if ARITHMETIC.contains(&f) {
                    Some(Sort::Int)
                } else if f == "ite" {
                    args.get(1).and_then(|a| self.natural_sort(a))
                } else {
                    self.symbols.get(func).map(|d| d.result)
                }
            }
        }
    }

    fn declare(&mut self, name: &str, args: Vec<Sort>, result: Sort) {
        // first inference wins
        self.symbols
            .entry(name.to_string())
            .or_insert(Declaration { args, result });
    }

    fn infer(&mut self, term: &Term, expected: Sort) {
        match term {
            Term::Bool(_) | Term::Int(_) => {}
            Term::Var(name) => self.declare(name, vec![], expected),
            Term::App { func, args } => {
                let f = func.as_str();
                if BOOL_CONNECTIVES.contains(&f) {
                    args.iter().for_each(|a| self.infer(a, Sort::Bool));
                } else if COMPARISONS.contains(&f) || ARITHMETIC.contains(&f) {
                    args.iter().for_each(|a| self.infer(a, Sort::Int));
                } else if POLYMORPHIC.contains(&f) {
                    let operand = args
                        .iter()
                        .find_map(|a| self.natural_sort(a))
                        .unwrap_or(Sort::Int);
                    args.iter().for_each(|a| self.infer(a, operand));
                } else if f == "ite" {
                    if let [cond, then, other] = args.as_slice() {
                        self.infer(cond, Sort::Bool);
                        self.infer(then, expected);
                        self.infer(other, expected);
                    }
                } else {
                    let arg_sorts: Vec<Sort> = args
                        .iter()
                        .map(|a| self.natural_sort(a).unwrap_or(Sort::Int))
                        .collect();
                    for (arg, sort) in args.iter().zip(&arg_sorts) {
                        self.infer(arg, *sort);
                    }
                    self.declare(func, arg_sorts, expected);
                }
            }
        }
    }
}

/// Quote a symbol unless it is a plain SMT-LIB simple symbol
pub fn symbol(name: &str) -> String {
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "~!@$%^&*_-+=<>.?/".contains(c));
    if simple {
        name.to_string()
    } else {
        format!("|{}|", name.replace('|', "_"))
    }
}

fn write_term(out: &mut String, term: &Term) {
    match term {
        Term::Var(name) => out.push_str(&symbol(name)),
        Term::Int(n) if *n < 0 => {
            let _ = write!(out, "(- {})", n.unsigned_abs());
        }
        Term::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Term::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Term::App { func, args } if args.is_empty() => out.push_str(&symbol(func)),
        Term::App { func, args } => {
            out.push('(');
            if is_interpreted(func) {
                out.push_str(func);
            } else {
                out.push_str(&symbol(func));
            }
            for arg in args {
                out.push(' ');
                write_term(out, arg);
            }
            out.push(')');
        }
    }
}

/// Render a single term in SMT-LIB syntax
pub fn render_term(term: &Term) -> String {
    let mut out = String::new();
    write_term(&mut out, term);
    out
}

/// Render an obligation as a complete SMT-LIB 2 script
pub fn render_obligation(obligation: &Obligation) -> String {
    let mut inference = SortInference::default();
    for hyp in &obligation.hypotheses {
        inference.infer(hyp, Sort::Bool);
    }
    inference.infer(&obligation.goal, Sort::Bool);

    let mut out = String::new();
    if !obligation.name.is_empty() {
        let _ = writeln!(out, "; {}", obligation.name.replace('\n', " "));
    }
    out.push_str("(set-logic ALL)\n");
    for (name, decl) in &inference.symbols {
        let args: Vec<&str> = decl.args.iter().map(|s| s.name()).collect();
        let _ = writeln!(
            out,
            "(declare-fun {} ({}) {})",
            symbol(name),
            args.join(" "),
            decl.result.name()
        );
    }
    for hyp in &obligation.hypotheses {
        let _ = writeln!(out, "(assert {})", render_term(hyp));
    }
    let _ = writeln!(out, "(assert (not {}))", render_term(&obligation.goal));
    out.push_str("(check-sat)\n(exit)\n");
    out
}

/// Answer line of an SMT-LIB `check-sat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtAnswer {
    Sat,
    Unsat,
    Unknown,
    Timeout,
}

/// First line of `output` that is a bare check-sat answer
pub fn smt_answer(output: &str) -> Option<SmtAnswer> {
    output.lines().find_map(|line| match line.trim() {
        "unsat" => Some(SmtAnswer::Unsat),
        "sat" => Some(SmtAnswer::Sat),
        "unknown" => Some(SmtAnswer::Unknown),
        "timeout" => Some(SmtAnswer::Timeout),
        _ => None,
    })
}
