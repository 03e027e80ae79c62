// SPDX-License-Identifier: PMPL-1.0-or-later

//! Congruence closure over ground equalities
//!
//! Classes are kept in a union-find over every registered subterm. Each
//! pass merges applications whose heads match and whose arguments are
//! already in the same classes, until a pass merges nothing.

use std::collections::HashMap;

use crate::core::Term;

#[derive(Debug, Default)]
pub struct CongruenceClosure {
    terms: Vec<Term>,
    index: HashMap<Term, usize>,
    parent: Vec<usize>,
}

impl CongruenceClosure {
    /// Close `equalities`, registering `extra` so it can be rewritten later
    pub fn new(equalities: &[(Term, Term)], extra: &[&Term]) -> Self {
        let mut cc = CongruenceClosure::default();
        for (lhs, rhs) in equalities {
            cc.register(lhs);
            cc.register(rhs);
        }
        for term in extra {
            cc.register(term);
        }
        for (lhs, rhs) in equalities {
            let (a, b) = (cc.index[lhs], cc.index[rhs]);
            cc.union(a, b);
        }
        cc.propagate();
        cc
    }

    fn register(&mut self, term: &Term) -> usize {
        if let Some(&id) = self.index.get(term) {
            return id;
        }
        if let Term::App { args, .. } = term {
            for arg in args {
                self.register(arg);
            }
        }
        let id = self.terms.len();
        self.terms.push(term.clone());
        self.index.insert(term.clone(), id);
        self.parent.push(id);
        id
    }

    fn find(&self, mut id: usize) -> usize {
        while self.parent[id] != id {
            id = self.parent[id];
        }
        id
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        // keep the smaller term as root so representatives stay small
        let (root, child) = if self.smaller(ra, rb) { (ra, rb) } else { (rb, ra) };
        self.parent[child] = root;
        true
    }

    fn smaller(&self, a: usize, b: usize) -> bool {
        let (ta, tb) = (&self.terms[a], &self.terms[b]);
        (ta.size(), ta) <= (tb.size(), tb)
    }

    fn propagate(&mut self) {
        loop {
            let mut signatures: HashMap<(String, Vec<usize>), usize> = HashMap::new();
            let mut merges = Vec::new();
            for id in 0..self.terms.len() {
                if let Term::App { func, args } = &self.terms[id] {
                    if args.is_empty() {
                        continue;
                    }
                    let key = (
                        func.clone(),
                        args.iter().map(|a| self.find(self.index[a])).collect(),
                    );
                    match signatures.get(&key) {
                        Some(&other) => merges.push((other, id)),
                        None => {
                            signatures.insert(key, id);
                        }
                    }
                }
            }
            let mut changed = false;
            for (a, b) in merges {
                changed |= self.union(a, b);
            }
            if !changed {
                break;
            }
        }
    }

    pub fn equivalent(&self, a: &Term, b: &Term) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&x), Some(&y)) => self.find(x) == self.find(y),
            _ => a == b,
        }
    }

    /// Replace every registered subterm by its class representative
    pub fn rewrite(&self, term: &Term) -> Term {
        if let Some(&id) = self.index.get(term) {
            let rep = &self.terms[self.find(id)];
            if rep != term {
                return self.rewrite_args(rep);
            }
        }
        self.rewrite_args(term)
    }

    fn rewrite_args(&self, term: &Term) -> Term {
        match term {
            Term::App { func, args } => Term::App {
                func: func.clone(),
                args: args.iter().map(|a| self.rewrite(a)).collect(),
            },
            other => other.clone(),
        }
    }
}
