//! A small, solver-agnostic integer model.
//!
//! Variables have bounded integer domains (booleans are `[0, 1]`), constraints are linear
//! ranges `lo <= Σ aᵢ·vᵢ + k <= hi`, and the objective is a linear expression to maximize.
//! Exactly-one groups mark the model's decision variables; solvers are free to treat
//! every other variable as derived.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub lo: i64,
    pub hi: i64,
}

impl Variable {
    pub fn is_bool(&self) -> bool {
        self.lo == 0 && self.hi == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self::weighted_sum(vars.into_iter().map(|v| (v, 1)))
    }

    pub fn weighted_sum<I: IntoIterator<Item = (VarId, i64)>>(terms: I) -> Self {
        let mut expr = Self::new();
        for (var, coef) in terms {
            expr.add_term(var, coef);
        }
        expr
    }

    pub fn term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    pub fn plus(mut self, other: LinearExpr) -> Self {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }

    pub fn with_constant(mut self, constant: i64) -> Self {
        self.constant += constant;
        self
    }

    pub fn add_term(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.terms.push((var, coef));
        }
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn constant(&self) -> i64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(v, c)| acc.saturating_add(c.saturating_mul(values[v.0])))
    }

    /// Merges repeated variables and drops zero coefficients, keeping first-seen order.
    fn normalized(self) -> Self {
        let mut merged: Vec<(VarId, i64)> = Vec::with_capacity(self.terms.len());
        let mut position: HashMap<VarId, usize> = HashMap::with_capacity(self.terms.len());
        for (var, coef) in self.terms {
            match position.get(&var) {
                Some(&at) => merged[at].1 += coef,
                None => {
                    position.insert(var, merged.len());
                    merged.push((var, coef));
                }
            }
        }
        merged.retain(|(_, c)| *c != 0);
        Self {
            terms: merged,
            constant: self.constant,
        }
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::new().term(var, 1)
    }
}

/// `lo <= expr <= hi`. Open sides use `i64::MIN` / `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub lo: i64,
    pub hi: i64,
}

impl LinearConstraint {
    /// Distance of the current activity from the allowed range; `0` when satisfied.
    pub fn violation(&self, values: &[i64]) -> i64 {
        let activity = self.expr.evaluate(values);
        if activity < self.lo {
            self.lo.saturating_sub(activity)
        } else if activity > self.hi {
            activity.saturating_sub(self.hi)
        } else {
            0
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Variable '{name}' has an empty domain [{lo}, {hi}]")]
    EmptyDomain { name: String, lo: i64, hi: i64 },

    #[error("Constraint #{index} has an empty range [{lo}, {hi}]")]
    EmptyRange { index: usize, lo: i64, hi: i64 },

    #[error("Reference to unknown variable index {0}")]
    UnknownVariable(usize),

    #[error("Exactly-one group #{0} is empty")]
    EmptyGroup(usize),

    #[error("Exactly-one group #{group} contains non-boolean variable '{name}'")]
    NonBooleanGroupMember { group: usize, name: String },

    #[error("Variable '{0}' belongs to more than one exactly-one group")]
    OverlappingGroups(String),
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<LinearConstraint>,
    exactly_one: Vec<Vec<VarId>>,
    objective: LinearExpr,
    hints: Vec<(VarId, i64)>,
}

impl Model {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.new_int_var(0, 1, name)
    }

    pub fn new_int_var(&mut self, lo: i64, hi: i64, name: impl Into<String>) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            lo,
            hi,
        });
        id
    }

    pub fn add_linear(&mut self, expr: LinearExpr, lo: i64, hi: i64) -> usize {
        self.constraints.push(LinearConstraint {
            expr: expr.normalized(),
            lo,
            hi,
        });
        self.constraints.len() - 1
    }

    pub fn add_le(&mut self, expr: LinearExpr, rhs: i64) -> usize {
        self.add_linear(expr, i64::MIN, rhs)
    }

    pub fn add_ge(&mut self, expr: LinearExpr, rhs: i64) -> usize {
        self.add_linear(expr, rhs, i64::MAX)
    }

    pub fn add_eq(&mut self, expr: LinearExpr, rhs: i64) -> usize {
        self.add_linear(expr, rhs, rhs)
    }

    /// Exactly one of `vars` is true. Members become the model's decision variables.
    pub fn add_exactly_one(&mut self, vars: Vec<VarId>) {
        self.add_eq(LinearExpr::sum(vars.iter().copied()), 1);
        self.exactly_one.push(vars);
    }

    /// `target <=> a AND b`, linearized as `target <= a`, `target <= b`, `target >= a + b - 1`.
    pub fn add_and_link(&mut self, target: VarId, a: VarId, b: VarId) {
        self.add_le(LinearExpr::from(target).term(a, -1), 0);
        self.add_le(LinearExpr::from(target).term(b, -1), 0);
        self.add_ge(LinearExpr::from(target).term(a, -1).term(b, -1), -1);
    }

    pub fn maximize(&mut self, objective: LinearExpr) {
        self.objective = objective.normalized();
    }

    pub fn add_hint(&mut self, var: VarId, value: i64) {
        self.hints.push((var, value));
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> &Variable {
        &self.variables[var.0]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn exactly_one_groups(&self) -> &[Vec<VarId>] {
        &self.exactly_one
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn hints(&self) -> &[(VarId, i64)] {
        &self.hints
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.variables.len();
        let check = |v: VarId| {
            if v.0 < n {
                Ok(())
            } else {
                Err(ModelError::UnknownVariable(v.0))
            }
        };

        for var in &self.variables {
            if var.lo > var.hi {
                return Err(ModelError::EmptyDomain {
                    name: var.name.clone(),
                    lo: var.lo,
                    hi: var.hi,
                });
            }
        }

        for (index, c) in self.constraints.iter().enumerate() {
            if c.lo > c.hi {
                return Err(ModelError::EmptyRange {
                    index,
                    lo: c.lo,
                    hi: c.hi,
                });
            }
            c.expr.terms().iter().try_for_each(|(v, _)| check(*v))?;
        }

        self.objective
            .terms()
            .iter()
            .try_for_each(|(v, _)| check(*v))?;
        self.hints.iter().try_for_each(|(v, _)| check(*v))?;

        let mut seen = HashSet::new();
        for (group, vars) in self.exactly_one.iter().enumerate() {
            if vars.is_empty() {
                return Err(ModelError::EmptyGroup(group));
            }
            for &v in vars {
                check(v)?;
                let var = &self.variables[v.0];
                if !var.is_bool() {
                    return Err(ModelError::NonBooleanGroupMember {
                        group,
                        name: var.name.clone(),
                    });
                }
                if !seen.insert(v) {
                    return Err(ModelError::OverlappingGroups(var.name.clone()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_normalize_repeated_terms() {
        let mut model = Model::new("t");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let idx = model.add_le(LinearExpr::from(a).term(b, 2).term(a, -1), 1);
        assert_eq!(model.constraints()[idx].expr.terms(), &[(b, 2)]);
    }

    #[test]
    fn constraint_violation_measures_distance() {
        let mut model = Model::new("t");
        let a = model.new_int_var(0, 10, "a");
        model.add_linear(LinearExpr::from(a).with_constant(1), 3, 5);
        let c = &model.constraints()[0];
        assert_eq!(c.violation(&[0]), 2);
        assert_eq!(c.violation(&[3]), 0);
        assert_eq!(c.violation(&[9]), 5);
    }

    #[test]
    fn evaluation_saturates_instead_of_overflowing() {
        let mut model = Model::new("t");
        let a = model.new_int_var(0, 1_000_000, "a");
        let b = model.new_int_var(0, 1_000_000, "b");
        let expr = LinearExpr::new().term(a, i64::MAX / 2).term(b, i64::MAX / 2);
        assert_eq!(expr.evaluate(&[1_000, 1_000]), i64::MAX);

        let negative = LinearExpr::new().term(a, i64::MIN / 2);
        assert_eq!(negative.evaluate(&[4, 0]), i64::MIN);
    }

    #[test]
    fn and_link_adds_three_inequalities() {
        let mut model = Model::new("t");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let z = model.new_bool_var("z");
        model.add_and_link(z, a, b);
        assert_eq!(model.num_constraints(), 3);

        let satisfied = |values: &[i64]| {
            model
                .constraints()
                .iter()
                .all(|c| c.violation(values) == 0)
        };
        assert!(satisfied(&[1, 1, 1]));
        assert!(satisfied(&[1, 0, 0]));
        assert!(!satisfied(&[1, 1, 0]));
        assert!(!satisfied(&[0, 1, 1]));
    }

    #[test]
    fn validate_rejects_malformed_models() {
        let mut model = Model::new("t");
        let a = model.new_int_var(0, 3, "a");
        model.add_exactly_one(vec![a]);
        assert!(matches!(
            model.validate(),
            Err(ModelError::NonBooleanGroupMember { .. })
        ));

        let mut model = Model::new("t");
        let a = model.new_bool_var("a");
        model.add_exactly_one(vec![a]);
        model.add_exactly_one(vec![a]);
        assert!(matches!(
            model.validate(),
            Err(ModelError::OverlappingGroups(_))
        ));

        let mut model = Model::new("t");
        model.new_int_var(2, 1, "broken");
        assert!(matches!(model.validate(), Err(ModelError::EmptyDomain { .. })));

        let mut model = Model::new("t");
        model.add_exactly_one(vec![]);
        assert!(matches!(model.validate(), Err(ModelError::EmptyGroup(0))));
    }

    #[test]
    fn validate_rejects_foreign_variables() {
        let mut other = Model::new("other");
        other.new_bool_var("x");
        let foreign = other.new_bool_var("y");

        let mut model = Model::new("t");
        model.new_bool_var("only");
        model.maximize(LinearExpr::from(foreign));
        assert_eq!(model.validate(), Err(ModelError::UnknownVariable(1)));
    }
}
