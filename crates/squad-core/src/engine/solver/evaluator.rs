use crate::engine::model::{LinearConstraint, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Evaluation {
    pub violation: i64,
    pub objective: i64,
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        self.violation == 0
    }

    /// Less violation wins; on equal violation, the higher objective wins.
    pub fn better_than(&self, other: &Evaluation) -> bool {
        self.violation < other.violation
            || (self.violation == other.violation && self.objective > other.objective)
    }
}

/// Completes a partial assignment of decision variables.
///
/// Each constraint is owned by its highest-index variable. Walking variables in index
/// order, a derived variable's owned constraints only mention already-valued variables,
/// so they pin it to an interval; the variable then takes the end of that interval its
/// objective coefficient favours (the lower end when the coefficient is zero). This is
/// exact for models whose auxiliary variables are either functionally determined by
/// their inputs or appear only in the objective, which is how the squad model is built.
pub(crate) struct Evaluator<'m> {
    model: &'m Model,
    is_decision: Vec<bool>,
    owned: Vec<Vec<usize>>,
    unowned: Vec<usize>,
    objective_coef: Vec<i64>,
}

impl<'m> Evaluator<'m> {
    pub fn new(model: &'m Model) -> Self {
        let n = model.num_variables();
        let mut is_decision = vec![false; n];
        for group in model.exactly_one_groups() {
            for v in group {
                is_decision[v.index()] = true;
            }
        }

        let mut owned = vec![Vec::new(); n];
        let mut unowned = Vec::new();
        for (ci, c) in model.constraints().iter().enumerate() {
            match c.expr.terms().iter().map(|(v, _)| v.index()).max() {
                Some(owner) => owned[owner].push(ci),
                None => unowned.push(ci),
            }
        }

        let mut objective_coef = vec![0; n];
        for &(v, c) in model.objective().terms() {
            objective_coef[v.index()] += c;
        }

        Self {
            model,
            is_decision,
            owned,
            unowned,
            objective_coef,
        }
    }

    /// Fills every derived variable in `values` and scores the result.
    /// Decision variables must already hold their intended values.
    pub fn evaluate(&self, values: &mut [i64]) -> Evaluation {
        let constraints = self.model.constraints();
        let mut violation: i64 = 0;

        for (idx, var) in self.model.variables().iter().enumerate() {
            if self.is_decision[idx] {
                for &ci in &self.owned[idx] {
                    violation = violation.saturating_add(constraints[ci].violation(values));
                }
                continue;
            }

            let (mut lo, mut hi) = (var.lo, var.hi);
            for &ci in &self.owned[idx] {
                let (l, h) = implied_bounds(&constraints[ci], idx, values);
                lo = lo.max(l);
                hi = hi.min(h);
            }

            let prefer_high = self.objective_coef[idx] > 0;
            if lo <= hi {
                values[idx] = if prefer_high { hi } else { lo };
            } else {
                violation = violation.saturating_add(lo.saturating_sub(hi));
                let pick = if prefer_high { hi } else { lo };
                values[idx] = pick.clamp(var.lo, var.hi);
            }
        }

        for &ci in &self.unowned {
            violation = violation.saturating_add(constraints[ci].violation(values));
        }

        Evaluation {
            violation,
            objective: self.model.objective().evaluate(values),
        }
    }
}

/// Interval for variable `idx` implied by `constraint`, given values of all other terms.
fn implied_bounds(constraint: &LinearConstraint, idx: usize, values: &[i64]) -> (i64, i64) {
    let mut coef = 0;
    let mut rest = constraint.expr.constant();
    for &(v, c) in constraint.expr.terms() {
        if v.index() == idx {
            coef = c;
        } else {
            rest = rest.saturating_add(c.saturating_mul(values[v.index()]));
        }
    }

    let (mut lo, mut hi) = (i64::MIN, i64::MAX);
    if coef == 0 {
        return (lo, hi);
    }
    if constraint.lo != i64::MIN {
        let t = constraint.lo.saturating_sub(rest);
        if coef > 0 {
            lo = div_ceil(t, coef);
        } else {
            hi = div_floor(t, coef);
        }
    }
    if constraint.hi != i64::MAX {
        let t = constraint.hi.saturating_sub(rest);
        if coef > 0 {
            hi = div_floor(t, coef);
        } else {
            lo = div_ceil(t, coef);
        }
    }
    (lo, hi)
}

fn div_floor(n: i64, d: i64) -> i64 {
    let q = n / d;
    if n % d != 0 && ((n < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(n: i64, d: i64) -> i64 {
    let q = n / d;
    if n % d != 0 && ((n < 0) == (d < 0)) {
        q + 1
    } else {
        q
    }
}
