//! Translates a resolved roster into the squad optimization model.
//!
//! Everything is integral: capability values and weights are multiplied by
//! [`SCALE`] and rounded before they reach the model. Variables are created in
//! dependency order (decisions, links, aggregates, then penalties and bonuses) so
//! that every auxiliary variable is defined by constraints over earlier ones.

use super::model::{LinearExpr, Model, VarId};
use super::roster::{GROUP_CAPACITY, ResolvedRoster};
use crate::core::capability::{Boon, CapabilityVector};
use crate::core::models::objective::{ObjectiveTerm, ObjectiveWeights, SCALE};
use crate::core::models::request::OptimizationRequest;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Upper bound of the unsaturated might sum: five players at 25 stacks each.
const MIGHT_RAW_BOUND: i64 = 125 * SCALE;
/// Might counts for at most 25 stacks per group.
const MIGHT_CAP: i64 = 25 * SCALE;
const DPS_BOUND: i64 = 5 * SCALE;
const SUSTAIN_BOUND: i64 = 5 * SCALE;
const UPTIME_BOUND: i64 = GROUP_CAPACITY as i64 * SCALE;

/// Aggregation variables of one sub-group.
#[derive(Debug, Clone)]
pub struct GroupVars {
    /// Unsaturated boon sums, `u[k, boon]`.
    pub uptime: BTreeMap<Boon, VarId>,
    /// Saturated boon sums, `c[k, boon]`; only present for boons with a non-zero weight.
    pub saturated: BTreeMap<Boon, VarId>,
    pub might: VarId,
    pub dps: VarId,
    pub sustain: VarId,
}

#[derive(Debug, Clone)]
pub struct SquadModel {
    pub model: Model,
    pub group_count: usize,
    /// `x[i, j]`, parallel to each player's candidate list.
    pub build_vars: Vec<Vec<VarId>>,
    /// `g[i, k]`.
    pub group_vars: Vec<Vec<VarId>>,
    pub groups: Vec<GroupVars>,
    /// Saturation cap per boon, in model units.
    pub caps: BTreeMap<Boon, i64>,
    pub synergy_links: usize,
}

fn scaled(value: f64) -> i64 {
    (value * SCALE as f64).round() as i64
}

fn boon_coef(capability: &CapabilityVector, boon: Boon) -> i64 {
    scaled(capability.boon(boon))
}

#[instrument(skip_all, name = "model_builder", fields(players = roster.player_count(), groups = roster.group_count))]
pub fn build(request: &OptimizationRequest, roster: &ResolvedRoster) -> SquadModel {
    let weights = &request.weights;
    let n = roster.player_count();
    let k_count = roster.group_count;
    let mut model = Model::new("squad_composition");
    let mut objective = LinearExpr::new();

    // Decisions: one build and one group per player.
    let mut build_vars = Vec::with_capacity(n);
    let mut group_vars = Vec::with_capacity(n);
    for player in &roster.players {
        let xs: Vec<VarId> = player
            .candidates
            .iter()
            .map(|&j| model.new_bool_var(format!("x[{},{}]", player.id, roster.builds[j].id)))
            .collect();
        model.add_exactly_one(xs.clone());
        let gs: Vec<VarId> = (0..k_count)
            .map(|k| model.new_bool_var(format!("g[{},{}]", player.id, k)))
            .collect();
        model.add_exactly_one(gs.clone());
        build_vars.push(xs);
        group_vars.push(gs);
    }

    for k in 0..k_count {
        model.add_le(
            LinearExpr::sum(group_vars.iter().map(|gs| gs[k])),
            GROUP_CAPACITY as i64,
        );
    }

    // z[i][c][k]: player i plays its c-th candidate in group k.
    let mut z: Vec<Vec<Vec<VarId>>> = Vec::with_capacity(n);
    for (i, player) in roster.players.iter().enumerate() {
        let mut per_candidate = Vec::with_capacity(player.candidates.len());
        for (c, &x) in build_vars[i].iter().enumerate() {
            let mut per_group = Vec::with_capacity(k_count);
            for (k, &g) in group_vars[i].iter().enumerate() {
                let var = model.new_bool_var(format!("z[{},{},{}]", player.id, c, k));
                model.add_and_link(var, x, g);
                per_group.push(var);
            }
            per_candidate.push(per_group);
        }
        z.push(per_candidate);
    }

    // Sum of `coef(capability)` over the members of group k.
    let group_sum = |k: usize, coef: &dyn Fn(&CapabilityVector) -> i64| -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (i, player) in roster.players.iter().enumerate() {
            for (c, &j) in player.candidates.iter().enumerate() {
                expr.add_term(z[i][c][k], coef(&roster.builds[j].capability));
            }
        }
        expr
    };

    let caps: BTreeMap<Boon, i64> = Boon::ALL.iter().map(|&b| (b, request.targets.cap(b))).collect();
    let mut groups = Vec::with_capacity(k_count);
    for k in 0..k_count {
        let mut uptime = BTreeMap::new();
        let mut saturated = BTreeMap::new();
        for &boon in Boon::ALL.iter() {
            let u = model.new_int_var(0, UPTIME_BOUND, format!("u[{k},{boon}]"));
            define_sum(&mut model, u, group_sum(k, &|cap: &CapabilityVector| boon_coef(cap, boon)));
            uptime.insert(boon, u);

            let weight = weights.scaled(ObjectiveTerm::Boon(boon));
            if weight != 0 {
                let c = model.new_int_var(0, caps[&boon], format!("c[{k},{boon}]"));
                model.add_le(LinearExpr::from(c).term(u, -1), 0);
                objective.add_term(c, weight);
                saturated.insert(boon, c);
            }
        }

        let might_raw = model.new_int_var(0, MIGHT_RAW_BOUND, format!("might_raw[{k}]"));
        define_sum(&mut model, might_raw, group_sum(k, &|cap: &CapabilityVector| scaled(cap.might)));
        let might = model.new_int_var(0, MIGHT_CAP, format!("might_sum[{k}]"));
        model.add_le(LinearExpr::from(might).term(might_raw, -1), 0);
        objective.add_term(might, weights.scaled(ObjectiveTerm::Might));

        let dps = model.new_int_var(0, DPS_BOUND, format!("dps_sum[{k}]"));
        define_sum(&mut model, dps, group_sum(k, &|cap: &CapabilityVector| scaled(cap.damage)));
        objective.add_term(dps, weights.scaled(ObjectiveTerm::Dps));

        let sustain = model.new_int_var(0, SUSTAIN_BOUND, format!("sustain_sum[{k}]"));
        define_sum(&mut model, sustain, group_sum(k, &|cap: &CapabilityVector| scaled(cap.sustain)));
        objective.add_term(sustain, weights.scaled(ObjectiveTerm::Sustain));

        groups.push(GroupVars {
            uptime,
            saturated,
            might,
            dps,
            sustain,
        });
    }

    let synergy_links = add_diversity_terms(&mut model, &mut objective, roster, &z, weights);

    model.maximize(objective);
    add_fallback_hints(&mut model, &build_vars, &group_vars);

    debug!(
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        synergy_links,
        "Squad model built."
    );

    SquadModel {
        model,
        group_count: k_count,
        build_vars,
        group_vars,
        groups,
        caps,
        synergy_links,
    }
}

/// `target == expr`.
fn define_sum(model: &mut Model, target: VarId, expr: LinearExpr) {
    let mut definition = LinearExpr::from(target);
    for &(var, coef) in expr.terms() {
        definition.add_term(var, -coef);
    }
    model.add_eq(definition, 0);
}

/// Per-group build counts with presence flags, duplicate penalties and synergy
/// bonuses, then the roster-wide duplicate penalty. Returns the number of synergy links.
fn add_diversity_terms(
    model: &mut Model,
    objective: &mut LinearExpr,
    roster: &ResolvedRoster,
    z: &[Vec<Vec<VarId>>],
    weights: &ObjectiveWeights,
) -> usize {
    let k_count = roster.group_count;
    let cap = GROUP_CAPACITY as i64;
    let n = roster.player_count() as i64;
    let used = roster.used_builds();
    let diversity = weights.scaled(ObjectiveTerm::DiversityReward);
    let dup_group = weights.scaled(ObjectiveTerm::DupPenaltyGroup);
    let dup_global = weights.scaled(ObjectiveTerm::DupPenaltyGlobal);
    let synergy = weights.scaled(ObjectiveTerm::Synergy) as f64;

    let pairs: Vec<_> = roster
        .synergies
        .iter()
        .filter(|p| used.binary_search(&p.build_a).is_ok() && used.binary_search(&p.build_b).is_ok())
        .collect();

    let mut counts: Vec<Vec<VarId>> = Vec::with_capacity(k_count);
    let mut links = 0;
    for k in 0..k_count {
        let mut present = BTreeMap::new();
        let mut per_build = Vec::with_capacity(used.len());
        for &j in &used {
            let build = &roster.builds[j].id;
            let s = model.new_int_var(0, cap, format!("s[{k},{build}]"));
            let mut members = LinearExpr::new();
            for (i, player) in roster.players.iter().enumerate() {
                if let Some(c) = player.candidates.iter().position(|&b| b == j) {
                    members.add_term(z[i][c][k], 1);
                }
            }
            define_sum(model, s, members);

            let p = model.new_bool_var(format!("present[{k},{build}]"));
            model.add_ge(LinearExpr::from(s).term(p, -1), 0);
            model.add_le(LinearExpr::from(s).term(p, -cap), 0);
            objective.add_term(p, diversity);

            let extra = model.new_int_var(0, cap, format!("extra_group[{k},{build}]"));
            model.add_ge(LinearExpr::from(extra).term(s, -1), -1);
            objective.add_term(extra, -dup_group);

            present.insert(j, p);
            per_build.push(s);
        }

        for pair in &pairs {
            let bonus = (pair.multiplier * synergy).round() as i64;
            let linked = model.new_bool_var(format!(
                "pair_present[{k},{},{}]",
                roster.builds[pair.build_a].id, roster.builds[pair.build_b].id
            ));
            model.add_and_link(linked, present[&pair.build_a], present[&pair.build_b]);
            objective.add_term(linked, bonus);
            links += 1;
        }
        counts.push(per_build);
    }

    for (idx, &j) in used.iter().enumerate() {
        let build = &roster.builds[j].id;
        let total = model.new_int_var(0, n, format!("S[{build}]"));
        define_sum(model, total, LinearExpr::sum(counts.iter().map(|per_build| per_build[idx])));
        let extra = model.new_int_var(0, n, format!("extra_global[{build}]"));
        model.add_ge(LinearExpr::from(extra).term(total, -1), -(k_count as i64));
        objective.add_term(extra, -dup_global);
    }

    links
}

/// Seeds the search with the deterministic fallback: first candidate, round-robin group.
fn add_fallback_hints(model: &mut Model, build_vars: &[Vec<VarId>], group_vars: &[Vec<VarId>]) {
    for (i, (xs, gs)) in build_vars.iter().zip(group_vars).enumerate() {
        model.add_hint(xs[0], 1);
        model.add_hint(gs[i % gs.len()], 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::build::BuildTemplate;
    use crate::core::models::mode::GameMode;
    use crate::core::models::objective::BoonTargets;
    use crate::core::models::player::Player;

    fn provider(build: &BuildTemplate, _mode: GameMode) -> CapabilityVector {
        match build.id.as_str() {
            "quickbrand" => CapabilityVector::default().with_boon(Boon::Quickness, 0.8),
            "alacren" => CapabilityVector::default().with_boon(Boon::Alacrity, 0.9),
            _ => CapabilityVector::default(),
        }
    }

    fn request(players: usize, weights: ObjectiveWeights) -> OptimizationRequest {
        let roster = (0..players)
            .map(|i| Player::new(format!("p{i}")).with_eligible(["quickbrand", "alacren"]))
            .collect();
        OptimizationRequest::new(
            roster,
            vec![
                BuildTemplate::new("quickbrand", "Firebrand"),
                BuildTemplate::new("alacren", "Renegade"),
            ],
        )
        .with_weights(weights)
    }

    fn built(req: &OptimizationRequest) -> (ResolvedRoster, SquadModel) {
        let roster = ResolvedRoster::resolve(req, &provider);
        let squad = build(req, &roster);
        (roster, squad)
    }

    #[test]
    fn decision_groups_cover_builds_and_groups() {
        let req = request(7, ObjectiveWeights::new());
        let (_, squad) = built(&req);

        assert_eq!(squad.group_count, 2);
        assert_eq!(squad.build_vars.len(), 7);
        assert!(squad.build_vars.iter().all(|xs| xs.len() == 2));
        assert!(squad.group_vars.iter().all(|gs| gs.len() == 2));
        assert_eq!(squad.model.exactly_one_groups().len(), 14);
        assert!(squad.model.validate().is_ok());
    }

    #[test]
    fn saturation_variables_exist_only_for_weighted_boons() {
        let weights = ObjectiveWeights::new().with(ObjectiveTerm::Boon(Boon::Quickness), 1.0);
        let (_, squad) = built(&request(3, weights));

        let group = &squad.groups[0];
        assert_eq!(group.uptime.len(), Boon::ALL.len());
        assert_eq!(group.saturated.keys().copied().collect::<Vec<_>>(), vec![Boon::Quickness]);
    }

    #[test]
    fn stability_cap_never_exceeds_half_uptime() {
        let req = request(1, ObjectiveWeights::new())
            .with_targets(BoonTargets::new().with(Boon::Stability, 1.0).with(Boon::Fury, 0.4));
        let (_, squad) = built(&req);
        assert_eq!(squad.caps[&Boon::Stability], 500);
        assert_eq!(squad.caps[&Boon::Fury], 400);
        assert_eq!(squad.caps[&Boon::Quickness], 1000);
    }

    #[test]
    fn synergy_links_are_created_per_group() {
        let weights = ObjectiveWeights::new().with(ObjectiveTerm::Synergy, 2.0);
        let (roster, squad) = built(&request(6, weights));
        assert_eq!(roster.synergies.len(), 1);
        assert_eq!(squad.synergy_links, 2);

        let bonus = squad
            .model
            .objective()
            .terms()
            .iter()
            .filter(|(v, _)| squad.model.variable(*v).name.starts_with("pair_present"))
            .map(|(_, c)| *c)
            .collect::<Vec<_>>();
        assert_eq!(bonus, vec![2000, 2000]);
    }

    #[test]
    fn hints_encode_the_fallback_assignment() {
        let (_, squad) = built(&request(6, ObjectiveWeights::new()));
        let hints = squad.model.hints();
        assert_eq!(hints.len(), 12);
        assert!(hints.iter().all(|&(_, v)| v == 1));
        assert_eq!(hints[0].0, squad.build_vars[0][0]);
        assert_eq!(hints[1].0, squad.group_vars[0][0]);
        assert_eq!(hints[11].0, squad.group_vars[5][1]);
    }

    #[test]
    fn duplicate_penalties_enter_the_objective_negatively() {
        let weights = ObjectiveWeights::new()
            .with(ObjectiveTerm::DupPenaltyGroup, 0.5)
            .with(ObjectiveTerm::DupPenaltyGlobal, 1.5);
        let (_, squad) = built(&request(2, weights));

        let coef_of = |prefix: &str| {
            squad
                .model
                .objective()
                .terms()
                .iter()
                .filter(|(v, _)| squad.model.variable(*v).name.starts_with(prefix))
                .map(|(_, c)| *c)
                .collect::<Vec<_>>()
        };
        assert_eq!(coef_of("extra_group"), vec![-500, -500]);
        assert_eq!(coef_of("extra_global"), vec![-1500, -1500]);
    }
}
