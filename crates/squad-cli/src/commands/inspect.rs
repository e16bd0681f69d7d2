use crate::cli::InspectArgs;
use crate::error::Result;
use crate::input;
use squadopt::core::models::request::OptimizationRequest;
use squadopt::engine::builder::{self, SquadModel};
use squadopt::engine::roster::ResolvedRoster;
use tracing::info;

pub async fn run(args: InspectArgs) -> Result<()> {
    let request_file = input::load_request(&args.request)?;
    let capabilities = input::load_capabilities(&args.capabilities)?;
    let request = request_file.request;

    if request.players.is_empty() {
        println!("The request has no players; nothing to model.");
        return Ok(());
    }

    info!("Resolving roster and building the model...");
    let roster = ResolvedRoster::resolve(&request, &capabilities);
    let squad = builder::build(&request, &roster);
    if let Err(e) = squad.model.validate() {
        println!("⚠ Model failed validation: {}", e);
    }

    for line in describe(&request, &roster, &squad) {
        println!("{}", line);
    }
    Ok(())
}

/// Size and structure of a built model, one line per fact.
pub fn describe(request: &OptimizationRequest, roster: &ResolvedRoster, squad: &SquadModel) -> Vec<String> {
    let ad_hoc = roster.builds.iter().filter(|b| !b.in_catalogue).count();
    let mut lines = vec![
        format!("Mode:        {}", request.mode),
        format!(
            "Players:     {} ({} substituted)",
            roster.player_count(),
            roster.substituted_players().len()
        ),
        format!(
            "Builds:      {} resolved, {} in use, {} outside the catalogue",
            roster.builds.len(),
            roster.used_builds().len(),
            ad_hoc
        ),
        format!("Groups:      {}", squad.group_count),
        format!("Variables:   {}", squad.model.num_variables()),
        format!("Constraints: {}", squad.model.num_constraints()),
        format!(
            "Synergies:   {} pair(s), {} linked in the model",
            roster.synergies.len(),
            squad.synergy_links
        ),
    ];

    for pair in &roster.synergies {
        lines.push(format!(
            "  {} + {} (x{:.2})",
            roster.builds[pair.build_a].id, roster.builds[pair.build_b].id, pair.multiplier
        ));
    }

    let active_terms = request
        .weights
        .iter()
        .filter(|(_, w)| *w != 0.0)
        .map(|(term, w)| format!("{}={}", term, w))
        .collect::<Vec<_>>();
    lines.push(format!(
        "Weights:     {}",
        if active_terms.is_empty() {
            "(none)".to_string()
        } else {
            active_terms.join(", ")
        }
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadopt::core::capability::{Boon, CapabilityVector};
    use squadopt::core::models::build::BuildTemplate;
    use squadopt::core::models::mode::GameMode;
    use squadopt::core::models::objective::{ObjectiveTerm, ObjectiveWeights};
    use squadopt::core::models::player::Player;

    fn provider(_: &BuildTemplate, _: GameMode) -> CapabilityVector {
        CapabilityVector::default()
    }

    #[test]
    fn describe_reports_counts_and_synergies() {
        let request = OptimizationRequest::new(
            vec![
                Player::new("ana").with_eligible(["quickbrand", "alacren"]),
                Player::new("ben").with_eligible(["alacren", "homebrew"]),
                Player::new("cid"),
            ],
            vec![
                BuildTemplate::new("quickbrand", "Firebrand"),
                BuildTemplate::new("alacren", "Renegade"),
            ],
        )
        .with_weights(
            ObjectiveWeights::new()
                .with(ObjectiveTerm::Boon(Boon::Quickness), 1.0)
                .with(ObjectiveTerm::Synergy, 0.0),
        );
        let roster = ResolvedRoster::resolve(&request, &provider);
        let squad = builder::build(&request, &roster);

        let lines = describe(&request, &roster, &squad);
        assert_eq!(lines[0], "Mode:        raid");
        assert_eq!(lines[1], "Players:     3 (1 substituted)");
        assert!(lines[2].ends_with("1 outside the catalogue"));
        assert_eq!(lines[3], "Groups:      1");
        assert_eq!(
            lines[5],
            format!("Constraints: {}", squad.model.num_constraints())
        );
        assert!(lines.iter().any(|l| l == "  quickbrand + alacren (x1.00)"));
        assert_eq!(lines.last().unwrap(), "Weights:     quickness=1");
    }
}
