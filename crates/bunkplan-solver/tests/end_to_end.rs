//! End-to-end solver scenarios.

use bunkplan_config::{SettingValue, SolverSettings};
use bunkplan_core::{CamperId, Gender, HardSoftScore};
use bunkplan_scoring::SessionRoster;
use bunkplan_solver::Solver;
use bunkplan_test::{bunk, bunk_with, camper, session};

fn step_limited(mut settings: SolverSettings) -> SolverSettings {
    settings.solver.step_limit = Some(2_000);
    settings
}

#[test]
fn diminishing_returns_flow_through_a_full_solve() {
    // Camper 1 requests three bunkmates at equal weight 2; each of them
    // requests camper 1 back. One bunk fits all four.
    let roster = SessionRoster::new(
        session(1, 2026),
        vec![
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 4, Gender::Female, "9.01"),
            camper(3, 4, Gender::Female, "9.02"),
            camper(4, 4, Gender::Female, "9.03"),
        ],
        vec![bunk(10, 4, Some(Gender::Female), false)],
        vec![
            bunk_with(1, 1, 2, 2),
            bunk_with(2, 1, 3, 2),
            bunk_with(3, 1, 4, 2),
            bunk_with(4, 2, 1, 2),
            bunk_with(5, 3, 1, 2),
            bunk_with(6, 4, 1, 2),
        ],
    );

    let solver = Solver::new(step_limited(SolverSettings::default())).unwrap();
    let result = solver.solve(&roster);

    // Camper 1: 10*2 + 5*2 + 1*2 = 32, never 3 * 10*2.
    // Campers 2-4: 10*2 each.
    assert_eq!(result.solution.score, HardSoftScore::of(0, 32 + 3 * 20));
    assert!(result.proved_optimal);

    let c1 = &result.solution.satisfaction[&CamperId(1)];
    assert_eq!(c1.satisfied.len(), 3);
}

#[test]
fn missing_config_key_falls_back_to_default() {
    // The store omits objective.second_request_multiplier entirely; the
    // solver must run with the documented default rather than fail.
    let settings = SolverSettings::from_entries([
        ("objective.first_request_multiplier", SettingValue::Int(10)),
        ("solver.step_limit", SettingValue::Int(2_000)),
    ])
    .unwrap();
    assert_eq!(settings.objective.second_request_multiplier, 5);

    let roster = SessionRoster::new(
        session(1, 2026),
        vec![
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 4, Gender::Female, "9.01"),
            camper(3, 4, Gender::Female, "9.02"),
        ],
        vec![bunk(10, 4, Some(Gender::Female), false)],
        vec![
            bunk_with(1, 1, 2, 3),
            bunk_with(2, 1, 3, 3),
        ],
    );

    let solver = Solver::new(settings).unwrap();
    let result = solver.solve(&roster);
    assert!(result.feasible());
    // Second satisfied request scaled by the default multiplier 5.
    assert_eq!(result.solution.score, HardSoftScore::of(0, 10 * 3 + 5 * 3));
}

#[test]
fn solution_is_superseded_not_mutated() {
    let roster = SessionRoster::new(
        session(1, 2026),
        vec![
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 4, Gender::Female, "9.01"),
        ],
        vec![bunk(10, 2, Some(Gender::Female), false)],
        vec![bunk_with(1, 1, 2, 5)],
    );

    let solver = Solver::new(step_limited(SolverSettings::default())).unwrap();
    let first = solver.solve(&roster);
    let snapshot = first.solution.clone();
    let second = solver.solve(&roster);

    // The first solution is untouched by the second solve.
    assert_eq!(first.solution, snapshot);
    assert_eq!(second.solution, snapshot);
}
