use pretty_assertions::assert_eq;
use regionbench_core::{
    Address, DeviceFixture, Family, FamilyFixtures, InputData, InsertionMode, MetricsRecorder,
    PrecisionIndex, RegionIndex, RemoteError, ReputationEvent, ReputationManager,
    RunConfiguration, RunError, ScenarioError, ScenarioKind, ScenarioRunner, ScenarioSuite,
};
use regionbench_scenarios::{actions, BenchmarkSuite};
use regionbench_test_utils::{
    columns, in_memory_deployment, read_lines, sample_input_data, InMemoryLedger, BASE_GAS,
    ITEM_GAS,
};
use std::sync::Arc;

const HEADER: &str = "action,attribute,executionCost,confirmationCost,elapsedMillis";

fn confirmation(gas: u64) -> u64 {
    gas - gas / 10
}

/// Split data rows (header skipped) into (action, attribute) pairs
fn actions_of(lines: &[String]) -> Vec<(String, String)> {
    lines[1..]
        .iter()
        .map(|l| {
            let c = columns(l);
            (c[0].to_string(), c[1].to_string())
        })
        .collect()
}

fn pair(action: &str, attribute: &str) -> (String, String) {
    (action.to_string(), attribute.to_string())
}

async fn recorder(dir: &tempfile::TempDir, ledger: &Arc<InMemoryLedger>) -> MetricsRecorder {
    MetricsRecorder::create(dir.path().join("rows.csv"), ledger.clone())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_run_against_in_memory_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(3));
    let config = RunConfiguration::resolve("GeohashCellsRegions", 1, "cells").unwrap();
    let runner = ScenarioRunner::new(
        config,
        dir.path(),
        in_memory_deployment(ledger.clone()),
        sample_input_data(),
    );

    let report = runner.run(&BenchmarkSuite::new()).await.unwrap();

    let rows: Vec<_> = report.outputs.iter().map(|o| o.rows).collect();
    assert_eq!(rows, [3, 4, 2, 3, 4]);

    let mode = read_lines(runner.paths().path(ScenarioKind::RegionRegistration)).await;
    assert!(runner
        .paths()
        .path(ScenarioKind::RegionRegistration)
        .ends_with("experiment-geohashcellsregions-7-cells.csv"));
    let gas = BASE_GAS + 2 * ITEM_GAS;
    for line in &mode[1..] {
        let c = columns(line);
        assert_eq!(c[0], actions::ADD_CELLS);
        assert_eq!(c[2], gas.to_string());
        assert_eq!(c[3], confirmation(gas).to_string());
        assert!(c[4].parse::<u64>().is_ok());
    }
    assert_eq!(ledger.region_cells("harbor").unwrap(), ["u4p00", "u4p01"]);

    let interact = read_lines(runner.paths().path(ScenarioKind::RegionInteraction)).await;
    assert_eq!(
        actions_of(&interact),
        [
            pair("interact", "harbor-market"),
            pair("lookup", "u4p00"),
            pair("lookup", "u4p9"),
            pair("interact", "market-campus"),
        ]
    );
    let lookup = columns(&interact[2]);
    assert_eq!((lookup[2], lookup[3]), ("", ""));
    assert!(!lookup[4].is_empty());

    let owner = ledger.accounts_snapshot()[1].clone();
    assert_eq!(ledger.device_owner("dev-1"), Some(owner));
    assert_eq!(ledger.device_region("dev-2").as_deref(), Some("campus"));
    assert_eq!(ledger.device_location("dev-1").as_deref(), Some("u4p00"));
    assert_eq!(ledger.device_location("dev-2").as_deref(), Some("u4p20"));
}

#[tokio::test]
async fn test_lookups_use_configured_family_cells() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let config = RunConfiguration::resolve("S2CellsRegions", 1, "cells").unwrap();
    let runner = ScenarioRunner::new(
        config,
        dir.path(),
        in_memory_deployment(ledger.clone()),
        sample_input_data(),
    );

    runner.run(&BenchmarkSuite::new()).await.unwrap();

    let interact = read_lines(runner.paths().path(ScenarioKind::RegionInteraction)).await;
    let lookups: Vec<_> = actions_of(&interact)
        .into_iter()
        .filter(|(action, _)| action == actions::LOOKUP)
        .map(|(_, cell)| cell)
        .collect();
    assert_eq!(lookups, ["47a00", "47a9"]);
    assert!(lookups.iter().all(|cell| !cell.starts_with("u4p")));
    assert_eq!(
        ledger.region_of_cell("47a00").await.unwrap().as_deref(),
        Some("harbor")
    );
}

#[tokio::test]
async fn test_empty_fixtures_leave_header_only_files() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let mut input = InputData::default();
    input
        .families
        .insert(Family::GeohashRegions, FamilyFixtures::default());
    let config = RunConfiguration::resolve("GeohashCellsRegions", 0, "cells").unwrap();
    let runner = ScenarioRunner::new(config, dir.path(), in_memory_deployment(ledger.clone()), input);

    let report = runner.run(&BenchmarkSuite::new()).await.unwrap();

    assert_eq!(report.outputs.len(), ScenarioKind::ALL.len());
    assert_eq!(report.total_rows(), 0);
    for output in &report.outputs {
        let lines = read_lines(&output.path).await;
        assert_eq!(lines, [HEADER]);
    }
    assert!(ledger.operations().is_empty());
}

#[tokio::test]
async fn test_tree_variant_skips_cell_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let config = RunConfiguration::resolve("S2TreeRegions", 1, "tree").unwrap();
    let runner = ScenarioRunner::new(
        config,
        dir.path(),
        in_memory_deployment(ledger.clone()),
        sample_input_data(),
    );

    runner.run(&BenchmarkSuite::new()).await.unwrap();

    let mode = read_lines(runner.paths().path(ScenarioKind::RegionRegistration)).await;
    assert!(mode[1..].iter().all(|l| l.starts_with("add-tree,")));
    let interact = read_lines(runner.paths().path(ScenarioKind::RegionInteraction)).await;
    assert_eq!(
        actions_of(&interact),
        [pair("interact", "harbor-market"), pair("interact", "market-campus")]
    );
    assert_eq!(ledger.interaction_count(), 2);
}

#[tokio::test]
async fn test_registration_uses_selected_tier() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let recorder = recorder(&dir, &ledger).await;
    let input = sample_input_data();
    let fixtures = input.family(Family::GeohashRegions).unwrap();

    BenchmarkSuite::new()
        .register_regions(
            &recorder,
            ledger.as_ref(),
            fixtures,
            PrecisionIndex::new(2).unwrap(),
            InsertionMode::Cells,
        )
        .await
        .unwrap();

    assert_eq!(ledger.region_cells("market").unwrap().len(), 3);
    assert_eq!(ledger.operations(), ["regions.addCells"; 3]);
    assert_eq!(recorder.rows_written().await, 3);
}

#[tokio::test]
async fn test_unknown_interaction_region_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let recorder = recorder(&dir, &ledger).await;
    let mut input = sample_input_data();
    input.region_interactions[0].to = "airport".into();
    let fixtures = input.family(Family::GeohashRegions).unwrap();

    let err = BenchmarkSuite::new()
        .interact_regions(
            &recorder,
            ledger.as_ref(),
            fixtures,
            &input.region_interactions,
            PrecisionIndex::new(0).unwrap(),
            true,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScenarioError::Fixture(ref m) if m.contains("airport")));
    assert!(ledger.operations().is_empty());
    assert_eq!(recorder.rows_written().await, 0);
}

#[tokio::test]
async fn test_device_with_unknown_region_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let recorder = recorder(&dir, &ledger).await;
    let mut input = sample_input_data();
    input.devices.devices.push(DeviceFixture {
        id: "dev-9".into(),
        region: "nowhere".into(),
    });
    let fixtures = input.family(Family::S2Regions).unwrap();
    for region in &fixtures.regions {
        ledger
            .add_region_cells(&region.name, region.cells_at(PrecisionIndex::new(0).unwrap()))
            .await
            .unwrap();
    }

    let err = BenchmarkSuite::new()
        .register_devices(
            &recorder,
            ledger.as_ref(),
            fixtures,
            &input.devices,
            &Address::new("0xowner"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScenarioError::Fixture(ref m) if m.contains("dev-9")));
    assert_eq!(recorder.rows_written().await, 2);
}

#[tokio::test]
async fn test_movement_index_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let recorder = recorder(&dir, &ledger).await;
    let mut input = sample_input_data();
    let fixtures = input.families.get_mut(&Family::GeohashRegions).unwrap();
    fixtures.device_movements[0].account_index = 7;
    let fixtures = input.family(Family::GeohashRegions).unwrap();

    let err = BenchmarkSuite::new()
        .move_devices(
            &recorder,
            ledger.as_ref(),
            &input.devices.sub_accounts,
            &fixtures.sub_locations,
            &fixtures.device_movements,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScenarioError::Fixture(ref m) if m.contains("sub-account #7")));
}

#[tokio::test]
async fn test_remote_rejection_propagates_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let recorder = recorder(&dir, &ledger).await;
    let input = sample_input_data();
    let fixtures = input.family(Family::GeohashRegions).unwrap();

    // devices were never registered, so the ledger reverts the first move
    let err = BenchmarkSuite::new()
        .move_devices(
            &recorder,
            ledger.as_ref(),
            &input.devices.sub_accounts,
            &fixtures.sub_locations,
            &fixtures.device_movements,
        )
        .await
        .unwrap_err();

    match err {
        ScenarioError::Remote(RemoteError::Rpc { code, message }) => {
            assert_eq!(code, -32000);
            assert_eq!(message, "unknown device dev-1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(recorder.rows_written().await, 0);
}

#[tokio::test]
async fn test_reputation_submits_then_queries() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(2));
    let recorder = recorder(&dir, &ledger).await;
    let mut input = sample_input_data();
    input.reputations.push(ReputationEvent {
        subject: "dev-1".into(),
        reporter: "dev-3".into(),
        score: 4,
    });

    BenchmarkSuite::new()
        .manage_reputations(
            &recorder,
            ledger.as_ref(),
            &input.reputations,
            &input.reputation_queries,
        )
        .await
        .unwrap();

    let lines = read_lines(recorder.path()).await;
    assert_eq!(
        actions_of(&lines),
        [
            pair("submit", "dev-1"),
            pair("submit", "dev-2"),
            pair("submit", "dev-1"),
            pair("query", "dev-1"),
            pair("query", "dev-2"),
        ]
    );
    assert_eq!(ledger.reputation_of("dev-1").await.unwrap(), 7);
}

#[tokio::test]
async fn test_failure_in_scenario_is_reported_with_its_kind() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(InMemoryLedger::new(3));
    let mut input = sample_input_data();
    input.devices.devices[0].region = "nowhere".into();
    let config = RunConfiguration::resolve("GeohashTreeRegions", 0, "tree").unwrap();
    let runner = ScenarioRunner::new(config, dir.path(), in_memory_deployment(ledger), input);

    let failure = runner.run(&BenchmarkSuite::new()).await.unwrap_err();

    assert_eq!(failure.scenario, Some(ScenarioKind::DeviceRegistration));
    assert!(matches!(
        failure.error,
        RunError::Scenario(ScenarioError::Fixture(_))
    ));
    let movement = read_lines(runner.paths().path(ScenarioKind::DeviceMovement)).await;
    assert_eq!(movement.len(), 1);
}
