use arena::app::{render, run_once, Args};
use clap::Parser;
use sim::{Policy, RolloutConfig, TerminationReason};
use std::path::PathBuf;

const CORRIDOR: &str = r#"{
    "world": { "coordinateSystem": "grid", "width": 6, "height": 1 },
    "objects": [ { "id": "goal", "type": "goal", "position": { "x": 5, "y": 0 } } ],
    "agents": [ { "id": "runner", "position": { "x": 0, "y": 0 } } ],
    "actionSpace": { "type": "discrete", "actions": ["left", "right"] },
    "rules": {
        "rewards": [ { "id": "goal", "value": 5,
                       "condition": { "type": "agent_at_object", "objectId": "goal" } } ],
        "terminations": [ { "id": "finish",
                            "condition": { "type": "agent_at_object", "objectId": "goal" } } ]
    }
}"#;

fn write_spec(name: &str, json: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("arena_cli_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn greedy_batch_from_file() {
    let path = write_spec("corridor.json", CORRIDOR);
    let config = RolloutConfig {
        episodes: 3,
        ..RolloutConfig::default()
    };
    let batch = run_once(&path, &config).unwrap();

    assert_eq!(batch.episodes.len(), 3);
    assert_eq!(batch.summary.successes, 3);
    assert!((batch.summary.mean_length - 5.0).abs() < 1e-6);
    for episode in &batch.episodes {
        assert_eq!(
            episode.termination_reason,
            Some(TerminationReason::Rule {
                rule_id: "finish".into()
            })
        );
    }
}

#[test]
fn invalid_spec_loads_but_does_not_simulate() {
    let path = write_spec("no_rules.json", r#"{
        "world": { "width": 3, "height": 3 },
        "agents": [ { "id": "a", "position": { "x": 1, "y": 1 } } ],
        "actionSpace": { "type": "discrete", "actions": ["up"] }
    }"#);
    let batch = run_once(&path, &RolloutConfig::default()).unwrap();

    assert_eq!(batch.summary.successes, 0);
    assert_eq!(batch.episodes[0].episode_length, 0);
    assert!(matches!(
        batch.episodes[0].termination_reason,
        Some(TerminationReason::Invalid { ref error }) if error.contains("reward rules")
    ));
}

#[test]
fn unreadable_or_malformed_files_are_errors() {
    let missing = std::env::temp_dir().join("arena_cli_tests/does_not_exist.json");
    let err = run_once(&missing, &RolloutConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("does_not_exist.json"));

    let path = write_spec("broken.json", "{ \"world\": ");
    assert!(run_once(&path, &RolloutConfig::default()).is_err());
}

#[test]
fn summary_rendering_omits_episodes() {
    let path = write_spec("corridor_summary.json", CORRIDOR);
    let batch = run_once(&path, &RolloutConfig::default()).unwrap();

    let summary: serde_json::Value = serde_json::from_str(&render(&batch, true).unwrap()).unwrap();
    assert_eq!(summary["episodes"], 1);
    assert_eq!(summary["successRate"], 1.0);

    let full: serde_json::Value = serde_json::from_str(&render(&batch, false).unwrap()).unwrap();
    assert_eq!(full["episodes"][0]["episodeLength"], 5);
    assert_eq!(full["summary"]["successes"], 1);
}

#[test]
fn cli_defaults_and_overrides() {
    let args = Args::try_parse_from(["arena", "maze.json"]).unwrap();
    assert_eq!(args.rollout_config(), RolloutConfig::default());
    assert!(!args.watch);
    assert!(args.output.is_none());

    let args = Args::try_parse_from([
        "arena",
        "maze.json",
        "--policy",
        "random",
        "--max-steps",
        "30",
        "--episodes",
        "4",
        "--seed",
        "9",
        "--log-level",
        "debug",
        "--summary",
    ])
    .unwrap();
    assert_eq!(
        args.rollout_config(),
        RolloutConfig {
            policy: Policy::Random,
            max_steps: 30,
            episodes: 4,
            seed: 9,
        }
    );
    assert!(args.summary);
    assert_eq!(args.log_level, tracing::Level::DEBUG);

    assert!(Args::try_parse_from(["arena", "maze.json", "--policy", "smart"]).is_err());
}
