use criterion::{black_box, criterion_group, criterion_main, Criterion};
use envspec::{
    ActionSpace, AgentDef, Condition, EnvSpec, ObjectDef, ObjectKind, RewardRule, Rules,
    TerminationRule, Vec2, World,
};
use sim::{run_rollout, Policy};

fn maze(size: f32) -> EnvSpec {
    let mut objects = vec![ObjectDef::new(
        "goal",
        ObjectKind::Goal,
        Vec2::new(size - 1.0, size - 1.0),
    )];
    // Staggered walls with a gap at alternating ends.
    let mut row = 2.0;
    let mut gap_left = false;
    while row < size - 1.0 {
        for x in 0..size as usize {
            let x = x as f32;
            let gap = if gap_left { 0.0 } else { size - 1.0 };
            if (x - gap).abs() > f32::EPSILON {
                objects.push(ObjectDef::new(
                    format!("wall_{x}_{row}"),
                    ObjectKind::Wall,
                    Vec2::new(x, row),
                ));
            }
        }
        row += 3.0;
        gap_left = !gap_left;
    }

    EnvSpec {
        world: World::grid(size, size),
        objects,
        agents: vec![AgentDef::new("agent", Vec2::ZERO)],
        action_space: Some(ActionSpace::discrete(["up", "down", "left", "right"])),
        rules: Rules {
            rewards: vec![
                RewardRule {
                    id: "step".into(),
                    condition: Condition::Timeout { steps: 0 },
                    value: -0.01,
                    shaping: true,
                },
                RewardRule {
                    id: "goal".into(),
                    condition: Condition::agent_at_object("goal"),
                    value: 1.0,
                    shaping: false,
                },
            ],
            terminations: vec![TerminationRule {
                id: "at_goal".into(),
                condition: Condition::agent_at_object("goal"),
            }],
        },
    }
}

fn bench_rollouts(c: &mut Criterion) {
    let spec = maze(20.0);
    let mut group = c.benchmark_group("rollout");

    group.bench_function("greedy_20x20", |b| {
        b.iter(|| {
            let mut rng = fastrand::Rng::with_seed(0);
            black_box(run_rollout(&spec, Policy::Greedy, 400, &mut rng))
        });
    });
    group.bench_function("random_20x20", |b| {
        let mut rng = fastrand::Rng::with_seed(0);
        b.iter(|| black_box(run_rollout(&spec, Policy::Random, 400, &mut rng)));
    });

    group.finish();
}

criterion_group!(benches, bench_rollouts);
criterion_main!(benches);
