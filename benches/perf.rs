use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use scout_report::config::EngineConfig;
use scout_report::engine::Engine;
use scout_report::input::{PlayerInput, parse_player_input_json};

fn sample_player(name: &str, position: &str, age: u32) -> PlayerInput {
    let mut input = parse_player_input_json(PLAYER_JSON).expect("valid fixture json");
    if let Some(info) = input.general_info.as_mut() {
        info.name = Some(name.to_string());
        info.position = Some(position.to_string());
        info.age = Some(age);
    }
    input
}

fn bench_input_parse(c: &mut Criterion) {
    c.bench_function("player_input_parse", |b| {
        b.iter(|| {
            let input = parse_player_input_json(black_box(PLAYER_JSON)).unwrap();
            black_box(input.scouting_report.map(|rows| rows.len()));
        })
    });
}

fn bench_analyze_single(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).expect("default config");
    let input = sample_player("Bench Forward", "FW", 21);
    c.bench_function("analyze_single", |b| {
        b.iter(|| {
            let report = engine.analyze(black_box(&input)).unwrap();
            black_box(report.overall_rating);
        })
    });
}

fn bench_analyze_batch(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).expect("default config");
    let positions = ["FW", "MF", "DF", "GK"];
    let inputs: Vec<PlayerInput> = (0..256)
        .map(|i| {
            sample_player(
                &format!("Player {i}"),
                positions[i % positions.len()],
                17 + (i as u32 % 20),
            )
        })
        .collect();
    c.bench_function("analyze_batch_256", |b| {
        b.iter(|| {
            let reports = engine.analyze_batch(black_box(&inputs));
            black_box(reports.len());
        })
    });
}

criterion_group!(
    perf,
    bench_input_parse,
    bench_analyze_single,
    bench_analyze_batch
);
criterion_main!(perf);

const PLAYER_JSON: &str = r#"{
  "general_info": {"name": "Bench Player", "age": 21, "position": "FW", "club": "Bench FC"},
  "scouting_report": [
    {"stat": "Non-Penalty Goals", "per_90": "0.55", "percentile": 91},
    {"stat": "npxG: Non-Penalty xG", "per_90": "0.48", "percentile": 88},
    {"stat": "Shots Total", "per_90": "3.40", "percentile": 84},
    {"stat": "Assists", "per_90": "0.18", "percentile": 62},
    {"stat": "xAG: Exp. Assisted Goals", "per_90": "0.16", "percentile": 58},
    {"stat": "Shot-Creating Actions", "per_90": "3.10", "percentile": 66},
    {"stat": "Passes Attempted", "per_90": "24.1", "percentile": 22},
    {"stat": "Pass Completion %", "per_90": "71.3%", "percentile": 35},
    {"stat": "Progressive Passes", "per_90": "1.80", "percentile": 31},
    {"stat": "Progressive Carries", "per_90": "2.90", "percentile": 72},
    {"stat": "Successful Take-Ons", "per_90": "1.60", "percentile": 69},
    {"stat": "Touches (Att Pen)", "per_90": "7.20", "percentile": 93},
    {"stat": "Progressive Passes Rec", "per_90": "9.80", "percentile": 86},
    {"stat": "Tackles", "per_90": "0.60", "percentile": 28},
    {"stat": "Interceptions", "per_90": "0.20", "percentile": 15},
    {"stat": "Blocks", "per_90": "0.50", "percentile": 40},
    {"stat": "Clearances", "per_90": "0.40", "percentile": 33},
    {"stat": "Aerials Won", "per_90": "1.90", "percentile": 74}
  ],
  "current_season_stats": {
    "League": {"matches": "28", "minutes": "2,210", "goals": "16", "assists": "4"}
  }
}"#;
