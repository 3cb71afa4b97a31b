//! LiftDuel Headless Dispatch Harness
//!
//! Validates the dispatch controller without a game engine or server.
//! Runs entirely in-process: scripted snapshots, a full match in a toy
//! building, and replay round-trips.
//!
//! Usage:
//!   cargo run -p liftduel-simtest
//!   cargo run -p liftduel-simtest -- --verbose
//!   cargo run -p liftduel-simtest -- --config my_config.json
//!   cargo run -p liftduel-simtest -- --record match.bin
//!   cargo run -p liftduel-simtest -- --replay match.bin

mod building;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use building::Building;
use liftduel_logic::config::ControllerConfig;
use liftduel_logic::constants::building as bld;
use liftduel_logic::dispatch::{can_claim, CommandKind, Controller, TickDecisions};
use liftduel_logic::evaluator::{bucket_by_floor, choose_next_floor, EvalContext};
use liftduel_logic::model::{
    Elevator, ElevatorState, Fleet, Passenger, PassengerId, PassengerState, TickSnapshot,
};
use liftduel_logic::predictor::ArrivalPredictor;
use liftduel_logic::replay::{load_replay, save_replay, Replay, ReplayError};
use liftduel_logic::routes::{twin_id, RouteTracker};

// ── Default controller config (same JSON a deployment would ship) ───────
const CONFIG_JSON: &str = include_str!("../../../data/controller.json");

const MATCH_SEED: u64 = 2017;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    println!("=== LiftDuel Dispatch Harness ===\n");

    let mut results = Vec::new();

    if let Some(path) = arg_value(&args, "--replay") {
        // Replay mode: only the recorded match is checked.
        results.extend(validate_replay_file(&path, verbose));
    } else {
        // 1. Controller configuration
        let (config_results, config) = validate_config(arg_value(&args, "--config"), verbose);
        results.extend(config_results);

        if let Some(config) = config {
            // 2. Scripted dispatch scenarios
            results.extend(validate_scenarios(&config, verbose));

            // 3. Full match in the toy building
            let (match_results, replay, decisions) = validate_match(&config, verbose);
            results.extend(match_results);

            // 4. Replay record/load/re-run
            results.extend(validate_replay(
                &replay,
                &decisions,
                arg_value(&args, "--record"),
                verbose,
            ));
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Controller Config ────────────────────────────────────────────────

fn validate_config(
    path: Option<String>,
    verbose: bool,
) -> (Vec<TestResult>, Option<ControllerConfig>) {
    println!("--- Controller Config ---");
    let mut results = Vec::new();

    let (source, json) = match &path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(text) => (p.clone(), text),
            Err(e) => {
                results.push(TestResult {
                    name: "config_read".into(),
                    passed: false,
                    detail: format!("{}: {}", p, e),
                });
                return (results, None);
            }
        },
        None => ("data/controller.json".to_string(), CONFIG_JSON.to_string()),
    };

    let config: ControllerConfig = match serde_json::from_str(&json) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("{}: JSON parse error: {}", source, e),
            });
            return (results, None);
        }
    };

    let validation = config.validate();
    results.push(TestResult {
        name: "config_valid".into(),
        passed: validation.is_ok(),
        detail: match &validation {
            Ok(()) => format!("{} passes validation", source),
            Err(e) => format!("{}: {}", source, e),
        },
    });
    if validation.is_err() {
        return (results, None);
    }

    if path.is_none() {
        results.push(TestResult {
            name: "config_matches_default".into(),
            passed: config == ControllerConfig::default(),
            detail: "shipped JSON equals ControllerConfig::default()".into(),
        });
    }

    // Every shaft in the building has a lane.
    let missing: Vec<u32> = (1..=8)
        .filter(|id| !config.lanes.iter().any(|l| l.elevator_id == *id))
        .collect();
    results.push(TestResult {
        name: "config_lanes_cover_shafts".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            format!("{} lanes configured", config.lanes.len())
        } else {
            format!("no lane for elevators {:?}", missing)
        },
    });

    // Paired shafts mirror each other across the center.
    let asymmetric: Vec<u32> = config
        .lanes
        .iter()
        .filter(|l| l.elevator_id % 2 == 1)
        .filter(|l| {
            let twin = config.lane(l.elevator_id + 1);
            twin.x != -l.x || twin.early_min_destination != l.early_min_destination
        })
        .map(|l| l.elevator_id)
        .collect();
    results.push(TestResult {
        name: "config_lanes_mirrored".into(),
        passed: asymmetric.is_empty(),
        detail: if asymmetric.is_empty() {
            "both fleets get the same shaft layout".into()
        } else {
            format!("lanes {:?} differ from their mirror", asymmetric)
        },
    });

    if verbose {
        println!("  Lane table:");
        for lane in &config.lanes {
            println!(
                "    e{}: x={:5} {:?} (early >= {})",
                lane.elevator_id, lane.x, lane.role, lane.early_min_destination
            );
        }
    }

    (results, Some(config))
}

// ── 2. Scripted Scenarios ───────────────────────────────────────────────

fn filling(id: u32, fleet: Fleet, floor: i32, time_on_floor: i32) -> Elevator {
    Elevator {
        state: ElevatorState::Filling,
        time_on_floor,
        ..Elevator::new(id, fleet, floor)
    }
}

fn validate_scenarios(config: &ControllerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Dispatch Scenarios ---");
    let mut results = Vec::new();

    // Early game: a short hop from the ground floor is left behind.
    let mut controller = Controller::new(Fleet::First, config.clone());
    let d = controller.on_tick(&TickSnapshot {
        tick: 50,
        my_passengers: vec![
            Passenger::new(1, Fleet::First, 1, 3),
            Passenger::new(3, Fleet::First, 1, 6),
        ],
        my_elevators: vec![filling(5, Fleet::First, 1, 0)],
        ..TickSnapshot::default()
    });
    let claimed: Vec<PassengerId> = d.claims.iter().map(|c| c.passenger).collect();
    results.push(TestResult {
        name: "scenario_early_game_filter".into(),
        passed: claimed == vec![3],
        detail: format!("claimed {:?} (want [3])", claimed),
    });

    // Idle elevator in an empty building still commits somewhere.
    let mut controller = Controller::new(Fleet::First, config.clone());
    let d = controller.on_tick(&TickSnapshot {
        tick: 3000,
        my_elevators: vec![Elevator::new(1, Fleet::First, 5)],
        ..TickSnapshot::default()
    });
    let cmd = d.command_for(1).copied();
    results.push(TestResult {
        name: "scenario_idle_commits".into(),
        passed: cmd.map_or(false, |c| {
            c.kind == CommandKind::Committed && c.floor != 5 && config.contains_floor(c.floor)
        }),
        detail: format!("command {:?}", cmd),
    });

    // Two own elevators boarding on one floor: the inner one claims.
    let mut controller = Controller::new(Fleet::First, config.clone());
    let d = controller.on_tick(&TickSnapshot {
        tick: 3000,
        my_elevators: vec![
            filling(3, Fleet::First, 3, 200),
            filling(1, Fleet::First, 3, 200),
        ],
        enemy_passengers: vec![Passenger::new(10, Fleet::Second, 3, 8)],
        ..TickSnapshot::default()
    });
    results.push(TestResult {
        name: "scenario_inner_claims_first".into(),
        passed: d.claims_for(1).count() == 1 && d.claims_for(3).count() == 0,
        detail: format!("claims {:?}", d.claims),
    });

    // Poaching from a parked rival depends on who is closer.
    let elevators = vec![
        filling(1, Fleet::First, 3, 200),
        filling(2, Fleet::Second, 3, 200),
    ];
    let routes = RouteTracker::new();
    let predictor = ArrivalPredictor::new();
    let by_floor = bucket_by_floor(&[]);
    let ctx = EvalContext {
        tick: 3000,
        own: Fleet::First,
        config,
        routes: &routes,
        predictor: &predictor,
        by_floor: &by_floor,
        elevators: &elevators,
    };
    let walker = |x: f64| Passenger {
        state: PassengerState::MovingToElevator,
        elevator: Some(2),
        x,
        ..Passenger::new(4, Fleet::Second, 3, 7)
    };
    let near = can_claim(&ctx, &elevators[0], &walker(-50.0));
    let far = can_claim(&ctx, &elevators[0], &walker(40.0));
    results.push(TestResult {
        name: "scenario_poach_parked_rival".into(),
        passed: near && !far,
        detail: format!("closer={} farther={}", near, far),
    });

    if verbose {
        let idle = Elevator::new(1, Fleet::First, 5);
        if let Some(best) = choose_next_floor(&ctx, &idle) {
            println!(
                "  Empty building from floor 5: go {} (score {:.1}, arrive {})",
                best.floor, best.score, best.arrive_at
            );
        }
    }

    results
}

// ── 3. Full Match ───────────────────────────────────────────────────────

/// Property checks accumulated over a run.
#[derive(Default)]
struct InvariantTracker {
    ticks: usize,
    bad_commands: Vec<String>,
    overfilled: Vec<String>,
    visited_regressions: Vec<String>,
    visited_overflow: Vec<String>,
    stale_predictions: usize,
    peak_predictions: usize,
    last_visited: HashMap<PassengerId, u32>,
}

impl InvariantTracker {
    fn observe(&mut self, controller: &Controller, snap: &TickSnapshot, d: &TickDecisions) {
        self.ticks += 1;
        let config = controller.config();

        for cmd in &d.commands {
            let current = snap.my_elevators.iter().find(|e| e.id == cmd.elevator);
            let ok = config.contains_floor(cmd.floor)
                && current.map_or(false, |e| e.floor != cmd.floor);
            if !ok {
                self.bad_commands
                    .push(format!("t{} e{}>{}", snap.tick, cmd.elevator, cmd.floor));
            }
        }

        for e in snap.my_elevators.iter().filter(|e| e.state == ElevatorState::Filling) {
            let entering = snap
                .passengers()
                .filter(|p| p.is_at_floor() && p.floor == e.floor && p.elevator == Some(e.id))
                .count();
            let load = e.staying_past(e.floor) + entering + d.claims_for(e.id).count();
            if load > bld::CAPACITY {
                self.overfilled.push(format!("t{} e{} load {}", snap.tick, e.id, load));
            }
        }

        let routes = controller.routes();
        let riders = snap.elevators().flat_map(|e| e.passengers.iter());
        for p in snap.passengers().chain(riders) {
            let Some(route) = routes.route(p.id) else {
                continue;
            };
            let visited = route.visited;
            let twin_len = routes
                .route(twin_id(p.id))
                .map_or(0, |r| r.destinations.len());
            let bound = route.destinations.len().max(twin_len);
            if visited as usize > bound {
                self.visited_overflow
                    .push(format!("t{} p{} {}>{}", snap.tick, p.id, visited, bound));
            }
            let last = self.last_visited.entry(p.id).or_insert(visited);
            if visited < *last {
                self.visited_regressions
                    .push(format!("t{} p{} {}<{}", snap.tick, p.id, visited, last));
            }
            *last = visited;
        }

        let predictor = controller.predictor();
        self.peak_predictions = self.peak_predictions.max(predictor.len());
        self.stale_predictions += predictor
            .expected()
            .iter()
            .filter(|e| e.tick + 5 <= snap.tick)
            .count();
    }

    fn results(&self, prefix: &str) -> Vec<TestResult> {
        fn sample(v: &[String]) -> String {
            v.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        }
        vec![
            TestResult {
                name: format!("{}_commands_valid", prefix),
                passed: self.bad_commands.is_empty(),
                detail: if self.bad_commands.is_empty() {
                    format!("all commands valid over {} ticks", self.ticks)
                } else {
                    format!(
                        "{} bad: {}",
                        self.bad_commands.len(),
                        sample(&self.bad_commands)
                    )
                },
            },
            TestResult {
                name: format!("{}_capacity", prefix),
                passed: self.overfilled.is_empty(),
                detail: if self.overfilled.is_empty() {
                    "no elevator claimed past capacity".into()
                } else {
                    format!(
                        "{} overfills: {}",
                        self.overfilled.len(),
                        sample(&self.overfilled)
                    )
                },
            },
            TestResult {
                name: format!("{}_visited_monotonic", prefix),
                passed: self.visited_regressions.is_empty(),
                detail: format!("{} regressions", self.visited_regressions.len()),
            },
            TestResult {
                name: format!("{}_visited_bounded", prefix),
                passed: self.visited_overflow.is_empty(),
                detail: if self.visited_overflow.is_empty() {
                    format!("{} passengers tracked", self.last_visited.len())
                } else {
                    format!(
                        "{} overflows: {}",
                        self.visited_overflow.len(),
                        sample(&self.visited_overflow)
                    )
                },
            },
            TestResult {
                name: format!("{}_predictions_pruned", prefix),
                passed: self.stale_predictions == 0,
                detail: format!(
                    "{} stale, peak {} live",
                    self.stale_predictions, self.peak_predictions
                ),
            },
        ]
    }
}

fn validate_match(
    config: &ControllerConfig,
    verbose: bool,
) -> (Vec<TestResult>, Replay, Vec<TickDecisions>) {
    println!("--- Full Match ---");
    let mut results = Vec::new();

    let mut world = Building::new(config.clone(), MATCH_SEED);
    let mut first = Controller::new(Fleet::First, config.clone());
    let mut second = Controller::new(Fleet::Second, config.clone());
    let mut first_checks = InvariantTracker::default();
    let mut second_checks = InvariantTracker::default();
    let mut replay = Replay::new(Fleet::First, config.clone());
    let mut first_decisions = Vec::new();

    for _ in 0..config.match_length {
        world.step();

        let snap = world.snapshot(Fleet::First);
        let d = first.on_tick(&snap);
        first_checks.observe(&first, &snap, &d);
        replay.record(&snap);

        let rival_snap = world.snapshot(Fleet::Second);
        let rival_d = second.on_tick(&rival_snap);
        second_checks.observe(&second, &rival_snap, &rival_d);

        world.apply(&d);
        world.apply(&rival_d);
        first_decisions.push(d);

        if verbose && world.tick % 1000 == 0 {
            println!(
                "  t{:5}: first {:6.0} second {:6.0} delivered {} waiting {}",
                world.tick,
                world.score(Fleet::First),
                world.score(Fleet::Second),
                world.delivered,
                world.passengers.len()
            );
        }
    }

    log::info!(
        "match over at tick {}: first {:.0}, second {:.0}",
        world.tick,
        world.score(Fleet::First),
        world.score(Fleet::Second)
    );

    results.extend(first_checks.results("match_first"));
    results.extend(second_checks.results("match_second"));

    let overfull = world
        .elevators
        .iter()
        .filter(|e| e.passengers.len() > bld::CAPACITY)
        .count();
    results.push(TestResult {
        name: "match_building_capacity".into(),
        passed: overfull == 0,
        detail: format!("{} elevators over capacity at the end", overfull),
    });

    results.push(TestResult {
        name: "match_passengers_delivered".into(),
        passed: world.delivered > 0,
        detail: format!(
            "{} legs delivered of {} spawned passengers",
            world.delivered, world.spawned
        ),
    });

    results.push(TestResult {
        name: "match_both_fleets_score".into(),
        passed: world.score(Fleet::First) > 0.0 && world.score(Fleet::Second) > 0.0,
        detail: format!(
            "first {:.0}, second {:.0}",
            world.score(Fleet::First),
            world.score(Fleet::Second)
        ),
    });

    (results, replay, first_decisions)
}

// ── 4. Replay ───────────────────────────────────────────────────────────

fn rerun(replay: &Replay) -> (Vec<TickDecisions>, InvariantTracker) {
    let mut controller = Controller::new(replay.own, replay.config.clone());
    let mut checks = InvariantTracker::default();
    let decisions = replay
        .ticks
        .iter()
        .map(|snap| {
            let d = controller.on_tick(snap);
            checks.observe(&controller, snap, &d);
            d
        })
        .collect();
    (decisions, checks)
}

fn validate_replay(
    replay: &Replay,
    recorded: &[TickDecisions],
    record_path: Option<String>,
    _verbose: bool,
) -> Vec<TestResult> {
    println!("--- Replay ---");
    let mut results = Vec::new();

    let mut buffer = Vec::new();
    let loaded = save_replay(&mut buffer, replay).and_then(|_| load_replay(&buffer[..]));
    match loaded {
        Ok(loaded) => {
            results.push(TestResult {
                name: "replay_roundtrip".into(),
                passed: &loaded == replay,
                detail: format!("{} ticks, {} bytes", loaded.len(), buffer.len()),
            });
            let (decisions, _) = rerun(&loaded);
            let diverged = decisions
                .iter()
                .zip(recorded)
                .position(|(a, b)| a != b);
            results.push(TestResult {
                name: "replay_deterministic".into(),
                passed: diverged.is_none() && decisions.len() == recorded.len(),
                detail: match diverged {
                    None => format!("{} ticks re-decided identically", decisions.len()),
                    Some(i) => format!("decisions diverge at tick {}", recorded[i].tick),
                },
            });
        }
        Err(e) => results.push(TestResult {
            name: "replay_roundtrip".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    if let Some(path) = record_path {
        let saved = File::create(&path)
            .map_err(ReplayError::from)
            .and_then(|f| save_replay(BufWriter::new(f), replay));
        results.push(TestResult {
            name: "replay_record".into(),
            passed: saved.is_ok(),
            detail: match saved {
                Ok(()) => format!("wrote {}", path),
                Err(e) => format!("{}: {}", path, e),
            },
        });
    }

    results
}

fn validate_replay_file(path: &str, verbose: bool) -> Vec<TestResult> {
    println!("--- Replay File ---");
    let mut results = Vec::new();

    let replay = match File::open(path)
        .map_err(ReplayError::from)
        .and_then(|f| load_replay(BufReader::new(f)))
    {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "replay_load".into(),
                passed: false,
                detail: format!("{}: {}", path, e),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "replay_load".into(),
        passed: !replay.is_empty(),
        detail: format!("{} ticks as {:?}", replay.len(), replay.own),
    });

    let validation = replay.config.validate();
    results.push(TestResult {
        name: "replay_config_valid".into(),
        passed: validation.is_ok(),
        detail: match validation {
            Ok(()) => "embedded config passes validation".into(),
            Err(e) => e.to_string(),
        },
    });

    let (first_run, checks) = rerun(&replay);
    let (second_run, _) = rerun(&replay);
    results.extend(checks.results("replay"));
    results.push(TestResult {
        name: "replay_deterministic".into(),
        passed: first_run == second_run,
        detail: format!("{} ticks", first_run.len()),
    });

    if verbose {
        let claims: usize = first_run.iter().map(|d| d.claims.len()).sum();
        let commands: usize = first_run.iter().map(|d| d.commands.len()).sum();
        println!("  {} claims, {} commands issued", claims, commands);
    }

    results
}
