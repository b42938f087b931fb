//! Barrier semantics of the sweep driver, exercised with a scripted launcher.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lik_core::{LikError, RunConfig};
use lik_exp::{run_sweep, JobStatus, Launcher, RunHandle, RunSpec, RunStatus, SweepPlan};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Launch { temp: f64, seed: u64 },
    Wait { temp: f64, seed: u64 },
}

/// Launcher that records launch/wait ordering instead of spawning processes.
struct ScriptedLauncher {
    events: Rc<RefCell<Vec<Event>>>,
    /// Exit codes per (temperature bits, seed); zero when absent.
    exit_codes: BTreeMap<(u64, u64), i32>,
    /// Runs whose spawn itself fails.
    refuse: Vec<(u64, u64)>,
}

impl ScriptedLauncher {
    fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
            exit_codes: BTreeMap::new(),
            refuse: Vec::new(),
        }
    }

    fn exit_code(mut self, temp: f64, seed: u64, code: i32) -> Self {
        self.exit_codes.insert((temp.to_bits(), seed), code);
        self
    }

    fn refuse_spawn(mut self, temp: f64, seed: u64) -> Self {
        self.refuse.push((temp.to_bits(), seed));
        self
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

struct ScriptedHandle {
    events: Rc<RefCell<Vec<Event>>>,
    temp: f64,
    seed: u64,
    code: i32,
}

impl Launcher for ScriptedLauncher {
    type Handle = ScriptedHandle;

    fn launch(&mut self, spec: &RunSpec) -> Result<Self::Handle, LikError> {
        let key = (spec.likelihood_temp.to_bits(), spec.seed);
        if self.refuse.contains(&key) {
            return Err(LikError::Launch(lik_core::ErrorInfo::new(
                "launch-spawn",
                "scripted spawn refusal",
            )));
        }
        self.events.borrow_mut().push(Event::Launch {
            temp: spec.likelihood_temp,
            seed: spec.seed,
        });
        Ok(ScriptedHandle {
            events: Rc::clone(&self.events),
            temp: spec.likelihood_temp,
            seed: spec.seed,
            code: self.exit_codes.get(&key).copied().unwrap_or(0),
        })
    }
}

impl RunHandle for ScriptedHandle {
    fn wait(self) -> Result<RunStatus, LikError> {
        self.events.borrow_mut().push(Event::Wait {
            temp: self.temp,
            seed: self.seed,
        });
        Ok(RunStatus {
            code: Some(self.code),
        })
    }
}

fn plan() -> SweepPlan {
    SweepPlan {
        program: vec!["python".to_string(), "experiments/train_lik.py".to_string()],
        likelihood_temps: vec![2.0, 1.0],
        seeds: vec![1, 2, 3],
    }
}

fn event_temp(event: &Event) -> f64 {
    match event {
        Event::Launch { temp, .. } | Event::Wait { temp, .. } => *temp,
    }
}

#[test]
fn six_launches_in_two_groups() {
    let mut launcher = ScriptedLauncher::new();
    let report = run_sweep(&plan(), &RunConfig::default(), &mut launcher).expect("sweep");

    assert_eq!(report.launches(), 6);
    assert_eq!(report.failures(), 0);
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].likelihood_temp, 2.0);
    assert_eq!(report.groups[1].likelihood_temp, 1.0);
    for group in &report.groups {
        let seeds: Vec<u64> = group.jobs.iter().map(|job| job.seed).collect();
        assert_eq!(seeds, vec![1, 2, 3]);
        assert!(group
            .jobs
            .iter()
            .all(|job| job.status == JobStatus::Completed));
    }

    let launches = launcher
        .events()
        .iter()
        .filter(|event| matches!(event, Event::Launch { .. }))
        .count();
    assert_eq!(launches, 6);
}

#[test]
fn groups_never_overlap() {
    let mut launcher = ScriptedLauncher::new();
    run_sweep(&plan(), &RunConfig::default(), &mut launcher).expect("sweep");

    let events = launcher.events();
    let last_of_first = events
        .iter()
        .rposition(|event| event_temp(event) == 2.0)
        .expect("first group events");
    let first_of_second = events
        .iter()
        .position(|event| event_temp(event) == 1.0)
        .expect("second group events");
    assert!(
        last_of_first < first_of_second,
        "second group started before the first group's barrier cleared"
    );
}

#[test]
fn all_launches_precede_first_wait_within_group() {
    let mut launcher = ScriptedLauncher::new();
    run_sweep(&plan(), &RunConfig::default(), &mut launcher).expect("sweep");

    for temp in [2.0, 1.0] {
        let events: Vec<Event> = launcher
            .events()
            .into_iter()
            .filter(|event| event_temp(event) == temp)
            .collect();
        let first_wait = events
            .iter()
            .position(|event| matches!(event, Event::Wait { .. }))
            .expect("waits recorded");
        let launches_before = events[..first_wait]
            .iter()
            .filter(|event| matches!(event, Event::Launch { .. }))
            .count();
        assert_eq!(launches_before, 3, "sequential launch-then-wait at T={temp}");
    }
}

#[test]
fn failing_run_does_not_block_the_barrier() {
    let mut launcher = ScriptedLauncher::new().exit_code(2.0, 2, 1);
    let report = run_sweep(&plan(), &RunConfig::default(), &mut launcher).expect("sweep");

    assert_eq!(report.failures(), 1);
    assert_eq!(
        report.groups[0].jobs[1].status,
        JobStatus::Failed { code: Some(1) }
    );
    // the second group still ran in full
    assert_eq!(report.groups[1].jobs.len(), 3);
    assert!(report.groups[1]
        .jobs
        .iter()
        .all(|job| job.status == JobStatus::Completed));
}

#[test]
fn spawn_refusal_is_recorded_and_group_proceeds() {
    let mut launcher = ScriptedLauncher::new().refuse_spawn(2.0, 1);
    let report = run_sweep(&plan(), &RunConfig::default(), &mut launcher).expect("sweep");

    assert!(matches!(
        report.groups[0].jobs[0].status,
        JobStatus::LaunchFailed { .. }
    ));
    // the two surviving runs of the group were still launched and awaited
    let group_events: Vec<Event> = launcher
        .events()
        .into_iter()
        .filter(|event| event_temp(event) == 2.0)
        .collect();
    assert_eq!(group_events.len(), 4);
    assert_eq!(report.launches(), 6);
}
