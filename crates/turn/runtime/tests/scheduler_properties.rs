//! Ordering and lifecycle properties of the command scheduler.

mod common;

use common::{Collab, Plain};
use turn_core::{
    CommandSpec, CommandState, Day, DispatchEvent, EntityId, InvariantError, Opcode, Scheduler,
    SchedulerConfig,
};
use turn_runtime::{UnitInfo, base_registry};

const QUICK: Opcode = Opcode(10);
const SLOW: Opcode = Opcode(11);
const PATROL: Opcode = Opcode(12);
const SCOUT: Opcode = Opcode(13);

/// Registry with a spread of plain commands at different priorities.
fn test_registry() -> turn_core::CommandRegistry {
    let mut registry = base_registry().expect("built-ins register");
    registry
        .register("quick", QUICK, CommandSpec::new(1, 0), Box::new(Plain))
        .expect("register quick");
    registry
        .register("slow", SLOW, CommandSpec::new(2, 3), Box::new(Plain))
        .expect("register slow");
    registry
        .register(
            "patrol",
            PATROL,
            CommandSpec::new(2, 3).polled(),
            Box::new(Plain),
        )
        .expect("register patrol");
    registry
        .register(
            "scout",
            SCOUT,
            CommandSpec::new(1, 2).polled(),
            Box::new(Plain),
        )
        .expect("register scout");
    registry
}

#[test]
fn p1_lower_priority_dispatches_first() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let slowpoke = EntityId(1);
    let sprinter = EntityId(2);
    collab.world.add_unit(slowpoke, UnitInfo::character(0));
    collab.world.add_unit(sprinter, UnitInfo::character(1));
    collab.orders.queue(slowpoke, SLOW, "slow");
    collab.orders.queue(sprinter, QUICK, "quick");

    sched.load(slowpoke, &registry, &mut collab.env());
    sched.load(sprinter, &registry, &mut collab.env());
    sched.run_day(&registry, &mut collab.env()).unwrap();

    // priority 1 before priority 2, despite queue insertion order
    assert_eq!(collab.trace.start_order(), vec![sprinter, slowpoke]);
}

#[test]
fn p2_stack_leader_dispatches_before_member() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let leader = EntityId(4);
    let member = EntityId(3);
    collab.world.add_unit(leader, UnitInfo::character(0));
    collab
        .world
        .add_unit(member, UnitInfo::character(0).stacked_under(leader));
    collab.orders.queue(member, SLOW, "slow");
    collab.orders.queue(leader, SLOW, "slow");

    sched.load(member, &registry, &mut collab.env());
    sched.load(leader, &registry, &mut collab.env());
    sched.run_day(&registry, &mut collab.env()).unwrap();

    assert_eq!(collab.trace.start_order(), vec![leader, member]);
}

#[test]
fn p3_second_finish_same_day_is_an_invariant_error() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let unit = EntityId(1);
    collab.world.add_unit(unit, UnitInfo::character(0));
    collab.orders.queue(unit, SLOW, "slow");

    sched.load(unit, &registry, &mut collab.env());
    sched.run_day(&registry, &mut collab.env()).unwrap();

    // the evening sweep already ticked this record today
    let err = sched
        .finish(unit, &registry, &mut collab.env(), false)
        .unwrap_err();
    assert_eq!(
        err,
        InvariantError::DoubleFinish {
            entity: unit,
            day: Day(1)
        }
    );
}

#[test]
fn p4_every_running_entity_ticks_once_per_evening() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let a = EntityId(1);
    let b = EntityId(2);
    collab.world.add_unit(a, UnitInfo::character(0));
    collab.world.add_unit(b, UnitInfo::character(1));
    collab.orders.queue(a, PATROL, "patrol");
    collab.orders.queue(b, PATROL, "patrol");

    sched.load(a, &registry, &mut collab.env());
    sched.load(b, &registry, &mut collab.env());
    for _ in 0..3 {
        sched.run_day(&registry, &mut collab.env()).unwrap();
    }

    // polled commands surface one finish callback per entity per day
    assert_eq!(collab.trace.finishes_of(a), vec![Day(1), Day(2), Day(3)]);
    assert_eq!(collab.trace.finishes_of(b), vec![Day(1), Day(2), Day(3)]);
}

#[test]
fn p5_second_wait_suppresses_both_phases_then_clears() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let detained = EntityId(1);
    collab.world.add_unit(detained, UnitInfo::character(0));
    collab.orders.queue(detained, SLOW, "slow");

    sched.load(detained, &registry, &mut collab.env());
    sched.apply_second_wait(detained);
    sched.run_day(&registry, &mut collab.env()).unwrap();

    // skipped by the day scheduler entirely
    assert!(collab.trace.start_order().is_empty());
    assert_eq!(
        sched.record(detained).unwrap().state,
        CommandState::Load
    );
    // and the suspension is gone at the end of the daily loop
    assert_eq!(sched.record(detained).unwrap().second_wait, 0);

    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(collab.trace.start_order(), vec![detained]);
}

#[test]
fn p5_second_wait_skips_the_evening_tick() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let detained = EntityId(1);
    collab.world.add_unit(detained, UnitInfo::character(0));
    collab.orders.queue(detained, PATROL, "patrol");

    sched.load(detained, &registry, &mut collab.env());
    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(collab.trace.finishes_of(detained), vec![Day(1)]);

    // detained after the day's dispatch: still Run, but no evening tick
    sched.apply_second_wait(detained);
    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(collab.trace.finishes_of(detained), vec![Day(1)]);

    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(
        collab.trace.finishes_of(detained),
        vec![Day(1), Day(3)]
    );
}

#[test]
fn p6_wait_counts_down_and_finish_fires_on_the_last_day() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let unit = EntityId(1);
    collab.world.add_unit(unit, UnitInfo::character(0));
    collab.orders.queue(unit, SLOW, "slow");

    sched.load(unit, &registry, &mut collab.env());

    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(sched.record(unit).unwrap().wait, 2);
    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(sched.record(unit).unwrap().wait, 1);
    assert!(collab.trace.finishes_of(unit).is_empty());

    sched.run_day(&registry, &mut collab.env()).unwrap();
    assert_eq!(collab.trace.finishes_of(unit), vec![Day(3)]);
    // no further orders: the record parked at Done
    assert_eq!(sched.record(unit).unwrap().state, CommandState::Done);
    assert_eq!(sched.record(unit).unwrap().days_executing, 3);
}

#[test]
fn p7_polled_command_finishes_every_day_of_its_wait() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    let unit = EntityId(1);
    collab.world.add_unit(unit, UnitInfo::character(0));
    collab.orders.queue(unit, PATROL, "patrol");

    sched.load(unit, &registry, &mut collab.env());
    for _ in 0..4 {
        sched.run_day(&registry, &mut collab.env()).unwrap();
    }

    // three days of wait, three callbacks, then out of Run
    assert_eq!(collab.trace.finishes_of(unit), vec![Day(1), Day(2), Day(3)]);
    assert_eq!(sched.record(unit).unwrap().state, CommandState::Done);
}

#[test]
fn evening_visits_lower_priority_before_higher() {
    let registry = test_registry();
    let mut collab = Collab::new();
    let mut sched = Scheduler::new(SchedulerConfig::default());

    // two polled commands ticking the same evening at different priorities
    let urgent = EntityId(2);
    let casual = EntityId(1);
    collab.world.add_unit(urgent, UnitInfo::character(1));
    collab.world.add_unit(casual, UnitInfo::character(0));
    collab.orders.queue(urgent, SCOUT, "scout");
    collab.orders.queue(casual, PATROL, "patrol");

    sched.load(urgent, &registry, &mut collab.env());
    sched.load(casual, &registry, &mut collab.env());
    sched.run_day(&registry, &mut collab.env()).unwrap();

    let finish_entities: Vec<EntityId> = collab
        .trace
        .events()
        .iter()
        .filter(|(_, _, e)| matches!(e, DispatchEvent::Finished(_)))
        .map(|(_, id, _)| *id)
        .collect();
    // priority 1 ticks before priority 2, even though priority 2 sits
    // earlier in the run queue and at an earlier location position
    assert_eq!(finish_entities, vec![urgent, casual]);
}
