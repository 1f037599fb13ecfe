//! In-memory per-entity order queues.

use std::collections::{HashMap, VecDeque};

use turn_core::{EntityId, Opcode, OrderOutcome, OrderSource, ParsedOrder};

/// Order book feeding the engine one parsed line at a time.
///
/// The textual parser is out of scope for the engine, so the book stores
/// already-parsed outcomes. Autonomous (world-controlled) entities' orders
/// are staged separately and folded in when the driver asks, matching the
/// turn setup sequence.
#[derive(Debug, Default)]
pub struct OrderBook {
    queues: HashMap<EntityId, VecDeque<OrderOutcome>>,
    staged_autonomous: Vec<(EntityId, OrderOutcome)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an already-parsed order line for `entity`.
    pub fn queue(&mut self, entity: EntityId, opcode: Opcode, raw: impl Into<String>) {
        self.queue_outcome(
            entity,
            OrderOutcome::Parsed(ParsedOrder {
                opcode,
                raw: raw.into(),
            }),
        );
    }

    /// Queues a line the parser rejected, so the failure surfaces in-turn.
    pub fn queue_malformed(&mut self, entity: EntityId, raw: impl Into<String>) {
        self.queue_outcome(entity, OrderOutcome::Malformed(raw.into()));
    }

    pub fn queue_outcome(&mut self, entity: EntityId, outcome: OrderOutcome) {
        self.queues.entry(entity).or_default().push_back(outcome);
    }

    /// Stages an order for an autonomous entity; folded into the queues at
    /// the next turn's setup.
    pub fn stage_autonomous(&mut self, entity: EntityId, opcode: Opcode, raw: impl Into<String>) {
        self.staged_autonomous.push((
            entity,
            OrderOutcome::Parsed(ParsedOrder {
                opcode,
                raw: raw.into(),
            }),
        ));
    }

    /// Lines still queued for `entity`.
    pub fn remaining(&self, entity: EntityId) -> usize {
        self.queues.get(&entity).map_or(0, VecDeque::len)
    }
}

impl OrderSource for OrderBook {
    fn next_order(&mut self, entity: EntityId) -> Option<OrderOutcome> {
        self.queues.get_mut(&entity)?.pop_front()
    }

    fn queue_autonomous_orders(&mut self) {
        for (entity, outcome) in self.staged_autonomous.drain(..) {
            self.queues.entry(entity).or_default().push_back(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_come_back_in_submission_order() {
        let mut book = OrderBook::new();
        book.queue(EntityId(1), Opcode(10), "study magic");
        book.queue_malformed(EntityId(1), "stdy magic");
        assert_eq!(book.remaining(EntityId(1)), 2);

        assert!(matches!(
            book.next_order(EntityId(1)),
            Some(OrderOutcome::Parsed(_))
        ));
        assert!(matches!(
            book.next_order(EntityId(1)),
            Some(OrderOutcome::Malformed(_))
        ));
        assert_eq!(book.next_order(EntityId(1)), None);
    }

    #[test]
    fn autonomous_orders_wait_for_turn_setup() {
        let mut book = OrderBook::new();
        book.stage_autonomous(EntityId(9), Opcode(3), "patrol");
        assert_eq!(book.next_order(EntityId(9)), None);
        book.queue_autonomous_orders();
        assert!(matches!(
            book.next_order(EntityId(9)),
            Some(OrderOutcome::Parsed(_))
        ));
    }
}
