/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{CarId, Direction, PassengerId, ShaftId, TowerId};

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SimEvent {
    /// A new call request was queued on a shaft (coalesced calls do not emit this).
    CallPlaced {
        shaft: ShaftId,
        floor: i32,
        direction: Direction,
    },
    /// A car is standing at a called floor; the call has been retired.
    CarArrived {
        shaft: ShaftId,
        car: CarId,
        floor: i32,
        direction: Direction,
        waiting: Vec<PassengerId>,
    },
    /// A shaft was demolished together with its cars and pending calls.
    ShaftRemoved {
        tower: TowerId,
        shaft: ShaftId,
        stranded: Vec<PassengerId>,
    },
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Typed event queue between the elevator core and its collaborators.
 *
 * Shafts push events through cloned `EventSender`s while a tick is processed;
 * the simulation driver drains everything once per tick. Both ends live on
 * the simulation thread, the channel just keeps producers decoupled from the
 * consumer.
 *
 * # Fields
 * - `events_tx`:   Sender cloned into every shaft.
 * - `events_rx`:   Receiver drained by `drain`.
 */
pub struct EventQueue {
    events_tx: cbc::Sender<SimEvent>,
    events_rx: cbc::Receiver<SimEvent>,
}

#[derive(Clone, Debug)]
pub struct EventSender {
    events_tx: cbc::Sender<SimEvent>,
}

impl EventQueue {
    pub fn new() -> EventQueue {
        let (events_tx, events_rx) = cbc::unbounded::<SimEvent>();
        EventQueue {
            events_tx,
            events_rx,
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            events_tx: self.events_tx.clone(),
        }
    }

    /// Takes every queued event in the order it was sent.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.events_rx.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events_rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        EventQueue::new()
    }
}

impl EventSender {
    pub fn send(&self, event: SimEvent) {
        // The queue owns a receiver for as long as any sender exists
        if let Err(e) = self.events_tx.send(event) {
            log::error!("Failed to queue simulation event: {:?}", e);
        }
    }
}
