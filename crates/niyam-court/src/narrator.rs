use niyam_core::types::SimulationEvent;

/// Receives progress events from the simulation controller.
pub trait Narrator: Send {
    fn on_event(&mut self, event: &SimulationEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Narrator for Silent {
    fn on_event(&mut self, _event: &SimulationEvent) {}
}

/// Keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub events: Vec<SimulationEvent>,
}

impl Narrator for Recorder {
    fn on_event(&mut self, event: &SimulationEvent) {
        self.events.push(event.clone());
    }
}
