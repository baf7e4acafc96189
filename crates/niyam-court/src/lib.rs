pub mod defense;
pub mod input;
pub mod judge;
pub mod narrator;
pub mod prompts;
pub mod simulation;

pub use defense::DefenseRole;
pub use input::{HumanInput, ScriptedInput, Statement};
pub use judge::{JudgeReply, JudgeRole, VERDICT_MARKER};
pub use narrator::{Narrator, Recorder, Silent};
pub use simulation::{Simulation, SimulationReport, SimulationSettings};
