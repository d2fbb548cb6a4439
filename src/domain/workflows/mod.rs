pub mod budget_guard;
pub mod state_machine;
