pub mod actions;
pub mod executor;
pub mod plugin;
pub mod queue;
pub mod result_log;
pub mod results;

pub use actions::*;
pub use executor::execute_queued_brew_actions;
pub use plugin::BrewActionsPlugin;
pub use queue::*;
pub use result_log::ActionResultLog;
pub use results::*;
