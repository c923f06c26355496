//! The quiz session: a pure reducer plus a controller that runs its effects.

mod controller;
mod reducer;
mod state;
mod view;

pub use controller::SessionController;
pub use reducer::{Effect, SessionEvent, Transition, reduce};
pub use state::{LoadFailure, Mode, PlacementStage, PracticeStage, RetryTarget, SessionState, Stage};
pub use view::{SessionView, StageTag};
