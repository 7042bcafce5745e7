// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod runtime;
pub mod session;
pub mod stopwatch;
pub mod store;
pub mod ui;
pub mod util;

pub use app::{App, Screen};
pub use error::{Error, Result, StoreError};
pub use history::{HistoryStore, SessionRecord};
pub use session::{Phase, RepAmount, SessionTracker};
