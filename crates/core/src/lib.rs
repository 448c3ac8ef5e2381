pub mod action;
pub mod clock;
pub mod error;
pub mod outcome;
pub mod types;
pub mod usage;

pub use action::{ActionKind, DailyLimits, PointRewards};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use outcome::ProviderOutcome;
pub use types::Username;
pub use usage::{DailyActions, LeaderboardEntry, UserSummary};
