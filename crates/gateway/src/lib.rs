pub mod builder;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod metrics;
pub mod quota;
pub mod report;
pub mod request;

pub use builder::GatewayBuilder;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use ledger::PointsLedger;
pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use quota::QuotaGate;
pub use report::ActionReport;
pub use request::{AirQualityRequest, CarbonRequest, DEFAULT_FORECAST_DAYS, ForecastRequest};
