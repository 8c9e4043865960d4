mod deadline_metrics;

pub use self::deadline_metrics::*;
