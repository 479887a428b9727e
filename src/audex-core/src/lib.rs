pub mod config;
pub mod logging;
pub mod paths;
pub mod query;
pub mod record;
pub mod source;

pub use config::{Config, ConfigError, LogLevel, LoggingConfig, ValidationError};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use paths::{AppDirs, DirsError};
pub use query::{
    QueryDescriptor, QueryKind, RowFilter, ScopeSelector, SortDirection, SortSpec,
};
pub use record::{Record, Value};
pub use source::{MediaSource, RowCursor, SourceError};

pub const APP_NAME: &str = "audex";
pub const APP_AUTHOR: &str = "Audex";
pub const APP_QUALIFIER: &str = "io";
