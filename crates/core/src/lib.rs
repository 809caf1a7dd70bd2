pub mod config;
pub mod decoder;
pub mod query;
pub mod report;
pub mod runner;
pub mod task;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, InputConfig,
    OutputConfig, QueryConfig, RunnerConfig, SanitizedConfig, CONFIG_PATH_ENV,
};
pub use decoder::{decode, DecodeError, FieldError};
pub use query::{ClientBuildError, HttpQueryClient, QueryClient, QueryError};
pub use report::{render_failures, render_table, ReportError, ReportPaths, ReportWriter};
pub use runner::{Classification, RunReport, RunSession, RunnerError, RunnerStatus, TaskRunner};
pub use task::{
    load_task_list, parse_task_list, CheckResult, InputError, Task, Ticket, MAX_TICKETS,
};
