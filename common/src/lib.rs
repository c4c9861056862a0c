pub mod bool_ext;

pub use bool_ext::BoolExt;

use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle};

/// Starts file + console logging. The returned handle must stay alive for
/// the lifetime of the process; dropping it shuts the logger down.
pub fn setup_logging(base_level: &str) -> LoggerHandle {
    Logger::try_with_env_or_str(base_level)
        .unwrap_or_else(|err| panic!("Logger initialization failed with {}", err))
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::Info)
        .rotate(
            flexi_logger::Criterion::Size(1024 * 1024), //1MB
            flexi_logger::Naming::Timestamps,
            flexi_logger::Cleanup::KeepLogFiles(5),
        )
        .start()
        .unwrap_or_else(|err| panic!("Logger initialization failed with {}", err))
}
