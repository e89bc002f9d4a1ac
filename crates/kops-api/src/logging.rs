//! Log setup for binaries embedding the validation engine.
//!
//! The library itself only emits `tracing` events and never installs a
//! subscriber.

use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::ParseError,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to build the default log filter"))]
    DefaultFilter { source: ParseError },

    #[snafu(display("failed to initialize rolling file appender in {directory:?}"))]
    FileAppender { source: InitError, directory: PathBuf },

    #[snafu(display("failed to install the global tracing subscriber"))]
    InstallSubscriber { source: TryInitError },
}

/// How console output is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConsoleFormat {
    #[default]
    Plain,
    Json,
}

/// Initializes `tracing` logging with the filter read from the environment
/// variable named by `env`, for example `KOPS_LOG`. Without that variable
/// the maximum level is INFO.
///
/// Log output is copied to a daily rotated file when `{env}_DIRECTORY` names a
/// directory.
pub fn initialize_logging(env: &str, app_name: &str, format: ConsoleFormat) -> Result<(), Error> {
    let filter = match EnvFilter::try_from_env(env) {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(tracing::Level::INFO.to_string()).context(DefaultFilterSnafu)?,
    };

    let file_appender_directory = std::env::var_os(format!("{env}_DIRECTORY")).map(PathBuf::from);
    let file_layer = file_appender_directory
        .as_deref()
        .map(|directory| file_appender(directory, app_name))
        .transpose()?
        .map(|appender| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(appender)
        });

    let console = match format {
        ConsoleFormat::Plain => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
        ConsoleFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    Registry::default()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context(InstallSubscriberSnafu)?;

    match file_appender_directory {
        Some(directory) => tracing::info!(directory = %directory.display(), "file logging enabled"),
        None => tracing::debug!("file logging disabled, because no log directory set"),
    }
    Ok(())
}

/// Daily rotated `{app_name}.log` files in `directory`, keeping the last six.
fn file_appender(directory: &Path, app_name: &str) -> Result<RollingFileAppender, Error> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_suffix(format!("{app_name}.log"))
        .max_log_files(6)
        .build(directory)
        .context(FileAppenderSnafu { directory })
}
