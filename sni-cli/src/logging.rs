use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Директива фильтра для CLI.
///
/// `-v`/`-vv` важнее `LOG_LEVEL`; без флагов и переменной логируются только
/// предупреждения. Библиотека получает тот же уровень, что и сам CLI.
pub(crate) fn filter_directive(verbosity: u8, log_level: Option<&str>) -> String {
    let level = match verbosity {
        0 => log_level
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{level},sni_client={level},sni_cli={level}")
}

/// Логи пишутся в stderr, чтобы не смешиваться с выводом команд.
/// `RUST_LOG` полностью заменяет вычисленный фильтр.
pub(crate) fn init_logging(verbosity: u8) -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").ok();
    let directive = filter_directive(verbosity, log_level.as_deref());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .map_err(|e| anyhow!("invalid log filter `{directive}`: {e}"))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .without_time()
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}
