// ABOUTME: Shared helper for connecting to the local container runtime.
// ABOUTME: Used by check, update, and exec commands.

use reimage::config::Config;
use reimage::error::Result;
use reimage::output::Output;
use reimage::runtime::{
    BollardRuntime, RuntimeError, RuntimeErrorKind, RuntimeInfoTrait, resolve_runtime,
};

/// Connect to the container runtime named by the config, or the detected one.
///
/// This handles the common pattern of:
/// 1. Detecting the runtime type and socket path
/// 2. Outputting progress messages
/// 3. Establishing and checking the connection
pub async fn connect_to_runtime(config: &Config, output: &Output) -> Result<BollardRuntime> {
    let connected = connect(config, output).await;
    if let Err(e) = &connected {
        if let Some(hint) = hint(e.kind()) {
            output.hint(hint);
        }
    }
    Ok(connected?)
}

async fn connect(
    config: &Config,
    output: &Output,
) -> std::result::Result<BollardRuntime, RuntimeError> {
    let runtime_info = resolve_runtime(Some(&config.runtime_config()))?;

    output.progress(&format!(
        "Using {} at {}",
        runtime_info.runtime_type, runtime_info.socket_path
    ));

    let runtime = BollardRuntime::connect(&runtime_info)?;
    runtime.ping().await?;

    Ok(runtime)
}

fn hint(kind: RuntimeErrorKind) -> Option<&'static str> {
    match kind {
        RuntimeErrorKind::NoRuntimeFound => {
            Some("Set `runtime` and `socket` in reimage.yml if the daemon socket is elsewhere")
        }
        RuntimeErrorKind::SocketMissing => Some("Check the `socket` path in reimage.yml"),
        RuntimeErrorKind::ConnectionFailed => {
            Some("Is the daemon running, and may this user access its socket?")
        }
        RuntimeErrorKind::RuntimeOperation => None,
    }
}
