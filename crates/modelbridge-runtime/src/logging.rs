use env_logger::Env;

/// Installs the `env_logger` backend for the `log` facade.
///
/// Honours `RUST_LOG`; defaults to `info`. Calling it more than once is harmless.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
