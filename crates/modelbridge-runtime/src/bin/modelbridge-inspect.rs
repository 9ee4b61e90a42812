use anyhow::Context;
use modelbridge_runtime::cli::parse_inspect_args;
use modelbridge_runtime::logging::init_logger;
use modelbridge_runtime::{BridgeConfig, HostContext, Module, ReferenceEngine};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    init_logger();
    let args = parse_inspect_args();

    let config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BridgeConfig::from_env()?,
    };
    let host = HostContext::new(Arc::new(ReferenceEngine), config)?;
    let module = host.block_on(Module::load(&host, &args.program))?;

    if args.load_all {
        for name in module.method_names()? {
            host.block_on(module.load_method(&name)?)?;
        }
    }

    let names = match &args.method {
        Some(method) => vec![method.clone()],
        None => module.method_names()?,
    };
    let mut methods = Vec::with_capacity(names.len());
    for name in &names {
        let meta = module
            .method_meta(name)?
            .with_context(|| format!("Program has no method '{name}'"))?;
        let mut entry = meta.to_json();
        entry["loaded"] = module.is_method_loaded(name)?.into();
        methods.push(entry);
    }

    let report = serde_json::json!({
        "path": module.path(),
        "methods": methods,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    module.dispose();
    Ok(())
}
