use kgh_apply::{S3StorageConfig, S3WebsiteStorage};
use kgh_cli::{logging, settings, Exit, Invocation, Settings};
use std::sync::Arc;

fn main() {
    let invocation = match Invocation::try_parse_from(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(Exit::Unreadable.code());
        }
        Err(err) => err.exit(),
    };

    logging::init(invocation.verbosity);

    let settings = match Settings::resolve(&invocation) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(Exit::Unreadable.code());
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("failed to start runtime: {err}");
            std::process::exit(Exit::Unreadable.code());
        }
    };

    let storage = storage(&settings);
    let mut stdout = std::io::stdout().lock();
    let code = match runtime.block_on(kgh_cli::run(&invocation, &settings, storage, &mut stdout)) {
        Ok(exit) => exit.code(),
        Err(err) => {
            tracing::error!("{err:#}");
            Exit::Unreadable.code()
        }
    };

    std::process::exit(code);
}

fn storage(settings: &Settings) -> Arc<S3WebsiteStorage> {
    let config: S3StorageConfig = settings.backend_config();
    tracing::debug!(endpoint = %config.endpoint, bucket = %config.bucket, "storage backend");
    Arc::new(S3WebsiteStorage::new(config).with_bearer_token(settings::storage_token()))
}
