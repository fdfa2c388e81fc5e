//! hubdrive CLI entry point.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use hubdrive_core::{ItemFilter, NavigationStrategy, TracingConfig, init_tracing};

use hubdrive_client::cli::{Cli, Command, ConfigAction, TokenAction};
use hubdrive_client::commands;
use hubdrive_client::config::ClientConfig;
use hubdrive_client::context::Context;
use hubdrive_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match load_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tracing_config = if cli.log_json {
        TracingConfig::structured()
    } else if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli_quiet()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli, config, config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// An explicit `--config` must exist; the default path is optional.
fn load_config(cli: &Cli, path: &Path) -> ClientResult<ClientConfig> {
    if cli.config.is_some() {
        ClientConfig::load_from(path).map_err(ClientError::Config)
    } else {
        ClientConfig::load().map_err(ClientError::Config)
    }
}

async fn run(cli: Cli, config: ClientConfig, config_path: PathBuf) -> ClientResult<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        };
    }

    let ctx = Context::new(config, cli.portal.as_deref(), cli.root)?;

    match cli.command {
        Command::Ls(args) => {
            let options = ctx.config().drive.format_options(args.view);
            let strategy = args.up.then_some(NavigationStrategy::ParentLookup);
            let mut browser = ctx
                .browser(args.folder.as_deref(), args.filter(), strategy)
                .await?;
            commands::browse::ls(&mut browser, &args, options).await
        }
        Command::Upload {
            path,
            folder,
            name,
            mime_type,
        } => {
            let mut browser = ctx.browser(folder.as_deref(), ItemFilter::All, None).await?;
            commands::browse::upload(&mut browser, &path, name, mime_type).await
        }
        Command::Rm { id, yes } => {
            let mut browser = ctx.browser(None, ItemFilter::All, None).await?;
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stderr();
            commands::browse::rm(&mut browser, &id, yes, &mut input, &mut output).await
        }
        Command::Mkdir { name, folder } => {
            let mut browser = ctx.browser(folder.as_deref(), ItemFilter::All, None).await?;
            commands::browse::mkdir(&mut browser, &name).await
        }
        Command::EnsureFolder { name, folder } => {
            let mut browser = ctx.browser(folder.as_deref(), ItemFilter::All, None).await?;
            commands::browse::ensure_folder(&mut browser, &name).await
        }
        Command::Open { id, print } => {
            let mut browser = ctx.browser(None, ItemFilter::All, None).await?;
            commands::browse::open(&mut browser, &id, print).await
        }
        Command::Share { id, email, role } => {
            let mut browser = ctx.browser(None, ItemFilter::All, None).await?;
            commands::browse::share(&mut browser, &id, &email, role).await
        }
        Command::Token {
            action: TokenAction::Check { json },
        } => commands::token::check(&ctx, json).await,
        Command::Connect { folder_id, no_save } => {
            let save_to = (!no_save).then_some(config_path.as_path());
            commands::connect::connect(&ctx, &folder_id, save_to).await
        }
        Command::Config { .. } => Ok(()),
    }
}
