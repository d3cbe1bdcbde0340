use std::{process, sync::Arc};

use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use yatube::{
    application::{
        accounts::{AccountService, CreateGroupCommand},
        error::AppError,
        repos::{GroupsRepo, GroupsWriteRepo, UsersRepo, UsersWriteRepo},
    },
    config,
    infra::{
        db::SqliteRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Users(args) => match args.command {
            config::UsersCommand::Add(add) => run_add_user(settings, add).await,
        },
        config::Command::Groups(args) => match args.command {
            config::GroupsCommand::Add(add) => run_add_group(settings, add).await,
        },
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<SqliteRepositories>, AppError> {
    let pool = SqliteRepositories::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(InfraError::from)?;

    SqliteRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(SqliteRepositories::new(pool)))
}

fn build_account_service(repositories: &Arc<SqliteRepositories>) -> AccountService {
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let users_write_repo: Arc<dyn UsersWriteRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let groups_write_repo: Arc<dyn GroupsWriteRepo> = repositories.clone();

    AccountService::new(users_repo, users_write_repo, groups_repo, groups_write_repo)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let router = http::build_router(HttpState::from_repositories(
        repositories,
        settings.auth.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "yatube::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut server => return server_result(joined),
        _ = signalled_rx => {}
    }

    let grace = settings.server.graceful_shutdown;
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!(
                target = "yatube::serve",
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => {
            info!(target = "yatube::serve", "server stopped");
            Ok(())
        }
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "yatube::serve", error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(target = "yatube::serve", error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(target = "yatube::serve", "received Ctrl+C, shutting down"),
        _ = terminate => info!(target = "yatube::serve", "received SIGTERM, shutting down"),
    }
}

async fn run_add_user(settings: config::Settings, args: config::UserAddArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let user = build_account_service(&repositories)
        .create_user(&args.username)
        .await?;

    println!("created user {} (id {})", user.username, user.id);
    Ok(())
}

async fn run_add_group(
    settings: config::Settings,
    args: config::GroupAddArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let group = build_account_service(&repositories)
        .create_group(CreateGroupCommand {
            title: args.title,
            slug: args.slug,
            description: args.description,
        })
        .await?;

    println!(
        "created group {} at /group/{}/ (id {})",
        group.title, group.slug, group.id
    );
    Ok(())
}
