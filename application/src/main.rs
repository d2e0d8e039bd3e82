use std::{io, sync::OnceLock, time};

use application::{bootstrap, config, Args, Config, Service, SessionCookie};
use axum::extract::MatchedPath;
use axum_client_ip::InsecureClientIp;
use service::{
    command,
    infra::{postgres, Memory, Postgres, Storage},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        service,
        database,
        bootstrap: config::Bootstrap { admin },
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let service_config = service::Config::try_from(service).map_err(|e| {
        log::error!("invalid `Config`: {e}");
    })?;
    let admin = admin
        .map(command::CreateUser::try_from)
        .transpose()
        .map_err(|e| {
            log::error!("invalid `Config`: {e}");
        })?;

    let storage = match database.kind {
        config::DatabaseKind::Memory => {
            log::warn!("using in-memory storage, data is lost on restart");
            Storage::from(Memory::new())
        }
        config::DatabaseKind::Postgres => {
            let postgres_config = database.postgres.into();
            let postgres = Postgres::new(&postgres_config).map_err(|e| {
                log::error!("failed to initialize `Postgres` client: {e}");
            })?;

            let report =
                postgres.migrate(&migrations::runner()).await.map_err(|e| {
                    log::error!("failed to run database migrations: {e}");
                })?;
            for m in report.applied_migrations() {
                log::info!("applied database migration `{m}`");
            }

            Storage::from(postgres)
        }
    };

    let service = Service::new(service_config, storage);

    if let Some(admin) = admin {
        _ = bootstrap::provision_admin(&service, admin).await.map_err(|e| {
            log::error!("failed to provision administrator: {e}");
        })?;
    }

    let origins = server
        .cors
        .origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                log::error!("wildcard CORS origin can't allow credentials");
                return Err(());
            }
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not correct CORS origin: {e}");
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_origin(origins);

    let app = application::router(
        service,
        SessionCookie::new(server.mode.is_secure()),
    )
    .layer(cors)
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(|r: &http::Request<_>| {
                tracing::info_span!(
                    "HTTP request",
                    http.client_ip = InsecureClientIp::from(
                        r.headers(),
                        r.extensions()
                    )
                        .map(|ip| ip.0.to_string())
                        .ok(),
                    http.flavor = ?r.version(),
                    http.host = r.uri().host(),
                    http.method = r.method().as_str(),
                    http.route = r
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str),
                    http.scheme = r
                        .uri()
                        .scheme()
                        .map(http::uri::Scheme::as_str),
                    http.target = r
                        .uri()
                        .path_and_query()
                        .map(http::uri::PathAndQuery::as_str),
                    http.user_agent = r
                        .headers()
                        .get("User-Agent")
                        .and_then(|h| h.to_str().ok()),
                    http.status_code = tracing::field::Empty,
                )
            })
            .on_response(
                |r: &http::Response<_>,
                 dur: time::Duration,
                 span: &tracing::Span| {
                    span.record(
                        "http.status_code",
                        tracing::field::display(r.status().as_u16()),
                    );

                    if r.status().is_server_error()
                        || r.status().is_client_error()
                    {
                        tracing::error!(
                            duration = format!("{}ms", dur.as_millis()),
                        );
                    } else {
                        tracing::info!(
                            duration = format!("{}ms", dur.as_millis()),
                        );
                    }
                },
            ),
    );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!(
        "listening on `{}:{}` in {:?} mode",
        server.host,
        server.port,
        server.mode,
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}
