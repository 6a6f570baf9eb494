//src/main.rs

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tours_backend::{
    config::{AppState, Config},
    handlers,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let tour_routes = Router::new()
        .route("/"
               ,get(handlers::tours::get_all_tours)
               .post(handlers::tours::create_tour)
        )
        // Rota estática tem prioridade sobre "/{id}" no axum
        .route("/tour-stats", get(handlers::tours::get_tour_stats))
        .route("/{id}"
               ,get(handlers::tours::get_tour)
               .patch(handlers::tours::update_tour)
               .delete(handlers::tours::delete_tour)
        );

    let user_routes = Router::new()
        .route("/"
               ,get(handlers::users::get_all_users)
               .post(handlers::users::create_user)
        )
        .route("/{id}"
               ,get(handlers::users::get_user)
               .patch(handlers::users::update_user)
               .delete(handlers::users::delete_user)
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/v1/tours", tour_routes)
        .nest("/api/v1/users", user_routes)
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
