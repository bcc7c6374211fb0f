//! database.rs
//! Handle de SQLite del proceso: se crea una vez al arrancar, se verifica
//! una sola vez y se cierra explícitamente al apagar. Se pasa a cada
//! servicio que lo necesita (no hay estado global).

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

pub async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    // Crear carpeta del archivo si la URL apunta a disco
    if let Some(parent) = database_url
        .strip_prefix("sqlite:")
        .filter(|path| !path.starts_with(":memory:"))
        .and_then(|path| Path::new(path).parent())
    {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);

    let options = database_url
        .parse::<SqliteConnectOptions>()
        .context("DATABASE_URL inválida")?
        .create_if_missing(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    warm_up(&db_pool).await?;
    run_migrations(&db_pool).await?;

    Ok(db_pool)
}

/// Verificación de conexión, una sola vez al inicio.
pub async fn warm_up(db_pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(db_pool)
        .await
        .context("Falló la verificación de conexión a SQLite")?;
    Ok(())
}

/// Corre migraciones con sqlx
pub async fn run_migrations(db_pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .context("Fallo en migraciones")?;
    Ok(())
}

pub async fn shutdown_database(db_pool: Pool<Sqlite>) {
    log::info!("Cerrando pool de SQLite...");
    db_pool.close().await;
}
