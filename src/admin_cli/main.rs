use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sea_orm::{ConnectionTrait, DatabaseConnection, JsonValue, Statement};
use serde_json::{Map, Value as JsonValueSerde};
use std::fs;

use healthlog::config::Config;
use healthlog::database;

/// Таблицы приложения в порядке, безопасном для удаления
/// (зависимые логи раньше users).
const TABLES: &[&str] = &[
    "food_logs",
    "mood_logs",
    "sleep_logs",
    "heartrate_logs",
    "workout_logs",
    "users",
];

// Определяем структуру команд CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
/// Утилита командной строки для администрирования Healthlog.
/// Позволяет накатывать схему, чистить данные и выполнять запросы к БД.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Команды для работы с базой данных.
    Db {
        #[command(subcommand)]
        db_command: DbCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Применяет SQL-скрипты из указанной папки (по умолчанию ./schema).
    Seed {
        /// Папка со скриптами *.sql, применяются в алфавитном порядке.
        #[arg(short, long, default_value = "schema")]
        dir: String,
    },
    /// ПОЛНОСТЬЮ удаляет таблицы приложения. Используйте с осторожностью!
    Wipe {
        /// Подтверждение удаления.
        #[arg(long)]
        yes: bool,
    },
    /// Выполняет SELECT-запрос к указанной таблице и выводит результат в формате JSON.
    Query {
        /// Имя таблицы для запроса.
        #[arg(short, long)]
        table: String,

        /// Условие WHERE для фильтрации (например, "user_id = 1").
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Проверяет доступность базы данных.
    Ping,
}

// Функция для выполнения SQL файла
async fn execute_sql_file(db: &DatabaseConnection, file_path: &str) -> Result<()> {
    println!("Выполнение скрипта: {}", file_path);
    let sql = fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path))?;
    // Разделяем на отдельные запросы, если в файле их несколько
    for query in sql.split(';').filter(|s| !s.trim().is_empty()) {
        let trimmed_query = query.trim();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            trimmed_query.to_string(),
        ))
        .await
        .with_context(|| {
            format!(
                "statement failed: {}",
                trimmed_query
                    .split_whitespace()
                    .take(3)
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        })?;
    }
    println!("Скрипт успешно выполнен.");
    Ok(())
}

fn ensure_known_table(table: &str) -> Result<()> {
    if !TABLES.contains(&table) {
        bail!(
            "Неизвестная таблица '{}'. Доступные: {}",
            table,
            TABLES.join(", ")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let cli = Cli::parse();
    let config = Config::from_env().context("Не удалось загрузить конфигурацию")?;
    let db = database::connect(&config).await?;

    match &cli.command {
        Commands::Db { db_command } => match db_command {
            DbCommand::Seed { dir } => {
                let mut scripts: Vec<String> = fs::read_dir(dir)
                    .with_context(|| format!("failed to read directory {}", dir))?
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
                    .map(|path| path.to_string_lossy().into_owned())
                    .collect();
                scripts.sort();

                if scripts.is_empty() {
                    bail!("В папке {} нет *.sql файлов", dir);
                }
                for script in &scripts {
                    execute_sql_file(&db, script).await?;
                }
                println!("Сиды успешно применены.");
            }
            DbCommand::Wipe { yes } => {
                if !*yes {
                    bail!("Удаление таблиц требует флага --yes");
                }
                for table in TABLES {
                    let drop_query = format!("DROP TABLE IF EXISTS `{}`", table);
                    db.execute(Statement::from_string(
                        db.get_database_backend(),
                        drop_query,
                    ))
                    .await?;
                    println!("Удалена таблица: {}", table);
                }
                println!("База данных успешно очищена.");
            }
            DbCommand::Query { table, filter } => {
                ensure_known_table(table)?;

                let mut query_str = format!("SELECT * FROM `{}`", table);
                if let Some(f) = filter {
                    query_str.push_str(" WHERE ");
                    query_str.push_str(f);
                }

                println!("Выполнение запроса: {}", query_str);
                let results = db
                    .query_all(Statement::from_string(
                        db.get_database_backend(),
                        query_str,
                    ))
                    .await?;

                if results.is_empty() {
                    println!("[]");
                    return Ok(());
                }

                // Вручную конвертируем QueryResult в serde_json::Value
                let mut json_results: Vec<JsonValueSerde> = Vec::new();
                for row in results {
                    let mut map = Map::new();
                    for col in row.column_names() {
                        let value: JsonValue =
                            row.try_get("", col.as_str()).unwrap_or(JsonValue::Null);
                        map.insert(col.to_string(), value);
                    }
                    json_results.push(JsonValueSerde::Object(map));
                }

                let pretty_json = serde_json::to_string_pretty(&json_results)?;
                println!("{}", pretty_json);
            }
            DbCommand::Ping => {
                // database::connect уже выполнил ping при установке соединения
                println!(
                    "База '{}' на {}:{} доступна.",
                    config.db_name, config.db_host, config.db_port
                );
            }
        },
    }

    Ok(())
}
