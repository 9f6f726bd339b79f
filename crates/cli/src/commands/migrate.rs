use crate::commands::{current_thread_runtime, CommandResult};
use faqbot_core::config::{AppConfig, LoadOptions};
use faqbot_db::{
    connect_with_settings, migrations, SqlTrainingRecordRepository, TrainingRecordRepository,
    TRAINING_TABLE,
};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "migrate",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("migrate", "runtime_init", error, 3),
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let record_count = SqlTrainingRecordRepository::new(pool.clone())
            .count()
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<u64, (&'static str, String, u8)>(record_count)
    });

    match result {
        Ok(record_count) => CommandResult::success(
            "migrate",
            format!(
                "applied pending migrations; `{TRAINING_TABLE}` holds {record_count} training records"
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
