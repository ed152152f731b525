use crate::commands::CommandResult;
use crate::OrderArg;
use bookery_core::config::{AppConfig, LoadOptions};
use bookery_core::domain::reservation::{Reservation, DATE_FORMAT, TIME_FORMAT};
use bookery_db::{connect_with_settings, ListOrder, ReservationLedger, SqlReservationLedger};

pub fn run(order: OrderArg) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "list",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "list",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let order = match order {
        OrderArg::Schedule => ListOrder::Schedule,
        OrderArg::Newest => ListOrder::Newest,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let ledger = SqlReservationLedger::new(pool.clone());
        let rows =
            ledger.list(order).await.map_err(|error| ("ledger_query", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<Vec<Reservation>, (&'static str, String, u8)>(rows)
    });

    match result {
        Ok(rows) if rows.is_empty() => CommandResult::success("list", "no active reservations"),
        Ok(rows) => CommandResult::success("list", render_rows(&rows)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("list", error_class, message, exit_code)
        }
    }
}

fn render_rows(rows: &[Reservation]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{} {} {} {} ({}) {} {}",
                row.id.confirmation_code(),
                row.date.format(DATE_FORMAT),
                row.time.format(TIME_FORMAT),
                row.resource,
                row.category,
                row.subject_name,
                row.contact,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
