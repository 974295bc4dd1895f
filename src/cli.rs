use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::runner::Runner;
use crate::store::CatalogStore;

/// Embeddable command-line surface. The host binary owns the registry and
/// the store; migrations are code, not files loaded at runtime.
#[derive(Debug, Parser)]
#[command(name = "cadastre", about = "Apply and revert collection-catalog migrations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply all pending migrations in identifier order.
    Apply {
        /// List pending migrations without applying them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Revert the most recently applied migration.
    Revert {
        /// Revert every migration back to and including this identifier.
        #[arg(long)]
        to: Option<String>,
    },
    /// Show applied and pending migrations.
    Status,
}

/// Exit code 0 on success, non-zero on any migration error.
pub fn run<S: CatalogStore>(command: &Command, runner: &mut Runner<'_, S>) -> ExitCode {
    match execute(command, runner) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "migration run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute<S: CatalogStore>(
    command: &Command,
    runner: &mut Runner<'_, S>,
) -> Result<(), crate::migration::MigrationError> {
    match command {
        Command::Apply { dry_run: true } => {
            let pending = runner.plan_apply()?;
            if pending.is_empty() {
                println!("no pending migrations");
            }
            for name in pending {
                println!("pending: {name}");
            }
        }
        Command::Apply { dry_run: false } => {
            let applied = runner.apply_all()?;
            if applied.is_empty() {
                println!("no pending migrations");
            }
            for name in applied {
                println!("applied: {name}");
            }
        }
        Command::Revert { to: Some(target) } => {
            for name in runner.revert_to(Some(target))? {
                println!("reverted: {name}");
            }
        }
        Command::Revert { to: None } => {
            let name = runner.revert_last()?;
            println!("reverted: {name}");
        }
        Command::Status => {
            let applied = runner.store_mut().applied_migrations().map_err(|e| {
                crate::migration::MigrationError::Store {
                    context: "status".to_string(),
                    message: e.to_string(),
                }
            })?;
            for name in &applied {
                println!("applied: {name}");
            }
            for name in runner.plan_apply()? {
                println!("pending: {name}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::migration::{Migration, MigrationRegistry};
    use crate::operation::CreateCollection;
    use crate::store::MemoryStore;

    fn setup_registry() -> MigrationRegistry {
        let mut registry = MigrationRegistry::new();
        registry
            .register(
                Migration::new("1739788064_created_market_data").operation(
                    CreateCollection::new("market_data").field("contract_id", FieldType::number()),
                ),
            )
            .unwrap();
        registry
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["cadastre", "apply", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Command::Apply { dry_run: true }));

        let cli = Cli::try_parse_from(["cadastre", "revert", "--to", "1739788064_created_market_data"])
            .unwrap();
        assert!(matches!(cli.command, Command::Revert { to: Some(_) }));

        let cli = Cli::try_parse_from(["cadastre", "status"]).unwrap();
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn apply_command_applies_pending() {
        let registry = setup_registry();
        let mut runner = Runner::new(&registry, MemoryStore::new());

        execute(&Command::Apply { dry_run: false }, &mut runner).unwrap();
        assert_eq!(runner.store_mut().applied_migrations().unwrap().len(), 1);
    }

    #[test]
    fn dry_run_applies_nothing() {
        let registry = setup_registry();
        let mut runner = Runner::new(&registry, MemoryStore::new());

        execute(&Command::Apply { dry_run: true }, &mut runner).unwrap();
        assert!(runner.store_mut().applied_migrations().unwrap().is_empty());
    }

    #[test]
    fn revert_on_empty_log_fails() {
        let registry = setup_registry();
        let mut runner = Runner::new(&registry, MemoryStore::new());

        let result = execute(&Command::Revert { to: None }, &mut runner);
        assert_eq!(
            result,
            Err(crate::migration::MigrationError::NothingApplied)
        );
    }

    #[test]
    fn run_maps_errors_to_failure_exit() {
        let registry = setup_registry();
        let mut runner = Runner::new(&registry, MemoryStore::new());

        let code = run(&Command::Revert { to: None }, &mut runner);
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::FAILURE));
    }

    #[test]
    fn apply_then_revert_round_trips() {
        let registry = setup_registry();
        let mut runner = Runner::new(&registry, MemoryStore::new());

        execute(&Command::Apply { dry_run: false }, &mut runner).unwrap();
        execute(&Command::Revert { to: None }, &mut runner).unwrap();
        assert!(runner.store_mut().load_catalog().unwrap().is_empty());
    }
}
