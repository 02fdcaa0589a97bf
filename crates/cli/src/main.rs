use anyhow::Context;
use clap::{Parser, Subcommand};
use vitrine_app::modules::image_collections::labels;

#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about = "Operate the Vitrine image collection service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until interrupted
    Serve,
    /// Print the schema migrations contributed by every module
    Migrations {
        /// Include the migration statements, not just their ids
        #[arg(long)]
        verbose: bool,
    },
    /// Print the field labels of a locale
    Labels {
        /// Locale code such as `en` or `de`; defaults to the configured locale
        #[arg(long)]
        locale: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = vitrine_kernel::settings::Settings::load()
        .with_context(|| "failed to load Vitrine settings")?;
    vitrine_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "vitrine-cli starting");

    match cli.command {
        Command::Serve => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(vitrine_app::run(settings))
        }
        Command::Migrations { verbose } => {
            let registry = vitrine_app::build_registry(&settings)?;
            for (module, migration) in registry.collect_migrations() {
                println!("{}/{}", module, migration.id);
                if verbose {
                    println!("{}", migration.up.trim());
                }
            }
            Ok(())
        }
        Command::Labels { locale } => {
            let locale = locale.unwrap_or(settings.display.default_locale);
            if !labels::is_supported(&locale) {
                anyhow::bail!(
                    "unsupported locale '{}'; expected one of: {}",
                    locale,
                    labels::supported_locales().collect::<Vec<_>>().join(", ")
                );
            }
            for (field, text) in labels::labels(&locale) {
                println!("{}\t{}", field, text);
            }
            Ok(())
        }
    }
}
