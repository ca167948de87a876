//! Employee report - prints the employee table of a relational database.

use employee_report::cli::Cli;
use employee_report::config::Config;
use employee_report::db;
use employee_report::error::Result;
use employee_report::logging;
use employee_report::report::{ReportRenderer, ReportRunner};
use tracing::{error, info};

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    if let Err(e) = runtime.block_on(run(&cli, &mut stdout)) {
        error!("{}: {:?}", e.category(), e);
        if let Err(write_err) = ReportRenderer::new(&mut stdout).failure(&e) {
            error!("{}", write_err);
        }
        std::process::exit(1);
    }
}

async fn run<W: std::io::Write + Send>(cli: &Cli, out: &mut W) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = cli.resolve_connection(&config)?;
    info!("Connection: {}", connection.display_string());

    let provider = db::provider_for(&connection);
    let summary = ReportRunner::new(provider.as_ref()).run(out).await?;
    info!("Printed {} employee records", summary.rows);

    Ok(())
}
