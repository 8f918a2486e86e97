use browserfs::{
    application::{Application, ApplicationError},
    cli::Cli,
};
use clap::Parser as _;
use supports_color::Stream;
use tracing::debug;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    setup_tracing(&cli_args);
    debug!("Parsed CLI arguments: {cli_args:?}");

    let color = supports_color::on(Stream::Stdout).is_some();
    colored::control::set_override(color);

    Application::run(cli_args, color).await?;

    Ok(())
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(level) = Option::<tracing::Level>::from(cli_args.log_level) {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}
