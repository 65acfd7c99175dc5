use factcast::error::Result;
use factcast::{App, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let app = App::new(&config)?;

    let outcome = app.run().await?;
    println!("{}", outcome.notice(app.language(), app.topics_path()));

    Ok(())
}
