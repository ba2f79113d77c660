use finbot::{symbols, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: finbot <message...>\n       finbot --companies";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("--companies") {
        for company in symbols::companies() {
            let symbol = symbols::resolve(company).unwrap_or_default();
            println!("{:<20} {}", company, symbol);
        }
        return Ok(());
    }

    let message = args.join(" ");
    if message.trim().is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let settings = Settings::from_env()?;
    let router = settings.build_router()?;

    info!(message = %message, "Routing message");
    let reply = router.route(&message).await;

    info!(kind = ?reply.kind, "Reply ready");
    println!("{}", reply.text);

    Ok(())
}
