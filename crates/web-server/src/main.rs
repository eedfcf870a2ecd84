use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads `revpulse.toml` (if present) and serves with those settings.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configuration::load_config(Path::new("revpulse.toml"))?;
    let _guard = configuration::init_tracing(&settings.logging)?;
    web_server::run_server(settings).await
}
