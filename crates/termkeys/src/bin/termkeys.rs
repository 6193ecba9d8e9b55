#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let result = termkeys::monitor::run().await;

    // Leave the terminal clean before any error is printed
    use std::io::{self, Write};
    let _ = io::stderr().flush();
    let _ = io::stdout().flush();

    result
}
