#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    quad_server::start_server().await
}
