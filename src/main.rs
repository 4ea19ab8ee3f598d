#[actix_web::main]
async fn main() -> std::io::Result<()> {
    csvbridge_lib::run().await
}
