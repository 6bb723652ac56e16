#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dealer_forms_server::run().await
}
