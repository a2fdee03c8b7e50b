// Thin delegating binary.
//
// The actual server assembly lives in `server.rs`.
#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    student_records::run().await
}
