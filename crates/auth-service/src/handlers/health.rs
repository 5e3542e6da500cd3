/// Liveness probe. Does not touch the session store or the database.
pub async fn health_check() -> &'static str {
    "OK"
}
