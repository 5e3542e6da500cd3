//! Protected sample endpoints, one per kind of route requirement.

/// GET /test (any authenticated user)
pub async fn test() -> &'static str {
    "HelloWorld"
}

/// GET /sayHello (`user:view`)
pub async fn say_hello() -> &'static str {
    "Hello, World!"
}

/// GET /admin (`admin`)
pub async fn admin() -> &'static str {
    "Admin Page"
}
