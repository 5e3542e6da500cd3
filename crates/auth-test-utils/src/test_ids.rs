//! Fixed test identities and secrets.
//!
//! Everything here is deterministic so failures reproduce.

/// HS256 secret shared by the harness and the token builders.
pub const TEST_JWT_SECRET: &[u8] = b"test-secret-do-not-use-in-production!!";

/// Secret for tokens that must fail signature verification.
pub const FOREIGN_JWT_SECRET: &[u8] = b"some-other-service-entirely-0123456789";

pub const TEST_ISSUER: &str = "sg";

/// Token lifetime used by the harness.
pub const TEST_TOKEN_TTL_SECONDS: u64 = 3600;

/// Permitted `iat` drift used by the harness.
pub const TEST_CLOCK_SKEW_SECONDS: u64 = 300;

/// bcrypt cost for fixture hashes. The minimum, to keep tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

// Alice: regular user with the viewer permission
pub const ALICE_ID: i64 = 1;
pub const ALICE_NAME: &str = "alice";
pub const ALICE_PASSWORD: &str = "wonderland";

// Bob: regular user without the viewer permission
pub const BOB_ID: i64 = 2;
pub const BOB_NAME: &str = "bob";
pub const BOB_PASSWORD: &str = "builder";

// Root: administrator
pub const ROOT_ID: i64 = 3;
pub const ROOT_NAME: &str = "root";
pub const ROOT_PASSWORD: &str = "correct-horse";

// Authorities
pub const AUTHORITY_USER: &str = "user";
pub const AUTHORITY_USER_VIEW: &str = "user:view";
pub const AUTHORITY_ADMIN: &str = "admin";
