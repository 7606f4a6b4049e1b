// Persistent storage keys
pub const STAFF_TOKEN_KEY: &str = "apexmath_token";
pub const STAFF_PROFILE_KEY: &str = "apexmath_user";
pub const STUDENT_TOKEN_KEY: &str = "apexmath_student_token";
pub const STUDENT_SESSION_KEY: &str = "apexmath_student_session";

// API addressing
pub const API_BASE_PATH: &str = "/api";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STORAGE_PATH: &str = ".apexmath/storage.json";

// Auth endpoints
pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const VERIFY_CODE_ENDPOINT: &str = "/auth/verify-code";

// Route names
pub const ROUTE_LOGIN: &str = "login";
pub const ROUTE_ADMIN_HOME: &str = "admin-dashboard";
pub const ROUTE_TEACHER_HOME: &str = "teacher-dashboard";

// Degradation signals for optional-capability endpoints
pub const CAPABILITY_UNAVAILABLE_STATUS: u16 = 503;
pub const CAPABILITY_UNAVAILABLE_MARKERS: [&str; 2] = ["AI", "analysis service"];
