// Exit codes for CI triage
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
pub const EXIT_VERIFICATION_FAIL: i32 = 2;
