pub mod extractor {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
}

pub mod limits {

    pub const MAX_TITLE_LENGTH: usize = 255;

    pub const MAX_NAME_LENGTH: usize = 255;

    pub const MAX_URL_LENGTH: usize = 200;

    pub const MAX_USERNAME_LENGTH: usize = 150;
}

pub mod tokens {

    /// Random bytes per issued token (hex encoded to twice this length).
    pub const TOKEN_BYTES: usize = 32;
}

pub mod session {
    pub const USER_ID: &str = "user_id";
}
