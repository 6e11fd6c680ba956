use once_cell::sync::Lazy;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Drive a future to completion from synchronous code.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    RUNTIME.block_on(fut)
}

/// `localhost:8080` -> `http://localhost:8080/api`. The backend serves every
/// endpoint under `/api`.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    if with_scheme.ends_with("/api") { with_scheme } else { format!("{}/api", with_scheme) }
}

pub fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_adds_scheme_and_api_suffix() {
        assert_eq!(normalize_url("localhost:8080"), "http://localhost:8080/api");
        assert_eq!(normalize_url(" https://tanedu.hu/ "), "https://tanedu.hu/api");
        assert_eq!(normalize_url("http://localhost:8080/api/"), "http://localhost:8080/api");
    }
}
