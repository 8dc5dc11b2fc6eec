// src/features.rs

/// Is parallel point generation compiled in?
pub fn parallel_available() -> bool {
    cfg!(feature = "parallel")
}
