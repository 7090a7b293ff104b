fn main() {
    // ESP-IDF sysenv output is only meaningful when building for the target.
    // Host builds (tests, clippy) skip it so no ESP toolchain is required.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
