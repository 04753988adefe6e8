fn main() {
    // napi-build wiring is only needed when the Node bindings are built
    if std::env::var_os("CARGO_FEATURE_NAPI_BINDINGS").is_some() {
        napi_build::setup();
    }
}
