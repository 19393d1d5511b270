fn main() {
    // Feature flags reach build scripts through the environment, not cfg.
    if std::env::var_os("CARGO_FEATURE_NIDAQ").is_some() {
        println!("cargo:rustc-link-lib=NIDAQmx");
        println!(
            "cargo:rustc-link-search=native=C:/Program Files (x86)/National Instruments/NI-DAQ/DAQmx ANSI C Dev/lib/msvc"
        );
    }
}
