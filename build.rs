fn main() {
    println!("cargo:rerun-if-env-changed=SMSGATE_CONFIG_JSON");

    // Host builds (tests, fuzzing) run without the ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
