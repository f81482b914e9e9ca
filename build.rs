fn main() {
    // Stamp the binary with its build time; the date only needs to change
    // when the sources do.
    println!("cargo:rerun-if-changed=src");
    let build_date = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M UTC")
        .to_string();
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);
}
