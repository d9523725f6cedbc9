fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Version info only matters for the Windows executable
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set("FileDescription", "Shotgunner")
        .set("ProductName", "Shotgunner")
        .set("OriginalFilename", "shotgunner.exe");

    if let Err(e) = res.compile() {
        println!("cargo:warning=Failed to embed version resources: {}", e);
    }
}
