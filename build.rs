//! Build script for compiling the kernel crate to SPIR-V
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // Only build the kernel when the rust-gpu toolchain is requested
    #[cfg(feature = "spirv-build")]
    build_spirv_kernel();
}

#[cfg(feature = "spirv-build")]
fn build_spirv_kernel() {
    use spirv_builder::{MetadataPrintout, SpirvBuilder};
    use std::path::PathBuf;

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let kernel_path = PathBuf::from(manifest_dir).join("kernel");

    let result = SpirvBuilder::new(kernel_path, "spirv-unknown-vulkan1.2")
        .print_metadata(MetadataPrintout::Full)
        .build()
        .expect("failed to compile the kernel crate to SPIR-V");

    println!(
        "cargo:warning=building SPIRV to: {}",
        result.module.unwrap_single().display()
    );
    println!(
        "cargo:warning=SPIRV entry points: {}",
        result.entry_points.join(", ")
    );

    println!(
        "cargo:rustc-env=KERNEL_SPV_PATH={}",
        result.module.unwrap_single().display()
    );
    // The kernel crate exports a single compute entry point
    println!(
        "cargo:rustc-env=KERNEL_SPV_ENTRY={}",
        result
            .entry_points
            .first()
            .map(String::as_str)
            .unwrap_or("mandelbrot")
    );
}
