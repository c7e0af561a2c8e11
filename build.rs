// 构建脚本: 链接解码所需的FFmpeg系统库
fn main() {
    // 静态FFmpeg仅在Windows MSVC下需要额外的系统库
    #[cfg(all(target_os = "windows", target_env = "msvc"))]
    {
        // 网络流 (rtsp/https) 的TLS
        println!("cargo:rustc-link-lib=dylib=secur32");
        println!("cargo:rustc-link-lib=dylib=ws2_32");
        println!("cargo:rustc-link-lib=dylib=bcrypt");

        // OLE 自动化和VFW
        println!("cargo:rustc-link-lib=dylib=oleaut32");
        println!("cargo:rustc-link-lib=dylib=vfw32");
    }
}
