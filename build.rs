use std::env;

fn main() {
    let default_prefix =
        env::var("DISAPPEAR_DEFAULT_PREFIX").unwrap_or_else(|_| "disappear.".into());

    println!("cargo::rerun-if-env-changed=DISAPPEAR_DEFAULT_PREFIX");
    println!("cargo::rustc-env=DISAPPEAR_DEFAULT_PREFIX={}", default_prefix);
}
