/// Example program to print the loaded configuration
///
/// Run with: cargo run -p flips-config --example print_config

fn main() {
    // Load configuration from flips.toml
    let config = flips_config::FlipsConfig::load();

    println!("=== Flips Configuration ===\n");
    println!("  Wrap: {}", config.wrap);
    println!("  Wrap Class: {:?}", config.wrap_class);
    println!("  Name: {}", config.name);
    println!("  Move Class: {}", config.move_class());
    println!("  In/Out Duration: {}ms", config.in_out_duration);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
