use colored::Colorize;

const LOGO: &str = r"
  ┌─────────┐
  │  ◠   ◠  │   promptdeck
  │    ◡    │
  └─────────┘";

pub fn print_banner_with_version() {
    println!("{}", LOGO.yellow().bold());
    println!(
        "  {} {}",
        "version".dimmed(),
        env!("CARGO_PKG_VERSION").bold()
    );
    println!("  {}", env!("CARGO_PKG_DESCRIPTION").dimmed());
}
