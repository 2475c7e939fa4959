use addtocal_core::Provider;
use owo_colors::OwoColorize;

pub fn run() {
    for provider in Provider::ALL {
        println!("  {:<12} {}", provider.name(), provider.display_name().dimmed());
    }
}
