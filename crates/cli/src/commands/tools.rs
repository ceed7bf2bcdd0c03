//! `fraudhound tools` — list the registered investigation tools.

pub fn run() {
    let registry = fraudhound_tools::default_registry();
    for (id, description) in registry.descriptions() {
        println!("{id:<34} {description}");
    }
}
