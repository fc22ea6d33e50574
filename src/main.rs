use DamIron::shell::protocol;

fn main() {
    protocol::run_console();
}
