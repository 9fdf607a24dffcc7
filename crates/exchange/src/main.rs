fn main() {
    exchange::run::main();
}
