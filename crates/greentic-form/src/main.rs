fn main() -> anyhow::Result<()> {
    greentic_form::cli::main()
}
