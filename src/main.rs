fn main() -> anyhow::Result<()> {
    wireplan::init_logging()?;
    wireplan::cli::run()
}
