pub fn run() -> anyhow::Result<()> {
    println!("kinsight {}", env!("CARGO_PKG_VERSION"));
    println!("Conversation insights pipeline for children's companion devices");
    Ok(())
}
