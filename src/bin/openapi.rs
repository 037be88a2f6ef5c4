use anyhow::Result;

// Print the OpenAPI document for the relay routes.
fn main() -> Result<()> {
    let doc = mailprobe::api::openapi();
    let json = serde_json::to_string_pretty(&doc)?;
    println!("{json}");
    Ok(())
}
